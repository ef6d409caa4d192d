use std::error::Error;
use std::path::PathBuf;

use url::Url;

use common::crypto::EncryptionKey;
use common::store::{FetchConfig, FetchError, Fetcher};

use super::args::Args;
use crate::state::{AppState, StateError};

#[derive(Debug, thiserror::Error)]
pub enum ContextError {
    #[error("no remote configured, pass --remote or set remote in config.toml")]
    NoRemote,
    #[error(transparent)]
    State(#[from] StateError),
    #[error(transparent)]
    Fetch(#[from] FetchError),
}

#[derive(Debug, Clone)]
pub struct OpContext {
    /// Loaded config directory state
    pub state: AppState,
    /// `--remote`, overriding the config file
    pub remote: Option<Url>,
    /// `--cache-dir`, overriding the config file
    pub cache_dir: Option<PathBuf>,
}

impl OpContext {
    pub fn new(args: &Args) -> Result<Self, StateError> {
        Ok(Self {
            state: AppState::load(args.config_path.clone())?,
            remote: args.remote.clone(),
            cache_dir: args.cache_dir.clone(),
        })
    }

    /// Remote store URL: explicit flag > config file
    pub fn remote(&self) -> Result<&Url, ContextError> {
        self.remote
            .as_ref()
            .or(self.state.config.remote.as_ref())
            .ok_or(ContextError::NoRemote)
    }

    pub fn cache_dir(&self) -> Result<PathBuf, ContextError> {
        match &self.cache_dir {
            Some(dir) => Ok(dir.clone()),
            None => Ok(self.state.cache_dir()?),
        }
    }

    /// Fetch configuration from the loaded state; `key` replaces the
    /// configured key material when given
    pub fn fetch_config(&self, key: Option<EncryptionKey>) -> Result<FetchConfig, ContextError> {
        let config = &self.state.config;
        let encryption = match key {
            Some(key) => Some(key),
            None => config.encryption_key()?,
        };

        Ok(FetchConfig::new(self.cache_dir()?)
            .with_hash_algorithm(config.hash_type)
            .with_encryption(encryption)
            .with_verify_integrity(config.verify_integrity))
    }

    pub fn fetcher(&self, key: Option<EncryptionKey>) -> Result<Fetcher, ContextError> {
        let config = self.fetch_config(key)?;
        Ok(Fetcher::from_url(self.remote()?, config)?)
    }
}

#[async_trait::async_trait]
pub trait Op: Send + Sync {
    type Error: Error + Send + Sync + 'static;
    type Output;

    async fn execute(&self, ctx: &OpContext) -> Result<Self::Output, Self::Error>;
}

#[macro_export]
macro_rules! command_enum {
    ($(($variant:ident, $type:ty)),* $(,)?) => {
        #[derive(Subcommand, Debug, Clone)]
        pub enum Command {
            $($variant($type),)*
        }

        #[derive(Debug)]
        pub enum OpOutput {
            $($variant(<$type as $crate::cli::op::Op>::Output),)*
        }

        #[derive(Debug, thiserror::Error)]
        pub enum OpError {
            $(
                #[error(transparent)]
                $variant(<$type as $crate::cli::op::Op>::Error),
            )*
        }

        #[async_trait::async_trait]
        impl $crate::cli::op::Op for Command {
            type Output = OpOutput;
            type Error = OpError;

            async fn execute(&self, ctx: &$crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
                match self {
                    $(
                        Command::$variant(op) => {
                            op.execute(ctx).await
                                .map(OpOutput::$variant)
                                .map_err(OpError::$variant)
                        },
                    )*
                }
            }
        }

        impl std::fmt::Display for OpOutput {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                match self {
                    $(
                        OpOutput::$variant(output) => write!(f, "{}", output),
                    )*
                }
            }
        }
    };
}
