use std::fmt::Debug;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use bytes::Bytes;
use reqwest::{Client, StatusCode};
use url::Url;

use super::FetchError;

/// Read-only view of the remote content store
///
/// Paths are relative to the store's base, e.g. `tag/latest` or
/// `data/01/23456789abcdef0123456789abcdef`.
#[async_trait::async_trait]
pub trait Remote: Debug + Send + Sync {
    /// Download the object at `path`
    async fn get(&self, path: &str) -> Result<Bytes, FetchError>;

    /// Check whether the object at `path` exists, without downloading it
    async fn exists(&self, path: &str) -> Result<bool, FetchError>;
}

/// Pick a transport for `base` by its scheme
pub fn remote_from_url(base: &Url) -> Result<Arc<dyn Remote>, FetchError> {
    match base.scheme() {
        "http" | "https" => Ok(Arc::new(HttpRemote::new(base)?)),
        "file" => {
            let root = base
                .to_file_path()
                .map_err(|_| FetchError::UnsupportedRemote(base.to_string()))?;
            Ok(Arc::new(FileRemote::new(root)))
        }
        _ => Err(FetchError::UnsupportedRemote(base.to_string())),
    }
}

#[derive(Debug, Clone)]
pub struct HttpRemote {
    base: Url,
    client: Client,
}

impl HttpRemote {
    pub fn new(base: &Url) -> Result<Self, FetchError> {
        let client = Client::builder().build()?;
        Ok(Self::with_client(base, client))
    }

    pub fn with_client(base: &Url, client: Client) -> Self {
        // join() drops the last path segment unless the base ends in '/'
        let mut base = base.clone();
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        Self { base, client }
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    fn url(&self, path: &str) -> Result<Url, FetchError> {
        Ok(self.base.join(path)?)
    }
}

#[async_trait::async_trait]
impl Remote for HttpRemote {
    async fn get(&self, path: &str) -> Result<Bytes, FetchError> {
        let url = self.url(path)?;
        tracing::trace!("GET {}", url);

        let response = self.client.get(url.clone()).send().await?;
        let status = response.status();
        if status.as_u16() >= 400 {
            return Err(FetchError::Status {
                status: status.as_u16(),
                location: url.to_string(),
            });
        }

        Ok(response.bytes().await?)
    }

    async fn exists(&self, path: &str) -> Result<bool, FetchError> {
        let url = self.url(path)?;
        tracing::trace!("HEAD {}", url);

        let response = self.client.head(url).send().await?;
        Ok(response.status() == StatusCode::OK)
    }
}

/// Remote store laid out on a local or mounted filesystem
#[derive(Debug, Clone)]
pub struct FileRemote {
    root: PathBuf,
}

impl FileRemote {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn path(&self, path: &str) -> PathBuf {
        path.split('/').fold(self.root.clone(), |acc, part| acc.join(part))
    }
}

#[async_trait::async_trait]
impl Remote for FileRemote {
    async fn get(&self, path: &str) -> Result<Bytes, FetchError> {
        let full = self.path(path);
        match tokio::fs::read(&full).await {
            Ok(data) => Ok(Bytes::from(data)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                Err(FetchError::NotFound(full.display().to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn exists(&self, path: &str) -> Result<bool, FetchError> {
        Ok(tokio::fs::metadata(self.path(path))
            .await
            .map(|m| m.is_file())
            .unwrap_or(false))
    }
}
