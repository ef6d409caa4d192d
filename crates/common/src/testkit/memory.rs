use std::collections::HashMap;
use std::time::Duration;

use bytes::Bytes;
use parking_lot::Mutex;

use crate::hash::{data_path, tag_path, HashAlgorithm};
use crate::store::{FetchError, Remote};

#[derive(Debug, Default)]
struct State {
    objects: HashMap<String, Bytes>,
    gets: HashMap<String, usize>,
    heads: HashMap<String, usize>,
    /// remaining injected failures per path
    failures: HashMap<String, usize>,
    delays: HashMap<String, Duration>,
    in_flight: usize,
    max_in_flight: usize,
}

#[derive(Debug, Default)]
pub struct MemoryRemote {
    state: Mutex<State>,
}

impl MemoryRemote {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put(&self, path: &str, data: impl Into<Bytes>) {
        self.state.lock().objects.insert(path.to_string(), data.into());
    }

    /// Store `data` under its hash and return the hash
    pub fn put_blob(&self, algorithm: HashAlgorithm, data: &[u8]) -> String {
        let hash = algorithm.digest_hex(data);
        self.put(&data_path(&hash), Bytes::copy_from_slice(data));
        hash
    }

    pub fn put_tag(&self, name: &str, value: &str) {
        self.put(&tag_path(name), value.to_string());
    }

    /// Fail the next `times` requests for `path` with a 500
    pub fn fail_next(&self, path: &str, times: usize) {
        self.state.lock().failures.insert(path.to_string(), times);
    }

    pub fn fail_always(&self, path: &str) {
        self.fail_next(path, usize::MAX);
    }

    /// Sleep before answering requests for `path`
    pub fn delay(&self, path: &str, delay: Duration) {
        self.state.lock().delays.insert(path.to_string(), delay);
    }

    pub fn get_count(&self, path: &str) -> usize {
        self.state.lock().gets.get(path).copied().unwrap_or(0)
    }

    pub fn blob_get_count(&self, hash: &str) -> usize {
        self.get_count(&data_path(hash))
    }

    pub fn head_count(&self, path: &str) -> usize {
        self.state.lock().heads.get(path).copied().unwrap_or(0)
    }

    pub fn total_gets(&self) -> usize {
        self.state.lock().gets.values().sum()
    }

    /// Highest number of GETs that were in progress at the same time
    pub fn max_in_flight(&self) -> usize {
        self.state.lock().max_in_flight
    }

    /// Consume one injected failure for `path`, if any remain
    fn take_failure(state: &mut State, path: &str) -> bool {
        match state.failures.get_mut(path) {
            Some(remaining) if *remaining > 0 => {
                *remaining -= 1;
                true
            }
            _ => false,
        }
    }
}

#[async_trait::async_trait]
impl Remote for MemoryRemote {
    async fn get(&self, path: &str) -> Result<Bytes, FetchError> {
        let delay = {
            let mut state = self.state.lock();
            *state.gets.entry(path.to_string()).or_default() += 1;
            state.in_flight += 1;
            state.max_in_flight = state.max_in_flight.max(state.in_flight);
            state.delays.get(path).copied()
        };
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let mut state = self.state.lock();
        state.in_flight -= 1;
        if Self::take_failure(&mut state, path) {
            return Err(FetchError::Status {
                status: 500,
                location: path.to_string(),
            });
        }
        state
            .objects
            .get(path)
            .cloned()
            .ok_or_else(|| FetchError::Status {
                status: 404,
                location: path.to_string(),
            })
    }

    async fn exists(&self, path: &str) -> Result<bool, FetchError> {
        let mut state = self.state.lock();
        *state.heads.entry(path.to_string()).or_default() += 1;
        if Self::take_failure(&mut state, path) {
            return Err(FetchError::Status {
                status: 500,
                location: path.to_string(),
            });
        }
        Ok(state.objects.contains_key(path))
    }
}
