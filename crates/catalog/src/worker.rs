use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;

use bookify_core::{BookRecord, FetchError};

use crate::CatalogSource;

/// One-shot result of a fetch running on a worker thread. Poll it with
/// [`PendingFetch::try_take`] and drop it once a result has been taken.
#[derive(Debug)]
pub struct PendingFetch<T> {
    rx: Receiver<Result<T, FetchError>>,
}

impl<T: Send + 'static> PendingFetch<T> {
    pub fn spawn<F>(name: &str, job: F) -> Self
    where
        F: FnOnce() -> Result<T, FetchError> + Send + 'static,
    {
        let (tx, rx) = mpsc::channel();
        let worker_tx = tx.clone();
        let spawned = thread::Builder::new()
            .name(name.to_string())
            .spawn(move || {
                // The receiver may already be gone; nobody is waiting then.
                let _ = worker_tx.send(job());
            });
        if let Err(err) = spawned {
            let _ = tx.send(Err(FetchError::Transport(format!(
                "spawn {name} worker: {err}"
            ))));
        }
        Self { rx }
    }

    pub fn try_take(&self) -> Option<Result<T, FetchError>> {
        match self.rx.try_recv() {
            Ok(result) => Some(result),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => Some(Err(FetchError::Transport(
                "fetch worker exited without a result".to_string(),
            ))),
        }
    }

    pub fn wait(self) -> Result<T, FetchError> {
        self.rx.recv().unwrap_or_else(|_| {
            Err(FetchError::Transport(
                "fetch worker exited without a result".to_string(),
            ))
        })
    }
}

pub fn spawn_search(
    source: Arc<dyn CatalogSource>,
    query: String,
) -> PendingFetch<Vec<BookRecord>> {
    PendingFetch::spawn("catalog-search", move || source.search(&query))
}

pub fn spawn_cover_fetch(source: Arc<dyn CatalogSource>, url: String) -> PendingFetch<Vec<u8>> {
    PendingFetch::spawn("cover-fetch", move || source.fetch_bytes(&url))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    struct Canned(Result<Vec<BookRecord>, FetchError>);

    impl CatalogSource for Canned {
        fn search(&self, _query: &str) -> Result<Vec<BookRecord>, FetchError> {
            self.0.clone()
        }

        fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>, FetchError> {
            Ok(url.as_bytes().to_vec())
        }
    }

    #[test]
    fn search_result_arrives_once() {
        let pending = spawn_search(Arc::new(Canned(Ok(Vec::new()))), "q".to_string());
        let mut result = None;
        for _ in 0..200 {
            if let Some(r) = pending.try_take() {
                result = Some(r);
                break;
            }
            thread::sleep(Duration::from_millis(5));
        }
        assert_eq!(result, Some(Ok(Vec::new())));
    }

    #[test]
    fn errors_pass_through() {
        let pending = spawn_search(
            Arc::new(Canned(Err(FetchError::Status(503)))),
            "q".to_string(),
        );
        assert_eq!(pending.wait(), Err(FetchError::Status(503)));
    }

    #[test]
    fn cover_fetch_returns_bytes() {
        let pending = spawn_cover_fetch(Arc::new(Canned(Ok(Vec::new()))), "abc".to_string());
        assert_eq!(pending.wait(), Ok(b"abc".to_vec()));
    }
}
