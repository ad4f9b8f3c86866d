use crate::AssetError;
use std::thread::JoinHandle;

/// An asset load running on its own worker thread.
///
/// Loads have exactly one completion: [`LoadTask::join`] blocks until the
/// worker finishes and hands back its result. There is no timeout and no
/// retry.
pub struct LoadTask<T> {
    label: String,
    handle: JoinHandle<Result<T, AssetError>>,
}

impl<T: Send + 'static> LoadTask<T> {
    /// Start `load` on a thread named `load-<label>`.
    pub fn spawn<F>(label: impl Into<String>, load: F) -> Result<Self, AssetError>
    where
        F: FnOnce() -> Result<T, AssetError> + Send + 'static,
    {
        let label = label.into();
        let handle = std::thread::Builder::new()
            .name(format!("load-{label}"))
            .spawn(load)
            .map_err(|source| AssetError::Spawn {
                label: label.clone(),
                source,
            })?;
        tracing::debug!("started load task {label}");
        Ok(Self { label, handle })
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Wait for the load to complete.
    pub fn join(self) -> Result<T, AssetError> {
        match self.handle.join() {
            Ok(result) => {
                if let Err(e) = &result {
                    tracing::warn!("load task {} failed: {e}", self.label);
                }
                result
            }
            Err(_) => Err(AssetError::TaskPanicked(self.label)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn join_returns_worker_result() {
        let task = LoadTask::spawn("answer", || Ok(42u32)).unwrap();
        assert_eq!(task.label(), "answer");
        assert_eq!(task.join().unwrap(), 42);
    }

    #[test]
    fn join_propagates_load_error() {
        let task: LoadTask<u32> =
            LoadTask::spawn("missing", || Err(AssetError::EmptyModel("x.glb".into()))).unwrap();
        assert!(matches!(task.join(), Err(AssetError::EmptyModel(_))));
    }

    #[test]
    fn worker_panic_becomes_error() {
        let task: LoadTask<u32> = LoadTask::spawn("boom", || panic!("decoder crashed")).unwrap();
        match task.join() {
            Err(AssetError::TaskPanicked(label)) => assert_eq!(label, "boom"),
            other => panic!("unexpected: {other:?}"),
        }
    }
}
