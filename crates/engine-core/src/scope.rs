use std::{
    future::Future,
    sync::{Arc, Mutex, MutexGuard},
};
use tokio_util::{sync::CancellationToken, task::TaskTracker};

/// A group of background tasks sharing one lifetime.
///
/// The scope dies on the first task failure or on an explicit [`kill`]; the
/// first recorded cause wins. Dying cancels the shared token so every task
/// selecting on [`dying`] winds down.
///
/// [`kill`]: TaskScope::kill
/// [`dying`]: TaskScope::dying
pub struct TaskScope<E> {
    token: CancellationToken,
    tracker: TaskTracker,
    cause: Arc<Mutex<Option<E>>>,
}

impl<E> Clone for TaskScope<E> {
    fn clone(&self) -> Self {
        Self {
            token: self.token.clone(),
            tracker: self.tracker.clone(),
            cause: self.cause.clone(),
        }
    }
}

impl<E: Clone + Send + 'static> TaskScope<E> {
    pub fn new() -> Self {
        Self::with_token(CancellationToken::new())
    }

    /// Scope that also dies, without a cause, when `parent` is cancelled.
    pub fn child_of(parent: &CancellationToken) -> Self {
        Self::with_token(parent.child_token())
    }

    fn with_token(token: CancellationToken) -> Self {
        Self {
            token,
            tracker: TaskTracker::new(),
            cause: Arc::new(Mutex::new(None)),
        }
    }

    pub fn token(&self) -> CancellationToken {
        self.token.clone()
    }

    /// Spawns a task into the scope. A task returning `Err` kills the scope.
    pub fn spawn<F>(&self, task: F)
    where
        F: Future<Output = Result<(), E>> + Send + 'static,
    {
        let scope = self.clone();
        self.tracker.spawn(async move {
            if let Err(cause) = task.await {
                scope.kill(cause);
            }
        });
    }

    pub fn kill(&self, cause: E) {
        {
            let mut slot = self.lock_cause();
            if slot.is_none() {
                *slot = Some(cause);
            }
        }
        self.tracker.close();
        self.token.cancel();
    }

    pub fn is_alive(&self) -> bool {
        !self.token.is_cancelled()
    }

    /// Resolves once the scope starts dying.
    pub async fn dying(&self) {
        self.token.cancelled().await
    }

    /// The reason the scope died, if it died with one.
    pub fn cause(&self) -> Option<E> {
        self.lock_cause().clone()
    }

    /// Waits until every spawned task has finished.
    pub async fn wait(&self) {
        self.tracker.close();
        self.tracker.wait().await
    }

    fn lock_cause(&self) -> MutexGuard<'_, Option<E>> {
        self.cause
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl<E: Clone + Send + 'static> Default for TaskScope<E> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn first_cause_wins() {
        let scope: TaskScope<String> = TaskScope::new();
        assert!(scope.is_alive());

        scope.kill("stopped".into());
        scope.kill("later".into());

        assert!(!scope.is_alive());
        assert_eq!(scope.cause().as_deref(), Some("stopped"));
    }

    #[tokio::test]
    async fn failing_task_kills_scope_and_siblings_exit() {
        let scope: TaskScope<String> = TaskScope::new();

        let sibling = scope.clone();
        scope.spawn(async move {
            sibling.dying().await;
            Ok(())
        });
        scope.spawn(async { Err("fetch failed".to_string()) });

        tokio::time::timeout(Duration::from_secs(5), scope.wait())
            .await
            .expect("tasks should finish");

        assert!(!scope.is_alive());
        assert_eq!(scope.cause().as_deref(), Some("fetch failed"));
    }

    #[tokio::test]
    async fn parent_cancellation_kills_without_cause() {
        let parent = CancellationToken::new();
        let scope: TaskScope<String> = TaskScope::child_of(&parent);

        parent.cancel();
        scope.dying().await;

        assert!(!scope.is_alive());
        assert!(scope.cause().is_none());
    }
}
