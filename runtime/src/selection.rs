//! Observable selections
//!
//! A [`Selection`] pairs a selector with the store's state channel: it holds
//! the current output and wakes only when that output changes, not on every
//! state change.

use crate::StoreError;
use futures::Stream;
use roster_core::Selector;
use std::sync::Arc;
use tokio::sync::watch;

/// Current-and-future value of a selector
pub struct Selection<S, Sel: Selector<S>> {
    selector: Sel,
    state: watch::Receiver<Arc<S>>,
    current: Sel::Output,
}

impl<S, Sel> Selection<S, Sel>
where
    S: Send + Sync + 'static,
    Sel: Selector<S> + 'static,
    Sel::Output: PartialEq + Send,
{
    pub(crate) fn new(selector: Sel, mut state: watch::Receiver<Arc<S>>) -> Self {
        let snapshot = Arc::clone(&state.borrow_and_update());
        let current = selector.select(&snapshot);
        Self {
            selector,
            state,
            current,
        }
    }

    /// The latest selected output
    #[must_use]
    pub fn current(&self) -> Sel::Output {
        self.current.clone()
    }

    /// Wait until the selected output differs from [`current`](Self::current)
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::ChannelClosed`] once the store is gone.
    pub async fn changed(&mut self) -> Result<Sel::Output, StoreError> {
        loop {
            self.state
                .changed()
                .await
                .map_err(|_| StoreError::ChannelClosed)?;

            let snapshot = Arc::clone(&self.state.borrow_and_update());
            let next = self.selector.select(&snapshot);
            if next != self.current {
                self.current = next.clone();
                return Ok(next);
            }
        }
    }

    /// Stream of outputs: the current one, then every change
    pub fn into_stream(mut self) -> impl Stream<Item = Sel::Output> + Send
    where
        Sel: Send,
        Sel::Output: Sync,
    {
        async_stream::stream! {
            yield self.current();
            while let Ok(next) = self.changed().await {
                yield next;
            }
        }
    }
}

impl<S, Sel> std::fmt::Debug for Selection<S, Sel>
where
    Sel: Selector<S>,
    Sel::Output: std::fmt::Debug,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Selection")
            .field("current", &self.current)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;
    use roster_core::create_selector;
    use std::time::Duration;

    #[derive(Debug, Default)]
    struct Counter {
        count: u32,
        label: String,
    }

    #[tokio::test]
    async fn test_current_reflects_initial_state() {
        let (_tx, rx) = watch::channel(Arc::new(Counter::default()));
        let selection = Selection::new(create_selector(|s: &Counter| s.count, |c| *c), rx);
        assert_eq!(selection.current(), 0);
    }

    #[tokio::test]
    async fn test_changed_ignores_unrelated_updates() -> Result<(), StoreError> {
        let (tx, rx) = watch::channel(Arc::new(Counter::default()));
        let mut selection = Selection::new(create_selector(|s: &Counter| s.count, |c| *c), rx);

        tx.send_replace(Arc::new(Counter {
            count: 0,
            label: "renamed".into(),
        }));
        tx.send_replace(Arc::new(Counter {
            count: 2,
            label: "renamed".into(),
        }));

        assert_eq!(selection.changed().await?, 2);
        assert_eq!(selection.current(), 2);
        Ok(())
    }

    #[tokio::test]
    async fn test_changed_errors_when_store_gone() {
        let (tx, rx) = watch::channel(Arc::new(Counter::default()));
        let mut selection = Selection::new(create_selector(|s: &Counter| s.count, |c| *c), rx);
        drop(tx);
        assert_eq!(selection.changed().await, Err(StoreError::ChannelClosed));
    }

    #[tokio::test]
    async fn test_into_stream_yields_current_then_changes() {
        let (tx, rx) = watch::channel(Arc::new(Counter::default()));
        let selection = Selection::new(create_selector(|s: &Counter| s.count, |c| *c), rx);
        let mut stream = Box::pin(selection.into_stream());

        assert_eq!(stream.next().await, Some(0));
        tx.send_replace(Arc::new(Counter {
            count: 5,
            label: String::new(),
        }));
        let next = tokio::time::timeout(Duration::from_secs(1), stream.next()).await;
        assert_eq!(next, Ok(Some(5)));
    }
}
