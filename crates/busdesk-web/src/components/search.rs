//! Debounced search input
//!
//! Keystrokes go into a background task that re-arms a single timer on every
//! input. Only the last keystroke's timer fires, so a burst of typing yields
//! exactly one query carrying the final text.

use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{Instant, sleep};
use tracing::debug;

/// Default quiet period before a search is issued
pub const DEFAULT_SEARCH_DEBOUNCE: Duration = Duration::from_millis(800);

/// Handle to a running search debouncer task
///
/// Dropping the handle stops the task; a pending query is discarded.
#[derive(Debug)]
pub struct SearchDebouncer {
    input: mpsc::UnboundedSender<String>,
    task: JoinHandle<()>,
}

impl SearchDebouncer {
    /// Spawn the debouncer on the current tokio runtime
    ///
    /// Settled queries are sent to `output`.
    #[must_use]
    pub fn spawn(delay: Duration, output: mpsc::UnboundedSender<String>) -> Self {
        let (input, keystrokes) = mpsc::unbounded_channel();
        let task = tokio::spawn(run(delay, keystrokes, output));
        Self { input, task }
    }

    /// Spawn a debouncer together with the receiver of its settled queries
    #[must_use]
    pub fn channel(delay: Duration) -> (Self, mpsc::UnboundedReceiver<String>) {
        let (output, queries) = mpsc::unbounded_channel();
        (Self::spawn(delay, output), queries)
    }

    /// Feed the current content of the search box
    pub fn input(&self, text: impl Into<String>) {
        if self.input.send(text.into()).is_err() {
            debug!("search debouncer already stopped, dropping keystroke");
        }
    }
}

impl Drop for SearchDebouncer {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn run(
    delay: Duration,
    mut keystrokes: mpsc::UnboundedReceiver<String>,
    output: mpsc::UnboundedSender<String>,
) {
    let mut pending: Option<String> = None;
    let timer = sleep(delay);
    tokio::pin!(timer);

    loop {
        tokio::select! {
            keystroke = keystrokes.recv() => {
                let Some(text) = keystroke else { break };
                pending = Some(text);
                timer.as_mut().reset(Instant::now() + delay);
            }
            () = &mut timer, if pending.is_some() => {
                if let Some(term) = pending.take() {
                    debug!(term = %term, "search settled");
                    if output.send(term).is_err() {
                        break;
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tokio::time::timeout;

    #[tokio::test(start_paused = true)]
    async fn test_burst_emits_final_text_once() {
        let (debouncer, mut queries) = SearchDebouncer::channel(DEFAULT_SEARCH_DEBOUNCE);

        debouncer.input("b");
        debouncer.input("bu");
        debouncer.input("bus");

        let early = timeout(Duration::from_millis(799), queries.recv()).await;
        assert!(early.is_err(), "search fired before the quiet period");

        let term = timeout(Duration::from_millis(2), queries.recv())
            .await
            .expect("search should fire after 800ms")
            .expect("channel open");
        assert_eq!(term, "bus");

        let again = timeout(Duration::from_secs(5), queries.recv()).await;
        assert!(again.is_err(), "search fired twice");
    }

    #[tokio::test(start_paused = true)]
    async fn test_each_keystroke_restarts_the_timer() {
        let (debouncer, mut queries) = SearchDebouncer::channel(DEFAULT_SEARCH_DEBOUNCE);

        debouncer.input("g");
        sleep(Duration::from_millis(500)).await;
        debouncer.input("go");
        sleep(Duration::from_millis(500)).await;
        debouncer.input("gon");

        let early = timeout(Duration::from_millis(799), queries.recv()).await;
        assert!(early.is_err());

        let term = timeout(Duration::from_millis(2), queries.recv())
            .await
            .expect("fires")
            .expect("open");
        assert_eq!(term, "gon");
    }

    #[tokio::test(start_paused = true)]
    async fn test_separate_bursts_emit_separately() {
        let (debouncer, mut queries) = SearchDebouncer::channel(DEFAULT_SEARCH_DEBOUNCE);

        debouncer.input("adama");
        let first = timeout(Duration::from_secs(1), queries.recv())
            .await
            .expect("fires")
            .expect("open");

        debouncer.input("");
        let second = timeout(Duration::from_secs(1), queries.recv())
            .await
            .expect("fires")
            .expect("open");

        assert_eq!(first, "adama");
        assert_eq!(second, "");
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_discards_pending_query() {
        let (debouncer, mut queries) = SearchDebouncer::channel(DEFAULT_SEARCH_DEBOUNCE);
        debouncer.input("dire");
        drop(debouncer);

        let result = timeout(Duration::from_secs(2), queries.recv()).await;
        assert!(matches!(result, Ok(None)), "expected closed channel, got {result:?}");
    }
}
