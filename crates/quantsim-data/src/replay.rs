//! Bar replay for the simulated-live feed.

use std::time::Duration;

use tokio::sync::mpsc;
use tracing::debug;

use quantsim_core::types::Bar;

/// Spawn a task that replays `bars` in order onto a bounded channel with a
/// fixed inter-bar delay. The task stops when the receiver is dropped; the
/// channel closes when the replay is exhausted.
pub(crate) fn spawn_replay(
    bars: Vec<Bar>,
    interval: Duration,
    capacity: usize,
) -> mpsc::Receiver<Bar> {
    let (tx, rx) = mpsc::channel(capacity.max(1));

    tokio::spawn(async move {
        for bar in bars {
            tokio::time::sleep(interval).await;
            if tx.send(bar).await.is_err() {
                debug!("replay receiver dropped, stopping feed");
                return;
            }
        }
    });

    rx
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bar(ts: i64) -> Bar {
        Bar::new("TEST", ts, 100.0, 101.0, 99.0, 100.5, 1000.0)
    }

    #[tokio::test]
    async fn test_replay_preserves_order_and_closes() {
        let bars = vec![bar(1), bar(2), bar(3)];
        let mut rx = spawn_replay(bars, Duration::from_millis(1), 2);

        let mut seen = Vec::new();
        while let Some(bar) = rx.recv().await {
            seen.push(bar.timestamp);
        }
        assert_eq!(seen, vec![1, 2, 3]);
    }
}
