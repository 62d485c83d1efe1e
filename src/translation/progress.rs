/*!
 * Periodic progress display for a translation run.
 *
 * The translator publishes `ProgressSnapshot`s on a `watch` channel; the
 * reporter task samples the latest one on a fixed interval and draws it with
 * an indicatif bar. Nothing is shared but the channel.
 */

use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;
use tokio::sync::{oneshot, watch};
use tokio::task::JoinHandle;

/// Default interval between redraws
pub const DEFAULT_PROGRESS_INTERVAL: Duration = Duration::from_millis(2000);

/// Captions translated so far out of the total
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProgressSnapshot {
    pub completed: usize,
    pub total: usize,
}

impl ProgressSnapshot {
    /// Snapshot at the start of a run over `total` captions
    pub fn start(total: usize) -> Self {
        Self { completed: 0, total }
    }
}

/// Background task drawing the progress bar
#[derive(Debug)]
pub struct ProgressReporter {
    handle: JoinHandle<ProgressSnapshot>,
    stop: oneshot::Sender<()>,
}

impl ProgressReporter {
    /// Start drawing snapshots from `receiver` every `interval`
    ///
    /// The task ends when the sender side is dropped or `finish` is called.
    pub fn spawn(receiver: watch::Receiver<ProgressSnapshot>, interval: Duration, visible: bool) -> Self {
        let bar = if visible {
            ProgressBar::new(receiver.borrow().total as u64)
        } else {
            ProgressBar::hidden()
        };
        let style = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} lines ({percent}%) ETA {eta}")
            .or_else(|_| ProgressStyle::default_bar().template("[{elapsed_precise}] [{bar:40}] {pos}/{len} ({percent}%)"))
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        bar.set_style(style.progress_chars("█▓▒░"));

        let (stop, stop_rx) = oneshot::channel();
        let handle = tokio::spawn(Self::run(receiver, bar, interval, stop_rx));

        Self { handle, stop }
    }

    async fn run(
        mut receiver: watch::Receiver<ProgressSnapshot>,
        bar: ProgressBar,
        interval: Duration,
        mut stop: oneshot::Receiver<()>,
    ) -> ProgressSnapshot {
        let mut ticker = tokio::time::interval(interval.max(Duration::from_millis(1)));
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let snapshot = *receiver.borrow();
                    Self::draw(&bar, snapshot);
                }
                changed = receiver.changed() => {
                    if changed.is_err() {
                        break;
                    }
                }
                _ = &mut stop => break,
            }
        }

        let last = *receiver.borrow();
        Self::draw(&bar, last);
        bar.finish();
        last
    }

    fn draw(bar: &ProgressBar, snapshot: ProgressSnapshot) {
        bar.set_length(snapshot.total as u64);
        bar.set_position(snapshot.completed as u64);
    }

    /// Stop the display and return the last snapshot it saw
    pub async fn finish(self) -> ProgressSnapshot {
        // The task may already have stopped on its own
        let _ = self.stop.send(());
        self.handle.await.unwrap_or_default()
    }
}
