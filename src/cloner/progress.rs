use crate::error::{CloneError, Result};
use crossbeam::channel::Receiver;
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

/// Events reported by concurrent copy workers.
pub enum CopyEvent {
    /// one document landed in the target collection.
    Inserted {
        /// collection the document was written into.
        coll: String,
    },
    /// a worker hit a fatal error, the whole run must stop.
    Failed(CloneError),
}

/// Single owner of the global progress counter.
///
/// Every copy worker reports through one channel into [ProgressTracker::track],
/// so counter updates are serialized without any shared lock. The run is
/// complete exactly when the counter first reaches the total computed at
/// scan time.
pub struct ProgressTracker {
    bar: ProgressBar,
    total: u64,
}

impl ProgressTracker {
    /// create a tracker for `total` documents, rendering to stdout.
    pub fn new(total: u64) -> ProgressTracker {
        let bar = ProgressBar::with_draw_target(Some(total), ProgressDrawTarget::stdout());
        bar.set_style(
            ProgressStyle::with_template(
                "[{bar:40}] {percent}% | ETA: {eta} | {pos}/{len} | Cloning: {msg}",
            )
            .unwrap()
            .progress_chars("##-"),
        );
        ProgressTracker { bar, total }
    }

    /// Consume events until the run completes or fails.
    ///
    /// Returns the number of documents inserted on success. If every sender
    /// hangs up before the total is reached (the source shrank between scan
    /// and copy), an [CloneError::Incomplete] error is returned instead of
    /// waiting forever.
    pub fn track(self, events: &Receiver<CopyEvent>) -> Result<u64> {
        if self.total == 0 {
            self.bar.finish_with_message("DONE");
            return Ok(0);
        }

        let mut inserted: u64 = 0;
        while let Ok(event) = events.recv() {
            match event {
                CopyEvent::Inserted { coll } => {
                    inserted += 1;
                    self.bar.set_message(coll);
                    self.bar.inc(1);
                    if inserted == self.total {
                        self.bar.set_message("DONE");
                        self.bar.finish();
                        return Ok(inserted);
                    }
                }
                CopyEvent::Failed(e) => {
                    self.bar.abandon();
                    return Err(e);
                }
            }
        }

        self.bar.abandon();
        Err(CloneError::Incomplete {
            inserted,
            expected: self.total,
        })
    }
}
