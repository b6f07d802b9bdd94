//! Progress reporting hooks
//!
//! Progress is purely observational: the converter reports how far it got and
//! never waits on or reacts to the observer.

/// Observer of a long-running conversion
pub trait Progress {
    /// Start a new task with a label
    fn init(&mut self, label: &str);

    /// Set the completed fraction (0.0 to 1.0)
    fn set(&mut self, fraction: f64);

    /// Report `processed` out of `total` units done
    fn update(&mut self, processed: u64, total: u64) {
        if total > 0 {
            self.set((processed as f64 / total as f64).min(1.0));
        }
    }

    /// The task is complete
    fn finish(&mut self);
}

/// Progress observer that ignores every report
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl Progress for NoProgress {
    fn init(&mut self, _label: &str) {}
    fn set(&mut self, _fraction: f64) {}
    fn finish(&mut self) {}
}
