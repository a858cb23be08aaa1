//! Phase timing.

use std::time::Instant;

/// Measures how long a phase of the build takes.
pub struct Timer {
    name: String,
    start: Instant,
}

impl Timer {
    pub fn start(name: &str) -> Self {
        Self {
            name: name.to_string(),
            start: Instant::now(),
        }
    }

    /// Log the elapsed time at debug level.
    pub fn finish(self) {
        let secs = self.start.elapsed().as_secs_f64();
        if secs >= 60.0 {
            tracing::debug!("[{:.1}m] {}", secs / 60.0, self.name);
        } else {
            tracing::debug!("[{:.1}s] {}", secs, self.name);
        }
    }
}
