pub mod sequential;
pub mod timer;

use std::time::{Duration, Instant};

/// Monotonic time since an arbitrary origin.
///
/// The benchmarks only ever subtract two readings, so any origin works. Tests
/// substitute clocks that advance in fixed steps.
pub trait Clock {
    fn now(&self) -> Duration;
}

impl<'a, C: Clock + ?Sized> Clock for &'a C {
    fn now(&self) -> Duration {
        (**self).now()
    }
}

pub struct SystemClock {
    origin: Instant,
}

impl Default for SystemClock {
    fn default() -> Self {
        SystemClock {
            origin: Instant::now(),
        }
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }
}

/// Operations per second. A zero `elapsed` gives `inf`.
pub fn throughput(operations: usize, elapsed: Duration) -> f64 {
    operations as f64 / elapsed.as_secs_f64()
}
