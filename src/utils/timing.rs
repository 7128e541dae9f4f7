//! Wall-time accumulation for the instrumented solve phases.
//!
//! Every kernel call in the engine is wrapped in a [`ScopedTimer`], which
//! adds its elapsed time to one named accumulator when dropped. Totals are
//! reported after the solve; the accumulation never feeds back into the
//! numeric results.

use std::time::{Duration, Instant};

/// Elapsed-time totals per phase and per kernel.
#[derive(Clone, Debug, Default)]
pub struct Timings {
    pub io: Duration,
    pub converting: Duration,
    pub solve: Duration,
    pub matvec: Duration,
    pub axpy: Duration,
    pub xpay: Duration,
    pub dot: Duration,
    pub preconditioner: Duration,
}

/// The accumulator a [`ScopedTimer`] adds into.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TimeCategory {
    Io,
    Converting,
    Solve,
    MatVec,
    Axpy,
    Xpay,
    Dot,
    Preconditioner,
}

impl Timings {
    /// Start a timer that adds its elapsed time to `category` when dropped.
    pub fn scoped(&mut self, category: TimeCategory) -> ScopedTimer<'_> {
        let slot = match category {
            TimeCategory::Io => &mut self.io,
            TimeCategory::Converting => &mut self.converting,
            TimeCategory::Solve => &mut self.solve,
            TimeCategory::MatVec => &mut self.matvec,
            TimeCategory::Axpy => &mut self.axpy,
            TimeCategory::Xpay => &mut self.xpay,
            TimeCategory::Dot => &mut self.dot,
            TimeCategory::Preconditioner => &mut self.preconditioner,
        };
        ScopedTimer { start: Instant::now(), slot }
    }
}

/// Drop guard crediting the time since its creation to one accumulator.
pub struct ScopedTimer<'a> {
    start: Instant,
    slot: &'a mut Duration,
}

impl Drop for ScopedTimer<'_> {
    fn drop(&mut self) {
        *self.slot += self.start.elapsed();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scoped_timer_accumulates_on_drop() {
        let mut timings = Timings::default();
        {
            let _t = timings.scoped(TimeCategory::MatVec);
            std::thread::sleep(Duration::from_millis(5));
        }
        {
            let _t = timings.scoped(TimeCategory::MatVec);
            std::thread::sleep(Duration::from_millis(5));
        }
        assert!(timings.matvec >= Duration::from_millis(10));
        assert_eq!(timings.dot, Duration::ZERO);
    }
}
