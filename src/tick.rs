//! Tick source used to time pulse widths.
//!
//! The protocol thresholds are expressed in ticks and assume one tick is
//! close to one microsecond.

/// A count of tick periods.
pub type Ticks = u32;

/// A resettable, monotonically non-decreasing counter with a fixed tick period.
pub trait TickSource {
    /// Rearms the counter at zero.
    fn reset(&mut self);

    /// Ticks elapsed since the last [`reset`](TickSource::reset).
    fn now(&mut self) -> Ticks;
}

impl<T: TickSource + ?Sized> TickSource for &mut T {
    fn reset(&mut self) {
        T::reset(self)
    }

    fn now(&mut self) -> Ticks {
        T::now(self)
    }
}

/// Turns a free-running hardware counter into a [`TickSource`].
///
/// `reset` only records a baseline, the hardware counter keeps running.
/// Elapsed time is computed with wrapping subtraction, so the raw counter may
/// overflow during a measurement as long as a single window is shorter than
/// its full range.
pub struct FreeRunning<C> {
    counter: C,
    prescaler: u32,
    baseline: u32,
}

impl<C> FreeRunning<C>
where
    C: FnMut() -> u32,
{
    /// Wraps a counter that already runs at one count per tick.
    pub fn new(counter: C) -> Self {
        Self::with_prescaler(counter, 1)
    }

    /// Wraps a counter that runs `prescaler` counts per tick, e.g. a CPU cycle
    /// counter at 64 MHz with `prescaler = 64` gives microsecond ticks.
    ///
    /// A prescaler of zero is treated as one.
    pub fn with_prescaler(mut counter: C, prescaler: u32) -> Self {
        let baseline = counter();
        Self {
            counter,
            prescaler: prescaler.max(1),
            baseline,
        }
    }
}

impl<C> TickSource for FreeRunning<C>
where
    C: FnMut() -> u32,
{
    fn reset(&mut self) {
        self.baseline = (self.counter)();
    }

    fn now(&mut self) -> Ticks {
        (self.counter)().wrapping_sub(self.baseline) / self.prescaler
    }
}
