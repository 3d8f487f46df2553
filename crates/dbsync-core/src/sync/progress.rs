//! Progress reporting
//!
//! Workers never call a sink directly. Each completed object produces one
//! [`ProgressTick`] that travels over a channel to the orchestrating thread,
//! which forwards it to the single [`ProgressSink`].

/// One completed object out of `total`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressTick {
    pub step: usize,
    pub total: usize,
}

impl ProgressTick {
    pub fn completed(total: usize) -> Self {
        Self { step: 1, total }
    }
}

/// Consumer of progress ticks.
pub trait ProgressSink {
    fn report(&mut self, tick: ProgressTick);
}

/// Sink that drops every tick.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn report(&mut self, _tick: ProgressTick) {}
}

/// Records every tick in arrival order.
impl ProgressSink for Vec<ProgressTick> {
    fn report(&mut self, tick: ProgressTick) {
        self.push(tick);
    }
}

/// Position/maximum pair driven by ticks.
///
/// The maximum is re-based whenever a tick carries a different total; the
/// position only ever grows.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ProgressCounter {
    position: usize,
    maximum: usize,
}

impl ProgressCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn apply(&mut self, tick: ProgressTick) {
        if tick.total != self.maximum {
            self.maximum = tick.total;
        }
        self.position += tick.step;
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn maximum(&self) -> usize {
        self.maximum
    }

    pub fn is_complete(&self) -> bool {
        self.maximum > 0 && self.position >= self.maximum
    }
}

impl ProgressSink for ProgressCounter {
    fn report(&mut self, tick: ProgressTick) {
        self.apply(tick);
    }
}
