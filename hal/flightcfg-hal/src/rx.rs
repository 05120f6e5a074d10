//! Receiver capture control
//!
//! Receiver pulse capture runs from edge interrupts. Flash erase/program
//! stalls the bus for milliseconds, so capture must be paused around every
//! configuration load and save.

/// Suspend/resume hook for interrupt-driven receiver capture
pub trait RxSignal {
    /// Stop consuming captured pulse widths
    fn suspend(&mut self);

    /// Resume capture after a store operation
    fn resume(&mut self);
}

/// No-op receiver control for boards without pulse capture and for tests
#[derive(Debug, Clone, Copy, Default)]
pub struct NoRxSignal;

impl RxSignal for NoRxSignal {
    fn suspend(&mut self) {}

    fn resume(&mut self) {}
}

impl<T: RxSignal + ?Sized> RxSignal for &mut T {
    fn suspend(&mut self) {
        (**self).suspend();
    }

    fn resume(&mut self) {
        (**self).resume();
    }
}
