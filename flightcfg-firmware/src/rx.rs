//! Receiver capture gate
//!
//! Pulse capture drops edges while the flag is set. The store raises it
//! around every flash load and save.

use flightcfg_hal::RxSignal;
use portable_atomic::{AtomicBool, Ordering};

static CAPTURE_SUSPENDED: AtomicBool = AtomicBool::new(false);

/// Whether capture is currently paused
pub fn capture_suspended() -> bool {
    CAPTURE_SUSPENDED.load(Ordering::Acquire)
}

/// [`RxSignal`] backed by the global capture flag
#[derive(Debug, Default)]
pub struct CaptureGate;

impl RxSignal for CaptureGate {
    fn suspend(&mut self) {
        CAPTURE_SUSPENDED.store(true, Ordering::Release);
    }

    fn resume(&mut self) {
        CAPTURE_SUSPENDED.store(false, Ordering::Release);
    }
}
