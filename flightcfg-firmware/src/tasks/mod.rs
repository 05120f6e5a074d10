//! Embassy async tasks
//!
//! Each task runs independently and communicates via signals.

pub mod button;
pub mod config;
pub mod rx_capture;

pub use button::button_task;
pub use config::config_task;
pub use rx_capture::rx_capture_task;
