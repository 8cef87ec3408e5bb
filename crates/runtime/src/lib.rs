pub mod event_bus;
pub mod readiness;
pub mod ready_queue;

pub use event_bus::*;
pub use readiness::*;
pub use ready_queue::*;
