pub mod entity;
pub mod highlight;
pub mod info_window;
pub mod registry;
pub mod sdk;
pub mod session;
pub mod viewport;

pub use entity::*;
pub use session::*;
