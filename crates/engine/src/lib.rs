//! Map marker engine: keeps SDK markers in sync with an entity list, a
//! single highlight, and the SDK's asynchronous readiness.

pub mod config;
pub mod engine;
pub mod error;

pub use config::*;
pub use engine::*;
pub use error::*;

pub use foundation::coord::{CoordinateError, Position, normalize};
pub use layers::symbology::{CategoryIcons, IconResolver, IconSpec, IconVariant};
pub use scene::entity::{Entity, EntityId};
pub use scene::registry::RebuildSummary;
pub use scene::sdk::{MapSdk, RecordingSdk, SdkError};
pub use scene::viewport::{ViewState, compute_initial_view};
