//! Capability interface for the third-party mapping SDK.
//!
//! The engine only ever talks to a map through [`MapSdk`]. A browser build
//! implements it over the SDK's global object; [`RecordingSdk`] implements it
//! in memory.

mod recording;

pub use recording::{RecordedHandle, RecordedInfoWindow, RecordedMarker, RecordingSdk, SdkCall};

use foundation::coord::Position;
use layers::symbology::IconSpec;
use thiserror::Error;

use crate::entity::EntityId;
use crate::info_window::InfoWindowContent;
use crate::viewport::ViewState;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SdkError {
    #[error("map SDK is not available: {0}")]
    Unavailable(String),
    #[error("map SDK call `{call}` failed: {message}")]
    Call { call: &'static str, message: String },
}

impl SdkError {
    pub fn call(call: &'static str, message: impl Into<String>) -> Self {
        SdkError::Call {
            call,
            message: message.into(),
        }
    }
}

/// Narrow set of map operations the engine needs.
///
/// Handles are owned by the caller; dropping one does not remove anything
/// from the map, `detach_marker`/`close_info_window` do.
pub trait MapSdk {
    type Map;
    type Marker;
    type InfoWindow;

    fn create_map(&mut self, view: ViewState) -> Result<Self::Map, SdkError>;
    fn set_center(&mut self, map: &Self::Map, center: Position);
    fn set_zoom(&mut self, map: &Self::Map, zoom: u8);

    fn create_marker(
        &mut self,
        map: &Self::Map,
        position: Position,
        icon: &IconSpec,
    ) -> Result<Self::Marker, SdkError>;
    fn set_icon(&mut self, marker: &Self::Marker, icon: &IconSpec);
    /// Removes the marker from its map along with its click listener.
    fn detach_marker(&mut self, marker: &Self::Marker);

    /// Registers a click handler that reports `entity` back to the engine.
    fn add_click_listener(&mut self, marker: &Self::Marker, entity: &EntityId);

    fn create_info_window(
        &mut self,
        content: &InfoWindowContent,
    ) -> Result<Self::InfoWindow, SdkError>;
    fn open_info_window(
        &mut self,
        window: &Self::InfoWindow,
        map: &Self::Map,
        marker: &Self::Marker,
    );
    fn close_info_window(&mut self, window: &Self::InfoWindow);
}
