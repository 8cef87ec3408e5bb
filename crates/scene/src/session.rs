use std::collections::HashMap;

use foundation::coord::Position;
use layers::symbology::IconSpec;

use crate::entity::EntityId;
use crate::highlight::HighlightState;
use crate::sdk::MapSdk;

/// A marker on the map together with what the engine needs to drive it.
#[derive(Debug)]
pub struct PlacedMarker<M> {
    pub handle: M,
    pub position: Position,
    pub category_code: String,
}

/// All per-mount map state, owned by exactly one engine.
///
/// Invariant: after [`crate::registry::teardown`], no markers or info windows
/// remain and the highlight is [`HighlightState::Idle`].
pub struct MapSession<S: MapSdk> {
    pub(crate) map: Option<S::Map>,
    pub(crate) markers_by_entity_id: HashMap<EntityId, PlacedMarker<S::Marker>>,
    pub(crate) info_windows_by_entity_id: HashMap<EntityId, S::InfoWindow>,
    pub(crate) original_icon_by_entity_id: HashMap<EntityId, IconSpec>,
    pub(crate) highlight: HighlightState,
    pub(crate) sdk_ready: bool,
}

impl<S: MapSdk> MapSession<S> {
    pub fn new() -> Self {
        Self {
            map: None,
            markers_by_entity_id: HashMap::new(),
            info_windows_by_entity_id: HashMap::new(),
            original_icon_by_entity_id: HashMap::new(),
            highlight: HighlightState::Idle,
            sdk_ready: false,
        }
    }

    pub fn map(&self) -> Option<&S::Map> {
        self.map.as_ref()
    }

    pub fn attach_map(&mut self, map: S::Map) {
        self.map = Some(map);
    }

    /// Drops the map handle. Markers must already be torn down.
    pub fn take_map(&mut self) -> Option<S::Map> {
        self.map.take()
    }

    pub fn set_sdk_ready(&mut self, ready: bool) {
        self.sdk_ready = ready;
    }

    /// True once the SDK is ready and a map exists to receive commands.
    pub fn is_live(&self) -> bool {
        self.sdk_ready && self.map.is_some()
    }

    pub fn marker(&self, id: &EntityId) -> Option<&PlacedMarker<S::Marker>> {
        self.markers_by_entity_id.get(id)
    }

    pub fn marker_count(&self) -> usize {
        self.markers_by_entity_id.len()
    }

    pub fn info_window(&self, id: &EntityId) -> Option<&S::InfoWindow> {
        self.info_windows_by_entity_id.get(id)
    }

    pub fn info_window_count(&self) -> usize {
        self.info_windows_by_entity_id.len()
    }

    pub fn original_icon(&self, id: &EntityId) -> Option<&IconSpec> {
        self.original_icon_by_entity_id.get(id)
    }

    pub fn highlight(&self) -> &HighlightState {
        &self.highlight
    }

    pub fn highlighted(&self) -> Option<&EntityId> {
        self.highlight.entity()
    }

    /// Positions of every placed marker, ordered by entity id.
    pub fn positions(&self) -> Vec<Position> {
        let mut placed: Vec<_> = self.markers_by_entity_id.iter().collect();
        placed.sort_by(|a, b| a.0.cmp(b.0));
        placed.into_iter().map(|(_, m)| m.position).collect()
    }
}

impl<S: MapSdk> Default for MapSession<S> {
    fn default() -> Self {
        Self::new()
    }
}
