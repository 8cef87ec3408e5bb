use std::collections::{BTreeMap, HashSet};

use foundation::coord::Position;
use layers::symbology::IconSpec;
use serde::Serialize;

use super::{MapSdk, SdkError};
use crate::entity::EntityId;
use crate::info_window::InfoWindowContent;
use crate::viewport::ViewState;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct RecordedHandle(pub u32);

/// One call made through the capability interface, in call order.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "call", rename_all = "snake_case")]
pub enum SdkCall {
    CreateMap {
        map: RecordedHandle,
        view: ViewState,
    },
    SetCenter {
        map: RecordedHandle,
        center: Position,
    },
    SetZoom {
        map: RecordedHandle,
        zoom: u8,
    },
    CreateMarker {
        marker: RecordedHandle,
        position: Position,
    },
    SetIcon {
        marker: RecordedHandle,
        width: u32,
        height: u32,
    },
    DetachMarker {
        marker: RecordedHandle,
    },
    AddClickListener {
        marker: RecordedHandle,
        entity: EntityId,
    },
    CreateInfoWindow {
        window: RecordedHandle,
        title: String,
    },
    OpenInfoWindow {
        window: RecordedHandle,
        marker: RecordedHandle,
    },
    CloseInfoWindow {
        window: RecordedHandle,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecordedMarker {
    pub position: Position,
    pub icon: IconSpec,
    pub attached: bool,
    pub listener: Option<EntityId>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecordedInfoWindow {
    pub content: InfoWindowContent,
    pub open: bool,
}

/// In-memory [`MapSdk`] that keeps the resulting map state and a call log.
///
/// Used for headless planning and as the fake SDK in tests.
#[derive(Debug, Default)]
pub struct RecordingSdk {
    next_handle: u32,
    calls: Vec<SdkCall>,
    views: BTreeMap<RecordedHandle, ViewState>,
    markers: BTreeMap<RecordedHandle, RecordedMarker>,
    info_windows: BTreeMap<RecordedHandle, RecordedInfoWindow>,
    failing_positions: Vec<Position>,
    failing_info_windows: HashSet<String>,
}

impl RecordingSdk {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes `create_marker` fail for markers placed exactly at `position`.
    pub fn fail_markers_at(&mut self, position: Position) {
        self.failing_positions.push(position);
    }

    /// Makes `create_info_window` fail for windows titled `title`.
    pub fn fail_info_windows_titled(&mut self, title: impl Into<String>) {
        self.failing_info_windows.insert(title.into());
    }

    pub fn calls(&self) -> &[SdkCall] {
        &self.calls
    }

    pub fn clear_calls(&mut self) {
        self.calls.clear();
    }

    pub fn view(&self, map: RecordedHandle) -> Option<ViewState> {
        self.views.get(&map).copied()
    }

    pub fn marker(&self, marker: RecordedHandle) -> Option<&RecordedMarker> {
        self.markers.get(&marker)
    }

    pub fn attached_markers(&self) -> impl Iterator<Item = (RecordedHandle, &RecordedMarker)> {
        self.markers
            .iter()
            .filter(|(_, m)| m.attached)
            .map(|(h, m)| (*h, m))
    }

    pub fn info_window(&self, window: RecordedHandle) -> Option<&RecordedInfoWindow> {
        self.info_windows.get(&window)
    }

    pub fn open_info_windows(&self) -> impl Iterator<Item = (RecordedHandle, &RecordedInfoWindow)> {
        self.info_windows
            .iter()
            .filter(|(_, w)| w.open)
            .map(|(h, w)| (*h, w))
    }

    fn alloc(&mut self) -> RecordedHandle {
        let h = RecordedHandle(self.next_handle);
        self.next_handle = self.next_handle.wrapping_add(1);
        h
    }
}

impl MapSdk for RecordingSdk {
    type Map = RecordedHandle;
    type Marker = RecordedHandle;
    type InfoWindow = RecordedHandle;

    fn create_map(&mut self, view: ViewState) -> Result<Self::Map, SdkError> {
        let map = self.alloc();
        self.views.insert(map, view);
        self.calls.push(SdkCall::CreateMap { map, view });
        Ok(map)
    }

    fn set_center(&mut self, map: &Self::Map, center: Position) {
        if let Some(view) = self.views.get_mut(map) {
            view.center = center;
        }
        self.calls.push(SdkCall::SetCenter { map: *map, center });
    }

    fn set_zoom(&mut self, map: &Self::Map, zoom: u8) {
        if let Some(view) = self.views.get_mut(map) {
            view.zoom = zoom;
        }
        self.calls.push(SdkCall::SetZoom { map: *map, zoom });
    }

    fn create_marker(
        &mut self,
        _map: &Self::Map,
        position: Position,
        icon: &IconSpec,
    ) -> Result<Self::Marker, SdkError> {
        if self.failing_positions.contains(&position) {
            return Err(SdkError::call("create_marker", format!("rejected {position}")));
        }
        let marker = self.alloc();
        self.markers.insert(
            marker,
            RecordedMarker {
                position,
                icon: icon.clone(),
                attached: true,
                listener: None,
            },
        );
        self.calls.push(SdkCall::CreateMarker { marker, position });
        Ok(marker)
    }

    fn set_icon(&mut self, marker: &Self::Marker, icon: &IconSpec) {
        if let Some(m) = self.markers.get_mut(marker) {
            m.icon = icon.clone();
        }
        self.calls.push(SdkCall::SetIcon {
            marker: *marker,
            width: icon.width,
            height: icon.height,
        });
    }

    fn detach_marker(&mut self, marker: &Self::Marker) {
        if let Some(m) = self.markers.get_mut(marker) {
            m.attached = false;
            m.listener = None;
        }
        self.calls.push(SdkCall::DetachMarker { marker: *marker });
    }

    fn add_click_listener(&mut self, marker: &Self::Marker, entity: &EntityId) {
        if let Some(m) = self.markers.get_mut(marker) {
            m.listener = Some(entity.clone());
        }
        self.calls.push(SdkCall::AddClickListener {
            marker: *marker,
            entity: entity.clone(),
        });
    }

    fn create_info_window(
        &mut self,
        content: &InfoWindowContent,
    ) -> Result<Self::InfoWindow, SdkError> {
        if self.failing_info_windows.contains(&content.title) {
            return Err(SdkError::call("create_info_window", "rejected"));
        }
        let window = self.alloc();
        self.info_windows.insert(
            window,
            RecordedInfoWindow {
                content: content.clone(),
                open: false,
            },
        );
        self.calls.push(SdkCall::CreateInfoWindow {
            window,
            title: content.title.clone(),
        });
        Ok(window)
    }

    fn open_info_window(
        &mut self,
        window: &Self::InfoWindow,
        _map: &Self::Map,
        marker: &Self::Marker,
    ) {
        if let Some(w) = self.info_windows.get_mut(window) {
            w.open = true;
        }
        self.calls.push(SdkCall::OpenInfoWindow {
            window: *window,
            marker: *marker,
        });
    }

    fn close_info_window(&mut self, window: &Self::InfoWindow) {
        if let Some(w) = self.info_windows.get_mut(window) {
            w.open = false;
        }
        self.calls.push(SdkCall::CloseInfoWindow { window: *window });
    }
}
