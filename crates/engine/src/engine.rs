//! The map engine and the command surface exposed to the rest of the page.
//!
//! Commands are gated on SDK readiness: until the SDK has loaded and a map
//! exists, they are dropped and reported as [`Dispatch::NotReady`]. Callers
//! that need guaranteed delivery use [`MapEngine::when_ready`].

use foundation::coord::Position;
use layers::symbology::{CategoryIcons, IconResolver};
use runtime::{EventLog, ReadyQueue};
use scene::entity::{Entity, EntityId};
use scene::highlight::{self, Transition};
use scene::info_window::{self, InfoWindowTemplate};
use scene::registry::{self, RebuildSummary};
use scene::sdk::MapSdk;
use scene::session::MapSession;
use scene::viewport::{ViewState, compute_initial_view};
use tracing::{debug, info, warn};

use crate::config::EngineConfig;
use crate::error::EngineError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineStatus {
    WaitingForSdk,
    Ready,
    /// The map area shows an error instead of a map.
    Failed(EngineError),
}

/// What happened to a command.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Dispatch {
    Applied,
    /// Valid, but the map was already in the requested state.
    Unchanged,
    /// Dropped: the SDK or the map is not ready yet.
    NotReady,
    /// Dropped: no marker exists for the id.
    UnknownEntity,
}

impl Dispatch {
    pub fn was_dropped(self) -> bool {
        matches!(self, Dispatch::NotReady | Dispatch::UnknownEntity)
    }
}

impl From<Transition> for Dispatch {
    fn from(t: Transition) -> Self {
        match t {
            Transition::Changed => Dispatch::Applied,
            Transition::Unchanged => Dispatch::Unchanged,
            Transition::UnknownEntity => Dispatch::UnknownEntity,
        }
    }
}

pub struct MapEngine<S: MapSdk, R: IconResolver = CategoryIcons> {
    config: EngineConfig,
    icons: R,
    template: InfoWindowTemplate,
    sdk: Option<S>,
    session: MapSession<S>,
    entities: Vec<Entity>,
    status: EngineStatus,
    ready_queue: ReadyQueue<MapEngine<S, R>>,
    events: EventLog,
    last_rebuild: Option<RebuildSummary>,
}

impl<S: MapSdk> MapEngine<S> {
    pub fn with_config(config: EngineConfig) -> Self {
        Self::new(config, CategoryIcons::new())
    }
}

impl<S: MapSdk, R: IconResolver> MapEngine<S, R> {
    /// Mounts an engine. Without an API key it starts in the failed state and
    /// never requests the SDK.
    pub fn new(config: EngineConfig, icons: R) -> Self {
        let template = InfoWindowTemplate::new(config.detail_base_url.clone());
        let mut events = EventLog::new();
        let status = match config.credential() {
            Ok(_) => {
                events.emit("mounted", "waiting for map SDK");
                EngineStatus::WaitingForSdk
            }
            Err(err) => {
                warn!(%err, "map engine mounted without credential");
                events.emit("credential_missing", err.to_string());
                EngineStatus::Failed(err)
            }
        };
        Self {
            config,
            icons,
            template,
            sdk: None,
            session: MapSession::new(),
            entities: Vec::new(),
            status,
            ready_queue: ReadyQueue::new(),
            events,
            last_rebuild: None,
        }
    }

    pub fn status(&self) -> &EngineStatus {
        &self.status
    }

    pub fn is_ready(&self) -> bool {
        self.status == EngineStatus::Ready && self.sdk.is_some() && self.session.is_live()
    }

    /// Message to render in place of the map, if the engine has failed.
    pub fn error_message(&self) -> Option<String> {
        match &self.status {
            EngineStatus::Failed(err) => Some(err.to_string()),
            _ => None,
        }
    }

    pub fn sdk_script_url(&self) -> Result<String, EngineError> {
        self.config.sdk_script_url()
    }

    pub fn session(&self) -> &MapSession<S> {
        &self.session
    }

    pub fn sdk(&self) -> Option<&S> {
        self.sdk.as_ref()
    }

    pub fn sdk_mut(&mut self) -> Option<&mut S> {
        self.sdk.as_mut()
    }

    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    pub fn events(&self) -> &EventLog {
        &self.events
    }

    pub fn last_rebuild(&self) -> Option<RebuildSummary> {
        self.last_rebuild
    }

    /// Replaces the entity list. When the map is live this rebuilds every
    /// marker and re-fits the view; otherwise the list is kept for later.
    pub fn set_entities(&mut self, entities: Vec<Entity>) -> Option<RebuildSummary> {
        self.entities = entities;
        if !self.is_ready() {
            debug!(
                entities = self.entities.len(),
                "entities stored until the map is ready"
            );
            return None;
        }
        let summary = self.rebuild_markers();
        self.fit_view(None);
        Some(summary)
    }

    /// Readiness callback: the SDK's capability object is now usable.
    ///
    /// Builds the map and the first session, then releases queued
    /// `when_ready` callbacks.
    pub fn sdk_loaded(&mut self, mut sdk: S) -> Result<RebuildSummary, EngineError> {
        if let EngineStatus::Failed(err) = &self.status {
            return Err(err.clone());
        }
        if self.sdk.is_some() {
            debug!("map SDK already attached");
            return Ok(self.last_rebuild.unwrap_or_default());
        }

        let view = self.initial_view();
        let map = match sdk.create_map(view) {
            Ok(map) => map,
            Err(err) => {
                let err = EngineError::from(err);
                self.fail(err.clone());
                return Err(err);
            }
        };
        self.session.attach_map(map);
        self.session.set_sdk_ready(true);
        self.sdk = Some(sdk);
        self.status = EngineStatus::Ready;

        let summary = self.rebuild_markers();
        let view = self.fit_view(Some(view));
        info!(zoom = view.zoom, center = %view.center, "map created");
        self.events
            .emit("sdk_ready", format!("map at {} zoom {}", view.center, view.zoom));
        self.run_ready_callbacks();
        Ok(summary)
    }

    /// The SDK script failed to load. Not retried.
    pub fn sdk_failed(&mut self, reason: impl Into<String>) {
        self.fail(EngineError::SdkLoadFailure(reason.into()));
    }

    /// Tears the session down and releases the SDK handle.
    pub fn unmount(&mut self) {
        if let Some(sdk) = self.sdk.as_mut() {
            registry::teardown(&mut self.session, sdk);
        }
        self.session.take_map();
        self.session.set_sdk_ready(false);
        self.sdk = None;
        self.ready_queue.clear();
        self.last_rebuild = None;
        if self.status == EngineStatus::Ready {
            self.status = EngineStatus::WaitingForSdk;
        }
        self.events.emit("unmounted", "session torn down");
    }

    /// Runs `callback` now if the map is live, otherwise once it becomes live.
    pub fn when_ready(&mut self, callback: impl FnOnce(&mut Self) + 'static) {
        if self.is_ready() {
            callback(self);
        } else {
            self.ready_queue.push(callback);
        }
    }

    pub fn pending_ready_callbacks(&self) -> usize {
        self.ready_queue.len()
    }

    /// Pans the map to the marker of `id`.
    pub fn move_to_marker(&mut self, id: &str) -> Dispatch {
        if !self.is_ready() {
            return self.dropped("move_to_marker", Dispatch::NotReady);
        }
        let Some(position) = self.session.marker(&EntityId::from(id)).map(|m| m.position) else {
            return self.dropped("move_to_marker", Dispatch::UnknownEntity);
        };
        self.center_on(position)
    }

    pub fn set_center(&mut self, longitude: f64, latitude: f64) -> Dispatch {
        if !self.is_ready() {
            return self.dropped("set_center", Dispatch::NotReady);
        }
        self.center_on(Position::new(longitude, latitude))
    }

    pub fn highlight_marker(&mut self, id: &str) -> Dispatch {
        if !self.is_ready() {
            return self.dropped("highlight_marker", Dispatch::NotReady);
        }
        let Some(sdk) = self.sdk.as_mut() else {
            return self.dropped("highlight_marker", Dispatch::NotReady);
        };
        let outcome: Dispatch =
            highlight::highlight(&mut self.session, sdk, &self.icons, &EntityId::from(id)).into();
        if outcome.was_dropped() {
            return self.dropped("highlight_marker", outcome);
        }
        outcome
    }

    pub fn unhighlight_marker(&mut self) -> Dispatch {
        if !self.is_ready() {
            return self.dropped("unhighlight_marker", Dispatch::NotReady);
        }
        let Some(sdk) = self.sdk.as_mut() else {
            return self.dropped("unhighlight_marker", Dispatch::NotReady);
        };
        highlight::unhighlight(&mut self.session, sdk).into()
    }

    /// Click routed back from the SDK: shows this marker's info window only.
    pub fn marker_clicked(&mut self, id: &str) -> Dispatch {
        if !self.is_ready() {
            return self.dropped("marker_clicked", Dispatch::NotReady);
        }
        let Some(sdk) = self.sdk.as_mut() else {
            return self.dropped("marker_clicked", Dispatch::NotReady);
        };
        if info_window::activate(&self.session, sdk, &EntityId::from(id)) {
            Dispatch::Applied
        } else {
            self.dropped("marker_clicked", Dispatch::UnknownEntity)
        }
    }

    fn center_on(&mut self, center: Position) -> Dispatch {
        match (self.sdk.as_mut(), self.session.map()) {
            (Some(sdk), Some(map)) => {
                sdk.set_center(map, center);
                Dispatch::Applied
            }
            _ => self.dropped("set_center", Dispatch::NotReady),
        }
    }

    /// View the map is constructed with, before any marker exists.
    fn initial_view(&self) -> ViewState {
        let positions: Vec<Position> = self
            .entities
            .iter()
            .filter_map(|e| e.position().ok())
            .collect();
        compute_initial_view(&positions)
    }

    /// Fits the map to the markers actually placed. Entities that were
    /// skipped (duplicates, SDK rejections) do not pull the view.
    fn fit_view(&mut self, current: Option<ViewState>) -> ViewState {
        let view = compute_initial_view(&self.session.positions());
        if current == Some(view) {
            return view;
        }
        if let (Some(sdk), Some(map)) = (self.sdk.as_mut(), self.session.map()) {
            sdk.set_center(map, view.center);
            sdk.set_zoom(map, view.zoom);
        }
        view
    }

    fn rebuild_markers(&mut self) -> RebuildSummary {
        let Some(sdk) = self.sdk.as_mut() else {
            return RebuildSummary::default();
        };
        let summary = registry::rebuild(
            &mut self.session,
            sdk,
            &self.icons,
            &self.template,
            &self.entities,
        );
        self.events.emit(
            "session_built",
            format!(
                "{} placed, {} without coordinates, {} failed",
                summary.placed, summary.skipped_unresolved, summary.failed
            ),
        );
        self.last_rebuild = Some(summary);
        summary
    }

    fn run_ready_callbacks(&mut self) {
        for callback in self.ready_queue.take() {
            callback(self);
        }
    }

    fn fail(&mut self, err: EngineError) {
        warn!(%err, "map engine failed");
        self.events.emit("failed", err.to_string());
        self.ready_queue.clear();
        self.status = EngineStatus::Failed(err);
    }

    fn dropped(&mut self, command: &'static str, outcome: Dispatch) -> Dispatch {
        debug!(command, ?outcome, "command dropped");
        self.events.emit("command_dropped", format!("{command}: {outcome:?}"));
        outcome
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::{Dispatch, EngineStatus, MapEngine};
    use crate::config::EngineConfig;
    use crate::error::EngineError;
    use foundation::coord::Position;
    use scene::entity::Entity;
    use scene::sdk::{RecordingSdk, SdkCall};

    fn config() -> EngineConfig {
        EngineConfig::default().with_api_key("test-key")
    }

    fn sites() -> Vec<Entity> {
        vec![
            Entity::new("a", "A", "12", "126.0", "37.0"),
            Entity::new("b", "B", "39", "1280000000", "380000000"),
        ]
    }

    #[test]
    fn commands_before_ready_are_dropped() {
        let mut engine: MapEngine<RecordingSdk> = MapEngine::with_config(config());
        engine.set_entities(sites());
        assert_eq!(engine.move_to_marker("a"), Dispatch::NotReady);
        assert_eq!(engine.set_center(127.0, 37.0), Dispatch::NotReady);
        assert_eq!(engine.highlight_marker("a"), Dispatch::NotReady);
        assert_eq!(engine.unhighlight_marker(), Dispatch::NotReady);
        assert_eq!(engine.marker_clicked("a"), Dispatch::NotReady);
        assert_eq!(engine.session().marker_count(), 0);
        assert_eq!(
            engine.events().kinds().filter(|k| *k == "command_dropped").count(),
            5
        );
    }

    #[test]
    fn loading_builds_map_with_fitted_view() {
        let mut engine: MapEngine<RecordingSdk> = MapEngine::with_config(config());
        engine.set_entities(sites());
        let summary = engine.sdk_loaded(RecordingSdk::new()).unwrap();
        assert_eq!(summary.placed, 2);
        assert_eq!(engine.status(), &EngineStatus::Ready);

        let sdk = engine.sdk().unwrap();
        let map = *engine.session().map().unwrap();
        let view = sdk.view(map).unwrap();
        assert_eq!(view.center, Position::new(127.0, 37.5));
        assert_eq!(view.zoom, 8);
    }

    #[test]
    fn missing_credential_fails_before_loading() {
        let mut engine: MapEngine<RecordingSdk> = MapEngine::with_config(EngineConfig::default());
        assert_eq!(
            engine.status(),
            &EngineStatus::Failed(EngineError::MissingCredential)
        );
        assert!(engine.error_message().is_some());
        assert_eq!(
            engine.sdk_loaded(RecordingSdk::new()),
            Err(EngineError::MissingCredential)
        );
        assert!(engine.sdk().is_none());
    }

    #[test]
    fn load_failure_is_surfaced() {
        let mut engine: MapEngine<RecordingSdk> = MapEngine::with_config(config());
        engine.when_ready(|e| {
            e.set_center(0.0, 0.0);
        });
        engine.sdk_failed("script error");
        assert_eq!(
            engine.error_message().as_deref(),
            Some("map SDK failed to load: script error")
        );
        assert_eq!(engine.pending_ready_callbacks(), 0);
        assert_eq!(engine.highlight_marker("a"), Dispatch::NotReady);
    }

    #[test]
    fn when_ready_defers_until_session_exists() {
        let mut engine: MapEngine<RecordingSdk> = MapEngine::with_config(config());
        engine.set_entities(sites());

        let seen = Rc::new(RefCell::new(Vec::new()));
        let log = Rc::clone(&seen);
        engine.when_ready(move |e| {
            log.borrow_mut().push(e.highlight_marker("b"));
        });
        assert_eq!(engine.pending_ready_callbacks(), 1);
        assert!(seen.borrow().is_empty());

        engine.sdk_loaded(RecordingSdk::new()).unwrap();
        assert_eq!(*seen.borrow(), vec![Dispatch::Applied]);
        assert_eq!(engine.session().highlighted().map(|id| id.as_str()), Some("b"));

        // Already ready: runs immediately.
        let log = Rc::clone(&seen);
        engine.when_ready(move |e| log.borrow_mut().push(e.unhighlight_marker()));
        assert_eq!(*seen.borrow(), vec![Dispatch::Applied, Dispatch::Applied]);
    }

    #[test]
    fn set_entities_after_ready_rebuilds_and_refits() {
        let mut engine: MapEngine<RecordingSdk> = MapEngine::with_config(config());
        engine.sdk_loaded(RecordingSdk::new()).unwrap();
        engine.highlight_marker("a");

        let summary = engine
            .set_entities(vec![Entity::new("z", "Z", "15", "129.0", "35.0")])
            .unwrap();
        assert_eq!(summary.placed, 1);
        assert_eq!(engine.session().highlighted(), None);

        let sdk = engine.sdk().unwrap();
        let map = *engine.session().map().unwrap();
        assert_eq!(sdk.view(map).unwrap().center, Position::new(129.0, 35.0));
        assert_eq!(sdk.view(map).unwrap().zoom, 15);
    }

    #[test]
    fn first_view_ignores_duplicate_ids() {
        let mut engine: MapEngine<RecordingSdk> = MapEngine::with_config(config());
        engine.set_entities(vec![
            Entity::new("dup", "First", "12", "127.0", "37.0"),
            Entity::new("dup", "Second", "12", "129.0", "39.0"),
        ]);
        engine.sdk_loaded(RecordingSdk::new()).unwrap();
        assert_eq!(engine.session().marker_count(), 1);

        let sdk = engine.sdk().unwrap();
        let map = *engine.session().map().unwrap();
        let view = sdk.view(map).unwrap();
        assert_eq!(view.center, Position::new(127.0, 37.0));
        assert_eq!(view.zoom, 15);
    }

    #[test]
    fn refit_ignores_markers_the_sdk_rejected() {
        let mut sdk = RecordingSdk::new();
        sdk.fail_markers_at(Position::new(129.0, 39.0));
        let mut engine: MapEngine<RecordingSdk> = MapEngine::with_config(config());
        engine.sdk_loaded(sdk).unwrap();

        let summary = engine
            .set_entities(vec![
                Entity::new("a", "A", "12", "127.0", "37.0"),
                Entity::new("b", "B", "12", "127.002", "37.002"),
                Entity::new("bad", "Bad", "12", "129.0", "39.0"),
            ])
            .unwrap();
        assert_eq!((summary.placed, summary.failed), (2, 1));

        let sdk = engine.sdk().unwrap();
        let map = *engine.session().map().unwrap();
        let view = sdk.view(map).unwrap();
        assert!((view.center.longitude - 127.001).abs() < 1e-9);
        assert!((view.center.latitude - 37.001).abs() < 1e-9);
        assert_eq!(view.zoom, 15);
    }

    #[test]
    fn marker_click_opens_only_its_info_window() {
        let mut engine: MapEngine<RecordingSdk> = MapEngine::with_config(config());
        engine.set_entities(sites());
        engine.sdk_loaded(RecordingSdk::new()).unwrap();

        assert_eq!(engine.marker_clicked("a"), Dispatch::Applied);
        assert_eq!(engine.marker_clicked("b"), Dispatch::Applied);
        let sdk = engine.sdk().unwrap();
        let open: Vec<_> = sdk.open_info_windows().map(|(_, w)| w.content.title.clone()).collect();
        assert_eq!(open, vec!["B".to_string()]);

        assert_eq!(engine.marker_clicked("nope"), Dispatch::UnknownEntity);
    }

    #[test]
    fn move_to_marker_pans_to_resolved_position() {
        let mut engine: MapEngine<RecordingSdk> = MapEngine::with_config(config());
        engine.set_entities(sites());
        engine.sdk_loaded(RecordingSdk::new()).unwrap();
        engine.sdk_mut().unwrap().clear_calls();

        assert_eq!(engine.move_to_marker("b"), Dispatch::Applied);
        let calls = engine.sdk().unwrap().calls();
        assert!(matches!(
            calls,
            [SdkCall::SetCenter { center, .. }] if *center == Position::new(128.0, 38.0)
        ));
    }

    #[test]
    fn unmount_releases_everything() {
        let mut engine: MapEngine<RecordingSdk> = MapEngine::with_config(config());
        engine.set_entities(sites());
        engine.sdk_loaded(RecordingSdk::new()).unwrap();
        engine.unmount();
        assert!(engine.sdk().is_none());
        assert_eq!(engine.session().marker_count(), 0);
        assert_eq!(engine.status(), &EngineStatus::WaitingForSdk);
        assert_eq!(engine.move_to_marker("a"), Dispatch::NotReady);
    }
}
