//! End-to-end behaviour of the marker engine against the recording SDK.

use engine::{
    CategoryIcons, Dispatch, EngineConfig, Entity, EntityId, IconResolver, IconVariant, MapEngine,
    Position, RecordingSdk, ViewState, compute_initial_view, normalize,
};
use pretty_assertions::assert_eq;
use scene::viewport::{FALLBACK_CENTER, FALLBACK_ZOOM, SINGLE_POSITION_ZOOM};

fn ready_engine(entities: Vec<Entity>) -> MapEngine<RecordingSdk> {
    let mut engine = MapEngine::with_config(EngineConfig::default().with_api_key("key"));
    engine.set_entities(entities);
    engine
        .sdk_loaded(RecordingSdk::new())
        .expect("sdk should attach");
    engine
}

fn seoul_sites() -> Vec<Entity> {
    vec![
        Entity::new("126508", "경복궁", "12", "126.9769930325", "37.5788222356"),
        Entity::new("264337", "광장시장", "38", "1269997000", "375700000"),
        Entity::new("2733967", "좌표 없음", "39", "", ""),
    ]
}

#[test]
fn legacy_and_decimal_encodings_resolve_identically() {
    let legacy = normalize("1269998434", "374296913").unwrap();
    let decimal = normalize("126.9998434", "37.4296913").unwrap();
    assert!((legacy.longitude - 126.9998434).abs() < 1e-9);
    assert!((legacy.latitude - 37.4296913).abs() < 1e-9);
    assert!((legacy.longitude - decimal.longitude).abs() < 1e-9);
    assert!((legacy.latitude - decimal.latitude).abs() < 1e-9);
}

#[test]
fn initial_view_rules() {
    assert_eq!(
        compute_initial_view(&[]),
        ViewState {
            center: FALLBACK_CENTER,
            zoom: FALLBACK_ZOOM
        }
    );
    assert_eq!(
        compute_initial_view(&[Position::new(126.98, 37.57)]),
        ViewState {
            center: Position::new(126.98, 37.57),
            zoom: SINGLE_POSITION_ZOOM
        }
    );
    assert_eq!(
        compute_initial_view(&[Position::new(126.0, 37.0), Position::new(128.0, 38.0)]),
        ViewState {
            center: Position::new(127.0, 37.5),
            zoom: 8
        }
    );
}

#[test]
fn entities_without_coordinates_get_no_marker() {
    let engine = ready_engine(seoul_sites());
    let session = engine.session();
    assert_eq!(session.marker_count(), 2);
    assert!(session.marker(&EntityId::new("2733967")).is_none());
    assert_eq!(engine.last_rebuild().unwrap().skipped_unresolved, 1);
}

#[test]
fn highlight_a_then_b_leaves_only_b_emphasized() {
    let mut engine = ready_engine(seoul_sites());
    let icons = CategoryIcons::new();
    let a = EntityId::new("126508");
    let a_original = engine.session().original_icon(&a).cloned().unwrap();

    assert_eq!(engine.highlight_marker("126508"), Dispatch::Applied);
    assert_eq!(engine.highlight_marker("264337"), Dispatch::Applied);

    let session = engine.session();
    let sdk = engine.sdk().unwrap();
    let a_handle = session.marker(&a).unwrap().handle;
    let b_handle = session.marker(&EntityId::new("264337")).unwrap().handle;
    assert_eq!(sdk.marker(a_handle).unwrap().icon, a_original);
    assert_eq!(
        sdk.marker(b_handle).unwrap().icon,
        icons.resolve("38", IconVariant::Emphasized)
    );

    let emphasized: Vec<_> = sdk
        .attached_markers()
        .filter(|(h, m)| {
            let id = if *h == a_handle { "12" } else { "38" };
            m.icon == icons.resolve(id, IconVariant::Emphasized)
        })
        .map(|(h, _)| h)
        .collect();
    assert_eq!(emphasized, vec![b_handle]);
}

#[test]
fn unhighlight_twice_is_a_no_op_the_second_time() {
    let mut engine = ready_engine(seoul_sites());
    engine.highlight_marker("126508");
    assert_eq!(engine.unhighlight_marker(), Dispatch::Applied);
    assert_eq!(engine.unhighlight_marker(), Dispatch::Unchanged);
    assert_eq!(engine.session().highlighted(), None);
}

#[test]
fn moving_to_unknown_marker_keeps_center() {
    let mut engine = ready_engine(seoul_sites());
    let map = *engine.session().map().unwrap();
    let before = engine.sdk().unwrap().view(map).unwrap();

    assert_eq!(engine.move_to_marker("nonexistent-id"), Dispatch::UnknownEntity);
    assert_eq!(engine.sdk().unwrap().view(map).unwrap(), before);
}

#[test]
fn empty_rebuild_detaches_previous_session() {
    let mut engine = ready_engine(seoul_sites());
    engine.highlight_marker("264337");
    engine.marker_clicked("264337");

    let summary = engine.set_entities(Vec::new()).unwrap();
    assert_eq!(summary.detached, 2);
    assert_eq!(summary.placed, 0);

    let session = engine.session();
    assert_eq!(session.marker_count(), 0);
    assert_eq!(session.info_window_count(), 0);
    assert_eq!(session.highlighted(), None);

    let sdk = engine.sdk().unwrap();
    assert_eq!(sdk.attached_markers().count(), 0);
    assert_eq!(sdk.open_info_windows().count(), 0);
}

#[test]
fn commands_never_panic_across_lifecycle() {
    let mut engine: MapEngine<RecordingSdk> =
        MapEngine::with_config(EngineConfig::default().with_api_key("key"));
    for _ in 0..2 {
        assert!(engine.move_to_marker("x").was_dropped());
        assert!(engine.highlight_marker("x").was_dropped());
        engine.unhighlight_marker();
    }
    engine.set_entities(seoul_sites());
    engine.sdk_loaded(RecordingSdk::new()).unwrap();
    assert!(engine.highlight_marker("x").was_dropped());
    engine.unmount();
    assert!(engine.highlight_marker("126508").was_dropped());
}
