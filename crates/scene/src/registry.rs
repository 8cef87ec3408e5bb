//! Marker lifecycle: every rebuild tears the previous session down completely
//! before placing the new entity list. There is no incremental diffing.

use layers::symbology::{IconResolver, IconVariant};
use serde::Serialize;
use tracing::{debug, warn};

use crate::entity::Entity;
use crate::highlight::HighlightState;
use crate::info_window::InfoWindowTemplate;
use crate::sdk::MapSdk;
use crate::session::{MapSession, PlacedMarker};

#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RebuildSummary {
    pub placed: usize,
    /// Entities without resolvable coordinates.
    pub skipped_unresolved: usize,
    /// Entities whose id was already placed earlier in the same list.
    pub skipped_duplicate: usize,
    /// Entities the SDK refused to place.
    pub failed: usize,
    /// Markers removed from the previous session.
    pub detached: usize,
}

/// Removes every marker and info window from the map and clears the session.
///
/// Returns the number of markers detached. The map handle itself is kept.
pub fn teardown<S: MapSdk>(session: &mut MapSession<S>, sdk: &mut S) -> usize {
    for (_, window) in session.info_windows_by_entity_id.drain() {
        sdk.close_info_window(&window);
    }
    let detached = session.markers_by_entity_id.len();
    for (_, placed) in session.markers_by_entity_id.drain() {
        sdk.detach_marker(&placed.handle);
    }
    session.original_icon_by_entity_id.clear();
    session.highlight = HighlightState::Idle;
    detached
}

/// Replaces the session's markers with one marker per resolvable entity.
///
/// A failure to build one entity's marker or info window never aborts the
/// rest of the list.
pub fn rebuild<S, R>(
    session: &mut MapSession<S>,
    sdk: &mut S,
    icons: &R,
    template: &InfoWindowTemplate,
    entities: &[Entity],
) -> RebuildSummary
where
    S: MapSdk,
    R: IconResolver + ?Sized,
{
    let mut summary = RebuildSummary {
        detached: teardown(session, sdk),
        ..RebuildSummary::default()
    };

    let Some(map) = session.map.as_ref() else {
        debug!(entities = entities.len(), "rebuild without a map; nothing placed");
        return summary;
    };

    for entity in entities {
        let position = match entity.position() {
            Ok(p) => p,
            Err(err) => {
                debug!(id = %entity.id, %err, "skipping entity without coordinates");
                summary.skipped_unresolved += 1;
                continue;
            }
        };
        if session.markers_by_entity_id.contains_key(&entity.id) {
            warn!(id = %entity.id, "duplicate entity id; keeping the first marker");
            summary.skipped_duplicate += 1;
            continue;
        }

        let icon = icons.resolve(&entity.category_code, IconVariant::Normal);
        let marker = match sdk.create_marker(map, position, &icon) {
            Ok(m) => m,
            Err(err) => {
                warn!(id = %entity.id, %err, "marker construction failed");
                summary.failed += 1;
                continue;
            }
        };

        match sdk.create_info_window(&template.content_for(entity)) {
            Ok(window) => {
                session
                    .info_windows_by_entity_id
                    .insert(entity.id.clone(), window);
            }
            Err(err) => warn!(id = %entity.id, %err, "info window construction failed"),
        }
        sdk.add_click_listener(&marker, &entity.id);

        session
            .original_icon_by_entity_id
            .insert(entity.id.clone(), icon);
        session.markers_by_entity_id.insert(
            entity.id.clone(),
            PlacedMarker {
                handle: marker,
                position,
                category_code: entity.category_code.clone(),
            },
        );
        summary.placed += 1;
    }

    debug!(
        placed = summary.placed,
        skipped_unresolved = summary.skipped_unresolved,
        skipped_duplicate = summary.skipped_duplicate,
        failed = summary.failed,
        detached = summary.detached,
        "markers rebuilt"
    );
    summary
}
