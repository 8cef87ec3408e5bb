//! Single-selection emphasis. At most one marker shows its emphasized icon.

use layers::symbology::{IconResolver, IconVariant};
use serde::Serialize;

use crate::entity::EntityId;
use crate::sdk::MapSdk;
use crate::session::MapSession;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "entity", rename_all = "snake_case")]
pub enum HighlightState {
    #[default]
    Idle,
    Highlighted(EntityId),
}

impl HighlightState {
    pub fn entity(&self) -> Option<&EntityId> {
        match self {
            HighlightState::Idle => None,
            HighlightState::Highlighted(id) => Some(id),
        }
    }
}

/// Outcome of a highlight request.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Transition {
    Changed,
    /// Already in the requested state; no icon was touched.
    Unchanged,
    /// No marker exists for the requested id; state is untouched.
    UnknownEntity,
}

/// Emphasizes `id`, restoring the previously emphasized marker first.
pub fn highlight<S, R>(
    session: &mut MapSession<S>,
    sdk: &mut S,
    icons: &R,
    id: &EntityId,
) -> Transition
where
    S: MapSdk,
    R: IconResolver + ?Sized,
{
    if session.highlight.entity() == Some(id) {
        return Transition::Unchanged;
    }
    let Some(target) = session.markers_by_entity_id.get(id) else {
        return Transition::UnknownEntity;
    };

    if let HighlightState::Highlighted(previous) = &session.highlight {
        restore_normal_icon(session, sdk, previous);
    }

    session
        .original_icon_by_entity_id
        .entry(id.clone())
        .or_insert_with(|| icons.resolve(&target.category_code, IconVariant::Normal));
    let emphasized = icons.resolve(&target.category_code, IconVariant::Emphasized);
    sdk.set_icon(&target.handle, &emphasized);

    session.highlight = HighlightState::Highlighted(id.clone());
    Transition::Changed
}

/// Restores the emphasized marker, if any, to its normal icon.
pub fn unhighlight<S: MapSdk>(session: &mut MapSession<S>, sdk: &mut S) -> Transition {
    let HighlightState::Highlighted(current) = std::mem::take(&mut session.highlight) else {
        return Transition::Unchanged;
    };
    restore_normal_icon(session, sdk, &current);
    Transition::Changed
}

fn restore_normal_icon<S: MapSdk>(session: &MapSession<S>, sdk: &mut S, id: &EntityId) {
    if let (Some(placed), Some(icon)) = (
        session.markers_by_entity_id.get(id),
        session.original_icon_by_entity_id.get(id),
    ) {
        sdk.set_icon(&placed.handle, icon);
    }
}
