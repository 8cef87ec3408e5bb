//! Headless helpers behind the `tourmap` CLI.

use engine::{Dispatch, EngineConfig, Entity, EntityId, MapEngine, Position, RebuildSummary};
use engine::{RecordingSdk, ViewState};
use scene::sdk::SdkCall;
use serde::Serialize;
use serde_json::Value;
use tracing::warn;

/// Parses an entity file: either a JSON array of entities or a Korea Tour API
/// response (`response.body.items.item`).
pub fn parse_entities(raw: &str) -> Result<Vec<Entity>, String> {
    let value: Value = serde_json::from_str(raw).map_err(|e| format!("json: {e}"))?;
    let items = match value {
        Value::Array(_) => value,
        Value::Object(_) => match value.pointer("/response/body/items") {
            // The API sends an empty string instead of an object for no results.
            Some(Value::String(_)) | None => Value::Array(Vec::new()),
            Some(items) => match items.get("item") {
                Some(Value::Array(list)) => Value::Array(list.clone()),
                Some(single @ Value::Object(_)) => Value::Array(vec![single.clone()]),
                _ => Value::Array(Vec::new()),
            },
        },
        other => return Err(format!("expected an array or object, got {other}")),
    };
    serde_json::from_value(items).map_err(|e| format!("entity: {e}"))
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlannedMarker {
    pub id: EntityId,
    pub title: String,
    pub position: Position,
    pub icon_width: u32,
    pub icon_height: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkippedEntity {
    pub id: EntityId,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Plan {
    pub view: ViewState,
    pub summary: RebuildSummary,
    pub markers: Vec<PlannedMarker>,
    pub skipped: Vec<SkippedEntity>,
    pub highlighted: Option<EntityId>,
    pub calls: Vec<SdkCall>,
}

/// Runs the full engine against the recording SDK and reports the result.
pub fn build_plan(
    entities: Vec<Entity>,
    config: EngineConfig,
    highlight: Option<&str>,
) -> Result<Plan, String> {
    let mut engine: MapEngine<RecordingSdk> = MapEngine::with_config(config);
    engine.set_entities(entities);
    let summary = engine.sdk_loaded(RecordingSdk::new()).map_err(|e| e.to_string())?;

    if let Some(id) = highlight {
        if engine.highlight_marker(id) == Dispatch::UnknownEntity {
            warn!(id, "highlight requested for an entity without a marker");
        }
    }

    let session = engine.session();
    let sdk = engine
        .sdk()
        .ok_or_else(|| "map SDK detached unexpectedly".to_string())?;
    let map = session
        .map()
        .ok_or_else(|| "map was not created".to_string())?;
    let view = sdk
        .view(*map)
        .ok_or_else(|| "map view was not recorded".to_string())?;

    let mut markers = Vec::new();
    let mut skipped = Vec::new();
    for entity in engine.entities() {
        let placed = session
            .marker(&entity.id)
            .and_then(|m| sdk.marker(m.handle).map(|r| (m, r)));
        match placed {
            Some((m, recorded)) if !markers.iter().any(|p: &PlannedMarker| p.id == entity.id) => {
                markers.push(PlannedMarker {
                    id: entity.id.clone(),
                    title: entity.title.clone(),
                    position: m.position,
                    icon_width: recorded.icon.width,
                    icon_height: recorded.icon.height,
                });
            }
            Some(_) => skipped.push(SkippedEntity {
                id: entity.id.clone(),
                reason: "duplicate id".to_string(),
            }),
            None => {
                let reason = match entity.position() {
                    Err(err) => err.to_string(),
                    Ok(_) => "rejected by map SDK".to_string(),
                };
                skipped.push(SkippedEntity {
                    id: entity.id.clone(),
                    reason,
                });
            }
        }
    }

    Ok(Plan {
        view,
        summary,
        markers,
        skipped,
        highlighted: session.highlighted().cloned(),
        calls: sdk.calls().to_vec(),
    })
}

#[cfg(test)]
mod tests {
    use super::{build_plan, parse_entities};
    use engine::{EngineConfig, EntityId};
    use pretty_assertions::assert_eq;

    const TOUR_API: &str = r#"{
        "response": {
            "header": { "resultCode": "0000", "resultMsg": "OK" },
            "body": {
                "items": {
                    "item": [
                        { "contentid": "1", "title": "One", "contenttypeid": "12",
                          "mapx": "126.97", "mapy": "37.57", "addr1": "서울" },
                        { "contentid": "2", "title": "Two", "contenttypeid": "39",
                          "mapx": "1270500000", "mapy": "375000000" },
                        { "contentid": "3", "title": "Three", "contenttypeid": "32",
                          "mapx": "", "mapy": "" }
                    ]
                },
                "numOfRows": 3, "pageNo": 1, "totalCount": 3
            }
        }
    }"#;

    #[test]
    fn parses_tour_api_envelope() {
        let entities = parse_entities(TOUR_API).unwrap();
        assert_eq!(entities.len(), 3);
        assert_eq!(entities[1].id, EntityId::new("2"));
    }

    #[test]
    fn parses_single_item_and_empty_results() {
        let single = r#"{"response":{"body":{"items":{"item":
            {"contentid":"9","title":"Solo","mapx":"127","mapy":"37"}}}}}"#;
        assert_eq!(parse_entities(single).unwrap().len(), 1);

        let empty = r#"{"response":{"body":{"items":"","totalCount":0}}}"#;
        assert!(parse_entities(empty).unwrap().is_empty());

        assert!(parse_entities("42").is_err());
    }

    #[test]
    fn plan_lists_placed_and_skipped_entities() {
        let entities = parse_entities(TOUR_API).unwrap();
        let plan = build_plan(
            entities,
            EngineConfig::default().with_api_key("k"),
            Some("2"),
        )
        .unwrap();

        assert_eq!(plan.summary.placed, 2);
        assert_eq!(
            plan.markers.iter().map(|m| m.id.as_str()).collect::<Vec<_>>(),
            vec!["1", "2"]
        );
        assert_eq!(plan.skipped.len(), 1);
        assert_eq!(plan.skipped[0].id, EntityId::new("3"));
        assert_eq!(plan.highlighted, Some(EntityId::new("2")));
        assert!(plan.markers[1].icon_width > plan.markers[0].icon_width);
    }

    #[test]
    fn plan_requires_credential() {
        let err = build_plan(Vec::new(), EngineConfig::default(), None).unwrap_err();
        assert!(err.contains("API key"));
    }
}
