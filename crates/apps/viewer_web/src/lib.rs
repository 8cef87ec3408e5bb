//! Browser bindings: a `TourMap` per map container, driven from page scripts.

use console_error_panic_hook::set_once;
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::prelude::*;

use engine::{Dispatch, EngineConfig, Entity, MapEngine};

mod kakao;
mod loader;

use kakao::{ClickRouter, KakaoMaps};

type Engine = MapEngine<KakaoMaps>;
type SharedEngine = Rc<RefCell<Engine>>;

#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    set_once();
    Ok(())
}

#[wasm_bindgen]
pub struct TourMap {
    engine: SharedEngine,
    container_id: String,
}

#[wasm_bindgen]
impl TourMap {
    #[wasm_bindgen(constructor)]
    pub fn new(
        container_id: String,
        app_key: Option<String>,
        detail_base_url: Option<String>,
    ) -> TourMap {
        let mut config = EngineConfig::default();
        if let Some(key) = app_key {
            config = config.with_api_key(key);
        }
        if let Some(url) = detail_base_url {
            config.detail_base_url = url;
        }
        TourMap {
            engine: Rc::new(RefCell::new(MapEngine::with_config(config))),
            container_id,
        }
    }

    /// Requests the SDK (once per page) and attaches this map when it is
    /// ready. Without an app key the container shows an error instead.
    pub fn mount(&self) -> Result<(), JsValue> {
        let url = self.engine.borrow().sdk_script_url();
        match url {
            Ok(url) => loader::request(&self.engine, &self.container_id, &url),
            Err(err) => {
                show_error(&self.container_id, &err.to_string());
                Ok(())
            }
        }
    }

    pub fn unmount(&self) {
        loader::cancel(&self.engine);
        if let Ok(mut engine) = self.engine.try_borrow_mut() {
            engine.unmount();
        }
    }

    /// Replaces the entity list with a JSON array of entities.
    #[wasm_bindgen(js_name = setEntities)]
    pub fn set_entities(&self, entities_json: &str) -> Result<(), JsValue> {
        let entities: Vec<Entity> = serde_json::from_str(entities_json)
            .map_err(|e| JsValue::from_str(&format!("entities: {e}")))?;
        self.engine
            .try_borrow_mut()
            .map_err(|_| JsValue::from_str("map engine is busy"))?
            .set_entities(entities);
        Ok(())
    }

    #[wasm_bindgen(js_name = moveToMarker)]
    pub fn move_to_marker(&self, id: &str) -> bool {
        self.dispatch(|e| e.move_to_marker(id))
    }

    #[wasm_bindgen(js_name = setCenter)]
    pub fn set_center(&self, longitude: f64, latitude: f64) -> bool {
        self.dispatch(|e| e.set_center(longitude, latitude))
    }

    #[wasm_bindgen(js_name = highlightMarker)]
    pub fn highlight_marker(&self, id: &str) -> bool {
        self.dispatch(|e| e.highlight_marker(id))
    }

    #[wasm_bindgen(js_name = unhighlightMarker)]
    pub fn unhighlight_marker(&self) -> bool {
        self.dispatch(|e| e.unhighlight_marker())
    }

    /// Calls `callback` once the map is live. The call is scheduled on a
    /// fresh task so it may use the command methods.
    #[wasm_bindgen(js_name = whenReady)]
    pub fn when_ready(&self, callback: js_sys::Function) {
        let Ok(mut engine) = self.engine.try_borrow_mut() else {
            return;
        };
        engine.when_ready(move |_| {
            let scheduled = web_sys::window()
                .ok_or_else(|| JsValue::from_str("no window"))
                .and_then(|w| {
                    w.set_timeout_with_callback_and_timeout_and_arguments_0(&callback, 0)
                });
            if let Err(err) = scheduled {
                web_sys::console::warn_2(&JsValue::from_str("whenReady: setTimeout failed"), &err);
            }
        });
    }

    #[wasm_bindgen(js_name = isReady)]
    pub fn is_ready(&self) -> bool {
        self.engine.try_borrow().map(|e| e.is_ready()).unwrap_or(false)
    }

    #[wasm_bindgen(js_name = errorMessage)]
    pub fn error_message(&self) -> Option<String> {
        self.engine.try_borrow().ok().and_then(|e| e.error_message())
    }

    /// Commands never throw; a busy or unready engine drops them.
    fn dispatch(&self, command: impl FnOnce(&mut Engine) -> Dispatch) -> bool {
        match self.engine.try_borrow_mut() {
            Ok(mut engine) => !command(&mut *engine).was_dropped(),
            Err(_) => false,
        }
    }
}

/// Routes SDK marker clicks back into `engine` without keeping it alive.
fn click_router(engine: &SharedEngine) -> ClickRouter {
    let weak = Rc::downgrade(engine);
    Rc::new(move |id: &str| {
        if let Some(engine) = weak.upgrade() {
            if let Ok(mut engine) = engine.try_borrow_mut() {
                engine.marker_clicked(id);
            }
        }
    })
}

/// Replaces the map container's content with an error message.
fn show_error(container_id: &str, message: &str) {
    web_sys::console::error_1(&JsValue::from_str(message));
    let element = web_sys::window()
        .and_then(|w| w.document())
        .and_then(|d| d.get_element_by_id(container_id));
    if let Some(element) = element {
        element.set_text_content(Some(message));
        element.set_class_name("map-error");
    }
}

#[cfg(test)]
mod tests {
    use super::kakao::level_for_zoom;

    #[test]
    fn zoom_maps_to_kakao_levels() {
        assert_eq!(level_for_zoom(15), 5);
        assert_eq!(level_for_zoom(8), 12);
        assert_eq!(level_for_zoom(7), 13);
        assert_eq!(level_for_zoom(0), 14);
        assert_eq!(level_for_zoom(22), 1);
    }
}
