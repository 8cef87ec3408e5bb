//! [`MapSdk`] over the Kakao Maps JavaScript SDK (`window.kakao.maps`).

use std::cell::RefCell;
use std::rc::Rc;

use engine::{EntityId, IconSpec, MapSdk, Position, SdkError, ViewState};
use js_sys::{Array, Function, Object, Reflect};
use scene::info_window::InfoWindowContent;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;

/// Receives the entity id of a clicked marker.
pub type ClickRouter = Rc<dyn Fn(&str)>;

pub struct KakaoMarker {
    js: JsValue,
    listener: RefCell<Option<Closure<dyn FnMut()>>>,
}

pub struct KakaoMaps {
    maps: JsValue,
    container: JsValue,
    router: ClickRouter,
}

/// Kakao levels run from 1 (closest) to 14; web zoom runs the other way.
pub fn level_for_zoom(zoom: u8) -> i32 {
    (20 - zoom as i32).clamp(1, 14)
}

impl KakaoMaps {
    pub fn new(container_id: &str, router: ClickRouter) -> Result<Self, SdkError> {
        let document = web_sys::window()
            .and_then(|w| w.document())
            .ok_or_else(|| SdkError::Unavailable("no document".to_string()))?;
        let container = document
            .get_element_by_id(container_id)
            .ok_or_else(|| SdkError::Unavailable(format!("missing #{container_id}")))?;
        Ok(Self {
            maps: maps_namespace()?,
            container: container.into(),
            router,
        })
    }

    fn lat_lng(&self, p: Position) -> Result<JsValue, SdkError> {
        construct(
            &self.maps,
            "LatLng",
            &[JsValue::from_f64(p.latitude), JsValue::from_f64(p.longitude)],
        )
    }

    fn marker_image(&self, icon: &IconSpec) -> Result<JsValue, SdkError> {
        let size = construct(
            &self.maps,
            "Size",
            &[JsValue::from(icon.width), JsValue::from(icon.height)],
        )?;
        let offset = construct(
            &self.maps,
            "Point",
            &[JsValue::from(icon.anchor_x), JsValue::from(icon.anchor_y)],
        )?;
        let opts = object(&[("offset", offset)])?;
        construct(
            &self.maps,
            "MarkerImage",
            &[JsValue::from_str(&icon.data_url()), size, opts],
        )
    }
}

impl MapSdk for KakaoMaps {
    type Map = JsValue;
    type Marker = KakaoMarker;
    type InfoWindow = JsValue;

    fn create_map(&mut self, view: ViewState) -> Result<Self::Map, SdkError> {
        let opts = object(&[
            ("center", self.lat_lng(view.center)?),
            ("level", JsValue::from(level_for_zoom(view.zoom))),
        ])?;
        construct(&self.maps, "Map", &[self.container.clone(), opts])
    }

    fn set_center(&mut self, map: &Self::Map, center: Position) {
        let result = self
            .lat_lng(center)
            .and_then(|ll| call(map, "setCenter", &[ll]));
        report("setCenter", result);
    }

    fn set_zoom(&mut self, map: &Self::Map, zoom: u8) {
        report(
            "setLevel",
            call(map, "setLevel", &[JsValue::from(level_for_zoom(zoom))]),
        );
    }

    fn create_marker(
        &mut self,
        map: &Self::Map,
        position: Position,
        icon: &IconSpec,
    ) -> Result<Self::Marker, SdkError> {
        let opts = object(&[
            ("map", map.clone()),
            ("position", self.lat_lng(position)?),
            ("image", self.marker_image(icon)?),
        ])?;
        Ok(KakaoMarker {
            js: construct(&self.maps, "Marker", &[opts])?,
            listener: RefCell::new(None),
        })
    }

    fn set_icon(&mut self, marker: &Self::Marker, icon: &IconSpec) {
        let result = self
            .marker_image(icon)
            .and_then(|img| call(&marker.js, "setImage", &[img]));
        report("setImage", result);
    }

    fn detach_marker(&mut self, marker: &Self::Marker) {
        report("setMap", call(&marker.js, "setMap", &[JsValue::NULL]));
        // The SDK must let go of the handler before the closure is dropped.
        if let Some(closure) = marker.listener.borrow_mut().take() {
            let result = get(&self.maps, "event").and_then(|event| {
                call(
                    &event,
                    "removeListener",
                    &[
                        marker.js.clone(),
                        JsValue::from_str("click"),
                        closure.as_ref().clone(),
                    ],
                )
            });
            report("removeListener", result);
        }
    }

    fn add_click_listener(&mut self, marker: &Self::Marker, entity: &EntityId) {
        let router = Rc::clone(&self.router);
        let id = entity.as_str().to_string();
        let closure = Closure::<dyn FnMut()>::new(move || router(id.as_str()));
        let result = get(&self.maps, "event").and_then(|event| {
            call(
                &event,
                "addListener",
                &[
                    marker.js.clone(),
                    JsValue::from_str("click"),
                    closure.as_ref().clone(),
                ],
            )
        });
        report("addListener", result);
        *marker.listener.borrow_mut() = Some(closure);
    }

    fn create_info_window(
        &mut self,
        content: &InfoWindowContent,
    ) -> Result<Self::InfoWindow, SdkError> {
        let opts = object(&[
            ("content", JsValue::from_str(&content.to_html())),
            ("removable", JsValue::TRUE),
        ])?;
        construct(&self.maps, "InfoWindow", &[opts])
    }

    fn open_info_window(
        &mut self,
        window: &Self::InfoWindow,
        map: &Self::Map,
        marker: &Self::Marker,
    ) {
        report("open", call(window, "open", &[map.clone(), marker.js.clone()]));
    }

    fn close_info_window(&mut self, window: &Self::InfoWindow) {
        report("close", call(window, "close", &[]));
    }
}

/// The SDK namespace, present only after the script has loaded.
pub fn maps_namespace() -> Result<JsValue, SdkError> {
    let window = web_sys::window().ok_or_else(|| SdkError::Unavailable("no window".into()))?;
    let kakao = get(&window, "kakao")?;
    if kakao.is_undefined() || kakao.is_null() {
        return Err(SdkError::Unavailable("window.kakao is undefined".into()));
    }
    let maps = get(&kakao, "maps")?;
    if maps.is_undefined() || maps.is_null() {
        return Err(SdkError::Unavailable("window.kakao.maps is undefined".into()));
    }
    Ok(maps)
}

fn get(target: &JsValue, key: &'static str) -> Result<JsValue, SdkError> {
    Reflect::get(target, &JsValue::from_str(key)).map_err(|e| js_error(key, e))
}

fn function(target: &JsValue, key: &'static str) -> Result<Function, SdkError> {
    get(target, key)?
        .dyn_into::<Function>()
        .map_err(|_| SdkError::call(key, "not a function"))
}

fn construct(ns: &JsValue, class: &'static str, args: &[JsValue]) -> Result<JsValue, SdkError> {
    let ctor = function(ns, class)?;
    let args: Array = args.iter().collect();
    Reflect::construct(&ctor, &args).map_err(|e| js_error(class, e))
}

pub(crate) fn call(
    target: &JsValue,
    method: &'static str,
    args: &[JsValue],
) -> Result<JsValue, SdkError> {
    let f = function(target, method)?;
    let args: Array = args.iter().collect();
    f.apply(target, &args).map_err(|e| js_error(method, e))
}

fn object(entries: &[(&'static str, JsValue)]) -> Result<JsValue, SdkError> {
    let o = Object::new();
    for (key, value) in entries {
        Reflect::set(&o, &JsValue::from_str(key), value).map_err(|e| js_error(*key, e))?;
    }
    Ok(o.into())
}

fn js_error(call: &'static str, err: JsValue) -> SdkError {
    SdkError::call(call, format!("{err:?}"))
}

fn report(call: &'static str, result: Result<JsValue, SdkError>) {
    if let Err(err) = result {
        web_sys::console::warn_1(&JsValue::from_str(&format!("{call}: {err}")));
    }
}
