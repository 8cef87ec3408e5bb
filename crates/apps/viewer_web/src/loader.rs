//! One SDK script per page, shared by every mounted map.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use engine::EngineError;
use runtime::{LoadAction, SdkLoader};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::HtmlScriptElement;

use crate::kakao::{self, KakaoMaps};
use crate::{SharedEngine, show_error};

const SCRIPT_ID: &str = "kakao-maps-sdk";

struct Waiter {
    engine: Weak<RefCell<crate::Engine>>,
    container_id: String,
}

thread_local! {
    static LOADER: RefCell<SdkLoader> = const { RefCell::new(SdkLoader::new()) };
    static WAITERS: RefCell<Vec<Waiter>> = const { RefCell::new(Vec::new()) };
}

/// Asks for the SDK on behalf of one engine. The engine is attached as soon
/// as the SDK is (or already was) ready.
pub fn request(engine: &SharedEngine, container_id: &str, script_url: &str) -> Result<(), JsValue> {
    enqueue(engine, container_id);

    let action = LOADER.with(|l| l.borrow_mut().request());
    match action {
        LoadAction::InjectScript => inject_script(script_url),
        LoadAction::Wait => Ok(()),
        LoadAction::AlreadyReady => {
            attach_waiters();
            Ok(())
        }
        LoadAction::AlreadyFailed(reason) => {
            fail_waiters(&reason);
            Ok(())
        }
    }
}

/// Forgets an engine that is unmounting, so a later SDK load does not build
/// a map for it.
pub fn cancel(engine: &SharedEngine) {
    let target = Rc::downgrade(engine);
    WAITERS.with(|w| {
        w.borrow_mut().retain(|waiter| {
            !waiter.engine.ptr_eq(&target) && waiter.engine.strong_count() > 0
        })
    });
}

fn enqueue(engine: &SharedEngine, container_id: &str) {
    cancel(engine);
    WAITERS.with(|w| {
        w.borrow_mut().push(Waiter {
            engine: Rc::downgrade(engine),
            container_id: container_id.to_string(),
        })
    });
}

fn inject_script(url: &str) -> Result<(), JsValue> {
    let document = web_sys::window()
        .and_then(|w| w.document())
        .ok_or_else(|| JsValue::from_str("no document"))?;
    let script = document
        .create_element("script")?
        .dyn_into::<HtmlScriptElement>()?;
    script.set_id(SCRIPT_ID);
    script.set_src(url);
    script.set_async(true);

    let onload = Closure::<dyn FnMut()>::new(on_script_loaded);
    let onerror = Closure::<dyn FnMut()>::new(|| on_failed("SDK script could not be loaded"));
    script.set_onload(Some(onload.as_ref().unchecked_ref()));
    script.set_onerror(Some(onerror.as_ref().unchecked_ref()));
    // Page-lifetime handlers; the script is injected at most once.
    onload.forget();
    onerror.forget();

    document
        .head()
        .ok_or_else(|| JsValue::from_str("no <head>"))?
        .append_child(&script)?;
    Ok(())
}

/// With `autoload=false` the script only defines `kakao.maps.load`; the
/// capability object is usable once its callback fires.
fn on_script_loaded() {
    let ready = Closure::<dyn FnMut()>::new(on_ready);
    let result = web_sys::window()
        .ok_or_else(|| JsValue::from_str("no window"))
        .and_then(|w| js_sys::Reflect::get(&w, &JsValue::from_str("kakao")))
        .and_then(|k| js_sys::Reflect::get(&k, &JsValue::from_str("maps")))
        .map_err(|e| format!("{e:?}"))
        .and_then(|maps| {
            kakao::call(&maps, "load", &[ready.as_ref().clone()]).map_err(|e| e.to_string())
        });
    ready.forget();
    if let Err(reason) = result {
        on_failed(&reason);
    }
}

fn on_ready() {
    LOADER.with(|l| l.borrow_mut().mark_loaded());
    attach_waiters();
}

fn on_failed(reason: &str) {
    LOADER.with(|l| l.borrow_mut().mark_failed(reason));
    fail_waiters(reason);
}

fn attach_waiters() {
    for waiter in WAITERS.with(|w| std::mem::take(&mut *w.borrow_mut())) {
        let Some(engine) = waiter.engine.upgrade() else {
            continue;
        };
        let router = crate::click_router(&engine);
        let result = KakaoMaps::new(&waiter.container_id, router)
            .map_err(EngineError::from)
            .and_then(|sdk| engine.borrow_mut().sdk_loaded(sdk));
        if let Err(err) = result {
            show_error(&waiter.container_id, &err.to_string());
        }
    }
}

fn fail_waiters(reason: &str) {
    for waiter in WAITERS.with(|w| std::mem::take(&mut *w.borrow_mut())) {
        let Some(engine) = waiter.engine.upgrade() else {
            continue;
        };
        engine.borrow_mut().sdk_failed(reason);
        if let Some(msg) = engine.borrow().error_message() {
            show_error(&waiter.container_id, &msg);
        }
    }
}
