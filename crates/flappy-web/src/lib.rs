pub mod canvas;
pub mod raf;
pub mod report;
pub mod runner;

pub use canvas::{CanvasSurface, ImageCache};
pub use raf::RafScheduler;
pub use report::{HostReport, ReportQueue};
pub use runner::{to_js, WebRunner};

/// Install the panic hook and route `log` output to the browser console.
///
/// Safe to call more than once; later calls leave the existing logger in place.
pub fn init_logging() {
    console_error_panic_hook::set_once();
    let _ = console_log::init_with_level(log::Level::Info);
}

/// Look up a container element by id and mount an engine into it.
///
/// # Usage
///
/// ```ignore
/// let runner = flappy_web::mount_by_id("game", EngineConfig::default())?;
/// runner.with_engine(|engine| engine.register_frame_callback(|engine| { /* ... */ }));
/// runner.load_assets_json(r#"{ "assets": [ { "src": "bird.png", "name": "bird" } ] }"#)?;
/// runner.start();
/// ```
pub fn mount_by_id(
    id: &str,
    config: flappy_engine::EngineConfig,
) -> Result<WebRunner, wasm_bindgen::JsValue> {
    use wasm_bindgen::JsCast;

    let document = web_sys::window()
        .and_then(|w| w.document())
        .ok_or_else(|| wasm_bindgen::JsValue::from_str("no document"))?;
    let container = document
        .get_element_by_id(id)
        .ok_or_else(|| wasm_bindgen::JsValue::from_str(&format!("no element with id '{id}'")))?
        .dyn_into::<web_sys::HtmlElement>()
        .map_err(|_| wasm_bindgen::JsValue::from_str("container is not an HTML element"))?;
    WebRunner::mount(&container, config)
}
