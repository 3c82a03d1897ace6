use std::cell::RefCell;

use flappy_engine::{Engine, EngineConfig};
use flappy_web::{to_js, WebRunner};
use wasm_bindgen::prelude::*;

pub mod game;
mod rng;

use game::FlappyBird;

thread_local! {
    static RUNNER: RefCell<Option<WebRunner>> = RefCell::new(None);
}

fn with_runner<R>(f: impl FnOnce(&WebRunner) -> R) -> Option<R> {
    RUNNER.with(|cell| cell.borrow().as_ref().map(f))
}

/// Mount the game into the element with id `container_id`, loading images from `asset_base`.
#[wasm_bindgen]
pub fn flappy_mount(container_id: &str, asset_base: &str, config_json: Option<String>) -> Result<(), JsValue> {
    flappy_web::init_logging();

    let config = match config_json {
        Some(json) => EngineConfig::from_json(&json).map_err(to_js)?,
        None => EngineConfig::default(),
    };
    let runner = flappy_web::mount_by_id(container_id, config)?;

    let seed = js_sys::Date::now() as u64;
    runner.with_engine(|engine| {
        FlappyBird::install(engine, seed);
    });
    for request in game::asset_requests(asset_base) {
        runner.load_assets(request).map_err(to_js)?;
    }
    runner.start();

    RUNNER.with(|cell| *cell.borrow_mut() = Some(runner));
    log::info!("flappy-bird: initialized");
    Ok(())
}

#[wasm_bindgen]
pub fn flappy_toggle_pause() {
    with_runner(|runner| runner.with_engine(Engine::toggle_pause));
}

/// Current play state as JSON: `{"paused":..,"on":..,"level":..,"idle":..}`.
#[wasm_bindgen]
pub fn flappy_game_state() -> Result<String, JsValue> {
    let state = with_runner(|runner| runner.with_engine(|engine| engine.game_state()))
        .flatten()
        .ok_or_else(|| JsValue::from_str("game not mounted"))?;
    serde_json::to_string(&state).map_err(|e| JsValue::from_str(&e.to_string()))
}

#[wasm_bindgen]
pub fn flappy_stop() {
    with_runner(WebRunner::stop);
}
