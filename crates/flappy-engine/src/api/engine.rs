use glam::Vec2;

use crate::api::config::EngineConfig;
use crate::api::error::{EngineError, EngineResult};
use crate::api::types::{FrameHandle, GameState, LoadTicket};
use crate::assets::image::ImageInfo;
use crate::assets::loader::{AssetLoader, PendingLoad};
use crate::assets::registry::AssetRegistry;
use crate::assets::request::LoadRequest;
use crate::components::entity::Entity;
use crate::components::layer::RenderLayer;
use crate::core::scheduler::{FrameScheduler, ManualScheduler};
use crate::renderer::surface::{RecordingSurface, Surface};

/// Per-frame game logic. Receives the engine explicitly.
pub type FrameCallback = Box<dyn FnMut(&mut Engine)>;
/// Invoked on every ready-signal crossing.
pub type ReadyCallback = Box<dyn FnMut(&mut Engine)>;
/// Invoked for every reported asset failure.
pub type ErrorCallback = Box<dyn FnMut(&mut Engine, &EngineError)>;
/// Invoked for every click on the container, with the click position.
pub type ClickCallback = Box<dyn FnMut(&mut Engine, Vec2)>;

/// The engine: three drawing surfaces, play state, the asset registry and
/// loader, and the frame loop that runs game logic once assets are ready.
///
/// Single-threaded. The host drives it by calling `tick` when a requested
/// frame fires and by reporting image loads through `asset_loaded` /
/// `asset_failed`. Every callback receives `&mut Engine`, so game code has
/// the full API available inside callbacks.
pub struct Engine {
    config: EngineConfig,
    state: GameState,
    assets: AssetRegistry,
    loader: AssetLoader,
    surfaces: [Box<dyn Surface>; RenderLayer::COUNT],
    scheduler: Box<dyn FrameScheduler>,
    frame_request: Option<FrameHandle>,
    frame_count: u64,
    frame_time_ms: f64,
    frame_callback: Option<FrameCallback>,
    ready_callbacks: Vec<ReadyCallback>,
    error_callbacks: Vec<ErrorCallback>,
    click_callbacks: Vec<ClickCallback>,
}

/// Host-side handles for an engine built with `Engine::headless`.
pub struct Headless {
    pub scheduler: ManualScheduler,
    pub surfaces: [RecordingSurface; RenderLayer::COUNT],
}

impl Headless {
    pub fn surface(&self, layer: RenderLayer) -> &RecordingSurface {
        &self.surfaces[layer.index()]
    }

    /// Fire the outstanding frame, if any, and tick the engine.
    /// Returns false when no frame was requested (engine stopped).
    pub fn step(&self, engine: &mut Engine, timestamp_ms: f64) -> bool {
        if self.scheduler.fire().is_none() {
            return false;
        }
        engine.tick(timestamp_ms);
        true
    }

    /// Complete every pending load with the given dimensions.
    pub fn load_all(&self, engine: &mut Engine, info: ImageInfo) -> EngineResult<usize> {
        let pending = engine.take_pending_loads();
        let count = pending.len();
        for load in pending {
            engine.asset_loaded(load.ticket, info)?;
        }
        Ok(count)
    }
}

impl Engine {
    /// Build an engine over host-provided surfaces (background, game,
    /// foreground, in that order) and frame scheduler.
    pub fn new(
        config: EngineConfig,
        surfaces: [Box<dyn Surface>; RenderLayer::COUNT],
        scheduler: Box<dyn FrameScheduler>,
    ) -> Self {
        log::info!(
            "Engine created: {}x{} gravity_y={}",
            config.width,
            config.height,
            config.gravity_y
        );
        Self {
            config,
            state: GameState::default(),
            assets: AssetRegistry::new(),
            loader: AssetLoader::new(),
            surfaces,
            scheduler,
            frame_request: None,
            frame_count: 0,
            frame_time_ms: 0.0,
            frame_callback: None,
            ready_callbacks: Vec::new(),
            error_callbacks: Vec::new(),
            click_callbacks: Vec::new(),
        }
    }

    /// Build an engine with recording surfaces and a manual scheduler.
    pub fn headless(config: EngineConfig) -> (Self, Headless) {
        let headless = Headless {
            scheduler: ManualScheduler::new(),
            surfaces: Default::default(),
        };
        let surfaces: [Box<dyn Surface>; RenderLayer::COUNT] = [
            Box::new(headless.surfaces[0].clone()),
            Box::new(headless.surfaces[1].clone()),
            Box::new(headless.surfaces[2].clone()),
        ];
        let engine = Self::new(config, surfaces, Box::new(headless.scheduler.clone()));
        (engine, headless)
    }

    // -- Configuration & dimensions --

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn width(&self) -> f32 {
        self.config.width
    }

    pub fn height(&self) -> f32 {
        self.config.height
    }

    pub fn viewport(&self) -> Vec2 {
        Vec2::new(self.config.width, self.config.height)
    }

    /// Change gravity for entities created from now on.
    /// Existing entities keep the value they captured.
    pub fn set_gravity(&mut self, gravity_y: f32) {
        self.config.gravity_y = gravity_y;
    }

    /// Whether `entity` is visible in this engine's play area.
    pub fn is_in_view(&self, entity: &Entity) -> bool {
        entity.is_in_view(self.viewport())
    }

    /// Whether `entity` touches or crosses this engine's play-area edges.
    pub fn is_out_of_bounds(&self, entity: &Entity) -> bool {
        entity.is_out_of_bounds(self.config.width, self.config.height)
    }

    // -- Game state --

    /// Leave idle and start playing (unpaused).
    pub fn play(&mut self) {
        self.state.idle = false;
        self.state.on = true;
        self.state.paused = false;
    }

    /// Flip `paused`; `on` and `idle` are untouched.
    pub fn toggle_pause(&mut self) {
        self.state.paused = !self.state.paused;
    }

    /// Back to the initial state and every entity back to its offset.
    /// The frame loop keeps running.
    pub fn reset(&mut self) {
        self.state = GameState::default();
        self.assets.reset_all();
        log::debug!("Engine reset ({} entities)", self.assets.entity_count());
    }

    pub fn game_state(&self) -> GameState {
        self.state
    }

    pub fn level(&self) -> u32 {
        self.state.level
    }

    pub fn level_up(&mut self) -> u32 {
        self.state.level += 1;
        self.state.level
    }

    pub fn is_paused(&self) -> bool {
        self.state.paused
    }

    pub fn is_on(&self) -> bool {
        self.state.on
    }

    pub fn is_idle(&self) -> bool {
        self.state.idle
    }

    // -- Frame loop --

    /// Begin the frame loop. A no-op while already running.
    ///
    /// The first frame runs immediately; later frames run when the host
    /// calls `tick`.
    pub fn start(&mut self) {
        if self.frame_request.is_some() {
            return;
        }
        log::info!("Frame loop started");
        self.run_frame();
    }

    /// Cancel the outstanding frame request and mark the game not on.
    /// A no-op while stopped. In-flight asset loads are not affected.
    pub fn stop(&mut self) {
        if let Some(handle) = self.frame_request.take() {
            self.scheduler.cancel_frame(handle);
            self.state.on = false;
            log::info!("Frame loop stopped after {} frames", self.frame_count);
        }
    }

    pub fn is_running(&self) -> bool {
        self.frame_request.is_some()
    }

    /// Called by the host when a requested frame fires.
    /// Stale frames arriving after `stop` are ignored.
    pub fn tick(&mut self, timestamp_ms: f64) {
        if self.frame_request.is_none() {
            return;
        }
        self.frame_time_ms = timestamp_ms;
        self.run_frame();
    }

    /// Request the next frame unconditionally, then render if every expected asset is loaded.
    fn run_frame(&mut self) {
        self.frame_request = Some(self.scheduler.request_frame());
        if self.loader.is_ready() {
            self.render();
        }
    }

    /// Clear every surface and run the frame callback. A no-op while paused.
    pub fn render(&mut self) {
        if self.state.paused {
            return;
        }
        let (w, h) = (self.config.width, self.config.height);
        for surface in self.surfaces.iter_mut() {
            surface.clear(0.0, 0.0, w, h);
        }
        self.frame_count += 1;
        self.run_frame_callback();
    }

    /// Install the per-frame game logic, replacing any previous callback.
    pub fn register_frame_callback(&mut self, callback: impl FnMut(&mut Engine) + 'static) {
        if self.frame_callback.is_some() {
            log::debug!("Replacing frame callback");
        }
        self.frame_callback = Some(Box::new(callback));
    }

    /// Run the registered frame callback once. Returns false if none is registered.
    pub fn run_frame_callback(&mut self) -> bool {
        let Some(mut callback) = self.frame_callback.take() else {
            return false;
        };
        callback(self);
        // A callback registered from inside the frame wins.
        if self.frame_callback.is_none() {
            self.frame_callback = Some(callback);
        }
        true
    }

    pub fn has_frame_callback(&self) -> bool {
        self.frame_callback.is_some()
    }

    /// Frames rendered so far (paused frames are not counted).
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Host timestamp of the last ticked frame, in milliseconds.
    pub fn frame_time_ms(&self) -> f64 {
        self.frame_time_ms
    }

    // -- Surfaces --

    pub fn surface_mut(&mut self, layer: RenderLayer) -> &mut dyn Surface {
        self.surfaces[layer.index()].as_mut()
    }

    /// Draw the single asset `name` on `layer`. Returns false if there is no such asset.
    pub fn draw_asset(&mut self, layer: RenderLayer, name: &str) -> bool {
        let Some(entity) = self.assets.get(name) else {
            return false;
        };
        entity.draw(self.surfaces[layer.index()].as_mut());
        true
    }

    /// Draw every entity of collection `name` on `layer`. Returns how many were drawn.
    pub fn draw_collection(&mut self, layer: RenderLayer, name: &str) -> usize {
        let Some(entities) = self.assets.collection(name) else {
            return 0;
        };
        let surface = self.surfaces[layer.index()].as_mut();
        for entity in entities {
            entity.draw(surface);
        }
        entities.len()
    }

    pub fn fill_text(&mut self, layer: RenderLayer, text: &str, x: f32, y: f32) {
        self.surfaces[layer.index()].fill_text(text, x, y);
    }

    // -- Assets --

    pub fn assets(&self) -> &AssetRegistry {
        &self.assets
    }

    pub fn assets_mut(&mut self) -> &mut AssetRegistry {
        &mut self.assets
    }

    pub fn loader(&self) -> &AssetLoader {
        &self.loader
    }

    /// Completed loads equal expected loads.
    pub fn is_ready(&self) -> bool {
        self.loader.is_ready()
    }

    /// Accept a batch of images. Nothing changes if the request is invalid.
    ///
    /// Returns one ticket per image; the matching `PendingLoad`s wait in
    /// `take_pending_loads` for the host to fetch.
    pub fn load_assets(&mut self, request: LoadRequest) -> EngineResult<Vec<LoadTicket>> {
        request.validate()?;
        self.loader.check_names(&request, &self.assets)?;
        Ok(self.loader.begin(&request, &mut self.assets))
    }

    /// Parse a JSON `LoadRequest` and accept it.
    pub fn load_assets_json(&mut self, json: &str) -> EngineResult<Vec<LoadTicket>> {
        self.load_assets(LoadRequest::from_json(json)?)
    }

    /// Loads the host should start now.
    pub fn take_pending_loads(&mut self) -> Vec<PendingLoad> {
        self.loader.take_pending()
    }

    /// Host report: the image for `ticket` loaded with the given dimensions.
    /// Fires the ready callbacks if this completion reaches the expected total.
    pub fn asset_loaded(&mut self, ticket: LoadTicket, info: ImageInfo) -> EngineResult<()> {
        let completion = self
            .loader
            .complete(ticket, info, self.config.gravity_y, &mut self.assets)?;
        if completion.ready {
            log::info!("All {} assets ready", self.loader.expected());
            self.notify_ready();
        }
        Ok(())
    }

    /// Host report: the image for `ticket` failed to fetch or decode.
    /// The failure goes to the error callbacks; the ticket can be retried.
    pub fn asset_failed(&mut self, ticket: LoadTicket, reason: &str) -> EngineResult<()> {
        let error = self.loader.fail(ticket, reason)?;
        log::warn!("{}", error);
        self.notify_error(&error);
        Ok(())
    }

    /// Queue every failed image again. Returns how many were queued.
    pub fn retry_failed_loads(&mut self) -> usize {
        let count = self.loader.retry_failed();
        if count > 0 {
            log::info!("Retrying {} failed asset(s)", count);
        }
        count
    }

    /// Queue one failed image again. Returns false if `ticket` has not failed.
    pub fn retry_load(&mut self, ticket: LoadTicket) -> bool {
        let queued = self.loader.retry(ticket);
        if queued {
            log::info!("Retrying asset {}", ticket);
        }
        queued
    }

    /// Call `callback` every time the loader becomes ready.
    pub fn on_load(&mut self, callback: impl FnMut(&mut Engine) + 'static) {
        self.ready_callbacks.push(Box::new(callback));
    }

    /// Call `callback` for every asset that fails to load.
    pub fn on_load_error(&mut self, callback: impl FnMut(&mut Engine, &EngineError) + 'static) {
        self.error_callbacks.push(Box::new(callback));
    }

    fn notify_ready(&mut self) {
        let mut callbacks = std::mem::take(&mut self.ready_callbacks);
        for callback in callbacks.iter_mut() {
            callback(self);
        }
        callbacks.append(&mut self.ready_callbacks);
        self.ready_callbacks = callbacks;
    }

    fn notify_error(&mut self, error: &EngineError) {
        let mut callbacks = std::mem::take(&mut self.error_callbacks);
        for callback in callbacks.iter_mut() {
            callback(self, error);
        }
        callbacks.append(&mut self.error_callbacks);
        self.error_callbacks = callbacks;
    }

    // -- Input --

    /// Call `callback` for every click on the container.
    pub fn clicks_on_container(&mut self, callback: impl FnMut(&mut Engine, Vec2) + 'static) {
        self.click_callbacks.push(Box::new(callback));
    }

    /// Host report: the container was clicked at (x, y) in play-area pixels.
    pub fn handle_click(&mut self, x: f32, y: f32) {
        let mut callbacks = std::mem::take(&mut self.click_callbacks);
        for callback in callbacks.iter_mut() {
            callback(self, Vec2::new(x, y));
        }
        callbacks.append(&mut self.click_callbacks);
        self.click_callbacks = callbacks;
    }
}
