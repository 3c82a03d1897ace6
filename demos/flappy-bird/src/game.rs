use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use flappy_engine::{
    AssetDescriptor, AssetRegistry, Engine, EngineError, LoadRequest, LoadTicket, RenderLayer,
};
use glam::Vec2;

use crate::rng::Rng;

pub const BACKGROUND: &str = "background";
pub const BIRD: &str = "bird";
pub const PIPES_TOP: &str = "pipes-top";
pub const PIPES_BOTTOM: &str = "pipes-bottom";

const BIRD_START: Vec2 = Vec2::new(60.0, 200.0);
const FLAP_IMPULSE: f32 = 4.5;
const PIPE_PAIRS: u32 = 3;
const PIPE_SPEED: f32 = 2.0;
const PIPE_SPACING: f32 = 180.0;
const PIPE_GAP: f32 = 110.0;
const GAP_MARGIN: f32 = 60.0;
/// Fetches per image before the game gives up on it.
pub const MAX_LOAD_ATTEMPTS: u32 = 3;

/// The three batches the game needs: scenery, top pipes, bottom pipes.
pub fn asset_requests(base: &str) -> Vec<LoadRequest> {
    vec![
        LoadRequest::new()
            .with_asset(AssetDescriptor::new(format!("{base}/background.png")).named(BACKGROUND))
            .with_asset(
                AssetDescriptor::new(format!("{base}/bird.png"))
                    .named(BIRD)
                    .with_offset(BIRD_START.x, BIRD_START.y),
            ),
        LoadRequest::collection(PIPES_TOP)
            .with_asset(AssetDescriptor::new(format!("{base}/pipe-top.png")))
            .with_amount(PIPE_PAIRS),
        LoadRequest::collection(PIPES_BOTTOM)
            .with_asset(AssetDescriptor::new(format!("{base}/pipe-bottom.png")))
            .with_amount(PIPE_PAIRS),
    ]
}

/// Round state layered over the engine: score, best score, crash flag.
pub struct FlappyBird {
    score: u32,
    best: u32,
    crashed: bool,
    scored: Vec<bool>,
    rng: Rng,
    load_attempts: HashMap<LoadTicket, u32>,
    load_failure: Option<String>,
}

impl FlappyBird {
    pub fn new(seed: u64) -> Self {
        Self {
            score: 0,
            best: 0,
            crashed: false,
            scored: vec![false; PIPE_PAIRS as usize],
            rng: Rng::new(seed),
            load_attempts: HashMap::new(),
            load_failure: None,
        }
    }

    /// Register the game's callbacks on `engine`. Assets are requested separately.
    pub fn install(engine: &mut Engine, seed: u64) -> Rc<RefCell<FlappyBird>> {
        let game = Rc::new(RefCell::new(FlappyBird::new(seed)));

        let on_ready = game.clone();
        engine.on_load(move |engine| on_ready.borrow_mut().layout(engine));

        let on_click = game.clone();
        engine.clicks_on_container(move |engine, _| {
            on_click.borrow_mut().flap(engine);
            // Outside the borrow: starting renders a frame, which borrows the game again.
            engine.start();
        });

        let on_frame = game.clone();
        engine.register_frame_callback(move |engine| on_frame.borrow_mut().frame(engine));

        let on_error = game.clone();
        engine.on_load_error(move |engine, error| on_error.borrow_mut().load_failed(engine, error));

        game
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn best(&self) -> u32 {
        self.best
    }

    pub fn is_crashed(&self) -> bool {
        self.crashed
    }

    /// The image the game gave up loading, if any.
    pub fn load_failure(&self) -> Option<&str> {
        self.load_failure.as_deref()
    }

    /// Retry a failed image until it has failed `MAX_LOAD_ATTEMPTS` times.
    /// Then stop fetching it and print the failure, since no frame will render.
    fn load_failed(&mut self, engine: &mut Engine, error: &EngineError) {
        let EngineError::AssetLoad { ticket, src, .. } = error else {
            log::error!("{}", error);
            return;
        };
        let attempts = self.load_attempts.entry(*ticket).or_insert(0);
        *attempts += 1;
        if *attempts < MAX_LOAD_ATTEMPTS {
            log::warn!("{}; retrying ({}/{})", error, attempts, MAX_LOAD_ATTEMPTS);
            engine.retry_load(*ticket);
            return;
        }
        log::error!("{}; giving up after {} attempts", error, attempts);
        let message = format!("Could not load {src}");
        engine.fill_text(RenderLayer::Foreground, &message, 10.0, 30.0);
        self.load_failure = Some(src.clone());
    }

    /// Spread pipe pairs off the right edge with fresh gaps.
    fn layout(&mut self, engine: &mut Engine) {
        let (width, height) = (engine.width(), engine.height());
        for i in 0..PIPE_PAIRS as usize {
            let gap_y = self.next_gap(height);
            place_pair(engine.assets_mut(), i, width + i as f32 * PIPE_SPACING, gap_y);
        }
        self.scored.iter_mut().for_each(|s| *s = false);
    }

    fn next_gap(&mut self, height: f32) -> f32 {
        self.rng.range(GAP_MARGIN, height - PIPE_GAP - GAP_MARGIN)
    }

    /// Click: start a round, flap, or restart after a crash.
    fn flap(&mut self, engine: &mut Engine) {
        if self.crashed {
            self.new_round(engine);
        }
        if !engine.is_on() {
            engine.play();
        }
        if let Some(bird) = engine.assets_mut().get_mut(BIRD) {
            bird.rise(FLAP_IMPULSE);
        }
    }

    fn new_round(&mut self, engine: &mut Engine) {
        engine.reset();
        self.score = 0;
        self.crashed = false;
        self.layout(engine);
        log::info!("New round (best {})", self.best);
    }

    fn frame(&mut self, engine: &mut Engine) {
        if engine.is_on() && !self.crashed {
            self.advance(engine);
            self.check(engine);
        }
        self.draw(engine);
    }

    fn advance(&mut self, engine: &mut Engine) {
        let height = engine.height();
        let assets = engine.assets_mut();

        let mut recycled = Vec::new();
        if let Some(tops) = assets.collection_mut(PIPES_TOP) {
            for (i, pipe) in tops.iter_mut().enumerate() {
                pipe.movement(PIPE_SPEED).left();
                if pipe.has_passed(0.0) {
                    recycled.push((i, pipe.pos.x));
                }
            }
        }
        if let Some(bottoms) = assets.collection_mut(PIPES_BOTTOM) {
            for pipe in bottoms.iter_mut() {
                pipe.movement(PIPE_SPEED).left();
            }
        }
        for (i, x) in recycled {
            let gap_y = self.next_gap(height);
            place_pair(assets, i, x + PIPE_SPACING * PIPE_PAIRS as f32, gap_y);
            if let Some(scored) = self.scored.get_mut(i) {
                *scored = false;
            }
        }

        if let Some(bird) = assets.get_mut(BIRD) {
            bird.fall();
        }
    }

    fn check(&mut self, engine: &mut Engine) {
        let assets = engine.assets();
        let Some(bird) = assets.get(BIRD) else {
            return;
        };
        let tops = assets.collection(PIPES_TOP).unwrap_or(&[]);
        let bottoms = assets.collection(PIPES_BOTTOM).unwrap_or(&[]);

        let hit = tops.iter().chain(bottoms).any(|pipe| bird.collides_with(pipe));
        let out = engine.is_out_of_bounds(bird);

        for (pipe, scored) in tops.iter().zip(self.scored.iter_mut()) {
            if !*scored && pipe.has_passed(bird.pos.x) {
                *scored = true;
                self.score += 1;
            }
        }

        if hit || out {
            self.crashed = true;
            self.best = self.best.max(self.score);
            log::info!("Crashed with score {}", self.score);
            engine.stop();
        }
    }

    fn draw(&self, engine: &mut Engine) {
        engine.draw_asset(RenderLayer::Background, BACKGROUND);
        engine.draw_collection(RenderLayer::Game, PIPES_TOP);
        engine.draw_collection(RenderLayer::Game, PIPES_BOTTOM);
        engine.draw_asset(RenderLayer::Game, BIRD);

        let x = engine.width() / 2.0;
        engine.fill_text(RenderLayer::Foreground, &self.score.to_string(), x, 50.0);
        if engine.is_idle() {
            engine.fill_text(RenderLayer::Foreground, "Click to flap", x - 40.0, 120.0);
        } else if self.crashed {
            let best = format!("Best {}", self.best);
            engine.fill_text(RenderLayer::Foreground, &best, x - 20.0, 120.0);
        }
    }
}

/// Put pipe pair `index` at `x` with its gap starting at `gap_y`.
fn place_pair(assets: &mut AssetRegistry, index: usize, x: f32, gap_y: f32) {
    if let Some(top) = assets.collection_mut(PIPES_TOP).and_then(|p| p.get_mut(index)) {
        top.pos = Vec2::new(x, gap_y - top.height());
    }
    if let Some(bottom) = assets.collection_mut(PIPES_BOTTOM).and_then(|p| p.get_mut(index)) {
        bottom.pos = Vec2::new(x, gap_y + PIPE_GAP);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flappy_engine::{EngineConfig, Headless, ImageInfo};

    fn setup(gravity_y: f32) -> (Engine, Headless, Rc<RefCell<FlappyBird>>) {
        let config = EngineConfig::default().with_size(288.0, 512.0).with_gravity(gravity_y);
        let (mut engine, host) = Engine::headless(config);
        let game = FlappyBird::install(&mut engine, 7);
        for request in asset_requests("img") {
            engine.load_assets(request).unwrap();
        }
        for load in engine.take_pending_loads() {
            let info = if load.src.ends_with("bird.png") {
                ImageInfo::new(34, 24)
            } else if load.src.ends_with("background.png") {
                ImageInfo::new(288, 512)
            } else {
                ImageInfo::new(52, 320)
            };
            engine.asset_loaded(load.ticket, info).unwrap();
        }
        (engine, host, game)
    }

    #[test]
    fn ready_lays_pipes_out_past_the_right_edge() {
        let (engine, _, game) = setup(-0.19);
        let tops = engine.assets().collection(PIPES_TOP).unwrap();
        assert_eq!(tops.len(), PIPE_PAIRS as usize);
        assert!(tops.iter().all(|p| p.pos.x >= engine.width()));
        let bottoms = engine.assets().collection(PIPES_BOTTOM).unwrap();
        for (top, bottom) in tops.iter().zip(bottoms) {
            assert_eq!(top.pos.x, bottom.pos.x);
            assert!((bottom.pos.y - top.bottom() - PIPE_GAP).abs() < 1e-3);
        }
        assert_eq!(game.borrow().score(), 0);
        assert!(engine.is_idle());
    }

    #[test]
    fn click_starts_and_flaps() {
        let (mut engine, host, _) = setup(-0.19);
        engine.handle_click(0.0, 0.0);
        assert!(engine.is_on());
        assert!(engine.is_running());
        assert_eq!(host.scheduler.requested(), 1);
        // The first frame ran right away: one flap, then one fall step.
        let bird = engine.assets().get(BIRD).unwrap();
        assert!((bird.velocity_y - (-FLAP_IMPULSE + 0.19)).abs() < 1e-4);
        assert!(bird.pos.y < BIRD_START.y);
    }

    #[test]
    fn idle_frames_do_not_simulate() {
        let (mut engine, host, _) = setup(-0.19);
        engine.start();
        host.step(&mut engine, 16.0);
        assert_eq!(engine.assets().get(BIRD).unwrap().pos, BIRD_START);
        let fg = host.surface(RenderLayer::Foreground).commands();
        assert!(fg.iter().any(|c| matches!(c, flappy_engine::DrawCommand::Text { text, .. } if text == "Click to flap")));
    }

    #[test]
    fn falling_bird_crashes_and_stops_the_loop() {
        let (mut engine, host, game) = setup(-0.19);
        engine.play();
        engine.start();
        let mut ts = 0.0;
        while engine.is_running() && ts < 60_000.0 {
            ts += 16.0;
            host.step(&mut engine, ts);
        }
        assert!(game.borrow().is_crashed());
        assert!(!engine.is_on());
    }

    #[test]
    fn passing_a_pipe_scores() {
        let (mut engine, host, game) = setup(0.0);
        let bird = engine.assets().get(BIRD).unwrap().clone();
        place_pair(engine.assets_mut(), 0, bird.right() + 1.0, bird.pos.y - 50.0);
        engine.play();
        engine.start();

        let mut ts = 0.0;
        while game.borrow().score() == 0 && ts < 5_000.0 {
            ts += 16.0;
            host.step(&mut engine, ts);
        }
        assert_eq!(game.borrow().score(), 1);
        assert!(!game.borrow().is_crashed());
        assert!(engine.is_running());
    }

    #[test]
    fn click_after_crash_starts_a_new_round() {
        let (mut engine, host, game) = setup(-0.19);
        engine.handle_click(0.0, 0.0);
        let mut ts = 0.0;
        while engine.is_running() && ts < 60_000.0 {
            ts += 16.0;
            host.step(&mut engine, ts);
        }
        assert!(game.borrow().is_crashed());

        engine.handle_click(0.0, 0.0);
        assert!(!game.borrow().is_crashed());
        assert_eq!(game.borrow().score(), 0);
        assert!(engine.is_on());
        assert!(engine.is_running());
        let bird = engine.assets().get(BIRD).unwrap();
        assert_eq!(bird.pos.x, BIRD_START.x);
        assert!(bird.pos.y < BIRD_START.y);
        assert!((bird.velocity_y - (-FLAP_IMPULSE + 0.19)).abs() < 1e-4);
    }

    #[test]
    fn failed_pipe_image_is_retried() {
        let config = EngineConfig::default().with_size(288.0, 512.0);
        let (mut engine, _) = Engine::headless(config);
        FlappyBird::install(&mut engine, 1);
        engine.load_assets(asset_requests("img").remove(1)).unwrap();
        let first = engine.take_pending_loads();
        engine.asset_failed(first[0].ticket, "timeout").unwrap();
        let retried = engine.take_pending_loads();
        assert_eq!(retried.len(), 1);
        assert_eq!(retried[0].ticket, first[0].ticket);
    }

    #[test]
    fn missing_image_gives_up_after_max_attempts() {
        let config = EngineConfig::default().with_size(288.0, 512.0);
        let (mut engine, host) = Engine::headless(config);
        let game = FlappyBird::install(&mut engine, 1);
        engine.load_assets(asset_requests("img").remove(1)).unwrap();

        let mut attempts = 0;
        loop {
            let pending = engine.take_pending_loads();
            if pending.is_empty() || attempts > 100 {
                break;
            }
            for load in pending {
                attempts += 1;
                engine.asset_failed(load.ticket, "404 Not Found").unwrap();
            }
        }
        assert_eq!(attempts, MAX_LOAD_ATTEMPTS);
        assert_eq!(game.borrow().load_failure(), Some("img/pipe-top.png"));
        assert!(!engine.is_ready());
        let fg = host.surface(RenderLayer::Foreground).commands();
        assert!(fg.iter().any(|c| matches!(c, flappy_engine::DrawCommand::Text { text, .. } if text == "Could not load img/pipe-top.png")));
    }

    #[test]
    fn retries_are_counted_per_image() {
        let config = EngineConfig::default().with_size(288.0, 512.0);
        let (mut engine, _) = Engine::headless(config);
        FlappyBird::install(&mut engine, 1);
        let mut requests = asset_requests("img");
        engine.load_assets(requests.remove(1)).unwrap();
        engine.load_assets(requests.remove(1)).unwrap();
        let first = engine.take_pending_loads();
        assert_eq!(first.len(), 2);

        // The top pipe uses up its attempts; the bottom pipe still gets retried.
        let top = first[0].ticket;
        engine.asset_failed(top, "404").unwrap();
        engine.asset_failed(top, "404").unwrap();
        engine.asset_failed(top, "404").unwrap();
        engine.asset_failed(first[1].ticket, "timeout").unwrap();

        let retried: Vec<_> = engine.take_pending_loads().into_iter().map(|l| l.ticket).collect();
        assert!(retried.contains(&first[1].ticket));
        assert_eq!(retried.iter().filter(|t| **t == top).count(), 2);
    }
}
