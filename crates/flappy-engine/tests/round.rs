use std::cell::Cell;
use std::rc::Rc;

use flappy_engine::{
    AssetDescriptor, DrawCommand, Engine, EngineConfig, ImageInfo, LoadRequest, RenderLayer,
};
use glam::Vec2;

const PIPE_SPEED: f32 = 2.0;

fn load_scene(engine: &mut Engine) {
    engine
        .load_assets(
            LoadRequest::new()
                .with_asset(AssetDescriptor::new("bg.png").named("background"))
                .with_asset(AssetDescriptor::new("bird.png").named("bird").with_offset(40.0, 100.0)),
        )
        .unwrap();
    engine
        .load_assets(
            LoadRequest::collection("pipes")
                .with_asset(AssetDescriptor::new("pipe.png").with_offset(200.0, 150.0))
                .with_amount(2),
        )
        .unwrap();
}

#[test]
fn full_round_until_collision_then_reset() {
    let (mut engine, host) = Engine::headless(EngineConfig::default().with_size(288.0, 512.0).with_gravity(-0.25));
    let crashed = Rc::new(Cell::new(false));
    let crash_flag = crashed.clone();

    engine.clicks_on_container(|engine, _| {
        if !engine.is_on() {
            engine.play();
        }
        if let Some(bird) = engine.assets_mut().get_mut("bird") {
            bird.rise(4.0);
        }
    });

    engine.register_frame_callback(move |engine| {
        engine.draw_asset(RenderLayer::Background, "background");
        if engine.is_on() {
            if let Some(pipes) = engine.assets_mut().collection_mut("pipes") {
                for pipe in pipes.iter_mut() {
                    pipe.movement(PIPE_SPEED).left();
                }
            }
            if let Some(bird) = engine.assets_mut().get_mut("bird") {
                bird.fall();
            }
            let bird = engine.assets().get("bird").cloned();
            let pipes = engine.assets().collection("pipes").unwrap_or(&[]).to_vec();
            if let Some(bird) = bird {
                let hit = pipes.iter().any(|p| bird.collides_with(p));
                if hit || engine.is_out_of_bounds(&bird) {
                    crash_flag.set(true);
                    engine.stop();
                }
            }
        }
        engine.draw_collection(RenderLayer::Game, "pipes");
        engine.draw_asset(RenderLayer::Game, "bird");
    });

    load_scene(&mut engine);
    assert_eq!(engine.loader().expected(), 3);

    engine.start();
    // Nothing renders until every image is in.
    assert_eq!(engine.frame_count(), 0);

    let pending = engine.take_pending_loads();
    assert_eq!(pending.len(), 3);
    for load in pending.iter().rev() {
        let info = match load.src.as_str() {
            "bg.png" => ImageInfo::new(288, 512),
            "bird.png" => ImageInfo::new(34, 24),
            _ => ImageInfo::new(52, 320),
        };
        engine.asset_loaded(load.ticket, info).unwrap();
    }
    assert_eq!(engine.assets().collection("pipes").unwrap().len(), 2);

    // Idle frames draw but do not simulate.
    host.step(&mut engine, 16.0);
    assert_eq!(engine.frame_count(), 1);
    assert_eq!(engine.assets().get("bird").unwrap().pos, Vec2::new(40.0, 100.0));

    engine.handle_click(10.0, 10.0);
    assert!(engine.is_on());

    let mut ts = 16.0;
    while engine.is_running() && ts < 10_000.0 {
        ts += 16.0;
        host.step(&mut engine, ts);
    }
    assert!(crashed.get(), "bird never crashed");
    assert!(!engine.is_on());

    let drawn = host.surface(RenderLayer::Game).commands();
    assert!(drawn.iter().any(|c| matches!(c, DrawCommand::Image { src, .. } if src == "bird.png")));

    engine.reset();
    let bird = engine.assets().get("bird").unwrap();
    assert_eq!(bird.pos, Vec2::new(40.0, 100.0));
    assert_eq!(bird.velocity_y, 0.0);
    assert!(engine
        .assets()
        .collection("pipes")
        .unwrap()
        .iter()
        .all(|p| p.pos == Vec2::new(200.0, 150.0)));
    assert!(engine.game_state().idle);
}

#[test]
fn pause_freezes_simulation_but_not_the_loop() {
    let (mut engine, host) = Engine::headless(EngineConfig::default());
    engine.register_frame_callback(|engine| {
        if let Some(bird) = engine.assets_mut().get_mut("bird") {
            bird.fall();
        }
    });
    engine
        .load_assets(LoadRequest::new().with_asset(AssetDescriptor::new("bird.png").named("bird")))
        .unwrap();
    host.load_all(&mut engine, ImageInfo::new(10, 10)).unwrap();
    engine.start();
    let after_first = engine.assets().get("bird").unwrap().pos.y;

    engine.toggle_pause();
    for i in 0..5 {
        host.step(&mut engine, 16.0 * (i + 1) as f64);
    }
    assert_eq!(engine.assets().get("bird").unwrap().pos.y, after_first);
    assert!(engine.is_running());

    engine.toggle_pause();
    host.step(&mut engine, 200.0);
    assert!(engine.assets().get("bird").unwrap().pos.y > after_first);
}
