//! Headless demo scenario
//!
//! Builds a small scene (a rope pendulum plus a pair of spheres on a
//! collision course), runs the loop thread for a few seconds and logs what
//! happened. Pass a JSON scenario file as the first argument to override the
//! defaults.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use glam::Vec3;

use spacesim::config::ScenarioConfig;
use spacesim::entity::EntityHandle;
use spacesim::render::Rasterizer;
use spacesim::runner::Simulator;
use spacesim::sim::{ImpulseConnection, PointMass};
use spacesim::world::World;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let config = match std::env::args().nth(1) {
        Some(path) => {
            log::info!("loading scenario from {path}");
            ScenarioConfig::from_json_str(&std::fs::read_to_string(&path)?)?
        }
        None => ScenarioConfig::default(),
    };

    let world = Arc::new(World::from_config(&config));
    let camera = Arc::new(Mutex::new(config.build_camera()?));
    let raster = Rasterizer::new(config.width, config.height)?;

    // Pendulum: an immovable anchor, a bob on a rope, and a sideways kick.
    let anchor = Arc::new(Mutex::new(
        PointMass::new(1.0, Vec3::new(0.0, 5.0, 0.0), 0.2)?.immovable(),
    ));
    let bob = PointMass::shared(2.0, Vec3::new(0.0, 1.0, 0.0), 0.5)?;
    bob.lock().unwrap().velocity = Vec3::new(3.0, 0.0, 0.0);
    bob.lock().unwrap().color = Vec3::new(255.0, 80.0, 80.0);
    let rope = ImpulseConnection::new(anchor.clone(), bob.clone(), 4.0, 1e6);

    world.register(anchor as EntityHandle)?;
    world.register(bob.clone() as EntityHandle)?;
    world.register(Arc::new(Mutex::new(rope)) as EntityHandle)?;

    // Two spheres meeting head-on below the pendulum.
    let left = PointMass::shared(1.0, Vec3::new(-6.0, -3.0, 0.0), 1.0)?;
    left.lock().unwrap().velocity = Vec3::new(4.0, 0.0, 0.0);
    left.lock().unwrap().color = Vec3::new(80.0, 255.0, 80.0);
    let right = PointMass::shared(3.0, Vec3::new(6.0, -3.0, 0.0), 1.0)?;
    right.lock().unwrap().velocity = Vec3::new(-4.0, 0.0, 0.0);
    right.lock().unwrap().color = Vec3::new(80.0, 80.0, 255.0);
    world.register(left as EntityHandle)?;
    world.register(right as EntityHandle)?;

    let frames = Arc::new(AtomicU64::new(0));
    let counter = frames.clone();
    let mut sim = Simulator::start(
        world,
        camera,
        raster,
        config.render_fps,
        Box::new(move |_| {
            counter.fetch_add(1, Ordering::Relaxed);
        }),
    );

    std::thread::sleep(Duration::from_secs(5));
    sim.stop();

    log::info!(
        "rendered {} frames, pendulum bob ended at {}",
        frames.load(Ordering::Relaxed),
        bob.lock().unwrap().position
    );
    Ok(())
}
