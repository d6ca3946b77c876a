//! Dedicated simulation loop thread
//!
//! The loop ticks the world as fast as it can with a measured dt, and an
//! accumulator decides when a frame is due: each iteration adds the elapsed
//! time divided by the frame interval, and whenever the accumulator reaches
//! one, a frame is rendered and handed to the sink. Rendering never blocks
//! ticking for longer than one frame.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use std::time::Instant;

use crate::render::{Camera, Rasterizer};
use crate::world::World;

/// Receives each finished frame. The sink borrows the buffer for the
/// duration of the call; hosts typically copy it to their surface.
pub type FrameSink = Box<dyn FnMut(&Rasterizer) + Send>;

/// Handle to a running simulation thread.
pub struct Simulator {
    running: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl Simulator {
    /// Spawns the loop thread. The camera is shared so that input handling
    /// on the host side moves the same camera the loop renders with.
    pub fn start(
        world: Arc<World>,
        camera: Arc<Mutex<Camera>>,
        mut raster: Rasterizer,
        target_fps: f32,
        mut sink: FrameSink,
    ) -> Self {
        let running = Arc::new(AtomicBool::new(true));
        let flag = running.clone();
        let frame_interval = 1.0 / target_fps;

        let handle = std::thread::Builder::new()
            .name("sim-loop".into())
            .spawn(move || {
                let mut last = Instant::now();
                let mut accumulator = 0.0_f32;
                let mut ticks = 0_u64;
                let mut frames = 0_u64;
                while flag.load(Ordering::Relaxed) {
                    let now = Instant::now();
                    let dt = now.duration_since(last).as_secs_f32();
                    last = now;

                    world.tick(dt);
                    ticks += 1;

                    accumulator += dt / frame_interval;
                    if accumulator >= 1.0 {
                        accumulator -= 1.0;
                        let camera = camera.lock().unwrap().clone();
                        world.render(&camera, &mut raster);
                        sink(&raster);
                        frames += 1;
                    }
                }
                log::info!("sim loop stopped after {ticks} ticks, {frames} frames");
            })
            .expect("failed to spawn sim loop thread");

        Self {
            running,
            handle: Some(handle),
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Relaxed)
    }

    /// Signals the loop to stop and waits for the thread to finish. Safe to
    /// call more than once.
    pub fn stop(&mut self) {
        self.running.store(false, Ordering::Relaxed);
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                log::error!("sim loop thread panicked");
            }
        }
    }
}

impl Drop for Simulator {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts;
    use crate::entity::EntityHandle;
    use crate::sim::mass::PointMass;
    use glam::Vec3;
    use std::sync::atomic::AtomicU64;
    use std::time::Duration;

    #[test]
    fn test_loop_ticks_and_renders_until_stopped() {
        let world = Arc::new(World::new(consts::GRAVITY, 0.0, 1.0, 1));
        let mass = PointMass::shared(1.0, Vec3::new(0.0, 0.0, 10.0), 1.0).unwrap();
        world.register(mass.clone() as EntityHandle).unwrap();

        let camera = Arc::new(Mutex::new(
            Camera::new(Vec3::ZERO, 100.0, 1.0, 64, 64).unwrap(),
        ));
        let raster = Rasterizer::new(64, 64).unwrap();
        let frames = Arc::new(AtomicU64::new(0));
        let counter = frames.clone();

        let mut sim = Simulator::start(
            world,
            camera,
            raster,
            100.0,
            Box::new(move |_| {
                counter.fetch_add(1, Ordering::Relaxed);
            }),
        );
        std::thread::sleep(Duration::from_millis(200));
        sim.stop();
        assert!(!sim.is_running());

        // ~20 frames expected at 100 fps over 200 ms; allow generous slack
        // for scheduler jitter.
        assert!(frames.load(Ordering::Relaxed) >= 2);
        // The mass fell while the loop ran.
        assert!(mass.lock().unwrap().position.y < 0.0);
    }

    #[test]
    fn test_stop_is_idempotent() {
        let world = Arc::new(World::new(Vec3::ZERO, 0.0, 1.0, 1));
        let camera = Arc::new(Mutex::new(
            Camera::new(Vec3::ZERO, 100.0, 1.0, 8, 8).unwrap(),
        ));
        let raster = Rasterizer::new(8, 8).unwrap();
        let mut sim = Simulator::start(world, camera, raster, 30.0, Box::new(|_| {}));
        sim.stop();
        sim.stop();
    }
}
