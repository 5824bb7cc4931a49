//! Orchard runtime
//!
//! Headless host for the orchard scene: loads prototypes from the asset
//! directory, drives the frame loop at a fixed host rate and ticks the spawn
//! timer alongside it. Frame snapshots go to the log as JSON.
//!
//! Run with: cargo run -p orchard_runtime -- --frames 1200 --assets ./assets

mod boot_config;

use boot_config::RuntimeConfig;
use orchard_asset::PrototypeServer;
use orchard_hud::MessageBanner;
use orchard_scene::prelude::*;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Render surface that logs every Nth frame
struct LogSurface {
    every: u64,
    rendered: u64,
}

impl LogSurface {
    fn new(every: u64) -> Self {
        Self { every, rendered: 0 }
    }
}

impl RenderSurface for LogSurface {
    fn render(&mut self, frame: &FrameSnapshot) {
        self.rendered += 1;
        if self.every == 0 || frame.frame % self.every != 0 {
            return;
        }

        match serde_json::to_string(frame) {
            Ok(json) => log::debug!("frame {}: {}", frame.frame, json),
            Err(e) => log::warn!("Failed to encode frame {}: {}", frame.frame, e),
        }
        log::info!(
            "frame {}: {} proxies, light {:.1}{}",
            frame.frame,
            frame.proxies.len(),
            frame.light_intensity,
            frame
                .message
                .as_ref()
                .map(|m| format!(", message \"{}\" ({:.2})", m.text, m.opacity))
                .unwrap_or_default()
        );
    }
}

fn main() {
    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = match RuntimeConfig::load() {
        Ok(config) => config,
        Err(e) => {
            log::error!("{}", e);
            std::process::exit(2);
        }
    };
    config.print_summary();

    if let Err(e) = run(config) {
        log::error!("{}", e);
        std::process::exit(1);
    }
}

fn run(config: RuntimeConfig) -> Result<(), Box<dyn std::error::Error>> {
    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();

    if let Err(e) = ctrlc::set_handler(move || {
        log::info!("Received Ctrl+C, shutting down...");
        r.store(false, Ordering::SeqCst);
    }) {
        log::warn!("Failed to set Ctrl+C handler: {}", e);
    }

    let gateway = PrototypeServer::new(config.assets.clone());
    let banner = MessageBanner::new(config.banner);
    let mut scene = Scene::new(config.scene.clone(), gateway, banner)?;
    let mut surface = LogSurface::new(config.snapshot_every);

    let tick = Duration::from_secs_f32(config.frame_time);
    let mut spawned_by_timer = 0;

    for _ in 0..config.frames {
        if !running.load(Ordering::SeqCst) {
            break;
        }
        spawned_by_timer += scene.tick_spawn_timer(tick);
        let report = scene.frame(config.frame_time, &mut surface);
        if report.delivered {
            log::info!("Delivery on frame {}", report.frame);
        }
    }

    let stats = scene.stats();
    let illumination = scene.illumination();
    let frames = scene.frame_count();
    let container = format!("{:?}", scene.container_state());
    let objects = scene.objects().len();
    let rendered = surface.rendered;

    scene.shutdown();

    let summary = serde_json::json!({
        "frames": frames,
        "rendered": rendered,
        "objects_at_exit": objects,
        "spawned_by_timer": spawned_by_timer,
        "container": container,
        "stats": stats,
        "illumination": illumination,
        "bodies_after_shutdown": scene.world().body_count(),
        "proxies_after_shutdown": scene.proxies().len(),
    });
    println!("{}", serde_json::to_string_pretty(&summary)?);

    Ok(())
}
