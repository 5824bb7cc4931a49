//! Orchard Scene - physics toy scene core
//!
//! Apples fall from the sky, the player drags a basket under them, and a
//! basket holding three apples carried to the sun makes the sun brighter.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────── Scene ─────────────────────────────┐
//! │                                                                │
//! │  AssetGateway ──► Spawner ──────────┐                          │
//! │        │                            ▼                          │
//! │        └────────► ContainerManager ─► PhysicsWorld ◄── input   │
//! │                                         │   (forces, nudges)   │
//! │                          CollisionRules ◄┘                     │
//! │                                         │                      │
//! │          ProxyRegistry ◄── mirror ◄─────┘                      │
//! │                │                                               │
//! │                ▼                                               │
//! │        delivery check ──► RenderSurface                        │
//! └────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```ignore
//! use orchard_scene::prelude::*;
//!
//! let mut scene = Scene::new(SceneConfig::default(), gateway, MessageBanner::default())?;
//! loop {
//!     scene.tick_spawn_timer(Duration::from_millis(16));
//!     scene.frame(1.0 / 60.0, &mut surface);
//! }
//! scene.shutdown();
//! ```

pub mod camera;
pub mod config;
pub mod container;
pub mod delivery;
pub mod error;
pub mod frame;
pub mod interaction;
pub mod message;
pub mod proxy;
pub mod rules;
pub mod session;
pub mod spawner;
pub mod timer;
pub mod tracked;

pub mod prelude {
    //! Common imports for hosting a scene
    pub use crate::camera::{Camera, Ray};
    pub use crate::config::SceneConfig;
    pub use crate::container::{ActiveContainer, ContainerGeometry, ContainerState};
    pub use crate::delivery::{should_deliver, Illumination};
    pub use crate::error::{SceneError, SceneResult};
    pub use crate::frame::{FrameReport, FrameSnapshot, NullSurface, ProxySnapshot, RenderSurface};
    pub use crate::interaction::{DragState, InputEvent, Key};
    pub use crate::message::{MessageLog, MessageSink, MessageSnapshot};
    pub use crate::proxy::{ProxyId, ProxyRegistry};
    pub use crate::rules::is_contained;
    pub use crate::session::{Scene, SceneStats};
    pub use crate::timer::ScheduleState;
    pub use crate::tracked::{BodyRole, TrackedBody};
}

pub use prelude::*;
