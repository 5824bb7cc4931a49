//! Orchard Asset - prototype loading gateway
//!
//! Visual prototypes are requested by identifier and resolved later. A
//! request never completes inside the call that issued it; the caller polls
//! for completions once per frame.
//!
//! ```text
//! request("basket.glb") ──► LoadTicket
//!          ...
//! poll() ──► [LoadCompletion { ticket, identifier, result }]
//! ```
//!
//! Two gateways are provided:
//! - [`PrototypeServer`] reads files from an asset directory and decodes
//!   them with [`GlbPrototypeLoader`]
//! - [`ManualGateway`] lets the host resolve requests by hand

pub mod error;
pub mod gateway;
pub mod loader;
pub mod manual;
pub mod prototype;
pub mod server;

pub use error::LoadError;
pub use gateway::{AssetGateway, LoadCompletion, LoadTicket};
pub use loader::GlbPrototypeLoader;
pub use manual::ManualGateway;
pub use prototype::{Bounds, PrototypeNode, VisualPrototype};
pub use server::{PrototypeServer, PrototypeServerConfig};
