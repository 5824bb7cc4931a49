//! Orchard HUD - transient overlay messages
//!
//! # Example
//!
//! ```ignore
//! use orchard_hud::prelude::*;
//!
//! let mut banner = MessageBanner::new(BannerConfig::default());
//! banner.show("Carry the basket to the sun");
//!
//! // Each frame
//! banner.update(delta_time);
//! let alpha = banner.opacity();
//! ```

pub mod banner;

pub mod prelude {
    pub use crate::banner::{BannerConfig, BannerPhase, MessageBanner};
}

pub use prelude::*;
