//! Single-line message banner with fade in/out

use serde::{Deserialize, Serialize};

/// Banner timing
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BannerConfig {
    /// Seconds from `show` until the fade out starts
    pub duration: f32,
    /// Length of each fade in seconds
    pub fade: f32,
}

impl Default for BannerConfig {
    fn default() -> Self {
        Self {
            duration: 3.0,
            fade: 0.5,
        }
    }
}

/// Where the banner is in its show cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BannerPhase {
    Hidden,
    FadingIn,
    Holding,
    FadingOut,
}

/// A message shown for a fixed time, then faded away
#[derive(Debug, Clone)]
pub struct MessageBanner {
    config: BannerConfig,
    text: String,
    /// Seconds since the last `show`; `None` while hidden
    elapsed: Option<f32>,
}

impl Default for MessageBanner {
    fn default() -> Self {
        Self::new(BannerConfig::default())
    }
}

impl MessageBanner {
    /// Create a hidden banner
    pub fn new(config: BannerConfig) -> Self {
        Self {
            config,
            text: String::new(),
            elapsed: None,
        }
    }

    /// Display `text`, restarting the cycle if already visible
    pub fn show(&mut self, text: impl Into<String>) {
        self.text = text.into();
        self.elapsed = Some(0.0);
        log::debug!("Banner: {}", self.text);
    }

    /// Dismiss immediately
    pub fn hide(&mut self) {
        self.elapsed = None;
    }

    /// Advance the timer. Returns whether the banner is still visible.
    pub fn update(&mut self, delta_time: f32) -> bool {
        if let Some(elapsed) = self.elapsed.as_mut() {
            *elapsed += delta_time;
            if *elapsed >= self.config.duration + self.config.fade {
                self.elapsed = None;
            }
        }
        self.is_visible()
    }

    pub fn is_visible(&self) -> bool {
        self.elapsed.is_some()
    }

    /// Current text, empty until the first `show`
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn phase(&self) -> BannerPhase {
        match self.elapsed {
            None => BannerPhase::Hidden,
            Some(t) if t < self.config.fade => BannerPhase::FadingIn,
            Some(t) if t < self.config.duration => BannerPhase::Holding,
            Some(_) => BannerPhase::FadingOut,
        }
    }

    /// Opacity in [0, 1]
    pub fn opacity(&self) -> f32 {
        let fade = self.config.fade.max(f32::EPSILON);
        match (self.phase(), self.elapsed) {
            (BannerPhase::FadingIn, Some(t)) => (t / fade).clamp(0.0, 1.0),
            (BannerPhase::Holding, _) => 1.0,
            (BannerPhase::FadingOut, Some(t)) => {
                (1.0 - (t - self.config.duration) / fade).clamp(0.0, 1.0)
            }
            _ => 0.0,
        }
    }
}
