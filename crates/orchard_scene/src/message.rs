//! Transient message sink

use orchard_hud::MessageBanner;
use serde::{Deserialize, Serialize};

/// What the overlay currently shows
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageSnapshot {
    pub text: String,
    pub opacity: f32,
}

/// Fire-and-forget notification channel used for gameplay progress
pub trait MessageSink {
    fn show(&mut self, text: &str);

    fn hide(&mut self);

    /// Advance fade timers
    fn update(&mut self, _delta_time: f32) {}

    /// Visible message, if any
    fn current(&self) -> Option<MessageSnapshot> {
        None
    }
}

impl MessageSink for MessageBanner {
    fn show(&mut self, text: &str) {
        MessageBanner::show(self, text);
    }

    fn hide(&mut self) {
        MessageBanner::hide(self);
    }

    fn update(&mut self, delta_time: f32) {
        MessageBanner::update(self, delta_time);
    }

    fn current(&self) -> Option<MessageSnapshot> {
        self.is_visible().then(|| MessageSnapshot {
            text: self.text().to_string(),
            opacity: self.opacity(),
        })
    }
}

/// Sink that records every call
#[derive(Debug, Default, Clone)]
pub struct MessageLog {
    pub shown: Vec<String>,
    pub hides: usize,
    visible: bool,
}

impl MessageLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn show_count(&self) -> usize {
        self.shown.len()
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }
}

impl MessageSink for MessageLog {
    fn show(&mut self, text: &str) {
        self.shown.push(text.to_string());
        self.visible = true;
    }

    fn hide(&mut self) {
        self.hides += 1;
        self.visible = false;
    }

    fn current(&self) -> Option<MessageSnapshot> {
        match (self.visible, self.shown.last()) {
            (true, Some(text)) => Some(MessageSnapshot {
                text: text.clone(),
                opacity: 1.0,
            }),
            _ => None,
        }
    }
}
