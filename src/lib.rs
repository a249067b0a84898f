//! VIDPLAY - custom video player controls
//!
//! Keyboard shortcuts, a self-hiding status overlay, seek/volume/fullscreen
//! controls and a grouped event-listener registry, driven through host
//! traits so any DOM-like backend can plug in.

// Core (registry, controller, host seams)
pub mod core;

// App modules
pub mod config;
pub mod headless;
pub mod player;
pub mod widgets;

// Re-export commonly used types from core
pub use core::controller::{OverlayAction, OverlayState, PlaybackController};
pub use core::event_registry::EventRegistry;
pub use core::shortcuts::{Keymap, PlayerAction};

pub use config::{PathConfig, PlayerSettings};
pub use player::{PlayerElements, VideoPlayer};
