//! Core modules - event registry, host seams, playback controller
//!
//! These modules hold the player logic, independent of any widget.

pub mod controller;
pub mod dom;
pub mod event_registry;
pub mod host;
pub mod overlay_timer;
pub mod shortcuts;

// Re-exports for convenience
pub use controller::{OverlayAction, OverlayState, PlaybackController, WeakController};
pub use dom::{Event, EventTarget, ListenOptions, Listener, Target};
pub use event_registry::{EntryId, EventRegistry, ListenerEntry, SilencedEntry};
pub use host::{Document, FullscreenApi, FullscreenHost, Icon, MediaElement, MediaHandle, PlayerSurface, WidgetId};
pub use overlay_timer::OverlayTimer;
pub use shortcuts::{Keymap, PlayerAction, ShortcutDispatcher};
