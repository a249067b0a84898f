//! Keyboard shortcuts - physical key code to playback action.
//!
//! Default bindings:
//! - **Space**: play/pause
//! - **ArrowLeft / ArrowRight**: seek back / forward one step
//! - **ArrowUp / ArrowDown**: volume up / down one step
//! - **KeyM**: mute toggle
//! - **KeyF**: fullscreen toggle
//!
//! Mapped keys always prevent the browser default; unmapped keys pass through.
//! A click on the media element itself toggles playback.

use indexmap::IndexMap;
use log::trace;
use serde::{Deserialize, Serialize};

use super::controller::PlaybackController;
use super::dom::{Event, ListenOptions, Listener, Target};

/// Playback action reachable from input
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlayerAction {
    TogglePlay,
    SeekBackward,
    SeekForward,
    VolumeUp,
    VolumeDown,
    ToggleMute,
    ToggleFullscreen,
}

impl PlayerAction {
    /// Run the action on `controller`
    pub fn apply(&self, controller: &PlaybackController) {
        match self {
            PlayerAction::TogglePlay => controller.toggle_video(),
            PlayerAction::SeekBackward => controller.seek_backward(),
            PlayerAction::SeekForward => controller.seek_forward(),
            PlayerAction::VolumeUp => controller.increment_volume(),
            PlayerAction::VolumeDown => controller.decrement_volume(),
            PlayerAction::ToggleMute => controller.toggle_mute(),
            PlayerAction::ToggleFullscreen => controller.toggle_fullscreen(),
        }
    }
}

/// Key code to action table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Keymap {
    bindings: IndexMap<String, PlayerAction>,
}

impl Default for Keymap {
    fn default() -> Self {
        let mut keymap = Self::empty();
        keymap.setup_default_bindings();
        keymap
    }
}

impl Keymap {
    pub fn empty() -> Self {
        Self { bindings: IndexMap::new() }
    }

    pub fn setup_default_bindings(&mut self) {
        use PlayerAction::*;

        self.add_binding("Space", TogglePlay);
        self.add_binding("ArrowLeft", SeekBackward);
        self.add_binding("ArrowRight", SeekForward);
        self.add_binding("ArrowUp", VolumeUp);
        self.add_binding("ArrowDown", VolumeDown);
        self.add_binding("KeyM", ToggleMute);
        self.add_binding("KeyF", ToggleFullscreen);
    }

    /// Bind `code`, replacing any previous action for it
    pub fn add_binding(&mut self, code: impl Into<String>, action: PlayerAction) {
        self.bindings.insert(code.into(), action);
    }

    pub fn remove_binding(&mut self, code: &str) -> Option<PlayerAction> {
        self.bindings.shift_remove(code)
    }

    pub fn action_for(&self, code: &str) -> Option<PlayerAction> {
        self.bindings.get(code).copied()
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, PlayerAction)> {
        self.bindings.iter().map(|(k, v)| (k.as_str(), *v))
    }
}

/// Installs the keyboard and media-click bindings. Holds no state.
pub struct ShortcutDispatcher;

impl ShortcutDispatcher {
    /// Bind `keydown` on `document` and `click` on `media`, both under `group`.
    ///
    /// Listeners hold a weak controller handle and do nothing once the
    /// controller is gone.
    pub fn install(
        controller: &PlaybackController,
        document: &Target,
        media: &Target,
        keymap: &Keymap,
        group: &str,
    ) {
        let registry = controller.registry();

        let weak = controller.downgrade();
        let keys = keymap.clone();
        registry.bind(
            document,
            "keydown",
            Listener::new(move |event| {
                if let Some(controller) = weak.upgrade() {
                    Self::handle_key(&controller, &keys, event);
                }
            }),
            ListenOptions::group(group),
        );

        let weak = controller.downgrade();
        registry.bind(
            media,
            "click",
            Listener::new(move |_| {
                if let Some(controller) = weak.upgrade() {
                    controller.toggle_video();
                }
            }),
            ListenOptions::group(group),
        );
        trace!("ShortcutDispatcher: {} key binding(s) installed under '{}'", keymap.len(), group);
    }

    /// Route one key event. Returns the action run, if the key is mapped.
    pub fn handle_key(controller: &PlaybackController, keymap: &Keymap, event: &Event) -> Option<PlayerAction> {
        let action = keymap.action_for(event.code()?)?;
        event.prevent_default();
        trace!("shortcut {:?} -> {:?}", event.code(), action);
        action.apply(controller);
        Some(action)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PlayerSettings;
    use crate::core::event_registry::EventRegistry;
    use crate::core::host::{Document, MediaElement, MediaHandle};
    use crate::headless::{HeadlessDocument, HeadlessMedia, RecordingSurface};
    use std::sync::Arc;

    fn setup() -> (PlaybackController, Arc<HeadlessMedia>, Arc<HeadlessDocument>) {
        let document = HeadlessDocument::new();
        let media = HeadlessMedia::with_duration(100.0);
        let controller = PlaybackController::new(
            EventRegistry::new(),
            Document::new(Arc::clone(&document)),
            RecordingSurface::new(),
            PlayerSettings::default(),
        );
        controller.set_media_element(MediaHandle::new(Arc::clone(&media)));
        controller.initialize();
        (controller, media, document)
    }

    #[test]
    fn test_default_bindings() {
        let keymap = Keymap::default();
        assert_eq!(keymap.len(), 7);
        assert_eq!(keymap.action_for("Space"), Some(PlayerAction::TogglePlay));
        assert_eq!(keymap.action_for("KeyF"), Some(PlayerAction::ToggleFullscreen));
        assert_eq!(keymap.action_for("KeyK"), None);
    }

    #[test]
    fn test_keys_drive_controller() {
        let (_controller, media, document) = setup();
        media.set_current_time(50.0);
        media.set_volume(0.5);

        let ev = document.key_down("Space");
        assert!(ev.default_prevented());
        assert!(!media.paused());

        document.key_down("ArrowRight");
        assert_eq!(media.current_time(), 55.0);
        document.key_down("ArrowLeft");
        document.key_down("ArrowLeft");
        assert_eq!(media.current_time(), 45.0);

        document.key_down("ArrowUp");
        assert!((media.volume() - 0.6).abs() < 1e-9);
        document.key_down("ArrowDown");
        assert!((media.volume() - 0.5).abs() < 1e-9);

        document.key_down("KeyM");
        assert!(media.muted());
    }

    #[test]
    fn test_fullscreen_key() {
        let (_controller, _media, document) = setup();
        document.key_down("KeyF");
        assert_eq!(document.calls().len(), 1);
    }

    #[test]
    fn test_unmapped_key_passes_through() {
        let (_controller, media, document) = setup();
        let ev = document.key_down("KeyQ");
        assert!(!ev.default_prevented());
        assert!(media.paused());

        // No code at all
        let ev = document.emit("keydown");
        assert!(!ev.default_prevented());
    }

    #[test]
    fn test_custom_keymap() {
        let mut keymap = Keymap::default();
        keymap.add_binding("KeyK", PlayerAction::TogglePlay);
        assert_eq!(keymap.remove_binding("Space"), Some(PlayerAction::TogglePlay));

        let (controller, media, _document) = setup();
        let ev = Event::key("keydown", "Space");
        assert_eq!(ShortcutDispatcher::handle_key(&controller, &keymap, &ev), None);
        let ev = Event::key("keydown", "KeyK");
        assert_eq!(
            ShortcutDispatcher::handle_key(&controller, &keymap, &ev),
            Some(PlayerAction::TogglePlay)
        );
        assert!(!media.paused());
    }

    #[test]
    fn test_dropped_controller_ignores_keys() {
        let (controller, media, document) = setup();
        drop(controller);
        document.key_down("Space");
        assert!(media.paused());
    }

    #[test]
    fn test_keymap_serde() {
        let json = r#"{"KeyP":"toggle_play","KeyL":"seek_forward"}"#;
        let keymap: Keymap = serde_json::from_str(json).unwrap();
        assert_eq!(keymap.action_for("KeyP"), Some(PlayerAction::TogglePlay));
        assert_eq!(keymap.iter().next(), Some(("KeyP", PlayerAction::TogglePlay)));
    }
}
