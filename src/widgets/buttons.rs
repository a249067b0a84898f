//! Click-to-action buttons (play, status overlay, seek, fullscreen).

use crate::core::controller::PlaybackController;
use crate::core::dom::{ListenOptions, Listener, Target};
use crate::core::shortcuts::PlayerAction;

use super::Widget;

/// A button that runs one [`PlayerAction`] per click
#[derive(Debug, Clone)]
pub struct ControlButton {
    target: Target,
    action: PlayerAction,
    group: String,
}

impl ControlButton {
    pub fn new(target: Target, action: PlayerAction, group: impl Into<String>) -> Self {
        Self {
            target,
            action,
            group: group.into(),
        }
    }

    pub fn play(target: Target) -> Self {
        Self::new(target, PlayerAction::TogglePlay, "playButton")
    }

    /// Central overlay button; a click on it toggles playback too
    pub fn status(target: Target) -> Self {
        Self::new(target, PlayerAction::TogglePlay, "centerPlayButton")
    }

    pub fn seek_backward(target: Target) -> Self {
        Self::new(target, PlayerAction::SeekBackward, "seekBackwardButton")
    }

    pub fn seek_forward(target: Target) -> Self {
        Self::new(target, PlayerAction::SeekForward, "seekForwardButton")
    }

    pub fn fullscreen(target: Target) -> Self {
        Self::new(target, PlayerAction::ToggleFullscreen, "fullscreenButton")
    }

    /// Same button under another registry group
    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.group = group.into();
        self
    }
}

impl Widget for ControlButton {
    fn group(&self) -> &str {
        &self.group
    }

    fn mount(&self, controller: &PlaybackController) {
        let weak = controller.downgrade();
        let action = self.action;
        controller.registry().bind(
            &self.target,
            "click",
            Listener::new(move |_| {
                if let Some(controller) = weak.upgrade() {
                    action.apply(&controller);
                }
            }),
            ListenOptions::group(self.group.clone()),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PlayerSettings;
    use crate::core::controller::OverlayAction;
    use crate::core::event_registry::EventRegistry;
    use crate::core::host::{Document, Icon, MediaElement, MediaHandle, WidgetId};
    use crate::headless::{HeadlessDocument, HeadlessMedia, HeadlessTarget, RecordingSurface};
    use std::sync::Arc;

    fn controller(surface: Arc<RecordingSurface>, document: Arc<HeadlessDocument>) -> (PlaybackController, Arc<HeadlessMedia>) {
        let media = HeadlessMedia::with_duration(60.0);
        let controller = PlaybackController::new(
            EventRegistry::new(),
            Document::new(document),
            surface,
            PlayerSettings::default(),
        );
        controller.set_media_element(MediaHandle::new(Arc::clone(&media)));
        (controller, media)
    }

    #[test]
    fn test_play_button_toggles() {
        let surface = RecordingSurface::new();
        let (controller, media) = controller(surface.clone(), HeadlessDocument::new());
        let button = HeadlessTarget::new("playButton");
        ControlButton::play(button.target()).mount(&controller);

        button.emit("click");
        assert!(!media.paused());
        assert!(!media.controls());
        assert_eq!(surface.icon(WidgetId::PlayButton), Some(Icon::Pause));
        assert_eq!(controller.last_overlay_action(), Some(OverlayAction::Play));

        button.emit("click");
        assert!(media.paused());
        assert_eq!(surface.icon(WidgetId::PlayButton), Some(Icon::Play));
    }

    #[test]
    fn test_seek_buttons() {
        let (controller, media) = controller(RecordingSurface::new(), HeadlessDocument::new());
        let back = HeadlessTarget::new("back");
        let fwd = HeadlessTarget::new("fwd");
        ControlButton::seek_backward(back.target()).mount(&controller);
        ControlButton::seek_forward(fwd.target()).mount(&controller);

        media.set_current_time(58.0);
        fwd.emit("click");
        assert_eq!(media.current_time(), 60.0);
        back.emit("click");
        assert_eq!(media.current_time(), 55.0);
        assert_eq!(controller.last_overlay_action(), Some(OverlayAction::Backward));
    }

    #[test]
    fn test_fullscreen_button_requests() {
        let document = HeadlessDocument::new();
        let (controller, _media) = controller(RecordingSurface::new(), Arc::clone(&document));
        let button = HeadlessTarget::new("fs");
        ControlButton::fullscreen(button.target()).mount(&controller);

        button.emit("click");
        assert_eq!(document.calls().len(), 1);
    }

    #[test]
    fn test_unmount_only_own_group() {
        let (controller, _media) = controller(RecordingSurface::new(), HeadlessDocument::new());
        let play = HeadlessTarget::new("play");
        let status = HeadlessTarget::new("status");
        let play_button = ControlButton::play(play.target());
        play_button.mount(&controller);
        ControlButton::status(status.target()).mount(&controller);

        assert_eq!(play_button.unmount(&controller), 1);
        assert_eq!(play.binding_count(), 0);
        assert_eq!(status.binding_count(), 1);
    }
}
