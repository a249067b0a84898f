//! Video player assembly: one controller plus its control widgets.
//!
//! **Used by**: the host page, once per `<video>` it decorates.
//!
//! # Lifecycle
//!
//! `mount()` attaches the media element, installs the controller bindings
//! (shortcuts, fullscreen), resets the overlay and mounts every widget.
//! `unmount()` drops each widget group and the controller group, then
//! forgets the media element. Dropping a mounted player unmounts it.
//!
//! # Groups
//!
//! Several players may share one registry. Each player scopes its groups
//! with a per-instance id (`videoPlayer-1a2b3c4d`, `videoPlayer-1a2b3c4d/playButton`),
//! so mounting or unmounting one player never touches another's bindings.
//!
//! # Frame loop
//!
//! The overlay auto-hide is polled: call [`VideoPlayer::tick`] from the
//! host's update loop.

use std::sync::Arc;

use log::{debug, info};
use uuid::Uuid;

use crate::config::PlayerSettings;
use crate::core::controller::PlaybackController;
use crate::core::dom::Target;
use crate::core::event_registry::EventRegistry;
use crate::core::host::{Document, MediaHandle, PlayerSurface};
use crate::widgets::{ControlButton, Seekbar, TimeDisplay, VolumeControl, Widget};

/// Event targets of one player instance
#[derive(Debug, Clone)]
pub struct PlayerElements {
    pub media: MediaHandle,
    pub play_button: Target,
    pub status_button: Target,
    pub seek_backward_button: Target,
    pub seek_forward_button: Target,
    pub fullscreen_button: Target,
    pub volume_button: Target,
    pub volume_slider: Target,
    pub seekbar: Target,
    /// Element starts muted (autoplay pages)
    pub start_muted: bool,
}

pub struct VideoPlayer {
    controller: PlaybackController,
    scope: String,
    widgets: Vec<Box<dyn Widget>>,
    mounted: bool,
}

impl VideoPlayer {
    pub fn new(
        registry: EventRegistry,
        document: Document,
        surface: Arc<dyn PlayerSurface>,
        mut settings: PlayerSettings,
    ) -> Self {
        let id = Uuid::new_v4().simple().to_string();
        let scope = format!("{}-{}", settings.controller_group, &id[..8]);
        settings.controller_group = scope.clone();
        Self {
            controller: PlaybackController::new(registry, document, surface, settings),
            scope,
            widgets: Vec::new(),
            mounted: false,
        }
    }

    pub fn controller(&self) -> &PlaybackController {
        &self.controller
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    /// Controller group; widget groups are `<scope>/<widget>`
    pub fn scope(&self) -> &str {
        &self.scope
    }

    fn scoped(&self, widget: &str) -> String {
        format!("{}/{}", self.scope, widget)
    }

    /// Wire the controller and widgets to `elements`. Remounts cleanly.
    pub fn mount(&mut self, elements: PlayerElements) {
        if self.mounted {
            debug!("VideoPlayer: remount, unmounting previous elements");
            self.unmount();
        }

        self.controller.set_media_element(elements.media);
        self.controller.initialize();
        self.controller.reset_overlay();

        let widgets: Vec<Box<dyn Widget>> = vec![
            Box::new(ControlButton::play(elements.play_button).with_group(self.scoped("playButton"))),
            Box::new(ControlButton::status(elements.status_button).with_group(self.scoped("centerPlayButton"))),
            Box::new(
                ControlButton::seek_backward(elements.seek_backward_button)
                    .with_group(self.scoped("seekBackwardButton")),
            ),
            Box::new(
                ControlButton::seek_forward(elements.seek_forward_button).with_group(self.scoped("seekForwardButton")),
            ),
            Box::new(ControlButton::fullscreen(elements.fullscreen_button).with_group(self.scoped("fullscreenButton"))),
            Box::new(
                VolumeControl::new(elements.volume_button, elements.volume_slider)
                    .start_muted(elements.start_muted)
                    .with_group(self.scoped("volume-control")),
            ),
            Box::new(Seekbar::new(elements.seekbar).with_group(self.scoped("vp-seekbar"))),
            Box::new(TimeDisplay::new(self.scoped("time-display"))),
        ];
        self.widgets = widgets;
        for widget in &self.widgets {
            widget.mount(&self.controller);
        }
        self.mounted = true;
        info!(
            "VideoPlayer mounted: {} widget(s), {} binding(s)",
            self.widgets.len(),
            self.controller.registry().len()
        );
    }

    /// Drop all bindings and the media element. Returns bindings removed.
    pub fn unmount(&mut self) -> usize {
        if !self.mounted {
            return 0;
        }
        let mut removed = 0;
        for widget in self.widgets.drain(..) {
            removed += widget.unmount(&self.controller);
        }
        removed += self.controller.cleanup();
        self.controller.clear_media_element();
        self.mounted = false;
        debug!("VideoPlayer unmounted: {} binding(s) removed", removed);
        removed
    }

    /// Poll the overlay auto-hide. Returns true when it fired.
    pub fn tick(&self) -> bool {
        self.controller.tick()
    }
}

impl Drop for VideoPlayer {
    fn drop(&mut self) {
        self.unmount();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::controller::OverlayState;
    use crate::core::dom::Event;
    use crate::core::host::{classes, Bounds, Icon, MediaElement, WidgetId};
    use crate::headless::{HeadlessDocument, HeadlessMedia, HeadlessTarget, RecordingSurface};
    use std::time::{Duration, Instant};

    struct Page {
        registry: EventRegistry,
        document: Arc<HeadlessDocument>,
        surface: Arc<RecordingSurface>,
        media: Arc<HeadlessMedia>,
        play: Arc<HeadlessTarget>,
        status: Arc<HeadlessTarget>,
        back: Arc<HeadlessTarget>,
        fwd: Arc<HeadlessTarget>,
        fs: Arc<HeadlessTarget>,
        vol_button: Arc<HeadlessTarget>,
        vol_slider: Arc<HeadlessTarget>,
        seekbar: Arc<HeadlessTarget>,
    }

    impl Page {
        fn new() -> Self {
            let _ = env_logger::builder().is_test(true).try_init();
            Self {
                registry: EventRegistry::new(),
                document: HeadlessDocument::new(),
                surface: RecordingSurface::new(),
                media: HeadlessMedia::with_duration(300.0),
                play: HeadlessTarget::new("play"),
                status: HeadlessTarget::new("status"),
                back: HeadlessTarget::new("back"),
                fwd: HeadlessTarget::new("fwd"),
                fs: HeadlessTarget::new("fs"),
                vol_button: HeadlessTarget::new("vol-button"),
                vol_slider: HeadlessTarget::new("vol-slider"),
                seekbar: HeadlessTarget::new("seekbar"),
            }
        }

        fn elements(&self) -> PlayerElements {
            PlayerElements {
                media: MediaHandle::new(Arc::clone(&self.media)),
                play_button: self.play.target(),
                status_button: self.status.target(),
                seek_backward_button: self.back.target(),
                seek_forward_button: self.fwd.target(),
                fullscreen_button: self.fs.target(),
                volume_button: self.vol_button.target(),
                volume_slider: self.vol_slider.target(),
                seekbar: self.seekbar.target(),
                start_muted: false,
            }
        }

        fn player(&self) -> VideoPlayer {
            let mut player = VideoPlayer::new(
                self.registry.clone(),
                Document::new(Arc::clone(&self.document)),
                self.surface.clone(),
                PlayerSettings::default(),
            );
            player.mount(self.elements());
            player
        }
    }

    #[test]
    fn test_mount_binds_everything() {
        let page = Page::new();
        let player = page.player();
        assert!(player.is_mounted());
        // 5 buttons + volume(3) + seekbar(6) + time(2) + controller(3)
        assert_eq!(page.registry.len(), 19);
        assert_eq!(player.controller().overlay_state(), OverlayState::Resting);
        assert_eq!(page.surface.icon(WidgetId::StatusButton), Some(Icon::Play));
        assert!(page.surface.has_class(WidgetId::StatusIcon, classes::LARGE));
    }

    #[test]
    fn test_user_session() {
        let page = Page::new();
        let player = page.player();
        let t0 = Instant::now();

        page.status.emit("click");
        assert!(!page.media.paused());
        assert_eq!(player.controller().overlay_state(), OverlayState::ShowingLarge);

        page.document.key_down("ArrowRight");
        assert_eq!(page.media.current_time(), 5.0);
        assert!(player.controller().overlay_pending());

        page.surface.set_bounds(WidgetId::Seekbar, Bounds { left: 0.0, width: 300.0 });
        page.seekbar.dispatch(&Event::new("click").with_client_x(150.0));
        assert_eq!(page.media.current_time(), 150.0);

        page.media.emit("timeupdate");
        assert_eq!(page.surface.text(WidgetId::CurrentTime).as_deref(), Some("2:30"));
        assert_eq!(page.surface.text(WidgetId::Duration).as_deref(), Some("5:00"));

        // Playing media: the overlay hides when the timer fires
        assert!(player.controller().tick_at(t0 + Duration::from_secs(5)));
        assert!(page.surface.has_class(WidgetId::StatusIcon, classes::HIDDEN));
        assert_eq!(player.controller().overlay_state(), OverlayState::Idle);
    }

    #[test]
    fn test_fullscreen_roundtrip() {
        let page = Page::new();
        let player = page.player();

        page.fs.emit("click");
        page.document.emit("fullscreenchange");
        assert!(player.controller().is_fullscreen());
        assert_eq!(page.surface.icon(WidgetId::FullscreenButton), Some(Icon::ExitFullscreen));

        page.fs.emit("click");
        page.document.emit("fullscreenchange");
        assert!(!player.controller().is_fullscreen());
        assert_eq!(page.surface.icon(WidgetId::FullscreenButton), Some(Icon::Fullscreen));
    }

    #[test]
    fn test_unmount_clears_registry_and_targets() {
        let page = Page::new();
        let mut player = page.player();
        assert_eq!(player.unmount(), 19);
        assert!(page.registry.is_empty());
        assert_eq!(page.media.binding_count(), 0);
        assert_eq!(page.document.binding_count(), 0);
        assert!(player.controller().media_handle().is_none());

        // Input after unmount is inert
        page.play.emit("click");
        page.document.key_down("Space");
        assert!(page.media.paused());
        assert_eq!(player.unmount(), 0);
    }

    #[test]
    fn test_remount_does_not_duplicate() {
        let page = Page::new();
        let mut player = page.player();
        player.mount(page.elements());
        assert_eq!(page.registry.len(), 19);

        page.play.emit("click");
        assert!(!page.media.paused());
    }

    #[test]
    fn test_scoped_groups() {
        let page = Page::new();
        let player = page.player();
        assert!(player.scope().starts_with("videoPlayer-"));
        assert_eq!(player.controller().group(), player.scope());
        let groups = page.registry.groups();
        assert_eq!(groups.len(), 9);
        assert!(groups.iter().all(|g| g.starts_with(player.scope())));
        assert!(groups.contains(&format!("{}/playButton", player.scope())));
    }

    #[test]
    fn test_players_sharing_registry_stay_isolated() {
        let a = Page::new();
        let mut b = Page::new();
        b.registry = a.registry.clone();

        let player_a = a.player();
        let mut player_b = b.player();
        assert_ne!(player_a.scope(), player_b.scope());
        assert_eq!(a.registry.len(), 38);
        // A keeps its click-to-toggle on the media element
        assert_eq!(a.media.binding_count(), 6);

        assert_eq!(player_b.unmount(), 19);
        assert_eq!(a.registry.len(), 19);
        assert_eq!(a.play.binding_count(), 1);
        assert_eq!(b.play.binding_count(), 0);

        a.play.emit("click");
        assert!(!a.media.paused());
        a.document.key_down("Space");
        assert!(a.media.paused());
        assert!(b.media.paused());
    }

    #[test]
    fn test_drop_unmounts() {
        let page = Page::new();
        {
            let _player = page.player();
            assert!(!page.registry.is_empty());
        }
        assert!(page.registry.is_empty());
        assert_eq!(page.seekbar.binding_count(), 0);
    }
}
