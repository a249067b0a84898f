//! Playback controller - the only sanctioned mutator of playback state.
//!
//! **Architecture**: the controller does NOT cache playback state. The media
//! element is the single source of truth; every method reads it live and
//! writes the resulting UI back through the [`PlayerSurface`].
//!
//! **Used by**: keyboard shortcuts, control widgets (buttons, sliders), and
//! the `fullscreenchange` handler installed by [`PlaybackController::initialize`].
//!
//! # Overlay
//!
//! The central status button shows the last action and hides itself:
//!
//! | action                            | glyph              | timer   |
//! |-----------------------------------|--------------------|---------|
//! | `play`                            | play, enlarged     | none    |
//! | `pause`                           | pause              | 500 ms  |
//! | `forward`/`backward`/`volume`/`mute` | matching glyph  | 1000 ms |
//!
//! Every action cancels the pending hide first. When the hide fires, paused
//! media shows the play glyph again; playing media hides the overlay.
//! Native `play`/`pause` events do not drive the overlay.
//!
//! # Timer
//!
//! The hide is a polled deadline: call [`PlaybackController::tick`] from the
//! host's frame/update loop.

use std::str::FromStr;
use std::sync::{Arc, Mutex, MutexGuard, RwLock, Weak};
use std::time::{Duration, Instant};

use log::{debug, info, trace, warn};

use super::dom::{ListenOptions, Listener};
use super::event_registry::EventRegistry;
use super::host::{classes, Document, FullscreenApi, Icon, MediaElement, MediaHandle, PlayerSurface, WidgetId};
use super::overlay_timer::OverlayTimer;
use super::shortcuts::ShortcutDispatcher;
use crate::config::PlayerSettings;

/// Action shown by the status overlay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OverlayAction {
    Play,
    Pause,
    Forward,
    Backward,
    Volume,
    Mute,
}

impl OverlayAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            OverlayAction::Play => "play",
            OverlayAction::Pause => "pause",
            OverlayAction::Forward => "forward",
            OverlayAction::Backward => "backward",
            OverlayAction::Volume => "volume",
            OverlayAction::Mute => "mute",
        }
    }

    pub fn icon(&self) -> Icon {
        match self {
            OverlayAction::Play => Icon::Play,
            OverlayAction::Pause => Icon::Pause,
            OverlayAction::Forward => Icon::Forward,
            OverlayAction::Backward => Icon::Backward,
            OverlayAction::Volume => Icon::Volume,
            OverlayAction::Mute => Icon::VolumeMute,
        }
    }
}

impl FromStr for OverlayAction {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s {
            "play" => Ok(OverlayAction::Play),
            "pause" => Ok(OverlayAction::Pause),
            "forward" => Ok(OverlayAction::Forward),
            "backward" => Ok(OverlayAction::Backward),
            "volume" => Ok(OverlayAction::Volume),
            "mute" => Ok(OverlayAction::Mute),
            _ => anyhow::bail!("Unknown overlay action: {}", s),
        }
    }
}

/// Visible state of the status overlay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OverlayState {
    /// Glyph hidden
    #[default]
    Idle,
    /// Enlarged play glyph after a fresh start (hidden while playing)
    ShowingLarge,
    /// Normal size, hide pending
    ShowingTransient,
    /// Play glyph left on screen while paused, nothing pending
    Resting,
}

#[derive(Debug, Default)]
struct Overlay {
    timer: OverlayTimer,
    state: OverlayState,
    last_action: Option<OverlayAction>,
}

struct ControllerInner {
    registry: EventRegistry,
    document: Document,
    surface: Arc<dyn PlayerSurface>,
    settings: PlayerSettings,
    media: RwLock<Option<MediaHandle>>,
    overlay: Mutex<Overlay>,
}

/// Playback controller handle.
///
/// Cheap to clone; clones share the media slot and the overlay timer.
/// Listeners installed by the controller hold a [`WeakController`], so the
/// registry never keeps the controller alive.
#[derive(Clone)]
pub struct PlaybackController {
    inner: Arc<ControllerInner>,
}

/// Non-owning controller handle for callbacks
#[derive(Clone)]
pub struct WeakController(Weak<ControllerInner>);

impl WeakController {
    pub fn upgrade(&self) -> Option<PlaybackController> {
        self.0.upgrade().map(|inner| PlaybackController { inner })
    }
}

impl std::fmt::Debug for PlaybackController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlaybackController")
            .field("group", &self.inner.settings.controller_group)
            .field("mounted", &self.media_handle().is_some())
            .field("overlay", &self.overlay_state())
            .finish()
    }
}

impl PlaybackController {
    pub fn new(
        registry: EventRegistry,
        document: Document,
        surface: Arc<dyn PlayerSurface>,
        settings: PlayerSettings,
    ) -> Self {
        info!("PlaybackController created (group '{}')", settings.controller_group);
        Self {
            inner: Arc::new(ControllerInner {
                registry,
                document,
                surface,
                settings,
                media: RwLock::new(None),
                overlay: Mutex::new(Overlay::default()),
            }),
        }
    }

    pub fn downgrade(&self) -> WeakController {
        WeakController(Arc::downgrade(&self.inner))
    }

    pub fn registry(&self) -> &EventRegistry {
        &self.inner.registry
    }

    pub fn surface(&self) -> &Arc<dyn PlayerSurface> {
        &self.inner.surface
    }

    pub fn document(&self) -> &Document {
        &self.inner.document
    }

    pub fn settings(&self) -> &PlayerSettings {
        &self.inner.settings
    }

    /// Registry group owning the controller's own bindings
    pub fn group(&self) -> &str {
        &self.inner.settings.controller_group
    }

    fn overlay(&self) -> MutexGuard<'_, Overlay> {
        self.inner.overlay.lock().unwrap_or_else(|e| e.into_inner())
    }

    // === Media element slot ===

    /// Attach the media element for this mount
    pub fn set_media_element(&self, media: MediaHandle) {
        let mut slot = self.inner.media.write().unwrap_or_else(|e| e.into_inner());
        if slot.is_some() {
            warn!("PlaybackController: media element replaced without unmount");
        }
        *slot = Some(media);
    }

    pub fn media_handle(&self) -> Option<MediaHandle> {
        self.inner.media.read().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Detach the media element (unmount)
    pub fn clear_media_element(&self) {
        self.inner.media.write().unwrap_or_else(|e| e.into_inner()).take();
    }

    /// Live media element, or None with a debug note naming the caller
    fn media(&self, op: &str) -> Option<Arc<dyn MediaElement>> {
        let media = self.media_handle().map(|m| m.element);
        if media.is_none() {
            debug!("PlaybackController::{}: no media element mounted, ignored", op);
        }
        media
    }

    // === Lifecycle ===

    /// Install the controller's bindings for the current media element:
    /// `fullscreenchange` on the document and the keyboard shortcuts.
    ///
    /// Re-running drops the previous bindings of the group first.
    pub fn initialize(&self) {
        let Some(media) = self.media_handle() else {
            warn!("PlaybackController::initialize: no media element mounted");
            return;
        };
        let group = self.group().to_string();
        let registry = &self.inner.registry;

        let stale = registry.unbind_all(Some(&group));
        if stale > 0 {
            trace!("PlaybackController: dropped {} stale binding(s) before initialize", stale);
        }

        let weak = self.downgrade();
        registry.bind(
            &self.inner.document.target,
            "fullscreenchange",
            Listener::new(move |_| {
                if let Some(controller) = weak.upgrade() {
                    controller.update_fullscreen_ui();
                }
            }),
            ListenOptions::group(group.clone()),
        );

        ShortcutDispatcher::install(
            self,
            &self.inner.document.target,
            &media.target,
            &self.inner.settings.keymap,
            &group,
        );
        debug!("PlaybackController initialized (group '{}')", group);
    }

    /// Unbind everything in the controller's group and cancel a pending hide
    pub fn cleanup(&self) -> usize {
        let removed = self.inner.registry.unbind_all(Some(self.group()));
        self.overlay().timer.cancel();
        debug!("PlaybackController cleanup: {} binding(s) removed", removed);
        removed
    }

    /// Cleanup and forget the media element
    pub fn dispose(&self) {
        self.cleanup();
        self.clear_media_element();
    }

    // === Playback ===

    pub fn play_video(&self) {
        let Some(media) = self.media("play_video") else { return };
        media.set_controls(false);
        media.play();
        trace!("play");
    }

    pub fn pause_video(&self) {
        let Some(media) = self.media("pause_video") else { return };
        media.pause();
        trace!("pause");
    }

    /// Play if paused, pause otherwise; sync the play button and overlay
    pub fn toggle_video(&self) {
        let Some(media) = self.media("toggle_video") else { return };
        if media.paused() {
            self.play_video();
        } else {
            self.pause_video();
        }

        let paused = media.paused();
        self.inner
            .surface
            .set_icon(WidgetId::PlayButton, if paused { Icon::Play } else { Icon::Pause });
        self.update_video_status_ui(if paused { OverlayAction::Pause } else { OverlayAction::Play });
    }

    /// Step back, clamped at 0
    pub fn seek_backward(&self) {
        let Some(media) = self.media("seek_backward") else { return };
        self.update_video_status_ui(OverlayAction::Backward);
        let target = (media.current_time() - self.inner.settings.seek_step_secs).max(0.0);
        media.set_current_time(target);
        trace!("seek backward -> {:.3}", target);
    }

    /// Step forward, clamped at the duration
    pub fn seek_forward(&self) {
        let Some(media) = self.media("seek_forward") else { return };
        self.update_video_status_ui(OverlayAction::Forward);
        let duration = media.duration();
        if duration.is_nan() {
            debug!("seek_forward: duration unknown, ignored");
            return;
        }
        let target = (media.current_time() + self.inner.settings.seek_step_secs).min(duration);
        media.set_current_time(target);
        trace!("seek forward -> {:.3}", target);
    }

    /// Set the position directly. Not clamped: callers are bound to [0, duration].
    pub fn seek_to(&self, time: f64) {
        let Some(media) = self.media("seek_to") else { return };
        media.set_current_time(time);
    }

    // === Volume ===

    pub fn is_muted(&self) -> bool {
        self.media("is_muted").is_some_and(|m| m.muted())
    }

    /// Current volume, 0 when nothing is mounted
    pub fn volume(&self) -> f64 {
        self.media("volume").map(|m| m.volume()).unwrap_or(0.0)
    }

    pub fn set_volume(&self, volume: f64) {
        let Some(media) = self.media("set_volume") else { return };
        media.set_volume(volume.clamp(0.0, 1.0));
    }

    /// One step up; unmutes first
    pub fn increment_volume(&self) {
        let Some(media) = self.media("increment_volume") else { return };
        if media.muted() {
            media.set_muted(false);
        }
        let volume = (media.volume() + self.inner.settings.volume_step).min(1.0);
        media.set_volume(volume);
        self.update_video_status_ui(OverlayAction::Volume);
    }

    /// One step down; collapses to mute below the threshold.
    ///
    /// The volume is written even when muting, so unmuting later resumes
    /// from the floored value, not from the pre-mute level.
    pub fn decrement_volume(&self) {
        let Some(media) = self.media("decrement_volume") else { return };
        let volume = (media.volume() - self.inner.settings.volume_step).max(0.0);
        if volume < self.inner.settings.mute_threshold {
            media.set_muted(true);
            self.update_video_status_ui(OverlayAction::Mute);
        } else {
            media.set_volume(volume);
            self.update_video_status_ui(OverlayAction::Volume);
        }
        media.set_volume(volume);
    }

    pub fn toggle_mute(&self) {
        let Some(media) = self.media("toggle_mute") else { return };
        let muted = !media.muted();
        media.set_muted(muted);
        self.update_video_status_ui(if muted { OverlayAction::Mute } else { OverlayAction::Volume });
    }

    // === Fullscreen ===

    /// Fullscreen as the layout sees it: the container class, not the native API
    pub fn is_fullscreen(&self) -> bool {
        self.inner.surface.has_class(WidgetId::Container, classes::FULLSCREEN)
    }

    /// Exit or request fullscreen through the first available API flavour
    pub fn toggle_fullscreen(&self) {
        let host = &self.inner.document.fullscreen;
        let Some(api) = FullscreenApi::FALLBACK_ORDER.into_iter().find(|api| host.supports(*api)) else {
            warn!("toggle_fullscreen: no fullscreen API available");
            return;
        };
        if self.is_fullscreen() {
            debug!("exit fullscreen via {:?}", api);
            host.exit_fullscreen(api);
        } else {
            debug!("request fullscreen via {:?}", api);
            host.request_fullscreen(api);
        }
    }

    /// `fullscreenchange` handler: button glyph plus layout classes
    pub fn update_fullscreen_ui(&self) {
        let surface = &self.inner.surface;
        let icon = if self.inner.document.fullscreen.has_fullscreen_element() {
            Icon::ExitFullscreen
        } else {
            Icon::Fullscreen
        };
        surface.set_icon(WidgetId::FullscreenButton, icon);
        let on = surface.toggle_class(WidgetId::Container, classes::FULLSCREEN);
        surface.toggle_class(WidgetId::Page, classes::PAGE_COLLAPSED);
        debug!("fullscreen layout {}", if on { "on" } else { "off" });
    }

    // === Overlay ===

    fn interval_for(&self, action: OverlayAction) -> Duration {
        let settings = &self.inner.settings;
        match action {
            OverlayAction::Pause => Duration::from_millis(settings.pause_overlay_interval_ms),
            _ => Duration::from_millis(settings.overlay_interval_ms),
        }
    }

    /// Show `action` on the status overlay and (re)arm the auto-hide
    pub fn update_video_status_ui(&self, action: OverlayAction) {
        self.update_video_status_ui_at(action, Instant::now());
    }

    /// Same as [`Self::update_video_status_ui`] with an explicit clock
    pub fn update_video_status_ui_at(&self, action: OverlayAction, now: Instant) {
        let large = action == OverlayAction::Play;
        {
            let mut overlay = self.overlay();
            overlay.timer.cancel();
            overlay.last_action = Some(action);
            if large {
                overlay.state = OverlayState::ShowingLarge;
            } else {
                overlay.timer.arm_at(now, self.interval_for(action));
                overlay.state = OverlayState::ShowingTransient;
            }
        }

        // Surface writes happen with the overlay lock released
        let surface = &self.inner.surface;
        surface.set_icon(WidgetId::StatusButton, action.icon());
        surface.set_class(WidgetId::StatusIcon, classes::HIDDEN, large);
        surface.set_class(WidgetId::StatusIcon, classes::BIG, !large);
        surface.set_class(WidgetId::StatusIcon, classes::LARGE, large);
    }

    /// Initial overlay: enlarged play glyph, visible, nothing pending
    pub fn reset_overlay(&self) {
        {
            let mut overlay = self.overlay();
            overlay.timer.cancel();
            overlay.last_action = None;
            overlay.state = OverlayState::Resting;
        }

        let surface = &self.inner.surface;
        surface.set_icon(WidgetId::StatusButton, Icon::Play);
        surface.set_class(WidgetId::StatusIcon, classes::HIDDEN, false);
        surface.set_class(WidgetId::StatusIcon, classes::BIG, false);
        surface.set_class(WidgetId::StatusIcon, classes::LARGE, true);
    }

    pub fn overlay_state(&self) -> OverlayState {
        self.overlay().state
    }

    pub fn last_overlay_action(&self) -> Option<OverlayAction> {
        self.overlay().last_action
    }

    pub fn overlay_pending(&self) -> bool {
        self.overlay().timer.is_pending()
    }

    /// Poll the auto-hide against the wall clock
    pub fn tick(&self) -> bool {
        self.tick_at(Instant::now())
    }

    /// Apply the auto-hide if its deadline passed. Returns true when it fired.
    pub fn tick_at(&self, now: Instant) -> bool {
        if !self.overlay().timer.tick_at(now) {
            return false;
        }

        let paused = self.media("tick").map(|m| m.paused());
        let state = match paused {
            Some(true) => {
                self.inner.surface.set_icon(WidgetId::StatusButton, Icon::Play);
                OverlayState::Resting
            }
            Some(false) => {
                self.inner.surface.set_class(WidgetId::StatusIcon, classes::HIDDEN, true);
                OverlayState::Idle
            }
            None => OverlayState::Idle,
        };
        self.overlay().state = state;
        trace!("overlay hide fired -> {:?}", state);
        true
    }
}
