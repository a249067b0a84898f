//! Host capabilities the controller drives.
//!
//! The media element is the single source of truth for playback state; the
//! surface is the only output channel back to widgets (icon attributes, CSS
//! classes, slider values, text).

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::dom::{EventTarget, Target};

/// Native media element (play/pause/seek/volume/mute).
///
/// Getters must read live element state; the controller never caches them.
pub trait MediaElement: Send + Sync {
    fn paused(&self) -> bool;
    fn play(&self);
    fn pause(&self);
    fn current_time(&self) -> f64;
    fn set_current_time(&self, time: f64);
    /// Duration in seconds, NaN until metadata is loaded
    fn duration(&self) -> f64;
    fn volume(&self) -> f64;
    fn set_volume(&self, volume: f64);
    fn muted(&self) -> bool;
    fn set_muted(&self, muted: bool);
    /// Show or hide the native control chrome
    fn set_controls(&self, controls: bool);
}

/// Vendor flavours of the fullscreen API, in fallback order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FullscreenApi {
    Standard,
    Webkit,
    Ms,
}

impl FullscreenApi {
    pub const FALLBACK_ORDER: [FullscreenApi; 3] =
        [FullscreenApi::Standard, FullscreenApi::Webkit, FullscreenApi::Ms];
}

/// Document-level fullscreen support.
pub trait FullscreenHost: Send + Sync {
    /// Whether this flavour of request/exit is available
    fn supports(&self, api: FullscreenApi) -> bool;
    fn request_fullscreen(&self, api: FullscreenApi);
    fn exit_fullscreen(&self, api: FullscreenApi);
    /// Mirrors `document.fullscreenElement != null`
    fn has_fullscreen_element(&self) -> bool;
}

/// Widget elements the core writes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WidgetId {
    /// Primary play/pause button in the control bar
    PlayButton,
    /// Central overlay button
    StatusButton,
    /// Glyph inside the overlay button (carries size/visibility classes)
    StatusIcon,
    FullscreenButton,
    VolumeButton,
    VolumeSlider,
    Seekbar,
    SeekTooltip,
    CurrentTime,
    Duration,
    /// Player container (carries the fullscreen class)
    Container,
    /// Page wrapper collapsed while fullscreen
    Page,
}

/// Icon names understood by the button widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Icon {
    Play,
    Pause,
    Forward,
    Backward,
    Volume,
    VolumeMute,
    Fullscreen,
    ExitFullscreen,
}

impl Icon {
    pub fn name(&self) -> &'static str {
        match self {
            Icon::Play => "wd_play",
            Icon::Pause => "wd_pause",
            Icon::Forward => "wd_forward",
            Icon::Backward => "wd_backward",
            Icon::Volume => "wd_volume",
            Icon::VolumeMute => "wd_volume_mute",
            Icon::Fullscreen => "wd_fullscreen",
            Icon::ExitFullscreen => "wd_exitfullscreen",
        }
    }
}

impl fmt::Display for Icon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// CSS classes toggled by the core
pub mod classes {
    /// Overlay glyph enlarged (fresh start)
    pub const LARGE: &str = "zwd-large";
    /// Overlay glyph at transient size
    pub const BIG: &str = "zwd-big";
    pub const HIDDEN: &str = "zwd-hide-display";
    pub const FULLSCREEN: &str = "wc-video--custom-fullscreen";
    pub const PAGE_COLLAPSED: &str = "zwd-width0";
}

/// Client-space bounding box of a widget
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Bounds {
    pub left: f64,
    pub width: f64,
}

impl Bounds {
    /// Horizontal position of `client_x` as a fraction of the width
    pub fn fraction(&self, client_x: f64) -> f64 {
        if self.width <= 0.0 {
            return 0.0;
        }
        (client_x - self.left) / self.width
    }
}

/// Attribute setters exposed by the rendering widgets.
pub trait PlayerSurface: Send + Sync {
    /// Set the `preTextIconName` attribute of a button
    fn set_icon(&self, widget: WidgetId, icon: Icon);
    /// Add (`on == true`) or remove a CSS class
    fn set_class(&self, widget: WidgetId, class: &str, on: bool);
    fn has_class(&self, widget: WidgetId, class: &str) -> bool;
    /// Slider `value`
    fn set_value(&self, widget: WidgetId, value: f64);
    /// Slider `max`
    fn set_max(&self, widget: WidgetId, max: f64);
    fn set_text(&self, widget: WidgetId, text: &str);
    /// Horizontal offset in px (tooltips)
    fn set_offset(&self, widget: WidgetId, left_px: f64);
    fn bounds(&self, widget: WidgetId) -> Option<Bounds>;

    /// Flip a class, returns the new state
    fn toggle_class(&self, widget: WidgetId, class: &str) -> bool {
        let on = !self.has_class(widget, class);
        self.set_class(widget, class, on);
        on
    }
}

/// Media element paired with its event target
#[derive(Clone)]
pub struct MediaHandle {
    pub element: Arc<dyn MediaElement>,
    pub target: Target,
}

impl MediaHandle {
    pub fn new<M: MediaElement + EventTarget + 'static>(media: Arc<M>) -> Self {
        Self {
            target: Target::new(Arc::clone(&media)),
            element: media,
        }
    }
}

impl fmt::Debug for MediaHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MediaHandle").field("target", &self.target).finish()
    }
}

/// Document: fullscreen API plus the target for keydown/fullscreenchange
#[derive(Clone)]
pub struct Document {
    pub fullscreen: Arc<dyn FullscreenHost>,
    pub target: Target,
}

impl Document {
    pub fn new<D: FullscreenHost + EventTarget + 'static>(doc: Arc<D>) -> Self {
        Self {
            target: Target::new(Arc::clone(&doc)),
            fullscreen: doc,
        }
    }
}

impl fmt::Debug for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Document").field("target", &self.target).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_icon_names() {
        assert_eq!(Icon::Play.name(), "wd_play");
        assert_eq!(Icon::VolumeMute.to_string(), "wd_volume_mute");
        assert_eq!(Icon::ExitFullscreen.name(), "wd_exitfullscreen");
    }

    #[test]
    fn test_bounds_fraction() {
        let b = Bounds { left: 100.0, width: 200.0 };
        assert_eq!(b.fraction(200.0), 0.5);
        assert_eq!(b.fraction(100.0), 0.0);
        assert_eq!(Bounds::default().fraction(50.0), 0.0);
    }
}
