//! Seek slider with hover tooltip.
//!
//! - `loadedmetadata` -> slider max = duration
//! - `timeupdate` -> slider value = current time
//! - slider `input` -> seek to the slider value
//! - slider `click` -> seek to the clicked fraction of the duration
//! - `mousemove` / `mouseleave` -> show / hide the `m:ss` tooltip
//!
//! Click and hover do nothing until the duration is known.

use std::sync::Arc;

use crate::core::controller::PlaybackController;
use crate::core::dom::{ListenOptions, Listener, Target};
use crate::core::host::{classes, Bounds, WidgetId};

use super::time_display::format_minutes;
use super::Widget;

/// Media time under `client_x`, None while the duration is unknown
fn time_at(bounds: Bounds, client_x: f64, duration: f64) -> Option<f64> {
    duration.is_finite().then(|| bounds.fraction(client_x) * duration)
}

#[derive(Debug, Clone)]
pub struct Seekbar {
    slider: Target,
    group: String,
}

impl Seekbar {
    pub fn new(slider: Target) -> Self {
        Self {
            slider,
            group: "vp-seekbar".to_string(),
        }
    }

    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.group = group.into();
        self
    }

    fn bind_progress(&self, controller: &PlaybackController) {
        let Some(media) = controller.media_handle() else {
            log::debug!("Seekbar: no media element, progress not bound");
            return;
        };
        let registry = controller.registry();
        let opts = || ListenOptions::group(self.group.clone());

        let element = Arc::clone(&media.element);
        let surface = Arc::clone(controller.surface());
        registry.bind(
            &media.target,
            "loadedmetadata",
            Listener::new(move |_| surface.set_max(WidgetId::Seekbar, element.duration())),
            opts(),
        );

        let element = Arc::clone(&media.element);
        let surface = Arc::clone(controller.surface());
        registry.bind(
            &media.target,
            "timeupdate",
            Listener::new(move |_| surface.set_value(WidgetId::Seekbar, element.current_time())),
            opts(),
        );

        let weak = controller.downgrade();
        registry.bind(
            &self.slider,
            "input",
            Listener::new(move |event| {
                if let (Some(controller), Some(value)) = (weak.upgrade(), event.value()) {
                    controller.seek_to(value);
                }
            }),
            opts(),
        );

        let weak = controller.downgrade();
        let element = Arc::clone(&media.element);
        let surface = Arc::clone(controller.surface());
        registry.bind(
            &self.slider,
            "click",
            Listener::new(move |event| {
                let (Some(controller), Some(x)) = (weak.upgrade(), event.client_x()) else {
                    return;
                };
                let Some(bounds) = surface.bounds(WidgetId::Seekbar) else {
                    return;
                };
                if let Some(time) = time_at(bounds, x, element.duration()) {
                    controller.seek_to(time);
                }
            }),
            opts(),
        );
    }

    fn bind_tooltip(&self, controller: &PlaybackController) {
        let Some(media) = controller.media_handle() else {
            return;
        };
        let registry = controller.registry();

        let element = Arc::clone(&media.element);
        let surface = Arc::clone(controller.surface());
        registry.bind(
            &self.slider,
            "mousemove",
            Listener::new(move |event| {
                let (Some(x), Some(bounds)) = (event.client_x(), surface.bounds(WidgetId::Seekbar)) else {
                    return;
                };
                let Some(time) = time_at(bounds, x, element.duration()) else {
                    return;
                };
                surface.set_offset(WidgetId::SeekTooltip, x - bounds.left);
                surface.set_class(WidgetId::SeekTooltip, classes::HIDDEN, false);
                surface.set_text(WidgetId::SeekTooltip, &format_minutes(time));
            }),
            ListenOptions::group(self.group.clone()),
        );

        let surface = Arc::clone(controller.surface());
        registry.bind(
            &self.slider,
            "mouseleave",
            Listener::new(move |_| surface.set_class(WidgetId::SeekTooltip, classes::HIDDEN, true)),
            ListenOptions::group(self.group.clone()),
        );
    }
}

impl Widget for Seekbar {
    fn group(&self) -> &str {
        &self.group
    }

    fn mount(&self, controller: &PlaybackController) {
        self.bind_progress(controller);
        self.bind_tooltip(controller);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PlayerSettings;
    use crate::core::dom::Event;
    use crate::core::event_registry::EventRegistry;
    use crate::core::host::{Document, MediaElement, MediaHandle, PlayerSurface};
    use crate::headless::{HeadlessDocument, HeadlessMedia, HeadlessTarget, RecordingSurface};

    struct Rig {
        controller: PlaybackController,
        media: Arc<HeadlessMedia>,
        slider: Arc<HeadlessTarget>,
        surface: Arc<RecordingSurface>,
        seekbar: Seekbar,
    }

    fn rig() -> Rig {
        let surface = RecordingSurface::new();
        surface.set_bounds(WidgetId::Seekbar, Bounds { left: 10.0, width: 200.0 });
        let media = HeadlessMedia::with_duration(120.0);
        let slider = HeadlessTarget::new("vp-seekbar");
        let controller = PlaybackController::new(
            EventRegistry::new(),
            Document::new(HeadlessDocument::new()),
            surface.clone(),
            PlayerSettings::default(),
        );
        controller.set_media_element(MediaHandle::new(Arc::clone(&media)));
        let seekbar = Seekbar::new(slider.target());
        seekbar.mount(&controller);
        Rig { controller, media, slider, surface, seekbar }
    }

    #[test]
    fn test_progress_follows_media() {
        let r = rig();
        r.media.emit("loadedmetadata");
        assert_eq!(r.surface.max(WidgetId::Seekbar), Some(120.0));

        r.media.set_current_time(42.5);
        r.media.emit("timeupdate");
        assert_eq!(r.surface.value(WidgetId::Seekbar), Some(42.5));
    }

    #[test]
    fn test_input_and_click_seek() {
        let r = rig();
        r.slider.dispatch(&Event::new("input").with_value(30.0));
        assert_eq!(r.media.current_time(), 30.0);

        // Three quarters across the track
        r.slider.dispatch(&Event::new("click").with_client_x(160.0));
        assert_eq!(r.media.current_time(), 90.0);
    }

    #[test]
    fn test_tooltip() {
        let r = rig();
        r.slider.dispatch(&Event::new("mousemove").with_client_x(110.0));
        assert_eq!(r.surface.text(WidgetId::SeekTooltip).as_deref(), Some("1:00"));
        assert_eq!(r.surface.offset(WidgetId::SeekTooltip), Some(100.0));
        assert!(!r.surface.has_class(WidgetId::SeekTooltip, classes::HIDDEN));

        r.slider.emit("mouseleave");
        assert!(r.surface.has_class(WidgetId::SeekTooltip, classes::HIDDEN));
    }

    #[test]
    fn test_click_and_hover_wait_for_metadata() {
        let r = rig();
        r.media.set_duration(f64::NAN);
        r.media.set_current_time(7.0);

        r.slider.dispatch(&Event::new("click").with_client_x(110.0));
        assert_eq!(r.media.current_time(), 7.0);

        r.slider.dispatch(&Event::new("mousemove").with_client_x(110.0));
        assert_eq!(r.surface.text(WidgetId::SeekTooltip), None);

        r.media.set_duration(40.0);
        r.slider.dispatch(&Event::new("click").with_client_x(110.0));
        assert_eq!(r.media.current_time(), 20.0);
    }

    #[test]
    fn test_unmount_drops_group() {
        let r = rig();
        assert_eq!(r.seekbar.unmount(&r.controller), 6);
        assert_eq!(r.slider.binding_count(), 0);
        assert_eq!(r.media.binding_count(), 0);
    }
}
