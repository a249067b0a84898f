//! Current time / duration readout.

use std::sync::Arc;

use crate::core::controller::PlaybackController;
use crate::core::dom::{ListenOptions, Listener};
use crate::core::host::{MediaElement, PlayerSurface, WidgetId};

use super::Widget;

/// Whole seconds, with junk (NaN, negative) read as 0
fn whole_seconds(seconds: f64) -> u64 {
    if seconds.is_finite() && seconds > 0.0 {
        seconds.floor() as u64
    } else {
        0
    }
}

/// `h:mm:ss` when at least an hour, else `m:ss`
pub fn format_clock(seconds: f64) -> String {
    let total = whole_seconds(seconds);
    let (h, m, s) = (total / 3600, (total % 3600) / 60, total % 60);
    if h > 0 {
        format!("{}:{:02}:{:02}", h, m, s)
    } else {
        format!("{}:{:02}", m, s)
    }
}

/// `m:ss` with unbounded minutes (seek tooltip)
pub fn format_minutes(seconds: f64) -> String {
    let total = whole_seconds(seconds);
    format!("{}:{:02}", total / 60, total % 60)
}

fn write_times(surface: &dyn PlayerSurface, media: &dyn MediaElement) {
    surface.set_text(WidgetId::CurrentTime, &format_clock(media.current_time()));
    surface.set_text(WidgetId::Duration, &format_clock(media.duration()));
}

/// Keeps the time readout in sync with `timeupdate`/`loadedmetadata`
#[derive(Debug, Clone)]
pub struct TimeDisplay {
    group: String,
}

impl Default for TimeDisplay {
    fn default() -> Self {
        Self::new("time-display")
    }
}

impl TimeDisplay {
    pub fn new(group: impl Into<String>) -> Self {
        Self { group: group.into() }
    }
}

impl Widget for TimeDisplay {
    fn group(&self) -> &str {
        &self.group
    }

    fn mount(&self, controller: &PlaybackController) {
        let Some(media) = controller.media_handle() else {
            log::debug!("TimeDisplay: no media element, not mounted");
            return;
        };
        let registry = controller.registry();

        let element = Arc::clone(&media.element);
        let surface = Arc::clone(controller.surface());
        registry.bind(
            &media.target,
            "timeupdate",
            Listener::new(move |_| {
                // Skip until the duration is known
                let duration = element.duration();
                if duration.is_finite() && duration > 0.0 {
                    write_times(surface.as_ref(), element.as_ref());
                }
            }),
            ListenOptions::group(self.group.clone()),
        );

        let element = Arc::clone(&media.element);
        let surface = Arc::clone(controller.surface());
        registry.bind(
            &media.target,
            "loadedmetadata",
            Listener::new(move |_| write_times(surface.as_ref(), element.as_ref())),
            ListenOptions::group(self.group.clone()),
        );
    }
}
