//! Mute button plus volume slider.
//!
//! The slider works in percent (0-100), the media element in [0, 1].
//! A muted element shows the slider at 0 without touching its volume.

use std::sync::Arc;

use crate::core::controller::PlaybackController;
use crate::core::dom::{ListenOptions, Listener, Target};
use crate::core::host::{Icon, PlayerSurface, WidgetId};

use super::Widget;

fn volume_icon(muted: bool) -> Icon {
    if muted { Icon::VolumeMute } else { Icon::Volume }
}

fn refresh(surface: &dyn PlayerSurface, controller: &PlaybackController) {
    let muted = controller.is_muted();
    surface.set_icon(WidgetId::VolumeButton, volume_icon(muted));
    let percent = if muted { 0.0 } else { controller.volume() * 100.0 };
    surface.set_value(WidgetId::VolumeSlider, percent);
}

#[derive(Debug, Clone)]
pub struct VolumeControl {
    button: Target,
    slider: Target,
    start_muted: bool,
    group: String,
}

impl VolumeControl {
    pub fn new(button: Target, slider: Target) -> Self {
        Self {
            button,
            slider,
            start_muted: false,
            group: "volume-control".to_string(),
        }
    }

    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.group = group.into();
        self
    }

    /// Initial glyph when the host starts the element muted
    pub fn start_muted(mut self, muted: bool) -> Self {
        self.start_muted = muted;
        self
    }
}

impl Widget for VolumeControl {
    fn group(&self) -> &str {
        &self.group
    }

    fn mount(&self, controller: &PlaybackController) {
        let registry = controller.registry();
        controller
            .surface()
            .set_icon(WidgetId::VolumeButton, volume_icon(self.start_muted));

        let weak = controller.downgrade();
        registry.bind(
            &self.button,
            "click",
            Listener::new(move |event| {
                event.prevent_default();
                event.stop_propagation();
                if let Some(controller) = weak.upgrade() {
                    controller.toggle_mute();
                    let muted = controller.is_muted();
                    controller.surface().set_icon(WidgetId::VolumeButton, volume_icon(muted));
                }
            }),
            ListenOptions::group(self.group.clone()),
        );

        let weak = controller.downgrade();
        registry.bind(
            &self.slider,
            "input",
            Listener::new(move |event| {
                if let (Some(controller), Some(value)) = (weak.upgrade(), event.value()) {
                    controller.set_volume(value / 100.0);
                }
            }),
            ListenOptions::group(self.group.clone()),
        );

        let Some(media) = controller.media_handle() else {
            log::debug!("VolumeControl: no media element, volumechange not bound");
            return;
        };
        let weak = controller.downgrade();
        let surface = Arc::clone(controller.surface());
        registry.bind(
            &media.target,
            "volumechange",
            Listener::new(move |_| {
                if let Some(controller) = weak.upgrade() {
                    refresh(surface.as_ref(), &controller);
                }
            }),
            ListenOptions::group(self.group.clone()),
        );
    }
}
