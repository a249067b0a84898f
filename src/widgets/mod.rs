//! Widget bindings - reactive glue between control widgets and the core.
//!
//! Each widget is self-contained: it binds its listeners under its own
//! registry group on `mount()` and drops exactly that group on `unmount()`.
//! Widgets read the media element but never mutate it: changes go through
//! the [`PlaybackController`], and widgets write only to the surface.

pub mod buttons;
pub mod seekbar;
pub mod time_display;
pub mod volume_control;

pub use buttons::ControlButton;
pub use seekbar::Seekbar;
pub use time_display::{format_clock, format_minutes, TimeDisplay};
pub use volume_control::VolumeControl;

use crate::core::controller::PlaybackController;

/// A control widget's event bindings
pub trait Widget: Send + Sync {
    /// Registry group owning this widget's bindings
    fn group(&self) -> &str;

    fn mount(&self, controller: &PlaybackController);

    /// Drop every binding of this widget's group
    fn unmount(&self, controller: &PlaybackController) -> usize {
        controller.registry().unbind_all(Some(self.group()))
    }
}
