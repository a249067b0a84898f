//! Minimal UI-event abstraction the core binds against.
//!
//! Anything that can deliver events (a real DOM node behind a wasm bridge,
//! a native widget, or the in-memory [`crate::headless`] doubles) implements
//! [`EventTarget`]. The registry never calls callbacks itself; it only
//! attaches and detaches [`Listener`]s and the target delivers [`Event`]s.
//!
//! Identity rules:
//! - [`Target`] compares by pointer, like `===` on DOM nodes.
//! - [`Listener`] compares by its id, so the same closure handle can be
//!   detached with the exact value it was attached with.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use uuid::Uuid;

/// Type-erased event callback
pub type Callback = Arc<dyn Fn(&Event) + Send + Sync>;

/// A UI event delivered by a target.
///
/// Carries the few payload fields the player reads: the physical key code
/// for keyboard events, pointer x for clicks/moves, and the current value of
/// a slider for `input` events.
#[derive(Debug, Default)]
pub struct Event {
    event_type: String,
    code: Option<String>,
    client_x: Option<f64>,
    value: Option<f64>,
    default_prevented: AtomicBool,
    propagation_stopped: AtomicBool,
}

impl Event {
    pub fn new(event_type: impl Into<String>) -> Self {
        Self {
            event_type: event_type.into(),
            ..Default::default()
        }
    }

    /// Keyboard event with a physical key code (`"Space"`, `"KeyM"`, ...)
    pub fn key(event_type: impl Into<String>, code: impl Into<String>) -> Self {
        Self::new(event_type).with_code(code)
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    pub fn with_client_x(mut self, x: f64) -> Self {
        self.client_x = Some(x);
        self
    }

    pub fn with_value(mut self, value: f64) -> Self {
        self.value = Some(value);
        self
    }

    pub fn event_type(&self) -> &str {
        &self.event_type
    }

    pub fn code(&self) -> Option<&str> {
        self.code.as_deref()
    }

    pub fn client_x(&self) -> Option<f64> {
        self.client_x
    }

    pub fn value(&self) -> Option<f64> {
        self.value
    }

    pub fn prevent_default(&self) {
        self.default_prevented.store(true, Ordering::Relaxed);
    }

    pub fn default_prevented(&self) -> bool {
        self.default_prevented.load(Ordering::Relaxed)
    }

    pub fn stop_propagation(&self) {
        self.propagation_stopped.store(true, Ordering::Relaxed);
    }

    pub fn propagation_stopped(&self) -> bool {
        self.propagation_stopped.load(Ordering::Relaxed)
    }
}

/// Callback with a stable identity.
///
/// Cloning keeps the id, so a clone detaches the same binding.
#[derive(Clone)]
pub struct Listener {
    id: Uuid,
    callback: Callback,
}

impl Listener {
    pub fn new<F>(callback: F) -> Self
    where
        F: Fn(&Event) + Send + Sync + 'static,
    {
        Self {
            id: Uuid::new_v4(),
            callback: Arc::new(callback),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Invoke the callback
    pub fn call(&self, event: &Event) {
        (self.callback)(event);
    }
}

impl PartialEq for Listener {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Listener {}

impl fmt::Debug for Listener {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Listener").field("id", &self.id).finish()
    }
}

/// Binding options: capture phase flag and an optional group tag.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ListenOptions {
    pub capture: bool,
    pub group: Option<String>,
}

impl ListenOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Options tagged with a group
    pub fn group(name: impl Into<String>) -> Self {
        Self {
            capture: false,
            group: Some(name.into()),
        }
    }

    pub fn with_capture(mut self, capture: bool) -> Self {
        self.capture = capture;
        self
    }
}

impl From<&str> for ListenOptions {
    fn from(group: &str) -> Self {
        Self::group(group)
    }
}

impl From<String> for ListenOptions {
    fn from(group: String) -> Self {
        Self::group(group)
    }
}

/// Anything that accepts event listeners.
///
/// `subscribe` must attach a new live binding on every call, even for a
/// listener that is already attached. `unsubscribe` detaches one binding
/// matching (type, listener, capture) and is a no-op when none exists.
///
/// Implementations must not invoke listeners from inside these two methods.
pub trait EventTarget: Send + Sync {
    fn subscribe(&self, event_type: &str, listener: &Listener, options: &ListenOptions);
    fn unsubscribe(&self, event_type: &str, listener: &Listener, options: &ListenOptions);
}

/// Shared reference to an event target with pointer identity.
#[derive(Clone)]
pub struct Target(Arc<dyn EventTarget>);

impl Target {
    pub fn new<T: EventTarget + 'static>(target: Arc<T>) -> Self {
        Self(target)
    }

    pub fn subscribe(&self, event_type: &str, listener: &Listener, options: &ListenOptions) {
        self.0.subscribe(event_type, listener, options);
    }

    pub fn unsubscribe(&self, event_type: &str, listener: &Listener, options: &ListenOptions) {
        self.0.unsubscribe(event_type, listener, options);
    }

    fn addr(&self) -> *const () {
        Arc::as_ptr(&self.0) as *const ()
    }
}

impl PartialEq for Target {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.addr(), other.addr())
    }
}

impl Eq for Target {}

impl fmt::Debug for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Target({:p})", self.addr())
    }
}
