//! In-memory DOM doubles for running the player without a browser.
//!
//! - [`HeadlessTarget`]: event target with synchronous `dispatch()` and a
//!   live binding counter
//! - [`HeadlessMedia`]: media element state + its own event target
//! - [`HeadlessDocument`]: fullscreen host + document event target
//! - [`RecordingSurface`]: widget attributes kept in maps for inspection
//!
//! Dispatch copies the matching listeners before calling them, so callbacks
//! can bind/unbind on the same target while an event is being delivered.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::core::dom::{Event, EventTarget, ListenOptions, Listener, Target};
use crate::core::host::{Bounds, FullscreenApi, FullscreenHost, Icon, MediaElement, PlayerSurface, WidgetId};

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|e| e.into_inner())
}

#[derive(Clone)]
struct Binding {
    event_type: String,
    listener: Listener,
    capture: bool,
}

/// Event target with observable bindings
pub struct HeadlessTarget {
    name: String,
    bindings: Mutex<Vec<Binding>>,
}

impl std::fmt::Debug for HeadlessTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HeadlessTarget")
            .field("name", &self.name)
            .field("bindings", &self.binding_count())
            .finish()
    }
}

impl HeadlessTarget {
    pub fn new(name: impl Into<String>) -> Arc<Self> {
        Arc::new(Self {
            name: name.into(),
            bindings: Mutex::new(Vec::new()),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn target(self: &Arc<Self>) -> Target {
        Target::new(Arc::clone(self))
    }

    /// Deliver `event` to every listener bound for its type.
    /// Returns the number of listeners invoked.
    pub fn dispatch(&self, event: &Event) -> usize {
        let listeners: Vec<Listener> = lock(&self.bindings)
            .iter()
            .filter(|b| b.event_type == event.event_type())
            .map(|b| b.listener.clone())
            .collect();
        for listener in &listeners {
            listener.call(event);
        }
        listeners.len()
    }

    /// Dispatch a payload-less event of `event_type`
    pub fn emit(&self, event_type: &str) -> Event {
        let event = Event::new(event_type);
        self.dispatch(&event);
        event
    }

    /// Live bindings across all event types
    pub fn binding_count(&self) -> usize {
        lock(&self.bindings).len()
    }

    pub fn bindings_for(&self, event_type: &str) -> usize {
        lock(&self.bindings)
            .iter()
            .filter(|b| b.event_type == event_type)
            .count()
    }
}

impl EventTarget for HeadlessTarget {
    fn subscribe(&self, event_type: &str, listener: &Listener, options: &ListenOptions) {
        lock(&self.bindings).push(Binding {
            event_type: event_type.to_string(),
            listener: listener.clone(),
            capture: options.capture,
        });
    }

    fn unsubscribe(&self, event_type: &str, listener: &Listener, options: &ListenOptions) {
        let mut bindings = lock(&self.bindings);
        if let Some(pos) = bindings.iter().position(|b| {
            b.event_type == event_type && b.listener == *listener && b.capture == options.capture
        }) {
            bindings.remove(pos);
        }
    }
}

#[derive(Debug, Clone)]
struct MediaState {
    paused: bool,
    current_time: f64,
    duration: f64,
    volume: f64,
    muted: bool,
    controls: bool,
}

/// Media element double. Setters never dispatch events; tests fire
/// `timeupdate`/`volumechange`/... explicitly through [`HeadlessMedia::emit`].
#[derive(Debug)]
pub struct HeadlessMedia {
    events: Arc<HeadlessTarget>,
    state: Mutex<MediaState>,
}

impl HeadlessMedia {
    /// Paused element at t=0, full volume, metadata not loaded (NaN duration)
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            events: HeadlessTarget::new("video"),
            state: Mutex::new(MediaState {
                paused: true,
                current_time: 0.0,
                duration: f64::NAN,
                volume: 1.0,
                muted: false,
                controls: true,
            }),
        })
    }

    /// Element with metadata already loaded
    pub fn with_duration(duration: f64) -> Arc<Self> {
        let media = Self::new();
        media.set_duration(duration);
        media
    }

    pub fn set_duration(&self, duration: f64) {
        lock(&self.state).duration = duration;
    }

    pub fn controls(&self) -> bool {
        lock(&self.state).controls
    }

    pub fn events(&self) -> &Arc<HeadlessTarget> {
        &self.events
    }

    pub fn dispatch(&self, event: &Event) -> usize {
        self.events.dispatch(event)
    }

    pub fn emit(&self, event_type: &str) -> Event {
        self.events.emit(event_type)
    }

    pub fn binding_count(&self) -> usize {
        self.events.binding_count()
    }
}

impl EventTarget for HeadlessMedia {
    fn subscribe(&self, event_type: &str, listener: &Listener, options: &ListenOptions) {
        self.events.subscribe(event_type, listener, options);
    }

    fn unsubscribe(&self, event_type: &str, listener: &Listener, options: &ListenOptions) {
        self.events.unsubscribe(event_type, listener, options);
    }
}

impl MediaElement for HeadlessMedia {
    fn paused(&self) -> bool {
        lock(&self.state).paused
    }

    fn play(&self) {
        lock(&self.state).paused = false;
    }

    fn pause(&self) {
        lock(&self.state).paused = true;
    }

    fn current_time(&self) -> f64 {
        lock(&self.state).current_time
    }

    fn set_current_time(&self, time: f64) {
        lock(&self.state).current_time = time;
    }

    fn duration(&self) -> f64 {
        lock(&self.state).duration
    }

    fn volume(&self) -> f64 {
        lock(&self.state).volume
    }

    fn set_volume(&self, volume: f64) {
        lock(&self.state).volume = volume;
    }

    fn muted(&self) -> bool {
        lock(&self.state).muted
    }

    fn set_muted(&self, muted: bool) {
        lock(&self.state).muted = muted;
    }

    fn set_controls(&self, controls: bool) {
        lock(&self.state).controls = controls;
    }
}

/// Fullscreen call recorded by [`HeadlessDocument`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FullscreenCall {
    Request(FullscreenApi),
    Exit(FullscreenApi),
}

/// Document double: keydown/fullscreenchange target + fullscreen API.
///
/// Requests flip the fullscreen element flag but do not dispatch
/// `fullscreenchange`; call [`HeadlessDocument::emit`] for that.
#[derive(Debug)]
pub struct HeadlessDocument {
    events: Arc<HeadlessTarget>,
    supported: Mutex<HashSet<FullscreenApi>>,
    fullscreen: Mutex<bool>,
    calls: Mutex<Vec<FullscreenCall>>,
}

impl HeadlessDocument {
    /// Document supporting every fullscreen flavour
    pub fn new() -> Arc<Self> {
        Self::with_apis(&FullscreenApi::FALLBACK_ORDER)
    }

    pub fn with_apis(apis: &[FullscreenApi]) -> Arc<Self> {
        Arc::new(Self {
            events: HeadlessTarget::new("document"),
            supported: Mutex::new(apis.iter().copied().collect()),
            fullscreen: Mutex::new(false),
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn events(&self) -> &Arc<HeadlessTarget> {
        &self.events
    }

    pub fn dispatch(&self, event: &Event) -> usize {
        self.events.dispatch(event)
    }

    pub fn emit(&self, event_type: &str) -> Event {
        self.events.emit(event_type)
    }

    /// Dispatch a `keydown` with a physical key code
    pub fn key_down(&self, code: &str) -> Event {
        let event = Event::key("keydown", code);
        self.events.dispatch(&event);
        event
    }

    pub fn calls(&self) -> Vec<FullscreenCall> {
        lock(&self.calls).clone()
    }

    pub fn binding_count(&self) -> usize {
        self.events.binding_count()
    }
}

impl EventTarget for HeadlessDocument {
    fn subscribe(&self, event_type: &str, listener: &Listener, options: &ListenOptions) {
        self.events.subscribe(event_type, listener, options);
    }

    fn unsubscribe(&self, event_type: &str, listener: &Listener, options: &ListenOptions) {
        self.events.unsubscribe(event_type, listener, options);
    }
}

impl FullscreenHost for HeadlessDocument {
    fn supports(&self, api: FullscreenApi) -> bool {
        lock(&self.supported).contains(&api)
    }

    fn request_fullscreen(&self, api: FullscreenApi) {
        lock(&self.calls).push(FullscreenCall::Request(api));
        *lock(&self.fullscreen) = true;
    }

    fn exit_fullscreen(&self, api: FullscreenApi) {
        lock(&self.calls).push(FullscreenCall::Exit(api));
        *lock(&self.fullscreen) = false;
    }

    fn has_fullscreen_element(&self) -> bool {
        *lock(&self.fullscreen)
    }
}

#[derive(Debug, Default)]
struct SurfaceState {
    icons: HashMap<WidgetId, Icon>,
    classes: HashMap<WidgetId, HashSet<String>>,
    values: HashMap<WidgetId, f64>,
    maxes: HashMap<WidgetId, f64>,
    texts: HashMap<WidgetId, String>,
    offsets: HashMap<WidgetId, f64>,
    bounds: HashMap<WidgetId, Bounds>,
}

/// Widget surface that records every attribute write
#[derive(Debug, Default)]
pub struct RecordingSurface {
    state: Mutex<SurfaceState>,
}

impl RecordingSurface {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn icon(&self, widget: WidgetId) -> Option<Icon> {
        lock(&self.state).icons.get(&widget).copied()
    }

    pub fn value(&self, widget: WidgetId) -> Option<f64> {
        lock(&self.state).values.get(&widget).copied()
    }

    pub fn max(&self, widget: WidgetId) -> Option<f64> {
        lock(&self.state).maxes.get(&widget).copied()
    }

    pub fn text(&self, widget: WidgetId) -> Option<String> {
        lock(&self.state).texts.get(&widget).cloned()
    }

    pub fn offset(&self, widget: WidgetId) -> Option<f64> {
        lock(&self.state).offsets.get(&widget).copied()
    }

    /// Layout box returned by `bounds()`
    pub fn set_bounds(&self, widget: WidgetId, bounds: Bounds) {
        lock(&self.state).bounds.insert(widget, bounds);
    }
}

impl PlayerSurface for RecordingSurface {
    fn set_icon(&self, widget: WidgetId, icon: Icon) {
        lock(&self.state).icons.insert(widget, icon);
    }

    fn set_class(&self, widget: WidgetId, class: &str, on: bool) {
        let mut state = lock(&self.state);
        let set = state.classes.entry(widget).or_default();
        if on {
            set.insert(class.to_string());
        } else {
            set.remove(class);
        }
    }

    fn has_class(&self, widget: WidgetId, class: &str) -> bool {
        lock(&self.state)
            .classes
            .get(&widget)
            .is_some_and(|set| set.contains(class))
    }

    fn set_value(&self, widget: WidgetId, value: f64) {
        lock(&self.state).values.insert(widget, value);
    }

    fn set_max(&self, widget: WidgetId, max: f64) {
        lock(&self.state).maxes.insert(widget, max);
    }

    fn set_text(&self, widget: WidgetId, text: &str) {
        lock(&self.state).texts.insert(widget, text.to_string());
    }

    fn set_offset(&self, widget: WidgetId, left_px: f64) {
        lock(&self.state).offsets.insert(widget, left_px);
    }

    fn bounds(&self, widget: WidgetId) -> Option<Bounds> {
        lock(&self.state).bounds.get(&widget).copied()
    }
}
