//! Listener registry: bind/unbind/silence/revoke ledger with grouping.
//!
//! Architecture:
//! - Every `bind()` attaches a live binding on the target AND records a
//!   [`ListenerEntry`] in the active ledger (duplicates allowed, each fires)
//! - `silent()` detaches live bindings but keeps the entries, marked inactive,
//!   with a [`SilencedEntry`] snapshot for restoring them
//! - `revoke()` re-attaches silenced snapshots and reactivates their entries
//! - Groups are free-form labels for bulk teardown; the set of group names is
//!   append-only
//!
//! Matching rules differ between mutators and queries:
//! - `unbind`/`silent`/`revoke` remove anything touched by ANY criterion:
//!   `(target AND (no type OR type)) OR group`
//! - `listeners()` selects by the intersection of the given filters
//!
//! No lock is held while calling into a target, so listeners may re-enter
//! the registry from their callbacks.

use std::sync::{Arc, Mutex, MutexGuard};

use indexmap::IndexSet;
use log::{debug, trace, warn};

use super::dom::{ListenOptions, Listener, Target};

/// Stable position of an entry in insertion order.
pub type EntryId = u64;

/// One recorded binding
#[derive(Clone, Debug)]
pub struct ListenerEntry {
    pub id: EntryId,
    pub target: Target,
    pub event_type: String,
    pub listener: Listener,
    pub options: ListenOptions,
    pub group: Option<String>,
    pub active: bool,
}

/// Snapshot of a silenced entry, enough to re-attach it
#[derive(Clone, Debug)]
pub struct SilencedEntry {
    pub origin: EntryId,
    pub target: Target,
    pub event_type: String,
    pub listener: Listener,
    pub options: ListenOptions,
    pub group: Option<String>,
}

impl SilencedEntry {
    fn snapshot(entry: &ListenerEntry) -> Self {
        Self {
            origin: entry.id,
            target: entry.target.clone(),
            event_type: entry.event_type.clone(),
            listener: entry.listener.clone(),
            options: entry.options.clone(),
            group: entry.group.clone(),
        }
    }
}

/// Optional (target, type, group) criteria
#[derive(Clone, Copy, Debug, Default)]
struct Filter<'a> {
    target: Option<&'a Target>,
    event_type: Option<&'a str>,
    group: Option<&'a str>,
}

impl<'a> Filter<'a> {
    fn new(target: Option<&'a Target>, event_type: Option<&'a str>, group: Option<&'a str>) -> Self {
        Self { target, event_type, group }
    }

    fn is_empty(&self) -> bool {
        self.target.is_none() && self.event_type.is_none() && self.group.is_none()
    }

    /// OR rule used by unbind/silent/revoke.
    ///
    /// An event type alone never matches: it only narrows a target.
    fn touches(&self, target: &Target, event_type: &str, group: Option<&str>) -> bool {
        let by_target = self.target.is_some_and(|t| t == target)
            && self.event_type.is_none_or(|e| e == event_type);
        let by_group = self.group.is_some_and(|g| group == Some(g));
        by_target || by_group
    }

    /// AND rule used by queries
    fn selects(&self, entry: &ListenerEntry) -> bool {
        self.target.is_none_or(|t| *t == entry.target)
            && self.event_type.is_none_or(|e| e == entry.event_type)
            && self.group.is_none_or(|g| entry.group.as_deref() == Some(g))
    }
}

#[derive(Default)]
struct Ledger {
    listeners: Vec<ListenerEntry>,
    silenced: Vec<SilencedEntry>,
    groups: IndexSet<String>,
    next_id: EntryId,
}

/// Listener registry handle.
///
/// Cheap to clone; all clones share one ledger. Create one per hosting
/// application and pass it to the controller and widgets.
#[derive(Clone, Default)]
pub struct EventRegistry {
    ledger: Arc<Mutex<Ledger>>,
}

impl std::fmt::Debug for EventRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let ledger = self.ledger();
        f.debug_struct("EventRegistry")
            .field("listeners", &ledger.listeners.len())
            .field("silenced", &ledger.silenced.len())
            .field("groups", &ledger.groups.len())
            .finish()
    }
}

impl EventRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn ledger(&self) -> MutexGuard<'_, Ledger> {
        self.ledger.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Attach `listener` for `event_type` on `target` and record it.
    ///
    /// Never deduplicates: binding the same (target, type, listener) twice
    /// yields two entries and two live bindings.
    pub fn bind(
        &self,
        target: &Target,
        event_type: &str,
        listener: Listener,
        options: impl Into<ListenOptions>,
    ) -> EntryId {
        let options = options.into();
        target.subscribe(event_type, &listener, &options);

        let mut ledger = self.ledger();
        if let Some(group) = &options.group {
            ledger.groups.insert(group.clone());
        }
        let id = ledger.next_id;
        ledger.next_id += 1;
        trace!("EventRegistry: bind #{} '{}' group={:?}", id, event_type, options.group);
        ledger.listeners.push(ListenerEntry {
            id,
            target: target.clone(),
            event_type: event_type.to_string(),
            listener,
            group: options.group.clone(),
            options,
            active: true,
        });
        id
    }

    /// Remove every entry touched by `(target [, event_type]) OR group`.
    ///
    /// Live bindings of active matches are detached; matching silenced
    /// entries are forgotten. Returns the number of entries removed, 0 when
    /// neither `target` nor `group` is given.
    pub fn unbind(&self, target: Option<&Target>, event_type: Option<&str>, group: Option<&str>) -> usize {
        if target.is_none() && group.is_none() {
            return 0;
        }
        let filter = Filter::new(target, event_type, group);

        let removed: Vec<ListenerEntry> = {
            let mut ledger = self.ledger();
            let (removed, kept): (Vec<_>, Vec<_>) = std::mem::take(&mut ledger.listeners)
                .into_iter()
                .partition(|e| filter.touches(&e.target, &e.event_type, e.group.as_deref()));
            ledger.listeners = kept;
            ledger
                .silenced
                .retain(|s| !removed.iter().any(|e| e.id == s.origin));
            removed
        };

        for entry in removed.iter().filter(|e| e.active) {
            entry.target.unsubscribe(&entry.event_type, &entry.listener, &entry.options);
        }

        if !removed.is_empty() {
            debug!(
                "EventRegistry: unbound {} listener(s) (type={:?}, group={:?})",
                removed.len(),
                event_type,
                group
            );
        }
        removed.len()
    }

    /// Detach matching active bindings but remember them for `revoke()`.
    ///
    /// Same OR rule as `unbind()`; with no criteria at all every active
    /// entry is silenced. Returns the number of entries silenced.
    pub fn silent(&self, target: Option<&Target>, event_type: Option<&str>, group: Option<&str>) -> usize {
        let filter = Filter::new(target, event_type, group);
        let all = filter.is_empty();

        let detached: Vec<SilencedEntry> = {
            let mut ledger = self.ledger();
            let mut detached = Vec::new();
            for entry in ledger.listeners.iter_mut() {
                if entry.active
                    && (all || filter.touches(&entry.target, &entry.event_type, entry.group.as_deref()))
                {
                    entry.active = false;
                    detached.push(SilencedEntry::snapshot(entry));
                }
            }
            ledger.silenced.extend(detached.iter().cloned());
            detached
        };

        for s in &detached {
            s.target.unsubscribe(&s.event_type, &s.listener, &s.options);
        }
        trace!("EventRegistry: silenced {} listener(s)", detached.len());
        detached.len()
    }

    /// Silence every active entry
    pub fn silent_all(&self) -> usize {
        self.silent(None, None, None)
    }

    /// Re-attach matching silenced entries and mark them active again.
    ///
    /// With no criteria every silenced entry is restored. Returns the number
    /// of entries restored.
    pub fn revoke(&self, target: Option<&Target>, event_type: Option<&str>, group: Option<&str>) -> usize {
        let filter = Filter::new(target, event_type, group);
        let all = filter.is_empty();

        let restored: Vec<SilencedEntry> = {
            let mut ledger = self.ledger();
            let (matched, still): (Vec<_>, Vec<_>) = std::mem::take(&mut ledger.silenced)
                .into_iter()
                .partition(|s| all || filter.touches(&s.target, &s.event_type, s.group.as_deref()));
            ledger.silenced = still;

            let mut restored = Vec::with_capacity(matched.len());
            for s in matched {
                match ledger.listeners.iter_mut().find(|e| e.id == s.origin) {
                    Some(entry) => {
                        entry.active = true;
                        restored.push(s);
                    }
                    None => warn!("EventRegistry: silenced entry #{} has no origin, dropped", s.origin),
                }
            }
            restored
        };

        for s in &restored {
            s.target.subscribe(&s.event_type, &s.listener, &s.options);
        }
        trace!("EventRegistry: revoked {} listener(s)", restored.len());
        restored.len()
    }

    /// Restore every silenced entry
    pub fn revoke_all(&self) -> usize {
        self.revoke(None, None, None)
    }

    /// Active entries matching ALL given filters (copy).
    pub fn listeners(&self, target: Option<&Target>, event_type: Option<&str>, group: Option<&str>) -> Vec<ListenerEntry> {
        let filter = Filter::new(target, event_type, group);
        self.ledger()
            .listeners
            .iter()
            .filter(|e| e.active && filter.selects(e))
            .cloned()
            .collect()
    }

    /// Silenced snapshots (copy)
    pub fn silenced(&self) -> Vec<SilencedEntry> {
        self.ledger().silenced.clone()
    }

    /// Every group name ever used, in first-use order
    pub fn groups(&self) -> Vec<String> {
        self.ledger().groups.iter().cloned().collect()
    }

    /// Drop a group, or with `None` detach everything and clear both ledgers.
    pub fn unbind_all(&self, group: Option<&str>) -> usize {
        if let Some(group) = group {
            return self.unbind(None, None, Some(group));
        }

        let removed = {
            let mut ledger = self.ledger();
            ledger.silenced.clear();
            std::mem::take(&mut ledger.listeners)
        };
        for entry in removed.iter().filter(|e| e.active) {
            entry.target.unsubscribe(&entry.event_type, &entry.listener, &entry.options);
        }
        debug!("EventRegistry: unbound all ({} listener(s))", removed.len());
        removed.len()
    }

    /// Number of known entries (active + silenced)
    pub fn len(&self) -> usize {
        self.ledger().listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ledger().listeners.is_empty()
    }

    /// Tear down: detach and forget everything. Group names are kept.
    pub fn dispose(&self) {
        self.unbind_all(None);
    }
}
