//! Document-level host events and the listener registry they are routed through.
//!
//! A host forwards every pointer-down and key-up it sees to [`HostEvents::dispatch`].
//! Components register through [`HostEvents::subscribe`] and keep the returned
//! [`ListenerGuard`] for as long as they are mounted; dropping the guard
//! detaches the listener.

use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

/// Keys the widget distinguishes on key-up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Escape,
    Enter,
    Character(char),
    Other,
}

/// A host-level input event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HostEvent {
    /// Pointer pressed at the given position, in the same coordinate space as [`Bounds`].
    PointerDown { x: f64, y: f64 },
    /// Key released anywhere in the document.
    KeyUp(Key),
}

/// Axis-aligned screen region of a component.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Bounds {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Bounds {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Half-open containment: the left and top edges are inside, the right and bottom are not.
    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.x && x < self.x + self.width && y >= self.y && y < self.y + self.height
    }
}

/// Identifies the component that owns a listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OwnerId(u64);

impl OwnerId {
    /// Allocate a process-unique owner id.
    pub fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

type Listener = Arc<dyn Fn(&HostEvent) + Send + Sync>;

struct Entry {
    owner: OwnerId,
    /// Distinguishes a re-registration from the registration it replaced.
    registration: u64,
    listener: Listener,
}

#[derive(Default)]
struct Registry {
    entries: Vec<Entry>,
    next_registration: u64,
}

/// Registry of document-level listeners, at most one per owner.
#[derive(Clone, Default)]
pub struct HostEvents {
    inner: Arc<Mutex<Registry>>,
}

impl std::fmt::Debug for HostEvents {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HostEvents")
            .field("listeners", &self.listener_count())
            .finish()
    }
}

impl HostEvents {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `listener` for `owner`.
    ///
    /// If `owner` already has a listener it is replaced, so repeated mounts
    /// never stack duplicate handlers. Guards from the replaced registration
    /// become inert.
    pub fn subscribe<F>(&self, owner: OwnerId, listener: F) -> ListenerGuard
    where
        F: Fn(&HostEvent) + Send + Sync + 'static,
    {
        let mut registry = self.inner.lock();
        registry.next_registration += 1;
        let registration = registry.next_registration;
        let listener: Listener = Arc::new(listener);

        if let Some(entry) = registry.entries.iter_mut().find(|e| e.owner == owner) {
            log::debug!("HostEvents: replacing listener for {:?}", owner);
            entry.registration = registration;
            entry.listener = listener;
        } else {
            registry.entries.push(Entry {
                owner,
                registration,
                listener,
            });
        }

        ListenerGuard {
            registry: Arc::downgrade(&self.inner),
            owner,
            registration,
        }
    }

    /// Deliver `event` to every registered listener.
    ///
    /// Listeners run after the registry lock is released, so a listener may
    /// subscribe or drop guards without deadlocking.
    pub fn dispatch(&self, event: &HostEvent) {
        let listeners: Vec<Listener> = self
            .inner
            .lock()
            .entries
            .iter()
            .map(|e| Arc::clone(&e.listener))
            .collect();
        for listener in listeners {
            listener(event);
        }
    }

    pub fn listener_count(&self) -> usize {
        self.inner.lock().entries.len()
    }

    pub fn is_subscribed(&self, owner: OwnerId) -> bool {
        self.inner.lock().entries.iter().any(|e| e.owner == owner)
    }
}

/// Keeps a listener registered; dropping it removes the listener.
#[must_use = "the listener is removed as soon as the guard is dropped"]
pub struct ListenerGuard {
    registry: Weak<Mutex<Registry>>,
    owner: OwnerId,
    registration: u64,
}

impl std::fmt::Debug for ListenerGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ListenerGuard")
            .field("owner", &self.owner)
            .field("registration", &self.registration)
            .finish()
    }
}

impl Drop for ListenerGuard {
    fn drop(&mut self) {
        let Some(registry) = self.registry.upgrade() else {
            return;
        };
        let mut registry = registry.lock();
        let before = registry.entries.len();
        registry
            .entries
            .retain(|e| !(e.owner == self.owner && e.registration == self.registration));
        if registry.entries.len() != before {
            log::debug!("HostEvents: listener for {:?} detached", self.owner);
        }
    }
}
