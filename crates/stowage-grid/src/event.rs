//! Change notifications emitted by a grid.
//!
//! # Design
//!
//! Subscribers are stored as weak references to callbacks whose strong
//! handle lives in the [`Subscription`] guard returned to the caller.
//! Dropping the guard unsubscribes; dead entries are pruned lazily on the
//! next emit. Subscribers are called in registration order.
//!
//! Callbacks receive only the event, never the grid, so they cannot mutate
//! the grid that is notifying them. A subscriber that reaches a grid through
//! its own shared state and mutates it from inside a callback is
//! unsupported.

use std::fmt;
use std::rc::{Rc, Weak};

use serde::{Deserialize, Serialize};

use crate::item::ItemRef;

type CallbackRc = Rc<dyn Fn(&GridEvent)>;
type CallbackWeak = Weak<dyn Fn(&GridEvent)>;

/// A change notification.
#[derive(Clone)]
pub enum GridEvent {
    /// The cache was re-read from the provider by an explicit rebuild.
    Rebuilt,
    ItemAdded(ItemRef),
    ItemRemoved(ItemRef),
    /// The item left the grid onto open space.
    ItemDropped(ItemRef),
    /// The provider refused to record the item.
    ItemAddFailed(ItemRef),
    /// A drop was refused by the grid, the provider, or the item.
    ItemDropFailed(ItemRef),
    /// Bounds changed; emitted after eviction finished.
    Resized { width: u16, height: u16 },
}

/// Payload-free discriminant of a [`GridEvent`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GridEventKind {
    Rebuilt,
    ItemAdded,
    ItemRemoved,
    ItemDropped,
    ItemAddFailed,
    ItemDropFailed,
    Resized,
}

impl GridEvent {
    #[must_use]
    pub fn kind(&self) -> GridEventKind {
        match self {
            Self::Rebuilt => GridEventKind::Rebuilt,
            Self::ItemAdded(_) => GridEventKind::ItemAdded,
            Self::ItemRemoved(_) => GridEventKind::ItemRemoved,
            Self::ItemDropped(_) => GridEventKind::ItemDropped,
            Self::ItemAddFailed(_) => GridEventKind::ItemAddFailed,
            Self::ItemDropFailed(_) => GridEventKind::ItemDropFailed,
            Self::Resized { .. } => GridEventKind::Resized,
        }
    }

    /// The item the event is about, if any.
    #[must_use]
    pub fn item(&self) -> Option<&ItemRef> {
        match self {
            Self::ItemAdded(item)
            | Self::ItemRemoved(item)
            | Self::ItemDropped(item)
            | Self::ItemAddFailed(item)
            | Self::ItemDropFailed(item) => Some(item),
            Self::Rebuilt | Self::Resized { .. } => None,
        }
    }
}

impl fmt::Debug for GridEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Resized { width, height } => f
                .debug_struct("Resized")
                .field("width", width)
                .field("height", height)
                .finish(),
            other => match other.item() {
                Some(item) => f
                    .debug_tuple(&format!("{:?}", other.kind()))
                    .field(&item.label())
                    .finish(),
                None => write!(f, "{:?}", other.kind()),
            },
        }
    }
}

/// RAII guard for a grid subscriber.
///
/// Dropping the guard makes the callback unreachable; it will not be called
/// again.
#[must_use = "dropping a Subscription unsubscribes immediately"]
pub struct Subscription {
    _callback: CallbackRc,
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription").finish_non_exhaustive()
    }
}

/// Subscriber list owned by a grid.
#[derive(Default)]
pub(crate) struct Listeners {
    subscribers: Vec<CallbackWeak>,
}

impl Listeners {
    pub(crate) fn subscribe(&mut self, callback: impl Fn(&GridEvent) + 'static) -> Subscription {
        let strong: CallbackRc = Rc::new(callback);
        self.subscribers.push(Rc::downgrade(&strong));
        Subscription { _callback: strong }
    }

    /// Registered subscribers, including dead ones not yet pruned.
    pub(crate) fn len(&self) -> usize {
        self.subscribers.len()
    }

    pub(crate) fn emit(&mut self, event: GridEvent) {
        self.subscribers.retain(|w| w.strong_count() > 0);
        let callbacks: Vec<CallbackRc> = self
            .subscribers
            .iter()
            .filter_map(Weak::upgrade)
            .collect();
        for callback in &callbacks {
            callback(&event);
        }
    }
}

impl fmt::Debug for Listeners {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Listeners")
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}
