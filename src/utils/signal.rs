//! Publish-subscribe signal
//!
//! An explicit observer registry keyed by slotmap tokens. Observers get a
//! [`SignalToken`] back from [`Signal::connect`] and must use it to
//! disconnect; severing a listener never relies on drop timing.

use slotmap::{SlotMap, new_key_type};

new_key_type! {
    /// Token identifying one connected observer of a [`Signal`].
    pub struct SignalToken;
}

type Callback<T> = Box<dyn FnMut(&T)>;

/// A single-threaded multicast signal.
///
/// Emission calls every connected observer with a reference to the payload.
/// Observers may be connected or disconnected at any time between emissions.
pub struct Signal<T> {
    slots: SlotMap<SignalToken, Callback<T>>,
}

impl<T> Signal<T> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            slots: SlotMap::with_key(),
        }
    }

    /// Connects an observer and returns the token required to disconnect it.
    pub fn connect(&mut self, callback: impl FnMut(&T) + 'static) -> SignalToken {
        self.slots.insert(Box::new(callback))
    }

    /// Disconnects an observer. Returns `false` if the token was already
    /// disconnected, which callers may treat as a contract violation.
    pub fn disconnect(&mut self, token: SignalToken) -> bool {
        self.slots.remove(token).is_some()
    }

    /// Invokes every connected observer with `payload`.
    pub fn emit(&mut self, payload: &T) {
        for (_, slot) in &mut self.slots {
            slot(payload);
        }
    }

    /// Number of connected observers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

impl<T> Default for Signal<T> {
    fn default() -> Self {
        Self::new()
    }
}
