//! Mechanism for receiving notifications of state changes.
//!
//! Objects which wish to send notifications use [`Notifier`]s, which manage a
//! collection of [`Listener`]s. Each listener reports when it is no longer
//! needed and may be discarded; listeners may also be removed explicitly via
//! the [`ListenerKey`] returned at registration.
//!
//! When [`Notifier::notify`] is called to send a message, it is synchronously
//! delivered to all listeners in registration order; therefore, listeners are
//! obligated to avoid making further significant state changes. The typical
//! pattern is for a listener to hold a `Weak` reference to a [`DirtyFlag`] or
//! similar aggregation structure, which is then read and cleared by a separate
//! part of the application's update loop.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

/// Mechanism for observing changes to objects. A [`Notifier`] delivers messages
/// of type `M` to a set of listeners, each of which usually holds a weak
/// reference to allow it to be discarded when the actual recipient is gone or
/// uninterested.
///
/// Delivery is synchronous and in registration order. Each listener receives
/// each message exactly once (until it is removed or reports itself dead).
pub struct Notifier<M> {
    listeners: RefCell<Vec<(ListenerKey, Box<dyn Listener<M>>)>>,
    next_key: Cell<u64>,
}

/// Handle identifying a [`Listener`] registered with a particular [`Notifier`],
/// for use with [`Notifier::unlisten`].
///
/// Keys are never reused by the notifier that issued them.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct ListenerKey(u64);

impl<M: Clone> Notifier<M> {
    /// Constructs a new empty [`Notifier`].
    pub fn new() -> Self {
        Self {
            listeners: RefCell::new(Vec::new()),
            next_key: Cell::new(0),
        }
    }

    /// Add a [`Listener`] to this set of listeners.
    ///
    /// The returned [`ListenerKey`] may be passed to [`Notifier::unlisten`] to
    /// remove the listener again. A listener which is already dead (per
    /// [`Listener::alive`]) is not registered, and its key is inert.
    pub fn listen<L: Listener<M> + 'static>(&self, listener: L) -> ListenerKey {
        let key = ListenerKey(self.next_key.get());
        self.next_key.set(key.0 + 1);
        if !listener.alive() {
            return key;
        }
        let mut listeners = self
            .listeners
            .try_borrow_mut()
            .expect("adding listeners while a notification is being sent is not supported");
        Self::cleanup(&mut listeners);
        listeners.push((key, Box::new(listener)));
        key
    }

    /// Remove the listener identified by `key`, if it is still registered.
    ///
    /// Returns whether a listener was actually removed.
    pub fn unlisten(&self, key: ListenerKey) -> bool {
        let mut listeners = self
            .listeners
            .try_borrow_mut()
            .expect("removing listeners while a notification is being sent is not supported");
        let previous_len = listeners.len();
        listeners.retain(|&(k, _)| k != key);
        listeners.len() != previous_len
    }

    /// Deliver a message to all [`Listener`]s, in registration order.
    pub fn notify(&self, message: M) {
        for (_, listener) in self.listeners.borrow().iter() {
            listener.receive(message.clone());
        }
    }

    /// Returns the number of currently registered (not necessarily alive)
    /// listeners.
    pub fn count(&self) -> usize {
        self.listeners.borrow().len()
    }

    /// Discard all dead listeners, preserving registration order of the rest.
    fn cleanup(listeners: &mut Vec<(ListenerKey, Box<dyn Listener<M>>)>) {
        listeners.retain(|(_, listener)| listener.alive());
    }
}

impl<M: Clone> Default for Notifier<M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M> fmt::Debug for Notifier<M> {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Ok(listeners) = self.listeners.try_borrow() {
            fmt.debug_tuple("Notifier").field(&listeners.len()).finish()
        } else {
            fmt.debug_tuple("Notifier").field(&"?").finish()
        }
    }
}

/// A receiver of messages which can indicate when it is no longer interested in
/// them (typically because the associated recipient has been dropped).
///
/// Note that a `Listener` must use interior mutability to store the message.
/// As a `Listener` may be called from various contexts, that mutability should
/// in general be limited to setting dirty flags or inserting into message
/// queues — not triggering any state changes of more general interest, and
/// definitely not calling back into the mutation API of the object being
/// listened to (which is typically mutably borrowed while notifying).
pub trait Listener<M> {
    /// Process and store a message.
    fn receive(&self, message: M);

    /// Returns [`false`] if the `Listener` should not receive any further
    /// messages because its destination is no longer interested in them.
    fn alive(&self) -> bool;
}

/// A [`Listener`] which discards all messages, suitable for filling listener
/// parameters when no listener is needed.
#[derive(Clone, Copy, Debug)]
#[allow(clippy::exhaustive_structs)]
pub struct NullListener;

impl<M> Listener<M> for NullListener {
    fn receive(&self, _message: M) {}
    fn alive(&self) -> bool {
        false
    }
}

/// A [`Listener`] destination which records every message it receives, in
/// order. Mostly useful for tests that need to count or inspect deliveries.
pub struct Sink<M> {
    messages: Rc<RefCell<Vec<M>>>,
}

struct SinkListener<M> {
    weak_messages: Weak<RefCell<Vec<M>>>,
}

impl<M> Sink<M> {
    /// Constructs a new empty [`Sink`].
    pub fn new() -> Self {
        Self {
            messages: Rc::new(RefCell::new(Vec::new())),
        }
    }

    /// Returns a [`Listener`] which records the messages it receives in this
    /// `Sink`.
    pub fn listener(&self) -> impl Listener<M> {
        SinkListener {
            weak_messages: Rc::downgrade(&self.messages),
        }
    }

    /// Removes and returns all messages received so far, oldest first.
    pub fn drain(&self) -> Vec<M> {
        std::mem::take(&mut *self.messages.borrow_mut())
    }

    /// Returns the number of messages received and not yet drained.
    pub fn count(&self) -> usize {
        self.messages.borrow().len()
    }
}

impl<M> Listener<M> for SinkListener<M> {
    fn receive(&self, message: M) {
        if let Some(cell) = self.weak_messages.upgrade() {
            cell.borrow_mut().push(message);
        }
    }
    fn alive(&self) -> bool {
        self.weak_messages.strong_count() > 0
    }
}

impl<M> Default for Sink<M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M> fmt::Debug for Sink<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Sink").field(&self.messages.borrow().len()).finish()
    }
}

/// A [`Listener`] destination which only stores a single flag indicating if
/// any messages were received.
pub struct DirtyFlag {
    flag: Rc<Cell<bool>>,
}

impl fmt::Debug for DirtyFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("DirtyFlag").field(&self.flag.get()).finish()
    }
}

struct DirtyFlagListener {
    weak_flag: Weak<Cell<bool>>,
}

impl DirtyFlag {
    /// Constructs a new [`DirtyFlag`] with the given initial value.
    pub fn new(value: bool) -> Self {
        Self {
            flag: Rc::new(Cell::new(value)),
        }
    }

    /// Returns a [`Listener`] which will set this flag to [`true`] when it
    /// receives any message.
    pub fn listener<M>(&self) -> impl Listener<M> {
        DirtyFlagListener {
            weak_flag: Rc::downgrade(&self.flag),
        }
    }

    /// Returns the flag value, setting it to [`false`] at the same time.
    pub fn get_and_clear(&self) -> bool {
        self.flag.replace(false)
    }

    /// Sets the flag, as if a message had been received.
    pub fn set(&self) {
        self.flag.set(true);
    }
}

impl<M> Listener<M> for DirtyFlagListener {
    fn receive(&self, _message: M) {
        if let Some(cell) = self.weak_flag.upgrade() {
            cell.set(true);
        }
    }
    fn alive(&self) -> bool {
        self.weak_flag.strong_count() > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn notifier_basics_and_debug() {
        let cn: Notifier<u8> = Notifier::new();
        assert_eq!(format!("{cn:?}"), "Notifier(0)");
        cn.notify(0);
        assert_eq!(format!("{cn:?}"), "Notifier(0)");
        let sink = Sink::new();
        cn.listen(sink.listener());
        assert_eq!(format!("{cn:?}"), "Notifier(1)");
        assert_eq!(sink.drain(), Vec::<u8>::new());
        cn.notify(1);
        cn.notify(2);
        assert_eq!(sink.drain(), vec![1, 2]);
        assert_eq!(format!("{cn:?}"), "Notifier(1)");
    }

    #[test]
    fn notifier_delivers_in_registration_order() {
        let cn: Notifier<&'static str> = Notifier::new();
        let log: Rc<RefCell<Vec<String>>> = Rc::default();

        struct Tagger {
            tag: &'static str,
            log: Rc<RefCell<Vec<String>>>,
        }
        impl Listener<&'static str> for Tagger {
            fn receive(&self, message: &'static str) {
                self.log.borrow_mut().push(format!("{}:{message}", self.tag));
            }
            fn alive(&self) -> bool {
                true
            }
        }

        cn.listen(Tagger { tag: "a", log: log.clone() });
        cn.listen(Tagger { tag: "b", log: log.clone() });
        cn.listen(Tagger { tag: "c", log: log.clone() });
        cn.notify("m");
        assert_eq!(*log.borrow(), vec!["a:m", "b:m", "c:m"]);
    }

    #[test]
    fn notifier_unlisten_by_key() {
        let cn: Notifier<u8> = Notifier::new();
        let sink1 = Sink::new();
        let sink2 = Sink::new();
        let key1 = cn.listen(sink1.listener());
        let _key2 = cn.listen(sink2.listener());

        assert!(cn.unlisten(key1));
        cn.notify(9);
        assert_eq!(sink1.count(), 0);
        assert_eq!(sink2.drain(), vec![9]);

        // Removal is not repeatable.
        assert!(!cn.unlisten(key1));
    }

    #[test]
    fn notifier_skips_dead_listener_on_listen() {
        let cn: Notifier<u8> = Notifier::new();
        let key = cn.listen(NullListener);
        assert_eq!(cn.count(), 0);
        assert!(!cn.unlisten(key));
    }

    #[test]
    fn notifier_cleans_up_dropped_destinations() {
        let cn: Notifier<u8> = Notifier::new();
        {
            let sink: Sink<u8> = Sink::new();
            cn.listen(sink.listener());
            assert_eq!(cn.count(), 1);
        }
        // The next registration prunes the dead one.
        let kept = Sink::new();
        cn.listen(kept.listener());
        assert_eq!(cn.count(), 1);
    }

    #[test]
    fn dirty_flag_debug_and_behavior() {
        assert_eq!(format!("{:?}", DirtyFlag::new(false)), "DirtyFlag(false)");
        assert_eq!(format!("{:?}", DirtyFlag::new(true)), "DirtyFlag(true)");

        let dirtied = DirtyFlag::new(false);
        dirtied.listener::<()>().receive(());
        assert_eq!(format!("{dirtied:?}"), "DirtyFlag(true)");
        assert!(dirtied.get_and_clear());
        assert!(!dirtied.get_and_clear());
    }

    #[test]
    fn dirty_flag_listener_dies_with_flag() {
        let cn: Notifier<()> = Notifier::new();
        {
            let flag = DirtyFlag::new(false);
            cn.listen(flag.listener());
        }
        cn.notify(()); // no panic, no effect
        cn.listen(Sink::<()>::new().listener());
        assert_eq!(cn.count(), 1);
    }
}
