//! [`Inventory`] for storing stackable items.

use arcstr::ArcStr;

use crate::listen::{Listener, ListenerKey, Notifier};

/// Opaque soft reference to an icon asset, resolved at presentation time by a
/// [`grid::IconResolver`](crate::grid::IconResolver). Absence of an icon is
/// valid and renders as a text fallback.
pub type IconRef = ArcStr;

/// A single inventory entry: one kind of item and how many of it are held.
///
/// `item_id` is the merge key: an [`Inventory`] holds at most one `Slot` per
/// distinct id. The inventory maintains the invariant that every stored slot
/// has a non-empty `item_id` and `quantity >= 1`; a slot whose quantity would
/// drop to zero is removed outright, never stored empty.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Slot {
    /// Logical identifier of the item; the key by which stacks merge.
    pub item_id: ArcStr,
    /// Human-readable label, independent of `item_id`.
    pub display_name: ArcStr,
    /// Optional reference to a visual asset.
    pub icon: Option<IconRef>,
    /// Current stack quantity.
    pub quantity: u32,
}

impl Slot {
    /// Convenience constructor for a slot with no icon.
    pub fn new(
        item_id: impl Into<ArcStr>,
        display_name: impl Into<ArcStr>,
        quantity: u32,
    ) -> Self {
        Self {
            item_id: item_id.into(),
            display_name: display_name.into(),
            icon: None,
            quantity,
        }
    }

    /// Returns `self` with the given icon reference attached.
    #[must_use]
    pub fn with_icon(mut self, icon: impl Into<IconRef>) -> Self {
        self.icon = Some(icon.into());
        self
    }
}

/// An ordered, bounded collection of [`Slot`]s with merge-on-add stacking.
///
/// Slot order is insertion order; it is never sorted. The number of slots
/// never exceeds [`capacity`](Self::capacity), and lowering the capacity does
/// not evict existing slots — it only constrains future non-merging additions.
///
/// Every successful mutation ([`add`](Self::add), [`remove`](Self::remove),
/// [`clear`](Self::clear)) synchronously notifies all listeners registered via
/// [`listen`](Self::listen), exactly once, before the mutating call returns.
/// Failed mutations change nothing and notify nobody.
///
/// Lookup by id is a linear scan; with a bounded slot count and the
/// one-slot-per-id invariant this is strictly bounded by the capacity, so no
/// index structure is kept.
#[derive(Debug)]
pub struct Inventory {
    slots: Vec<Slot>,
    capacity: usize,
    notifier: Notifier<()>,
}

impl Inventory {
    /// Capacity of an inventory constructed with [`Inventory::new`].
    pub const DEFAULT_CAPACITY: usize = 24;

    /// Constructs an empty [`Inventory`] with [`Self::DEFAULT_CAPACITY`].
    pub fn new() -> Self {
        Self::with_capacity(Self::DEFAULT_CAPACITY)
    }

    /// Constructs an empty [`Inventory`] with the given capacity,
    /// clamped to a minimum of 1.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::new(),
            capacity: capacity.max(1),
            notifier: Notifier::new(),
        }
    }

    /// Adds an item stack, merging it into an existing slot with the same
    /// `item_id` if there is one, and appending a new slot otherwise.
    ///
    /// Fails with [`AddError::InvalidStack`] if `item.item_id` is empty or
    /// `item.quantity` is zero, and with [`AddError::Full`] if a new slot
    /// would be needed but the inventory is at capacity. On failure nothing
    /// is changed and no notification is sent.
    pub fn add(&mut self, item: Slot) -> Result<(), AddError> {
        if item.item_id.is_empty() || item.quantity == 0 {
            log::warn!(
                "rejecting invalid item stack: id={:?}, quantity={}",
                item.item_id,
                item.quantity
            );
            return Err(AddError::InvalidStack);
        }

        if let Some(index) = self.find_slot(&item.item_id) {
            let slot = &mut self.slots[index];
            slot.quantity = slot.quantity.saturating_add(item.quantity);
            self.notify_changed();
            return Ok(());
        }

        if self.slots.len() >= self.capacity {
            log::warn!("inventory full; rejecting {:?}", item.item_id);
            return Err(AddError::Full);
        }

        self.slots.push(item);
        self.notify_changed();
        Ok(())
    }

    /// Removes up to `quantity` items with the given id. If the slot's
    /// quantity would drop to zero or below, the slot is deleted entirely;
    /// removing more than is held is not an error.
    ///
    /// Fails with [`RemoveError::InvalidRequest`] if `item_id` is empty or
    /// `quantity` is zero, and with [`RemoveError::NotFound`] if no slot has
    /// that id. On failure nothing is changed and no notification is sent.
    pub fn remove(&mut self, item_id: &str, quantity: u32) -> Result<(), RemoveError> {
        if item_id.is_empty() || quantity == 0 {
            return Err(RemoveError::InvalidRequest);
        }
        let Some(index) = self.find_slot(item_id) else {
            return Err(RemoveError::NotFound);
        };

        let slot = &mut self.slots[index];
        if slot.quantity > quantity {
            slot.quantity -= quantity;
        } else {
            self.slots.remove(index);
        }
        self.notify_changed();
        Ok(())
    }

    /// Removes all slots unconditionally.
    ///
    /// Always notifies, even when the inventory was already empty.
    pub fn clear(&mut self) {
        self.slots.clear();
        self.notify_changed();
    }

    /// Returns a read-only view of all slots, in insertion order.
    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    /// Returns whether this inventory holds no slots.
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Returns the maximum number of slots.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Sets the maximum number of slots, clamped to a minimum of 1.
    ///
    /// Lowering the capacity below the current slot count does not evict
    /// anything; it only blocks future additions that would need a new slot.
    pub fn set_capacity(&mut self, capacity: usize) {
        self.capacity = capacity.max(1);
    }

    /// Registers a listener to be notified synchronously after every
    /// successful mutation. The message carries no payload.
    ///
    /// Listeners must not call back into this inventory's mutation API from
    /// [`receive`](Listener::receive); the inventory is mutably borrowed while
    /// notifying. Set a [`DirtyFlag`](crate::listen::DirtyFlag) and act later.
    pub fn listen(&self, listener: impl Listener<()> + 'static) -> ListenerKey {
        self.notifier.listen(listener)
    }

    /// Removes a listener previously registered with [`listen`](Self::listen).
    pub fn unlisten(&self, key: ListenerKey) -> bool {
        self.notifier.unlisten(key)
    }

    /// First (and, by the uniqueness invariant, only) slot with the given id.
    fn find_slot(&self, item_id: &str) -> Option<usize> {
        self.slots.iter().position(|slot| slot.item_id == item_id)
    }

    fn notify_changed(&self) {
        self.notifier.notify(());
    }
}

impl Default for Inventory {
    fn default() -> Self {
        Self::new()
    }
}

/// Error from [`Inventory::add`].
#[derive(Clone, Copy, Debug, Eq, PartialEq, displaydoc::Display)]
#[non_exhaustive]
pub enum AddError {
    /// item stack has an empty id or a zero quantity
    InvalidStack,
    /// no existing stack to merge into and no free slot
    Full,
}

/// Error from [`Inventory::remove`].
#[derive(Clone, Copy, Debug, Eq, PartialEq, displaydoc::Display)]
#[non_exhaustive]
pub enum RemoveError {
    /// removal request has an empty id or a zero quantity
    InvalidRequest,
    /// no slot with the requested id
    NotFound,
}

impl core::error::Error for AddError {}
impl core::error::Error for RemoveError {}
