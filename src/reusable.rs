use core::cell::Cell;

/// Tracks whether a pooled object may be handed out again.
///
/// A fresh flag is reusable. The flag uses interior mutability so that an
/// object can be freed through a shared reference, for example from inside
/// [`Reusable::reuse_requested`] or by whoever currently owns the item.
#[derive(Debug, Clone)]
pub struct ReuseFlag(Cell<bool>);

impl ReuseFlag {
    /// Creates a flag in the given state.
    pub const fn new(can_be_reused: bool) -> Self {
        ReuseFlag(Cell::new(can_be_reused))
    }

    /// Current state of the flag.
    pub fn get(&self) -> bool {
        self.0.get()
    }

    /// Overwrites the state of the flag.
    pub fn set(&self, can_be_reused: bool) {
        self.0.set(can_be_reused)
    }
}

impl Default for ReuseFlag {
    fn default() -> Self {
        ReuseFlag::new(true)
    }
}

/// A component that opts into reuse by [`GenericPool`](crate::GenericPool).
///
/// When an item is ready to be reused, its owner calls
/// [`Self::free_for_reuse`]. The pool calls [`Self::lock_for_reuse`] on every
/// item it hands out so the same item is not given away twice.
///
/// Marking for reuse and resetting the object's state have their own hooks,
/// so the pool stays agnostic of what the pooled object actually is.
pub trait Reusable {
    /// Called whenever the item is about to be reused, before it is placed
    /// and activated. The item must restore its original state here.
    fn reset_for_reuse(&mut self);

    /// Called after the item has been placed and activated, just before it
    /// is returned to the requester.
    fn after_reuse(&mut self);

    /// Called when the pool ran out of free items. The implementation may
    /// either call [`Self::free_for_reuse`] to be reused immediately, or
    /// ignore the request.
    fn reuse_requested(&mut self);

    /// The flag backing [`Self::can_be_reused`].
    fn reuse_flag(&self) -> &ReuseFlag;

    /// Whether the item may be handed out by the pool.
    fn can_be_reused(&self) -> bool {
        self.reuse_flag().get()
    }

    /// Marks the item as ready to be reused.
    fn free_for_reuse(&self) {
        self.reuse_flag().set(true)
    }

    /// Prevents reuse of the item until [`Self::free_for_reuse`] is called.
    fn lock_for_reuse(&self) {
        self.reuse_flag().set(false)
    }
}
