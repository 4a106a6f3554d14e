use crate::{Component, NodeId, PoolError, Reusable, Scene};
use core::fmt;
use glam::{Quat, Vec3};

/// The pool's view of the world its items live in.
///
/// This trait provides methods for cloning the template, toggling and
/// placing items, and reaching the [`Reusable`] component of an item.
/// [`Scene`] implements it for every reusable component type, so a pool can
/// manage scene objects directly.
pub trait PoolHost<R: Reusable> {
    /// How the host addresses an object.
    type Handle: Copy + Eq + fmt::Debug;

    /// Creates a new object by cloning `template`, naming it `name`.
    ///
    /// Returns `None` if the template no longer exists.
    fn instantiate(&mut self, template: Self::Handle, name: String) -> Option<Self::Handle>;

    /// Name of an object, used to derive the names of clones.
    fn name(&self, item: Self::Handle) -> Option<&str>;

    /// Whether the object itself is active.
    fn is_active(&self, item: Self::Handle) -> bool;

    /// Activates or deactivates the object. Errors abort the request that
    /// triggered the call.
    fn set_active(&mut self, item: Self::Handle, active: bool) -> Result<(), PoolError>;

    /// Moves the object to a world-space position and rotation.
    fn place(
        &mut self,
        item: Self::Handle,
        position: Vec3,
        rotation: Quat,
    ) -> Result<(), PoolError>;

    /// The reusable component of the object.
    fn reusable(&self, item: Self::Handle) -> Option<&R>;

    /// The reusable component of the object.
    fn reusable_mut(&mut self, item: Self::Handle) -> Option<&mut R>;

    /// Validates that an object still exists and carries its reusable
    /// component.
    ///
    /// By default this checks [`Self::reusable`]. Override this method to
    /// provide a cheaper check.
    #[inline(always)]
    fn is_live(&self, item: Self::Handle) -> bool {
        self.reusable(item).is_some()
    }
}

impl<R: Reusable + Component> PoolHost<R> for Scene {
    type Handle = NodeId;

    fn instantiate(&mut self, template: NodeId, name: String) -> Option<NodeId> {
        Scene::instantiate(self, template, name).ok()
    }

    fn name(&self, item: NodeId) -> Option<&str> {
        Scene::name(self, item)
    }

    fn is_active(&self, item: NodeId) -> bool {
        self.active_self(item)
    }

    fn set_active(&mut self, item: NodeId, active: bool) -> Result<(), PoolError> {
        Scene::set_active(self, item, active)?;
        Ok(())
    }

    fn place(&mut self, item: NodeId, position: Vec3, rotation: Quat) -> Result<(), PoolError> {
        self.set_position(item, position)?;
        self.set_rotation(item, rotation)?;
        Ok(())
    }

    fn reusable(&self, item: NodeId) -> Option<&R> {
        self.get::<R>(item)
    }

    fn reusable_mut(&mut self, item: NodeId) -> Option<&mut R> {
        self.get_mut::<R>(item)
    }
}
