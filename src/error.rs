use crate::NodeId;
use thiserror::Error;

/// Failures raised by [`GenericPool`](crate::GenericPool).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PoolError {
    /// Every item is in use, none accepted a reuse request and the grow rate
    /// is zero.
    #[error(
        "requesting an item from a pool with capacity {capacity} failed and the grow rate is 0, \
         no more items available"
    )]
    OutOfItems {
        /// Capacity of the pool at the time of the request.
        capacity: usize,
    },

    /// The pool was initialized without a template, or the template object
    /// no longer exists.
    #[error("no template has been set before the pool was initialized")]
    NoTemplate,

    /// The configured capacity does not fit in memory.
    #[error("cannot reserve room for a pool with capacity {capacity}")]
    CapacityOverflow {
        /// Requested capacity.
        capacity: usize,
    },

    /// The scene failed to activate or place an item.
    #[error(transparent)]
    Scene(#[from] SceneError),
}

/// Failures raised by [`Scene`](crate::Scene) operations and component
/// search.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SceneError {
    /// The handle does not refer to a live object.
    #[error("object {0:?} does not exist")]
    MissingObject(NodeId),

    /// Reparenting would make an object its own ancestor.
    #[error("cannot parent {child:?} under its own descendant {parent:?}")]
    CyclicParent {
        /// Object being reparented.
        child: NodeId,
        /// Requested parent.
        parent: NodeId,
    },

    /// No component of the requested type exists in the search scope.
    #[error("failed to find a component of type {component} from {object}")]
    ComponentNotFound {
        /// Type name of the requested component.
        component: &'static str,
        /// Name of the object the search started from.
        object: String,
    },
}

/// Misuse of the [`Singletons`](crate::Singletons) registry.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SingletonError {
    /// A singleton is required but no object in the scene holds one.
    #[error("an instance of {component} is needed in the scene, but there is none")]
    Missing {
        /// Type name of the singleton component.
        component: &'static str,
    },

    /// More than one object in the scene holds the singleton component.
    #[error("there is more than one instance of {component} in the scene ({count} found)")]
    Duplicate {
        /// Type name of the singleton component.
        component: &'static str,
        /// Number of holders found.
        count: usize,
    },
}
