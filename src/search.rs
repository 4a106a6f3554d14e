use crate::{Component, NodeId, Scene, SceneError};
use core::{any::type_name, slice};

/// Where to look for a component, starting from a given object.
///
/// Every scope includes the starting object itself. When searching
/// [`Search::InWholeHierarchy`], parents are searched first since the chain
/// of parents can be walked linearly, while searching children is a
/// depth-first walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Search {
    /// Only the object itself.
    #[default]
    InObjectOnly,
    /// The object, then all descendants in depth-first pre-order.
    InChildren,
    /// The object, then its ancestors up to the scene root.
    InParents,
    /// The object, then the other children of its parent (or the other
    /// roots).
    InSiblings,
    /// The object and its ancestors, then its descendants.
    InWholeHierarchy,
}

/// Iterator over the objects in a [`Search`] scope, in search order.
///
/// Created by [`Scene::walk`].
#[derive(Debug)]
pub struct Walk<'a> {
    scene: &'a Scene,
    first: Option<NodeId>,
    up: Option<NodeId>,
    across: Option<(NodeId, slice::Iter<'a, NodeId>)>,
    down: Vec<NodeId>,
}

impl<'a> Walk<'a> {
    fn new(scene: &'a Scene, start: NodeId, scope: Search) -> Self {
        let mut walk = Walk {
            scene,
            first: None,
            up: None,
            across: None,
            down: Vec::new(),
        };
        if !scene.contains(start) {
            return walk;
        }

        match scope {
            Search::InObjectOnly => walk.first = Some(start),
            Search::InChildren => walk.down.push(start),
            Search::InParents => walk.up = Some(start),
            Search::InSiblings => {
                let siblings = match scene.parent(start) {
                    Some(parent) => scene.children(parent),
                    None => scene.roots(),
                };
                walk.first = Some(start);
                walk.across = Some((start, siblings.iter()));
            }
            Search::InWholeHierarchy => {
                walk.up = Some(start);
                walk.down.extend(scene.children(start).iter().rev());
            }
        }
        walk
    }
}

impl<'a> Iterator for Walk<'a> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        if let Some(first) = self.first.take() {
            return Some(first);
        }

        if let Some(current) = self.up {
            self.up = self.scene.parent(current);
            return Some(current);
        }

        if let Some((start, siblings)) = &mut self.across {
            let start = *start;
            if let Some(&sibling) = siblings.find(|&&sibling| sibling != start) {
                return Some(sibling);
            }
            self.across = None;
        }

        let current = self.down.pop()?;
        self.down
            .extend(self.scene.children(current).iter().rev());
        Some(current)
    }
}

impl Scene {
    /// Walks the objects in `scope` starting at `start`, in search order.
    ///
    /// Yields nothing if `start` is not a live object.
    pub fn walk(&self, start: NodeId, scope: Search) -> Walk<'_> {
        Walk::new(self, start, scope)
    }

    /// Returns `true` if any object in the scope has a component of type `T`.
    pub fn is<T: Component>(&self, start: NodeId, scope: Search) -> bool {
        self.find::<T>(start, scope).is_some()
    }

    /// The first object in the scope that holds a component of type `T`.
    pub fn find<T: Component>(&self, start: NodeId, scope: Search) -> Option<NodeId> {
        self.walk(start, scope).find(|&id| self.has::<T>(id))
    }

    /// The first component of type `T` found in the scope.
    pub fn find_component<T: Component>(&self, start: NodeId, scope: Search) -> Option<&T> {
        self.walk(start, scope).find_map(|id| self.get::<T>(id))
    }

    /// The first component of type `T` found in the scope.
    pub fn find_component_mut<T: Component>(
        &mut self,
        start: NodeId,
        scope: Search,
    ) -> Option<&mut T> {
        let holder = self.find::<T>(start, scope)?;
        self.get_mut::<T>(holder)
    }

    /// Every component of type `T` found in the scope, in search order.
    /// Might be empty.
    pub fn all<T: Component>(&self, start: NodeId, scope: Search) -> impl Iterator<Item = &T> + '_ {
        self.walk(start, scope)
            .flat_map(move |id| self.components::<T>(id))
    }

    /// Like [`Self::find`], but fails with
    /// [`SceneError::ComponentNotFound`] when nothing in the scope holds a
    /// `T`.
    pub fn assign_component<T: Component>(
        &self,
        start: NodeId,
        scope: Search,
    ) -> Result<NodeId, SceneError> {
        if !self.contains(start) {
            return Err(SceneError::MissingObject(start));
        }
        self.find::<T>(start, scope)
            .ok_or_else(|| SceneError::ComponentNotFound {
                component: type_name::<T>(),
                object: self.name(start).unwrap_or_default().to_owned(),
            })
    }

    /// Fills `slot` with the holder of the first `T` in the scope, unless it
    /// already holds a value.
    ///
    /// Returns `Ok(true)` if a new value was assigned and `Ok(false)` if the
    /// slot was already filled.
    pub fn assign_if_absent<T: Component>(
        &self,
        slot: &mut Option<NodeId>,
        start: NodeId,
        scope: Search,
    ) -> Result<bool, SceneError> {
        if let Some(existing) = slot {
            log::info!(
                "tried to assign component of type {} from {:?}, but the slot already holds {:?}",
                type_name::<T>(),
                self.name(start),
                existing
            );
            return Ok(false);
        }
        *slot = Some(self.assign_component::<T>(start, scope)?);
        Ok(true)
    }

    /// Every object in the scene holding a component of type `T`, walking
    /// the roots in order and each root's subtree in depth-first pre-order.
    pub fn find_objects_of_type<T: Component>(&self) -> Vec<NodeId> {
        self.roots()
            .iter()
            .flat_map(|&root| self.walk(root, Search::InChildren))
            .filter(|&id| self.has::<T>(id))
            .collect()
    }
}
