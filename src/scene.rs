use crate::SceneError;
use core::{any::Any, fmt};
use generational_arena::{Arena, Index};
use glam::{Affine3A, Quat, Vec3};

/// A handle to an object living in a [`Scene`].
///
/// Handles are generational: once an object is destroyed its handle never
/// resolves again, even if the slot is reused by a newer object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(Index);

/// A typed capability attached to an object.
///
/// Every `'static` type that is `Clone + Debug` is a component. Cloning is
/// required so that whole object subtrees can be duplicated by
/// [`Scene::instantiate`].
pub trait Component: Any + fmt::Debug {
    /// Clones this component into a new box.
    fn clone_component(&self) -> Box<dyn Component>;

    /// Upcasts to [`Any`] for downcasting to the concrete type.
    fn as_any(&self) -> &dyn Any;

    /// Upcasts to [`Any`] for downcasting to the concrete type.
    fn as_any_mut(&mut self) -> &mut dyn Any;

    /// Upcasts the box to [`Any`] for taking the concrete value back out.
    fn into_any(self: Box<Self>) -> Box<dyn Any>;
}

impl<T: Any + Clone + fmt::Debug> Component for T {
    fn clone_component(&self) -> Box<dyn Component> {
        Box::new(self.clone())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any> {
        self
    }
}

/// Translation, rotation and scale of an object relative to its parent.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Transform {
    /// Position relative to the parent.
    pub translation: Vec3,
    /// Rotation relative to the parent.
    pub rotation: Quat,
    /// Scale relative to the parent.
    pub scale: Vec3,
}

impl Transform {
    /// The transform that leaves everything where it is.
    pub const IDENTITY: Self = Self {
        translation: Vec3::ZERO,
        rotation: Quat::IDENTITY,
        scale: Vec3::ONE,
    };

    /// An identity transform moved to `translation`.
    pub fn from_translation(translation: Vec3) -> Self {
        Self {
            translation,
            ..Self::IDENTITY
        }
    }

    /// The affine matrix mapping local space into the parent's space.
    pub fn to_affine(&self) -> Affine3A {
        Affine3A::from_scale_rotation_translation(self.scale, self.rotation, self.translation)
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

#[derive(Debug)]
pub(crate) struct Node {
    pub(crate) name: String,
    pub(crate) active: bool,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
    pub(crate) transform: Transform,
    pub(crate) components: Vec<Box<dyn Component>>,
}

impl Node {
    fn new(name: String, parent: Option<NodeId>) -> Self {
        Node {
            name,
            active: true,
            parent,
            children: Vec::new(),
            transform: Transform::IDENTITY,
            components: Vec::new(),
        }
    }
}

/// A tree of named objects carrying transforms and components.
///
/// The scene is single-threaded and owns every object. Objects are addressed
/// through [`NodeId`] handles and may be activated, deactivated, reparented,
/// duplicated and destroyed. Objects without a parent are roots; their order
/// is the order in which they were created or detached.
#[derive(Debug, Default)]
pub struct Scene {
    nodes: Arena<Node>,
    roots: Vec<NodeId>,
}

impl Scene {
    /// Creates an empty scene.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live objects.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns `true` if the scene holds no objects.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub(crate) fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    fn node_mut(&mut self, id: NodeId) -> Result<&mut Node, SceneError> {
        self.nodes.get_mut(id.0).ok_or(SceneError::MissingObject(id))
    }

    /// Returns `true` if `id` refers to a live object.
    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains(id.0)
    }

    /// Creates a new active root object at the origin.
    pub fn create_object(&mut self, name: impl Into<String>) -> NodeId {
        let id = NodeId(self.nodes.insert(Node::new(name.into(), None)));
        self.roots.push(id);
        id
    }

    /// Creates a new active object as the last child of `parent`.
    pub fn create_child(
        &mut self,
        parent: NodeId,
        name: impl Into<String>,
    ) -> Result<NodeId, SceneError> {
        if !self.contains(parent) {
            return Err(SceneError::MissingObject(parent));
        }
        let id = NodeId(self.nodes.insert(Node::new(name.into(), Some(parent))));
        self.node_mut(parent)?.children.push(id);
        Ok(id)
    }

    /// Moves `child` under `parent`, or to the scene root when `parent` is
    /// `None`. The local transform is kept as is.
    pub fn set_parent(&mut self, child: NodeId, parent: Option<NodeId>) -> Result<(), SceneError> {
        if !self.contains(child) {
            return Err(SceneError::MissingObject(child));
        }
        if let Some(parent) = parent {
            if !self.contains(parent) {
                return Err(SceneError::MissingObject(parent));
            }
            let mut cursor = Some(parent);
            while let Some(ancestor) = cursor {
                if ancestor == child {
                    return Err(SceneError::CyclicParent { child, parent });
                }
                cursor = self.parent(ancestor);
            }
        }

        self.detach(child);
        match parent {
            Some(parent) => self.node_mut(parent)?.children.push(child),
            None => self.roots.push(child),
        }
        self.node_mut(child)?.parent = parent;
        Ok(())
    }

    fn detach(&mut self, id: NodeId) {
        let parent = self.parent(id);
        let siblings = match parent.and_then(|parent| self.nodes.get_mut(parent.0)) {
            Some(node) => &mut node.children,
            None => &mut self.roots,
        };
        siblings.retain(|&sibling| sibling != id);
    }

    /// Destroys `id` together with all of its descendants.
    pub fn destroy(&mut self, id: NodeId) -> Result<(), SceneError> {
        if !self.contains(id) {
            return Err(SceneError::MissingObject(id));
        }
        self.detach(id);

        let mut pending = vec![id];
        while let Some(next) = pending.pop() {
            if let Some(node) = self.nodes.remove(next.0) {
                pending.extend(node.children);
            }
        }
        Ok(())
    }

    /// Name of the object.
    pub fn name(&self, id: NodeId) -> Option<&str> {
        self.node(id).map(|node| node.name.as_str())
    }

    /// Renames the object.
    pub fn set_name(&mut self, id: NodeId, name: impl Into<String>) -> Result<(), SceneError> {
        self.node_mut(id)?.name = name.into();
        Ok(())
    }

    /// Parent of the object, `None` for roots and stale handles.
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).and_then(|node| node.parent)
    }

    /// Children of the object in order. Empty for stale handles.
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.node(id).map_or(&[], |node| node.children.as_slice())
    }

    /// Objects without a parent, in order.
    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    /// Sets the object's own active flag.
    pub fn set_active(&mut self, id: NodeId, active: bool) -> Result<(), SceneError> {
        self.node_mut(id)?.active = active;
        Ok(())
    }

    /// The object's own active flag, ignoring its ancestors. `false` for
    /// stale handles.
    pub fn active_self(&self, id: NodeId) -> bool {
        self.node(id).map_or(false, |node| node.active)
    }

    /// `true` if the object and all of its ancestors are active.
    pub fn active_in_hierarchy(&self, id: NodeId) -> bool {
        let mut cursor = Some(id);
        while let Some(current) = cursor {
            match self.node(current) {
                Some(node) if node.active => cursor = node.parent,
                _ => return false,
            }
        }
        true
    }

    /// Attaches `component` to the object and returns a reference to it.
    pub fn add_component<T: Component>(
        &mut self,
        id: NodeId,
        component: T,
    ) -> Result<&mut T, SceneError> {
        let components = &mut self.node_mut(id)?.components;
        components.push(Box::new(component));
        let added = components
            .last_mut()
            .and_then(|last| last.as_mut().as_any_mut().downcast_mut::<T>());
        added.ok_or(SceneError::MissingObject(id))
    }

    /// The first component of type `T` on the object itself.
    pub fn get<T: Component>(&self, id: NodeId) -> Option<&T> {
        self.components::<T>(id).next()
    }

    /// The first component of type `T` on the object itself.
    pub fn get_mut<T: Component>(&mut self, id: NodeId) -> Option<&mut T> {
        self.nodes
            .get_mut(id.0)?
            .components
            .iter_mut()
            .find_map(|component| component.as_mut().as_any_mut().downcast_mut::<T>())
    }

    /// Every component of type `T` on the object itself, in attach order.
    pub fn components<T: Component>(&self, id: NodeId) -> impl Iterator<Item = &T> + '_ {
        self.node(id)
            .into_iter()
            .flat_map(|node| node.components.iter())
            .filter_map(|component| component.as_ref().as_any().downcast_ref::<T>())
    }

    /// Returns `true` if the object itself has a component of type `T`.
    pub fn has<T: Component>(&self, id: NodeId) -> bool {
        self.get::<T>(id).is_some()
    }

    /// Detaches and returns the first component of type `T`.
    pub fn remove_component<T: Component>(&mut self, id: NodeId) -> Option<T> {
        let components = &mut self.nodes.get_mut(id.0)?.components;
        let index = components
            .iter()
            .position(|component| component.as_ref().as_any().is::<T>())?;
        components
            .remove(index)
            .into_any()
            .downcast::<T>()
            .ok()
            .map(|component| *component)
    }

    /// Duplicates `template` and all of its descendants.
    ///
    /// The copy is placed at the scene root with the template's world
    /// position and rotation. Names, active flags and components are copied;
    /// the copy's root is renamed to `name`.
    pub fn instantiate(
        &mut self,
        template: NodeId,
        name: impl Into<String>,
    ) -> Result<NodeId, SceneError> {
        let position = self
            .position(template)
            .ok_or(SceneError::MissingObject(template))?;
        let rotation = self
            .rotation(template)
            .ok_or(SceneError::MissingObject(template))?;

        let copy = self.clone_subtree(template, None)?;
        self.roots.push(copy);

        let node = self.node_mut(copy)?;
        node.name = name.into();
        node.transform.translation = position;
        node.transform.rotation = rotation;
        Ok(copy)
    }

    fn clone_subtree(&mut self, source: NodeId, parent: Option<NodeId>) -> Result<NodeId, SceneError> {
        let node = self.node(source).ok_or(SceneError::MissingObject(source))?;
        let copy = Node {
            name: node.name.clone(),
            active: node.active,
            parent,
            children: Vec::with_capacity(node.children.len()),
            transform: node.transform,
            components: node
                .components
                .iter()
                .map(|component| component.as_ref().clone_component())
                .collect(),
        };
        let children = node.children.clone();

        let id = NodeId(self.nodes.insert(copy));
        for child in children {
            let child_copy = self.clone_subtree(child, Some(id))?;
            self.node_mut(id)?.children.push(child_copy);
        }
        Ok(id)
    }

    /// The object's transform relative to its parent.
    pub fn transform(&self, id: NodeId) -> Option<&Transform> {
        self.node(id).map(|node| &node.transform)
    }

    /// The object's transform relative to its parent.
    pub fn transform_mut(&mut self, id: NodeId) -> Option<&mut Transform> {
        self.nodes.get_mut(id.0).map(|node| &mut node.transform)
    }

    /// Maps the object's local space into world space.
    pub fn world_affine(&self, id: NodeId) -> Option<Affine3A> {
        let node = self.node(id)?;
        let local = node.transform.to_affine();
        match node.parent {
            Some(parent) => Some(self.world_affine(parent)? * local),
            None => Some(local),
        }
    }

    /// World-space position of the object.
    pub fn position(&self, id: NodeId) -> Option<Vec3> {
        self.world_affine(id)
            .map(|affine| affine.transform_point3(Vec3::ZERO))
    }

    /// Moves the object to the world-space `position`.
    pub fn set_position(&mut self, id: NodeId, position: Vec3) -> Result<(), SceneError> {
        let local = match self.parent(id) {
            Some(parent) => self
                .world_affine(parent)
                .ok_or(SceneError::MissingObject(parent))?
                .inverse()
                .transform_point3(position),
            None => position,
        };
        self.node_mut(id)?.transform.translation = local;
        Ok(())
    }

    /// Replaces the world-space position with `f(position)`.
    ///
    /// ```
    /// # use gamecore::{Scene, VectorExt};
    /// # use glam::Vec3;
    /// let mut scene = Scene::new();
    /// let rocket = scene.create_object("rocket");
    /// scene.map_position(rocket, |pos| pos.map_y(|y| y + 2.0)).unwrap();
    /// assert_eq!(scene.position(rocket), Some(Vec3::new(0.0, 2.0, 0.0)));
    /// ```
    pub fn map_position(
        &mut self,
        id: NodeId,
        f: impl FnOnce(Vec3) -> Vec3,
    ) -> Result<(), SceneError> {
        let position = self.position(id).ok_or(SceneError::MissingObject(id))?;
        self.set_position(id, f(position))
    }

    /// World-space rotation of the object.
    pub fn rotation(&self, id: NodeId) -> Option<Quat> {
        let node = self.node(id)?;
        match node.parent {
            Some(parent) => Some(self.rotation(parent)? * node.transform.rotation),
            None => Some(node.transform.rotation),
        }
    }

    /// Sets the world-space rotation of the object.
    pub fn set_rotation(&mut self, id: NodeId, rotation: Quat) -> Result<(), SceneError> {
        let local = match self.parent(id) {
            Some(parent) => {
                let parent_rotation = self
                    .rotation(parent)
                    .ok_or(SceneError::MissingObject(parent))?;
                parent_rotation.inverse() * rotation
            }
            None => rotation,
        };
        self.node_mut(id)?.transform.rotation = local;
        Ok(())
    }
}
