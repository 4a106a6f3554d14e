use crate::{Component, NodeId, Scene, SingletonError};
use core::any::{type_name, TypeId};
use hashbrown::HashMap;

/// Caches the one object per scene that holds a given component type.
///
/// Lookups scan the scene the first time and remember the holder
/// afterwards. A cached holder is checked again on every lookup, so
/// destroying it or removing its component makes the next lookup scan
/// again. The cache lives as long as the registry; drop it or call
/// [`Self::clear`] together with the scene it refers to.
#[derive(Debug, Default)]
pub struct Singletons {
    instances: HashMap<TypeId, NodeId>,
}

impl Singletons {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    fn cached<T: Component>(&self, scene: &Scene) -> Option<NodeId> {
        self.instances
            .get(&TypeId::of::<T>())
            .copied()
            .filter(|&holder| scene.has::<T>(holder))
    }

    /// The object holding the only `T` in the scene.
    ///
    /// Fails if no object or more than one object holds a `T`.
    pub fn instance<T: Component>(&mut self, scene: &Scene) -> Result<NodeId, SingletonError> {
        if let Some(holder) = self.cached::<T>(scene) {
            return Ok(holder);
        }

        match scene.find_objects_of_type::<T>().as_slice() {
            [] => Err(SingletonError::Missing {
                component: type_name::<T>(),
            }),
            [holder] => {
                self.instances.insert(TypeId::of::<T>(), *holder);
                Ok(*holder)
            }
            many => Err(SingletonError::Duplicate {
                component: type_name::<T>(),
                count: many.len(),
            }),
        }
    }

    /// Like [`Self::instance`], but creates a new root object holding a
    /// default `T` when the scene has none.
    pub fn lazy_instance<T: Component + Default>(
        &mut self,
        scene: &mut Scene,
    ) -> Result<NodeId, SingletonError> {
        match self.instance::<T>(scene) {
            Err(SingletonError::Missing { .. }) => {
                let name = format!("{} - Lazy Singleton", short_type_name::<T>());
                let holder = scene.create_object(name);
                scene
                    .add_component(holder, T::default())
                    .map_err(|_| SingletonError::Missing {
                        component: type_name::<T>(),
                    })?;
                log::info!("creating new instance of lazy singleton {}", type_name::<T>());
                self.instances.insert(TypeId::of::<T>(), holder);
                Ok(holder)
            }
            other => other,
        }
    }

    /// Drops the cached holder of `T`, if any.
    pub fn forget<T: Component>(&mut self) -> Option<NodeId> {
        self.instances.remove(&TypeId::of::<T>())
    }

    /// Drops every cached holder.
    pub fn clear(&mut self) {
        self.instances.clear();
    }
}

fn short_type_name<T>() -> &'static str {
    let full = type_name::<T>();
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}
