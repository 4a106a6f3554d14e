use crate::{Component, NodeId, PoolError, PoolHost, Reusable, Scene, SceneError, Search};
use core::{any::type_name, fmt, marker::PhantomData};
use glam::{Quat, Vec3};

/// Settings read by [`GenericPool::new`].
///
/// Out of range values are clamped when the pool is created: a negative
/// capacity becomes zero, the grow rate is clamped to `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct PoolConfig {
    /// Number of items the pool fills up to. A capacity too large to
    /// reserve memory for makes [`GenericPool::init`] fail with
    /// [`PoolError::CapacityOverflow`].
    pub capacity: i64,
    /// Fraction by which the capacity grows when no item is available.
    /// Zero makes an exhausted pool fail instead of growing.
    pub grow_rate: f32,
    /// Whether [`GenericPool::start`] fills the pool right away.
    pub init_on_start: bool,
}

impl PoolConfig {
    /// Sets the initial capacity.
    pub fn with_capacity(mut self, capacity: i64) -> Self {
        self.capacity = capacity;
        self
    }

    /// Sets the grow rate.
    pub fn with_grow_rate(mut self, grow_rate: f32) -> Self {
        self.grow_rate = grow_rate;
        self
    }

    /// Sets whether the pool is filled on start.
    pub fn with_init_on_start(mut self, init_on_start: bool) -> Self {
        self.init_on_start = init_on_start;
        self
    }
}

impl Default for PoolConfig {
    fn default() -> Self {
        PoolConfig {
            capacity: 0,
            grow_rate: 0.3,
            init_on_start: false,
        }
    }
}

fn clamp_grow_rate(grow_rate: f32) -> f32 {
    if grow_rate.is_nan() {
        0.0
    } else {
        grow_rate.clamp(0.0, 1.0)
    }
}

/// A pool of pre-instantiated copies of a single template object.
///
/// This is useful when a large amount of short-lived objects is needed, such
/// as physically simulated bullets. Instead of creating a bullet every time
/// one is fired, which might cause a stall, the pool clones a number of
/// bullets up front and hands out already fired bullets again.
///
/// The template must carry a component implementing [`Reusable`]. Owners
/// call [`Reusable::free_for_reuse`] once an item may be handed out again.
/// When acquiring an item, inactive items are preferred over items that are
/// still active: fired bullets may stay on the ground and only be despawned
/// and reused on demand.
///
/// A pool is lazy. No item is cloned until [`Self::init`] is called, or the
/// first item is requested.
///
/// When no item is available, the pool calls [`Reusable::reuse_requested`]
/// on every item until one frees itself. If none does, the capacity grows by
/// the configured grow rate, or [`PoolError::OutOfItems`] is returned when
/// the grow rate is zero. A grown pool is not filled immediately: items are
/// cloned when they are needed right away, or else one per call to
/// [`Self::update`] until the capacity is reached.
pub struct GenericPool<R, K = NodeId> {
    template: Option<K>,
    capacity: usize,
    grow_rate: f32,
    init_on_start: bool,
    buffer: Vec<K>,
    last_index: usize,
    added: usize,
    initialized: bool,
    _phantom: PhantomData<fn() -> R>,
}

impl<R, K: fmt::Debug> fmt::Debug for GenericPool<R, K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GenericPool")
            .field("item", &type_name::<R>())
            .field("template", &self.template)
            .field("capacity", &self.capacity)
            .field("grow_rate", &self.grow_rate)
            .field("len", &self.buffer.len())
            .field("initialized", &self.initialized)
            .finish()
    }
}

impl<R, K> GenericPool<R, K> {
    /// Creates an empty pool without a template.
    pub fn new(config: PoolConfig) -> Self {
        GenericPool {
            template: None,
            capacity: usize::try_from(config.capacity.max(0)).unwrap_or(usize::MAX),
            grow_rate: clamp_grow_rate(config.grow_rate),
            init_on_start: config.init_on_start,
            buffer: Vec::new(),
            last_index: 0,
            added: 0,
            initialized: false,
            _phantom: PhantomData,
        }
    }

    /// Sets the object cloned by this pool, without validating it.
    pub fn with_template(mut self, template: K) -> Self {
        self.template = Some(template);
        self
    }

    /// The object cloned by this pool.
    pub fn template(&self) -> Option<&K> {
        self.template.as_ref()
    }

    /// Number of items the pool fills up to. Only ever grows.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of items cloned so far.
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    /// Returns `true` if no item has been cloned yet.
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Every item managed by this pool, in scan order.
    pub fn items(&self) -> &[K] {
        &self.buffer
    }

    /// Fraction by which the capacity grows when exhausted.
    pub fn grow_rate(&self) -> f32 {
        self.grow_rate
    }

    /// Changes the grow rate, clamped to `[0, 1]`.
    pub fn set_grow_rate(&mut self, grow_rate: f32) {
        self.grow_rate = clamp_grow_rate(grow_rate);
    }

    /// Whether [`Self::init`] has completed.
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }
}

impl<R: Reusable + Component> GenericPool<R, NodeId> {
    /// Sets the template to the first object at or below `object` that
    /// holds an `R`.
    pub fn set_template(&mut self, scene: &Scene, object: NodeId) -> Result<(), SceneError> {
        let holder = scene
            .find::<R>(object, Search::InChildren)
            .ok_or_else(|| SceneError::ComponentNotFound {
                component: type_name::<R>(),
                object: scene.name(object).unwrap_or_default().to_owned(),
            })?;
        self.template = Some(holder);
        Ok(())
    }
}

impl<R: Reusable, K: Copy + Eq + fmt::Debug> GenericPool<R, K> {
    /// Initializes the pool if it was configured to do so on start.
    pub fn start<H>(&mut self, host: &mut H) -> Result<(), PoolError>
    where
        H: PoolHost<R, Handle = K>,
    {
        if self.init_on_start {
            self.init(host)?;
        }
        Ok(())
    }

    /// Clones the template until the pool holds `capacity` inactive items.
    ///
    /// Calling this more than once has no further effect.
    pub fn init<H>(&mut self, host: &mut H) -> Result<(), PoolError>
    where
        H: PoolHost<R, Handle = K>,
    {
        if self.initialized {
            return Ok(());
        }
        if self.template.is_none() {
            return Err(PoolError::NoTemplate);
        }

        self.reserve(self.capacity.saturating_sub(self.buffer.len()))?;
        while self.buffer.len() < self.capacity {
            self.add_item(host)?;
        }
        self.initialized = true;
        Ok(())
    }

    /// Clones one more item while the pool is below its capacity.
    ///
    /// Call this once per frame so that a grown pool refills gradually.
    pub fn update<H>(&mut self, host: &mut H) -> Result<(), PoolError>
    where
        H: PoolHost<R, Handle = K>,
    {
        if !self.initialized {
            return Ok(());
        }
        self.prune(host);
        if self.buffer.len() < self.capacity {
            let item = self.add_item(host)?;
            log::debug!(
                "refilled pool item {:?} ({}/{})",
                item,
                self.buffer.len(),
                self.capacity
            );
        }
        Ok(())
    }

    /// Hands out an active item at the origin with no rotation.
    pub fn request_item<H>(&mut self, host: &mut H) -> Result<K, PoolError>
    where
        H: PoolHost<R, Handle = K>,
    {
        self.request_item_with(host, Vec3::ZERO, Quat::IDENTITY)
    }

    /// Hands out an active item at `position` with no rotation.
    pub fn request_item_at<H>(&mut self, host: &mut H, position: Vec3) -> Result<K, PoolError>
    where
        H: PoolHost<R, Handle = K>,
    {
        self.request_item_with(host, position, Quat::IDENTITY)
    }

    /// Hands out an active item at `position` with `rotation`.
    ///
    /// Items are scanned round-robin, starting just after the item returned
    /// last. An inactive reusable item is preferred, then any reusable item,
    /// then the first item that frees itself when asked. Failing that, the
    /// pool grows by one item.
    pub fn request_item_with<H>(
        &mut self,
        host: &mut H,
        position: Vec3,
        rotation: Quat,
    ) -> Result<K, PoolError>
    where
        H: PoolHost<R, Handle = K>,
    {
        if !self.initialized {
            log::warn!(
                "pool of {} initialized on the first request, this might have caused a stall; \
                 call init() up front or enable init_on_start",
                type_name::<R>()
            );
            self.init(host)?;
        }
        self.prune(host);

        let found = self
            .scan(host, |item, active| item.can_be_reused() && !active)
            .or_else(|| self.scan(host, |item, _| item.can_be_reused()))
            .or_else(|| self.request_reuse(host));
        if let Some(index) = found {
            self.last_index = index;
            return Self::reuse(host, self.buffer[index], position, rotation);
        }

        if self.grow_rate.abs() < f32::EPSILON {
            return Err(PoolError::OutOfItems {
                capacity: self.capacity,
            });
        }

        if self.capacity == self.buffer.len() {
            let original = self.capacity;
            let growth = ((self.capacity as f32 * self.grow_rate) as usize).max(1);
            self.capacity = self.capacity.saturating_add(growth);
            self.reserve(growth)?;
            log::warn!(
                "requesting a {} with capacity {} failed, no more items available; \
                 increasing capacity to {}",
                type_name::<R>(),
                original,
                self.capacity
            );
        }

        let item = self.add_item(host)?;
        Self::reuse(host, item, position, rotation)
    }

    fn reserve(&mut self, additional: usize) -> Result<(), PoolError> {
        self.buffer
            .try_reserve(additional)
            .map_err(|_| PoolError::CapacityOverflow {
                capacity: self.capacity,
            })
    }

    fn scan_order(&self) -> impl Iterator<Item = usize> {
        let len = self.buffer.len();
        let start = self.last_index + 1;
        (0..len).map(move |i| (i + start) % len)
    }

    fn scan<H>(&self, host: &H, accept: impl Fn(&R, bool) -> bool) -> Option<usize>
    where
        H: PoolHost<R, Handle = K>,
    {
        self.scan_order().find(|&index| {
            let item = self.buffer[index];
            host.reusable(item)
                .map_or(false, |reusable| accept(reusable, host.is_active(item)))
        })
    }

    fn request_reuse<H>(&self, host: &mut H) -> Option<usize>
    where
        H: PoolHost<R, Handle = K>,
    {
        self.scan_order().find(|&index| match host.reusable_mut(self.buffer[index]) {
            Some(reusable) => {
                reusable.reuse_requested();
                reusable.can_be_reused()
            }
            None => false,
        })
    }

    fn reuse<H>(host: &mut H, item: K, position: Vec3, rotation: Quat) -> Result<K, PoolError>
    where
        H: PoolHost<R, Handle = K>,
    {
        if let Some(reusable) = host.reusable_mut(item) {
            reusable.reset_for_reuse();
            reusable.lock_for_reuse();
        }
        host.place(item, position, rotation)?;
        host.set_active(item, true)?;
        if let Some(reusable) = host.reusable_mut(item) {
            reusable.after_reuse();
        }
        Ok(item)
    }

    fn add_item<H>(&mut self, host: &mut H) -> Result<K, PoolError>
    where
        H: PoolHost<R, Handle = K>,
    {
        let template = self.template.ok_or(PoolError::NoTemplate)?;
        if !host.is_live(template) {
            return Err(PoolError::NoTemplate);
        }
        let name = format!(
            "{} (Pool Item #{})",
            host.name(template).unwrap_or_default(),
            self.added + 1
        );
        let item = host
            .instantiate(template, name)
            .ok_or(PoolError::NoTemplate)?;
        self.added += 1;

        if let Some(reusable) = host.reusable(item) {
            reusable.free_for_reuse();
        }
        self.buffer.push(item);
        host.set_active(item, false)?;
        log::debug!("cloned pool item {:?} from template {:?}", item, template);
        Ok(item)
    }

    fn prune<H>(&mut self, host: &H)
    where
        H: PoolHost<R, Handle = K>,
    {
        let before = self.buffer.len();
        let last_index = self.last_index;
        let mut index = 0;
        let mut shift = 0;
        self.buffer.retain(|&item| {
            let live = host.is_live(item);
            if !live && index <= last_index {
                shift += 1;
            }
            index += 1;
            live
        });
        let removed = before - self.buffer.len();
        if removed > 0 {
            // the next scan still starts right after the last returned item
            self.last_index = match last_index.checked_sub(shift) {
                Some(last_index) => last_index,
                None => self.buffer.len().saturating_sub(1),
            };
            log::warn!(
                "{} pool items of type {} were destroyed outside of the pool",
                removed,
                type_name::<R>()
            );
        }
    }
}
