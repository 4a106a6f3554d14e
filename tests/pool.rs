use gamecore::*;
use glam::{Quat, Vec3};
use std::{cell::RefCell, rc::Rc};

#[derive(Debug, Clone, Default)]
struct Counter {
    times_reused: u32,
    times_after_reuse: u32,
    times_reuse_requested: u32,
    accept_requests: bool,
    flag: ReuseFlag,
}

impl Reusable for Counter {
    fn reset_for_reuse(&mut self) {
        self.times_reused += 1;
    }

    fn after_reuse(&mut self) {
        self.times_after_reuse += 1;
    }

    fn reuse_requested(&mut self) {
        self.times_reuse_requested += 1;
        if self.accept_requests {
            self.free_for_reuse();
        }
    }

    fn reuse_flag(&self) -> &ReuseFlag {
        &self.flag
    }
}

fn new_pool(scene: &mut Scene, capacity: i64, template: Counter) -> GenericPool<Counter> {
    let object = scene.create_object("Template Object");
    scene.add_component(object, template).unwrap();
    GenericPool::new(
        PoolConfig::default()
            .with_capacity(capacity)
            .with_grow_rate(1.0),
    )
    .with_template(object)
}

fn counter(scene: &Scene, item: NodeId) -> &Counter {
    scene.get::<Counter>(item).unwrap()
}

#[test]
fn test_init() {
    let mut scene = Scene::new();
    let mut pool: GenericPool<Counter> =
        GenericPool::new(PoolConfig::default().with_capacity(-1));
    assert_eq!(pool.init(&mut scene), Err(PoolError::NoTemplate));
    assert!(!pool.is_initialized());

    let template = scene.create_object("Template Object");
    scene.add_component(template, Counter::default()).unwrap();
    pool.set_template(&scene, template).unwrap();
    assert_eq!(pool.init(&mut scene), Ok(()));
    assert_eq!(pool.capacity(), 0);
    assert!(pool.is_initialized());
}

#[test]
fn test_init_fills_inactive_items() {
    let mut scene = Scene::new();
    let mut pool = new_pool(&mut scene, 3, Counter::default());
    pool.init(&mut scene).unwrap();
    pool.init(&mut scene).unwrap();

    assert_eq!(pool.len(), 3);
    for (i, &item) in pool.items().iter().enumerate() {
        assert!(!scene.active_self(item));
        assert!(counter(&scene, item).can_be_reused());
        assert_eq!(
            scene.name(item),
            Some(format!("Template Object (Pool Item #{})", i + 1).as_str())
        );
    }
}

#[test]
fn test_grow_rate_is_clamped() {
    let pool: GenericPool<Counter> =
        GenericPool::new(PoolConfig::default().with_grow_rate(4.0));
    assert_eq!(pool.grow_rate(), 1.0);

    let mut pool: GenericPool<Counter> =
        GenericPool::new(PoolConfig::default().with_grow_rate(-1.0));
    assert_eq!(pool.grow_rate(), 0.0);
    pool.set_grow_rate(0.5);
    assert_eq!(pool.grow_rate(), 0.5);
}

#[test]
fn test_proper_reuse() {
    let mut scene = Scene::new();
    let mut pool = new_pool(&mut scene, 1, Counter::default());
    pool.init(&mut scene).unwrap();

    // reuse instead of growing
    let fst = pool.request_item(&mut scene).unwrap();
    assert!(scene.active_self(fst));
    assert_eq!(counter(&scene, fst).times_reused, 1);
    assert_eq!(counter(&scene, fst).times_after_reuse, 1);
    assert_eq!(counter(&scene, fst).times_reuse_requested, 0);
    counter(&scene, fst).free_for_reuse();

    let snd = pool.request_item(&mut scene).unwrap();
    assert_eq!(fst, snd);
    assert_eq!(counter(&scene, snd).times_reused, 2);
    assert_eq!(counter(&scene, snd).times_after_reuse, 2);
    assert_eq!(counter(&scene, snd).times_reuse_requested, 0);

    // but only when the item is marked as reusable
    let trd = pool.request_item(&mut scene).unwrap();
    assert_ne!(trd, snd);
    assert_eq!(counter(&scene, trd).times_reused, 1);
    assert_eq!(counter(&scene, trd).times_after_reuse, 1);
    assert_eq!(counter(&scene, fst).times_reuse_requested, 1);
    assert_eq!(pool.capacity(), 2);

    // inactive items are preferred
    counter(&scene, snd).free_for_reuse();
    counter(&scene, trd).free_for_reuse();
    scene.set_active(trd, false).unwrap();
    let fth = pool.request_item(&mut scene).unwrap();
    assert_eq!(pool.capacity(), 2);
    assert_eq!(fth, trd);
}

#[test]
fn test_inactive_preferred_over_round_robin() {
    let mut scene = Scene::new();
    let mut pool = new_pool(&mut scene, 2, Counter::default());
    pool.init(&mut scene).unwrap();

    let a = pool.request_item(&mut scene).unwrap();
    let b = pool.request_item(&mut scene).unwrap();
    assert_ne!(a, b);

    // `a` comes next in round-robin order, but is still active
    counter(&scene, a).free_for_reuse();
    counter(&scene, b).free_for_reuse();
    scene.set_active(b, false).unwrap();
    assert_eq!(pool.request_item(&mut scene).unwrap(), b);

    // with nothing inactive, any reusable item is taken
    assert_eq!(pool.request_item(&mut scene).unwrap(), a);
    assert!(scene.active_self(a));
}

#[test]
fn test_freed_item_is_selected_next() {
    let mut scene = Scene::new();
    let mut pool = new_pool(&mut scene, 3, Counter::default());
    pool.init(&mut scene).unwrap();

    let items: Vec<_> = (0..3)
        .map(|_| pool.request_item(&mut scene).unwrap())
        .collect();
    counter(&scene, items[1]).free_for_reuse();
    scene.set_active(items[1], false).unwrap();

    assert_eq!(pool.request_item(&mut scene).unwrap(), items[1]);
    assert_eq!(pool.len(), 3);
}

#[test]
fn test_proper_growth() {
    let mut scene = Scene::new();
    let mut pool = new_pool(&mut scene, 0, Counter::default());
    pool.init(&mut scene).unwrap();

    pool.request_item(&mut scene).unwrap();
    assert_eq!(pool.capacity(), 1);
    assert_eq!(pool.len(), 1);
    pool.request_item(&mut scene).unwrap();
    assert_eq!(pool.capacity(), 2);
    assert_eq!(pool.len(), 2);
    pool.request_item(&mut scene).unwrap();
    assert_eq!(pool.capacity(), 4);
    assert_eq!(pool.len(), 3);

    pool.update(&mut scene).unwrap();
    assert_eq!(pool.len(), 4);
}

#[test]
fn test_refill() {
    let mut scene = Scene::new();
    let mut pool = new_pool(&mut scene, 10, Counter::default());
    pool.init(&mut scene).unwrap();
    pool.set_grow_rate(0.3);

    for _ in 0..11 {
        pool.request_item(&mut scene).unwrap();
    }
    assert_eq!(pool.capacity(), 13);
    assert_eq!(pool.len(), 11);

    pool.update(&mut scene).unwrap();
    assert_eq!(pool.len(), 12);
    pool.update(&mut scene).unwrap();
    assert_eq!(pool.len(), 13);
    pool.update(&mut scene).unwrap();
    assert_eq!(pool.len(), 13);
    assert_eq!(pool.capacity(), 13);
}

#[test]
fn test_update_before_init_does_nothing() {
    let mut scene = Scene::new();
    let mut pool = new_pool(&mut scene, 2, Counter::default());
    pool.update(&mut scene).unwrap();
    assert!(pool.is_empty());
}

#[test]
fn test_fail_on_zero_grow_rate() {
    let mut scene = Scene::new();
    let mut pool = new_pool(&mut scene, 0, Counter::default());
    pool.set_grow_rate(0.0);
    pool.init(&mut scene).unwrap();

    assert_eq!(
        pool.request_item(&mut scene),
        Err(PoolError::OutOfItems { capacity: 0 })
    );
    assert_eq!(pool.len(), 0);
}

#[test]
fn test_fail_when_exhausted() {
    let mut scene = Scene::new();
    let mut pool = new_pool(&mut scene, 1, Counter::default());
    pool.set_grow_rate(0.0);
    pool.init(&mut scene).unwrap();

    let item = pool.request_item(&mut scene).unwrap();
    assert_eq!(
        pool.request_item(&mut scene),
        Err(PoolError::OutOfItems { capacity: 1 })
    );
    assert_eq!(pool.len(), 1);
    assert_eq!(counter(&scene, item).times_reuse_requested, 1);
}

#[test]
fn test_reuse_requesting() {
    let mut scene = Scene::new();
    let template = Counter {
        accept_requests: true,
        ..Counter::default()
    };
    let mut pool = new_pool(&mut scene, 1, template);
    pool.init(&mut scene).unwrap();

    let fst = pool.request_item(&mut scene).unwrap();
    assert_eq!(counter(&scene, fst).times_reused, 1);
    assert_eq!(counter(&scene, fst).times_after_reuse, 1);
    assert_eq!(counter(&scene, fst).times_reuse_requested, 0);

    let snd = pool.request_item(&mut scene).unwrap();
    assert_eq!(fst, snd);
    assert_eq!(counter(&scene, fst).times_reused, 2);
    assert_eq!(counter(&scene, fst).times_after_reuse, 2);
    assert_eq!(counter(&scene, fst).times_reuse_requested, 1);
    assert_eq!(pool.len(), 1);

    let trd = pool.request_item(&mut scene).unwrap();
    assert_eq!(snd, trd);
    assert_eq!(counter(&scene, fst).times_reused, 3);
    assert_eq!(counter(&scene, fst).times_after_reuse, 3);
    assert_eq!(counter(&scene, fst).times_reuse_requested, 2);
    assert_eq!(pool.len(), 1);
}

#[test]
fn test_reuse_requests_follow_round_robin() {
    let mut scene = Scene::new();
    let mut pool = new_pool(&mut scene, 3, Counter::default());
    pool.set_grow_rate(0.0);
    pool.init(&mut scene).unwrap();
    let items = pool.items().to_vec();

    assert_eq!(pool.request_item(&mut scene).unwrap(), items[1]);
    assert_eq!(pool.request_item(&mut scene).unwrap(), items[2]);
    assert_eq!(pool.request_item(&mut scene).unwrap(), items[0]);
    scene.get_mut::<Counter>(items[2]).unwrap().accept_requests = true;

    // requests start after items[0] and stop at the first item that frees itself
    assert_eq!(pool.request_item(&mut scene).unwrap(), items[2]);
    assert_eq!(counter(&scene, items[0]).times_reuse_requested, 0);
    assert_eq!(counter(&scene, items[1]).times_reuse_requested, 1);
    assert_eq!(counter(&scene, items[2]).times_reuse_requested, 1);

    // the next round starts after items[2]
    assert_eq!(pool.request_item(&mut scene).unwrap(), items[2]);
    assert_eq!(counter(&scene, items[0]).times_reuse_requested, 1);
    assert_eq!(counter(&scene, items[1]).times_reuse_requested, 2);
    assert_eq!(counter(&scene, items[2]).times_reuse_requested, 2);
    assert_eq!(pool.len(), 3);
}

fn free_all(scene: &mut Scene, items: &[NodeId]) {
    for &item in items {
        if scene.contains(item) {
            counter(scene, item).free_for_reuse();
            scene.set_active(item, false).unwrap();
        }
    }
}

#[test]
fn test_round_robin_after_destroying_earlier_item() {
    let mut scene = Scene::new();
    let mut pool = new_pool(&mut scene, 4, Counter::default());
    pool.init(&mut scene).unwrap();
    let items = pool.items().to_vec();
    let (a, b, c, d) = (items[0], items[1], items[2], items[3]);

    assert_eq!(pool.request_item(&mut scene).unwrap(), b);
    assert_eq!(pool.request_item(&mut scene).unwrap(), c);
    free_all(&mut scene, &items);
    scene.destroy(a).unwrap();

    assert_eq!(pool.request_item(&mut scene).unwrap(), d);
    assert_eq!(pool.request_item(&mut scene).unwrap(), b);
    assert_eq!(pool.len(), 3);
}

#[test]
fn test_round_robin_after_destroying_last_returned_item() {
    let mut scene = Scene::new();
    let mut pool = new_pool(&mut scene, 4, Counter::default());
    pool.init(&mut scene).unwrap();
    let items = pool.items().to_vec();
    let (a, b, c, d) = (items[0], items[1], items[2], items[3]);

    assert_eq!(pool.request_item(&mut scene).unwrap(), b);
    assert_eq!(pool.request_item(&mut scene).unwrap(), c);
    free_all(&mut scene, &items);
    scene.destroy(c).unwrap();

    assert_eq!(pool.request_item(&mut scene).unwrap(), d);
    assert_eq!(pool.request_item(&mut scene).unwrap(), a);
}

#[test]
fn test_round_robin_wraps_when_first_item_was_last_returned() {
    let mut scene = Scene::new();
    let mut pool = new_pool(&mut scene, 3, Counter::default());
    pool.init(&mut scene).unwrap();
    let items = pool.items().to_vec();

    for _ in 0..3 {
        pool.request_item(&mut scene).unwrap();
    }
    free_all(&mut scene, &items);
    scene.destroy(items[0]).unwrap();

    assert_eq!(pool.request_item(&mut scene).unwrap(), items[1]);
}

#[test]
fn test_absurd_capacity_fails_to_init() {
    let mut scene = Scene::new();
    let mut pool = new_pool(&mut scene, i64::MAX, Counter::default());

    assert_eq!(
        pool.init(&mut scene),
        Err(PoolError::CapacityOverflow {
            capacity: pool.capacity()
        })
    );
    assert!(!pool.is_initialized());
    assert!(pool.is_empty());
}

/// A scene that refuses to move objects.
struct PinnedScene(Scene);

impl PoolHost<Counter> for PinnedScene {
    type Handle = NodeId;

    fn instantiate(&mut self, template: NodeId, name: String) -> Option<NodeId> {
        self.0.instantiate(template, name).ok()
    }

    fn name(&self, item: NodeId) -> Option<&str> {
        self.0.name(item)
    }

    fn is_active(&self, item: NodeId) -> bool {
        self.0.active_self(item)
    }

    fn set_active(&mut self, item: NodeId, active: bool) -> Result<(), PoolError> {
        Ok(self.0.set_active(item, active)?)
    }

    fn place(&mut self, item: NodeId, _position: Vec3, _rotation: Quat) -> Result<(), PoolError> {
        Err(SceneError::MissingObject(item).into())
    }

    fn reusable(&self, item: NodeId) -> Option<&Counter> {
        self.0.get(item)
    }

    fn reusable_mut(&mut self, item: NodeId) -> Option<&mut Counter> {
        self.0.get_mut(item)
    }
}

#[test]
fn test_host_failure_is_reported() {
    let mut scene = Scene::new();
    let mut pool = new_pool(&mut scene, 1, Counter::default());
    let mut host = PinnedScene(scene);
    pool.init(&mut host).unwrap();
    let item = pool.items()[0];

    assert_eq!(
        pool.request_item(&mut host),
        Err(PoolError::Scene(SceneError::MissingObject(item)))
    );
    assert!(!host.0.active_self(item));
}

#[test]
fn test_lazy_init_on_first_request() {
    let _ = env_logger::builder().is_test(true).try_init();

    let mut scene = Scene::new();
    let mut pool = new_pool(&mut scene, 3, Counter::default());
    assert!(!pool.is_initialized());

    pool.request_item(&mut scene).unwrap();
    assert!(pool.is_initialized());
    assert_eq!(pool.len(), 3);
}

#[test]
fn test_start_respects_init_on_start() {
    let mut scene = Scene::new();
    let template = scene.create_object("Template Object");
    scene.add_component(template, Counter::default()).unwrap();

    let mut lazy: GenericPool<Counter> =
        GenericPool::new(PoolConfig::default().with_capacity(2)).with_template(template);
    lazy.start(&mut scene).unwrap();
    assert!(!lazy.is_initialized());

    let mut eager: GenericPool<Counter> = GenericPool::new(
        PoolConfig::default()
            .with_capacity(2)
            .with_init_on_start(true),
    )
    .with_template(template);
    eager.start(&mut scene).unwrap();
    assert!(eager.is_initialized());
    assert_eq!(eager.len(), 2);
}

#[test]
fn test_request_places_item() {
    let mut scene = Scene::new();
    let mut pool = new_pool(&mut scene, 1, Counter::default());
    pool.init(&mut scene).unwrap();

    let position = Vec3::new(1.0, 2.0, 3.0);
    let rotation = Quat::from_rotation_y(1.0);
    let item = pool
        .request_item_with(&mut scene, position, rotation)
        .unwrap();
    assert_eq!(scene.position(item), Some(position));
    assert!(scene.rotation(item).unwrap().abs_diff_eq(rotation, 1e-6));

    counter(&scene, item).free_for_reuse();
    let item = pool.request_item(&mut scene).unwrap();
    assert_eq!(scene.position(item), Some(Vec3::ZERO));
    assert_eq!(scene.rotation(item), Some(Quat::IDENTITY));
}

#[test]
fn test_set_template_finds_reusable_in_children() {
    let mut scene = Scene::new();
    let prefab = scene.create_object("Prefab");
    let mut pool: GenericPool<Counter> = GenericPool::new(PoolConfig::default());

    assert!(matches!(
        pool.set_template(&scene, prefab),
        Err(SceneError::ComponentNotFound { .. })
    ));

    let body = scene.create_child(prefab, "Body").unwrap();
    scene.add_component(body, Counter::default()).unwrap();
    pool.set_template(&scene, prefab).unwrap();
    assert_eq!(pool.template(), Some(&body));
}

#[test]
fn test_destroyed_template() {
    let mut scene = Scene::new();
    let mut pool = new_pool(&mut scene, 2, Counter::default());
    let template = *pool.template().unwrap();
    scene.destroy(template).unwrap();

    assert_eq!(pool.init(&mut scene), Err(PoolError::NoTemplate));
}

#[test]
fn test_destroyed_items_are_pruned_and_refilled() {
    let mut scene = Scene::new();
    let mut pool = new_pool(&mut scene, 2, Counter::default());
    pool.init(&mut scene).unwrap();

    let doomed = pool.items()[0];
    scene.destroy(doomed).unwrap();

    let item = pool.request_item(&mut scene).unwrap();
    assert_ne!(item, doomed);
    assert_eq!(pool.len(), 1);

    pool.update(&mut scene).unwrap();
    assert_eq!(pool.len(), 2);
    assert_eq!(pool.capacity(), 2);
}

#[derive(Debug, Clone)]
struct Recorder {
    flag: ReuseFlag,
    log: Rc<RefCell<Vec<&'static str>>>,
}

impl Reusable for Recorder {
    fn reset_for_reuse(&mut self) {
        self.log.borrow_mut().push("reset");
    }

    fn after_reuse(&mut self) {
        self.log.borrow_mut().push("after");
    }

    fn reuse_requested(&mut self) {
        self.log.borrow_mut().push("requested");
    }

    fn reuse_flag(&self) -> &ReuseFlag {
        &self.flag
    }
}

struct RecordingHost {
    objects: Vec<(String, bool, Recorder)>,
    log: Rc<RefCell<Vec<&'static str>>>,
}

impl PoolHost<Recorder> for RecordingHost {
    type Handle = usize;

    fn instantiate(&mut self, template: usize, name: String) -> Option<usize> {
        let (_, active, recorder) = self.objects.get(template)?.clone();
        self.objects.push((name, active, recorder));
        self.log.borrow_mut().push("instantiate");
        Some(self.objects.len() - 1)
    }

    fn name(&self, item: usize) -> Option<&str> {
        self.objects.get(item).map(|object| object.0.as_str())
    }

    fn is_active(&self, item: usize) -> bool {
        self.objects.get(item).map_or(false, |object| object.1)
    }

    fn set_active(&mut self, item: usize, active: bool) -> Result<(), PoolError> {
        if let Some(object) = self.objects.get_mut(item) {
            object.1 = active;
        }
        self.log
            .borrow_mut()
            .push(if active { "activate" } else { "deactivate" });
        Ok(())
    }

    fn place(
        &mut self,
        _item: usize,
        _position: Vec3,
        _rotation: Quat,
    ) -> Result<(), PoolError> {
        self.log.borrow_mut().push("place");
        Ok(())
    }

    fn reusable(&self, item: usize) -> Option<&Recorder> {
        self.objects.get(item).map(|object| &object.2)
    }

    fn reusable_mut(&mut self, item: usize) -> Option<&mut Recorder> {
        self.objects.get_mut(item).map(|object| &mut object.2)
    }
}

#[test]
fn test_reuse_hook_order() {
    let log = Rc::new(RefCell::new(Vec::new()));
    let template = Recorder {
        flag: ReuseFlag::default(),
        log: log.clone(),
    };
    let mut host = RecordingHost {
        objects: vec![("Template".to_owned(), true, template)],
        log: log.clone(),
    };

    let mut pool: GenericPool<Recorder, usize> =
        GenericPool::new(PoolConfig::default().with_capacity(1)).with_template(0);
    pool.init(&mut host).unwrap();
    assert_eq!(*log.borrow(), ["instantiate", "deactivate"]);
    assert_eq!(host.name(1), Some("Template (Pool Item #1)"));

    log.borrow_mut().clear();
    let item = pool.request_item(&mut host).unwrap();
    assert_eq!(item, 1);
    assert_eq!(*log.borrow(), ["reset", "place", "activate", "after"]);
    assert!(!host.objects[1].2.can_be_reused());
}
