use crate::{BoxedCoroutine, Coroutine, Yield};
use core::fmt;

/// Frame timing as seen by running coroutines.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Clock {
    /// Seconds since the scheduler was created, advanced by
    /// [`Scheduler::update`].
    pub time: f32,
    /// Length of the last frame in seconds.
    pub delta_time: f32,
    /// Number of frames run so far.
    pub frame: u64,
    /// Seconds of fixed-timestep simulation, advanced by
    /// [`Scheduler::fixed_update`].
    pub fixed_time: f32,
    /// Length of the last fixed-timestep tick in seconds.
    pub fixed_delta_time: f32,
}

/// Identifies a coroutine started on a [`Scheduler`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CoroutineId(u64);

#[derive(Debug, Clone, Copy, PartialEq)]
enum Wait {
    Frame,
    FixedUpdate,
    Until(f32),
}

struct Task {
    id: CoroutineId,
    stack: Vec<BoxedCoroutine>,
    wait: Wait,
}

impl Task {
    /// Resumes the innermost routine until the task suspends. Returns
    /// `false` once the outermost routine has finished.
    fn step(&mut self, clock: &Clock) -> bool {
        while let Some(top) = self.stack.last_mut() {
            match top.resume(clock) {
                Some(Yield::Routine(nested)) => self.stack.push(nested),
                Some(Yield::NextFrame) => {
                    self.wait = Wait::Frame;
                    return true;
                }
                Some(Yield::FixedUpdate) => {
                    self.wait = Wait::FixedUpdate;
                    return true;
                }
                Some(Yield::Seconds(seconds)) if seconds.is_finite() && seconds > 0.0 => {
                    self.wait = Wait::Until(clock.time + seconds);
                    return true;
                }
                Some(Yield::Seconds(seconds)) => {
                    log::trace!(
                        "coroutine {:?} waits {} seconds, resuming next frame",
                        self.id,
                        seconds
                    );
                    self.wait = Wait::Frame;
                    return true;
                }
                None => {
                    self.stack.pop();
                }
            }
        }
        log::trace!("coroutine {:?} finished", self.id);
        false
    }
}

/// Drives coroutines once per frame and once per fixed-timestep tick.
///
/// Everything runs on the calling thread. Coroutines are resumed in the
/// order they were started. A coroutine waiting on a nested routine only
/// resumes once that routine has finished. Stopping a coroutine or dropping
/// the scheduler drops the suspended routines without resuming them.
#[derive(Default)]
pub struct Scheduler {
    tasks: Vec<Task>,
    next_id: u64,
    clock: Clock,
}

impl fmt::Debug for Scheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scheduler")
            .field("running", &self.tasks.len())
            .field("clock", &self.clock)
            .finish()
    }
}

impl Scheduler {
    /// Creates a scheduler with its clock at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current frame timing.
    pub fn clock(&self) -> &Clock {
        &self.clock
    }

    /// Starts `routine`, running it right away until it first suspends.
    ///
    /// A routine that finishes without suspending is not kept around, but
    /// still receives an id.
    pub fn start(&mut self, routine: impl Coroutine + 'static) -> CoroutineId {
        let id = CoroutineId(self.next_id);
        self.next_id += 1;

        let mut task = Task {
            id,
            stack: vec![Box::new(routine)],
            wait: Wait::Frame,
        };
        if task.step(&self.clock) {
            log::trace!("coroutine {:?} suspended until {:?}", id, task.wait);
            self.tasks.push(task);
        }
        id
    }

    /// Advances the clock by one frame of `delta_time` seconds and resumes
    /// every coroutine waiting for the next frame or for a deadline that has
    /// passed.
    pub fn update(&mut self, delta_time: f32) {
        self.clock.time += delta_time;
        self.clock.delta_time = delta_time;
        self.clock.frame += 1;
        self.resume_where(|wait, clock| match wait {
            Wait::Frame => true,
            Wait::FixedUpdate => false,
            Wait::Until(deadline) => clock.time >= deadline,
        });
    }

    /// Advances the fixed-timestep clock by `delta_time` seconds and resumes
    /// every coroutine waiting for a fixed update.
    pub fn fixed_update(&mut self, delta_time: f32) {
        self.clock.fixed_time += delta_time;
        self.clock.fixed_delta_time = delta_time;
        self.resume_where(|wait, _| wait == Wait::FixedUpdate);
    }

    fn resume_where(&mut self, ready: impl Fn(Wait, &Clock) -> bool) {
        let clock = self.clock;
        self.tasks
            .retain_mut(|task| !ready(task.wait, &clock) || task.step(&clock));
    }

    /// Stops a running coroutine. Returns `false` if it was not running.
    pub fn stop(&mut self, id: CoroutineId) -> bool {
        match self.tasks.iter().position(|task| task.id == id) {
            Some(index) => {
                self.tasks.remove(index);
                true
            }
            None => false,
        }
    }

    /// Stops every running coroutine.
    pub fn stop_all(&mut self) {
        self.tasks.clear();
    }

    /// Whether the coroutine is still suspended in this scheduler.
    pub fn is_running(&self, id: CoroutineId) -> bool {
        self.tasks.iter().any(|task| task.id == id)
    }

    /// Number of suspended coroutines.
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    /// Returns `true` if no coroutine is suspended.
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}
