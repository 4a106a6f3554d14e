use crate::Clock;
use core::fmt;

/// A boxed, type-erased coroutine.
pub type BoxedCoroutine = Box<dyn Coroutine>;

/// What a suspended coroutine waits for before it is resumed.
pub enum Yield {
    /// Resume on the next frame.
    NextFrame,
    /// Resume on the next fixed-timestep tick.
    FixedUpdate,
    /// Resume on the first frame at least this many seconds later. Zero,
    /// negative and non-finite durations resume on the next frame.
    Seconds(f32),
    /// Run the nested coroutine to completion, then resume.
    Routine(BoxedCoroutine),
}

impl Yield {
    /// [`Yield::FixedUpdate`] if `fixed_update` is set, else
    /// [`Yield::NextFrame`].
    pub fn frame(fixed_update: bool) -> Self {
        if fixed_update {
            Yield::FixedUpdate
        } else {
            Yield::NextFrame
        }
    }
}

impl fmt::Debug for Yield {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Yield::NextFrame => f.write_str("NextFrame"),
            Yield::FixedUpdate => f.write_str("FixedUpdate"),
            Yield::Seconds(seconds) => f.debug_tuple("Seconds").field(seconds).finish(),
            Yield::Routine(_) => f.write_str("Routine(..)"),
        }
    }
}

/// A computation that runs across several frames.
///
/// Each call to [`Self::resume`] runs the coroutine until it either
/// suspends, returning what to wait for, or finishes, returning `None`.
/// Coroutines are driven by a [`Scheduler`](crate::Scheduler) and never run
/// concurrently.
pub trait Coroutine {
    /// Runs until the next suspension point.
    fn resume(&mut self, clock: &Clock) -> Option<Yield>;
}

impl<C: Coroutine + ?Sized> Coroutine for Box<C> {
    fn resume(&mut self, clock: &Clock) -> Option<Yield> {
        (**self).resume(clock)
    }
}

/// Combinators available on every coroutine.
pub trait CoroutineExt: Coroutine + Sized + 'static {
    /// Boxes the coroutine.
    fn boxed(self) -> BoxedCoroutine {
        Box::new(self)
    }

    /// Runs nested routines inline, so that the result never yields
    /// [`Yield::Routine`].
    fn flatten(self) -> Flatten {
        Flatten {
            stack: vec![self.boxed()],
        }
    }

    /// Stops the flattened coroutine as soon as `condition` returns `false`.
    /// The condition is checked before every step.
    fn yield_while<F>(self, condition: F) -> YieldWhile<F>
    where
        F: FnMut() -> bool + 'static,
    {
        YieldWhile {
            inner: self.flatten(),
            condition,
            done: false,
        }
    }

    /// Runs `next` after this coroutine has finished.
    fn and_then<C>(self, next: C) -> AndThen
    where
        C: Coroutine + 'static,
    {
        AndThen {
            first: Some(self.boxed()),
            second: Some(Box::new(next)),
        }
    }

    /// Runs `block` once the flattened coroutine has finished, or when it is
    /// dropped before finishing.
    fn afterwards<F>(self, block: F) -> Afterwards<F>
    where
        F: FnOnce() + 'static,
    {
        Afterwards {
            inner: self.flatten(),
            block: Some(block),
        }
    }
}

impl<C: Coroutine + 'static> CoroutineExt for C {}

/// Created by [`CoroutineExt::flatten`].
pub struct Flatten {
    stack: Vec<BoxedCoroutine>,
}

impl fmt::Debug for Flatten {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Flatten")
            .field("depth", &self.stack.len())
            .finish()
    }
}

impl Coroutine for Flatten {
    fn resume(&mut self, clock: &Clock) -> Option<Yield> {
        while let Some(top) = self.stack.last_mut() {
            match top.resume(clock) {
                Some(Yield::Routine(nested)) => self.stack.push(nested),
                Some(other) => return Some(other),
                None => {
                    self.stack.pop();
                }
            }
        }
        None
    }
}

/// Created by [`CoroutineExt::yield_while`].
pub struct YieldWhile<F> {
    inner: Flatten,
    condition: F,
    done: bool,
}

impl<F> fmt::Debug for YieldWhile<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("YieldWhile")
            .field("inner", &self.inner)
            .field("done", &self.done)
            .finish_non_exhaustive()
    }
}

impl<F: FnMut() -> bool> Coroutine for YieldWhile<F> {
    fn resume(&mut self, clock: &Clock) -> Option<Yield> {
        if self.done || !(self.condition)() {
            self.done = true;
            return None;
        }
        let step = self.inner.resume(clock);
        self.done = step.is_none();
        step
    }
}

/// Created by [`CoroutineExt::and_then`].
pub struct AndThen {
    first: Option<BoxedCoroutine>,
    second: Option<BoxedCoroutine>,
}

impl fmt::Debug for AndThen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AndThen")
            .field("first_pending", &self.first.is_some())
            .field("second_pending", &self.second.is_some())
            .finish()
    }
}

impl Coroutine for AndThen {
    fn resume(&mut self, _clock: &Clock) -> Option<Yield> {
        self.first
            .take()
            .or_else(|| self.second.take())
            .map(Yield::Routine)
    }
}

/// Created by [`CoroutineExt::afterwards`].
pub struct Afterwards<F: FnOnce()> {
    inner: Flatten,
    block: Option<F>,
}

impl<F: FnOnce()> fmt::Debug for Afterwards<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Afterwards")
            .field("inner", &self.inner)
            .field("pending", &self.block.is_some())
            .finish()
    }
}

impl<F: FnOnce()> Afterwards<F> {
    fn run_block(&mut self) {
        if let Some(block) = self.block.take() {
            block();
        }
    }
}

impl<F: FnOnce()> Coroutine for Afterwards<F> {
    fn resume(&mut self, clock: &Clock) -> Option<Yield> {
        let step = self.inner.resume(clock);
        if step.is_none() {
            self.run_block();
        }
        step
    }
}

impl<F: FnOnce()> Drop for Afterwards<F> {
    fn drop(&mut self) {
        self.run_block();
    }
}
