//! Building blocks for composing coroutines out of closures.
//!
//! Using these, complex frame-spanning behaviour can be expressed inline
//! instead of writing a dedicated [`Coroutine`] type for each of them.
//!
//! ```
//! use gamecore::{routines, CoroutineExt, Scheduler};
//! use std::{cell::Cell, rc::Rc};
//!
//! let done = Rc::new(Cell::new(false));
//! let flag = done.clone();
//!
//! let mut scheduler = Scheduler::new();
//! scheduler.start(routines::delay_for_frames(2, move || flag.set(true), false));
//! scheduler.update(0.016);
//! assert!(!done.get());
//! scheduler.update(0.016);
//! assert!(done.get());
//! ```

use crate::{Clock, Coroutine, CoroutineExt, Yield};
use core::fmt;

/// A coroutine driven by a closure, created by [`from_fn`].
pub struct FromFn<F>(F);

impl<F> fmt::Debug for FromFn<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("FromFn").finish_non_exhaustive()
    }
}

impl<F: FnMut(&Clock) -> Option<Yield>> Coroutine for FromFn<F> {
    fn resume(&mut self, clock: &Clock) -> Option<Yield> {
        (self.0)(clock)
    }
}

/// Turns a closure into a coroutine. Each call of the closure is one step;
/// returning `None` finishes the coroutine.
pub fn from_fn<F>(f: F) -> FromFn<F>
where
    F: FnMut(&Clock) -> Option<Yield> + 'static,
{
    FromFn(f)
}

/// Yields whatever `action` returns, once.
pub fn do_yield<F>(action: F) -> FromFn<impl FnMut(&Clock) -> Option<Yield>>
where
    F: FnOnce() -> Yield + 'static,
{
    let mut action = Some(action);
    from_fn(move |_| action.take().map(|action| action()))
}

/// Runs `block` and finishes without suspending.
pub fn run<F>(block: F) -> FromFn<impl FnMut(&Clock) -> Option<Yield>>
where
    F: FnOnce() + 'static,
{
    let mut block = Some(block);
    from_fn(move |_| {
        if let Some(block) = block.take() {
            block();
        }
        None
    })
}

/// A coroutine that finishes immediately.
pub fn do_nothing() -> FromFn<impl FnMut(&Clock) -> Option<Yield>> {
    from_fn(|_| None)
}

/// Yields the result of `action` `times` times, or forever when `times` is
/// `None`.
pub fn repeat<F>(mut action: F, times: Option<u32>) -> FromFn<impl FnMut(&Clock) -> Option<Yield>>
where
    F: FnMut() -> Yield + 'static,
{
    let mut count = 0;
    from_fn(move |_| {
        if times == Some(count) {
            return None;
        }
        count += 1;
        Some(action())
    })
}

/// Runs `block`, then `routine`.
pub fn do_before<F, C>(block: F, routine: C) -> FromFn<impl FnMut(&Clock) -> Option<Yield>>
where
    F: FnOnce() + 'static,
    C: Coroutine + 'static,
{
    let mut pending = Some((block, routine));
    from_fn(move |_| {
        let (block, routine) = pending.take()?;
        block();
        Some(Yield::Routine(routine.boxed()))
    })
}

/// Suspends for one frame at a time until `condition` holds, then runs
/// `afterwards`.
pub fn wait_until<C, F>(condition: C, afterwards: F) -> FromFn<impl FnMut(&Clock) -> Option<Yield>>
where
    C: FnMut() -> bool + 'static,
    F: FnOnce() + 'static,
{
    wait_until_with(condition, afterwards, || Yield::NextFrame)
}

/// Like [`wait_until`], suspending on whatever `yielder` returns instead of
/// a single frame.
pub fn wait_until_with<C, F, Y>(
    mut condition: C,
    afterwards: F,
    mut yielder: Y,
) -> FromFn<impl FnMut(&Clock) -> Option<Yield>>
where
    C: FnMut() -> bool + 'static,
    F: FnOnce() + 'static,
    Y: FnMut() -> Yield + 'static,
{
    let mut afterwards = Some(afterwards);
    from_fn(move |_| {
        if !condition() {
            return Some(yielder());
        }
        if let Some(afterwards) = afterwards.take() {
            afterwards();
        }
        None
    })
}

/// Waits for `frames` frames (or fixed updates), then runs `afterwards`.
pub fn delay_for_frames<F>(
    frames: u32,
    afterwards: F,
    fixed_update: bool,
) -> FromFn<impl FnMut(&Clock) -> Option<Yield>>
where
    F: FnOnce() + 'static,
{
    let mut remaining = frames;
    let mut afterwards = Some(afterwards);
    from_fn(move |_| {
        if remaining > 0 {
            remaining -= 1;
            return Some(Yield::frame(fixed_update));
        }
        if let Some(afterwards) = afterwards.take() {
            afterwards();
        }
        None
    })
}

/// Waits for `seconds`, then runs `afterwards`.
pub fn wait_for_seconds<F>(seconds: f32, afterwards: F) -> FromFn<impl FnMut(&Clock) -> Option<Yield>>
where
    F: FnOnce() + 'static,
{
    let mut waited = false;
    let mut afterwards = Some(afterwards);
    from_fn(move |_| {
        if !waited {
            waited = true;
            return Some(Yield::Seconds(seconds));
        }
        if let Some(afterwards) = afterwards.take() {
            afterwards();
        }
        None
    })
}

/// Runs `action` once per frame (or fixed update) until `seconds` have
/// passed. `action` always runs at least once.
pub fn repeat_for_seconds<F>(
    seconds: f32,
    mut action: F,
    fixed_update: bool,
) -> FromFn<impl FnMut(&Clock) -> Option<Yield>>
where
    F: FnMut() + 'static,
{
    let mut started: Option<f32> = None;
    from_fn(move |clock: &Clock| {
        match started {
            None => started = Some(clock.time),
            Some(start) if clock.time - start >= seconds => return None,
            Some(_) => {}
        }
        action();
        Some(Yield::frame(fixed_update))
    })
}

/// Runs `action` once per frame (or fixed update), `frames` times.
pub fn repeat_for_frames<F>(
    frames: u32,
    mut action: F,
    fixed_update: bool,
) -> FromFn<impl FnMut(&Clock) -> Option<Yield>>
where
    F: FnMut() + 'static,
{
    let mut remaining = frames;
    from_fn(move |_| {
        if remaining == 0 {
            return None;
        }
        remaining -= 1;
        action();
        Some(Yield::frame(fixed_update))
    })
}

/// Runs `action` once per frame for as long as `condition` holds. The
/// condition is checked before every run.
pub fn repeat_while<C, F>(condition: C, action: F) -> FromFn<impl FnMut(&Clock) -> Option<Yield>>
where
    C: FnMut() -> bool + 'static,
    F: FnMut() + 'static,
{
    repeat_while_with(condition, action, || Yield::NextFrame)
}

/// Like [`repeat_while`], suspending on whatever `yielder` returns instead
/// of a single frame.
pub fn repeat_while_with<C, F, Y>(
    mut condition: C,
    mut action: F,
    mut yielder: Y,
) -> FromFn<impl FnMut(&Clock) -> Option<Yield>>
where
    C: FnMut() -> bool + 'static,
    F: FnMut() + 'static,
    Y: FnMut() -> Yield + 'static,
{
    from_fn(move |_| {
        if !condition() {
            return None;
        }
        action();
        Some(yielder())
    })
}

/// Runs `action`, then waits `interval` seconds, `repetitions` times or
/// forever when `repetitions` is `None`.
pub fn repeat_every_seconds<F>(
    interval: f32,
    action: F,
    repetitions: Option<u32>,
) -> FromFn<impl FnMut(&Clock) -> Option<Yield>>
where
    F: FnMut() + 'static,
{
    let mut action = action;
    repeat(
        move || {
            action();
            Yield::Seconds(interval)
        },
        repetitions,
    )
}
