//! Frame scheduler
//!
//! Owns every per-frame task in an arena keyed by [`FrameTaskId`]. Tasks are
//! registered through a [`SchedulerHandle`] and return a disposable
//! [`FrameTaskHandle`]; dropping or cancelling the handle removes the task.
//!
//! Cancellation is checked at dispatch: a task cancelled by an earlier task in
//! the same frame, or by the host between frames, never runs again.

use slotmap::{new_key_type, SlotMap};
use smallvec::SmallVec;
use std::cell::RefCell;
use std::rc::{Rc, Weak};

new_key_type! {
    /// Handle to a registered frame task
    pub struct FrameTaskId;
}

/// Timing handed to a frame task
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameTime {
    /// Host timestamp of this frame in milliseconds
    pub now_ms: f64,
    /// Milliseconds since this task last ran (0 on its first run)
    pub delta_ms: f32,
}

/// What a task wants after running
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TaskControl {
    Continue,
    Stop,
}

type FrameCallback = Box<dyn FnMut(FrameTime) -> TaskControl>;

struct FrameTask {
    /// `None` while the callback is executing
    callback: Option<FrameCallback>,
    last_run_ms: Option<f64>,
}

/// Internal state of the frame scheduler
struct SchedulerInner {
    tasks: SlotMap<FrameTaskId, FrameTask>,
    last_frame_ms: Option<f64>,
    frame_count: u64,
}

/// The scheduler that runs frame tasks
///
/// Typically owned by the host's render loop and shared with engines via
/// [`SchedulerHandle`].
pub struct FrameScheduler {
    inner: Rc<RefCell<SchedulerInner>>,
}

impl FrameScheduler {
    pub fn new() -> Self {
        Self {
            inner: Rc::new(RefCell::new(SchedulerInner {
                tasks: SlotMap::with_key(),
                last_frame_ms: None,
                frame_count: 0,
            })),
        }
    }

    /// Get a weak handle for registering tasks
    pub fn handle(&self) -> SchedulerHandle {
        SchedulerHandle {
            inner: Rc::downgrade(&self.inner),
        }
    }

    /// Register a task directly on the scheduler
    pub fn register(
        &self,
        callback: impl FnMut(FrameTime) -> TaskControl + 'static,
    ) -> FrameTaskHandle {
        let id = insert_task(&self.inner, Box::new(callback));
        FrameTaskHandle {
            id: Some(id),
            scheduler: self.handle(),
        }
    }

    /// Run one frame at host time `now_ms`
    ///
    /// Tasks registered during the frame first run on the next frame.
    /// Returns the number of tasks that ran.
    pub fn tick(&self, now_ms: f64) -> usize {
        let ids: SmallVec<[FrameTaskId; 8]> = {
            let mut inner = self.inner.borrow_mut();
            inner.frame_count += 1;
            inner.last_frame_ms = Some(now_ms);
            inner.tasks.keys().collect()
        };

        let mut ran = 0;
        for id in ids {
            // Take the callback out so it can re-enter the scheduler
            let taken = {
                let mut inner = self.inner.borrow_mut();
                inner.tasks.get_mut(id).and_then(|task| {
                    let callback = task.callback.take()?;
                    let delta_ms = task
                        .last_run_ms
                        .map(|last| (now_ms - last).max(0.0) as f32)
                        .unwrap_or(0.0);
                    task.last_run_ms = Some(now_ms);
                    Some((callback, FrameTime { now_ms, delta_ms }))
                })
            };
            let Some((mut callback, time)) = taken else {
                continue;
            };

            let control = callback(time);
            ran += 1;

            let mut inner = self.inner.borrow_mut();
            match (control, inner.tasks.get_mut(id)) {
                (TaskControl::Continue, Some(task)) => task.callback = Some(callback),
                (TaskControl::Stop, Some(_)) => {
                    inner.tasks.remove(id);
                    tracing::trace!(?id, "frame task finished");
                }
                // Cancelled while running
                (_, None) => {}
            }
        }
        ran
    }

    /// Number of registered tasks
    pub fn task_count(&self) -> usize {
        self.inner.borrow().tasks.len()
    }

    pub fn is_idle(&self) -> bool {
        self.task_count() == 0
    }

    /// Number of frames ticked so far
    pub fn frame_count(&self) -> u64 {
        self.inner.borrow().frame_count
    }
}

impl Default for FrameScheduler {
    fn default() -> Self {
        Self::new()
    }
}

fn insert_task(inner: &Rc<RefCell<SchedulerInner>>, callback: FrameCallback) -> FrameTaskId {
    let mut guard = inner.borrow_mut();
    // First delta is measured from the latest frame, not from time zero
    let last_run_ms = guard.last_frame_ms;
    guard.tasks.insert(FrameTask {
        callback: Some(callback),
        last_run_ms,
    })
}

/// A weak handle to the frame scheduler
///
/// Every operation safely no-ops once the scheduler has been dropped.
#[derive(Clone)]
pub struct SchedulerHandle {
    inner: Weak<RefCell<SchedulerInner>>,
}

impl SchedulerHandle {
    /// Register a task; `None` if the scheduler is gone
    pub fn register(
        &self,
        callback: impl FnMut(FrameTime) -> TaskControl + 'static,
    ) -> Option<FrameTaskHandle> {
        let inner = self.inner.upgrade()?;
        let id = insert_task(&inner, Box::new(callback));
        Some(FrameTaskHandle {
            id: Some(id),
            scheduler: self.clone(),
        })
    }

    /// Remove a task; returns whether it was still registered
    pub fn cancel(&self, id: FrameTaskId) -> bool {
        self.inner
            .upgrade()
            .map(|inner| inner.borrow_mut().tasks.remove(id).is_some())
            .unwrap_or(false)
    }

    pub fn is_registered(&self, id: FrameTaskId) -> bool {
        self.inner
            .upgrade()
            .map(|inner| inner.borrow().tasks.contains_key(id))
            .unwrap_or(false)
    }

    /// Check if the scheduler is still alive
    pub fn is_alive(&self) -> bool {
        self.inner.strong_count() > 0
    }
}

/// Disposable registration of a frame task
///
/// Cancels the task when dropped.
pub struct FrameTaskHandle {
    id: Option<FrameTaskId>,
    scheduler: SchedulerHandle,
}

impl FrameTaskHandle {
    /// True while the task is still registered
    pub fn is_active(&self) -> bool {
        self.id.is_some_and(|id| self.scheduler.is_registered(id))
    }

    /// Cancel the task; idempotent
    pub fn cancel(&mut self) {
        if let Some(id) = self.id.take() {
            self.scheduler.cancel(id);
        }
    }
}

impl Drop for FrameTaskHandle {
    fn drop(&mut self) {
        self.cancel();
    }
}

impl std::fmt::Debug for FrameTaskHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FrameTaskHandle")
            .field("id", &self.id)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    fn counter_task(count: &Rc<Cell<u32>>) -> impl FnMut(FrameTime) -> TaskControl + 'static {
        let count = count.clone();
        move |_| {
            count.set(count.get() + 1);
            TaskControl::Continue
        }
    }

    #[test]
    fn test_tick_runs_tasks() {
        let scheduler = FrameScheduler::new();
        let count = Rc::new(Cell::new(0));
        let _handle = scheduler.register(counter_task(&count));

        assert_eq!(scheduler.tick(0.0), 1);
        assert_eq!(scheduler.tick(16.0), 1);
        assert_eq!(count.get(), 2);
        assert_eq!(scheduler.frame_count(), 2);
    }

    #[test]
    fn test_delta_is_per_task() {
        let scheduler = FrameScheduler::new();
        let deltas = Rc::new(RefCell::new(Vec::new()));
        let sink = deltas.clone();
        let _handle = scheduler.register(move |time| {
            sink.borrow_mut().push(time.delta_ms);
            TaskControl::Continue
        });

        scheduler.tick(100.0);
        scheduler.tick(116.0);
        scheduler.tick(150.0);
        assert_eq!(*deltas.borrow(), vec![0.0, 16.0, 34.0]);
    }

    #[test]
    fn test_drop_handle_cancels() {
        let scheduler = FrameScheduler::new();
        let count = Rc::new(Cell::new(0));
        let handle = scheduler.register(counter_task(&count));
        scheduler.tick(0.0);
        drop(handle);
        scheduler.tick(16.0);

        assert_eq!(count.get(), 1);
        assert!(scheduler.is_idle());
    }

    #[test]
    fn test_stop_unregisters() {
        let scheduler = FrameScheduler::new();
        let handle = scheduler.register(|_| TaskControl::Stop);
        scheduler.tick(0.0);
        assert!(!handle.is_active());
        assert_eq!(scheduler.tick(16.0), 0);
    }

    #[test]
    fn test_cancel_during_same_frame() {
        let scheduler = FrameScheduler::new();
        let count = Rc::new(Cell::new(0));

        // The victim is registered second so the killer runs first
        let victim: Rc<RefCell<Option<FrameTaskHandle>>> = Rc::new(RefCell::new(None));
        let target = victim.clone();
        let _killer = scheduler.register(move |_| {
            if let Some(mut handle) = target.borrow_mut().take() {
                handle.cancel();
            }
            TaskControl::Continue
        });
        *victim.borrow_mut() = Some(scheduler.register(counter_task(&count)));

        scheduler.tick(0.0);
        assert_eq!(count.get(), 0);
        assert_eq!(scheduler.task_count(), 1);
    }

    #[test]
    fn test_task_cancels_itself() {
        let scheduler = FrameScheduler::new();
        let slot: Rc<RefCell<Option<FrameTaskHandle>>> = Rc::new(RefCell::new(None));
        let own = slot.clone();
        let runs = Rc::new(Cell::new(0));
        let r = runs.clone();

        *slot.borrow_mut() = Some(scheduler.register(move |_| {
            r.set(r.get() + 1);
            own.borrow_mut().take();
            TaskControl::Continue
        }));

        scheduler.tick(0.0);
        scheduler.tick(16.0);
        assert_eq!(runs.get(), 1);
        assert!(scheduler.is_idle());
    }

    #[test]
    fn test_registered_during_tick_runs_next_frame() {
        let scheduler = FrameScheduler::new();
        let handle = scheduler.handle();
        let count = Rc::new(Cell::new(0));
        let spawned: Rc<RefCell<Vec<FrameTaskHandle>>> = Rc::new(RefCell::new(Vec::new()));

        let c = count.clone();
        let keep = spawned.clone();
        let _spawner = scheduler.register(move |_| {
            if let Some(h) = handle.register(counter_task(&c)) {
                keep.borrow_mut().push(h);
            }
            TaskControl::Stop
        });

        assert_eq!(scheduler.tick(0.0), 1);
        assert_eq!(count.get(), 0);
        assert_eq!(scheduler.tick(16.0), 1);
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn test_handle_weak_reference() {
        let handle = {
            let scheduler = FrameScheduler::new();
            scheduler.handle()
        };

        // Scheduler is dropped, handle should not be alive
        assert!(!handle.is_alive());

        // Operations should safely no-op
        assert!(handle.register(|_| TaskControl::Continue).is_none());
    }

    #[test]
    fn test_task_handle_outlives_scheduler() {
        let scheduler = FrameScheduler::new();
        let mut task = scheduler.register(|_| TaskControl::Continue);
        drop(scheduler);
        assert!(!task.is_active());
        task.cancel();
        task.cancel();
    }
}
