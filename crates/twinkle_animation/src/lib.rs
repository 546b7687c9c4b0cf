//! Twinkle Animation System
//!
//! A single-threaded frame scheduler. The host calls
//! [`FrameScheduler::tick`] once per display refresh; every registered task
//! runs once per tick until it returns [`TaskControl::Stop`] or its
//! [`FrameTaskHandle`] is cancelled or dropped.
//!
//! # Example
//!
//! ```rust
//! use std::cell::Cell;
//! use std::rc::Rc;
//! use twinkle_animation::{FrameScheduler, TaskControl};
//!
//! let scheduler = FrameScheduler::new();
//! let frames = Rc::new(Cell::new(0));
//!
//! let counter = frames.clone();
//! let handle = scheduler.register(move |_time| {
//!     counter.set(counter.get() + 1);
//!     TaskControl::Continue
//! });
//!
//! scheduler.tick(0.0);
//! scheduler.tick(16.7);
//! drop(handle);
//! scheduler.tick(33.4);
//! assert_eq!(frames.get(), 2);
//! ```

pub mod scheduler;

pub use scheduler::{
    FrameScheduler, FrameTaskHandle, FrameTaskId, FrameTime, SchedulerHandle, TaskControl,
};
