//! # Animation Driver
//!
//! Runs the per-frame loop: rotate every object from elapsed time, let the
//! camera controller release its damped motion, render once.
//!
//! - [`AnimationDriver`] - Running/Stopped state machine
//! - [`Clock`] - monotonic time source ([`SystemClock`], [`ManualClock`])
//! - [`FrameRenderer`] / [`FrameScheduler`] - the seams to the GPU and the host

pub mod clock;
pub mod driver;

pub use clock::{Clock, ManualClock, SystemClock};
pub use driver::{
    AnimationDriver, DriverState, FrameRenderer, FrameScheduler, StopHandle, TickOutcome,
};
