//! wf-schedule: weekly operating-mode schedules for warmflow zones.
//!
//! A zone schedule maps weekdays to ordered lists of time windows, each
//! selecting an operating mode. Windows may wrap midnight. Evaluation is a
//! pure function of the schedule and a timestamp, so the engine can call it
//! once a minute and tests can replay any wall-clock scenario.
//!
//! Quick-heat: when no window governs but a comfort window opens soon, the
//! zone switches to comfort early so the slow floor reaches temperature by
//! the window start.

pub mod eval;
pub mod schedule;

pub use eval::{evaluate, ScheduleDecision};
pub use schedule::{DaySchedule, ModeWindow, ZoneSchedule};
