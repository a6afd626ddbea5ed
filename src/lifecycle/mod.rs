//! Assignment lifecycle: time-driven status rules and the background task
//! that applies them.
//!
//! # Components
//!
//! - [`transition`]: pure status rules (initial status, time-based advance)
//! - [`LifecycleScheduler`]: periodic, single-flight reconciliation plus the
//!   manual completion entry point
//!
//! # State machine
//!
//! ```text
//! draft ----(create, start in future)----> scheduled
//! draft ----(create, otherwise)----------> open
//! scheduled --(now >= start)-------------> open
//! draft/scheduled/open --(now > due)-----> closed
//! any --(manual completion)--------------> completed  [terminal]
//! ```

pub mod scheduler;
pub mod transition;

pub use scheduler::{LifecycleScheduler, PassReport};
