//! Authoritative collection of assignment records.
//!
//! - [`AssignmentTable`]: the record arena, id allocation and per-record
//!   operations, all synchronous.
//! - [`AssignmentStore`]: shared, lock-guarded handle injected into the HTTP
//!   layer and the lifecycle scheduler.

pub mod assignment;
pub mod shared;
pub mod table;
pub mod template;

pub use assignment::{
    Assignment, AssignmentId, AssignmentPatch, AssignmentStatus, CourseProgress, NewAssignment,
    StatusChange, TemplateId,
};
pub use shared::AssignmentStore;
pub use table::AssignmentTable;
pub use template::{NewTemplate, Template, TemplateInstance};
