use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Stable identity of an assignment. Allocated by the store, never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AssignmentId(pub u64);

impl std::fmt::Display for AssignmentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TemplateId(pub u64);

impl std::fmt::Display for TemplateId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Lifecycle status of an assignment.
///
/// `Draft < Scheduled < Open < Closed` is the automatic timeline; `Completed`
/// sits outside it and can only be reached by an explicit completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssignmentStatus {
    Draft,
    Scheduled,
    Open,
    Closed,
    Completed,
}

impl AssignmentStatus {
    /// Position on the automatic timeline. `None` for the terminal status.
    pub fn timeline_rank(self) -> Option<u8> {
        match self {
            AssignmentStatus::Draft => Some(0),
            AssignmentStatus::Scheduled => Some(1),
            AssignmentStatus::Open => Some(2),
            AssignmentStatus::Closed => Some(3),
            AssignmentStatus::Completed => None,
        }
    }

    pub fn is_terminal(self) -> bool {
        self == AssignmentStatus::Completed
    }

    /// Whether a record may move from `self` to `to` without regressing.
    ///
    /// Completion is reachable from anywhere; nothing leaves it.
    pub fn can_move_to(self, to: AssignmentStatus) -> bool {
        match (self.timeline_rank(), to.timeline_rank()) {
            (_, None) => true,
            (None, Some(_)) => false,
            (Some(from), Some(to)) => to >= from,
        }
    }
}

impl std::fmt::Display for AssignmentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AssignmentStatus::Draft => write!(f, "draft"),
            AssignmentStatus::Scheduled => write!(f, "scheduled"),
            AssignmentStatus::Open => write!(f, "open"),
            AssignmentStatus::Closed => write!(f, "closed"),
            AssignmentStatus::Completed => write!(f, "completed"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assignment {
    pub id: AssignmentId,
    pub title: String,
    pub description: Option<String>,
    pub course_id: Option<String>,
    pub template_id: Option<TemplateId>,
    pub start_date: Option<DateTime<Utc>>,
    pub due_date: DateTime<Utc>,
    pub status: AssignmentStatus,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

/// Creation request as it arrives from the request-handling layer.
///
/// `due_date` is optional here only so that a missing value can be reported
/// as a validation error instead of a deserialization failure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewAssignment {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, alias = "courseId")]
    pub course_id: Option<String>,
    #[serde(default, alias = "startDate")]
    pub start_date: Option<DateTime<Utc>>,
    #[serde(default, alias = "dueDate")]
    pub due_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub completed: bool,
}

impl NewAssignment {
    pub fn new(title: impl Into<String>, due_date: DateTime<Utc>) -> Self {
        Self {
            title: title.into(),
            due_date: Some(due_date),
            ..Default::default()
        }
    }

    pub fn starting_at(mut self, start_date: DateTime<Utc>) -> Self {
        self.start_date = Some(start_date);
        self
    }

    pub fn for_course(mut self, course_id: impl Into<String>) -> Self {
        self.course_id = Some(course_id.into());
        self
    }

    pub fn completed(mut self) -> Self {
        self.completed = true;
        self
    }
}

/// Partial update. Absent fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AssignmentPatch {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, alias = "courseId")]
    pub course_id: Option<String>,
    #[serde(default, alias = "startDate")]
    pub start_date: Option<DateTime<Utc>>,
    #[serde(default, alias = "dueDate")]
    pub due_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub status: Option<AssignmentStatus>,
}

/// A status change applied by a reconciliation pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusChange {
    pub id: AssignmentId,
    pub from: AssignmentStatus,
    pub to: AssignmentStatus,
}

/// Completion counts for one course.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CourseProgress {
    pub course_id: String,
    pub total: usize,
    pub completed: usize,
    pub ratio: f64,
}
