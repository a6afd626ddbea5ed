use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::store::assignment::{NewAssignment, TemplateId};

/// Reusable assignment payload. Templates carry no lifecycle of their own.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Template {
    pub id: TemplateId,
    pub title: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewTemplate {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// Scheduling fields supplied when an assignment is stamped out of a template.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TemplateInstance {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default, alias = "courseId")]
    pub course_id: Option<String>,
    #[serde(default, alias = "startDate")]
    pub start_date: Option<DateTime<Utc>>,
    #[serde(default, alias = "dueDate")]
    pub due_date: Option<DateTime<Utc>>,
}

impl Template {
    /// Build a creation request from this template, letting the instance
    /// override the title.
    pub fn instantiate(&self, instance: TemplateInstance) -> NewAssignment {
        NewAssignment {
            title: instance.title.unwrap_or_else(|| self.title.clone()),
            description: self.description.clone(),
            course_id: instance.course_id,
            start_date: instance.start_date,
            due_date: instance.due_date,
            completed: false,
        }
    }
}
