use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};

use crate::error::{LifecycleError, Result};
use crate::lifecycle::transition;
use crate::store::assignment::{
    Assignment, AssignmentId, AssignmentPatch, AssignmentStatus, CourseProgress, NewAssignment,
    StatusChange, TemplateId,
};
use crate::store::template::{NewTemplate, Template, TemplateInstance};

/// Arena of assignment records and templates addressed by stable ids.
///
/// The table is plain data: every method takes the caller's `now` and runs to
/// completion without locking. [`AssignmentStore`](crate::store::AssignmentStore)
/// wraps it in a lock and supplies the clock.
#[derive(Debug)]
pub struct AssignmentTable {
    assignments: BTreeMap<AssignmentId, Assignment>,
    templates: BTreeMap<TemplateId, Template>,
    next_assignment_id: u64,
    next_template_id: u64,
}

impl Default for AssignmentTable {
    fn default() -> Self {
        Self::new()
    }
}

impl AssignmentTable {
    pub fn new() -> Self {
        Self {
            assignments: BTreeMap::new(),
            templates: BTreeMap::new(),
            next_assignment_id: 1,
            next_template_id: 1,
        }
    }

    /// Validate a request, allocate an id and store the record with its
    /// initial status.
    pub fn create(&mut self, request: NewAssignment, now: DateTime<Utc>) -> Result<Assignment> {
        self.insert(request, None, now)
    }

    /// Create an assignment from a stored template.
    pub fn create_from_template(
        &mut self,
        template_id: TemplateId,
        instance: TemplateInstance,
        now: DateTime<Utc>,
    ) -> Result<Assignment> {
        let request = self
            .templates
            .get(&template_id)
            .ok_or(LifecycleError::TemplateNotFound(template_id))?
            .instantiate(instance);
        self.insert(request, Some(template_id), now)
    }

    fn insert(
        &mut self,
        request: NewAssignment,
        template_id: Option<TemplateId>,
        now: DateTime<Utc>,
    ) -> Result<Assignment> {
        let due_date = request
            .due_date
            .ok_or_else(|| LifecycleError::Validation("due_date is required".to_string()))?;

        let id = AssignmentId(self.next_assignment_id);
        self.next_assignment_id += 1;

        let mut assignment = Assignment {
            id,
            title: request.title,
            description: request.description,
            course_id: request.course_id,
            template_id,
            start_date: request.start_date,
            due_date,
            status: transition::initial_status(request.start_date, now),
            created_at: now,
            completed_at: None,
        };
        if request.completed {
            assignment.status = AssignmentStatus::Completed;
            assignment.completed_at = Some(now);
        }

        self.assignments.insert(id, assignment.clone());
        Ok(assignment)
    }

    /// Get an assignment by ID
    pub fn get(&self, id: AssignmentId) -> Option<&Assignment> {
        self.assignments.get(&id)
    }

    /// All assignments in id (creation) order
    pub fn all(&self) -> Vec<&Assignment> {
        self.assignments.values().collect()
    }

    /// Apply a patch.
    ///
    /// Time owns the draft→scheduled→open→closed timeline, so a status in the
    /// patch may only restate the current status or force `Completed`. Any
    /// other status, forward or backward, is an `InvalidTransition`.
    pub fn update(
        &mut self,
        id: AssignmentId,
        patch: AssignmentPatch,
        now: DateTime<Utc>,
    ) -> Result<Assignment> {
        let assignment = self
            .assignments
            .get_mut(&id)
            .ok_or(LifecycleError::NotFound(id))?;

        if let Some(to) = patch.status {
            let restated = to == assignment.status;
            if !restated && !to.is_terminal() {
                return Err(LifecycleError::InvalidTransition {
                    id,
                    from: assignment.status,
                    to,
                });
            }
        }

        if let Some(title) = patch.title {
            assignment.title = title;
        }
        if patch.description.is_some() {
            assignment.description = patch.description;
        }
        if patch.course_id.is_some() {
            assignment.course_id = patch.course_id;
        }
        if patch.start_date.is_some() {
            assignment.start_date = patch.start_date;
        }
        if let Some(due_date) = patch.due_date {
            assignment.due_date = due_date;
        }
        if let Some(to) = patch.status {
            if to == AssignmentStatus::Completed && assignment.completed_at.is_none() {
                assignment.completed_at = Some(now);
            }
            assignment.status = to;
        }

        Ok(assignment.clone())
    }

    /// Freeze an assignment at `Completed`. Completing twice keeps the first
    /// completion time.
    pub fn complete(&mut self, id: AssignmentId, now: DateTime<Utc>) -> Result<Assignment> {
        let assignment = self
            .assignments
            .get_mut(&id)
            .ok_or(LifecycleError::NotFound(id))?;
        if !assignment.status.is_terminal() {
            assignment.status = AssignmentStatus::Completed;
            assignment.completed_at = Some(now);
        }
        Ok(assignment.clone())
    }

    /// Re-evaluate one record against `now` and write the new status if time
    /// has moved it forward.
    ///
    /// Completed records are left alone, as are records created after `now`
    /// was sampled: their status already reflects a later instant.
    pub fn reconcile(
        &mut self,
        id: AssignmentId,
        now: DateTime<Utc>,
    ) -> Result<Option<StatusChange>> {
        let assignment = self
            .assignments
            .get_mut(&id)
            .ok_or(LifecycleError::NotFound(id))?;

        if assignment.status.is_terminal() || assignment.created_at > now {
            return Ok(None);
        }

        let from = assignment.status;
        match transition::advance(from, assignment.start_date, assignment.due_date, now) {
            Some(to) if from.can_move_to(to) && to != from => {
                assignment.status = to;
                Ok(Some(StatusChange { id, from, to }))
            }
            _ => Ok(None),
        }
    }

    /// Ids of records that a reconciliation pass may still move.
    pub fn reconcilable_ids(&self) -> Vec<AssignmentId> {
        self.assignments
            .values()
            .filter(|a| {
                matches!(
                    a.status,
                    AssignmentStatus::Draft | AssignmentStatus::Scheduled | AssignmentStatus::Open
                )
            })
            .map(|a| a.id)
            .collect()
    }

    /// Non-completed assignments, soonest due first.
    pub fn upcoming(&self, limit: usize) -> Vec<&Assignment> {
        let mut pending: Vec<&Assignment> = self
            .assignments
            .values()
            .filter(|a| !a.status.is_terminal())
            .collect();
        pending.sort_by_key(|a| (a.due_date, a.id));
        pending.truncate(limit);
        pending
    }

    /// Assignment titles grouped by the UTC day they are due.
    pub fn due_calendar(&self) -> BTreeMap<NaiveDate, Vec<String>> {
        let mut calendar: BTreeMap<NaiveDate, Vec<String>> = BTreeMap::new();
        for assignment in self.assignments.values() {
            calendar
                .entry(assignment.due_date.date_naive())
                .or_default()
                .push(assignment.title.clone());
        }
        calendar
    }

    pub fn course_progress(&self, course_id: &str) -> CourseProgress {
        let in_course: Vec<&Assignment> = self
            .assignments
            .values()
            .filter(|a| a.course_id.as_deref() == Some(course_id))
            .collect();
        let total = in_course.len();
        let completed = in_course
            .iter()
            .filter(|a| a.status.is_terminal())
            .count();

        CourseProgress {
            course_id: course_id.to_string(),
            total,
            completed,
            ratio: if total == 0 {
                0.0
            } else {
                completed as f64 / total as f64
            },
        }
    }

    pub fn create_template(&mut self, request: NewTemplate, now: DateTime<Utc>) -> Result<Template> {
        if request.title.trim().is_empty() {
            return Err(LifecycleError::Validation(
                "title must not be empty".to_string(),
            ));
        }
        let id = TemplateId(self.next_template_id);
        self.next_template_id += 1;

        let template = Template {
            id,
            title: request.title,
            description: request.description,
            created_at: now,
        };
        self.templates.insert(id, template.clone());
        Ok(template)
    }

    pub fn get_template(&self, id: TemplateId) -> Option<&Template> {
        self.templates.get(&id)
    }

    pub fn all_templates(&self) -> Vec<&Template> {
        self.templates.values().collect()
    }

    /// Returns the current number of assignments
    pub fn len(&self) -> usize {
        self.assignments.len()
    }

    /// Returns true if there are no assignments
    pub fn is_empty(&self) -> bool {
        self.assignments.is_empty()
    }
}
