use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use tokio::sync::RwLock;

use crate::clock::Clock;
use crate::error::{LifecycleError, Result};
use crate::store::assignment::{
    Assignment, AssignmentId, AssignmentPatch, CourseProgress, NewAssignment, StatusChange,
    TemplateId,
};
use crate::store::table::AssignmentTable;
use crate::store::template::{NewTemplate, Template, TemplateInstance};

/// Shared handle to the assignment table.
///
/// Cloning is cheap; every clone sees the same records. The request layer and
/// the [`LifecycleScheduler`](crate::lifecycle::LifecycleScheduler) are both
/// handed a clone at construction. Each method holds the lock for a single
/// record operation, so a running reconciliation pass never starves
/// foreground calls.
#[derive(Debug, Clone)]
pub struct AssignmentStore {
    table: Arc<RwLock<AssignmentTable>>,
    clock: Arc<dyn Clock>,
}

impl AssignmentStore {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            table: Arc::new(RwLock::new(AssignmentTable::new())),
            clock,
        }
    }

    /// Current reading of the injected clock.
    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Create an assignment. The initial status is computed from the clock
    /// reading taken inside the write lock.
    pub async fn create(&self, request: NewAssignment) -> Result<Assignment> {
        let mut table = self.table.write().await;
        let assignment = table.create(request, self.clock.now())?;
        tracing::debug!(
            assignment_id = %assignment.id,
            status = %assignment.status,
            due_date = %assignment.due_date,
            "Assignment created"
        );
        Ok(assignment)
    }

    pub async fn create_from_template(
        &self,
        template_id: TemplateId,
        instance: TemplateInstance,
    ) -> Result<Assignment> {
        let mut table = self.table.write().await;
        let assignment = table.create_from_template(template_id, instance, self.clock.now())?;
        tracing::debug!(
            assignment_id = %assignment.id,
            template_id = %template_id,
            status = %assignment.status,
            "Assignment created from template"
        );
        Ok(assignment)
    }

    pub async fn get(&self, id: AssignmentId) -> Result<Assignment> {
        self.table
            .read()
            .await
            .get(id)
            .cloned()
            .ok_or(LifecycleError::NotFound(id))
    }

    /// Snapshot of every assignment, ordered by id.
    pub async fn list(&self) -> Vec<Assignment> {
        self.table.read().await.all().into_iter().cloned().collect()
    }

    pub async fn update(&self, id: AssignmentId, patch: AssignmentPatch) -> Result<Assignment> {
        let mut table = self.table.write().await;
        let assignment = table.update(id, patch, self.clock.now())?;
        tracing::debug!(assignment_id = %id, status = %assignment.status, "Assignment updated");
        Ok(assignment)
    }

    pub(crate) async fn complete(&self, id: AssignmentId) -> Result<Assignment> {
        let mut table = self.table.write().await;
        table.complete(id, self.clock.now())
    }

    /// Atomically re-evaluate one record against a sampled `now`.
    pub(crate) async fn reconcile(
        &self,
        id: AssignmentId,
        now: DateTime<Utc>,
    ) -> Result<Option<StatusChange>> {
        self.table.write().await.reconcile(id, now)
    }

    pub(crate) async fn reconcilable_ids(&self) -> Vec<AssignmentId> {
        self.table.read().await.reconcilable_ids()
    }

    pub async fn upcoming(&self, limit: usize) -> Vec<Assignment> {
        self.table
            .read()
            .await
            .upcoming(limit)
            .into_iter()
            .cloned()
            .collect()
    }

    pub async fn due_calendar(&self) -> BTreeMap<NaiveDate, Vec<String>> {
        self.table.read().await.due_calendar()
    }

    pub async fn course_progress(&self, course_id: &str) -> CourseProgress {
        self.table.read().await.course_progress(course_id)
    }

    pub async fn create_template(&self, request: NewTemplate) -> Result<Template> {
        let mut table = self.table.write().await;
        let template = table.create_template(request, self.clock.now())?;
        tracing::debug!(template_id = %template.id, "Template created");
        Ok(template)
    }

    pub async fn get_template(&self, id: TemplateId) -> Result<Template> {
        self.table
            .read()
            .await
            .get_template(id)
            .cloned()
            .ok_or(LifecycleError::TemplateNotFound(id))
    }

    pub async fn list_templates(&self) -> Vec<Template> {
        self.table
            .read()
            .await
            .all_templates()
            .into_iter()
            .cloned()
            .collect()
    }

    pub async fn len(&self) -> usize {
        self.table.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.table.read().await.is_empty()
    }
}
