//! Course entitlement checks.
//!
//! Purchases live in the payment system; the engine only asks whether a
//! learner may open a course at all.

use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::RwLock;

use curriculum::CourseId;

/// Trait for answering "does this learner hold course X".
#[async_trait]
pub trait EntitlementCheck: Send + Sync {
    async fn has_entitlement(&self, learner_id: &str, course_id: &CourseId) -> bool;
}

/// Entitlements from a fixed grant list.
///
/// Used in tests and for courses handed out outside the payment flow.
pub struct StaticEntitlements {
    grants: Arc<RwLock<HashSet<(String, CourseId)>>>,
    open_courses: Arc<RwLock<HashSet<CourseId>>>,
}

impl StaticEntitlements {
    pub fn new() -> Self {
        Self {
            grants: Arc::new(RwLock::new(HashSet::new())),
            open_courses: Arc::new(RwLock::new(HashSet::new())),
        }
    }

    /// Grant one learner access to one course.
    pub async fn grant(&self, learner_id: impl Into<String>, course_id: impl Into<CourseId>) {
        let mut grants = self.grants.write().await;
        grants.insert((learner_id.into(), course_id.into()));
    }

    /// Withdraw a grant.
    pub async fn revoke(&self, learner_id: &str, course_id: &CourseId) -> bool {
        let mut grants = self.grants.write().await;
        grants.remove(&(learner_id.to_string(), course_id.clone()))
    }

    /// Make a course available to every learner.
    pub async fn open_course(&self, course_id: impl Into<CourseId>) {
        let mut open = self.open_courses.write().await;
        open.insert(course_id.into());
    }
}

impl Default for StaticEntitlements {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EntitlementCheck for StaticEntitlements {
    async fn has_entitlement(&self, learner_id: &str, course_id: &CourseId) -> bool {
        if self.open_courses.read().await.contains(course_id) {
            return true;
        }
        let grants = self.grants.read().await;
        grants.contains(&(learner_id.to_string(), course_id.clone()))
    }
}
