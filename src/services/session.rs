//! Session state for the planning workflow.
//!
//! The session is an explicit shared object, never ambient global state.
//! It tracks the current navigation step, the active plan identifier, the
//! last fetched schedule and the last error, and notifies observers when
//! the active plan changes. Each field is mutated only by the operation
//! that owns the corresponding transition.

use std::fmt;
use std::sync::{Arc, RwLock};

use tokio::sync::watch;
use tracing::debug;

use crate::error::{AppError, AppResult};
use crate::models::contract::PlanResponse;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WorkflowStep {
    #[default]
    Dashboard,
    Upload,
    Constraints,
    Schedule,
}

impl WorkflowStep {
    pub fn as_str(self) -> &'static str {
        match self {
            WorkflowStep::Dashboard => "dashboard",
            WorkflowStep::Upload => "upload",
            WorkflowStep::Constraints => "constraints",
            WorkflowStep::Schedule => "schedule",
        }
    }
}

impl fmt::Display for WorkflowStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Value carried on the plan watch channel: the active identifier plus the
/// generation at which it was set. Retrieval applies a fetched response
/// only while its generation is still current, so a stale in-flight fetch
/// can complete but never overwrite newer state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivePlan {
    pub id: String,
    pub generation: u64,
}

#[derive(Debug, Default)]
struct SessionState {
    step: WorkflowStep,
    plan_id: Option<String>,
    generation: u64,
    response: Option<PlanResponse>,
    error: Option<String>,
    submitting: bool,
    fetching: bool,
}

/// Read-only copy of the session for rendering.
#[derive(Debug, Clone, Default)]
pub struct SessionSnapshot {
    pub step: WorkflowStep,
    pub plan_id: Option<String>,
    pub response: Option<PlanResponse>,
    pub error: Option<String>,
    pub submitting: bool,
    pub fetching: bool,
}

#[derive(Clone)]
pub struct Session {
    state: Arc<RwLock<SessionState>>,
    plan_tx: Arc<watch::Sender<Option<ActivePlan>>>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    pub fn new() -> Self {
        let (plan_tx, _plan_rx) = watch::channel(None);
        Self {
            state: Arc::new(RwLock::new(SessionState::default())),
            plan_tx: Arc::new(plan_tx),
        }
    }

    pub fn step(&self) -> WorkflowStep {
        self.state.read().expect("session lock poisoned").step
    }

    /// The `schedule` step is gated on an active plan identifier; the
    /// other three steps are freely reachable at any time.
    pub fn can_enter(&self, step: WorkflowStep) -> bool {
        match step {
            WorkflowStep::Schedule => self
                .state
                .read()
                .expect("session lock poisoned")
                .plan_id
                .is_some(),
            _ => true,
        }
    }

    pub fn goto(&self, step: WorkflowStep) -> AppResult<WorkflowStep> {
        let mut state = self.state.write().expect("session lock poisoned");
        if step == WorkflowStep::Schedule && state.plan_id.is_none() {
            return Err(AppError::validation(
                "the schedule step requires an active plan",
            ));
        }

        debug!(target: "app::session", from = %state.step, to = %step, "navigating");
        state.step = step;
        Ok(step)
    }

    pub fn plan_id(&self) -> Option<String> {
        self.state
            .read()
            .expect("session lock poisoned")
            .plan_id
            .clone()
    }

    pub fn generation(&self) -> u64 {
        self.state.read().expect("session lock poisoned").generation
    }

    /// Installs a new active plan identifier. Bumps the generation, clears
    /// any response belonging to the previous identifier, and notifies
    /// watchers.
    pub fn set_active_plan(&self, id: impl Into<String>) -> ActivePlan {
        let id = id.into();
        let active = {
            let mut state = self.state.write().expect("session lock poisoned");
            state.generation += 1;
            state.plan_id = Some(id.clone());
            state.response = None;
            state.error = None;
            debug!(target: "app::session", plan_id = %id, generation = state.generation, "active plan set");
            ActivePlan {
                id,
                generation: state.generation,
            }
        };

        self.plan_tx.send_replace(Some(active.clone()));
        active
    }

    /// Drops the active plan. Watchers see `None` and stop fetching; the
    /// schedule display falls back to its "no active plan" state.
    pub fn clear_active_plan(&self) {
        {
            let mut state = self.state.write().expect("session lock poisoned");
            state.generation += 1;
            state.plan_id = None;
            state.response = None;
            debug!(target: "app::session", generation = state.generation, "active plan cleared");
        }

        self.plan_tx.send_replace(None);
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<ActivePlan>> {
        self.plan_tx.subscribe()
    }

    pub fn response(&self) -> Option<PlanResponse> {
        self.state
            .read()
            .expect("session lock poisoned")
            .response
            .clone()
    }

    pub fn last_error(&self) -> Option<String> {
        self.state
            .read()
            .expect("session lock poisoned")
            .error
            .clone()
    }

    pub fn set_error(&self, message: impl Into<String>) {
        let mut state = self.state.write().expect("session lock poisoned");
        state.error = Some(message.into());
    }

    pub fn is_submitting(&self) -> bool {
        self.state.read().expect("session lock poisoned").submitting
    }

    pub fn is_fetching(&self) -> bool {
        self.state.read().expect("session lock poisoned").fetching
    }

    /// Marks a submission in flight and clears any prior error. The
    /// returned guard drops the flag on every exit path.
    pub fn begin_submit(&self) -> SubmitGuard {
        {
            let mut state = self.state.write().expect("session lock poisoned");
            state.submitting = true;
            state.error = None;
        }
        SubmitGuard {
            session: self.clone(),
        }
    }

    /// Starts a fetch for the given generation. Clears the displayed
    /// response so stale data is never shown under a new identifier.
    /// Returns false when the generation has already moved on.
    pub fn begin_fetch(&self, generation: u64) -> bool {
        let mut state = self.state.write().expect("session lock poisoned");
        if state.generation != generation {
            return false;
        }
        state.fetching = true;
        state.response = None;
        state.error = None;
        true
    }

    /// Applies a fetched response if its generation is still current;
    /// a stale result is discarded untouched.
    pub fn complete_fetch(&self, generation: u64, response: PlanResponse) -> bool {
        let mut state = self.state.write().expect("session lock poisoned");
        if state.generation != generation {
            debug!(
                target: "app::session",
                stale = generation,
                current = state.generation,
                "discarding stale plan response"
            );
            return false;
        }
        state.response = Some(response);
        state.fetching = false;
        true
    }

    pub fn fail_fetch(&self, generation: u64, message: impl Into<String>) -> bool {
        let mut state = self.state.write().expect("session lock poisoned");
        if state.generation != generation {
            return false;
        }
        state.error = Some(message.into());
        state.response = None;
        state.fetching = false;
        true
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        let state = self.state.read().expect("session lock poisoned");
        SessionSnapshot {
            step: state.step,
            plan_id: state.plan_id.clone(),
            response: state.response.clone(),
            error: state.error.clone(),
            submitting: state.submitting,
            fetching: state.fetching,
        }
    }

    fn end_submit(&self) {
        let mut state = self.state.write().expect("session lock poisoned");
        state.submitting = false;
    }
}

/// Scoped acquisition of the submitting flag.
pub struct SubmitGuard {
    session: Session,
}

impl Drop for SubmitGuard {
    fn drop(&mut self) {
        self.session.end_submit();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schedule_step_is_gated_until_plan_exists() {
        let session = Session::new();
        assert_eq!(session.step(), WorkflowStep::Dashboard);
        assert!(!session.can_enter(WorkflowStep::Schedule));
        assert!(session.goto(WorkflowStep::Schedule).is_err());

        session.goto(WorkflowStep::Upload).expect("free navigation");
        session
            .goto(WorkflowStep::Constraints)
            .expect("free navigation");
        session
            .goto(WorkflowStep::Dashboard)
            .expect("free navigation");

        session.set_active_plan("p1");
        assert!(session.can_enter(WorkflowStep::Schedule));
        session.goto(WorkflowStep::Schedule).expect("gate is open");
        assert_eq!(session.step(), WorkflowStep::Schedule);
    }

    #[test]
    fn test_setting_plan_bumps_generation_and_clears_response() {
        let session = Session::new();
        let first = session.set_active_plan("p1");
        assert!(session.begin_fetch(first.generation));
        assert!(session.complete_fetch(
            first.generation,
            PlanResponse {
                id: "p1".into(),
                date: "2025-10-04".into(),
                slots: vec![],
            },
        ));
        assert!(session.response().is_some());

        let second = session.set_active_plan("p2");
        assert!(second.generation > first.generation);
        assert!(session.response().is_none(), "old response must be cleared");
    }

    #[test]
    fn test_stale_fetch_result_is_discarded() {
        let session = Session::new();
        let first = session.set_active_plan("p1");
        assert!(session.begin_fetch(first.generation));

        // identifier moves on while the fetch is in flight
        session.set_active_plan("p2");

        let stale = PlanResponse {
            id: "p1".into(),
            date: "2025-10-04".into(),
            slots: vec![],
        };
        assert!(!session.complete_fetch(first.generation, stale));
        assert!(session.response().is_none());
        assert!(!session.fail_fetch(first.generation, "late failure"));
        assert!(session.last_error().is_none());
    }

    #[test]
    fn test_submit_guard_clears_flag_on_drop() {
        let session = Session::new();
        {
            let _guard = session.begin_submit();
            assert!(session.is_submitting());
        }
        assert!(!session.is_submitting());
    }

    #[test]
    fn test_clear_active_plan_notifies_watchers() {
        let session = Session::new();
        let mut rx = session.subscribe();
        session.set_active_plan("p1");
        assert!(rx.has_changed().expect("channel alive"));
        assert_eq!(
            rx.borrow_and_update().as_ref().map(|p| p.id.clone()),
            Some("p1".to_string())
        );

        session.clear_active_plan();
        assert!(rx.has_changed().expect("channel alive"));
        assert!(rx.borrow_and_update().is_none());
    }
}
