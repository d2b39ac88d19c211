//! Plan submission: pre-validates the request, sends it to the planner,
//! and on success installs the returned plan identifier and advances the
//! session to the schedule step.

use std::collections::HashSet;
use std::sync::Arc;

use serde_json::{json, Map as JsonMap};
use tracing::{info, warn};

use crate::error::{AppError, AppResult};
use crate::models::contract::{Constraint, Court, Group, PlanRequest, TimeWindow};
use crate::services::api_client::PlannerApi;
use crate::services::session::{Session, WorkflowStep};
use crate::utils::time;

const DEFAULT_REQUEST_PATH_ENV: &str = "COURTPLAN_DEFAULT_REQUEST_PATH";

const MIN_SLOT_MINUTES: u32 = 5;
const MAX_SLOT_MINUTES: u32 = 180;

/// The built-in request template the constraints form starts from.
/// Template data lives here rather than in any form code; an override can
/// be supplied as a JSON file via `COURTPLAN_DEFAULT_REQUEST_PATH`.
pub fn default_request() -> PlanRequest {
    PlanRequest {
        window: TimeWindow {
            date: "2025-10-04".into(),
            start_time: "09:30".into(),
            end_time: "17:00".into(),
        },
        courts: vec![
            Court {
                id: "c1".into(),
                name: "Hall 1".into(),
            },
            Court {
                id: "c2".into(),
                name: "Hall 2".into(),
            },
        ],
        groups: vec![
            Group {
                id: "g1".into(),
                name: "Men individual".into(),
                size: Some(20),
                tags: Some(vec!["men".into()]),
            },
            Group {
                id: "g2".into(),
                name: "Women individual".into(),
                size: Some(18),
                tags: Some(vec!["women".into()]),
            },
            Group {
                id: "g3".into(),
                name: "Mixed pairs".into(),
                size: Some(10),
                tags: Some(vec!["mixed".into()]),
            },
        ],
        slot_minutes: 15,
        parallel_limit: 2,
        constraints: vec![
            Constraint {
                group_id: Some("g1".into()),
                earliest_start: Some("10:00".into()),
                min_break_minutes: Some(5),
                ..Constraint::default()
            },
            Constraint {
                group_id: Some("g2".into()),
                latest_end: Some("16:00".into()),
                ..Constraint::default()
            },
            Constraint {
                group_id: Some("g3".into()),
                not_overlap_with: Some(vec!["g1".into(), "g2".into()]),
                ..Constraint::default()
            },
        ],
        options: JsonMap::new(),
    }
}

/// The template the session starts from: the override file when
/// configured, the built-in template otherwise.
pub fn load_default_request() -> AppResult<PlanRequest> {
    match std::env::var(DEFAULT_REQUEST_PATH_ENV) {
        Ok(path) if !path.trim().is_empty() => {
            let raw = std::fs::read_to_string(&path)?;
            let request = serde_json::from_str(&raw)?;
            info!(target: "app::planning", %path, "loaded request template override");
            Ok(request)
        }
        _ => Ok(default_request()),
    }
}

/// Checks the request against everything the client can verify locally
/// and returns a cleaned copy: no-op constraints are dropped, everything
/// else must hold or the whole request is rejected.
pub fn sanitize_request(request: &PlanRequest) -> AppResult<PlanRequest> {
    time::parse_date(&request.window.date)?;
    let start = time::parse_hhmm(&request.window.start_time)?;
    let end = time::parse_hhmm(&request.window.end_time)?;
    time::ensure_window(start, end)?;

    if !(MIN_SLOT_MINUTES..=MAX_SLOT_MINUTES).contains(&request.slot_minutes) {
        return Err(AppError::validation_with_details(
            format!(
                "slot duration must be between {MIN_SLOT_MINUTES} and {MAX_SLOT_MINUTES} minutes"
            ),
            json!({"slotMinutes": request.slot_minutes}),
        ));
    }

    if request.parallel_limit < 1 {
        return Err(AppError::validation("parallel limit must be at least 1"));
    }

    let mut court_ids = HashSet::new();
    for court in &request.courts {
        if !court_ids.insert(court.id.as_str()) {
            return Err(AppError::validation_with_details(
                format!("duplicate court id '{}'", court.id),
                json!({"courtId": court.id}),
            ));
        }
    }

    let mut group_ids = HashSet::new();
    for group in &request.groups {
        if !group_ids.insert(group.id.as_str()) {
            return Err(AppError::validation_with_details(
                format!("duplicate group id '{}'", group.id),
                json!({"groupId": group.id}),
            ));
        }
    }

    let mut constraints = Vec::with_capacity(request.constraints.len());
    for constraint in &request.constraints {
        if constraint.is_empty() {
            warn!(target: "app::planning", "dropping empty constraint");
            continue;
        }

        if let Some(group_id) = &constraint.group_id {
            if !group_ids.contains(group_id.as_str()) {
                return Err(AppError::validation_with_details(
                    format!("constraint references unknown group '{group_id}'"),
                    json!({"groupId": group_id}),
                ));
            }
        }
        if let Some(others) = &constraint.not_overlap_with {
            for other in others {
                if !group_ids.contains(other.as_str()) {
                    return Err(AppError::validation_with_details(
                        format!("constraint references unknown group '{other}'"),
                        json!({"groupId": other}),
                    ));
                }
            }
        }
        if let Some(earliest) = &constraint.earliest_start {
            time::parse_hhmm(earliest)?;
        }
        if let Some(latest) = &constraint.latest_end {
            time::parse_hhmm(latest)?;
        }

        constraints.push(constraint.clone());
    }

    Ok(PlanRequest {
        constraints,
        ..request.clone()
    })
}

pub struct PlanningService {
    api: Arc<dyn PlannerApi>,
    session: Session,
}

impl PlanningService {
    pub fn new(api: Arc<dyn PlannerApi>, session: Session) -> Self {
        Self { api, session }
    }

    /// Submits a plan request. While in flight the session's submitting
    /// flag is held by a guard, so it clears on success, failure, and
    /// early return alike. On success the returned plan identifier
    /// becomes the session's active plan and navigation advances to the
    /// schedule step; on failure the extracted message lands in session
    /// state and navigation stays where it was.
    pub async fn submit(&self, request: &PlanRequest) -> AppResult<String> {
        let _guard = self.session.begin_submit();

        match self.try_submit(request).await {
            Ok(plan_id) => {
                info!(target: "app::planning", plan_id = %plan_id, "plan submitted");
                Ok(plan_id)
            }
            Err(error) => {
                self.session.set_error(error.user_message());
                Err(error)
            }
        }
    }

    async fn try_submit(&self, request: &PlanRequest) -> AppResult<String> {
        let sanitized = sanitize_request(request)?;
        let response = self.api.submit_plan(&sanitized).await?;
        let plan_id = response.id.clone();

        self.session.set_active_plan(plan_id.clone());
        self.session.goto(WorkflowStep::Schedule)?;
        Ok(plan_id)
    }
}
