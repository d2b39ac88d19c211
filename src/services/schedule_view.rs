//! Presentation adapters: pure functions from a fetched plan to
//! display-ready rows. No session access, no I/O.

use std::collections::HashMap;

use crate::models::contract::{PlanRequest, PlanResponse};
use crate::services::session::SessionSnapshot;

/// One table row per slot, every column already formatted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleRow {
    pub time_range: String,
    pub court: String,
    pub group: String,
    pub item: String,
    pub judge: String,
    pub comment: String,
}

/// Display states of the schedule step.
#[derive(Debug, Clone, PartialEq)]
pub enum ScheduleViewModel {
    NoActivePlan,
    Loading,
    Failed(String),
    Empty { date: String },
    Ready { date: String, rows: Vec<ScheduleRow> },
}

/// Builds the court id -> label map. Labels come from the originating
/// request when one is available; the response itself only carries
/// identifiers, so without a request the mapping degrades to identity.
pub fn court_labels(
    request: Option<&PlanRequest>,
    response: &PlanResponse,
) -> HashMap<String, String> {
    match request {
        Some(request) => request
            .courts
            .iter()
            .map(|court| (court.id.clone(), court.name.clone()))
            .collect(),
        None => response
            .slots
            .iter()
            .map(|slot| (slot.court_id.clone(), slot.court_id.clone()))
            .collect(),
    }
}

pub fn group_labels(
    request: Option<&PlanRequest>,
    response: &PlanResponse,
) -> HashMap<String, String> {
    match request {
        Some(request) => request
            .groups
            .iter()
            .map(|group| (group.id.clone(), group.name.clone()))
            .collect(),
        None => response
            .slots
            .iter()
            .map(|slot| (slot.group_id.clone(), slot.group_id.clone()))
            .collect(),
    }
}

/// An id missing from the map renders as itself, never as an empty cell.
fn label_for<'a>(labels: &'a HashMap<String, String>, id: &'a str) -> &'a str {
    labels.get(id).map(String::as_str).unwrap_or(id)
}

pub fn rows(
    response: &PlanResponse,
    courts: &HashMap<String, String>,
    groups: &HashMap<String, String>,
) -> Vec<ScheduleRow> {
    response
        .slots
        .iter()
        .map(|slot| ScheduleRow {
            time_range: format!("{}\u{2014}{}", slot.start, slot.end),
            court: label_for(courts, &slot.court_id).to_string(),
            group: label_for(groups, &slot.group_id).to_string(),
            item: slot.item.clone().unwrap_or_default(),
            judge: slot.judge.clone().unwrap_or_default(),
            comment: slot.comment.clone().unwrap_or_default(),
        })
        .collect()
}

/// Maps session state to the schedule display state. Precedence follows
/// the view contract: no plan, then in-flight, then error, then data.
pub fn view_model(
    snapshot: &SessionSnapshot,
    request: Option<&PlanRequest>,
) -> ScheduleViewModel {
    if snapshot.plan_id.is_none() {
        return ScheduleViewModel::NoActivePlan;
    }
    if snapshot.fetching {
        return ScheduleViewModel::Loading;
    }
    if let Some(error) = &snapshot.error {
        return ScheduleViewModel::Failed(error.clone());
    }

    match &snapshot.response {
        None => ScheduleViewModel::Loading,
        Some(response) if response.slots.is_empty() => ScheduleViewModel::Empty {
            date: response.date.clone(),
        },
        Some(response) => {
            let courts = court_labels(request, response);
            let groups = group_labels(request, response);
            ScheduleViewModel::Ready {
                date: response.date.clone(),
                rows: rows(response, &courts, &groups),
            }
        }
    }
}

/// Plain-text rendering used by the terminal driver.
pub fn render_table(model: &ScheduleViewModel) -> String {
    match model {
        ScheduleViewModel::NoActivePlan => "No active plan".to_string(),
        ScheduleViewModel::Loading => "Loading...".to_string(),
        ScheduleViewModel::Failed(message) => format!("Error: {message}"),
        ScheduleViewModel::Empty { date } => {
            format!("Schedule for {date}\nSchedule is empty")
        }
        ScheduleViewModel::Ready { date, rows } => {
            let mut out = format!("Schedule for {date}\n");
            out.push_str("Time | Court | Group | Item | Judge | Comment\n");
            for row in rows {
                out.push_str(&format!(
                    "{} | {} | {} | {} | {} | {}\n",
                    row.time_range, row.court, row.group, row.item, row.judge, row.comment
                ));
            }
            out
        }
    }
}
