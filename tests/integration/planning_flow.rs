//! End-to-end workflow against a mocked planner service: upload, submit,
//! reactive retrieval, rendering.

use courtplan_client::app::AppState;
use courtplan_client::services::api_client::{ApiConfig, PlannerClient};
use courtplan_client::services::planning::default_request;
use courtplan_client::services::schedule_view::{self, ScheduleViewModel};
use courtplan_client::services::session::WorkflowStep;
use httpmock::prelude::*;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration as StdDuration;

fn state_for(server: &MockServer) -> AppState {
    let client =
        PlannerClient::new(&ApiConfig::with_base_url(server.base_url())).expect("client");
    AppState::with_api(Arc::new(client))
}

#[tokio::test(flavor = "multi_thread")]
async fn full_planning_session_produces_rendered_schedule() {
    let server = MockServer::start_async().await;

    let _upload = server
        .mock_async(|when, then| {
            when.method(POST).path("/upload");
            then.status(200)
                .header("content-type", "application/json")
                .json_body(json!({
                    "uploadId": "u-1",
                    "filename": "roster.xlsx",
                    "path": "/tmp/_upload_u-1_roster.xlsx"
                }));
        })
        .await;
    let _plan = server
        .mock_async(|when, then| {
            when.method(POST).path("/schedule/plan");
            then.status(200)
                .header("content-type", "application/json")
                .json_body(json!({"id": "p1", "date": "2025-10-04", "slots": []}));
        })
        .await;
    let _fetch = server
        .mock_async(|when, then| {
            when.method(GET).path("/schedule/p1");
            then.status(200)
                .header("content-type", "application/json")
                .json_body(json!({
                    "id": "p1",
                    "date": "2025-10-04",
                    "slots": [
                        {"start": "09:30", "end": "09:45", "courtId": "c1", "groupId": "g1"}
                    ]
                }));
        })
        .await;

    let state = state_for(&server);
    let watcher = state.retrieval().spawn_watcher();

    // schedule is unreachable until a plan exists
    assert!(state.session().goto(WorkflowStep::Schedule).is_err());

    state
        .session()
        .goto(WorkflowStep::Upload)
        .expect("upload step reachable");
    state
        .upload()
        .upload_bytes("roster.xlsx", b"fake-xlsx".to_vec())
        .await
        .expect("upload succeeds");
    assert_eq!(state.upload().status_line(), "uploaded: roster.xlsx");

    state
        .session()
        .goto(WorkflowStep::Constraints)
        .expect("constraints step reachable");
    let request = default_request();
    let plan_id = state
        .planning()
        .submit(&request)
        .await
        .expect("submission succeeds");
    assert_eq!(plan_id, "p1");
    assert_eq!(state.session().step(), WorkflowStep::Schedule);

    // the watcher reacts to the identifier change and fetches the plan
    wait_until(|| state.session().response().is_some()).await;

    let model = schedule_view::view_model(&state.session().snapshot(), Some(&request));
    match &model {
        ScheduleViewModel::Ready { date, rows } => {
            assert_eq!(date, "2025-10-04");
            assert_eq!(rows.len(), 1);
            assert_eq!(rows[0].time_range, "09:30\u{2014}09:45");
            assert_eq!(rows[0].court, "Hall 1");
            assert_eq!(rows[0].group, "Men individual");
        }
        other => panic!("expected a ready schedule, got {other:?}"),
    }

    watcher.abort();
}

#[tokio::test(flavor = "multi_thread")]
async fn empty_plan_renders_explicit_empty_state() {
    let server = MockServer::start_async().await;
    let _plan = server
        .mock_async(|when, then| {
            when.method(POST).path("/schedule/plan");
            then.status(200)
                .header("content-type", "application/json")
                .json_body(json!({"id": "p2", "date": "2025-10-04", "slots": []}));
        })
        .await;
    let _fetch = server
        .mock_async(|when, then| {
            when.method(GET).path("/schedule/p2");
            then.status(200)
                .header("content-type", "application/json")
                .json_body(json!({"id": "p2", "date": "2025-10-04", "slots": []}));
        })
        .await;

    let state = state_for(&server);
    state
        .planning()
        .submit(&default_request())
        .await
        .expect("submission succeeds");
    state.retrieval().refresh().await.expect("fetch succeeds");

    let model = schedule_view::view_model(&state.session().snapshot(), None);
    assert_eq!(
        model,
        ScheduleViewModel::Empty {
            date: "2025-10-04".into()
        }
    );
    let rendered = schedule_view::render_table(&model);
    assert!(rendered.contains("Schedule for 2025-10-04"));
    assert!(rendered.contains("Schedule is empty"));
}

#[tokio::test(flavor = "multi_thread")]
async fn rejected_submission_keeps_session_usable() {
    let server = MockServer::start_async().await;
    let _plan = server
        .mock_async(|when, then| {
            when.method(POST).path("/schedule/plan");
            then.status(422)
                .header("content-type", "application/json")
                .json_body(json!({"detail": "overlapping constraints unsatisfiable"}));
        })
        .await;

    let state = state_for(&server);
    state
        .planning()
        .submit(&default_request())
        .await
        .expect_err("submission rejected");

    assert_eq!(
        state.session().last_error(),
        Some("overlapping constraints unsatisfiable".to_string())
    );
    assert!(state.session().goto(WorkflowStep::Schedule).is_err());
    state
        .session()
        .goto(WorkflowStep::Upload)
        .expect("navigation survives the error");
}

async fn wait_until(mut condition: impl FnMut() -> bool) {
    for _ in 0..100 {
        if condition() {
            return;
        }
        tokio::time::sleep(StdDuration::from_millis(10)).await;
    }
    panic!("condition not reached within 1s");
}
