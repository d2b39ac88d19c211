//! Reactive plan retrieval.
//!
//! Retrieval is keyed on the session's active plan identifier, not on
//! navigation: a watcher subscribes to the plan watch channel and fetches
//! whenever the identifier changes, so a fresh submission and a revisit of
//! an existing plan are displayed the same way. Results are applied only
//! while their generation is current; an outdated in-flight fetch may
//! still resolve but its result is discarded.

use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::error::AppResult;
use crate::models::contract::PlanResponse;
use crate::services::api_client::PlannerApi;
use crate::services::session::Session;

#[derive(Clone)]
pub struct RetrievalService {
    api: Arc<dyn PlannerApi>,
    session: Session,
}

impl RetrievalService {
    pub fn new(api: Arc<dyn PlannerApi>, session: Session) -> Self {
        Self { api, session }
    }

    /// One generation-checked fetch of the current active plan, for
    /// callers that do not run the watcher. Returns `Ok(None)` when there
    /// is no active plan or the result arrived stale.
    pub async fn refresh(&self) -> AppResult<Option<PlanResponse>> {
        let Some(id) = self.session.plan_id() else {
            return Ok(None);
        };
        let generation = self.session.generation();
        self.fetch_into_session(&id, generation).await
    }

    /// Spawns the supervised watcher task. It runs for the lifetime of
    /// the session; abort the handle to stop it early.
    pub fn spawn_watcher(&self) -> JoinHandle<()> {
        let service = self.clone();
        tokio::spawn(async move { service.watch_loop().await })
    }

    async fn watch_loop(&self) {
        let mut rx = self.session.subscribe();
        loop {
            let target = rx.borrow_and_update().clone();
            if let Some(active) = target {
                debug!(
                    target: "app::retrieval",
                    plan_id = %active.id,
                    generation = active.generation,
                    "active plan changed, fetching"
                );
                if let Err(error) = self.fetch_into_session(&active.id, active.generation).await {
                    warn!(target: "app::retrieval", plan_id = %active.id, error = %error, "plan fetch failed");
                }
            }

            if rx.changed().await.is_err() {
                break;
            }
        }
    }

    async fn fetch_into_session(
        &self,
        id: &str,
        generation: u64,
    ) -> AppResult<Option<PlanResponse>> {
        if !self.session.begin_fetch(generation) {
            return Ok(None);
        }

        match self.api.get_plan(id).await {
            Ok(response) => {
                if self.session.complete_fetch(generation, response.clone()) {
                    Ok(Some(response))
                } else {
                    Ok(None)
                }
            }
            Err(error) => {
                self.session.fail_fetch(generation, error.user_message());
                Err(error)
            }
        }
    }
}
