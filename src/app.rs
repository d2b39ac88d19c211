//! Wires the gateway, session, and operations into one shared state
//! object handed to whatever front end drives the workflow.

use std::sync::Arc;

use crate::error::AppResult;
use crate::services::api_client::{ApiConfig, PlannerApi, PlannerClient};
use crate::services::planning::PlanningService;
use crate::services::retrieval::RetrievalService;
use crate::services::session::Session;
use crate::services::upload::UploadService;

#[derive(Clone)]
pub struct AppState {
    api: Arc<dyn PlannerApi>,
    session: Session,
    planning: Arc<PlanningService>,
    retrieval: RetrievalService,
    upload: UploadService,
}

impl AppState {
    pub fn new(config: &ApiConfig) -> AppResult<Self> {
        let api: Arc<dyn PlannerApi> = Arc::new(PlannerClient::new(config)?);
        Ok(Self::with_api(api))
    }

    /// Builds the state around any gateway implementation; tests inject
    /// mock gateways through this.
    pub fn with_api(api: Arc<dyn PlannerApi>) -> Self {
        let session = Session::new();
        let planning = Arc::new(PlanningService::new(Arc::clone(&api), session.clone()));
        let retrieval = RetrievalService::new(Arc::clone(&api), session.clone());
        let upload = UploadService::new(Arc::clone(&api));

        Self {
            api,
            session,
            planning,
            retrieval,
            upload,
        }
    }

    pub fn api(&self) -> Arc<dyn PlannerApi> {
        Arc::clone(&self.api)
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn planning(&self) -> &PlanningService {
        &self.planning
    }

    pub fn retrieval(&self) -> &RetrievalService {
        &self.retrieval
    }

    pub fn upload(&self) -> &UploadService {
        &self.upload
    }
}
