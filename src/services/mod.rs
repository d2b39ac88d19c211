pub mod api_client;
pub mod planning;
pub mod retrieval;
pub mod schedule_view;
pub mod session;
pub mod upload;
