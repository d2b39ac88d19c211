//! Roster file upload.
//!
//! Fully independent of the plan request/response lifecycle: it produces a
//! human-readable status and an [`UploadDescriptor`], nothing more. The
//! descriptor is not merged into a pending plan request. Both input
//! modalities (picked path, raw bytes from drag-and-drop) converge on the
//! same underlying handler.

use std::path::Path;
use std::sync::{Arc, RwLock};

use tracing::{info, warn};

use crate::error::{AppError, AppResult};
use crate::models::contract::UploadDescriptor;
use crate::services::api_client::{PlannerApi, RosterFile};

/// UI-level filter only; the service is the source of truth for formats.
pub const SUPPORTED_ROSTER_EXTENSIONS: &[&str] = &["xlsx", "csv"];

pub fn is_supported_roster_extension(filename: &str) -> bool {
    filename
        .rsplit('.')
        .next()
        .map(|ext| {
            SUPPORTED_ROSTER_EXTENSIONS
                .iter()
                .any(|supported| ext.eq_ignore_ascii_case(supported))
        })
        .unwrap_or(false)
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum UploadPhase {
    #[default]
    Idle,
    Uploading,
    Uploaded {
        filename: String,
    },
    Failed {
        message: String,
    },
}

impl UploadPhase {
    pub fn status_line(&self) -> String {
        match self {
            UploadPhase::Idle => String::new(),
            UploadPhase::Uploading => "uploading...".to_string(),
            UploadPhase::Uploaded { filename } => format!("uploaded: {filename}"),
            UploadPhase::Failed { message } => format!("error: {message}"),
        }
    }
}

#[derive(Clone)]
pub struct UploadService {
    api: Arc<dyn PlannerApi>,
    phase: Arc<RwLock<UploadPhase>>,
}

impl UploadService {
    pub fn new(api: Arc<dyn PlannerApi>) -> Self {
        Self {
            api,
            phase: Arc::new(RwLock::new(UploadPhase::Idle)),
        }
    }

    pub fn phase(&self) -> UploadPhase {
        self.phase.read().expect("upload lock poisoned").clone()
    }

    pub fn status_line(&self) -> String {
        self.phase().status_line()
    }

    /// File-picker modality: reads the file and uploads it.
    pub async fn upload_path(&self, path: &Path) -> AppResult<UploadDescriptor> {
        let filename = path
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(|| AppError::validation("path has no usable file name"))?
            .to_string();
        let bytes = tokio::fs::read(path).await?;

        self.upload(RosterFile::new(filename, bytes)).await
    }

    /// Drag-and-drop modality: the caller already holds the bytes.
    pub async fn upload_bytes(
        &self,
        filename: impl Into<String>,
        bytes: Vec<u8>,
    ) -> AppResult<UploadDescriptor> {
        self.upload(RosterFile::new(filename, bytes)).await
    }

    async fn upload(&self, file: RosterFile) -> AppResult<UploadDescriptor> {
        if !is_supported_roster_extension(&file.filename) {
            warn!(
                target: "app::upload",
                filename = %file.filename,
                "filename is outside the xlsx/csv filter, uploading anyway"
            );
        }

        self.set_phase(UploadPhase::Uploading);

        match self.api.upload_file(file).await {
            Ok(descriptor) => {
                info!(
                    target: "app::upload",
                    upload_id = %descriptor.upload_id,
                    filename = %descriptor.filename,
                    "roster uploaded"
                );
                self.set_phase(UploadPhase::Uploaded {
                    filename: descriptor.filename.clone(),
                });
                Ok(descriptor)
            }
            Err(error) => {
                self.set_phase(UploadPhase::Failed {
                    message: error.user_message(),
                });
                Err(error)
            }
        }
    }

    fn set_phase(&self, phase: UploadPhase) {
        let mut guard = self.phase.write().expect("upload lock poisoned");
        *guard = phase;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extension_filter_matches_case_insensitively() {
        assert!(is_supported_roster_extension("roster.xlsx"));
        assert!(is_supported_roster_extension("roster.XLSX"));
        assert!(is_supported_roster_extension("roster.csv"));
        assert!(!is_supported_roster_extension("roster.docx"));
        assert!(!is_supported_roster_extension("roster"));
    }

    #[test]
    fn test_status_lines_match_display_contract() {
        assert_eq!(UploadPhase::Idle.status_line(), "");
        assert_eq!(UploadPhase::Uploading.status_line(), "uploading...");
        assert_eq!(
            UploadPhase::Uploaded {
                filename: "roster.xlsx".into()
            }
            .status_line(),
            "uploaded: roster.xlsx"
        );
        assert_eq!(
            UploadPhase::Failed {
                message: "bad format".into()
            }
            .status_line(),
            "error: bad format"
        );
    }
}
