pub mod cleanup_service;
pub mod entry_service;
pub mod export_service;
pub mod settlement_service;
pub mod summary_service;

pub use cleanup_service::CleanupService;
pub use entry_service::EntryService;
pub use export_service::{ExportFormat, ExportService};
pub use settlement_service::SettlementService;
pub use summary_service::{ReportSummary, SummaryService};

use crate::errors::ReportError;

pub type ServiceResult<T> = Result<T, ServiceError>;

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error(transparent)]
    Report(#[from] ReportError),
    #[error("Validation failed: {0}")]
    Validation(String),
}
