pub mod distribution_service;
pub mod purchase_service;
pub mod summary_service;

pub use distribution_service::{DistributedPurchase, DistributionService};
pub use purchase_service::{sort_for_display, PurchaseService};
pub use summary_service::{FinancialSummary, SummaryRow, SummaryService};

use crate::errors::SplitError;

pub type ServiceResult<T> = Result<T, ServiceError>;

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error(transparent)]
    Core(#[from] SplitError),
    #[error("{0}")]
    Invalid(String),
}
