//! Purchase record endpoint.
//!
//! Mirrors the `/api/purchases` REST contract: `POST` stores a record and
//! answers 201, `GET` lists records with their buyer, and any failure is
//! reported as a 500 carrying a fixed message. Records live apart from the
//! wizard session and are never synchronised with it.

pub mod records;

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{error, info};
use uuid::Uuid;

use crate::domain::purchase::parse_date;
use crate::errors::SplitError;

pub use records::{Buyer, PurchaseRecord, PurchaseRecordWithBuyer, RecordStore};

pub const STATUS_OK: u16 = 200;
pub const STATUS_CREATED: u16 = 201;
pub const STATUS_SERVER_ERROR: u16 = 500;

/// Failures are opaque; the cause only reaches the log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    #[error("Error creating purchase")]
    Create,
    #[error("Error fetching purchases")]
    Fetch,
    #[error("Error registering buyer")]
    RegisterBuyer,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePurchaseRequest {
    pub description: String,
    pub amount: f64,
    pub installments: u32,
    #[serde(default)]
    pub paid_installments: u32,
    /// `YYYY-MM-DD`, or a full timestamp whose date part is kept.
    pub first_payment_date: String,
    pub buyer_id: Uuid,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: String,
}

impl ApiResponse {
    fn json(status: u16, value: &impl Serialize) -> Self {
        match serde_json::to_string(value) {
            Ok(body) => Self { status, body },
            Err(err) => {
                error!(error = %err, "failed to encode response");
                Self {
                    status: STATUS_SERVER_ERROR,
                    body: json!({ "error": "Internal error" }).to_string(),
                }
            }
        }
    }

    fn failure(err: ApiError) -> Self {
        Self {
            status: STATUS_SERVER_ERROR,
            body: json!({ "error": err.to_string() }).to_string(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

pub struct PurchaseApi {
    store: RecordStore,
}

impl PurchaseApi {
    pub fn new(store: RecordStore) -> Self {
        Self { store }
    }

    pub fn register_buyer(&self, name: &str) -> Result<Buyer, ApiError> {
        let name = name.trim();
        if name.is_empty() {
            error!("buyer name is empty");
            return Err(ApiError::RegisterBuyer);
        }
        let buyer = Buyer {
            id: Uuid::new_v4(),
            name: name.to_string(),
        };
        self.store.insert_buyer(buyer.clone()).map_err(|err| {
            error!(error = %err, "failed to store buyer");
            ApiError::RegisterBuyer
        })?;
        info!(buyer = %buyer.id, "buyer registered");
        Ok(buyer)
    }

    pub fn list_buyers(&self) -> Result<Vec<Buyer>, ApiError> {
        self.store.buyers().map_err(|err| {
            error!(error = %err, "failed to read buyers");
            ApiError::Fetch
        })
    }

    pub fn create_purchase(
        &self,
        request: CreatePurchaseRequest,
    ) -> Result<PurchaseRecord, ApiError> {
        let record = self.build_record(request).map_err(|err| {
            error!(error = %err, "rejected purchase record");
            ApiError::Create
        })?;
        self.store.insert_purchase(record.clone()).map_err(|err| {
            error!(error = %err, "failed to store purchase record");
            ApiError::Create
        })?;
        info!(record = %record.id, "purchase record created");
        Ok(record)
    }

    pub fn list_purchases(&self) -> Result<Vec<PurchaseRecordWithBuyer>, ApiError> {
        let fetch_failed = |err: SplitError| {
            error!(error = %err, "failed to read purchase records");
            ApiError::Fetch
        };
        let buyers = self.store.buyers().map_err(fetch_failed)?;
        let purchases = self.store.purchases().map_err(fetch_failed)?;
        Ok(purchases
            .into_iter()
            .map(|record| {
                let buyer = buyers.iter().find(|buyer| buyer.id == record.buyer_id).cloned();
                PurchaseRecordWithBuyer { record, buyer }
            })
            .collect())
    }

    /// `POST /api/purchases`
    pub fn post_purchases(&self, body: &str) -> ApiResponse {
        let request = match serde_json::from_str::<CreatePurchaseRequest>(body) {
            Ok(request) => request,
            Err(err) => {
                error!(error = %err, "malformed purchase body");
                return ApiResponse::failure(ApiError::Create);
            }
        };
        match self.create_purchase(request) {
            Ok(record) => ApiResponse::json(STATUS_CREATED, &record),
            Err(err) => ApiResponse::failure(err),
        }
    }

    /// `GET /api/purchases`
    pub fn get_purchases(&self) -> ApiResponse {
        match self.list_purchases() {
            Ok(records) => ApiResponse::json(STATUS_OK, &records),
            Err(err) => ApiResponse::failure(err),
        }
    }

    fn build_record(&self, request: CreatePurchaseRequest) -> Result<PurchaseRecord, SplitError> {
        if request.description.trim().is_empty() {
            return Err(SplitError::InvalidInput("description is empty".into()));
        }
        if !request.amount.is_finite() || request.amount < 0.0 {
            return Err(SplitError::InvalidInput("amount must be non-negative".into()));
        }
        if request.installments == 0 || request.paid_installments > request.installments {
            return Err(SplitError::InvalidInput(
                "installment counts are inconsistent".into(),
            ));
        }
        if self.store.buyer(request.buyer_id)?.is_none() {
            return Err(SplitError::InvalidInput(format!(
                "unknown buyer {}",
                request.buyer_id
            )));
        }
        let first_payment_date = parse_request_date(&request.first_payment_date)?;
        Ok(PurchaseRecord {
            id: Uuid::new_v4(),
            description: request.description,
            amount: request.amount,
            installments: request.installments,
            paid_installments: request.paid_installments,
            first_payment_date,
            buyer_id: request.buyer_id,
            created_at: Utc::now(),
        })
    }
}

fn parse_request_date(raw: &str) -> Result<NaiveDate, SplitError> {
    let raw = raw.trim();
    parse_date(raw.get(..10).unwrap_or(raw))
}
