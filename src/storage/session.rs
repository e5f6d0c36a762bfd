//! Saving and restoring a [`SessionState`] through a [`KeyValueStore`].

use serde_json::Value;
use tracing::{info, warn};

use crate::core::services::PurchaseService;
use crate::domain::{Incomes, ParticipantNames, Purchase, PurchaseBook, SessionState, SplitMethod};
use crate::errors::Result;

use super::KeyValueStore;

pub const METHOD_KEY: &str = "method";
pub const INCOMES_KEY: &str = "incomes";
pub const NAMES_KEY: &str = "names";
pub const PURCHASES_KEY: &str = "purchases";

pub const SESSION_KEYS: [&str; 4] = [METHOD_KEY, INCOMES_KEY, NAMES_KEY, PURCHASES_KEY];

/// Outcome of a restore: which keys were applied and which were skipped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadReport {
    pub restored: Vec<&'static str>,
    pub warnings: Vec<String>,
}

impl LoadReport {
    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty()
    }

    pub fn restored_anything(&self) -> bool {
        !self.restored.is_empty()
    }
}

/// Writes all four session keys.
pub fn save(store: &mut dyn KeyValueStore, state: &SessionState) -> Result<()> {
    let method = state.method.map(SplitMethod::as_str).unwrap_or_default();
    let entries = [
        (METHOD_KEY, method.to_string()),
        (INCOMES_KEY, serde_json::to_string(&state.incomes)?),
        (NAMES_KEY, serde_json::to_string(&state.names)?),
        (PURCHASES_KEY, serde_json::to_string(&state.purchases)?),
    ];
    store.set_many(&entries)?;
    info!(purchases = state.purchases.len(), "session saved");
    Ok(())
}

/// Merges stored values into `state`.
///
/// Missing or empty keys keep the current value. A malformed value is
/// skipped and reported; it never aborts the rest of the load. Only a
/// failing store is an error.
pub fn restore(store: &dyn KeyValueStore, state: &mut SessionState) -> Result<LoadReport> {
    let mut report = LoadReport::default();

    if let Some(raw) = non_empty(store.get(METHOD_KEY)?) {
        match raw.parse::<SplitMethod>() {
            Ok(method) => {
                state.method = Some(method);
                report.restored.push(METHOD_KEY);
            }
            Err(err) => report.warnings.push(format!("{METHOD_KEY}: {err}")),
        }
    }
    if let Some(raw) = non_empty(store.get(INCOMES_KEY)?) {
        match serde_json::from_str::<Incomes>(&raw) {
            Ok(incomes) => {
                state.incomes = incomes;
                report.restored.push(INCOMES_KEY);
            }
            Err(err) => report.warnings.push(format!("{INCOMES_KEY}: {err}")),
        }
    }
    if let Some(raw) = non_empty(store.get(NAMES_KEY)?) {
        match serde_json::from_str::<ParticipantNames>(&raw) {
            Ok(names) => {
                state.names = names;
                report.restored.push(NAMES_KEY);
            }
            Err(err) => report.warnings.push(format!("{NAMES_KEY}: {err}")),
        }
    }
    if let Some(raw) = non_empty(store.get(PURCHASES_KEY)?) {
        match serde_json::from_str::<Vec<Value>>(&raw) {
            Ok(rows) => {
                state.purchases = restore_purchases(rows, &mut report.warnings);
                report.restored.push(PURCHASES_KEY);
            }
            Err(err) => report.warnings.push(format!("{PURCHASES_KEY}: {err}")),
        }
    }

    for warning in &report.warnings {
        warn!(%warning, "skipped malformed session value");
    }
    info!(
        restored = report.restored.len(),
        purchases = state.purchases.len(),
        "session restored"
    );
    Ok(report)
}

/// Keeps the rows that parse and pass purchase validation. Every other row
/// is dropped with a warning naming its position.
fn restore_purchases(rows: Vec<Value>, warnings: &mut Vec<String>) -> PurchaseBook {
    let mut purchases: Vec<Purchase> = Vec::with_capacity(rows.len());
    for (index, row) in rows.into_iter().enumerate() {
        let checked = serde_json::from_value::<Purchase>(row)
            .map_err(|err| err.to_string())
            .and_then(|purchase| {
                PurchaseService::validate(&purchase.draft())
                    .map(|()| purchase)
                    .map_err(|err| err.to_string())
            })
            .and_then(|purchase| {
                if purchases.iter().any(|kept| kept.id == purchase.id) {
                    Err(format!("duplicate id {}", purchase.id))
                } else {
                    Ok(purchase)
                }
            });
        match checked {
            Ok(purchase) => purchases.push(purchase),
            Err(reason) => warnings.push(format!("{PURCHASES_KEY}[{index}]: {reason}")),
        }
    }
    PurchaseBook::from_purchases(purchases)
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|raw| !raw.trim().is_empty())
}
