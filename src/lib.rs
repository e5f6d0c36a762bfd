#![doc(test(attr(deny(warnings))))]

//! Expense Split walks a couple through choosing how to share expenses,
//! entering their incomes and purchases, and reading back who owes whom.
//!
//! The [`core::WizardController`] owns a session and derives every figure
//! through the distribution engine in [`core::services`]. Sessions persist
//! through any [`storage::KeyValueStore`]; the [`cli`] module drives the
//! wizard from a terminal.

pub mod api;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod errors;
pub mod format;
pub mod storage;
pub mod utils;

use std::sync::Once;

static INIT_TRACING: Once = Once::new();

/// Initializes global tracing and emits a startup info log.
pub fn init() {
    INIT_TRACING.call_once(|| {
        utils::init_tracing();
        tracing::info!("expense_split tracing initialized");
    });
}
