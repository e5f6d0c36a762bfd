#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Mutex;

use expense_split::core::{FixedClock, WizardController};
use expense_split::domain::{Participant, SplitMethod};
use once_cell::sync::Lazy;
use std::sync::Arc;
use tempfile::TempDir;

/// Holds TempDir guards so temporary folders live for the duration of the test run.
static TEST_DIRS: Lazy<Mutex<Vec<TempDir>>> = Lazy::new(|| Mutex::new(Vec::new()));

/// Fresh data directory that outlives the calling test.
pub fn temp_data_dir() -> PathBuf {
    let temp = TempDir::new().expect("create temp dir");
    let base = temp.path().to_path_buf();
    TEST_DIRS.lock().expect("lock temp dir registry").push(temp);
    base
}

pub fn fixed_clock() -> Arc<FixedClock> {
    Arc::new(FixedClock::at_millis(1_718_000_000_000))
}

/// Controller on the summary step with the given method and incomes.
pub fn wizard_at_summary(method: SplitMethod, person1: &str, person2: &str) -> WizardController {
    let mut wizard = WizardController::new().with_clock(fixed_clock());
    wizard.start().expect("start");
    wizard.set_method(method).expect("method");
    wizard.continue_to_incomes().expect("incomes step");
    wizard.set_income(Participant::Person1, person1).expect("income 1");
    wizard.set_income(Participant::Person2, person2).expect("income 2");
    wizard.view_summary().expect("summary");
    wizard.take_effects();
    wizard
}
