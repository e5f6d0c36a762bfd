pub mod schedule;
pub mod services;
pub mod time;
pub mod utils;
pub mod wizard;

pub use time::{Clock, FixedClock, SystemClock};
pub use wizard::{WizardController, WizardEffect, WizardError, WizardStep};
