//! Plain data types shared by the wizard, the distribution engine and the
//! persistence layer.

pub mod common;
pub mod household;
pub mod purchase;
pub mod session;
pub mod summary;

pub use common::Displayable;
pub use household::{Incomes, Participant, ParticipantNames, SplitMethod};
pub use purchase::{Purchase, PurchaseBook, PurchaseDraft, PurchaseId, PurchaseUpdate};
pub use session::SessionState;
pub use summary::{ParticipantAmounts, PaymentDifference};
