use serde::{Deserialize, Serialize};

use super::{
    household::{Incomes, ParticipantNames, SplitMethod},
    purchase::PurchaseBook,
};

/// Everything a wizard session owns and persists.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionState {
    pub method: Option<SplitMethod>,
    pub incomes: Incomes,
    pub names: ParticipantNames,
    pub purchases: PurchaseBook,
}

impl SessionState {
    pub fn with_names(names: ParticipantNames) -> Self {
        Self {
            names,
            ..Self::default()
        }
    }

    /// A split method is chosen and the incomes allow a summary.
    pub fn is_ready_for_summary(&self) -> bool {
        self.method.is_some() && self.incomes.is_valid()
    }
}
