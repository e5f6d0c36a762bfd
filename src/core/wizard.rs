//! Step sequencing for the expense wizard.
//!
//! The controller owns the whole session: current step, split method,
//! incomes, names, the purchase list and the purchase-entry form. Readers
//! get derived figures through the distribution engine; writers go through
//! the purchase service. Side effects are queued as [`WizardEffect`]s for the
//! caller to act on.

use std::{fmt, sync::Arc};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::schedule;
use crate::core::services::{
    DistributedPurchase, DistributionService, FinancialSummary, PurchaseService, ServiceError,
    SummaryService,
};
use crate::core::time::{Clock, SystemClock};
use crate::domain::{
    Incomes, Participant, ParticipantAmounts, ParticipantNames, PaymentDifference, Purchase,
    PurchaseDraft, PurchaseId, PurchaseUpdate, SessionState, SplitMethod,
};
use crate::errors::SplitError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WizardStep {
    Welcome,
    MethodSelection,
    IncomeRegistration,
    PurchaseEntry,
    Summary,
}

impl WizardStep {
    pub fn number(self) -> u8 {
        match self {
            WizardStep::Welcome => 1,
            WizardStep::MethodSelection => 2,
            WizardStep::IncomeRegistration => 3,
            WizardStep::PurchaseEntry => 4,
            WizardStep::Summary => 5,
        }
    }

    pub fn from_number(number: u8) -> Option<Self> {
        match number {
            1 => Some(WizardStep::Welcome),
            2 => Some(WizardStep::MethodSelection),
            3 => Some(WizardStep::IncomeRegistration),
            4 => Some(WizardStep::PurchaseEntry),
            5 => Some(WizardStep::Summary),
            _ => None,
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            WizardStep::Welcome => "Welcome",
            WizardStep::MethodSelection => "Split method",
            WizardStep::IncomeRegistration => "Incomes",
            WizardStep::PurchaseEntry => "Purchase",
            WizardStep::Summary => "Summary",
        }
    }

    /// Steps reachable in one move from `self`.
    pub fn targets(self) -> &'static [WizardStep] {
        match self {
            WizardStep::Welcome => &[WizardStep::MethodSelection, WizardStep::Summary],
            WizardStep::MethodSelection => &[WizardStep::IncomeRegistration],
            WizardStep::IncomeRegistration => &[WizardStep::Summary],
            WizardStep::PurchaseEntry => &[WizardStep::Summary],
            WizardStep::Summary => &[
                WizardStep::PurchaseEntry,
                WizardStep::IncomeRegistration,
                WizardStep::MethodSelection,
            ],
        }
    }

    pub fn can_move_to(self, target: WizardStep) -> bool {
        self.targets().contains(&target)
    }
}

impl fmt::Display for WizardStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}/5)", self.title(), self.number())
    }
}

/// Side effects requested by the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WizardEffect {
    /// Persisted state (method, incomes, names, purchases) changed.
    StateChanged,
    /// A method was chosen or a purchase saved.
    Celebrate,
}

#[derive(Debug, thiserror::Error)]
pub enum WizardError {
    #[error("cannot go from {from} to {to}")]
    InvalidTransition { from: WizardStep, to: WizardStep },
    #[error("choose a split method first")]
    MethodRequired,
    #[error("enter both incomes (their sum must be greater than zero) first")]
    IncomesRequired,
    #[error("only available on the {expected} step (currently on {actual})")]
    WrongStep {
        expected: WizardStep,
        actual: WizardStep,
    },
    #[error(transparent)]
    Service(#[from] ServiceError),
    #[error(transparent)]
    Core(#[from] SplitError),
}

pub type WizardResult<T> = Result<T, WizardError>;

pub struct WizardController {
    step: WizardStep,
    state: SessionState,
    draft: PurchaseDraft,
    editing: Option<PurchaseId>,
    pending_deletion: Option<PurchaseId>,
    effects: Vec<WizardEffect>,
    clock: Arc<dyn Clock>,
}

impl Default for WizardController {
    fn default() -> Self {
        Self::new()
    }
}

impl WizardController {
    pub fn new() -> Self {
        Self::from_state(SessionState::default())
    }

    /// Resumes a restored session at the welcome step.
    pub fn from_state(state: SessionState) -> Self {
        Self {
            step: WizardStep::Welcome,
            state,
            draft: PurchaseDraft::default(),
            editing: None,
            pending_deletion: None,
            effects: Vec::new(),
            clock: Arc::new(SystemClock),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    // --- read accessors -------------------------------------------------

    pub fn step(&self) -> WizardStep {
        self.step
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn method(&self) -> Option<SplitMethod> {
        self.state.method
    }

    pub fn incomes(&self) -> &Incomes {
        &self.state.incomes
    }

    pub fn names(&self) -> &ParticipantNames {
        &self.state.names
    }

    pub fn purchases(&self) -> &[Purchase] {
        self.state.purchases.as_slice()
    }

    pub fn purchase(&self, id: PurchaseId) -> Option<&Purchase> {
        self.state.purchases.get(id)
    }

    pub fn draft(&self) -> &PurchaseDraft {
        &self.draft
    }

    /// Purchase currently being edited in the purchase-entry step.
    pub fn editing(&self) -> Option<PurchaseId> {
        self.editing
    }

    pub fn pending_deletion(&self) -> Option<PurchaseId> {
        self.pending_deletion
    }

    pub fn distributed(&self) -> Vec<DistributedPurchase> {
        DistributionService::distribute_purchases(
            self.purchases(),
            self.incomes(),
            SummaryService::effective_method(&self.state),
        )
    }

    pub fn totals(&self) -> ParticipantAmounts {
        DistributionService::total_distribution(&self.distributed())
    }

    pub fn monthly_payments(&self) -> ParticipantAmounts {
        DistributionService::monthly_payments(&self.distributed())
    }

    pub fn contribution_percentages(&self) -> ParticipantAmounts {
        DistributionService::contribution_percentages(&self.totals())
    }

    /// Balancing payment based on the monthly figures.
    pub fn payment_difference(&self) -> PaymentDifference {
        DistributionService::payment_difference(&self.monthly_payments())
    }

    pub fn last_installment_date(&self, id: PurchaseId) -> Option<NaiveDate> {
        let purchase = self.purchase(id)?;
        schedule::last_installment_date(purchase.first_payment_date, purchase.installments)
    }

    pub fn summary(&self) -> FinancialSummary {
        SummaryService::build(&self.state)
    }

    /// Drains queued side effects.
    pub fn take_effects(&mut self) -> Vec<WizardEffect> {
        std::mem::take(&mut self.effects)
    }

    // --- step transitions -------------------------------------------------

    /// Moves to `target` if the edge exists and its guard passes.
    pub fn set_step(&mut self, target: WizardStep) -> WizardResult<()> {
        if !self.step.can_move_to(target) {
            return Err(WizardError::InvalidTransition {
                from: self.step,
                to: target,
            });
        }
        match target {
            WizardStep::IncomeRegistration if self.state.method.is_none() => {
                return Err(WizardError::MethodRequired);
            }
            WizardStep::Summary | WizardStep::PurchaseEntry => {
                if self.state.method.is_none() {
                    return Err(WizardError::MethodRequired);
                }
                if !self.state.incomes.is_valid() {
                    return Err(WizardError::IncomesRequired);
                }
            }
            _ => {}
        }
        if self.step == WizardStep::PurchaseEntry || target == WizardStep::PurchaseEntry {
            self.reset_draft();
        }
        if target != WizardStep::Summary {
            self.pending_deletion = None;
        }
        debug!(from = %self.step, to = %target, "wizard transition");
        self.step = target;
        Ok(())
    }

    pub fn start(&mut self) -> WizardResult<()> {
        self.set_step(WizardStep::MethodSelection)
    }

    /// Jumps from the welcome step straight to the summary of a restored session.
    pub fn resume(&mut self) -> WizardResult<()> {
        self.require_step(WizardStep::Welcome)?;
        self.set_step(WizardStep::Summary)
    }

    pub fn continue_to_incomes(&mut self) -> WizardResult<()> {
        self.set_step(WizardStep::IncomeRegistration)
    }

    pub fn view_summary(&mut self) -> WizardResult<()> {
        self.set_step(WizardStep::Summary)
    }

    pub fn edit_incomes(&mut self) -> WizardResult<()> {
        self.set_step(WizardStep::IncomeRegistration)
    }

    pub fn change_method(&mut self) -> WizardResult<()> {
        self.set_step(WizardStep::MethodSelection)
    }

    /// Opens an empty purchase-entry form.
    pub fn begin_purchase(&mut self) -> WizardResult<()> {
        self.set_step(WizardStep::PurchaseEntry)
    }

    /// Opens the purchase-entry form pre-filled with an existing purchase.
    pub fn edit_purchase(&mut self, id: PurchaseId) -> WizardResult<()> {
        self.require_step(WizardStep::Summary)?;
        let draft = self
            .purchase(id)
            .map(Purchase::draft)
            .ok_or(SplitError::PurchaseNotFound(id))?;
        self.set_step(WizardStep::PurchaseEntry)?;
        self.draft = draft;
        self.editing = Some(id);
        Ok(())
    }

    // --- session mutators -------------------------------------------------

    pub fn set_method(&mut self, method: SplitMethod) -> WizardResult<()> {
        self.require_step(WizardStep::MethodSelection)?;
        self.state.method = Some(method);
        debug!(%method, "split method chosen");
        self.effects.push(WizardEffect::StateChanged);
        self.effects.push(WizardEffect::Celebrate);
        Ok(())
    }

    /// Parses and stores an income. Invalid input keeps the previous value.
    pub fn set_income(&mut self, participant: Participant, raw: &str) -> WizardResult<()> {
        self.require_step(WizardStep::IncomeRegistration)?;
        let value = Incomes::parse_entry(raw)?;
        self.state.incomes.set(participant, value);
        self.effects.push(WizardEffect::StateChanged);
        Ok(())
    }

    pub fn set_name(&mut self, participant: Participant, name: &str) -> WizardResult<()> {
        self.require_step(WizardStep::IncomeRegistration)?;
        let name = name.trim();
        if name.is_empty() {
            return Err(SplitError::InvalidInput("name cannot be empty".into()).into());
        }
        self.state.names.set(participant, name);
        self.effects.push(WizardEffect::StateChanged);
        Ok(())
    }

    pub fn update_draft(&mut self, update: PurchaseUpdate) -> WizardResult<()> {
        self.require_step(WizardStep::PurchaseEntry)?;
        self.draft.apply(update);
        Ok(())
    }

    /// Stores the form (as a new purchase or over the edit target) and
    /// returns to the summary.
    pub fn save_purchase(&mut self) -> WizardResult<PurchaseId> {
        self.require_step(WizardStep::PurchaseEntry)?;
        let draft = self.draft.clone();
        let id = match self.editing {
            Some(id) => {
                PurchaseService::update(&mut self.state.purchases, id, draft)?;
                id
            }
            None => PurchaseService::add(&mut self.state.purchases, draft, self.clock.as_ref())?,
        };
        self.reset_draft();
        self.step = WizardStep::Summary;
        self.effects.push(WizardEffect::StateChanged);
        self.effects.push(WizardEffect::Celebrate);
        Ok(id)
    }

    // --- repository operations -------------------------------------------

    pub fn add_purchase(&mut self, draft: PurchaseDraft) -> WizardResult<PurchaseId> {
        let id = PurchaseService::add(&mut self.state.purchases, draft, self.clock.as_ref())?;
        self.effects.push(WizardEffect::StateChanged);
        Ok(id)
    }

    pub fn delete_purchase(&mut self, id: PurchaseId) -> Option<Purchase> {
        let removed = PurchaseService::delete(&mut self.state.purchases, id)?;
        self.forget(id);
        self.effects.push(WizardEffect::StateChanged);
        Some(removed)
    }

    /// Returns whether an installment was recorded.
    pub fn increment_paid(&mut self, id: PurchaseId) -> bool {
        let changed = PurchaseService::increment_paid(&mut self.state.purchases, id);
        if changed {
            self.effects.push(WizardEffect::StateChanged);
        }
        changed
    }

    /// Marks a purchase for deletion. Only the summary offers deletion.
    pub fn select_purchase_for_deletion(&mut self, id: PurchaseId) -> WizardResult<()> {
        self.require_step(WizardStep::Summary)?;
        if !self.state.purchases.contains(id) {
            return Err(SplitError::PurchaseNotFound(id).into());
        }
        self.pending_deletion = Some(id);
        Ok(())
    }

    pub fn cancel_delete(&mut self) {
        self.pending_deletion = None;
    }

    /// Deletes the selected purchase. `Ok(None)` without a selection.
    pub fn confirm_delete(&mut self) -> WizardResult<Option<Purchase>> {
        self.require_step(WizardStep::Summary)?;
        Ok(self
            .pending_deletion
            .take()
            .and_then(|id| self.delete_purchase(id)))
    }

    fn forget(&mut self, id: PurchaseId) {
        if self.pending_deletion == Some(id) {
            self.pending_deletion = None;
        }
        if self.editing == Some(id) {
            self.editing = None;
        }
    }

    fn reset_draft(&mut self) {
        self.draft = PurchaseDraft::default();
        self.editing = None;
    }

    fn require_step(&self, expected: WizardStep) -> WizardResult<()> {
        if self.step == expected {
            Ok(())
        } else {
            Err(WizardError::WrongStep {
                expected,
                actual: self.step,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::time::FixedClock;

    fn controller() -> WizardController {
        WizardController::new().with_clock(Arc::new(FixedClock::at_millis(1_000)))
    }

    fn at_summary() -> WizardController {
        let mut wizard = controller();
        wizard.start().unwrap();
        wizard.set_method(SplitMethod::Proportional).unwrap();
        wizard.continue_to_incomes().unwrap();
        wizard.set_income(Participant::Person1, "3000").unwrap();
        wizard.set_income(Participant::Person2, "1000").unwrap();
        wizard.view_summary().unwrap();
        wizard.take_effects();
        wizard
    }

    fn add_via_form(wizard: &mut WizardController, description: &str, amount: f64) -> PurchaseId {
        wizard.begin_purchase().unwrap();
        wizard
            .update_draft(PurchaseUpdate::SetDescription(description.into()))
            .unwrap();
        wizard.update_draft(PurchaseUpdate::SetAmount(amount)).unwrap();
        wizard.save_purchase().unwrap()
    }

    #[test]
    fn starts_on_welcome_step() {
        let wizard = controller();
        assert_eq!(wizard.step(), WizardStep::Welcome);
        assert_eq!(wizard.step().number(), 1);
    }

    #[test]
    fn step_numbers_round_trip() {
        for number in 1..=5 {
            assert_eq!(WizardStep::from_number(number).unwrap().number(), number);
        }
        assert!(WizardStep::from_number(6).is_none());
    }

    #[test]
    fn method_is_required_before_incomes() {
        let mut wizard = controller();
        wizard.start().unwrap();
        assert!(matches!(
            wizard.continue_to_incomes(),
            Err(WizardError::MethodRequired)
        ));
        wizard.set_method(SplitMethod::Equal).unwrap();
        assert_eq!(
            wizard.take_effects(),
            vec![WizardEffect::StateChanged, WizardEffect::Celebrate]
        );
        wizard.continue_to_incomes().unwrap();
        assert_eq!(wizard.step(), WizardStep::IncomeRegistration);
    }

    #[test]
    fn incomes_are_required_before_summary() {
        let mut wizard = controller();
        wizard.start().unwrap();
        wizard.set_method(SplitMethod::Equal).unwrap();
        wizard.continue_to_incomes().unwrap();
        wizard.set_income(Participant::Person1, "1200").unwrap();
        assert!(matches!(
            wizard.view_summary(),
            Err(WizardError::IncomesRequired)
        ));
        wizard.set_income(Participant::Person2, "0").unwrap();
        wizard.view_summary().unwrap();
        assert_eq!(wizard.step(), WizardStep::Summary);
    }

    #[test]
    fn invalid_income_keeps_previous_value() {
        let mut wizard = controller();
        wizard.start().unwrap();
        wizard.set_method(SplitMethod::Equal).unwrap();
        wizard.continue_to_incomes().unwrap();
        wizard.set_income(Participant::Person1, "1500").unwrap();
        assert!(wizard.set_income(Participant::Person1, "lots").is_err());
        assert_eq!(wizard.incomes().person1, Some(1500.0));
    }

    #[test]
    fn rejects_edges_outside_the_table() {
        let mut wizard = controller();
        let err = wizard.set_step(WizardStep::PurchaseEntry).unwrap_err();
        assert!(matches!(
            err,
            WizardError::InvalidTransition {
                from: WizardStep::Welcome,
                to: WizardStep::PurchaseEntry
            }
        ));
    }

    #[test]
    fn saving_a_purchase_returns_to_summary_and_celebrates() {
        let mut wizard = at_summary();
        let id = add_via_form(&mut wizard, "Groceries", 400.0);
        assert_eq!(wizard.step(), WizardStep::Summary);
        assert_eq!(wizard.purchases().len(), 1);
        assert_eq!(wizard.purchase(id).unwrap().description, "Groceries");
        assert!(wizard.take_effects().contains(&WizardEffect::Celebrate));
        assert_eq!(wizard.draft(), &PurchaseDraft::default());
    }

    #[test]
    fn editing_prefills_form_and_keeps_identifier() {
        let mut wizard = at_summary();
        let id = add_via_form(&mut wizard, "Groceries", 400.0);

        wizard.edit_purchase(id).unwrap();
        assert_eq!(wizard.step(), WizardStep::PurchaseEntry);
        assert_eq!(wizard.editing(), Some(id));
        assert_eq!(wizard.draft().description, "Groceries");

        wizard.update_draft(PurchaseUpdate::SetAmount(450.0)).unwrap();
        let saved = wizard.save_purchase().unwrap();
        assert_eq!(saved, id);
        assert_eq!(wizard.purchases().len(), 1);
        assert_eq!(wizard.purchase(id).unwrap().amount, 450.0);
        assert_eq!(wizard.editing(), None);
    }

    #[test]
    fn leaving_purchase_entry_discards_the_form() {
        let mut wizard = at_summary();
        let id = add_via_form(&mut wizard, "Groceries", 400.0);
        wizard.edit_purchase(id).unwrap();
        wizard.update_draft(PurchaseUpdate::SetAmount(1.0)).unwrap();
        wizard.view_summary().unwrap();
        assert_eq!(wizard.editing(), None);
        assert_eq!(wizard.purchase(id).unwrap().amount, 400.0);

        wizard.begin_purchase().unwrap();
        assert_eq!(wizard.draft(), &PurchaseDraft::default());
    }

    #[test]
    fn deletion_requires_selection_and_confirmation() {
        let mut wizard = at_summary();
        let id = add_via_form(&mut wizard, "Groceries", 400.0);

        assert!(wizard.confirm_delete().unwrap().is_none());
        assert!(wizard.select_purchase_for_deletion(PurchaseId(7)).is_err());

        wizard.select_purchase_for_deletion(id).unwrap();
        wizard.cancel_delete();
        assert!(wizard.confirm_delete().unwrap().is_none());
        assert_eq!(wizard.purchases().len(), 1);

        wizard.select_purchase_for_deletion(id).unwrap();
        let removed = wizard.confirm_delete().unwrap().unwrap();
        assert_eq!(removed.id, id);
        assert!(wizard.purchases().is_empty());
        assert_eq!(wizard.pending_deletion(), None);
    }

    #[test]
    fn purchase_under_edit_cannot_be_deleted() {
        let mut wizard = at_summary();
        let id = add_via_form(&mut wizard, "TV", 600.0);
        wizard.edit_purchase(id).unwrap();

        let err = wizard.select_purchase_for_deletion(id).unwrap_err();
        assert!(matches!(err, WizardError::WrongStep { .. }), "unexpected: {err:?}");
        assert!(wizard.confirm_delete().is_err());

        assert_eq!(wizard.save_purchase().unwrap(), id);
        assert_eq!(wizard.purchases().len(), 1);
    }

    #[test]
    fn leaving_the_summary_drops_a_pending_deletion() {
        let mut wizard = at_summary();
        let id = add_via_form(&mut wizard, "TV", 600.0);
        wizard.select_purchase_for_deletion(id).unwrap();
        wizard.begin_purchase().unwrap();
        wizard.view_summary().unwrap();

        assert_eq!(wizard.pending_deletion(), None);
        assert!(wizard.confirm_delete().unwrap().is_none());
        assert_eq!(wizard.purchases().len(), 1);
    }

    #[test]
    fn summary_edges_lead_back_to_incomes_and_method() {
        let mut wizard = at_summary();
        wizard.edit_incomes().unwrap();
        assert_eq!(wizard.step(), WizardStep::IncomeRegistration);
        wizard.view_summary().unwrap();
        wizard.change_method().unwrap();
        wizard.set_method(SplitMethod::Equal).unwrap();
        wizard.continue_to_incomes().unwrap();
        wizard.view_summary().unwrap();
        assert_eq!(wizard.method(), Some(SplitMethod::Equal));
    }

    #[test]
    fn resume_requires_a_complete_session() {
        let mut wizard = controller();
        assert!(matches!(wizard.resume(), Err(WizardError::MethodRequired)));

        let state = at_summary().state().clone();
        let mut resumed = WizardController::from_state(state);
        resumed.resume().unwrap();
        assert_eq!(resumed.step(), WizardStep::Summary);
    }

    #[test]
    fn increment_only_signals_real_changes() {
        let mut wizard = at_summary();
        let id = add_via_form(&mut wizard, "Groceries", 400.0);
        wizard.take_effects();
        assert!(wizard.increment_paid(id));
        assert_eq!(wizard.take_effects(), vec![WizardEffect::StateChanged]);
        assert!(!wizard.increment_paid(id));
        assert!(wizard.take_effects().is_empty());
    }

    #[test]
    fn derived_figures_match_the_engine() {
        let mut wizard = at_summary();
        let id = add_via_form(&mut wizard, "Groceries", 400.0);
        let totals = wizard.totals();
        assert!((totals.person1 - 300.0).abs() < 1e-9);
        assert!((totals.person2 - 100.0).abs() < 1e-9);
        assert_eq!(
            wizard.contribution_percentages(),
            ParticipantAmounts::new(75.0, 25.0)
        );
        let difference = wizard.payment_difference();
        assert_eq!(difference.payer, Some(Participant::Person2));
        assert!((difference.amount - 200.0).abs() < 1e-9);
        assert_eq!(wizard.last_installment_date(id), None);
    }
}
