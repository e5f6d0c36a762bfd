use chrono::NaiveDate;
use serde::Serialize;

use crate::core::schedule::{last_installment_date, next_installment_date};
use crate::domain::common::InstallmentProgress;
use crate::domain::{ParticipantAmounts, PaymentDifference, SessionState, SplitMethod};

use super::distribution_service::{DistributedPurchase, DistributionService};
use super::purchase_service::sort_for_display;

/// One line of the purchase table shown on the summary step.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryRow {
    pub distributed: DistributedPurchase,
    pub remaining_installments: u32,
    pub installment_amount: f64,
    pub next_installment: Option<NaiveDate>,
    pub last_installment: Option<NaiveDate>,
    pub settled: bool,
}

/// Snapshot of every figure derived from a session.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FinancialSummary {
    pub method: SplitMethod,
    pub rows: Vec<SummaryRow>,
    pub totals: ParticipantAmounts,
    pub monthly: ParticipantAmounts,
    pub percentages: ParticipantAmounts,
    /// Computed from the monthly payments.
    pub difference: PaymentDifference,
}

pub struct SummaryService;

impl SummaryService {
    /// Unset methods are summarised as an equal split.
    pub fn effective_method(state: &SessionState) -> SplitMethod {
        state.method.unwrap_or(SplitMethod::Equal)
    }

    pub fn build(state: &SessionState) -> FinancialSummary {
        let method = Self::effective_method(state);
        let distributed = DistributionService::distribute_purchases(
            state.purchases.as_slice(),
            &state.incomes,
            method,
        );
        let totals = DistributionService::total_distribution(&distributed);
        let monthly = DistributionService::monthly_payments(&distributed);
        let percentages = DistributionService::contribution_percentages(&totals);
        let difference = DistributionService::payment_difference(&monthly);

        let rows = sort_for_display(distributed)
            .into_iter()
            .map(|row| {
                let purchase = &row.purchase;
                SummaryRow {
                    remaining_installments: purchase.remaining_installments(),
                    installment_amount: purchase.installment_amount(),
                    next_installment: next_installment_date(purchase),
                    last_installment: last_installment_date(
                        purchase.first_payment_date,
                        purchase.installments,
                    ),
                    settled: row.is_settled(),
                    distributed: row,
                }
            })
            .collect();

        FinancialSummary {
            method,
            rows,
            totals,
            monthly,
            percentages,
            difference,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Incomes, Participant, PurchaseBook, PurchaseDraft, PurchaseId};

    fn state() -> SessionState {
        let purchases = vec![
            PurchaseDraft::new("Settled", 90.0, 3)
                .with_paid_installments(3)
                .into_purchase(PurchaseId(1)),
            PurchaseDraft::new("Groceries", 400.0, 1)
                .with_first_payment_date(NaiveDate::from_ymd_opt(2024, 1, 15).unwrap())
                .into_purchase(PurchaseId(2)),
        ];
        SessionState {
            method: Some(SplitMethod::Proportional),
            incomes: Incomes::new(3000.0, 1000.0),
            purchases: PurchaseBook::from_purchases(purchases),
            ..SessionState::default()
        }
    }

    #[test]
    fn summary_orders_rows_and_uses_monthly_difference() {
        let summary = SummaryService::build(&state());
        let ids: Vec<PurchaseId> = summary
            .rows
            .iter()
            .map(|row| row.distributed.purchase.id)
            .collect();
        assert_eq!(ids, vec![PurchaseId(2), PurchaseId(1)]);
        assert!(summary.rows[1].settled);

        assert!((summary.monthly.person1 - 300.0).abs() < 1e-9);
        assert!((summary.monthly.person2 - 100.0).abs() < 1e-9);
        assert_eq!(summary.difference.payer, Some(Participant::Person2));
        assert!((summary.difference.amount - 200.0).abs() < 1e-9);
        assert_eq!(
            summary.rows[0].last_installment,
            NaiveDate::from_ymd_opt(2024, 1, 15)
        );
        assert_eq!(summary.rows[1].last_installment, None);
    }

    #[test]
    fn unset_method_summarises_as_equal() {
        let mut state = state();
        state.method = None;
        let summary = SummaryService::build(&state);
        assert_eq!(summary.method, SplitMethod::Equal);
        assert_eq!(summary.percentages, ParticipantAmounts::new(50.0, 50.0));
    }
}
