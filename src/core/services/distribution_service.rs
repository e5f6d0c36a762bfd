//! Pure expense-distribution calculations.
//!
//! Every function here is a stateless transform over a snapshot of the
//! session, so each figure shown in the summary can be recomputed and tested
//! on its own.

use serde::Serialize;

use crate::domain::common::InstallmentProgress;
use crate::domain::{
    Incomes, Participant, ParticipantAmounts, PaymentDifference, Purchase, SplitMethod,
};

/// A purchase together with each participant's share of its total amount.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DistributedPurchase {
    pub purchase: Purchase,
    pub shares: ParticipantAmounts,
}

impl DistributedPurchase {
    /// Each participant's share of one installment.
    pub fn monthly_shares(&self) -> ParticipantAmounts {
        let installments = f64::from(self.purchase.installments.max(1));
        self.shares.map(|share| share / installments)
    }
}

impl InstallmentProgress for DistributedPurchase {
    fn is_settled(&self) -> bool {
        self.purchase.is_settled()
    }
}

pub struct DistributionService;

impl DistributionService {
    /// Fraction of every purchase carried by each participant.
    ///
    /// `Proportional` follows the income ratio; `Equal` and `Pooled` split in
    /// half. A proportional split without a positive combined income also
    /// falls back to halves.
    pub fn split_ratio(incomes: &Incomes, method: SplitMethod) -> ParticipantAmounts {
        let halves = ParticipantAmounts::new(0.5, 0.5);
        match method {
            SplitMethod::Proportional => match (incomes.person1, incomes.person2) {
                (Some(first), Some(second)) => {
                    let total = first + second;
                    if total.is_finite() && total > 0.0 {
                        ParticipantAmounts::new(first / total, second / total)
                    } else {
                        halves
                    }
                }
                _ => halves,
            },
            SplitMethod::Equal | SplitMethod::Pooled => halves,
        }
    }

    pub fn distribute_purchases(
        purchases: &[Purchase],
        incomes: &Incomes,
        method: SplitMethod,
    ) -> Vec<DistributedPurchase> {
        let ratio = Self::split_ratio(incomes, method);
        purchases
            .iter()
            .map(|purchase| DistributedPurchase {
                purchase: purchase.clone(),
                shares: Self::shares_for(purchase.amount, method, ratio),
            })
            .collect()
    }

    fn shares_for(
        amount: f64,
        method: SplitMethod,
        ratio: ParticipantAmounts,
    ) -> ParticipantAmounts {
        match method {
            SplitMethod::Proportional => ratio.map(|fraction| amount * fraction),
            SplitMethod::Equal | SplitMethod::Pooled => {
                ParticipantAmounts::new(amount / 2.0, amount / 2.0)
            }
        }
    }

    pub fn total_distribution(distributed: &[DistributedPurchase]) -> ParticipantAmounts {
        distributed
            .iter()
            .fold(ParticipantAmounts::ZERO, |acc, row| acc + row.shares)
    }

    /// Sum of per-installment shares over purchases that still have unpaid
    /// installments. Shares are divided by the total installment count, so the
    /// figure stays constant while a purchase is being paid off.
    pub fn monthly_payments(distributed: &[DistributedPurchase]) -> ParticipantAmounts {
        distributed
            .iter()
            .filter(|row| row.purchase.remaining_installments() > 0)
            .fold(ParticipantAmounts::ZERO, |acc, row| acc + row.monthly_shares())
    }

    /// Each participant's share of the combined total, in percent rounded to
    /// two decimals. Both are zero when nothing has been distributed.
    pub fn contribution_percentages(totals: &ParticipantAmounts) -> ParticipantAmounts {
        let combined = totals.combined();
        if combined == 0.0 {
            return ParticipantAmounts::ZERO;
        }
        totals.map(|value| round_to_cents(value / combined * 100.0))
    }

    /// The participant with the lower figure pays the difference to the other.
    pub fn payment_difference(figures: &ParticipantAmounts) -> PaymentDifference {
        let difference = figures.person1 - figures.person2;
        if difference > 0.0 {
            PaymentDifference {
                payer: Some(Participant::Person2),
                receiver: Some(Participant::Person1),
                amount: difference.abs(),
            }
        } else if difference < 0.0 {
            PaymentDifference {
                payer: Some(Participant::Person1),
                receiver: Some(Participant::Person2),
                amount: difference.abs(),
            }
        } else {
            PaymentDifference::BALANCED
        }
    }
}

pub(crate) fn round_to_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{PurchaseDraft, PurchaseId};

    const TOLERANCE: f64 = 1e-9;

    fn purchase(id: u64, amount: f64, installments: u32, paid: u32) -> Purchase {
        PurchaseDraft::new(format!("item {id}"), amount, installments)
            .with_paid_installments(paid)
            .into_purchase(PurchaseId(id))
    }

    fn sample_purchases() -> Vec<Purchase> {
        vec![
            purchase(1, 400.0, 1, 0),
            purchase(2, 1200.0, 12, 4),
            purchase(3, 99.99, 3, 3),
            purchase(4, 0.0, 1, 0),
        ]
    }

    #[test]
    fn equal_split_halves_every_purchase() {
        let incomes = Incomes::new(3000.0, 1000.0);
        for method in [SplitMethod::Equal, SplitMethod::Pooled] {
            let rows =
                DistributionService::distribute_purchases(&sample_purchases(), &incomes, method);
            for row in rows {
                assert_eq!(row.shares.person1, row.purchase.amount / 2.0);
                assert_eq!(row.shares.person2, row.purchase.amount / 2.0);
            }
        }
    }

    #[test]
    fn proportional_split_sums_to_amount() {
        let incomes = Incomes::new(2750.5, 1333.25);
        let rows = DistributionService::distribute_purchases(
            &sample_purchases(),
            &incomes,
            SplitMethod::Proportional,
        );
        for row in rows {
            assert!((row.shares.combined() - row.purchase.amount).abs() < TOLERANCE);
        }
    }

    #[test]
    fn proportional_split_follows_income_ratio() {
        let incomes = Incomes::new(3000.0, 1000.0);
        let rows = DistributionService::distribute_purchases(
            &[purchase(1, 400.0, 1, 0)],
            &incomes,
            SplitMethod::Proportional,
        );
        assert!((rows[0].shares.person1 - 300.0).abs() < TOLERANCE);
        assert!((rows[0].shares.person2 - 100.0).abs() < TOLERANCE);
    }

    #[test]
    fn proportional_split_without_income_falls_back_to_halves() {
        let rows = DistributionService::distribute_purchases(
            &[purchase(1, 80.0, 1, 0)],
            &Incomes::new(0.0, 0.0),
            SplitMethod::Proportional,
        );
        assert_eq!(rows[0].shares, ParticipantAmounts::new(40.0, 40.0));

        let rows = DistributionService::distribute_purchases(
            &[purchase(1, 80.0, 1, 0)],
            &Incomes::default(),
            SplitMethod::Proportional,
        );
        assert_eq!(rows[0].shares, ParticipantAmounts::new(40.0, 40.0));
    }

    #[test]
    fn totals_sum_all_shares() {
        let rows = DistributionService::distribute_purchases(
            &sample_purchases(),
            &Incomes::new(1.0, 1.0),
            SplitMethod::Equal,
        );
        let totals = DistributionService::total_distribution(&rows);
        assert!((totals.person1 - 849.995).abs() < TOLERANCE);
        assert!((totals.person2 - 849.995).abs() < TOLERANCE);
    }

    #[test]
    fn monthly_payments_skip_settled_purchases() {
        let rows = DistributionService::distribute_purchases(
            &sample_purchases(),
            &Incomes::new(1.0, 1.0),
            SplitMethod::Equal,
        );
        let monthly = DistributionService::monthly_payments(&rows);
        // 400/1 + 1200/12, halved; purchase 3 is settled, purchase 4 is zero.
        assert!((monthly.person1 - 250.0).abs() < TOLERANCE);
        assert!((monthly.person2 - 250.0).abs() < TOLERANCE);
    }

    #[test]
    fn monthly_payment_divides_by_total_installments() {
        let early = DistributionService::distribute_purchases(
            &[purchase(1, 1200.0, 12, 0)],
            &Incomes::new(1.0, 1.0),
            SplitMethod::Equal,
        );
        let late = DistributionService::distribute_purchases(
            &[purchase(1, 1200.0, 12, 11)],
            &Incomes::new(1.0, 1.0),
            SplitMethod::Equal,
        );
        assert_eq!(
            DistributionService::monthly_payments(&early),
            DistributionService::monthly_payments(&late)
        );
    }

    #[test]
    fn contribution_percentages_guard_zero_total() {
        assert_eq!(
            DistributionService::contribution_percentages(&ParticipantAmounts::ZERO),
            ParticipantAmounts::ZERO
        );
    }

    #[test]
    fn contribution_percentages_add_up_to_hundred() {
        let cases = [
            ParticipantAmounts::new(300.0, 100.0),
            ParticipantAmounts::new(1.0, 2.0),
            ParticipantAmounts::new(123.45, 678.9),
            ParticipantAmounts::new(0.0, 15.0),
        ];
        for totals in cases {
            let pct = DistributionService::contribution_percentages(&totals);
            assert!((pct.combined() - 100.0).abs() <= 0.011, "{pct:?}");
        }
        let pct = DistributionService::contribution_percentages(&cases[0]);
        assert_eq!(pct, ParticipantAmounts::new(75.0, 25.0));
    }

    #[test]
    fn payment_difference_orders_payer_and_receiver() {
        let diff = DistributionService::payment_difference(&ParticipantAmounts::new(300.0, 100.0));
        assert_eq!(diff.payer, Some(Participant::Person2));
        assert_eq!(diff.receiver, Some(Participant::Person1));
        assert_eq!(diff.amount, 200.0);

        let diff = DistributionService::payment_difference(&ParticipantAmounts::new(10.0, 35.5));
        assert_eq!(diff.payer, Some(Participant::Person1));
        assert_eq!(diff.receiver, Some(Participant::Person2));
        assert_eq!(diff.amount, 25.5);
    }

    #[test]
    fn payment_difference_balanced_when_equal() {
        let diff = DistributionService::payment_difference(&ParticipantAmounts::new(42.0, 42.0));
        assert_eq!(diff, PaymentDifference::BALANCED);
        assert!(diff.is_balanced());
    }
}
