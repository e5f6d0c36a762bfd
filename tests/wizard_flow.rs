mod common;

use chrono::NaiveDate;
use common::wizard_at_summary;
use expense_split::core::{WizardEffect, WizardError, WizardStep};
use expense_split::domain::{
    Participant, ParticipantAmounts, PurchaseDraft, PurchaseUpdate, SplitMethod,
};

fn approx(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-9,
        "expected {expected}, got {actual}"
    );
}

#[test]
fn proportional_household_end_to_end() {
    let mut wizard = wizard_at_summary(SplitMethod::Proportional, "3000", "1000");

    wizard.begin_purchase().unwrap();
    wizard
        .update_draft(PurchaseUpdate::SetDescription("Groceries".into()))
        .unwrap();
    wizard.update_draft(PurchaseUpdate::SetAmount(400.0)).unwrap();
    wizard.save_purchase().unwrap();

    assert_eq!(wizard.step(), WizardStep::Summary);
    let distributed = wizard.distributed();
    approx(distributed[0].shares.person1, 300.0);
    approx(distributed[0].shares.person2, 100.0);
    assert_eq!(
        wizard.contribution_percentages(),
        ParticipantAmounts::new(75.0, 25.0)
    );

    let difference = wizard.payment_difference();
    assert_eq!(difference.payer, Some(Participant::Person2));
    assert_eq!(difference.receiver, Some(Participant::Person1));
    approx(difference.amount, 200.0);
}

#[test]
fn installments_spread_the_monthly_figure() {
    let mut wizard = wizard_at_summary(SplitMethod::Equal, "2000", "2000");
    let id = wizard
        .add_purchase(
            PurchaseDraft::new("Laptop", 1200.0, 12)
                .with_buyer(Participant::Person2)
                .with_first_payment_date(NaiveDate::from_ymd_opt(2024, 1, 31).unwrap()),
        )
        .unwrap();

    let monthly = wizard.monthly_payments();
    approx(monthly.person1, 50.0);
    approx(monthly.person2, 50.0);
    assert!(wizard.payment_difference().is_balanced());
    assert_eq!(
        wizard.last_installment_date(id),
        NaiveDate::from_ymd_opt(2024, 12, 31)
    );

    for _ in 0..12 {
        assert!(wizard.increment_paid(id));
    }
    assert!(!wizard.increment_paid(id));
    assert_eq!(wizard.monthly_payments(), ParticipantAmounts::ZERO);
    approx(wizard.totals().person1, 600.0);
}

#[test]
fn settled_purchases_sort_last_in_summary() {
    let mut wizard = wizard_at_summary(SplitMethod::Pooled, "1", "1");
    let done = wizard
        .add_purchase(PurchaseDraft::new("Old TV", 300.0, 3).with_paid_installments(3))
        .unwrap();
    let open = wizard
        .add_purchase(PurchaseDraft::new("Sofa", 900.0, 3))
        .unwrap();

    let summary = wizard.summary();
    let order: Vec<_> = summary
        .rows
        .iter()
        .map(|row| row.distributed.purchase.id)
        .collect();
    assert_eq!(order, vec![open, done]);
    assert_eq!(summary.method, SplitMethod::Pooled);
}

#[test]
fn editing_keeps_identifier_and_emits_effects() {
    let mut wizard = wizard_at_summary(SplitMethod::Equal, "100", "100");
    let id = wizard
        .add_purchase(PurchaseDraft::new("Rent", 800.0, 1))
        .unwrap();
    wizard.take_effects();

    wizard.edit_purchase(id).unwrap();
    wizard
        .update_draft(PurchaseUpdate::SetInstallments(2))
        .unwrap();
    assert_eq!(wizard.save_purchase().unwrap(), id);
    assert_eq!(wizard.purchase(id).unwrap().installments, 2);

    let effects = wizard.take_effects();
    assert!(effects.contains(&WizardEffect::StateChanged));
    assert!(effects.contains(&WizardEffect::Celebrate));
}

#[test]
fn invalid_purchase_form_stays_open() {
    let mut wizard = wizard_at_summary(SplitMethod::Equal, "100", "100");
    wizard.begin_purchase().unwrap();
    wizard.update_draft(PurchaseUpdate::SetAmount(50.0)).unwrap();

    let err = wizard.save_purchase().unwrap_err();
    assert!(matches!(err, WizardError::Service(_)), "unexpected: {err:?}");
    assert_eq!(wizard.step(), WizardStep::PurchaseEntry);
    assert!(wizard.purchases().is_empty());
}

#[test]
fn summary_requires_positive_combined_income() {
    let mut wizard = expense_split::core::WizardController::new();
    wizard.start().unwrap();
    wizard.set_method(SplitMethod::Proportional).unwrap();
    wizard.continue_to_incomes().unwrap();
    wizard.set_income(Participant::Person1, "0").unwrap();
    wizard.set_income(Participant::Person2, "0").unwrap();
    assert!(matches!(
        wizard.view_summary(),
        Err(WizardError::IncomesRequired)
    ));
}
