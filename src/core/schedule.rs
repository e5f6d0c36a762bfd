//! Installment calendar projections.

use chrono::{Months, NaiveDate};

use crate::domain::Purchase;

/// Date of the final installment: `installments - 1` calendar months after
/// the first payment. The day of month is clamped to the end of shorter
/// months (Jan 31 + 1 month = Feb 28/29). `None` when no first-payment
/// date is set.
pub fn last_installment_date(
    first_payment_date: Option<NaiveDate>,
    installments: u32,
) -> Option<NaiveDate> {
    let first = first_payment_date?;
    shift_months(first, installments.saturating_sub(1))
}

/// Due date of the next unpaid installment, `None` once settled or when no
/// first-payment date is set.
pub fn next_installment_date(purchase: &Purchase) -> Option<NaiveDate> {
    if purchase.paid_installments >= purchase.installments {
        return None;
    }
    shift_months(purchase.first_payment_date?, purchase.paid_installments)
}

fn shift_months(date: NaiveDate, months: u32) -> Option<NaiveDate> {
    date.checked_add_months(Months::new(months))
}
