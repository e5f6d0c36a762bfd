//! Mutation helpers for a session's purchase list.

use tracing::debug;

use crate::core::services::{ServiceError, ServiceResult};
use crate::core::time::Clock;
use crate::domain::common::InstallmentProgress;
use crate::domain::{Purchase, PurchaseBook, PurchaseDraft, PurchaseId};
use crate::errors::SplitError;

/// Validated add/update/delete helpers over a [`PurchaseBook`].
pub struct PurchaseService;

impl PurchaseService {
    /// Appends the draft under a fresh identifier and returns it.
    pub fn add(
        book: &mut PurchaseBook,
        draft: PurchaseDraft,
        clock: &dyn Clock,
    ) -> ServiceResult<PurchaseId> {
        Self::validate(&draft)?;
        let id = Self::next_id(book, clock)?;
        book.push(draft.into_purchase(id));
        debug!(%id, "purchase added");
        Ok(id)
    }

    /// Replaces every field of the purchase identified by `id`, keeping the id.
    pub fn update(
        book: &mut PurchaseBook,
        id: PurchaseId,
        draft: PurchaseDraft,
    ) -> ServiceResult<()> {
        Self::validate(&draft)?;
        let purchase = book
            .get_mut(id)
            .ok_or(SplitError::PurchaseNotFound(id))?;
        *purchase = draft.into_purchase(id);
        debug!(%id, "purchase updated");
        Ok(())
    }

    /// Removes the purchase, returning it. Unknown ids are ignored.
    pub fn delete(book: &mut PurchaseBook, id: PurchaseId) -> Option<Purchase> {
        let removed = book.remove(id);
        if removed.is_some() {
            debug!(%id, "purchase deleted");
        }
        removed
    }

    /// Marks one more installment as paid. Returns `false` when the purchase
    /// is unknown or already settled.
    pub fn increment_paid(book: &mut PurchaseBook, id: PurchaseId) -> bool {
        match book.get_mut(id) {
            Some(purchase) if purchase.paid_installments < purchase.installments => {
                purchase.paid_installments += 1;
                debug!(%id, paid = purchase.paid_installments, "installment paid");
                true
            }
            _ => false,
        }
    }

    pub fn validate(draft: &PurchaseDraft) -> ServiceResult<()> {
        if draft.description.trim().is_empty() {
            return Err(ServiceError::Invalid("Description cannot be empty".into()));
        }
        if !draft.amount.is_finite() || draft.amount < 0.0 {
            return Err(ServiceError::Invalid(
                "Amount must be a non-negative number".into(),
            ));
        }
        if draft.installments == 0 {
            return Err(ServiceError::Invalid(
                "A purchase needs at least one installment".into(),
            ));
        }
        if draft.paid_installments > draft.installments {
            return Err(ServiceError::Invalid(format!(
                "Paid installments ({}) cannot exceed installments ({})",
                draft.paid_installments, draft.installments
            )));
        }
        Ok(())
    }

    /// Creation timestamp in milliseconds, bumped past the largest existing
    /// id so identifiers stay unique and increasing.
    pub fn next_id(book: &PurchaseBook, clock: &dyn Clock) -> ServiceResult<PurchaseId> {
        let stamp = u64::try_from(clock.now().timestamp_millis()).unwrap_or(0);
        match book.max_id() {
            Some(PurchaseId(max)) if max >= stamp => max
                .checked_add(1)
                .map(PurchaseId)
                .ok_or_else(|| ServiceError::Invalid("No purchase identifier is left".into())),
            _ => Ok(PurchaseId(stamp)),
        }
    }
}

/// Stable partition: unsettled items first, settled ones last, each group
/// keeping its original relative order.
pub fn sort_for_display<T, I>(items: I) -> Vec<T>
where
    T: InstallmentProgress,
    I: IntoIterator<Item = T>,
{
    let (active, settled): (Vec<T>, Vec<T>) =
        items.into_iter().partition(|item| !item.is_settled());
    active.into_iter().chain(settled).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::time::FixedClock;
    use crate::domain::Participant;

    const NOW: i64 = 1_718_000_000_000;

    fn clock() -> FixedClock {
        FixedClock::at_millis(NOW)
    }

    fn book_with(drafts: Vec<PurchaseDraft>) -> (PurchaseBook, Vec<PurchaseId>) {
        let mut book = PurchaseBook::new();
        let ids = drafts
            .into_iter()
            .map(|draft| PurchaseService::add(&mut book, draft, &clock()).unwrap())
            .collect();
        (book, ids)
    }

    #[test]
    fn add_assigns_unique_increasing_ids() {
        let (book, ids) = book_with(vec![
            PurchaseDraft::new("Rent", 800.0, 1),
            PurchaseDraft::new("Fridge", 600.0, 6),
        ]);
        assert_eq!(ids[0], PurchaseId(NOW as u64));
        assert_eq!(ids[1], PurchaseId(NOW as u64 + 1));
        assert_eq!(book.len(), 2);
    }

    #[test]
    fn add_rejects_invalid_drafts() {
        let mut book = PurchaseBook::new();
        let blank = PurchaseDraft::new("  ", 10.0, 1);
        assert!(PurchaseService::add(&mut book, blank, &clock()).is_err());

        let zero_installments = PurchaseDraft::new("Desk", 10.0, 0);
        assert!(PurchaseService::add(&mut book, zero_installments, &clock()).is_err());

        let overpaid = PurchaseDraft::new("Desk", 10.0, 2).with_paid_installments(3);
        let err = PurchaseService::add(&mut book, overpaid, &clock()).unwrap_err();
        assert!(err.to_string().contains("cannot exceed"), "unexpected: {err}");
        assert!(book.is_empty());
    }

    #[test]
    fn update_preserves_identifier() {
        let (mut book, ids) = book_with(vec![PurchaseDraft::new("Rent", 800.0, 1)]);
        let replacement =
            PurchaseDraft::new("Rent (June)", 850.0, 1).with_buyer(Participant::Person2);
        PurchaseService::update(&mut book, ids[0], replacement).unwrap();

        let stored = book.get(ids[0]).unwrap();
        assert_eq!(stored.id, ids[0]);
        assert_eq!(stored.description, "Rent (June)");
        assert_eq!(stored.buyer, Participant::Person2);
    }

    #[test]
    fn update_unknown_purchase_fails() {
        let mut book = PurchaseBook::new();
        let draft = PurchaseDraft::new("x", 1.0, 1);
        let err = PurchaseService::update(&mut book, PurchaseId(9), draft)
            .expect_err("unknown id must fail");
        assert!(
            matches!(err, ServiceError::Core(SplitError::PurchaseNotFound(PurchaseId(9)))),
            "unexpected error: {err:?}"
        );
    }

    #[test]
    fn add_fails_instead_of_overflowing_ids() {
        let mut book = PurchaseBook::from_purchases(vec![
            PurchaseDraft::new("Restored", 10.0, 1).into_purchase(PurchaseId(u64::MAX)),
        ]);
        let err = PurchaseService::add(&mut book, PurchaseDraft::new("TV", 500.0, 5), &clock())
            .unwrap_err();
        assert!(matches!(err, ServiceError::Invalid(_)), "unexpected error: {err:?}");
        assert_eq!(book.len(), 1);
    }

    #[test]
    fn delete_is_noop_for_unknown_ids() {
        let (mut book, ids) = book_with(vec![PurchaseDraft::new("Rent", 800.0, 1)]);
        assert!(PurchaseService::delete(&mut book, PurchaseId(1)).is_none());
        assert_eq!(book.len(), 1);
        let removed = PurchaseService::delete(&mut book, ids[0]).unwrap();
        assert_eq!(removed.id, ids[0]);
        assert!(book.is_empty());
    }

    #[test]
    fn increment_paid_stops_at_installment_count() {
        let (mut book, ids) = book_with(vec![PurchaseDraft::new("Phone", 300.0, 2)]);
        assert!(PurchaseService::increment_paid(&mut book, ids[0]));
        assert!(PurchaseService::increment_paid(&mut book, ids[0]));
        for _ in 0..5 {
            assert!(!PurchaseService::increment_paid(&mut book, ids[0]));
        }
        let stored = book.get(ids[0]).unwrap();
        assert_eq!(stored.paid_installments, stored.installments);
        assert!(!PurchaseService::increment_paid(&mut book, PurchaseId(42)));
    }

    #[test]
    fn sort_for_display_is_a_stable_partition() {
        let (book, ids) = book_with(vec![
            PurchaseDraft::new("A", 10.0, 2),
            PurchaseDraft::new("B", 10.0, 1).with_paid_installments(1),
            PurchaseDraft::new("C", 10.0, 3).with_paid_installments(1),
            PurchaseDraft::new("D", 10.0, 2).with_paid_installments(2),
        ]);
        let ordered: Vec<PurchaseId> = sort_for_display(book.iter())
            .into_iter()
            .map(|purchase| purchase.id)
            .collect();
        assert_eq!(ordered, vec![ids[0], ids[2], ids[1], ids[3]]);
    }
}
