use std::{fmt, str::FromStr};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::errors::SplitError;

use super::{common::InstallmentProgress, household::Participant};

/// Identifier minted from the creation timestamp (milliseconds).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PurchaseId(pub u64);

impl fmt::Display for PurchaseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for PurchaseId {
    type Err = SplitError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        input
            .trim()
            .parse::<u64>()
            .map(PurchaseId)
            .map_err(|_| SplitError::InvalidInput(format!("invalid purchase id `{}`", input)))
    }
}

/// A purchase paid in one or more monthly installments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Purchase {
    pub id: PurchaseId,
    pub description: String,
    pub amount: f64,
    pub installments: u32,
    pub buyer: Participant,
    #[serde(default)]
    pub paid_installments: u32,
    #[serde(default, with = "first_payment_date")]
    pub first_payment_date: Option<NaiveDate>,
}

impl Purchase {
    pub fn remaining_installments(&self) -> u32 {
        self.installments.saturating_sub(self.paid_installments)
    }

    /// Full amount of a single installment, before splitting.
    pub fn installment_amount(&self) -> f64 {
        self.amount / f64::from(self.installments.max(1))
    }

    pub fn draft(&self) -> PurchaseDraft {
        PurchaseDraft {
            description: self.description.clone(),
            amount: self.amount,
            installments: self.installments,
            buyer: self.buyer,
            paid_installments: self.paid_installments,
            first_payment_date: self.first_payment_date,
        }
    }
}

impl InstallmentProgress for Purchase {
    fn is_settled(&self) -> bool {
        self.paid_installments >= self.installments
    }
}

impl InstallmentProgress for &Purchase {
    fn is_settled(&self) -> bool {
        (*self).is_settled()
    }
}

/// Editable purchase fields, used by the purchase-entry step before an
/// identifier is assigned.
#[derive(Debug, Clone, PartialEq)]
pub struct PurchaseDraft {
    pub description: String,
    pub amount: f64,
    pub installments: u32,
    pub buyer: Participant,
    pub paid_installments: u32,
    pub first_payment_date: Option<NaiveDate>,
}

impl Default for PurchaseDraft {
    fn default() -> Self {
        Self {
            description: String::new(),
            amount: 0.0,
            installments: 1,
            buyer: Participant::Person1,
            paid_installments: 0,
            first_payment_date: None,
        }
    }
}

impl PurchaseDraft {
    pub fn new(description: impl Into<String>, amount: f64, installments: u32) -> Self {
        Self {
            description: description.into(),
            amount,
            installments,
            ..Self::default()
        }
    }

    pub fn with_buyer(mut self, buyer: Participant) -> Self {
        self.buyer = buyer;
        self
    }

    pub fn with_paid_installments(mut self, paid: u32) -> Self {
        self.paid_installments = paid;
        self
    }

    pub fn with_first_payment_date(mut self, date: NaiveDate) -> Self {
        self.first_payment_date = Some(date);
        self
    }

    pub fn apply(&mut self, update: PurchaseUpdate) {
        match update {
            PurchaseUpdate::SetDescription(description) => self.description = description,
            PurchaseUpdate::SetAmount(amount) => self.amount = amount,
            PurchaseUpdate::SetInstallments(installments) => {
                self.installments = installments;
                self.paid_installments = self.paid_installments.min(installments);
            }
            PurchaseUpdate::SetPaidInstallments(paid) => self.paid_installments = paid,
            PurchaseUpdate::SetBuyer(buyer) => self.buyer = buyer,
            PurchaseUpdate::SetFirstPaymentDate(date) => self.first_payment_date = date,
        }
    }

    pub fn into_purchase(self, id: PurchaseId) -> Purchase {
        Purchase {
            id,
            description: self.description,
            amount: self.amount,
            installments: self.installments,
            buyer: self.buyer,
            paid_installments: self.paid_installments,
            first_payment_date: self.first_payment_date,
        }
    }
}

/// Typed edits accepted by the purchase-entry form.
#[derive(Debug, Clone, PartialEq)]
pub enum PurchaseUpdate {
    SetDescription(String),
    SetAmount(f64),
    SetInstallments(u32),
    SetPaidInstallments(u32),
    SetBuyer(Participant),
    SetFirstPaymentDate(Option<NaiveDate>),
}

impl PurchaseUpdate {
    pub const FIELDS: [&'static str; 6] =
        ["description", "amount", "installments", "paid", "buyer", "date"];

    /// Builds an update from a field name and its textual value.
    pub fn from_field(field: &str, value: &str) -> Result<Self, SplitError> {
        let value = value.trim();
        match field.trim().to_ascii_lowercase().as_str() {
            "description" | "desc" => Ok(PurchaseUpdate::SetDescription(value.to_string())),
            "amount" => value
                .parse::<f64>()
                .ok()
                .filter(|amount| amount.is_finite())
                .map(PurchaseUpdate::SetAmount)
                .ok_or_else(|| SplitError::InvalidInput(format!("invalid amount `{}`", value))),
            "installments" => value
                .parse::<u32>()
                .map(PurchaseUpdate::SetInstallments)
                .map_err(|_| {
                    SplitError::InvalidInput(format!("invalid installment count `{}`", value))
                }),
            "paid" | "paid_installments" | "paid-installments" => value
                .parse::<u32>()
                .map(PurchaseUpdate::SetPaidInstallments)
                .map_err(|_| {
                    SplitError::InvalidInput(format!("invalid paid installment count `{}`", value))
                }),
            "buyer" => value.parse::<Participant>().map(PurchaseUpdate::SetBuyer),
            "date" | "first_payment_date" | "first-payment-date" => {
                if value.is_empty() || value.eq_ignore_ascii_case("none") {
                    Ok(PurchaseUpdate::SetFirstPaymentDate(None))
                } else {
                    parse_date(value).map(|date| PurchaseUpdate::SetFirstPaymentDate(Some(date)))
                }
            }
            other => Err(SplitError::InvalidInput(format!(
                "unknown purchase field `{}` (expected one of: {})",
                other,
                Self::FIELDS.join(", ")
            ))),
        }
    }
}

pub fn parse_date(input: &str) -> Result<NaiveDate, SplitError> {
    NaiveDate::parse_from_str(input.trim(), "%Y-%m-%d").map_err(|_| {
        SplitError::InvalidInput(format!("invalid date `{}` (use YYYY-MM-DD)", input))
    })
}

/// Ordered purchase list owned by a session.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PurchaseBook {
    purchases: Vec<Purchase>,
}

impl PurchaseBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_purchases(purchases: Vec<Purchase>) -> Self {
        Self { purchases }
    }

    pub fn as_slice(&self) -> &[Purchase] {
        &self.purchases
    }

    pub fn iter(&self) -> impl Iterator<Item = &Purchase> {
        self.purchases.iter()
    }

    pub fn len(&self) -> usize {
        self.purchases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.purchases.is_empty()
    }

    pub fn get(&self, id: PurchaseId) -> Option<&Purchase> {
        self.purchases.iter().find(|purchase| purchase.id == id)
    }

    pub fn get_mut(&mut self, id: PurchaseId) -> Option<&mut Purchase> {
        self.purchases.iter_mut().find(|purchase| purchase.id == id)
    }

    pub fn contains(&self, id: PurchaseId) -> bool {
        self.get(id).is_some()
    }

    pub fn max_id(&self) -> Option<PurchaseId> {
        self.purchases.iter().map(|purchase| purchase.id).max()
    }

    pub(crate) fn push(&mut self, purchase: Purchase) {
        self.purchases.push(purchase);
    }

    pub(crate) fn remove(&mut self, id: PurchaseId) -> Option<Purchase> {
        let index = self
            .purchases
            .iter()
            .position(|purchase| purchase.id == id)?;
        Some(self.purchases.remove(index))
    }
}

/// Dates are stored as `YYYY-MM-DD`, with `""` meaning unset.
mod first_payment_date {
    use chrono::NaiveDate;
    use serde::{de::Error as _, Deserialize, Deserializer, Serializer};

    const FORMAT: &str = "%Y-%m-%d";

    pub fn serialize<S>(value: &Option<NaiveDate>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(date) => serializer.serialize_str(&date.format(FORMAT).to_string()),
            None => serializer.serialize_str(""),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Option::<String>::deserialize(deserializer)?;
        match raw.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(text) => {
                // Accept full timestamps by keeping only the date part.
                let date_part = text.get(..10).unwrap_or(text);
                NaiveDate::parse_from_str(date_part, FORMAT)
                    .map(Some)
                    .map_err(|err| D::Error::custom(format!("invalid date `{}`: {}", text, err)))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Purchase {
        PurchaseDraft::new("Sofa", 1200.0, 12)
            .with_paid_installments(3)
            .with_first_payment_date(NaiveDate::from_ymd_opt(2024, 1, 15).unwrap())
            .into_purchase(PurchaseId(1_700_000_000_000))
    }

    #[test]
    fn derived_installment_figures() {
        let purchase = sample();
        assert_eq!(purchase.remaining_installments(), 9);
        assert!((purchase.installment_amount() - 100.0).abs() < f64::EPSILON);
        assert!(!purchase.is_settled());
    }

    #[test]
    fn shrinking_installments_clamps_paid_count() {
        let mut draft = sample().draft();
        draft.apply(PurchaseUpdate::SetInstallments(2));
        assert_eq!(draft.installments, 2);
        assert_eq!(draft.paid_installments, 2);
    }

    #[test]
    fn update_from_field_parses_values() {
        assert_eq!(
            PurchaseUpdate::from_field("amount", "45.5").unwrap(),
            PurchaseUpdate::SetAmount(45.5)
        );
        assert_eq!(
            PurchaseUpdate::from_field("buyer", "2").unwrap(),
            PurchaseUpdate::SetBuyer(Participant::Person2)
        );
        assert_eq!(
            PurchaseUpdate::from_field("date", "none").unwrap(),
            PurchaseUpdate::SetFirstPaymentDate(None)
        );
        assert!(PurchaseUpdate::from_field("colour", "red").is_err());
        assert!(PurchaseUpdate::from_field("installments", "-1").is_err());
    }

    #[test]
    fn purchase_json_uses_camel_case_and_blank_dates() {
        let mut purchase = sample();
        purchase.first_payment_date = None;
        let json = serde_json::to_value(&purchase).unwrap();
        assert_eq!(json["paidInstallments"], 3);
        assert_eq!(json["firstPaymentDate"], "");
        assert_eq!(json["buyer"], "person1");

        let restored: Purchase = serde_json::from_value(json).unwrap();
        assert_eq!(restored, purchase);
    }

    #[test]
    fn purchase_accepts_timestamp_dates() {
        let json = r#"{"id":1,"description":"TV","amount":300,"installments":3,
            "buyer":"person2","paidInstallments":0,
            "firstPaymentDate":"2024-05-10T00:00:00.000Z"}"#;
        let purchase: Purchase = serde_json::from_str(json).unwrap();
        assert_eq!(
            purchase.first_payment_date,
            NaiveDate::from_ymd_opt(2024, 5, 10)
        );
    }
}
