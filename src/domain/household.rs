use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::errors::SplitError;

use super::common::Displayable;

pub const DEFAULT_PERSON1_NAME: &str = "Person 1";
pub const DEFAULT_PERSON2_NAME: &str = "Person 2";

/// One of the two fixed roles in a household. Display names live in
/// [`ParticipantNames`] and never leak into the role key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Participant {
    Person1,
    Person2,
}

impl Participant {
    pub const ALL: [Participant; 2] = [Participant::Person1, Participant::Person2];

    pub fn key(self) -> &'static str {
        match self {
            Participant::Person1 => "person1",
            Participant::Person2 => "person2",
        }
    }

    pub fn other(self) -> Participant {
        match self {
            Participant::Person1 => Participant::Person2,
            Participant::Person2 => Participant::Person1,
        }
    }
}

impl fmt::Display for Participant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Participant {
    type Err = SplitError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        match input.trim().to_ascii_lowercase().as_str() {
            "1" | "p1" | "person1" => Ok(Participant::Person1),
            "2" | "p2" | "person2" => Ok(Participant::Person2),
            other => Err(SplitError::InvalidInput(format!(
                "unknown participant `{}` (use 1 or 2)",
                other
            ))),
        }
    }
}

/// Rule used to divide each purchase between the two participants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SplitMethod {
    Equal,
    Proportional,
    /// Accepted and persisted, but currently divided like [`SplitMethod::Equal`].
    Pooled,
}

impl SplitMethod {
    pub const ALL: [SplitMethod; 3] = [
        SplitMethod::Equal,
        SplitMethod::Proportional,
        SplitMethod::Pooled,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            SplitMethod::Equal => "equal",
            SplitMethod::Proportional => "proportional",
            SplitMethod::Pooled => "pooled",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            SplitMethod::Equal => "For couples with similar incomes",
            SplitMethod::Proportional => "For couples with significantly different incomes",
            SplitMethod::Pooled => "Common fund (split evenly)",
        }
    }
}

impl Displayable for SplitMethod {
    fn display_label(&self) -> String {
        match self {
            SplitMethod::Pooled => "pooled (split evenly)".into(),
            other => other.as_str().into(),
        }
    }
}

impl fmt::Display for SplitMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SplitMethod {
    type Err = SplitError;

    /// Accepts the canonical tokens plus the values written by earlier
    /// releases of the web wizard.
    fn from_str(input: &str) -> Result<Self, Self::Err> {
        match input.trim().to_ascii_lowercase().as_str() {
            "equal" | "igual" => Ok(SplitMethod::Equal),
            "proportional" | "proporcional" => Ok(SplitMethod::Proportional),
            "pooled" | "fondo-comun" => Ok(SplitMethod::Pooled),
            other => Err(SplitError::InvalidInput(format!(
                "unknown split method `{}` (use equal, proportional or pooled)",
                other
            ))),
        }
    }
}

/// Monthly incomes of both participants. `None` means not entered yet.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Incomes {
    #[serde(default, with = "income_value")]
    pub person1: Option<f64>,
    #[serde(default, with = "income_value")]
    pub person2: Option<f64>,
}

impl Incomes {
    pub fn new(person1: f64, person2: f64) -> Self {
        Self {
            person1: Some(person1),
            person2: Some(person2),
        }
    }

    pub fn get(&self, participant: Participant) -> Option<f64> {
        match participant {
            Participant::Person1 => self.person1,
            Participant::Person2 => self.person2,
        }
    }

    pub fn set(&mut self, participant: Participant, value: Option<f64>) {
        match participant {
            Participant::Person1 => self.person1 = value,
            Participant::Person2 => self.person2 = value,
        }
    }

    pub fn combined(&self) -> Option<f64> {
        Some(self.person1? + self.person2?)
    }

    /// Both present with a strictly positive combined income.
    pub fn is_valid(&self) -> bool {
        self.combined()
            .is_some_and(|total| total.is_finite() && total > 0.0)
    }

    /// Parses a raw income entry. Blank input clears the value.
    pub fn parse_entry(raw: &str) -> Result<Option<f64>, SplitError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Ok(None);
        }
        let value: f64 = trimmed.parse().map_err(|_| {
            SplitError::InvalidInput(format!("income `{}` is not a number", trimmed))
        })?;
        Self::check_amount(value).map(Some)
    }

    /// Rejects negative and non-finite incomes.
    pub fn check_amount(value: f64) -> Result<f64, SplitError> {
        if !value.is_finite() || value < 0.0 {
            return Err(SplitError::InvalidInput(format!(
                "income must be a non-negative amount, got `{}`",
                value
            )));
        }
        Ok(value)
    }
}

/// Display labels for both participants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParticipantNames {
    pub person1: String,
    pub person2: String,
}

impl Default for ParticipantNames {
    fn default() -> Self {
        Self {
            person1: DEFAULT_PERSON1_NAME.into(),
            person2: DEFAULT_PERSON2_NAME.into(),
        }
    }
}

impl ParticipantNames {
    pub fn new(person1: impl Into<String>, person2: impl Into<String>) -> Self {
        Self {
            person1: person1.into(),
            person2: person2.into(),
        }
    }

    pub fn get(&self, participant: Participant) -> &str {
        match participant {
            Participant::Person1 => &self.person1,
            Participant::Person2 => &self.person2,
        }
    }

    pub fn set(&mut self, participant: Participant, name: impl Into<String>) {
        match participant {
            Participant::Person1 => self.person1 = name.into(),
            Participant::Person2 => self.person2 = name.into(),
        }
    }
}

/// Incomes are stored as text (`""` when unset) so the persisted shape
/// matches what the web wizard wrote. Numbers are accepted on read.
mod income_value {
    use serde::{de::Error as _, Deserialize, Deserializer, Serializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(f64),
        Text(String),
    }

    pub fn serialize<S>(value: &Option<f64>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(amount) => serializer.serialize_str(&amount.to_string()),
            None => serializer.serialize_str(""),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Option::<Raw>::deserialize(deserializer)? {
            None => Ok(None),
            Some(Raw::Number(amount)) => super::Incomes::check_amount(amount)
                .map(Some)
                .map_err(|err| D::Error::custom(err.to_string())),
            Some(Raw::Text(text)) => {
                super::Incomes::parse_entry(&text).map_err(|err| D::Error::custom(err.to_string()))
            }
        }
    }
}
