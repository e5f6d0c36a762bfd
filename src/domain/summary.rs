use serde::{Deserialize, Serialize};

use super::household::{Participant, ParticipantNames};

/// A pair of figures, one per participant. Used for shares, totals,
/// monthly payments and contribution percentages alike.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ParticipantAmounts {
    pub person1: f64,
    pub person2: f64,
}

impl ParticipantAmounts {
    pub const ZERO: ParticipantAmounts = ParticipantAmounts {
        person1: 0.0,
        person2: 0.0,
    };

    pub fn new(person1: f64, person2: f64) -> Self {
        Self { person1, person2 }
    }

    pub fn get(&self, participant: Participant) -> f64 {
        match participant {
            Participant::Person1 => self.person1,
            Participant::Person2 => self.person2,
        }
    }

    pub fn combined(&self) -> f64 {
        self.person1 + self.person2
    }

    pub fn map(self, f: impl Fn(f64) -> f64) -> Self {
        Self::new(f(self.person1), f(self.person2))
    }
}

impl std::ops::Add for ParticipantAmounts {
    type Output = ParticipantAmounts;

    fn add(self, rhs: Self) -> Self::Output {
        Self::new(self.person1 + rhs.person1, self.person2 + rhs.person2)
    }
}

/// Balancing payment between the participants. Both roles are `None` and
/// the amount is zero when the compared figures are equal.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PaymentDifference {
    pub payer: Option<Participant>,
    pub receiver: Option<Participant>,
    pub amount: f64,
}

impl PaymentDifference {
    pub const BALANCED: PaymentDifference = PaymentDifference {
        payer: None,
        receiver: None,
        amount: 0.0,
    };

    pub fn is_balanced(&self) -> bool {
        self.payer.is_none() || self.receiver.is_none()
    }

    /// Resolves the roles to display names.
    pub fn labels<'a>(&self, names: &'a ParticipantNames) -> Option<(&'a str, &'a str)> {
        Some((names.get(self.payer?), names.get(self.receiver?)))
    }
}
