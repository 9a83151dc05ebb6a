//! Value objects shared across the aggregates.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Opaque identifier of the user performing a redemption.
///
/// Authentication lives upstream; the backend only ever sees the id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(Uuid);

impl UserId {
    /// Creates a fresh random id.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wraps an existing UUID.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the underlying UUID.
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for UserId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Uuid> for UserId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

/// Monetary amount in the smallest currency unit (e.g. cents).
///
/// Integer-only to avoid floating point rounding in wallet math.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Money(i64);

impl Money {
    /// Creates an amount from smallest currency units.
    pub fn from_units(units: i64) -> Self {
        Self(units)
    }

    /// Zero amount.
    pub fn zero() -> Self {
        Self(0)
    }

    /// The raw amount in smallest units.
    pub fn units(&self) -> i64 {
        self.0
    }

    pub fn is_positive(&self) -> bool {
        self.0 > 0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

impl std::fmt::Display for Money {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::ops::Add for Money {
    type Output = Money;

    fn add(self, rhs: Self) -> Self::Output {
        Money(self.0 + rhs.0)
    }
}

impl std::ops::Sub for Money {
    type Output = Money;

    fn sub(self, rhs: Self) -> Self::Output {
        Money(self.0 - rhs.0)
    }
}

impl std::ops::AddAssign for Money {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

impl std::ops::SubAssign for Money {
    fn sub_assign(&mut self, rhs: Self) {
        self.0 -= rhs.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_ids_are_unique() {
        assert_ne!(UserId::new(), UserId::new());
    }

    #[test]
    fn money_arithmetic() {
        let a = Money::from_units(1500);
        let b = Money::from_units(500);

        assert_eq!((a + b).units(), 2000);
        assert_eq!((a - b).units(), 1000);

        let mut c = a;
        c += b;
        assert_eq!(c.units(), 2000);
        c -= a;
        assert_eq!(c, b);
    }

    #[test]
    fn money_predicates() {
        assert!(Money::from_units(1).is_positive());
        assert!(Money::zero().is_zero());
        assert!(!Money::from_units(-5).is_positive());
    }

    #[test]
    fn money_serializes_as_bare_integer() {
        let json = serde_json::to_string(&Money::from_units(2500)).unwrap();
        assert_eq!(json, "2500");
    }
}
