//! Product availability status.

use serde::{Deserialize, Serialize};

/// Explicit availability flag of a catalog product.
///
/// Deliberately independent from the stock count: a product with stock can be
/// taken off sale, and a sold-out product can stay listed as available. A
/// redemption requires the status to be `Available` AND stock > 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProductStatus {
    /// Product can be redeemed (subject to stock).
    #[default]
    Available,

    /// Product is hidden from redemption regardless of stock.
    Unavailable,
}

impl ProductStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProductStatus::Available => "AVAILABLE",
            ProductStatus::Unavailable => "UNAVAILABLE",
        }
    }
}

impl std::fmt::Display for ProductStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for ProductStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "AVAILABLE" => Ok(ProductStatus::Available),
            "UNAVAILABLE" => Ok(ProductStatus::Unavailable),
            other => Err(format!("unknown product status: {other}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_available() {
        assert_eq!(ProductStatus::default(), ProductStatus::Available);
    }

    #[test]
    fn parses_wire_format() {
        assert_eq!(
            "AVAILABLE".parse::<ProductStatus>().unwrap(),
            ProductStatus::Available
        );
        assert_eq!(
            "UNAVAILABLE".parse::<ProductStatus>().unwrap(),
            ProductStatus::Unavailable
        );
        assert!("available".parse::<ProductStatus>().is_err());
    }

    #[test]
    fn serializes_screaming_snake() {
        let json = serde_json::to_string(&ProductStatus::Unavailable).unwrap();
        assert_eq!(json, "\"UNAVAILABLE\"");
    }
}
