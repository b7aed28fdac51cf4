//! CLP money math.
//!
//! Chilean pesos have no minor unit, so all amounts are integer pesos stored
//! as `i64`. Cart and order totals are always recomputed from these helpers
//! so the arithmetic lives in exactly one place:
//!
//! - IVA (value-added tax) is a flat 19%, rounded half-up to the nearest peso.
//! - Shipping is free at or above 15 000 CLP subtotal, otherwise a flat
//!   2 500 CLP fee.

use serde::{Deserialize, Serialize};

/// IVA rate applied to every cart subtotal, in percent.
pub const IVA_RATE_PERCENT: i64 = 19;

/// Subtotal (in CLP) at which shipping becomes free.
pub const FREE_SHIPPING_THRESHOLD: Pesos = Pesos(15_000);

/// Flat shipping fee (in CLP) below the free-shipping threshold.
pub const FLAT_SHIPPING_FEE: Pesos = Pesos(2_500);

/// An amount of Chilean pesos.
///
/// Integer-valued; CLP has no cents. Negative values are representable
/// (refund math) but never produced by the tax/shipping helpers.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Pesos(pub i64);

impl Pesos {
    /// Zero pesos.
    pub const ZERO: Self = Self(0);

    /// Wrap an integer peso amount.
    #[must_use]
    pub const fn new(amount: i64) -> Self {
        Self(amount)
    }

    /// The raw peso amount.
    #[must_use]
    pub const fn amount(self) -> i64 {
        self.0
    }

    /// 19% IVA on this subtotal, rounded half-up to the nearest peso.
    ///
    /// Matches `Math.round(subtotal * 0.19)` semantics for non-negative
    /// subtotals: `(subtotal * 19 + 50) / 100` in integer arithmetic.
    #[must_use]
    pub const fn iva(self) -> Self {
        Self((self.0 * IVA_RATE_PERCENT + 50).div_euclid(100))
    }

    /// Shipping cost for this subtotal: free at or above the threshold,
    /// a flat fee below it.
    #[must_use]
    pub const fn shipping(self) -> Self {
        if self.0 >= FREE_SHIPPING_THRESHOLD.0 {
            Self::ZERO
        } else {
            FLAT_SHIPPING_FEE
        }
    }

    /// Saturating addition; totals never wrap.
    #[must_use]
    pub const fn saturating_add(self, other: Self) -> Self {
        Self(self.0.saturating_add(other.0))
    }

    /// Multiply a unit price by a quantity (line subtotal).
    #[must_use]
    pub const fn times(self, quantity: i64) -> Self {
        Self(self.0.saturating_mul(quantity))
    }
}

impl std::fmt::Display for Pesos {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "${} CLP", self.0)
    }
}

impl std::ops::Add for Pesos {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl std::iter::Sum for Pesos {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Self::saturating_add)
    }
}

// SQLx support (with postgres feature): stored as BIGINT
#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for Pesos {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <i64 as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <i64 as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for Pesos {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let amount = <i64 as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        Ok(Self(amount))
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for Pesos {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <i64 as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.0, buf)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_iva_exact() {
        // 19% of 1000 = 190, no rounding needed
        assert_eq!(Pesos(1000).iva(), Pesos(190));
        assert_eq!(Pesos(0).iva(), Pesos(0));
    }

    #[test]
    fn test_iva_rounds_half_up() {
        // 999 * 0.19 = 189.81 -> 190
        assert_eq!(Pesos(999).iva(), Pesos(190));
        // 997 * 0.19 = 189.43 -> 189
        assert_eq!(Pesos(997).iva(), Pesos(189));
        // 50 * 0.19 = 9.5 -> 10 (half rounds up)
        assert_eq!(Pesos(50).iva(), Pesos(10));
    }

    #[test]
    fn test_shipping_threshold() {
        assert_eq!(Pesos(14_999).shipping(), FLAT_SHIPPING_FEE);
        // Exactly at the threshold ships free
        assert_eq!(Pesos(15_000).shipping(), Pesos::ZERO);
        assert_eq!(Pesos(50_000).shipping(), Pesos::ZERO);
    }

    #[test]
    fn test_line_subtotal() {
        assert_eq!(Pesos(3_500).times(3), Pesos(10_500));
        assert_eq!(Pesos(3_500).times(0), Pesos::ZERO);
    }

    #[test]
    fn test_sum() {
        let total: Pesos = [Pesos(100), Pesos(250), Pesos(50)].into_iter().sum();
        assert_eq!(total, Pesos(400));
    }

    #[test]
    fn test_serde_transparent() {
        let json = serde_json::to_string(&Pesos(2500)).unwrap();
        assert_eq!(json, "2500");
        let back: Pesos = serde_json::from_str("2500").unwrap();
        assert_eq!(back, Pesos(2500));
    }
}
