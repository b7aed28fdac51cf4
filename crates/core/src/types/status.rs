//! Status enums and catalog vocabulary.
//!
//! Wire values stay in Spanish - they are the contract with the existing
//! storefront frontend and with the stored data.

use serde::{Deserialize, Serialize};

/// Order lifecycle status.
///
/// Orders move linearly `Procesando -> Confirmado -> Enviado -> Entregado`,
/// or sideways to `Cancelado` at any point before delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum OrderStatus {
    #[default]
    #[serde(rename = "Procesando")]
    Processing,
    #[serde(rename = "Confirmado")]
    Confirmed,
    #[serde(rename = "Enviado")]
    Shipped,
    #[serde(rename = "Entregado")]
    Delivered,
    #[serde(rename = "Cancelado")]
    Cancelled,
}

impl OrderStatus {
    /// Whether a transition from `self` to `next` is allowed.
    ///
    /// Delivered and cancelled orders are terminal.
    #[must_use]
    pub const fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Processing, Self::Confirmed | Self::Cancelled)
                | (Self::Confirmed, Self::Shipped | Self::Cancelled)
                | (Self::Shipped, Self::Delivered | Self::Cancelled)
        )
    }

    /// The Spanish wire value.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Processing => "Procesando",
            Self::Confirmed => "Confirmado",
            Self::Shipped => "Enviado",
            Self::Delivered => "Entregado",
            Self::Cancelled => "Cancelado",
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Procesando" => Ok(Self::Processing),
            "Confirmado" => Ok(Self::Confirmed),
            "Enviado" => Ok(Self::Shipped),
            "Entregado" => Ok(Self::Delivered),
            "Cancelado" => Ok(Self::Cancelled),
            _ => Err(format!("invalid order status: {s}")),
        }
    }
}

/// Payment status as tracked locally against the Flow gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum PaymentStatus {
    #[default]
    #[serde(rename = "Pendiente")]
    Pending,
    #[serde(rename = "Pagado")]
    Paid,
    #[serde(rename = "Rechazado")]
    Rejected,
    #[serde(rename = "Cancelado")]
    Cancelled,
}

impl PaymentStatus {
    /// Map Flow's numeric payment status code.
    ///
    /// Flow reports 1 = pending, 2 = paid, 3 = rejected, 4 = cancelled.
    /// Unknown codes are treated as pending rather than failing the webhook.
    #[must_use]
    pub const fn from_flow_code(code: i64) -> Self {
        match code {
            2 => Self::Paid,
            3 => Self::Rejected,
            4 => Self::Cancelled,
            _ => Self::Pending,
        }
    }

    /// The Spanish wire value.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "Pendiente",
            Self::Paid => "Pagado",
            Self::Rejected => "Rechazado",
            Self::Cancelled => "Cancelado",
        }
    }
}

impl std::fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for PaymentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Pendiente" => Ok(Self::Pending),
            "Pagado" => Ok(Self::Paid),
            "Rechazado" => Ok(Self::Rejected),
            "Cancelado" => Ok(Self::Cancelled),
            _ => Err(format!("invalid payment status: {s}")),
        }
    }
}

/// User role. Admins additionally manage the catalog and orders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    #[default]
    Cliente,
    Admin,
}

impl UserRole {
    #[must_use]
    pub const fn is_admin(self) -> bool {
        matches!(self, Self::Admin)
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Cliente => write!(f, "cliente"),
            Self::Admin => write!(f, "admin"),
        }
    }
}

impl std::str::FromStr for UserRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "cliente" => Ok(Self::Cliente),
            "admin" => Ok(Self::Admin),
            _ => Err(format!("invalid user role: {s}")),
        }
    }
}

/// Beer styles carried by the catalog; the `tipo` filter vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BeerStyle {
    #[serde(rename = "IPA")]
    Ipa,
    Stout,
    Lager,
    Porter,
    Ale,
}

impl BeerStyle {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ipa => "IPA",
            Self::Stout => "Stout",
            Self::Lager => "Lager",
            Self::Porter => "Porter",
            Self::Ale => "Ale",
        }
    }
}

impl std::fmt::Display for BeerStyle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for BeerStyle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "IPA" => Ok(Self::Ipa),
            "Stout" => Ok(Self::Stout),
            "Lager" => Ok(Self::Lager),
            "Porter" => Ok(Self::Porter),
            "Ale" => Ok(Self::Ale),
            _ => Err(format!("invalid beer style: {s}")),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_order_lifecycle_forward() {
        assert!(OrderStatus::Processing.can_transition_to(OrderStatus::Confirmed));
        assert!(OrderStatus::Confirmed.can_transition_to(OrderStatus::Shipped));
        assert!(OrderStatus::Shipped.can_transition_to(OrderStatus::Delivered));
    }

    #[test]
    fn test_order_lifecycle_cancellation() {
        assert!(OrderStatus::Processing.can_transition_to(OrderStatus::Cancelled));
        assert!(OrderStatus::Shipped.can_transition_to(OrderStatus::Cancelled));
        // Delivered orders cannot be cancelled
        assert!(!OrderStatus::Delivered.can_transition_to(OrderStatus::Cancelled));
    }

    #[test]
    fn test_order_lifecycle_no_skipping_backwards() {
        assert!(!OrderStatus::Confirmed.can_transition_to(OrderStatus::Processing));
        assert!(!OrderStatus::Cancelled.can_transition_to(OrderStatus::Confirmed));
        assert!(!OrderStatus::Delivered.can_transition_to(OrderStatus::Shipped));
    }

    #[test]
    fn test_order_status_wire_values() {
        let json = serde_json::to_string(&OrderStatus::Shipped).unwrap();
        assert_eq!(json, "\"Enviado\"");
        let back: OrderStatus = serde_json::from_str("\"Cancelado\"").unwrap();
        assert_eq!(back, OrderStatus::Cancelled);
    }

    #[test]
    fn test_order_status_parse() {
        assert_eq!(
            "Procesando".parse::<OrderStatus>().unwrap(),
            OrderStatus::Processing
        );
        assert!("Shipped".parse::<OrderStatus>().is_err());
    }

    #[test]
    fn test_payment_status_from_flow_code() {
        assert_eq!(PaymentStatus::from_flow_code(1), PaymentStatus::Pending);
        assert_eq!(PaymentStatus::from_flow_code(2), PaymentStatus::Paid);
        assert_eq!(PaymentStatus::from_flow_code(3), PaymentStatus::Rejected);
        assert_eq!(PaymentStatus::from_flow_code(4), PaymentStatus::Cancelled);
        // Unknown codes stay pending
        assert_eq!(PaymentStatus::from_flow_code(99), PaymentStatus::Pending);
    }

    #[test]
    fn test_user_role_parse() {
        assert_eq!("admin".parse::<UserRole>().unwrap(), UserRole::Admin);
        assert!(UserRole::Admin.is_admin());
        assert!(!UserRole::Cliente.is_admin());
    }

    #[test]
    fn test_beer_style_roundtrip() {
        for style in [
            BeerStyle::Ipa,
            BeerStyle::Stout,
            BeerStyle::Lager,
            BeerStyle::Porter,
            BeerStyle::Ale,
        ] {
            assert_eq!(style.as_str().parse::<BeerStyle>().unwrap(), style);
        }
    }
}
