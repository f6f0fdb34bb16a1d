//! Domain enumerations shared by entities, services and handlers.
//!
//! All enums are persisted as their wire string form (the status columns
//! are plain strings in the schema), so every variant carries an explicit
//! `strum` serialization.

use strum::{Display, EnumIter, EnumString, IntoEnumIterator};

/// Whether an order brings stock in (purchase) or out (sale).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, EnumIter)]
#[strum(serialize_all = "lowercase")]
pub enum OrderType {
    Purchase,
    Sale,
}

impl OrderType {
    /// Prefix used when auto-generating order numbers.
    pub fn order_number_prefix(&self) -> &'static str {
        match self {
            OrderType::Purchase => "PO",
            OrderType::Sale => "SO",
        }
    }
}

/// Order fulfillment status. No transition graph is enforced: any status
/// may be overwritten by any other, including the terminal-looking ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, EnumIter)]
#[strum(serialize_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Confirmed,
    Processing,
    Shipped,
    Delivered,
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, EnumIter)]
#[strum(serialize_all = "lowercase")]
pub enum PaymentStatus {
    Pending,
    Partial,
    Paid,
    Refunded,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, EnumIter)]
#[strum(serialize_all = "snake_case")]
pub enum PaymentMethod {
    Cash,
    CreditCard,
    DebitCard,
    BankTransfer,
    Check,
}

/// Garment sizes carried by the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, EnumIter)]
pub enum GarmentSize {
    #[strum(serialize = "XS")]
    ExtraSmall,
    #[strum(serialize = "S")]
    Small,
    #[strum(serialize = "M")]
    Medium,
    #[strum(serialize = "L")]
    Large,
    #[strum(serialize = "XL")]
    ExtraLarge,
    #[strum(serialize = "XXL")]
    DoubleExtraLarge,
    #[strum(serialize = "XXXL")]
    TripleExtraLarge,
    #[strum(serialize = "Free Size")]
    FreeSize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, EnumIter)]
pub enum PaymentTerms {
    #[strum(serialize = "Net 15")]
    Net15,
    #[strum(serialize = "Net 30")]
    Net30,
    #[strum(serialize = "Net 45")]
    Net45,
    #[strum(serialize = "Net 60")]
    Net60,
    #[strum(serialize = "Immediate")]
    Immediate,
    #[strum(serialize = "COD")]
    Cod,
}

/// Comma-separated list of every variant's wire form, used in
/// "must be one of" validation messages.
pub fn variants_list<E>() -> String
where
    E: IntoEnumIterator + std::fmt::Display,
{
    E::iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn order_type_round_trips_wire_form() {
        assert_eq!(OrderType::from_str("purchase").unwrap(), OrderType::Purchase);
        assert_eq!(OrderType::Sale.to_string(), "sale");
        assert!(OrderType::from_str("refund").is_err());
    }

    #[test]
    fn order_number_prefixes() {
        assert_eq!(OrderType::Purchase.order_number_prefix(), "PO");
        assert_eq!(OrderType::Sale.order_number_prefix(), "SO");
    }

    #[test]
    fn status_list_matches_schema_order() {
        assert_eq!(
            variants_list::<OrderStatus>(),
            "pending, confirmed, processing, shipped, delivered, cancelled"
        );
    }

    #[test]
    fn payment_method_uses_snake_case() {
        assert_eq!(PaymentMethod::CreditCard.to_string(), "credit_card");
        assert_eq!(
            PaymentMethod::from_str("bank_transfer").unwrap(),
            PaymentMethod::BankTransfer
        );
    }

    #[test]
    fn garment_sizes_keep_label_form() {
        assert_eq!(GarmentSize::FreeSize.to_string(), "Free Size");
        assert_eq!(GarmentSize::from_str("XXL").unwrap(), GarmentSize::DoubleExtraLarge);
    }

    #[test]
    fn payment_terms_keep_label_form() {
        assert_eq!(PaymentTerms::Net30.to_string(), "Net 30");
        assert_eq!(PaymentTerms::from_str("COD").unwrap(), PaymentTerms::Cod);
    }
}
