use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type Price = f64;
pub type Qty = f64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TradeKind {
    Buy,
    Sell,
}

impl TradeKind {
    pub fn as_str(self) -> &'static str {
        match self {
            TradeKind::Buy => "buy",
            TradeKind::Sell => "sell",
        }
    }

    /// Case-insensitive parse of `buy` / `sell`.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "buy" => Some(TradeKind::Buy),
            "sell" => Some(TradeKind::Sell),
            _ => None,
        }
    }
}

/// A single executed buy or sell. Never mutated once recorded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    pub id: Uuid,
    pub user_id: String,
    pub symbol: String,
    pub quantity: Qty,
    pub price: Price,
    pub kind: TradeKind,
    pub timestamp: DateTime<Utc>,
}

impl Trade {
    pub fn new(user_id: &str, symbol: &str, kind: TradeKind, quantity: Qty, price: Price) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id: user_id.to_string(),
            symbol: symbol.trim().to_uppercase(),
            quantity,
            price,
            kind,
            timestamp: Utc::now(),
        }
    }
}

/// Trade submission as it arrives over HTTP. Every field is optional so that
/// missing fields produce a readable 400 instead of a deserialization failure.
#[derive(Debug, Default, Deserialize)]
pub struct NewTrade {
    pub symbol: Option<String>,
    #[serde(alias = "amount")]
    pub quantity: Option<f64>,
    pub price: Option<f64>,
    #[serde(alias = "type")]
    pub kind: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TradeValidationError {
    #[error("{0} is required")]
    Missing(&'static str),
    #[error("quantity must be a positive number")]
    InvalidQuantity,
    #[error("price must be a positive number")]
    InvalidPrice,
    #[error("kind must be 'buy' or 'sell'")]
    InvalidKind,
    #[error("quantity * price is out of range")]
    NotionalOutOfRange,
}

impl NewTrade {
    /// Check presence and ranges, producing a trade owned by `user_id`.
    pub fn validate(self, user_id: &str) -> Result<Trade, TradeValidationError> {
        let symbol = self
            .symbol
            .filter(|s| !s.trim().is_empty())
            .ok_or(TradeValidationError::Missing("symbol"))?;
        let quantity = self.quantity.ok_or(TradeValidationError::Missing("quantity"))?;
        let price = self.price.ok_or(TradeValidationError::Missing("price"))?;
        let kind = self.kind.ok_or(TradeValidationError::Missing("kind"))?;

        if !quantity.is_finite() || quantity <= 0.0 {
            return Err(TradeValidationError::InvalidQuantity);
        }
        if !price.is_finite() || price <= 0.0 {
            return Err(TradeValidationError::InvalidPrice);
        }
        if !(quantity * price).is_finite() {
            return Err(TradeValidationError::NotionalOutOfRange);
        }
        let kind = TradeKind::parse(&kind).ok_or(TradeValidationError::InvalidKind)?;

        Ok(Trade::new(user_id, &symbol, kind, quantity, price))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn submission() -> NewTrade {
        NewTrade {
            symbol: Some("sol".to_string()),
            quantity: Some(2.5),
            price: Some(140.0),
            kind: Some("Buy".to_string()),
        }
    }

    #[test]
    fn validate_normalizes_symbol_and_kind() {
        let trade = submission().validate("did:privy:abc").unwrap();
        assert_eq!(trade.symbol, "SOL");
        assert_eq!(trade.kind, TradeKind::Buy);
        assert_eq!(trade.user_id, "did:privy:abc");
    }

    #[test]
    fn validate_rejects_missing_fields() {
        let mut t = submission();
        t.symbol = Some("  ".to_string());
        assert_eq!(t.validate("u").unwrap_err(), TradeValidationError::Missing("symbol"));

        let mut t = submission();
        t.price = None;
        assert_eq!(t.validate("u").unwrap_err(), TradeValidationError::Missing("price"));
    }

    #[test]
    fn validate_rejects_non_positive_values() {
        let mut t = submission();
        t.quantity = Some(0.0);
        assert_eq!(t.validate("u").unwrap_err(), TradeValidationError::InvalidQuantity);

        let mut t = submission();
        t.price = Some(-1.0);
        assert_eq!(t.validate("u").unwrap_err(), TradeValidationError::InvalidPrice);

        let mut t = submission();
        t.quantity = Some(f64::NAN);
        assert_eq!(t.validate("u").unwrap_err(), TradeValidationError::InvalidQuantity);
    }

    #[test]
    fn validate_rejects_overflowing_notional() {
        let mut t = submission();
        t.quantity = Some(1e200);
        t.price = Some(1e200);
        assert_eq!(t.validate("u").unwrap_err(), TradeValidationError::NotionalOutOfRange);
    }

    #[test]
    fn validate_rejects_unknown_kind() {
        let mut t = submission();
        t.kind = Some("short".to_string());
        assert_eq!(t.validate("u").unwrap_err(), TradeValidationError::InvalidKind);
    }

    #[test]
    fn new_trade_accepts_original_field_names() {
        let t: NewTrade = serde_json::from_value(serde_json::json!({
            "symbol": "BTC", "amount": 1.0, "price": 60000.0, "type": "sell"
        }))
        .unwrap();
        let trade = t.validate("u").unwrap();
        assert_eq!(trade.kind, TradeKind::Sell);
        assert_eq!(trade.quantity, 1.0);
    }
}
