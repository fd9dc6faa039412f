use serde::Serialize;
use serde_json::Value;

use super::coerce::{amount, field, iso_date, text};

/// A completed transaction from the payment history.
///
/// Reports treat every payment as a single-line invoice, so the line-item
/// figures are derived from `amount` rather than stored.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Payment {
    pub id: String,
    pub transaction_id: String,
    /// Display correlation only
    pub invoice_number: Option<String>,
    pub amount: f64,
    pub paid_date: Option<String>,
    pub payment_method: String,
    pub description: String,
    pub client_name: Option<String>,
    pub client_email: Option<String>,
    pub client_phone: Option<String>,
    pub client_address: Option<String>,
}

impl Payment {
    pub fn quantity(&self) -> u32 {
        1
    }

    pub fn rate(&self) -> f64 {
        self.amount
    }

    pub fn subtotal(&self) -> f64 {
        self.amount
    }

    pub fn tax(&self) -> f64 {
        0.0
    }

    pub fn total(&self) -> f64 {
        self.amount
    }
}

pub fn normalize_payment(raw: &Value) -> Payment {
    let id = text(field(raw, &["id", "transaction_id"])).unwrap_or_default();
    let transaction_id = text(raw.get("transaction_id")).unwrap_or_else(|| id.clone());

    Payment {
        transaction_id,
        invoice_number: text(raw.get("invoice_number")),
        amount: amount(field(raw, &["amount", "total_amount"])),
        paid_date: iso_date(field(raw, &["paid_date", "payment_date", "created_at"])),
        payment_method: text(raw.get("payment_method")).unwrap_or_else(|| "card".to_string()),
        description: text(raw.get("description")).unwrap_or_else(|| "Payment".to_string()),
        client_name: text(field(raw, &["client_name", "client"])),
        client_email: text(raw.get("client_email")),
        client_phone: text(raw.get("client_phone")),
        client_address: text(raw.get("client_address")),
        id,
    }
}

/// The envelope layouts the completed-payments endpoint has been seen to use,
/// tried in declaration order.
#[derive(Debug, PartialEq)]
pub enum PaymentsShape<'a> {
    /// `[...]`
    Bare(&'a [Value]),
    /// `{"data": [...]}`
    Data(&'a [Value]),
    /// `{"data": {"payments": [...]}}`
    NestedData(&'a [Value]),
    /// `{"results": [...]}`
    Results(&'a [Value]),
    Unrecognized,
}

impl<'a> PaymentsShape<'a> {
    pub fn detect(body: &'a Value) -> Self {
        if let Some(items) = body.as_array() {
            return Self::Bare(items);
        }
        if let Some(data) = body.get("data") {
            if let Some(items) = data.as_array() {
                return Self::Data(items);
            }
            if let Some(items) = data.get("payments").and_then(Value::as_array) {
                return Self::NestedData(items);
            }
        }
        if let Some(items) = body.get("results").and_then(Value::as_array) {
            return Self::Results(items);
        }
        Self::Unrecognized
    }

    pub fn records(&self) -> &'a [Value] {
        match self {
            Self::Bare(items) | Self::Data(items) | Self::NestedData(items) | Self::Results(items) => {
                items
            }
            Self::Unrecognized => &[],
        }
    }
}

/// Flatten any known payments envelope into normalized records
pub fn decode_payments(body: &Value) -> Vec<Payment> {
    let shape = PaymentsShape::detect(body);
    if shape == PaymentsShape::Unrecognized {
        tracing::warn!("unrecognized payments response shape; treating as empty");
    }
    shape.records().iter().map(normalize_payment).collect()
}
