use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

use super::coerce::{amount, field, iso_date, text};

/// Server-assigned invoice identifier; numeric ids are kept in decimal form
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InvoiceId(String);

impl InvoiceId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for InvoiceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for InvoiceId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<u64> for InvoiceId {
    fn from(id: u64) -> Self {
        Self(id.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvoiceStatus {
    Pending,
    Paid,
    Overdue,
    Other(String),
}

impl InvoiceStatus {
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "pending" => Self::Pending,
            "paid" => Self::Paid,
            "overdue" => Self::Overdue,
            _ => Self::Other(raw.trim().to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Pending => "pending",
            Self::Paid => "paid",
            Self::Overdue => "overdue",
            Self::Other(s) => s,
        }
    }
}

impl fmt::Display for InvoiceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for InvoiceStatus {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// What the invoice row offers the user
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvoiceAction {
    PayNow,
    PaidInvoice,
    NoBalance,
}

impl fmt::Display for InvoiceAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::PayNow => "Pay Now",
            Self::PaidInvoice => "Paid Invoice",
            Self::NoBalance => "No balance due",
        };
        f.write_str(label)
    }
}

/// Canonical invoice record
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Invoice {
    pub id: InvoiceId,
    pub invoice_number: String,
    pub status: InvoiceStatus,
    /// Presentation hints supplied by the server
    pub status_display: Option<String>,
    pub status_color: Option<String>,
    pub total_amount: f64,
    pub paid_amount: f64,
    pub remaining_amount: f64,
    pub issue_date: Option<String>,
    pub due_date: Option<String>,
    pub issue_date_display: Option<String>,
    pub due_date_display: Option<String>,
    pub description: String,
    pub client_name: String,
}

impl Invoice {
    /// Paid when the server says so, or when a payment cleared the balance
    pub fn is_paid(&self) -> bool {
        self.status == InvoiceStatus::Paid
            || (self.remaining_amount == 0.0 && self.paid_amount > 0.0)
    }

    pub fn has_balance(&self) -> bool {
        self.remaining_amount > 0.0
    }

    pub fn action(&self) -> InvoiceAction {
        if self.is_paid() {
            InvoiceAction::PaidInvoice
        } else if self.has_balance() {
            InvoiceAction::PayNow
        } else {
            InvoiceAction::NoBalance
        }
    }

    pub fn status_label(&self) -> String {
        match &self.status_display {
            Some(label) => label.clone(),
            None => capitalize(self.status.as_str()),
        }
    }

    pub fn issue_date_label(&self) -> String {
        self.issue_date_display
            .clone()
            .or_else(|| self.issue_date.clone())
            .unwrap_or_default()
    }

    pub fn due_date_label(&self) -> String {
        self.due_date_display
            .clone()
            .or_else(|| self.due_date.clone())
            .unwrap_or_default()
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Convert a raw server invoice into the canonical shape. Never fails.
pub fn normalize_invoice(raw: &Value) -> Invoice {
    let id = InvoiceId::new(text(raw.get("id")).unwrap_or_default());

    let invoice_number =
        text(raw.get("invoice_number")).unwrap_or_else(|| format!("INV-{}", id));

    let status = text(raw.get("status"))
        .map(|s| InvoiceStatus::parse(&s))
        .unwrap_or(InvoiceStatus::Pending);

    Invoice {
        invoice_number,
        status,
        status_display: text(raw.get("status_display")),
        status_color: text(raw.get("status_color")),
        total_amount: amount(field(raw, &["total_amount", "amount"])),
        paid_amount: amount(raw.get("paid_amount")),
        remaining_amount: amount(raw.get("remaining_amount")),
        issue_date: iso_date(field(raw, &["issue_date", "created_at"])),
        due_date: iso_date(raw.get("due_date")),
        issue_date_display: text(field(raw, &["formatted_issue_date", "issue_date_display"])),
        due_date_display: text(field(raw, &["formatted_due_date", "due_date_display"])),
        description: text(raw.get("description")).unwrap_or_default(),
        client_name: text(field(raw, &["client_name", "client"])).unwrap_or_default(),
        id,
    }
}
