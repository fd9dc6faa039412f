use serde::Serialize;
use serde_json::Value;

use super::coerce::{amount, count, field, iso_date};

/// Aggregate figures as reported by the server
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Summary {
    pub outstanding_balance: f64,
    pub paid_this_year: f64,
    pub next_due_date: Option<String>,
    pub total_invoices: u64,
    pub outstanding_count: u64,
}

/// A missing or non-object summary becomes the zeroed default
pub fn normalize_summary(raw: Option<&Value>) -> Summary {
    let Some(raw) = raw.filter(|v| v.is_object()) else {
        return Summary::default();
    };

    Summary {
        outstanding_balance: amount(raw.get("outstanding_balance")),
        paid_this_year: amount(raw.get("paid_this_year")),
        next_due_date: iso_date(raw.get("next_due_date")),
        total_invoices: count(field(raw, &["total_invoices", "invoice_count"])),
        outstanding_count: count(raw.get("outstanding_count")),
    }
}
