use chrono::NaiveDateTime;
use serde::Serialize;

use crate::error::{BillingError, Result};
use crate::model::{format_money, Invoice};

/// A single row in the invoice report table, formatted for display
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportRow {
    pub number: String,
    pub client: String,
    pub amount: String,
    pub paid: String,
    pub remaining: String,
    pub status: String,
    pub issue_date: String,
    pub due_date: String,
}

/// Aggregates over the loaded collection; never fetched from the server
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ReportTotals {
    pub invoice_count: usize,
    pub paid_count: usize,
    pub outstanding_count: usize,
    pub total_amount: f64,
    pub total_paid: f64,
    pub total_remaining: f64,
}

impl ReportTotals {
    pub fn from_invoices(invoices: &[Invoice]) -> Self {
        invoices.iter().fold(Self::default(), |mut acc, invoice| {
            acc.invoice_count += 1;
            if invoice.is_paid() {
                acc.paid_count += 1;
            } else if invoice.has_balance() {
                acc.outstanding_count += 1;
            }
            acc.total_amount += invoice.total_amount;
            acc.total_paid += invoice.paid_amount;
            acc.total_remaining += invoice.remaining_amount;
            acc
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryLine {
    pub label: String,
    pub value: String,
}

/// Complete data for rendering the invoice report PDF
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InvoiceReport {
    pub title: String,
    pub firm_name: String,
    pub generated_at: String,
    pub totals: ReportTotals,
    pub summary: Vec<SummaryLine>,
    pub rows: Vec<ReportRow>,
}

impl InvoiceReport {
    /// Build the report for `invoices` in their current order.
    /// An empty collection is refused rather than rendered.
    pub fn build(
        invoices: &[Invoice],
        firm_name: &str,
        currency_symbol: &str,
        generated_at: NaiveDateTime,
    ) -> Result<Self> {
        if invoices.is_empty() {
            return Err(BillingError::EmptyExport);
        }

        let money = |value: f64| format_money(value, currency_symbol);
        let totals = ReportTotals::from_invoices(invoices);

        let summary = vec![
            line("Invoices", totals.invoice_count.to_string()),
            line("Paid", totals.paid_count.to_string()),
            line("Outstanding", totals.outstanding_count.to_string()),
            line("Total billed", money(totals.total_amount)),
            line("Total paid", money(totals.total_paid)),
            line("Balance remaining", money(totals.total_remaining)),
        ];

        let rows = invoices
            .iter()
            .map(|invoice| ReportRow {
                number: invoice.invoice_number.clone(),
                client: invoice.client_name.clone(),
                amount: money(invoice.total_amount),
                paid: money(invoice.paid_amount),
                remaining: money(invoice.remaining_amount),
                status: invoice.status_label(),
                issue_date: invoice.issue_date_label(),
                due_date: invoice.due_date_label(),
            })
            .collect();

        Ok(Self {
            title: "Invoice Report".to_string(),
            firm_name: firm_name.to_string(),
            generated_at: generated_at.format("%B %d, %Y %H:%M").to_string(),
            totals,
            summary,
            rows,
        })
    }
}

fn line(label: &str, value: String) -> SummaryLine {
    SummaryLine {
        label: label.to_string(),
        value,
    }
}
