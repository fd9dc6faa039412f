use serde::Serialize;

use super::export::{invoice_filename, payment_filename};
use super::letterhead::{Letterhead, LogoImage};
use crate::error::{BillingError, Result};
use crate::model::{format_money, Invoice, Payment};
use crate::pdf::{TypstSource, RECORD_TEMPLATE};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DetailLine {
    pub label: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BillTo {
    pub name: String,
    pub lines: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineItem {
    pub description: String,
    pub quantity: u32,
    pub rate: String,
    pub amount: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TotalLine {
    pub label: String,
    pub value: String,
    /// Rendered bold below a rule
    pub emphasis: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LetterheadBlock {
    pub firm_name: String,
    pub initials: String,
    /// Asset file name when a logo is embedded
    pub logo: Option<String>,
}

/// One invoice or payment laid out as a printable document
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecordDocument {
    pub title: String,
    pub reference: String,
    pub letterhead: LetterheadBlock,
    pub details: Vec<DetailLine>,
    pub bill_to: BillTo,
    pub items: Vec<LineItem>,
    pub totals: Vec<TotalLine>,
    #[serde(skip)]
    pub filename: String,
    #[serde(skip)]
    logo: Option<LogoImage>,
}

fn detail(label: &str, value: impl Into<String>) -> DetailLine {
    DetailLine {
        label: label.to_string(),
        value: value.into(),
    }
}

fn total(label: &str, value: String, emphasis: bool) -> TotalLine {
    TotalLine {
        label: label.to_string(),
        value,
        emphasis,
    }
}

fn letterhead_block(letterhead: &Letterhead) -> LetterheadBlock {
    LetterheadBlock {
        firm_name: letterhead.firm_name.clone(),
        initials: letterhead.initials(),
        logo: letterhead.logo.as_ref().map(LogoImage::file_name),
    }
}

impl RecordDocument {
    pub fn for_invoice(invoice: &Invoice, letterhead: &Letterhead, currency_symbol: &str) -> Self {
        let money = |value: f64| format_money(value, currency_symbol);

        let mut details = vec![detail("Invoice #", invoice.invoice_number.clone())];
        let issued = invoice.issue_date_label();
        if !issued.is_empty() {
            details.push(detail("Date", issued));
        }
        let due = invoice.due_date_label();
        if !due.is_empty() {
            details.push(detail("Due Date", due));
        }
        details.push(detail("Status", invoice.status_label()));

        let description = if invoice.description.is_empty() {
            "Professional services".to_string()
        } else {
            invoice.description.clone()
        };

        Self {
            title: "INVOICE".to_string(),
            reference: invoice.invoice_number.clone(),
            letterhead: letterhead_block(letterhead),
            details,
            bill_to: BillTo {
                name: invoice.client_name.clone(),
                lines: Vec::new(),
            },
            items: vec![LineItem {
                description,
                quantity: 1,
                rate: money(invoice.total_amount),
                amount: money(invoice.total_amount),
            }],
            totals: vec![
                total("Subtotal", money(invoice.total_amount), false),
                total("Tax", money(0.0), false),
                total("Total", money(invoice.total_amount), true),
                total("Paid", money(invoice.paid_amount), false),
                total("Balance Due", money(invoice.remaining_amount), true),
            ],
            filename: invoice_filename(&invoice.invoice_number),
            logo: letterhead.logo.clone(),
        }
    }

    pub fn for_payment(payment: &Payment, letterhead: &Letterhead, currency_symbol: &str) -> Self {
        let money = |value: f64| format_money(value, currency_symbol);

        let mut details = vec![detail("Transaction", payment.transaction_id.clone())];
        if let Some(number) = &payment.invoice_number {
            details.push(detail("Invoice #", number.clone()));
        }
        if let Some(date) = &payment.paid_date {
            details.push(detail("Paid", date.clone()));
        }
        details.push(detail("Method", payment.payment_method.clone()));

        let lines = [&payment.client_email, &payment.client_phone, &payment.client_address]
            .into_iter()
            .flatten()
            .cloned()
            .collect();

        Self {
            title: "PAYMENT RECEIPT".to_string(),
            reference: payment.transaction_id.clone(),
            letterhead: letterhead_block(letterhead),
            details,
            bill_to: BillTo {
                name: payment.client_name.clone().unwrap_or_default(),
                lines,
            },
            items: vec![LineItem {
                description: payment.description.clone(),
                quantity: payment.quantity(),
                rate: money(payment.rate()),
                amount: money(payment.subtotal()),
            }],
            totals: vec![
                total("Subtotal", money(payment.subtotal()), false),
                total("Tax", money(payment.tax()), false),
                total("Total", money(payment.total()), true),
            ],
            filename: payment_filename(&payment.transaction_id),
            logo: letterhead.logo.clone(),
        }
    }

    pub fn to_source(&self) -> Result<TypstSource> {
        let data = serde_json::to_value(self)
            .map_err(|e| BillingError::PdfGeneration(e.to_string()))?;
        let assets = self
            .logo
            .iter()
            .map(|logo| (logo.file_name(), logo.bytes.clone()))
            .collect();

        Ok(TypstSource {
            template: RECORD_TEMPLATE,
            data,
            assets,
        })
    }
}
