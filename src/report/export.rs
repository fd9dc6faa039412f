use chrono::NaiveDateTime;
use std::path::{Path, PathBuf};
use std::process::Command;

use super::data::InvoiceReport;
use super::document::RecordDocument;
use super::letterhead::Letterhead;
use crate::error::{BillingError, Result};
use crate::model::{Invoice, Payment};
use crate::pdf::{DocumentCompiler, TypstSource, REPORT_TEMPLATE};

/// Replace anything that is not safe in a file name
fn sanitize(component: &str) -> String {
    let cleaned: String = component
        .trim()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.' {
                c
            } else {
                '-'
            }
        })
        .collect();

    if cleaned.is_empty() {
        "unknown".to_string()
    } else {
        cleaned
    }
}

/// `invoice-report-2026-10-16-142501.pdf`
pub fn report_filename(generated_at: NaiveDateTime) -> String {
    format!(
        "invoice-report-{}.pdf",
        generated_at.format("%Y-%m-%d-%H%M%S")
    )
}

pub fn invoice_filename(invoice_number: &str) -> String {
    format!("invoice-{}.pdf", sanitize(invoice_number))
}

pub fn payment_filename(transaction_id: &str) -> String {
    format!("payment-{}.pdf", sanitize(transaction_id))
}

/// Writes reports and single-record documents, and sends them to the printer
pub struct Exporter<'a> {
    compiler: &'a dyn DocumentCompiler,
    output_dir: PathBuf,
    currency_symbol: String,
    print_command: String,
}

impl<'a> Exporter<'a> {
    pub fn new(
        compiler: &'a dyn DocumentCompiler,
        output_dir: impl Into<PathBuf>,
        currency_symbol: impl Into<String>,
    ) -> Self {
        Self {
            compiler,
            output_dir: output_dir.into(),
            currency_symbol: currency_symbol.into(),
            print_command: "lp".to_string(),
        }
    }

    pub fn with_print_command(mut self, command: impl Into<String>) -> Self {
        self.print_command = command.into();
        self
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    fn write(&self, source: &TypstSource, path: &Path) -> Result<PathBuf> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        self.compiler.compile(source, path)?;
        Ok(path.to_path_buf())
    }

    /// Bulk report over the loaded collection, by default under a timestamped name
    pub fn export_invoices_to(
        &self,
        invoices: &[Invoice],
        firm_name: &str,
        generated_at: NaiveDateTime,
        output: Option<PathBuf>,
    ) -> Result<PathBuf> {
        let report = InvoiceReport::build(invoices, firm_name, &self.currency_symbol, generated_at)?;
        let data = serde_json::to_value(&report)
            .map_err(|e| BillingError::PdfGeneration(e.to_string()))?;

        let source = TypstSource {
            template: REPORT_TEMPLATE,
            data,
            assets: Vec::new(),
        };
        let path = output.unwrap_or_else(|| self.output_dir.join(report_filename(generated_at)));

        tracing::info!(invoices = invoices.len(), path = %path.display(), "exporting invoice report");
        self.write(&source, &path)
    }

    pub fn invoice_document(&self, invoice: &Invoice, letterhead: &Letterhead) -> RecordDocument {
        RecordDocument::for_invoice(invoice, letterhead, &self.currency_symbol)
    }

    pub fn payment_document(&self, payment: &Payment, letterhead: &Letterhead) -> RecordDocument {
        RecordDocument::for_payment(payment, letterhead, &self.currency_symbol)
    }

    /// Write a single-record document, by default under its keyed file name
    pub fn download(&self, document: &RecordDocument, output: Option<PathBuf>) -> Result<PathBuf> {
        let path = output.unwrap_or_else(|| self.output_dir.join(&document.filename));
        tracing::info!(reference = %document.reference, path = %path.display(), "saving document");
        self.write(&document.to_source()?, &path)
    }

    /// Compile into a scratch file and hand it to the print spooler
    pub fn print(&self, document: &RecordDocument) -> Result<()> {
        let scratch = std::env::temp_dir().join(format!(
            "billing-print-{}-{}",
            std::process::id(),
            document.filename
        ));
        self.compiler.compile(&document.to_source()?, &scratch)?;

        tracing::info!(reference = %document.reference, command = %self.print_command, "printing");
        let status = Command::new(&self.print_command).arg(&scratch).status();
        let _ = std::fs::remove_file(&scratch);

        match status {
            Ok(status) if status.success() => Ok(()),
            Ok(status) => Err(BillingError::PrintFailed(format!(
                "{} exited with {}",
                self.print_command, status
            ))),
            Err(e) => Err(BillingError::PrintFailed(format!(
                "{}: {}",
                self.print_command, e
            ))),
        }
    }

    pub fn print_invoice(&self, invoice: &Invoice, letterhead: &Letterhead) -> Result<()> {
        self.print(&self.invoice_document(invoice, letterhead))
    }

    pub fn print_payment(&self, payment: &Payment, letterhead: &Letterhead) -> Result<()> {
        self.print(&self.payment_document(payment, letterhead))
    }
}
