use serde_json::Value;
use std::str::FromStr;

use crate::api::BillingApi;
use crate::error::Result;
use crate::fetch::{FetchOutcome, FetchState, FetchTicket};
use crate::model::{normalize_invoice, normalize_summary, Invoice, InvoiceId, Summary};

/// Invoices and summary as returned together by the listing endpoint
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InvoiceCollection {
    pub invoices: Vec<Invoice>,
    pub summary: Summary,
}

/// Decode the listing's `data` object. Missing parts decode as empty.
pub fn decode_invoice_listing(data: &Value) -> InvoiceCollection {
    let records = data
        .get("invoices")
        .and_then(Value::as_array)
        .or_else(|| data.as_array())
        .map(Vec::as_slice)
        .unwrap_or_default();

    InvoiceCollection {
        invoices: records.iter().map(normalize_invoice).collect(),
        summary: normalize_summary(data.get("summary")),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InvoiceFilter {
    #[default]
    All,
    Outstanding,
    Paid,
}

impl InvoiceFilter {
    pub fn matches(&self, invoice: &Invoice) -> bool {
        match self {
            Self::All => true,
            Self::Outstanding => !invoice.is_paid() && invoice.has_balance(),
            Self::Paid => invoice.is_paid(),
        }
    }
}

impl FromStr for InvoiceFilter {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "all" => Ok(Self::All),
            "outstanding" | "unpaid" => Ok(Self::Outstanding),
            "paid" => Ok(Self::Paid),
            other => Err(format!(
                "invalid filter '{other}'. Use 'all', 'outstanding', or 'paid'."
            )),
        }
    }
}

/// Owns the fetched invoice collection and its loading/error state
#[derive(Debug, Default)]
pub struct InvoiceListController {
    invoices: Vec<Invoice>,
    summary: Summary,
    fetch: FetchState,
}

impl InvoiceListController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn invoices(&self) -> &[Invoice] {
        &self.invoices
    }

    pub fn summary(&self) -> &Summary {
        &self.summary
    }

    pub fn is_loading(&self) -> bool {
        self.fetch.is_loading()
    }

    pub fn error(&self) -> Option<&str> {
        self.fetch.error()
    }

    pub fn has_settled(&self) -> bool {
        self.fetch.has_settled()
    }

    pub fn find(&self, id: &InvoiceId) -> Option<&Invoice> {
        self.invoices.iter().find(|invoice| &invoice.id == id)
    }

    pub fn filtered(&self, filter: InvoiceFilter) -> Vec<&Invoice> {
        self.invoices.iter().filter(|i| filter.matches(i)).collect()
    }

    /// Unpaid invoices that still carry a balance
    pub fn outstanding(&self) -> Vec<&Invoice> {
        self.filtered(InvoiceFilter::Outstanding)
    }

    pub fn paid(&self) -> Vec<&Invoice> {
        self.filtered(InvoiceFilter::Paid)
    }

    pub fn begin_fetch(&mut self) -> FetchTicket {
        tracing::debug!("fetching invoices");
        self.fetch.begin()
    }

    /// Apply a listing result. Failures keep the previous collection.
    pub fn finish_fetch(&mut self, ticket: FetchTicket, result: Result<Value>) -> FetchOutcome {
        if !self.fetch.accept(ticket) {
            tracing::debug!("discarding stale invoice fetch result");
            return FetchOutcome::Discarded;
        }

        match result {
            Ok(data) => {
                let collection = decode_invoice_listing(&data);
                tracing::debug!(count = collection.invoices.len(), "invoices loaded");
                self.invoices = collection.invoices;
                self.summary = collection.summary;
                self.fetch.succeed();
                FetchOutcome::Replaced
            }
            Err(e) => {
                let message = format!("Failed to load invoices: {e}");
                tracing::warn!(error = %e, "invoice fetch failed");
                self.fetch.fail(message.clone());
                FetchOutcome::Failed(message)
            }
        }
    }

    pub fn refetch(&mut self, api: &dyn BillingApi) -> FetchOutcome {
        let ticket = self.begin_fetch();
        let result = api.get_invoices();
        self.finish_fetch(ticket, result)
    }

    /// Stop accepting results; in-flight fetches are dropped on arrival
    pub fn dispose(&mut self) {
        self.fetch.dispose();
    }

    pub fn is_disposed(&self) -> bool {
        self.fetch.is_disposed()
    }
}
