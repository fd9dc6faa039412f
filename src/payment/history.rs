use serde_json::Value;

use crate::api::BillingApi;
use crate::error::Result;
use crate::fetch::{FetchOutcome, FetchState, FetchTicket};
use crate::model::{decode_payments, Payment};
use crate::pagination::{Page, Pager};

/// Completed payments, fetched and paged independently of the invoice list
#[derive(Debug)]
pub struct PaymentHistoryController {
    payments: Vec<Payment>,
    pager: Pager,
    fetch: FetchState,
}

impl PaymentHistoryController {
    pub fn new(page_size: usize) -> Self {
        Self {
            payments: Vec::new(),
            pager: Pager::new(page_size),
            fetch: FetchState::default(),
        }
    }

    pub fn payments(&self) -> &[Payment] {
        &self.payments
    }

    pub fn is_loading(&self) -> bool {
        self.fetch.is_loading()
    }

    pub fn error(&self) -> Option<&str> {
        self.fetch.error()
    }

    pub fn find(&self, id: &str) -> Option<&Payment> {
        self.payments
            .iter()
            .find(|p| p.id == id || p.transaction_id == id)
    }

    pub fn page(&self) -> Page<'_, Payment> {
        self.pager.page(&self.payments)
    }

    pub fn next_page(&mut self) -> bool {
        let total = self.page().total_pages;
        self.pager.next(total)
    }

    pub fn previous_page(&mut self) -> bool {
        self.pager.previous()
    }

    pub fn go_to_page(&mut self, page: usize) -> bool {
        let total = self.page().total_pages;
        self.pager.go_to(page, total)
    }

    pub fn begin_fetch(&mut self) -> FetchTicket {
        tracing::debug!("fetching payment history");
        self.fetch.begin()
    }

    pub fn finish_fetch(&mut self, ticket: FetchTicket, result: Result<Value>) -> FetchOutcome {
        if !self.fetch.accept(ticket) {
            tracing::debug!("discarding stale payment history result");
            return FetchOutcome::Discarded;
        }

        match result {
            Ok(body) => {
                self.payments = decode_payments(&body);
                // A new collection always starts from the first page
                self.pager.reset();
                self.fetch.succeed();
                tracing::debug!(count = self.payments.len(), "payment history loaded");
                FetchOutcome::Replaced
            }
            Err(e) => {
                let message = format!("Failed to load payment history: {e}");
                tracing::warn!(error = %e, "payment history fetch failed");
                self.fetch.fail(message.clone());
                FetchOutcome::Failed(message)
            }
        }
    }

    pub fn refetch(&mut self, api: &dyn BillingApi) -> FetchOutcome {
        let ticket = self.begin_fetch();
        let result = api.get_completed_payments();
        self.finish_fetch(ticket, result)
    }

    pub fn dispose(&mut self) {
        self.fetch.dispose();
    }
}
