use chrono::NaiveDateTime;
use serde_json::Value;
use std::path::PathBuf;

use super::controller::{InvoiceFilter, InvoiceListController};
use crate::api::BillingApi;
use crate::error::{BillingError, Result};
use crate::fetch::{FetchOutcome, FetchTicket};
use crate::model::{Invoice, InvoiceId};
use crate::navigation::{Location, Navigator};
use crate::notify::{Notice, Notifier};
use crate::pagination::Pager;
use crate::payment::{reconcile_return, start_checkout, Reconciliation};
use crate::report::{Exporter, Letterhead};

/// What the page is currently showing on top of the list
#[derive(Debug, Clone, PartialEq, Default)]
pub enum ViewState {
    #[default]
    Idle,
    Viewing(Invoice),
    Paying(Invoice),
}

#[derive(Debug, Clone, PartialEq)]
pub enum PayOutcome {
    Redirected { checkout_url: String },
    Aborted,
}

/// Rows of the current page, detached from the page's borrow
#[derive(Debug, Clone, PartialEq)]
pub struct InvoicePageView {
    pub rows: Vec<Invoice>,
    pub current_page: usize,
    pub total_pages: usize,
    pub start_index: usize,
    pub end_index: usize,
    pub total_rows: usize,
}

/// The invoice list screen: collection, paging, selection and both halves of
/// the checkout flow
pub struct InvoicePage {
    controller: InvoiceListController,
    pager: Pager,
    filter: InvoiceFilter,
    view: ViewState,
    location: Location,
    paid_invoice: Option<Invoice>,
}

impl InvoicePage {
    pub fn new(location: Location, page_size: usize) -> Self {
        Self {
            controller: InvoiceListController::new(),
            pager: Pager::new(page_size),
            filter: InvoiceFilter::All,
            view: ViewState::Idle,
            location,
            paid_invoice: None,
        }
    }

    pub fn controller(&self) -> &InvoiceListController {
        &self.controller
    }

    pub fn location(&self) -> &Location {
        &self.location
    }

    pub fn view(&self) -> &ViewState {
        &self.view
    }

    pub fn filter(&self) -> InvoiceFilter {
        self.filter
    }

    pub fn current_page(&self) -> usize {
        self.pager.current_page()
    }

    /// Invoice confirmed paid by the last checkout return
    pub fn paid_invoice(&self) -> Option<&Invoice> {
        self.paid_invoice.as_ref()
    }

    pub fn dismiss_confirmation(&mut self) {
        self.paid_invoice = None;
    }

    /// Check the return parameters, then load the collection
    pub fn mount(&mut self, api: &dyn BillingApi, notifier: &dyn Notifier) {
        self.check_return(api, notifier);
        self.refresh(api, notifier);
    }

    /// Tear down; fetches still in flight are dropped when they complete
    pub fn unmount(&mut self) {
        self.controller.dispose();
    }

    pub fn refresh(&mut self, api: &dyn BillingApi, notifier: &dyn Notifier) -> FetchOutcome {
        let ticket = self.begin_refresh();
        let result = api.get_invoices();
        self.complete_refresh(ticket, result, api, notifier)
    }

    pub fn begin_refresh(&mut self) -> FetchTicket {
        self.controller.begin_fetch()
    }

    /// Apply a listing result, then re-run the return check against it
    pub fn complete_refresh(
        &mut self,
        ticket: FetchTicket,
        result: Result<Value>,
        api: &dyn BillingApi,
        notifier: &dyn Notifier,
    ) -> FetchOutcome {
        let outcome = self.controller.finish_fetch(ticket, result);
        if outcome == FetchOutcome::Discarded {
            return outcome;
        }

        if let FetchOutcome::Failed(message) = &outcome {
            notifier.notify(Notice::error(message.clone()));
        } else {
            // New data set: back to the first page, nothing left open
            self.pager.reset();
            self.view = ViewState::Idle;
        }

        self.check_return(api, notifier);
        outcome
    }

    /// Reconcile a checkout return. A confirmed payment triggers one re-fetch.
    pub fn check_return(
        &mut self,
        api: &dyn BillingApi,
        notifier: &dyn Notifier,
    ) -> Reconciliation {
        let result = reconcile_return(&mut self.location, &self.controller, notifier);

        if let Reconciliation::Confirmed { invoice } = &result {
            self.paid_invoice = invoice.clone();
            self.refresh(api, notifier);
        }
        result
    }

    fn filtered(&self) -> Vec<&Invoice> {
        self.controller.filtered(self.filter)
    }

    pub fn total_pages(&self) -> usize {
        self.pager.page(&self.filtered()).total_pages
    }

    pub fn page_view(&self) -> InvoicePageView {
        let filtered = self.filtered();
        let page = self.pager.page(&filtered);

        InvoicePageView {
            rows: page.items.iter().map(|i| (*i).clone()).collect(),
            current_page: page.current_page,
            total_pages: page.total_pages,
            start_index: page.start_index,
            end_index: page.end_index,
            total_rows: filtered.len(),
        }
    }

    fn page_changed(&mut self, changed: bool) -> bool {
        if changed {
            self.view = ViewState::Idle;
        }
        changed
    }

    pub fn next_page(&mut self) -> bool {
        let total = self.total_pages();
        let changed = self.pager.next(total);
        self.page_changed(changed)
    }

    pub fn previous_page(&mut self) -> bool {
        let changed = self.pager.previous();
        self.page_changed(changed)
    }

    pub fn go_to_page(&mut self, page: usize) -> bool {
        let total = self.total_pages();
        let changed = self.pager.go_to(page, total);
        self.page_changed(changed)
    }

    pub fn set_filter(&mut self, filter: InvoiceFilter) {
        if filter != self.filter {
            self.filter = filter;
            self.pager.reset();
            self.view = ViewState::Idle;
        }
    }

    pub fn set_page_size(&mut self, page_size: usize) {
        self.pager.set_page_size(page_size);
        self.view = ViewState::Idle;
    }

    pub fn open_invoice(&mut self, id: &InvoiceId) -> Result<()> {
        let invoice = self
            .controller
            .find(id)
            .cloned()
            .ok_or_else(|| BillingError::InvoiceNotFound(id.to_string()))?;
        self.view = ViewState::Viewing(invoice);
        Ok(())
    }

    pub fn close_invoice(&mut self) {
        self.view = ViewState::Idle;
    }

    /// Start the hosted checkout for an invoice with a balance.
    ///
    /// Failures are reported through `notifier` and leave the collection as
    /// it was, so the user can try again.
    pub fn pay(
        &mut self,
        id: &InvoiceId,
        api: &dyn BillingApi,
        navigator: &dyn Navigator,
        notifier: &dyn Notifier,
    ) -> PayOutcome {
        if matches!(self.view, ViewState::Paying(_)) {
            notifier.notify(Notice::info("A payment is already being started."));
            return PayOutcome::Aborted;
        }

        let Some(invoice) = self.controller.find(id).cloned() else {
            let error = BillingError::InvoiceNotFound(id.to_string());
            notifier.notify(Notice::error(error.to_string()));
            return PayOutcome::Aborted;
        };

        self.view = ViewState::Paying(invoice.clone());

        match start_checkout(api, navigator, &self.location, &invoice) {
            Ok(checkout_url) => PayOutcome::Redirected { checkout_url },
            Err(e) => {
                tracing::warn!(invoice = %invoice.id, error = %e, "checkout could not be started");
                notifier.notify(Notice::error(format!("Could not start payment: {e}")));
                self.view = ViewState::Idle;
                PayOutcome::Aborted
            }
        }
    }

    /// Export the loaded collection as a PDF report
    pub fn export_report(
        &self,
        exporter: &Exporter<'_>,
        firm_name: &str,
        generated_at: NaiveDateTime,
        output: Option<PathBuf>,
        notifier: &dyn Notifier,
    ) -> Option<PathBuf> {
        let result = exporter.export_invoices_to(
            self.controller.invoices(),
            firm_name,
            generated_at,
            output,
        );
        surface_export(result, notifier)
    }

    /// Download a single invoice document
    pub fn download_invoice(
        &self,
        id: &InvoiceId,
        exporter: &Exporter<'_>,
        letterhead: &Letterhead,
        output: Option<PathBuf>,
        notifier: &dyn Notifier,
    ) -> Option<PathBuf> {
        let result = self
            .controller
            .find(id)
            .ok_or_else(|| BillingError::InvoiceNotFound(id.to_string()))
            .and_then(|invoice| {
                exporter.download(&exporter.invoice_document(invoice, letterhead), output)
            });
        surface_export(result, notifier)
    }

    pub fn print_invoice(
        &self,
        id: &InvoiceId,
        exporter: &Exporter<'_>,
        letterhead: &Letterhead,
        notifier: &dyn Notifier,
    ) -> bool {
        let result = self
            .controller
            .find(id)
            .ok_or_else(|| BillingError::InvoiceNotFound(id.to_string()))
            .and_then(|invoice| exporter.print_invoice(invoice, letterhead));
        match result {
            Ok(()) => {
                notifier.notify(Notice::success("Sent to printer."));
                true
            }
            Err(e) => {
                notifier.notify(export_notice(&e));
                false
            }
        }
    }
}

/// Export failures become notices rather than errors
pub fn surface_export(result: Result<PathBuf>, notifier: &dyn Notifier) -> Option<PathBuf> {
    match result {
        Ok(path) => {
            notifier.notify(Notice::success(format!("Saved {}", path.display())));
            Some(path)
        }
        Err(e) => {
            notifier.notify(export_notice(&e));
            None
        }
    }
}

pub fn export_notice(error: &BillingError) -> Notice {
    match error {
        BillingError::EmptyExport => Notice::warning("There is nothing to export yet."),
        other => Notice::error(format!("Export failed: {other}")),
    }
}
