mod controller;
mod page;

pub use controller::{decode_invoice_listing, InvoiceCollection, InvoiceFilter, InvoiceListController};
pub use page::{export_notice, surface_export, InvoicePage, InvoicePageView, PayOutcome, ViewState};
