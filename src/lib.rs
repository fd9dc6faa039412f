pub mod api;
pub mod config;
pub mod error;
pub mod fetch;
pub mod invoice;
pub mod model;
pub mod navigation;
pub mod notify;
pub mod pagination;
pub mod payment;
pub mod pdf;
pub mod report;

pub use config::Config;
pub use error::{BillingError, Result};
pub use invoice::{InvoicePage, InvoiceListController};
pub use model::{Invoice, InvoiceId, Payment, Summary};
pub use payment::PaymentHistoryController;
