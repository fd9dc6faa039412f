mod coerce;
mod invoice;
mod money;
mod payment;
mod summary;

pub use invoice::{normalize_invoice, Invoice, InvoiceAction, InvoiceId, InvoiceStatus};
pub use money::format_money;
pub use payment::{decode_payments, normalize_payment, Payment, PaymentsShape};
pub use summary::{normalize_summary, Summary};
