mod data;
mod document;
mod export;
mod letterhead;

pub use data::{InvoiceReport, ReportRow, ReportTotals, SummaryLine};
pub use document::{BillTo, DetailLine, LetterheadBlock, LineItem, RecordDocument, TotalLine};
pub use export::{invoice_filename, payment_filename, report_filename, Exporter};
pub use letterhead::{Letterhead, LogoImage};
