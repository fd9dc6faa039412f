mod history;
mod initiate;
mod reconcile;

pub use history::PaymentHistoryController;
pub use initiate::{
    return_urls, start_checkout, ReturnUrls, CANCEL_FLAG, INVOICE_ID_PARAM, SUCCESS_FLAG,
};
pub use reconcile::{reconcile_return, Reconciliation, ReturnParams};
