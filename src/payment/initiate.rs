use crate::api::{BillingApi, CheckoutRequest};
use crate::error::{BillingError, Result};
use crate::model::{Invoice, InvoiceAction, InvoiceId};
use crate::navigation::{Location, Navigator};

pub const SUCCESS_FLAG: &str = "payment_success";
pub const CANCEL_FLAG: &str = "payment_cancelled";
pub const INVOICE_ID_PARAM: &str = "invoice_id";

/// Where the hosted checkout sends the browser afterwards
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReturnUrls {
    pub success_url: String,
    pub cancel_url: String,
}

/// Both URLs point back at the invoice list itself; any query the list was
/// opened with is dropped.
pub fn return_urls(location: &Location, invoice_id: &InvoiceId) -> ReturnUrls {
    ReturnUrls {
        success_url: location.with_query(&[
            (SUCCESS_FLAG, "true"),
            (INVOICE_ID_PARAM, invoice_id.as_str()),
        ]),
        cancel_url: location.with_query(&[(CANCEL_FLAG, "true")]),
    }
}

/// Create a checkout session for `invoice` and redirect to it.
///
/// Returns the checkout URL once navigation has been handed off. On any
/// error nothing has been navigated.
pub fn start_checkout(
    api: &dyn BillingApi,
    navigator: &dyn Navigator,
    location: &Location,
    invoice: &Invoice,
) -> Result<String> {
    // Only rows offering Pay Now may start a checkout
    if invoice.action() != InvoiceAction::PayNow {
        return Err(BillingError::InvoiceNotPayable(invoice.invoice_number.clone()));
    }

    let urls = return_urls(location, &invoice.id);
    let request = CheckoutRequest {
        invoice_id: invoice.id.clone(),
        success_url: urls.success_url,
        cancel_url: urls.cancel_url,
    };

    tracing::info!(invoice = %invoice.id, "creating checkout session");
    let session = api.create_checkout(&request)?;

    let checkout_url = session
        .checkout_url
        .filter(|url| !url.trim().is_empty())
        .ok_or(BillingError::MissingCheckoutUrl)?;

    navigator.redirect(&checkout_url)?;
    tracing::info!(invoice = %invoice.id, "redirected to hosted checkout");
    Ok(checkout_url)
}
