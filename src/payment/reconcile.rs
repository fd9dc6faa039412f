use super::initiate::{CANCEL_FLAG, INVOICE_ID_PARAM, SUCCESS_FLAG};
use crate::invoice::InvoiceListController;
use crate::model::{Invoice, InvoiceId};
use crate::navigation::Location;
use crate::notify::{Notice, Notifier};

/// What the checkout reported through the return URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReturnParams {
    Success { invoice_id: InvoiceId },
    Cancelled,
}

impl ReturnParams {
    pub fn from_location(location: &Location) -> Option<Self> {
        let invoice_id = location
            .query_param(INVOICE_ID_PARAM)
            .filter(|id| !id.is_empty());

        if location.query_param(SUCCESS_FLAG).as_deref() == Some("true") {
            if let Some(id) = invoice_id {
                return Some(Self::Success {
                    invoice_id: InvoiceId::new(id),
                });
            }
        }

        if location.query_param(CANCEL_FLAG).as_deref() == Some("true") {
            return Some(Self::Cancelled);
        }

        None
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Reconciliation {
    /// No return parameters present
    Nothing,
    /// Success reported but the collection has not loaded yet
    Deferred,
    /// Success confirmed; `invoice` is the matching local record, if any.
    /// The caller must re-fetch.
    Confirmed { invoice: Option<Invoice> },
    Cancelled,
}

/// Evaluate the return parameters against the current collection.
///
/// Raises the user-facing notice and strips the parameters whenever it
/// resolves to `Confirmed` or `Cancelled`, so later runs are no-ops. Callers
/// re-run it after every invoice fetch while it returns `Deferred`.
pub fn reconcile_return(
    location: &mut Location,
    invoices: &InvoiceListController,
    notifier: &dyn Notifier,
) -> Reconciliation {
    let Some(params) = ReturnParams::from_location(location) else {
        return Reconciliation::Nothing;
    };

    match params {
        ReturnParams::Cancelled => {
            tracing::info!("checkout cancelled");
            notifier.notify(Notice::info("Payment cancelled. You have not been charged."));
            location.strip_query();
            Reconciliation::Cancelled
        }
        ReturnParams::Success { invoice_id } => {
            if !invoices.has_settled() {
                tracing::debug!(invoice = %invoice_id, "deferring reconciliation until invoices load");
                return Reconciliation::Deferred;
            }

            let invoice = invoices.find(&invoice_id).cloned();
            match &invoice {
                Some(inv) => notifier.notify(Notice::success(format!(
                    "Payment received for invoice {}. Thank you!",
                    inv.invoice_number
                ))),
                None => {
                    // The gateway already took the payment; trust it over our cache
                    tracing::warn!(invoice = %invoice_id, "paid invoice not in local collection");
                    notifier.notify(Notice::success(
                        "Payment received. Your invoices will update shortly.",
                    ));
                }
            }

            tracing::info!(invoice = %invoice_id, "checkout success reconciled");
            location.strip_query();
            Reconciliation::Confirmed { invoice }
        }
    }
}
