mod http;

pub use http::HttpBillingApi;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{BillingError, Result};
use crate::model::InvoiceId;

/// The billing REST service, as seen by the client.
///
/// Implementations unwrap the `{success, data, message}` envelope where the
/// endpoint uses one; decoding into domain records is left to the callers.
pub trait BillingApi {
    /// `data` of the invoice listing: `{invoices: [...], summary: {...}}`
    fn get_invoices(&self) -> Result<Value>;

    /// Raw completed-payments body; its layout varies
    fn get_completed_payments(&self) -> Result<Value>;

    /// Ask the gateway for a hosted checkout session
    fn create_checkout(&self, request: &CheckoutRequest) -> Result<CheckoutSession>;

    fn get_branding(&self) -> Result<FirmBranding>;

    /// Fetch raw bytes (used for the firm logo)
    fn download(&self, url: &str) -> Result<Vec<u8>>;
}

/// Response envelope shared by the billing endpoints
#[derive(Debug, Deserialize)]
pub struct Envelope {
    #[serde(default = "default_success")]
    pub success: bool,
    #[serde(default)]
    pub data: Option<Value>,
    #[serde(default)]
    pub message: Option<String>,
}

fn default_success() -> bool {
    true
}

impl Envelope {
    pub fn into_data(self, status: u16) -> Result<Value> {
        if !self.success {
            return Err(BillingError::Api {
                status,
                message: self
                    .message
                    .unwrap_or_else(|| "request was not successful".to_string()),
            });
        }
        Ok(self.data.unwrap_or(Value::Null))
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CheckoutRequest {
    pub invoice_id: InvoiceId,
    pub success_url: String,
    pub cancel_url: String,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct CheckoutSession {
    #[serde(default)]
    pub checkout_url: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct FirmBranding {
    #[serde(default)]
    pub logo_url: Option<String>,
    #[serde(default)]
    pub firm_name: Option<String>,
}
