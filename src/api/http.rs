use serde_json::Value;
use ureq::{Agent, RequestBuilder};

use super::{BillingApi, CheckoutRequest, CheckoutSession, Envelope, FirmBranding};
use crate::config::ApiSettings;
use crate::error::{BillingError, Result};
use crate::model::InvoiceId;

const INVOICES_PATH: &str = "/billing/invoices/";
const COMPLETED_PAYMENTS_PATH: &str = "/billing/payments/completed/";
const BRANDING_PATH: &str = "/firm/branding/";

/// `BillingApi` over HTTP with a blocking ureq agent
pub struct HttpBillingApi {
    agent: Agent,
    base_url: String,
    token: Option<String>,
}

impl HttpBillingApi {
    pub fn new(settings: &ApiSettings) -> Self {
        // Error statuses still carry an envelope worth reading
        let agent: Agent = Agent::config_builder()
            .http_status_as_error(false)
            .build()
            .into();

        Self {
            agent,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            token: settings.token.clone(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Resolve a server-relative URL against the API base
    pub fn resolve(&self, url: &str) -> String {
        if url.starts_with("http://") || url.starts_with("https://") {
            url.to_string()
        } else if url.starts_with('/') {
            self.url(url)
        } else {
            format!("{}/{}", self.base_url, url)
        }
    }

    /// Checkout endpoint for one invoice; the id is percent-encoded
    pub fn checkout_url(&self, invoice_id: &InvoiceId) -> String {
        self.url(&format!(
            "/billing/invoices/{}/pay/",
            urlencoding::encode(invoice_id.as_str())
        ))
    }

    fn authorize<B>(&self, request: RequestBuilder<B>) -> RequestBuilder<B> {
        match &self.token {
            Some(token) => request.header("Authorization", format!("Bearer {token}")),
            None => request,
        }
    }

    fn get_json(&self, path: &str) -> Result<(u16, Value)> {
        let url = self.url(path);
        tracing::debug!(%url, "GET");

        let mut response = self
            .authorize(self.agent.get(&url))
            .header("Accept", "application/json")
            .call()?;
        let status = response.status().as_u16();
        let body = response.body_mut().read_to_string()?;

        Ok((status, parse_body(status, &body)?))
    }

    fn get_envelope(&self, path: &str) -> Result<Value> {
        let (status, body) = self.get_json(path)?;
        let envelope: Envelope = serde_json::from_value(body)
            .map_err(|e| BillingError::MalformedResponse(e.to_string()))?;
        envelope.into_data(status)
    }
}

/// Decode a JSON body, turning non-2xx statuses into API errors
fn parse_body(status: u16, body: &str) -> Result<Value> {
    let parsed: Option<Value> = serde_json::from_str(body).ok();

    if !(200..300).contains(&status) {
        let message = parsed
            .as_ref()
            .and_then(|v| v.get("message").or_else(|| v.get("detail")))
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| body.chars().take(200).collect());
        return Err(BillingError::Api { status, message });
    }

    parsed.ok_or_else(|| BillingError::MalformedResponse("response body is not JSON".to_string()))
}

impl BillingApi for HttpBillingApi {
    fn get_invoices(&self) -> Result<Value> {
        self.get_envelope(INVOICES_PATH)
    }

    fn get_completed_payments(&self) -> Result<Value> {
        let (status, body) = self.get_json(COMPLETED_PAYMENTS_PATH)?;
        if body.get("success").and_then(Value::as_bool) == Some(false) {
            let envelope: Envelope = serde_json::from_value(body)
                .map_err(|e| BillingError::MalformedResponse(e.to_string()))?;
            return envelope.into_data(status);
        }
        Ok(body)
    }

    fn create_checkout(&self, request: &CheckoutRequest) -> Result<CheckoutSession> {
        let url = self.checkout_url(&request.invoice_id);
        tracing::debug!(%url, "POST");

        let payload = serde_json::to_string(request)
            .map_err(|e| BillingError::MalformedResponse(e.to_string()))?;

        let mut response = self
            .authorize(self.agent.post(&url))
            .header("Content-Type", "application/json")
            .header("Accept", "application/json")
            .send(payload)?;
        let status = response.status().as_u16();
        let body = response.body_mut().read_to_string()?;

        let envelope: Envelope = serde_json::from_value(parse_body(status, &body)?)
            .map_err(|e| BillingError::MalformedResponse(e.to_string()))?;
        let data = envelope.into_data(status)?;
        if data.is_null() {
            return Ok(CheckoutSession::default());
        }

        serde_json::from_value(data).map_err(|e| BillingError::MalformedResponse(e.to_string()))
    }

    fn get_branding(&self) -> Result<FirmBranding> {
        let data = self.get_envelope(BRANDING_PATH)?;
        if data.is_null() {
            return Ok(FirmBranding::default());
        }
        let mut branding: FirmBranding = serde_json::from_value(data)
            .map_err(|e| BillingError::MalformedResponse(e.to_string()))?;
        branding.logo_url = branding
            .logo_url
            .filter(|u| !u.trim().is_empty())
            .map(|u| self.resolve(&u));
        Ok(branding)
    }

    fn download(&self, url: &str) -> Result<Vec<u8>> {
        let mut response = self.authorize(self.agent.get(url)).call()?;
        let status = response.status().as_u16();
        if !(200..300).contains(&status) {
            return Err(BillingError::Api {
                status,
                message: format!("could not download {url}"),
            });
        }
        Ok(response.body_mut().read_to_vec()?)
    }
}
