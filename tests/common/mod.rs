#![allow(dead_code)]

use serde_json::{json, Value};
use std::cell::{Cell, RefCell};
use std::path::{Path, PathBuf};

use practice_billing::api::{BillingApi, CheckoutRequest, CheckoutSession, FirmBranding};
use practice_billing::navigation::Navigator;
use practice_billing::notify::{Notice, NoticeLevel, Notifier};
use practice_billing::pdf::{DocumentCompiler, TypstSource};
use practice_billing::{BillingError, Result};

/// How the fake gateway answers a checkout request
#[derive(Debug, Clone)]
pub enum CheckoutReply {
    Url(String),
    NoUrl,
    Reject,
}

/// In-memory billing service with call counters
pub struct FakeApi {
    /// `None` makes the listing fail
    pub invoices: RefCell<Option<Value>>,
    pub payments: RefCell<Option<Value>>,
    pub checkout: RefCell<CheckoutReply>,
    pub branding: RefCell<Option<FirmBranding>>,
    pub logo: RefCell<Option<Vec<u8>>>,
    pub invoice_fetches: Cell<usize>,
    pub payment_fetches: Cell<usize>,
    pub checkout_requests: RefCell<Vec<CheckoutRequest>>,
}

impl FakeApi {
    pub fn with_invoices(invoices: Value) -> Self {
        Self {
            invoices: RefCell::new(Some(json!({ "invoices": invoices, "summary": {} }))),
            payments: RefCell::new(Some(json!([]))),
            checkout: RefCell::new(CheckoutReply::Url(
                "https://checkout.example.com/s/abc".to_string(),
            )),
            branding: RefCell::new(None),
            logo: RefCell::new(None),
            invoice_fetches: Cell::new(0),
            payment_fetches: Cell::new(0),
            checkout_requests: RefCell::new(Vec::new()),
        }
    }

    pub fn failing() -> Self {
        let api = Self::with_invoices(json!([]));
        *api.invoices.borrow_mut() = None;
        *api.payments.borrow_mut() = None;
        api
    }

    pub fn set_listing(&self, data: Value) {
        *self.invoices.borrow_mut() = Some(data);
    }
}

impl BillingApi for FakeApi {
    fn get_invoices(&self) -> Result<Value> {
        self.invoice_fetches.set(self.invoice_fetches.get() + 1);
        self.invoices.borrow().clone().ok_or(BillingError::Api {
            status: 500,
            message: "server error".to_string(),
        })
    }

    fn get_completed_payments(&self) -> Result<Value> {
        self.payment_fetches.set(self.payment_fetches.get() + 1);
        self.payments.borrow().clone().ok_or(BillingError::Api {
            status: 503,
            message: "unavailable".to_string(),
        })
    }

    fn create_checkout(&self, request: &CheckoutRequest) -> Result<CheckoutSession> {
        self.checkout_requests.borrow_mut().push(request.clone());
        match &*self.checkout.borrow() {
            CheckoutReply::Url(url) => Ok(CheckoutSession {
                checkout_url: Some(url.clone()),
            }),
            CheckoutReply::NoUrl => Ok(CheckoutSession { checkout_url: None }),
            CheckoutReply::Reject => Err(BillingError::Api {
                status: 402,
                message: "card declined".to_string(),
            }),
        }
    }

    fn get_branding(&self) -> Result<FirmBranding> {
        self.branding.borrow().clone().ok_or(BillingError::Api {
            status: 404,
            message: "no branding".to_string(),
        })
    }

    fn download(&self, _url: &str) -> Result<Vec<u8>> {
        self.logo
            .borrow()
            .clone()
            .ok_or_else(|| BillingError::MalformedResponse("no logo".to_string()))
    }
}

#[derive(Default)]
pub struct RecordingNotifier {
    pub notices: RefCell<Vec<Notice>>,
}

impl RecordingNotifier {
    pub fn messages(&self) -> Vec<String> {
        self.notices.borrow().iter().map(|n| n.message.clone()).collect()
    }

    pub fn count(&self, level: NoticeLevel) -> usize {
        self.notices.borrow().iter().filter(|n| n.level == level).count()
    }

    pub fn last(&self) -> Option<Notice> {
        self.notices.borrow().last().cloned()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notice: Notice) {
        self.notices.borrow_mut().push(notice);
    }
}

#[derive(Default)]
pub struct RecordingNavigator {
    pub visited: RefCell<Vec<String>>,
}

impl Navigator for RecordingNavigator {
    fn redirect(&self, url: &str) -> Result<()> {
        self.visited.borrow_mut().push(url.to_string());
        Ok(())
    }
}

/// Writes a placeholder PDF and keeps every source it was given
#[derive(Default)]
pub struct FakeCompiler {
    pub sources: RefCell<Vec<(TypstSource, PathBuf)>>,
}

impl FakeCompiler {
    pub fn last_data(&self) -> Value {
        self.sources
            .borrow()
            .last()
            .map(|(source, _)| source.data.clone())
            .unwrap_or(Value::Null)
    }
}

impl DocumentCompiler for FakeCompiler {
    fn compile(&self, source: &TypstSource, output_path: &Path) -> Result<()> {
        std::fs::write(output_path, b"%PDF-1.7 fake")?;
        self.sources
            .borrow_mut()
            .push((source.clone(), output_path.to_path_buf()));
        Ok(())
    }
}

pub fn invoice(id: u64, number: &str, status: &str, total: f64, paid: f64) -> Value {
    json!({
        "id": id,
        "invoice_number": number,
        "status": status,
        "total_amount": format!("{total:.2}"),
        "paid_amount": format!("{paid:.2}"),
        "remaining_amount": format!("{:.2}", total - paid),
        "issue_date": "2026-01-05",
        "due_date": "2026-02-04",
        "client_name": "Jordan Lee",
    })
}
