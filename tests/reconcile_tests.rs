mod common;

use serde_json::json;

use common::{invoice, CheckoutReply, FakeApi, RecordingNavigator, RecordingNotifier};
use practice_billing::api::{BillingApi, HttpBillingApi};
use practice_billing::config::ApiSettings;
use practice_billing::fetch::FetchOutcome;
use practice_billing::invoice::{InvoiceFilter, InvoicePage, PayOutcome, ViewState};
use practice_billing::model::{InvoiceAction, InvoiceId};
use practice_billing::navigation::Location;
use practice_billing::notify::NoticeLevel;
use practice_billing::payment::{return_urls, Reconciliation};
use practice_billing::{Invoice, PaymentHistoryController};

const HOME: &str = "https://app.example.com/invoices";

fn two_invoices() -> FakeApi {
    FakeApi::with_invoices(json!([
        invoice(42, "INV-2026-0042", "pending", 500.0, 0.0),
        invoice(43, "INV-2026-0043", "paid", 120.0, 120.0),
    ]))
}

fn numbers(invoices: Vec<&Invoice>) -> Vec<String> {
    invoices.iter().map(|i| i.invoice_number.clone()).collect()
}

fn page_at(url: &str) -> InvoicePage {
    InvoicePage::new(Location::new(url), 10)
}

#[test]
fn test_success_return_confirms_and_refetches_once() {
    let api = two_invoices();
    let notifier = RecordingNotifier::default();
    let mut page = page_at(&format!("{HOME}?payment_success=true&invoice_id=42"));

    page.mount(&api, &notifier);

    assert_eq!(api.invoice_fetches.get(), 2);
    assert_eq!(page.location().as_str(), HOME);
    assert_eq!(
        notifier.messages(),
        vec!["Payment received for invoice INV-2026-0042. Thank you!"]
    );
    assert_eq!(notifier.count(NoticeLevel::Success), 1);
    assert_eq!(
        page.paid_invoice().map(|i| i.id.clone()),
        Some(InvoiceId::from(42))
    );
}

#[test]
fn test_reconciliation_is_idempotent() {
    let api = two_invoices();
    let notifier = RecordingNotifier::default();
    let mut page = page_at(&format!("{HOME}?payment_success=true&invoice_id=42"));

    page.mount(&api, &notifier);
    let fetches = api.invoice_fetches.get();

    assert_eq!(page.check_return(&api, &notifier), Reconciliation::Nothing);
    page.refresh(&api, &notifier);

    assert_eq!(api.invoice_fetches.get(), fetches + 1);
    assert_eq!(notifier.count(NoticeLevel::Success), 1);
}

#[test]
fn test_success_for_unknown_invoice_still_confirms() {
    let api = two_invoices();
    let notifier = RecordingNotifier::default();
    let mut page = page_at(&format!("{HOME}?payment_success=true&invoice_id=999"));

    page.mount(&api, &notifier);

    assert_eq!(
        notifier.messages(),
        vec!["Payment received. Your invoices will update shortly."]
    );
    assert!(page.paid_invoice().is_none());
    assert_eq!(page.location().as_str(), HOME);
    assert_eq!(api.invoice_fetches.get(), 2);
}

#[test]
fn test_success_waits_for_collection_to_load() {
    let api = two_invoices();
    let notifier = RecordingNotifier::default();
    let mut page = page_at(&format!("{HOME}?payment_success=true&invoice_id=42"));

    let ticket = page.begin_refresh();
    assert_eq!(page.check_return(&api, &notifier), Reconciliation::Deferred);
    assert!(notifier.messages().is_empty());
    assert!(page.location().has_query());

    let result = api.get_invoices();
    let outcome = page.complete_refresh(ticket, result, &api, &notifier);

    assert_eq!(outcome, FetchOutcome::Replaced);
    assert_eq!(notifier.count(NoticeLevel::Success), 1);
    assert_eq!(page.location().as_str(), HOME);
    // the listing above plus the post-confirmation re-fetch
    assert_eq!(api.invoice_fetches.get(), 2);
}

#[test]
fn test_cancel_return_notifies_without_refetch() {
    let api = two_invoices();
    let notifier = RecordingNotifier::default();
    let mut page = page_at(&format!("{HOME}?payment_cancelled=true"));

    page.mount(&api, &notifier);

    assert_eq!(
        notifier.messages(),
        vec!["Payment cancelled. You have not been charged."]
    );
    assert_eq!(notifier.count(NoticeLevel::Info), 1);
    assert_eq!(page.location().as_str(), HOME);
    assert_eq!(api.invoice_fetches.get(), 1);
    assert!(page.paid_invoice().is_none());
}

#[test]
fn test_success_flag_without_invoice_id_is_ignored() {
    let api = two_invoices();
    let notifier = RecordingNotifier::default();
    let mut page = page_at(&format!("{HOME}?payment_success=true"));

    page.mount(&api, &notifier);

    assert!(notifier.messages().is_empty());
    assert_eq!(api.invoice_fetches.get(), 1);
}

#[test]
fn test_return_urls_point_back_at_list() {
    let location = Location::new(format!("{HOME}?page=3#top"));
    let urls = return_urls(&location, &InvoiceId::from(42));

    assert_eq!(
        urls.success_url,
        format!("{HOME}?payment_success=true&invoice_id=42")
    );
    assert_eq!(urls.cancel_url, format!("{HOME}?payment_cancelled=true"));
}

#[test]
fn test_pay_redirects_to_checkout() {
    let api = two_invoices();
    let notifier = RecordingNotifier::default();
    let navigator = RecordingNavigator::default();
    let mut page = page_at(HOME);
    page.mount(&api, &notifier);

    let outcome = page.pay(&InvoiceId::from(42), &api, &navigator, &notifier);

    assert_eq!(
        outcome,
        PayOutcome::Redirected {
            checkout_url: "https://checkout.example.com/s/abc".to_string()
        }
    );
    assert_eq!(
        *navigator.visited.borrow(),
        vec!["https://checkout.example.com/s/abc".to_string()]
    );

    let requests = api.checkout_requests.borrow();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].invoice_id, InvoiceId::from(42));
    assert_eq!(
        requests[0].success_url,
        format!("{HOME}?payment_success=true&invoice_id=42")
    );
    assert!(matches!(page.view(), ViewState::Paying(_)));
}

#[test]
fn test_second_pay_while_paying_is_refused() {
    let api = two_invoices();
    let notifier = RecordingNotifier::default();
    let navigator = RecordingNavigator::default();
    let mut page = page_at(HOME);
    page.mount(&api, &notifier);

    page.pay(&InvoiceId::from(42), &api, &navigator, &notifier);
    let again = page.pay(&InvoiceId::from(42), &api, &navigator, &notifier);

    assert_eq!(again, PayOutcome::Aborted);
    assert_eq!(api.checkout_requests.borrow().len(), 1);
    assert_eq!(navigator.visited.borrow().len(), 1);
}

#[test]
fn test_checkout_failure_does_not_navigate_or_mutate() {
    let api = two_invoices();
    let notifier = RecordingNotifier::default();
    let navigator = RecordingNavigator::default();
    let mut page = page_at(HOME);
    page.mount(&api, &notifier);
    let before = page.controller().invoices().to_vec();

    *api.checkout.borrow_mut() = CheckoutReply::Reject;
    let outcome = page.pay(&InvoiceId::from(42), &api, &navigator, &notifier);

    assert_eq!(outcome, PayOutcome::Aborted);
    assert!(navigator.visited.borrow().is_empty());
    assert_eq!(page.controller().invoices(), before.as_slice());
    assert_eq!(page.view(), &ViewState::Idle);

    let notice = notifier.last().unwrap();
    assert_eq!(notice.level, NoticeLevel::Error);
    assert!(notice.message.starts_with("Could not start payment:"));
    assert!(notice.message.contains("card declined"));
}

#[test]
fn test_checkout_without_url_does_not_navigate() {
    let api = two_invoices();
    let notifier = RecordingNotifier::default();
    let navigator = RecordingNavigator::default();
    let mut page = page_at(HOME);
    page.mount(&api, &notifier);

    *api.checkout.borrow_mut() = CheckoutReply::NoUrl;
    let outcome = page.pay(&InvoiceId::from(42), &api, &navigator, &notifier);

    assert_eq!(outcome, PayOutcome::Aborted);
    assert!(navigator.visited.borrow().is_empty());
    assert!(notifier
        .last()
        .unwrap()
        .message
        .contains("did not return a checkout URL"));
}

#[test]
fn test_paid_invoice_is_not_sent_to_checkout() {
    let api = two_invoices();
    let notifier = RecordingNotifier::default();
    let navigator = RecordingNavigator::default();
    let mut page = page_at(HOME);
    page.mount(&api, &notifier);

    let outcome = page.pay(&InvoiceId::from(43), &api, &navigator, &notifier);

    assert_eq!(outcome, PayOutcome::Aborted);
    assert!(api.checkout_requests.borrow().is_empty());
    assert!(navigator.visited.borrow().is_empty());
}

#[test]
fn test_invoice_marked_paid_with_balance_is_not_sent_to_checkout() {
    let api = FakeApi::with_invoices(json!([{
        "id": 5,
        "status": "paid",
        "total_amount": 100,
        "paid_amount": 60,
        "remaining_amount": 40,
    }]));
    let notifier = RecordingNotifier::default();
    let navigator = RecordingNavigator::default();
    let mut page = page_at(HOME);
    page.mount(&api, &notifier);

    assert_eq!(page.page_view().rows[0].action(), InvoiceAction::PaidInvoice);

    let outcome = page.pay(&InvoiceId::from(5), &api, &navigator, &notifier);

    assert_eq!(outcome, PayOutcome::Aborted);
    assert!(api.checkout_requests.borrow().is_empty());
    assert!(navigator.visited.borrow().is_empty());
    assert_eq!(page.view(), &ViewState::Idle);
    assert!(notifier
        .last()
        .unwrap()
        .message
        .contains("is not open for payment"));
}

#[test]
fn test_result_after_unmount_is_discarded() {
    let api = two_invoices();
    let notifier = RecordingNotifier::default();
    let mut page = page_at(HOME);

    let ticket = page.begin_refresh();
    page.unmount();
    let result = api.get_invoices();

    assert_eq!(
        page.complete_refresh(ticket, result, &api, &notifier),
        FetchOutcome::Discarded
    );
    assert!(page.controller().invoices().is_empty());
    assert!(!page.controller().is_loading());
    assert!(notifier.messages().is_empty());
}

#[test]
fn test_stale_fetch_is_discarded() {
    let api = two_invoices();
    let notifier = RecordingNotifier::default();
    let mut page = page_at(HOME);

    let first = page.begin_refresh();
    let second = page.begin_refresh();

    let stale = api.get_invoices();
    assert_eq!(
        page.complete_refresh(first, stale, &api, &notifier),
        FetchOutcome::Discarded
    );
    assert!(page.controller().is_loading());

    let fresh = api.get_invoices();
    assert_eq!(
        page.complete_refresh(second, fresh, &api, &notifier),
        FetchOutcome::Replaced
    );
    assert_eq!(page.controller().invoices().len(), 2);
}

#[test]
fn test_fetch_error_keeps_previous_invoices() {
    let api = two_invoices();
    let notifier = RecordingNotifier::default();
    let mut page = page_at(HOME);
    page.mount(&api, &notifier);

    *api.invoices.borrow_mut() = None;
    let outcome = page.refresh(&api, &notifier);

    assert!(matches!(outcome, FetchOutcome::Failed(_)));
    assert_eq!(page.controller().invoices().len(), 2);
    assert!(page
        .controller()
        .error()
        .unwrap()
        .starts_with("Failed to load invoices:"));
    assert_eq!(notifier.count(NoticeLevel::Error), 1);

    api.set_listing(json!({ "invoices": [invoice(44, "INV-2026-0044", "pending", 10.0, 0.0)] }));
    assert_eq!(page.refresh(&api, &notifier), FetchOutcome::Replaced);
    assert_eq!(page.controller().error(), None);
    assert_eq!(page.controller().invoices().len(), 1);
}

#[test]
fn test_actions_across_pages() {
    let api = two_invoices();
    let notifier = RecordingNotifier::default();
    let mut page = InvoicePage::new(Location::new(HOME), 1);
    page.mount(&api, &notifier);

    let first = page.page_view();
    assert_eq!(first.total_pages, 2);
    assert_eq!(first.rows[0].action(), InvoiceAction::PayNow);

    page.open_invoice(&InvoiceId::from(42)).unwrap();
    assert!(page.next_page());
    assert_eq!(page.view(), &ViewState::Idle);

    let second = page.page_view();
    assert_eq!(second.current_page, 2);
    assert_eq!(second.rows[0].action(), InvoiceAction::PaidInvoice);
    assert!(!page.next_page());

    page.set_filter(InvoiceFilter::Outstanding);
    let outstanding = page.page_view();
    assert_eq!(outstanding.current_page, 1);
    assert_eq!(outstanding.total_rows, 1);
}

#[test]
fn test_refresh_returns_to_first_page() {
    let api = two_invoices();
    let notifier = RecordingNotifier::default();
    let mut page = InvoicePage::new(Location::new(HOME), 1);
    page.mount(&api, &notifier);

    page.go_to_page(2);
    page.refresh(&api, &notifier);

    assert_eq!(page.current_page(), 1);
}

#[test]
fn test_open_unknown_invoice() {
    let api = two_invoices();
    let notifier = RecordingNotifier::default();
    let mut page = page_at(HOME);
    page.mount(&api, &notifier);

    assert!(page.open_invoice(&InvoiceId::from(1)).is_err());
    assert_eq!(page.view(), &ViewState::Idle);
}

#[test]
fn test_payment_history_pages_and_lookup() {
    let api = two_invoices();
    *api.payments.borrow_mut() = Some(json!({
        "data": { "payments": [
            { "id": 1, "transaction_id": "txn_1", "amount": "10.00" },
            { "id": 2, "transaction_id": "txn_2", "amount": "20.00" },
            { "id": 3, "transaction_id": "txn_3", "amount": "30.00" },
        ] }
    }));

    let mut history = PaymentHistoryController::new(2);
    assert_eq!(history.refetch(&api), FetchOutcome::Replaced);

    assert_eq!(history.page().total_pages, 2);
    assert!(history.next_page());
    assert_eq!(history.page().items.len(), 1);
    assert_eq!(history.find("txn_2").map(|p| p.amount), Some(20.0));
    assert_eq!(history.find("3").map(|p| p.transaction_id.as_str()), Some("txn_3"));

    *api.payments.borrow_mut() = None;
    assert!(matches!(history.refetch(&api), FetchOutcome::Failed(_)));
    assert_eq!(history.payments().len(), 3);
    assert!(history
        .error()
        .unwrap()
        .starts_with("Failed to load payment history:"));
}

#[test]
fn test_payment_history_returns_to_first_page_on_new_collection() {
    let api = two_invoices();
    let payments: Vec<_> = (1..=5)
        .map(|n| json!({ "id": n, "transaction_id": format!("txn_{n}"), "amount": 10 }))
        .collect();
    *api.payments.borrow_mut() = Some(json!(payments));

    let mut history = PaymentHistoryController::new(2);
    history.refetch(&api);
    assert!(history.go_to_page(3));
    assert_eq!(history.page().current_page, 3);

    assert_eq!(history.refetch(&api), FetchOutcome::Replaced);
    assert_eq!(history.page().current_page, 1);
}

#[test]
fn test_loading_clears_after_failed_fetch() {
    let api = FakeApi::failing();
    let notifier = RecordingNotifier::default();
    let mut page = page_at(HOME);

    let ticket = page.begin_refresh();
    assert!(page.controller().is_loading());
    let result = api.get_invoices();
    page.complete_refresh(ticket, result, &api, &notifier);

    assert!(!page.controller().is_loading());
    assert!(page.controller().error().is_some());

    let mut history = PaymentHistoryController::new(10);
    assert!(matches!(history.refetch(&api), FetchOutcome::Failed(_)));
    assert!(!history.is_loading());
}

#[test]
fn test_outstanding_and_paid_views() {
    let api = FakeApi::with_invoices(json!([
        invoice(1, "INV-1", "pending", 100.0, 40.0),
        invoice(2, "INV-2", "paid", 80.0, 80.0),
        invoice(3, "INV-3", "overdue", 50.0, 0.0),
        invoice(4, "INV-4", "pending", 0.0, 0.0),
    ]));
    let notifier = RecordingNotifier::default();
    let mut page = page_at(HOME);
    page.mount(&api, &notifier);

    assert_eq!(numbers(page.controller().outstanding()), vec!["INV-1", "INV-3"]);
    assert_eq!(numbers(page.controller().paid()), vec!["INV-2"]);
}

#[test]
fn test_close_invoice_and_dismiss_confirmation() {
    let api = two_invoices();
    let notifier = RecordingNotifier::default();
    let mut page = page_at(&format!("{HOME}?payment_success=true&invoice_id=42"));
    page.mount(&api, &notifier);

    assert!(page.paid_invoice().is_some());
    page.dismiss_confirmation();
    assert!(page.paid_invoice().is_none());

    page.open_invoice(&InvoiceId::from(43)).unwrap();
    assert!(matches!(page.view(), ViewState::Viewing(_)));
    page.close_invoice();
    assert_eq!(page.view(), &ViewState::Idle);
}

#[test]
fn test_checkout_endpoint_encodes_invoice_id() {
    let api = HttpBillingApi::new(&ApiSettings {
        base_url: "https://api.example.com/".to_string(),
        token: None,
    });

    assert_eq!(
        api.checkout_url(&InvoiceId::from(42)),
        "https://api.example.com/billing/invoices/42/pay/"
    );
    assert_eq!(
        api.checkout_url(&InvoiceId::from("a/b?c#d")),
        "https://api.example.com/billing/invoices/a%2Fb%3Fc%23d/pay/"
    );
}
