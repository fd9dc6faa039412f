use clap::{ArgAction, Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tabled::{settings::Style, Table, Tabled};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use practice_billing::api::{BillingApi, HttpBillingApi};
use practice_billing::config::{config_dir, init_config_dir, load_config, resolve_output_dir};
use practice_billing::fetch::FetchOutcome;
use practice_billing::invoice::{export_notice, surface_export, InvoiceFilter, InvoicePage, PayOutcome};
use practice_billing::model::{format_money, InvoiceId};
use practice_billing::navigation::{BrowserNavigator, Location};
use practice_billing::notify::{Notice, Notifier, TerminalNotifier};
use practice_billing::pagination::format_page_window;
use practice_billing::pdf::TypstCompiler;
use practice_billing::report::{Exporter, Letterhead};
use practice_billing::{BillingError, Config, PaymentHistoryController, Result};

#[derive(Parser)]
#[command(name = "billing")]
#[command(version, about = "Client billing: invoices, online payments and receipts", long_about = None)]
struct Cli {
    /// Path to config directory (default: ~/.billing or XDG config)
    #[arg(short = 'C', long, global = true)]
    config_dir: Option<PathBuf>,

    /// More log output on stderr (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize config directory with a template config.toml
    Init,

    /// List invoices with the account summary
    Invoices {
        /// Page to show (1-based)
        #[arg(short, long, default_value_t = 1)]
        page: usize,

        /// Which invoices to list (all, outstanding, paid)
        #[arg(short, long, default_value = "all")]
        filter: InvoiceFilter,

        /// Location the checkout sent the browser back to, query string included
        #[arg(long, value_name = "URL")]
        return_url: Option<String>,
    },

    /// Start an online payment for an invoice
    Pay {
        /// Invoice id as shown by the server
        invoice_id: String,

        /// Print the checkout URL instead of opening a browser
        #[arg(long)]
        no_open: bool,
    },

    /// Show completed payments
    Payments {
        /// Page to show (1-based)
        #[arg(short, long, default_value_t = 1)]
        page: usize,
    },

    /// Export all loaded invoices as a PDF report
    Export {
        /// Custom output file path (default: output_dir/invoice-report-<timestamp>.pdf)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Download or print a single invoice
    Receipt {
        invoice_id: String,

        /// Send to the printer instead of saving
        #[arg(long)]
        print: bool,

        /// Custom output file path (default: output_dir/invoice-<number>.pdf)
        #[arg(short, long, conflicts_with = "print")]
        output: Option<PathBuf>,
    },

    /// Download or print the receipt for a completed payment
    PaymentReceipt {
        /// Payment or transaction id
        transaction_id: String,

        /// Send to the printer instead of saving
        #[arg(long)]
        print: bool,

        /// Custom output file path (default: output_dir/payment-<transaction>.pdf)
        #[arg(short, long, conflicts_with = "print")]
        output: Option<PathBuf>,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "practice_billing=info",
        _ => "practice_billing=debug",
    };

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn run(cli: Cli) -> Result<ExitCode> {
    let cfg_dir = match cli.config_dir {
        Some(p) => p,
        None => config_dir()?,
    };

    match cli.command {
        Commands::Init => cmd_init(&cfg_dir),
        Commands::Invoices {
            page,
            filter,
            return_url,
        } => cmd_invoices(&cfg_dir, page, filter, return_url),
        Commands::Pay {
            invoice_id,
            no_open,
        } => cmd_pay(&cfg_dir, &invoice_id, no_open),
        Commands::Payments { page } => cmd_payments(&cfg_dir, page),
        Commands::Export { output } => cmd_export(&cfg_dir, output),
        Commands::Receipt {
            invoice_id,
            print,
            output,
        } => cmd_receipt(&cfg_dir, &invoice_id, print, output),
        Commands::PaymentReceipt {
            transaction_id,
            print,
            output,
        } => cmd_payment_receipt(&cfg_dir, &transaction_id, print, output),
    }
}

/// Everything a command needs once the config is loaded
struct Session {
    config: Config,
    api: HttpBillingApi,
    notifier: TerminalNotifier,
    output_dir: PathBuf,
}

impl Session {
    fn open(cfg_dir: &Path) -> Result<Self> {
        let config = load_config(cfg_dir)?;
        tracing::debug!(base_url = %config.api.base_url, "loaded config");

        let api = HttpBillingApi::new(&config.api);
        let output_dir = resolve_output_dir(&config.report.output_dir, cfg_dir);
        Ok(Self {
            config,
            api,
            notifier: TerminalNotifier,
            output_dir,
        })
    }

    /// Mount the invoice page at `location`. `None` when the listing could not
    /// be loaded at all; the failure has already been reported.
    fn invoice_page(&self, location: Location) -> Option<InvoicePage> {
        let mut page = InvoicePage::new(location, self.config.app.page_size);
        page.mount(&self.api, &self.notifier);

        let controller = page.controller();
        if controller.error().is_some() && controller.invoices().is_empty() {
            return None;
        }
        Some(page)
    }

    fn home(&self) -> Location {
        Location::new(self.config.app.invoices_url.clone())
    }

    fn fallback_firm_name(&self) -> String {
        self.config
            .report
            .firm_name
            .clone()
            .unwrap_or_else(|| "Your Practice".to_string())
    }

    fn exporter<'a>(&self, compiler: &'a TypstCompiler) -> Exporter<'a> {
        Exporter::new(
            compiler,
            self.output_dir.clone(),
            self.config.report.currency_symbol.clone(),
        )
    }
}

/// Initialize config directory with the template config
fn cmd_init(cfg_dir: &Path) -> Result<ExitCode> {
    let path = init_config_dir(cfg_dir)?;

    println!("Initialized billing config at: {}", cfg_dir.display());
    println!();
    println!("Next steps:");
    println!("  1. Point it at your billing service:  $EDITOR {}", path.display());
    println!("  2. Paste your session token into [api] token");
    println!();
    println!("Then list your invoices:");
    println!("  billing invoices");

    Ok(ExitCode::SUCCESS)
}

#[derive(Tabled)]
struct InvoiceRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "NUMBER")]
    number: String,
    #[tabled(rename = "CLIENT")]
    client: String,
    #[tabled(rename = "ISSUED")]
    issued: String,
    #[tabled(rename = "DUE")]
    due: String,
    #[tabled(rename = "TOTAL")]
    total: String,
    #[tabled(rename = "REMAINING")]
    remaining: String,
    #[tabled(rename = "STATUS")]
    status: String,
    #[tabled(rename = "ACTION")]
    action: String,
}

#[derive(Tabled)]
struct PaymentRow {
    #[tabled(rename = "DATE")]
    date: String,
    #[tabled(rename = "TRANSACTION")]
    transaction: String,
    #[tabled(rename = "INVOICE")]
    invoice: String,
    #[tabled(rename = "METHOD")]
    method: String,
    #[tabled(rename = "AMOUNT")]
    amount: String,
}

/// List invoices, reconciling a checkout return first when one is given
fn cmd_invoices(
    cfg_dir: &Path,
    page_number: usize,
    filter: InvoiceFilter,
    return_url: Option<String>,
) -> Result<ExitCode> {
    let session = Session::open(cfg_dir)?;
    let location = return_url.map(Location::new).unwrap_or_else(|| session.home());
    let symbol = session.config.report.currency_symbol.as_str();

    let Some(mut page) = session.invoice_page(location) else {
        return Ok(ExitCode::FAILURE);
    };
    page.set_filter(filter);

    if page_number != page.current_page() && !page.go_to_page(page_number) {
        session.notifier.notify(Notice::warning(format!(
            "Page {} does not exist; showing page {} of {}.",
            page_number,
            page.current_page(),
            page.total_pages()
        )));
    }

    let summary = page.controller().summary();
    println!(
        "Outstanding: {} ({} invoices)",
        format_money(summary.outstanding_balance, symbol),
        summary.outstanding_count
    );
    println!("Paid this year: {}", format_money(summary.paid_this_year, symbol));
    if let Some(next_due) = &summary.next_due_date {
        println!("Next due: {next_due}");
    }
    println!();

    if let Some(paid) = page.paid_invoice() {
        println!(
            "Invoice {} is now paid. A receipt is available with: billing receipt {}",
            paid.invoice_number, paid.id
        );
        println!();
    }

    let view = page.page_view();
    if view.rows.is_empty() {
        println!("No invoices to show.");
        return Ok(ExitCode::SUCCESS);
    }

    let rows: Vec<InvoiceRow> = view
        .rows
        .iter()
        .map(|invoice| InvoiceRow {
            id: invoice.id.to_string(),
            number: invoice.invoice_number.clone(),
            client: invoice.client_name.clone(),
            issued: invoice.issue_date_label(),
            due: invoice.due_date_label(),
            total: format_money(invoice.total_amount, symbol),
            remaining: format_money(invoice.remaining_amount, symbol),
            status: invoice.status_label(),
            action: invoice.action().to_string(),
        })
        .collect();

    let table = Table::new(rows).with(Style::rounded()).to_string();
    println!("{table}");
    println!(
        "Showing {}–{} of {}   {}",
        view.start_index + 1,
        view.end_index,
        view.total_rows,
        format_page_window(view.current_page, view.total_pages)
    );

    Ok(ExitCode::SUCCESS)
}

/// Hand the browser to the hosted checkout for one invoice
fn cmd_pay(cfg_dir: &Path, invoice_id: &str, no_open: bool) -> Result<ExitCode> {
    let session = Session::open(cfg_dir)?;
    let Some(mut page) = session.invoice_page(session.home()) else {
        return Ok(ExitCode::FAILURE);
    };

    let navigator = BrowserNavigator { open: !no_open };
    let id = InvoiceId::from(invoice_id);

    match page.pay(&id, &session.api, &navigator, &session.notifier) {
        PayOutcome::Redirected { .. } => Ok(ExitCode::SUCCESS),
        PayOutcome::Aborted => Ok(ExitCode::FAILURE),
    }
}

/// Show completed payments
fn cmd_payments(cfg_dir: &Path, page_number: usize) -> Result<ExitCode> {
    let session = Session::open(cfg_dir)?;
    let symbol = session.config.report.currency_symbol.as_str();

    let mut history = PaymentHistoryController::new(session.config.app.page_size);
    if let FetchOutcome::Failed(message) = history.refetch(&session.api) {
        session.notifier.notify(Notice::error(message));
        return Ok(ExitCode::FAILURE);
    }

    if history.payments().is_empty() {
        println!("No payments yet.");
        return Ok(ExitCode::SUCCESS);
    }

    if page_number != 1 && !history.go_to_page(page_number) {
        session.notifier.notify(Notice::warning(format!(
            "Page {} does not exist; showing page 1 of {}.",
            page_number,
            history.page().total_pages
        )));
    }

    let page = history.page();
    let rows: Vec<PaymentRow> = page
        .items
        .iter()
        .map(|payment| PaymentRow {
            date: payment.paid_date.clone().unwrap_or_default(),
            transaction: payment.transaction_id.clone(),
            invoice: payment.invoice_number.clone().unwrap_or_default(),
            method: payment.payment_method.clone(),
            amount: format_money(payment.amount, symbol),
        })
        .collect();

    let table = Table::new(rows).with(Style::rounded()).to_string();
    println!("{table}");
    println!(
        "Showing {}–{} of {}   {}",
        page.start_index + 1,
        page.end_index,
        history.payments().len(),
        format_page_window(page.current_page, page.total_pages)
    );

    Ok(ExitCode::SUCCESS)
}

/// Export the invoice collection as a PDF report
fn cmd_export(cfg_dir: &Path, output: Option<PathBuf>) -> Result<ExitCode> {
    let session = Session::open(cfg_dir)?;
    let Some(page) = session.invoice_page(session.home()) else {
        return Ok(ExitCode::FAILURE);
    };

    let firm_name = session
        .api
        .get_branding()
        .ok()
        .and_then(|branding| branding.firm_name)
        .filter(|name| !name.trim().is_empty())
        .unwrap_or_else(|| session.fallback_firm_name());

    let compiler = TypstCompiler::default();
    let exporter = session.exporter(&compiler);
    let generated_at = chrono::Local::now().naive_local();

    match page.export_report(&exporter, &firm_name, generated_at, output, &session.notifier) {
        Some(_) => Ok(ExitCode::SUCCESS),
        None => Ok(ExitCode::FAILURE),
    }
}

/// Download or print one invoice
fn cmd_receipt(
    cfg_dir: &Path,
    invoice_id: &str,
    print: bool,
    output: Option<PathBuf>,
) -> Result<ExitCode> {
    let session = Session::open(cfg_dir)?;
    let Some(page) = session.invoice_page(session.home()) else {
        return Ok(ExitCode::FAILURE);
    };

    let id = InvoiceId::from(invoice_id);
    if page.controller().find(&id).is_none() {
        return Err(BillingError::InvoiceNotFound(invoice_id.to_string()));
    }

    let letterhead = Letterhead::load(&session.api, &session.fallback_firm_name());
    let compiler = TypstCompiler::default();
    let exporter = session.exporter(&compiler);

    let done = if print {
        page.print_invoice(&id, &exporter, &letterhead, &session.notifier)
    } else {
        page.download_invoice(&id, &exporter, &letterhead, output, &session.notifier)
            .is_some()
    };

    Ok(if done {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

/// Download or print the receipt for one completed payment
fn cmd_payment_receipt(
    cfg_dir: &Path,
    transaction_id: &str,
    print: bool,
    output: Option<PathBuf>,
) -> Result<ExitCode> {
    let session = Session::open(cfg_dir)?;

    let mut history = PaymentHistoryController::new(session.config.app.page_size);
    if let FetchOutcome::Failed(message) = history.refetch(&session.api) {
        session.notifier.notify(Notice::error(message));
        return Ok(ExitCode::FAILURE);
    }

    let payment = history
        .find(transaction_id)
        .ok_or_else(|| BillingError::PaymentNotFound(transaction_id.to_string()))?;

    let letterhead = Letterhead::load(&session.api, &session.fallback_firm_name());
    let compiler = TypstCompiler::default();
    let exporter = session.exporter(&compiler);

    if print {
        return Ok(match exporter.print_payment(payment, &letterhead) {
            Ok(()) => {
                session.notifier.notify(Notice::success("Sent to printer."));
                ExitCode::SUCCESS
            }
            Err(e) => {
                session.notifier.notify(export_notice(&e));
                ExitCode::FAILURE
            }
        });
    }

    let document = exporter.payment_document(payment, &letterhead);
    match surface_export(exporter.download(&document, output), &session.notifier) {
        Some(_) => Ok(ExitCode::SUCCESS),
        None => Ok(ExitCode::FAILURE),
    }
}
