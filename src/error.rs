use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BillingError {
    #[error("Config directory not found at {0}. Run 'billing init' to create it.")]
    ConfigNotFound(PathBuf),

    #[error("Config file not found: {0}")]
    ConfigFileNotFound(PathBuf),

    #[error("Failed to parse config file {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Config directory already exists at {0}")]
    AlreadyInitialized(PathBuf),

    #[error("Request failed: {0}")]
    Http(#[from] ureq::Error),

    #[error("Server rejected the request ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Unexpected response from server: {0}")]
    MalformedResponse(String),

    #[error("Invoice '{0}' not found")]
    InvoiceNotFound(String),

    #[error("Invoice '{0}' is not open for payment")]
    InvoiceNotPayable(String),

    #[error("Payment gateway did not return a checkout URL")]
    MissingCheckoutUrl,

    #[error("Payment '{0}' not found in payment history")]
    PaymentNotFound(String),

    #[error("Nothing to export: no records are loaded")]
    EmptyExport,

    #[error("Typst not found. Install it from https://typst.app/ or run: cargo install typst-cli")]
    TypstNotFound,

    #[error("Failed to generate PDF: {0}")]
    PdfGeneration(String),

    #[error("Failed to print document: {0}")]
    PrintFailed(String),

    #[error("Could not open {url}: {source}")]
    Redirect {
        url: String,
        #[source]
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, BillingError>;
