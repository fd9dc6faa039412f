use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Config {
    pub api: ApiSettings,
    pub app: AppSettings,
    #[serde(default)]
    pub report: ReportSettings,
}

/// Connection details for the billing REST service
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ApiSettings {
    pub base_url: String,
    /// Session token passed through as a bearer credential
    #[serde(default)]
    pub token: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppSettings {
    /// Location of the invoice list; checkout returns here
    pub invoices_url: String,
    #[serde(default = "default_page_size")]
    pub page_size: usize,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ReportSettings {
    #[serde(default = "default_output_dir")]
    pub output_dir: String,
    #[serde(default = "default_currency_symbol")]
    pub currency_symbol: String,
    /// Letterhead name used when the server does not supply one
    #[serde(default)]
    pub firm_name: Option<String>,
}

impl Default for ReportSettings {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            currency_symbol: default_currency_symbol(),
            firm_name: None,
        }
    }
}

fn default_page_size() -> usize {
    10
}

fn default_output_dir() -> String {
    "~/.billing/exports".to_string()
}

fn default_currency_symbol() -> String {
    "$".to_string()
}
