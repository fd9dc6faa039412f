use crate::api::BillingApi;

/// Firm logo bytes of a format Typst can embed
#[derive(Debug, Clone, PartialEq)]
pub struct LogoImage {
    pub bytes: Vec<u8>,
    pub extension: &'static str,
}

impl LogoImage {
    /// Recognise the image format from its leading bytes
    pub fn sniff(bytes: Vec<u8>) -> Option<Self> {
        let extension = if bytes.starts_with(b"\x89PNG\r\n\x1a\n") {
            "png"
        } else if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
            "jpg"
        } else if bytes.starts_with(b"GIF87a") || bytes.starts_with(b"GIF89a") {
            "gif"
        } else if looks_like_svg(&bytes) {
            "svg"
        } else {
            return None;
        };
        Some(Self { bytes, extension })
    }

    pub fn file_name(&self) -> String {
        format!("logo.{}", self.extension)
    }
}

fn looks_like_svg(bytes: &[u8]) -> bool {
    let head = String::from_utf8_lossy(&bytes[..bytes.len().min(512)]);
    let head = head.trim_start();
    head.starts_with("<svg") || (head.starts_with("<?xml") && head.contains("<svg"))
}

/// Firm identity printed at the top of single-record documents
#[derive(Debug, Clone, PartialEq)]
pub struct Letterhead {
    pub firm_name: String,
    pub logo: Option<LogoImage>,
}

impl Letterhead {
    pub fn text_only(firm_name: impl Into<String>) -> Self {
        Self {
            firm_name: firm_name.into(),
            logo: None,
        }
    }

    /// Placeholder shown instead of a logo
    pub fn initials(&self) -> String {
        let initials: String = self
            .firm_name
            .split_whitespace()
            .filter_map(|word| word.chars().find(|c| c.is_alphanumeric()))
            .take(2)
            .flat_map(char::to_uppercase)
            .collect();

        if initials.is_empty() {
            "?".to_string()
        } else {
            initials
        }
    }

    /// Fetch the firm's name and logo. Any failure falls back quietly to
    /// `fallback_name` and the text placeholder.
    pub fn load(api: &dyn BillingApi, fallback_name: &str) -> Self {
        let branding = match api.get_branding() {
            Ok(branding) => branding,
            Err(e) => {
                tracing::debug!(error = %e, "firm branding unavailable");
                return Self::text_only(fallback_name);
            }
        };

        let firm_name = branding
            .firm_name
            .filter(|name| !name.trim().is_empty())
            .unwrap_or_else(|| fallback_name.to_string());

        let logo = branding.logo_url.and_then(|url| match api.download(&url) {
            Ok(bytes) => {
                let logo = LogoImage::sniff(bytes);
                if logo.is_none() {
                    tracing::debug!(%url, "logo is not a supported image; using placeholder");
                }
                logo
            }
            Err(e) => {
                tracing::debug!(%url, error = %e, "logo download failed; using placeholder");
                None
            }
        });

        Self { firm_name, logo }
    }
}
