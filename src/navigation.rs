use crate::error::{BillingError, Result};

/// The current page URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    url: String,
}

impl Location {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }

    pub fn as_str(&self) -> &str {
        &self.url
    }

    /// Origin and path, without query or fragment
    pub fn base(&self) -> &str {
        let end = self.url.find(['?', '#']).unwrap_or(self.url.len());
        &self.url[..end]
    }

    fn query(&self) -> &str {
        let Some(start) = self.url.find('?') else {
            return "";
        };
        let rest = &self.url[start + 1..];
        let end = rest.find('#').unwrap_or(rest.len());
        &rest[..end]
    }

    pub fn has_query(&self) -> bool {
        !self.query().is_empty()
    }

    pub fn query_pairs(&self) -> Vec<(String, String)> {
        self.query()
            .split('&')
            .filter(|pair| !pair.is_empty())
            .map(|pair| {
                let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
                (decode(key), decode(value))
            })
            .collect()
    }

    pub fn query_param(&self, name: &str) -> Option<String> {
        self.query_pairs()
            .into_iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value)
    }

    /// Drop the query string and fragment in place
    pub fn strip_query(&mut self) {
        let base = self.base().to_string();
        self.url = base;
    }

    /// This location's base with the given query parameters
    pub fn with_query(&self, pairs: &[(&str, &str)]) -> String {
        let query: Vec<String> = pairs
            .iter()
            .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
            .collect();
        format!("{}?{}", self.base(), query.join("&"))
    }
}

fn decode(component: &str) -> String {
    let spaced = component.replace('+', " ");
    match urlencoding::decode(&spaced) {
        Ok(decoded) => decoded.into_owned(),
        Err(_) => spaced.clone(),
    }
}

/// Leaves the application for an external page
pub trait Navigator {
    fn redirect(&self, url: &str) -> Result<()>;
}

/// Hands the URL to the system browser
pub struct BrowserNavigator {
    /// When false the URL is only printed
    pub open: bool,
}

impl Navigator for BrowserNavigator {
    fn redirect(&self, url: &str) -> Result<()> {
        println!("Continue to checkout: {url}");
        if self.open {
            open_url(url)?;
        }
        Ok(())
    }
}

/// Open a URL or file with the system default handler
pub fn open_url(target: &str) -> Result<()> {
    let spawned = {
        #[cfg(target_os = "macos")]
        {
            std::process::Command::new("open").arg(target).spawn()
        }

        #[cfg(target_os = "windows")]
        {
            std::process::Command::new("cmd")
                .args(["/C", "start", "", target])
                .spawn()
        }

        #[cfg(not(any(target_os = "macos", target_os = "windows")))]
        {
            std::process::Command::new("xdg-open").arg(target).spawn()
        }
    };

    spawned.map(|_| ()).map_err(|source| BillingError::Redirect {
        url: target.to_string(),
        source,
    })
}
