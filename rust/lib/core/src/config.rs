use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Client-side behaviour shared by every catalog front-end.
///
/// Embedded in the CLI config file under `[settings]`; every field has a
/// default so an empty table is valid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct CatalogSettings {
    /// Fixed page size for the product listing.
    pub items_per_page: u32,

    /// Quiescence window before a typed search term is committed.
    pub search_debounce_ms: u64,

    /// Per-request timeout. `0` disables the timeout.
    pub request_timeout_secs: u64,
}

impl Default for CatalogSettings {
    fn default() -> Self {
        Self {
            items_per_page: 8,
            search_debounce_ms: 500,
            request_timeout_secs: 30,
        }
    }
}

impl CatalogSettings {
    /// Parse overrides from command-line style arguments.
    ///
    /// Supported flags:
    /// - `--items-per-page=N`
    /// - `--search-debounce-ms=N`
    /// - `--request-timeout-secs=N`
    ///
    /// Unparseable values are ignored and keep the current setting.
    pub fn apply_args(mut self, args: &[String]) -> Self {
        for arg in args {
            if let Some(val) = arg.strip_prefix("--items-per-page=") {
                if let Ok(n) = val.parse::<u32>() {
                    self.items_per_page = n;
                }
            } else if let Some(val) = arg.strip_prefix("--search-debounce-ms=") {
                if let Ok(n) = val.parse() {
                    self.search_debounce_ms = n;
                }
            } else if let Some(val) = arg.strip_prefix("--request-timeout-secs=") {
                if let Ok(n) = val.parse() {
                    self.request_timeout_secs = n;
                }
            }
        }
        self
    }

    /// Page size, never zero.
    pub fn page_size(&self) -> u32 {
        self.items_per_page.max(1)
    }

    pub fn search_debounce(&self) -> Duration {
        Duration::from_millis(self.search_debounce_ms)
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        (self.request_timeout_secs > 0).then(|| Duration::from_secs(self.request_timeout_secs))
    }
}

/// Normalize a server URL: trim whitespace and trailing slashes.
pub fn normalize_base_url(url: &str) -> String {
    url.trim().trim_end_matches('/').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let s = CatalogSettings::default();
        assert_eq!(s.items_per_page, 8);
        assert_eq!(s.search_debounce(), Duration::from_millis(500));
        assert_eq!(s.request_timeout(), Some(Duration::from_secs(30)));
    }

    #[test]
    fn test_apply_args() {
        let args = vec![
            "--items-per-page=20".to_string(),
            "--search-debounce-ms=abc".to_string(),
            "--request-timeout-secs=0".to_string(),
        ];
        let s = CatalogSettings::default().apply_args(&args);
        assert_eq!(s.items_per_page, 20);
        assert_eq!(s.search_debounce_ms, 500);
        assert_eq!(s.request_timeout(), None);
    }

    #[test]
    fn test_page_size_never_zero() {
        let s = CatalogSettings {
            items_per_page: 0,
            ..Default::default()
        };
        assert_eq!(s.page_size(), 1);
    }

    #[test]
    fn test_partial_table_uses_defaults() {
        let s: CatalogSettings = serde_json::from_str(r#"{"items-per-page": 12}"#).unwrap();
        assert_eq!(s.items_per_page, 12);
        assert_eq!(s.search_debounce_ms, 500);
    }

    #[test]
    fn test_normalize_base_url() {
        assert_eq!(normalize_base_url(" http://localhost:3000// "), "http://localhost:3000");
    }
}
