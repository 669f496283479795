//! Typed view over the merged config document, plus the unused-key guard.
//!
//! The guard exists so a config file cannot silently carry keys nothing
//! reads: every pointer the code consumes is listed in CONSUMED_POINTERS,
//! and `report_unused_keys` flags any leaf outside that set. Callers choose
//! whether that is a warning or a hard failure.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeSet;

use crate::collect_leaf_pointers;

/// JSON Pointer prefixes actually read by [`StorefrontSettings::from_config`]
/// and the daemon/CLI bootstrap. Keep this in sync with real reads; do not
/// wish-consume whole sections.
const CONSUMED_POINTERS: &[&str] = &[
    "/shop/domain",
    "/shop/api_version",
    "/shop/token_env",
    "/shop/featured_handle",
    "/locale/country",
    "/locale/language",
    "/daemon/bind_addr",
];

// ---------------------------------------------------------------------------
// StorefrontSettings
// ---------------------------------------------------------------------------

/// Everything the adapters and service layer need from the config document.
///
/// The token itself is NEVER part of the config; `token_env` names the
/// environment variable holding it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorefrontSettings {
    /// Shop domain, e.g. `noabea.myshopify.com`.
    pub shop_domain: String,
    /// Storefront API version segment, e.g. `2025-01`.
    pub api_version: String,
    /// Name of the env var holding the storefront access token.
    pub token_env: String,
    /// Handle of the featured product the storefront is built around.
    pub featured_handle: String,
    pub country: String,
    pub language: String,
    /// Optional daemon bind address override.
    pub bind_addr: Option<String>,
}

impl StorefrontSettings {
    /// Extract settings from a merged config document.
    ///
    /// `shop.domain` and `shop.token_env` are required; everything else has
    /// a default.
    pub fn from_config(config: &Value) -> Result<Self> {
        let shop_domain = required_str(config, "/shop/domain")?;
        let token_env = required_str(config, "/shop/token_env")?;

        Ok(Self {
            shop_domain,
            token_env,
            api_version: optional_str(config, "/shop/api_version")
                .unwrap_or_else(|| "2025-01".to_string()),
            featured_handle: optional_str(config, "/shop/featured_handle")
                .unwrap_or_else(|| "noabea-body-cream".to_string()),
            country: optional_str(config, "/locale/country").unwrap_or_else(|| "DE".to_string()),
            language: optional_str(config, "/locale/language").unwrap_or_else(|| "EN".to_string()),
            bind_addr: optional_str(config, "/daemon/bind_addr"),
        })
    }
}

fn required_str(config: &Value, pointer: &str) -> Result<String> {
    config
        .pointer(pointer)
        .and_then(|v| v.as_str())
        .map(str::to_string)
        .with_context(|| format!("missing required config key {pointer}"))
}

fn optional_str(config: &Value, pointer: &str) -> Option<String> {
    config
        .pointer(pointer)
        .and_then(|v| v.as_str())
        .map(str::to_string)
}

// ---------------------------------------------------------------------------
// Unused-key guard
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnusedKeyPolicy {
    Warn,
    Fail,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnusedKeyReport {
    /// Consumed JSON-pointer prefixes used for this analysis (sorted, unique).
    pub consumed_prefixes: Vec<String>,
    /// Unused leaf pointers (sorted).
    pub unused_leaf_pointers: Vec<String>,
}

impl UnusedKeyReport {
    pub fn is_clean(&self) -> bool {
        self.unused_leaf_pointers.is_empty()
    }
}

/// Report config leaves nothing reads.
///
/// With `UnusedKeyPolicy::Fail` the report becomes an error when unused keys
/// exist; with `Warn` it always returns `Ok(report)`.
pub fn report_unused_keys(config_json: &Value, policy: UnusedKeyPolicy) -> Result<UnusedKeyReport> {
    let consumed: BTreeSet<String> = CONSUMED_POINTERS.iter().map(|p| p.to_string()).collect();
    let consumed_prefixes: Vec<String> = consumed.iter().cloned().collect();

    let mut leaves: Vec<String> = Vec::new();
    collect_leaf_pointers(config_json, "", &mut leaves);

    let mut unused: Vec<String> = Vec::new();
    'leaf: for lp in leaves {
        for cp in &consumed_prefixes {
            if is_prefix_pointer(cp, &lp) {
                continue 'leaf;
            }
        }
        unused.push(lp);
    }

    unused.sort();
    unused.dedup();

    let report = UnusedKeyReport {
        consumed_prefixes,
        unused_leaf_pointers: unused,
    };

    if policy == UnusedKeyPolicy::Fail && !report.is_clean() {
        bail!(
            "CONFIG_UNUSED_KEYS: {} unused config leaf key(s) detected. \
            Remove them or update the consumed registry. First few: {:?}",
            report.unused_leaf_pointers.len(),
            report
                .unused_leaf_pointers
                .iter()
                .take(12)
                .collect::<Vec<_>>()
        );
    }

    Ok(report)
}

/// True if `prefix` is a JSON-pointer prefix of `leaf`.
/// `/a/b` consumes `/a/b/c` but NOT `/a/bc`.
fn is_prefix_pointer(prefix: &str, leaf: &str) -> bool {
    if prefix == "/" || leaf == prefix {
        return true;
    }
    if leaf.starts_with(prefix) {
        return leaf
            .get(prefix.len()..prefix.len() + 1)
            .map(|c| c == "/")
            .unwrap_or(false);
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> Value {
        serde_json::json!({
            "shop": {
                "domain": "noabea.myshopify.com",
                "token_env": "NB_STOREFRONT_TOKEN",
                "api_version": "2025-01",
            },
            "locale": {"country": "DE", "language": "DE"},
        })
    }

    #[test]
    fn settings_read_required_and_defaulted_keys() {
        let s = StorefrontSettings::from_config(&config()).unwrap();
        assert_eq!(s.shop_domain, "noabea.myshopify.com");
        assert_eq!(s.token_env, "NB_STOREFRONT_TOKEN");
        assert_eq!(s.featured_handle, "noabea-body-cream");
        assert_eq!(s.language, "DE");
        assert_eq!(s.bind_addr, None);
    }

    #[test]
    fn missing_domain_is_an_error() {
        let v = serde_json::json!({"shop": {"token_env": "NB_STOREFRONT_TOKEN"}});
        let err = StorefrontSettings::from_config(&v).unwrap_err();
        assert!(err.to_string().contains("/shop/domain"));
    }

    #[test]
    fn clean_config_reports_no_unused_keys() {
        let report = report_unused_keys(&config(), UnusedKeyPolicy::Fail).unwrap();
        assert!(report.is_clean());
    }

    #[test]
    fn unknown_leaf_fails_under_fail_policy() {
        let mut v = config();
        v["shop"]["typo_key"] = serde_json::json!("oops");
        let err = report_unused_keys(&v, UnusedKeyPolicy::Fail).unwrap_err();
        assert!(err.to_string().contains("CONFIG_UNUSED_KEYS"));

        let report = report_unused_keys(&v, UnusedKeyPolicy::Warn).unwrap();
        assert_eq!(report.unused_leaf_pointers, vec!["/shop/typo_key"]);
    }

    #[test]
    fn prefix_matching_respects_segment_boundaries() {
        assert!(is_prefix_pointer("/shop/domain", "/shop/domain"));
        assert!(!is_prefix_pointer("/shop/dom", "/shop/domain"));
        assert!(is_prefix_pointer("/", "/anything"));
    }
}
