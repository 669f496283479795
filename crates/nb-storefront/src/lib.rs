//! Live HTTP adapter for the commerce platform's Storefront API.
//!
//! [`StorefrontClient`] speaks GraphQL over HTTPS with a blocking `reqwest`
//! client. It implements the two seams the rest of the workspace consumes:
//! [`nb_cart::ProductReader`] (product queries with first-product fallback)
//! and [`nb_cart::CommerceBackend`] (cart line mutations).
//!
//! The client is synchronous. Async callers MUST bridge with
//! `tokio::task::spawn_blocking` (or `block_in_place`) — driving the
//! blocking client directly on an async runtime panics.
//!
//! The access token is never part of configuration files; config names the
//! environment variable and [`StorefrontClient::from_settings`] reads it.

use std::sync::Mutex;

use serde_json::Value;

use nb_config::StorefrontSettings;

mod adapter;
mod queries;
mod wire;

pub use queries::{CART_FRAGMENT, PRODUCT_FRAGMENT, VARIANT_FRAGMENT};

/// Header carrying the storefront access token.
const TOKEN_HEADER: &str = "X-Shopify-Storefront-Access-Token";

// ---------------------------------------------------------------------------
// StorefrontError
// ---------------------------------------------------------------------------

/// Why a Storefront API call failed.
#[derive(Debug)]
pub enum StorefrontError {
    /// The configured token env var is not set.
    MissingToken(String),
    /// Transport-level failure: connection, TLS, timeout, non-2xx status.
    Http(String),
    /// The GraphQL envelope carried top-level `errors`.
    Api(Vec<String>),
    /// A mutation returned `userErrors` (the platform refused the change).
    UserErrors(Vec<String>),
    /// The response body did not have the expected shape.
    Decode(String),
}

impl std::fmt::Display for StorefrontError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StorefrontError::MissingToken(var) => {
                write!(f, "storefront token env var {var} is not set")
            }
            StorefrontError::Http(msg) => write!(f, "storefront http error: {msg}"),
            StorefrontError::Api(msgs) => {
                write!(f, "storefront api errors: {}", msgs.join("; "))
            }
            StorefrontError::UserErrors(msgs) => {
                write!(f, "storefront user errors: {}", msgs.join("; "))
            }
            StorefrontError::Decode(msg) => write!(f, "storefront response decode: {msg}"),
        }
    }
}

impl std::error::Error for StorefrontError {}

impl From<reqwest::Error> for StorefrontError {
    fn from(err: reqwest::Error) -> Self {
        StorefrontError::Http(err.to_string())
    }
}

impl From<StorefrontError> for nb_cart::BackendError {
    fn from(err: StorefrontError) -> Self {
        match err {
            StorefrontError::UserErrors(msgs) | StorefrontError::Api(msgs) => {
                nb_cart::BackendError::Rejected(msgs.join("; "))
            }
            other => nb_cart::BackendError::Unavailable(other.to_string()),
        }
    }
}

// ---------------------------------------------------------------------------
// StorefrontClient
// ---------------------------------------------------------------------------

/// Blocking GraphQL client for one shop.
#[derive(Debug)]
pub struct StorefrontClient {
    http: reqwest::blocking::Client,
    endpoint: String,
    token: String,
    country: String,
    language: String,
    /// Lazily created platform cart id; one cart per client.
    cart_id: Mutex<Option<String>>,
}

impl StorefrontClient {
    /// Build a client from settings, reading the access token from the env
    /// var the settings name.
    pub fn from_settings(settings: &StorefrontSettings) -> Result<Self, StorefrontError> {
        let token = std::env::var(&settings.token_env)
            .map_err(|_| StorefrontError::MissingToken(settings.token_env.clone()))?;
        Ok(Self::new(
            &settings.shop_domain,
            &settings.api_version,
            token,
            &settings.country,
            &settings.language,
        ))
    }

    pub fn new(
        shop_domain: &str,
        api_version: &str,
        token: impl Into<String>,
        country: &str,
        language: &str,
    ) -> Self {
        Self {
            http: reqwest::blocking::Client::new(),
            endpoint: format!("https://{shop_domain}/api/{api_version}/graphql.json"),
            token: token.into(),
            country: country.to_string(),
            language: language.to_string(),
            cart_id: Mutex::new(None),
        }
    }

    /// The GraphQL endpoint this client posts to.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Variables every `@inContext` document receives.
    pub(crate) fn context_vars(&self) -> Value {
        serde_json::json!({
            "country": self.country,
            "language": self.language,
        })
    }

    pub(crate) fn cart_id(&self) -> Option<String> {
        self.cart_id.lock().unwrap().clone()
    }

    pub(crate) fn set_cart_id(&self, id: String) {
        *self.cart_id.lock().unwrap() = Some(id);
    }

    /// Execute one GraphQL document and return the envelope's `data`.
    ///
    /// # Errors
    /// `Http` for transport/status failures, `Api` when the envelope carries
    /// top-level errors, `Decode` for malformed bodies.
    pub(crate) fn execute(&self, query: &str, mut variables: Value) -> Result<Value, StorefrontError> {
        // Fold the locale context into the variables unless already present.
        if let (Some(vars), Some(ctx)) = (variables.as_object_mut(), self.context_vars().as_object())
        {
            for (k, v) in ctx {
                vars.entry(k.clone()).or_insert_with(|| v.clone());
            }
        }

        let response = self
            .http
            .post(&self.endpoint)
            .header(TOKEN_HEADER, &self.token)
            .json(&serde_json::json!({
                "query": query,
                "variables": variables,
            }))
            .send()?;

        let status = response.status();
        if !status.is_success() {
            return Err(StorefrontError::Http(format!(
                "{} from {}",
                status, self.endpoint
            )));
        }

        let envelope: Value = response
            .json()
            .map_err(|e| StorefrontError::Decode(format!("envelope: {e}")))?;

        if let Some(errors) = envelope.get("errors").and_then(|e| e.as_array()) {
            if !errors.is_empty() {
                let msgs = errors
                    .iter()
                    .map(|e| {
                        e.get("message")
                            .and_then(|m| m.as_str())
                            .unwrap_or("unknown error")
                            .to_string()
                    })
                    .collect();
                return Err(StorefrontError::Api(msgs));
            }
        }

        envelope
            .get("data")
            .filter(|d| !d.is_null())
            .cloned()
            .ok_or_else(|| StorefrontError::Decode("envelope has no data".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> StorefrontSettings {
        StorefrontSettings {
            shop_domain: "noabea.myshopify.com".into(),
            api_version: "2025-01".into(),
            token_env: "NB_TEST_TOKEN_UNSET".into(),
            featured_handle: "noabea-body-cream".into(),
            country: "DE".into(),
            language: "DE".into(),
            bind_addr: None,
        }
    }

    #[test]
    fn endpoint_is_versioned_graphql_json() {
        let client = StorefrontClient::new("noabea.myshopify.com", "2025-01", "t", "DE", "DE");
        assert_eq!(
            client.endpoint(),
            "https://noabea.myshopify.com/api/2025-01/graphql.json"
        );
    }

    #[test]
    fn missing_token_env_is_an_error() {
        std::env::remove_var("NB_TEST_TOKEN_UNSET");
        let err = StorefrontClient::from_settings(&settings()).unwrap_err();
        match err {
            StorefrontError::MissingToken(var) => assert_eq!(var, "NB_TEST_TOKEN_UNSET"),
            other => panic!("expected MissingToken, got {other:?}"),
        }
    }

    #[test]
    fn error_mapping_into_backend_error() {
        let rejected: nb_cart::BackendError =
            StorefrontError::UserErrors(vec!["sold out".into()]).into();
        assert_eq!(rejected, nb_cart::BackendError::Rejected("sold out".into()));

        let unavailable: nb_cart::BackendError =
            StorefrontError::Http("503 from endpoint".into()).into();
        assert!(matches!(
            unavailable,
            nb_cart::BackendError::Unavailable(_)
        ));
    }
}
