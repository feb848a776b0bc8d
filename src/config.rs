//! Declarative resolver-chain configuration.
//!
//! Mirrors the constructor API as data: which schemes participate, in what
//! order, and their per-scheme options. Loadable from a TOML file so
//! embedding applications can ship the chain layout next to their other
//! settings.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::Path;
use std::sync::Arc;

use base64::engine::{general_purpose, GeneralPurpose};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde::{Deserialize, Serialize};

use crate::http_client::HttpClient;
use crate::resolver::{
    BytesResolver, FileResolver, HttpResolver, MultiResolver, Resolver, StringResolver,
};

/// Base64 alphabet used for `bytes://` payloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Base64Alphabet {
    #[default]
    Standard,
    StandardNoPad,
    UrlSafe,
    UrlSafeNoPad,
}

impl Base64Alphabet {
    fn engine(self) -> GeneralPurpose {
        match self {
            Base64Alphabet::Standard => general_purpose::STANDARD,
            Base64Alphabet::StandardNoPad => general_purpose::STANDARD_NO_PAD,
            Base64Alphabet::UrlSafe => general_purpose::URL_SAFE,
            Base64Alphabet::UrlSafeNoPad => general_purpose::URL_SAFE_NO_PAD,
        }
    }
}

/// One component slot in the chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SchemeKind {
    Http,
    File,
    String,
    Bytes,
}

/// Chain layout plus per-scheme options.
///
/// The default mirrors [`MultiResolver::default_chain`]: HTTP first, then
/// file, with the string/bytes components opt-in.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolverConfig {
    /// Components in resolution order.
    #[serde(default = "default_order")]
    pub order: Vec<SchemeKind>,
    /// Alphabet for `bytes://` payloads.
    #[serde(default)]
    pub base64_alphabet: Base64Alphabet,
    /// Default headers attached to HTTP requests, e.g. `Authorization`.
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
    /// Ask servers to close the connection after each request.
    #[serde(default)]
    pub close_connections: bool,
}

fn default_order() -> Vec<SchemeKind> {
    vec![SchemeKind::Http, SchemeKind::File]
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            order: default_order(),
            base64_alphabet: Base64Alphabet::default(),
            headers: BTreeMap::new(),
            close_connections: false,
        }
    }
}

/// Error loading or instantiating a [`ResolverConfig`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot read config: {0}")]
    Io(#[from] io::Error),
    #[error("malformed config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid header name {name:?}")]
    HeaderName { name: String },
    #[error("invalid header value for {name:?}")]
    HeaderValue { name: String },
}

impl ResolverConfig {
    /// Loads a TOML config file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path)?;
        Ok(toml::from_str(&raw)?)
    }

    fn header_map(&self) -> Result<HeaderMap, ConfigError> {
        let mut headers = HeaderMap::with_capacity(self.headers.len());
        for (name, value) in &self.headers {
            let parsed_name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|_| ConfigError::HeaderName { name: name.clone() })?;
            let parsed_value = HeaderValue::from_str(value)
                .map_err(|_| ConfigError::HeaderValue { name: name.clone() })?;
            headers.insert(parsed_name, parsed_value);
        }
        Ok(headers)
    }

    /// Builds the configured chain around `client`.
    pub fn build(&self, client: Arc<dyn HttpClient>) -> Result<MultiResolver, ConfigError> {
        let headers = self.header_map()?;

        let mut components: Vec<Box<dyn Resolver>> = Vec::with_capacity(self.order.len());
        for kind in &self.order {
            components.push(match kind {
                SchemeKind::Http => Box::new(
                    HttpResolver::new(Arc::clone(&client))
                        .with_headers(headers.clone())
                        .with_close(self.close_connections),
                ),
                SchemeKind::File => Box::new(FileResolver),
                SchemeKind::String => Box::new(StringResolver),
                SchemeKind::Bytes => {
                    Box::new(BytesResolver::with_engine(self.base64_alphabet.engine()))
                }
            });
        }

        Ok(MultiResolver::new(components))
    }
}
