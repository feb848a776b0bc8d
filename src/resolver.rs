//! Scheme resolvers: turn identifier strings into [`Resource`] handles.
//!
//! Resolvers only construct handles; they never load data. An identifier may
//! carry a scheme prefix (`string://`, `bytes://`, `file://`) or be a bare
//! URL or path: each resolver strips its own prefix when present and
//! interprets the rest its own way. Which interpretation wins is purely a
//! matter of chain order, see [`MultiResolver`].

use std::path::PathBuf;
use std::sync::Arc;

use base64::engine::{general_purpose, GeneralPurpose};
use base64::Engine as _;
use reqwest::header::HeaderMap;
use reqwest::Url;

use crate::http_client::HttpClient;
use crate::resource::{HttpResource, Resource};

/// Prefix marking an identifier as literal in-memory text.
pub const STRING_SCHEME: &str = "string://";
/// Prefix marking an identifier as base64-encoded in-memory data.
pub const BYTES_SCHEME: &str = "bytes://";
/// Prefix marking an identifier as a filesystem path.
pub const FILE_SCHEME: &str = "file://";

/// Why a resolver rejected an identifier.
#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    /// `bytes://` payload was not valid base64 for the configured alphabet.
    #[error("invalid base64 payload: {0}")]
    Base64(#[from] base64::DecodeError),
    /// Identifier is not a syntactically valid URL.
    #[error("not a valid URL: {0}")]
    Url(#[from] url::ParseError),
    /// Every component of a [`MultiResolver`] rejected the identifier.
    #[error(transparent)]
    Unresolved(#[from] MultiResolverError),
}

/// Terminal error from [`MultiResolver::resolve`]: the original identifier
/// plus each component's rejection, in the order the components were tried.
#[derive(Debug, thiserror::Error)]
#[error("unable to resolve resource identifier: {value}")]
pub struct MultiResolverError {
    pub value: String,
    pub errors: Vec<ResolveError>,
}

/// A strategy for interpreting an identifier string as a [`Resource`].
pub trait Resolver {
    fn resolve(&self, value: &str) -> Result<Resource, ResolveError>;
}

/// Closures resolve too, which keeps ad-hoc strategies and test doubles
/// cheap to write.
impl<F> Resolver for F
where
    F: Fn(&str) -> Result<Resource, ResolveError>,
{
    fn resolve(&self, value: &str) -> Result<Resource, ResolveError> {
        self(value)
    }
}

/// Drops a leading scheme prefix, keeping the remainder. No-op when the
/// prefix is absent.
fn strip_scheme<'a>(value: &'a str, scheme: &str) -> &'a str {
    value.strip_prefix(scheme).unwrap_or(value)
}

/// Resolves any identifier into in-memory text, after dropping a leading
/// `string://`. Never fails, since the identifier itself is the data.
#[derive(Debug, Clone, Copy, Default)]
pub struct StringResolver;

impl Resolver for StringResolver {
    fn resolve(&self, value: &str) -> Result<Resource, ResolveError> {
        Ok(Resource::String(
            strip_scheme(value, STRING_SCHEME).to_string(),
        ))
    }
}

/// Base64-decodes the identifier (after an optional `bytes://` prefix) into
/// in-memory binary data.
#[derive(Debug, Clone)]
pub struct BytesResolver {
    engine: GeneralPurpose,
}

impl Default for BytesResolver {
    fn default() -> Self {
        Self {
            engine: general_purpose::STANDARD,
        }
    }
}

impl BytesResolver {
    /// Uses a non-standard alphabet, e.g. `general_purpose::URL_SAFE`.
    pub fn with_engine(engine: GeneralPurpose) -> Self {
        Self { engine }
    }
}

impl Resolver for BytesResolver {
    fn resolve(&self, value: &str) -> Result<Resource, ResolveError> {
        let payload = strip_scheme(value, BYTES_SCHEME);
        Ok(Resource::Bytes(self.engine.decode(payload)?))
    }
}

/// Decodes a standalone base64 string into a byte resource with the standard
/// alphabet, without going through a resolver chain.
pub fn decode_base64(value: &str) -> Result<Resource, ResolveError> {
    Ok(Resource::Bytes(general_purpose::STANDARD.decode(value)?))
}

/// Resolves any identifier into a file handle, after dropping a leading
/// `file://`. Never fails and never stats: whether the path actually names a
/// regular file is answered later by [`Resource::exists`].
#[derive(Debug, Clone, Copy, Default)]
pub struct FileResolver;

impl Resolver for FileResolver {
    fn resolve(&self, value: &str) -> Result<Resource, ResolveError> {
        Ok(Resource::File(PathBuf::from(strip_scheme(
            value,
            FILE_SCHEME,
        ))))
    }
}

/// Validates the identifier as a URL and builds an HTTP-backed handle around
/// the configured client. Resolution is purely syntactic; no network I/O
/// happens until the handle is probed or opened.
#[derive(Clone)]
pub struct HttpResolver {
    client: Arc<dyn HttpClient>,
    headers: HeaderMap,
    close: bool,
}

impl std::fmt::Debug for HttpResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpResolver")
            .field("headers", &self.headers)
            .field("close", &self.close)
            .finish_non_exhaustive()
    }
}

impl HttpResolver {
    pub fn new(client: Arc<dyn HttpClient>) -> Self {
        Self {
            client,
            headers: HeaderMap::new(),
            close: false,
        }
    }

    /// Default headers copied into every handle this resolver produces.
    pub fn with_headers(mut self, headers: HeaderMap) -> Self {
        self.headers = headers;
        self
    }

    /// When set, resolved handles ask the server to close the connection
    /// after each request.
    pub fn with_close(mut self, close: bool) -> Self {
        self.close = close;
        self
    }
}

impl Resolver for HttpResolver {
    fn resolve(&self, value: &str) -> Result<Resource, ResolveError> {
        // Syntactic validation only; the handle keeps the original string.
        Url::parse(value)?;

        let mut resource =
            HttpResource::new(value, Arc::clone(&self.client)).with_close(self.close);
        if !self.headers.is_empty() {
            resource = resource.with_headers(self.headers.clone());
        }

        Ok(Resource::Http(resource))
    }
}

/// An ordered chain of resolvers. Every component is offered the same
/// identifier in construction order; the first success wins and the rest are
/// never consulted. Order is the whole policy: it decides outcomes, not
/// syntactic "best match".
pub struct MultiResolver {
    components: Vec<Box<dyn Resolver>>,
}

impl std::fmt::Debug for MultiResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MultiResolver")
            .field("components", &self.components.len())
            .finish_non_exhaustive()
    }
}

impl MultiResolver {
    pub fn new(components: Vec<Box<dyn Resolver>>) -> Self {
        Self { components }
    }

    /// The conventional composition: HTTP first, then file. Paths and URLs
    /// are the common external inputs. [`StringResolver`] and
    /// [`BytesResolver`] are opt-in, since an earlier component would claim
    /// most unprefixed identifiers before a literal-data reading could.
    pub fn default_chain(client: Arc<dyn HttpClient>) -> Self {
        Self::new(vec![
            Box::new(HttpResolver::new(client)),
            Box::new(FileResolver),
        ])
    }
}

impl Resolver for MultiResolver {
    fn resolve(&self, value: &str) -> Result<Resource, ResolveError> {
        let mut errors = Vec::with_capacity(self.components.len());

        for component in &self.components {
            match component.resolve(value) {
                Ok(resource) => {
                    tracing::debug!(value, location = %resource.location(), "resolved");
                    return Ok(resource);
                }
                Err(err) => errors.push(err),
            }
        }

        tracing::debug!(value, rejections = errors.len(), "no component resolved");
        Err(MultiResolverError {
            value: value.to_string(),
            errors,
        }
        .into())
    }
}
