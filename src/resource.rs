//! Resource handles: lazily opened references to data.
//!
//! A handle records *where* data lives (in memory, on disk, behind a URL) and
//! nothing else. Constructing one never touches the backing store; `exists`
//! and `open` perform the actual I/O on demand.

use std::borrow::Cow;
use std::fmt;
use std::fs;
use std::io::{self, Read, Write};
use std::path::PathBuf;
use std::sync::Arc;

use reqwest::header::HeaderMap;
use reqwest::{Method, StatusCode, Url};

use crate::http_client::{HttpClient, HttpClientError, HttpRequest};

/// Error returned by [`Resource::open`].
#[derive(Debug, thiserror::Error)]
pub enum OpenError {
    /// Filesystem open failed; the underlying error passes through untouched.
    #[error("cannot open {path}: {source}")]
    File {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    /// The stored URL does not parse. Only reachable for hand-built handles;
    /// resolver-built handles were validated at resolve time.
    #[error("invalid resource URL {url}: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
    /// The HTTP round trip itself failed.
    #[error("request to {url} failed: {source}")]
    Http {
        url: String,
        #[source]
        source: HttpClientError,
    },
    /// The server answered, but reported a non-success status.
    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: StatusCode },
}

/// Error returned by [`Resource::write_to`].
#[derive(Debug, thiserror::Error)]
pub enum CopyError {
    #[error(transparent)]
    Open(#[from] OpenError),
    #[error("copy failed: {0}")]
    Io(#[from] io::Error),
}

/// A lazily openable reference to data, independent of where the data lives.
///
/// The four variants are closed and exhaustive. A handle existing says
/// nothing about the underlying data existing; `File` and `Http` answer that
/// with real I/O, the in-memory variants are their own data and always exist.
#[derive(Debug, Clone)]
pub enum Resource {
    /// In-memory text; the content is the string itself.
    String(String),
    /// In-memory binary data.
    Bytes(Vec<u8>),
    /// A (possibly relative) filesystem path.
    File(PathBuf),
    /// A remote object fetched over HTTP(S).
    Http(HttpResource),
}

impl Resource {
    /// Where this resource's data comes from. Purely descriptive and not
    /// guaranteed unique: every in-memory resource of the same variant
    /// reports the same sentinel.
    pub fn location(&self) -> Cow<'_, str> {
        match self {
            Resource::String(_) => Cow::Borrowed("string"),
            Resource::Bytes(_) => Cow::Borrowed("bytes"),
            Resource::File(path) => path.to_string_lossy(),
            Resource::Http(http) => Cow::Borrowed(http.url()),
        }
    }

    /// Definitive existence check. In-memory data always exists. A file
    /// exists iff a stat succeeds and the target is a regular file, so a
    /// directory reports `false`. An HTTP resource exists iff a HEAD request
    /// round-trips with status < 300; transport errors report `false` rather
    /// than propagating.
    pub fn exists(&self) -> bool {
        match self {
            Resource::String(_) | Resource::Bytes(_) => true,
            Resource::File(path) => fs::metadata(path).map(|m| m.is_file()).unwrap_or(false),
            Resource::Http(http) => http.exists(),
        }
    }

    /// Opens the resource for reading. The caller owns the returned stream;
    /// for HTTP resources that includes releasing the connection by reading
    /// to completion or dropping the reader.
    pub fn open(&self) -> Result<Box<dyn Read + Send>, OpenError> {
        match self {
            Resource::String(s) => Ok(Box::new(io::Cursor::new(s.clone().into_bytes()))),
            Resource::Bytes(b) => Ok(Box::new(io::Cursor::new(b.clone()))),
            Resource::File(path) => match fs::File::open(path) {
                Ok(file) => Ok(Box::new(file)),
                Err(source) => Err(OpenError::File {
                    path: path.clone(),
                    source,
                }),
            },
            Resource::Http(http) => http.open(),
        }
    }

    /// Bulk fast path: the backing data of an in-memory resource. `File` and
    /// `Http` return `None` and must be read through [`Resource::open`].
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Resource::String(s) => Some(s.as_bytes()),
            Resource::Bytes(b) => Some(b),
            Resource::File(_) | Resource::Http(_) => None,
        }
    }

    /// Copies the resource's data into `w`, returning the byte count.
    /// In-memory variants are written in a single call; `File` and `Http` are
    /// opened and streamed.
    pub fn write_to<W: Write>(&self, w: &mut W) -> Result<u64, CopyError> {
        if let Some(data) = self.as_bytes() {
            w.write_all(data)?;
            return Ok(data.len() as u64);
        }

        let mut reader = self.open()?;
        Ok(io::copy(&mut reader, w)?)
    }
}

/// An HTTP(S)-backed resource: a URL plus request shaping (extra headers,
/// connection-close) and the transport client to send through.
#[derive(Clone)]
pub struct HttpResource {
    url: String,
    headers: HeaderMap,
    close: bool,
    client: Arc<dyn HttpClient>,
}

impl fmt::Debug for HttpResource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpResource")
            .field("url", &self.url)
            .field("headers", &self.headers)
            .field("close", &self.close)
            .finish_non_exhaustive()
    }
}

impl HttpResource {
    /// Wraps `url` without validating it; validation is the resolver's job.
    pub fn new(url: impl Into<String>, client: Arc<dyn HttpClient>) -> Self {
        Self {
            url: url.into(),
            headers: HeaderMap::new(),
            close: false,
            client,
        }
    }

    /// Headers attached to every request made through this handle.
    pub fn with_headers(mut self, headers: HeaderMap) -> Self {
        self.headers = headers;
        self
    }

    /// When set, each request asks the server to close the connection.
    pub fn with_close(mut self, close: bool) -> Self {
        self.close = close;
        self
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    fn request(&self, method: Method) -> Result<HttpRequest, OpenError> {
        let url = Url::parse(&self.url).map_err(|source| OpenError::InvalidUrl {
            url: self.url.clone(),
            source,
        })?;

        let mut request = HttpRequest::new(method, url);
        request.headers = self.headers.clone();
        request.close = self.close;
        Ok(request)
    }

    fn exists(&self) -> bool {
        let request = match self.request(Method::HEAD) {
            Ok(request) => request,
            Err(_) => return false,
        };

        match self.client.execute(request) {
            Ok(mut response) => {
                // Drain so the connection can go back to the pool.
                let _ = io::copy(&mut response.body, &mut io::sink());
                response.status.as_u16() < 300
            }
            Err(err) => {
                tracing::debug!(url = %self.url, error = %err, "HEAD probe failed");
                false
            }
        }
    }

    fn open(&self) -> Result<Box<dyn Read + Send>, OpenError> {
        let request = self.request(Method::GET)?;
        let mut response = self
            .client
            .execute(request)
            .map_err(|source| OpenError::Http {
                url: self.url.clone(),
                source,
            })?;

        if response.status.as_u16() < 300 {
            return Ok(response.body);
        }

        let _ = io::copy(&mut response.body, &mut io::sink());
        Err(OpenError::Status {
            url: self.url.clone(),
            status: response.status,
        })
    }
}
