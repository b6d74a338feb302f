//! Intercepted request type.
//!
//! [`FetchRequest`] is what the interception layer sees of an outgoing request:
//! the HTTP line and headers plus the two pieces of fetch metadata the
//! classifier relies on, the request [`Destination`] (what kind of resource is
//! being loaded) and the [`RequestMode`] (whether it is a top-level navigation).

use bytes::Bytes;
use http::{HeaderMap, HeaderName, HeaderValue, Method, Uri};

use crate::key::RequestKey;

/// Request mode of an intercepted request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RequestMode {
    /// Top-level document load.
    Navigate,
    /// Same-origin only request.
    SameOrigin,
    /// Opaque cross-origin request.
    NoCors,
    /// Regular CORS request (what scripts issue by default).
    #[default]
    Cors,
}

/// Kind of resource a request is loading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Destination {
    /// No destination, e.g. a script-initiated fetch.
    #[default]
    Empty,
    /// HTML document.
    Document,
    /// Image (`<img>`, favicon, CSS background).
    Image,
    /// Web font.
    Font,
    /// Script.
    Script,
    /// Stylesheet.
    Style,
    /// Audio media.
    Audio,
    /// Video media.
    Video,
    /// Web app manifest.
    Manifest,
}

impl Destination {
    /// Returns the destination as the lowercase string browsers use.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Destination::Empty => "",
            Destination::Document => "document",
            Destination::Image => "image",
            Destination::Font => "font",
            Destination::Script => "script",
            Destination::Style => "style",
            Destination::Audio => "audio",
            Destination::Video => "video",
            Destination::Manifest => "manifest",
        }
    }
}

/// An intercepted outgoing request.
///
/// # Example
///
/// ```
/// use http::Uri;
/// use swcache_core::{Destination, FetchRequest, RequestMode};
///
/// let request = FetchRequest::get(Uri::from_static("https://praise.example/logo.png"))
///     .with_destination(Destination::Image);
///
/// assert_eq!(request.path(), "/logo.png");
/// assert_eq!(request.mode(), RequestMode::Cors);
/// assert_eq!(request.key().to_string(), "GET https://praise.example/logo.png");
/// ```
#[derive(Debug, Clone)]
pub struct FetchRequest {
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
    mode: RequestMode,
    destination: Destination,
}

impl FetchRequest {
    /// Creates a request with the given method and absolute URI.
    pub fn new(method: Method, uri: Uri) -> Self {
        FetchRequest {
            method,
            uri,
            headers: HeaderMap::new(),
            body: Bytes::new(),
            mode: RequestMode::default(),
            destination: Destination::default(),
        }
    }

    /// Creates a `GET` request.
    pub fn get(uri: Uri) -> Self {
        Self::new(Method::GET, uri)
    }

    /// Creates a top-level navigation request for a document.
    pub fn navigate(uri: Uri) -> Self {
        Self::get(uri)
            .with_mode(RequestMode::Navigate)
            .with_destination(Destination::Document)
    }

    /// Sets the request mode.
    pub fn with_mode(self, mode: RequestMode) -> Self {
        Self { mode, ..self }
    }

    /// Sets the request destination.
    pub fn with_destination(self, destination: Destination) -> Self {
        Self {
            destination,
            ..self
        }
    }

    /// Sets the request body.
    pub fn with_body(self, body: impl Into<Bytes>) -> Self {
        Self {
            body: body.into(),
            ..self
        }
    }

    /// Appends a header.
    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.append(name, value);
        self
    }

    /// Returns the request method.
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Returns the absolute request URI.
    pub fn uri(&self) -> &Uri {
        &self.uri
    }

    /// Returns the URI path (always starts with `/`).
    pub fn path(&self) -> &str {
        self.uri.path()
    }

    /// Returns the request headers.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Returns the request body.
    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// Returns the request mode.
    pub fn mode(&self) -> RequestMode {
        self.mode
    }

    /// Returns the request destination.
    pub fn destination(&self) -> Destination {
        self.destination
    }

    /// Returns the key this request is stored and looked up under.
    pub fn key(&self) -> RequestKey {
        RequestKey::new(&self.method, self.uri.to_string())
    }
}
