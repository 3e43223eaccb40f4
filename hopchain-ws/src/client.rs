use crate::{WsStream, stream::DEFAULT_WRITE_FRAME_SIZE};
use hopchain_error::BoxError;
use hopchain_net::stream::{BoxStream, Stream};
use http::{
    HeaderName, Method, Request, Uri,
    header::{CONNECTION, HOST, SEC_WEBSOCKET_KEY, SEC_WEBSOCKET_VERSION, UPGRADE},
    uri::{Authority, PathAndQuery},
};
use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};
use std::fmt;
use tokio_tungstenite::{
    client_async_with_config,
    tungstenite::{
        Error as WsError, handshake::client::generate_key, protocol::WebSocketConfig,
    },
};

/// The name of the header carrying the requested destination, by default.
pub const DEFAULT_DESTINATION_HEADER: &str = "X-Tunnel-Destination";

// everything a request target cannot carry as-is
const PATH: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// A client able to upgrade an established transport into a tunnel stream.
///
/// This is the seam between the websocket dialer and the handshake itself:
/// [`WsClient`] is the production implementation.
pub trait UpgradeClient: Send + Sync + 'static {
    /// The error returned when the upgrade fails.
    type Error: Into<BoxError> + Send + 'static;

    /// Upgrade `transport`, announcing `destination` as the final target.
    fn new_conn(
        &self,
        transport: BoxStream,
        destination: String,
    ) -> impl Future<Output = Result<BoxStream, Self::Error>> + Send + '_;
}

#[derive(Debug, Clone)]
/// Configuration of a [`WsClient`].
pub struct WsClientConfig {
    websocket: WebSocketConfig,
    write_frame_size: usize,
    destination_header: Option<String>,
}

impl Default for WsClientConfig {
    fn default() -> Self {
        Self {
            websocket: WebSocketConfig::default(),
            write_frame_size: DEFAULT_WRITE_FRAME_SIZE,
            destination_header: Some(DEFAULT_DESTINATION_HEADER.to_owned()),
        }
    }
}

impl WsClientConfig {
    /// Create a new default [`WsClientConfig`].
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the configuration of the upgraded websocket.
    #[must_use]
    pub fn with_websocket_config(mut self, config: WebSocketConfig) -> Self {
        self.websocket = config;
        self
    }

    /// Set the maximum payload size of a single incoming frame,
    /// `None` meaning unlimited.
    #[must_use]
    pub fn with_max_frame_size(mut self, max_frame_size: Option<usize>) -> Self {
        self.websocket = self.websocket.max_frame_size(max_frame_size);
        self
    }

    /// Set the maximum payload size of a single outgoing message,
    /// a value of `0` is treated as `1`.
    #[must_use]
    pub fn with_write_frame_size(mut self, write_frame_size: usize) -> Self {
        self.write_frame_size = write_frame_size.max(1);
        self
    }

    /// Announce the destination of each tunnel in the given request header.
    #[must_use]
    pub fn with_destination_header(mut self, name: impl Into<String>) -> Self {
        self.destination_header = Some(name.into());
        self
    }

    /// Do not announce the destination of a tunnel to the server.
    #[must_use]
    pub fn without_destination_header(mut self) -> Self {
        self.destination_header = None;
        self
    }

    /// The configuration of the upgraded websocket.
    #[must_use]
    pub fn websocket_config(&self) -> &WebSocketConfig {
        &self.websocket
    }

    /// The maximum payload size of a single outgoing message.
    #[must_use]
    pub fn write_frame_size(&self) -> usize {
        self.write_frame_size
    }

    /// The header announcing the destination, if any.
    #[must_use]
    pub fn destination_header(&self) -> Option<&str> {
        self.destination_header.as_deref()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Error returned when a [`WsClient`] cannot be created
/// for the given host, path or configuration.
pub enum ClientBuildError {
    /// The host is empty.
    EmptyHost,
    /// The host is not a valid URI authority,
    /// and can therefore not be used as a `Host` header value.
    InvalidHost(String),
    /// The path is neither empty nor starting with `/`,
    /// or contains control characters.
    InvalidPath(String),
    /// The configured destination header is not a valid header name.
    InvalidDestinationHeader(String),
}

impl fmt::Display for ClientBuildError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyHost => write!(f, "empty websocket host"),
            Self::InvalidHost(host) => write!(f, "invalid websocket host: {host:?}"),
            Self::InvalidPath(path) => write!(f, "invalid websocket path: {path:?}"),
            Self::InvalidDestinationHeader(name) => {
                write!(f, "invalid destination header name: {name:?}")
            }
        }
    }
}

impl std::error::Error for ClientBuildError {}

/// The websocket [`UpgradeClient`].
///
/// Every connection gets its own upgrade request to the configured
/// host and path. The client itself is immutable after construction.
#[derive(Debug, Clone)]
pub struct WsClient {
    host: String,
    path: String,
    uri: Uri,
    destination_header: Option<HeaderName>,
    config: WsClientConfig,
}

impl WsClient {
    /// Create a new [`WsClient`] using the default [`WsClientConfig`].
    pub fn new(host: &str, path: &str) -> Result<Self, ClientBuildError> {
        Self::with_config(host, path, WsClientConfig::default())
    }

    /// Create a new [`WsClient`] using the given [`WsClientConfig`].
    pub fn with_config(
        host: &str,
        path: &str,
        config: WsClientConfig,
    ) -> Result<Self, ClientBuildError> {
        if host.is_empty() {
            return Err(ClientBuildError::EmptyHost);
        }
        if host.contains('@') {
            return Err(ClientBuildError::InvalidHost(host.to_owned()));
        }
        let authority: Authority = host
            .parse()
            .map_err(|_invalid_uri| ClientBuildError::InvalidHost(host.to_owned()))?;

        if (!path.is_empty() && !path.starts_with('/')) || path.chars().any(char::is_control) {
            return Err(ClientBuildError::InvalidPath(path.to_owned()));
        }
        let target = if path.is_empty() {
            "/".to_owned()
        } else {
            utf8_percent_encode(path, PATH).to_string()
        };
        let target: PathAndQuery = target
            .parse()
            .map_err(|_invalid_uri| ClientBuildError::InvalidPath(path.to_owned()))?;

        let destination_header = config
            .destination_header()
            .map(|name| {
                HeaderName::from_bytes(name.as_bytes()).map_err(|_invalid_name| {
                    ClientBuildError::InvalidDestinationHeader(name.to_owned())
                })
            })
            .transpose()?;

        let uri = Uri::builder()
            .scheme("ws")
            .authority(authority)
            .path_and_query(target)
            .build()
            .map_err(|_invalid_uri| ClientBuildError::InvalidHost(host.to_owned()))?;

        Ok(Self {
            host: host.to_owned(),
            path: path.to_owned(),
            uri,
            destination_header,
            config,
        })
    }

    /// The `Host` of the upgrade requests.
    #[must_use]
    pub fn host(&self) -> &str {
        &self.host
    }

    /// The (decoded) path of the upgrade requests.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// The configuration of this client.
    #[must_use]
    pub fn config(&self) -> &WsClientConfig {
        &self.config
    }

    /// The upgrade request announcing `destination`, if not empty.
    fn request(&self, destination: &str) -> Result<Request<()>, WsError> {
        let mut builder = Request::builder()
            .method(Method::GET)
            .uri(self.uri.clone())
            .header(HOST, self.host.as_str())
            .header(CONNECTION, "Upgrade")
            .header(UPGRADE, "websocket")
            .header(SEC_WEBSOCKET_VERSION, "13")
            .header(SEC_WEBSOCKET_KEY, generate_key());
        if let Some(name) = &self.destination_header
            && !destination.is_empty()
        {
            builder = builder.header(name, destination);
        }
        Ok(builder.body(())?)
    }

    /// Perform the websocket handshake over `stream`.
    pub async fn handshake<S: Stream>(
        &self,
        stream: S,
        destination: &str,
    ) -> Result<WsStream<S>, WsError> {
        let request = self.request(destination)?;
        let (ws, response) =
            client_async_with_config(request, stream, Some(self.config.websocket)).await?;
        tracing::trace!(
            host = %self.host,
            status = %response.status(),
            "ws client: upgrade accepted",
        );
        Ok(WsStream::new(ws).with_write_frame_size(self.config.write_frame_size))
    }
}

impl UpgradeClient for WsClient {
    type Error = WsError;

    async fn new_conn(
        &self,
        transport: BoxStream,
        destination: String,
    ) -> Result<BoxStream, Self::Error> {
        let stream = self.handshake(transport, &destination).await?;
        Ok(Box::new(stream))
    }
}
