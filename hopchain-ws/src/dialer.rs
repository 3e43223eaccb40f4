use crate::{UpgradeClient, WsClient, WsClientConfig, WsEndpoint};
use hopchain_error::BoxError;
use hopchain_net::{BoxStream, DialError, Dialer, Network};
use std::net::SocketAddr;
use tokio::net::UdpSocket;

/// A [`Dialer`] tunnelling every connection through a websocket upgrade
/// with the next hop, which is itself reached through the upstream dialer.
///
/// # Example
///
/// ```
/// use hopchain_net::{Dialer, DirectDialer};
/// use hopchain_ws::WsDialer;
///
/// let dialer = WsDialer::new("ws://1.2.3.4:80/tunnel?host=example.com", DirectDialer::new())
///     .unwrap();
/// assert_eq!("1.2.3.4:80", dialer.addr());
/// assert_eq!("example.com", dialer.endpoint().host());
/// ```
#[derive(Debug)]
pub struct WsDialer<D, C = WsClient> {
    upstream: D,
    endpoint: WsEndpoint,
    client: C,
}

impl<D: Dialer> WsDialer<D> {
    /// Create a new [`WsDialer`] for the given `ws://` spec,
    /// using the default [`WsClientConfig`].
    pub fn new(spec: &str, upstream: D) -> Result<Self, DialError> {
        Self::with_config(spec, upstream, WsClientConfig::default())
    }

    /// Create a new [`WsDialer`] for the given `ws://` spec,
    /// using the given [`WsClientConfig`].
    pub fn with_config(spec: &str, upstream: D, config: WsClientConfig) -> Result<Self, DialError> {
        Self::with_client_factory(spec, upstream, move |host, path| {
            WsClient::with_config(host, path, config)
        })
    }
}

impl<D: Dialer, C: UpgradeClient> WsDialer<D, C> {
    /// Create a new [`WsDialer`] for the given `ws://` spec, building its
    /// [`UpgradeClient`] from the resolved host and path with `factory`.
    pub fn with_client_factory<F, E>(spec: &str, upstream: D, factory: F) -> Result<Self, DialError>
    where
        F: FnOnce(&str, &str) -> Result<C, E>,
        E: Into<BoxError>,
    {
        let endpoint = WsEndpoint::resolve(spec, &upstream).inspect_err(|err| {
            tracing::debug!(upstream = upstream.addr(), "ws dialer: invalid spec: {err}");
        })?;

        let client = factory(endpoint.host(), endpoint.path()).map_err(|err| {
            let err = DialError::client_construction(err);
            tracing::debug!(
                server.address = endpoint.address(),
                http.request.host = endpoint.host(),
                "ws dialer: failed to create upgrade client: {err}",
            );
            err
        })?;

        tracing::debug!(
            server.address = endpoint.address(),
            http.request.host = endpoint.host(),
            http.request.path = endpoint.path(),
            upstream = upstream.addr(),
            "ws dialer: created",
        );

        Ok(Self {
            upstream,
            endpoint,
            client,
        })
    }

    /// The resolved endpoint of this link.
    pub fn endpoint(&self) -> &WsEndpoint {
        &self.endpoint
    }

    /// The dialer used to reach the next hop.
    pub fn upstream(&self) -> &D {
        &self.upstream
    }

    /// The client performing the upgrade.
    pub fn client(&self) -> &C {
        &self.client
    }
}

impl<D: Dialer, C: UpgradeClient> Dialer for WsDialer<D, C> {
    fn addr(&self) -> &str {
        match self.endpoint.address() {
            "" => self.upstream.addr(),
            address => address,
        }
    }

    async fn dial(&self, network: Network, address: String) -> Result<BoxStream, DialError> {
        let next_hop = self.endpoint.address();
        tracing::trace!(
            network.transport = %network,
            server.address = %address,
            next_hop,
            "ws dialer: dial",
        );

        // the tunnel itself is always carried over a stream
        let transport = self
            .upstream
            .dial(Network::Tcp, next_hop.to_owned())
            .await
            .map_err(|err| {
                tracing::debug!(next_hop, "ws dialer: upstream dial failed: {err}");
                DialError::upstream(next_hop, err)
            })?;

        self.client
            .new_conn(transport, address.clone())
            .await
            .map_err(|err| {
                let err = DialError::handshake(err).with_address(address);
                tracing::debug!(next_hop, "ws dialer: {err}");
                err
            })
    }

    async fn dial_udp(
        &self,
        _network: Network,
        address: String,
    ) -> Result<(UdpSocket, SocketAddr), DialError> {
        Err(
            DialError::unsupported("udp is not supported over a websocket tunnel")
                .with_address(address),
        )
    }
}
