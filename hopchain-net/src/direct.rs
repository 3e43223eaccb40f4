use crate::{BoxStream, DialError, Dialer, Network};
use hopchain_error::BoxError;
use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr};
use tokio::net::{TcpStream, UdpSocket, lookup_host};

#[derive(Debug, Clone, Default)]
#[non_exhaustive]
/// The terminal [`Dialer`] of every hopchain: it connects
/// to the requested address directly, using the OS network stack.
pub struct DirectDialer;

impl DirectDialer {
    /// The address reported by a [`DirectDialer`].
    pub const ADDR: &'static str = "DIRECT";

    #[inline(always)]
    /// Create a new [`DirectDialer`].
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

async fn resolve(network: Network, address: &str) -> Result<Vec<SocketAddr>, DialError> {
    let addrs: Vec<_> = lookup_host(address)
        .await
        .map_err(|err| DialError::connect(address, err).with_context("resolve address"))?
        .filter(|addr| network.accepts(addr))
        .collect();
    if addrs.is_empty() {
        return Err(DialError::connect(
            address,
            BoxError::from(format!("no resolved address matches network {network}")),
        ));
    }
    Ok(addrs)
}

impl Dialer for DirectDialer {
    fn addr(&self) -> &str {
        Self::ADDR
    }

    async fn dial(&self, network: Network, address: String) -> Result<BoxStream, DialError> {
        if !network.is_stream() {
            return Err(
                DialError::unsupported("direct dial requires a stream network, use dial_udp")
                    .with_address(address),
            );
        }

        let mut last_error = None;
        for addr in resolve(network, &address).await? {
            match TcpStream::connect(addr).await {
                Ok(stream) => {
                    tracing::trace!(
                        server.address = %address,
                        network.peer.address = %addr,
                        network.transport = %network,
                        "direct dialer: connected",
                    );
                    return Ok(Box::new(stream));
                }
                Err(err) => {
                    tracing::trace!(
                        server.address = %address,
                        network.peer.address = %addr,
                        "direct dialer: connect attempt failed: {err}",
                    );
                    last_error = Some(err);
                }
            }
        }

        Err(match last_error {
            Some(err) => DialError::connect(address, err),
            None => DialError::connect(address, BoxError::from("no address to connect to")),
        })
    }

    async fn dial_udp(
        &self,
        network: Network,
        address: String,
    ) -> Result<(UdpSocket, SocketAddr), DialError> {
        if !network.is_datagram() {
            return Err(
                DialError::unsupported("direct udp dial requires a datagram network")
                    .with_address(address),
            );
        }

        let peer = match resolve(network, &address).await?.first() {
            Some(peer) => *peer,
            None => {
                return Err(DialError::connect(
                    address,
                    BoxError::from("no address to send datagrams to"),
                ));
            }
        };

        let bind: SocketAddr = if peer.is_ipv4() {
            (Ipv4Addr::UNSPECIFIED, 0).into()
        } else {
            (Ipv6Addr::UNSPECIFIED, 0).into()
        };
        let socket = UdpSocket::bind(bind)
            .await
            .map_err(|err| DialError::connect(address.as_str(), err).with_context("bind udp"))?;

        tracing::trace!(
            server.address = %address,
            network.peer.address = %peer,
            "direct dialer: udp socket ready",
        );
        Ok((socket, peer))
    }
}
