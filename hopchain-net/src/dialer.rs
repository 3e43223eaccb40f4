use crate::{BoxStream, DialError, Network};
use std::{fmt, net::SocketAddr, pin::Pin, sync::Arc};
use tokio::net::UdpSocket;

/// The dialing capability shared by every link of a hopchain.
///
/// A chain link consumes the [`Dialer`] of its upstream and
/// exposes the same capability to whatever sits above it,
/// which is what allows links to be composed recursively.
///
/// Implementations keep no mutable per-call state,
/// so a single dialer can be used from many tasks at once.
pub trait Dialer: Send + Sync + 'static {
    /// The address this dialer forwards to, used for diagnostics
    /// and as the default next hop of a link stacked on top of it.
    fn addr(&self) -> &str;

    /// Dial `address` using the requested [`Network`],
    /// returning a byte stream once the connection is established.
    fn dial(
        &self,
        network: Network,
        address: String,
    ) -> impl Future<Output = Result<BoxStream, DialError>> + Send + '_;

    /// Dial `address` for datagram traffic, returning the local socket
    /// together with the resolved address datagrams should be sent to.
    fn dial_udp(
        &self,
        network: Network,
        address: String,
    ) -> impl Future<Output = Result<(UdpSocket, SocketAddr), DialError>> + Send + '_;

    /// Box this dialer to allow for dynamic dispatch.
    fn boxed(self) -> BoxDialer
    where
        Self: Sized,
    {
        BoxDialer::new(self)
    }
}

impl<D> Dialer for Arc<D>
where
    D: Dialer,
{
    #[inline]
    fn addr(&self) -> &str {
        (**self).addr()
    }

    #[inline]
    fn dial(
        &self,
        network: Network,
        address: String,
    ) -> impl Future<Output = Result<BoxStream, DialError>> + Send + '_ {
        (**self).dial(network, address)
    }

    #[inline]
    fn dial_udp(
        &self,
        network: Network,
        address: String,
    ) -> impl Future<Output = Result<(UdpSocket, SocketAddr), DialError>> + Send + '_ {
        (**self).dial_udp(network, address)
    }
}

/// Internal trait for dynamic dispatch of the async [`Dialer`] trait,
/// same design pattern as the one used for boxed services.
trait DynDialer {
    fn dyn_addr(&self) -> &str;

    fn dial_box(
        &self,
        network: Network,
        address: String,
    ) -> Pin<Box<dyn Future<Output = Result<BoxStream, DialError>> + Send + '_>>;

    fn dial_udp_box(
        &self,
        network: Network,
        address: String,
    ) -> Pin<Box<dyn Future<Output = Result<(UdpSocket, SocketAddr), DialError>> + Send + '_>>;
}

impl<T> DynDialer for T
where
    T: Dialer,
{
    fn dyn_addr(&self) -> &str {
        self.addr()
    }

    fn dial_box(
        &self,
        network: Network,
        address: String,
    ) -> Pin<Box<dyn Future<Output = Result<BoxStream, DialError>> + Send + '_>> {
        Box::pin(self.dial(network, address))
    }

    fn dial_udp_box(
        &self,
        network: Network,
        address: String,
    ) -> Pin<Box<dyn Future<Output = Result<(UdpSocket, SocketAddr), DialError>> + Send + '_>>
    {
        Box::pin(self.dial_udp(network, address))
    }
}

/// A boxed [`Dialer`], for where you require dynamic dispatch,
/// such as when chain links are assembled from configuration.
///
/// Cloning is cheap: all clones share the same underlying dialer.
pub struct BoxDialer {
    inner: Arc<dyn DynDialer + Send + Sync + 'static>,
}

impl BoxDialer {
    /// Create a new [`BoxDialer`] from the given dialer.
    #[inline]
    pub fn new<D>(dialer: D) -> Self
    where
        D: Dialer,
    {
        Self {
            inner: Arc::new(dialer),
        }
    }
}

impl Clone for BoxDialer {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl fmt::Debug for BoxDialer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BoxDialer")
            .field("addr", &self.inner.dyn_addr())
            .finish()
    }
}

impl Dialer for BoxDialer {
    #[inline]
    fn addr(&self) -> &str {
        self.inner.dyn_addr()
    }

    #[inline]
    fn dial(
        &self,
        network: Network,
        address: String,
    ) -> impl Future<Output = Result<BoxStream, DialError>> + Send + '_ {
        self.inner.dial_box(network, address)
    }

    #[inline]
    fn dial_udp(
        &self,
        network: Network,
        address: String,
    ) -> impl Future<Output = Result<(UdpSocket, SocketAddr), DialError>> + Send + '_ {
        self.inner.dial_udp_box(network, address)
    }

    #[inline]
    fn boxed(self) -> Self {
        self
    }
}
