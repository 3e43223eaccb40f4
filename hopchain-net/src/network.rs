use std::{fmt, net::SocketAddr, str::FromStr};

/// The network a caller asks a dialer to use,
/// named after the classic `tcp`/`udp` family of network strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Network {
    /// A byte stream over either IP family.
    Tcp,
    /// A byte stream over IPv4 only.
    Tcp4,
    /// A byte stream over IPv6 only.
    Tcp6,
    /// Datagrams over either IP family.
    Udp,
    /// Datagrams over IPv4 only.
    Udp4,
    /// Datagrams over IPv6 only.
    Udp6,
}

impl Network {
    /// Returns the canonical network string, e.g. `"tcp4"`.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Tcp => "tcp",
            Self::Tcp4 => "tcp4",
            Self::Tcp6 => "tcp6",
            Self::Udp => "udp",
            Self::Udp4 => "udp4",
            Self::Udp6 => "udp6",
        }
    }

    /// Returns `true` if this network carries a byte stream.
    #[must_use]
    pub const fn is_stream(self) -> bool {
        matches!(self, Self::Tcp | Self::Tcp4 | Self::Tcp6)
    }

    /// Returns `true` if this network carries datagrams.
    #[must_use]
    pub const fn is_datagram(self) -> bool {
        !self.is_stream()
    }

    /// Returns `true` if the given resolved address
    /// belongs to an IP family allowed by this network.
    #[must_use]
    pub const fn accepts(self, addr: &SocketAddr) -> bool {
        match self {
            Self::Tcp | Self::Udp => true,
            Self::Tcp4 | Self::Udp4 => addr.is_ipv4(),
            Self::Tcp6 | Self::Udp6 => addr.is_ipv6(),
        }
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Error returned when parsing an unknown network string.
pub struct UnknownNetworkError(String);

impl fmt::Display for UnknownNetworkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown network: {:?}", self.0)
    }
}

impl std::error::Error for UnknownNetworkError {}

impl FromStr for Network {
    type Err = UnknownNetworkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let network = match s.trim().to_ascii_lowercase().as_str() {
            "tcp" => Self::Tcp,
            "tcp4" => Self::Tcp4,
            "tcp6" => Self::Tcp6,
            "udp" => Self::Udp,
            "udp4" => Self::Udp4,
            "udp6" => Self::Udp6,
            _ => return Err(UnknownNetworkError(s.to_owned())),
        };
        Ok(network)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_network_strings() {
        for (input, expected) in [
            ("tcp", Network::Tcp),
            ("TCP4", Network::Tcp4),
            (" tcp6 ", Network::Tcp6),
            ("udp", Network::Udp),
            ("udp4", Network::Udp4),
            ("Udp6", Network::Udp6),
        ] {
            assert_eq!(expected, input.parse::<Network>().unwrap(), "input: {input}");
        }
        assert!("unix".parse::<Network>().is_err());
    }

    #[test]
    fn network_family_filter() {
        let v4: SocketAddr = "127.0.0.1:80".parse().unwrap();
        let v6: SocketAddr = "[::1]:80".parse().unwrap();

        assert!(Network::Tcp.accepts(&v4));
        assert!(Network::Tcp.accepts(&v6));
        assert!(Network::Tcp4.accepts(&v4));
        assert!(!Network::Tcp4.accepts(&v6));
        assert!(!Network::Udp6.accepts(&v4));
        assert!(Network::Udp6.accepts(&v6));
    }

    #[test]
    fn network_kind() {
        assert!(Network::Tcp6.is_stream());
        assert!(!Network::Tcp6.is_datagram());
        assert!(Network::Udp.is_datagram());
        assert_eq!("udp4", Network::Udp4.to_string());
    }
}
