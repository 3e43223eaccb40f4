use hopchain_net::{DialError, Dialer, DialerSpec};

/// The resolved configuration of a websocket link: where to dial,
/// and which `Host` and path to put on the upgrade request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WsEndpoint {
    address: String,
    host: String,
    path: String,
}

impl WsEndpoint {
    /// Resolve the endpoint of the `ws://` link described by `spec`,
    /// stacked on top of `upstream`.
    ///
    /// - the address is the spec's authority, or the upstream's address if empty;
    /// - the host is the `host` query parameter, or the address up to its last `:`;
    /// - the path is the spec's decoded path.
    pub fn resolve<D: Dialer>(spec: &str, upstream: &D) -> Result<Self, DialError> {
        let spec = DialerSpec::parse(spec).map_err(DialError::invalid_spec)?;
        Ok(Self::from_spec(&spec, upstream.addr()))
    }

    /// Same as [`Self::resolve`], for an already parsed spec.
    #[must_use]
    pub fn from_spec(spec: &DialerSpec, upstream_addr: &str) -> Self {
        let address = if spec.authority().is_empty() {
            upstream_addr.to_owned()
        } else {
            spec.authority().to_owned()
        };

        let host = match spec.query_param("host") {
            Some(host) if !host.is_empty() => host,
            _ => host_from_address(&address).to_owned(),
        };

        Self {
            address,
            host,
            path: spec.path().to_owned(),
        }
    }

    /// The address of the next hop.
    #[must_use]
    pub fn address(&self) -> &str {
        &self.address
    }

    /// The `Host` of the upgrade request.
    #[must_use]
    pub fn host(&self) -> &str {
        &self.host
    }

    /// The (decoded) path of the upgrade request.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }
}

/// Everything before the last `:`, or the whole address if there is none.
///
/// This is not IPv6 aware: `[::1]` yields `[:`.
fn host_from_address(address: &str) -> &str {
    address.rfind(':').map_or(address, |idx| &address[..idx])
}

#[cfg(test)]
mod tests {
    use super::*;
    use hopchain_net::{DialErrorKind, DirectDialer, SpecParseError};
    use hopchain_error::ErrorExt;

    fn resolve(spec: &str, upstream_addr: &str) -> WsEndpoint {
        WsEndpoint::from_spec(&DialerSpec::parse(spec).unwrap(), upstream_addr)
    }

    #[test]
    fn resolve_endpoint() {
        for (spec, upstream, address, host, path) in [
            ("ws://1.2.3.4:8080/tunnel", "DIRECT", "1.2.3.4:8080", "1.2.3.4", "/tunnel"),
            (
                "ws://1.2.3.4:8080/x?host=example.com",
                "DIRECT",
                "1.2.3.4:8080",
                "example.com",
                "/x",
            ),
            ("ws://?host=cdn.example.com", "5.6.7.8:443", "5.6.7.8:443", "cdn.example.com", ""),
            ("ws://", "5.6.7.8:443", "5.6.7.8:443", "5.6.7.8", ""),
            ("ws://example.com", "DIRECT", "example.com", "example.com", ""),
            ("ws://h:80?host=", "DIRECT", "h:80", "h", ""),
            ("ws://h:80/a%20b", "DIRECT", "h:80", "h", "/a b"),
            ("ws://user:pw@h:80", "DIRECT", "h:80", "h", ""),
            ("ws://[::1]:443", "DIRECT", "[::1]:443", "[::1]", ""),
        ] {
            let endpoint = resolve(spec, upstream);
            assert_eq!(address, endpoint.address(), "spec: {spec}");
            assert_eq!(host, endpoint.host(), "spec: {spec}");
            assert_eq!(path, endpoint.path(), "spec: {spec}");
        }
    }

    #[test]
    fn resolve_ipv6_without_port_keeps_naive_host() {
        let endpoint = resolve("ws://[::1]", "DIRECT");
        assert_eq!("[::1]", endpoint.address());
        assert_eq!("[:", endpoint.host());
    }

    #[test]
    fn resolve_invalid_spec() {
        let err = WsEndpoint::resolve("ws://h/%zz", &DirectDialer::new()).unwrap_err();
        assert_eq!(DialErrorKind::InvalidSpec, err.kind());
        assert!(err.root_cause().is::<SpecParseError>());
    }

    #[test]
    fn resolve_uses_upstream_addr() {
        let endpoint = WsEndpoint::resolve("ws:///path", &DirectDialer::new()).unwrap();
        assert_eq!("DIRECT", endpoint.address());
        assert_eq!("DIRECT", endpoint.host());
        assert_eq!("/path", endpoint.path());
    }
}
