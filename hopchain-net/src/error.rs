use hopchain_error::BoxError;
use std::fmt;

/// The closed set of failure kinds a [`Dialer`](crate::Dialer) can report,
/// be it while a chain link is being built or while it dials.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum DialErrorKind {
    /// The spec string of a chain link could not be parsed,
    /// or no constructor is registered for its scheme.
    InvalidSpec,
    /// The upgrade (handshake) client rejected the resolved host or path.
    UpgradeClientConstructionFailed,
    /// The upstream dialer failed to provide a transport.
    UpstreamDialFailed,
    /// The protocol upgrade over an established transport failed.
    HandshakeFailed,
    /// The requested operation is not supported by this dialer.
    UnsupportedOperation,
    /// A socket could not be established by the terminal dialer.
    ConnectFailed,
}

impl DialErrorKind {
    const fn as_str(self) -> &'static str {
        match self {
            Self::InvalidSpec => "invalid dialer spec",
            Self::UpgradeClientConstructionFailed => "upgrade client construction failed",
            Self::UpstreamDialFailed => "upstream dial failed",
            Self::HandshakeFailed => "handshake failed",
            Self::UnsupportedOperation => "unsupported operation",
            Self::ConnectFailed => "connect failed",
        }
    }
}

impl fmt::Display for DialErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned by a [`Dialer`](crate::Dialer) or while building one.
///
/// The [`DialErrorKind`] is what callers should match on. The error it was
/// caused by, if any, is available as [`std::error::Error::source`].
pub struct DialError {
    kind: DialErrorKind,
    address: Option<String>,
    context: Option<&'static str>,
    source: Option<BoxError>,
}

impl DialError {
    /// Create a new [`DialError`] of the given kind, without source.
    #[must_use]
    pub const fn new(kind: DialErrorKind) -> Self {
        Self {
            kind,
            address: None,
            context: None,
            source: None,
        }
    }

    /// Create an [`DialErrorKind::InvalidSpec`] error.
    pub fn invalid_spec(error: impl Into<BoxError>) -> Self {
        Self::new(DialErrorKind::InvalidSpec).with_source(error)
    }

    /// Create an [`DialErrorKind::UpgradeClientConstructionFailed`] error.
    pub fn client_construction(error: impl Into<BoxError>) -> Self {
        Self::new(DialErrorKind::UpgradeClientConstructionFailed).with_source(error)
    }

    /// Create an [`DialErrorKind::UpstreamDialFailed`] error for the given next-hop address.
    pub fn upstream(address: impl Into<String>, error: impl Into<BoxError>) -> Self {
        Self::new(DialErrorKind::UpstreamDialFailed)
            .with_address(address)
            .with_source(error)
    }

    /// Create an [`DialErrorKind::HandshakeFailed`] error.
    pub fn handshake(error: impl Into<BoxError>) -> Self {
        Self::new(DialErrorKind::HandshakeFailed).with_source(error)
    }

    /// Create an [`DialErrorKind::UnsupportedOperation`] error.
    #[must_use]
    pub const fn unsupported(context: &'static str) -> Self {
        Self::new(DialErrorKind::UnsupportedOperation).with_context(context)
    }

    /// Create an [`DialErrorKind::ConnectFailed`] error for the given address.
    pub fn connect(address: impl Into<String>, error: impl Into<BoxError>) -> Self {
        Self::new(DialErrorKind::ConnectFailed)
            .with_address(address)
            .with_source(error)
    }

    /// Attach the address that was being dialed.
    #[must_use]
    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.address = Some(address.into());
        self
    }

    /// Attach a static context message.
    #[must_use]
    pub const fn with_context(mut self, context: &'static str) -> Self {
        self.context = Some(context);
        self
    }

    /// Attach the error that caused this one.
    #[must_use]
    pub fn with_source(mut self, error: impl Into<BoxError>) -> Self {
        self.source = Some(error.into());
        self
    }

    /// The kind of this error.
    #[must_use]
    pub const fn kind(&self) -> DialErrorKind {
        self.kind
    }

    /// The address that was being dialed, if known.
    #[must_use]
    pub fn address(&self) -> Option<&str> {
        self.address.as_deref()
    }
}

impl fmt::Debug for DialError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DialError")
            .field("kind", &self.kind)
            .field("address", &self.address)
            .field("context", &self.context)
            .field("source", &self.source)
            .finish()
    }
}

impl fmt::Display for DialError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.kind.as_str())?;
        if let Some(address) = &self.address {
            write!(f, " (address: {address})")?;
        }
        if let Some(context) = self.context {
            write!(f, " ({context})")?;
        }
        if let Some(source) = &self.source {
            write!(f, ": {source}")?;
        }
        Ok(())
    }
}

impl std::error::Error for DialError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_deref()
            .map(|err| err as &(dyn std::error::Error + 'static))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hopchain_error::ErrorExt;

    #[test]
    fn display_includes_address_and_source() {
        let err = DialError::upstream("1.2.3.4:80", std::io::Error::other("refused"));
        assert_eq!(
            "upstream dial failed (address: 1.2.3.4:80): refused",
            err.to_string()
        );
        assert_eq!(DialErrorKind::UpstreamDialFailed, err.kind());
        assert_eq!(Some("1.2.3.4:80"), err.address());
    }

    #[test]
    fn unsupported_has_no_source() {
        let err = DialError::unsupported("udp over ws");
        assert_eq!("unsupported operation (udp over ws)", err.to_string());
        assert!(std::error::Error::source(&err).is_none());
    }

    #[test]
    fn nested_dial_errors_keep_root_cause() {
        let inner = DialError::connect("up:1", std::io::Error::other("no route"));
        let outer = DialError::upstream("up:1", inner);
        assert_eq!(3, outer.chain().count());
        assert!(outer.root_cause().is::<std::io::Error>());
    }
}
