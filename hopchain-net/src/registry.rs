//! Scheme-keyed registry of chain link constructors.
//!
//! The registry is a plain value, built by the application's startup code:
//! each protocol crate supplies a constructor and the application decides
//! under which scheme it is reachable.
//!
//! ```
//! use hopchain_net::{Dialer, DialerRegistry, DirectDialer};
//!
//! let registry = DialerRegistry::new()
//!     .with_constructor("passthrough", |_spec, upstream| Ok(upstream));
//!
//! let dialer = registry
//!     .build("passthrough://", DirectDialer::new().boxed())
//!     .unwrap();
//! assert_eq!("DIRECT", dialer.addr());
//! ```

use crate::{BoxDialer, DialError, Dialer as _, DialerSpec};
use smol_str::SmolStr;
use std::{collections::HashMap, fmt, sync::Arc};

type DialerConstructor =
    Arc<dyn Fn(&str, BoxDialer) -> Result<BoxDialer, DialError> + Send + Sync + 'static>;

/// Maps a spec scheme (e.g. `"ws"`) to the constructor of its chain link.
///
/// A constructor receives the full spec string and the upstream dialer
/// the new link has to consume.
#[derive(Clone, Default)]
pub struct DialerRegistry {
    constructors: HashMap<SmolStr, DialerConstructor>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Error returned when no constructor is registered for a spec's scheme.
pub struct UnknownSchemeError(SmolStr);

impl fmt::Display for UnknownSchemeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "no dialer registered for scheme {:?}", self.0)
    }
}

impl std::error::Error for UnknownSchemeError {}

impl DialerRegistry {
    /// Create a new, empty [`DialerRegistry`].
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) the constructor for the given scheme.
    ///
    /// Schemes are matched case-insensitively.
    pub fn register<F>(&mut self, scheme: &str, constructor: F) -> &mut Self
    where
        F: Fn(&str, BoxDialer) -> Result<BoxDialer, DialError> + Send + Sync + 'static,
    {
        let scheme = SmolStr::new(scheme.to_ascii_lowercase());
        if self
            .constructors
            .insert(scheme.clone(), Arc::new(constructor))
            .is_some()
        {
            tracing::debug!(%scheme, "dialer registry: replaced constructor");
        }
        self
    }

    /// Register (or replace) the constructor for the given scheme,
    /// returning the registry itself.
    #[must_use]
    pub fn with_constructor<F>(mut self, scheme: &str, constructor: F) -> Self
    where
        F: Fn(&str, BoxDialer) -> Result<BoxDialer, DialError> + Send + Sync + 'static,
    {
        self.register(scheme, constructor);
        self
    }

    /// Returns `true` if a constructor is registered for the given scheme.
    #[must_use]
    pub fn contains(&self, scheme: &str) -> bool {
        self.constructors
            .contains_key(scheme.to_ascii_lowercase().as_str())
    }

    /// Iterate over the registered schemes, in no particular order.
    pub fn schemes(&self) -> impl Iterator<Item = &str> {
        self.constructors.keys().map(SmolStr::as_str)
    }

    /// Build the chain link described by `spec` on top of `upstream`.
    ///
    /// Fails with [`DialErrorKind::InvalidSpec`](crate::DialErrorKind::InvalidSpec)
    /// if the spec cannot be parsed or its scheme is unknown. Any error
    /// returned by the constructor itself is returned unchanged.
    pub fn build(&self, spec: &str, upstream: BoxDialer) -> Result<BoxDialer, DialError> {
        let parsed = DialerSpec::parse(spec).map_err(DialError::invalid_spec)?;
        let Some(constructor) = self.constructors.get(parsed.scheme()) else {
            return Err(DialError::invalid_spec(UnknownSchemeError(SmolStr::new(
                parsed.scheme(),
            ))));
        };
        tracing::trace!(
            scheme = parsed.scheme(),
            upstream = upstream.addr(),
            "dialer registry: build link",
        );
        constructor(spec, upstream)
    }
}

impl fmt::Debug for DialerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut schemes: Vec<_> = self.schemes().collect();
        schemes.sort_unstable();
        f.debug_struct("DialerRegistry")
            .field("schemes", &schemes)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{DialErrorKind, Dialer, DirectDialer, SpecParseError};
    use hopchain_error::ErrorExt;
    use tracing_test::traced_test;

    #[test]
    fn build_known_scheme_case_insensitive() {
        let mut registry = DialerRegistry::new();
        registry.register("Pass", |_, upstream| Ok(upstream));
        assert!(registry.contains("pass"));
        assert!(registry.contains("PASS"));

        let dialer = registry
            .build("PASS://ignored", DirectDialer::new().boxed())
            .unwrap();
        assert_eq!("DIRECT", dialer.addr());
        assert_eq!("DialerRegistry { schemes: [\"pass\"] }", format!("{registry:?}"));
    }

    #[test]
    #[traced_test]
    fn register_replaces_constructor() {
        let registry = DialerRegistry::new()
            .with_constructor("x", |_, _| Err(DialError::unsupported("first")))
            .with_constructor("X", |_, upstream| Ok(upstream));
        assert_eq!(1, registry.schemes().count());
        assert!(logs_contain("replaced constructor"));

        let dialer = registry
            .build("x://", DirectDialer::new().boxed())
            .unwrap();
        assert_eq!("DIRECT", dialer.addr());
    }

    #[test]
    fn build_unknown_scheme() {
        let registry = DialerRegistry::new();
        let err = registry
            .build("socks5://1.2.3.4:1080", DirectDialer::new().boxed())
            .unwrap_err();
        assert_eq!(DialErrorKind::InvalidSpec, err.kind());
        assert!(err.root_cause().is::<UnknownSchemeError>());
    }

    #[test]
    fn build_malformed_spec() {
        let registry = DialerRegistry::new().with_constructor("ws", |_, upstream| Ok(upstream));
        let err = registry
            .build("ws://host/%zz", DirectDialer::new().boxed())
            .unwrap_err();
        assert_eq!(DialErrorKind::InvalidSpec, err.kind());
        assert!(err.root_cause().is::<SpecParseError>());
    }

    #[test]
    fn constructor_errors_pass_through() {
        let registry = DialerRegistry::new().with_constructor("broken", |_, _| {
            Err(DialError::client_construction(std::io::Error::other("nope")))
        });
        let err = registry
            .build("broken://x", DirectDialer::new().boxed())
            .unwrap_err();
        assert_eq!(DialErrorKind::UpgradeClientConstructionFailed, err.kind());
    }
}
