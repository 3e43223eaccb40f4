use crate::{
    net::{BoxDialer, DialError, Dialer, DialerRegistry, DirectDialer},
    ws::WsDialer,
};

/// Create a [`DialerRegistry`] with all link schemes shipped by hopchain
/// registered: currently only `ws`.
#[must_use]
pub fn default_registry() -> DialerRegistry {
    DialerRegistry::new().with_constructor("ws", |spec, upstream| {
        Ok(WsDialer::new(spec, upstream)?.boxed())
    })
}

/// Build a dialer chain from a comma separated list of link specs.
///
/// Links are stacked in order on top of a [`DirectDialer`]: the first spec
/// is the hop closest to the local machine and the returned dialer is the
/// last link. Empty entries are skipped, so an empty `forwarders` string
/// yields the [`DirectDialer`] itself.
pub fn build_chain(registry: &DialerRegistry, forwarders: &str) -> Result<BoxDialer, DialError> {
    forwarders
        .split(',')
        .map(str::trim)
        .filter(|spec| !spec.is_empty())
        .try_fold(DirectDialer::new().boxed(), |upstream, spec| -> Result<_, DialError> {
            let link = registry.build(spec, upstream)?;
            tracing::debug!(link.addr = link.addr(), "hopchain: link added");
            Ok(link)
        })
}
