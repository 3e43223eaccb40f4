//! WebSocket (WS) upgrade link for hopchain.
//!
//! The [`WsDialer`] lets any hopchain [`Dialer`] tunnel its traffic through
//! a websocket upgrade, so that it can traverse HTTP-aware intermediaries.
//! It consumes an upstream dialer for the raw transport to the next hop,
//! performs the client handshake over it and hands back a stream that can be
//! used exactly like the raw connection, stacking further links on top if
//! desired.
//!
//! A link is configured by a compact spec string:
//!
//! ```text
//! ws://[authority][/path][?host=value]
//! ```
//!
//! - `authority`: the next hop (`host[:port]`), defaults to the upstream's address;
//! - `path`: the path of the upgrade request;
//! - `host`: the `Host` of the upgrade request, defaults to the authority minus its port.
//!
//! The upgrade itself and the websocket framing are done by
//! [`tokio_tungstenite`], [`WsStream`] turns the resulting binary messages
//! back into a byte stream.
//!
//! [`Dialer`]: hopchain_net::Dialer

#![cfg_attr(docsrs, feature(doc_cfg))]
#![cfg_attr(not(test), warn(clippy::print_stdout, clippy::dbg_macro))]

pub use tokio_tungstenite::tungstenite::{Error as WsError, protocol::WebSocketConfig};

mod stream;
#[doc(inline)]
pub use stream::{DEFAULT_WRITE_FRAME_SIZE, WsStream};

mod client;
#[doc(inline)]
pub use client::{
    ClientBuildError, DEFAULT_DESTINATION_HEADER, UpgradeClient, WsClient, WsClientConfig,
};

mod endpoint;
#[doc(inline)]
pub use endpoint::WsEndpoint;

mod dialer;
#[doc(inline)]
pub use dialer::WsDialer;

#[cfg(test)]
mod test_server;
