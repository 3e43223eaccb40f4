//! 🔗 hopchain: chained forward-proxy dialers for the 🦀 Rust language.
//!
//! A hopchain is a sequence of dialers where each link wraps the next one:
//! a link consumes the [`Dialer`] capability of its upstream and exposes
//! that same capability to whatever sits above it. The bottom of every
//! chain is the [`DirectDialer`], which opens plain sockets.
//!
//! | crate | what it brings |
//! |-|-|
//! | [`error`] | [`BoxError`](error::BoxError), [`OpaqueError`](error::OpaqueError) and context chaining |
//! | [`net`] | the [`Dialer`] capability, [`DirectDialer`], spec parsing and the [`DialerRegistry`] |
//! | [`ws`] | the websocket (`ws://`) link, on top of `tokio-tungstenite` |
//!
//! Chains are assembled from a comma separated list of link specs,
//! the first spec being the hop closest to the local machine:
//!
//! ```
//! use hopchain::{Dialer, build_chain, default_registry};
//!
//! let chain = build_chain(&default_registry(), "ws://1.2.3.4:80/tunnel").unwrap();
//! assert_eq!("1.2.3.4:80", chain.addr());
//! ```
//!
//! Dialing through the chain then looks exactly like dialing directly:
//!
//! ```no_run
//! # async fn connect() -> Result<(), hopchain::error::BoxError> {
//! use hopchain::{Dialer, build_chain, default_registry, net::Network};
//! use tokio::io::AsyncWriteExt;
//!
//! let chain = build_chain(&default_registry(), "ws://1.2.3.4:80/tunnel?host=example.com")?;
//! let mut stream = chain.dial(Network::Tcp, "example.org:443".to_owned()).await?;
//! stream.write_all(b"hello").await?;
//! # Ok(())
//! # }
//! ```

#![cfg_attr(docsrs, feature(doc_cfg))]
#![cfg_attr(not(test), warn(clippy::print_stdout, clippy::dbg_macro))]

#[doc(inline)]
pub use ::hopchain_error as error;

#[doc(inline)]
pub use ::hopchain_net as net;

#[doc(inline)]
pub use ::hopchain_ws as ws;

#[doc(inline)]
pub use net::{BoxDialer, DialError, DialErrorKind, Dialer, DialerRegistry, DirectDialer};

mod chain;
#[doc(inline)]
pub use chain::{build_chain, default_registry};
