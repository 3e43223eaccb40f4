//! Dialer capability and network plumbing for hopchain.
//!
//! A hopchain is a sequence of dialers where each link wraps the next one,
//! consuming the [`Dialer`] capability of its upstream and exposing that same
//! capability to whatever sits above it. The bottom of every chain is the
//! [`DirectDialer`], which opens plain sockets.
//!
//! Links are built from compact spec strings such as `ws://1.2.3.4:80/path`,
//! parsed by [`DialerSpec`] and dispatched by scheme through an explicit
//! [`DialerRegistry`].
//!
//! # Example
//!
//! ```
//! use hopchain_net::{Dialer, DirectDialer};
//!
//! let dialer = DirectDialer::new().boxed();
//! assert_eq!("DIRECT", dialer.addr());
//! ```

#![cfg_attr(docsrs, feature(doc_cfg))]
#![cfg_attr(not(test), warn(clippy::print_stdout, clippy::dbg_macro))]

mod network;
#[doc(inline)]
pub use network::{Network, UnknownNetworkError};

pub mod stream;
#[doc(inline)]
pub use stream::{BoxStream, Stream};

mod error;
#[doc(inline)]
pub use error::{DialError, DialErrorKind};

mod dialer;
#[doc(inline)]
pub use dialer::{BoxDialer, Dialer};

mod direct;
#[doc(inline)]
pub use direct::DirectDialer;

pub mod spec;
#[doc(inline)]
pub use spec::{DialerSpec, SpecParseError};

pub mod registry;
#[doc(inline)]
pub use registry::{DialerRegistry, UnknownSchemeError};
