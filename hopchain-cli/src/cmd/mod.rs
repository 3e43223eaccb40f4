//! hopchain cli commands

use clap::Args;
use hopchain::{
    BoxDialer, Dialer, build_chain, default_registry,
    error::{BoxError, ErrorContext as _},
    net::{BoxStream, Network},
};
use std::time::Duration;
use tracing::level_filters::LevelFilter;

pub mod connect;
pub mod probe;

#[derive(Debug, Args)]
/// arguments shared by all commands that dial through a chain
pub struct ChainArgs {
    #[arg(short = 'f', long, default_value = "")]
    /// comma separated list of link specs, first hop first,
    /// e.g. `ws://1.2.3.4:80/tunnel?host=example.com`
    /// (empty = connect directly)
    pub forward: String,

    #[arg(short = 't', long, default_value_t = 10)]
    /// the timeout in seconds to establish the connection (0 = no timeout)
    pub timeout: u64,

    #[arg(short = 'v', long)]
    /// log at debug level unless overwritten by `RUST_LOG`
    pub verbose: bool,
}

impl ChainArgs {
    /// The default log directive for these arguments.
    pub fn log_directive(&self) -> LevelFilter {
        if self.verbose {
            LevelFilter::DEBUG
        } else {
            LevelFilter::INFO
        }
    }

    /// Build the dialer chain described by `--forward`.
    pub fn build_chain(&self) -> Result<BoxDialer, BoxError> {
        let chain = build_chain(&default_registry(), &self.forward).context("build dialer chain")?;
        Ok(chain)
    }

    /// Dial `target` over TCP through `chain`, honouring `--timeout`.
    pub async fn dial(&self, chain: &BoxDialer, target: &str) -> Result<BoxStream, BoxError> {
        let dial = chain.dial(Network::Tcp, target.to_owned());
        let stream = if self.timeout == 0 {
            dial.await.context("dial target")?
        } else {
            tokio::time::timeout(Duration::from_secs(self.timeout), dial)
                .await
                .context("dial target: timeout")?
                .context("dial target")?
        };
        Ok(stream)
    }
}
