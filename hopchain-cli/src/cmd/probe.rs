//! dial a target through a chain and report

use super::ChainArgs;
use clap::Args;
use hopchain::{Dialer, error::BoxError};
use std::time::Instant;
use tokio::io::AsyncWriteExt;

#[derive(Debug, Args)]
/// dial a target through the chain and report whether it succeeded
pub struct CliCommandProbe {
    #[command(flatten)]
    pub chain: ChainArgs,

    /// the target address (`host:port`)
    pub target: String,
}

/// run the hopchain probe command
pub async fn run(cfg: CliCommandProbe) -> Result<(), BoxError> {
    crate::trace::init_tracing(cfg.chain.log_directive())?;

    let chain = cfg.chain.build_chain()?;
    let start = Instant::now();
    let mut stream = cfg.chain.dial(&chain, &cfg.target).await?;
    tracing::info!(
        server.address = %cfg.target,
        next_hop = chain.addr(),
        elapsed_ms = start.elapsed().as_millis(),
        "probe: connected",
    );

    if let Err(err) = stream.shutdown().await {
        tracing::debug!("probe: shutdown failed: {err}");
    }
    Ok(())
}
