//! pipe stdin and stdout through a chain

use super::ChainArgs;
use clap::Args;
use hopchain::{
    Dialer,
    error::{BoxError, ErrorContext as _},
};
use tokio::io::AsyncWriteExt;

#[derive(Debug, Args)]
/// connect to a target through the chain, piping stdin and stdout over it
pub struct CliCommandConnect {
    #[command(flatten)]
    pub chain: ChainArgs,

    /// the target address (`host:port`)
    pub target: String,
}

/// run the hopchain connect command
pub async fn run(cfg: CliCommandConnect) -> Result<(), BoxError> {
    crate::trace::init_tracing(cfg.chain.log_directive())?;

    let chain = cfg.chain.build_chain()?;
    let stream = cfg.chain.dial(&chain, &cfg.target).await?;
    tracing::info!(
        server.address = %cfg.target,
        next_hop = chain.addr(),
        "connect: connected",
    );

    let (mut reader, mut writer) = tokio::io::split(stream);
    let upload = async {
        let n = tokio::io::copy(&mut tokio::io::stdin(), &mut writer).await?;
        writer.shutdown().await?;
        Ok::<_, std::io::Error>(n)
    };
    let download = async {
        let mut stdout = tokio::io::stdout();
        let n = tokio::io::copy(&mut reader, &mut stdout).await?;
        stdout.flush().await?;
        Ok::<_, std::io::Error>(n)
    };

    let (sent, received) = tokio::try_join!(upload, download).context("pipe stdio")?;
    tracing::info!(sent, received, "connect: closed");
    Ok(())
}
