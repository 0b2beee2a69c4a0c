//! Index command - builds and publishes a snapshot from the export

use clap::Args;

use super::{load_config, CommonArgs};

#[derive(Args, Debug, Clone, Default)]
pub struct IndexArgs {
    #[command(flatten)]
    pub common: CommonArgs,
}

/// Build a snapshot and print the build report
pub async fn run(args: IndexArgs) -> anyhow::Result<()> {
    let config = load_config(&args.common)?;
    let services = crate::build_services(&config)?;

    let report = services.index.rebuild().await?;
    println!("{}", serde_json::to_string_pretty(&report)?);

    Ok(())
}
