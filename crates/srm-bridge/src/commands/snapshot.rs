//! `srm-bridge snapshot`: one poll cycle, printed.

use srm_core::{SrmConnector, StateTree, poll_once};

use crate::cli::{GlobalOpts, SnapshotArgs};
use crate::config;
use crate::error::CliError;
use crate::output::{print_output, render_entries};

pub async fn handle(args: SnapshotArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let cfg = config::load(global)?;
    let format = config::output_format(global, &cfg);
    let bridge = srm_config::to_bridge_config(&cfg)?.validated()?;

    let store = StateTree::new();
    poll_once(&bridge, &SrmConnector, &store).await?;

    let entries = store.entries(&args.pattern);
    print_output(&render_entries(format, &entries)?, global.quiet);
    Ok(())
}
