use std::path::PathBuf;

use crate::util::Output;

#[derive(Default, Debug, Clone, clap::Args)]
pub(crate) struct ConfigArg {
    /// Configuration file to check; the defaults are printed if omitted
    #[arg(long)]
    config: Option<PathBuf>,
    /// Output file path
    #[arg(long)]
    output: Option<PathBuf>,
}

pub(crate) fn run(arg: &ConfigArg) -> anyhow::Result<()> {
    let ConfigArg { config, output } = arg;
    let game_config = super::load_config(config.as_deref())?;
    Output::save_json(&game_config, output.clone())?;

    if let Some(path) = config {
        eprintln!("Configuration is valid: {}", path.display());
    }
    eprintln!(
        "  Grid: {}x{}, win at rank {}",
        game_config.width, game_config.height, game_config.win_condition
    );
    Ok(())
}
