use std::path::PathBuf;

use crate::{command::GameArg, logging, tui::Tui};

use self::app::PlayApp;

mod animation;
mod app;
mod screen;

#[derive(Default, Debug, Clone, clap::Args)]
pub(crate) struct PlayArg {
    #[clap(flatten)]
    pub(crate) game: GameArg,
    /// Write log events to this file (level from `RUST_LOG`, default `info`)
    #[arg(long)]
    log_file: Option<PathBuf>,
}

pub(crate) fn run(arg: &PlayArg) -> anyhow::Result<()> {
    let PlayArg { game, log_file } = arg;
    if let Some(path) = log_file {
        logging::init_file(path)?;
    }

    let session = game.start_session()?;
    let mut app = PlayApp::new(session);
    Tui::new().run(&mut app)?;
    app.into_result()
}
