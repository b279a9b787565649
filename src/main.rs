use std::io;
use std::path::PathBuf;

use anyhow::Result;
use bikeshare_explorer::app::BikeshareApp;
use bikeshare_explorer::config::Config;
use bikeshare_explorer::ui::prompt::Console;
use clap::Parser;
use log::debug;

#[derive(Parser)]
#[command(name = "bikeshare-explorer")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Directory holding chicago, new_york_city and washington trip files.
    #[arg(long, env = "BIKESHARE_DATA_DIR", default_value = ".")]
    data_dir: PathBuf,

    /// Enable verbose output.
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    let config = Config::from_data_dir(&cli.data_dir);
    debug!("using {config:?}");

    let stdin = io::stdin();
    let mut console = Console::new(stdin.lock(), io::stdout());
    BikeshareApp::new(config).run(&mut console)
}
