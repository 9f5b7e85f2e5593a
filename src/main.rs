use anyhow::Context;
use clap::Parser;
use facepad_core::{JsonFileStore, Settings};
use log::info;

mod app;
mod cli;

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = cli::Args::parse();

    let settings_path = args.settings_path();
    let store = JsonFileStore::open(&settings_path)?;
    let settings = Settings::load(&store)?;
    info!("Settings loaded from {:?}", settings_path);

    if args.print_settings {
        let json = serde_json::to_string_pretty(&settings).context("Failed to serialize settings")?;
        println!("{json}");
        return Ok(());
    }

    let mut app = app::App::new(&args, settings, store)?;
    app.run()
}
