use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::{Parser, Subcommand};
use common::context::Context;
use common::{logging, signal};
use tokio::{select, time};
use warbler::config::AppConfig;
use warbler::{api, database, global};

#[derive(Parser, Debug)]
#[command(name = "warbler", about = "Warbler social network server")]
struct Cli {
	/// Config file to load instead of `config.toml`
	#[arg(short, long)]
	config: Option<String>,

	#[command(subcommand)]
	command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, Copy, Default)]
enum Command {
	/// Run the web server, the default
	#[default]
	Serve,
	/// Create or upgrade the database schema and exit
	Migrate,
}

#[tokio::main]
async fn main() -> Result<()> {
	dotenvy::dotenv().ok();

	let cli = Cli::parse();
	let config = AppConfig::parse(cli.config)?;

	logging::init(&config.logging.level, config.logging.mode)?;

	if let Some(file) = &config.config_file {
		tracing::info!(file = file, "loaded config from file");
	}

	tracing::debug!("config: {:#?}", config);

	let db = database::connect(&config.database).await?;
	database::migrate(&db).await?;

	if matches!(cli.command.unwrap_or_default(), Command::Migrate) {
		tracing::info!("database migrated");
		return Ok(());
	}

	let (ctx, handler) = Context::new();

	let global = Arc::new(global::GlobalState::new(ctx, config, db)?);

	let api_future = tokio::spawn(api::run(global.clone()));

	select! {
		r = api_future => tracing::error!("api stopped unexpectedly: {:?}", r),
		r = signal::shutdown_signal() => match r {
			Ok(signal) => tracing::info!("received {signal}, shutting down"),
			Err(err) => tracing::error!("failed to listen for signals: {err}"),
		},
	}

	// We cannot have a context in scope when we cancel the handler, otherwise it will deadlock.
	drop(global);

	tracing::info!("waiting for tasks to finish");

	select! {
		_ = time::sleep(Duration::from_secs(60)) => tracing::warn!("force shutting down"),
		_ = signal::shutdown_signal() => tracing::warn!("force shutting down"),
		_ = handler.cancel() => tracing::info!("shutting down"),
	}

	Ok(())
}
