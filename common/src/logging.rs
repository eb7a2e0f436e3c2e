use std::str::FromStr;

use once_cell::sync::OnceCell;
use tracing_subscriber::prelude::*;
use tracing_subscriber::reload::Handle;
use tracing_subscriber::{EnvFilter, Registry};

static RELOAD_HANDLE: OnceCell<Handle<EnvFilter, Registry>> = OnceCell::new();

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
	#[default]
	Default,
	Json,
	Pretty,
	Compact,
}

#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
	#[error("invalid log level: {0}")]
	InvalidLevel(#[from] tracing_subscriber::filter::ParseError),
	#[error("failed to install global subscriber: {0}")]
	Init(#[from] tracing_subscriber::util::TryInitError),
	#[error("failed to reload log filter: {0}")]
	Reload(#[from] tracing_subscriber::reload::Error),
}

/// Installs the global subscriber on the first call. Later calls only swap the
/// level filter, the output mode stays whatever the first call chose.
pub fn init(level: &str, mode: Mode) -> Result<(), LoggingError> {
	let env_filter = EnvFilter::from_str(level)?;

	let reload = RELOAD_HANDLE.get_or_try_init(|| {
		let (filter, handle) = tracing_subscriber::reload::Layer::new(EnvFilter::default());

		let registry = tracing_subscriber::registry().with(filter);

		let fmt = tracing_subscriber::fmt::layer().with_file(true).with_line_number(true);

		match mode {
			Mode::Default => registry.with(fmt).try_init(),
			Mode::Json => registry.with(fmt.json()).try_init(),
			Mode::Pretty => registry.with(fmt.pretty()).try_init(),
			Mode::Compact => registry.with(fmt.compact()).try_init(),
		}
		.map(|_| handle)
	})?;

	reload.reload(env_filter)?;

	Ok(())
}
