use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
	Interrupt,
	Terminate,
}

impl Display for Signal {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		match self {
			Self::Interrupt => write!(f, "SIGINT"),
			Self::Terminate => write!(f, "SIGTERM"),
		}
	}
}

/// Waits for either SIGINT or SIGTERM. Each call registers fresh listeners so
/// it can be awaited again for a second, forcing signal.
pub async fn shutdown_signal() -> std::io::Result<Signal> {
	#[cfg(unix)]
	{
		use tokio::signal::unix::{signal, SignalKind};

		let mut terminate = signal(SignalKind::terminate())?;

		tokio::select! {
			r = tokio::signal::ctrl_c() => r.map(|_| Signal::Interrupt),
			_ = terminate.recv() => Ok(Signal::Terminate),
		}
	}

	#[cfg(not(unix))]
	{
		tokio::signal::ctrl_c().await.map(|_| Signal::Interrupt)
	}
}
