use common::context::Context;
use sqlx::SqlitePool;

use crate::config::{ApiConfig, AppConfig, SessionConfig};

pub trait ApiState {
	fn templates(&self) -> &tera::Tera;
}

pub trait ApiGlobal:
	common::global::GlobalCtx
	+ common::global::GlobalConfigProvider<ApiConfig>
	+ common::global::GlobalConfigProvider<SessionConfig>
	+ common::global::GlobalDb
	+ common::global::GlobalConfig
	+ ApiState
	+ Send
	+ Sync
	+ 'static
{
}

impl<T> ApiGlobal for T where
	T: common::global::GlobalCtx
		+ common::global::GlobalConfigProvider<ApiConfig>
		+ common::global::GlobalConfigProvider<SessionConfig>
		+ common::global::GlobalDb
		+ common::global::GlobalConfig
		+ ApiState
		+ Send
		+ Sync
		+ 'static
{
}

pub struct GlobalState {
	ctx: Context,
	config: AppConfig,
	db: SqlitePool,
	templates: tera::Tera,
}

impl GlobalState {
	pub fn new(ctx: Context, config: AppConfig, db: SqlitePool) -> Result<Self, tera::Error> {
		Ok(Self {
			ctx,
			config,
			db,
			templates: crate::templates::load()?,
		})
	}
}

impl common::global::GlobalCtx for GlobalState {
	fn ctx(&self) -> &Context {
		&self.ctx
	}
}

impl common::global::GlobalConfigProvider<ApiConfig> for GlobalState {
	fn provide_config(&self) -> &ApiConfig {
		&self.config.api
	}
}

impl common::global::GlobalConfigProvider<SessionConfig> for GlobalState {
	fn provide_config(&self) -> &SessionConfig {
		&self.config.session
	}
}

impl common::global::GlobalDb for GlobalState {
	fn db(&self) -> &SqlitePool {
		&self.db
	}
}

impl common::global::GlobalConfig for GlobalState {}

impl ApiState for GlobalState {
	fn templates(&self) -> &tera::Tera {
		&self.templates
	}
}
