// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Configuration sources: environment variables and TOML files.

use std::path::PathBuf;
use std::str::FromStr;

use tracing::{debug, trace};

use crate::error::ConfigError;
use crate::layer::ServerConfigLayer;
use crate::sections::{AuthzConfigLayer, DatabaseConfigLayer, LogFormat, LoggingConfigLayer};

/// Source precedence levels (higher = overrides lower).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Precedence {
	Defaults = 10,
	ConfigFile = 20,
	Environment = 50,
}

/// Trait for configuration sources.
pub trait ConfigSource: Send + Sync {
	fn name(&self) -> &'static str;
	fn precedence(&self) -> Precedence;
	fn load(&self) -> Result<ServerConfigLayer, ConfigError>;
}

/// Built-in defaults source.
pub struct DefaultsSource;

impl ConfigSource for DefaultsSource {
	fn name(&self) -> &'static str {
		"defaults"
	}

	fn precedence(&self) -> Precedence {
		Precedence::Defaults
	}

	fn load(&self) -> Result<ServerConfigLayer, ConfigError> {
		debug!("loading defaults");
		Ok(ServerConfigLayer::default())
	}
}

/// TOML file configuration source.
pub struct TomlSource {
	path: PathBuf,
}

impl TomlSource {
	pub fn new(path: impl Into<PathBuf>) -> Self {
		Self { path: path.into() }
	}

	pub fn system() -> Self {
		Self::new("/etc/sdms/server.toml")
	}
}

impl ConfigSource for TomlSource {
	fn name(&self) -> &'static str {
		"toml-config"
	}

	fn precedence(&self) -> Precedence {
		Precedence::ConfigFile
	}

	fn load(&self) -> Result<ServerConfigLayer, ConfigError> {
		if !self.path.exists() {
			debug!(path = %self.path.display(), "config file not found, skipping");
			return Ok(ServerConfigLayer::default());
		}

		debug!(path = %self.path.display(), "loading config file");
		let content = std::fs::read_to_string(&self.path).map_err(|e| ConfigError::FileRead {
			path: self.path.clone(),
			source: e,
		})?;

		let layer: ServerConfigLayer =
			toml::from_str(&content).map_err(|e| ConfigError::TomlParse {
				path: self.path.clone(),
				source: e,
			})?;

		trace!("parsed config layer from TOML");
		Ok(layer)
	}
}

/// Environment variable source.
///
/// Convention: SDMS_SERVER_<SECTION>_<FIELD>
pub struct EnvSource;

impl ConfigSource for EnvSource {
	fn name(&self) -> &'static str {
		"environment"
	}

	fn precedence(&self) -> Precedence {
		Precedence::Environment
	}

	fn load(&self) -> Result<ServerConfigLayer, ConfigError> {
		debug!("loading environment variables");
		layer_from_env(&|name| std::env::var(name).ok())
	}
}

type Lookup<'a> = &'a dyn Fn(&str) -> Option<String>;

fn layer_from_env(lookup: Lookup<'_>) -> Result<ServerConfigLayer, ConfigError> {
	Ok(ServerConfigLayer {
		database: Some(load_database_from_env(lookup)?),
		authz: Some(load_authz_from_env(lookup)?),
		logging: Some(load_logging_from_env(lookup)?),
	})
}

fn env_var(lookup: Lookup<'_>, name: &str) -> Option<String> {
	lookup(name).filter(|s| !s.is_empty())
}

fn env_bool(lookup: Lookup<'_>, name: &str) -> Option<bool> {
	env_var(lookup, name).map(|v| v.eq_ignore_ascii_case("true") || v == "1")
}

fn env_parse<T: FromStr>(lookup: Lookup<'_>, name: &str, kind: &str) -> Result<Option<T>, ConfigError> {
	match env_var(lookup, name) {
		Some(v) => v.parse().map(Some).map_err(|_| ConfigError::InvalidValue {
			key: name.to_string(),
			message: format!("invalid {kind} value '{v}'"),
		}),
		None => Ok(None),
	}
}

fn load_database_from_env(lookup: Lookup<'_>) -> Result<DatabaseConfigLayer, ConfigError> {
	Ok(DatabaseConfigLayer {
		url: env_var(lookup, "SDMS_SERVER_DATABASE_URL"),
		busy_timeout_ms: env_parse(lookup, "SDMS_SERVER_DATABASE_BUSY_TIMEOUT_MS", "u64")?,
	})
}

fn load_authz_from_env(lookup: Lookup<'_>) -> Result<AuthzConfigLayer, ConfigError> {
	Ok(AuthzConfigLayer {
		max_inheritance_depth: env_parse(lookup, "SDMS_SERVER_AUTHZ_MAX_DEPTH", "usize")?,
		allow_public_read: env_bool(lookup, "SDMS_SERVER_AUTHZ_PUBLIC_READ"),
	})
}

fn load_logging_from_env(lookup: Lookup<'_>) -> Result<LoggingConfigLayer, ConfigError> {
	let format = match env_var(lookup, "SDMS_SERVER_LOG_FORMAT") {
		Some(v) => Some(v.parse::<LogFormat>().map_err(|_| ConfigError::InvalidValue {
			key: "SDMS_SERVER_LOG_FORMAT".to_string(),
			message: format!("unknown log format '{v}'"),
		})?),
		None => None,
	};

	Ok(LoggingConfigLayer {
		level: env_var(lookup, "SDMS_SERVER_LOG_LEVEL"),
		format,
	})
}
