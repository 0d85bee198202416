// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Configuration for the SDMS access-control service.
//!
//! This crate provides:
//! - Layered configuration from multiple sources (defaults, TOML file, environment)
//! - Type-safe configuration with validation
//! - Consistent environment variable naming (`SDMS_SERVER_*`)
//!
//! # Usage
//!
//! ```no_run
//! use sdms_server_config::load_config;
//!
//! let config = load_config()?;
//! println!("catalog at {}", config.database.url);
//! # Ok::<(), sdms_server_config::ConfigError>(())
//! ```

pub mod error;
pub mod layer;
pub mod sections;
pub mod sources;

pub use error::ConfigError;
pub use layer::ServerConfigLayer;
pub use sections::*;
pub use sources::{ConfigSource, DefaultsSource, EnvSource, Precedence, TomlSource};

use std::path::PathBuf;

use tracing::{debug, info};

/// Fully resolved server configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServerConfig {
	pub database: DatabaseConfig,
	pub authz: AuthzConfig,
	pub logging: LoggingConfig,
}

/// Load configuration from all sources with standard precedence.
///
/// Precedence (highest to lowest):
/// 1. Environment variables (`SDMS_SERVER_*`)
/// 2. Config file (`/etc/sdms/server.toml`)
/// 3. Built-in defaults
pub fn load_config() -> Result<ServerConfig, ConfigError> {
	load_from_sources(vec![
		Box::new(DefaultsSource),
		Box::new(TomlSource::system()),
		Box::new(EnvSource),
	])
}

/// Load configuration with a custom config file path.
pub fn load_config_with_file(config_path: impl Into<PathBuf>) -> Result<ServerConfig, ConfigError> {
	load_from_sources(vec![
		Box::new(DefaultsSource),
		Box::new(TomlSource::new(config_path)),
		Box::new(EnvSource),
	])
}

/// Merge the given sources in precedence order and finalize.
pub fn load_from_sources(mut sources: Vec<Box<dyn ConfigSource>>) -> Result<ServerConfig, ConfigError> {
	sources.sort_by_key(|s| s.precedence());

	let mut merged = ServerConfigLayer::default();
	for source in sources {
		debug!(source = source.name(), "loading configuration source");
		let layer = source.load()?;
		merged.merge(layer);
	}

	finalize(merged)
}

/// Finalize configuration layer into resolved config.
pub fn finalize(layer: ServerConfigLayer) -> Result<ServerConfig, ConfigError> {
	let database = layer.database.unwrap_or_default().finalize();
	let authz = layer.authz.unwrap_or_default().finalize();
	let logging = layer.logging.unwrap_or_default().finalize();

	database.validate()?;
	validate_config(&authz)?;

	info!(
		database = %database.url,
		busy_timeout_ms = database.busy_timeout_ms,
		max_inheritance_depth = authz.max_inheritance_depth,
		allow_public_read = authz.allow_public_read,
		log_level = %logging.level,
		"Server configuration loaded"
	);

	Ok(ServerConfig {
		database,
		authz,
		logging,
	})
}

/// Validate cross-field configuration rules.
fn validate_config(authz: &AuthzConfig) -> Result<(), ConfigError> {
	if authz.max_inheritance_depth == 0 {
		return Err(ConfigError::validation(
			"authz.max_inheritance_depth must be at least 1",
		));
	}

	Ok(())
}
