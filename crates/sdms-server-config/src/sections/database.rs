// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Catalog database settings.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

const DEFAULT_CATALOG_URL: &str = "sqlite:./sdms.db";

/// How long a connection waits on a locked catalog before reporting busy.
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DatabaseConfig {
	/// SQLite connection string for the catalog.
	pub url: String,
	pub busy_timeout_ms: u64,
}

impl DatabaseConfig {
	pub fn busy_timeout(&self) -> Duration {
		Duration::from_millis(self.busy_timeout_ms)
	}

	/// The catalog store is SQLite only.
	pub fn validate(&self) -> Result<(), ConfigError> {
		if !self.url.starts_with("sqlite:") {
			return Err(ConfigError::validation(format!(
				"database.url must be a sqlite: URL, got '{}'",
				self.url
			)));
		}
		Ok(())
	}
}

impl Default for DatabaseConfig {
	fn default() -> Self {
		DatabaseConfigLayer::default().finalize()
	}
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct DatabaseConfigLayer {
	#[serde(default)]
	pub url: Option<String>,
	#[serde(default)]
	pub busy_timeout_ms: Option<u64>,
}

impl DatabaseConfigLayer {
	pub fn merge(&mut self, other: DatabaseConfigLayer) {
		self.url = other.url.or(self.url.take());
		self.busy_timeout_ms = other.busy_timeout_ms.or(self.busy_timeout_ms);
	}

	pub fn finalize(self) -> DatabaseConfig {
		DatabaseConfig {
			url: self.url.unwrap_or_else(|| DEFAULT_CATALOG_URL.to_string()),
			busy_timeout_ms: self.busy_timeout_ms.unwrap_or(DEFAULT_BUSY_TIMEOUT_MS),
		}
	}
}
