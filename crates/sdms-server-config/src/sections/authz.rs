// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Access-control evaluation settings.

use serde::{Deserialize, Serialize};

/// Ancestor levels walked before inherited rules are ignored.
pub const DEFAULT_MAX_INHERITANCE_DEPTH: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthzConfig {
	/// Bound on the ancestor walk. Must be at least 1.
	pub max_inheritance_depth: usize,
	/// Whether unauthenticated gateway reads of public records are allowed.
	pub allow_public_read: bool,
}

impl Default for AuthzConfig {
	fn default() -> Self {
		AuthzConfigLayer::default().finalize()
	}
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct AuthzConfigLayer {
	#[serde(default)]
	pub max_inheritance_depth: Option<usize>,
	#[serde(default)]
	pub allow_public_read: Option<bool>,
}

impl AuthzConfigLayer {
	pub fn merge(&mut self, other: AuthzConfigLayer) {
		if other.max_inheritance_depth.is_some() {
			self.max_inheritance_depth = other.max_inheritance_depth;
		}
		if other.allow_public_read.is_some() {
			self.allow_public_read = other.allow_public_read;
		}
	}

	pub fn finalize(self) -> AuthzConfig {
		AuthzConfig {
			max_inheritance_depth: self
				.max_inheritance_depth
				.unwrap_or(DEFAULT_MAX_INHERITANCE_DEPTH),
			allow_public_read: self.allow_public_read.unwrap_or(true),
		}
	}
}
