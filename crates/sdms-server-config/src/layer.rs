// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! The partial configuration produced by each source.

use serde::Deserialize;

use crate::sections::{AuthzConfigLayer, DatabaseConfigLayer, LoggingConfigLayer};

/// One source's view of the configuration. Missing sections and fields fall
/// through to lower-precedence sources.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfigLayer {
	pub database: Option<DatabaseConfigLayer>,
	pub authz: Option<AuthzConfigLayer>,
	pub logging: Option<LoggingConfigLayer>,
}

fn merge_section<T>(target: &mut Option<T>, other: Option<T>, merge: impl FnOnce(&mut T, T)) {
	let Some(other) = other else {
		return;
	};
	if let Some(existing) = target.as_mut() {
		merge(existing, other);
	} else {
		*target = Some(other);
	}
}

impl ServerConfigLayer {
	/// Overlay `other` on top of `self`.
	pub fn merge(&mut self, other: ServerConfigLayer) {
		merge_section(&mut self.database, other.database, DatabaseConfigLayer::merge);
		merge_section(&mut self.authz, other.authz, AuthzConfigLayer::merge);
		merge_section(&mut self.logging, other.logging, LoggingConfigLayer::merge);
	}
}
