// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Compact permission-action language.
//!
//! A rule edit carries one action string per field. The grammar is:
//!
//! - missing or blank: leave the field unchanged
//! - `+…`: OR the value into the field
//! - `-…`: clear the value's bits from the field
//! - anything else: replace the field
//!
//! The value after the sign is either a run of letter codes (`lvuatnrw`) or a
//! hexadecimal integer. Input is trimmed and lower-cased first, so `" +LV "` and
//! `"+lv"` are the same edit.

use serde::{Deserialize, Serialize};

use crate::error::AclError;
use crate::permission::Permissions;

/// How an edit combines with the current field value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PermAction {
	NoChange,
	Set,
	Add,
	Delete,
}

/// A parsed edit for one rule field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PermEdit {
	pub action: PermAction,
	pub value: Permissions,
}

impl PermEdit {
	pub const NO_CHANGE: PermEdit = PermEdit {
		action: PermAction::NoChange,
		value: Permissions::NONE,
	};

	pub fn set(value: Permissions) -> Self {
		Self {
			action: PermAction::Set,
			value,
		}
	}

	pub fn add(value: Permissions) -> Self {
		Self {
			action: PermAction::Add,
			value,
		}
	}

	pub fn delete(value: Permissions) -> Self {
		Self {
			action: PermAction::Delete,
			value,
		}
	}

	pub fn is_change(&self) -> bool {
		self.action != PermAction::NoChange
	}

	/// Applies the edit to a stored field. Zero results come back as `None`.
	pub fn apply(&self, current: Option<Permissions>) -> Option<Permissions> {
		let current = current.unwrap_or(Permissions::NONE);
		let next = match self.action {
			PermAction::NoChange => current,
			PermAction::Set => self.value,
			PermAction::Add => current | self.value,
			PermAction::Delete => current.difference(self.value),
		};
		next.non_zero()
	}
}

impl Default for PermEdit {
	fn default() -> Self {
		Self::NO_CHANGE
	}
}

/// Parses one field's action string.
pub fn parse_perm_action(input: Option<&str>) -> Result<PermEdit, AclError> {
	let Some(raw) = input else {
		return Ok(PermEdit::NO_CHANGE);
	};

	let text = raw.trim().to_lowercase();
	if text.is_empty() {
		return Ok(PermEdit::NO_CHANGE);
	}

	let (action, rest) = if let Some(rest) = text.strip_prefix('+') {
		(PermAction::Add, rest.trim_start())
	} else if let Some(rest) = text.strip_prefix('-') {
		(PermAction::Delete, rest.trim_start())
	} else {
		(PermAction::Set, text.as_str())
	};

	let value = parse_value(rest).ok_or_else(|| {
		AclError::InvalidPermission(format!("'{}' is not a permission value", raw.trim()))
	})?;

	Ok(PermEdit { action, value })
}

/// Letters win over hex so that `a` means ADMIN rather than 0x0a.
fn parse_value(text: &str) -> Option<Permissions> {
	if text.is_empty() {
		return None;
	}

	if let Some(mask) = Permissions::from_letters(text) {
		return Some(mask);
	}

	let digits = text.strip_prefix("0x").unwrap_or(text);
	if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
		return None;
	}

	u32::from_str_radix(digits, 16)
		.ok()
		.and_then(|v| u8::try_from(v).ok())
		.map(Permissions::from_bits)
}
