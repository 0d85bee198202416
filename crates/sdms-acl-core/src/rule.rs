// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Default rules, ACL edges and rule edits.
//!
//! A field that is `None` is identical to a zero mask. The domain layer keeps
//! that distinction explicit as `Option<Permissions>`; storage writes `NULL`
//! and the wire format skips the field.

use serde::{Deserialize, Serialize};

use crate::error::AclError;
use crate::parser::{parse_perm_action, PermEdit};
use crate::permission::Permissions;
use crate::types::{ObjectId, ObjectKind, SubjectId};

/// The four bitmasks carried by a default rule or an ACL edge.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleMasks {
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub grant: Option<Permissions>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub deny: Option<Permissions>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub inh_grant: Option<Permissions>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub inh_deny: Option<Permissions>,
}

impl RuleMasks {
	/// The rule every object starts with.
	pub const CLOSED: RuleMasks = RuleMasks {
		grant: None,
		deny: None,
		inh_grant: None,
		inh_deny: None,
	};

	pub fn grant(&self) -> Permissions {
		self.grant.unwrap_or_default()
	}

	pub fn deny(&self) -> Permissions {
		self.deny.unwrap_or_default()
	}

	pub fn inh_grant(&self) -> Permissions {
		self.inh_grant.unwrap_or_default()
	}

	pub fn inh_deny(&self) -> Permissions {
		self.inh_deny.unwrap_or_default()
	}

	/// Rewrites zero-valued fields as absent.
	pub fn normalized(self) -> RuleMasks {
		RuleMasks {
			grant: self.grant.and_then(Permissions::non_zero),
			deny: self.deny.and_then(Permissions::non_zero),
			inh_grant: self.inh_grant.and_then(Permissions::non_zero),
			inh_deny: self.inh_deny.and_then(Permissions::non_zero),
		}
	}

	/// True when every field resolves to zero.
	pub fn is_empty(&self) -> bool {
		self.grant().is_empty()
			&& self.deny().is_empty()
			&& self.inh_grant().is_empty()
			&& self.inh_deny().is_empty()
	}

	pub fn has_inheritable(&self) -> bool {
		!self.inh_grant().is_empty() || !self.inh_deny().is_empty()
	}

	/// Applies every field edit and normalizes the result.
	pub fn apply(&self, edits: &RuleEdits) -> RuleMasks {
		RuleMasks {
			grant: edits.grant.apply(self.grant),
			deny: edits.deny.apply(self.deny),
			inh_grant: edits.inh_grant.apply(self.inh_grant),
			inh_deny: edits.inh_deny.apply(self.inh_deny),
		}
	}
}

/// Parsed edits for all four fields of one rule.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RuleEdits {
	pub grant: PermEdit,
	pub deny: PermEdit,
	pub inh_grant: PermEdit,
	pub inh_deny: PermEdit,
}

impl RuleEdits {
	pub fn touches_inheritable(&self) -> bool {
		self.inh_grant.is_change() || self.inh_deny.is_change()
	}

	/// Rejects inheritable edits on anything but a collection.
	pub fn check_target(&self, kind: ObjectKind) -> Result<(), AclError> {
		if kind != ObjectKind::Collection && self.touches_inheritable() {
			return Err(AclError::InvalidPermission(
				"inherited permissions can only be set on collections".to_string(),
			));
		}
		Ok(())
	}
}

/// Which rule an edit addresses.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RuleTarget {
	/// The object's own default rule.
	Default,
	/// An ACL edge to a user or group. Groups may still be in short form.
	Subject(SubjectId),
}

impl RuleTarget {
	pub const DEFAULT_ID: &'static str = "default";

	pub fn parse(id: &str) -> Result<Self, AclError> {
		if id == Self::DEFAULT_ID {
			Ok(RuleTarget::Default)
		} else {
			SubjectId::parse(id).map(RuleTarget::Subject)
		}
	}
}

/// One entry of an `update` request, as submitted by callers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AclRuleRequest {
	pub id: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub grant: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub inh_grant: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub deny: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub inh_deny: Option<String>,
}

impl AclRuleRequest {
	pub fn new(id: impl Into<String>) -> Self {
		Self {
			id: id.into(),
			..Default::default()
		}
	}

	pub fn grant(mut self, action: impl Into<String>) -> Self {
		self.grant = Some(action.into());
		self
	}

	pub fn deny(mut self, action: impl Into<String>) -> Self {
		self.deny = Some(action.into());
		self
	}

	pub fn inh_grant(mut self, action: impl Into<String>) -> Self {
		self.inh_grant = Some(action.into());
		self
	}

	pub fn inh_deny(mut self, action: impl Into<String>) -> Self {
		self.inh_deny = Some(action.into());
		self
	}

	/// Parses the target and all four action strings.
	pub fn parse(&self) -> Result<ParsedRuleRequest, AclError> {
		Ok(ParsedRuleRequest {
			target: RuleTarget::parse(&self.id)?,
			edits: RuleEdits {
				grant: parse_perm_action(self.grant.as_deref())?,
				deny: parse_perm_action(self.deny.as_deref())?,
				inh_grant: parse_perm_action(self.inh_grant.as_deref())?,
				inh_deny: parse_perm_action(self.inh_deny.as_deref())?,
			},
		})
	}
}

/// A request entry after parsing, ready for the mutator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedRuleRequest {
	pub target: RuleTarget,
	pub edits: RuleEdits,
}

/// A stored ACL edge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AclRule {
	pub object_id: ObjectId,
	pub subject: SubjectId,
	#[serde(flatten)]
	pub masks: RuleMasks,
}

/// One row of a `view` response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AclEntryView {
	/// `u/{user}`, `g/{name}` or `default`.
	pub subject: String,
	#[serde(flatten)]
	pub masks: RuleMasks,
}

impl AclEntryView {
	pub fn from_rule(rule: &AclRule) -> Self {
		Self {
			subject: rule.subject.display_form(),
			masks: rule.masks.normalized(),
		}
	}

	/// The default rule as a view row, or `None` when it is fully closed.
	pub fn from_default(masks: &RuleMasks) -> Option<Self> {
		let masks = masks.normalized();
		if masks.is_empty() {
			None
		} else {
			Some(Self {
				subject: RuleTarget::DEFAULT_ID.to_string(),
				masks,
			})
		}
	}
}
