// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Core types for SDMS access control.
//!
//! This crate holds everything about catalog permissions that does not touch
//! storage: the permission bits, identifier newtypes, the compact rule-edit
//! language, the rule model, the evaluator and the file-transfer gateway
//! table. It is used by the storage layer (`sdms-server-db`) and the service
//! layer (`sdms-server-authz`).
//!
//! # Overview
//!
//! - Eight permission bits (`l v u a t n r w`) shared by parser, evaluator and wire format
//! - A default rule on every object plus ACL edges to users and groups
//! - Inheritable masks on collections, accumulated along the whole ancestor chain
//! - Deny always beats grant on a shared bit
//!
//! # Example
//!
//! ```
//! use sdms_acl_core::{
//!     effective_permission, parse_perm_action, AccessSnapshot, ClientAttrs, ObjectAttrs,
//!     ObjectId, OwnerId, Permissions, UserId,
//! };
//!
//! let edit = parse_perm_action(Some("lv")).unwrap();
//!
//! let mut object = ObjectAttrs::new(ObjectId::data("42"), OwnerId::parse("u/alice").unwrap());
//! object.masks.grant = edit.apply(object.masks.grant);
//!
//! let snapshot = AccessSnapshot::new(ClientAttrs::new(UserId::from_key("bob")), object);
//! assert_eq!(effective_permission(&snapshot), Permissions::LIST | Permissions::VIEW);
//! ```

pub mod error;
pub mod eval;
pub mod gateway;
pub mod parser;
pub mod permission;
pub mod rule;
pub mod types;

pub use error::{AclError, ErrorBody, ErrorCode, Result};
pub use eval::{
	effective_permission, inherited_mask, is_administrator, is_allowed, is_allowed_any,
	AccessSnapshot, AncestorAttrs, ClientAttrs, InheritedMask, ObjectAttrs,
};
pub use gateway::{classify_path, record_key, strategy_for, GridAction, PathCategory, PathStrategy};
pub use parser::{parse_perm_action, PermAction, PermEdit};
pub use permission::{PermissionBit, Permissions};
pub use rule::{
	AclEntryView, AclRule, AclRuleRequest, ParsedRuleRequest, RuleEdits, RuleMasks, RuleTarget,
};
pub use types::{GroupId, ObjectId, ObjectKind, OwnerId, ProjectId, SubjectId, UserId};
