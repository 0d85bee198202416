// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Access evaluation over pre-loaded attribute snapshots.

mod engine;
mod inheritance;
mod types;

pub use engine::{effective_permission, is_administrator, is_allowed, is_allowed_any};
pub use inheritance::{inherited_mask, InheritedMask};
pub use types::{AccessSnapshot, AncestorAttrs, ClientAttrs, ObjectAttrs};
