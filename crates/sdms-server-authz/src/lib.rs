// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Access-control service for the SDMS catalog.
//!
//! - [`AclService`]: effective permissions, `authorize`, ACL updates and views
//! - [`AuthorizationGateway`]: verb/path checks for file-transfer gateways
//! - [`audit`]: structured denial logging under the `sdms::audit` target

pub mod audit;
pub mod gateway;
pub mod mutator;
pub mod service;

pub use audit::AuditAction;
pub use gateway::{AuthorizationGateway, RepositoryPaths};
pub use mutator::{apply_rule_edits, qualify_subject};
pub use service::AclService;
