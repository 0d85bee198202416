// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use async_trait::async_trait;
use sdms_acl_core::{AclError, ErrorCode, ObjectId, Permissions, UserId};
use sdms_server_authz::{AclService, AuthorizationGateway, RepositoryPaths};
use sdms_server_db::testing::{create_test_pool, Catalog};
use sqlx::sqlite::SqlitePool;
use std::collections::HashMap;
use std::sync::Arc;

pub const REPO_ID: &str = "repo1";
pub const REPO_ROOT: &str = "/mnt/repo/datafed";

/// In-memory repository layout: one repository and a fixed set of record
/// locations.
pub struct MockRepositoryPaths {
	roots: HashMap<String, String>,
	locations: HashMap<ObjectId, String>,
}

impl MockRepositoryPaths {
	pub fn new() -> Self {
		Self {
			roots: HashMap::from([(REPO_ID.to_string(), REPO_ROOT.to_string())]),
			locations: HashMap::new(),
		}
	}

	pub fn with_record(mut self, record: &str, path: &str) -> Self {
		self.locations
			.insert(ObjectId::data(record), path.to_string());
		self
	}
}

#[async_trait]
impl RepositoryPaths for MockRepositoryPaths {
	async fn root_path(&self, repo_id: &str) -> Result<Option<String>, AclError> {
		Ok(self.roots.get(repo_id).cloned())
	}

	async fn is_path_consistent(&self, record: &ObjectId, path: &str) -> Result<bool, AclError> {
		Ok(self
			.locations
			.get(record)
			.is_some_and(|location| location.trim_end_matches('/') == path.trim_end_matches('/')))
	}
}

/// Test harness with a seeded catalog.
///
/// - `alice` owns collection `c/root` and records `d/1` and `d/2`
/// - project `proj1` owns collection `c/shared` and record `d/p1`
/// - group `g/proj1:team` has member `carol`
/// - `dave` administers `proj1`
/// - `root` is a system administrator
/// - `bob` and `erin` have no rights by default
pub struct TestApp {
	pub pool: SqlitePool,
	pub catalog: Catalog,
	pub service: AclService,
}

impl TestApp {
	pub async fn new() -> Self {
		let pool = create_test_pool().await;
		let catalog = Catalog::new(&pool);

		for user in ["alice", "bob", "carol", "dave", "erin"] {
			catalog.user(user).await;
		}
		catalog.system_admin("root").await;
		catalog.project("proj1").await;
		catalog.group("proj1:team", "p/proj1").await;
		catalog.member("proj1:team", "carol").await;
		catalog.admin("p/proj1", "dave").await;

		catalog.collection("root", "u/alice").await;
		catalog.record("1", "u/alice").await;
		catalog.record("2", "u/alice").await;
		catalog.link("c/root", "d/1").await;
		catalog.link("c/root", "d/2").await;

		catalog.collection("shared", "p/proj1").await;
		catalog.record("p1", "p/proj1").await;
		catalog.link("c/shared", "d/p1").await;

		let service = AclService::new(pool.clone());
		Self {
			pool,
			catalog,
			service,
		}
	}

	pub fn gateway(&self, paths: MockRepositoryPaths) -> AuthorizationGateway {
		AuthorizationGateway::new(self.service.clone(), Arc::new(paths))
	}

	pub async fn effective(&self, user: &str, object: &str) -> Permissions {
		self.service
			.effective_permission(&UserId::from_key(user), &ObjectId::parse(object).unwrap())
			.await
			.unwrap()
	}
}

pub struct AuthzCase {
	pub name: &'static str,
	pub user: &'static str,
	pub object: &'static str,
	pub required: Permissions,
	pub expected: Result<(), ErrorCode>,
}

pub async fn run_authz_cases(app: &TestApp, cases: &[AuthzCase]) {
	for case in cases {
		let result = app
			.service
			.authorize(
				&UserId::from_key(case.user),
				&ObjectId::parse(case.object).unwrap(),
				case.required,
			)
			.await
			.map_err(|err| err.code());

		assert_eq!(
			result, case.expected,
			"Case '{}': u/{} on {} requiring {}",
			case.name, case.user, case.object, case.required
		);
	}
}

pub struct GatewayCase {
	pub name: &'static str,
	pub user: Option<&'static str>,
	pub path: String,
	pub verb: &'static str,
	pub expected: Result<(), ErrorCode>,
}

pub async fn run_gateway_cases(gateway: &AuthorizationGateway, cases: &[GatewayCase]) {
	for case in cases {
		let client = case.user.map(UserId::from_key);
		let result = gateway
			.authorize_path(client.as_ref(), REPO_ID, &case.path, case.verb)
			.await
			.map_err(|err| err.code());

		assert_eq!(
			result, case.expected,
			"Case '{}': {} {} as {:?}",
			case.name, case.verb, case.path, case.user
		);
	}
}
