// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! File-transfer gateway authorization.
//!
//! A storage gateway asks whether a client may perform a verb on a path inside
//! a repository. The path is classified against the repository root, the
//! verb/category pair selects a [`PathStrategy`] from a fixed table, and
//! record-level strategies fall through to [`AclService`].

use std::sync::Arc;

use async_trait::async_trait;
use sdms_acl_core::{
	classify_path, record_key, strategy_for, AclError, GridAction, ObjectId, PathStrategy,
	Permissions, UserId,
};

use crate::audit;
use crate::service::AclService;

/// Repository layout lookups owned by the repository subsystem.
#[async_trait]
pub trait RepositoryPaths: Send + Sync {
	/// Root path of a repository, or `None` if the repository is unknown.
	async fn root_path(&self, repo_id: &str) -> Result<Option<String>, AclError>;

	/// True when `path` is the registered location of `record`.
	async fn is_path_consistent(&self, record: &ObjectId, path: &str) -> Result<bool, AclError>;
}

/// Answers gateway authorization requests.
#[derive(Clone)]
pub struct AuthorizationGateway {
	service: AclService,
	paths: Arc<dyn RepositoryPaths>,
	allow_public_read: bool,
}

impl AuthorizationGateway {
	pub fn new(service: AclService, paths: Arc<dyn RepositoryPaths>) -> Self {
		Self {
			service,
			paths,
			allow_public_read: true,
		}
	}

	/// Whether anonymous callers may read public records.
	pub fn with_public_read(mut self, allow: bool) -> Self {
		self.allow_public_read = allow;
		self
	}

	/// Authorize `verb` on `path` inside repository `repo_id`.
	///
	/// `client` is `None` for an unauthenticated caller, which may only read
	/// public records.
	///
	/// # Errors
	/// - `InvalidParameter` for an unknown verb
	/// - `PermissionDenied` for unknown clients, unknown repositories, paths
	///   outside the repository layout, denied verbs, anonymous callers and
	///   failed record checks
	/// - `ObjectNotFound` when a read names a record that does not exist
	#[tracing::instrument(skip(self, client), fields(client_id = client.map(UserId::as_str)))]
	pub async fn authorize_path(
		&self,
		client: Option<&UserId>,
		repo_id: &str,
		path: &str,
		verb: &str,
	) -> Result<(), AclError> {
		let result = self.decide(client, repo_id, path, verb).await;
		audit::gateway_outcome(client, verb, path, &result);
		result
	}

	async fn decide(
		&self,
		client: Option<&UserId>,
		repo_id: &str,
		path: &str,
		verb: &str,
	) -> Result<(), AclError> {
		let action: GridAction = verb.parse()?;

		if let Some(client) = client {
			if !self.service.user_exists(client).await? {
				return Err(AclError::PermissionDenied(format!("unknown client {client}")));
			}
		}

		let root = self
			.paths
			.root_path(repo_id)
			.await?
			.ok_or_else(|| AclError::PermissionDenied(format!("unknown repository {repo_id}")))?;

		let category = classify_path(&root, path)
			.ok_or_else(|| AclError::PermissionDenied(format!("path {path} is outside repository {repo_id}")))?;

		match (strategy_for(action, category), client) {
			(PathStrategy::Denied, _) => Err(AclError::PermissionDenied(format!("{action} is not permitted"))),
			(PathStrategy::ReadRecord, client) => self.read_record(client, path).await,
			(_, None) => Err(AclError::PermissionDenied(format!(
				"anonymous clients may not {action}"
			))),
			(PathStrategy::None, Some(_)) => Ok(()),
			(PathStrategy::CreateRecord, Some(client)) => self.create_record(client, path).await,
		}
	}

	async fn read_record(&self, client: Option<&UserId>, path: &str) -> Result<(), AclError> {
		let record = record_from_path(path)?;

		match client {
			Some(client) => {
				self.service
					.authorize(client, &record, Permissions::READ_DATA)
					.await?
			}
			None => {
				if !self.allow_public_read || !self.service.is_public_read(&record).await? {
					return Err(AclError::PermissionDenied(format!(
						"anonymous read of {record} requires public access"
					)));
				}
			}
		}

		self.check_location(&record, path).await
	}

	async fn create_record(&self, client: &UserId, path: &str) -> Result<(), AclError> {
		let record = record_from_path(path)?;

		self.service
			.authorize(client, &record, Permissions::WRITE_DATA)
			.await
			.map_err(|err| match err {
				AclError::ObjectNotFound(id) => AclError::PermissionDenied(format!("record {id} does not exist")),
				other => other,
			})?;

		self.check_location(&record, path).await
	}

	async fn check_location(&self, record: &ObjectId, path: &str) -> Result<(), AclError> {
		if self.paths.is_path_consistent(record, path).await? {
			Ok(())
		} else {
			Err(AclError::PermissionDenied(format!(
				"{record} is not stored at {path}"
			)))
		}
	}
}

fn record_from_path(path: &str) -> Result<ObjectId, AclError> {
	record_key(path)
		.map(ObjectId::data)
		.ok_or_else(|| AclError::InvalidParameter(format!("no record in path {path}")))
}
