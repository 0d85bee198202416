// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Read side of access control.
//!
//! This module loads everything the evaluator needs into an
//! [`AccessSnapshot`]:
//! - Client attributes (administrator flag, direct group memberships)
//! - The object, its owner and its default rule
//! - ACL edges on the object
//! - Ancestor collections, found by a breadth-first walk over `items` edges
//!
//! The loaders take a `&mut SqliteConnection` so the same queries run against
//! a pooled connection or inside an open transaction.

use std::collections::{BTreeSet, HashSet};

use async_trait::async_trait;
use sdms_acl_core::{
	is_administrator, AccessSnapshot, AclError, AclRule, AncestorAttrs, ClientAttrs, GroupId,
	ObjectAttrs, ObjectId, OwnerId, Permissions, RuleMasks, SubjectId, UserId,
};
use sqlx::sqlite::{SqlitePool, SqliteRow};
use sqlx::{Row, SqliteConnection};

use crate::error::DbError;

/// Depth bound used when callers do not configure one.
pub const DEFAULT_MAX_DEPTH: usize = 64;

#[async_trait]
pub trait AccessStore: Send + Sync {
	async fn load_snapshot(
		&self,
		client: &UserId,
		object: &ObjectId,
		max_depth: usize,
	) -> Result<AccessSnapshot, DbError>;
	async fn get_object(&self, object: &ObjectId) -> Result<Option<ObjectAttrs>, DbError>;
	async fn list_rules(&self, object: &ObjectId) -> Result<Vec<AclRule>, DbError>;
	async fn groups_of(&self, user: &UserId) -> Result<BTreeSet<GroupId>, DbError>;
	async fn user_exists(&self, user: &UserId) -> Result<bool, DbError>;
	async fn is_public_read(&self, object: &ObjectId, max_depth: usize) -> Result<bool, DbError>;
}

/// Repository for access-control reads.
#[derive(Clone)]
pub struct AccessRepository {
	pool: SqlitePool,
}

impl AccessRepository {
	pub fn new(pool: SqlitePool) -> Self {
		Self { pool }
	}

	/// Load the client, object, rules and ancestors for one evaluation.
	///
	/// # Errors
	/// Returns `DbError::NotFound` if the client or the object does not exist.
	#[tracing::instrument(skip(self), fields(client_id = %client, object_id = %object))]
	pub async fn load_snapshot(
		&self,
		client: &UserId,
		object: &ObjectId,
		max_depth: usize,
	) -> Result<AccessSnapshot, DbError> {
		let mut conn = self.pool.acquire().await?;
		load_snapshot(&mut conn, client, object, max_depth).await
	}

	#[tracing::instrument(skip(self), fields(object_id = %object))]
	pub async fn get_object(&self, object: &ObjectId) -> Result<Option<ObjectAttrs>, DbError> {
		let mut conn = self.pool.acquire().await?;
		fetch_object(&mut conn, object).await
	}

	/// ACL edges on an object, ordered by subject id.
	#[tracing::instrument(skip(self), fields(object_id = %object))]
	pub async fn list_rules(&self, object: &ObjectId) -> Result<Vec<AclRule>, DbError> {
		let mut conn = self.pool.acquire().await?;
		fetch_rules(&mut conn, object).await
	}

	/// Direct group memberships of a user.
	#[tracing::instrument(skip(self), fields(user_id = %user))]
	pub async fn groups_of(&self, user: &UserId) -> Result<BTreeSet<GroupId>, DbError> {
		let mut conn = self.pool.acquire().await?;
		groups_of(&mut conn, user).await
	}

	#[tracing::instrument(skip(self), fields(user_id = %user))]
	pub async fn user_exists(&self, user: &UserId) -> Result<bool, DbError> {
		let mut conn = self.pool.acquire().await?;
		Ok(fetch_user_admin_flag(&mut conn, user).await?.is_some())
	}

	/// True when the object or any ancestor collection is public.
	///
	/// # Errors
	/// Returns `DbError::NotFound` if the object does not exist.
	#[tracing::instrument(skip(self), fields(object_id = %object))]
	pub async fn is_public_read(&self, object: &ObjectId, max_depth: usize) -> Result<bool, DbError> {
		let mut conn = self.pool.acquire().await?;
		let attrs = fetch_object(&mut conn, object)
			.await?
			.ok_or_else(|| DbError::NotFound(object.to_string()))?;
		if attrs.public {
			return Ok(true);
		}

		let walk = walk_ancestors(&mut conn, object, max_depth).await?;
		Ok(walk.ancestors.iter().any(|a| a.public))
	}
}

#[async_trait]
impl AccessStore for AccessRepository {
	async fn load_snapshot(
		&self,
		client: &UserId,
		object: &ObjectId,
		max_depth: usize,
	) -> Result<AccessSnapshot, DbError> {
		self.load_snapshot(client, object, max_depth).await
	}

	async fn get_object(&self, object: &ObjectId) -> Result<Option<ObjectAttrs>, DbError> {
		self.get_object(object).await
	}

	async fn list_rules(&self, object: &ObjectId) -> Result<Vec<AclRule>, DbError> {
		self.list_rules(object).await
	}

	async fn groups_of(&self, user: &UserId) -> Result<BTreeSet<GroupId>, DbError> {
		self.groups_of(user).await
	}

	async fn user_exists(&self, user: &UserId) -> Result<bool, DbError> {
		self.user_exists(user).await
	}

	async fn is_public_read(&self, object: &ObjectId, max_depth: usize) -> Result<bool, DbError> {
		self.is_public_read(object, max_depth).await
	}
}

// =============================================================================
// Loaders
// =============================================================================

pub(crate) async fn load_snapshot(
	conn: &mut SqliteConnection,
	client: &UserId,
	object: &ObjectId,
	max_depth: usize,
) -> Result<AccessSnapshot, DbError> {
	let is_admin = fetch_user_admin_flag(conn, client)
		.await?
		.ok_or_else(|| DbError::NotFound(client.to_string()))?;
	let attrs = fetch_object(conn, object)
		.await?
		.ok_or_else(|| DbError::NotFound(object.to_string()))?;

	let groups = groups_of(conn, client).await?;
	let client_attrs = ClientAttrs::new(client.clone())
		.with_admin(is_admin)
		.with_groups(groups);

	let mut snapshot = AccessSnapshot::new(client_attrs, attrs);
	snapshot.administers_owner = administers_owner(conn, &snapshot.object.owner, client).await?;

	if is_administrator(&snapshot) {
		return Ok(snapshot);
	}

	snapshot.rules = fetch_rules(conn, object).await?;

	let walk = walk_ancestors(conn, object, max_depth).await?;
	snapshot.ancestors = walk.ancestors;
	snapshot.walk_truncated = walk.truncated;

	tracing::debug!(
		client_id = %client,
		object_id = %object,
		rules = snapshot.rules.len(),
		ancestors = snapshot.ancestors.len(),
		"access snapshot loaded"
	);
	Ok(snapshot)
}

/// `Some(is_admin)` for an existing user.
pub(crate) async fn fetch_user_admin_flag(
	conn: &mut SqliteConnection,
	user: &UserId,
) -> Result<Option<bool>, DbError> {
	let row = sqlx::query("SELECT is_admin FROM users WHERE id = ?")
		.bind(user.as_str())
		.fetch_optional(&mut *conn)
		.await?;

	row.map(|r| r.try_get::<i64, _>("is_admin").map(|v| v != 0))
		.transpose()
		.map_err(DbError::from)
}

pub(crate) async fn groups_of(
	conn: &mut SqliteConnection,
	user: &UserId,
) -> Result<BTreeSet<GroupId>, DbError> {
	let rows = sqlx::query("SELECT group_id FROM members WHERE user_id = ?")
		.bind(user.as_str())
		.fetch_all(&mut *conn)
		.await?;

	rows.iter()
		.map(|r| parse_id::<GroupId>(r.try_get("group_id")?))
		.collect()
}

pub(crate) async fn fetch_object(
	conn: &mut SqliteConnection,
	object: &ObjectId,
) -> Result<Option<ObjectAttrs>, DbError> {
	let row = sqlx::query(
		r#"
		SELECT o.id, o.public, o.locked, o.creator,
			o.perm_grant, o.perm_deny, o.perm_inh_grant, o.perm_inh_deny,
			w.owner_id
		FROM objects o
		LEFT JOIN owners w ON w.object_id = o.id
		WHERE o.id = ?
		"#,
	)
	.bind(object.as_str())
	.fetch_optional(&mut *conn)
	.await?;

	row.map(|r| row_to_object(&r)).transpose()
}

async fn administers_owner(
	conn: &mut SqliteConnection,
	owner: &OwnerId,
	user: &UserId,
) -> Result<bool, DbError> {
	let row: (i64,) = sqlx::query_as(
		r#"
		SELECT EXISTS (SELECT 1 FROM admins WHERE owner_id = ? AND user_id = ?)
			OR EXISTS (SELECT 1 FROM projects WHERE id = ? AND owner_id = ?)
		"#,
	)
	.bind(owner.as_str())
	.bind(user.as_str())
	.bind(owner.as_str())
	.bind(user.as_str())
	.fetch_one(&mut *conn)
	.await?;
	Ok(row.0 != 0)
}

pub(crate) async fn fetch_rules(
	conn: &mut SqliteConnection,
	object: &ObjectId,
) -> Result<Vec<AclRule>, DbError> {
	let rows = sqlx::query(
		r#"
		SELECT object_id, subject_id, perm_grant, perm_deny, perm_inh_grant, perm_inh_deny
		FROM acl
		WHERE object_id = ?
		ORDER BY subject_id
		"#,
	)
	.bind(object.as_str())
	.fetch_all(&mut *conn)
	.await?;

	rows.iter().map(row_to_rule).collect()
}

// =============================================================================
// Hierarchy Walk
// =============================================================================

pub(crate) struct AncestorWalk {
	pub ancestors: Vec<AncestorAttrs>,
	pub truncated: bool,
}

/// Breadth-first walk from `object` up through every parent collection.
///
/// Ancestors come back nearest level first, each at most once. The walk stops
/// after `max_depth` levels.
pub(crate) async fn walk_ancestors(
	conn: &mut SqliteConnection,
	object: &ObjectId,
	max_depth: usize,
) -> Result<AncestorWalk, DbError> {
	let mut visited: HashSet<ObjectId> = HashSet::from([object.clone()]);
	let mut frontier = vec![object.clone()];
	let mut ancestors = Vec::new();
	let mut depth = 0;

	loop {
		let mut next = Vec::new();
		for child in &frontier {
			for parent in fetch_parents(conn, child).await? {
				if visited.insert(parent.clone()) {
					next.push(parent);
				}
			}
		}

		if next.is_empty() {
			return Ok(AncestorWalk {
				ancestors,
				truncated: false,
			});
		}

		if depth == max_depth {
			tracing::warn!(
				object_id = %object,
				max_depth,
				"ancestor walk hit depth bound, ignoring higher collections"
			);
			return Ok(AncestorWalk {
				ancestors,
				truncated: true,
			});
		}
		depth += 1;

		for id in &next {
			ancestors.push(fetch_ancestor(conn, id).await?);
		}
		frontier = next;
	}
}

async fn fetch_parents(conn: &mut SqliteConnection, child: &ObjectId) -> Result<Vec<ObjectId>, DbError> {
	let rows = sqlx::query("SELECT parent_id FROM items WHERE child_id = ? ORDER BY parent_id")
		.bind(child.as_str())
		.fetch_all(&mut *conn)
		.await?;

	rows.iter()
		.map(|r| parse_id::<ObjectId>(r.try_get("parent_id")?))
		.collect()
}

async fn fetch_ancestor(conn: &mut SqliteConnection, id: &ObjectId) -> Result<AncestorAttrs, DbError> {
	let row = sqlx::query(
		r#"
		SELECT public, perm_grant, perm_deny, perm_inh_grant, perm_inh_deny
		FROM objects
		WHERE id = ?
		"#,
	)
	.bind(id.as_str())
	.fetch_optional(&mut *conn)
	.await?
	.ok_or_else(|| DbError::Internal(format!("dangling item edge to {id}")))?;

	Ok(AncestorAttrs {
		id: id.clone(),
		masks: masks_from_row(&row)?,
		public: row.try_get::<i64, _>("public")? != 0,
		rules: fetch_rules(conn, id).await?,
	})
}

// =============================================================================
// Helpers
// =============================================================================

fn parse_id<T>(raw: String) -> Result<T, DbError>
where
	T: TryFrom<String, Error = AclError>,
{
	T::try_from(raw).map_err(|e| DbError::Internal(format!("Invalid stored id: {e}")))
}

fn mask_column(row: &SqliteRow, column: &str) -> Result<Option<Permissions>, DbError> {
	let value: Option<i64> = row.try_get(column)?;
	value
		.map(|v| {
			u8::try_from(v)
				.map(Permissions::from_bits)
				.map_err(|_| DbError::Internal(format!("{column} out of range: {v}")))
		})
		.transpose()
		.map(|mask| mask.and_then(Permissions::non_zero))
}

pub(crate) fn masks_from_row(row: &SqliteRow) -> Result<RuleMasks, DbError> {
	Ok(RuleMasks {
		grant: mask_column(row, "perm_grant")?,
		deny: mask_column(row, "perm_deny")?,
		inh_grant: mask_column(row, "perm_inh_grant")?,
		inh_deny: mask_column(row, "perm_inh_deny")?,
	})
}

/// Bind value for a nullable mask column.
pub(crate) fn mask_value(mask: Option<Permissions>) -> Option<i64> {
	mask.and_then(Permissions::non_zero).map(|m| i64::from(m.bits()))
}

fn row_to_object(row: &SqliteRow) -> Result<ObjectAttrs, DbError> {
	let id = parse_id::<ObjectId>(row.try_get("id")?)?;
	let owner: Option<String> = row.try_get("owner_id")?;
	let owner = owner.ok_or_else(|| DbError::Internal(format!("{id} has no owner")))?;
	let creator: Option<String> = row.try_get("creator")?;

	Ok(ObjectAttrs {
		owner: parse_id::<OwnerId>(owner)?,
		creator: creator.map(|c| parse_id::<UserId>(c)).transpose()?,
		masks: masks_from_row(row)?,
		public: row.try_get::<i64, _>("public")? != 0,
		locked: row.try_get::<i64, _>("locked")? != 0,
		id,
	})
}

fn row_to_rule(row: &SqliteRow) -> Result<AclRule, DbError> {
	Ok(AclRule {
		object_id: parse_id::<ObjectId>(row.try_get("object_id")?)?,
		subject: parse_id::<SubjectId>(row.try_get("subject_id")?)?,
		masks: masks_from_row(row)?,
	})
}
