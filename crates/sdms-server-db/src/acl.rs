// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Transactional writes to default rules and ACL edges.
//!
//! Every `update` call runs inside one [`AclTransaction`]. Reads made through
//! the transaction see its own uncommitted writes, and dropping it without
//! calling [`AclTransaction::commit`] rolls everything back.

use sdms_acl_core::{AccessSnapshot, ObjectAttrs, ObjectId, RuleMasks, SubjectId, UserId};
use sqlx::sqlite::SqlitePool;
use sqlx::{Sqlite, Transaction};

use crate::access;
use crate::error::DbError;

/// Repository that opens ACL write transactions.
#[derive(Clone)]
pub struct AclRepository {
	pool: SqlitePool,
}

impl AclRepository {
	pub fn new(pool: SqlitePool) -> Self {
		Self { pool }
	}

	#[tracing::instrument(skip(self))]
	pub async fn begin(&self) -> Result<AclTransaction, DbError> {
		let tx = self.pool.begin().await?;
		Ok(AclTransaction { tx })
	}
}

/// An open write transaction over the catalog.
pub struct AclTransaction {
	tx: Transaction<'static, Sqlite>,
}

impl AclTransaction {
	/// Load an evaluation snapshot inside the transaction.
	pub async fn load_snapshot(
		&mut self,
		client: &UserId,
		object: &ObjectId,
		max_depth: usize,
	) -> Result<AccessSnapshot, DbError> {
		access::load_snapshot(&mut self.tx, client, object, max_depth).await
	}

	pub async fn get_object(&mut self, object: &ObjectId) -> Result<Option<ObjectAttrs>, DbError> {
		access::fetch_object(&mut self.tx, object).await
	}

	/// True when the user or group exists.
	pub async fn subject_exists(&mut self, subject: &SubjectId) -> Result<bool, DbError> {
		let query = match subject {
			SubjectId::User(_) => "SELECT COUNT(*) FROM users WHERE id = ?",
			SubjectId::Group(_) => "SELECT COUNT(*) FROM user_groups WHERE id = ?",
		};
		let row: (i64,) = sqlx::query_as(query)
			.bind(subject.as_str())
			.fetch_one(&mut *self.tx)
			.await?;
		Ok(row.0 > 0)
	}

	/// The stored edge for `(object, subject)`, if any.
	pub async fn get_rule(
		&mut self,
		object: &ObjectId,
		subject: &SubjectId,
	) -> Result<Option<RuleMasks>, DbError> {
		let row = sqlx::query(
			r#"
			SELECT perm_grant, perm_deny, perm_inh_grant, perm_inh_deny
			FROM acl
			WHERE object_id = ? AND subject_id = ?
			"#,
		)
		.bind(object.as_str())
		.bind(subject.as_str())
		.fetch_optional(&mut *self.tx)
		.await?;

		row.map(|r| access::masks_from_row(&r)).transpose()
	}

	/// Store an edge, or remove it when every field is zero.
	#[tracing::instrument(skip(self, masks), fields(object_id = %object, subject_id = %subject))]
	pub async fn put_rule(
		&mut self,
		object: &ObjectId,
		subject: &SubjectId,
		masks: &RuleMasks,
	) -> Result<(), DbError> {
		let masks = masks.normalized();
		if masks.is_empty() {
			sqlx::query("DELETE FROM acl WHERE object_id = ? AND subject_id = ?")
				.bind(object.as_str())
				.bind(subject.as_str())
				.execute(&mut *self.tx)
				.await?;
			tracing::debug!(object_id = %object, subject_id = %subject, "acl rule removed");
			return Ok(());
		}

		sqlx::query(
			r#"
			INSERT INTO acl (object_id, subject_id, perm_grant, perm_deny, perm_inh_grant, perm_inh_deny)
			VALUES (?, ?, ?, ?, ?, ?)
			ON CONFLICT (object_id, subject_id) DO UPDATE SET
				perm_grant = excluded.perm_grant,
				perm_deny = excluded.perm_deny,
				perm_inh_grant = excluded.perm_inh_grant,
				perm_inh_deny = excluded.perm_inh_deny
			"#,
		)
		.bind(object.as_str())
		.bind(subject.as_str())
		.bind(access::mask_value(masks.grant))
		.bind(access::mask_value(masks.deny))
		.bind(access::mask_value(masks.inh_grant))
		.bind(access::mask_value(masks.inh_deny))
		.execute(&mut *self.tx)
		.await?;

		tracing::debug!(object_id = %object, subject_id = %subject, "acl rule stored");
		Ok(())
	}

	/// Overwrite the object's default rule.
	#[tracing::instrument(skip(self, masks), fields(object_id = %object))]
	pub async fn set_default_rule(&mut self, object: &ObjectId, masks: &RuleMasks) -> Result<(), DbError> {
		let result = sqlx::query(
			r#"
			UPDATE objects
			SET perm_grant = ?, perm_deny = ?, perm_inh_grant = ?, perm_inh_deny = ?
			WHERE id = ?
			"#,
		)
		.bind(access::mask_value(masks.grant))
		.bind(access::mask_value(masks.deny))
		.bind(access::mask_value(masks.inh_grant))
		.bind(access::mask_value(masks.inh_deny))
		.bind(object.as_str())
		.execute(&mut *self.tx)
		.await?;

		if result.rows_affected() == 0 {
			return Err(DbError::NotFound(object.to_string()));
		}

		tracing::debug!(object_id = %object, "default rule stored");
		Ok(())
	}

	pub async fn commit(self) -> Result<(), DbError> {
		self.tx.commit().await?;
		Ok(())
	}
}
