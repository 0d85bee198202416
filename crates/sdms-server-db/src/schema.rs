// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Catalog schema.
//!
//! Vertices (users, projects, groups, objects) and edges (membership,
//! ownership, administration, hierarchy, ACL) each get their own table.
//! Permission columns are nullable; a stored mask is always in `1..=255`.

use sqlx::sqlite::SqlitePool;

use crate::error::DbError;

const SCHEMA: &[&str] = &[
	r#"
	CREATE TABLE IF NOT EXISTS users (
		id TEXT PRIMARY KEY,
		is_admin INTEGER NOT NULL DEFAULT 0
	)
	"#,
	r#"
	CREATE TABLE IF NOT EXISTS projects (
		id TEXT PRIMARY KEY,
		owner_id TEXT REFERENCES users(id) ON DELETE SET NULL
	)
	"#,
	r#"
	CREATE TABLE IF NOT EXISTS user_groups (
		id TEXT PRIMARY KEY,
		owner_id TEXT NOT NULL
	)
	"#,
	r#"
	CREATE TABLE IF NOT EXISTS objects (
		id TEXT PRIMARY KEY,
		is_root INTEGER NOT NULL DEFAULT 0,
		public INTEGER NOT NULL DEFAULT 0,
		locked INTEGER NOT NULL DEFAULT 0,
		creator TEXT,
		perm_grant INTEGER CHECK (perm_grant BETWEEN 1 AND 255),
		perm_deny INTEGER CHECK (perm_deny BETWEEN 1 AND 255),
		perm_inh_grant INTEGER CHECK (perm_inh_grant BETWEEN 1 AND 255),
		perm_inh_deny INTEGER CHECK (perm_inh_deny BETWEEN 1 AND 255)
	)
	"#,
	r#"
	CREATE TABLE IF NOT EXISTS acl (
		object_id TEXT NOT NULL REFERENCES objects(id) ON DELETE CASCADE,
		subject_id TEXT NOT NULL,
		perm_grant INTEGER CHECK (perm_grant BETWEEN 1 AND 255),
		perm_deny INTEGER CHECK (perm_deny BETWEEN 1 AND 255),
		perm_inh_grant INTEGER CHECK (perm_inh_grant BETWEEN 1 AND 255),
		perm_inh_deny INTEGER CHECK (perm_inh_deny BETWEEN 1 AND 255),
		PRIMARY KEY (object_id, subject_id),
		CHECK (
			perm_grant IS NOT NULL
			OR perm_deny IS NOT NULL
			OR perm_inh_grant IS NOT NULL
			OR perm_inh_deny IS NOT NULL
		)
	)
	"#,
	r#"
	CREATE TABLE IF NOT EXISTS members (
		group_id TEXT NOT NULL REFERENCES user_groups(id) ON DELETE CASCADE,
		user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
		PRIMARY KEY (group_id, user_id)
	)
	"#,
	r#"
	CREATE TABLE IF NOT EXISTS owners (
		object_id TEXT PRIMARY KEY REFERENCES objects(id) ON DELETE CASCADE,
		owner_id TEXT NOT NULL
	)
	"#,
	r#"
	CREATE TABLE IF NOT EXISTS admins (
		owner_id TEXT NOT NULL,
		user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
		PRIMARY KEY (owner_id, user_id)
	)
	"#,
	r#"
	CREATE TABLE IF NOT EXISTS items (
		parent_id TEXT NOT NULL REFERENCES objects(id) ON DELETE CASCADE,
		child_id TEXT NOT NULL REFERENCES objects(id) ON DELETE CASCADE,
		PRIMARY KEY (parent_id, child_id)
	)
	"#,
	"CREATE INDEX IF NOT EXISTS idx_items_child ON items(child_id)",
	"CREATE INDEX IF NOT EXISTS idx_members_user ON members(user_id)",
];

/// Create every catalog table that does not exist yet.
#[tracing::instrument(skip(pool))]
pub async fn run_migrations(pool: &SqlitePool) -> Result<(), DbError> {
	for statement in SCHEMA {
		sqlx::query(statement).execute(pool).await?;
	}

	tracing::debug!(statements = SCHEMA.len(), "catalog schema ready");
	Ok(())
}
