// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context};
use sdms_acl_core::{AclRuleRequest, GroupId, ObjectId, OwnerId, ProjectId, UserId};
use sdms_server_authz::{AclService, AuthorizationGateway};
use sdms_server_config::ServerConfig;
use sdms_server_db::{AccessRepository, CatalogRepository};
use sqlx::sqlite::SqlitePool;

use crate::paths::CatalogPaths;
use crate::{AclCommand, CatalogCommand, GatewayCommand, PermCommand};

fn service(pool: &SqlitePool, config: &ServerConfig) -> AclService {
	AclService::new(pool.clone()).with_max_depth(config.authz.max_inheritance_depth)
}

pub async fn init(pool: &SqlitePool) -> anyhow::Result<()> {
	sdms_server_db::run_migrations(pool)
		.await
		.context("creating schema")?;
	println!("schema ready");
	Ok(())
}

pub async fn perm(pool: &SqlitePool, config: &ServerConfig, cmd: PermCommand) -> anyhow::Result<()> {
	let service = service(pool, config);
	match cmd {
		PermCommand::Get(target) => {
			let mask = service
				.effective_permission(&target.client, &target.object)
				.await?;
			println!("{} {}", mask, mask.to_letters());
		}
		PermCommand::Check { target, mask, any } => {
			if any {
				service
					.authorize_any(&target.client, &target.object, mask)
					.await?;
			} else {
				service.authorize(&target.client, &target.object, mask).await?;
			}
			println!("allowed");
		}
	}
	Ok(())
}

pub async fn acl(pool: &SqlitePool, config: &ServerConfig, cmd: AclCommand) -> anyhow::Result<()> {
	let service = service(pool, config);
	match cmd {
		AclCommand::View(target) => {
			let entries = service.view_acl(&target.client, &target.object).await?;
			println!("{}", serde_json::to_string_pretty(&entries)?);
		}
		AclCommand::Update {
			target,
			rules,
			file,
		} => {
			let json = match (rules, file) {
				(Some(json), _) => json,
				(None, Some(path)) => read_rules_file(&path)?,
				(None, None) => bail!("either --rules or --file is required"),
			};
			let rules = parse_rules(&json)?;
			service
				.update_acl(&target.client, &target.object, &rules)
				.await?;
			println!("updated {} rule(s) on {}", rules.len(), target.object);
		}
	}
	Ok(())
}

fn read_rules_file(path: &Path) -> anyhow::Result<String> {
	std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))
}

/// Accepts either a JSON array of rules or a single rule object.
pub fn parse_rules(json: &str) -> anyhow::Result<Vec<AclRuleRequest>> {
	let value: serde_json::Value = serde_json::from_str(json).context("rules are not valid JSON")?;
	let rules = if value.is_array() {
		serde_json::from_value(value)?
	} else {
		vec![serde_json::from_value(value)?]
	};
	Ok(rules)
}

pub async fn catalog(pool: &SqlitePool, cmd: CatalogCommand) -> anyhow::Result<()> {
	let repo = CatalogRepository::new(pool.clone());
	match cmd {
		CatalogCommand::User { id, admin } => repo.create_user(&id, admin).await?,
		CatalogCommand::Project { id, owner } => {
			repo.create_project(&ProjectId::parse(id)?, owner.as_ref())
				.await?
		}
		CatalogCommand::Group { id, owner } => {
			let group = repo
				.create_group(&GroupId::parse(id)?, &OwnerId::parse(owner)?)
				.await?;
			println!("{group}");
		}
		CatalogCommand::Member { group, user } => {
			repo.add_member(&GroupId::parse(group)?, &UserId::parse(user)?)
				.await?
		}
		CatalogCommand::Admin { owner, user } => {
			repo.add_admin(&OwnerId::parse(owner)?, &UserId::parse(user)?)
				.await?
		}
		CatalogCommand::Collection { id, owner, root } => {
			repo.create_collection(&ObjectId::parse(id)?, &OwnerId::parse(owner)?, root)
				.await?
		}
		CatalogCommand::Record { id, owner, creator } => {
			let creator = creator.map(UserId::parse).transpose()?;
			repo.create_record(&ObjectId::parse(id)?, &OwnerId::parse(owner)?, creator.as_ref())
				.await?
		}
		CatalogCommand::Link { parent, child } => {
			repo.link(&ObjectId::parse(parent)?, &ObjectId::parse(child)?)
				.await?
		}
		CatalogCommand::Public { id } => repo.set_public(&ObjectId::parse(id)?, true).await?,
		CatalogCommand::Lock { id } => repo.set_locked(&ObjectId::parse(id)?, true).await?,
	}
	Ok(())
}

pub async fn gateway(pool: &SqlitePool, config: &ServerConfig, cmd: GatewayCommand) -> anyhow::Result<()> {
	let GatewayCommand::Check {
		client,
		repo,
		root,
		verb,
		path,
	} = cmd;

	let paths = CatalogPaths::new(repo.clone(), root, AccessRepository::new(pool.clone()));
	let gateway = AuthorizationGateway::new(service(pool, config), Arc::new(paths))
		.with_public_read(config.authz.allow_public_read);

	gateway
		.authorize_path(client.as_ref(), &repo, &path, &verb)
		.await?;
	println!("allowed");
	Ok(())
}
