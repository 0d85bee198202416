// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! `sdms`: permission evaluation and ACL management against a catalog database.

use std::path::PathBuf;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use sdms_acl_core::{parse_perm_action, ObjectId, PermAction, Permissions, UserId};
use sdms_server_config::{LogFormat, ServerConfig};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod paths;

/// SDMS access control - evaluate permissions and edit ACLs.
#[derive(Parser, Debug)]
#[command(name = "sdms", about = "SDMS access-control tool", version)]
struct Cli {
	/// Config file (defaults to /etc/sdms/server.toml)
	#[arg(long, global = true, env = "SDMS_CONFIG")]
	config: Option<PathBuf>,

	/// Override the configured database URL
	#[arg(long, global = true)]
	database_url: Option<String>,

	#[command(subcommand)]
	command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
	/// Create the catalog schema
	Init,

	/// Evaluate permissions
	#[command(subcommand)]
	Perm(PermCommand),

	/// View or edit an object's ACL
	#[command(subcommand)]
	Acl(AclCommand),

	/// Register users, groups and objects
	#[command(subcommand)]
	Catalog(CatalogCommand),

	/// Authorize file-transfer gateway requests
	#[command(subcommand)]
	Gateway(GatewayCommand),
}

#[derive(Args, Debug)]
struct Target {
	/// Acting user (`u/{key}`)
	#[arg(long, value_parser = parse_user)]
	client: UserId,

	/// Object (`d/{key}` or `c/{key}`)
	#[arg(long, value_parser = parse_object)]
	object: ObjectId,
}

#[derive(Subcommand, Debug)]
enum PermCommand {
	/// Print the client's effective mask
	Get(Target),

	/// Exit non-zero unless the client holds the mask
	Check {
		#[command(flatten)]
		target: Target,

		/// Letters (`lvuatnrw`) or hex
		#[arg(long, value_parser = parse_mask)]
		mask: Permissions,

		/// Succeed if any bit of the mask is held
		#[arg(long)]
		any: bool,
	},
}

#[derive(Subcommand, Debug)]
enum AclCommand {
	/// Print ACL entries as JSON
	View(Target),

	/// Apply rule edits given as a JSON array
	Update {
		#[command(flatten)]
		target: Target,

		/// e.g. `[{"id":"u/bob","grant":"+lv"}]`
		#[arg(long, conflicts_with = "file", required_unless_present = "file")]
		rules: Option<String>,

		/// Read the JSON array from a file instead
		#[arg(long)]
		file: Option<PathBuf>,
	},
}

#[derive(Subcommand, Debug)]
enum CatalogCommand {
	/// Add a user
	User {
		#[arg(value_parser = parse_user)]
		id: UserId,
		#[arg(long)]
		admin: bool,
	},
	/// Add a project
	Project {
		id: String,
		/// User who administers everything the project owns
		#[arg(long, value_parser = parse_user)]
		owner: Option<UserId>,
	},
	/// Add a group owned by a user or project
	Group {
		id: String,
		#[arg(long)]
		owner: String,
	},
	/// Add a user to a group
	Member { group: String, user: String },
	/// Make a user an administrator of a user or project
	Admin { owner: String, user: String },
	/// Add a collection
	Collection {
		id: String,
		#[arg(long)]
		owner: String,
		#[arg(long)]
		root: bool,
	},
	/// Add a data record
	Record {
		id: String,
		#[arg(long)]
		owner: String,
		#[arg(long)]
		creator: Option<String>,
	},
	/// Place an object inside a collection
	Link { parent: String, child: String },
	/// Mark an object public
	Public { id: String },
	/// Lock a record
	Lock { id: String },
}

#[derive(Subcommand, Debug)]
enum GatewayCommand {
	/// Exit non-zero unless the gateway allows the request
	Check {
		/// Acting user; omit for an anonymous request
		#[arg(long, value_parser = parse_user)]
		client: Option<UserId>,

		/// Repository id
		#[arg(long)]
		repo: String,

		/// Repository root path
		#[arg(long)]
		root: String,

		/// One of read, write, create, delete, chdir, lookup
		#[arg(long)]
		verb: String,

		path: String,
	},
}

fn parse_user(s: &str) -> Result<UserId, String> {
	UserId::parse(s).map_err(|e| e.to_string())
}

fn parse_object(s: &str) -> Result<ObjectId, String> {
	ObjectId::parse(s).map_err(|e| e.to_string())
}

fn parse_mask(s: &str) -> Result<Permissions, String> {
	let edit = parse_perm_action(Some(s)).map_err(|e| e.to_string())?;
	match edit.action {
		PermAction::Set => Ok(edit.value),
		_ => Err(format!("'{s}' is an edit, expected a plain mask")),
	}
}

fn load_config(cli: &Cli) -> anyhow::Result<ServerConfig> {
	let mut config = match &cli.config {
		Some(path) => sdms_server_config::load_config_with_file(path.clone()),
		None => sdms_server_config::load_config(),
	}
	.context("loading configuration")?;

	if let Some(url) = &cli.database_url {
		config.database.url = url.clone();
	}
	Ok(config)
}

fn init_tracing(config: &ServerConfig) {
	let filter = tracing_subscriber::EnvFilter::try_from_default_env()
		.unwrap_or_else(|_| config.logging.level.clone().into());

	let (text, json) = match config.logging.format {
		LogFormat::Text => (
			Some(tracing_subscriber::fmt::layer().with_writer(std::io::stderr)),
			None,
		),
		LogFormat::Json => (
			None,
			Some(
				tracing_subscriber::fmt::layer()
					.json()
					.with_writer(std::io::stderr),
			),
		),
	};

	tracing_subscriber::registry()
		.with(filter)
		.with(text)
		.with(json)
		.init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
	let cli = Cli::parse();
	let config = load_config(&cli)?;
	init_tracing(&config);

	tracing::debug!(database = %config.database.url, "starting sdms");

	let pool = sdms_server_db::create_pool(&config.database.url, config.database.busy_timeout())
		.await
		.with_context(|| format!("opening {}", config.database.url))?;

	match cli.command {
		Command::Init => commands::init(&pool).await,
		Command::Perm(cmd) => commands::perm(&pool, &config, cmd).await,
		Command::Acl(cmd) => commands::acl(&pool, &config, cmd).await,
		Command::Catalog(cmd) => commands::catalog(&pool, cmd).await,
		Command::Gateway(cmd) => commands::gateway(&pool, &config, cmd).await,
	}
}
