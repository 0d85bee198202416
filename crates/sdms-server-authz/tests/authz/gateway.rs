// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use sdms_acl_core::{ErrorCode, GridAction, Permissions, RuleMasks, UserId};

use super::support::{
	run_gateway_cases, GatewayCase, MockRepositoryPaths, TestApp, REPO_ID, REPO_ROOT,
};

fn paths() -> MockRepositoryPaths {
	MockRepositoryPaths::new()
		.with_record("1", &format!("{REPO_ROOT}/user/alice/1"))
		.with_record("p1", &format!("{REPO_ROOT}/project/proj1/p1"))
}

fn at(relative: &str) -> String {
	format!("{REPO_ROOT}{relative}")
}

#[tokio::test]
async fn test_record_read_authorization() {
	let app = TestApp::new().await;
	let gateway = app.gateway(paths());

	let cases = vec![
		GatewayCase {
			name: "owner_reads_own_record",
			user: Some("alice"),
			path: at("/user/alice/1"),
			verb: "read",
			expected: Ok(()),
		},
		GatewayCase {
			name: "stranger_cannot_read",
			user: Some("bob"),
			path: at("/user/alice/1"),
			verb: "read",
			expected: Err(ErrorCode::PermissionDenied),
		},
		GatewayCase {
			name: "anonymous_cannot_read_private",
			user: None,
			path: at("/user/alice/1"),
			verb: "read",
			expected: Err(ErrorCode::PermissionDenied),
		},
		GatewayCase {
			name: "missing_record_not_found",
			user: Some("alice"),
			path: at("/user/alice/404"),
			verb: "read",
			expected: Err(ErrorCode::ObjectNotFound),
		},
		GatewayCase {
			name: "record_at_wrong_location",
			user: Some("alice"),
			path: at("/user/bob/1"),
			verb: "read",
			expected: Err(ErrorCode::PermissionDenied),
		},
		GatewayCase {
			name: "project_admin_reads_project_record",
			user: Some("dave"),
			path: at("/project/proj1/p1/"),
			verb: "read",
			expected: Ok(()),
		},
	];
	run_gateway_cases(&gateway, &cases).await;
}

#[tokio::test]
async fn test_record_create_authorization() {
	let app = TestApp::new().await;
	app.catalog
		.rule(
			"d/p1",
			"g/proj1:team",
			RuleMasks {
				grant: Some(Permissions::WRITE_DATA),
				..RuleMasks::CLOSED
			},
		)
		.await;
	let gateway = app.gateway(paths());

	let cases = vec![
		GatewayCase {
			name: "owner_creates_record",
			user: Some("alice"),
			path: at("/user/alice/1"),
			verb: "create",
			expected: Ok(()),
		},
		GatewayCase {
			name: "group_member_with_write_creates",
			user: Some("carol"),
			path: at("/project/proj1/p1"),
			verb: "create",
			expected: Ok(()),
		},
		GatewayCase {
			name: "stranger_cannot_create",
			user: Some("bob"),
			path: at("/project/proj1/p1"),
			verb: "create",
			expected: Err(ErrorCode::PermissionDenied),
		},
		GatewayCase {
			name: "anonymous_cannot_create",
			user: None,
			path: at("/user/alice/1"),
			verb: "create",
			expected: Err(ErrorCode::PermissionDenied),
		},
		GatewayCase {
			name: "create_for_missing_record_denied",
			user: Some("alice"),
			path: at("/user/alice/404"),
			verb: "create",
			expected: Err(ErrorCode::PermissionDenied),
		},
	];
	run_gateway_cases(&gateway, &cases).await;
}

#[tokio::test]
async fn test_non_record_paths_follow_table() {
	let app = TestApp::new().await;
	let gateway = app.gateway(paths());

	let non_record_paths = [
		"/mnt/repo".to_string(),
		REPO_ROOT.to_string(),
		at("/user"),
		at("/project/"),
		at("/user/alice"),
		at("/project/proj1"),
	];

	for path in non_record_paths {
		for action in GridAction::ALL {
			for user in [None, Some(UserId::from_key("bob"))] {
				let result = gateway
					.authorize_path(user.as_ref(), REPO_ID, &path, action.as_str())
					.await
					.map_err(|err| err.code());
				let expected = match (action, &user) {
					(GridAction::Delete, _) | (_, None) => Err(ErrorCode::PermissionDenied),
					_ => Ok(()),
				};
				assert_eq!(result, expected, "{action} {path} as {user:?}");
			}
		}
	}
}

#[tokio::test]
async fn test_record_paths_without_checks() {
	let app = TestApp::new().await;
	let gateway = app.gateway(paths());

	let cases: Vec<GatewayCase> = ["write", "chdir", "lookup"]
		.into_iter()
		.flat_map(|verb| {
			[
				GatewayCase {
					name: verb,
					user: Some("bob"),
					path: at("/user/alice/1"),
					verb,
					expected: Ok(()),
				},
				GatewayCase {
					name: verb,
					user: None,
					path: at("/user/alice/1"),
					verb,
					expected: Err(ErrorCode::PermissionDenied),
				},
			]
		})
		.chain(std::iter::once(GatewayCase {
			name: "delete_always_denied",
			user: Some("alice"),
			path: at("/user/alice/1"),
			verb: "delete",
			expected: Err(ErrorCode::PermissionDenied),
		}))
		.collect();
	run_gateway_cases(&gateway, &cases).await;
}

#[tokio::test]
async fn test_rejected_requests() {
	let app = TestApp::new().await;
	let gateway = app.gateway(paths());

	let cases = vec![
		GatewayCase {
			name: "unknown_verb",
			user: Some("alice"),
			path: at("/user/alice/1"),
			verb: "rename",
			expected: Err(ErrorCode::InvalidParameter),
		},
		GatewayCase {
			name: "unknown_top_level_directory",
			user: Some("alice"),
			path: at("/scratch/alice"),
			verb: "lookup",
			expected: Err(ErrorCode::PermissionDenied),
		},
		GatewayCase {
			name: "too_deep",
			user: Some("alice"),
			path: at("/user/alice/1/extra"),
			verb: "read",
			expected: Err(ErrorCode::PermissionDenied),
		},
		GatewayCase {
			name: "outside_repository",
			user: Some("alice"),
			path: "/srv/other".to_string(),
			verb: "lookup",
			expected: Err(ErrorCode::PermissionDenied),
		},
		GatewayCase {
			name: "sibling_prefix",
			user: Some("alice"),
			path: "/mnt/repo/datafed2/user".to_string(),
			verb: "lookup",
			expected: Err(ErrorCode::PermissionDenied),
		},
	];
	run_gateway_cases(&gateway, &cases).await;

	let err = gateway
		.authorize_path(Some(&UserId::from_key("alice")), "nope", REPO_ROOT, "lookup")
		.await
		.unwrap_err();
	assert_eq!(err.code(), ErrorCode::PermissionDenied);
}

#[tokio::test]
async fn test_anonymous_public_read() {
	let app = TestApp::new().await;
	app.catalog.set_public("c/root").await;

	let open = app.gateway(paths());
	let cases = vec![
		GatewayCase {
			name: "public_record_readable",
			user: None,
			path: at("/user/alice/1"),
			verb: "read",
			expected: Ok(()),
		},
		GatewayCase {
			name: "private_project_record_hidden",
			user: None,
			path: at("/project/proj1/p1"),
			verb: "read",
			expected: Err(ErrorCode::PermissionDenied),
		},
		GatewayCase {
			name: "missing_record_not_found",
			user: None,
			path: at("/user/alice/404"),
			verb: "read",
			expected: Err(ErrorCode::ObjectNotFound),
		},
		GatewayCase {
			name: "public_record_still_needs_write_to_create",
			user: None,
			path: at("/user/alice/1"),
			verb: "create",
			expected: Err(ErrorCode::PermissionDenied),
		},
		GatewayCase {
			name: "authenticated_stranger_reads_public",
			user: Some("bob"),
			path: at("/user/alice/1"),
			verb: "read",
			expected: Ok(()),
		},
	];
	run_gateway_cases(&open, &cases).await;

	let closed = app.gateway(paths()).with_public_read(false);
	let cases = vec![GatewayCase {
		name: "public_read_disabled",
		user: None,
		path: at("/user/alice/1"),
		verb: "read",
		expected: Err(ErrorCode::PermissionDenied),
	}];
	run_gateway_cases(&closed, &cases).await;
}

#[tokio::test]
async fn test_unknown_clients_are_denied() {
	let app = TestApp::new().await;
	app.catalog.set_public("c/root").await;
	let gateway = app.gateway(paths());

	let cases: Vec<GatewayCase> = GridAction::ALL
		.into_iter()
		.flat_map(|action| {
			[REPO_ROOT.to_string(), at("/user/alice"), at("/user/alice/1")].map(|path| GatewayCase {
				name: action.as_str(),
				user: Some("ghost"),
				path,
				verb: action.as_str(),
				expected: Err(ErrorCode::PermissionDenied),
			})
		})
		.collect();
	run_gateway_cases(&gateway, &cases).await;
}

#[tokio::test]
async fn test_anonymous_access_outside_public_reads() {
	let app = TestApp::new().await;
	app.catalog.set_public("c/root").await;
	let gateway = app.gateway(paths());

	let cases = vec![
		GatewayCase {
			name: "anonymous_write_on_public_record",
			user: None,
			path: at("/user/alice/1"),
			verb: "write",
			expected: Err(ErrorCode::PermissionDenied),
		},
		GatewayCase {
			name: "anonymous_lookup_on_repository_root",
			user: None,
			path: REPO_ROOT.to_string(),
			verb: "lookup",
			expected: Err(ErrorCode::PermissionDenied),
		},
		GatewayCase {
			name: "anonymous_read_on_directory",
			user: None,
			path: at("/user/alice"),
			verb: "read",
			expected: Err(ErrorCode::PermissionDenied),
		},
		GatewayCase {
			name: "anonymous_read_on_public_record",
			user: None,
			path: at("/user/alice/1"),
			verb: "read",
			expected: Ok(()),
		},
	];
	run_gateway_cases(&gateway, &cases).await;
}
