// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use sdms_acl_core::{AclRuleRequest, ErrorCode, ObjectId, Permissions, RuleMasks, UserId};
use sdms_server_authz::AclService;

use super::support::{run_authz_cases, AuthzCase, TestApp};

fn grant(mask: Permissions) -> RuleMasks {
	RuleMasks {
		grant: mask.non_zero(),
		..RuleMasks::CLOSED
	}
}

fn inh_grant(mask: Permissions) -> RuleMasks {
	RuleMasks {
		inh_grant: mask.non_zero(),
		..RuleMasks::CLOSED
	}
}

#[tokio::test]
async fn test_administrators_get_all_bits() {
	let app = TestApp::new().await;
	app.catalog
		.rule(
			"d/1",
			"u/alice",
			RuleMasks {
				deny: Some(Permissions::ALL),
				..RuleMasks::CLOSED
			},
		)
		.await;
	app.catalog.record_by("c1", "p/proj1", "erin").await;

	assert_eq!(app.effective("alice", "d/1").await, Permissions::ALL);
	assert_eq!(app.effective("root", "d/1").await, Permissions::ALL);
	assert_eq!(app.effective("dave", "d/p1").await, Permissions::ALL);
	assert_eq!(app.effective("dave", "c/shared").await, Permissions::ALL);
	assert_eq!(app.effective("erin", "d/c1").await, Permissions::ALL);
	assert_eq!(app.effective("dave", "d/1").await, Permissions::NONE);
}

#[tokio::test]
async fn test_project_owner_administers_project_objects() {
	let app = TestApp::new().await;
	app.catalog.owned_project("proj2", "erin").await;
	app.catalog.collection("lab", "p/proj2").await;
	app.catalog.record("q1", "p/proj2").await;
	app.catalog.link("c/lab", "d/q1").await;

	assert_eq!(app.effective("erin", "c/lab").await, Permissions::ALL);
	assert_eq!(app.effective("erin", "d/q1").await, Permissions::ALL);
	assert_eq!(app.effective("erin", "d/p1").await, Permissions::NONE);
	assert_eq!(app.effective("bob", "d/q1").await, Permissions::NONE);
}

#[tokio::test]
async fn test_deny_overrides_grant() {
	let app = TestApp::new().await;
	app.catalog
		.rule(
			"d/1",
			"u/bob",
			RuleMasks {
				grant: Some(Permissions::READ_DATA | Permissions::VIEW),
				deny: Some(Permissions::VIEW),
				..RuleMasks::CLOSED
			},
		)
		.await;

	assert_eq!(app.effective("bob", "d/1").await, Permissions::READ_DATA);

	let cases = vec![
		AuthzCase {
			name: "granted_bit_allowed",
			user: "bob",
			object: "d/1",
			required: Permissions::READ_DATA,
			expected: Ok(()),
		},
		AuthzCase {
			name: "denied_bit_rejected",
			user: "bob",
			object: "d/1",
			required: Permissions::VIEW,
			expected: Err(ErrorCode::PermissionDenied),
		},
		AuthzCase {
			name: "partial_mask_rejected",
			user: "bob",
			object: "d/1",
			required: Permissions::READ_DATA | Permissions::VIEW,
			expected: Err(ErrorCode::PermissionDenied),
		},
		AuthzCase {
			name: "other_record_untouched",
			user: "bob",
			object: "d/2",
			required: Permissions::READ_DATA,
			expected: Err(ErrorCode::PermissionDenied),
		},
		AuthzCase {
			name: "missing_record",
			user: "bob",
			object: "d/404",
			required: Permissions::READ_DATA,
			expected: Err(ErrorCode::ObjectNotFound),
		},
	];
	run_authz_cases(&app, &cases).await;
}

#[tokio::test]
async fn test_add_edit_preserves_prior_bits() {
	let app = TestApp::new().await;
	let alice = UserId::from_key("alice");
	let record = ObjectId::data("1");

	app.service
		.update_acl(&alice, &record, &[AclRuleRequest::new("u/bob").grant("u")])
		.await
		.unwrap();
	app.service
		.update_acl(&alice, &record, &[AclRuleRequest::new("u/bob").grant("+lv")])
		.await
		.unwrap();

	let entries = app.service.view_acl(&alice, &record).await.unwrap();
	assert_eq!(entries.len(), 1);
	assert_eq!(
		entries[0].masks.grant(),
		Permissions::UPDATE | Permissions::LIST | Permissions::VIEW
	);
}

#[tokio::test]
async fn test_default_rule_grant_and_deny() {
	let app = TestApp::new().await;
	app.service
		.update_acl(
			&UserId::from_key("alice"),
			&ObjectId::data("1"),
			&[AclRuleRequest::new("default").grant("lv").deny("v")],
		)
		.await
		.unwrap();

	assert_eq!(app.effective("erin", "d/1").await, Permissions::LIST);
}

#[tokio::test]
async fn test_inheritance_through_nested_collections() {
	let app = TestApp::new().await;
	app.catalog.collection("b", "u/alice").await;
	app.catalog.record("d", "u/alice").await;
	app.catalog.link("c/root", "c/b").await;
	app.catalog.link("c/b", "d/d").await;
	app.catalog
		.rule("c/root", "u/bob", inh_grant(Permissions::VIEW))
		.await;

	assert_eq!(app.effective("bob", "d/d").await, Permissions::VIEW);
	assert_eq!(app.effective("bob", "c/b").await, Permissions::VIEW);
	assert_eq!(app.effective("erin", "d/d").await, Permissions::NONE);
}

#[tokio::test]
async fn test_inherited_deny_anywhere_in_chain() {
	let app = TestApp::new().await;
	app.catalog.collection("b", "u/alice").await;
	app.catalog.link("c/root", "c/b").await;
	app.catalog.record("d", "u/alice").await;
	app.catalog.link("c/b", "d/d").await;

	app.catalog
		.default_rule(
			"c/b",
			RuleMasks {
				inh_deny: Some(Permissions::VIEW),
				..RuleMasks::CLOSED
			},
		)
		.await;
	app.catalog
		.rule(
			"c/root",
			"u/bob",
			inh_grant(Permissions::VIEW | Permissions::LIST),
		)
		.await;

	assert_eq!(app.effective("bob", "d/d").await, Permissions::LIST);
}

#[tokio::test]
async fn test_group_rule_applies_to_members() {
	let app = TestApp::new().await;
	app.catalog
		.rule("d/p1", "g/proj1:team", grant(Permissions::UPDATE))
		.await;

	assert_eq!(app.effective("carol", "d/p1").await, Permissions::UPDATE);
	assert_eq!(app.effective("bob", "d/p1").await, Permissions::NONE);
}

#[tokio::test]
async fn test_public_collections_open_their_contents() {
	let app = TestApp::new().await;
	app.catalog.set_public("c/root").await;

	assert_eq!(app.effective("erin", "d/1").await, Permissions::PUBLIC);
	assert_eq!(app.effective("erin", "c/root").await, Permissions::PUBLIC);
	assert!(app.service.is_public_read(&ObjectId::data("1")).await.unwrap());
	assert!(!app.service.is_public_read(&ObjectId::data("p1")).await.unwrap());
}

#[tokio::test]
async fn test_locked_record_blocks_everyone_but_administrators() {
	let app = TestApp::new().await;
	app.catalog
		.rule("d/1", "u/bob", grant(Permissions::READ_DATA))
		.await;
	app.catalog.set_locked("d/1").await;

	assert_eq!(app.effective("bob", "d/1").await, Permissions::NONE);
	assert_eq!(app.effective("alice", "d/1").await, Permissions::ALL);
}

#[tokio::test]
async fn test_depth_bound_limits_inheritance() {
	let app = TestApp::new().await;
	for key in ["l1", "l2", "l3"] {
		app.catalog.collection(key, "u/alice").await;
	}
	app.catalog.record("deep", "u/alice").await;
	app.catalog.link("c/l3", "c/l2").await;
	app.catalog.link("c/l2", "c/l1").await;
	app.catalog.link("c/l1", "d/deep").await;
	app.catalog
		.rule("c/l3", "u/bob", inh_grant(Permissions::VIEW))
		.await;

	let bob = UserId::from_key("bob");
	let deep = ObjectId::data("deep");

	let shallow = AclService::new(app.pool.clone()).with_max_depth(2);
	assert_eq!(
		shallow.effective_permission(&bob, &deep).await.unwrap(),
		Permissions::NONE
	);

	let full = AclService::new(app.pool.clone()).with_max_depth(3);
	assert_eq!(
		full.effective_permission(&bob, &deep).await.unwrap(),
		Permissions::VIEW
	);
}

#[tokio::test]
async fn test_cyclic_hierarchy_terminates() {
	let app = TestApp::new().await;
	app.catalog.collection("x", "u/alice").await;
	app.catalog.collection("y", "u/alice").await;
	app.catalog.link("c/x", "c/y").await;
	app.catalog.link("c/y", "c/x").await;
	app.catalog.record("loop", "u/alice").await;
	app.catalog.link("c/x", "d/loop").await;
	app.catalog
		.rule("c/y", "u/bob", inh_grant(Permissions::LIST))
		.await;

	assert_eq!(app.effective("bob", "d/loop").await, Permissions::LIST);
}
