// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use sdms_acl_core::{AclError, AclRuleRequest, ErrorCode, ObjectId, Permissions, RuleMasks, UserId};

use super::support::TestApp;

fn alice() -> UserId {
	UserId::from_key("alice")
}

#[tokio::test]
async fn test_missing_subject_leaves_acl_unchanged() {
	let app = TestApp::new().await;
	let record = ObjectId::data("1");

	let err = app
		.service
		.update_acl(
			&alice(),
			&record,
			&[
				AclRuleRequest::new("u/bob").grant("r"),
				AclRuleRequest::new("default").grant("l"),
				AclRuleRequest::new("u/ghost").grant("+r"),
			],
		)
		.await
		.unwrap_err();

	assert_eq!(err.code(), ErrorCode::ObjectNotFound);
	assert!(app.service.view_acl(&alice(), &record).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_inheritable_edits_rejected_on_records() {
	let app = TestApp::new().await;
	let record = ObjectId::data("1");

	for input in ["l", "+v", "-r", "0x40", "lvuatnrw", "0xff"] {
		for request in [
			AclRuleRequest::new("u/bob").inh_grant(input),
			AclRuleRequest::new("u/bob").inh_deny(input),
			AclRuleRequest::new("default").inh_grant(input),
		] {
			let err = app
				.service
				.update_acl(&alice(), &record, &[request])
				.await
				.unwrap_err();
			assert!(
				matches!(err, AclError::InvalidPermission(_)),
				"input {input:?} gave {err:?}"
			);
		}
	}

	assert!(app.service.view_acl(&alice(), &record).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_inheritable_edits_on_collections() {
	let app = TestApp::new().await;
	let root = ObjectId::collection("root");

	app.service
		.update_acl(
			&alice(),
			&root,
			&[AclRuleRequest::new("u/bob").inh_grant("v").grant("l")],
		)
		.await
		.unwrap();

	let entries = app.service.view_acl(&alice(), &root).await.unwrap();
	assert_eq!(entries.len(), 1);
	assert_eq!(
		entries[0].masks,
		RuleMasks {
			grant: Some(Permissions::LIST),
			inh_grant: Some(Permissions::VIEW),
			..RuleMasks::CLOSED
		}
	);
}

#[tokio::test]
async fn test_zeroed_rule_disappears() {
	let app = TestApp::new().await;
	let record = ObjectId::data("1");

	app.service
		.update_acl(&alice(), &record, &[AclRuleRequest::new("u/bob").grant("r")])
		.await
		.unwrap();
	app.service
		.update_acl(&alice(), &record, &[AclRuleRequest::new("u/bob").grant("-r")])
		.await
		.unwrap();

	assert!(app.service.view_acl(&alice(), &record).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_edits_in_one_batch_compose() {
	let app = TestApp::new().await;
	let record = ObjectId::data("1");

	app.service
		.update_acl(
			&alice(),
			&record,
			&[
				AclRuleRequest::new("u/bob").grant("lvr"),
				AclRuleRequest::new("u/bob").grant("-v").deny("w"),
			],
		)
		.await
		.unwrap();

	let entries = app.service.view_acl(&alice(), &record).await.unwrap();
	assert_eq!(
		entries[0].masks,
		RuleMasks {
			grant: Some(Permissions::LIST | Permissions::READ_DATA),
			deny: Some(Permissions::WRITE_DATA),
			..RuleMasks::CLOSED
		}
	);
}

#[tokio::test]
async fn test_short_group_uses_owner_key() {
	let app = TestApp::new().await;
	let record = ObjectId::data("p1");
	let dave = UserId::from_key("dave");

	app.service
		.update_acl(&dave, &record, &[AclRuleRequest::new("g/team").grant("u")])
		.await
		.unwrap();

	assert_eq!(app.effective("carol", "d/p1").await, Permissions::UPDATE);

	let entries = app.service.view_acl(&dave, &record).await.unwrap();
	assert_eq!(entries.len(), 1);
	assert_eq!(entries[0].subject, "g/team");

	// alice owns d/1, so g/team resolves to g/alice:team, which does not exist
	let err = app
		.service
		.update_acl(
			&alice(),
			&ObjectId::data("1"),
			&[AclRuleRequest::new("g/team").grant("u")],
		)
		.await
		.unwrap_err();
	assert_eq!(err.code(), ErrorCode::ObjectNotFound);
}

#[tokio::test]
async fn test_default_entry_listed_last() {
	let app = TestApp::new().await;
	let record = ObjectId::data("1");

	app.service
		.update_acl(
			&alice(),
			&record,
			&[
				AclRuleRequest::new("default").grant("l"),
				AclRuleRequest::new("u/carol").grant("v"),
				AclRuleRequest::new("u/bob").deny("r"),
			],
		)
		.await
		.unwrap();

	let subjects: Vec<String> = app
		.service
		.view_acl(&alice(), &record)
		.await
		.unwrap()
		.into_iter()
		.map(|entry| entry.subject)
		.collect();
	assert_eq!(subjects, vec!["u/bob", "u/carol", "default"]);
}

#[tokio::test]
async fn test_view_serializes_without_absent_fields() {
	let app = TestApp::new().await;
	let record = ObjectId::data("1");

	app.service
		.update_acl(&alice(), &record, &[AclRuleRequest::new("u/bob").grant("lv")])
		.await
		.unwrap();

	let entries = app.service.view_acl(&alice(), &record).await.unwrap();
	let json = serde_json::to_value(&entries).unwrap();
	let entry = json[0].as_object().unwrap();
	assert_eq!(entry["subject"], "u/bob");
	assert!(entry.contains_key("grant"));
	assert!(!entry.contains_key("deny"));
	assert!(!entry.contains_key("inh_grant"));
}

#[tokio::test]
async fn test_invalid_requests() {
	let app = TestApp::new().await;
	let record = ObjectId::data("1");

	let cases = [
		(AclRuleRequest::new("x/bob").grant("r"), ErrorCode::InvalidId),
		(AclRuleRequest::new("u/").grant("r"), ErrorCode::InvalidId),
		(AclRuleRequest::new("u/bob").grant("0x100"), ErrorCode::InvalidPermission),
		(AclRuleRequest::new("u/bob").grant("+"), ErrorCode::InvalidPermission),
		(AclRuleRequest::new("u/bob").grant("rq"), ErrorCode::InvalidPermission),
	];

	for (request, expected) in cases {
		let err = app
			.service
			.update_acl(&alice(), &record, &[request.clone()])
			.await
			.unwrap_err();
		assert_eq!(err.code(), expected, "request {request:?}");
	}
}

#[tokio::test]
async fn test_admin_bit_holder_may_update() {
	let app = TestApp::new().await;
	let record = ObjectId::data("1");
	let bob = UserId::from_key("bob");

	app.service
		.update_acl(&bob, &record, &[AclRuleRequest::new("u/carol").grant("v")])
		.await
		.unwrap_err();

	app.service
		.update_acl(&alice(), &record, &[AclRuleRequest::new("u/bob").grant("a")])
		.await
		.unwrap();
	app.service
		.update_acl(&bob, &record, &[AclRuleRequest::new("u/carol").grant("v")])
		.await
		.unwrap();

	assert_eq!(app.effective("carol", "d/1").await, Permissions::VIEW);
}
