// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Accumulation of inheritable masks along the ancestor chain.

use crate::permission::Permissions;

use super::types::{AncestorAttrs, ClientAttrs};

/// Grant and deny bits contributed by ancestor collections.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InheritedMask {
	pub grant: Permissions,
	pub deny: Permissions,
}

/// ORs together the inheritable masks of every ancestor.
///
/// Each ancestor contributes its own `inh_grant`/`inh_deny`, those of any ACL
/// edge to the client or one of its groups, and [`Permissions::PUBLIC`] as a
/// grant when it is public. The whole chain is accumulated; a deny near the
/// object does not stop grants further up from being collected.
pub fn inherited_mask(ancestors: &[AncestorAttrs], client: &ClientAttrs) -> InheritedMask {
	let mut mask = InheritedMask::default();

	for ancestor in ancestors {
		mask.grant |= ancestor.masks.inh_grant();
		mask.deny |= ancestor.masks.inh_deny();

		if ancestor.public {
			mask.grant |= Permissions::PUBLIC;
		}

		for rule in ancestor.rules.iter().filter(|r| client.matches(&r.subject)) {
			mask.grant |= rule.masks.inh_grant();
			mask.deny |= rule.masks.inh_deny();
		}
	}

	mask
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::rule::{AclRule, RuleMasks};
	use crate::types::{GroupId, ObjectId, SubjectId, UserId};

	fn client() -> ClientAttrs {
		ClientAttrs::new(UserId::from_key("x")).with_groups([GroupId::parse("g/proj1:team").unwrap()])
	}

	fn collection(key: &str, inh_grant: Permissions, inh_deny: Permissions) -> AncestorAttrs {
		let mut ancestor = AncestorAttrs::new(ObjectId::collection(key));
		ancestor.masks = RuleMasks {
			inh_grant: inh_grant.non_zero(),
			inh_deny: inh_deny.non_zero(),
			..RuleMasks::CLOSED
		};
		ancestor
	}

	fn rule(object: &ObjectId, subject: &str, inh_grant: Permissions, inh_deny: Permissions) -> AclRule {
		AclRule {
			object_id: object.clone(),
			subject: SubjectId::parse(subject).unwrap(),
			masks: RuleMasks {
				inh_grant: inh_grant.non_zero(),
				inh_deny: inh_deny.non_zero(),
				..RuleMasks::CLOSED
			},
		}
	}

	#[test]
	fn empty_chain_contributes_nothing() {
		assert_eq!(inherited_mask(&[], &client()), InheritedMask::default());
	}

	#[test]
	fn accumulates_entire_chain() {
		let near = collection("b", Permissions::NONE, Permissions::UPDATE);
		let far = collection("a", Permissions::VIEW, Permissions::NONE);

		let mask = inherited_mask(&[near, far], &client());
		assert_eq!(mask.grant, Permissions::VIEW);
		assert_eq!(mask.deny, Permissions::UPDATE);
	}

	#[test]
	fn only_matching_edges_contribute() {
		let mut ancestor = collection("a", Permissions::NONE, Permissions::NONE);
		let id = ancestor.id.clone();
		ancestor.rules = vec![
			rule(&id, "u/x", Permissions::LIST, Permissions::NONE),
			rule(&id, "g/proj1:team", Permissions::TAG, Permissions::NONE),
			rule(&id, "u/other", Permissions::ALL, Permissions::NONE),
			rule(&id, "g/proj2:team", Permissions::NONE, Permissions::ALL),
		];

		let mask = inherited_mask(&[ancestor], &client());
		assert_eq!(mask.grant, Permissions::LIST | Permissions::TAG);
		assert_eq!(mask.deny, Permissions::NONE);
	}

	#[test]
	fn public_ancestor_grants_public_mask() {
		let mut ancestor = collection("pub", Permissions::NONE, Permissions::NONE);
		ancestor.public = true;

		let mask = inherited_mask(&[ancestor], &client());
		assert_eq!(mask.grant, Permissions::PUBLIC);
	}

	#[test]
	fn local_grant_and_deny_are_not_inherited() {
		let mut ancestor = collection("a", Permissions::NONE, Permissions::NONE);
		ancestor.masks.grant = Some(Permissions::ALL);
		ancestor.masks.deny = Some(Permissions::ALL);

		assert_eq!(inherited_mask(&[ancestor], &client()), InheritedMask::default());
	}
}
