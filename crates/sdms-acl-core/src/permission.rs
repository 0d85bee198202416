// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Permission bits and masks.
//!
//! [`PermissionBit`] is the single canonical table of letter codes and numeric
//! values. The rule parser, the evaluator and the wire format all go through it,
//! so the letter order `l v u a t n r w` always lines up with bits `0x01..0x80`.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{BitAnd, BitAndAssign, BitOr, BitOrAssign, Not};

/// A single permission on a record or collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum PermissionBit {
	/// Find the object and see its id, alias, title and owner.
	List = 0x01,
	/// Read record details and metadata.
	View = 0x02,
	/// Update record details and metadata.
	Update = 0x04,
	/// View and edit access rules.
	Admin = 0x08,
	/// Tag the object.
	Tag = 0x10,
	/// Annotate the object.
	Note = 0x20,
	/// Read raw data.
	ReadData = 0x40,
	/// Write raw data.
	WriteData = 0x80,
}

impl PermissionBit {
	/// All bits in letter order.
	pub const ALL: [PermissionBit; 8] = [
		PermissionBit::List,
		PermissionBit::View,
		PermissionBit::Update,
		PermissionBit::Admin,
		PermissionBit::Tag,
		PermissionBit::Note,
		PermissionBit::ReadData,
		PermissionBit::WriteData,
	];

	pub const fn bits(self) -> u8 {
		self as u8
	}

	pub const fn letter(self) -> char {
		match self {
			PermissionBit::List => 'l',
			PermissionBit::View => 'v',
			PermissionBit::Update => 'u',
			PermissionBit::Admin => 'a',
			PermissionBit::Tag => 't',
			PermissionBit::Note => 'n',
			PermissionBit::ReadData => 'r',
			PermissionBit::WriteData => 'w',
		}
	}

	pub fn from_letter(letter: char) -> Option<Self> {
		Self::ALL.into_iter().find(|bit| bit.letter() == letter)
	}

	pub const fn name(self) -> &'static str {
		match self {
			PermissionBit::List => "LIST",
			PermissionBit::View => "VIEW",
			PermissionBit::Update => "UPDATE",
			PermissionBit::Admin => "ADMIN",
			PermissionBit::Tag => "TAG",
			PermissionBit::Note => "NOTE",
			PermissionBit::ReadData => "READ_DATA",
			PermissionBit::WriteData => "WRITE_DATA",
		}
	}
}

impl fmt::Display for PermissionBit {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.name())
	}
}

/// A set of [`PermissionBit`]s, serialized as its numeric value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Permissions(u8);

impl Permissions {
	pub const NONE: Permissions = Permissions(0);
	pub const ALL: Permissions = Permissions(0xff);
	/// Granted to everyone on public collections and their descendants.
	pub const PUBLIC: Permissions = Permissions(
		PermissionBit::List.bits() | PermissionBit::View.bits() | PermissionBit::ReadData.bits(),
	);
	pub const LIST: Permissions = Permissions(PermissionBit::List.bits());
	pub const VIEW: Permissions = Permissions(PermissionBit::View.bits());
	pub const UPDATE: Permissions = Permissions(PermissionBit::Update.bits());
	pub const ADMIN: Permissions = Permissions(PermissionBit::Admin.bits());
	pub const TAG: Permissions = Permissions(PermissionBit::Tag.bits());
	pub const NOTE: Permissions = Permissions(PermissionBit::Note.bits());
	pub const READ_DATA: Permissions = Permissions(PermissionBit::ReadData.bits());
	pub const WRITE_DATA: Permissions = Permissions(PermissionBit::WriteData.bits());

	pub const fn from_bits(bits: u8) -> Self {
		Self(bits)
	}

	pub const fn bits(self) -> u8 {
		self.0
	}

	pub const fn is_empty(self) -> bool {
		self.0 == 0
	}

	/// True when every bit of `other` is present.
	pub const fn contains(self, other: Permissions) -> bool {
		self.0 & other.0 == other.0
	}

	/// True when at least one bit of `other` is present.
	pub const fn intersects(self, other: Permissions) -> bool {
		self.0 & other.0 != 0
	}

	pub const fn has(self, bit: PermissionBit) -> bool {
		self.0 & bit.bits() != 0
	}

	/// Bits of `self` that are not in `other`.
	pub const fn difference(self, other: Permissions) -> Permissions {
		Permissions(self.0 & !other.0)
	}

	pub fn iter(self) -> impl Iterator<Item = PermissionBit> {
		PermissionBit::ALL.into_iter().filter(move |bit| self.has(*bit))
	}

	/// Builds a mask from letter codes, or `None` if any letter is unknown.
	pub fn from_letters(letters: &str) -> Option<Self> {
		letters.chars().try_fold(Permissions::NONE, |acc, c| {
			PermissionBit::from_letter(c).map(|bit| acc | bit)
		})
	}

	/// Letter codes of the set bits, in canonical order.
	pub fn to_letters(self) -> String {
		self.iter().map(PermissionBit::letter).collect()
	}

	/// `None` for the empty mask, the storage form of "absent".
	pub fn non_zero(self) -> Option<Self> {
		if self.is_empty() {
			None
		} else {
			Some(self)
		}
	}
}

impl From<PermissionBit> for Permissions {
	fn from(bit: PermissionBit) -> Self {
		Permissions(bit.bits())
	}
}

impl BitOr for Permissions {
	type Output = Permissions;

	fn bitor(self, rhs: Permissions) -> Permissions {
		Permissions(self.0 | rhs.0)
	}
}

impl BitOr<PermissionBit> for Permissions {
	type Output = Permissions;

	fn bitor(self, rhs: PermissionBit) -> Permissions {
		Permissions(self.0 | rhs.bits())
	}
}

impl BitOrAssign for Permissions {
	fn bitor_assign(&mut self, rhs: Permissions) {
		self.0 |= rhs.0;
	}
}

impl BitAnd for Permissions {
	type Output = Permissions;

	fn bitand(self, rhs: Permissions) -> Permissions {
		Permissions(self.0 & rhs.0)
	}
}

impl BitAndAssign for Permissions {
	fn bitand_assign(&mut self, rhs: Permissions) {
		self.0 &= rhs.0;
	}
}

impl Not for Permissions {
	type Output = Permissions;

	fn not(self) -> Permissions {
		Permissions(!self.0)
	}
}

impl fmt::Display for Permissions {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{:#04x}", self.0)
	}
}
