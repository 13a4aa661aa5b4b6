//! Occurrence role bitmask classification.

use scip::types::SymbolRole;
use serde::Serialize;

const DEFINITION: i32 = SymbolRole::Definition as i32;
const IMPORT: i32 = SymbolRole::Import as i32;
const WRITE_ACCESS: i32 = SymbolRole::WriteAccess as i32;
const READ_ACCESS: i32 = SymbolRole::ReadAccess as i32;
const GENERATED: i32 = SymbolRole::Generated as i32;
const TEST: i32 = SymbolRole::Test as i32;
const FORWARD_DEFINITION: i32 = SymbolRole::ForwardDefinition as i32;

/// The set of roles an occurrence plays, as stored in the index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(transparent)]
pub struct SymbolRoles(i32);

impl SymbolRoles {
    pub const DEFINITION: Self = Self(DEFINITION);
    pub const IMPORT: Self = Self(IMPORT);
    pub const WRITE_ACCESS: Self = Self(WRITE_ACCESS);
    pub const READ_ACCESS: Self = Self(READ_ACCESS);
    pub const GENERATED: Self = Self(GENERATED);
    pub const TEST: Self = Self(TEST);
    pub const FORWARD_DEFINITION: Self = Self(FORWARD_DEFINITION);

    pub const fn from_bits(bits: i32) -> Self {
        Self(bits)
    }

    pub const fn bits(self) -> i32 {
        self.0
    }

    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// True iff the definition bit is set, whatever else is.
    pub const fn is_definition(self) -> bool {
        self.contains(Self::DEFINITION)
    }

    /// Label for the most significant role.
    ///
    /// Bits are tested as definition, write, read, import; an occurrence with
    /// none of those is a plain reference.
    pub fn describe(self) -> &'static str {
        if self.contains(Self::DEFINITION) {
            "definition"
        } else if self.contains(Self::WRITE_ACCESS) {
            "write"
        } else if self.contains(Self::READ_ACCESS) {
            "read"
        } else if self.contains(Self::IMPORT) {
            "import"
        } else {
            "reference"
        }
    }
}

impl std::ops::BitOr for SymbolRoles {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}
