//! Typed IDs for type-safe entity references.
//!
//! Using typed IDs prevents accidentally passing a step id where a header id is expected.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Macro to generate typed ID wrappers.
macro_rules! typed_id {
    ($name:ident, $doc:expr) => {
        #[doc = $doc]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub Uuid);

        impl $name {
            /// Creates a new random ID using UUID v7 (time-ordered).
            #[must_use]
            pub fn new() -> Self {
                Self(Uuid::now_v7())
            }

            /// Creates an ID from an existing UUID.
            #[must_use]
            pub const fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// Returns the inner UUID.
            #[must_use]
            pub const fn into_inner(self) -> Uuid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<Uuid> for $name {
            fn from(uuid: Uuid) -> Self {
                Self(uuid)
            }
        }

        impl From<$name> for Uuid {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl std::str::FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Ok(Self(Uuid::parse_str(s)?))
            }
        }
    };
}

typed_id!(OrganizationId, "Unique identifier for a tenant organization.");
typed_id!(EmployeeId, "Unique identifier for an employee (also used for actors).");
typed_id!(BranchId, "Unique identifier for a branch office.");
typed_id!(FunctionalAreaId, "Unique identifier for a functional area.");
typed_id!(DepartmentId, "Unique identifier for a department.");
typed_id!(OrgUnitId, "Unique identifier for an organizational unit.");
typed_id!(RuleHeaderId, "Unique identifier for an approval rule header.");
typed_id!(RuleStepId, "Unique identifier for a step within an approval rule.");

#[cfg(test)]
#[path = "id_tests.rs"]
mod tests;
