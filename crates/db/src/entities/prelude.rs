//! Entity re-exports.

pub use super::branches::Entity as Branches;
pub use super::departments::Entity as Departments;
pub use super::employees::Entity as Employees;
pub use super::functional_areas::Entity as FunctionalAreas;
pub use super::rule_headers::Entity as RuleHeaders;
pub use super::rule_steps::Entity as RuleSteps;
