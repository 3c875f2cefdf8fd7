//! Repository abstractions for data access.
//!
//! Repositories provide a clean interface for database operations,
//! hiding the `SeaORM` implementation details from the rest of the application.

use sea_orm::sea_query::LikeExpr;

pub mod master_data;
pub mod rule_approval;

pub use master_data::{
    BranchInput, BranchRepository, DepartmentInput, DepartmentRepository, EmployeeInput,
    EmployeeRepository, FunctionalAreaInput, FunctionalAreaRepository, MasterData,
    MasterDataError, MasterDataRepository,
};
pub use rule_approval::{RuleApprovalRepository, RuleListFilter};

/// Builds a `LIKE` pattern that matches `term` as a literal substring.
///
/// `%`, `_` and `\` in the term are escaped.
pub(crate) fn contains_pattern(term: &str) -> LikeExpr {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for c in term.chars() {
        if matches!(c, '\\' | '%' | '_') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    LikeExpr::new(pattern).escape('\\')
}
