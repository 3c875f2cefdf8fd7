//! Postgres enum types.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Grouping mode of a rule header (`rule_group_mode`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "rule_group_mode")]
pub enum RuleGroupMode {
    #[sea_orm(string_value = "all")]
    All,
    #[sea_orm(string_value = "by_functional_area")]
    ByFunctionalArea,
    #[sea_orm(string_value = "by_employee")]
    ByEmployee,
}
