//! `SeaORM` Entity for `rule_headers` table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::RuleGroupMode;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "rule_headers")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub organization_id: Uuid,
    pub name: String,
    pub functional_area_id: Option<Uuid>,
    pub classification: String,
    pub group_rule: RuleGroupMode,
    pub employee_id: Option<Uuid>,
    pub branch_id: Option<Uuid>,
    pub is_deleted: bool,
    pub created_by: Uuid,
    pub created_at: DateTimeWithTimeZone,
    pub updated_by: Option<Uuid>,
    pub updated_at: DateTimeWithTimeZone,
    pub deleted_by: Option<Uuid>,
    pub deleted_at: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::rule_steps::Entity")]
    RuleSteps,
    #[sea_orm(
        belongs_to = "super::functional_areas::Entity",
        from = "Column::FunctionalAreaId",
        to = "super::functional_areas::Column::Id"
    )]
    FunctionalAreas,
    #[sea_orm(
        belongs_to = "super::employees::Entity",
        from = "Column::EmployeeId",
        to = "super::employees::Column::Id"
    )]
    Employees,
}

impl Related<super::rule_steps::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::RuleSteps.def()
    }
}

impl Related<super::functional_areas::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::FunctionalAreas.def()
    }
}

impl Related<super::employees::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Employees.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
