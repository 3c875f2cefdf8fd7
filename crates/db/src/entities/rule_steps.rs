//! `SeaORM` Entity for `rule_steps` table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "rule_steps")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub organization_id: Uuid,
    pub rule_header_id: Uuid,
    pub functional_area_id: Option<Uuid>,
    pub org_unit_id: Option<Uuid>,
    pub department_id: Option<Uuid>,
    pub approval_type: String,
    pub urut: Option<i32>,
    pub approval_group: i32,
    pub rejection_feedback: Option<String>,
    pub approval_line: i32,
    pub employee_id: Option<Uuid>,
    pub use_esign: bool,
    pub esign_caption: Option<String>,
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
    #[sea_orm(
        belongs_to = "super::rule_headers::Entity",
        from = "Column::RuleHeaderId",
        to = "super::rule_headers::Column::Id"
    )]
    RuleHeaders,
}

impl Related<super::rule_headers::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::RuleHeaders.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
