//! `SeaORM` Entity for `functional_areas` table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "functional_areas")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub organization_id: Uuid,
    pub code: String,
    pub name: String,
    pub head_employee_id: Option<Uuid>,
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
        belongs_to = "super::employees::Entity",
        from = "Column::HeadEmployeeId",
        to = "super::employees::Column::Id"
    )]
    HeadEmployee,
}

impl Related<super::employees::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::HeadEmployee.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
