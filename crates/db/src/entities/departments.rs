//! `SeaORM` Entity for departments table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "departments")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub organization_id: Uuid,
    pub code: String,
    pub name: String,
    pub functional_area_id: Option<Uuid>,
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
        belongs_to = "super::functional_areas::Entity",
        from = "Column::FunctionalAreaId",
        to = "super::functional_areas::Column::Id"
    )]
    FunctionalAreas,
}

impl Related<super::functional_areas::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::FunctionalAreas.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
