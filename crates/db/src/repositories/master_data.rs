//! Master-data repository.
//!
//! Branches, functional areas, departments and employees share one shape:
//! a tenant-owned row with a code, a name and soft-delete audit columns.
//! [`MasterDataRepository`] implements their CRUD once over the
//! [`MasterData`] trait.

use std::marker::PhantomData;

use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, DbErr, EntityTrait,
    IntoActiveModel, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set,
    prelude::DateTimeWithTimeZone,
};
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

use tripdesk_shared::types::{
    BranchId, DepartmentId, EmployeeId, FunctionalAreaId, OrganizationId, PageRequest,
    PageResponse,
};

use crate::entities::{branches, departments, employees, functional_areas};

use super::contains_pattern;

/// Errors from master-data operations.
#[derive(Debug, Error)]
pub enum MasterDataError {
    /// Row not found, or soft-deleted, in the organization.
    #[error("{entity} not found: {id}")]
    NotFound {
        /// Table label.
        entity: &'static str,
        /// Requested id.
        id: Uuid,
    },

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl MasterDataError {
    /// Returns true if this is a not-found error.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// A tenant-owned, soft-deletable master-data table.
pub trait MasterData: EntityTrait {
    /// Fields accepted on create and update.
    type Input: Send;

    /// Label used in errors and logs.
    const LABEL: &'static str;

    /// Primary key column.
    fn id_column() -> Self::Column;
    /// Owning organization column.
    fn organization_column() -> Self::Column;
    /// Business code column.
    fn code_column() -> Self::Column;
    /// Display name column.
    fn name_column() -> Self::Column;
    /// Soft-delete flag column.
    fn is_deleted_column() -> Self::Column;
    /// Deleting actor column.
    fn deleted_by_column() -> Self::Column;
    /// Deletion time column.
    fn deleted_at_column() -> Self::Column;

    /// Builds a new row.
    fn new_row(
        id: Uuid,
        organization_id: Uuid,
        actor: Uuid,
        now: DateTimeWithTimeZone,
        input: Self::Input,
    ) -> Self::ActiveModel;

    /// Applies `input` to an existing row.
    fn apply(
        model: Self::Model,
        actor: Uuid,
        now: DateTimeWithTimeZone,
        input: Self::Input,
    ) -> Self::ActiveModel;
}

/// Generic CRUD over a [`MasterData`] table.
pub struct MasterDataRepository<E> {
    db: DatabaseConnection,
    entity: PhantomData<E>,
}

/// Branch repository.
pub type BranchRepository = MasterDataRepository<branches::Entity>;
/// Functional area repository.
pub type FunctionalAreaRepository = MasterDataRepository<functional_areas::Entity>;
/// Department repository.
pub type DepartmentRepository = MasterDataRepository<departments::Entity>;
/// Employee repository.
pub type EmployeeRepository = MasterDataRepository<employees::Entity>;

impl<E> MasterDataRepository<E>
where
    E: MasterData,
    E::Model: IntoActiveModel<E::ActiveModel> + Send + Sync,
    E::ActiveModel: Send,
{
    /// Creates a new repository instance.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self {
            db,
            entity: PhantomData,
        }
    }

    /// Inserts a new row.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails.
    pub async fn create(
        &self,
        organization_id: OrganizationId,
        actor: EmployeeId,
        input: E::Input,
    ) -> Result<E::Model, MasterDataError> {
        let id = Uuid::now_v7();
        let row = E::new_row(
            id,
            organization_id.into_inner(),
            actor.into_inner(),
            Utc::now().into(),
            input,
        );
        let model = row.insert(&self.db).await?;

        info!(
            entity = E::LABEL,
            id = %id,
            organization_id = %organization_id,
            "Master data created"
        );
        Ok(model)
    }

    /// Fetches an active row by id.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the row is missing, soft-deleted, or owned by
    /// another organization.
    pub async fn get(
        &self,
        organization_id: OrganizationId,
        id: Uuid,
    ) -> Result<E::Model, MasterDataError> {
        E::find()
            .filter(E::id_column().eq(id))
            .filter(E::organization_column().eq(organization_id.into_inner()))
            .filter(E::is_deleted_column().eq(false))
            .one(&self.db)
            .await?
            .ok_or(MasterDataError::NotFound {
                entity: E::LABEL,
                id,
            })
    }

    /// Returns true if an active row with this id exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn exists(
        &self,
        organization_id: OrganizationId,
        id: Uuid,
    ) -> Result<bool, MasterDataError> {
        let count = E::find()
            .filter(E::id_column().eq(id))
            .filter(E::organization_column().eq(organization_id.into_inner()))
            .filter(E::is_deleted_column().eq(false))
            .count(&self.db)
            .await?;
        Ok(count > 0)
    }

    /// Lists active rows ordered by code, optionally filtered by a code or
    /// name substring.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn list(
        &self,
        organization_id: OrganizationId,
        search: Option<&str>,
        page: PageRequest,
    ) -> Result<PageResponse<E::Model>, MasterDataError> {
        let mut query = E::find()
            .filter(E::organization_column().eq(organization_id.into_inner()))
            .filter(E::is_deleted_column().eq(false));

        if let Some(term) = search.map(str::trim).filter(|t| !t.is_empty()) {
            query = query.filter(
                Condition::any()
                    .add(E::code_column().like(contains_pattern(term)))
                    .add(E::name_column().like(contains_pattern(term))),
            );
        }

        let total = query.clone().count(&self.db).await?;
        let data = query
            .order_by_asc(E::code_column())
            .order_by_asc(E::id_column())
            .offset(page.offset())
            .limit(page.limit())
            .all(&self.db)
            .await?;

        Ok(PageResponse::new(data, page, total))
    }

    /// Replaces the editable fields of an active row.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the row is missing or soft-deleted.
    pub async fn update(
        &self,
        organization_id: OrganizationId,
        actor: EmployeeId,
        id: Uuid,
        input: E::Input,
    ) -> Result<E::Model, MasterDataError> {
        let existing = self.get(organization_id, id).await?;
        let row = E::apply(existing, actor.into_inner(), Utc::now().into(), input);
        let model = row.update(&self.db).await?;

        info!(entity = E::LABEL, id = %id, "Master data updated");
        Ok(model)
    }

    /// Soft-deletes an active row.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the row is missing or already deleted.
    pub async fn soft_delete(
        &self,
        organization_id: OrganizationId,
        actor: EmployeeId,
        id: Uuid,
    ) -> Result<(), MasterDataError> {
        let now: DateTimeWithTimeZone = Utc::now().into();
        let result = E::update_many()
            .col_expr(E::is_deleted_column(), Expr::value(true))
            .col_expr(E::deleted_by_column(), Expr::value(actor.into_inner()))
            .col_expr(E::deleted_at_column(), Expr::value(now))
            .filter(E::id_column().eq(id))
            .filter(E::organization_column().eq(organization_id.into_inner()))
            .filter(E::is_deleted_column().eq(false))
            .exec(&self.db)
            .await?;

        if result.rows_affected == 0 {
            return Err(MasterDataError::NotFound {
                entity: E::LABEL,
                id,
            });
        }

        info!(entity = E::LABEL, id = %id, "Master data soft-deleted");
        Ok(())
    }
}

// ============================================================================
// Inputs
// ============================================================================

/// Branch fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BranchInput {
    /// Business code.
    pub code: String,
    /// Display name.
    pub name: String,
}

/// Functional area fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionalAreaInput {
    /// Business code.
    pub code: String,
    /// Display name.
    pub name: String,
    /// Employee heading the area.
    pub head_employee_id: Option<EmployeeId>,
}

/// Department fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DepartmentInput {
    /// Business code.
    pub code: String,
    /// Display name.
    pub name: String,
    /// Functional area the department belongs to.
    pub functional_area_id: Option<FunctionalAreaId>,
}

/// Employee fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmployeeInput {
    /// Employee number.
    pub code: String,
    /// Full name.
    pub full_name: String,
    /// Work email.
    pub email: Option<String>,
    /// Home branch.
    pub branch_id: Option<BranchId>,
    /// Department.
    pub department_id: Option<DepartmentId>,
    /// Functional area.
    pub functional_area_id: Option<FunctionalAreaId>,
}

// ============================================================================
// Table bindings
// ============================================================================

impl MasterData for branches::Entity {
    type Input = BranchInput;
    const LABEL: &'static str = "branch";

    fn id_column() -> Self::Column {
        branches::Column::Id
    }
    fn organization_column() -> Self::Column {
        branches::Column::OrganizationId
    }
    fn code_column() -> Self::Column {
        branches::Column::Code
    }
    fn name_column() -> Self::Column {
        branches::Column::Name
    }
    fn is_deleted_column() -> Self::Column {
        branches::Column::IsDeleted
    }
    fn deleted_by_column() -> Self::Column {
        branches::Column::DeletedBy
    }
    fn deleted_at_column() -> Self::Column {
        branches::Column::DeletedAt
    }

    fn new_row(
        id: Uuid,
        organization_id: Uuid,
        actor: Uuid,
        now: DateTimeWithTimeZone,
        input: BranchInput,
    ) -> branches::ActiveModel {
        branches::ActiveModel {
            id: Set(id),
            organization_id: Set(organization_id),
            code: Set(input.code),
            name: Set(input.name),
            is_deleted: Set(false),
            created_by: Set(actor),
            created_at: Set(now),
            updated_by: Set(None),
            updated_at: Set(now),
            deleted_by: Set(None),
            deleted_at: Set(None),
        }
    }

    fn apply(
        model: branches::Model,
        actor: Uuid,
        now: DateTimeWithTimeZone,
        input: BranchInput,
    ) -> branches::ActiveModel {
        let mut row: branches::ActiveModel = model.into();
        row.code = Set(input.code);
        row.name = Set(input.name);
        row.updated_by = Set(Some(actor));
        row.updated_at = Set(now);
        row
    }
}

impl MasterData for functional_areas::Entity {
    type Input = FunctionalAreaInput;
    const LABEL: &'static str = "functional area";

    fn id_column() -> Self::Column {
        functional_areas::Column::Id
    }
    fn organization_column() -> Self::Column {
        functional_areas::Column::OrganizationId
    }
    fn code_column() -> Self::Column {
        functional_areas::Column::Code
    }
    fn name_column() -> Self::Column {
        functional_areas::Column::Name
    }
    fn is_deleted_column() -> Self::Column {
        functional_areas::Column::IsDeleted
    }
    fn deleted_by_column() -> Self::Column {
        functional_areas::Column::DeletedBy
    }
    fn deleted_at_column() -> Self::Column {
        functional_areas::Column::DeletedAt
    }

    fn new_row(
        id: Uuid,
        organization_id: Uuid,
        actor: Uuid,
        now: DateTimeWithTimeZone,
        input: FunctionalAreaInput,
    ) -> functional_areas::ActiveModel {
        functional_areas::ActiveModel {
            id: Set(id),
            organization_id: Set(organization_id),
            code: Set(input.code),
            name: Set(input.name),
            head_employee_id: Set(input.head_employee_id.map(EmployeeId::into_inner)),
            is_deleted: Set(false),
            created_by: Set(actor),
            created_at: Set(now),
            updated_by: Set(None),
            updated_at: Set(now),
            deleted_by: Set(None),
            deleted_at: Set(None),
        }
    }

    fn apply(
        model: functional_areas::Model,
        actor: Uuid,
        now: DateTimeWithTimeZone,
        input: FunctionalAreaInput,
    ) -> functional_areas::ActiveModel {
        let mut row: functional_areas::ActiveModel = model.into();
        row.code = Set(input.code);
        row.name = Set(input.name);
        row.head_employee_id = Set(input.head_employee_id.map(EmployeeId::into_inner));
        row.updated_by = Set(Some(actor));
        row.updated_at = Set(now);
        row
    }
}

impl MasterData for departments::Entity {
    type Input = DepartmentInput;
    const LABEL: &'static str = "department";

    fn id_column() -> Self::Column {
        departments::Column::Id
    }
    fn organization_column() -> Self::Column {
        departments::Column::OrganizationId
    }
    fn code_column() -> Self::Column {
        departments::Column::Code
    }
    fn name_column() -> Self::Column {
        departments::Column::Name
    }
    fn is_deleted_column() -> Self::Column {
        departments::Column::IsDeleted
    }
    fn deleted_by_column() -> Self::Column {
        departments::Column::DeletedBy
    }
    fn deleted_at_column() -> Self::Column {
        departments::Column::DeletedAt
    }

    fn new_row(
        id: Uuid,
        organization_id: Uuid,
        actor: Uuid,
        now: DateTimeWithTimeZone,
        input: DepartmentInput,
    ) -> departments::ActiveModel {
        departments::ActiveModel {
            id: Set(id),
            organization_id: Set(organization_id),
            code: Set(input.code),
            name: Set(input.name),
            functional_area_id: Set(input.functional_area_id.map(FunctionalAreaId::into_inner)),
            is_deleted: Set(false),
            created_by: Set(actor),
            created_at: Set(now),
            updated_by: Set(None),
            updated_at: Set(now),
            deleted_by: Set(None),
            deleted_at: Set(None),
        }
    }

    fn apply(
        model: departments::Model,
        actor: Uuid,
        now: DateTimeWithTimeZone,
        input: DepartmentInput,
    ) -> departments::ActiveModel {
        let mut row: departments::ActiveModel = model.into();
        row.code = Set(input.code);
        row.name = Set(input.name);
        row.functional_area_id = Set(input.functional_area_id.map(FunctionalAreaId::into_inner));
        row.updated_by = Set(Some(actor));
        row.updated_at = Set(now);
        row
    }
}

impl MasterData for employees::Entity {
    type Input = EmployeeInput;
    const LABEL: &'static str = "employee";

    fn id_column() -> Self::Column {
        employees::Column::Id
    }
    fn organization_column() -> Self::Column {
        employees::Column::OrganizationId
    }
    fn code_column() -> Self::Column {
        employees::Column::Code
    }
    fn name_column() -> Self::Column {
        employees::Column::FullName
    }
    fn is_deleted_column() -> Self::Column {
        employees::Column::IsDeleted
    }
    fn deleted_by_column() -> Self::Column {
        employees::Column::DeletedBy
    }
    fn deleted_at_column() -> Self::Column {
        employees::Column::DeletedAt
    }

    fn new_row(
        id: Uuid,
        organization_id: Uuid,
        actor: Uuid,
        now: DateTimeWithTimeZone,
        input: EmployeeInput,
    ) -> employees::ActiveModel {
        employees::ActiveModel {
            id: Set(id),
            organization_id: Set(organization_id),
            code: Set(input.code),
            full_name: Set(input.full_name),
            email: Set(input.email),
            branch_id: Set(input.branch_id.map(BranchId::into_inner)),
            department_id: Set(input.department_id.map(DepartmentId::into_inner)),
            functional_area_id: Set(input.functional_area_id.map(FunctionalAreaId::into_inner)),
            is_deleted: Set(false),
            created_by: Set(actor),
            created_at: Set(now),
            updated_by: Set(None),
            updated_at: Set(now),
            deleted_by: Set(None),
            deleted_at: Set(None),
        }
    }

    fn apply(
        model: employees::Model,
        actor: Uuid,
        now: DateTimeWithTimeZone,
        input: EmployeeInput,
    ) -> employees::ActiveModel {
        let mut row: employees::ActiveModel = model.into();
        row.code = Set(input.code);
        row.full_name = Set(input.full_name);
        row.email = Set(input.email);
        row.branch_id = Set(input.branch_id.map(BranchId::into_inner));
        row.department_id = Set(input.department_id.map(DepartmentId::into_inner));
        row.functional_area_id = Set(input.functional_area_id.map(FunctionalAreaId::into_inner));
        row.updated_by = Set(Some(actor));
        row.updated_at = Set(now);
        row
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_employee_row_is_active() {
        let now: DateTimeWithTimeZone = Utc::now().into();
        let org = Uuid::now_v7();
        let actor = Uuid::now_v7();
        let department = DepartmentId::new();

        let row = employees::Entity::new_row(
            Uuid::now_v7(),
            org,
            actor,
            now,
            EmployeeInput {
                code: "E-001".to_string(),
                full_name: "Rina Wijaya".to_string(),
                email: None,
                branch_id: None,
                department_id: Some(department),
                functional_area_id: None,
            },
        );

        assert_eq!(row.organization_id, Set(org));
        assert_eq!(row.is_deleted, Set(false));
        assert_eq!(row.created_by, Set(actor));
        assert_eq!(row.department_id, Set(Some(department.into_inner())));
    }

    #[test]
    fn test_apply_stamps_updater() {
        let now: DateTimeWithTimeZone = Utc::now().into();
        let actor = Uuid::now_v7();
        let model = branches::Model {
            id: Uuid::now_v7(),
            organization_id: Uuid::now_v7(),
            code: "JKT".to_string(),
            name: "Jakarta".to_string(),
            is_deleted: false,
            created_by: Uuid::now_v7(),
            created_at: now,
            updated_by: None,
            updated_at: now,
            deleted_by: None,
            deleted_at: None,
        };

        let row = branches::Entity::apply(
            model,
            actor,
            now,
            BranchInput {
                code: "JKT".to_string(),
                name: "Jakarta Pusat".to_string(),
            },
        );

        assert_eq!(row.name, Set("Jakarta Pusat".to_string()));
        assert_eq!(row.updated_by, Set(Some(actor)));
    }

    #[test]
    fn test_not_found_message() {
        let id = Uuid::nil();
        let err = MasterDataError::NotFound {
            entity: "department",
            id,
        };
        assert!(err.is_not_found());
        assert_eq!(
            err.to_string(),
            "department not found: 00000000-0000-0000-0000-000000000000"
        );
    }
}
