//! Rule-approval repository.
//!
//! Persists rule headers and their steps, and answers the two runtime
//! questions of the approval workflow: which rule applies to a transaction,
//! and who approves next. Matching, sequencing and step reconciliation are
//! delegated to `tripdesk_core::approval`; this module only loads and writes
//! rows.

use std::collections::{HashMap, HashSet};

use chrono::Utc;
use sea_orm::prelude::DateTimeWithTimeZone;
use sea_orm::sea_query::{Expr, OnConflict};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set,
};
use tracing::{debug, info, warn};
use uuid::Uuid;

use tripdesk_core::approval::{
    ApprovalError, Audit, GroupRule, MatchContext, PlannedStep, ReconcilePlan, RuleHeader,
    RuleHeaderInput, RuleHeaderView, RuleMatcher, RuleStep, RuleStepDetail, RuleStepInput,
    RuleWithSteps, StepReconciler, StepSequencer,
};
use tripdesk_shared::types::{
    BranchId, DepartmentId, EmployeeId, FunctionalAreaId, OrgUnitId, OrganizationId, PageRequest,
    PageResponse, RuleHeaderId, RuleStepId,
};

use crate::entities::{
    employees, functional_areas, rule_headers, rule_steps, sea_orm_active_enums::RuleGroupMode,
};
use crate::rls::RlsExt;

use super::contains_pattern;
use super::master_data::{
    DepartmentRepository, EmployeeRepository, FunctionalAreaRepository, MasterDataError,
};

/// Filter for listing rule headers.
#[derive(Debug, Clone, Default)]
pub struct RuleListFilter {
    /// Only headers of this classification.
    pub classification: Option<String>,
    /// Only headers with this grouping mode.
    pub group_rule: Option<GroupRule>,
    /// Substring of the header name.
    pub search: Option<String>,
}

/// Repository for approval rules and their steps.
#[derive(Debug, Clone)]
pub struct RuleApprovalRepository {
    db: DatabaseConnection,
}

impl RuleApprovalRepository {
    /// Creates a new rule-approval repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    // ========================================================================
    // Rule store
    // ========================================================================

    /// Creates a header and its steps in one transaction.
    ///
    /// # Errors
    ///
    /// - `InvalidSteps` if a step id is repeated or already used elsewhere
    /// - `Database` if a write fails; nothing is persisted in that case
    pub async fn create_rule(
        &self,
        organization_id: OrganizationId,
        actor: EmployeeId,
        header: RuleHeaderInput,
        steps: Vec<RuleStepInput>,
    ) -> Result<RuleWithSteps, ApprovalError> {
        let plan = StepReconciler::plan(&[], steps)?;

        let rule_id = RuleHeaderId::new();
        let now: DateTimeWithTimeZone = Utc::now().into();

        let rls = self.db.with_rls(organization_id).await.map_err(db_error)?;
        let txn = rls.transaction();
        ensure_step_ids_free(txn, &plan).await?;

        rule_headers::ActiveModel {
            id: Set(rule_id.into_inner()),
            organization_id: Set(organization_id.into_inner()),
            name: Set(header.name),
            functional_area_id: Set(header.functional_area_id.map(FunctionalAreaId::into_inner)),
            classification: Set(header.classification),
            group_rule: Set(group_rule_to_db(header.group_rule)),
            employee_id: Set(header.employee_id.map(EmployeeId::into_inner)),
            branch_id: Set(header.branch_id.map(BranchId::into_inner)),
            is_deleted: Set(false),
            created_by: Set(actor.into_inner()),
            created_at: Set(now),
            updated_by: Set(None),
            updated_at: Set(now),
            deleted_by: Set(None),
            deleted_at: Set(None),
        }
        .insert(txn)
        .await
        .map_err(db_error)?;

        upsert_steps(txn, organization_id, rule_id, actor, now, &plan.upserts)
            .await
            .map_err(db_error)?;

        rls.commit().await.map_err(db_error)?;

        info!(
            org_id = %organization_id,
            rule_id = %rule_id,
            steps = plan.upserts.len(),
            "Approval rule created"
        );

        self.get_rule(organization_id, rule_id).await
    }

    /// Rewrites a header and reconciles its steps in one transaction.
    ///
    /// Submitted steps are upserted by id (reviving soft-deleted ones); active
    /// steps missing from the submission are soft-deleted.
    ///
    /// Idempotence is keyed on step ids. A step submitted without an id gets a
    /// fresh one, so resubmitting the same id-less list replaces the earlier
    /// steps; callers resubmit the ids returned in [`RuleWithSteps::steps`].
    ///
    /// # Errors
    ///
    /// - `RuleNotFound` if the header is missing, deleted or in another organization
    /// - `InvalidSteps` if a step id is repeated or owned by another header
    /// - `Database` if a write fails; nothing is persisted in that case
    pub async fn update_rule(
        &self,
        organization_id: OrganizationId,
        actor: EmployeeId,
        rule_id: RuleHeaderId,
        header: RuleHeaderInput,
        steps: Vec<RuleStepInput>,
    ) -> Result<RuleWithSteps, ApprovalError> {
        let rls = self.db.with_rls(organization_id).await.map_err(db_error)?;
        let txn = rls.transaction();

        let existing = rule_headers::Entity::find_by_id(rule_id.into_inner())
            .filter(rule_headers::Column::OrganizationId.eq(organization_id.into_inner()))
            .filter(rule_headers::Column::IsDeleted.eq(false))
            .one(txn)
            .await
            .map_err(db_error)?
            .ok_or(ApprovalError::RuleNotFound(rule_id))?;

        let existing_steps: Vec<RuleStep> = rule_steps::Entity::find()
            .filter(rule_steps::Column::RuleHeaderId.eq(rule_id.into_inner()))
            .all(txn)
            .await
            .map_err(db_error)?
            .into_iter()
            .map(step_from_model)
            .collect();

        let plan = StepReconciler::plan(&existing_steps, steps)?;
        ensure_step_ids_free(txn, &plan).await?;

        let now: DateTimeWithTimeZone = Utc::now().into();

        let mut active: rule_headers::ActiveModel = existing.into();
        active.name = Set(header.name);
        active.functional_area_id = Set(header.functional_area_id.map(FunctionalAreaId::into_inner));
        active.classification = Set(header.classification);
        active.group_rule = Set(group_rule_to_db(header.group_rule));
        active.employee_id = Set(header.employee_id.map(EmployeeId::into_inner));
        active.branch_id = Set(header.branch_id.map(BranchId::into_inner));
        active.updated_by = Set(Some(actor.into_inner()));
        active.updated_at = Set(now);
        active.update(txn).await.map_err(db_error)?;

        soft_delete_steps(txn, rule_id, actor, now, &plan.soft_deletes)
            .await
            .map_err(db_error)?;
        upsert_steps(txn, organization_id, rule_id, actor, now, &plan.upserts)
            .await
            .map_err(db_error)?;

        rls.commit().await.map_err(db_error)?;

        info!(
            org_id = %organization_id,
            rule_id = %rule_id,
            upserted = plan.upserts.len(),
            inserted = plan.inserted_count(),
            soft_deleted = plan.soft_deletes.len(),
            "Approval rule updated"
        );

        self.get_rule(organization_id, rule_id).await
    }

    /// Soft-deletes a header. Its steps are left untouched.
    ///
    /// # Errors
    ///
    /// Returns `RuleNotFound` if the header is missing or already deleted.
    pub async fn soft_delete_rule(
        &self,
        organization_id: OrganizationId,
        actor: EmployeeId,
        rule_id: RuleHeaderId,
    ) -> Result<(), ApprovalError> {
        let now: DateTimeWithTimeZone = Utc::now().into();
        let rls = self.db.with_rls(organization_id).await.map_err(db_error)?;

        let result = rule_headers::Entity::update_many()
            .col_expr(rule_headers::Column::IsDeleted, Expr::value(true))
            .col_expr(rule_headers::Column::DeletedBy, Expr::value(actor.into_inner()))
            .col_expr(rule_headers::Column::DeletedAt, Expr::value(now))
            .filter(rule_headers::Column::Id.eq(rule_id.into_inner()))
            .filter(rule_headers::Column::OrganizationId.eq(organization_id.into_inner()))
            .filter(rule_headers::Column::IsDeleted.eq(false))
            .exec(rls.transaction())
            .await
            .map_err(db_error)?;

        if result.rows_affected == 0 {
            rls.rollback().await.map_err(db_error)?;
            return Err(ApprovalError::RuleNotFound(rule_id));
        }

        rls.commit().await.map_err(db_error)?;

        info!(org_id = %organization_id, rule_id = %rule_id, "Approval rule soft-deleted");
        Ok(())
    }

    /// Fetches a header, deleted or not, with its active steps in chain order.
    ///
    /// # Errors
    ///
    /// Returns `RuleNotFound` if no header with this id exists in the organization.
    pub async fn get_rule(
        &self,
        organization_id: OrganizationId,
        rule_id: RuleHeaderId,
    ) -> Result<RuleWithSteps, ApprovalError> {
        let header = self.find_header(organization_id, rule_id).await?;
        let steps = self.load_chain(organization_id, rule_id, None).await?;

        Ok(RuleWithSteps { header, steps })
    }

    /// Lists active headers with their scope label.
    ///
    /// # Errors
    ///
    /// Returns `Database` if the query fails.
    pub async fn list_rules(
        &self,
        organization_id: OrganizationId,
        filter: &RuleListFilter,
        page: PageRequest,
    ) -> Result<PageResponse<RuleHeaderView>, ApprovalError> {
        let mut query = rule_headers::Entity::find()
            .filter(rule_headers::Column::OrganizationId.eq(organization_id.into_inner()))
            .filter(rule_headers::Column::IsDeleted.eq(false));

        if let Some(classification) = &filter.classification {
            query = query.filter(rule_headers::Column::Classification.eq(classification.as_str()));
        }
        if let Some(group_rule) = filter.group_rule {
            query = query.filter(rule_headers::Column::GroupRule.eq(group_rule_to_db(group_rule)));
        }
        if let Some(term) = filter.search.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
            query = query.filter(rule_headers::Column::Name.like(contains_pattern(term)));
        }

        let total = query.clone().count(&self.db).await.map_err(db_error)?;
        let headers: Vec<RuleHeader> = query
            .order_by_asc(rule_headers::Column::Classification)
            .order_by_asc(rule_headers::Column::Name)
            .order_by_asc(rule_headers::Column::Id)
            .offset(page.offset())
            .limit(page.limit())
            .all(&self.db)
            .await
            .map_err(db_error)?
            .into_iter()
            .map(header_from_model)
            .collect();

        let labels = self.scope_labels(&headers).await;

        Ok(PageResponse::new(headers, page, total).map(|header| {
            let scope = scope_id(&header);
            let name = scope.and_then(|id| labels.get(&id)).map(String::as_str);
            RuleHeaderView {
                group_value: header.group_rule.group_value(name, scope),
                header,
            }
        }))
    }

    // ========================================================================
    // Rule matcher
    // ========================================================================

    /// Finds the single active header that applies to `ctx`.
    ///
    /// # Errors
    ///
    /// - `NoRuleConfigured` if no header applies
    /// - `AmbiguousRule` if more than one header applies
    pub async fn match_rule(&self, ctx: &MatchContext) -> Result<RuleHeader, ApprovalError> {
        let mut query = rule_headers::Entity::find()
            .filter(rule_headers::Column::OrganizationId.eq(ctx.organization_id.into_inner()))
            .filter(rule_headers::Column::Classification.eq(ctx.classification.as_str()))
            .filter(rule_headers::Column::GroupRule.eq(group_rule_to_db(ctx.grouping_mode)))
            .filter(rule_headers::Column::IsDeleted.eq(false));

        match ctx.grouping_mode {
            GroupRule::All => {}
            GroupRule::ByFunctionalArea => {
                if let Some(area) = ctx.functional_area_id {
                    query = query
                        .filter(rule_headers::Column::FunctionalAreaId.eq(area.into_inner()));
                }
            }
            GroupRule::ByEmployee => {
                if let Some(actor) = ctx.actor_id {
                    query = query.filter(rule_headers::Column::EmployeeId.eq(actor.into_inner()));
                }
            }
        }

        let candidates: Vec<RuleHeader> = query
            .order_by_asc(rule_headers::Column::CreatedAt)
            .order_by_asc(rule_headers::Column::Id)
            .all(&self.db)
            .await
            .map_err(db_error)?
            .into_iter()
            .map(header_from_model)
            .collect();

        let selected = RuleMatcher::select(&candidates, ctx)?.clone();

        debug!(
            org_id = %ctx.organization_id,
            classification = %ctx.classification,
            grouping_mode = %ctx.grouping_mode,
            rule_id = %selected.id,
            "Approval rule matched"
        );
        Ok(selected)
    }

    /// Matches the rule for `ctx` and returns it with the chain of
    /// `ctx.approval_type` (every type when unset).
    ///
    /// # Errors
    ///
    /// Same as [`Self::match_rule`].
    pub async fn resolve_chain(&self, ctx: &MatchContext) -> Result<RuleWithSteps, ApprovalError> {
        let header = self.match_rule(ctx).await?;
        let steps = self
            .load_chain(ctx.organization_id, header.id, ctx.approval_type.as_deref())
            .await?;

        Ok(RuleWithSteps { header, steps })
    }

    // ========================================================================
    // Step sequencer
    // ========================================================================

    /// Returns the step that follows `current_step_id` in the
    /// `approval_type` chain of the same header.
    ///
    /// `Ok(None)` means the chain is exhausted.
    ///
    /// # Errors
    ///
    /// Returns `StepNotFound` if no step with this id exists.
    pub async fn next_step(
        &self,
        organization_id: OrganizationId,
        current_step_id: RuleStepId,
        approval_type: &str,
    ) -> Result<Option<RuleStep>, ApprovalError> {
        let current = self.find_step(organization_id, current_step_id).await?;
        let target = StepSequencer::target_position(&current, approval_type);

        let candidates: Vec<RuleStep> = rule_steps::Entity::find()
            .filter(rule_steps::Column::OrganizationId.eq(organization_id.into_inner()))
            .filter(rule_steps::Column::RuleHeaderId.eq(current.rule_header_id.into_inner()))
            .filter(rule_steps::Column::ApprovalType.eq(approval_type))
            .filter(rule_steps::Column::Urut.eq(target))
            .filter(rule_steps::Column::IsDeleted.eq(false))
            .all(&self.db)
            .await
            .map_err(db_error)?
            .into_iter()
            .map(step_from_model)
            .collect();

        let next = StepSequencer::next_step(&candidates, &current, approval_type).cloned();

        debug!(
            org_id = %organization_id,
            step_id = %current_step_id,
            approval_type,
            target,
            next = ?next.as_ref().map(|s| s.id),
            "Next approval step resolved"
        );
        Ok(next)
    }

    /// Active steps of a header in chain order, optionally of one approval type.
    ///
    /// # Errors
    ///
    /// Returns `RuleNotFound` if the header does not exist.
    pub async fn list_steps(
        &self,
        organization_id: OrganizationId,
        rule_id: RuleHeaderId,
        approval_type: Option<&str>,
    ) -> Result<Vec<RuleStep>, ApprovalError> {
        self.find_header(organization_id, rule_id).await?;
        self.load_chain(organization_id, rule_id, approval_type).await
    }

    /// Fetches a step, deleted or not, with display fields from master data.
    ///
    /// Lookups that fail leave their field empty.
    ///
    /// # Errors
    ///
    /// Returns `StepNotFound` if no step with this id exists.
    pub async fn resolve_step(
        &self,
        organization_id: OrganizationId,
        step_id: RuleStepId,
    ) -> Result<RuleStepDetail, ApprovalError> {
        let step = self.find_step(organization_id, step_id).await?;

        let employee_name = match step.employee_id {
            Some(id) => EmployeeRepository::new(self.db.clone())
                .get(organization_id, id.into_inner())
                .await
                .map(|e| e.full_name)
                .map_err(|e| omit_enrichment("employee_name", step_id, &e))
                .ok(),
            None => None,
        };

        let department_name = match step.department_id {
            Some(id) => DepartmentRepository::new(self.db.clone())
                .get(organization_id, id.into_inner())
                .await
                .map(|d| d.name)
                .map_err(|e| omit_enrichment("department_name", step_id, &e))
                .ok(),
            None => None,
        };

        let is_head_of_functional_area = match (step.functional_area_id, step.employee_id) {
            (Some(area), Some(employee)) => FunctionalAreaRepository::new(self.db.clone())
                .get(organization_id, area.into_inner())
                .await
                .map(|fa| fa.head_employee_id == Some(employee.into_inner()))
                .map_err(|e| omit_enrichment("is_head_of_functional_area", step_id, &e))
                .unwrap_or(false),
            _ => false,
        };

        Ok(RuleStepDetail {
            step,
            employee_name,
            department_name,
            is_head_of_functional_area,
        })
    }

    // ========================================================================
    // Helpers
    // ========================================================================

    async fn find_header(
        &self,
        organization_id: OrganizationId,
        rule_id: RuleHeaderId,
    ) -> Result<RuleHeader, ApprovalError> {
        rule_headers::Entity::find_by_id(rule_id.into_inner())
            .filter(rule_headers::Column::OrganizationId.eq(organization_id.into_inner()))
            .one(&self.db)
            .await
            .map_err(db_error)?
            .map(header_from_model)
            .ok_or(ApprovalError::RuleNotFound(rule_id))
    }

    async fn find_step(
        &self,
        organization_id: OrganizationId,
        step_id: RuleStepId,
    ) -> Result<RuleStep, ApprovalError> {
        rule_steps::Entity::find_by_id(step_id.into_inner())
            .filter(rule_steps::Column::OrganizationId.eq(organization_id.into_inner()))
            .one(&self.db)
            .await
            .map_err(db_error)?
            .map(step_from_model)
            .ok_or(ApprovalError::StepNotFound(step_id))
    }

    async fn load_chain(
        &self,
        organization_id: OrganizationId,
        rule_id: RuleHeaderId,
        approval_type: Option<&str>,
    ) -> Result<Vec<RuleStep>, ApprovalError> {
        let mut query = rule_steps::Entity::find()
            .filter(rule_steps::Column::OrganizationId.eq(organization_id.into_inner()))
            .filter(rule_steps::Column::RuleHeaderId.eq(rule_id.into_inner()))
            .filter(rule_steps::Column::IsDeleted.eq(false));

        if let Some(approval_type) = approval_type {
            query = query.filter(rule_steps::Column::ApprovalType.eq(approval_type));
        }

        let rows = query.all(&self.db).await.map_err(db_error)?;
        Ok(StepSequencer::into_chain(
            rows.into_iter().map(step_from_model).collect(),
            approval_type,
        ))
    }

    /// Resolves functional-area and employee names for scoped headers.
    ///
    /// Misses and failures are skipped; the label falls back to the raw id.
    async fn scope_labels(&self, headers: &[RuleHeader]) -> HashMap<Uuid, String> {
        let mut area_ids = HashSet::new();
        let mut employee_ids = HashSet::new();
        for header in headers {
            match (header.group_rule, scope_id(header)) {
                (GroupRule::ByFunctionalArea, Some(id)) => {
                    area_ids.insert(id);
                }
                (GroupRule::ByEmployee, Some(id)) => {
                    employee_ids.insert(id);
                }
                _ => {}
            }
        }

        let mut labels = HashMap::new();

        if !area_ids.is_empty() {
            match functional_areas::Entity::find()
                .filter(functional_areas::Column::Id.is_in(area_ids))
                .all(&self.db)
                .await
            {
                Ok(rows) => labels.extend(rows.into_iter().map(|fa| (fa.id, fa.name))),
                Err(e) => warn!(error = %e, "Functional area labels unavailable"),
            }
        }

        if !employee_ids.is_empty() {
            match employees::Entity::find()
                .filter(employees::Column::Id.is_in(employee_ids))
                .all(&self.db)
                .await
            {
                Ok(rows) => labels.extend(rows.into_iter().map(|e| (e.id, e.full_name))),
                Err(e) => warn!(error = %e, "Employee labels unavailable"),
            }
        }

        labels
    }
}

// ============================================================================
// Writes shared by create and update
// ============================================================================

/// Rejects new step ids that already exist under any header.
async fn ensure_step_ids_free<C: ConnectionTrait>(
    conn: &C,
    plan: &ReconcilePlan,
) -> Result<(), ApprovalError> {
    let new_ids: Vec<Uuid> = plan
        .upserts
        .iter()
        .filter(|p| p.is_new)
        .map(|p| p.id.into_inner())
        .collect();
    if new_ids.is_empty() {
        return Ok(());
    }

    let taken = rule_steps::Entity::find()
        .filter(rule_steps::Column::Id.is_in(new_ids))
        .one(conn)
        .await
        .map_err(db_error)?;

    match taken {
        Some(row) => Err(ApprovalError::InvalidSteps(format!(
            "step {} belongs to another rule",
            row.id
        ))),
        None => Ok(()),
    }
}

async fn upsert_steps<C: ConnectionTrait>(
    conn: &C,
    organization_id: OrganizationId,
    rule_id: RuleHeaderId,
    actor: EmployeeId,
    now: DateTimeWithTimeZone,
    planned: &[PlannedStep],
) -> Result<(), DbErr> {
    if planned.is_empty() {
        return Ok(());
    }

    let rows = planned.iter().map(|p| {
        let input = &p.input;
        rule_steps::ActiveModel {
            id: Set(p.id.into_inner()),
            organization_id: Set(organization_id.into_inner()),
            rule_header_id: Set(rule_id.into_inner()),
            functional_area_id: Set(input.functional_area_id.map(FunctionalAreaId::into_inner)),
            org_unit_id: Set(input.org_unit_id.map(OrgUnitId::into_inner)),
            department_id: Set(input.department_id.map(DepartmentId::into_inner)),
            approval_type: Set(input.approval_type.clone()),
            urut: Set(input.urut),
            approval_group: Set(input.approval_group),
            rejection_feedback: Set(input.rejection_feedback.clone()),
            approval_line: Set(input.approval_line),
            employee_id: Set(input.employee_id.map(EmployeeId::into_inner)),
            use_esign: Set(input.use_esign),
            esign_caption: Set(input.esign_caption.clone()),
            is_deleted: Set(false),
            created_by: Set(actor.into_inner()),
            created_at: Set(now),
            updated_by: Set(Some(actor.into_inner())),
            updated_at: Set(now),
            deleted_by: Set(None),
            deleted_at: Set(None),
        }
    });

    rule_steps::Entity::insert_many(rows)
        .on_conflict(
            OnConflict::column(rule_steps::Column::Id)
                .update_columns([
                    rule_steps::Column::FunctionalAreaId,
                    rule_steps::Column::OrgUnitId,
                    rule_steps::Column::DepartmentId,
                    rule_steps::Column::ApprovalType,
                    rule_steps::Column::Urut,
                    rule_steps::Column::ApprovalGroup,
                    rule_steps::Column::RejectionFeedback,
                    rule_steps::Column::ApprovalLine,
                    rule_steps::Column::EmployeeId,
                    rule_steps::Column::UseEsign,
                    rule_steps::Column::EsignCaption,
                    rule_steps::Column::IsDeleted,
                    rule_steps::Column::UpdatedBy,
                    rule_steps::Column::UpdatedAt,
                    rule_steps::Column::DeletedBy,
                    rule_steps::Column::DeletedAt,
                ])
                .to_owned(),
        )
        .exec_without_returning(conn)
        .await?;

    Ok(())
}

async fn soft_delete_steps<C: ConnectionTrait>(
    conn: &C,
    rule_id: RuleHeaderId,
    actor: EmployeeId,
    now: DateTimeWithTimeZone,
    step_ids: &[RuleStepId],
) -> Result<(), DbErr> {
    if step_ids.is_empty() {
        return Ok(());
    }

    rule_steps::Entity::update_many()
        .col_expr(rule_steps::Column::IsDeleted, Expr::value(true))
        .col_expr(rule_steps::Column::DeletedBy, Expr::value(actor.into_inner()))
        .col_expr(rule_steps::Column::DeletedAt, Expr::value(now))
        .filter(rule_steps::Column::Id.is_in(step_ids.iter().copied().map(RuleStepId::into_inner)))
        .filter(rule_steps::Column::RuleHeaderId.eq(rule_id.into_inner()))
        .filter(rule_steps::Column::IsDeleted.eq(false))
        .exec(conn)
        .await?;

    Ok(())
}

// ============================================================================
// Row conversions
// ============================================================================

fn db_error(err: DbErr) -> ApprovalError {
    ApprovalError::Database(err.to_string())
}

fn omit_enrichment(field: &'static str, step_id: RuleStepId, err: &MasterDataError) {
    if err.is_not_found() {
        debug!(field, step_id = %step_id, error = %err, "Step enrichment skipped");
    } else {
        warn!(field, step_id = %step_id, error = %err, "Step enrichment failed");
    }
}

fn scope_id(header: &RuleHeader) -> Option<Uuid> {
    match header.group_rule {
        GroupRule::All => None,
        GroupRule::ByFunctionalArea => header.functional_area_id.map(FunctionalAreaId::into_inner),
        GroupRule::ByEmployee => header.employee_id.map(EmployeeId::into_inner),
    }
}

fn group_rule_to_db(mode: GroupRule) -> RuleGroupMode {
    match mode {
        GroupRule::All => RuleGroupMode::All,
        GroupRule::ByFunctionalArea => RuleGroupMode::ByFunctionalArea,
        GroupRule::ByEmployee => RuleGroupMode::ByEmployee,
    }
}

fn group_rule_from_db(mode: RuleGroupMode) -> GroupRule {
    match mode {
        RuleGroupMode::All => GroupRule::All,
        RuleGroupMode::ByFunctionalArea => GroupRule::ByFunctionalArea,
        RuleGroupMode::ByEmployee => GroupRule::ByEmployee,
    }
}

fn audit(
    created_by: Uuid,
    created_at: DateTimeWithTimeZone,
    updated_by: Option<Uuid>,
    updated_at: DateTimeWithTimeZone,
    deleted_by: Option<Uuid>,
    deleted_at: Option<DateTimeWithTimeZone>,
) -> Audit {
    Audit {
        created_by: EmployeeId::from_uuid(created_by),
        created_at: created_at.with_timezone(&Utc),
        updated_by: updated_by.map(EmployeeId::from_uuid),
        updated_at: updated_at.with_timezone(&Utc),
        deleted_by: deleted_by.map(EmployeeId::from_uuid),
        deleted_at: deleted_at.map(|t| t.with_timezone(&Utc)),
    }
}

fn header_from_model(model: rule_headers::Model) -> RuleHeader {
    RuleHeader {
        id: RuleHeaderId::from_uuid(model.id),
        organization_id: OrganizationId::from_uuid(model.organization_id),
        name: model.name,
        functional_area_id: model.functional_area_id.map(FunctionalAreaId::from_uuid),
        classification: model.classification,
        group_rule: group_rule_from_db(model.group_rule),
        employee_id: model.employee_id.map(EmployeeId::from_uuid),
        branch_id: model.branch_id.map(BranchId::from_uuid),
        is_deleted: model.is_deleted,
        audit: audit(
            model.created_by,
            model.created_at,
            model.updated_by,
            model.updated_at,
            model.deleted_by,
            model.deleted_at,
        ),
    }
}

fn step_from_model(model: rule_steps::Model) -> RuleStep {
    RuleStep {
        id: RuleStepId::from_uuid(model.id),
        rule_header_id: RuleHeaderId::from_uuid(model.rule_header_id),
        functional_area_id: model.functional_area_id.map(FunctionalAreaId::from_uuid),
        org_unit_id: model.org_unit_id.map(OrgUnitId::from_uuid),
        department_id: model.department_id.map(DepartmentId::from_uuid),
        approval_type: model.approval_type,
        urut: model.urut,
        approval_group: model.approval_group,
        rejection_feedback: model.rejection_feedback,
        approval_line: model.approval_line,
        employee_id: model.employee_id.map(EmployeeId::from_uuid),
        use_esign: model.use_esign,
        esign_caption: model.esign_caption,
        is_deleted: model.is_deleted,
        audit: audit(
            model.created_by,
            model.created_at,
            model.updated_by,
            model.updated_at,
            model.deleted_by,
            model.deleted_at,
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn step_model(urut: Option<i32>) -> rule_steps::Model {
        let now: DateTimeWithTimeZone = Utc::now().into();
        rule_steps::Model {
            id: Uuid::now_v7(),
            organization_id: Uuid::now_v7(),
            rule_header_id: Uuid::now_v7(),
            functional_area_id: None,
            org_unit_id: None,
            department_id: Some(Uuid::now_v7()),
            approval_type: "APPROVE".to_string(),
            urut,
            approval_group: 2,
            rejection_feedback: Some("Please revise the itinerary".to_string()),
            approval_line: 1,
            employee_id: Some(Uuid::now_v7()),
            use_esign: true,
            esign_caption: Some("Finance Manager".to_string()),
            is_deleted: false,
            created_by: Uuid::now_v7(),
            created_at: now,
            updated_by: None,
            updated_at: now,
            deleted_by: None,
            deleted_at: None,
        }
    }

    #[test]
    fn test_group_rule_db_mapping_is_bijective() {
        for mode in [GroupRule::All, GroupRule::ByFunctionalArea, GroupRule::ByEmployee] {
            assert_eq!(group_rule_from_db(group_rule_to_db(mode)), mode);
        }
    }

    #[test]
    fn test_step_from_model_keeps_fields() {
        let model = step_model(Some(3));
        let step = step_from_model(model.clone());

        assert_eq!(step.id.into_inner(), model.id);
        assert_eq!(step.rule_header_id.into_inner(), model.rule_header_id);
        assert_eq!(step.urut, Some(3));
        assert_eq!(step.approval_group, 2);
        assert_eq!(step.department_id.map(DepartmentId::into_inner), model.department_id);
        assert_eq!(step.employee_id.map(EmployeeId::into_inner), model.employee_id);
        assert!(step.use_esign);
        assert_eq!(step.esign_caption.as_deref(), Some("Finance Manager"));
        assert_eq!(step.audit.created_by.into_inner(), model.created_by);
    }

    #[test]
    fn test_step_round_trips_through_input() {
        let step = step_from_model(step_model(None));
        let input = RuleStepInput::from(&step);
        assert!(input.same_values(&step));
    }

    #[test]
    fn test_scope_id_follows_group_rule() {
        let now: DateTimeWithTimeZone = Utc::now().into();
        let area = Uuid::now_v7();
        let employee = Uuid::now_v7();
        let mut model = rule_headers::Model {
            id: Uuid::now_v7(),
            organization_id: Uuid::now_v7(),
            name: "Travel".to_string(),
            functional_area_id: Some(area),
            classification: "SPPD".to_string(),
            group_rule: RuleGroupMode::All,
            employee_id: Some(employee),
            branch_id: None,
            is_deleted: false,
            created_by: Uuid::now_v7(),
            created_at: now,
            updated_by: None,
            updated_at: now,
            deleted_by: None,
            deleted_at: None,
        };

        assert_eq!(scope_id(&header_from_model(model.clone())), None);

        model.group_rule = RuleGroupMode::ByFunctionalArea;
        assert_eq!(scope_id(&header_from_model(model.clone())), Some(area));

        model.group_rule = RuleGroupMode::ByEmployee;
        assert_eq!(scope_id(&header_from_model(model)), Some(employee));
    }
}
