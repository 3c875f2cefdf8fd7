//! Domain types for approval rules.
//!
//! A rule header scopes one classification of transaction; its steps form
//! one or more ordered chains, partitioned by approval type.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use tripdesk_shared::types::{
    BranchId, DepartmentId, EmployeeId, FunctionalAreaId, OrgUnitId, OrganizationId, RuleHeaderId,
    RuleStepId,
};

/// How a rule header's applicability is scoped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GroupRule {
    /// Applies to every actor in the organization.
    All,
    /// Applies to actors of one functional area.
    ByFunctionalArea,
    /// Applies to one specific employee.
    ByEmployee,
}

impl GroupRule {
    /// Returns the string representation of the grouping mode.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::All => "ALL",
            Self::ByFunctionalArea => "BY_FUNCTIONAL_AREA",
            Self::ByEmployee => "BY_EMPLOYEE",
        }
    }

    /// Display label for a header's scope ("group value").
    ///
    /// `scope_name` is the resolved functional-area or employee name; when the
    /// lookup missed, the raw scope id is shown instead.
    #[must_use]
    pub fn group_value(&self, scope_name: Option<&str>, scope_id: Option<uuid::Uuid>) -> String {
        match self {
            Self::All => "ALL".to_string(),
            Self::ByFunctionalArea | Self::ByEmployee => match (scope_name, scope_id) {
                (Some(name), _) => name.to_string(),
                (None, Some(id)) => id.to_string(),
                (None, None) => "-".to_string(),
            },
        }
    }
}

impl fmt::Display for GroupRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Audit columns shared by headers and steps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Audit {
    /// Who created the row.
    pub created_by: EmployeeId,
    /// When the row was created.
    pub created_at: DateTime<Utc>,
    /// Who last updated the row.
    pub updated_by: Option<EmployeeId>,
    /// When the row was last updated.
    pub updated_at: DateTime<Utc>,
    /// Who soft-deleted the row.
    pub deleted_by: Option<EmployeeId>,
    /// When the row was soft-deleted.
    pub deleted_at: Option<DateTime<Utc>>,
}

/// A named approval policy for one classification of transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleHeader {
    /// Header id.
    pub id: RuleHeaderId,
    /// Owning tenant.
    pub organization_id: OrganizationId,
    /// Display name.
    pub name: String,
    /// Functional area the rule is scoped to (used by `ByFunctionalArea`).
    pub functional_area_id: Option<FunctionalAreaId>,
    /// Policy grouping key ("jenis"), e.g. `LEAVE` or `SPPD`.
    pub classification: String,
    /// How applicability is scoped.
    pub group_rule: GroupRule,
    /// Employee the rule is scoped to (used by `ByEmployee`).
    pub employee_id: Option<EmployeeId>,
    /// Branch scope.
    pub branch_id: Option<BranchId>,
    /// Soft-delete flag.
    pub is_deleted: bool,
    /// Audit trail.
    pub audit: Audit,
}

/// One ordered stage within a rule header's approval chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleStep {
    /// Step id.
    pub id: RuleStepId,
    /// Parent header.
    pub rule_header_id: RuleHeaderId,
    /// Functional area of the approver.
    pub functional_area_id: Option<FunctionalAreaId>,
    /// Organizational unit scope.
    pub org_unit_id: Option<OrgUnitId>,
    /// Department scope.
    pub department_id: Option<DepartmentId>,
    /// Tag partitioning the header's steps into independent chains.
    pub approval_type: String,
    /// Position within the approval-type chain ("urut"); not unique.
    pub urut: Option<i32>,
    /// Approval group number.
    pub approval_group: i32,
    /// Template sent back to the requester on rejection.
    pub rejection_feedback: Option<String>,
    /// Approval line index.
    pub approval_line: i32,
    /// Employee assigned to approve this step.
    pub employee_id: Option<EmployeeId>,
    /// Whether the approval must be e-signed.
    pub use_esign: bool,
    /// Caption printed under the signature.
    pub esign_caption: Option<String>,
    /// Soft-delete flag.
    pub is_deleted: bool,
    /// Audit trail.
    pub audit: Audit,
}

/// Header fields submitted on create or update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleHeaderInput {
    /// Display name.
    pub name: String,
    /// Functional area scope.
    pub functional_area_id: Option<FunctionalAreaId>,
    /// Policy grouping key.
    pub classification: String,
    /// Grouping mode.
    pub group_rule: GroupRule,
    /// Employee scope.
    pub employee_id: Option<EmployeeId>,
    /// Branch scope.
    pub branch_id: Option<BranchId>,
}

/// Step fields submitted on create or update.
///
/// Steps without an id are new; steps with an id are upserted under that id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleStepInput {
    /// Existing (or client-generated) step id.
    pub id: Option<RuleStepId>,
    /// Functional area of the approver.
    pub functional_area_id: Option<FunctionalAreaId>,
    /// Organizational unit scope.
    pub org_unit_id: Option<OrgUnitId>,
    /// Department scope.
    pub department_id: Option<DepartmentId>,
    /// Approval type tag.
    pub approval_type: String,
    /// Position within the chain.
    pub urut: Option<i32>,
    /// Approval group number.
    pub approval_group: i32,
    /// Rejection feedback template.
    pub rejection_feedback: Option<String>,
    /// Approval line index.
    pub approval_line: i32,
    /// Assigned approver.
    pub employee_id: Option<EmployeeId>,
    /// E-signature flag.
    pub use_esign: bool,
    /// Signature caption.
    pub esign_caption: Option<String>,
}

impl RuleStepInput {
    /// Creates a step input with the given type and position; other fields empty.
    #[must_use]
    pub fn new(approval_type: impl Into<String>, urut: i32, approval_group: i32) -> Self {
        Self {
            id: None,
            functional_area_id: None,
            org_unit_id: None,
            department_id: None,
            approval_type: approval_type.into(),
            urut: Some(urut),
            approval_group,
            rejection_feedback: None,
            approval_line: 0,
            employee_id: None,
            use_esign: false,
            esign_caption: None,
        }
    }

    /// Returns true when a persisted step carries exactly these submitted values.
    #[must_use]
    pub fn same_values(&self, step: &RuleStep) -> bool {
        self.id.is_none_or(|id| id == step.id)
            && self.functional_area_id == step.functional_area_id
            && self.org_unit_id == step.org_unit_id
            && self.department_id == step.department_id
            && self.approval_type == step.approval_type
            && self.urut == step.urut
            && self.approval_group == step.approval_group
            && self.rejection_feedback == step.rejection_feedback
            && self.approval_line == step.approval_line
            && self.employee_id == step.employee_id
            && self.use_esign == step.use_esign
            && self.esign_caption == step.esign_caption
    }
}

impl From<&RuleStep> for RuleStepInput {
    fn from(step: &RuleStep) -> Self {
        Self {
            id: Some(step.id),
            functional_area_id: step.functional_area_id,
            org_unit_id: step.org_unit_id,
            department_id: step.department_id,
            approval_type: step.approval_type.clone(),
            urut: step.urut,
            approval_group: step.approval_group,
            rejection_feedback: step.rejection_feedback.clone(),
            approval_line: step.approval_line,
            employee_id: step.employee_id,
            use_esign: step.use_esign,
            esign_caption: step.esign_caption.clone(),
        }
    }
}

/// Lookup context supplied by the transaction workflow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchContext {
    /// Tenant the lookup runs in.
    pub organization_id: OrganizationId,
    /// Classification to match.
    pub classification: String,
    /// Approval type of the chain the caller wants to walk.
    pub approval_type: Option<String>,
    /// Employee acting on the transaction.
    pub actor_id: Option<EmployeeId>,
    /// Actor's organizational unit.
    pub org_unit_id: Option<OrgUnitId>,
    /// Actor's department.
    pub department_id: Option<DepartmentId>,
    /// Actor's functional area.
    pub functional_area_id: Option<FunctionalAreaId>,
    /// Grouping mode to resolve under.
    pub grouping_mode: GroupRule,
}

impl MatchContext {
    /// Creates a context with only the mandatory keys set.
    #[must_use]
    pub fn new(
        organization_id: OrganizationId,
        classification: impl Into<String>,
        grouping_mode: GroupRule,
    ) -> Self {
        Self {
            organization_id,
            classification: classification.into(),
            approval_type: None,
            actor_id: None,
            org_unit_id: None,
            department_id: None,
            functional_area_id: None,
            grouping_mode,
        }
    }

    /// Sets the acting employee.
    #[must_use]
    pub fn with_actor(mut self, actor_id: EmployeeId) -> Self {
        self.actor_id = Some(actor_id);
        self
    }

    /// Sets the actor's functional area.
    #[must_use]
    pub fn with_functional_area(mut self, functional_area_id: FunctionalAreaId) -> Self {
        self.functional_area_id = Some(functional_area_id);
        self
    }

    /// Restricts the resolved chain to one approval type.
    #[must_use]
    pub fn with_approval_type(mut self, approval_type: impl Into<String>) -> Self {
        self.approval_type = Some(approval_type.into());
        self
    }
}

/// A header together with its active steps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleWithSteps {
    /// The header.
    pub header: RuleHeader,
    /// Active steps in chain order.
    pub steps: Vec<RuleStep>,
}

/// A step enriched with display fields from master data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleStepDetail {
    /// The step.
    pub step: RuleStep,
    /// Name of the assigned approver.
    pub employee_name: Option<String>,
    /// Name of the step's department.
    pub department_name: Option<String>,
    /// Whether the approver heads the step's functional area.
    pub is_head_of_functional_area: bool,
}

/// A header as shown in rule listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleHeaderView {
    /// The header.
    pub header: RuleHeader,
    /// Display label of the header's scope.
    pub group_value: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(GroupRule::All, "ALL")]
    #[case(GroupRule::ByFunctionalArea, "BY_FUNCTIONAL_AREA")]
    #[case(GroupRule::ByEmployee, "BY_EMPLOYEE")]
    fn test_group_rule_labels(#[case] mode: GroupRule, #[case] text: &str) {
        assert_eq!(mode.as_str(), text);
        assert_eq!(mode.to_string(), text);
    }

    #[test]
    fn test_group_rule_serde() {
        let json = serde_json::to_string(&GroupRule::ByFunctionalArea).unwrap();
        assert_eq!(json, "\"BY_FUNCTIONAL_AREA\"");
    }

    #[test]
    fn test_group_value_labels() {
        let id = uuid::Uuid::new_v4();
        assert_eq!(GroupRule::All.group_value(Some("Finance"), Some(id)), "ALL");
        assert_eq!(
            GroupRule::ByFunctionalArea.group_value(Some("Finance"), Some(id)),
            "Finance"
        );
        assert_eq!(GroupRule::ByEmployee.group_value(None, Some(id)), id.to_string());
        assert_eq!(GroupRule::ByEmployee.group_value(None, None), "-");
    }

    #[test]
    fn test_match_context_builder() {
        let org = OrganizationId::new();
        let actor = EmployeeId::new();
        let ctx = MatchContext::new(org, "LEAVE", GroupRule::ByEmployee)
            .with_actor(actor)
            .with_approval_type("APPROVE");

        assert_eq!(ctx.organization_id, org);
        assert_eq!(ctx.classification, "LEAVE");
        assert_eq!(ctx.actor_id, Some(actor));
        assert_eq!(ctx.approval_type.as_deref(), Some("APPROVE"));
        assert!(ctx.functional_area_id.is_none());
    }

    #[test]
    fn test_step_input_new_defaults() {
        let input = RuleStepInput::new("SPPD", 2, 1);
        assert!(input.id.is_none());
        assert_eq!(input.urut, Some(2));
        assert_eq!(input.approval_group, 1);
        assert!(!input.use_esign);
    }
}
