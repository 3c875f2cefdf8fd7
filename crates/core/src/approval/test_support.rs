//! Builders shared by the approval unit and property tests.

use chrono::Utc;

use tripdesk_shared::types::{EmployeeId, OrganizationId, RuleHeaderId, RuleStepId};

use crate::approval::types::{Audit, GroupRule, RuleHeader, RuleStep};

pub(crate) fn audit() -> Audit {
    let now = Utc::now();
    Audit {
        created_by: EmployeeId::new(),
        created_at: now,
        updated_by: None,
        updated_at: now,
        deleted_by: None,
        deleted_at: None,
    }
}

pub(crate) fn header(
    organization_id: OrganizationId,
    classification: &str,
    group_rule: GroupRule,
) -> RuleHeader {
    RuleHeader {
        id: RuleHeaderId::new(),
        organization_id,
        name: format!("{classification} rule"),
        functional_area_id: None,
        classification: classification.to_string(),
        group_rule,
        employee_id: None,
        branch_id: None,
        is_deleted: false,
        audit: audit(),
    }
}

pub(crate) fn step(
    rule_header_id: RuleHeaderId,
    approval_type: &str,
    urut: Option<i32>,
) -> RuleStep {
    RuleStep {
        id: RuleStepId::new(),
        rule_header_id,
        functional_area_id: None,
        org_unit_id: None,
        department_id: None,
        approval_type: approval_type.to_string(),
        urut,
        approval_group: urut.unwrap_or(0),
        rejection_feedback: None,
        approval_line: 0,
        employee_id: None,
        use_esign: false,
        esign_caption: None,
        is_deleted: false,
        audit: audit(),
    }
}
