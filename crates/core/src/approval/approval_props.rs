//! Property-based tests for the rule-approval engine.

use proptest::prelude::*;
use uuid::Uuid;

use tripdesk_shared::types::{
    DepartmentId, EmployeeId, FunctionalAreaId, OrganizationId, RuleHeaderId,
};

use crate::approval::reconcile::{ReconcilePlan, StepReconciler};
use crate::approval::sequencer::StepSequencer;
use crate::approval::test_support::{header, step};
use crate::approval::types::{GroupRule, MatchContext, RuleStep, RuleStepInput};
use crate::approval::RuleMatcher;

fn arb_uuid() -> impl Strategy<Value = Uuid> {
    any::<u128>().prop_map(Uuid::from_u128)
}

fn arb_optional_uuid() -> impl Strategy<Value = Option<Uuid>> {
    prop_oneof![Just(None), arb_uuid().prop_map(Some)]
}

fn arb_approval_type() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("APPROVE".to_string()),
        Just("VERIFY".to_string()),
        Just("SPPD".to_string()),
    ]
}

fn arb_step_inputs() -> impl Strategy<Value = Vec<RuleStepInput>> {
    prop::collection::vec(
        (arb_approval_type(), prop::option::of(1i32..10), 0i32..5),
        0..12,
    )
    .prop_map(|items| {
        items
            .into_iter()
            .map(|(approval_type, urut, group)| RuleStepInput {
                urut,
                ..RuleStepInput::new(approval_type, 0, group)
            })
            .collect()
    })
}

/// Applies a plan to an in-memory step table the way the repository does.
fn apply(header_id: RuleHeaderId, table: &mut Vec<RuleStep>, plan: &ReconcilePlan) {
    for id in &plan.soft_deletes {
        if let Some(row) = table.iter_mut().find(|s| s.id == *id) {
            row.is_deleted = true;
        }
    }
    for planned in &plan.upserts {
        let mut row = step(header_id, &planned.input.approval_type, planned.input.urut);
        row.id = planned.id;
        row.approval_group = planned.input.approval_group;
        match table.iter_mut().find(|s| s.id == planned.id) {
            Some(existing) => *existing = row,
            None => table.push(row),
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// An `All` header matches whatever actor, department or area is supplied.
    #[test]
    fn prop_all_ignores_scope_keys(
        actor in arb_optional_uuid(),
        department in arb_optional_uuid(),
        area in arb_optional_uuid(),
    ) {
        let org = OrganizationId::new();
        let rule = header(org, "LEAVE", GroupRule::All);

        let mut ctx = MatchContext::new(org, "LEAVE", GroupRule::All);
        ctx.actor_id = actor.map(EmployeeId::from);
        ctx.department_id = department.map(DepartmentId::from);
        ctx.functional_area_id = area.map(FunctionalAreaId::from);

        prop_assert!(RuleMatcher::matches(&rule, &ctx));
    }

    /// A `ByEmployee` header matches iff the actor is the scoped employee.
    #[test]
    fn prop_by_employee_iff_actor(scoped in arb_uuid(), actor in arb_uuid()) {
        let org = OrganizationId::new();
        let mut rule = header(org, "LEAVE", GroupRule::ByEmployee);
        rule.employee_id = Some(EmployeeId::from(scoped));

        let ctx = MatchContext::new(org, "LEAVE", GroupRule::ByEmployee)
            .with_actor(EmployeeId::from(actor));

        prop_assert_eq!(RuleMatcher::matches(&rule, &ctx), scoped == actor);
    }

    /// Walking a contiguous chain visits every position once and then ends.
    #[test]
    fn prop_next_step_walks_contiguous_chain(len in 1i32..12) {
        let header_id = RuleHeaderId::new();
        let steps: Vec<RuleStep> = (1..=len)
            .rev()
            .map(|urut| step(header_id, "APPROVE", Some(urut)))
            .collect();

        for current in &steps {
            let urut = current.urut.unwrap();
            let next = StepSequencer::next_step(&steps, current, "APPROVE");
            if urut < len {
                prop_assert_eq!(next.and_then(|s| s.urut), Some(urut + 1));
            } else {
                prop_assert!(next.is_none());
            }
        }
    }

    /// A current step without urut always resolves to position 1.
    #[test]
    fn prop_missing_urut_targets_first(len in 1i32..8) {
        let header_id = RuleHeaderId::new();
        let mut steps: Vec<RuleStep> = (1..=len)
            .map(|urut| step(header_id, "APPROVE", Some(urut)))
            .collect();
        let current = step(header_id, "APPROVE", None);
        steps.push(current.clone());

        let next = StepSequencer::next_step(&steps, &current, "APPROVE");
        prop_assert_eq!(next.and_then(|s| s.urut), Some(1));
    }

    /// Re-submitting the step list produced by one reconcile changes nothing.
    #[test]
    fn prop_reconcile_is_idempotent(
        existing in arb_step_inputs(),
        submitted in arb_step_inputs(),
    ) {
        let header_id = RuleHeaderId::new();
        let mut table: Vec<RuleStep> = Vec::new();
        let first = StepReconciler::plan(&table, existing).unwrap();
        apply(header_id, &mut table, &first);

        let plan = StepReconciler::plan(&table, submitted).unwrap();
        apply(header_id, &mut table, &plan);
        let active_after_first: Vec<_> = StepSequencer::chain(&table, None)
            .into_iter()
            .map(|s| s.id)
            .collect();

        let resubmitted: Vec<RuleStepInput> = plan.upserts.iter().map(|p| p.input.clone()).collect();
        let again = StepReconciler::plan(&table, resubmitted).unwrap();
        prop_assert!(again.soft_deletes.is_empty());
        prop_assert_eq!(again.inserted_count(), 0);

        let rows_before = table.len();
        apply(header_id, &mut table, &again);
        let active_after_second: Vec<_> = StepSequencer::chain(&table, None)
            .into_iter()
            .map(|s| s.id)
            .collect();
        prop_assert_eq!(rows_before, table.len());
        prop_assert_eq!(active_after_first, active_after_second);
    }

    /// Every active step not in the submission is scheduled for soft delete.
    #[test]
    fn prop_reconcile_deletes_exactly_the_absent(
        existing in arb_step_inputs(),
        keep_mask in prop::collection::vec(any::<bool>(), 12),
    ) {
        let header_id = RuleHeaderId::new();
        let mut table: Vec<RuleStep> = Vec::new();
        let first = StepReconciler::plan(&table, existing).unwrap();
        apply(header_id, &mut table, &first);

        let kept: Vec<RuleStepInput> = table
            .iter()
            .zip(keep_mask.iter())
            .filter(|(_, keep)| **keep)
            .map(|(s, _)| RuleStepInput::from(s))
            .collect();
        let kept_count = kept.len();

        let plan = StepReconciler::plan(&table, kept).unwrap();
        prop_assert_eq!(plan.soft_deletes.len(), table.len() - kept_count);
        prop_assert_eq!(plan.inserted_count(), 0);
    }
}
