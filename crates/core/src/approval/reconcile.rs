//! Step reconciliation.
//!
//! Turns a submitted step list into the set of upserts and soft deletes that
//! replaces a header's steps. The plan only depends on the existing rows and
//! the submission, so applying it twice leaves the same persisted set.

use std::collections::HashSet;

use tripdesk_shared::types::RuleStepId;

use crate::approval::error::ApprovalError;
use crate::approval::types::{RuleStep, RuleStepInput};

/// A submitted step with its final id resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedStep {
    /// Id the step is upserted under.
    pub id: RuleStepId,
    /// Submitted values.
    pub input: RuleStepInput,
    /// True when no row with this id exists under the header yet.
    pub is_new: bool,
}

/// Writes needed to make the persisted steps equal the submission.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcilePlan {
    /// Steps to insert or update, in submission order.
    pub upserts: Vec<PlannedStep>,
    /// Active steps absent from the submission.
    pub soft_deletes: Vec<RuleStepId>,
}

impl ReconcilePlan {
    /// Number of steps that did not exist before.
    #[must_use]
    pub fn inserted_count(&self) -> usize {
        self.upserts.iter().filter(|p| p.is_new).count()
    }
}

/// Stateless planner for step submissions.
pub struct StepReconciler;

impl StepReconciler {
    /// Plans the reconciliation of `existing` (all rows of one header,
    /// deleted ones included) against `submitted`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidSteps` if the submission repeats a step id.
    pub fn plan(
        existing: &[RuleStep],
        submitted: Vec<RuleStepInput>,
    ) -> Result<ReconcilePlan, ApprovalError> {
        let known: HashSet<RuleStepId> = existing.iter().map(|s| s.id).collect();
        let mut seen: HashSet<RuleStepId> = HashSet::with_capacity(submitted.len());
        let mut upserts = Vec::with_capacity(submitted.len());

        for input in submitted {
            let id = input.id.unwrap_or_else(RuleStepId::new);
            if !seen.insert(id) {
                return Err(ApprovalError::InvalidSteps(format!(
                    "step {id} submitted more than once"
                )));
            }
            upserts.push(PlannedStep {
                id,
                input: RuleStepInput {
                    id: Some(id),
                    ..input
                },
                is_new: !known.contains(&id),
            });
        }

        let soft_deletes = existing
            .iter()
            .filter(|s| !s.is_deleted && !seen.contains(&s.id))
            .map(|s| s.id)
            .collect();

        Ok(ReconcilePlan {
            upserts,
            soft_deletes,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::approval::test_support::step;
    use tripdesk_shared::types::RuleHeaderId;

    #[test]
    fn test_plan_for_new_rule_inserts_everything() {
        let plan = StepReconciler::plan(
            &[],
            vec![
                RuleStepInput::new("APPROVE", 1, 1),
                RuleStepInput::new("APPROVE", 2, 2),
            ],
        )
        .unwrap();

        assert_eq!(plan.upserts.len(), 2);
        assert_eq!(plan.inserted_count(), 2);
        assert!(plan.soft_deletes.is_empty());
        assert!(plan.upserts.iter().all(|p| p.input.id == Some(p.id)));
    }

    #[test]
    fn test_absent_steps_are_soft_deleted() {
        let header = RuleHeaderId::new();
        let kept = step(header, "APPROVE", Some(1));
        let dropped = step(header, "APPROVE", Some(2));

        let plan = StepReconciler::plan(
            &[kept.clone(), dropped.clone()],
            vec![RuleStepInput::from(&kept)],
        )
        .unwrap();

        assert_eq!(plan.soft_deletes, vec![dropped.id]);
        assert_eq!(plan.inserted_count(), 0);
    }

    #[test]
    fn test_already_deleted_steps_are_not_deleted_again() {
        let header = RuleHeaderId::new();
        let mut gone = step(header, "APPROVE", Some(2));
        gone.is_deleted = true;
        let kept = step(header, "APPROVE", Some(1));

        let plan = StepReconciler::plan(&[kept.clone(), gone], vec![RuleStepInput::from(&kept)])
            .unwrap();

        assert!(plan.soft_deletes.is_empty());
    }

    #[test]
    fn test_resubmitting_deleted_step_is_an_update() {
        let header = RuleHeaderId::new();
        let mut gone = step(header, "APPROVE", Some(2));
        gone.is_deleted = true;

        let plan = StepReconciler::plan(std::slice::from_ref(&gone), vec![RuleStepInput::from(&gone)])
            .unwrap();

        assert_eq!(plan.upserts.len(), 1);
        assert!(!plan.upserts[0].is_new);
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let header = RuleHeaderId::new();
        let existing = step(header, "APPROVE", Some(1));
        let input = RuleStepInput::from(&existing);

        let result = StepReconciler::plan(&[existing], vec![input.clone(), input]);
        assert!(matches!(result, Err(ApprovalError::InvalidSteps(_))));
    }

    #[test]
    fn test_empty_submission_deletes_all_active() {
        let header = RuleHeaderId::new();
        let steps = vec![step(header, "APPROVE", Some(1)), step(header, "VERIFY", Some(1))];

        let plan = StepReconciler::plan(&steps, vec![]).unwrap();
        assert_eq!(plan.soft_deletes.len(), 2);
        assert!(plan.upserts.is_empty());
    }
}
