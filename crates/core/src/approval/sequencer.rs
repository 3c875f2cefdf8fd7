//! Step sequencer.
//!
//! Orders a header's steps and computes the next approver in a chain.
//! The next position is current urut + 1; an undeterminable current
//! position counts as 0.

use std::cmp::Ordering;

use crate::approval::types::RuleStep;

/// Stateless sequencing over a header's steps.
pub struct StepSequencer;

impl StepSequencer {
    /// Position of `current` within the `approval_type` chain.
    ///
    /// Returns 0 when the step belongs to another approval type or has no urut.
    #[must_use]
    pub fn current_position(current: &RuleStep, approval_type: &str) -> i32 {
        if current.approval_type == approval_type {
            current.urut.unwrap_or(0)
        } else {
            0
        }
    }

    /// Urut the next step must carry.
    #[must_use]
    pub fn target_position(current: &RuleStep, approval_type: &str) -> i32 {
        Self::current_position(current, approval_type).saturating_add(1)
    }

    /// Active steps, optionally restricted to one approval type, in chain order.
    ///
    /// Chain order is urut ascending with missing urut last, then approval
    /// line, then id.
    #[must_use]
    pub fn chain<'a>(steps: &'a [RuleStep], approval_type: Option<&str>) -> Vec<&'a RuleStep> {
        let mut chain: Vec<&RuleStep> = steps
            .iter()
            .filter(|s| !s.is_deleted)
            .filter(|s| approval_type.is_none_or(|t| s.approval_type == t))
            .collect();
        chain.sort_by(|a, b| Self::chain_order(a, b));
        chain
    }

    /// Same as [`Self::chain`] but taking ownership, for adapters that load rows.
    #[must_use]
    pub fn into_chain(steps: Vec<RuleStep>, approval_type: Option<&str>) -> Vec<RuleStep> {
        let mut chain: Vec<RuleStep> = steps
            .into_iter()
            .filter(|s| !s.is_deleted)
            .filter(|s| approval_type.is_none_or(|t| s.approval_type == t))
            .collect();
        chain.sort_by(Self::chain_order);
        chain
    }

    /// The step after `current` in the `approval_type` chain of the same header.
    ///
    /// `None` means the chain is exhausted.
    #[must_use]
    pub fn next_step<'a>(
        steps: &'a [RuleStep],
        current: &RuleStep,
        approval_type: &str,
    ) -> Option<&'a RuleStep> {
        let target = Self::target_position(current, approval_type);

        Self::chain(steps, Some(approval_type))
            .into_iter()
            .filter(|s| s.rule_header_id == current.rule_header_id)
            .find(|s| s.urut == Some(target))
    }

    fn chain_order(a: &RuleStep, b: &RuleStep) -> Ordering {
        let by_urut = match (a.urut, b.urut) {
            (Some(x), Some(y)) => x.cmp(&y),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        };
        by_urut
            .then(a.approval_line.cmp(&b.approval_line))
            .then(a.id.cmp(&b.id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::approval::test_support::step;
    use tripdesk_shared::types::RuleHeaderId;

    fn three_step_chain(header: RuleHeaderId) -> Vec<RuleStep> {
        vec![
            step(header, "APPROVE", Some(3)),
            step(header, "APPROVE", Some(1)),
            step(header, "APPROVE", Some(2)),
        ]
    }

    #[test]
    fn test_chain_orders_by_urut() {
        let header = RuleHeaderId::new();
        let steps = three_step_chain(header);

        let order: Vec<_> = StepSequencer::chain(&steps, None)
            .iter()
            .map(|s| s.urut)
            .collect();
        assert_eq!(order, vec![Some(1), Some(2), Some(3)]);
    }

    #[test]
    fn test_chain_puts_missing_urut_last() {
        let header = RuleHeaderId::new();
        let steps = vec![step(header, "APPROVE", None), step(header, "APPROVE", Some(5))];

        let order: Vec<_> = StepSequencer::into_chain(steps, None)
            .into_iter()
            .map(|s| s.urut)
            .collect();
        assert_eq!(order, vec![Some(5), None]);
    }

    #[test]
    fn test_chain_filters_type_and_deleted() {
        let header = RuleHeaderId::new();
        let mut deleted = step(header, "APPROVE", Some(2));
        deleted.is_deleted = true;
        let steps = vec![
            step(header, "APPROVE", Some(1)),
            deleted,
            step(header, "VERIFY", Some(1)),
        ];

        assert_eq!(StepSequencer::chain(&steps, Some("APPROVE")).len(), 1);
        assert_eq!(StepSequencer::chain(&steps, None).len(), 2);
    }

    #[test]
    fn test_next_step_advances_one_position() {
        let header = RuleHeaderId::new();
        let steps = three_step_chain(header);
        let first = &steps[1];

        let next = StepSequencer::next_step(&steps, first, "APPROVE").unwrap();
        assert_eq!(next.urut, Some(2));
    }

    #[test]
    fn test_next_step_of_last_is_none() {
        let header = RuleHeaderId::new();
        let steps = three_step_chain(header);
        let last = &steps[0];

        assert!(StepSequencer::next_step(&steps, last, "APPROVE").is_none());
    }

    #[test]
    fn test_missing_urut_restarts_at_first() {
        let header = RuleHeaderId::new();
        let mut steps = three_step_chain(header);
        let unordered = step(header, "APPROVE", None);
        steps.push(unordered.clone());

        let next = StepSequencer::next_step(&steps, &unordered, "APPROVE").unwrap();
        assert_eq!(next.urut, Some(1));
    }

    #[test]
    fn test_other_type_current_restarts_at_first() {
        let header = RuleHeaderId::new();
        let mut steps = three_step_chain(header);
        let verify = step(header, "VERIFY", Some(2));
        steps.push(verify.clone());

        let next = StepSequencer::next_step(&steps, &verify, "APPROVE").unwrap();
        assert_eq!(next.urut, Some(1));
        assert_eq!(next.approval_type, "APPROVE");
    }

    #[test]
    fn test_next_step_stays_within_header() {
        let header = RuleHeaderId::new();
        let other = RuleHeaderId::new();
        let current = step(header, "APPROVE", Some(1));
        let steps = vec![current.clone(), step(other, "APPROVE", Some(2))];

        assert!(StepSequencer::next_step(&steps, &current, "APPROVE").is_none());
    }

    #[test]
    fn test_gap_in_urut_ends_chain() {
        let header = RuleHeaderId::new();
        let current = step(header, "APPROVE", Some(1));
        let steps = vec![current.clone(), step(header, "APPROVE", Some(3))];

        assert!(StepSequencer::next_step(&steps, &current, "APPROVE").is_none());
    }

    #[test]
    fn test_duplicate_urut_picks_lowest_line() {
        let header = RuleHeaderId::new();
        let current = step(header, "APPROVE", Some(1));
        let mut second_line = step(header, "APPROVE", Some(2));
        second_line.approval_line = 2;
        let mut first_line = step(header, "APPROVE", Some(2));
        first_line.approval_line = 1;
        let steps = vec![current.clone(), second_line, first_line.clone()];

        let next = StepSequencer::next_step(&steps, &current, "APPROVE").unwrap();
        assert_eq!(next.id, first_line.id);
    }

    #[test]
    fn test_positions() {
        let header = RuleHeaderId::new();
        let current = step(header, "APPROVE", Some(4));
        assert_eq!(StepSequencer::current_position(&current, "APPROVE"), 4);
        assert_eq!(StepSequencer::current_position(&current, "VERIFY"), 0);
        assert_eq!(StepSequencer::target_position(&current, "APPROVE"), 5);
        assert_eq!(StepSequencer::target_position(&current, "VERIFY"), 1);
    }
}
