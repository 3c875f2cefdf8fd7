//! Rule matcher.
//!
//! Selects the single active rule header that applies to a lookup context.

use crate::approval::error::ApprovalError;
use crate::approval::types::{GroupRule, MatchContext, RuleHeader};

/// Stateless matcher over candidate rule headers.
pub struct RuleMatcher;

impl RuleMatcher {
    /// Returns true if `header` applies to `ctx`.
    ///
    /// A scoped header never matches a context that lacks the scope key.
    #[must_use]
    pub fn matches(header: &RuleHeader, ctx: &MatchContext) -> bool {
        if header.is_deleted
            || header.organization_id != ctx.organization_id
            || header.classification != ctx.classification
            || header.group_rule != ctx.grouping_mode
        {
            return false;
        }

        match header.group_rule {
            GroupRule::All => true,
            GroupRule::ByFunctionalArea => ctx
                .functional_area_id
                .is_some_and(|fa| header.functional_area_id == Some(fa)),
            GroupRule::ByEmployee => ctx
                .actor_id
                .is_some_and(|actor| header.employee_id == Some(actor)),
        }
    }

    /// Selects the one header among `candidates` that applies to `ctx`.
    ///
    /// # Errors
    ///
    /// - `NoRuleConfigured` when nothing matches
    /// - `AmbiguousRule` when more than one header matches
    pub fn select<'a>(
        candidates: &'a [RuleHeader],
        ctx: &MatchContext,
    ) -> Result<&'a RuleHeader, ApprovalError> {
        let matched: Vec<&RuleHeader> = candidates
            .iter()
            .filter(|h| Self::matches(h, ctx))
            .collect();

        match matched.as_slice() {
            [] => Err(ApprovalError::NoRuleConfigured {
                classification: ctx.classification.clone(),
                grouping_mode: ctx.grouping_mode,
            }),
            [single] => Ok(single),
            many => Err(ApprovalError::AmbiguousRule {
                classification: ctx.classification.clone(),
                candidates: many.iter().map(|h| h.id).collect(),
            }),
        }
    }
}
