//! Rule-approval engine.
//!
//! Resolves which approval rule applies to a transaction and walks its
//! ordered chain of steps.
//!
//! # Modules
//!
//! - `types` - Rule headers, steps, inputs and lookup context
//! - `error` - Approval-specific error types
//! - `matcher` - Selects the single applicable rule header
//! - `sequencer` - Orders steps and computes the next approver
//! - `reconcile` - Plans the upsert/soft-delete set for a step submission

pub mod error;
pub mod matcher;
pub mod reconcile;
pub mod sequencer;
pub mod types;

#[cfg(test)]
mod approval_props;
#[cfg(test)]
pub(crate) mod test_support;

pub use error::ApprovalError;
pub use matcher::RuleMatcher;
pub use reconcile::{PlannedStep, ReconcilePlan, StepReconciler};
pub use sequencer::StepSequencer;
pub use types::{
    Audit, GroupRule, MatchContext, RuleHeader, RuleHeaderInput, RuleHeaderView, RuleStep,
    RuleStepDetail, RuleStepInput, RuleWithSteps,
};
