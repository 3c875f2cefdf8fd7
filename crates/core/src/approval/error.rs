//! Approval error types.
//!
//! "No rule" and "no step" are expected business outcomes; `is_not_found`
//! separates them from infrastructure failures.

use thiserror::Error;

use tripdesk_shared::AppError;
use tripdesk_shared::types::{RuleHeaderId, RuleStepId};

use crate::approval::types::GroupRule;

/// Errors that can occur during rule-approval operations.
#[derive(Debug, Error)]
pub enum ApprovalError {
    /// No active rule header matches the lookup context.
    #[error("No approval rule configured for {classification} ({grouping_mode})")]
    NoRuleConfigured {
        /// Requested classification.
        classification: String,
        /// Requested grouping mode.
        grouping_mode: GroupRule,
    },

    /// More than one active rule header matches the lookup context.
    #[error("{} approval rules match {classification}", .candidates.len())]
    AmbiguousRule {
        /// Requested classification.
        classification: String,
        /// Ids of every matching header.
        candidates: Vec<RuleHeaderId>,
    },

    /// Rule header not found (or already deleted).
    #[error("Approval rule {0} not found")]
    RuleNotFound(RuleHeaderId),

    /// Rule step not found.
    #[error("Approval step {0} not found")]
    StepNotFound(RuleStepId),

    /// Submitted step list is inconsistent.
    #[error("Invalid steps: {0}")]
    InvalidSteps(String),

    /// Database error.
    #[error("Database error: {0}")]
    Database(String),
}

impl ApprovalError {
    /// Returns true when the error signals an absent rule or step.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::NoRuleConfigured { .. } | Self::RuleNotFound(_) | Self::StepNotFound(_)
        )
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn status_code(&self) -> u16 {
        match self {
            Self::NoRuleConfigured { .. } | Self::RuleNotFound(_) | Self::StepNotFound(_) => 404,
            Self::AmbiguousRule { .. } => 409,
            Self::InvalidSteps(_) => 400,
            Self::Database(_) => 500,
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::NoRuleConfigured { .. } => "NO_RULE_CONFIGURED",
            Self::AmbiguousRule { .. } => "AMBIGUOUS_RULE",
            Self::RuleNotFound(_) => "RULE_NOT_FOUND",
            Self::StepNotFound(_) => "STEP_NOT_FOUND",
            Self::InvalidSteps(_) => "INVALID_STEPS",
            Self::Database(_) => "DATABASE_ERROR",
        }
    }
}

impl From<ApprovalError> for AppError {
    fn from(err: ApprovalError) -> Self {
        let message = err.to_string();
        match err {
            ApprovalError::NoRuleConfigured { .. }
            | ApprovalError::RuleNotFound(_)
            | ApprovalError::StepNotFound(_) => Self::NotFound(message),
            ApprovalError::AmbiguousRule { .. } => Self::Conflict(message),
            ApprovalError::InvalidSteps(_) => Self::Validation(message),
            ApprovalError::Database(_) => Self::Database(message),
        }
    }
}
