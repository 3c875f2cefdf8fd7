//! Row-Level Security (RLS) context management.
//!
//! Every write transaction runs with `app.current_organization_id` set so the
//! `tenant_isolation` policies confine it to one organization.
//!
//! # Usage
//!
//! ```ignore
//! use tripdesk_db::rls::RlsExt;
//!
//! let rls = db.with_rls(organization_id).await?;
//! rule_headers::Entity::update_many()
//!     /* ... */
//!     .exec(rls.transaction())
//!     .await?;
//! rls.commit().await?;
//! ```

use sea_orm::{
    ConnectionTrait, DatabaseConnection, DatabaseTransaction, DbBackend, DbErr, Statement,
    TransactionTrait,
};
use tripdesk_shared::types::OrganizationId;

/// Setting read by the `tenant_isolation` policies.
pub const RLS_SETTING: &str = "app.current_organization_id";

/// Transaction-local equivalent of `SET LOCAL`, with the id bound as a parameter.
const SET_CONTEXT_SQL: &str = "SELECT set_config('app.current_organization_id', $1, true)";

/// A database transaction scoped to one organization.
///
/// Dropping it without calling [`RlsConnection::commit`] rolls the
/// transaction back.
pub struct RlsConnection {
    txn: DatabaseTransaction,
}

impl RlsConnection {
    /// Begins a transaction and sets the organization context on it.
    ///
    /// # Errors
    ///
    /// Returns an error if the transaction cannot be started or the RLS
    /// context cannot be set.
    pub async fn new(
        db: &DatabaseConnection,
        organization_id: OrganizationId,
    ) -> Result<Self, DbErr> {
        let txn = db.begin().await?;
        set_rls_context(&txn, organization_id).await?;

        Ok(Self { txn })
    }

    /// Returns the underlying transaction for executing queries.
    #[must_use]
    pub fn transaction(&self) -> &DatabaseTransaction {
        &self.txn
    }

    /// Commits the transaction, persisting all changes.
    ///
    /// # Errors
    ///
    /// Returns an error if the commit fails.
    pub async fn commit(self) -> Result<(), DbErr> {
        self.txn.commit().await
    }

    /// Rolls back the transaction, discarding all changes.
    ///
    /// # Errors
    ///
    /// Returns an error if the rollback fails.
    pub async fn rollback(self) -> Result<(), DbErr> {
        self.txn.rollback().await
    }
}

/// Extension trait for `DatabaseConnection` to easily create RLS-enabled connections.
#[async_trait::async_trait]
pub trait RlsExt {
    /// Creates an RLS-enabled connection with the given organization context.
    ///
    /// # Errors
    ///
    /// Returns an error if the RLS connection cannot be created.
    async fn with_rls(&self, organization_id: OrganizationId) -> Result<RlsConnection, DbErr>;
}

#[async_trait::async_trait]
impl RlsExt for DatabaseConnection {
    async fn with_rls(&self, organization_id: OrganizationId) -> Result<RlsConnection, DbErr> {
        RlsConnection::new(self, organization_id).await
    }
}

/// Sets the RLS context on an existing transaction.
///
/// # Errors
///
/// Returns an error if the RLS context cannot be set.
pub async fn set_rls_context(
    txn: &DatabaseTransaction,
    organization_id: OrganizationId,
) -> Result<(), DbErr> {
    txn.execute(context_statement(organization_id)).await?;
    Ok(())
}

fn context_statement(organization_id: OrganizationId) -> Statement {
    Statement::from_sql_and_values(
        DbBackend::Postgres,
        SET_CONTEXT_SQL,
        [organization_id.to_string().into()],
    )
}
