//! Database seeder for Tripdesk development and testing.
//!
//! Seeds a demo organization with a branch, an HR functional area, a
//! department, two approvers and a `LEAVE` approval rule whose `APPROVE`
//! chain goes supervisor first, then the head of HR. Running it twice is
//! harmless: an existing `LEAVE` rule skips seeding.
//!
//! Usage: cargo run --bin seeder

use anyhow::Context;
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

use tripdesk_core::approval::{
    ApprovalError, GroupRule, MatchContext, RuleHeaderInput, RuleStepInput,
};
use tripdesk_db::repositories::{
    BranchInput, BranchRepository, DepartmentInput, DepartmentRepository, EmployeeInput,
    EmployeeRepository, FunctionalAreaInput, FunctionalAreaRepository, RuleApprovalRepository,
};
use tripdesk_shared::types::{BranchId, DepartmentId, EmployeeId, FunctionalAreaId, OrganizationId};
use tripdesk_shared::{AppConfig, LoggingConfig};

/// Demo organization (consistent for all seeds).
const DEMO_ORG_ID: OrganizationId = OrganizationId::from_uuid(Uuid::from_u128(1));
/// Actor recorded in the audit columns of seeded rows.
const SEED_ACTOR_ID: EmployeeId = EmployeeId::from_uuid(Uuid::from_u128(2));

const LEAVE: &str = "LEAVE";
const APPROVE: &str = "APPROVE";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = AppConfig::load().context("Failed to load configuration")?;
    init_tracing(&config.logging);

    let db = tripdesk_db::connect_with(&config.database)
        .await
        .context("Failed to connect to database")?;
    info!("Connected to database");

    let rules = RuleApprovalRepository::new(db.clone());
    let lookup = MatchContext::new(DEMO_ORG_ID, LEAVE, GroupRule::All);
    match rules.match_rule(&lookup).await {
        Ok(existing) => {
            info!(rule_id = %existing.id, "LEAVE rule already exists, skipping");
            return Ok(());
        }
        Err(ApprovalError::NoRuleConfigured { .. }) => {}
        Err(e) => return Err(e).context("Failed to look up LEAVE rule"),
    }

    let branch = BranchRepository::new(db.clone())
        .create(
            DEMO_ORG_ID,
            SEED_ACTOR_ID,
            BranchInput {
                code: "HQ".to_string(),
                name: "Head Office".to_string(),
            },
        )
        .await?;
    let branch_id = BranchId::from_uuid(branch.id);
    info!(branch_id = %branch_id, "Seeded branch");

    let areas = FunctionalAreaRepository::new(db.clone());
    let hr = areas
        .create(
            DEMO_ORG_ID,
            SEED_ACTOR_ID,
            FunctionalAreaInput {
                code: "HR".to_string(),
                name: "Human Resources".to_string(),
                head_employee_id: None,
            },
        )
        .await?;
    let hr_id = FunctionalAreaId::from_uuid(hr.id);

    let people = DepartmentRepository::new(db.clone())
        .create(
            DEMO_ORG_ID,
            SEED_ACTOR_ID,
            DepartmentInput {
                code: "PEOPLE".to_string(),
                name: "People Operations".to_string(),
                functional_area_id: Some(hr_id),
            },
        )
        .await?;
    let people_id = DepartmentId::from_uuid(people.id);

    let employees = EmployeeRepository::new(db.clone());
    let supervisor = employees
        .create(
            DEMO_ORG_ID,
            SEED_ACTOR_ID,
            EmployeeInput {
                code: "EMP-0001".to_string(),
                full_name: "Dewi Supervisor".to_string(),
                email: Some("dewi@tripdesk.dev".to_string()),
                branch_id: Some(branch_id),
                department_id: Some(people_id),
                functional_area_id: Some(hr_id),
            },
        )
        .await?;
    let hr_head = employees
        .create(
            DEMO_ORG_ID,
            SEED_ACTOR_ID,
            EmployeeInput {
                code: "EMP-0002".to_string(),
                full_name: "Agus Head of HR".to_string(),
                email: Some("agus@tripdesk.dev".to_string()),
                branch_id: Some(branch_id),
                department_id: Some(people_id),
                functional_area_id: Some(hr_id),
            },
        )
        .await?;
    let hr_head_id = EmployeeId::from_uuid(hr_head.id);

    areas
        .update(
            DEMO_ORG_ID,
            SEED_ACTOR_ID,
            hr.id,
            FunctionalAreaInput {
                code: "HR".to_string(),
                name: "Human Resources".to_string(),
                head_employee_id: Some(hr_head_id),
            },
        )
        .await?;
    info!(functional_area_id = %hr_id, "Seeded HR functional area");

    let first = RuleStepInput {
        employee_id: Some(EmployeeId::from_uuid(supervisor.id)),
        department_id: Some(people_id),
        ..RuleStepInput::new(APPROVE, 1, 1)
    };
    let second = RuleStepInput {
        employee_id: Some(hr_head_id),
        functional_area_id: Some(hr_id),
        use_esign: true,
        esign_caption: Some("Head of Human Resources".to_string()),
        rejection_feedback: Some("Leave request rejected by HR".to_string()),
        ..RuleStepInput::new(APPROVE, 2, 2)
    };

    let rule = rules
        .create_rule(
            DEMO_ORG_ID,
            SEED_ACTOR_ID,
            RuleHeaderInput {
                name: "Leave approval".to_string(),
                functional_area_id: None,
                classification: LEAVE.to_string(),
                group_rule: GroupRule::All,
                employee_id: None,
                branch_id: Some(branch_id),
            },
            vec![first, second],
        )
        .await?;

    info!(
        rule_id = %rule.header.id,
        steps = rule.steps.len(),
        "Seeding complete"
    );
    Ok(())
}

fn init_tracing(logging: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.filter));
    let registry = tracing_subscriber::registry().with(filter);

    if logging.json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}
