//! Initial database migration.
//!
//! Creates the master-data tables, the rule-approval tables, their indexes
//! and the tenant isolation policies.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        // ============================================================
        // PART 1: ENUMS
        // ============================================================
        db.execute_unprepared(ENUMS_SQL).await?;

        // ============================================================
        // PART 2: MASTER DATA
        // ============================================================
        db.execute_unprepared(BRANCHES_SQL).await?;
        db.execute_unprepared(FUNCTIONAL_AREAS_SQL).await?;
        db.execute_unprepared(DEPARTMENTS_SQL).await?;
        db.execute_unprepared(EMPLOYEES_SQL).await?;

        // ============================================================
        // PART 3: RULE APPROVAL
        // ============================================================
        db.execute_unprepared(RULE_HEADERS_SQL).await?;
        db.execute_unprepared(RULE_STEPS_SQL).await?;

        // ============================================================
        // PART 4: ROW-LEVEL SECURITY
        // ============================================================
        db.execute_unprepared(RLS_SQL).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(DROP_ALL_SQL).await?;
        Ok(())
    }
}

// ============================================================
// SQL CONSTANTS
// ============================================================

const ENUMS_SQL: &str = r"
-- Rule header grouping mode
CREATE TYPE rule_group_mode AS ENUM ('all', 'by_functional_area', 'by_employee');
";

const BRANCHES_SQL: &str = r"
CREATE TABLE branches (
    id UUID PRIMARY KEY,
    organization_id UUID NOT NULL,
    code VARCHAR(50) NOT NULL,
    name VARCHAR(255) NOT NULL,
    is_deleted BOOLEAN NOT NULL DEFAULT false,
    created_by UUID NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_by UUID,
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    deleted_by UUID,
    deleted_at TIMESTAMPTZ
);

CREATE INDEX idx_branches_org ON branches(organization_id) WHERE is_deleted = false;
";

const FUNCTIONAL_AREAS_SQL: &str = r"
CREATE TABLE functional_areas (
    id UUID PRIMARY KEY,
    organization_id UUID NOT NULL,
    code VARCHAR(50) NOT NULL,
    name VARCHAR(255) NOT NULL,
    head_employee_id UUID,
    is_deleted BOOLEAN NOT NULL DEFAULT false,
    created_by UUID NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_by UUID,
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    deleted_by UUID,
    deleted_at TIMESTAMPTZ
);

CREATE INDEX idx_functional_areas_org ON functional_areas(organization_id) WHERE is_deleted = false;
";

const DEPARTMENTS_SQL: &str = r"
CREATE TABLE departments (
    id UUID PRIMARY KEY,
    organization_id UUID NOT NULL,
    code VARCHAR(50) NOT NULL,
    name VARCHAR(255) NOT NULL,
    functional_area_id UUID REFERENCES functional_areas(id),
    is_deleted BOOLEAN NOT NULL DEFAULT false,
    created_by UUID NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_by UUID,
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    deleted_by UUID,
    deleted_at TIMESTAMPTZ
);

CREATE INDEX idx_departments_org ON departments(organization_id) WHERE is_deleted = false;
";

const EMPLOYEES_SQL: &str = r"
CREATE TABLE employees (
    id UUID PRIMARY KEY,
    organization_id UUID NOT NULL,
    code VARCHAR(50) NOT NULL,
    full_name VARCHAR(255) NOT NULL,
    email VARCHAR(255),
    branch_id UUID REFERENCES branches(id),
    department_id UUID REFERENCES departments(id),
    functional_area_id UUID REFERENCES functional_areas(id),
    is_deleted BOOLEAN NOT NULL DEFAULT false,
    created_by UUID NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_by UUID,
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    deleted_by UUID,
    deleted_at TIMESTAMPTZ
);

CREATE INDEX idx_employees_org ON employees(organization_id) WHERE is_deleted = false;
";

// Scope columns are not foreign keys; display lookups fall back to the raw id.
const RULE_HEADERS_SQL: &str = r"
CREATE TABLE rule_headers (
    id UUID PRIMARY KEY,
    organization_id UUID NOT NULL,
    name VARCHAR(255) NOT NULL,
    functional_area_id UUID,
    classification VARCHAR(50) NOT NULL,
    group_rule rule_group_mode NOT NULL DEFAULT 'all',
    employee_id UUID,
    branch_id UUID,
    is_deleted BOOLEAN NOT NULL DEFAULT false,
    created_by UUID NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_by UUID,
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    deleted_by UUID,
    deleted_at TIMESTAMPTZ,
    CONSTRAINT chk_deleted_audit CHECK (is_deleted = false OR deleted_at IS NOT NULL)
);

CREATE INDEX idx_rule_headers_lookup
    ON rule_headers(organization_id, classification, group_rule)
    WHERE is_deleted = false;
";

const RULE_STEPS_SQL: &str = r"
CREATE TABLE rule_steps (
    id UUID PRIMARY KEY,
    organization_id UUID NOT NULL,
    rule_header_id UUID NOT NULL REFERENCES rule_headers(id),
    functional_area_id UUID,
    org_unit_id UUID,
    department_id UUID,
    approval_type VARCHAR(50) NOT NULL,
    urut INTEGER,
    approval_group INTEGER NOT NULL DEFAULT 0,
    rejection_feedback TEXT,
    approval_line INTEGER NOT NULL DEFAULT 0,
    employee_id UUID,
    use_esign BOOLEAN NOT NULL DEFAULT false,
    esign_caption VARCHAR(255),
    is_deleted BOOLEAN NOT NULL DEFAULT false,
    created_by UUID NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_by UUID,
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    deleted_by UUID,
    deleted_at TIMESTAMPTZ
);

CREATE INDEX idx_rule_steps_chain
    ON rule_steps(rule_header_id, approval_type, urut)
    WHERE is_deleted = false;
";

const RLS_SQL: &str = r"
ALTER TABLE branches ENABLE ROW LEVEL SECURITY;
ALTER TABLE functional_areas ENABLE ROW LEVEL SECURITY;
ALTER TABLE departments ENABLE ROW LEVEL SECURITY;
ALTER TABLE employees ENABLE ROW LEVEL SECURITY;
ALTER TABLE rule_headers ENABLE ROW LEVEL SECURITY;
ALTER TABLE rule_steps ENABLE ROW LEVEL SECURITY;

-- current_setting returns '' once a SET LOCAL has expired on a pooled session
CREATE POLICY tenant_isolation ON branches
    USING (organization_id = NULLIF(current_setting('app.current_organization_id', true), '')::UUID);

CREATE POLICY tenant_isolation ON functional_areas
    USING (organization_id = NULLIF(current_setting('app.current_organization_id', true), '')::UUID);

CREATE POLICY tenant_isolation ON departments
    USING (organization_id = NULLIF(current_setting('app.current_organization_id', true), '')::UUID);

CREATE POLICY tenant_isolation ON employees
    USING (organization_id = NULLIF(current_setting('app.current_organization_id', true), '')::UUID);

CREATE POLICY tenant_isolation ON rule_headers
    USING (organization_id = NULLIF(current_setting('app.current_organization_id', true), '')::UUID);

CREATE POLICY tenant_isolation ON rule_steps
    USING (organization_id = NULLIF(current_setting('app.current_organization_id', true), '')::UUID);
";

const DROP_ALL_SQL: &str = r"
DROP TABLE IF EXISTS rule_steps CASCADE;
DROP TABLE IF EXISTS rule_headers CASCADE;
DROP TABLE IF EXISTS employees CASCADE;
DROP TABLE IF EXISTS departments CASCADE;
DROP TABLE IF EXISTS functional_areas CASCADE;
DROP TABLE IF EXISTS branches CASCADE;
DROP TYPE IF EXISTS rule_group_mode;
";
