//! `SeaORM` entities.

pub mod prelude;

pub mod branches;
pub mod departments;
pub mod employees;
pub mod functional_areas;
pub mod rule_headers;
pub mod rule_steps;
pub mod sea_orm_active_enums;
