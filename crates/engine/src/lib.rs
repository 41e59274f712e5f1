//! Domain core of the clinic: patients, dentists, budgets and their items,
//! users and bearer tokens, all behind one [`Engine`].
//!
//! The engine owns the monetary rules (item totals, discounts) and never
//! lets a caller see a budget with a partial item set.

pub use api_types::{Money, ParseMoneyError};
pub use auth::{AuthConfig, Claims, DEFAULT_TOKEN_TTL_SECS, hash_password};
pub use budget_items::BudgetItem;
pub use budgets::{
    Budget, BudgetItemDraft, BudgetNew, BudgetPatch, BudgetStatus, DentistRef, PatientRef, Totals,
    UserRef,
};
pub use dentists::{Dentist, DentistNew};
pub use error::EngineError;
pub use ops::{Engine, EngineBuilder, PatientDetail};
pub use patients::{Patient, PatientNew, PatientOverview, PatientPatch};
pub use users::{Role, User};

mod auth;
mod budget_items;
mod budgets;
mod dentists;
mod error;
mod ops;
mod patients;
mod users;

type ResultEngine<T> = Result<T, EngineError>;
