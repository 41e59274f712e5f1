//! Conversions from engine values to the JSON bodies in `api_types`.

use api_types::{
    auth::UserView,
    budget::{self as wire, BudgetItemView, BudgetView},
    dentist::DentistView,
    patient::PatientView,
};
use engine::{Budget, BudgetItem, BudgetStatus, Dentist, Patient, Role, User};

use crate::ServerError;

pub(crate) fn parse_role(value: &str) -> Result<Role, ServerError> {
    value.parse().map_err(ServerError::BadRequest)
}

pub(crate) fn parse_status(value: &str) -> Result<BudgetStatus, ServerError> {
    value.parse().map_err(ServerError::BadRequest)
}

pub(crate) fn user(value: User) -> UserView {
    UserView {
        id: value.id,
        name: value.name,
        email: value.email,
        role: value.role,
        created_at: value.created_at,
    }
}

pub(crate) fn patient(value: Patient) -> PatientView {
    PatientView {
        id: value.id,
        name: value.name,
        phone: value.phone,
        email: value.email,
        created_at: value.created_at,
        updated_at: value.updated_at,
        budget_count: None,
        budgets: None,
    }
}

pub(crate) fn dentist(value: Dentist) -> DentistView {
    DentistView {
        id: value.id,
        name: value.name,
        cro: value.cro,
        phone: value.phone,
        email: value.email,
        specialty: value.specialty,
        active: value.active,
        created_at: value.created_at,
        updated_at: value.updated_at,
    }
}

fn item(value: BudgetItem) -> BudgetItemView {
    BudgetItemView {
        id: value.id,
        budget_id: value.budget_id,
        description: value.description,
        unit_price: value.unit_price,
        quantity: value.quantity,
        total: value.total,
    }
}

pub(crate) fn budget(value: Budget) -> BudgetView {
    BudgetView {
        id: value.id,
        patient_id: value.patient_id,
        dentist_id: value.dentist_id,
        created_by: value.created_by,
        total: value.total,
        discount: value.discount,
        final_total: value.final_total,
        status: value.status,
        notes: value.notes,
        created_at: value.created_at,
        updated_at: value.updated_at,
        patient: value.patient.map(|p| wire::PatientRef {
            id: p.id,
            name: p.name,
            phone: p.phone,
            email: p.email,
        }),
        dentist: value.dentist.map(|d| wire::DentistRef {
            id: d.id,
            name: d.name,
            cro: d.cro,
            specialty: d.specialty,
        }),
        user: value.user.map(|u| wire::UserRef {
            id: u.id,
            name: u.name,
            email: u.email,
        }),
        items: value.items.into_iter().map(item).collect(),
    }
}

pub(crate) fn budgets(values: Vec<Budget>) -> Vec<BudgetView> {
    values.into_iter().map(budget).collect()
}
