//! JSON bodies exchanged between the clinic HTTP API and its clients.
//!
//! Field names are camelCase on the wire. Request bodies implement
//! [`validator::Validate`]; see [`validation::field_errors`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

pub use money::{Money, ParseMoneyError};
pub use validation::FieldError;

mod money;
pub mod validation;

use validation::{double_option, double_option_text, trimmed, trimmed_opt};

/// Generic `{ "message": ... }` body returned by deletes.
#[derive(Debug, Serialize, Deserialize)]
pub struct Message {
    pub message: String,
}

/// Body of `GET /health`.
#[derive(Debug, Serialize, Deserialize)]
pub struct Health {
    pub status: String,
    pub timestamp: DateTime<Utc>,
}

pub mod auth {
    use super::*;

    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
    #[serde(rename_all = "UPPERCASE")]
    pub enum Role {
        Admin,
        /// Non-administrative staff.
        #[default]
        Funcionaria,
    }

    impl Role {
        pub fn as_str(self) -> &'static str {
            match self {
                Self::Admin => "ADMIN",
                Self::Funcionaria => "FUNCIONARIA",
            }
        }
    }

    impl std::str::FromStr for Role {
        type Err = String;

        fn from_str(s: &str) -> Result<Self, Self::Err> {
            match s {
                "ADMIN" => Ok(Self::Admin),
                "FUNCIONARIA" => Ok(Self::Funcionaria),
                other => Err(format!("invalid role: {other}")),
            }
        }
    }

    #[derive(Debug, Serialize, Deserialize, Validate)]
    pub struct RegisterRequest {
        #[serde(default, deserialize_with = "trimmed")]
        #[validate(length(min = 3, max = 100, message = "name must be between 3 and 100 characters"))]
        pub name: String,
        #[serde(default, deserialize_with = "trimmed")]
        #[validate(email(message = "invalid email"))]
        pub email: String,
        #[serde(default)]
        #[validate(length(min = 6, message = "password must be at least 6 characters"))]
        pub password: String,
        #[serde(default)]
        #[validate(custom(function = "crate::validation::valid_role"))]
        pub role: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize, Validate)]
    pub struct LoginRequest {
        #[serde(default, deserialize_with = "trimmed")]
        #[validate(email(message = "invalid email"))]
        pub email: String,
        #[serde(default)]
        #[validate(length(min = 6, message = "password must be at least 6 characters"))]
        pub password: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct UserView {
        pub id: i32,
        pub name: String,
        pub email: String,
        pub role: Role,
        pub created_at: DateTime<Utc>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct AuthResponse {
        pub user: UserView,
        pub token: String,
    }
}

pub mod patient {
    use super::*;

    #[derive(Debug, Serialize, Deserialize, Validate)]
    pub struct PatientNew {
        #[serde(default, deserialize_with = "trimmed")]
        #[validate(length(min = 3, max = 100, message = "name must be between 3 and 100 characters"))]
        pub name: String,
        #[serde(default, deserialize_with = "trimmed_opt")]
        #[validate(length(max = 20, message = "phone must be at most 20 characters"))]
        pub phone: Option<String>,
        #[serde(default, deserialize_with = "trimmed_opt")]
        #[validate(email(message = "invalid email"))]
        pub email: Option<String>,
    }

    /// Absent fields keep their stored value. `phone` and `email` are cleared
    /// by `null` or a blank string.
    #[derive(Debug, Serialize, Deserialize, Validate)]
    pub struct PatientUpdate {
        #[serde(default, deserialize_with = "trimmed_opt")]
        #[validate(length(min = 3, max = 100, message = "name must be between 3 and 100 characters"))]
        pub name: Option<String>,
        #[serde(default, deserialize_with = "double_option_text")]
        #[validate(length(max = 20, message = "phone must be at most 20 characters"))]
        pub phone: Option<Option<String>>,
        #[serde(default, deserialize_with = "double_option_text")]
        #[validate(email(message = "invalid email"))]
        pub email: Option<Option<String>>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct PatientView {
        pub id: i32,
        pub name: String,
        pub phone: Option<String>,
        pub email: Option<String>,
        pub created_at: DateTime<Utc>,
        pub updated_at: DateTime<Utc>,
        /// Present in list responses.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub budget_count: Option<u64>,
        /// Present when a single patient is fetched.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub budgets: Option<Vec<super::budget::BudgetView>>,
    }
}

pub mod dentist {
    use super::*;

    /// Body for both `POST /dentists` and `PUT /dentists/:id`.
    ///
    /// Empty optional strings count as absent. `active` defaults to `true` on
    /// create and is left untouched on update when absent.
    #[derive(Debug, Serialize, Deserialize, Validate)]
    pub struct DentistNew {
        #[serde(default, deserialize_with = "trimmed")]
        #[validate(length(min = 1, max = 255, message = "name is required (max 255 characters)"))]
        pub name: String,
        #[serde(default, deserialize_with = "trimmed")]
        #[validate(length(min = 1, max = 20, message = "cro is required (max 20 characters)"))]
        pub cro: String,
        #[serde(default, deserialize_with = "trimmed_opt")]
        #[validate(length(max = 20, message = "phone must be at most 20 characters"))]
        pub phone: Option<String>,
        #[serde(default, deserialize_with = "trimmed_opt")]
        #[validate(
            email(message = "invalid email"),
            length(max = 255, message = "email must be at most 255 characters")
        )]
        pub email: Option<String>,
        #[serde(default, deserialize_with = "trimmed_opt")]
        #[validate(length(max = 100, message = "specialty must be at most 100 characters"))]
        pub specialty: Option<String>,
        #[serde(default)]
        pub active: Option<bool>,
    }

    pub type DentistUpdate = DentistNew;

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct DentistView {
        pub id: i32,
        pub name: String,
        pub cro: String,
        pub phone: Option<String>,
        pub email: Option<String>,
        pub specialty: Option<String>,
        pub active: bool,
        pub created_at: DateTime<Utc>,
        pub updated_at: DateTime<Utc>,
    }
}

pub mod budget {
    use super::*;

    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub enum BudgetStatus {
        #[default]
        #[serde(rename = "EM_NEGOCIACAO")]
        Negotiating,
        #[serde(rename = "ACEITO")]
        Accepted,
        #[serde(rename = "RECUSADO")]
        Rejected,
    }

    impl BudgetStatus {
        pub const ALL: [BudgetStatus; 3] = [Self::Negotiating, Self::Accepted, Self::Rejected];

        pub fn as_str(self) -> &'static str {
            match self {
                Self::Negotiating => "EM_NEGOCIACAO",
                Self::Accepted => "ACEITO",
                Self::Rejected => "RECUSADO",
            }
        }

        /// Human label used in reports.
        pub fn label(self) -> &'static str {
            match self {
                Self::Negotiating => "Em Negociação",
                Self::Accepted => "Aceito",
                Self::Rejected => "Recusado",
            }
        }
    }

    impl std::str::FromStr for BudgetStatus {
        type Err = String;

        fn from_str(s: &str) -> Result<Self, Self::Err> {
            match s {
                "EM_NEGOCIACAO" => Ok(Self::Negotiating),
                "ACEITO" => Ok(Self::Accepted),
                "RECUSADO" => Ok(Self::Rejected),
                other => Err(format!("invalid status: {other}")),
            }
        }
    }

    #[derive(Debug, Serialize, Deserialize, Validate)]
    #[serde(rename_all = "camelCase")]
    pub struct BudgetItemNew {
        #[serde(default, deserialize_with = "trimmed")]
        #[validate(length(min = 1, max = 255, message = "item description is required (max 255 characters)"))]
        pub description: String,
        /// Older clients send `price`.
        #[serde(default, alias = "price")]
        #[validate(
            required(message = "item price is required"),
            custom(function = "crate::validation::non_negative")
        )]
        pub unit_price: Option<Money>,
        #[serde(default)]
        #[validate(range(min = 1, message = "quantity must be an integer >= 1"))]
        pub quantity: Option<i64>,
    }

    #[derive(Debug, Serialize, Deserialize, Validate)]
    #[serde(rename_all = "camelCase")]
    pub struct BudgetNew {
        #[serde(default)]
        #[validate(
            required(message = "patientId is required"),
            range(min = 1, message = "patientId must be a valid id")
        )]
        pub patient_id: Option<i32>,
        #[serde(default)]
        pub dentist_id: Option<i32>,
        #[serde(default)]
        #[validate(length(min = 1, message = "budget must contain at least one item"), nested)]
        pub items: Vec<BudgetItemNew>,
        #[serde(default, deserialize_with = "trimmed_opt")]
        pub notes: Option<String>,
        #[serde(default)]
        #[validate(custom(function = "crate::validation::non_negative"))]
        pub discount: Option<Money>,
    }

    /// `PUT /budgets/:id`.
    ///
    /// Without `items` only metadata changes; with `items` the whole item set
    /// is replaced. `dentistId: null` and `notes: null` clear the field,
    /// absent fields are kept.
    #[derive(Debug, Default, Serialize, Deserialize, Validate)]
    #[serde(rename_all = "camelCase")]
    pub struct BudgetUpdate {
        #[serde(default)]
        #[validate(custom(function = "crate::validation::valid_status"))]
        pub status: Option<String>,
        #[serde(default, deserialize_with = "double_option_text")]
        pub notes: Option<Option<String>>,
        #[serde(default, deserialize_with = "double_option")]
        pub dentist_id: Option<Option<i32>>,
        #[serde(default)]
        #[validate(custom(function = "crate::validation::non_negative"))]
        pub discount: Option<Money>,
        #[serde(default)]
        #[validate(length(min = 1, message = "budget must contain at least one item"), nested)]
        pub items: Option<Vec<BudgetItemNew>>,
    }

    /// `PATCH /budgets/:id/status`.
    #[derive(Debug, Serialize, Deserialize, Validate)]
    pub struct BudgetStatusUpdate {
        #[serde(default)]
        #[validate(custom(function = "crate::validation::valid_status"))]
        pub status: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct BudgetItemView {
        pub id: i32,
        pub budget_id: i32,
        pub description: String,
        pub unit_price: Money,
        pub quantity: i64,
        pub total: Money,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct PatientRef {
        pub id: i32,
        pub name: String,
        pub phone: Option<String>,
        pub email: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct DentistRef {
        pub id: i32,
        pub name: String,
        pub cro: String,
        pub specialty: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct UserRef {
        pub id: i32,
        pub name: String,
        pub email: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct BudgetView {
        pub id: i32,
        pub patient_id: i32,
        pub dentist_id: Option<i32>,
        pub created_by: i32,
        pub total: Money,
        pub discount: Money,
        pub final_total: Money,
        pub status: BudgetStatus,
        pub notes: Option<String>,
        pub created_at: DateTime<Utc>,
        pub updated_at: DateTime<Utc>,
        pub patient: Option<PatientRef>,
        pub dentist: Option<DentistRef>,
        /// The user who created the budget.
        pub user: Option<UserRef>,
        pub items: Vec<BudgetItemView>,
    }
}
