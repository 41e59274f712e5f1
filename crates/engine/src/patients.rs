//! Patients of the clinic.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};

/// A patient row, optionally with the number of budgets it owns.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Patient {
    pub id: i32,
    pub name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Patient as listed: the row plus how many budgets reference it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PatientOverview {
    pub patient: Patient,
    pub budget_count: u64,
}

/// Input for a new patient. Text is normalized by the engine.
#[derive(Clone, Debug, Default)]
pub struct PatientNew {
    pub name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
}

/// Partial update: `None` keeps the stored value; for `phone` and `email`,
/// `Some(None)` (or a blank string) clears it.
#[derive(Clone, Debug, Default)]
pub struct PatientPatch {
    pub name: Option<String>,
    pub phone: Option<Option<String>>,
    pub email: Option<Option<String>>,
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "patients")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::budgets::Entity")]
    Budgets,
}

impl Related<super::budgets::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Budgets.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Patient {
    fn from(value: Model) -> Self {
        Self {
            id: value.id,
            name: value.name,
            phone: value.phone,
            email: value.email,
            created_at: value.created_at,
            updated_at: value.updated_at,
        }
    }
}

impl From<&PatientNew> for ActiveModel {
    fn from(value: &PatientNew) -> Self {
        let now = Utc::now();
        ActiveModel {
            id: ActiveValue::NotSet,
            name: ActiveValue::Set(value.name.clone()),
            phone: ActiveValue::Set(value.phone.clone()),
            email: ActiveValue::Set(value.email.clone()),
            created_at: ActiveValue::Set(now),
            updated_at: ActiveValue::Set(now),
        }
    }
}
