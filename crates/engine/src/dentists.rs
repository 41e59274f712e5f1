//! Dentists. The CRO (professional registration number) is unique.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Dentist {
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

/// Input for creating or replacing a dentist.
///
/// `active: None` means `true` on create and "unchanged" on update.
#[derive(Clone, Debug, Default)]
pub struct DentistNew {
    pub name: String,
    pub cro: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub specialty: Option<String>,
    pub active: Option<bool>,
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "dentists")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
    #[sea_orm(unique)]
    pub cro: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub specialty: Option<String>,
    pub active: bool,
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

impl From<Model> for Dentist {
    fn from(value: Model) -> Self {
        Self {
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
}

impl From<&DentistNew> for ActiveModel {
    fn from(value: &DentistNew) -> Self {
        let now = Utc::now();
        ActiveModel {
            id: ActiveValue::NotSet,
            name: ActiveValue::Set(value.name.clone()),
            cro: ActiveValue::Set(value.cro.clone()),
            phone: ActiveValue::Set(value.phone.clone()),
            email: ActiveValue::Set(value.email.clone()),
            specialty: ActiveValue::Set(value.specialty.clone()),
            active: ActiveValue::Set(value.active.unwrap_or(true)),
            created_at: ActiveValue::Set(now),
            updated_at: ActiveValue::Set(now),
        }
    }
}
