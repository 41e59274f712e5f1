//! Budgets (treatment quotes) and the arithmetic behind their totals.
//!
//! A budget's `total` is the sum of its item totals, `final_total` is
//! `total - discount`. Both are stored and only change when items or the
//! discount change. The status is free: every status can follow any other.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};

use crate::{EngineError, Money, ResultEngine, budget_items::BudgetItem};

pub use api_types::budget::BudgetStatus;

/// An item before it is persisted.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BudgetItemDraft {
    pub description: String,
    pub unit_price: Money,
    pub quantity: i64,
}

impl BudgetItemDraft {
    pub fn new(description: impl Into<String>, unit_price: Money, quantity: i64) -> Self {
        Self {
            description: description.into(),
            unit_price,
            quantity,
        }
    }

    /// Checks the item and returns `unit_price * quantity`.
    pub fn total(&self) -> ResultEngine<Money> {
        if self.description.trim().is_empty() {
            return Err(EngineError::InvalidInput(
                "item description must not be empty".to_string(),
            ));
        }
        if self.unit_price.is_negative() {
            return Err(EngineError::InvalidAmount(
                "item price must be >= 0".to_string(),
            ));
        }
        if self.quantity < 1 {
            return Err(EngineError::InvalidAmount(
                "item quantity must be >= 1".to_string(),
            ));
        }
        self.unit_price
            .checked_mul(self.quantity)
            .ok_or_else(|| EngineError::InvalidAmount("item total overflow".to_string()))
    }
}

/// The three stored amounts of a budget.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Totals {
    pub total: Money,
    pub discount: Money,
    pub final_total: Money,
}

impl Totals {
    /// Sums the items and applies `discount`. An empty item list is rejected.
    ///
    /// `final_total` is not clamped: a discount larger than the total gives a
    /// negative final total.
    pub fn from_items(items: &[BudgetItemDraft], discount: Money) -> ResultEngine<Self> {
        if items.is_empty() {
            return Err(EngineError::InvalidInput(
                "budget must contain at least one item".to_string(),
            ));
        }
        let mut total = Money::ZERO;
        for item in items {
            total = total
                .checked_add(item.total()?)
                .ok_or_else(|| EngineError::InvalidAmount("budget total overflow".to_string()))?;
        }
        Self::with_discount(total, discount)
    }

    /// Applies `discount` to an already known `total`.
    pub fn with_discount(total: Money, discount: Money) -> ResultEngine<Self> {
        if discount.is_negative() {
            return Err(EngineError::InvalidAmount(
                "discount must be >= 0".to_string(),
            ));
        }
        let final_total = total
            .checked_sub(discount)
            .ok_or_else(|| EngineError::InvalidAmount("final total overflow".to_string()))?;
        Ok(Self {
            total,
            discount,
            final_total,
        })
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PatientRef {
    pub id: i32,
    pub name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DentistRef {
    pub id: i32,
    pub name: String,
    pub cro: String,
    pub specialty: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UserRef {
    pub id: i32,
    pub name: String,
    pub email: String,
}

/// A budget with its patient, dentist, creator and items.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Budget {
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
    pub user: Option<UserRef>,
    pub items: Vec<BudgetItem>,
}

impl Budget {
    pub fn totals(&self) -> Totals {
        Totals {
            total: self.total,
            discount: self.discount,
            final_total: self.final_total,
        }
    }
}

/// Input of [`crate::Engine::new_budget`].
#[derive(Clone, Debug, Default)]
pub struct BudgetNew {
    pub patient_id: i32,
    pub dentist_id: Option<i32>,
    pub items: Vec<BudgetItemDraft>,
    pub notes: Option<String>,
    pub discount: Money,
}

/// Input of [`crate::Engine::update_budget`]. `None` keeps the stored value;
/// for `dentist_id` and `notes`, `Some(None)` clears it.
#[derive(Clone, Debug, Default)]
pub struct BudgetPatch {
    pub status: Option<BudgetStatus>,
    pub notes: Option<Option<String>>,
    pub dentist_id: Option<Option<i32>>,
    pub discount: Option<Money>,
    /// When present the whole item set is replaced.
    pub items: Option<Vec<BudgetItemDraft>>,
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "budgets")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub patient_id: i32,
    pub dentist_id: Option<i32>,
    pub created_by: i32,
    pub total_minor: i64,
    pub discount_minor: i64,
    pub final_total_minor: i64,
    pub status: String,
    pub notes: Option<String>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::patients::Entity",
        from = "Column::PatientId",
        to = "super::patients::Column::Id",
        on_delete = "Restrict"
    )]
    Patient,
    #[sea_orm(
        belongs_to = "super::dentists::Entity",
        from = "Column::DentistId",
        to = "super::dentists::Column::Id",
        on_delete = "SetNull"
    )]
    Dentist,
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::CreatedBy",
        to = "super::users::Column::Id"
    )]
    User,
    #[sea_orm(has_many = "super::budget_items::Entity")]
    Items,
}

impl Related<super::patients::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Patient.def()
    }
}

impl Related<super::dentists::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Dentist.def()
    }
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<super::budget_items::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Items.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub(crate) fn parsed_status(&self) -> ResultEngine<BudgetStatus> {
        self.status.parse().map_err(EngineError::InvalidInput)
    }

    pub(crate) fn totals(&self) -> Totals {
        Totals {
            total: Money::new(self.total_minor),
            discount: Money::new(self.discount_minor),
            final_total: Money::new(self.final_total_minor),
        }
    }
}

/// Writes `totals` into an active model.
pub(crate) fn set_totals(model: &mut ActiveModel, totals: Totals) {
    model.total_minor = ActiveValue::Set(totals.total.cents());
    model.discount_minor = ActiveValue::Set(totals.discount.cents());
    model.final_total_minor = ActiveValue::Set(totals.final_total.cents());
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(price: i64, quantity: i64) -> BudgetItemDraft {
        BudgetItemDraft::new("Cleaning", Money::new(price), quantity)
    }

    #[test]
    fn item_total_is_exact() {
        assert_eq!(item(10_10, 3).total().unwrap(), Money::new(30_30));
        assert_eq!(item(0, 5).total().unwrap(), Money::ZERO);
    }

    #[test]
    fn totals_sum_items_and_apply_discount() {
        let totals =
            Totals::from_items(&[item(100_00, 1), item(25_50, 2)], Money::new(10_00)).unwrap();
        assert_eq!(totals.total, Money::new(151_00));
        assert_eq!(totals.discount, Money::new(10_00));
        assert_eq!(totals.final_total, Money::new(141_00));
    }

    #[test]
    fn discount_larger_than_total_is_not_clamped() {
        let totals = Totals::with_discount(Money::new(50_00), Money::new(80_00)).unwrap();
        assert_eq!(totals.final_total, Money::new(-30_00));
    }

    #[test]
    fn rejects_bad_items() {
        assert!(Totals::from_items(&[], Money::ZERO).is_err());
        assert!(matches!(
            item(-1, 1).total(),
            Err(EngineError::InvalidAmount(_))
        ));
        assert!(matches!(
            item(100, 0).total(),
            Err(EngineError::InvalidAmount(_))
        ));
        assert!(matches!(
            BudgetItemDraft::new("  ", Money::new(1), 1).total(),
            Err(EngineError::InvalidInput(_))
        ));
        assert!(matches!(
            item(i64::MAX, 2).total(),
            Err(EngineError::InvalidAmount(_))
        ));
    }

    #[test]
    fn negative_discount_is_rejected() {
        assert!(matches!(
            Totals::with_discount(Money::new(100), Money::new(-1)),
            Err(EngineError::InvalidAmount(_))
        ));
    }

    #[test]
    fn status_literals() {
        for status in BudgetStatus::ALL {
            assert_eq!(status.as_str().parse::<BudgetStatus>().unwrap(), status);
        }
        assert!("INVALID".parse::<BudgetStatus>().is_err());
        assert_eq!(BudgetStatus::default(), BudgetStatus::Negotiating);
        assert_eq!(BudgetStatus::Negotiating.label(), "Em Negociação");
    }
}
