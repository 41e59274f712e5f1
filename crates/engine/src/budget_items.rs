//! Line items of a budget. Rows are replaced as a whole, never edited.

use sea_orm::{ActiveValue, entity::prelude::*};

use crate::{Money, budgets::BudgetItemDraft};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BudgetItem {
    pub id: i32,
    pub budget_id: i32,
    pub description: String,
    pub unit_price: Money,
    pub quantity: i64,
    /// `unit_price * quantity`, stored.
    pub total: Money,
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "budget_items")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub budget_id: i32,
    pub description: String,
    pub unit_price_minor: i64,
    pub quantity: i64,
    pub total_minor: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::budgets::Entity",
        from = "Column::BudgetId",
        to = "super::budgets::Column::Id",
        on_delete = "Cascade"
    )]
    Budget,
}

impl Related<super::budgets::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Budget.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for BudgetItem {
    fn from(value: Model) -> Self {
        Self {
            id: value.id,
            budget_id: value.budget_id,
            description: value.description,
            unit_price: Money::new(value.unit_price_minor),
            quantity: value.quantity,
            total: Money::new(value.total_minor),
        }
    }
}

impl BudgetItem {
    /// Drops the identity, keeping what is needed to recompute totals.
    pub fn draft(&self) -> BudgetItemDraft {
        BudgetItemDraft {
            description: self.description.clone(),
            unit_price: self.unit_price,
            quantity: self.quantity,
        }
    }
}

/// Row for `draft` under `budget_id`. `total` was computed by the caller.
pub(crate) fn active_model(budget_id: i32, draft: &BudgetItemDraft, total: Money) -> ActiveModel {
    ActiveModel {
        id: ActiveValue::NotSet,
        budget_id: ActiveValue::Set(budget_id),
        description: ActiveValue::Set(draft.description.clone()),
        unit_price_minor: ActiveValue::Set(draft.unit_price.cents()),
        quantity: ActiveValue::Set(draft.quantity),
        total_minor: ActiveValue::Set(total.cents()),
    }
}
