use std::collections::HashMap;

use chrono::Utc;
use sea_orm::{ActiveValue, QueryFilter, QueryOrder, TransactionTrait, prelude::*};

use crate::{
    Budget, BudgetItem, BudgetItemDraft, BudgetNew, BudgetPatch, BudgetStatus, EngineError, Money,
    ResultEngine, Totals, budget_items,
    budgets::{self, DentistRef, PatientRef, UserRef},
    dentists, patients, users,
};

use super::{Engine, normalize_optional_text, with_tx};

impl Engine {
    /// All budgets, newest first.
    pub async fn budgets(&self) -> ResultEngine<Vec<Budget>> {
        let models = budgets::Entity::find()
            .order_by_desc(budgets::Column::CreatedAt)
            .order_by_desc(budgets::Column::Id)
            .all(&self.database)
            .await?;
        self.hydrate_budgets(&self.database, models).await
    }

    pub async fn budget(&self, id: i32) -> ResultEngine<Budget> {
        self.load_budget(&self.database, id).await
    }

    /// Budgets of a patient, newest first. An unknown patient has none.
    pub async fn budgets_for_patient(&self, patient_id: i32) -> ResultEngine<Vec<Budget>> {
        let models = budgets::Entity::find()
            .filter(budgets::Column::PatientId.eq(patient_id))
            .order_by_desc(budgets::Column::CreatedAt)
            .order_by_desc(budgets::Column::Id)
            .all(&self.database)
            .await?;
        self.hydrate_budgets(&self.database, models).await
    }

    /// Creates a budget with its items in one transaction.
    ///
    /// The status starts at [`BudgetStatus::Negotiating`].
    pub async fn new_budget(&self, created_by: i32, input: &BudgetNew) -> ResultEngine<Budget> {
        let totals = Totals::from_items(&input.items, input.discount)?;
        let notes = normalize_optional_text(input.notes.as_deref());

        let budget = with_tx!(self, |db_tx| {
            self.require_patient(&db_tx, input.patient_id).await?;
            if let Some(dentist_id) = input.dentist_id {
                self.require_dentist(&db_tx, dentist_id).await?;
            }

            let now = Utc::now();
            let mut active = budgets::ActiveModel {
                id: ActiveValue::NotSet,
                patient_id: ActiveValue::Set(input.patient_id),
                dentist_id: ActiveValue::Set(input.dentist_id),
                created_by: ActiveValue::Set(created_by),
                status: ActiveValue::Set(BudgetStatus::default().as_str().to_string()),
                notes: ActiveValue::Set(notes),
                created_at: ActiveValue::Set(now),
                updated_at: ActiveValue::Set(now),
                ..Default::default()
            };
            budgets::set_totals(&mut active, totals);
            let model = active
                .insert(&db_tx)
                .await
                .map_err(|err| missing_reference(err, "user"))?;

            self.insert_items(&db_tx, model.id, &input.items).await?;
            self.load_budget(&db_tx, model.id).await
        })?;

        tracing::info!(
            budget_id = budget.id,
            patient_id = budget.patient_id,
            final_total = %budget.final_total,
            "budget created"
        );
        Ok(budget)
    }

    /// Applies `patch` in one transaction.
    ///
    /// With `items` the item set is replaced and the totals recomputed from
    /// it, keeping the stored discount unless a new one is given. Without
    /// `items` a new discount is applied to the total of the stored items.
    pub async fn update_budget(&self, id: i32, patch: &BudgetPatch) -> ResultEngine<Budget> {
        if patch.discount.is_some_and(Money::is_negative) {
            return Err(EngineError::InvalidAmount(
                "discount must be >= 0".to_string(),
            ));
        }

        with_tx!(self, |db_tx| {
            let current = self.require_budget(&db_tx, id).await?;
            if let Some(Some(dentist_id)) = patch.dentist_id {
                self.require_dentist(&db_tx, dentist_id).await?;
            }

            let mut active = budgets::ActiveModel {
                id: ActiveValue::Unchanged(id),
                updated_at: ActiveValue::Set(Utc::now()),
                ..Default::default()
            };
            if let Some(status) = patch.status {
                active.status = ActiveValue::Set(status.as_str().to_string());
            }
            if let Some(notes) = &patch.notes {
                active.notes = ActiveValue::Set(normalize_optional_text(notes.as_deref()));
            }
            if let Some(dentist_id) = patch.dentist_id {
                active.dentist_id = ActiveValue::Set(dentist_id);
            }

            let discount = patch.discount.unwrap_or(current.totals().discount);
            if let Some(items) = &patch.items {
                let totals = Totals::from_items(items, discount)?;
                budget_items::Entity::delete_many()
                    .filter(budget_items::Column::BudgetId.eq(id))
                    .exec(&db_tx)
                    .await?;
                self.insert_items(&db_tx, id, items).await?;
                budgets::set_totals(&mut active, totals);
            } else if patch.discount.is_some() {
                let stored = budget_items::Entity::find()
                    .filter(budget_items::Column::BudgetId.eq(id))
                    .all(&db_tx)
                    .await?;
                let mut total = Money::ZERO;
                for item in &stored {
                    total = total
                        .checked_add(Money::new(item.total_minor))
                        .ok_or_else(|| {
                            EngineError::InvalidAmount("budget total overflow".to_string())
                        })?;
                }
                budgets::set_totals(&mut active, Totals::with_discount(total, discount)?);
            }

            active.update(&db_tx).await?;
            self.load_budget(&db_tx, id).await
        })
    }

    /// Sets the status. Any status may follow any other.
    pub async fn set_budget_status(&self, id: i32, status: BudgetStatus) -> ResultEngine<Budget> {
        with_tx!(self, |db_tx| {
            self.require_budget(&db_tx, id).await?;
            budgets::ActiveModel {
                id: ActiveValue::Unchanged(id),
                status: ActiveValue::Set(status.as_str().to_string()),
                updated_at: ActiveValue::Set(Utc::now()),
                ..Default::default()
            }
            .update(&db_tx)
            .await?;
            self.load_budget(&db_tx, id).await
        })
    }

    /// Deletes a budget and its items.
    pub async fn delete_budget(&self, id: i32) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            self.require_budget(&db_tx, id).await?;
            budget_items::Entity::delete_many()
                .filter(budget_items::Column::BudgetId.eq(id))
                .exec(&db_tx)
                .await?;
            budgets::Entity::delete_by_id(id).exec(&db_tx).await?;
            Ok::<(), EngineError>(())
        })?;
        tracing::info!(budget_id = id, "budget deleted");
        Ok(())
    }

    async fn insert_items<C: ConnectionTrait>(
        &self,
        db: &C,
        budget_id: i32,
        items: &[BudgetItemDraft],
    ) -> ResultEngine<()> {
        let rows = items
            .iter()
            .map(|item| Ok(budget_items::active_model(budget_id, item, item.total()?)))
            .collect::<ResultEngine<Vec<_>>>()?;
        budget_items::Entity::insert_many(rows).exec(db).await?;
        Ok(())
    }

    async fn require_budget<C: ConnectionTrait>(
        &self,
        db: &C,
        id: i32,
    ) -> ResultEngine<budgets::Model> {
        budgets::Entity::find_by_id(id)
            .one(db)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("budget".to_string()))
    }

    async fn load_budget<C: ConnectionTrait>(&self, db: &C, id: i32) -> ResultEngine<Budget> {
        let model = self.require_budget(db, id).await?;
        self.hydrate_budgets(db, vec![model])
            .await?
            .pop()
            .ok_or_else(|| EngineError::KeyNotFound("budget".to_string()))
    }

    /// Attaches patient, dentist, creator and items, keeping the input order.
    pub(super) async fn hydrate_budgets<C: ConnectionTrait>(
        &self,
        db: &C,
        models: Vec<budgets::Model>,
    ) -> ResultEngine<Vec<Budget>> {
        if models.is_empty() {
            return Ok(Vec::new());
        }

        let budget_ids: Vec<i32> = models.iter().map(|m| m.id).collect();
        let patient_ids: Vec<i32> = models.iter().map(|m| m.patient_id).collect();
        let dentist_ids: Vec<i32> = models.iter().filter_map(|m| m.dentist_id).collect();
        let user_ids: Vec<i32> = models.iter().map(|m| m.created_by).collect();

        let patient_refs: HashMap<i32, PatientRef> = patients::Entity::find()
            .filter(patients::Column::Id.is_in(patient_ids))
            .all(db)
            .await?
            .into_iter()
            .map(|p| {
                let patient = PatientRef {
                    id: p.id,
                    name: p.name,
                    phone: p.phone,
                    email: p.email,
                };
                (patient.id, patient)
            })
            .collect();

        let dentist_refs: HashMap<i32, DentistRef> = if dentist_ids.is_empty() {
            HashMap::new()
        } else {
            dentists::Entity::find()
                .filter(dentists::Column::Id.is_in(dentist_ids))
                .all(db)
                .await?
                .into_iter()
                .map(|d| {
                    let dentist = DentistRef {
                        id: d.id,
                        name: d.name,
                        cro: d.cro,
                        specialty: d.specialty,
                    };
                    (dentist.id, dentist)
                })
                .collect()
        };

        let user_refs: HashMap<i32, UserRef> = users::Entity::find()
            .filter(users::Column::Id.is_in(user_ids))
            .all(db)
            .await?
            .into_iter()
            .map(|u| {
                let user = UserRef {
                    id: u.id,
                    name: u.name,
                    email: u.email,
                };
                (user.id, user)
            })
            .collect();

        let mut items: HashMap<i32, Vec<BudgetItem>> = HashMap::new();
        for item in budget_items::Entity::find()
            .filter(budget_items::Column::BudgetId.is_in(budget_ids))
            .order_by_asc(budget_items::Column::Id)
            .all(db)
            .await?
        {
            items
                .entry(item.budget_id)
                .or_default()
                .push(BudgetItem::from(item));
        }

        models
            .into_iter()
            .map(|model| {
                let Totals {
                    total,
                    discount,
                    final_total,
                } = model.totals();
                Ok(Budget {
                    status: model.parsed_status()?,
                    patient: patient_refs.get(&model.patient_id).cloned(),
                    dentist: model.dentist_id.and_then(|id| dentist_refs.get(&id).cloned()),
                    user: user_refs.get(&model.created_by).cloned(),
                    items: items.remove(&model.id).unwrap_or_default(),
                    id: model.id,
                    patient_id: model.patient_id,
                    dentist_id: model.dentist_id,
                    created_by: model.created_by,
                    total,
                    discount,
                    final_total,
                    notes: model.notes,
                    created_at: model.created_at,
                    updated_at: model.updated_at,
                })
            })
            .collect()
    }
}

/// A foreign-key failure on insert means the referenced row is gone.
fn missing_reference(err: DbErr, what: &str) -> EngineError {
    match EngineError::from_db(err, what) {
        EngineError::InUse(what) => EngineError::KeyNotFound(what),
        other => other,
    }
}
