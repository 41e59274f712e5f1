use std::collections::HashMap;

use chrono::Utc;
use sea_orm::{
    ActiveValue, ModelTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect,
    TransactionTrait, prelude::*,
};

use crate::{
    Budget, EngineError, Patient, PatientNew, PatientOverview, PatientPatch, ResultEngine,
    budgets, patients,
};

use super::{
    Engine, normalize_optional_email, normalize_optional_text, normalize_required_name, with_tx,
};

/// A patient with every budget it owns, newest first.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PatientDetail {
    pub patient: Patient,
    pub budgets: Vec<Budget>,
}

impl Engine {
    /// All patients, newest first, with their budget count.
    pub async fn patients(&self) -> ResultEngine<Vec<PatientOverview>> {
        let models = patients::Entity::find()
            .order_by_desc(patients::Column::CreatedAt)
            .order_by_desc(patients::Column::Id)
            .all(&self.database)
            .await?;

        let owners: Vec<i32> = budgets::Entity::find()
            .select_only()
            .column(budgets::Column::PatientId)
            .into_tuple()
            .all(&self.database)
            .await?;
        let mut counts: HashMap<i32, u64> = HashMap::new();
        for patient_id in owners {
            *counts.entry(patient_id).or_default() += 1;
        }

        Ok(models
            .into_iter()
            .map(|model| PatientOverview {
                budget_count: counts.get(&model.id).copied().unwrap_or_default(),
                patient: model.into(),
            })
            .collect())
    }

    /// One patient with its budgets.
    pub async fn patient(&self, id: i32) -> ResultEngine<PatientDetail> {
        let model = self.require_patient(&self.database, id).await?;
        let budget_models = model
            .find_related(budgets::Entity)
            .order_by_desc(budgets::Column::CreatedAt)
            .order_by_desc(budgets::Column::Id)
            .all(&self.database)
            .await?;
        Ok(PatientDetail {
            budgets: self.hydrate_budgets(&self.database, budget_models).await?,
            patient: model.into(),
        })
    }

    pub async fn new_patient(&self, input: &PatientNew) -> ResultEngine<Patient> {
        let input = PatientNew {
            name: normalize_required_name(&input.name, "patient name")?,
            phone: normalize_optional_text(input.phone.as_deref()),
            email: normalize_optional_email(input.email.as_deref())?,
        };
        let model = patients::ActiveModel::from(&input)
            .insert(&self.database)
            .await?;
        tracing::debug!(patient_id = model.id, "patient created");
        Ok(model.into())
    }

    /// Updates the fields present in `patch`.
    pub async fn update_patient(&self, id: i32, patch: &PatientPatch) -> ResultEngine<Patient> {
        let name = patch
            .name
            .as_deref()
            .map(|name| normalize_required_name(name, "patient name"))
            .transpose()?;
        let phone = patch
            .phone
            .as_ref()
            .map(|phone| normalize_optional_text(phone.as_deref()));
        let email = patch
            .email
            .as_ref()
            .map(|email| normalize_optional_email(email.as_deref()))
            .transpose()?;

        with_tx!(self, |db_tx| {
            self.require_patient(&db_tx, id).await?;
            let mut active = patients::ActiveModel {
                id: ActiveValue::Unchanged(id),
                updated_at: ActiveValue::Set(Utc::now()),
                ..Default::default()
            };
            if let Some(name) = name {
                active.name = ActiveValue::Set(name);
            }
            if let Some(phone) = phone {
                active.phone = ActiveValue::Set(phone);
            }
            if let Some(email) = email {
                active.email = ActiveValue::Set(email);
            }
            let model = active.update(&db_tx).await?;
            Ok(Patient::from(model))
        })
    }

    /// Hard delete. A patient that still owns budgets is kept.
    pub async fn delete_patient(&self, id: i32) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            self.require_patient(&db_tx, id).await?;
            let owned = budgets::Entity::find()
                .filter(budgets::Column::PatientId.eq(id))
                .count(&db_tx)
                .await?;
            if owned > 0 {
                return Err(EngineError::InUse("patient".to_string()));
            }
            patients::Entity::delete_by_id(id)
                .exec(&db_tx)
                .await
                .map_err(|err| EngineError::from_db(err, "patient"))?;
            Ok::<(), EngineError>(())
        })?;
        tracing::debug!(patient_id = id, "patient deleted");
        Ok(())
    }

    pub(super) async fn require_patient<C: ConnectionTrait>(
        &self,
        db: &C,
        id: i32,
    ) -> ResultEngine<patients::Model> {
        patients::Entity::find_by_id(id)
            .one(db)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("patient".to_string()))
    }
}
