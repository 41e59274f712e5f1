use chrono::Utc;
use sea_orm::{ActiveValue, QueryFilter, QueryOrder, TransactionTrait, prelude::*, sea_query::Expr};

use crate::{Dentist, DentistNew, EngineError, ResultEngine, budgets, dentists};

use super::{
    Engine, normalize_optional_email, normalize_optional_text, normalize_required_name, with_tx,
};

impl Engine {
    /// All dentists ordered by name.
    pub async fn dentists(&self) -> ResultEngine<Vec<Dentist>> {
        let models = dentists::Entity::find()
            .order_by_asc(dentists::Column::Name)
            .order_by_asc(dentists::Column::Id)
            .all(&self.database)
            .await?;
        Ok(models.into_iter().map(Dentist::from).collect())
    }

    /// Dentists that can be assigned to new budgets.
    pub async fn active_dentists(&self) -> ResultEngine<Vec<Dentist>> {
        let models = dentists::Entity::find()
            .filter(dentists::Column::Active.eq(true))
            .order_by_asc(dentists::Column::Name)
            .order_by_asc(dentists::Column::Id)
            .all(&self.database)
            .await?;
        Ok(models.into_iter().map(Dentist::from).collect())
    }

    pub async fn dentist(&self, id: i32) -> ResultEngine<Dentist> {
        Ok(self.require_dentist(&self.database, id).await?.into())
    }

    pub async fn new_dentist(&self, input: &DentistNew) -> ResultEngine<Dentist> {
        let input = normalize_dentist(input)?;
        let model = with_tx!(self, |db_tx| {
            self.require_free_cro(&db_tx, &input.cro, None).await?;
            dentists::ActiveModel::from(&input)
                .insert(&db_tx)
                .await
                .map_err(|err| EngineError::from_db(err, "cro"))
        })?;
        tracing::debug!(dentist_id = model.id, "dentist created");
        Ok(model.into())
    }

    /// Replaces the dentist's fields. `active: None` keeps the stored flag.
    pub async fn update_dentist(&self, id: i32, input: &DentistNew) -> ResultEngine<Dentist> {
        let input = normalize_dentist(input)?;
        with_tx!(self, |db_tx| {
            self.require_dentist(&db_tx, id).await?;
            self.require_free_cro(&db_tx, &input.cro, Some(id)).await?;

            let mut active = dentists::ActiveModel {
                id: ActiveValue::Unchanged(id),
                name: ActiveValue::Set(input.name),
                cro: ActiveValue::Set(input.cro),
                phone: ActiveValue::Set(input.phone),
                email: ActiveValue::Set(input.email),
                specialty: ActiveValue::Set(input.specialty),
                updated_at: ActiveValue::Set(Utc::now()),
                ..Default::default()
            };
            if let Some(flag) = input.active {
                active.active = ActiveValue::Set(flag);
            }
            let model = active
                .update(&db_tx)
                .await
                .map_err(|err| EngineError::from_db(err, "cro"))?;
            Ok(Dentist::from(model))
        })
    }

    /// Deletes a dentist. Its budgets stay, without a dentist.
    pub async fn delete_dentist(&self, id: i32) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            self.require_dentist(&db_tx, id).await?;
            budgets::Entity::update_many()
                .col_expr(budgets::Column::DentistId, Expr::value(Option::<i32>::None))
                .filter(budgets::Column::DentistId.eq(id))
                .exec(&db_tx)
                .await?;
            dentists::Entity::delete_by_id(id).exec(&db_tx).await?;
            Ok::<(), EngineError>(())
        })?;
        tracing::debug!(dentist_id = id, "dentist deleted");
        Ok(())
    }

    pub(super) async fn require_dentist<C: ConnectionTrait>(
        &self,
        db: &C,
        id: i32,
    ) -> ResultEngine<dentists::Model> {
        dentists::Entity::find_by_id(id)
            .one(db)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("dentist".to_string()))
    }

    async fn require_free_cro<C: ConnectionTrait>(
        &self,
        db: &C,
        cro: &str,
        except: Option<i32>,
    ) -> ResultEngine<()> {
        let mut query = dentists::Entity::find().filter(dentists::Column::Cro.eq(cro));
        if let Some(id) = except {
            query = query.filter(dentists::Column::Id.ne(id));
        }
        if query.one(db).await?.is_some() {
            return Err(EngineError::ExistingKey("cro".to_string()));
        }
        Ok(())
    }
}

fn normalize_dentist(input: &DentistNew) -> ResultEngine<DentistNew> {
    Ok(DentistNew {
        name: normalize_required_name(&input.name, "dentist name")?,
        cro: normalize_required_name(&input.cro, "cro")?,
        phone: normalize_optional_text(input.phone.as_deref()),
        email: normalize_optional_email(input.email.as_deref())?,
        specialty: normalize_optional_text(input.specialty.as_deref()),
        active: input.active,
    })
}
