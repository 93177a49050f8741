//! PostgreSQL adapter for SlotRepository

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::sea_query::Expr;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};

use super::errors::{corrupt_column, db_error, on_foreign_key_violation, on_unique_violation};
use super::store::PostgresUnitOfWork;
use crate::domain::entities::{NewSlot, Slot, SlotId, SlotStatus, WalkerId};
use crate::domain::ports::SlotRepository;
use crate::entity::slots;
use crate::error::DomainError;

#[async_trait]
impl SlotRepository for PostgresUnitOfWork {
    async fn insert_slots(&self, new_slots: &[NewSlot]) -> Result<Vec<Slot>, DomainError> {
        if new_slots.is_empty() {
            return Ok(Vec::new());
        }

        let now = Utc::now();
        let created: Vec<Slot> = new_slots
            .iter()
            .map(|new_slot| Slot {
                id: SlotId::new(),
                walker_id: new_slot.walker_id,
                starts_at: new_slot.starts_at,
                status: SlotStatus::Available,
                created_at: now,
            })
            .collect();

        let models = created.iter().map(|slot| slots::ActiveModel {
            id: Set(slot.id.0),
            walker_id: Set(slot.walker_id.0),
            starts_at: Set(slot.starts_at.fixed_offset()),
            status: Set(slot.status.to_string()),
            created_at: Set(slot.created_at.fixed_offset()),
        });

        slots::Entity::insert_many(models)
            .exec(&self.txn)
            .await
            .map_err(|e| {
                on_unique_violation(e, || {
                    DomainError::SlotConflict(
                        "Walker already has a slot at one of the requested times".to_string(),
                    )
                })
            })?;

        Ok(created)
    }

    async fn find_slot(&self, id: &SlotId) -> Result<Option<Slot>, DomainError> {
        slots::Entity::find_by_id(id.0)
            .one(&self.txn)
            .await
            .map_err(db_error)?
            .map(Slot::try_from)
            .transpose()
    }

    async fn find_slots_by_walker(
        &self,
        walker_id: &WalkerId,
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
    ) -> Result<Vec<Slot>, DomainError> {
        let mut query = slots::Entity::find().filter(slots::Column::WalkerId.eq(walker_id.0));
        if let Some(from) = from {
            query = query.filter(slots::Column::StartsAt.gte(from.fixed_offset()));
        }
        if let Some(to) = to {
            query = query.filter(slots::Column::StartsAt.lt(to.fixed_offset()));
        }

        let results = query
            .order_by_asc(slots::Column::StartsAt)
            .all(&self.txn)
            .await
            .map_err(db_error)?;

        results.into_iter().map(Slot::try_from).collect()
    }

    async fn transition_slot(
        &self,
        id: &SlotId,
        from: SlotStatus,
        to: SlotStatus,
    ) -> Result<Option<Slot>, DomainError> {
        // Conditional UPDATE: Postgres row-locks the slot, so concurrent
        // claims queue here and all but one see zero rows affected.
        let result = slots::Entity::update_many()
            .col_expr(slots::Column::Status, Expr::value(to.to_string()))
            .filter(slots::Column::Id.eq(id.0))
            .filter(slots::Column::Status.eq(from.to_string()))
            .exec(&self.txn)
            .await
            .map_err(db_error)?;

        if result.rows_affected == 0 {
            return Ok(None);
        }
        self.find_slot(id).await
    }

    async fn delete_available_slot(&self, id: &SlotId) -> Result<bool, DomainError> {
        let result = slots::Entity::delete_many()
            .filter(slots::Column::Id.eq(id.0))
            .filter(slots::Column::Status.eq(SlotStatus::Available.to_string()))
            .exec(&self.txn)
            .await
            .map_err(|e| on_foreign_key_violation(e, || Slot::has_history(id)))?;

        Ok(result.rows_affected > 0)
    }
}

/// Convert SeaORM model to domain entity
impl TryFrom<slots::Model> for Slot {
    type Error = DomainError;

    fn try_from(model: slots::Model) -> Result<Self, Self::Error> {
        let status = model
            .status
            .parse()
            .map_err(|_| corrupt_column("slots", "status", &model.status))?;

        Ok(Slot {
            id: SlotId(model.id),
            walker_id: WalkerId(model.walker_id),
            starts_at: model.starts_at.with_timezone(&Utc),
            status,
            created_at: model.created_at.with_timezone(&Utc),
        })
    }
}
