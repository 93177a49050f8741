//! PostgreSQL adapter for CatalogRepository
//!
//! Catalog reads run on the pooled connection, outside any unit of work.

use async_trait::async_trait;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter};

use super::errors::db_error;
use crate::domain::entities::{CustomerId, Dog, DogId, ServiceId, ServiceQuote, WalkerId};
use crate::domain::ports::CatalogRepository;
use crate::entity::{dogs, walker_services, walkers};
use crate::error::DomainError;

/// PostgreSQL implementation of CatalogRepository
pub struct PostgresCatalogRepository {
    db: DatabaseConnection,
}

impl PostgresCatalogRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl CatalogRepository for PostgresCatalogRepository {
    async fn find_dog(&self, id: &DogId) -> Result<Option<Dog>, DomainError> {
        let result = dogs::Entity::find_by_id(id.0)
            .one(&self.db)
            .await
            .map_err(db_error)?;

        Ok(result.map(Dog::from))
    }

    async fn walker_exists(&self, id: &WalkerId) -> Result<bool, DomainError> {
        let count = walkers::Entity::find_by_id(id.0)
            .count(&self.db)
            .await
            .map_err(db_error)?;

        Ok(count > 0)
    }

    async fn find_quote(
        &self,
        walker_id: &WalkerId,
        service_id: &ServiceId,
    ) -> Result<Option<ServiceQuote>, DomainError> {
        let result = walker_services::Entity::find()
            .filter(walker_services::Column::WalkerId.eq(walker_id.0))
            .filter(walker_services::Column::ServiceId.eq(service_id.0))
            .one(&self.db)
            .await
            .map_err(db_error)?;

        Ok(result.map(|model| ServiceQuote {
            walker_id: WalkerId(model.walker_id),
            service_id: ServiceId(model.service_id),
            price_cents: model.price_cents,
        }))
    }
}

impl From<dogs::Model> for Dog {
    fn from(model: dogs::Model) -> Self {
        Dog {
            id: DogId(model.id),
            owner_id: CustomerId(model.owner_id),
            name: model.name,
        }
    }
}
