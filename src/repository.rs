use async_trait::async_trait;
use sqlx::PgPool;
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{
    CreatePurchasedItemRequest, CreateServiceRequest, DeleteResult, InsertResult, PurchasedItem,
    ServiceListing, ServiceStatus, UpdateResult, UpdateServiceRequest,
};

/// StoreError
///
/// A persistence failure: connection loss, pool timeout, constraint violation.
/// Surfaced to clients as a generic 500; the detail stays in the logs.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store operation failed: {0}")]
    Database(#[from] sqlx::Error),
}

/// ResourceStore Trait
///
/// Defines the abstract contract for all persistence operations over the two
/// logical collections (services, purchased items). This is the core of the
/// Repository Abstraction pattern, allowing the handlers to interact with the
/// data layer without knowing the specific implementation (Postgres, Mock, etc.).
///
/// **Send + Sync + async_trait** are required to make the trait object
/// (`Arc<dyn ResourceStore>`) safely shareable and usable across Axum's
/// asynchronous task boundaries.
///
/// Every operation is a single atomic store call: no retries (create has no
/// idempotency key, so automatic retry of writes is unsafe), no partial-write
/// rollback. Failures propagate as `StoreError`.
#[async_trait]
pub trait ResourceStore: Send + Sync {
    // --- Services Collection ---

    /// Lists service listings, optionally scoped to one provider's email.
    /// `None` returns the whole collection (the public catalogue view).
    async fn list_services(
        &self,
        provider_email: Option<&str>,
    ) -> Result<Vec<ServiceListing>, StoreError>;

    /// Inserts a new listing with a store-assigned identifier.
    async fn create_service(&self, doc: CreateServiceRequest)
    -> Result<InsertResult, StoreError>;

    /// Applies a partial field replace to a listing. The identifier is not
    /// part of the payload type, so it cannot be overwritten.
    async fn update_service(
        &self,
        id: Uuid,
        fields: UpdateServiceRequest,
    ) -> Result<UpdateResult, StoreError>;

    /// Deletes a listing. A second delete of the same id reports
    /// `deleted_count = 0` rather than an error.
    async fn delete_service(&self, id: Uuid) -> Result<DeleteResult, StoreError>;

    // --- Purchased Items Collection ---

    /// Lists purchases, optionally scoped to one buyer's email
    /// (`current_user_email`). `None` returns the whole collection.
    async fn list_purchased_items(
        &self,
        buyer_email: Option<&str>,
    ) -> Result<Vec<PurchasedItem>, StoreError>;

    /// Lists purchases from the provider side (`service_provider_email`):
    /// the provider's work queue. `None` returns the whole collection.
    async fn list_provider_tasks(
        &self,
        provider_email: Option<&str>,
    ) -> Result<Vec<PurchasedItem>, StoreError>;

    /// Records a new purchase with a store-assigned identifier.
    async fn create_purchased_item(
        &self,
        doc: CreatePurchasedItemRequest,
    ) -> Result<InsertResult, StoreError>;

    /// The only mutation path for purchased items: replaces the status field
    /// and nothing else, preserving buyer/provider/audit fields.
    async fn update_purchase_status(
        &self,
        id: Uuid,
        status: ServiceStatus,
    ) -> Result<UpdateResult, StoreError>;
}

/// StoreState
///
/// The concrete type used to share the persistence layer access across the
/// application state.
pub type StoreState = Arc<dyn ResourceStore>;

/// PostgresStore
///
/// The concrete implementation of the `ResourceStore` trait, backed by
/// PostgreSQL. The pool handle is constructed once at process start and shared
/// by reference; it is internally synchronized, so no additional locking is
/// required at this layer.
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Creates a new store instance using the initialized connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const SERVICE_COLUMNS: &str = "id, service_provider_email, service_provider_name, \
     service_provider_image, service_name, price, service_area, description, image_url";

const PURCHASED_COLUMNS: &str = "id, current_user_email, service_provider_email, service_id, \
     service_name, price, service_taking_date, special_instruction, status";

#[async_trait]
impl ResourceStore for PostgresStore {
    /// list_services
    ///
    /// Unscoped, this is the public catalogue. Scoped, it is the owner-filtered
    /// view backing `/manage-services`; the caller is responsible for having
    /// already matched `provider_email` against the authenticated identity.
    async fn list_services(
        &self,
        provider_email: Option<&str>,
    ) -> Result<Vec<ServiceListing>, StoreError> {
        let rows = match provider_email {
            Some(email) => {
                let query = format!(
                    "SELECT {SERVICE_COLUMNS} FROM services \
                     WHERE service_provider_email = $1 ORDER BY service_name ASC"
                );
                sqlx::query_as::<_, ServiceListing>(&query)
                    .bind(email)
                    .fetch_all(&self.pool)
                    .await?
            }
            None => {
                let query = format!("SELECT {SERVICE_COLUMNS} FROM services ORDER BY service_name ASC");
                sqlx::query_as::<_, ServiceListing>(&query)
                    .fetch_all(&self.pool)
                    .await?
            }
        };
        Ok(rows)
    }

    /// create_service
    ///
    /// Inserts a new listing. The identifier is generated here, never accepted
    /// from the client.
    async fn create_service(
        &self,
        doc: CreateServiceRequest,
    ) -> Result<InsertResult, StoreError> {
        let new_id = Uuid::new_v4();
        sqlx::query(
            "INSERT INTO services (id, service_provider_email, service_provider_name, \
             service_provider_image, service_name, price, service_area, description, image_url) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
        )
        .bind(new_id)
        .bind(doc.service_provider_email)
        .bind(doc.service_provider_name)
        .bind(doc.service_provider_image)
        .bind(doc.service_name)
        .bind(doc.price)
        .bind(doc.service_area)
        .bind(doc.description)
        .bind(doc.image_url)
        .execute(&self.pool)
        .await?;

        Ok(InsertResult {
            acknowledged: true,
            inserted_id: new_id,
        })
    }

    /// update_service
    ///
    /// Partial field replace using COALESCE, so only the fields present in the
    /// payload change. Postgres reports a single affected-row figure for
    /// UPDATE, so matched and modified counts are reported equal.
    async fn update_service(
        &self,
        id: Uuid,
        fields: UpdateServiceRequest,
    ) -> Result<UpdateResult, StoreError> {
        let result = sqlx::query(
            "UPDATE services SET \
                service_provider_email = COALESCE($2, service_provider_email), \
                service_provider_name = COALESCE($3, service_provider_name), \
                service_provider_image = COALESCE($4, service_provider_image), \
                service_name = COALESCE($5, service_name), \
                price = COALESCE($6, price), \
                service_area = COALESCE($7, service_area), \
                description = COALESCE($8, description), \
                image_url = COALESCE($9, image_url) \
             WHERE id = $1",
        )
        .bind(id)
        .bind(fields.service_provider_email)
        .bind(fields.service_provider_name)
        .bind(fields.service_provider_image)
        .bind(fields.service_name)
        .bind(fields.price)
        .bind(fields.service_area)
        .bind(fields.description)
        .bind(fields.image_url)
        .execute(&self.pool)
        .await?;

        Ok(UpdateResult {
            acknowledged: true,
            matched_count: result.rows_affected(),
            modified_count: result.rows_affected(),
        })
    }

    /// delete_service
    ///
    /// Idempotent at the contract level: a vanished id yields a zero count.
    async fn delete_service(&self, id: Uuid) -> Result<DeleteResult, StoreError> {
        let result = sqlx::query("DELETE FROM services WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(DeleteResult {
            acknowledged: true,
            deleted_count: result.rows_affected(),
        })
    }

    /// list_purchased_items
    ///
    /// Buyer-side view of the purchases collection.
    async fn list_purchased_items(
        &self,
        buyer_email: Option<&str>,
    ) -> Result<Vec<PurchasedItem>, StoreError> {
        let rows = match buyer_email {
            Some(email) => {
                let query = format!(
                    "SELECT {PURCHASED_COLUMNS} FROM purchased_items \
                     WHERE current_user_email = $1 ORDER BY service_name ASC"
                );
                sqlx::query_as::<_, PurchasedItem>(&query)
                    .bind(email)
                    .fetch_all(&self.pool)
                    .await?
            }
            None => {
                let query =
                    format!("SELECT {PURCHASED_COLUMNS} FROM purchased_items ORDER BY service_name ASC");
                sqlx::query_as::<_, PurchasedItem>(&query)
                    .fetch_all(&self.pool)
                    .await?
            }
        };
        Ok(rows)
    }

    /// list_provider_tasks
    ///
    /// Provider-side view of the same collection, filtered on the provider
    /// owner field instead of the buyer field.
    async fn list_provider_tasks(
        &self,
        provider_email: Option<&str>,
    ) -> Result<Vec<PurchasedItem>, StoreError> {
        let rows = match provider_email {
            Some(email) => {
                let query = format!(
                    "SELECT {PURCHASED_COLUMNS} FROM purchased_items \
                     WHERE service_provider_email = $1 ORDER BY service_name ASC"
                );
                sqlx::query_as::<_, PurchasedItem>(&query)
                    .bind(email)
                    .fetch_all(&self.pool)
                    .await?
            }
            None => {
                let query =
                    format!("SELECT {PURCHASED_COLUMNS} FROM purchased_items ORDER BY service_name ASC");
                sqlx::query_as::<_, PurchasedItem>(&query)
                    .fetch_all(&self.pool)
                    .await?
            }
        };
        Ok(rows)
    }

    /// create_purchased_item
    ///
    /// Records a purchase. Status defaults to `pending` at the payload level
    /// when the client omits it.
    async fn create_purchased_item(
        &self,
        doc: CreatePurchasedItemRequest,
    ) -> Result<InsertResult, StoreError> {
        let new_id = Uuid::new_v4();
        sqlx::query(
            "INSERT INTO purchased_items (id, current_user_email, service_provider_email, \
             service_id, service_name, price, service_taking_date, special_instruction, status) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
        )
        .bind(new_id)
        .bind(doc.current_user_email)
        .bind(doc.service_provider_email)
        .bind(doc.service_id)
        .bind(doc.service_name)
        .bind(doc.price)
        .bind(doc.service_taking_date)
        .bind(doc.special_instruction)
        .bind(doc.status)
        .execute(&self.pool)
        .await?;

        Ok(InsertResult {
            acknowledged: true,
            inserted_id: new_id,
        })
    }

    /// update_purchase_status
    ///
    /// Touches exactly one column. Arbitrary field replacement is not possible
    /// through this path, keeping the buyer/provider linkage immutable.
    async fn update_purchase_status(
        &self,
        id: Uuid,
        status: ServiceStatus,
    ) -> Result<UpdateResult, StoreError> {
        let result = sqlx::query("UPDATE purchased_items SET status = $2 WHERE id = $1")
            .bind(id)
            .bind(status)
            .execute(&self.pool)
            .await?;

        Ok(UpdateResult {
            acknowledged: true,
            matched_count: result.rows_affected(),
            modified_count: result.rows_affected(),
        })
    }
}
