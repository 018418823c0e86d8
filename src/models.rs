use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use ts_rs::TS;
use utoipa::ToSchema;
use uuid::Uuid;

// --- Core Application Schemas (Mapped to Database) ---

/// ServiceListing
///
/// A service offered on the marketplace, stored in the `services` collection.
/// Owned by the provider identified by `service_provider_email`; the owner field
/// is what every provider-scoped query filters on.
///
/// Wire format is camelCase (`serviceProviderEmail`, `imageUrl`, ...) for
/// compatibility with the documents the frontend already exchanges.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ServiceListing {
    /// Store-assigned identifier. Immutable post-creation.
    pub id: Uuid,
    // Owner field: every provider-scoped read filters on this.
    pub service_provider_email: String,
    pub service_provider_name: String,
    pub service_provider_image: Option<String>,
    pub service_name: String,
    pub price: f64,
    pub service_area: String,
    pub description: String,
    pub image_url: Option<String>,
}

/// PurchasedItem
///
/// A transaction linking a buyer (`current_user_email`) to a snapshot of a
/// provider's listing, stored in the `purchased_items` collection.
/// Created on purchase; mutated only through the status-transition operation;
/// never deleted in normal flow.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct PurchasedItem {
    pub id: Uuid,
    // Buyer side of the transaction.
    pub current_user_email: String,
    // Provider side; the `/servicestodo-items` view filters on this.
    pub service_provider_email: String,
    // Snapshot of the listing at purchase time.
    pub service_id: Uuid,
    pub service_name: String,
    pub price: f64,
    pub service_taking_date: Option<NaiveDate>,
    pub special_instruction: Option<String>,
    pub status: ServiceStatus,
}

/// ServiceStatus
///
/// The purchase lifecycle: pending -> in-progress -> completed/cancelled.
/// Stored as TEXT and serialized in kebab-case on the wire.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema, Default, sqlx::Type,
)]
#[serde(rename_all = "kebab-case")]
#[sqlx(rename_all = "kebab-case")]
#[ts(export)]
pub enum ServiceStatus {
    #[default]
    Pending,
    InProgress,
    Completed,
    Cancelled,
}

/// --- Request Payloads (Input Schemas) ---

/// LoginRequest
///
/// Input payload for the token issue endpoint (POST /jwt). The client posts its
/// user object; only the email matters here, everything else is ignored.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct LoginRequest {
    pub email: String,
}

/// CreateServiceRequest
///
/// Input payload for submitting a new listing. The store assigns the `id`;
/// clients cannot choose identifiers.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CreateServiceRequest {
    pub service_provider_email: String,
    pub service_provider_name: String,
    pub service_provider_image: Option<String>,
    pub service_name: String,
    pub price: f64,
    pub service_area: String,
    pub description: String,
    pub image_url: Option<String>,
}

/// UpdateServiceRequest
///
/// Partial update payload for modifying an existing listing (PUT /services/{id}).
/// There is deliberately no `id` field: identity is immutable post-creation, so
/// a client-supplied identifier has nowhere to land.
///
/// Uses `Option<T>` for all fields and `#[serde(skip_serializing_if = "Option::is_none")]`
/// to efficiently handle partial updates, ensuring only provided fields are included
/// in the JSON payload.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct UpdateServiceRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service_provider_email: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub service_provider_name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub service_provider_image: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub service_name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub service_area: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

/// CreatePurchasedItemRequest
///
/// Input payload for recording a purchase (POST /purchased-items).
/// A missing `status` defaults to `pending`.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CreatePurchasedItemRequest {
    pub current_user_email: String,
    pub service_provider_email: String,
    pub service_id: Uuid,
    pub service_name: String,
    pub price: f64,
    pub service_taking_date: Option<NaiveDate>,
    pub special_instruction: Option<String>,
    #[serde(default)]
    pub status: ServiceStatus,
}

/// StatusUpdateRequest
///
/// Input payload for the status transition (PATCH /servicestodo-items/{id}).
/// This is the only mutation path for purchased items; restricting the payload
/// to the status field keeps buyer/provider/audit fields immutable.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct StatusUpdateRequest {
    pub service_status: ServiceStatus,
}

/// --- Response Schemas (Output) ---

/// AuthAck
///
/// Acknowledgement body for the token issue and logout endpoints.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct AuthAck {
    pub success: bool,
}

/// InsertResult
///
/// Outcome of a store insert, shaped like the document-store driver reply the
/// frontend already consumes (`{acknowledged, insertedId}`).
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct InsertResult {
    pub acknowledged: bool,
    pub inserted_id: Uuid,
}

/// UpdateResult
///
/// Outcome of a store update (`{acknowledged, matchedCount, modifiedCount}`).
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct UpdateResult {
    pub acknowledged: bool,
    #[ts(type = "number")]
    pub matched_count: u64,
    #[ts(type = "number")]
    pub modified_count: u64,
}

/// DeleteResult
///
/// Outcome of a store delete (`{acknowledged, deletedCount}`).
/// A delete that matched nothing is a successful call with `deleted_count = 0`,
/// never an error, which makes deletion idempotent at the HTTP layer.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct DeleteResult {
    pub acknowledged: bool,
    #[ts(type = "number")]
    pub deleted_count: u64,
}
