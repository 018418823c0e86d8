use crate::{
    AppState,
    auth::{Session, TOKEN_COOKIE, issue_token},
    error::ApiError,
    models::{
        AuthAck, CreatePurchasedItemRequest, CreateServiceRequest, DeleteResult, InsertResult,
        LoginRequest, PurchasedItem, ServiceListing, StatusUpdateRequest, UpdateResult,
        UpdateServiceRequest,
    },
};
use axum::{
    Json,
    extract::{Path, Query, State},
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::Deserialize;
use uuid::Uuid;

// --- Filter Structs ---

/// OwnerQuery
///
/// The caller-asserted identity parameter accepted by the scoped list endpoints.
/// On `/manage-services` it is checked against the session subject; on the
/// guard-only list routes an omitted value falls back to an unfiltered query.
#[derive(Deserialize, utoipa::IntoParams)]
pub struct OwnerQuery {
    /// Email the caller claims to act as.
    pub email: Option<String>,
}

/// parse_id
///
/// Typed identifier parse step: a path segment that is not a well-formed UUID
/// is a client error (400), distinguished from a store failure (500).
fn parse_id(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| ApiError::BadId(raw.to_owned()))
}

// --- Handlers ---

/// issue_jwt
///
/// [Public Route] Issues a signed identity token for the posted email and sets
/// it as the HTTP-only `token` cookie. The cookie is inaccessible to page
/// scripts; the 5-hour validity window lives inside the signed payload, not in
/// a cookie attribute.
#[utoipa::path(
    post,
    path = "/jwt",
    request_body = LoginRequest,
    responses((status = 200, description = "Token issued, cookie set", body = AuthAck))
)]
pub async fn issue_jwt(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(payload): Json<LoginRequest>,
) -> Result<(CookieJar, Json<AuthAck>), ApiError> {
    let token = issue_token(&payload.email, &state.config.jwt_secret)?;

    let mut cookie = Cookie::new(TOKEN_COOKIE, token);
    cookie.set_path("/");
    cookie.set_http_only(true);
    // The original deployment terminates TLS upstream; 'true' in production if serving HTTPS.
    cookie.set_secure(false);
    cookie.set_same_site(SameSite::Lax);

    Ok((jar.add(cookie), Json(AuthAck { success: true })))
}

/// logout
///
/// [Public Route] Clears the identity cookie. Verification is stateless, so an
/// already-issued token held elsewhere remains valid until its natural expiry;
/// this endpoint only removes the copy the browser sends.
#[utoipa::path(
    post,
    path = "/logout",
    responses((status = 200, description = "Cookie cleared", body = AuthAck))
)]
pub async fn logout(jar: CookieJar) -> (CookieJar, Json<AuthAck>) {
    let mut removal = Cookie::from(TOKEN_COOKIE);
    removal.set_path("/");

    (jar.remove(removal), Json(AuthAck { success: true }))
}

/// create_service
///
/// [Public Route] Submits a new service listing. The store assigns the
/// identifier and returns it in the insert result.
#[utoipa::path(
    post,
    path = "/services",
    request_body = CreateServiceRequest,
    responses((status = 200, description = "Created", body = InsertResult))
)]
pub async fn create_service(
    State(state): State<AppState>,
    Json(payload): Json<CreateServiceRequest>,
) -> Result<Json<InsertResult>, ApiError> {
    let result = state.store.create_service(payload).await?;
    Ok(Json(result))
}

/// list_services
///
/// [Public Route] Lists the whole service catalogue. No identity involved.
#[utoipa::path(
    get,
    path = "/services",
    responses((status = 200, description = "All listings", body = [ServiceListing]))
)]
pub async fn list_services(
    State(state): State<AppState>,
) -> Result<Json<Vec<ServiceListing>>, ApiError> {
    let services = state.store.list_services(None).await?;
    Ok(Json(services))
}

/// add_service
///
/// [Authenticated Route] Submits a new service listing from a logged-in
/// provider. Same insert as the public submission route; the session gate is
/// the only difference.
#[utoipa::path(
    post,
    path = "/add-services",
    request_body = CreateServiceRequest,
    responses(
        (status = 200, description = "Created", body = InsertResult),
        (status = 401, description = "No valid session")
    )
)]
pub async fn add_service(
    _session: Session,
    State(state): State<AppState>,
    Json(payload): Json<CreateServiceRequest>,
) -> Result<Json<InsertResult>, ApiError> {
    let result = state.store.create_service(payload).await?;
    Ok(Json(result))
}

/// manage_services
///
/// [Authenticated + Ownership-Filtered Route] Lists the listings owned by the
/// provider the caller claims to be.
///
/// *Authorization*: the claimed `email` query parameter must exactly match the
/// session subject; any other value, or no value at all, is 403. The store
/// query is then scoped to that same owner field, so the response can only ever
/// contain the caller's own records.
#[utoipa::path(
    get,
    path = "/manage-services",
    params(OwnerQuery),
    responses(
        (status = 200, description = "Provider's own listings", body = [ServiceListing]),
        (status = 401, description = "No valid session"),
        (status = 403, description = "Session does not match claimed identity")
    )
)]
pub async fn manage_services(
    session: Session,
    State(state): State<AppState>,
    Query(query): Query<OwnerQuery>,
) -> Result<Json<Vec<ServiceListing>>, ApiError> {
    let email = session.require_owner(query.email.as_deref())?;

    let services = state.store.list_services(Some(email)).await?;
    Ok(Json(services))
}

/// create_purchased_item
///
/// [Public Route] Records a purchase. A missing `status` in the payload
/// defaults to `pending`.
#[utoipa::path(
    post,
    path = "/purchased-items",
    request_body = CreatePurchasedItemRequest,
    responses((status = 200, description = "Recorded", body = InsertResult))
)]
pub async fn create_purchased_item(
    State(state): State<AppState>,
    Json(payload): Json<CreatePurchasedItemRequest>,
) -> Result<Json<InsertResult>, ApiError> {
    let result = state.store.create_purchased_item(payload).await?;
    Ok(Json(result))
}

/// list_purchased_items
///
/// [Authenticated Route] Buyer-side purchase history. When `email` is present
/// the result is scoped to that buyer; when omitted the query is unfiltered.
/// The unfiltered fallback reproduces the upstream behavior this service
/// replaces; see DESIGN.md before tightening it.
#[utoipa::path(
    get,
    path = "/purchased-items",
    params(OwnerQuery),
    responses(
        (status = 200, description = "Purchases", body = [PurchasedItem]),
        (status = 401, description = "No valid session")
    )
)]
pub async fn list_purchased_items(
    _session: Session,
    State(state): State<AppState>,
    Query(query): Query<OwnerQuery>,
) -> Result<Json<Vec<PurchasedItem>>, ApiError> {
    let items = state.store.list_purchased_items(query.email.as_deref()).await?;
    Ok(Json(items))
}

/// list_service_todo_items
///
/// [Authenticated Route] Provider-side work queue over the same collection,
/// filtered on the provider owner field. Same unfiltered fallback as the
/// buyer-side route when `email` is omitted.
#[utoipa::path(
    get,
    path = "/servicestodo-items",
    params(OwnerQuery),
    responses(
        (status = 200, description = "Provider tasks", body = [PurchasedItem]),
        (status = 401, description = "No valid session")
    )
)]
pub async fn list_service_todo_items(
    _session: Session,
    State(state): State<AppState>,
    Query(query): Query<OwnerQuery>,
) -> Result<Json<Vec<PurchasedItem>>, ApiError> {
    let items = state.store.list_provider_tasks(query.email.as_deref()).await?;
    Ok(Json(items))
}

/// update_service
///
/// [Public Route] Partial field replace on a listing. The payload type carries
/// no identifier, so the record's identity cannot be rewritten.
#[utoipa::path(
    put,
    path = "/services/{id}",
    params(("id" = String, Path, description = "Listing ID")),
    request_body = UpdateServiceRequest,
    responses(
        (status = 200, description = "Update result", body = UpdateResult),
        (status = 400, description = "Malformed id")
    )
)]
pub async fn update_service(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<UpdateServiceRequest>,
) -> Result<Json<UpdateResult>, ApiError> {
    let id = parse_id(&id)?;

    let result = state.store.update_service(id, payload).await?;
    Ok(Json(result))
}

/// update_purchase_status
///
/// [Public Route] Transitions a purchased item's status. This is the only
/// mutation path for purchases; every other field is immutable after creation.
#[utoipa::path(
    patch,
    path = "/servicestodo-items/{id}",
    params(("id" = String, Path, description = "Purchased item ID")),
    request_body = StatusUpdateRequest,
    responses(
        (status = 200, description = "Update result", body = UpdateResult),
        (status = 400, description = "Malformed id")
    )
)]
pub async fn update_purchase_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<StatusUpdateRequest>,
) -> Result<Json<UpdateResult>, ApiError> {
    let id = parse_id(&id)?;

    let result = state
        .store
        .update_purchase_status(id, payload.service_status)
        .await?;
    Ok(Json(result))
}

/// delete_service
///
/// [Public Route] Deletes a listing. Deleting an id that no longer exists is a
/// successful call with `deletedCount = 0`, so the operation is idempotent.
#[utoipa::path(
    delete,
    path = "/services/{id}",
    params(("id" = String, Path, description = "Listing ID")),
    responses(
        (status = 200, description = "Delete result", body = DeleteResult),
        (status = 400, description = "Malformed id")
    )
)]
pub async fn delete_service(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<DeleteResult>, ApiError> {
    let id = parse_id(&id)?;

    let result = state.store.delete_service(id).await?;
    Ok(Json(result))
}
