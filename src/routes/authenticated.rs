use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, post},
};

/// Authenticated Router Module
///
/// Defines the routes accessible only to a caller holding a valid identity
/// token. The Session Guard middleware is layered over this router in `lib.rs`,
/// so none of these handlers run for an unauthenticated request.
///
/// Access Control Strategy:
/// Every handler here also takes the `Session` extractor as an argument, which
/// re-runs the same pure verification (defense in depth at zero I/O cost). The
/// ownership filter (`Session::require_owner`) is applied per-route where a
/// caller-asserted identity parameter is involved; the other routes are
/// guard-only by upstream contract.
pub fn authenticated_routes() -> Router<AppState> {
    Router::<AppState>::new()
        // POST /add-services
        // Listing submission for logged-in providers. Same insert as the public
        // /services path; the session gate is the difference.
        .route("/add-services", post(handlers::add_service))
        // GET /manage-services?email=
        // The provider's own listings. **Ownership-filtered**: the claimed
        // email must equal the session subject or the request is rejected with
        // 403 before any store access.
        .route("/manage-services", get(handlers::manage_services))
        // GET /purchased-items?email=
        // Buyer-side purchase history. Guard-only: an omitted email falls back
        // to an unfiltered query (preserved upstream behavior, see DESIGN.md).
        .route("/purchased-items", get(handlers::list_purchased_items))
        // GET /servicestodo-items?email=
        // Provider-side work queue over the purchases collection. Same
        // guard-only contract as the buyer view.
        .route(
            "/servicestodo-items",
            get(handlers::list_service_todo_items),
        )
}
