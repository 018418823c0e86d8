use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{delete, get, patch, post, put},
};

/// Public Router Module
///
/// Defines endpoints that are **unauthenticated** and accessible to any client.
/// This includes the identity gateway itself (`/jwt`, `/logout`), since a client
/// necessarily has no session before logging in, plus the public catalogue and
/// the pass-through mutations the upstream API exposes without a session check.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        // GET /health
        // A simple, unauthenticated endpoint used for monitoring and load balancer checks.
        // Returns "ok" immediately to verify the service is running and responsive.
        .route("/health", get(|| async { "ok" }))
        // POST /jwt
        // Issues a signed identity token for the posted email and sets the
        // HTTP-only `token` cookie on the response.
        .route("/jwt", post(handlers::issue_jwt))
        // POST /logout
        // Clears the `token` cookie. Stateless verification means a token held
        // elsewhere stays valid until expiry; see the handler docs.
        .route("/logout", post(handlers::logout))
        // GET/POST /services
        // The open catalogue: anyone can browse listings, and submission is
        // accepted without a session on this path (the guarded variant lives at
        // /add-services in the authenticated router).
        .route(
            "/services",
            get(handlers::list_services).post(handlers::create_service),
        )
        // PUT/DELETE /services/{id}
        // Listing mutations keyed by store identifier. A malformed id is a 400;
        // a well-formed id that matches nothing reports a zero count.
        .route(
            "/services/{id}",
            put(handlers::update_service).delete(handlers::delete_service),
        )
        // POST /purchased-items
        // Records a purchase. The buyer identity travels in the document itself.
        .route("/purchased-items", post(handlers::create_purchased_item))
        // PATCH /servicestodo-items/{id}
        // Status transition for a purchased item. The only purchase mutation.
        .route(
            "/servicestodo-items/{id}",
            patch(handlers::update_purchase_status),
        )
}
