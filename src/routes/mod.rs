/// Router Module Index
///
/// Organizes the application's routing logic into security-segregated modules.
/// This structure ensures that access control is applied explicitly at the
/// module level (via Axum layers), preventing accidental exposure of protected
/// endpoints.

/// Routes accessible to all users (anonymous or logged-in): the public
/// catalogue, the token issue/logout pair, and the pass-through mutations.
pub mod public;

/// Routes protected by the `Session` extractor middleware.
/// Requires a validated identity token.
pub mod authenticated;
