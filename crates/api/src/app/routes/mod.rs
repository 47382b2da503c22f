use axum::Router;

pub mod admin;
pub mod employee;
pub mod system;
pub mod vendor;
pub mod ws;

/// All bearer-protected routes.
pub fn router() -> Router {
    Router::new()
        .merge(admin::router())
        .merge(employee::router())
        .merge(vendor::router())
}
