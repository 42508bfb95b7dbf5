// Web layer - HTTP routes, sessions and page rendering.

pub mod auth_routes;
pub mod error;
pub mod news_routes;
pub mod notes_routes;
pub mod pages;
pub mod session;
pub mod state;
pub mod urls;

#[cfg(test)]
mod test_support;

pub use state::AppState;

use axum::response::Response;
use axum::routing::get;
use axum::Router;

/// The full application router.
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .merge(news_routes::routes())
        .merge(notes_routes::routes())
        .merge(auth_routes::routes())
        .with_state(state)
}

async fn root() -> Response {
    pages::redirect(urls::NEWS_HOME)
}
