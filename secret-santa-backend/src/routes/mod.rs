pub mod gift;
pub mod join;
pub mod lottery;
pub mod register;

use axum::handler::Handler;
use axum::routing::post;
use axum::Router;

use crate::AppState;

/// Registers every endpoint both at its bare path and below `/api`.
#[derive(Default)]
pub struct ApiRouter {
    router: Router<AppState>,
}

impl ApiRouter {
    #[must_use]
    pub fn post<H, T>(self, path: &str, handler: H) -> Self
    where
        H: Handler<T, AppState>,
        T: 'static,
    {
        Self {
            router: self
                .router
                .route(&format!("/api{path}"), post(handler.clone()))
                .route(path, post(handler)),
        }
    }

    #[must_use]
    pub fn into_router(self) -> Router<AppState> {
        self.router
    }
}
