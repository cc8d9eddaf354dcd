mod coursework;
mod export;
mod upload_coursework;

use axum::{routing::post, Router};

pub(crate) fn get_router() -> Router {
    Router::new()
        .route(
            "/_api/v1/coursework/upload",
            post(upload_coursework::upload_coursework),
        )
        .route(
            "/_api/v1/coursework/query",
            post(coursework::query_coursework),
        )
        .route("/_api/v1/coursework/rate", post(coursework::rate_coursework))
        .route(
            "/_api/v1/coursework/delete",
            post(coursework::delete_coursework),
        )
        .route(
            "/_api/v1/coursework/export-archive",
            post(export::export_archive),
        )
        .route(
            "/_api/v1/coursework/export-report",
            post(export::export_report),
        )
}
