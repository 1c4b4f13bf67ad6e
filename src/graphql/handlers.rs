use axum::{
    http::{header::ORIGIN, HeaderMap},
    response::{Html, IntoResponse},
    Extension, Json,
};
use tracing::{debug, instrument};

use super::{AppSchema, RequestContext};
use crate::auth::extractors::Caller;

/// POST /graphql
#[instrument(skip_all, fields(user_id = ?user_id))]
pub async fn graphql_handler(
    Extension(schema): Extension<AppSchema>,
    Caller(user_id): Caller,
    headers: HeaderMap,
    Json(request): Json<async_graphql::Request>,
) -> impl IntoResponse {
    let origin = headers
        .get(ORIGIN)
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned);
    debug!(operation = ?request.operation_name, "graphql request");

    let mut response = schema
        .execute(request.data(RequestContext { user_id, origin }))
        .await;
    let headers = std::mem::take(&mut response.http_headers);
    (headers, Json(response))
}

/// GET /graphql
pub async fn graphiql() -> impl IntoResponse {
    Html(
        async_graphql::http::GraphiQLSource::build()
            .endpoint("/graphql")
            .finish(),
    )
}
