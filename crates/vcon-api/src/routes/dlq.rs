use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use tracing::error;
use vcon_contracts::{
    DlqListResponse, DlqReprocessRequest, DlqReprocessResponse, ErrorResponse, IngressListQuery,
};

use crate::auth::{authorize_global_only, extract_key, AuthDecision};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/dlq", get(list_dlq))
        .route("/dlq/reprocess", post(reprocess_dlq))
}

fn require_global_key(state: &AppState, headers: &HeaderMap) -> Result<(), axum::response::Response> {
    let key = extract_key(headers, &state.config.api_header_name)
        .ok_or_else(|| (StatusCode::FORBIDDEN, Json(ErrorResponse::new("missing api key header"))).into_response())?;
    if authorize_global_only(&state.config, &key) != AuthDecision::GlobalAdmin {
        return Err((StatusCode::FORBIDDEN, Json(ErrorResponse::new("forbidden"))).into_response());
    }
    Ok(())
}

/// `GET /dlq?ingress_list=<name>` (§6.1, global-key): list DLQ contents.
#[utoipa::path(
    get,
    path = "/dlq",
    params(IngressListQuery),
    responses(
        (status = 200, description = "dlq contents", body = DlqListResponse),
        (status = 403, description = "auth failure"),
        (status = 500, description = "substrate failure"),
    )
)]
pub(crate) async fn list_dlq(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<IngressListQuery>,
) -> impl IntoResponse {
    if let Err(resp) = require_global_key(&state, &headers) {
        return resp;
    }

    match state.dlq.list(&query.ingress_list).await {
        Ok(entries) => (
            StatusCode::OK,
            Json(DlqListResponse {
                ingress_list: query.ingress_list,
                entries,
            }),
        )
            .into_response(),
        Err(e) => {
            error!("dlq list failed: {e}");
            (StatusCode::INTERNAL_SERVER_ERROR, Json(ErrorResponse::new(e.to_string()))).into_response()
        }
    }
}

/// `POST /dlq/reprocess?ingress_list=<name>` (§6.1, global-key): move DLQ entries
/// back to ingress head (§4.8, S6).
#[utoipa::path(
    post,
    path = "/dlq/reprocess",
    params(IngressListQuery),
    request_body = DlqReprocessRequest,
    responses(
        (status = 200, description = "reprocessed", body = DlqReprocessResponse),
        (status = 403, description = "auth failure"),
        (status = 500, description = "substrate failure"),
    )
)]
pub(crate) async fn reprocess_dlq(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<IngressListQuery>,
    Json(req): Json<DlqReprocessRequest>,
) -> impl IntoResponse {
    if let Err(resp) = require_global_key(&state, &headers) {
        return resp;
    }

    match state.dlq.reprocess(&query.ingress_list, req.max_items).await {
        Ok(reprocessed) => (
            StatusCode::OK,
            Json(DlqReprocessResponse {
                ingress_list: query.ingress_list,
                reprocessed,
            }),
        )
            .into_response(),
        Err(e) => {
            error!("dlq reprocess failed: {e}");
            (StatusCode::INTERNAL_SERVER_ERROR, Json(ErrorResponse::new(e.to_string()))).into_response()
        }
    }
}

