use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::routing::post;
use axum::{Json, Router};
use tracing::{error, info};
use vcon_contracts::{
    AdmissionResponse, AdmitRequestDto, ErrorResponse, IngressListQuery, VconDocumentDto,
};
use vcon_core::VconDocument;

use crate::auth::{authorize, authorize_global_only, extract_key, AuthDecision};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/vcon", post(admit_global))
        .route("/vcon/external-ingress", post(admit_scoped))
}

fn known_ingress_list(state: &AppState, ingress_list: &str) -> bool {
    state
        .config
        .chains
        .iter()
        .any(|c| c.enabled && c.ingress_lists.contains(ingress_list))
}

fn dto_to_document(dto: VconDocumentDto) -> VconDocument {
    VconDocument {
        uuid: dto.uuid,
        created_at: dto.created_at,
        tags: dto
            .tags
            .into_iter()
            .map(|t| vcon_core::Tag {
                name: t.name,
                value: t.value,
            })
            .collect(),
        body: dto.body,
    }
}

/// `POST /vcon` (§6.1): global-key-only, ingress list named in the body.
#[utoipa::path(
    post,
    path = "/vcon",
    request_body = AdmitRequestDto,
    responses(
        (status = 200, description = "admitted", body = AdmissionResponse),
        (status = 400, description = "malformed body or missing ingress_list"),
        (status = 403, description = "auth failure"),
        (status = 404, description = "unknown ingress list"),
        (status = 409, description = "uuid conflict"),
        (status = 500, description = "substrate failure"),
    )
)]
pub(crate) async fn admit_global(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<AdmitRequestDto>,
) -> impl IntoResponse {
    let key = match extract_key(&headers, &state.config.api_header_name) {
        Some(k) => k,
        None => {
            return (
                StatusCode::FORBIDDEN,
                Json(ErrorResponse::new("missing api key header")),
            )
                .into_response()
        }
    };

    if authorize_global_only(&state.config, &key) != AuthDecision::GlobalAdmin {
        return (StatusCode::FORBIDDEN, Json(ErrorResponse::new("forbidden"))).into_response();
    }

    admit(state, &req.ingress_list, req.vcon).await
}

/// `POST /vcon/external-ingress?ingress_list=<name>` (§6.1): global or scoped key.
#[utoipa::path(
    post,
    path = "/vcon/external-ingress",
    params(IngressListQuery),
    request_body = VconDocumentDto,
    responses(
        (status = 200, description = "admitted", body = AdmissionResponse),
        (status = 400, description = "malformed body or missing ingress_list"),
        (status = 403, description = "auth failure"),
        (status = 404, description = "unknown ingress list"),
        (status = 409, description = "uuid conflict"),
        (status = 500, description = "substrate failure"),
    )
)]
pub(crate) async fn admit_scoped(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<IngressListQuery>,
    Json(doc): Json<VconDocumentDto>,
) -> impl IntoResponse {
    let key = match extract_key(&headers, &state.config.api_header_name) {
        Some(k) => k,
        None => {
            return (
                StatusCode::FORBIDDEN,
                Json(ErrorResponse::new("missing api key header")),
            )
                .into_response()
        }
    };

    if authorize(&state.config, &key, &query.ingress_list) == AuthDecision::Forbidden {
        return (StatusCode::FORBIDDEN, Json(ErrorResponse::new("forbidden"))).into_response();
    }

    admit(state, &query.ingress_list, doc).await
}

/// Shared admission path for both routes: the state-machine of §4.7.
/// `RECEIVED --auth_ok--> AUTHENTICATED --put_ok--> STORED --push_ok--> ENQUEUED`.
/// Auth is already resolved by the caller; this handles `put` then `push`, with
/// rollback on push failure (§8 invariant 6).
async fn admit(
    state: AppState,
    ingress_list: &str,
    dto: VconDocumentDto,
) -> axum::response::Response {
    if !known_ingress_list(&state, ingress_list) {
        return (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse::new(format!(
                "unknown ingress list '{ingress_list}'"
            ))),
        )
            .into_response();
    }

    let doc = dto_to_document(dto);
    let uuid = doc.uuid;

    match state.store.get(uuid).await {
        Ok(Some(_)) => {
            return (
                StatusCode::CONFLICT,
                Json(ErrorResponse::new(format!("uuid {uuid} already exists"))),
            )
                .into_response()
        }
        Ok(None) => {}
        Err(e) => {
            error!("admission get failed: {e}");
            return (StatusCode::INTERNAL_SERVER_ERROR, Json(ErrorResponse::new(e.to_string())))
                .into_response();
        }
    }

    if let Err(e) = state.store.put(&doc).await {
        error!("admission put failed: {e}");
        return (StatusCode::INTERNAL_SERVER_ERROR, Json(ErrorResponse::new(e.to_string())))
            .into_response();
    }

    if let Err(e) = state.substrate.push_right(ingress_list, &uuid.to_string()).await {
        // put succeeded but push failed: roll back so V has no orphan (§4.7, §8 invariant 6).
        error!("admission push failed, rolling back put: {e}");
        let _ = state.store.delete(uuid).await;
        return (StatusCode::INTERNAL_SERVER_ERROR, Json(ErrorResponse::new(e.to_string())))
            .into_response();
    }

    info!(%uuid, ingress_list, "vcon admitted");
    (
        StatusCode::OK,
        Json(AdmissionResponse {
            uuid,
            ingress_list: ingress_list.to_string(),
        }),
    )
        .into_response()
}
