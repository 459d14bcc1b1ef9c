use utoipa::OpenApi;
use vcon_contracts::{
    AdmissionResponse, AdmitRequestDto, DlqEntryDto, DlqListResponse, DlqReprocessRequest,
    DlqReprocessResponse, ErrorResponse, IngressListQuery, TagDto, VconDocumentDto,
};

/// Matches the teacher's `ApiDoc` derive + `/swagger-ui` mount (§10.8): documents
/// only the HTTP surface the core owns (admission, DLQ), not concrete link/storage
/// routes, which are out of scope.
#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::admission::admit_global,
        crate::routes::admission::admit_scoped,
        crate::routes::dlq::list_dlq,
        crate::routes::dlq::reprocess_dlq,
    ),
    components(schemas(
        AdmitRequestDto,
        VconDocumentDto,
        TagDto,
        AdmissionResponse,
        ErrorResponse,
        IngressListQuery,
        DlqListResponse,
        DlqEntryDto,
        DlqReprocessRequest,
        DlqReprocessResponse,
    )),
    tags((name = "conserver", description = "vCon pipeline orchestrator admission and DLQ surface"))
)]
pub struct ApiDoc;
