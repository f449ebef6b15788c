//! REST API for the CDR patient service.
//!
//! Exposes the patient directory, identifier, enrollment, program and
//! identifier-type operations over HTTP with OpenAPI documentation. All
//! business rules live in `cdr-core`; this crate maps requests to
//! commands, resolves the acting principal at the boundary, and maps core
//! errors to status codes.

pub mod dto;
pub mod error;

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::Json,
    routing::get,
    Router,
};
use tower_http::cors::CorsLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use cdr_core::clients::{DemographicClient, MetadataClient};
use cdr_core::services::{
    AssignIdentifierCommand, CompletionCommand, EnrollCommand, EnrollmentService,
    IdentifierService, IdentifierTypeCommand, IdentifierTypeService, PatientService,
    PreferenceUpdate, ProgramCommand, ProgramService, RegisterPatientCommand,
};
use cdr_core::store::MemoryStore;
use cdr_core::Principal;

use dto::{
    AssignIdentifierReq, CompleteEnrollmentReq, CreatePatientReq, EnrollReq, HealthRes,
    IdentifierTypeReq, PatientDto, PatientIdentifierDto, PatientIdentifierTypeDto,
    PatientProgramDto, ProgramDto, ProgramReq, UpdateIdentifierReq, UpdatePatientReq, VoidReq,
};
use error::{ApiError, ErrorRes};

/// Header carrying the authenticated person id. Resolution of the real
/// identity is owned by the gateway; absent or malformed values fall back
/// to the fixed system identity.
const ACTING_USER_HEADER: &str = "x-acting-user";
const SYSTEM_PRINCIPAL: Principal = Principal { person_id: 1 };

/// Application state shared across REST handlers.
#[derive(Clone)]
pub struct AppState {
    patients: Arc<PatientService>,
    identifiers: Arc<IdentifierService>,
    enrollments: Arc<EnrollmentService>,
    programs: Arc<ProgramService>,
    identifier_types: Arc<IdentifierTypeService>,
}

impl AppState {
    /// Wires every service onto one store and the given external clients.
    pub fn new(
        store: Arc<MemoryStore>,
        demographics: Arc<dyn DemographicClient>,
        metadata: Arc<dyn MetadataClient>,
    ) -> Self {
        Self {
            patients: Arc::new(PatientService::new(
                store.clone(),
                store.clone(),
                store.clone(),
                demographics,
                metadata,
            )),
            identifiers: Arc::new(IdentifierService::new(
                store.clone(),
                store.clone(),
                store.clone(),
            )),
            enrollments: Arc::new(EnrollmentService::new(
                store.clone(),
                store.clone(),
                store.clone(),
            )),
            programs: Arc::new(ProgramService::new(store.clone())),
            identifier_types: Arc::new(IdentifierTypeService::new(store)),
        }
    }
}

fn acting_principal(headers: &HeaderMap) -> Principal {
    headers
        .get(ACTING_USER_HEADER)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.parse::<i64>().ok())
        .map(Principal::new)
        .unwrap_or(SYSTEM_PRINCIPAL)
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health,
        list_patients,
        list_patients_both_voided,
        get_patient,
        create_patient,
        update_patient,
        void_patient,
        find_patient_by_identifier,
        list_patients_by_identifier_type,
        list_patients_by_program,
        list_patients_by_program_and_status,
        assign_identifier,
        update_identifier,
        void_identifier,
        enroll_patient,
        complete_enrollment,
        void_enrollment,
        list_programs,
        create_program,
        get_program,
        update_program,
        void_program,
        list_identifier_types,
        create_identifier_type,
        get_identifier_type,
        update_identifier_type,
        void_identifier_type,
    ),
    components(schemas(
        HealthRes,
        PatientDto,
        PatientIdentifierDto,
        PatientIdentifierTypeDto,
        PatientProgramDto,
        ProgramDto,
        dto::PersonDto,
        dto::LocationDto,
        dto::AuditDto,
        CreatePatientReq,
        UpdatePatientReq,
        VoidReq,
        AssignIdentifierReq,
        UpdateIdentifierReq,
        EnrollReq,
        CompleteEnrollmentReq,
        ProgramReq,
        IdentifierTypeReq,
        error::ErrorRes,
    ))
)]
struct ApiDoc;

/// Builds the application router with all routes, Swagger UI and CORS.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/patients", get(list_patients).post(create_patient))
        .route("/patients/both-voided", get(list_patients_both_voided))
        .route(
            "/patients/identifier",
            axum::routing::post(assign_identifier),
        )
        .route(
            "/patients/identifier/type/:type_id",
            get(list_patients_by_identifier_type),
        )
        .route(
            "/patients/identifier/:id",
            get(find_patient_by_identifier)
                .put(update_identifier)
                .delete(void_identifier),
        )
        .route("/patients/program/:program_id", get(list_patients_by_program))
        .route(
            "/patients/program/:program_id/status/:active",
            get(list_patients_by_program_and_status),
        )
        .route(
            "/patients/:id",
            get(get_patient).put(update_patient).delete(void_patient),
        )
        .route(
            "/patients/:id/program/:program_id",
            axum::routing::post(enroll_patient)
                .put(complete_enrollment)
                .delete(void_enrollment),
        )
        .route("/programs", get(list_programs).post(create_program))
        .route(
            "/programs/:id",
            get(get_program).put(update_program).delete(void_program),
        )
        .route(
            "/patient-identifier-types",
            get(list_identifier_types).post(create_identifier_type),
        )
        .route(
            "/patient-identifier-types/:id",
            get(get_identifier_type)
                .put(update_identifier_type)
                .delete(void_identifier_type),
        )
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[utoipa::path(
    get,
    path = "/health",
    responses((status = 200, description = "Health check response", body = HealthRes))
)]
/// Health check endpoint used by monitoring and load balancers.
async fn health() -> Json<HealthRes> {
    Json(HealthRes {
        ok: true,
        message: "CDR patient service is alive".into(),
    })
}

#[utoipa::path(
    get,
    path = "/patients",
    responses(
        (status = 200, description = "Active patients", body = [PatientDto]),
        (status = 500, description = "Internal server error", body = ErrorRes)
    )
)]
/// Lists active (non-voided) patients.
async fn list_patients(State(state): State<AppState>) -> Result<Json<Vec<PatientDto>>, ApiError> {
    let patients = state.patients.list_active()?;
    Ok(Json(patients.into_iter().map(PatientDto::from).collect()))
}

#[utoipa::path(
    get,
    path = "/patients/both-voided",
    responses((status = 200, description = "All patients, voided included", body = [PatientDto]))
)]
/// Lists every patient, voided records included.
async fn list_patients_both_voided(
    State(state): State<AppState>,
) -> Result<Json<Vec<PatientDto>>, ApiError> {
    let patients = state.patients.list_including_voided()?;
    Ok(Json(patients.into_iter().map(PatientDto::from).collect()))
}

#[utoipa::path(
    get,
    path = "/patients/{id}",
    params(("id" = i64, Path, description = "Patient id")),
    responses(
        (status = 200, description = "Hydrated patient", body = PatientDto),
        (status = 404, description = "Patient not found", body = ErrorRes)
    )
)]
/// Fetches one patient, hydrated with demographic data, identifiers and
/// enrollments. The demographic portion is empty when the external
/// service is unavailable.
async fn get_patient(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<PatientDto>, ApiError> {
    let hydrated = state.patients.get(id).await?;
    Ok(Json(hydrated.into()))
}

#[utoipa::path(
    post,
    path = "/patients",
    request_body = CreatePatientReq,
    responses(
        (status = 201, description = "Patient created", body = PatientDto),
        (status = 400, description = "Invalid request", body = ErrorRes)
    )
)]
/// Registers a patient. The id must be the Person id already assigned by
/// the demographic service; no Person record is created here.
async fn create_patient(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<CreatePatientReq>,
) -> Result<(StatusCode, Json<PatientDto>), ApiError> {
    let patient = state.patients.register(
        acting_principal(&headers),
        RegisterPatientCommand {
            patient_id: req.patient_id,
            allergies: req.allergies,
        },
    )?;
    Ok((StatusCode::CREATED, Json(patient.into())))
}

#[utoipa::path(
    put,
    path = "/patients/{id}",
    params(("id" = i64, Path, description = "Patient id")),
    request_body = UpdatePatientReq,
    responses(
        (status = 200, description = "Patient updated", body = PatientDto),
        (status = 404, description = "Patient not found", body = ErrorRes)
    )
)]
/// Updates a patient's clinical note. Only `allergies` is mutable.
async fn update_patient(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    headers: HeaderMap,
    Json(req): Json<UpdatePatientReq>,
) -> Result<Json<PatientDto>, ApiError> {
    let patient = state
        .patients
        .update(acting_principal(&headers), id, req.allergies)?;
    Ok(Json(patient.into()))
}

#[utoipa::path(
    delete,
    path = "/patients/{id}",
    params(("id" = i64, Path, description = "Patient id")),
    request_body = VoidReq,
    responses(
        (status = 204, description = "Patient voided"),
        (status = 404, description = "Patient not found", body = ErrorRes),
        (status = 502, description = "Demographic service void failed", body = ErrorRes)
    )
)]
/// Voids a patient. The external Person record is voided first; if that
/// call fails the local record is left untouched.
async fn void_patient(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    headers: HeaderMap,
    Json(req): Json<VoidReq>,
) -> Result<StatusCode, ApiError> {
    state
        .patients
        .retire(acting_principal(&headers), id, &req.void_reason)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/patients/identifier/{value}",
    params(("value" = String, Path, description = "Identifier value")),
    responses(
        (status = 200, description = "Patient carrying the identifier", body = PatientDto),
        (status = 404, description = "No patient with that identifier", body = ErrorRes)
    )
)]
/// Finds the patient carrying a non-voided identifier with this value.
async fn find_patient_by_identifier(
    State(state): State<AppState>,
    Path(value): Path<String>,
) -> Result<Json<PatientDto>, ApiError> {
    let patient = state.patients.find_by_identifier(&value)?;
    Ok(Json(patient.into()))
}

#[utoipa::path(
    get,
    path = "/patients/identifier/type/{type_id}",
    params(("type_id" = i32, Path, description = "Identifier type id")),
    responses((status = 200, description = "Patients with an identifier of this type", body = [PatientDto]))
)]
/// Lists patients holding a non-voided identifier of the given type.
async fn list_patients_by_identifier_type(
    State(state): State<AppState>,
    Path(type_id): Path<i32>,
) -> Result<Json<Vec<PatientDto>>, ApiError> {
    let patients = state.patients.list_by_identifier_type(type_id)?;
    Ok(Json(patients.into_iter().map(PatientDto::from).collect()))
}

#[utoipa::path(
    get,
    path = "/patients/program/{program_id}",
    params(("program_id" = i32, Path, description = "Program id")),
    responses((status = 200, description = "Patients enrolled in the program", body = [PatientDto]))
)]
/// Lists patients enrolled in a program.
async fn list_patients_by_program(
    State(state): State<AppState>,
    Path(program_id): Path<i32>,
) -> Result<Json<Vec<PatientDto>>, ApiError> {
    let patients = state.patients.list_by_program(program_id)?;
    Ok(Json(patients.into_iter().map(PatientDto::from).collect()))
}

#[utoipa::path(
    get,
    path = "/patients/program/{program_id}/status/{active}",
    params(
        ("program_id" = i32, Path, description = "Program id"),
        ("active" = bool, Path, description = "Program active flag")
    ),
    responses((status = 200, description = "Patients filtered by program status", body = [PatientDto]))
)]
/// Lists patients enrolled in a program, filtered by the program's active
/// flag.
async fn list_patients_by_program_and_status(
    State(state): State<AppState>,
    Path((program_id, active)): Path<(i32, bool)>,
) -> Result<Json<Vec<PatientDto>>, ApiError> {
    let patients = state.patients.list_by_program_and_status(program_id, active)?;
    Ok(Json(patients.into_iter().map(PatientDto::from).collect()))
}

#[utoipa::path(
    post,
    path = "/patients/identifier",
    request_body = AssignIdentifierReq,
    responses(
        (status = 201, description = "Identifier assigned", body = PatientIdentifierDto),
        (status = 400, description = "Conflict or invalid request", body = ErrorRes),
        (status = 404, description = "Patient or type not found", body = ErrorRes)
    )
)]
/// Assigns an identifier to a patient. A preferred assignment supersedes
/// the current preferred identifier of the same type.
async fn assign_identifier(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<AssignIdentifierReq>,
) -> Result<(StatusCode, Json<PatientIdentifierDto>), ApiError> {
    let identifier = state.identifiers.assign(
        acting_principal(&headers),
        AssignIdentifierCommand {
            patient_id: req.patient_id,
            identifier_type_id: req.identifier_type_id,
            identifier: req.identifier,
            preferred: req.preferred,
            location_id: req.location_id,
        },
    )?;
    Ok((StatusCode::CREATED, Json(identifier.into())))
}

#[utoipa::path(
    put,
    path = "/patients/identifier/{id}",
    params(("id" = i64, Path, description = "Identifier id")),
    request_body = UpdateIdentifierReq,
    responses(
        (status = 200, description = "Identifier updated", body = PatientIdentifierDto),
        (status = 400, description = "Preference conflict", body = ErrorRes),
        (status = 404, description = "Identifier not found", body = ErrorRes)
    )
)]
/// Changes an identifier's preference flag or location. The value itself
/// is immutable; un-preferring while a preferred identifier exists for
/// the pair is rejected.
async fn update_identifier(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    headers: HeaderMap,
    Json(req): Json<UpdateIdentifierReq>,
) -> Result<Json<PatientIdentifierDto>, ApiError> {
    let identifier = state.identifiers.change_preference(
        acting_principal(&headers),
        id,
        PreferenceUpdate {
            preferred: req.preferred,
            location_id: req.location_id,
        },
    )?;
    Ok(Json(identifier.into()))
}

#[utoipa::path(
    delete,
    path = "/patients/identifier/{id}",
    params(("id" = i64, Path, description = "Identifier id")),
    request_body = VoidReq,
    responses(
        (status = 204, description = "Identifier voided"),
        (status = 404, description = "Identifier not found", body = ErrorRes)
    )
)]
/// Voids an identifier. Preference is not re-balanced among the
/// remaining identifiers of the pair.
async fn void_identifier(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    headers: HeaderMap,
    Json(req): Json<VoidReq>,
) -> Result<StatusCode, ApiError> {
    state
        .identifiers
        .retire(acting_principal(&headers), id, &req.void_reason)?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post,
    path = "/patients/{id}/program/{program_id}",
    params(
        ("id" = i64, Path, description = "Patient id"),
        ("program_id" = i32, Path, description = "Program id")
    ),
    request_body = EnrollReq,
    responses(
        (status = 201, description = "Patient enrolled", body = PatientProgramDto),
        (status = 400, description = "Already enrolled", body = ErrorRes),
        (status = 404, description = "Patient or program not found", body = ErrorRes)
    )
)]
/// Enrolls a patient in a program. One enrollment may ever exist per
/// (patient, program) pair.
async fn enroll_patient(
    State(state): State<AppState>,
    Path((id, program_id)): Path<(i64, i32)>,
    headers: HeaderMap,
    Json(req): Json<EnrollReq>,
) -> Result<(StatusCode, Json<PatientProgramDto>), ApiError> {
    let enrollment = state.enrollments.enroll(
        acting_principal(&headers),
        EnrollCommand {
            patient_id: id,
            program_id,
            date_enrolled: req.date_enrolled,
            location_id: req.location_id,
        },
    )?;
    Ok((StatusCode::CREATED, Json(enrollment.into())))
}

#[utoipa::path(
    put,
    path = "/patients/{id}/program/{program_id}",
    params(
        ("id" = i64, Path, description = "Patient id"),
        ("program_id" = i32, Path, description = "Program id")
    ),
    request_body = CompleteEnrollmentReq,
    responses(
        (status = 200, description = "Completion recorded", body = PatientProgramDto),
        (status = 404, description = "Patient or enrollment not found", body = ErrorRes)
    )
)]
/// Records completion on an enrollment. Enrollment date and location are
/// untouched.
async fn complete_enrollment(
    State(state): State<AppState>,
    Path((id, program_id)): Path<(i64, i32)>,
    headers: HeaderMap,
    Json(req): Json<CompleteEnrollmentReq>,
) -> Result<Json<PatientProgramDto>, ApiError> {
    let enrollment = state.enrollments.record_completion(
        acting_principal(&headers),
        id,
        program_id,
        CompletionCommand {
            date_completed: req.date_completed,
            outcome_concept_id: req.outcome_concept_id,
            outcome_comment: req.outcome_comment,
        },
    )?;
    Ok(Json(enrollment.into()))
}

#[utoipa::path(
    delete,
    path = "/patients/{id}/program/{program_id}",
    params(
        ("id" = i64, Path, description = "Patient id"),
        ("program_id" = i32, Path, description = "Program id")
    ),
    request_body = VoidReq,
    responses(
        (status = 204, description = "Enrollment voided"),
        (status = 404, description = "Enrollment not found", body = ErrorRes)
    )
)]
/// Voids an enrollment. The voided row still blocks re-enrollment in the
/// same program.
async fn void_enrollment(
    State(state): State<AppState>,
    Path((id, program_id)): Path<(i64, i32)>,
    headers: HeaderMap,
    Json(req): Json<VoidReq>,
) -> Result<StatusCode, ApiError> {
    state.enrollments.retire_for_patient(
        acting_principal(&headers),
        id,
        program_id,
        &req.void_reason,
    )?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/programs",
    responses((status = 200, description = "Active programs", body = [ProgramDto]))
)]
/// Lists non-voided programs.
async fn list_programs(State(state): State<AppState>) -> Result<Json<Vec<ProgramDto>>, ApiError> {
    let programs = state.programs.list()?;
    Ok(Json(programs.into_iter().map(ProgramDto::from).collect()))
}

#[utoipa::path(
    post,
    path = "/programs",
    request_body = ProgramReq,
    responses(
        (status = 201, description = "Program created", body = ProgramDto),
        (status = 400, description = "Invalid or duplicate program", body = ErrorRes)
    )
)]
/// Creates a program. Name and code are required and unique.
async fn create_program(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<ProgramReq>,
) -> Result<(StatusCode, Json<ProgramDto>), ApiError> {
    let program = state.programs.create(
        acting_principal(&headers),
        ProgramCommand {
            name: req.name,
            program_code: req.program_code,
            description: req.description,
            active: req.active,
        },
    )?;
    Ok((StatusCode::CREATED, Json(program.into())))
}

#[utoipa::path(
    get,
    path = "/programs/{id}",
    params(("id" = i32, Path, description = "Program id")),
    responses(
        (status = 200, description = "Program", body = ProgramDto),
        (status = 404, description = "Program not found", body = ErrorRes)
    )
)]
/// Fetches one program.
async fn get_program(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<ProgramDto>, ApiError> {
    Ok(Json(state.programs.get(id)?.into()))
}

#[utoipa::path(
    put,
    path = "/programs/{id}",
    params(("id" = i32, Path, description = "Program id")),
    request_body = ProgramReq,
    responses(
        (status = 200, description = "Program updated", body = ProgramDto),
        (status = 404, description = "Program not found", body = ErrorRes)
    )
)]
/// Updates a program definition.
async fn update_program(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    headers: HeaderMap,
    Json(req): Json<ProgramReq>,
) -> Result<Json<ProgramDto>, ApiError> {
    let program = state.programs.update(
        acting_principal(&headers),
        id,
        ProgramCommand {
            name: req.name,
            program_code: req.program_code,
            description: req.description,
            active: req.active,
        },
    )?;
    Ok(Json(program.into()))
}

#[utoipa::path(
    delete,
    path = "/programs/{id}",
    params(("id" = i32, Path, description = "Program id")),
    request_body = VoidReq,
    responses(
        (status = 204, description = "Program voided"),
        (status = 404, description = "Program not found", body = ErrorRes)
    )
)]
/// Voids a program.
async fn void_program(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    headers: HeaderMap,
    Json(req): Json<VoidReq>,
) -> Result<StatusCode, ApiError> {
    state
        .programs
        .retire(acting_principal(&headers), id, &req.void_reason)?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/patient-identifier-types",
    responses((status = 200, description = "Identifier types", body = [PatientIdentifierTypeDto]))
)]
/// Lists non-voided identifier types.
async fn list_identifier_types(
    State(state): State<AppState>,
) -> Result<Json<Vec<PatientIdentifierTypeDto>>, ApiError> {
    let types = state.identifier_types.list()?;
    Ok(Json(
        types
            .into_iter()
            .map(PatientIdentifierTypeDto::from)
            .collect(),
    ))
}

#[utoipa::path(
    post,
    path = "/patient-identifier-types",
    request_body = IdentifierTypeReq,
    responses(
        (status = 201, description = "Identifier type created", body = PatientIdentifierTypeDto),
        (status = 400, description = "Invalid or duplicate type", body = ErrorRes)
    )
)]
/// Creates an identifier type.
async fn create_identifier_type(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<IdentifierTypeReq>,
) -> Result<(StatusCode, Json<PatientIdentifierTypeDto>), ApiError> {
    let identifier_type = state.identifier_types.create(
        acting_principal(&headers),
        IdentifierTypeCommand {
            name: req.name,
            description: req.description,
            format: req.format,
            required: req.required,
            is_unique: req.is_unique,
            format_hint: req.format_hint,
            validator: req.validator,
        },
    )?;
    Ok((StatusCode::CREATED, Json(identifier_type.into())))
}

#[utoipa::path(
    get,
    path = "/patient-identifier-types/{id}",
    params(("id" = i32, Path, description = "Identifier type id")),
    responses(
        (status = 200, description = "Identifier type", body = PatientIdentifierTypeDto),
        (status = 404, description = "Identifier type not found", body = ErrorRes)
    )
)]
/// Fetches one identifier type.
async fn get_identifier_type(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<PatientIdentifierTypeDto>, ApiError> {
    Ok(Json(state.identifier_types.get(id)?.into()))
}

#[utoipa::path(
    put,
    path = "/patient-identifier-types/{id}",
    params(("id" = i32, Path, description = "Identifier type id")),
    request_body = IdentifierTypeReq,
    responses(
        (status = 200, description = "Identifier type updated", body = PatientIdentifierTypeDto),
        (status = 404, description = "Identifier type not found", body = ErrorRes)
    )
)]
/// Updates an identifier type's descriptive fields. The name is fixed at
/// creation.
async fn update_identifier_type(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    headers: HeaderMap,
    Json(req): Json<IdentifierTypeReq>,
) -> Result<Json<PatientIdentifierTypeDto>, ApiError> {
    let identifier_type = state.identifier_types.update(
        acting_principal(&headers),
        id,
        IdentifierTypeCommand {
            name: req.name,
            description: req.description,
            format: req.format,
            required: req.required,
            is_unique: req.is_unique,
            format_hint: req.format_hint,
            validator: req.validator,
        },
    )?;
    Ok(Json(identifier_type.into()))
}

#[utoipa::path(
    delete,
    path = "/patient-identifier-types/{id}",
    params(("id" = i32, Path, description = "Identifier type id")),
    request_body = VoidReq,
    responses(
        (status = 204, description = "Identifier type voided"),
        (status = 404, description = "Identifier type not found", body = ErrorRes)
    )
)]
/// Voids an identifier type.
async fn void_identifier_type(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    headers: HeaderMap,
    Json(req): Json<VoidReq>,
) -> Result<StatusCode, ApiError> {
    state
        .identifier_types
        .retire(acting_principal(&headers), id, &req.void_reason)?;
    Ok(StatusCode::NO_CONTENT)
}
