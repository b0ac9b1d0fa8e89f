use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
    Json as RequestJson,
};
use chrono::NaiveDate;
use log::{error, warn};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::error::{ServiceError, StoreError};
use crate::logic::summary::{
    filter_grades, search_students, ClassRoster, DashboardStats, GradeFilter, StudentSummary,
};
use crate::model::{AttendanceRecord, FieldError, Grade, RecordId, Student};
use crate::service::{AttendanceMark, BatchOutcome, Resource, SchoolServices};

pub type AppState = Arc<SchoolServices>;

type ApiResult<T> = Result<T, (StatusCode, Json<ErrorResponse>)>;

/// Simple health check endpoint
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: String,
}

pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
    })
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ListResponse<T> {
    pub items: Vec<T>,
    pub total: usize,
}

impl<T> ListResponse<T> {
    fn new(items: Vec<T>) -> Self {
        let total = items.len();
        Self { items, total }
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    pub error: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub field_errors: Vec<FieldError>,
}

impl ErrorResponse {
    pub fn new(message: &str) -> Self {
        Self {
            error: message.to_string(),
            field_errors: Vec::new(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DeleteResponse {
    pub deleted: bool,
}

#[derive(Debug, Deserialize)]
pub struct StudentQuery {
    pub search: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceSheet {
    pub date: NaiveDate,
    pub marks: Vec<AttendanceMark>,
}

fn error_response(err: ServiceError) -> (StatusCode, Json<ErrorResponse>) {
    match err {
        ServiceError::NotFound { .. } => {
            (StatusCode::NOT_FOUND, Json(ErrorResponse::new(&err.to_string())))
        }
        ServiceError::Rejected { ref errors, .. } => {
            let field_errors = errors.clone();
            (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(ErrorResponse {
                    error: err.to_string(),
                    field_errors,
                }),
            )
        }
        ServiceError::Store(ref store) => {
            match store {
                StoreError::Transport(_) => warn!("Record store unreachable: {}", store),
                StoreError::Backend { .. } => warn!("Record store failure: {}", store),
            }
            (StatusCode::BAD_GATEWAY, Json(ErrorResponse::new(&err.to_string())))
        }
        ServiceError::Codec { .. } => {
            error!("{}", err);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::new(&err.to_string())),
            )
        }
    }
}

fn not_found(entity: &str, id: RecordId) -> (StatusCode, Json<ErrorResponse>) {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorResponse::new(&format!("{} {} not found", entity, id))),
    )
}

pub async fn list_records<E: Resource>(
    State(services): State<AppState>,
) -> ApiResult<Json<ListResponse<E>>> {
    let records = E::service(&services)
        .get_all()
        .await
        .map_err(error_response)?;
    Ok(Json(ListResponse::new(records)))
}

pub async fn get_record<E: Resource>(
    State(services): State<AppState>,
    Path(id): Path<RecordId>,
) -> ApiResult<Json<E>> {
    match E::service(&services).get_by_id(id).await {
        Ok(Some(record)) => Ok(Json(record)),
        Ok(None) => Err(not_found(E::KIND, id)),
        Err(e) => Err(error_response(e)),
    }
}

pub async fn create_record<E: Resource>(
    State(services): State<AppState>,
    RequestJson(data): RequestJson<E::New>,
) -> ApiResult<(StatusCode, Json<E>)> {
    let created = E::service(&services)
        .create(data)
        .await
        .map_err(error_response)?;
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn update_record<E: Resource>(
    State(services): State<AppState>,
    Path(id): Path<RecordId>,
    RequestJson(patch): RequestJson<E::Patch>,
) -> ApiResult<Json<E>> {
    let updated = E::service(&services)
        .update(id, patch)
        .await
        .map_err(error_response)?;
    Ok(Json(updated))
}

pub async fn delete_record<E: Resource>(
    State(services): State<AppState>,
    Path(id): Path<RecordId>,
) -> ApiResult<Json<DeleteResponse>> {
    let deleted = E::service(&services)
        .delete(id)
        .await
        .map_err(error_response)?;
    Ok(Json(DeleteResponse { deleted }))
}

pub async fn list_students(
    State(services): State<AppState>,
    Query(query): Query<StudentQuery>,
) -> ApiResult<Json<ListResponse<Student>>> {
    let students = services.students.get_all().await.map_err(error_response)?;
    let matches = match query.search.as_deref() {
        Some(term) => search_students(&students, term).into_iter().cloned().collect(),
        None => students,
    };
    Ok(Json(ListResponse::new(matches)))
}

pub async fn list_grades(
    State(services): State<AppState>,
    Query(filter): Query<GradeFilter>,
) -> ApiResult<Json<ListResponse<Grade>>> {
    if filter == GradeFilter::default() {
        let grades = services.grades.get_all().await.map_err(error_response)?;
        return Ok(Json(ListResponse::new(grades)));
    }
    let (grades, students, classes) = tokio::try_join!(
        services.grades.get_all(),
        services.students.get_all(),
        services.classes.get_all(),
    )
    .map_err(error_response)?;
    let matches = filter_grades(&grades, &students, &classes, &filter)
        .into_iter()
        .cloned()
        .collect();
    Ok(Json(ListResponse::new(matches)))
}

pub async fn dashboard(State(services): State<AppState>) -> ApiResult<Json<DashboardStats>> {
    let today = chrono::Local::now().date_naive();
    let stats = services.dashboard(today).await.map_err(error_response)?;
    Ok(Json(stats))
}

pub async fn student_summary(
    State(services): State<AppState>,
    Path(id): Path<RecordId>,
) -> ApiResult<Json<StudentSummary>> {
    let summary = services
        .student_summary(id)
        .await
        .map_err(error_response)?;
    Ok(Json(summary))
}

pub async fn class_roster(
    State(services): State<AppState>,
    Path(id): Path<RecordId>,
) -> ApiResult<Json<ClassRoster>> {
    let roster = services.class_roster(id).await.map_err(error_response)?;
    Ok(Json(roster))
}

pub async fn record_attendance(
    State(services): State<AppState>,
    Path(class_id): Path<RecordId>,
    RequestJson(sheet): RequestJson<AttendanceSheet>,
) -> ApiResult<Json<BatchOutcome<AttendanceRecord>>> {
    let outcome = services
        .record_attendance(class_id, sheet.date, sheet.marks)
        .await
        .map_err(error_response)?;
    Ok(Json(outcome))
}
