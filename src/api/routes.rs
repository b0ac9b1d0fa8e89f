use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;

use crate::api::handlers;
use crate::model::{AttendanceRecord, ClassSection, Grade, Student};
use crate::service::SchoolServices;

pub fn create_router(services: SchoolServices) -> Router {
    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        // Students
        .route(
            "/students",
            get(handlers::list_students).post(handlers::create_record::<Student>),
        )
        .route(
            "/students/:id",
            get(handlers::get_record::<Student>)
                .patch(handlers::update_record::<Student>)
                .delete(handlers::delete_record::<Student>),
        )
        .route("/students/:id/summary", get(handlers::student_summary))
        // Classes
        .route(
            "/classes",
            get(handlers::list_records::<ClassSection>)
                .post(handlers::create_record::<ClassSection>),
        )
        .route(
            "/classes/:id",
            get(handlers::get_record::<ClassSection>)
                .patch(handlers::update_record::<ClassSection>)
                .delete(handlers::delete_record::<ClassSection>),
        )
        .route("/classes/:id/roster", get(handlers::class_roster))
        .route("/classes/:id/attendance", post(handlers::record_attendance))
        // Grades
        .route(
            "/grades",
            get(handlers::list_grades).post(handlers::create_record::<Grade>),
        )
        .route(
            "/grades/:id",
            get(handlers::get_record::<Grade>)
                .patch(handlers::update_record::<Grade>)
                .delete(handlers::delete_record::<Grade>),
        )
        // Attendance
        .route(
            "/attendance",
            get(handlers::list_records::<AttendanceRecord>)
                .post(handlers::create_record::<AttendanceRecord>),
        )
        .route(
            "/attendance/:id",
            get(handlers::get_record::<AttendanceRecord>)
                .patch(handlers::update_record::<AttendanceRecord>)
                .delete(handlers::delete_record::<AttendanceRecord>),
        )
        // Dashboard
        .route("/dashboard", get(handlers::dashboard))
        .layer(CorsLayer::permissive())
        .with_state(Arc::new(services))
}
