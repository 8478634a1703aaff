use axum::{
    Router,
    middleware::from_fn_with_state,
    routing::{get, post},
};
use std::time::Duration;
use tower::ServiceBuilder;
use tower_http::{
    compression::CompressionLayer, cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::auth::middleware::{require_lecturer, require_student};
use crate::handlers::{
    attendance::{delete_record, list_records, submit_attendance, toggle_status},
    auth::{login, logout, register},
    exports::{download_all_csv, download_all_pdf},
    health::health_check,
};
use crate::schemas::{ApiDoc, AppState};

/// Create application router with all routes and middleware
pub fn create_router(state: AppState) -> Router {
    let student_routes = Router::new()
        .route("/submit_attendance", post(submit_attendance))
        .route_layer(from_fn_with_state(state.clone(), require_student));

    let lecturer_routes = Router::new()
        .route("/records", get(list_records))
        // Status toggling is lecturer-only, like every other record mutation
        .route("/toggle_status/:record_id", post(toggle_status))
        .route("/delete_record/:record_id", post(delete_record))
        .route("/download/all/csv", get(download_all_csv))
        .route("/download/all/pdf", get(download_all_pdf))
        .route_layer(from_fn_with_state(state.clone(), require_lecturer));

    let router = Router::new()
        // Health check
        .route("/health", get(health_check))
        // Public auth routes
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/logout", get(logout))
        .merge(student_routes)
        .merge(lecturer_routes)
        // Swagger UI
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()));

    // The Prometheus recorder registers process-global state, which
    // collides across parallel test servers; keep it out of test builds.
    #[cfg(not(test))]
    let router = {
        let (prometheus_layer, metric_handle) = axum_prometheus::PrometheusMetricLayer::pair();
        router
            .route("/metrics", get(move || async move { metric_handle.render() }))
            .layer(prometheus_layer)
    };

    router
        // Add middleware
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CompressionLayer::new())
                .layer(TimeoutLayer::new(Duration::from_secs(30)))
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}
