//! HTTP handler functions for the SecureCheck API.

use actix_web::{HttpResponse, web};
use securecheck_analytics::catalog::{self, CatalogQuery};
use securecheck_analytics::AnalyticsError;
use securecheck_analytics_models::CandidateRecord;
use securecheck_server_models::{
    ApiAnalytics, ApiHealth, ApiPredictOptions, ApiPrediction, ApiQuery, ApiQueryResult, ApiTable,
};

use crate::AppState;

/// `GET /api/health`
pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(ApiHealth {
        healthy: true,
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// `GET /api/logs`
///
/// Returns the full log table for the home page.
pub async fn logs(state: web::Data<AppState>) -> HttpResponse {
    let logs = state.analytics.logs().await;
    HttpResponse::Ok().json(ApiTable {
        table: logs.value,
        notices: logs.notices,
    })
}

/// `GET /api/analytics`
///
/// Summary counts, violation and gender breakdowns and day/night counts.
pub async fn analytics(state: web::Data<AppState>) -> HttpResponse {
    let overview = state.analytics.overview().await;
    HttpResponse::Ok().json(ApiAnalytics {
        overview: overview.value,
        notices: overview.notices,
    })
}

/// `GET /api/queries`
///
/// Lists the catalog in selector order.
pub async fn queries() -> HttpResponse {
    let list: Vec<ApiQuery> = catalog::descriptors()
        .iter()
        .map(|d| ApiQuery {
            id: d.id.to_string(),
            label: d.label.to_string(),
            columns: d.columns.iter().map(ToString::to_string).collect(),
        })
        .collect();

    HttpResponse::Ok().json(list)
}

/// `GET /api/queries/{id}`
///
/// Runs one catalog query.
pub async fn run_query(state: web::Data<AppState>, path: web::Path<String>) -> HttpResponse {
    let id = path.into_inner();
    let query = match CatalogQuery::from_id(&id) {
        Ok(query) => query,
        Err(e) => {
            log::warn!("Rejected catalog request: {e}");
            return HttpResponse::NotFound().json(serde_json::json!({
                "error": e.to_string()
            }));
        }
    };

    let outcome = state.analytics.run_catalog_query(query).await;
    let descriptor = query.descriptor();

    HttpResponse::Ok().json(ApiQueryResult {
        id,
        label: descriptor.label.to_string(),
        outcome: outcome.value.into(),
        notices: outcome.notices,
    })
}

/// `GET /api/predict/options`
///
/// Choices for the predict form; stop durations come from the data.
pub async fn predict_options(state: web::Data<AppState>) -> HttpResponse {
    let durations = state.analytics.stop_durations().await;
    HttpResponse::Ok().json(ApiPredictOptions::new(durations.value, durations.notices))
}

/// `POST /api/predict`
///
/// Predicts violation and outcome for the submitted stop.
pub async fn predict(
    state: web::Data<AppState>,
    candidate: web::Json<CandidateRecord>,
) -> HttpResponse {
    match state.analytics.predict(&candidate).await {
        Ok(reported) => HttpResponse::Ok().json(ApiPrediction {
            prediction: reported.value,
            notices: reported.notices,
        }),
        Err(e @ AnalyticsError::Predict(_)) => HttpResponse::BadRequest().json(serde_json::json!({
            "error": e.to_string()
        })),
        Err(e) => {
            log::error!("Failed to predict: {e}");
            HttpResponse::InternalServerError().json(serde_json::json!({
                "error": "Failed to predict"
            }))
        }
    }
}
