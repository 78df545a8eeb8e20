//! HTTP surface: the two forecast endpoints, the figure bundle the sensors
//! page polls, the HTML pages, and a real 404 for everything else.

use std::sync::Arc;

use axum::Router;
use axum::extract::{Json, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum::routing::get;
use primavera_data::{Aggregator, Error, Forecast, SensorQuery, Series, StoreClient, forecast};
use serde::Serialize;
use tower_http::trace::TraceLayer;

use crate::config::{Bands, Config};
use crate::{figures, pages};

#[derive(Clone)]
pub struct AppState {
    aggregator: Arc<Aggregator>,
    bands: Bands,
}

pub fn router(config: Config) -> Router {
    let state = AppState {
        aggregator: Arc::new(Aggregator::new(StoreClient::new(config.store_url))),
        bands: config.bands,
    };
    Router::new()
        .route("/predecirtemperatura", get(predict_temperature))
        .route("/predecirhumedad", get(predict_humidity))
        .route("/api/graficas", get(figure_bundle))
        .route("/", get(page_inicio))
        .route("/inicio", get(page_inicio))
        .route("/sensores", get(page_sensores))
        .route("/informacion", get(page_informacion))
        .fallback(not_found)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Wire shape of the forecast endpoints.
#[derive(Serialize)]
pub struct ForecastBody {
    pub data_train: Series,
    pub data_test: Series,
    pub predictions: Series,
}

impl From<Forecast> for ForecastBody {
    fn from(f: Forecast) -> Self {
        ForecastBody {
            data_train: f.train,
            data_test: f.test,
            predictions: f.predictions,
        }
    }
}

async fn predict_temperature(
    State(state): State<AppState>,
) -> Result<Json<ForecastBody>, ApiError> {
    predict(&state, SensorQuery::temperature()).await
}

async fn predict_humidity(State(state): State<AppState>) -> Result<Json<ForecastBody>, ApiError> {
    predict(&state, SensorQuery::humidity()).await
}

/// One live read plus one pipeline run; nothing is cached between requests.
async fn predict(state: &AppState, query: SensorQuery) -> Result<Json<ForecastBody>, ApiError> {
    let readings = state.aggregator.store().read(&query).await?;
    let forecast = forecast(&readings)?;
    Ok(Json(forecast.into()))
}

async fn figure_bundle(
    State(state): State<AppState>,
) -> Result<Json<figures::FigureBundle>, ApiError> {
    let bundle = state.aggregator.refresh().await?;
    Ok(Json(figures::build(&bundle, &state.bands)?))
}

async fn page_inicio() -> Html<&'static str> {
    Html(pages::INICIO)
}

async fn page_sensores() -> Html<&'static str> {
    Html(pages::SENSORES)
}

async fn page_informacion() -> Html<&'static str> {
    Html(pages::INFORMACION)
}

async fn not_found() -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorResponse {
            description: "no such page".to_string(),
        }),
    )
        .into_response()
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub description: String,
}

/// Maps internal failures to a 5xx with a JSON body instead of tearing the
/// connection down: an unreachable store is a 502, everything else a 500.
pub struct ApiError(Error);

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = if self.0.is_connectivity() {
            StatusCode::BAD_GATEWAY
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        };
        tracing::warn!(err = %self.0, "request failed");
        (
            status,
            Json(ErrorResponse {
                description: self.0.to_string(),
            }),
        )
            .into_response()
    }
}
