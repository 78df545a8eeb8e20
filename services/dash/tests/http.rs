//! End-to-end tests: a mock store answering `/_sql` on an ephemeral port,
//! the dashboard app in front of it, and plain HTTP requests against both.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use axum::extract::{Json, State};
use axum::http::StatusCode;
use axum::routing::post;
use primavera_dash::Config;
use serde_json::{Value, json};

#[derive(Clone, Default)]
struct MockStore {
    temperatura: Vec<(i64, f64)>,
    humedad: Vec<(i64, f64)>,
    luz: Vec<(i64, f64)>,
    proximidad: Vec<(i64, f64)>,
    gps: Vec<(f64, f64)>,
    /// Table the store pretends not to know, to exercise the query-error path.
    missing_table: Option<&'static str>,
}

const T0: i64 = 1_609_459_200_000;

impl MockStore {
    fn seeded() -> Self {
        let minutes = |values: &[f64]| -> Vec<(i64, f64)> {
            values
                .iter()
                .enumerate()
                .map(|(i, &v)| (T0 + i as i64 * 60_000, v))
                .collect()
        };
        MockStore {
            temperatura: minutes(&[20.0, 21.5, 22.0, 21.0, 20.5, 23.0, 22.5, 21.8, 20.9, 22.1]),
            humedad: minutes(&[60.0, 62.0, 61.5, 63.0, 64.0, 62.5, 61.0, 60.5, 63.5, 62.0]),
            luz: minutes(&[1100.0, 1120.0, 1090.0, 1150.0]),
            proximidad: minutes(&[5.0, 6.0, 5.5, 7.0]),
            gps: vec![(6.24, -75.58), (6.25, -75.59), (6.26, -75.60)],
            missing_table: None,
        }
    }

    fn respond(&self, stmt: &str) -> (StatusCode, Value) {
        if let Some(table) = self.missing_table {
            if stmt.contains(&format!("FROM {table} ")) {
                return (
                    StatusCode::NOT_FOUND,
                    json!({"error": {"message": format!("Relation '{table}' unknown"), "code": 4041}}),
                );
            }
        }
        let tables: [(&str, &str, &str, &Vec<(i64, f64)>); 4] = [
            ("ettemperatura", "sensorTemperatura", "temperatura", &self.temperatura),
            ("ethumedad", "sensorHumedad", "humedad", &self.humedad),
            ("etluz", "sensorLuz", "luz", &self.luz),
            ("etproximidad", "sensorProximidad", "proximidad", &self.proximidad),
        ];
        for (table, entity, variable, data) in tables {
            if stmt.contains(&format!("FROM {table} ")) {
                let rows: Vec<Value> = data.iter().map(|&(t, v)| json!([entity, t, v])).collect();
                return (
                    StatusCode::OK,
                    json!({
                        "cols": ["entity_id", "time_index", variable],
                        "rowcount": rows.len(),
                        "rows": rows,
                    }),
                );
            }
        }
        if stmt.contains("FROM etgps ") {
            let rows: Vec<Value> = self.gps.iter().map(|&(lat, lon)| json!([lat, lon])).collect();
            return (
                StatusCode::OK,
                json!({"cols": ["latitud", "longitud"], "rowcount": rows.len(), "rows": rows}),
            );
        }
        (
            StatusCode::BAD_REQUEST,
            json!({"error": {"message": format!("cannot parse: {stmt}"), "code": 4000}}),
        )
    }
}

async fn sql(
    State(store): State<Arc<MockStore>>,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    let stmt = body["stmt"].as_str().unwrap_or_default();
    let (status, value) = store.respond(stmt);
    (status, Json(value))
}

async fn spawn_store(store: MockStore) -> SocketAddr {
    let app = Router::new()
        .route("/_sql", post(sql))
        .with_state(Arc::new(store));
    spawn(app).await
}

async fn spawn_app(store_addr: SocketAddr) -> SocketAddr {
    let config = Config {
        store_url: format!("http://{store_addr}"),
        ..Config::default()
    };
    spawn(primavera_dash::api::router(config)).await
}

async fn spawn(app: Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });
    addr
}

async fn get_json(addr: SocketAddr, path: &str) -> (reqwest::StatusCode, Value) {
    let resp = reqwest::Client::new()
        .get(format!("http://{addr}{path}"))
        .send()
        .await
        .unwrap();
    let status = resp.status();
    (status, resp.json().await.unwrap())
}

fn series_len(body: &Value, key: &str) -> (usize, usize) {
    (
        body[key]["x"].as_array().unwrap().len(),
        body[key]["y"].as_array().unwrap().len(),
    )
}

#[tokio::test]
async fn temperature_forecast_shape() {
    let store = spawn_store(MockStore::seeded()).await;
    let app = spawn_app(store).await;
    let (status, body) = get_json(app, "/predecirtemperatura").await;
    assert_eq!(status, reqwest::StatusCode::OK);
    assert_eq!(series_len(&body, "data_train"), (800, 800));
    assert_eq!(series_len(&body, "data_test"), (200, 200));
    assert_eq!(series_len(&body, "predictions"), (350, 350));
    // Prediction indices continue from the end of the training prefix.
    assert_eq!(body["predictions"]["x"][0], 800.0);
}

#[tokio::test]
async fn humidity_forecast_shape() {
    let store = spawn_store(MockStore::seeded()).await;
    let app = spawn_app(store).await;
    let (status, body) = get_json(app, "/predecirhumedad").await;
    assert_eq!(status, reqwest::StatusCode::OK);
    assert_eq!(series_len(&body, "data_train"), (800, 800));
    assert_eq!(series_len(&body, "data_test"), (200, 200));
    assert_eq!(series_len(&body, "predictions"), (350, 350));
}

#[tokio::test]
async fn three_rows_are_enough_to_forecast() {
    let store = spawn_store(MockStore {
        temperatura: vec![(T0, 22.5), (T0 + 60_000, 23.0), (T0 + 120_000, 22.0)],
        ..MockStore::seeded()
    })
    .await;
    let app = spawn_app(store).await;
    let (status, body) = get_json(app, "/predecirtemperatura").await;
    assert_eq!(status, reqwest::StatusCode::OK);
    for key in ["data_train", "data_test", "predictions"] {
        assert!(body[key].is_object(), "missing {key}");
    }
}

#[tokio::test]
async fn single_row_store_is_a_500_not_a_crash() {
    let store = spawn_store(MockStore {
        temperatura: vec![(T0, 22.5)],
        ..MockStore::seeded()
    })
    .await;
    let app = spawn_app(store).await;
    let (status, body) = get_json(app, "/predecirtemperatura").await;
    assert_eq!(status, reqwest::StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["description"].as_str().unwrap().contains("insufficient"));
    // The process survives and keeps serving.
    let resp = reqwest::get(format!("http://{app}/inicio")).await.unwrap();
    assert_eq!(resp.status(), reqwest::StatusCode::OK);
}

#[tokio::test]
async fn unreachable_store_is_a_502() {
    // Grab a port nothing is listening on.
    let vacant = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let store_addr = vacant.local_addr().unwrap();
    drop(vacant);
    let app = spawn_app(store_addr).await;
    let (status, body) = get_json(app, "/predecirtemperatura").await;
    assert_eq!(status, reqwest::StatusCode::BAD_GATEWAY);
    assert!(!body["description"].as_str().unwrap().is_empty());
}

#[tokio::test]
async fn missing_table_is_a_500() {
    let store = spawn_store(MockStore {
        missing_table: Some("ethumedad"),
        ..MockStore::seeded()
    })
    .await;
    let app = spawn_app(store).await;
    let (status, body) = get_json(app, "/predecirhumedad").await;
    assert_eq!(status, reqwest::StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["description"].as_str().unwrap().contains("unknown"));
}

#[tokio::test]
async fn unknown_route_is_a_real_404() {
    let store = spawn_store(MockStore::seeded()).await;
    let app = spawn_app(store).await;
    let (status, body) = get_json(app, "/predecirpresion").await;
    assert_eq!(status, reqwest::StatusCode::NOT_FOUND);
    assert_eq!(body["description"], "no such page");
}

#[tokio::test]
async fn pages_render_html() {
    let store = spawn_store(MockStore::seeded()).await;
    let app = spawn_app(store).await;
    for (path, marker) in [
        ("/", "Información del proyecto"),
        ("/inicio", "Información del proyecto"),
        ("/sensores", "Dashboard de control"),
        ("/informacion", "Historial de la planta"),
    ] {
        let resp = reqwest::get(format!("http://{app}{path}")).await.unwrap();
        assert_eq!(resp.status(), reqwest::StatusCode::OK, "{path}");
        let content_type = resp.headers()["content-type"].to_str().unwrap().to_string();
        assert!(content_type.starts_with("text/html"), "{path}: {content_type}");
        assert!(resp.text().await.unwrap().contains(marker), "{path}");
    }
}

#[tokio::test]
async fn figure_bundle_covers_all_charts() {
    let store = spawn_store(MockStore::seeded()).await;
    let app = spawn_app(store).await;
    let (status, body) = get_json(app, "/api/graficas").await;
    assert_eq!(status, reqwest::StatusCode::OK);
    for key in [
        "temperatura",
        "humedad",
        "luz",
        "proximidad",
        "prediccion_temperatura",
        "prediccion_humedad",
        "mapa",
    ] {
        assert!(body[key]["data"].is_array(), "missing data for {key}");
        assert!(body[key]["layout"].is_object(), "missing layout for {key}");
    }
    // Seeded readings sit inside their bands.
    assert_eq!(body["temperatura"]["layout"]["annotations"][0]["bgcolor"], "green");
}

#[tokio::test]
async fn one_empty_sensor_fails_the_whole_bundle() {
    let store = spawn_store(MockStore {
        luz: vec![],
        ..MockStore::seeded()
    })
    .await;
    let app = spawn_app(store).await;
    let (status, body) = get_json(app, "/api/graficas").await;
    assert_eq!(status, reqwest::StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["description"].as_str().unwrap().contains("empty series"));
}
