//! Read-only client for the store's HTTP SQL endpoint.
//!
//! The store is CrateDB-compatible: statements are POSTed to `{base}/_sql`
//! and rows come back as positional JSON arrays. Every call opens a fresh
//! HTTP client, mirroring the connection-per-query behavior of the store's
//! stock drivers.

use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::json;
use tracing::debug;

use crate::{Error, GpsPoint, Reading};

/// Table holding the GPS track. Unlike the sensor tables it is read without
/// an entity filter.
pub const GPS_TABLE: &str = "etgps";

/// A (variable, table, entity) triple naming one sensor's readings.
///
/// Identifiers are interpolated into statement text, so construction is the
/// taint boundary: [`SensorQuery::new`] rejects anything that is not a plain
/// SQL identifier, and the four deployment sensors are fixed triples.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SensorQuery {
    variable: String,
    table: String,
    entity: String,
}

impl SensorQuery {
    pub fn new(variable: &str, table: &str, entity: &str) -> Result<Self, Error> {
        for ident in [variable, table, entity] {
            if !valid_ident(ident) {
                return Err(Error::InvalidIdentifier(ident.to_string()));
            }
        }
        Ok(SensorQuery {
            variable: variable.to_string(),
            table: table.to_string(),
            entity: entity.to_string(),
        })
    }

    pub fn temperature() -> Self {
        Self::fixed("temperatura", "ettemperatura", "sensorTemperatura")
    }

    pub fn humidity() -> Self {
        Self::fixed("humedad", "ethumedad", "sensorHumedad")
    }

    pub fn light() -> Self {
        Self::fixed("luz", "etluz", "sensorLuz")
    }

    pub fn proximity() -> Self {
        Self::fixed("proximidad", "etproximidad", "sensorProximidad")
    }

    pub fn variable(&self) -> &str {
        &self.variable
    }

    // Crate-fixed triples; arguments are literals that already satisfy
    // `valid_ident`.
    fn fixed(variable: &str, table: &str, entity: &str) -> Self {
        SensorQuery {
            variable: variable.to_string(),
            table: table.to_string(),
            entity: entity.to_string(),
        }
    }

    fn statement(&self) -> String {
        format!(
            "SELECT entity_id, time_index, {} FROM {} WHERE entity_id = '{}' ORDER BY time_index ASC",
            self.variable, self.table, self.entity
        )
    }
}

fn valid_ident(s: &str) -> bool {
    let mut chars = s.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

#[derive(Clone, Debug)]
pub struct StoreClient {
    base_url: String,
}

impl StoreClient {
    /// `base_url` is the store's HTTP endpoint, e.g. `http://127.0.0.1:4200`.
    pub fn new(base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        StoreClient { base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Readings for one sensor, ordered by time index ascending. An empty
    /// table is `Ok(vec![])`, not an error.
    pub async fn read(&self, query: &SensorQuery) -> Result<Vec<Reading>, Error> {
        let rows: Vec<(String, i64, f64)> = self.execute(query.statement()).await?;
        Ok(rows
            .into_iter()
            .map(|(entity_id, time_index, value)| Reading {
                entity_id,
                time_index,
                value,
            })
            .collect())
    }

    /// The full GPS track, ordered by time index ascending.
    pub async fn read_gps(&self) -> Result<Vec<GpsPoint>, Error> {
        let stmt = format!("SELECT latitud, longitud FROM {GPS_TABLE} ORDER BY time_index ASC");
        let rows: Vec<(f64, f64)> = self.execute(stmt).await?;
        Ok(rows.into_iter().map(|(lat, lon)| GpsPoint { lat, lon }).collect())
    }

    async fn execute<R: DeserializeOwned>(&self, stmt: String) -> Result<Vec<R>, Error> {
        debug!(%stmt, "querying store");
        let client = reqwest::Client::new();
        let resp = client
            .post(format!("{}/_sql", self.base_url))
            .json(&json!({ "stmt": stmt }))
            .send()
            .await?;
        let status = resp.status();
        if !status.is_success() {
            let body: SqlErrorBody = resp
                .json()
                .await
                .map_err(|_| Error::Query(format!("store returned {status}")))?;
            return Err(Error::Query(body.error.message));
        }
        let body: SqlResponse<R> = resp
            .json()
            .await
            .map_err(|err| Error::Decode(err.to_string()))?;
        Ok(body.rows)
    }
}

/// Successful `/_sql` payload. Rows are positional arrays, decoded straight
/// into tuples so column order is enforced at the serde layer.
#[derive(Debug, Deserialize)]
struct SqlResponse<R> {
    #[serde(default)]
    #[allow(dead_code)]
    cols: Vec<String>,
    rows: Vec<R>,
}

#[derive(Debug, Deserialize)]
struct SqlErrorBody {
    error: SqlError,
}

#[derive(Debug, Deserialize)]
struct SqlError {
    message: String,
    #[serde(default)]
    #[allow(dead_code)]
    code: i64,
}
