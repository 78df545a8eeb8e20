//! One full dashboard refresh: four sensor reads, the GPS track, and the two
//! forecasts, recomputed from the store on every call.

use tracing::debug;

use crate::{Error, Forecast, GpsPoint, Reading, SensorQuery, StoreClient, forecast};

pub struct Aggregator {
    store: StoreClient,
}

/// Everything one refresh produces. No caching: a bundle is rebuilt from
/// scratch per tick or request, and any failed read fails the whole bundle.
#[derive(Clone, Debug)]
pub struct RefreshBundle {
    pub temperature: Vec<Reading>,
    pub humidity: Vec<Reading>,
    pub light: Vec<Reading>,
    pub proximity: Vec<Reading>,
    pub gps: Vec<GpsPoint>,
    pub temperature_forecast: Forecast,
    pub humidity_forecast: Forecast,
}

impl Aggregator {
    pub fn new(store: StoreClient) -> Self {
        Aggregator { store }
    }

    pub fn store(&self) -> &StoreClient {
        &self.store
    }

    pub async fn refresh(&self) -> Result<RefreshBundle, Error> {
        let temperature = self.store.read(&SensorQuery::temperature()).await?;
        let humidity = self.store.read(&SensorQuery::humidity()).await?;
        let light = self.store.read(&SensorQuery::light()).await?;
        let proximity = self.store.read(&SensorQuery::proximity()).await?;
        let gps = self.store.read_gps().await?;
        let temperature_forecast = forecast(&temperature)?;
        let humidity_forecast = forecast(&humidity)?;
        debug!(
            temperature = temperature.len(),
            humidity = humidity.len(),
            light = light.len(),
            proximity = proximity.len(),
            gps = gps.len(),
            "refreshed readings"
        );
        Ok(RefreshBundle {
            temperature,
            humidity,
            light,
            proximity,
            gps,
            temperature_forecast,
            humidity_forecast,
        })
    }
}
