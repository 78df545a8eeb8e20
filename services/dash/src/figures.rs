//! Server-side construction of the dashboard's Plotly figures.
//!
//! Each figure is the `{data, layout}` object the browser hands straight to
//! `Plotly.react`. Sensor charts get the alarm band drawn as two horizontal
//! lines plus an indicator square colored by the threshold evaluator.

use chrono::DateTime;
use primavera_data::{Band, Error, Forecast, GpsPoint, Reading, RefreshBundle, evaluate};
use serde::Serialize;
use serde_json::{Value, json};

use crate::config::Bands;

/// The seven figures one dashboard tick renders. Field names double as the
/// DOM ids the sensors page targets.
#[derive(Clone, Debug, Serialize)]
pub struct FigureBundle {
    pub temperatura: Value,
    pub humedad: Value,
    pub luz: Value,
    pub proximidad: Value,
    pub prediccion_temperatura: Value,
    pub prediccion_humedad: Value,
    pub mapa: Value,
}

pub fn build(bundle: &RefreshBundle, bands: &Bands) -> Result<FigureBundle, Error> {
    Ok(FigureBundle {
        temperatura: sensor_figure("Temperatura", &bundle.temperature, Some(bands.temperature))?,
        humedad: sensor_figure("Humedad", &bundle.humidity, Some(bands.humidity))?,
        luz: sensor_figure("Luz", &bundle.light, Some(bands.light))?,
        proximidad: sensor_figure("Proximidad", &bundle.proximity, None)?,
        prediccion_temperatura: forecast_figure(
            "Predicción Temperatura",
            &bundle.temperature_forecast,
        ),
        prediccion_humedad: forecast_figure("Predicción Humedad", &bundle.humidity_forecast),
        mapa: map_figure(&bundle.gps),
    })
}

/// Value-vs-time line chart, with the alarm band overlaid when one applies.
pub fn sensor_figure(name: &str, readings: &[Reading], band: Option<Band>) -> Result<Value, Error> {
    if readings.is_empty() {
        return Err(Error::Render("empty series passed to charting"));
    }
    let x: Vec<String> = readings.iter().map(|r| format_time(r.time_index)).collect();
    let y: Vec<f64> = readings.iter().map(|r| r.value).collect();

    let mut layout = json!({
        "title": { "text": format!("{name} vs Tiempo") },
        "xaxis": { "title": { "text": "Tiempo" } },
        "yaxis": { "title": { "text": name } },
    });
    if let Some(band) = band {
        layout["shapes"] = json!([band_line(band.lower), band_line(band.upper)]);
        layout["annotations"] = json!([alarm_indicator(evaluate(&y, band).as_str())]);
    }
    Ok(json!({
        "data": [{ "x": x, "y": y, "name": name }],
        "layout": layout,
    }))
}

/// Training, test, and prediction traces over the resampled grid index.
pub fn forecast_figure(title: &str, forecast: &Forecast) -> Value {
    json!({
        "data": [
            { "x": forecast.train.x, "y": forecast.train.y, "mode": "lines", "name": "Entrenamiento" },
            { "x": forecast.test.x, "y": forecast.test.y, "mode": "lines", "name": "Prueba" },
            { "x": forecast.predictions.x, "y": forecast.predictions.y, "mode": "lines", "name": "Predicciones" },
        ],
        "layout": {
            "title": { "text": title },
            "xaxis": { "title": { "text": "Tiempo" } },
            "yaxis": { "title": { "text": "Predicción" } },
        },
    })
}

/// GPS track on an open-street-map tile layer. An empty track renders an
/// empty map centered on the deployment site.
pub fn map_figure(track: &[GpsPoint]) -> Value {
    let lat: Vec<f64> = track.iter().map(|p| p.lat).collect();
    let lon: Vec<f64> = track.iter().map(|p| p.lon).collect();
    json!({
        "data": [{
            "type": "scattermapbox",
            "lat": lat,
            "lon": lon,
            "marker": { "size": 11, "opacity": 0.6 },
        }],
        "layout": {
            "mapbox": {
                "style": "open-street-map",
                "center": { "lat": 6.240737, "lon": -75.589900 },
                "zoom": 10,
            },
            "hovermode": "closest",
            "margin": { "l": 0, "r": 0, "b": 0, "t": 0 },
        },
    })
}

fn band_line(level: f64) -> Value {
    json!({
        "type": "line",
        "yref": "y", "y0": level, "y1": level,
        "xref": "paper", "x0": 0, "x1": 1,
        "line": { "color": "red" },
    })
}

fn alarm_indicator(color: &str) -> Value {
    json!({
        "x": 0.65, "y": 1.15,
        "xref": "paper", "yref": "paper",
        "showarrow": false,
        "text": "",
        "xanchor": "center", "yanchor": "bottom",
        "bgcolor": color,
        "opacity": 1,
        "bordercolor": "black",
        "borderwidth": 2,
        "borderpad": 4,
        "width": 20,
        "height": 20,
    })
}

fn format_time(epoch_ms: i64) -> String {
    DateTime::from_timestamp_millis(epoch_ms)
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| epoch_ms.to_string())
}
