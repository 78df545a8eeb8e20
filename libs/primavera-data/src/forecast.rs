//! Resample-then-forecast pipeline.
//!
//! Irregular readings are resampled onto a uniform 1000-point grid by linear
//! interpolation, split into an 800-point training prefix and a 200-point
//! test suffix, and extended 350 steps by an autoregressive linear model fit
//! with ordinary least squares over 125 lags. Predictions recursively feed
//! back in as lag inputs, so the whole pipeline is a pure function of the
//! input readings.

use std::collections::VecDeque;

use nalgebra::{DMatrix, DVector};
use serde::Serialize;

use crate::{Error, Reading};

/// Number of points on the uniform resampling grid.
pub const GRID_POINTS: usize = 1000;
/// Trailing points held out of the fit.
pub const TEST_STEPS: usize = 200;
/// Predicted steps past the training prefix: the test window plus 150 more.
pub const HORIZON: usize = TEST_STEPS + 150;
/// Preceding values used as regressors for the next value.
pub const LAGS: usize = 125;

/// A positional series: `x` is the resampled grid index, `y` the value.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Series {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
}

impl Series {
    fn from_offset(offset: usize, y: Vec<f64>) -> Self {
        let x = (offset..offset + y.len()).map(|i| i as f64).collect();
        Series { x, y }
    }

    pub fn len(&self) -> usize {
        self.y.len()
    }

    pub fn is_empty(&self) -> bool {
        self.y.is_empty()
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Forecast {
    /// First 800 resampled points.
    pub train: Series,
    /// Last 200 resampled points.
    pub test: Series,
    /// 350 model outputs, indexed from the end of the training prefix.
    pub predictions: Series,
}

/// Run the full pipeline for one sensor's readings.
///
/// Fails with [`Error::InsufficientData`] when fewer than two distinct
/// timestamps remain after dropping duplicates.
pub fn forecast(readings: &[Reading]) -> Result<Forecast, Error> {
    let (hours, values) = elapsed_hours(readings)?;
    let (_grid, resampled) = resample(&hours, &values);

    let split = GRID_POINTS - TEST_STEPS;
    let train_y = resampled[..split].to_vec();
    let test_y = resampled[split..].to_vec();

    let coef = fit(&train_y)?;
    let predicted = predict(&coef, &train_y);

    Ok(Forecast {
        train: Series::from_offset(0, train_y),
        test: Series::from_offset(split, test_y),
        predictions: Series::from_offset(split, predicted),
    })
}

/// Sort by timestamp, drop duplicate timestamps keeping the first occurrence,
/// and convert to hours elapsed since the earliest sample.
fn elapsed_hours(readings: &[Reading]) -> Result<(Vec<f64>, Vec<f64>), Error> {
    let mut samples: Vec<(i64, f64)> = readings.iter().map(|r| (r.time_index, r.value)).collect();
    samples.sort_by_key(|&(t, _)| t);
    samples.dedup_by_key(|&mut (t, _)| t);
    if samples.len() < 2 {
        return Err(Error::InsufficientData(
            "interpolation needs at least 2 distinct timestamps",
        ));
    }
    let t0 = samples[0].0;
    let hours = samples
        .iter()
        .map(|&(t, _)| (t - t0) as f64 / 3_600_000.0)
        .collect();
    let values = samples.iter().map(|&(_, v)| v).collect();
    Ok((hours, values))
}

/// Evaluate the piecewise-linear interpolant of `ys` over `xs` on a uniform
/// `GRID_POINTS`-point grid spanning `[xs[0], xs[last]]`.
///
/// `xs` must be strictly increasing with at least two entries, which
/// [`elapsed_hours`] guarantees.
fn resample(xs: &[f64], ys: &[f64]) -> (Vec<f64>, Vec<f64>) {
    let lo = xs[0];
    let hi = xs[xs.len() - 1];
    let step = (hi - lo) / (GRID_POINTS - 1) as f64;

    let mut grid = Vec::with_capacity(GRID_POINTS);
    let mut out = Vec::with_capacity(GRID_POINTS);
    let mut seg = 0;
    for i in 0..GRID_POINTS {
        // Pin the last grid point to the input max so the span is exact.
        let t = if i == GRID_POINTS - 1 { hi } else { lo + step * i as f64 };
        while seg + 2 < xs.len() && xs[seg + 1] < t {
            seg += 1;
        }
        let (x0, x1) = (xs[seg], xs[seg + 1]);
        let w = (t - x0) / (x1 - x0);
        grid.push(t);
        out.push(ys[seg] + w * (ys[seg + 1] - ys[seg]));
    }
    (grid, out)
}

/// Ordinary least squares fit of `y[i] = c0 + sum_k c_k * y[i - k]` for
/// k = 1..=LAGS over the training series.
fn fit(train: &[f64]) -> Result<DVector<f64>, Error> {
    if train.len() < LAGS + 1 {
        return Err(Error::InsufficientData(
            "autoregression needs more points than lags",
        ));
    }
    let rows = train.len() - LAGS;
    // Column 0 is the intercept; column k is lag k.
    let x = DMatrix::from_fn(rows, LAGS + 1, |r, c| {
        if c == 0 { 1.0 } else { train[r + LAGS - c] }
    });
    let y = DVector::from_fn(rows, |r, _| train[r + LAGS]);
    // A constant series makes the design rank-deficient; the SVD solve
    // stays defined there.
    x.svd(true, true)
        .solve(&y, 1.0e-12)
        .map_err(|_| Error::InsufficientData("degenerate training series"))
}

/// Recursive multi-step prediction: a rolling buffer of the last `LAGS`
/// values, seeded from the training tail, appends one model output per step.
fn predict(coef: &DVector<f64>, train: &[f64]) -> Vec<f64> {
    let mut window: VecDeque<f64> = train[train.len() - LAGS..].iter().copied().collect();
    let mut out = Vec::with_capacity(HORIZON);
    for _ in 0..HORIZON {
        let mut next = coef[0];
        for k in 1..=LAGS {
            next += coef[k] * window[window.len() - k];
        }
        window.pop_front();
        window.push_back(next);
        out.push(next);
    }
    out
}
