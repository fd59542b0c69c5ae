// src/services/real_value.rs
use log::debug;

use crate::models::TimeSeries;

pub const DAYS_PER_YEAR: f64 = 365.25;

/// Real yield: nominal minus YoY inflation on the dates both series share.
///
/// Dates are matched exactly; nothing is interpolated. An empty result means
/// the two series have no date in common.
pub fn real_rate(nominal: &TimeSeries, inflation: &TimeSeries) -> TimeSeries {
    if inflation.is_empty() {
        return TimeSeries::empty();
    }

    TimeSeries::from_raw(nominal.points().iter().filter_map(|p| {
        inflation
            .get(p.date)
            .map(|infl| (p.date, Some(p.value - infl)))
    }))
}

/// Annual YoY percent expressed as a simple daily rate.
pub fn daily_inflation_rate(yoy_percent: f64) -> f64 {
    yoy_percent / DAYS_PER_YEAR / 100.0
}

/// Deflates one period's nominal return. `None` when the result is undefined.
pub fn real_return(nominal_return: f64, daily_inflation: f64) -> Option<f64> {
    let denominator = 1.0 + daily_inflation;
    if denominator.is_nan() || denominator <= 0.0 {
        return None;
    }
    let r = (1.0 + nominal_return) / denominator - 1.0;
    r.is_finite().then_some(r)
}

/// Inflation-adjusted price path.
///
/// Daily nominal returns are deflated by the most recent YoY inflation
/// reading (forward-filled onto the price dates, zero before the first
/// reading) converted to a daily rate, then compounded from the first price.
/// The first real price always equals the first nominal price. A point whose
/// return is undefined is left out and contributes no factor.
///
/// The compounded product telescopes to `price(t) * deflator(t)`, so the
/// nominal move is taken straight from the price and zero inflation returns
/// the nominal prices unchanged.
pub fn real_price(prices: &TimeSeries, inflation: &TimeSeries) -> TimeSeries {
    let points = prices.points();
    if points.is_empty() || inflation.is_empty() {
        return TimeSeries::empty();
    }

    let infl = inflation.points();
    let mut cursor = 0usize;
    let mut current_yoy = 0.0;
    // product of 1 / (1 + daily inflation) over the points kept so far
    let mut deflator = 1.0;
    // undoes the nominal move of each dropped point
    let mut correction = 1.0;
    let mut skipped = 0usize;
    let mut rows = Vec::with_capacity(points.len());

    for (t, p) in points.iter().enumerate() {
        while cursor < infl.len() && infl[cursor].date <= p.date {
            current_yoy = infl[cursor].value;
            cursor += 1;
        }

        if t == 0 {
            rows.push((p.date, Some(p.value)));
            continue;
        }
        let prev = points[t - 1].value;
        let daily = daily_inflation_rate(current_yoy);

        match real_return(p.value / prev - 1.0, daily) {
            Some(_) => {
                deflator /= 1.0 + daily;
                rows.push((p.date, Some(p.value * (deflator * correction))));
            }
            None => {
                skipped += 1;
                correction *= prev / p.value;
                rows.push((p.date, None));
            }
        }
    }

    if skipped > 0 {
        debug!("Dropped {} undefined points from real price series", skipped);
    }
    TimeSeries::from_raw(rows)
}
