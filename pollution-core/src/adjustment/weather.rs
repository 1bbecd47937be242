use crate::model::Record;

const PRECIPITATION_ADJUSTMENT: f64 = -0.20;

const CALM_WIND_BELOW: f64 = 5.0;
const STRONG_WIND_ABOVE: f64 = 15.0;
const WIND_ADJUSTMENT: f64 = 0.15;

const HIGH_PRESSURE_ABOVE: f64 = 1025.0;
const LOW_PRESSURE_BELOW: f64 = 1010.0;
const PRESSURE_ADJUSTMENT: f64 = 0.10;

pub const MAX_WEATHER_ADJUSTMENT: f64 = 0.30;

/// Aggregate weather over an anchor window. Missing values are skipped.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeatherSummary {
    pub total_rain: f64,
    pub total_snow: f64,
    pub avg_wind: Option<f64>,
    pub avg_pressure: Option<f64>,
}

impl WeatherSummary {
    pub fn from_window(window: &[Record]) -> Self {
        Self {
            total_rain: finite(window, |r| r.rain).sum(),
            total_snow: finite(window, |r| r.snow).sum(),
            avg_wind: average(finite(window, |r| r.wnd_spd)),
            avg_pressure: average(finite(window, |r| r.press)),
        }
    }

    pub fn has_precipitation(&self) -> bool {
        self.total_rain > 0.0 || self.total_snow > 0.0
    }

    /// Adjustment factor in `[-0.30, 0.30]`.
    ///
    /// Precipitation washes out pollutants and overrides the wind and
    /// pressure effects, which only apply in dry conditions.
    pub fn adjustment(&self) -> f64 {
        if self.has_precipitation() {
            return PRECIPITATION_ADJUSTMENT;
        }

        let wind = match self.avg_wind {
            Some(w) if w < CALM_WIND_BELOW => WIND_ADJUSTMENT,
            Some(w) if w > STRONG_WIND_ABOVE => -WIND_ADJUSTMENT,
            _ => 0.0,
        };

        let pressure = match self.avg_pressure {
            Some(p) if p > HIGH_PRESSURE_ABOVE => PRESSURE_ADJUSTMENT,
            Some(p) if p < LOW_PRESSURE_BELOW => -PRESSURE_ADJUSTMENT,
            _ => 0.0,
        };

        (wind + pressure).clamp(-MAX_WEATHER_ADJUSTMENT, MAX_WEATHER_ADJUSTMENT)
    }
}

/// Weather adjustment factor for an anchor window.
pub fn weather_adjustment(window: &[Record]) -> f64 {
    WeatherSummary::from_window(window).adjustment()
}

fn finite<'a>(window: &'a [Record], field: fn(&Record) -> f64) -> impl Iterator<Item = f64> + 'a {
    window.iter().map(field).filter(|x| x.is_finite())
}

fn average(values: impl Iterator<Item = f64>) -> Option<f64> {
    let (sum, n) = values.fold((0.0, 0usize), |(s, n), x| (s + x, n + 1));
    (n > 0).then_some(sum / n as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::tests::daily_records;

    fn window(wind: f64, press: f64, rain: f64, snow: f64) -> Vec<Record> {
        daily_records(10)
            .into_iter()
            .map(|mut r| {
                r.wnd_spd = wind;
                r.press = press;
                r.rain = rain;
                r.snow = snow;
                r
            })
            .collect()
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn precipitation_overrides_wind_and_pressure() {
        for (wind, press) in [(1.0, 1040.0), (30.0, 990.0), (10.0, 1015.0)] {
            assert_eq!(weather_adjustment(&window(wind, press, 0.4, 0.0)), -0.20);
            assert_eq!(weather_adjustment(&window(wind, press, 0.0, 2.0)), -0.20);
        }
    }

    #[test]
    fn single_wet_day_is_enough() {
        let mut w = window(2.0, 1030.0, 0.0, 0.0);
        w[3].rain = 0.1;
        assert_eq!(weather_adjustment(&w), -0.20);
    }

    #[test]
    fn wind_and_pressure_effects_sum() {
        assert!(approx(weather_adjustment(&window(3.0, 1000.0, 0.0, 0.0)), 0.05));
        assert!(approx(weather_adjustment(&window(3.0, 1030.0, 0.0, 0.0)), 0.25));
        assert!(approx(weather_adjustment(&window(20.0, 1000.0, 0.0, 0.0)), -0.25));
        assert!(approx(weather_adjustment(&window(20.0, 1030.0, 0.0, 0.0)), -0.05));
    }

    #[test]
    fn neutral_band_has_no_effect() {
        assert_eq!(weather_adjustment(&window(5.0, 1010.0, 0.0, 0.0)), 0.0);
        assert_eq!(weather_adjustment(&window(15.0, 1025.0, 0.0, 0.0)), 0.0);
    }

    #[test]
    fn factor_always_within_bounds() {
        for wind in [0.0, 4.9, 5.0, 10.0, 15.0, 15.1, 80.0] {
            for press in [950.0, 1009.9, 1010.0, 1020.0, 1025.0, 1025.1, 1060.0] {
                for rain in [0.0, 1.0] {
                    let f = weather_adjustment(&window(wind, press, rain, 0.0));
                    assert!((-MAX_WEATHER_ADJUSTMENT..=MAX_WEATHER_ADJUSTMENT).contains(&f));
                }
            }
        }
    }

    #[test]
    fn missing_values_are_skipped() {
        let mut w = window(3.0, 1000.0, 0.0, 0.0);
        w[0].rain = f64::NAN;
        w[1].wnd_spd = f64::NAN;

        assert!(approx(weather_adjustment(&w), 0.05));

        let all_missing = window(f64::NAN, f64::NAN, 0.0, 0.0);
        let summary = WeatherSummary::from_window(&all_missing);
        assert_eq!(summary.avg_wind, None);
        assert_eq!(summary.adjustment(), 0.0);
    }
}
