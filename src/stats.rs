use crate::{min_and_max, Error, Record, COL_CURRENT, COL_TIME, COL_VOLTAGE};
use std::fmt;

/// Descriptive statistics of one discharge log
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesStats {
    pub name: String,
    pub samples: usize,
    pub duration_s: f64,
    pub v_min: f64,
    pub v_max: f64,
    pub v_mean: f64,
    /// mean current and delivered charge, only when the log has a current column
    pub a_mean: Option<f64>,
    pub charge_ah: Option<f64>,
}

pub fn mean(v: &[f64]) -> f64 {
    v.iter().sum::<f64>() / v.len() as f64
}

/// trapezoidal integral of y over x
pub fn trapezoid(x: &[f64], y: &[f64]) -> f64 {
    x.windows(2)
        .zip(y.windows(2))
        .map(|(xw, yw)| (xw[1] - xw[0]) * (yw[0] + yw[1]) / 2.)
        .sum()
}

/// seconds as HH:MM:SS
pub fn format_duration(seconds: f64) -> String {
    let d = chrono::Duration::milliseconds((seconds * 1000.).round() as i64);
    format!(
        "{:02}:{:02}:{:02}",
        d.num_hours(),
        d.num_minutes() % 60,
        d.num_seconds() % 60
    )
}

impl SeriesStats {
    pub fn from_record(name: &str, record: &Record) -> Result<SeriesStats, Error> {
        let time = record.column(name, COL_TIME)?;
        let voltage = record.column(name, COL_VOLTAGE)?;
        let (t_min, t_max) = min_and_max(time).unwrap_or((0., 0.));
        let (v_min, v_max) = min_and_max(voltage).unwrap_or((f64::NAN, f64::NAN));
        let current = record.get(COL_CURRENT);
        Ok(SeriesStats {
            name: name.to_string(),
            samples: record.len(),
            duration_s: t_max - t_min,
            v_min,
            v_max,
            v_mean: mean(voltage),
            a_mean: current.map(mean),
            charge_ah: current.map(|a| trapezoid(time, a) / 3600.),
        })
    }
}

impl fmt::Display for SeriesStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} samples over {}, V min {:.3} max {:.3} mean {:.3}",
            self.name,
            self.samples,
            format_duration(self.duration_s),
            self.v_min,
            self.v_max,
            self.v_mean
        )?;
        if let (Some(a), Some(q)) = (self.a_mean, self.charge_ah) {
            write!(f, ", A mean {:.3}, {:.3} Ah", a, q)?;
        }
        Ok(())
    }
}
