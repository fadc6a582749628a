pub mod chart;
pub mod clut;
pub mod error;
pub mod plot;
pub mod record;
pub mod stats;

pub use error::Error;
pub use record::{parse_logs, Record, SeriesCollection};

pub const VERSION: Option<&str> = option_env!("CARGO_PKG_VERSION");

/// column names expected by the table builder and the chart
pub const COL_TIME: &str = "Time";
pub const COL_VOLTAGE: &str = "V";
pub const COL_CURRENT: &str = "A";

pub const EXIT_FAILURE: i32 = 1;
pub const EXIT_NO_DATA: i32 = 2;
pub const EXIT_BAD_CONFIG: i32 = 3;

/// min and max of a float slice, skipping NAN;
/// None if there is no comparable value
pub fn min_and_max(s: &[f64]) -> Option<(f64, f64)> {
    let mut s_iter = s.iter().filter(|v| !v.is_nan());
    let (mut min, mut max) = match s_iter.next() {
        Some(v) => (*v, *v),
        None => return None,
    };
    for es in s_iter {
        if *es > max {
            max = *es
        }
        if *es < min {
            min = *es
        }
    }
    Some((min, max))
}
