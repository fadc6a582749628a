use crate::{Error, SeriesCollection, COL_VOLTAGE};
use log::debug;
use std::fmt;

/// C type name of a table entry
pub const CLUT_TYPE: &str = "soc_voltage_t";

/// One row of the lookup table: state of charge in percent and voltage in mV
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClutEntry {
    pub soc: i16,
    pub voltage: i16,
}

/// The voltage to state-of-charge lookup table of one series
#[derive(Debug, Clone, PartialEq)]
pub struct Clut {
    pub name: String,
    pub entries: Vec<ClutEntry>,
}

/// Sampling stride over the sorted voltages: floor(len / buckets) - 1.
/// Fails when there are too few samples for the requested buckets.
pub fn clut_step(len: usize, buckets: usize) -> Result<usize, Error> {
    if buckets == 0 {
        return Err(Error::InvalidConfiguration(
            "the number of buckets must be at least 1".to_string(),
        ));
    }
    match (len / buckets).checked_sub(1) {
        Some(step) if step > 0 => Ok(step),
        _ => Err(Error::InvalidConfiguration(format!(
            "{} samples are not enough for {} buckets, need at least {}",
            len,
            buckets,
            buckets.saturating_mul(2)
        ))),
    }
}

fn round_i16(v: f64) -> Option<i16> {
    let r = v.round_ties_even();
    if r.is_finite() && r >= i16::MIN as f64 && r <= i16::MAX as f64 {
        Some(r as i16)
    } else {
        None
    }
}

impl Clut {
    /// Sort the voltages in descending order and take one every `step`,
    /// pairing them with a state of charge falling from 100 by 100/buckets.
    pub fn build(name: &str, voltages: &[f64], buckets: usize) -> Result<Clut, Error> {
        let step = clut_step(voltages.len(), buckets)?;
        if let Some((index, value)) = voltages.iter().enumerate().find(|(_, v)| !v.is_finite()) {
            return Err(Error::BadVoltage {
                series: name.to_string(),
                index,
                value: *value,
            });
        }
        let mut sorted = voltages.to_vec();
        sorted.sort_by(|a, b| b.total_cmp(a));

        let mut entries = Vec::with_capacity((sorted.len() + step - 1) / step);
        let mut soc = 100.;
        for (rank, v) in sorted.iter().enumerate().step_by(step) {
            let voltage = round_i16(v * 1000.).ok_or_else(|| Error::BadVoltage {
                series: name.to_string(),
                index: rank,
                value: *v,
            })?;
            let soc_pct = round_i16(soc).ok_or_else(|| {
                Error::InvalidConfiguration(format!("state of charge {} out of range", soc))
            })?;
            entries.push(ClutEntry {
                soc: soc_pct,
                voltage,
            });
            soc -= 100. / buckets as f64;
        }
        debug!(
            "{}: {} samples, step {}, {} entries",
            name,
            sorted.len(),
            step,
            entries.len()
        );
        Ok(Clut {
            name: name.to_string(),
            entries,
        })
    }

    /// table name usable as a C identifier
    pub fn identifier(&self) -> String {
        let mut ident: String = self
            .name
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
            .collect();
        if ident.is_empty() || ident.starts_with(|c: char| c.is_ascii_digit()) {
            ident.insert(0, '_');
        }
        ident
    }
}

impl fmt::Display for Clut {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "const {} {}[{}] = {{",
            CLUT_TYPE,
            self.identifier(),
            self.entries.len()
        )?;
        for e in &self.entries {
            writeln!(f, "    {{ {}, {} }},", e.soc, e.voltage)?;
        }
        writeln!(f, "}};")
    }
}

/// the struct declaration printed ahead of the tables
pub fn clut_declaration() -> String {
    format!(
        "typedef struct {{\n    int16_t soc;\n    int16_t voltage;\n}} {};\n",
        CLUT_TYPE
    )
}

/// Build the table of every series from its voltage column.
/// All tables are built before anything is returned, so a failing series
/// leaves no partial output.
pub fn build_cluts(series: &SeriesCollection, buckets: usize) -> Result<Vec<Clut>, Error> {
    series
        .iter()
        .map(|(name, record)| Clut::build(name, record.column(name, COL_VOLTAGE)?, buckets))
        .collect()
}

/// declaration followed by one array per series, ready for a C header
pub fn render_cluts(series: &SeriesCollection, buckets: usize) -> Result<String, Error> {
    let mut out = clut_declaration();
    for clut in build_cluts(series, buckets)? {
        out.push('\n');
        out.push_str(&clut.to_string());
    }
    Ok(out)
}
