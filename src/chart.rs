use crate::{min_and_max, Error, SeriesCollection, COL_TIME, COL_VOLTAGE};
use log::info;
use plotters::prelude::*;
use std::path::{Path, PathBuf};

pub const DEFAULT_CHART_NAME: &str = "plot";

/// One discharge curve in chart units: minutes and millivolts
#[derive(Debug, Clone)]
pub struct Curve {
    pub label: String,
    pub points: Vec<(f64, f64)>,
}

/// Renders the voltage curves of a series collection to svg.
/// Everything the drawing needs is held here, nothing is shared between charts.
#[derive(Debug, Clone)]
pub struct Chart {
    pub title: String,
    pub size: (u32, u32),
}

impl Chart {
    pub fn new(title: &str) -> Chart {
        Chart {
            title: title.to_string(),
            size: (1600, 900),
        }
    }

    /// `<title>.svg`, or `plot.svg` without a title
    pub fn file_name(&self) -> String {
        if self.title.is_empty() {
            format!("{}.svg", DEFAULT_CHART_NAME)
        } else {
            format!("{}.svg", self.title)
        }
    }

    pub fn output_path(&self) -> PathBuf {
        PathBuf::from(self.file_name())
    }

    /// extract the Time and V columns of every series, converted for plotting
    pub fn curves(series: &SeriesCollection) -> Result<Vec<Curve>, Error> {
        series
            .iter()
            .map(|(name, record)| {
                let time = record.column(name, COL_TIME)?;
                let voltage = record.column(name, COL_VOLTAGE)?;
                let points = time
                    .iter()
                    .zip(voltage.iter())
                    .map(|(t, v)| (t / 60., v * 1000.))
                    .collect();
                Ok(Curve {
                    label: name.to_string(),
                    points,
                })
            })
            .collect()
    }

    /// draw the chart to the svg file `fout`
    pub fn save(&self, series: &SeriesCollection, fout: &Path) -> Result<(), Error> {
        let curves = Chart::curves(series)?;
        self.draw(&curves, fout)
            .map_err(|e| Error::Render(e.to_string()))?;
        info!("chart saved to {}", fout.display());
        Ok(())
    }

    /// draw the chart to a temporary svg and open it in the default viewer
    pub fn show(&self, series: &SeriesCollection) -> Result<PathBuf, Error> {
        let fout = std::env::temp_dir().join(self.file_name());
        self.save(series, &fout)?;
        open::that(&fout).map_err(|e| {
            Error::Render(format!("could not open {}, {}", fout.display(), e))
        })?;
        Ok(fout)
    }

    fn draw(&self, curves: &[Curve], fout: &Path) -> Result<(), Box<dyn std::error::Error>> {
        let xs: Vec<f64> = curves.iter().flat_map(|c| c.points.iter().map(|p| p.0)).collect();
        let ys: Vec<f64> = curves.iter().flat_map(|c| c.points.iter().map(|p| p.1)).collect();
        let (xmin, xmax) = padded_range(&xs, 20.);
        let (ymin, ymax) = padded_range(&ys, 10.);

        let root = SVGBackend::new(fout, self.size).into_drawing_area();
        root.fill(&WHITE)?;
        let mut builder = ChartBuilder::on(&root);
        builder.margin(20).x_label_area_size(60).y_label_area_size(100);
        if !self.title.is_empty() {
            builder.caption(&self.title, ("sans-serif", 32));
        }
        let mut chart = builder.build_cartesian_2d(xmin..xmax, ymin..ymax)?;
        chart
            .configure_mesh()
            .light_line_style(&BLACK.mix(0.05))
            .bold_line_style(BLACK.mix(0.2).stroke_width(1))
            .set_all_tick_mark_size(2)
            .label_style(("sans-serif", 20))
            .x_desc("Time [m]")
            .y_desc("Voltage [mV]")
            .x_label_formatter(&|x: &f64| format!("{:.0}", x))
            .y_label_formatter(&|y: &f64| format!("{:.0}", y))
            .draw()?;

        for (idx, curve) in curves.iter().enumerate() {
            let style = Palette99::pick(idx).stroke_width(2);
            chart
                .draw_series(LineSeries::new(curve.points.iter().copied(), style))?
                .label(curve.label.as_str())
                .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], style));
        }
        chart
            .configure_series_labels()
            .position(SeriesLabelPosition::UpperRight)
            .label_font(("sans-serif", 20))
            .background_style(&WHITE.mix(0.8))
            .border_style(&BLACK)
            .draw()?;
        root.present()?;
        Ok(())
    }
}

/// min and max widened by span / `fraction` on both sides,
/// falling back to a unit range when there is nothing to span
fn padded_range(v: &[f64], fraction: f64) -> (f64, f64) {
    match min_and_max(v) {
        Some((min, max)) if max > min => {
            let margin = (max - min) / fraction;
            (min - margin, max + margin)
        }
        Some((min, _)) => (min - 1., min + 1.),
        None => (0., 1.),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Record;
    use std::io::Cursor;
    use tempfile::TempDir;

    fn series() -> SeriesCollection {
        let a = "# Time V A\n0 4.2 1\n600 4.0 1\n1200 3.8 1\n";
        let b = "# Time V A\n0 4.1 2\n600 3.7 2\n";
        SeriesCollection::merge(vec![
            (
                "cell_a".to_string(),
                Record::from_reader(Path::new("cell_a.log"), Cursor::new(a)).unwrap(),
            ),
            (
                "cell_b".to_string(),
                Record::from_reader(Path::new("cell_b.log"), Cursor::new(b)).unwrap(),
            ),
        ])
    }

    #[test]
    fn output_name_from_title() {
        assert_eq!(Chart::new("").output_path(), PathBuf::from("plot.svg"));
        assert_eq!(Chart::new("discharge").output_path(), PathBuf::from("discharge.svg"));
    }

    #[test]
    fn curves_in_minutes_and_millivolts() {
        let curves = Chart::curves(&series()).unwrap();
        assert_eq!(curves.len(), 2);
        assert_eq!(curves[0].label, "cell_a");
        assert_eq!(curves[0].points[1], (10., 4000.));
        assert_eq!(curves[1].points.len(), 2);
    }

    #[test]
    fn ranges_are_never_empty() {
        assert_eq!(padded_range(&[], 10.), (0., 1.));
        assert_eq!(padded_range(&[5.], 10.), (4., 6.));
        assert_eq!(padded_range(&[0., 20.], 10.), (-2., 22.));
    }

    #[test]
    fn svg_is_written() {
        let dir = TempDir::new().unwrap();
        let fout = dir.path().join("plot.svg");
        Chart::new("discharge").save(&series(), &fout).unwrap();
        let svg = std::fs::read_to_string(&fout).unwrap();
        assert!(svg.contains("<svg"));
        assert!(svg.contains("cell_b"));
    }

    #[test]
    fn missing_time_column_fails_before_drawing() {
        let dir = TempDir::new().unwrap();
        let fout = dir.path().join("plot.svg");
        let r = Record::from_reader(Path::new("v.log"), Cursor::new("# V\n4.2\n")).unwrap();
        let series = SeriesCollection::merge(vec![("v".to_string(), r)]);
        assert!(matches!(
            Chart::new("").save(&series, &fout),
            Err(Error::MissingColumn { .. })
        ));
        assert!(!fout.exists());
    }
}
