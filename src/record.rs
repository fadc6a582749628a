use crate::Error;
use log::{debug, warn};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

/// The columns of one log file, in header order.
/// Every column holds one sample per data line.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    names: Vec<String>,
    samples: Vec<Vec<f64>>,
}

impl Record {
    pub fn new(names: Vec<String>) -> Record {
        let samples = vec![Vec::new(); names.len()];
        Record { names, samples }
    }

    /// Read a whitespace delimited log.
    /// The first line is a marker token followed by the column names,
    /// every other non-blank line must carry one number per column.
    pub fn from_log(fin: &Path) -> Result<Record, Error> {
        let file = File::open(fin).map_err(|source| Error::Io {
            path: fin.to_path_buf(),
            source,
        })?;
        Record::from_reader(fin, BufReader::new(file))
    }

    /// same as `from_log`, `path` is only used in the error messages
    pub fn from_reader<R: BufRead>(path: &Path, buf: R) -> Result<Record, Error> {
        let mut lines = buf.lines();
        let header = match lines.next() {
            Some(l) => l.map_err(|source| Error::Io {
                path: path.to_path_buf(),
                source,
            })?,
            None => {
                return Err(Error::MissingHeader {
                    path: path.to_path_buf(),
                })
            }
        };
        let mut header_split = header.split_whitespace();
        if header_split.next().is_none() {
            return Err(Error::MissingHeader {
                path: path.to_path_buf(),
            });
        }
        let mut record = Record::new(header_split.map(String::from).collect());

        for (n, l) in lines.enumerate() {
            let line_number = n + 2;
            let l_ok = l.map_err(|source| Error::Io {
                path: path.to_path_buf(),
                source,
            })?;
            let tokens: Vec<&str> = l_ok.split_whitespace().collect();
            if tokens.is_empty() {
                continue;
            }
            if tokens.len() != record.names.len() {
                return Err(Error::ColumnCount {
                    path: path.to_path_buf(),
                    line: line_number,
                    expected: record.names.len(),
                    found: tokens.len(),
                });
            }
            for (column, token) in record.samples.iter_mut().zip(tokens) {
                let value: f64 = token.parse().map_err(|_| Error::InvalidNumber {
                    path: path.to_path_buf(),
                    line: line_number,
                    token: token.to_string(),
                })?;
                column.push(value);
            }
        }
        Ok(record)
    }

    /// column names in header order
    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn get(&self, name: &str) -> Option<&[f64]> {
        self.names
            .iter()
            .position(|n| n == name)
            .map(|i| &self.samples[i][..])
    }

    /// like `get`, but a missing column is an error naming the series
    pub fn column(&self, series: &str, name: &str) -> Result<&[f64], Error> {
        self.get(name).ok_or_else(|| Error::MissingColumn {
            series: series.to_string(),
            column: name.to_string(),
        })
    }

    /// number of data lines
    pub fn len(&self) -> usize {
        self.samples.first().map_or(0, |c| c.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Named records, one per input file, in first-seen order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SeriesCollection {
    series: Vec<(String, Record)>,
}

impl SeriesCollection {
    pub fn new() -> SeriesCollection {
        SeriesCollection { series: Vec::new() }
    }

    /// Build the collection from parsed files in command line order.
    /// A key seen again replaces the earlier record but keeps its position.
    pub fn merge<I: IntoIterator<Item = (String, Record)>>(parsed: I) -> SeriesCollection {
        let mut collection = SeriesCollection::new();
        for (key, record) in parsed {
            match collection.series.iter_mut().find(|(k, _)| *k == key) {
                Some(entry) => {
                    debug!("'{}' appears more than once, keeping the last file", key);
                    entry.1 = record;
                }
                None => collection.series.push((key, record)),
            }
        }
        collection
    }

    pub fn get(&self, key: &str) -> Option<&Record> {
        self.series.iter().find(|(k, _)| k == key).map(|(_, r)| r)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Record)> {
        self.series.iter().map(|(k, r)| (k.as_str(), r))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.series.iter().map(|(k, _)| k.as_str())
    }

    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }
}

/// base name of the path with the final extension removed
pub fn series_key(path: &Path) -> String {
    match path.file_stem() {
        Some(stem) => stem.to_string_lossy().into_owned(),
        None => path.to_string_lossy().into_owned(),
    }
}

/// Parse every readable file into a record.
/// Paths that are not readable regular files are skipped with a warning and
/// returned as the second element; a malformed file aborts the whole parse.
pub fn parse_logs<P: AsRef<Path>>(files: &[P]) -> Result<(SeriesCollection, Vec<PathBuf>), Error> {
    let mut parsed: Vec<(String, Record)> = Vec::with_capacity(files.len());
    let mut skipped: Vec<PathBuf> = Vec::new();
    for fin in files {
        let fin: &Path = fin.as_ref();
        if !fin.is_file() {
            warn!("{} is not a file", fin.display());
            skipped.push(fin.to_path_buf());
            continue;
        }
        let file = match File::open(fin) {
            Ok(f) => f,
            Err(e) => {
                warn!("could not open {}, {}", fin.display(), e);
                skipped.push(fin.to_path_buf());
                continue;
            }
        };
        let record = Record::from_reader(fin, BufReader::new(file))?;
        debug!(
            "read {} lines with columns {:?} from {}",
            record.len(),
            record.names(),
            fin.display()
        );
        parsed.push((series_key(fin), record));
    }
    Ok((SeriesCollection::merge(parsed), skipped))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::io::Cursor;
    use tempfile::TempDir;

    const LOG: &str = "# Time V A\n0 4.20 0.5\n60 4.10 0.5\n120 4.05 0.49\n";

    fn read(content: &str) -> Result<Record, Error> {
        Record::from_reader(Path::new("test.log"), Cursor::new(content))
    }

    #[test]
    fn columns_follow_the_header() {
        let record = read(LOG).unwrap();
        assert_eq!(record.names(), &["Time", "V", "A"]);
        assert_eq!(record.len(), 3);
        assert_eq!(record.get("Time").unwrap(), &[0., 60., 120.]);
        assert_eq!(record.get("V").unwrap(), &[4.20, 4.10, 4.05]);
        assert_eq!(record.get("A").unwrap(), &[0.5, 0.5, 0.49]);
    }

    #[test]
    fn any_marker_and_blank_lines() {
        let record = read("% V\n\n3.7\n  \n3.6e0\n").unwrap();
        assert_eq!(record.get("V").unwrap(), &[3.7, 3.6]);
    }

    #[test]
    fn missing_column_only_fails_on_use() {
        let record = read("# Time V\n0 4.2\n").unwrap();
        assert!(record.get("A").is_none());
        match record.column("run", "A") {
            Err(Error::MissingColumn { series, column }) => {
                assert_eq!(series, "run");
                assert_eq!(column, "A");
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn empty_file_has_no_header() {
        assert!(matches!(read(""), Err(Error::MissingHeader { .. })));
        assert!(matches!(read("   \n1 2\n"), Err(Error::MissingHeader { .. })));
    }

    #[test]
    fn short_line_is_fatal() {
        match read("# Time V A\n0 4.2 0.5\n60 4.1\n") {
            Err(Error::ColumnCount {
                line,
                expected,
                found,
                ..
            }) => {
                assert_eq!(line, 3);
                assert_eq!(expected, 3);
                assert_eq!(found, 2);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn long_line_is_fatal() {
        assert!(matches!(
            read("# Time V\n0 4.2 0.5\n"),
            Err(Error::ColumnCount { found: 3, .. })
        ));
    }

    #[test]
    fn bad_number_is_fatal() {
        match read("# Time V\n0 4.2\n60 four\n") {
            Err(e @ Error::InvalidNumber { .. }) => {
                assert!(e.is_parse_error());
                assert!(e.to_string().contains("'four'"));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn key_drops_directory_and_last_extension() {
        assert_eq!(series_key(Path::new("logs/run.log")), "run");
        assert_eq!(series_key(Path::new("cell.2.txt")), "cell.2");
        assert_eq!(series_key(Path::new("plain")), "plain");
    }

    #[test]
    fn missing_files_are_skipped() {
        let dir = TempDir::new().unwrap();
        let valid = dir.path().join("valid.log");
        let missing = dir.path().join("missing.log");
        fs::write(&valid, LOG).unwrap();

        let (series, skipped) = parse_logs(&[&valid, &missing]).unwrap();
        assert_eq!(series.len(), 1);
        assert!(series.get("valid").is_some());
        assert_eq!(skipped, vec![missing]);
    }

    #[test]
    fn directories_are_skipped() {
        let dir = TempDir::new().unwrap();
        let (series, skipped) = parse_logs(&[dir.path()]).unwrap();
        assert!(series.is_empty());
        assert_eq!(skipped.len(), 1);
    }

    #[test]
    fn last_file_wins_on_same_key() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("a")).unwrap();
        fs::create_dir(dir.path().join("b")).unwrap();
        let first = dir.path().join("a").join("run.log");
        let other = dir.path().join("other.log");
        let second = dir.path().join("b").join("run.log");
        fs::write(&first, "# V\n4.2\n").unwrap();
        fs::write(&other, "# V\n3.3\n").unwrap();
        fs::write(&second, "# V\n3.9\n3.8\n").unwrap();

        let (series, _) = parse_logs(&[&first, &other, &second]).unwrap();
        assert_eq!(series.len(), 2);
        assert_eq!(series.keys().collect::<Vec<_>>(), vec!["run", "other"]);
        assert_eq!(series.get("run").unwrap().get("V").unwrap(), &[3.9, 3.8]);
    }

    #[test]
    fn one_bad_file_aborts_everything() {
        let dir = TempDir::new().unwrap();
        let good = dir.path().join("good.log");
        let bad = dir.path().join("bad.log");
        fs::write(&good, LOG).unwrap();
        fs::write(&bad, "# Time V\n0\n").unwrap();
        assert!(parse_logs(&[&good, &bad]).is_err());
    }
}
