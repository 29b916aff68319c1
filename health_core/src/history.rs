//! Append-only CSV history of saved calculations.
//!
//! The store writes a header row the first time it appends to an empty file
//! and never rewrites existing rows. Reads are lazy and fail-soft: a row that
//! cannot be parsed is reported on its own and iteration carries on.
//!
//! There is no locking. The store assumes a single process appending
//! sequentially.

use crate::{
    ActivityLevel, BiometricInput, BmiCategory, Config, Error, Gender, HistoryEntry,
    MetricsResult, Result, TrendPoint,
};
use chrono::{Local, NaiveDateTime, Timelike};
use csv::{ReaderBuilder, StringRecord, Trim};
use serde::{Deserialize, Serialize};
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

/// Timestamp layout used in the `timestamp` column
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Column order of the history file
pub const HEADER: [&str; 12] = [
    "timestamp",
    "name",
    "age",
    "gender",
    "height_cm",
    "weight_kg",
    "bmi",
    "category",
    "bmr",
    "tdee",
    "water_l",
    "activity",
];

/// A row of the history file, every field as text
///
/// Field order here defines the header order.
#[derive(Debug, Serialize, Deserialize)]
struct CsvRow {
    timestamp: String,
    #[serde(default)]
    name: String,
    age: String,
    gender: String,
    height_cm: String,
    weight_kg: String,
    bmi: String,
    category: String,
    bmr: String,
    tdee: String,
    water_l: String,
    #[serde(default)]
    activity: Option<String>,
}

impl From<&HistoryEntry> for CsvRow {
    fn from(entry: &HistoryEntry) -> Self {
        CsvRow {
            timestamp: entry.timestamp.format(TIMESTAMP_FORMAT).to_string(),
            name: entry.name.clone().unwrap_or_default(),
            age: entry.age.to_string(),
            gender: entry.gender.label().to_string(),
            height_cm: format!("{:.1}", entry.height_cm),
            weight_kg: format!("{:.1}", entry.weight_kg),
            bmi: format!("{:.2}", entry.bmi),
            category: entry.category.label().to_string(),
            bmr: format!("{:.0}", entry.bmr),
            tdee: format!("{:.0}", entry.tdee),
            water_l: format!("{:.2}", entry.water_l),
            activity: entry.activity.map(|a| a.label().to_string()),
        }
    }
}

impl CsvRow {
    fn into_entry(self, line: u64) -> Result<HistoryEntry> {
        let name = self.name.trim();
        let activity = match self.activity.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(label) => Some(ActivityLevel::from_label(label).ok_or_else(|| {
                malformed(line, format!("unknown activity '{}'", label))
            })?),
        };

        Ok(HistoryEntry {
            timestamp: parse_timestamp(&self.timestamp)
                .map_err(|e| malformed(line, format!("timestamp: {}", e)))?,
            name: (!name.is_empty()).then(|| name.to_string()),
            age: parse_field(line, "age", &self.age)?,
            gender: Gender::classify(&self.gender),
            height_cm: parse_field(line, "height_cm", &self.height_cm)?,
            weight_kg: parse_field(line, "weight_kg", &self.weight_kg)?,
            bmi: parse_field(line, "bmi", &self.bmi)?,
            category: self
                .category
                .parse::<BmiCategory>()
                .map_err(|e| malformed(line, e.to_string()))?,
            bmr: parse_field(line, "bmr", &self.bmr)?,
            tdee: parse_field(line, "tdee", &self.tdee)?,
            water_l: parse_field(line, "water_l", &self.water_l)?,
            activity,
        })
    }
}

/// Just the columns the BMI trend needs
#[derive(Debug, Deserialize)]
struct TrendRow {
    timestamp: String,
    bmi: String,
}

fn malformed(line: u64, reason: impl Into<String>) -> Error {
    Error::MalformedRecord {
        line,
        reason: reason.into(),
    }
}

fn parse_field<T: std::str::FromStr>(line: u64, field: &str, text: &str) -> Result<T>
where
    T::Err: std::fmt::Display,
{
    text.trim()
        .parse::<T>()
        .map_err(|e| malformed(line, format!("{} '{}': {}", field, text, e)))
}

fn parse_timestamp(text: &str) -> std::result::Result<NaiveDateTime, chrono::ParseError> {
    NaiveDateTime::parse_from_str(text.trim(), TIMESTAMP_FORMAT)
}

/// Round to a fixed number of decimal places
///
/// Goes through the same `{:.N}` formatting used for display and for the
/// CSV columns, so ties resolve identically everywhere (half to even).
pub(crate) fn round_to(value: f64, decimals: usize) -> f64 {
    format!("{:.*}", decimals, value).parse().unwrap_or(value)
}

impl HistoryEntry {
    /// Build an entry stamped with the current local time
    pub fn new(input: &BiometricInput, result: &MetricsResult) -> Self {
        let now = Local::now().naive_local();
        // Second precision only
        let now = now.with_nanosecond(0).unwrap_or(now);
        Self::at(now, input, result)
    }

    /// Build an entry with an explicit timestamp, rounding every value to
    /// the precision it is persisted with
    pub fn at(timestamp: NaiveDateTime, input: &BiometricInput, result: &MetricsResult) -> Self {
        HistoryEntry {
            timestamp,
            name: input.name.clone(),
            age: input.age,
            gender: input.gender,
            height_cm: round_to(input.height_cm, 1),
            weight_kg: round_to(input.weight_kg, 1),
            bmi: round_to(result.bmi, 2),
            category: result.category,
            bmr: round_to(result.bmr, 0),
            tdee: round_to(result.tdee, 0),
            water_l: round_to(result.water_liters, 2),
            activity: Some(input.activity),
        }
    }
}

/// CSV-backed history log
#[derive(Clone, Debug)]
pub struct HistoryStore {
    path: PathBuf,
}

impl HistoryStore {
    /// Create a store for the given file path. Nothing is touched on disk
    /// until the first append.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Create a store at the configured data directory and file name
    pub fn from_config(config: &Config) -> Self {
        Self::new(config.data.history_path())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Ensure the parent directory exists
    fn ensure_parent_dir(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| Error::storage(parent, e))?;
        }
        Ok(())
    }

    fn storage_error(&self, err: csv::Error) -> Error {
        if err.is_io_error() {
            if let csv::ErrorKind::Io(io_err) = err.into_kind() {
                return Error::storage(&self.path, io_err);
            }
            return Error::storage(
                &self.path,
                std::io::Error::new(std::io::ErrorKind::Other, "CSV write failed"),
            );
        }
        Error::Csv(err)
    }

    /// Append one entry as the newest row
    ///
    /// Creates the data directory and file on demand. The header row is
    /// written only when the file is empty, so repeated appends never
    /// duplicate it.
    pub fn append(&self, entry: &HistoryEntry) -> Result<()> {
        self.ensure_parent_dir()?;

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| Error::storage(&self.path, e))?;

        let needs_headers = file
            .metadata()
            .map_err(|e| Error::storage(&self.path, e))?
            .len()
            == 0;

        let mut writer = csv::WriterBuilder::new()
            .has_headers(needs_headers)
            .from_writer(file);

        writer
            .serialize(CsvRow::from(entry))
            .map_err(|e| self.storage_error(e))?;

        writer.flush().map_err(|e| Error::storage(&self.path, e))?;
        let file = writer
            .into_inner()
            .map_err(|e| Error::storage(&self.path, e.into_error()))?;
        file.sync_all().map_err(|e| Error::storage(&self.path, e))?;

        if needs_headers {
            tracing::info!("Created history file {:?}", self.path);
        }
        tracing::debug!("Appended entry at {} to history", entry.timestamp);
        Ok(())
    }

    fn open_reader(&self) -> Result<Option<csv::Reader<File>>> {
        let file = match File::open(&self.path) {
            Ok(file) => file,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!("No history file at {:?}", self.path);
                return Ok(None);
            }
            Err(e) => return Err(Error::storage(&self.path, e)),
        };

        Ok(Some(
            ReaderBuilder::new()
                .has_headers(true)
                .flexible(true)
                .trim(Trim::All)
                .from_reader(file),
        ))
    }

    /// Read every row, oldest first
    ///
    /// The returned sequence is lazy; call again to restart from the top.
    /// A missing file yields an empty sequence. Rows that cannot be parsed
    /// are yielded as [`Error::MalformedRecord`] without ending iteration.
    /// A header that cannot be decoded yields a single `MalformedRecord`.
    pub fn read_all(&self) -> Result<HistoryRecords> {
        let Some(mut reader) = self.open_reader()? else {
            return Ok(HistoryRecords::empty());
        };
        let headers = match reader.headers() {
            Ok(headers) => headers.clone(),
            Err(e) if e.is_io_error() => return Err(self.storage_error(e)),
            Err(e) => {
                let line = e.position().map_or(1, |p| p.line());
                return Ok(HistoryRecords::failed(malformed(
                    line,
                    format!("header: {}", e),
                )));
            }
        };

        Ok(HistoryRecords {
            reader: Some(reader),
            headers,
            record: StringRecord::new(),
            pending: None,
        })
    }

    /// All parseable entries, oldest first; malformed rows are logged and
    /// skipped
    pub fn entries(&self) -> Result<Vec<HistoryEntry>> {
        let mut entries = Vec::new();
        for result in self.read_all()? {
            match result {
                Ok(entry) => entries.push(entry),
                Err(Error::MalformedRecord { line, reason }) => {
                    tracing::warn!("Skipping history row at line {}: {}", line, reason);
                }
                Err(e) => return Err(e),
            }
        }
        tracing::debug!("Read {} entries from {:?}", entries.len(), self.path);
        Ok(entries)
    }

    /// `(timestamp, bmi)` points for charting, oldest first
    ///
    /// Only the two charted columns are parsed; rows where either is missing
    /// or unparseable are skipped.
    pub fn bmi_trend(&self) -> Result<Vec<TrendPoint>> {
        let Some(mut reader) = self.open_reader()? else {
            return Ok(Vec::new());
        };
        match reader.headers() {
            Ok(_) => {}
            Err(e) if e.is_io_error() => return Err(self.storage_error(e)),
            Err(e) => {
                tracing::warn!("Unreadable history header in {:?}: {}", self.path, e);
                return Ok(Vec::new());
            }
        }

        let mut points = Vec::new();
        for result in reader.deserialize::<TrendRow>() {
            let row = match result {
                Ok(row) => row,
                Err(e) if e.is_io_error() => return Err(self.storage_error(e)),
                Err(e) => {
                    tracing::warn!("Failed to deserialize history row: {}", e);
                    continue;
                }
            };

            match (parse_timestamp(&row.timestamp), row.bmi.trim().parse::<f64>()) {
                (Ok(timestamp), Ok(bmi)) if bmi.is_finite() => {
                    points.push(TrendPoint { timestamp, bmi })
                }
                _ => {
                    tracing::warn!(
                        "Skipping unplottable row: timestamp={:?} bmi={:?}",
                        row.timestamp,
                        row.bmi
                    );
                }
            }
        }

        Ok(points)
    }
}

/// Lazy iterator over the rows of a history file
pub struct HistoryRecords {
    reader: Option<csv::Reader<File>>,
    headers: StringRecord,
    record: StringRecord,
    // Yielded once before anything else, e.g. a header that failed to parse
    pending: Option<Error>,
}

impl HistoryRecords {
    fn empty() -> Self {
        Self {
            reader: None,
            headers: StringRecord::new(),
            record: StringRecord::new(),
            pending: None,
        }
    }

    fn failed(err: Error) -> Self {
        Self {
            pending: Some(err),
            ..Self::empty()
        }
    }
}

impl Iterator for HistoryRecords {
    type Item = Result<HistoryEntry>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(err) = self.pending.take() {
            return Some(Err(err));
        }
        let reader = self.reader.as_mut()?;

        match reader.read_record(&mut self.record) {
            Ok(false) => {
                self.reader = None;
                None
            }
            Ok(true) => {
                let line = self.record.position().map_or(0, |p| p.line());
                let entry = self
                    .record
                    .deserialize::<CsvRow>(Some(&self.headers))
                    .map_err(|e| malformed(line, e.to_string()))
                    .and_then(|row| row.into_entry(line));
                Some(entry)
            }
            Err(e) if e.is_io_error() => {
                // The file itself is unreadable; stop here
                self.reader = None;
                Some(Err(Error::Csv(e)))
            }
            Err(e) => {
                let line = e.position().map_or(0, |p| p.line());
                Some(Err(malformed(line, e.to_string())))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics;
    use chrono::NaiveDate;

    fn timestamp(minute: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 1)
            .unwrap()
            .and_hms_opt(9, minute, 5)
            .unwrap()
    }

    fn sample_input(weight_kg: f64) -> BiometricInput {
        BiometricInput {
            name: Some("Ada".into()),
            age: 30,
            gender: Gender::Female,
            height_cm: 172.34,
            weight_kg,
            activity: ActivityLevel::Moderate,
        }
    }

    fn sample_entry(minute: u32, weight_kg: f64) -> HistoryEntry {
        let input = sample_input(weight_kg);
        let result = metrics::compute(&input).unwrap();
        HistoryEntry::at(timestamp(minute), &input, &result)
    }

    fn store_in(dir: &tempfile::TempDir) -> HistoryStore {
        HistoryStore::new(dir.path().join("data").join("health_history.csv"))
    }

    #[test]
    fn test_entry_holds_persisted_precision() {
        let input = sample_input(65.47);
        let result = metrics::compute(&input).unwrap();
        let entry = HistoryEntry::at(timestamp(0), &input, &result);

        assert_eq!(entry.height_cm, 172.3);
        assert_eq!(entry.weight_kg, 65.5);
        assert_eq!(entry.bmi, round_to(result.bmi, 2));
        assert_eq!(entry.bmr, result.bmr.round());
        assert_eq!(entry.tdee, result.tdee.round());
        assert_eq!(entry.water_l, 2.29);
        assert_eq!(entry.activity, Some(ActivityLevel::Moderate));
    }

    #[test]
    fn test_ties_persist_as_displayed() {
        let input = BiometricInput {
            name: None,
            age: 31,
            gender: Gender::Male,
            height_cm: 175.25,
            weight_kg: 70.25,
            activity: ActivityLevel::Sedentary,
        };
        let result = metrics::compute(&input).unwrap();
        let entry = HistoryEntry::at(timestamp(0), &input, &result);
        let row = CsvRow::from(&entry);

        assert_eq!(format!("{:.1}", input.height_cm), "175.2");
        assert_eq!(row.height_cm, "175.2");
        assert_eq!(entry.height_cm, 175.2);

        assert_eq!(format!("{:.1}", input.weight_kg), "70.2");
        assert_eq!(row.weight_kg, "70.2");
        assert_eq!(entry.weight_kg, 70.2);

        // 69 kg, 170 cm, 31 years: BMR lands exactly on 1602.5
        let bmr = metrics::bmr(Gender::Male, 69.0, 170.0, 31);
        assert_eq!(bmr, 1602.5);
        let input = BiometricInput {
            height_cm: 170.0,
            weight_kg: 69.0,
            ..input
        };
        let result = metrics::compute(&input).unwrap();
        let entry = HistoryEntry::at(timestamp(1), &input, &result);
        let row = CsvRow::from(&entry);

        assert_eq!(format!("{:.0}", result.bmr), "1602");
        assert_eq!(row.bmr, "1602");
        assert_eq!(entry.bmr, 1602.0);
        assert_eq!(row.tdee, format!("{:.0}", result.tdee));
        assert_eq!(row.bmi, format!("{:.2}", result.bmi));
        assert_eq!(row.water_l, format!("{:.2}", result.water_liters));
    }

    #[test]
    fn test_append_creates_file_with_single_header() {
        let temp_dir = tempfile::tempdir().unwrap();
        let store = store_in(&temp_dir);
        assert!(!store.exists());

        store.append(&sample_entry(0, 70.0)).unwrap();
        store.append(&sample_entry(1, 71.0)).unwrap();

        let contents = std::fs::read_to_string(store.path()).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], HEADER.join(","));
        assert_eq!(
            contents.matches("timestamp,name").count(),
            1,
            "header must not be duplicated"
        );
    }

    #[test]
    fn test_row_formatting() {
        let temp_dir = tempfile::tempdir().unwrap();
        let store = store_in(&temp_dir);

        let input = BiometricInput {
            name: None,
            age: 30,
            gender: Gender::Male,
            height_cm: 175.0,
            weight_kg: 70.0,
            activity: ActivityLevel::Moderate,
        };
        let result = metrics::compute(&input).unwrap();
        store
            .append(&HistoryEntry::at(timestamp(7), &input, &result))
            .unwrap();

        let contents = std::fs::read_to_string(store.path()).unwrap();
        let row = contents.lines().nth(1).unwrap();
        assert_eq!(
            row,
            "2024-03-01 09:07:05,,30,Male,175.0,70.0,22.86,Normal weight,1074,1664,2.45,Moderate (3–5 days/wk)"
        );
    }

    #[test]
    fn test_roundtrip_preserves_order_and_rounded_values() {
        let temp_dir = tempfile::tempdir().unwrap();
        let store = store_in(&temp_dir);

        let written: Vec<HistoryEntry> = (0..5)
            .map(|i| sample_entry(i, 60.04 + f64::from(i) * 3.333))
            .collect();
        for entry in &written {
            store.append(entry).unwrap();
        }

        let read: Vec<HistoryEntry> = store
            .read_all()
            .unwrap()
            .collect::<Result<Vec<_>>>()
            .unwrap();
        assert_eq!(read, written);
    }

    #[test]
    fn test_read_all_is_restartable() {
        let temp_dir = tempfile::tempdir().unwrap();
        let store = store_in(&temp_dir);
        store.append(&sample_entry(0, 70.0)).unwrap();
        store.append(&sample_entry(1, 70.5)).unwrap();

        let mut first = store.read_all().unwrap();
        assert!(first.next().is_some());

        let second: Vec<_> = store.read_all().unwrap().collect();
        assert_eq!(second.len(), 2);
    }

    #[test]
    fn test_read_nonexistent_store_is_empty() {
        let temp_dir = tempfile::tempdir().unwrap();
        let store = store_in(&temp_dir);

        assert_eq!(store.read_all().unwrap().count(), 0);
        assert!(store.entries().unwrap().is_empty());
        assert!(store.bmi_trend().unwrap().is_empty());
        assert!(!store.exists());
    }

    #[test]
    fn test_malformed_row_is_skipped_individually() {
        crate::logging::init_test();
        let temp_dir = tempfile::tempdir().unwrap();
        let store = store_in(&temp_dir);
        store.append(&sample_entry(0, 70.0)).unwrap();

        {
            use std::io::Write;
            let mut file = OpenOptions::new().append(true).open(store.path()).unwrap();
            writeln!(
                file,
                "2024-03-01 09:30:00,Bob,40,Male,180.0,80.0,abc,Normal weight,1800,2475,2.80,"
            )
            .unwrap();
        }
        store.append(&sample_entry(45, 72.0)).unwrap();

        let results: Vec<Result<HistoryEntry>> = store.read_all().unwrap().collect();
        assert_eq!(results.len(), 3);
        assert!(results[0].is_ok());
        assert!(matches!(
            results[1],
            Err(Error::MalformedRecord { line: 3, .. })
        ));
        assert!(results[2].is_ok());

        let entries = store.entries().unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[1].timestamp, timestamp(45));

        let trend = store.bmi_trend().unwrap();
        assert_eq!(trend.len(), 2);
        assert_eq!(trend[0].bmi, entries[0].bmi);
    }

    #[test]
    fn test_trend_keeps_rows_with_other_bad_fields() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("legacy.csv");
        std::fs::write(
            &path,
            "timestamp,name,age,gender,height_cm,weight_kg,bmi,category,bmr,tdee,water_l\n\
             2024-01-01 08:00:00,,30,M,175.0,70.0,22.86,Normal weight,1074.0,1476.0,2.45\n\
             not a date,,30,M,175.0,70.0,22.86,Normal weight,1074.0,1476.0,2.45\n\
             2024-01-02 08:00:00,,??,M,175.0,71.0,23.18,Normal weight,1084.0,1490.0,2.49\n",
        )
        .unwrap();
        let store = HistoryStore::new(&path);

        let trend = store.bmi_trend().unwrap();
        assert_eq!(trend.len(), 2);
        assert_eq!(trend[1].bmi, 23.18);

        // Full entries need every column to parse
        let entries = store.entries().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].gender, Gender::Male);
        assert_eq!(entries[0].activity, None);
        assert_eq!(entries[0].bmr, 1074.0);
    }

    #[test]
    fn test_unreadable_header_degrades_to_empty() {
        crate::logging::init_test();
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("garbled.csv");
        let mut contents = b"timestamp,na\xffme,age\n".to_vec();
        contents.extend_from_slice(
            b"2024-01-01 08:00:00,,30,Male,175.0,70.0,22.86,Normal weight,1074,1289,2.45,\n",
        );
        std::fs::write(&path, contents).unwrap();
        let store = HistoryStore::new(&path);

        let results: Vec<Result<HistoryEntry>> = store.read_all().unwrap().collect();
        assert_eq!(results.len(), 1);
        assert!(matches!(results[0], Err(Error::MalformedRecord { .. })));

        assert!(store.entries().unwrap().is_empty());
        assert!(store.bmi_trend().unwrap().is_empty());
    }

    #[test]
    fn test_append_reports_storage_unavailable() {
        let temp_dir = tempfile::tempdir().unwrap();
        // A regular file where the data directory should be
        let blocker = temp_dir.path().join("data");
        std::fs::write(&blocker, "not a directory").unwrap();

        let store = HistoryStore::new(blocker.join("health_history.csv"));
        let err = store.append(&sample_entry(0, 70.0)).unwrap_err();
        assert!(matches!(err, Error::StorageUnavailable { .. }));
    }

    #[test]
    fn test_store_from_config() {
        let temp_dir = tempfile::tempdir().unwrap();
        let config = Config::default().with_data_dir(temp_dir.path().to_path_buf());
        let store = HistoryStore::from_config(&config);
        assert_eq!(store.path(), temp_dir.path().join("health_history.csv"));
    }
}
