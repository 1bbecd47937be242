//! Historical daily measurements, loaded once and shared read-only.

use std::{fs::File, io::Read, path::Path};

use chrono::NaiveDate;
use serde::Deserialize;
use tracing::info;

use crate::{error::DatasetError, model::Record};

/// Date-sorted, duplicate-free, non-empty series of daily records.
#[derive(Debug, Clone)]
pub struct TimeSeries {
    records: Vec<Record>,
}

/// CSV row as it appears on disk. Blank cells become `None`.
#[derive(Debug, Deserialize)]
struct CsvRow {
    date: NaiveDate,
    pollution_today: Option<f64>,
    dew: Option<f64>,
    temp: Option<f64>,
    press: Option<f64>,
    wnd_spd: Option<f64>,
    snow: Option<f64>,
    rain: Option<f64>,
    pollution_yesterday: Option<f64>,
}

impl From<CsvRow> for Record {
    fn from(row: CsvRow) -> Self {
        let v = |x: Option<f64>| x.unwrap_or(f64::NAN);

        Record {
            date: row.date,
            pollution_today: v(row.pollution_today),
            pollution_yesterday: v(row.pollution_yesterday),
            dew: v(row.dew),
            temp: v(row.temp),
            press: v(row.press),
            wnd_spd: v(row.wnd_spd),
            rain: v(row.rain),
            snow: v(row.snow),
        }
    }
}

impl TimeSeries {
    pub fn new(records: Vec<Record>) -> Result<Self, DatasetError> {
        if records.is_empty() {
            return Err(DatasetError::Empty);
        }

        for pair in records.windows(2) {
            let (previous, next) = (pair[0].date, pair[1].date);
            if previous == next {
                return Err(DatasetError::DuplicateDate(next));
            }
            if previous > next {
                return Err(DatasetError::Unsorted { previous, next });
            }
        }

        Ok(Self { records })
    }

    /// Load a series from a CSV file with a header row.
    pub fn from_csv_path(path: impl AsRef<Path>) -> Result<Self, DatasetError> {
        let path = path.as_ref();
        let file = File::open(path)
            .map_err(|source| DatasetError::Open { path: path.to_path_buf(), source })?;

        let series = Self::from_csv_reader(file)?;
        info!(
            path = %path.display(),
            records = series.len(),
            first = %series.first().date,
            last = %series.last().date,
            "loaded pollution dataset"
        );

        Ok(series)
    }

    pub fn from_csv_reader(reader: impl Read) -> Result<Self, DatasetError> {
        let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);

        let records = rdr
            .deserialize::<CsvRow>()
            .enumerate()
            .map(|(i, row)| {
                row.map(Record::from).map_err(|source| DatasetError::Parse { row: i + 1, source })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Self::new(records)
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Always `false`; kept for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn first(&self) -> &Record {
        &self.records[0]
    }

    pub fn last(&self) -> &Record {
        &self.records[self.records.len() - 1]
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::io::Write;

    /// Consecutive daily records starting at 2024-01-01, dry and calm.
    pub(crate) fn daily_records(n: usize) -> Vec<Record> {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        (0..n)
            .map(|i| Record {
                date: start + chrono::Duration::days(i as i64),
                pollution_today: 40.0 + i as f64,
                pollution_yesterday: 39.0 + i as f64,
                dew: -5.0,
                temp: 2.0,
                press: 1015.0,
                wnd_spd: 10.0,
                rain: 0.0,
                snow: 0.0,
            })
            .collect()
    }

    const CSV: &str = "\
date,pollution_today,dew,temp,press,wnd_dir,wnd_spd,snow,rain,pollution_yesterday
2010-01-02,145.9,-8.5,-5.1,1024.75,SE,24.86,0.7,0,10.04
2010-01-03,78.8,-10.1,-8.5,1022.79,SE,70.94,14.2,0,145.96
2010-01-04,31.3,-20.9,-11.5,1029.29,NW,111.16,0,,78.83
";

    #[test]
    fn parses_csv_and_ignores_extra_columns() {
        let series = TimeSeries::from_csv_reader(CSV.as_bytes()).unwrap();

        assert_eq!(series.len(), 3);
        assert_eq!(series.first().date, NaiveDate::from_ymd_opt(2010, 1, 2).unwrap());
        assert_eq!(series.last().pollution_yesterday, 78.83);
        assert_eq!(series.records()[1].snow, 14.2);
    }

    #[test]
    fn blank_cells_become_nan() {
        let series = TimeSeries::from_csv_reader(CSV.as_bytes()).unwrap();
        assert!(series.last().rain.is_nan());
    }

    #[test]
    fn loads_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(CSV.as_bytes()).unwrap();

        let series = TimeSeries::from_csv_path(file.path()).unwrap();
        assert_eq!(series.len(), 3);
    }

    #[test]
    fn missing_file_reports_path() {
        let err = TimeSeries::from_csv_path("/definitely/not/here.csv").unwrap_err();
        assert!(err.to_string().contains("/definitely/not/here.csv"));
    }

    #[test]
    fn rejects_empty_series() {
        assert!(matches!(TimeSeries::new(Vec::new()), Err(DatasetError::Empty)));
    }

    #[test]
    fn rejects_unsorted_and_duplicate_dates() {
        let mut records = daily_records(3);
        records.swap(0, 2);
        assert!(matches!(TimeSeries::new(records), Err(DatasetError::Unsorted { .. })));

        let mut records = daily_records(3);
        records[2].date = records[1].date;
        assert!(matches!(TimeSeries::new(records), Err(DatasetError::DuplicateDate(_))));
    }

    #[test]
    fn reports_row_of_bad_date() {
        let bad = "date,pollution_today,dew,temp,press,wnd_spd,snow,rain,pollution_yesterday\n\
                   2010-01-02,1,1,1,1,1,0,0,1\n\
                   yesterday,1,1,1,1,1,0,0,1\n";

        let err = TimeSeries::from_csv_reader(bad.as_bytes()).unwrap_err();
        assert!(matches!(err, DatasetError::Parse { row: 2, .. }));
    }
}
