use std::io::Write;

use chrono::NaiveDate;
use pretty_assertions::assert_eq;
use tempfile::NamedTempFile;

use delay_forecast::data::Dataset;
use delay_forecast::error::ForecastError;

fn month(y: i32, m: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, 1).unwrap()
}

fn write_csv(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

#[test]
fn loads_cleaned_monthly_csv() {
    let file = write_csv(
        "airport,date,avg_delay,total_flights\n\
         ABERDEEN,2024-01-01,10.5,1200\n\
         ABERDEEN,2024-02-01,12.25,1100\n\
         BELFAST,2024-01-01,8.0,900\n",
    );

    let ds = Dataset::from_csv_path(file.path(), "avg_delay").unwrap();
    assert_eq!(ds.len(), 3);
    assert_eq!(ds.airports(), vec!["ABERDEEN", "BELFAST"]);

    let s = ds.series("ABERDEEN").unwrap();
    assert_eq!(s.values(), &[10.5, 12.25]);
    assert_eq!(s.last_observed(), month(2024, 2));
}

#[test]
fn empty_target_cells_become_missing_observations() {
    let file = write_csv(
        "airport,date,avg_delay\n\
         ABERDEEN,2024-01-01,10.5\n\
         ABERDEEN,2024-02-01,\n\
         ABERDEEN,2024-03-01,11.0\n",
    );

    let ds = Dataset::from_csv_path(file.path(), "avg_delay").unwrap();
    let s = ds.series("ABERDEEN").unwrap();

    // Missing value dropped, never interpolated; last observed month still
    // counts the row
    assert_eq!(s.values(), &[10.5, 11.0]);
    assert_eq!(s.dates(), &[month(2024, 1), month(2024, 3)]);
    assert_eq!(s.last_observed(), month(2024, 3));
}

#[test]
fn alternate_target_column_is_honored() {
    let file = write_csv(
        "airport,date,avg_delay,ontime_pct\n\
         ABERDEEN,2024-01-01,10.5,91.0\n\
         ABERDEEN,2024-02-01,12.0,88.5\n",
    );

    let ds = Dataset::from_csv_path(file.path(), "ontime_pct").unwrap();
    let s = ds.series("ABERDEEN").unwrap();
    assert_eq!(s.values(), &[91.0, 88.5]);
}

#[test]
fn missing_target_column_is_a_data_error() {
    let file = write_csv("airport,date\nABERDEEN,2024-01-01\n");
    let err = Dataset::from_csv_path(file.path(), "avg_delay").unwrap_err();
    assert!(matches!(err, ForecastError::Data(_)));
}

#[test]
fn rows_are_sorted_regardless_of_input_order() {
    let file = write_csv(
        "airport,date,avg_delay\n\
         ABERDEEN,2024-03-01,11.0\n\
         ABERDEEN,2024-01-01,10.0\n\
         ABERDEEN,2024-02-01,12.0\n",
    );

    let ds = Dataset::from_csv_path(file.path(), "avg_delay").unwrap();
    let s = ds.series("ABERDEEN").unwrap();
    assert_eq!(s.values(), &[10.0, 12.0, 11.0]);
}
