//! Report exports: ledger computation plus pluggable document rendering.

pub mod ledger;
pub mod pdf;
pub mod render;

use chrono::NaiveDate;
use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};
use thiserror::Error;

pub use ledger::{
    build_fleet_report, build_trip_ledger, build_truck_statement, FleetReport, TripLedger,
    TruckStatement,
};
pub use pdf::PdfRenderer;
pub use render::{CsvRenderer, ReportFormat, ReportRenderer};

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("failed to encode report: {0}")]
    Csv(#[from] csv::Error),
    #[error("failed to flush report buffer: {0}")]
    Flush(String),
    #[error("failed to write pdf: {0}")]
    Pdf(String),
}

pub fn trip_file_name(truck_name: &str, customer_name: &str, today: NaiveDate, ext: &str) -> String {
    format!(
        "{}-{}-{}.{ext}",
        truck_name.trim(),
        customer_name.trim(),
        today.format("%Y-%m-%d")
    )
}

pub fn truck_file_name(truck_name: &str, today: NaiveDate, ext: &str) -> String {
    format!("{}-report-{}.{ext}", truck_name.trim(), today.format("%Y-%m-%d"))
}

pub fn fleet_file_name(today: NaiveDate, ext: &str) -> String {
    format!("fleet-report-{}.{ext}", today.format("%Y-%m-%d"))
}

/// `attachment` disposition with an ASCII fallback name and the exact UTF-8 name.
pub fn content_disposition(file_name: &str) -> String {
    let fallback: String = file_name
        .chars()
        .map(|c| {
            if (c.is_ascii_graphic() && c != '"' && c != '\\') || c == ' ' {
                c
            } else {
                '_'
            }
        })
        .collect();
    let encoded = utf8_percent_encode(file_name, NON_ALPHANUMERIC);
    format!("attachment; filename=\"{fallback}\"; filename*=UTF-8''{encoded}")
}
