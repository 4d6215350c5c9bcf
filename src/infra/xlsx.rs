use std::fs;
use std::path::Path;

use chrono::{DateTime, Local, TimeZone, Utc};
use rust_xlsxwriter::{ExcelDateTime, Format, Workbook, Worksheet, XlsxError};

use crate::domain::report::{Cell, Report, Table};
use crate::error::{AppError, AppResult};
use crate::services::ReportExporter;

const DATE_FORMAT: &str = "yyyy-mm-dd hh:mm:ss";

/// Writes each report table to its own worksheet.
#[derive(Default)]
pub struct XlsxExporter;

impl XlsxExporter {
    pub fn new() -> Self {
        Self
    }

    fn render(report: &Report) -> Result<Vec<u8>, XlsxError> {
        let header = Format::new().set_bold();
        let date = Format::new().set_num_format(DATE_FORMAT);

        let mut workbook = Workbook::new();
        for table in report.tables() {
            let worksheet = workbook.add_worksheet();
            worksheet.set_name(table.name)?;
            write_table(worksheet, table, &header, &date)?;
            worksheet.autofit();
        }
        workbook.save_to_buffer()
    }
}

impl ReportExporter for XlsxExporter {
    fn export(&self, report: &Report, destination: &Path) -> AppResult<()> {
        let bytes = Self::render(report)
            .map_err(|err| AppError::Export(format!("failed to build workbook: {err}")))?;

        // Write beside the destination first so a failed write never leaves a
        // truncated report behind.
        let staging = destination.with_extension("xlsx.partial");
        fs::write(&staging, bytes)
            .and_then(|_| fs::rename(&staging, destination))
            .map_err(|err| {
                let _ = fs::remove_file(&staging);
                AppError::Export(format!("failed to write {}: {err}", destination.display()))
            })
    }
}

fn write_table(
    worksheet: &mut Worksheet,
    table: &Table,
    header: &Format,
    date: &Format,
) -> Result<(), XlsxError> {
    for (col, name) in (0u16..).zip(table.columns) {
        worksheet.write_string_with_format(0, col, *name, header)?;
    }
    for (row, cells) in (1u32..).zip(&table.rows) {
        for (col, cell) in (0u16..).zip(cells) {
            match cell {
                Cell::Text(text) => {
                    worksheet.write_string(row, col, text)?;
                }
                Cell::Integer(value) => {
                    worksheet.write_number(row, col, *value as f64)?;
                }
                Cell::Date(value) => {
                    let stamp = timestamp_in(value, &Local);
                    let datetime = ExcelDateTime::parse_from_str(&stamp)?;
                    worksheet.write_datetime_with_format(row, col, &datetime, date)?;
                }
                Cell::Empty => {}
            }
        }
    }
    Ok(())
}

/// Spreadsheet dates carry no zone, so they are written as wall-clock time in `zone`.
fn timestamp_in<Tz: TimeZone>(value: &DateTime<Utc>, zone: &Tz) -> String
where
    Tz::Offset: std::fmt::Display,
{
    value
        .with_timezone(zone)
        .format("%Y-%m-%d %H:%M:%S")
        .to_string()
}
