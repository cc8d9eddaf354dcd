//! Grade report spreadsheets.
//!
//! Layout:
//!
//! - Row 1: the title, and the export time in the last column
//! - Row 2: empty
//! - Row 3: the column headers
//! - Row 4 onwards: one row per student

use std::fs::File;
use std::io::Write;
use std::path::Path;

use anyhow::Result;
use chrono::{DateTime, Utc};
use rust_xlsxwriter::{Format, Workbook, Worksheet, XlsxError};

use crate::database::entity::coursework::CourseworkModel;
use crate::database::entity::profile::ProfileModel;
use satchel::class::ClassId;
use satchel::rating::Rating;

pub(super) const HEADERS: [&str; 11] = [
    "No.",
    "Student ID",
    "Name",
    "Academy",
    "Class No.",
    "Grade",
    "Course Selection ID",
    "Supervisor",
    "Coursework",
    "Rating",
    "Remark",
];

const TITLE_ROW: u32 = 0;
const HEADER_ROW: u32 = 2;
const FIRST_DATA_ROW: u32 = 3;

/// Status shown for students with a submitted artifact.
pub(super) const SUBMITTED: &str = "submitted";

/// Maximum length of a worksheet name.
const MAX_SHEET_NAME_LENGTH: usize = 31;

pub(super) struct Report {
    pub title: String,
    pub sheet_name: String,
    pub exported_at: DateTime<Utc>,
    pub rows: Vec<(CourseworkModel, ProfileModel)>,
}

impl Report {
    /// Renders the spreadsheet.
    pub fn render(&self) -> Result<Vec<u8>, XlsxError> {
        let mut workbook = Workbook::new();
        let bold = Format::new().set_bold();

        let worksheet = workbook.add_worksheet();
        worksheet.set_name(&self.sheet_name)?;

        worksheet.write_string_with_format(TITLE_ROW, 0, &self.title, &bold)?;
        worksheet.write_string(
            TITLE_ROW,
            HEADERS.len() as u16 - 1,
            format!(
                "Exported at: {}",
                self.exported_at.format("%Y-%m-%d %H:%M:%S UTC")
            ),
        )?;

        for (col, header) in HEADERS.iter().enumerate() {
            worksheet.write_string_with_format(HEADER_ROW, col as u16, *header, &bold)?;
        }

        for (i, (record, profile)) in self.rows.iter().enumerate() {
            let row = FIRST_DATA_ROW + i as u32;
            let status = if record.artifact_ref.is_some() {
                SUBMITTED
            } else {
                ""
            };

            worksheet.write_number(row, 0, (i + 1) as f64)?;
            worksheet.write_number(row, 1, record.student_id as f64)?;
            write_text(worksheet, row, 2, &profile.name)?;
            write_text(worksheet, row, 3, profile.academy.as_deref().unwrap_or(""))?;
            write_text(worksheet, row, 4, profile.class_number.as_deref().unwrap_or(""))?;
            write_text(worksheet, row, 5, profile.grade.as_deref().unwrap_or(""))?;
            write_text(worksheet, row, 6, &record.class_id)?;
            write_text(worksheet, row, 7, profile.supervisor.as_deref().unwrap_or(""))?;
            write_text(worksheet, row, 8, status)?;
            write_text(worksheet, row, 9, Rating::label_of(record.rating.as_deref()))?;
            write_text(worksheet, row, 10, record.remark.as_deref().unwrap_or(""))?;
        }

        worksheet.set_column_width(2, 16)?;
        worksheet.set_column_width(6, 20)?;
        worksheet.set_column_width(10, 40)?;

        workbook.save_to_buffer()
    }

    /// Renders the spreadsheet and writes it to `path`.
    ///
    /// The file is synced before returning. This blocks and must be run
    /// with `spawn_blocking`.
    pub fn write_to(&self, path: &Path) -> Result<()> {
        let buffer = self.render()?;

        let mut file = File::create(path)?;
        file.write_all(&buffer)?;
        file.sync_all()?;

        Ok(())
    }
}

/// Writes a string cell, leaving the cell blank for empty strings.
fn write_text(worksheet: &mut Worksheet, row: u32, col: u16, text: &str) -> Result<(), XlsxError> {
    if !text.is_empty() {
        worksheet.write_string(row, col, text)?;
    }
    Ok(())
}

/// Returns a valid worksheet name for a class.
pub(super) fn sheet_name(class: &ClassId) -> String {
    let mut name: String = class
        .as_str()
        .chars()
        .map(|c| match c {
            '[' | ']' | ':' | '*' | '?' | '/' | '\\' => '_',
            c => c,
        })
        .take(MAX_SHEET_NAME_LENGTH)
        .collect();

    // Reserved by Excel
    if name.eq_ignore_ascii_case("history") {
        name.push('_');
    }

    name
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sheet_name() {
        let class = |s: &str| ClassId::new(s.to_string()).unwrap();

        assert_eq!("CS101", sheet_name(&class("CS101")));
        assert_eq!("History_", sheet_name(&class("History")));
        assert_eq!(
            MAX_SHEET_NAME_LENGTH,
            sheet_name(&class(&"A".repeat(50))).len()
        );
    }
}
