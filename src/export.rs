use std::path::{Path, PathBuf};

use rust_xlsxwriter::{Format, Workbook, Worksheet};

use crate::aggregate::{AuthorCommitRow, ContributionPivot, NameReconciliation};
use crate::error::Result;

pub const CONTRIBUTIONS_SHEET: &str = "Commits by Author";
pub const NAMES_SHEET: &str = "Author Names";
pub const HISTORY_SHEET: &str = "Commit History";

const XLSX: &str = "xlsx";

/// Returns a path in `folder` that does not exist yet: `stem.ext`, then
/// `stem_1.ext`, `stem_2.ext`, and so on. Creates `folder` if needed.
pub fn unique_report_path(folder: &Path, stem: &str, extension: &str) -> Result<PathBuf> {
    std::fs::create_dir_all(folder)?;

    let stem = sanitize_file_stem(stem);
    let mut path = folder.join(format!("{stem}.{extension}"));
    let mut counter = 1;

    while path.exists() {
        path = folder.join(format!("{stem}_{counter}.{extension}"));
        counter += 1;
    }

    Ok(path)
}

fn sanitize_file_stem(stem: &str) -> String {
    let cleaned: String = stem
        .trim()
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();

    if cleaned.is_empty() {
        "report".to_string()
    } else {
        cleaned
    }
}

/// Writes the monthly pivot and the name reconciliation to a new workbook in
/// `folder`, returning the file it created.
pub fn write_contribution_report(
    folder: &Path,
    stem: &str,
    pivot: &ContributionPivot,
    names: &[NameReconciliation],
) -> Result<PathBuf> {
    let path = unique_report_path(folder, stem, XLSX)?;
    let header = Format::new().set_bold();
    let mut workbook = Workbook::new();

    {
        let sheet = workbook.add_worksheet();
        sheet.set_name(CONTRIBUTIONS_SHEET)?;

        sheet.write_string_with_format(0, 0, "Username", &header)?;
        for (col, label) in pivot.columns.iter().enumerate() {
            sheet.write_string_with_format(0, column(col + 1), label.as_str(), &header)?;
        }

        for (index, row) in pivot.rows.iter().enumerate() {
            let line = row_number(index + 1);
            sheet.write_string(line, 0, row.username.as_str())?;
            for (col, count) in row.counts.values().enumerate() {
                sheet.write_number(line, column(col + 1), *count as f64)?;
            }
        }

        sheet.set_freeze_panes(1, 1)?;
        sheet.autofit();
    }

    {
        let sheet = workbook.add_worksheet();
        sheet.set_name(NAMES_SHEET)?;

        write_header(
            sheet,
            &["Username", "Author Names", "Name Count", "Multiple Names"],
            &header,
        )?;

        for (index, entry) in names.iter().enumerate() {
            let line = row_number(index + 1);
            sheet.write_string(line, 0, entry.username.as_str())?;
            sheet.write_string(line, 1, entry.author_names.join("; "))?;
            sheet.write_number(line, 2, entry.author_names.len() as f64)?;
            sheet.write_string(line, 3, if entry.multiple_names { "Yes" } else { "No" })?;
        }

        sheet.autofit();
    }

    workbook.save(&path)?;
    Ok(path)
}

/// Writes one author's commits to a new workbook in `folder`.
pub fn write_author_history(folder: &Path, stem: &str, rows: &[AuthorCommitRow]) -> Result<PathBuf> {
    let path = unique_report_path(folder, stem, XLSX)?;
    let header = Format::new().set_bold();
    let mut workbook = Workbook::new();

    let sheet = workbook.add_worksheet();
    sheet.set_name(HISTORY_SHEET)?;
    write_header(sheet, &["Repository", "Date", "Message", "URL", "SHA"], &header)?;

    for (index, row) in rows.iter().enumerate() {
        let line = row_number(index + 1);
        sheet.write_string(line, 0, row.repo.as_str())?;
        sheet.write_string(line, 1, row.date.format("%Y-%m-%d %H:%M:%S").to_string())?;
        sheet.write_string(line, 2, row.message.as_str())?;
        sheet.write_string(line, 3, row.url.as_str())?;
        sheet.write_string(line, 4, row.sha.as_str())?;
    }
    sheet.autofit();

    workbook.save(&path)?;
    Ok(path)
}

fn write_header(sheet: &mut Worksheet, titles: &[&str], format: &Format) -> Result<()> {
    for (col, title) in titles.iter().enumerate() {
        sheet.write_string_with_format(0, column(col), *title, format)?;
    }
    Ok(())
}

#[allow(clippy::cast_possible_truncation)]
fn row_number(index: usize) -> u32 {
    index as u32
}

#[allow(clippy::cast_possible_truncation)]
fn column(index: usize) -> u16 {
    index as u16
}
