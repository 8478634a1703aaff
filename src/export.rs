//! CSV and PDF rendering of the attendance record set.
//!
//! Both renderers are pure over the slice they are given: the same
//! records in the same order produce identical bytes. The embedded
//! generation time is passed in by the caller for the same reason.

use chrono::{DateTime, Utc};
use model::entities::attendance_record;
use printpdf::{BuiltinFont, IndirectFontRef, Mm, PdfDocument, PdfLayerReference};
use thiserror::Error;

/// Column titles shared by both export formats.
pub const COLUMNS: [&str; 12] = [
    "#",
    "Name",
    "Matric Number",
    "Course",
    "Date",
    "Time",
    "Status",
    "Latitude",
    "Longitude",
    "Accuracy",
    "Location",
    "Record ID",
];

/// Rendered in place of absent optional fields.
const PLACEHOLDER: &str = "N/A";

// A4 landscape, all in millimetres.
const PAGE_WIDTH: f64 = 297.0;
const PAGE_HEIGHT: f64 = 210.0;
const MARGIN: f64 = 12.0;
const ROW_STEP: f64 = 7.0;

/// Left edge of each column on the PDF page, one entry per COLUMNS.
const COLUMN_X: [f64; 12] = [
    12.0, 22.0, 64.0, 100.0, 130.0, 152.0, 172.0, 190.0, 210.0, 230.0, 246.0, 280.0,
];

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("csv serialization failed: {0}")]
    Csv(#[from] csv::Error),
    #[error("csv buffer could not be finalized: {0}")]
    CsvFinish(String),
    #[error("pdf rendering failed: {0}")]
    Pdf(String),
}

fn status_label(active: bool) -> &'static str {
    if active { "Active" } else { "Inactive" }
}

fn optional_number(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_else(|| PLACEHOLDER.to_string())
}

/// One export row, in COLUMNS order.
fn row_cells(ordinal: usize, record: &attendance_record::Model) -> Vec<String> {
    vec![
        (ordinal + 1).to_string(),
        record.name.clone(),
        record.matric_no.clone(),
        record.course.clone(),
        record.timestamp.format("%Y-%m-%d").to_string(),
        record.timestamp.format("%H:%M:%S").to_string(),
        status_label(record.active).to_string(),
        optional_number(record.latitude),
        optional_number(record.longitude),
        optional_number(record.accuracy),
        record
            .location_name
            .clone()
            .unwrap_or_else(|| PLACEHOLDER.to_string()),
        record.id.to_string(),
    ]
}

/// Render the records as CSV: one header row plus one row per record,
/// in the order supplied.
pub fn records_to_csv(records: &[attendance_record::Model]) -> Result<Vec<u8>, ExportError> {
    let mut writer = csv::Writer::from_writer(Vec::new());

    writer.write_record(COLUMNS)?;
    for (ordinal, record) in records.iter().enumerate() {
        writer.write_record(row_cells(ordinal, record))?;
    }

    writer
        .into_inner()
        .map_err(|e| ExportError::CsvFinish(e.to_string()))
}

fn write_header_row(layer: &PdfLayerReference, font: &IndirectFontRef, y: f64) {
    for (title, x) in COLUMNS.iter().zip(COLUMN_X) {
        layer.use_text(*title, 9.0, Mm(x as f32), Mm(y as f32), font);
    }
}

/// Render the records as a paginated PDF table with a title and a
/// generation banner. An empty record set produces a single
/// explanatory placeholder row.
pub fn records_to_pdf(
    records: &[attendance_record::Model],
    generated_at: DateTime<Utc>,
) -> Result<Vec<u8>, ExportError> {
    let (doc, first_page, first_layer) =
        PdfDocument::new("Attendance Records", Mm(PAGE_WIDTH as f32), Mm(PAGE_HEIGHT as f32), "records");
    let font = doc
        .add_builtin_font(BuiltinFont::Helvetica)
        .map_err(|e| ExportError::Pdf(e.to_string()))?;
    let bold = doc
        .add_builtin_font(BuiltinFont::HelveticaBold)
        .map_err(|e| ExportError::Pdf(e.to_string()))?;

    let mut layer = doc.get_page(first_page).get_layer(first_layer);
    let mut cursor = PAGE_HEIGHT - MARGIN;

    layer.use_text("Attendance Records", 16.0, Mm(MARGIN as f32), Mm(cursor as f32), &bold);
    cursor -= 8.0;

    let banner = format!(
        "Generated {} UTC ({} records)",
        generated_at.format("%Y-%m-%d %H:%M:%S"),
        records.len()
    );
    layer.use_text(&banner, 10.0, Mm(MARGIN as f32), Mm(cursor as f32), &font);
    cursor -= 10.0;

    write_header_row(&layer, &bold, cursor);
    cursor -= ROW_STEP;

    if records.is_empty() {
        layer.use_text(
            "No attendance records have been submitted yet.",
            10.0,
            Mm(COLUMN_X[1] as f32),
            Mm(cursor as f32),
            &font,
        );
    }

    for (ordinal, record) in records.iter().enumerate() {
        if cursor < MARGIN + ROW_STEP {
            let (page, page_layer) = doc.add_page(Mm(PAGE_WIDTH as f32), Mm(PAGE_HEIGHT as f32), "records");
            layer = doc.get_page(page).get_layer(page_layer);
            cursor = PAGE_HEIGHT - MARGIN;
            write_header_row(&layer, &bold, cursor);
            cursor -= ROW_STEP;
        }

        for (cell, x) in row_cells(ordinal, record).iter().zip(COLUMN_X) {
            layer.use_text(cell, 8.0, Mm(x as f32), Mm(cursor as f32), &font);
        }
        cursor -= ROW_STEP;
    }

    doc.save_to_bytes().map_err(|e| ExportError::Pdf(e.to_string()))
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn sample_record(id: i32, matric_no: &str, with_location: bool) -> attendance_record::Model {
        attendance_record::Model {
            id,
            name: "Jane Doe".to_string(),
            matric_no: matric_no.to_string(),
            course: "CS101".to_string(),
            timestamp: Utc.with_ymd_and_hms(2024, 5, 14, 9, 30, 5).unwrap(),
            active: true,
            latitude: with_location.then_some(6.5244),
            longitude: with_location.then_some(3.3792),
            accuracy: with_location.then_some(15.0),
            location_name: with_location.then(|| "Lecture Hall B".to_string()),
        }
    }

    #[test]
    fn csv_has_header_plus_one_row_per_record() {
        let records = vec![
            sample_record(1, "U001", true),
            sample_record(2, "U002", false),
            sample_record(3, "U003", false),
        ];

        let bytes = records_to_csv(&records).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.len(), records.len() + 1);
        assert!(lines[0].starts_with("#,Name,Matric Number,Course,Date,Time,Status"));
        // Supplied order is preserved
        assert!(lines[1].contains("U001"));
        assert!(lines[3].contains("U003"));
    }

    #[test]
    fn csv_formats_dates_and_placeholders() {
        let records = vec![sample_record(7, "U007", false)];

        let text = String::from_utf8(records_to_csv(&records).unwrap()).unwrap();
        let data_line = text.lines().nth(1).unwrap();

        assert!(data_line.contains("2024-05-14"));
        assert!(data_line.contains("09:30:05"));
        assert!(data_line.contains("Active"));
        // All four optional fields absent
        assert_eq!(data_line.matches("N/A").count(), 4);
        assert!(data_line.ends_with(",7"));
    }

    #[test]
    fn csv_of_empty_set_is_header_only() {
        let text = String::from_utf8(records_to_csv(&[]).unwrap()).unwrap();
        assert_eq!(text.lines().count(), 1);
    }

    #[test]
    fn csv_is_pure_over_its_input() {
        let records = vec![sample_record(1, "U001", true), sample_record(2, "U002", false)];
        assert_eq!(
            records_to_csv(&records).unwrap(),
            records_to_csv(&records).unwrap()
        );
    }

    #[test]
    fn pdf_renders_for_records_and_for_empty_set() {
        let generated_at = Utc.with_ymd_and_hms(2024, 5, 14, 10, 0, 0).unwrap();

        let populated = records_to_pdf(&[sample_record(1, "U001", true)], generated_at).unwrap();
        assert!(populated.starts_with(b"%PDF"));

        let empty = records_to_pdf(&[], generated_at).unwrap();
        assert!(empty.starts_with(b"%PDF"));
        assert!(!empty.is_empty());
    }

    #[test]
    fn pdf_paginates_large_record_sets() {
        let generated_at = Utc.with_ymd_and_hms(2024, 5, 14, 10, 0, 0).unwrap();
        let records: Vec<_> = (0..120)
            .map(|i| sample_record(i, &format!("U{i:03}"), false))
            .collect();

        let bytes = records_to_pdf(&records, generated_at).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
        // 120 rows cannot fit one A4 landscape page at 7mm per row
        let text = String::from_utf8_lossy(&bytes);
        assert!(text.matches("/Type /Page").count() > 1);
    }
}
