//! CSV export of transaction records

use chrono::NaiveDate;

use libris_core::Transaction;

const HEADERS: [&str; 8] = [
    "Transaction ID",
    "Book Title",
    "Student Name",
    "Student ID",
    "Course",
    "Check Out Date",
    "Check In Date",
    "Status",
];

/// Default file name for an export made on `date`
pub fn default_file_name(date: NaiveDate) -> String {
    format!("library_records_{}.csv", date.format("%Y-%m-%d"))
}

/// Render transactions as CSV, one row per record, with a header row
pub fn records_csv(transactions: &[Transaction]) -> String {
    let mut csv = HEADERS.join(",");
    csv.push('\n');

    for t in transactions {
        let checkin = t
            .checkin_date
            .map(|d| d.to_string())
            .unwrap_or_else(|| "N/A".to_string());
        let row = [
            t.id.to_string(),
            t.book_title.clone(),
            t.student_name.clone(),
            t.student_id.clone(),
            t.student_course.clone(),
            t.checkout_date.to_string(),
            checkin,
            t.status.label().to_string(),
        ];

        let fields: Vec<String> = row.iter().map(|field| escape(field)).collect();
        csv.push_str(&fields.join(","));
        csv.push('\n');
    }

    csv
}

/// Quote a field containing a comma, quote or line break
fn escape(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}
