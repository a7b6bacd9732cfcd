//! Export and import of the tracker data.
//!
//! JSON exports carry both collections verbatim and import back unchanged. CSV
//! exports are a flattened, lossy view of the debts meant for spreadsheets and are
//! never imported.

use crate::{
    errors::{Error, Result},
    models::{Debt, Person, TrackerData},
};
use chrono::NaiveDateTime;
use serde_json::Value;

/// Header row of the CSV export.
pub const CSV_HEADER: [&str; 7] = [
    "ID",
    "Person",
    "Amount",
    "Description",
    "Date",
    "ExpectedReturnDate",
    "Status",
];

/// Byte-order mark prepended to CSV exports so spreadsheet apps detect UTF-8.
const BOM: char = '\u{FEFF}';

/// Person column value for debts whose person no longer exists.
const CSV_UNKNOWN_PERSON: &str = "Unknown";

/// Export file format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    /// Full-fidelity structured export
    Json,
    /// Flattened spreadsheet export
    Csv,
}

impl ExportFormat {
    /// File extension without the dot.
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Csv => "csv",
        }
    }
}

/// A rendered export, ready to be handed to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportFile {
    /// Suggested file name
    pub filename: String,
    /// File contents
    pub content: String,
    /// Format the content is in
    pub format: ExportFormat,
}

/// `debt-tracker-data-<YYYY-MM-DD>_<HH-MM-SS>.<ext>`
#[must_use]
pub fn export_filename(format: ExportFormat, now: NaiveDateTime) -> String {
    format!(
        "debt-tracker-data-{}_{}.{}",
        now.format("%Y-%m-%d"),
        now.format("%H-%M-%S"),
        format.extension()
    )
}

/// Pretty-printed JSON document with both collections.
pub fn export_json(data: &TrackerData) -> Result<String> {
    serde_json::to_string_pretty(data).map_err(Into::into)
}

fn quoted(field: &str) -> String {
    format!("\"{}\"", field.replace('"', "\"\""))
}

fn csv_row(debt: &Debt, people: &[Person]) -> String {
    let person = people
        .iter()
        .find(|p| p.id == debt.person_id)
        .map_or(CSV_UNKNOWN_PERSON, |p| p.name.as_str());
    let due = debt
        .expected_return_date
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_default();

    [
        debt.id.clone(),
        quoted(person),
        debt.amount.to_string(),
        quoted(&debt.description),
        debt.date.format("%Y-%m-%d").to_string(),
        due,
        debt.status.as_str().to_string(),
    ]
    .join(",")
}

/// One row per debt under [`CSV_HEADER`], prefixed with a byte-order mark.
#[must_use]
pub fn export_csv(data: &TrackerData) -> String {
    let mut lines = Vec::with_capacity(data.debts.len() + 1);
    lines.push(format!("{BOM}{}", CSV_HEADER.join(",")));
    lines.extend(data.debts.iter().map(|debt| csv_row(debt, &data.people)));
    lines.join("\n")
}

/// Renders `data` in `format` with a timestamped file name.
pub fn export(data: &TrackerData, format: ExportFormat, now: NaiveDateTime) -> Result<ExportFile> {
    let content = match format {
        ExportFormat::Json => export_json(data)?,
        ExportFormat::Csv => export_csv(data),
    };
    tracing::info!(
        "Exported {} people and {} debts as {}",
        data.people.len(),
        data.debts.len(),
        format.extension()
    );
    Ok(ExportFile {
        filename: export_filename(format, now),
        content,
        format,
    })
}

fn invalid(message: impl Into<String>) -> Error {
    Error::InvalidImport {
        message: message.into(),
    }
}

fn sequence_field<'a>(document: &'a Value, field: &str) -> Result<&'a Value> {
    match document.get(field) {
        Some(value) if value.is_array() => Ok(value),
        Some(_) => Err(invalid(format!("`{field}` must be a list"))),
        None => Err(invalid(format!("`{field}` is missing"))),
    }
}

/// Parses a JSON export.
///
/// Succeeds only when both `people` and `debts` are present and are lists whose
/// items match the export schema. Nothing is applied here; the caller replaces
/// both collections with the result, so a rejected file never leaves partial state.
pub fn import_json(text: &str) -> Result<TrackerData> {
    let text = text.strip_prefix(BOM).unwrap_or(text);
    let document: Value =
        serde_json::from_str(text).map_err(|e| invalid(format!("not valid JSON: {e}")))?;

    let people = sequence_field(&document, "people")?;
    let debts = sequence_field(&document, "debts")?;

    let people: Vec<Person> = serde_json::from_value(people.clone())
        .map_err(|e| invalid(format!("malformed person entry: {e}")))?;
    let debts: Vec<Debt> = serde_json::from_value(debts.clone())
        .map_err(|e| invalid(format!("malformed debt entry: {e}")))?;

    Ok(TrackerData { people, debts })
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::models::DebtStatus;
    use crate::test_utils::{date, sample_debt, sample_person};

    fn data() -> TrackerData {
        let mut lunch = sample_debt("d1", "p1", 50.0, DebtStatus::Given);
        lunch.description = "Lunch \"downtown\"".to_string();
        lunch.expected_return_date = Some(date(2024, 2, 1));
        let mut orphan = sample_debt("d2", "gone", 12.5, DebtStatus::PayedBack);
        orphan.description = "Taxi".to_string();

        TrackerData {
            people: vec![sample_person("p1", "Alice")],
            debts: vec![lunch, orphan],
        }
    }

    fn noon() -> NaiveDateTime {
        date(2024, 5, 6).and_hms_opt(13, 4, 5).unwrap()
    }

    #[test]
    fn test_export_filename() {
        assert_eq!(
            export_filename(ExportFormat::Json, noon()),
            "debt-tracker-data-2024-05-06_13-04-05.json"
        );
        assert_eq!(
            export_filename(ExportFormat::Csv, noon()),
            "debt-tracker-data-2024-05-06_13-04-05.csv"
        );
    }

    #[test]
    fn test_json_export_import_roundtrip_is_exact() -> Result<()> {
        let original = data();
        let exported = export_json(&original)?;
        let imported = import_json(&exported)?;

        assert_eq!(imported, original);
        assert_eq!(export_json(&imported)?, exported);
        assert!(exported.contains("\n  \"people\""));
        Ok(())
    }

    #[test]
    fn test_csv_export_layout() {
        let csv = export_csv(&data());
        let lines: Vec<&str> = csv.lines().collect();

        assert_eq!(
            lines[0],
            "\u{FEFF}ID,Person,Amount,Description,Date,ExpectedReturnDate,Status"
        );
        assert_eq!(
            lines[1],
            "d1,\"Alice\",50,\"Lunch \"\"downtown\"\"\",2024-01-15,2024-02-01,given"
        );
        assert_eq!(lines[2], "d2,\"Unknown\",12.5,\"Taxi\",2024-01-15,,payed back");
        assert_eq!(lines.len(), 3);
    }

    #[test]
    fn test_export_picks_format() -> Result<()> {
        let file = export(&data(), ExportFormat::Csv, noon())?;
        assert!(file.filename.ends_with(".csv"));
        assert!(file.content.starts_with('\u{FEFF}'));
        Ok(())
    }

    #[test]
    fn test_import_accepts_original_app_export() -> Result<()> {
        let text = r#"{
            "people": [{"id": "p1", "name": "Alice"}],
            "debts": [{
                "id": "d1",
                "personId": "p1",
                "amount": 50,
                "description": "",
                "date": "2020-01-01",
                "expectedReturnDate": "2020-02-01",
                "status": "payed back"
            }]
        }"#;

        let data = import_json(text)?;
        assert_eq!(data.people.len(), 1);
        assert_eq!(data.debts[0].status, DebtStatus::PayedBack);
        assert_eq!(data.debts[0].expected_return_date, Some(date(2020, 2, 1)));
        Ok(())
    }

    #[test]
    fn test_import_rejects_object_where_list_expected() {
        let result = import_json(r#"{"people": {}, "debts": []}"#);
        assert!(matches!(result, Err(Error::InvalidImport { .. })));
    }

    #[test]
    fn test_import_rejects_missing_field() {
        let result = import_json(r#"{"people": []}"#);
        assert!(matches!(result, Err(Error::InvalidImport { .. })));
    }

    #[test]
    fn test_import_rejects_garbage() {
        assert!(matches!(
            import_json("not json at all"),
            Err(Error::InvalidImport { .. })
        ));
        assert!(matches!(
            import_json(r#"{"people": [{"name": 3}], "debts": []}"#),
            Err(Error::InvalidImport { .. })
        ));
    }
}
