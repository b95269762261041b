use chrono::NaiveDate;
use serde::Serialize;

use super::TransferService;
use crate::accounts::AccountId;
use crate::error::ServiceError;
use crate::evaluation::{ImportedFicha, Purpose};
use crate::policy::{authorize, Actor, Operation};
use crate::store::RecordStore;

const MIN_FIELDS: usize = 7;
const MAX_REPORTED_ERRORS: usize = 10;

/// Aggregate result of one import run. Counts cover every row; the
/// error list is capped at the first ten.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportOutcome {
    pub success: bool,
    pub message: String,
    pub success_count: usize,
    pub error_count: usize,
    pub errors: Vec<String>,
}

impl<S: RecordStore> TransferService<S> {
    /// Import forms from tabular text, one per data row.
    ///
    /// The parser deliberately mirrors the export's naive inverse: rows
    /// split on bare commas (embedded commas inside quoted fields are a
    /// known limitation) and each field loses at most one leading and
    /// one trailing quote. Rows fail individually; earlier successes
    /// stay committed when later rows are rejected.
    pub fn import_csv(&self, actor: &Actor, text: &str) -> Result<ImportOutcome, ServiceError> {
        authorize(actor, Operation::ImportRecords, None)?;

        let lines: Vec<&str> = text.trim().lines().collect();
        if lines.len() < 2 {
            return Err(ServiceError::Validation(
                "file is empty or has no data rows".to_string(),
            ));
        }

        let mut success_count = 0;
        let mut error_count = 0;
        let mut errors = Vec::new();

        for (index, line) in lines.iter().skip(1).enumerate() {
            // Header and zero-based offset: data row 0 is file row 2.
            let row_number = index + 2;
            match parse_row(line) {
                Ok(row) => {
                    self.fichas().create_imported(actor, row)?;
                    success_count += 1;
                }
                Err(reason) => {
                    error_count += 1;
                    if errors.len() < MAX_REPORTED_ERRORS {
                        errors.push(format!("Row {row_number}: {reason}"));
                    }
                }
            }
        }

        Ok(ImportOutcome {
            success: true,
            message: format!("{success_count} record(s) imported, {error_count} error(s)"),
            success_count,
            error_count,
            errors,
        })
    }
}

fn parse_row(line: &str) -> Result<ImportedFicha, String> {
    let fields: Vec<&str> = line.split(',').map(strip_outer_quotes).collect();
    if fields.len() < MIN_FIELDS {
        return Err("insufficient data".to_string());
    }

    let evaluatee_id: i64 = fields[0]
        .parse()
        .map_err(|_| "required fields missing".to_string())?;
    let evaluatee_name = fields[1].trim();
    let atc_unit = fields[3].trim();
    if evaluatee_name.is_empty() || atc_unit.is_empty() {
        return Err("required fields missing".to_string());
    }

    let evaluated_on = parse_date(fields[4]).ok_or_else(|| "invalid date".to_string())?;
    let purpose = Purpose::parse(fields[5]).ok_or_else(|| "invalid purpose".to_string())?;

    Ok(ImportedFicha {
        evaluatee_id: AccountId(evaluatee_id),
        evaluatee_name: evaluatee_name.to_string(),
        atc_unit: atc_unit.to_string(),
        evaluated_on,
        purpose,
    })
}

/// Strip at most one quote from each end; not full CSV unquoting.
fn strip_outer_quotes(field: &str) -> &str {
    let field = field.strip_prefix('"').unwrap_or(field);
    field.strip_suffix('"').unwrap_or(field)
}

fn parse_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    NaiveDate::parse_from_str(value, "%d/%m/%Y")
        .or_else(|_| NaiveDate::parse_from_str(value, "%Y-%m-%d"))
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_at_most_one_quote_per_side() {
        assert_eq!(strip_outer_quotes("\"ACC-BS\""), "ACC-BS");
        assert_eq!(strip_outer_quotes("\"\"dupla\"\""), "\"dupla\"");
        assert_eq!(strip_outer_quotes("plain"), "plain");
        assert_eq!(strip_outer_quotes("\""), "");
    }

    #[test]
    fn both_date_formats_are_accepted() {
        let expected = NaiveDate::from_ymd_opt(2024, 3, 5).unwrap();
        assert_eq!(parse_date("05/03/2024"), Some(expected));
        assert_eq!(parse_date("2024-03-05"), Some(expected));
        assert_eq!(parse_date("03-05-2024"), None);
    }

    #[test]
    fn rows_need_seven_fields_and_a_numeric_identifier() {
        assert_eq!(
            parse_row("\"1\",\"Ana\",\"x\"").unwrap_err(),
            "insufficient data"
        );
        assert_eq!(
            parse_row("\"abc\",\"Ana\",\"B\",\"ACC-BS\",\"05/03/2024\",\"Final\",\"rascunho\"")
                .unwrap_err(),
            "required fields missing"
        );

        let row =
            parse_row("\"7\",\"Ana Silva\",\"Bruno\",\"ACC-BS\",\"05/03/2024\",\"Estágio\",\"rascunho\"")
                .unwrap();
        assert_eq!(row.evaluatee_id, AccountId(7));
        assert_eq!(row.evaluatee_name, "Ana Silva");
        assert_eq!(row.atc_unit, "ACC-BS");
        assert_eq!(row.purpose, Purpose::Internship);
    }

    #[test]
    fn unknown_purpose_is_rejected() {
        assert_eq!(
            parse_row("\"7\",\"Ana\",\"B\",\"ACC-BS\",\"05/03/2024\",\"Inicial\",\"rascunho\"")
                .unwrap_err(),
            "invalid purpose"
        );
    }
}
