//! Localised text tables
//!
//! Row 0 is a header: `id`, then one locale code per column. Every other row
//! is `card_id, text_locale_1, text_locale_2, ...`.

use crate::types::{CarderError, Result};
use std::path::Path;

/// Text of one card in the selected locale
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextRow {
    pub card_id: String,
    pub text: String,
}

/// Column holding `locale`, or column 1 when no locale is requested
pub fn locale_column(headers: &csv::StringRecord, locale: &str, path: &Path) -> Result<usize> {
    if locale.is_empty() {
        return Ok(1);
    }

    headers
        .iter()
        .enumerate()
        .skip(1)
        .find(|(_, code)| *code == locale)
        .map(|(idx, _)| idx)
        .ok_or_else(|| CarderError::UnknownLocale {
            locale: locale.to_string(),
            available: headers.iter().skip(1).map(str::to_string).collect(),
            path: path.to_path_buf(),
        })
}

/// Read the `locale` column of the table at `path`.
///
/// With `to_ascii` set, text is transliterated to its closest ASCII form.
/// `part` names the template part in errors.
pub fn load_text_table(
    part: &str,
    path: &Path,
    locale: &str,
    to_ascii: bool,
) -> Result<Vec<TextRow>> {
    let file = std::fs::File::open(path).map_err(|e| CarderError::source_io(path, e))?;
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::Headers)
        .from_reader(file);

    let column = locale_column(reader.headers()?, locale, path)?;

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result?;
        let Some(card_id) = record.get(0) else {
            continue;
        };
        let text = record.get(column).ok_or_else(|| {
            CarderError::part(
                part,
                format!(
                    "row `{}` in {} has no column {}",
                    card_id,
                    path.display(),
                    column
                ),
            )
        })?;

        let text = if to_ascii {
            deunicode::deunicode(text)
        } else {
            text.to_string()
        };

        rows.push(TextRow {
            card_id: card_id.to_string(),
            text,
        });
    }

    log::debug!(
        "Read {} rows from {} (column {})",
        rows.len(),
        path.display(),
        column
    );
    Ok(rows)
}
