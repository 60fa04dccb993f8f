//! Built-in prompts for gravestone photographs.

/// Column holding the file name in image-description tables.
pub const IMAGE_NAME_COLUMN: &str = "Image Name";

/// Trailing column of structured-extraction tables.
pub const TRANSCRIPTION_COLUMN: &str = "Transcription";

/// `(column, prompt)` pairs used by `describe` when no prompts are given.
pub const DEFAULT_DESCRIBE_PROMPTS: &[(&str, &str)] = &[
    (
        "Description",
        "Describe this gravestone: its shape, material, condition and any \
         carved symbols or decoration. Answer in one short paragraph.",
    ),
    (
        "Inscription",
        "Transcribe all legible text carved on this gravestone exactly as \
         written, line breaks replaced by spaces. Mark illegible parts with [?].",
    ),
];

/// Fields extracted from each transcription, in answer order.
pub const DEFAULT_EXTRACT_FIELDS: &[&str] = &["Name", "Birth Date", "Death Date", "Inscription"];

/// Prefix sent before every transcription in structured extraction.
pub const DEFAULT_EXTRACT_PROMPT: &str = "The following text was read from a \
gravestone by OCR and may contain errors. Extract the name of the deceased, \
the birth date, the death date and the remaining inscription. Answer with \
exactly four values separated by commas, in that order, and nothing else. \
Do not use commas inside a value. Write UNKNOWN for a value you cannot \
find.\n\nText: ";

/// Column names for a describe run with the built-in prompts.
pub fn default_describe_columns() -> Vec<String> {
    std::iter::once(IMAGE_NAME_COLUMN)
        .chain(DEFAULT_DESCRIBE_PROMPTS.iter().map(|(column, _)| *column))
        .map(str::to_string)
        .collect()
}

/// The built-in describe prompts.
pub fn default_describe_prompts() -> Vec<String> {
    DEFAULT_DESCRIBE_PROMPTS
        .iter()
        .map(|(_, prompt)| prompt.to_string())
        .collect()
}

/// Column names for structured extraction: `fields` then the transcription.
pub fn extract_columns<S: AsRef<str>>(fields: &[S]) -> Vec<String> {
    fields
        .iter()
        .map(|f| f.as_ref().to_string())
        .chain(std::iter::once(TRANSCRIPTION_COLUMN.to_string()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_describe_columns_match_prompts() {
        let columns = default_describe_columns();
        assert_eq!(columns.len(), 1 + default_describe_prompts().len());
        assert_eq!(columns[0], "Image Name");
    }

    #[test]
    fn test_extract_columns() {
        assert_eq!(
            extract_columns(DEFAULT_EXTRACT_FIELDS),
            vec!["Name", "Birth Date", "Death Date", "Inscription", "Transcription"]
        );
    }

    #[test]
    fn test_extract_prompt_asks_for_every_field() {
        assert!(DEFAULT_EXTRACT_PROMPT.contains("exactly four values"));
        assert_eq!(DEFAULT_EXTRACT_FIELDS.len(), 4);
    }
}
