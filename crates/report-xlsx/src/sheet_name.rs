/// Worksheet name used when a report has no usable title.
pub const DEFAULT_SHEET_NAME: &str = "Report";

/// Longest worksheet name the format accepts, in characters.
pub const MAX_SHEET_NAME_LEN: usize = 31;

const INVALID_CHARS: [char; 7] = ['\\', '/', '?', '*', '[', ']', ':'];

/// Derive a valid worksheet name from a report title.
///
/// Invalid characters become `_`, the result is cut to 31 characters, and
/// leading/trailing apostrophes are dropped. An empty result falls back to
/// [`DEFAULT_SHEET_NAME`].
pub fn sanitize_sheet_name(title: &str) -> String {
    let replaced: String = title
        .chars()
        .map(|c| {
            if INVALID_CHARS.contains(&c) {
                '_'
            } else if c.is_control() {
                ' '
            } else {
                c
            }
        })
        .collect();

    let trimmed = replaced.trim().trim_matches('\'');
    let truncated: String = trimmed.chars().take(MAX_SHEET_NAME_LEN).collect();
    let name = truncated.trim_end().trim_end_matches('\'');

    if name.is_empty() {
        DEFAULT_SHEET_NAME.to_owned()
    } else if name.eq_ignore_ascii_case("History") {
        // Reserved by the spreadsheet application.
        format!("{name}_")
    } else {
        name.to_owned()
    }
}
