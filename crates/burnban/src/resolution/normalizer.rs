/// Join key shared by geocoder output and dataset rows.
pub(crate) fn normalize_county(value: &str) -> String {
    value.to_uppercase().trim().to_string()
}

/// Removes a trailing "County" word from boundary service names ("Travis County" -> "Travis").
pub(crate) fn strip_county_suffix(value: &str) -> String {
    let trimmed = value.trim();
    trimmed
        .strip_suffix("County")
        .unwrap_or(trimmed)
        .trim()
        .to_string()
}
