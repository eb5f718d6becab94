/// Parse a boolean flag from a string value, or return the given default value otherwise.
pub fn parse_boolean_flag(value: Option<String>, default: bool) -> bool {
    let value = match value {
        Some(v) => v,
        None => return default,
    };
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => true,
        "0" | "false" | "no" | "off" => false,
        _ => default,
    }
}

/// Splits a comma-separated list, dropping empty entries. Entries that fail to parse are returned in the error list so
/// that callers can log them.
pub fn parse_list<T: std::str::FromStr>(value: &str) -> (Vec<T>, Vec<String>) {
    let mut good = Vec::new();
    let mut bad = Vec::new();
    for item in value.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        match item.parse::<T>() {
            Ok(v) => good.push(v),
            Err(_) => bad.push(item.to_string()),
        }
    }
    (good, bad)
}
