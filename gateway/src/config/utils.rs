/// Parse a comma-separated list, dropping empty entries
///
/// `"cloned_voice, plain_text,,"` becomes `["cloned_voice", "plain_text"]`.
pub fn parse_list(s: &str) -> Vec<String> {
    s.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

/// Parse a numeric environment value, naming the variable on failure
pub fn parse_env_number<T>(name: &str, value: &str) -> Result<T, String>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse::<T>()
        .map_err(|e| format!("Invalid {name} environment variable: {e}"))
}
