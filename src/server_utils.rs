use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    Json,
    Ascii,
}

pub fn parse_format(raw: Option<&str>) -> OutputFormat {
    match raw.map(|value| value.trim().to_ascii_lowercase()) {
        Some(value) if value == "ascii" || value == "txt" || value == "text" => OutputFormat::Ascii,
        _ => OutputFormat::Json,
    }
}

pub fn parse_optional_u32(name: &str, raw: Option<&str>) -> Result<Option<u32>, String> {
    let Some(value) = raw.map(str::trim).filter(|value| !value.is_empty()) else {
        return Ok(None);
    };
    value
        .parse::<u32>()
        .map(Some)
        .map_err(|_| format!("{name} must be a non-negative integer, got {value:?}"))
}

pub fn parse_optional_i32(name: &str, raw: Option<&str>) -> Result<Option<i32>, String> {
    let Some(value) = raw.map(str::trim).filter(|value| !value.is_empty()) else {
        return Ok(None);
    };
    value
        .parse::<i32>()
        .map(Some)
        .map_err(|_| format!("{name} must be an integer, got {value:?}"))
}

pub fn resolve_port(raw: Option<&str>, default: u16) -> u16 {
    raw.and_then(|value| value.trim().parse::<u16>().ok())
        .unwrap_or(default)
}
