use thiserror::Error;

/// Caller mistakes rejected before any grid is allocated. Runtime shortfalls
/// (no room for a feature, repair cap hit) never surface here; they land in
/// the generation report instead.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GenerateError {
    #[error("level {level} is outside {min}..={max}")]
    InvalidLevel { level: u32, min: u32, max: u32 },

    #[error("{axis} {value} is outside {min}..={max}")]
    InvalidDimension {
        axis: &'static str,
        value: i32,
        min: i32,
        max: i32,
    },

    #[error("charset symbol for {field} must be a visible ASCII character, got {symbol:?}")]
    InvalidSymbol { field: &'static str, symbol: char },

    #[error("charset symbols for {first} and {second} collide on {symbol:?}")]
    SymbolCollision {
        first: &'static str,
        second: &'static str,
        symbol: char,
    },
}
