use thiserror::Error;

#[derive(Debug, Error)]
pub enum GalaxyError {
    #[error("invalid color {0:?}, expected #rrggbb")]
    InvalidColor(String),

    #[error("{field} = {value} is outside {min}..={max}")]
    OutOfRange {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Config(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, GalaxyError>;
