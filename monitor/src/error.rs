use thiserror::Error;

/// Operator input that cannot be turned into a usable [`crate::config::Config`].
///
/// Always reported to the log sink; never fatal.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("please fill in all fields ({0} is empty)")]
    MissingField(&'static str),

    #[error("{field} is not a valid price: {value:?}")]
    InvalidPrice { field: &'static str, value: String },

    #[error("interval must be a positive whole number of seconds, got {0:?}")]
    InvalidInterval(String),

    #[error("stats window must be a whole number of minutes (0 disables), got {0:?}")]
    InvalidStatsWindow(String),
}
