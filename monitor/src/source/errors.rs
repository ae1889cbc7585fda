use thiserror::Error;

#[derive(Error, Debug)]
pub enum SourceError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("quote payload not found in response")]
    MissingPayload,

    #[error("malformed quote payload: {0}")]
    Json(#[from] serde_json::Error),

    #[error("product {0:?} not listed in quote")]
    ProductNotFound(String),

    #[error("invalid price {value:?}: {source}")]
    InvalidPrice {
        value: String,
        source: std::num::ParseFloatError,
    },

    #[error("price {0} is not a finite number")]
    NonFinitePrice(f64),
}
