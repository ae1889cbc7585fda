use serde::Deserialize;

/// Payload embedded in the quote script as `quot_str = [ ... ]`.
#[derive(Debug, Deserialize)]
pub struct QuoteEnvelope {
    #[serde(default)]
    pub data: Vec<QuoteItem>,
}

#[derive(Debug, Deserialize)]
pub struct QuoteItem {
    pub quote: QuoteFields,
}

#[derive(Debug, Deserialize)]
pub struct QuoteFields {
    /// Last price, as text.
    #[serde(default)]
    pub q63: String,

    /// Product name.
    #[serde(default)]
    pub q67: String,
}
