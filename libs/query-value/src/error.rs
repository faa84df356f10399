use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("Unable to convert value '{from}' to a {to}.")]
pub struct ConversionFailure {
    pub from: String,
    pub to: &'static str,
}

impl ConversionFailure {
    pub fn new(from: impl Into<String>, to: &'static str) -> Self {
        Self { from: from.into(), to }
    }
}
