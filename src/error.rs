use thiserror::Error;

/// Why a single member page didn't yield a record.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("expected <{0}> element not found")]
    MissingElement(&'static str),

    #[error("url names neither chamber: {0}")]
    UnknownChamber(String),

    #[error("malformed tag name {0:?}")]
    BadTagName(String),

    #[error("unreadable markup: {0}")]
    Markup(#[from] quick_xml::Error),
}

impl ExtractError {
    /// Missing pieces of an otherwise readable page.
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            ExtractError::MissingElement(_) | ExtractError::UnknownChamber(_)
        )
    }
}
