use crate::error::{Result, SearchError};

/// Split text into whitespace-delimited terms, preserving order.
/// Terms are exact, case-sensitive slices of the input.
pub fn tokenize(text: &str) -> Vec<&str> {
    text.split_whitespace().collect()
}

/// A term is valid when it carries no ASCII control characters (below 0x20).
pub fn is_valid_term(term: &str) -> bool {
    !term.bytes().any(|b| b < b' ')
}

pub fn validate_term(term: &str) -> Result<&str> {
    if is_valid_term(term) {
        Ok(term)
    } else {
        Err(SearchError::InvalidTerm(term.to_string()))
    }
}
