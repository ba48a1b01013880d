use crate::error::{Result, SearchError};
use crate::tokenizer::{tokenize, validate_term};
use std::collections::BTreeSet;

/// A parsed query. Terms borrow from the raw query string.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Query<'q> {
    pub plus: BTreeSet<&'q str>,
    pub minus: BTreeSet<&'q str>,
}

/// Split a raw query into plus and minus terms.
///
/// Stop words are dropped silently from both sets. A token `-word` is a minus
/// term; a bare `-` or a token starting with `--` is rejected.
pub fn parse_query<'q>(raw_query: &'q str, stop_words: &BTreeSet<String>) -> Result<Query<'q>> {
    let mut query = Query::default();
    for token in tokenize(raw_query) {
        if stop_words.contains(token) {
            continue;
        }
        validate_term(token)?;
        match token.strip_prefix('-') {
            Some(term) => {
                if term.is_empty() || term.starts_with('-') {
                    return Err(SearchError::InvalidMinusTerm(token.to_string()));
                }
                if !stop_words.contains(term) {
                    query.minus.insert(term);
                }
            }
            None => {
                query.plus.insert(token);
            }
        }
    }
    Ok(query)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stop_words(words: &[&str]) -> BTreeSet<String> {
        words.iter().map(|w| w.to_string()).collect()
    }

    #[test]
    fn splits_plus_and_minus_terms() {
        let q = parse_query("quick dog -lazy quick", &stop_words(&[])).unwrap();
        assert_eq!(q.plus.into_iter().collect::<Vec<_>>(), vec!["dog", "quick"]);
        assert_eq!(q.minus.into_iter().collect::<Vec<_>>(), vec!["lazy"]);
    }

    #[test]
    fn drops_stop_words_from_both_sets() {
        let q = parse_query("the cat -the -and", &stop_words(&["the", "and"])).unwrap();
        assert_eq!(q.plus.len(), 1);
        assert!(q.minus.is_empty());
    }

    #[test]
    fn rejects_malformed_minus_terms() {
        let sw = stop_words(&[]);
        assert_eq!(
            parse_query("cat -", &sw),
            Err(SearchError::InvalidMinusTerm("-".into()))
        );
        assert_eq!(
            parse_query("cat --dog", &sw),
            Err(SearchError::InvalidMinusTerm("--dog".into()))
        );
    }

    #[test]
    fn rejects_control_characters() {
        assert!(matches!(
            parse_query("ca\x02t", &stop_words(&[])),
            Err(SearchError::InvalidTerm(_))
        ));
    }
}
