use search_core::query::parse_query;
use search_core::tokenizer::tokenize;
use search_core::SearchError;
use std::collections::BTreeSet;

#[test]
fn it_keeps_case_and_punctuation() {
    let words = tokenize("Running runner's RUN! The café's menu.");
    assert_eq!(words, vec!["Running", "runner's", "RUN!", "The", "café's", "menu."]);
}

#[test]
fn it_filters_stopwords_from_queries() {
    let stop_words: BTreeSet<String> = ["the", "and"].iter().map(|s| s.to_string()).collect();
    let query = parse_query("The quick brown fox and the -lazy dog", &stop_words).unwrap();
    assert!(!query.plus.contains("the"));
    assert!(!query.plus.contains("and"));
    assert!(query.plus.contains("The"));
    assert_eq!(query.minus.len(), 1);
}

#[test]
fn it_rejects_double_dash() {
    let err = parse_query("fox ---dog", &BTreeSet::new()).unwrap_err();
    assert_eq!(err, SearchError::InvalidMinusTerm("---dog".into()));
}
