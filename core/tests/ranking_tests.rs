use search_core::config::MAX_RESULT_DOCUMENT_COUNT;
use search_core::{
    Document, DocumentFilter, DocumentStatus, ErrorKind, ExecutionMode, SearchError, SearchIndex,
};

fn worked_scenario() -> SearchIndex {
    let mut index = SearchIndex::new(["the"]).unwrap();
    index.add_document(0, "the quick brown fox", DocumentStatus::Active, &[5, 5]).unwrap();
    index.add_document(1, "the quick brown dog", DocumentStatus::Active, &[1, 1]).unwrap();
    index.add_document(2, "lazy dog sleeps", DocumentStatus::Active, &[3]).unwrap();
    index
}

#[test]
fn worked_scenario_ranks_by_tf_idf() {
    let index = worked_scenario();
    let idf = (3.0f64 / 2.0).ln();
    let expected = vec![
        Document::new(1, 2.0 * idf / 3.0, 1),
        Document::new(0, idf / 3.0, 5),
    ];
    for mode in [ExecutionMode::Sequential, ExecutionMode::Parallel] {
        let found = index
            .find_top_documents_with(mode, "quick dog -lazy", DocumentFilter::Default)
            .unwrap();
        assert_eq!(found, expected);
    }
    let found = index.find_top_documents("quick dog -lazy").unwrap();
    assert!((found[0].relevance - 0.2703).abs() < 1e-4);
    assert!((found[1].relevance - 0.1352).abs() < 1e-4);
}

#[test]
fn minus_term_beats_plus_terms() {
    let index = worked_scenario();
    let found = index.find_top_documents("lazy dog sleeps -sleeps").unwrap();
    assert_eq!(found.iter().map(|d| d.id).collect::<Vec<_>>(), vec![1]);
}

#[test]
fn ties_fall_back_to_rating() {
    let mut index = SearchIndex::new(Vec::<&str>::new()).unwrap();
    index.add_document(1, "cat", DocumentStatus::Active, &[1]).unwrap();
    index.add_document(2, "cat", DocumentStatus::Active, &[9]).unwrap();
    index.add_document(3, "dog", DocumentStatus::Active, &[5]).unwrap();
    let found = index.find_top_documents("cat").unwrap();
    assert_eq!(found.iter().map(|d| d.id).collect::<Vec<_>>(), vec![2, 1]);
}

#[test]
fn results_are_capped() {
    let mut index = SearchIndex::new(["and"]).unwrap();
    for id in 0..12 {
        let text = format!("shared word{id} and more{}", id % 3);
        index.add_document(id, &text, DocumentStatus::Active, &[id]).unwrap();
    }
    let found = index.find_top_documents("shared more1").unwrap();
    assert_eq!(found.len(), MAX_RESULT_DOCUMENT_COUNT);
    for pair in found.windows(2) {
        assert_ne!(pair[0].ranking_order(&pair[1]), std::cmp::Ordering::Greater);
    }
}

#[test]
fn chained_near_ties_rank_without_panicking() {
    // Lengths 990..=999 put neighbouring relevances within epsilon of each
    // other while the ends of the chain are further apart.
    let mut index = SearchIndex::new(Vec::<String>::new()).unwrap();
    for id in 0..64 {
        let filler = vec!["f"; 989 + (id as usize % 10)].join(" ");
        let text = format!("x {filler}");
        index
            .add_document(id, &text, DocumentStatus::Active, &[(id * 7) % 10])
            .unwrap();
    }
    for id in 64..128 {
        index.add_document(id, "z", DocumentStatus::Active, &[]).unwrap();
    }

    let sequential = index.find_top_documents("x").unwrap();
    assert_eq!(sequential.len(), MAX_RESULT_DOCUMENT_COUNT);
    assert!(sequential.iter().all(|d| (0..64).contains(&d.id)));

    let parallel = index
        .find_top_documents_with(ExecutionMode::Parallel, "x", DocumentFilter::Default)
        .unwrap();
    assert_eq!(sequential, parallel);
}

#[test]
fn status_and_predicate_filters() {
    let mut index = SearchIndex::new(Vec::<&str>::new()).unwrap();
    index.add_document(0, "white cat", DocumentStatus::Active, &[8]).unwrap();
    index.add_document(1, "black cat", DocumentStatus::Banned, &[7]).unwrap();
    index.add_document(2, "grey cat", DocumentStatus::Active, &[-3]).unwrap();

    let ids = |docs: Vec<Document>| docs.into_iter().map(|d| d.id).collect::<Vec<_>>();

    assert_eq!(ids(index.find_top_documents("cat").unwrap()), vec![0, 2]);
    assert_eq!(
        ids(index.find_top_documents_by_status("cat", DocumentStatus::Banned).unwrap()),
        vec![1]
    );
    assert_eq!(
        ids(index.find_top_documents_by("cat", |id, _, _| id % 2 == 0).unwrap()),
        vec![0, 2]
    );
    assert_eq!(
        ids(index.find_top_documents_by("cat", |_, _, rating| rating > 0).unwrap()),
        vec![0, 1]
    );
    assert!(index
        .find_top_documents_by_status("cat", DocumentStatus::Removed)
        .unwrap()
        .is_empty());
}

#[test]
fn term_present_in_every_document_scores_zero() {
    let mut index = SearchIndex::new(Vec::<&str>::new()).unwrap();
    index.add_document(0, "dog one", DocumentStatus::Active, &[1]).unwrap();
    index.add_document(1, "dog two", DocumentStatus::Active, &[2]).unwrap();
    let found = index.find_top_documents("dog").unwrap();
    assert_eq!(found.len(), 2);
    assert!(found.iter().all(|d| d.relevance.abs() < 1e-12));
    // equal relevance: higher rating first
    assert_eq!(found[0].id, 1);
}

#[test]
fn invalid_queries_fail() {
    let index = worked_scenario();
    let err = index.find_top_documents("quick -").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    assert!(matches!(
        index.match_document("quick --dog", 0),
        Err(SearchError::InvalidMinusTerm(_))
    ));
}

#[test]
fn match_document_reports_status() {
    let mut index = worked_scenario();
    index.add_document(7, "quick lazy cat", DocumentStatus::Irrelevant, &[]).unwrap();
    let (words, status) = index.match_document("cat quick fox", 7).unwrap();
    assert_eq!(words, vec!["cat", "quick"]);
    assert_eq!(status, DocumentStatus::Irrelevant);

    let (words, status) = index.match_document("cat -lazy", 7).unwrap();
    assert!(words.is_empty());
    assert_eq!(status, DocumentStatus::Irrelevant);

    let err = index.match_document("cat", 8).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}
