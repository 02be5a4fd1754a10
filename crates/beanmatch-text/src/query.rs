use tantivy::query::{BooleanQuery, FuzzyTermQuery, Occur, Query, TermQuery};
use tantivy::schema::{Field, IndexRecordOption};
use tantivy::Term;

/// Allowed edits for a term: none up to two characters, one up to five,
/// two beyond.
pub fn auto_distance(term: &str) -> u8 {
    match term.chars().count() {
        0..=2 => 0,
        3..=5 => 1,
        _ => 2,
    }
}

/// OR over the analyzed terms; each term is an exact match, plus a fuzzy
/// match when its length allows edits. Exact hits score higher since they
/// satisfy both clauses. `None` when there is nothing to search for.
pub fn build_fuzzy_query(field: Field, terms: &[String]) -> Option<Box<dyn Query>> {
    let clauses: Vec<(Occur, Box<dyn Query>)> = terms
        .iter()
        .map(|word| {
            let term = Term::from_field_text(field, word);
            let exact: Box<dyn Query> = Box::new(TermQuery::new(term.clone(), IndexRecordOption::WithFreqs));
            let distance = auto_distance(word);
            let query: Box<dyn Query> = if distance == 0 {
                exact
            } else {
                let fuzzy: Box<dyn Query> = Box::new(FuzzyTermQuery::new(term, distance, true));
                Box::new(BooleanQuery::new(vec![(Occur::Should, exact), (Occur::Should, fuzzy)]))
            };
            (Occur::Should, query)
        })
        .collect();
    if clauses.is_empty() {
        return None;
    }
    Some(Box::new(BooleanQuery::new(clauses)))
}
