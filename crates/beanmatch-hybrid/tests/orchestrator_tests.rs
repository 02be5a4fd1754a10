use std::sync::Arc;

use beanmatch_core::config::Settings;
use beanmatch_core::error::Error;
use beanmatch_core::flavor::{FlavorTerm, SliderPreferences};
use beanmatch_core::traits::CandidateSource;
use beanmatch_core::types::{Document, FilterSpec, SearchHit, SourceKind, TextInput};
use beanmatch_flavor::{EmbeddingProvider, FlavorProfiler};
use beanmatch_hybrid::SearchOrchestrator;
use beanmatch_testkit::{bean, doc, ids, sample_catalog, ConceptEmbedder, FailingEmbedder, FailingRetriever, StaticRetriever};

fn provider() -> Arc<EmbeddingProvider> {
    Arc::new(EmbeddingProvider::new(Arc::new(ConceptEmbedder::new())).expect("provider"))
}

fn orchestrator_over(retriever: Arc<dyn CandidateSource>) -> SearchOrchestrator {
    SearchOrchestrator::new(retriever, provider(), &Settings::default()).expect("orchestrator")
}

fn over_docs(docs: Vec<Document>) -> SearchOrchestrator {
    orchestrator_over(Arc::new(StaticRetriever::from_docs(docs, SourceKind::Hybrid)))
}

fn filters(pairs: &[(&str, &str)]) -> FilterSpec {
    pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
}

fn terms(t: &[&str]) -> Vec<String> {
    t.iter().map(|s| s.to_string()).collect()
}

#[test]
fn duplicate_ids_collapse_in_first_seen_order() {
    let pool = vec![doc("a", "first a"), doc("a", "second a"), doc("b", "b"), doc("c", "c"), doc("d", "d")];
    let results = over_docs(pool).search("anything", &FilterSpec::new(), &[]).unwrap();
    assert_eq!(ids(&results), vec!["a", "b", "c", "d"]);
    assert_eq!(results[0].document.text, "first a");
    assert_eq!(results.iter().map(|r| r.rank).collect::<Vec<_>>(), vec![1, 2, 3, 4]);
}

#[test]
fn pool_request_uses_configured_size_and_output_is_top_n() {
    let docs: Vec<Document> = (0..15).map(|i| doc(&format!("bean-{i}"), "plain")).collect();
    let retriever = Arc::new(StaticRetriever::from_docs(docs, SourceKind::Hybrid));
    let results = orchestrator_over(retriever.clone()).search("plain", &FilterSpec::new(), &[]).unwrap();
    assert_eq!(retriever.requested(), vec![200]);
    assert_eq!(results.len(), 10);
    assert_eq!(results[9].rank, 10);
    assert_eq!(results[0].document.id, "bean-0");
}

#[test]
fn roast_filter_is_case_insensitive_and_requires_the_key() {
    let mut pool = sample_catalog();
    pool.push(bean("shouty", "cedar", "DARK"));
    pool.push(doc("unlabelled", "cedar"));
    let orch = over_docs(pool);
    for wanted in ["Dark", "dark"] {
        let results = orch.search("roast", &filters(&[("roast", wanted)]), &[]).unwrap();
        assert_eq!(ids(&results), vec!["sumatra-mandheling", "italian-espresso", "shouty"]);
        for r in &results {
            let roast = r.document.metadata.get("roast").map(|v| v.as_text().to_lowercase());
            assert_eq!(roast.as_deref(), Some("dark"));
        }
    }
}

#[test]
fn negative_terms_remove_matching_beans() {
    let results = over_docs(sample_catalog()).search("coffee", &FilterSpec::new(), &terms(&["smoky"])).unwrap();
    let got = ids(&results);
    assert_eq!(got.len(), 6);
    assert!(!got.contains(&"sumatra-mandheling".to_string()));
    assert!(!got.contains(&"italian-espresso".to_string()));
}

#[test]
fn everything_filtered_out_is_an_empty_success() {
    let results = over_docs(sample_catalog()).search("coffee", &filters(&[("roast", "decaf")]), &[]).unwrap();
    assert!(results.is_empty());
}

#[test]
fn blank_query_is_invalid_input() {
    let orch = over_docs(sample_catalog());
    assert!(matches!(orch.search("", &FilterSpec::new(), &[]), Err(Error::InvalidInput(_))));
    assert!(matches!(orch.search("   ", &FilterSpec::new(), &[]), Err(Error::InvalidInput(_))));
}

#[test]
fn structured_query_is_flattened() {
    let input = TextInput::Structured(serde_json::json!({ "text": "cocoa", "lang": "en" }));
    let results = over_docs(sample_catalog()).search(input, &FilterSpec::new(), &[]).unwrap();
    assert_eq!(results.len(), 8);
}

#[test]
fn retrieval_failure_propagates() {
    let orch = orchestrator_over(Arc::new(FailingRetriever));
    assert!(matches!(orch.search("cocoa", &FilterSpec::new(), &[]), Err(Error::RetrievalFailure { .. })));
    let prefs = SliderPreferences::new().with("sweet_bitter", 0.5);
    assert!(matches!(
        orch.search_by_flavor_preferences(&prefs, &FilterSpec::new(), &[]),
        Err(Error::RetrievalFailure { .. })
    ));
}

#[test]
fn embedding_failure_propagates() {
    let provider = Arc::new(EmbeddingProvider::new(Arc::new(FailingEmbedder::after(1))).expect("provider"));
    let retriever = Arc::new(StaticRetriever::from_docs(sample_catalog(), SourceKind::Hybrid));
    let orch = SearchOrchestrator::new(retriever, provider, &Settings::default()).expect("orchestrator");
    assert!(matches!(orch.search("cocoa", &FilterSpec::new(), &terms(&["lemon"])), Err(Error::EmbeddingFailure(_))));
    assert!(matches!(orch.analyze_flavor("cocoa"), Err(Error::EmbeddingFailure(_))));
}

#[test]
fn invalid_settings_are_rejected() {
    let mut settings = Settings::default();
    settings.retrieval.top_n = 0;
    let result = SearchOrchestrator::new(Arc::new(FailingRetriever), provider(), &settings);
    assert!(matches!(result, Err(Error::InvalidConfig(_))));
}

#[test]
fn negative_rejection_weight_is_rejected() {
    let mut settings = Settings::default();
    settings.rerank.rejection_weight = -0.5;
    let result = SearchOrchestrator::new(Arc::new(FailingRetriever), provider(), &settings);
    assert!(matches!(result, Err(Error::InvalidConfig(_))));
}

#[test]
fn rejection_penalty_reorders_survivors() {
    let pool = vec![
        SearchHit::new(doc("dessert", "honey caramel sugar"), 0.8, SourceKind::Vector),
        SearchHit::new(doc("nutty", "almond hazelnut"), 0.7, SourceKind::Vector),
    ];
    let orch = orchestrator_over(Arc::new(StaticRetriever::new(pool)));

    let plain = orch
        .search_by_flavor_preferences(&SliderPreferences::new().with("fruit_nut", 1.0), &FilterSpec::new(), &[])
        .unwrap();
    assert_eq!(ids(&plain), vec!["dessert", "nutty"]);
    assert!(plain.iter().all(|r| r.rejection_penalty.is_none()));

    let prefs = SliderPreferences::new().with("fruit_nut", 1.0).with("sweet_bitter", -1.0);
    let reranked = orch.search_by_flavor_preferences(&prefs, &FilterSpec::new(), &[]).unwrap();
    assert_eq!(ids(&reranked), vec!["nutty", "dessert"]);
    assert_eq!(reranked[0].rank, 1);
    let dessert = &reranked[1];
    assert!(dessert.rejection_penalty.unwrap() > 0.9);
    assert!(reranked[0].final_score(0.5) > dessert.final_score(0.5));
}

#[test]
fn neutral_sliders_still_search() {
    let results = over_docs(sample_catalog())
        .search_by_flavor_preferences(&SliderPreferences::new(), &filters(&[("roast", "light")]), &[])
        .unwrap();
    assert_eq!(ids(&results), vec!["ethiopia-yirgacheffe", "kenya-aa", "costa-rica-tarrazu"]);
}

#[test]
fn out_of_range_slider_is_invalid_input() {
    let orch = over_docs(sample_catalog());
    let prefs = SliderPreferences::new().with("acid_smooth", -2.0);
    assert!(matches!(orch.search_by_flavor_preferences(&prefs, &FilterSpec::new(), &[]), Err(Error::InvalidInput(_))));
}

#[test]
fn analyze_flavor_ranks_tasting_notes() {
    let profile = over_docs(vec![]).analyze_flavor("Crisply sweet-tart, green apple, citrus, almond").unwrap();
    assert!(profile.get(FlavorTerm::Sweet) > profile.get(FlavorTerm::Bitter));
    assert!(profile.get(FlavorTerm::Acid) > profile.get(FlavorTerm::Bitter));
    assert!(profile.get(FlavorTerm::Citrus) > profile.get(FlavorTerm::Chocolate));
    assert!(profile.get(FlavorTerm::Acid) > profile.get(FlavorTerm::Chocolate));
}

#[test]
fn annotate_attaches_profiles() {
    let orch = over_docs(sample_catalog());
    let mut results = orch.search("coffee", &FilterSpec::new(), &[]).unwrap();
    orch.annotate(&mut results).unwrap();
    assert!(results.iter().all(|r| r.flavor_profile.is_some()));
    let sumatra = results.iter().find(|r| r.document.id == "sumatra-mandheling").unwrap();
    let profile = sumatra.flavor_profile.unwrap();
    assert!(profile.get(FlavorTerm::Wood) > profile.get(FlavorTerm::Floral));
}

#[test]
fn analyze_and_annotate_share_the_profiler() {
    let settings = Settings::default();
    let profiler = FlavorProfiler::new(provider(), &settings.flavor);
    let orch = over_docs(sample_catalog());
    let text = "Syrupy body, cedar and dark cocoa";
    assert_eq!(orch.analyze_flavor(text).unwrap(), profiler.profile(text).unwrap());

    let mut results = orch.search("coffee", &FilterSpec::new(), &[]).unwrap();
    orch.annotate(&mut results).unwrap();
    for r in &results {
        assert_eq!(r.flavor_profile.unwrap(), profiler.profile(&r.document.text).unwrap());
    }
}
