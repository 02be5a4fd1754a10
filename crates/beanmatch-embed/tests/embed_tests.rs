use beanmatch_core::config::EmbeddingSettings;
use beanmatch_embed::{get_default_embedder, FakeEmbedder};
use beanmatch_core::traits::Embedder;

#[test]
fn fake_embedder_shapes_and_determinism() {
    let settings = EmbeddingSettings { dim: 64, use_fake: true, ..EmbeddingSettings::default() };
    let embedder = get_default_embedder(&settings).expect("embedder");
    let texts = vec!["hello world".to_string(), "hello world".to_string(), "dark chocolate".to_string()];
    let embs = embedder.embed_batch(&texts).expect("embed_batch");

    assert_eq!(embs.len(), 3);
    assert_eq!(embs[0].len(), 64, "embedding dim follows settings");

    let norm: f32 = embs[0].iter().map(|x| x * x).sum::<f32>().sqrt();
    assert!((norm - 1.0).abs() <= 1e-3, "vector is L2-normalized (norm={norm})");

    for (a, b) in embs[0].iter().zip(embs[1].iter()) {
        assert!((a - b).abs() <= 1e-6);
    }
}

#[test]
fn fake_embedder_folds_case() {
    let embedder = FakeEmbedder::new(32);
    let embs = embedder.embed_batch(&["Citrus".to_string(), "citrus".to_string()]).unwrap();
    assert_eq!(embs[0], embs[1]);
}
