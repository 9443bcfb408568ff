use std::collections::HashMap;
use std::sync::Arc;
use veilsearch_crypto::{
    CryptoError, Metadata, PlaintextVector, RotatableSecret, Secret, SecretStore, StandardSecrets,
    VectorSecret, VectorTransformer,
};

const PATH: &str = "text-samples";

fn store_with_factor(factor: f32) -> Arc<SecretStore> {
    let standard =
        StandardSecrets::new(1, vec![Secret::new(1, vec![0x11; 64]).unwrap()]).unwrap();
    let deterministic: HashMap<String, RotatableSecret> = HashMap::new();
    let mut vector = HashMap::new();
    vector.insert(
        PATH.to_string(),
        VectorSecret::new(
            factor,
            RotatableSecret::new(Secret::new(1, vec![0x22; 64]).unwrap(), None).unwrap(),
        )
        .unwrap(),
    );
    Arc::new(SecretStore::new(standard, deterministic, vector).unwrap())
}

fn sample_vector(dim: usize, phase: f32) -> Vec<f32> {
    (0..dim).map(|i| (i as f32 * 0.37 + phase).sin()).collect()
}

#[test]
fn transform_is_deterministic_across_store_rebuilds() {
    let metadata = Metadata::new_simple("tenant-one");
    let vector = PlaintextVector::new(sample_vector(256, 0.0), PATH, "sentence");

    // Two independently constructed stores from the same key material must
    // agree, otherwise re-ingestion after restart would duplicate index keys.
    let a = VectorTransformer::new(store_with_factor(2.5))
        .encrypt(&vector, &metadata)
        .unwrap();
    let b = VectorTransformer::new(store_with_factor(2.5))
        .encrypt(&vector, &metadata)
        .unwrap();
    assert_eq!(a.encrypted_vector, b.encrypted_vector);
}

#[test]
fn repeated_encryption_is_byte_identical() {
    let transformer = VectorTransformer::new(store_with_factor(2.5));
    let metadata = Metadata::new_simple("tenant-one");
    let vector = PlaintextVector::new(sample_vector(128, 1.0), PATH, "sentence");

    let a = transformer.encrypt(&vector, &metadata).unwrap();
    let b = transformer.encrypt(&vector, &metadata).unwrap();
    assert_eq!(a.encrypted_vector, b.encrypted_vector);
}

#[test]
fn derivation_path_diversifies_ciphertext() {
    let transformer = VectorTransformer::new(store_with_factor(2.5));
    let metadata = Metadata::new_simple("tenant-one");
    let components = sample_vector(128, 2.0);

    let title = transformer
        .encrypt(&PlaintextVector::new(components.clone(), PATH, "title"), &metadata)
        .unwrap();
    let content = transformer
        .encrypt(&PlaintextVector::new(components.clone(), PATH, "content"), &metadata)
        .unwrap();

    assert_ne!(title.encrypted_vector, content.encrypted_vector);
    assert_eq!(title.encrypted_vector.len(), components.len());
    assert_eq!(content.encrypted_vector.len(), components.len());
}

#[test]
fn tenant_context_diversifies_ciphertext() {
    let transformer = VectorTransformer::new(store_with_factor(2.5));
    let vector = PlaintextVector::new(sample_vector(128, 3.0), PATH, "sentence");

    let a = transformer
        .encrypt(&vector, &Metadata::new_simple("tenant-one"))
        .unwrap();
    let b = transformer
        .encrypt(&vector, &Metadata::new_simple("tenant-two"))
        .unwrap();
    assert_ne!(a.encrypted_vector, b.encrypted_vector);
}

#[test]
fn ciphertext_is_not_the_plaintext() {
    let transformer = VectorTransformer::new(store_with_factor(1.0));
    let metadata = Metadata::new_simple("tenant-one");
    let components = sample_vector(128, 4.0);
    let encrypted = transformer
        .encrypt(&PlaintextVector::new(components.clone(), PATH, "sentence"), &metadata)
        .unwrap();
    assert_ne!(encrypted.encrypted_vector, components);
}

#[test]
fn unknown_secret_path_is_rejected() {
    let transformer = VectorTransformer::new(store_with_factor(2.5));
    let metadata = Metadata::new_simple("tenant-one");
    let vector = PlaintextVector::new(sample_vector(16, 0.0), "unregistered", "sentence");

    let result = transformer.encrypt(&vector, &metadata);
    assert!(matches!(result, Err(CryptoError::UnknownSecretPath(_))));
}

#[test]
fn dimension_drift_is_rejected() {
    let transformer = VectorTransformer::new(store_with_factor(2.5));
    let metadata = Metadata::new_simple("tenant-one");

    transformer
        .encrypt(&PlaintextVector::new(sample_vector(1024, 0.0), PATH, "sentence"), &metadata)
        .unwrap();

    let result = transformer.encrypt(
        &PlaintextVector::new(sample_vector(768, 0.0), PATH, "sentence"),
        &metadata,
    );
    match result {
        Err(CryptoError::DimensionMismatch { expected, actual, .. }) => {
            assert_eq!(expected, 1024);
            assert_eq!(actual, 768);
        }
        other => panic!("expected DimensionMismatch, got {other:?}"),
    }
}

#[test]
fn empty_vector_is_rejected() {
    let transformer = VectorTransformer::new(store_with_factor(2.5));
    let metadata = Metadata::new_simple("tenant-one");

    let result = transformer.encrypt(&PlaintextVector::new(vec![], PATH, "sentence"), &metadata);
    assert!(matches!(
        result,
        Err(CryptoError::DimensionMismatch { actual: 0, .. })
    ));
}

#[test]
fn factor_one_preserves_norm() {
    let transformer = VectorTransformer::new(store_with_factor(1.0));
    let metadata = Metadata::new_simple("tenant-one");
    let components = sample_vector(512, 5.0);

    let encrypted = transformer
        .encrypt(&PlaintextVector::new(components.clone(), PATH, "sentence"), &metadata)
        .unwrap();

    let norm_in: f64 = components.iter().map(|&c| (c as f64).powi(2)).sum();
    let norm_out: f64 = encrypted
        .encrypted_vector
        .iter()
        .map(|&c| (c as f64).powi(2))
        .sum();
    assert!((norm_in - norm_out).abs() < 1e-3 * norm_in);
}

// ---------------------------------------------------------------------------
// Ranking preservation over a synthetic clustered corpus
// ---------------------------------------------------------------------------

const DIM: usize = 64;

/// Three well-separated cluster directions plus graded per-point offsets,
/// so true nearest-neighbor orderings have clear gaps.
fn clustered_corpus() -> Vec<Vec<f32>> {
    let centers: Vec<Vec<f32>> = (0..3)
        .map(|k| {
            (0..DIM)
                .map(|i| 8.0 * ((i as f32) * 0.61 + (k as f32) * 2.3).sin())
                .collect()
        })
        .collect();

    let mut corpus = Vec::new();
    for (k, center) in centers.iter().enumerate() {
        for j in 0..7 {
            let scale = 0.5 + 0.5 * j as f32;
            let point: Vec<f32> = center
                .iter()
                .enumerate()
                .map(|(i, &c)| c + scale * ((i as f32) * 1.7 + (j as f32) * 0.9 + k as f32).cos())
                .collect();
            corpus.push(point);
        }
    }
    corpus
}

fn queries() -> Vec<Vec<f32>> {
    clustered_corpus()
        .chunks(7)
        .map(|cluster| {
            cluster[0]
                .iter()
                .enumerate()
                .map(|(i, &c)| c + 0.05 * (i as f32 * 0.31).sin())
                .collect()
        })
        .collect()
}

fn euclidean(a: &[f32], b: &[f32]) -> f64 {
    a.iter()
        .zip(b)
        .map(|(&x, &y)| ((x - y) as f64).powi(2))
        .sum::<f64>()
        .sqrt()
}

fn top_k(query: &[f32], corpus: &[Vec<f32>], k: usize) -> Vec<usize> {
    let mut indexed: Vec<(usize, f64)> = corpus
        .iter()
        .enumerate()
        .map(|(i, v)| (i, euclidean(query, v)))
        .collect();
    indexed.sort_by(|a, b| a.1.total_cmp(&b.1));
    indexed.into_iter().take(k).map(|(i, _)| i).collect()
}

fn top3_overlap_at_factor(factor: f32) -> f64 {
    let transformer = VectorTransformer::new(store_with_factor(factor));
    let metadata = Metadata::new_simple("tenant-one");
    let corpus = clustered_corpus();

    let encrypted_corpus: Vec<Vec<f32>> = corpus
        .iter()
        .map(|v| {
            transformer
                .encrypt(&PlaintextVector::new(v.clone(), PATH, "sentence"), &metadata)
                .unwrap()
                .encrypted_vector
        })
        .collect();

    let mut preserved = 0usize;
    let mut total = 0usize;
    for query in queries() {
        let true_top = top_k(&query, &corpus, 3);
        let encrypted_query = transformer
            .encrypt(&PlaintextVector::new(query, PATH, "sentence"), &metadata)
            .unwrap()
            .encrypted_vector;
        let cipher_top = top_k(&encrypted_query, &encrypted_corpus, 3);

        total += 3;
        preserved += true_top.iter().filter(|i| cipher_top.contains(i)).count();
    }
    preserved as f64 / total as f64
}

#[test]
fn factor_one_preserves_exact_ordering() {
    let transformer = VectorTransformer::new(store_with_factor(1.0));
    let metadata = Metadata::new_simple("tenant-one");
    let corpus = clustered_corpus();

    let encrypted_corpus: Vec<Vec<f32>> = corpus
        .iter()
        .map(|v| {
            transformer
                .encrypt(&PlaintextVector::new(v.clone(), PATH, "sentence"), &metadata)
                .unwrap()
                .encrypted_vector
        })
        .collect();

    for query in queries() {
        let true_top = top_k(&query, &corpus, 5);
        let encrypted_query = transformer
            .encrypt(&PlaintextVector::new(query, PATH, "sentence"), &metadata)
            .unwrap()
            .encrypted_vector;
        let cipher_top = top_k(&encrypted_query, &encrypted_corpus, 5);
        assert_eq!(true_top, cipher_top);
    }
}

#[test]
fn default_factor_keeps_top3_overlap_high() {
    let overlap = top3_overlap_at_factor(2.5);
    assert!(overlap >= 0.9, "top-3 overlap {overlap} below 0.9");
}

#[test]
fn perturbation_grows_with_factor() {
    // The injected noise amplitude scales with (factor - 1); after undoing
    // the uniform scaling, a higher factor must sit strictly further from
    // the noiseless transform.
    let metadata = Metadata::new_simple("tenant-one");
    let components = sample_vector(256, 6.0);

    let normalized = |factor: f32| -> Vec<f32> {
        VectorTransformer::new(store_with_factor(factor))
            .encrypt(&PlaintextVector::new(components.clone(), PATH, "sentence"), &metadata)
            .unwrap()
            .encrypted_vector
            .iter()
            .map(|&c| c / factor)
            .collect()
    };

    let baseline = normalized(1.0);
    let light = euclidean(&normalized(1.5), &baseline);
    let heavy = euclidean(&normalized(40.0), &baseline);
    assert!(light > 0.0);
    assert!(heavy > light);
}
