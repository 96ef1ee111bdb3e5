//! Property tests for in-memory store search ordering and tenant isolation.

use docqa_rag::document::{ChunkMetadata, IndexRecord};
use docqa_rag::inmemory::InMemoryVectorStore;
use docqa_rag::vectorstore::{MetadataFilter, VectorStore};
use proptest::prelude::*;

const DIM: usize = 16;

/// Generate a non-zero L2-normalized embedding of the given dimension.
fn arb_normalized_embedding(dim: usize) -> impl Strategy<Value = Vec<f32>> {
    proptest::collection::vec(-1.0f32..1.0f32, dim).prop_filter_map(
        "non-zero embedding",
        |mut v| {
            let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
            if norm < 1e-8 {
                return None;
            }
            for val in &mut v {
                *val /= norm;
            }
            Some(v)
        },
    )
}

/// Generate an index record owned by one of two tenants.
fn arb_record(dim: usize) -> impl Strategy<Value = IndexRecord> {
    (
        prop_oneof![Just("tenant_a"), Just("tenant_b")],
        0u32..10,
        0usize..100,
        arb_normalized_embedding(dim),
    )
        .prop_map(|(user_id, page, chunk_index, embedding)| {
            let metadata = ChunkMetadata {
                user_id: user_id.to_string(),
                source: "doc.pdf".to_string(),
                page,
                chunk_index,
            };
            IndexRecord {
                id: metadata.record_id(),
                embedding,
                metadata,
                document: format!("text for chunk {chunk_index}"),
            }
        })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// For any stored records, query results are ordered by descending
    /// similarity and bounded by top_k.
    #[test]
    fn results_ordered_descending_and_bounded_by_top_k(
        records in proptest::collection::vec(arb_record(DIM), 1..20),
        query in arb_normalized_embedding(DIM),
        top_k in 1usize..25,
    ) {
        let rt = tokio::runtime::Runtime::new().unwrap();
        let (results, unique_count) = rt.block_on(async {
            let store = InMemoryVectorStore::new();
            store.upsert(&records).await.unwrap();
            let unique_count = store.len().await;
            let results = store.query(&query, top_k, None).await.unwrap();
            (results, unique_count)
        });

        prop_assert!(results.len() <= top_k);
        prop_assert!(results.len() <= unique_count);

        for window in results.windows(2) {
            prop_assert!(
                window[0].score >= window[1].score,
                "results not in descending order: {} < {}",
                window[0].score,
                window[1].score,
            );
        }
    }

    /// A user_id filter never returns another tenant's records, and it
    /// returns every stored record of the filtered tenant when top_k
    /// allows.
    #[test]
    fn user_filter_isolates_tenants(
        records in proptest::collection::vec(arb_record(DIM), 1..20),
        query in arb_normalized_embedding(DIM),
    ) {
        let rt = tokio::runtime::Runtime::new().unwrap();
        let (results, stored_a) = rt.block_on(async {
            let store = InMemoryVectorStore::new();
            store.upsert(&records).await.unwrap();

            let filter = MetadataFilter::eq("user_id", "tenant_a");
            let results = store.query(&query, usize::MAX, Some(&filter)).await.unwrap();

            // Count distinct tenant_a ids actually stored (upsert dedupes).
            let mut ids: Vec<String> = records
                .iter()
                .filter(|r| r.metadata.user_id == "tenant_a")
                .map(|r| r.id.clone())
                .collect();
            ids.sort();
            ids.dedup();
            (results, ids.len())
        });

        prop_assert!(results.iter().all(|d| d.metadata.user_id == "tenant_a"));
        prop_assert_eq!(results.len(), stored_a);
    }
}
