//! # Failure Flows
//!
//! Injected write failures, duplicate-rank policy and the size guard.
//! A failed operation must leave the season exactly as it found it.

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use crate::fixtures::*;
    use order_maintainer::{
        Document, DuplicatePolicy, InMemoryCollectionStore, MaintainerConfig, OrderError,
        OrderMaintainer, OrderMaintenanceApi, Rank, StoreError,
    };

    fn with_config(
        documents: Vec<Document>,
        config: MaintainerConfig,
    ) -> (Arc<InMemoryCollectionStore>, OrderMaintainer<InMemoryCollectionStore>) {
        let store = Arc::new(InMemoryCollectionStore::with_documents(documents));
        let service = OrderMaintainer::with_config(Arc::clone(&store), config);
        (store, service)
    }

    #[tokio::test]
    async fn test_failed_shift_rolls_back_whole_batch() {
        let (store, service) = service(ranked_season("s1", 1, 5));
        let before = store.documents();
        store.fail_writes_for(&object_id(3));

        let err = service
            .move_item(&object_id(5), Rank::new(1).unwrap(), 5, &season("s1"))
            .await
            .unwrap_err();

        assert!(matches!(err, OrderError::Store(StoreError::WriteFailed { .. })));
        assert!(err.needs_compaction());
        assert_eq!(store.documents(), before);
        assert_eq!(store.write_count(), 0);
    }

    #[tokio::test]
    async fn test_retry_after_failure_succeeds() {
        let (store, service) = service(ranked_season("s1", 1, 3));
        let caller = Caller { store: &store, service: &service };
        store.fail_writes_for(&object_id(3));

        assert!(caller.delete(1, 1, "s1").await.is_err());
        assert_eq!(store.documents().len(), 3, "delete must not run after a failed close");

        store.clear_failures();
        caller.delete(1, 1, "s1").await.unwrap();
        assert_eq!(ranks(&store, &[2, 3]), vec![Some(1), Some(2)]);
    }

    #[tokio::test]
    async fn test_failed_operation_releases_partition() {
        let (store, service) = service(ranked_season("s1", 1, 3));
        store.fail_writes_for(&object_id(2));

        assert!(service.reorder_all(&season("s1")).await.is_ok());
        assert!(service
            .move_item(&object_id(3), Rank::new(1).unwrap(), 3, &season("s1"))
            .await
            .is_err());

        // A leaked transaction would block this forever.
        let max = tokio::time::timeout(
            std::time::Duration::from_secs(1),
            service.max_order(&season("s1")),
        )
        .await
        .expect("partition lock released")
        .unwrap();
        assert_eq!(max, 3);
    }

    #[tokio::test]
    async fn test_shared_rank_is_shifted_under_default_policy() {
        let (store, service) =
            service(vec![crop(1, "s1", 1), crop(2, "s1", 2), crop(3, "s1", 2)]);
        let caller = Caller { store: &store, service: &service };

        caller.delete(2, 2, "s1").await.unwrap();

        // The peer sharing rank 2 is pulled back onto rank 1.
        let health = service.inspect(&season("s1")).await.unwrap();
        assert_eq!(health.duplicates, vec![1]);

        service.reorder_all(&season("s1")).await.unwrap();
        assert!(service.inspect(&season("s1")).await.unwrap().is_dense());
    }

    #[tokio::test]
    async fn test_shared_rank_is_refused_under_reject_policy() {
        let config = MaintainerConfig {
            duplicate_policy: DuplicatePolicy::Reject,
            ..MaintainerConfig::default()
        };
        let (store, service) = with_config(
            vec![crop(1, "s1", 1), crop(2, "s1", 2), crop(3, "s1", 2)],
            config,
        );
        let before = store.documents();

        let err = service
            .close_gap_on_delete(&object_id(2), Rank::new(2).unwrap(), &season("s1"))
            .await
            .unwrap_err();

        assert!(matches!(err, OrderError::DuplicateRank { rank: 2 }));
        assert!(err.needs_compaction());
        assert_eq!(store.documents(), before);
    }

    #[tokio::test]
    async fn test_oversized_partition_is_refused() {
        let config = MaintainerConfig {
            max_partition_size: 3,
            ..MaintainerConfig::default()
        };
        let (store, service) = with_config(ranked_season("s1", 1, 4), config);

        let err = service.reorder_all(&season("s1")).await.unwrap_err();
        assert!(matches!(err, OrderError::PartitionTooLarge { size: 4, max: 3 }));

        // A move touching fewer peers is still allowed.
        service
            .move_item(&object_id(4), Rank::new(3).unwrap(), 4, &season("s1"))
            .await
            .unwrap();
        assert_eq!(store.write_count(), 1);
    }
}
