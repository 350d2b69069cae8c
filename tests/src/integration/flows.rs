//! # Caller Flows
//!
//! A season's crops kept in display order while the caller inserts, moves
//! and deletes them. Each test plays the caller's half (own rank write,
//! physical delete) through [`Caller`](crate::fixtures::Caller).

#[cfg(test)]
mod tests {
    use crate::fixtures::*;
    use order_maintainer::{Document, OrderError, OrderMaintenanceApi, Rank};

    // =============================================================================
    // WORKED SCENARIOS
    // =============================================================================

    #[tokio::test]
    async fn test_move_last_crop_to_second() {
        let (store, service) = service(ranked_season("s1", 1, 4));
        let caller = Caller { store: &store, service: &service };

        caller.move_to(4, 2, 4, "s1").await.unwrap();

        // A=1, D=2, B=3, C=4
        assert_eq!(
            ranks(&store, &[1, 4, 2, 3]),
            vec![Some(1), Some(2), Some(3), Some(4)]
        );
    }

    #[tokio::test]
    async fn test_delete_middle_crop() {
        let (store, service) = service(ranked_season("s1", 1, 3));
        let caller = Caller { store: &store, service: &service };

        caller.delete(2, 2, "s1").await.unwrap();

        assert_eq!(ranks(&store, &[1, 3]), vec![Some(1), Some(2)]);
        assert_eq!(store.documents().len(), 2);
    }

    #[tokio::test]
    async fn test_move_first_crop_down() {
        let (store, service) = service(ranked_season("s1", 1, 4));
        let caller = Caller { store: &store, service: &service };

        caller.move_to(1, 3, 1, "s1").await.unwrap();

        // B=1, C=2, A=3, D=4
        assert_eq!(
            ranks(&store, &[2, 3, 1, 4]),
            vec![Some(1), Some(2), Some(3), Some(4)]
        );
    }

    // =============================================================================
    // LIFECYCLE
    // =============================================================================

    #[tokio::test]
    async fn test_empty_season_starts_at_one() {
        let (store, service) = service(Vec::new());
        let caller = Caller { store: &store, service: &service };

        assert_eq!(service.max_order(&season("s1")).await.unwrap(), 0);
        assert_eq!(caller.insert(1, "s1").await.unwrap(), 1);
        assert_eq!(caller.insert(2, "s1").await.unwrap(), 2);
        assert_eq!(service.max_order(&season("s1")).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_mixed_operations_stay_dense() {
        let (store, service) = service(Vec::new());
        let caller = Caller { store: &store, service: &service };
        let crops = season("s1");

        for n in 1..=6 {
            caller.insert(n, "s1").await.unwrap();
        }
        caller.move_to(6, 1, 6, "s1").await.unwrap();
        assert!(service.inspect(&crops).await.unwrap().is_dense());

        caller.delete(3, 4, "s1").await.unwrap();
        assert!(service.inspect(&crops).await.unwrap().is_dense());

        caller.move_to(1, 5, 2, "s1").await.unwrap();
        assert!(service.inspect(&crops).await.unwrap().is_dense());

        caller.insert(7, "s1").await.unwrap();
        let order: Vec<_> = sequence(&store, "s1").into_iter().map(|(_, r)| r).collect();
        assert_eq!(order, vec![1, 2, 3, 4, 5, 6]);

        // 6, 2, 4, 5, 1 (3 deleted), then 7 appended
        let ids: Vec<_> = sequence(&store, "s1").into_iter().map(|(id, _)| id).collect();
        let expected: Vec<_> = [6, 2, 4, 5, 1, 7].into_iter().map(object_id).collect();
        assert_eq!(ids, expected);
    }

    #[tokio::test]
    async fn test_noop_move_writes_nothing() {
        let (store, service) = service(ranked_season("s1", 1, 3));

        let outcome = service
            .move_item(&object_id(2), Rank::new(2).unwrap(), 2, &season("s1"))
            .await
            .unwrap();

        assert_eq!(outcome.message(), "Order is same as before");
        assert_eq!(store.write_count(), 0);
    }

    #[tokio::test]
    async fn test_out_of_bounds_move_writes_nothing() {
        let (store, service) = service(ranked_season("s1", 1, 3));

        let err = service
            .move_item(&object_id(1), Rank::new(4).unwrap(), 1, &season("s1"))
            .await
            .unwrap_err();

        assert!(matches!(err, OrderError::Bounds { requested: 4, max: 3 }));
        assert_eq!(err.to_string(), "Order can not be greater than max order :3");
        assert_eq!(store.write_count(), 0);
    }

    // =============================================================================
    // PARTITION SCOPING
    // =============================================================================

    #[tokio::test]
    async fn test_other_season_is_never_touched() {
        let mut documents = ranked_season("s1", 1, 4);
        documents.extend(ranked_season("s2", 100, 4));
        let (store, service) = service(documents);
        let caller = Caller { store: &store, service: &service };
        let before = sequence(&store, "s2");

        caller.move_to(4, 1, 4, "s1").await.unwrap();
        caller.delete(2, 3, "s1").await.unwrap();
        service.reorder_all(&season("s1")).await.unwrap();

        assert_eq!(sequence(&store, "s2"), before);
        assert_eq!(service.max_order(&season("s2")).await.unwrap(), 4);
        assert_eq!(service.max_order(&season("s1")).await.unwrap(), 3);
    }

    // =============================================================================
    // REPAIR
    // =============================================================================

    #[tokio::test]
    async fn test_reorder_repairs_damaged_season() {
        let (store, service) = service(vec![
            crop(1, "s1", 3),
            crop(2, "s1", 7),
            crop(3, "s1", 7),
            Document::new(object_id(4)).with("season", "s1"),
        ]);
        let crops = season("s1");

        let health = service.inspect(&crops).await.unwrap();
        assert_eq!(health.total, 4);
        assert_eq!(health.unranked, 1);
        assert_eq!(health.duplicates, vec![7]);
        assert_eq!(health.gaps, vec![1..=2, 4..=6]);
        assert!(!health.is_dense());

        let report = service.reorder_all(&crops).await.unwrap();
        assert_eq!(report.total, 4);

        // Unranked first, then by rank, ties in insertion order
        assert_eq!(
            ranks(&store, &[4, 1, 2, 3]),
            vec![Some(1), Some(2), Some(3), Some(4)]
        );
        assert!(service.inspect(&crops).await.unwrap().is_dense());

        let again = service.reorder_all(&crops).await.unwrap();
        assert_eq!(again.rewritten, 0);
    }
}
