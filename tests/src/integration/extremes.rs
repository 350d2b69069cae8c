//! # Extreme Ranks
//!
//! Stored ranks anywhere in the `i64` range, including both edges and huge
//! gaps. Every operation must answer promptly and report failure as a value.

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use serde_json::json;
    use tokio::time::timeout;

    use crate::fixtures::*;
    use order_maintainer::{OrderError, OrderMaintenanceApi, Rank, RequestHandler};

    const PROMPT: Duration = Duration::from_secs(2);

    #[tokio::test]
    async fn test_inspect_huge_gap_is_prompt() {
        let (_store, service) = service(vec![
            crop(1, "s1", 1),
            crop(2, "s1", 300_000_000),
            crop(3, "s1", i64::MAX),
        ]);

        let health = timeout(PROMPT, service.inspect(&season("s1")))
            .await
            .expect("inspect finished promptly")
            .unwrap();

        assert_eq!(
            health.gaps,
            vec![2..=299_999_999, 300_000_001..=i64::MAX - 1]
        );
        assert_eq!(health.max_rank, i64::MAX);
    }

    #[tokio::test]
    async fn test_reorder_recovers_from_edge_ranks() {
        let (store, service) = service(vec![
            crop(1, "s1", i64::MAX),
            crop(2, "s1", i64::MIN),
            crop(3, "s1", 5),
            crop(4, "s1", i64::MAX),
        ]);

        let err = service
            .move_item(&object_id(1), Rank::new(1).unwrap(), i64::MAX, &season("s1"))
            .await
            .unwrap_err();
        assert!(matches!(err, OrderError::RankOverflow { .. }));
        assert!(err.needs_compaction());

        service.reorder_all(&season("s1")).await.unwrap();
        // Ties at the top keep insertion order
        assert_eq!(
            ranks(&store, &[2, 3, 1, 4]),
            vec![Some(1), Some(2), Some(3), Some(4)]
        );
    }

    #[tokio::test]
    async fn test_handler_reports_edge_failures() {
        let (store, service) = service(vec![
            crop(1, "s1", 1),
            crop(2, "s1", i64::MIN),
            crop(3, "s1", i64::MIN),
            crop(10, "s2", i64::MAX),
        ]);
        let handler = RequestHandler::new(service);
        let before = store.documents();

        let cases = [
            json!({
                "operation": "update_order",
                "_id": object_id(3).as_str(),
                "current_order": 1,
                "past_order": i64::MIN,
                "query_obj": {"season": "s1"},
                "order_field": ORDER,
            }),
            json!({
                "operation": "next_order",
                "query_obj": {"season": "s2"},
                "order_field": ORDER,
            }),
        ];

        for case in cases {
            let response = timeout(PROMPT, handler.handle_value(case.clone()))
                .await
                .expect("handler answered promptly");
            assert!(response.failed, "{case} should fail");
            assert!(response.message.contains("reorder all documents"));
        }
        assert_eq!(store.documents(), before);

        let response = handler
            .handle_value(json!({
                "operation": "inspect",
                "query_obj": {"season": "s2"},
                "order_field": ORDER,
            }))
            .await;
        assert!(!response.failed);
        assert_eq!(
            response.health.map(|h| h.gaps),
            Some(vec![1..=i64::MAX - 1])
        );
    }
}
