use pretty_assertions::assert_eq;
use request_history::{HistoryStore, NewAnswer};

#[tokio::test]
async fn rows_survive_reopening_the_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("history.db");

    {
        let store = HistoryStore::open(&path).unwrap();
        store
            .record_exchange(
                "persist me",
                vec![
                    NewAnswer::new("a", "one", 1.0),
                    NewAnswer::new("b", "two", 2.0),
                    NewAnswer::new("judge", "merged", 3.0),
                ],
            )
            .await
            .unwrap();
    }

    let reopened = HistoryStore::open(&path).unwrap();
    assert_eq!(reopened.count().await.unwrap(), 3);

    let newest = &reopened.recent(1).await.unwrap()[0];
    assert_eq!(newest.model_name, "judge");
    assert_eq!(newest.question, "persist me");
    assert_eq!(newest.timestamp.len(), "2025-01-01 00:00:00".len());
}

#[tokio::test]
async fn concurrent_writers_share_one_handle() {
    let dir = tempfile::tempdir().unwrap();
    let store = HistoryStore::open(dir.path().join("history.db")).unwrap();

    let mut tasks = Vec::new();
    for i in 0..8 {
        let store = store.clone();
        tasks.push(tokio::spawn(async move {
            store
                .record_exchange(
                    &format!("q{i}"),
                    vec![
                        NewAnswer::new("a", "x", 1.0),
                        NewAnswer::new("b", "y", 1.0),
                        NewAnswer::new("judge", "z", 0.1),
                    ],
                )
                .await
        }));
    }
    for t in tasks {
        t.await.unwrap().unwrap();
    }

    let stats = store.stats().await.unwrap();
    assert_eq!(stats.total_requests, 24);
    assert!(stats.models.iter().all(|m| m.request_count == 8));
}
