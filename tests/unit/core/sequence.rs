//! Unit tests for request sequencing

use std::sync::Arc;
use stocksignal::core::sequence::RequestSequence;

#[test]
fn test_ids_start_at_one_and_increase() {
    let sequence = RequestSequence::new();
    assert_eq!(sequence.latest(), 0);
    assert_eq!(sequence.issue(), 1);
    assert_eq!(sequence.issue(), 2);
    assert_eq!(sequence.latest(), 2);
}

#[tokio::test]
async fn test_ids_are_unique_across_tasks() {
    let sequence = Arc::new(RequestSequence::new());
    let mut handles = Vec::new();
    for _ in 0..8 {
        let sequence = sequence.clone();
        handles.push(tokio::spawn(async move {
            (0..50).map(|_| sequence.issue()).collect::<Vec<_>>()
        }));
    }

    let mut ids = Vec::new();
    for handle in handles {
        ids.extend(handle.await.unwrap());
    }
    ids.sort_unstable();
    ids.dedup();
    assert_eq!(ids.len(), 400);
    assert_eq!(sequence.latest(), 400);
}
