//! Registry consistency under parallel register/unregister

use std::collections::HashSet;
use std::sync::Arc;

use pretty_assertions::assert_eq;
use rand::Rng;
use social_fanout::domain::{ConnectionId, UserId};
use social_fanout::presentation::websocket::{Connection, ConnectionRegistry};

const WORKERS: usize = 8;
const CONNECTIONS_PER_WORKER: usize = 64;

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_connections_for_matches_replayed_operations() {
    let registry = Arc::new(ConnectionRegistry::new());

    let workers: Vec<_> = (0..WORKERS)
        .map(|worker| {
            let registry = registry.clone();
            tokio::spawn(async move {
                let removals: Vec<bool> = {
                    let mut rng = rand::rng();
                    (0..CONNECTIONS_PER_WORKER)
                        .map(|_| rng.random_bool(0.5))
                        .collect()
                };

                let mut survivors = Vec::new();
                for (i, remove) in removals.into_iter().enumerate() {
                    let session = format!("w{}-{}", worker, i);
                    let connection = Arc::new(Connection::new(UserId(1), session.into(), 4));
                    registry.register(connection.clone());
                    tokio::task::yield_now().await;
                    if remove {
                        registry.unregister(&connection);
                        // Removing twice must not disturb anyone else's entry.
                        registry.unregister(&connection);
                    } else {
                        survivors.push(connection.id());
                    }
                }
                survivors
            })
        })
        .collect();

    let mut expected: HashSet<ConnectionId> = HashSet::new();
    for worker in workers {
        expected.extend(worker.await.unwrap());
    }

    let actual: Vec<ConnectionId> = registry
        .connections_for(UserId(1))
        .iter()
        .map(|connection| connection.id())
        .collect();
    let unique: HashSet<ConnectionId> = actual.iter().copied().collect();

    assert_eq!(actual.len(), unique.len(), "duplicate registry entries");
    assert_eq!(unique, expected);
    assert_eq!(registry.session_count_for(UserId(1)), expected.len());
    assert_eq!(registry.is_online(UserId(1)), !expected.is_empty());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_parallel_users_are_independent() {
    let registry = Arc::new(ConnectionRegistry::new());

    let workers: Vec<_> = (0..WORKERS as i64)
        .map(|user| {
            let registry = registry.clone();
            tokio::spawn(async move {
                let connections: Vec<_> = (0..CONNECTIONS_PER_WORKER)
                    .map(|i| Arc::new(Connection::new(UserId(user), format!("s{}", i).into(), 4)))
                    .collect();
                for connection in &connections {
                    registry.register(connection.clone());
                }
                // Drop every connection except the last.
                for connection in &connections[..CONNECTIONS_PER_WORKER - 1] {
                    registry.unregister(connection);
                    tokio::task::yield_now().await;
                }
                connections[CONNECTIONS_PER_WORKER - 1].id()
            })
        })
        .collect();

    for (user, worker) in workers.into_iter().enumerate() {
        let survivor = worker.await.unwrap();
        let ids: Vec<_> = registry
            .connections_for(UserId(user as i64))
            .iter()
            .map(|connection| connection.id())
            .collect();
        assert_eq!(ids, vec![survivor]);
    }
    assert_eq!(registry.user_count(), WORKERS);
    assert_eq!(registry.connection_count(), WORKERS);
}
