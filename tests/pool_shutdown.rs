mod common;

use std::{sync::atomic::Ordering, time::Duration};

use common::{ConnFactory, Pool};
use genpool::{PoolError, ReleaseError};
use tokio::time;

#[tokio::test]
async fn drains_idle_only() {
    let pool = Pool::new(0, 3, Duration::ZERO, ConnFactory::default())
        .await
        .unwrap();
    let a = pool.acquire().await.unwrap();
    let b = pool.acquire().await.unwrap();
    let held = pool.acquire().await.unwrap();
    pool.release(a).unwrap();
    pool.release(b).unwrap();
    assert_eq!(pool.status().size, 3);

    pool.shutdown().unwrap();
    assert_eq!(pool.status().size, 1);
    assert_eq!(pool.status().idle, 0);
    assert_eq!(pool.factory().closed(), 2);

    let held = match pool.release(held) {
        Err(ReleaseError::Closed(conn)) => conn,
        other => panic!("unexpected release result: {:?}", other),
    };
    assert_eq!(held.id, 2);
    assert_eq!(pool.factory().closed(), 2);

    pool.close(held);
    assert_eq!(pool.status().size, 0);
    assert_eq!(pool.factory().closed(), 3);
}

#[tokio::test]
async fn double_shutdown() {
    let pool = Pool::new(1, 2, Duration::ZERO, ConnFactory::default())
        .await
        .unwrap();
    assert!(pool.shutdown().is_ok());
    assert!(matches!(pool.shutdown(), Err(PoolError::Closed)));
    assert!(pool.is_closed());
}

#[tokio::test]
async fn closed_forever() {
    let pool = Pool::new(0, 2, Duration::ZERO, ConnFactory::default())
        .await
        .unwrap();
    let conn = pool.acquire().await.unwrap();
    pool.shutdown().unwrap();

    for _ in 0..3 {
        assert!(matches!(pool.acquire().await, Err(PoolError::Closed)));
    }
    let err = pool.release(conn).unwrap_err();
    assert!(matches!(err, ReleaseError::Closed(_)));
    assert_eq!(err.to_string(), "pool has been closed");
    assert_eq!(pool.factory().created(), 1);
}

#[tokio::test]
async fn wakes_waiters() {
    let pool = Pool::new(0, 1, Duration::ZERO, ConnFactory::default())
        .await
        .unwrap();
    let _conn = pool.acquire().await.unwrap();

    let waiter = {
        let pool = pool.clone();
        tokio::spawn(async move { pool.acquire().await })
    };
    time::sleep(Duration::from_millis(10)).await;
    assert!(!waiter.is_finished());

    pool.shutdown().unwrap();
    assert!(matches!(waiter.await.unwrap(), Err(PoolError::Closed)));
}

#[tokio::test]
async fn close_errors_are_ignored() {
    let factory = ConnFactory::default();
    factory.fail_close.store(true, Ordering::SeqCst);
    let pool = Pool::new(2, 2, Duration::ZERO, factory).await.unwrap();

    pool.shutdown().unwrap();
    assert_eq!(pool.status().size, 0);
    assert_eq!(pool.factory().closed(), 2);
    assert_eq!(pool.metrics().closed_count(), 2);
}

#[tokio::test]
async fn object_closed_after_shutdown() {
    let pool = Pool::new(0, 1, Duration::ZERO, ConnFactory::default())
        .await
        .unwrap();
    let conn = pool.get().await.unwrap();

    pool.shutdown().unwrap();
    assert_eq!(pool.factory().closed(), 0);

    drop(conn);
    assert_eq!(pool.factory().closed(), 1);
    assert_eq!(pool.status().size, 0);
}

#[tokio::test]
async fn drop_closes_idle() {
    let pool = Pool::new(2, 2, Duration::ZERO, ConnFactory::default())
        .await
        .unwrap();
    let closed = pool.factory().closed_counter();
    let conn = pool.get().await.unwrap();
    assert!(genpool::Object::pool(&conn).is_some());

    drop(pool);
    assert_eq!(closed.load(Ordering::SeqCst), 1);
    assert!(genpool::Object::pool(&conn).is_none());

    drop(conn);
    assert_eq!(closed.load(Ordering::SeqCst), 2);
}
