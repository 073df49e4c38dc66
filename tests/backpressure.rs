//! Backpressure behaviour of the backend call pool under load.

use std::time::Duration;

use serde_json::Value;

mod common;

async fn slow_backend(delay: Duration) -> std::net::SocketAddr {
    common::start_programmable_backend(move |path| async move {
        if path.starts_with("/actuator/health") {
            return (200, r#"{"status":"UP"}"#.to_string());
        }
        tokio::time::sleep(delay).await;
        (200, "{}".to_string())
    })
    .await
}

#[tokio::test]
async fn test_saturated_pool_returns_503() {
    let delay = Duration::from_millis(800);
    let mut config = common::config_for(
        slow_backend(delay).await,
        slow_backend(delay).await,
        slow_backend(delay).await,
    );
    // One composite request occupies all three slots.
    config.pool.max_concurrency = 3;
    config.pool.max_queue_depth = 0;
    let service = common::start_composite(config).await;
    let client = common::client();

    let first = {
        let client = client.clone();
        let url = service.url("/product-composite/1");
        tokio::spawn(async move { client.get(url).send().await.unwrap().status() })
    };
    tokio::time::sleep(Duration::from_millis(200)).await;

    let res = client
        .get(service.url("/product-composite/1"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 503);
    assert_eq!(res.headers()["retry-after"], "1");
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "service temporarily overloaded");

    // Health probes do not go through the pool.
    let health: Value = client
        .get(service.url("/actuator/health"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(health["status"], "UP");

    assert_eq!(first.await.unwrap(), 200);

    tokio::time::timeout(Duration::from_secs(2), service.app.pool.wait_idle())
        .await
        .expect("pool did not drain");
    let res = client
        .get(service.url("/product-composite/1"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 200);

    let stats = service.app.pool.stats();
    assert!(stats.rejected >= 1);
    assert_eq!(stats.running, 0);
}

#[tokio::test]
async fn test_queued_calls_complete() {
    let delay = Duration::from_millis(100);
    let mut config = common::config_for(
        slow_backend(delay).await,
        slow_backend(delay).await,
        slow_backend(delay).await,
    );
    config.pool.max_concurrency = 1;
    config.pool.max_queue_depth = 10;
    let service = common::start_composite(config).await;

    let res = common::client()
        .get(service.url("/product-composite/5"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 200);

    let stats = service.app.pool.stats();
    assert_eq!(stats.rejected, 0);
    assert_eq!(stats.max_concurrency, 1);
}

#[tokio::test]
async fn test_closed_pool_returns_503() {
    let backend = common::start_mock_backend("{}").await;
    let service = common::start_composite(common::config_for(backend, backend, backend)).await;
    service.app.drain().await;

    let res = common::client()
        .get(service.url("/product-composite/1"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 503);

    let stats: Value = common::client()
        .get(service.url("/actuator/pool"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(stats["closed"], true);
}
