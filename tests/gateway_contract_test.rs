//! 网关与驱动之间的契约测试（使用内存驱动）

use rat_mongogate::*;
use std::sync::Arc;
use tokio_test::{assert_err, assert_ok};

fn test_config() -> GatewayConfig {
    GatewayConfig::builder()
        .scheme(UriScheme::Standard)
        .host("localhost:27017")
        .database("kitchen")
        .app_name("contract-test")
        .filter_field("mealId")
        .build()
        .expect("测试配置无效")
}

fn memory_gateway() -> (MongoGateway, Arc<MemoryConnector>, Arc<MemoryStore>) {
    rat_mongogate::init();
    let connector = Arc::new(MemoryConnector::new());
    let store = connector.store();
    let gateway = MongoGateway::with_connector(test_config(), connector.clone());
    (gateway, connector, store)
}

async fn connected_gateway() -> (MongoGateway, Arc<MemoryConnector>, Arc<MemoryStore>) {
    let (gateway, connector, store) = memory_gateway();
    assert_ok!(gateway.connect().await);
    (gateway, connector, store)
}

#[tokio::test]
async fn test_create_inserts_once_and_returns_ack() {
    let (gateway, _, store) = connected_gateway().await;

    let ack = assert_ok!(gateway.create("meals", doc! { "_id": "m-1", "name": "soup" }).await);
    assert_eq!(ack.inserted_id, Bson::String("m-1".to_string()));
    assert_eq!(ack.id_string(), "m-1");

    let inserts: Vec<RecordedCall> = store
        .calls()
        .into_iter()
        .filter(|c| matches!(c, RecordedCall::Insert { .. }))
        .collect();
    assert_eq!(
        inserts,
        vec![RecordedCall::Insert {
            collection: "meals".to_string(),
            document: doc! { "_id": "m-1", "name": "soup" },
        }]
    );
}

#[tokio::test]
async fn test_create_returns_driver_assigned_id() {
    let (gateway, _, store) = connected_gateway().await;

    let ack = assert_ok!(gateway.create("meals", doc! { "name": "salad" }).await);
    assert!(matches!(ack.inserted_id, Bson::ObjectId(_)));
    assert_eq!(store.documents("meals")[0].get("_id"), Some(&ack.inserted_id));
}

#[tokio::test]
async fn test_create_from_serializable_value() {
    #[derive(serde::Serialize)]
    struct Meal {
        #[serde(rename = "mealId")]
        meal_id: String,
        calories: i32,
    }

    let (gateway, _, store) = connected_gateway().await;
    let meal = Meal { meal_id: "m-9".to_string(), calories: 420 };

    assert_ok!(gateway.create_from("meals", &meal).await);
    let stored = &store.documents("meals")[0];
    assert_eq!(stored.get_str("mealId").unwrap(), "m-9");
    assert_eq!(stored.get_i32("calories").unwrap(), 420);
}

#[tokio::test]
async fn test_find_without_value_uses_empty_filter() {
    let (gateway, _, store) = connected_gateway().await;

    assert_ok!(gateway.find("meals", None).await);
    assert_eq!(
        store.calls().last(),
        Some(&RecordedCall::Find {
            collection: "meals".to_string(),
            filter: doc! {},
        })
    );
}

#[tokio::test]
async fn test_find_with_value_uses_filter_field() {
    let (gateway, _, store) = connected_gateway().await;

    assert_ok!(gateway.find("meals", Some("x".into())).await);
    assert_eq!(
        store.calls().last(),
        Some(&RecordedCall::Find {
            collection: "meals".to_string(),
            filter: doc! { "mealId": "x" },
        })
    );
}

#[tokio::test]
async fn test_find_cursor_and_first_and_all() {
    use futures::TryStreamExt;

    let (gateway, _, store) = connected_gateway().await;
    store.seed(
        "meals",
        vec![
            doc! { "mealId": "m1", "name": "soup" },
            doc! { "mealId": "m2", "name": "salad" },
            doc! { "mealId": "m1", "name": "stew" },
        ],
    );

    let cursor = assert_ok!(gateway.find("meals", Some("m1".into())).await);
    let names: Vec<String> = cursor
        .map_ok(|d| d.get_str("name").unwrap_or_default().to_string())
        .try_collect()
        .await
        .unwrap();
    assert_eq!(names, vec!["soup", "stew"]);

    let first = assert_ok!(gateway.find_first("meals", Some("m2".into())).await);
    assert_eq!(first.unwrap().get_str("name").unwrap(), "salad");

    let missing = assert_ok!(gateway.find_first("meals", Some("m404".into())).await);
    assert!(missing.is_none());

    let all = assert_ok!(gateway.find_all("meals", None).await);
    assert_eq!(all.len(), 3);
}

#[tokio::test]
async fn test_update_merges_fields() {
    let (gateway, _, store) = connected_gateway().await;
    store.seed("meals", vec![doc! { "mealId": "m1", "name": "soup", "price": 5 }]);

    let ack = assert_ok!(gateway.update("meals", "m1".into(), doc! { "price": 7 }).await);
    assert_eq!(ack, UpdateAck { matched_count: 1, modified_count: 1 });

    assert_eq!(
        store.calls().last(),
        Some(&RecordedCall::Update {
            collection: "meals".to_string(),
            filter: doc! { "mealId": "m1" },
            update: doc! { "$set": { "price": 7 } },
        })
    );

    let stored = &store.documents("meals")[0];
    assert_eq!(stored.get_str("name").unwrap(), "soup");
    assert_eq!(stored.get_i32("price").unwrap(), 7);
}

#[tokio::test]
async fn test_update_only_touches_first_match() {
    let (gateway, _, store) = connected_gateway().await;
    store.seed(
        "meals",
        vec![doc! { "mealId": "dup", "n": 1 }, doc! { "mealId": "dup", "n": 2 }],
    );

    assert_ok!(gateway.update("meals", "dup".into(), doc! { "flag": true }).await);

    let docs = store.documents("meals");
    assert_eq!(docs[0].get_bool("flag").unwrap(), true);
    assert!(docs[1].get("flag").is_none());
}

#[tokio::test]
async fn test_update_rejects_empty_data() {
    let (gateway, _, store) = connected_gateway().await;

    let err = assert_err!(gateway.update("meals", "m1".into(), doc! {}).await);
    assert!(matches!(err, GatewayError::ValidationError { .. }));
    assert!(!store.calls().iter().any(|c| matches!(c, RecordedCall::Update { .. })));
}

#[tokio::test]
async fn test_driver_failure_is_logged_and_recorded() {
    let (gateway, _, store) = connected_gateway().await;
    store.fail_with("boom");

    let err = assert_err!(gateway.create("meals", doc! { "name": "x" }).await);
    assert!(matches!(err, GatewayError::QueryError { ref message } if message == "boom"));

    assert_eq!(gateway.failure_count(), 1);
    let record = gateway.last_error().expect("失败应被记录");
    assert_eq!(record.operation, "create");
    assert_eq!(record.collection.as_deref(), Some("meals"));
    assert_eq!(record.kind, "query");

    assert_err!(gateway.find_first("meals", None).await);
    assert_eq!(gateway.failure_count(), 2);
    assert_eq!(gateway.last_error().unwrap().operation, "find");

    store.clear_failure();
    assert_ok!(gateway.create("meals", doc! { "name": "y" }).await);
    assert_eq!(gateway.failure_count(), 2);
}

#[tokio::test]
async fn test_invalid_collection_never_reaches_driver() {
    let (gateway, _, store) = connected_gateway().await;

    let err = assert_err!(gateway.create("$cmd", doc! { "a": 1 }).await);
    assert!(matches!(err, GatewayError::ValidationError { .. }));
    assert!(matches!(
        gateway.find("system.users", None).await.err(),
        Some(GatewayError::ValidationError { .. })
    ));
    assert!(store.calls().is_empty());
}

#[tokio::test]
async fn test_operations_before_connect_fail_with_not_connected() {
    let (gateway, _, store) = memory_gateway();

    assert!(!gateway.is_connected().await);
    let err = assert_err!(gateway.create("meals", doc! { "a": 1 }).await);
    assert!(matches!(err, GatewayError::NotConnected));
    assert!(matches!(gateway.find("meals", None).await.err(), Some(GatewayError::NotConnected)));
    assert!(matches!(
        assert_err!(gateway.update("meals", "k".into(), doc! { "a": 1 }).await),
        GatewayError::NotConnected
    ));
    assert!(store.calls().is_empty());
}

#[tokio::test]
async fn test_close_after_connect_marks_driver_closed() {
    let (gateway, _, store) = connected_gateway().await;

    assert_ok!(gateway.close().await);
    assert!(store.is_closed());
    assert!(!gateway.is_connected().await);

    let err = assert_err!(gateway.create("meals", doc! { "a": 1 }).await);
    assert!(matches!(err, GatewayError::NotConnected));
    assert_eq!(store.calls(), vec![RecordedCall::Close]);
}

#[tokio::test]
async fn test_close_without_connect_is_ok() {
    let (gateway, _, store) = memory_gateway();

    assert_ok!(gateway.close().await);
    assert_ok!(gateway.close().await);
    assert!(store.calls().is_empty());
    assert_eq!(gateway.failure_count(), 0);
}

#[tokio::test]
async fn test_close_failure_is_reported() {
    let (gateway, _, store) = connected_gateway().await;
    store.fail_with("socket reset");

    let err = assert_err!(gateway.close().await);
    assert!(matches!(err, GatewayError::ConnectionError { .. }));
    assert_eq!(gateway.last_error().unwrap().operation, "close");

    // 关闭失败后句柄仍保留，可以再次关闭
    assert!(gateway.is_connected().await);
    assert!(!store.is_closed());

    store.clear_failure();
    assert_ok!(gateway.close().await);
    assert!(store.is_closed());
    assert!(!gateway.is_connected().await);
    assert_eq!(
        store.calls().iter().filter(|c| **c == RecordedCall::Close).count(),
        2
    );
}

#[tokio::test]
async fn test_close_with_open_cursor_completes() {
    let (gateway, _, store) = connected_gateway().await;
    store.seed("meals", vec![doc! { "mealId": "m1" }]);

    let cursor = assert_ok!(gateway.find("meals", None).await);
    let closed = tokio::time::timeout(std::time::Duration::from_secs(5), gateway.close()).await;
    assert!(closed.is_ok(), "持有游标时close不应阻塞");
    assert_ok!(closed.unwrap());
    drop(cursor);
}

#[tokio::test]
async fn test_numeric_filter_matches_across_integer_types() {
    let (gateway, _, store) = connected_gateway().await;
    store.seed("meals", vec![doc! { "mealId": 7_i64, "name": "soup" }]);

    let found = assert_ok!(gateway.find_first("meals", Some(Bson::Int32(7))).await);
    assert_eq!(found.unwrap().get_str("name").unwrap(), "soup");

    let found = assert_ok!(gateway.find_first("meals", Some(Bson::Double(7.0))).await);
    assert!(found.is_some());

    let ack = assert_ok!(gateway.update("meals", Bson::Int32(7), doc! { "price": 3 }).await);
    assert_eq!(ack.matched_count, 1);

    let missing = assert_ok!(gateway.find_first("meals", Some(Bson::String("7".into()))).await);
    assert!(missing.is_none());
}

#[tokio::test]
async fn test_connect_twice_opens_once() {
    let (gateway, connector, _) = memory_gateway();

    assert_ok!(gateway.connect().await);
    assert_ok!(gateway.connect().await);
    assert_eq!(connector.open_count(), 1);
}

#[tokio::test]
async fn test_failed_connect_leaves_gateway_disconnected() {
    let (gateway, connector, _) = memory_gateway();
    connector.refuse_connections(Some("dns lookup failed".to_string()));

    let err = assert_err!(gateway.connect().await);
    assert!(matches!(err, GatewayError::ConnectionError { .. }));
    assert!(!gateway.is_connected().await);
    assert_eq!(gateway.last_error().unwrap().operation, "connect");

    connector.refuse_connections(None);
    assert_ok!(gateway.connect().await);
    assert!(gateway.is_connected().await);
}

#[tokio::test]
async fn test_reconnect_after_close() {
    let (gateway, connector, store) = connected_gateway().await;

    assert_ok!(gateway.close().await);
    assert_ok!(gateway.connect().await);
    assert!(!store.is_closed());
    assert_eq!(connector.open_count(), 2);
    assert_ok!(gateway.ping().await);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_creates_share_one_connection() {
    let (gateway, connector, store) = connected_gateway().await;
    let gateway = Arc::new(gateway);

    let mut handles = Vec::new();
    for i in 0..20 {
        let gateway = gateway.clone();
        handles.push(tokio::spawn(async move {
            gateway.create("meals", doc! { "mealId": format!("m{}", i) }).await
        }));
    }

    for handle in handles {
        assert_ok!(handle.await.unwrap());
    }

    assert_eq!(store.documents("meals").len(), 20);
    assert_eq!(connector.open_count(), 1);
}
