//! End-to-end cart behaviour through the provider, against both storage
//! backends.

use std::sync::Arc;
use std::time::Duration;

use marketplace_cart::{AppState, CartConfig, CartError, CartProvider};
use marketplace_core::{Cart, CartChange, NewCartItem, CART_STORAGE_KEY};
use marketplace_storage::{Database, DbConfig, KeyValueStore, MemoryStore};

fn item(id: &str, title: &str) -> NewCartItem {
    NewCartItem::new(id, title, format!("https://img/{id}.png"), 4.5)
}

fn ordered_config() -> CartConfig {
    let mut config = CartConfig::default();
    config.persistence.coalesce = false;
    config
}

async fn stored_cart(storage: &dyn KeyValueStore) -> Option<Cart> {
    storage
        .get(CART_STORAGE_KEY)
        .await
        .unwrap()
        .map(|raw| Cart::from_snapshot(&raw).unwrap())
}

fn titles(cart: &Cart) -> Vec<&str> {
    cart.items().iter().map(|i| i.title.as_str()).collect()
}

// =============================================================================
// Cart Rules
// =============================================================================

#[tokio::test]
async fn items_are_ordered_by_title_regardless_of_insertion_order() {
    let provider = CartProvider::mount(Arc::new(MemoryStore::new()), CartConfig::default()).await;
    let cart = provider.handle();

    cart.add_to_cart(item("3", "Cherry"));
    cart.add_to_cart(item("1", "Apple"));
    cart.add_to_cart(item("2", "Banana"));

    assert_eq!(titles(&cart.cart()), vec!["Apple", "Banana", "Cherry"]);
    provider.unmount().await.unwrap();
}

#[tokio::test]
async fn adding_an_existing_id_increments() {
    let provider = CartProvider::mount(Arc::new(MemoryStore::new()), CartConfig::default()).await;
    let cart = provider.handle();

    cart.add_to_cart(item("1", "Apple"));
    assert_eq!(cart.add_to_cart(item("1", "Apple")), CartChange::Incremented(2));

    let products = cart.products();
    assert_eq!(products.len(), 1);
    assert_eq!(products[0].quantity, 2);
    provider.unmount().await.unwrap();
}

#[tokio::test]
async fn decrement_removes_at_one_and_keeps_position_otherwise() {
    let provider = CartProvider::mount(Arc::new(MemoryStore::new()), CartConfig::default()).await;
    let cart = provider.handle();

    cart.add_to_cart(item("1", "Apple"));
    cart.add_to_cart(item("2", "Banana"));
    cart.add_to_cart(item("3", "Cherry"));
    cart.increment("2");
    cart.increment("2");

    assert_eq!(cart.decrement("2"), CartChange::Decremented(2));
    assert_eq!(titles(&cart.cart()), vec!["Apple", "Banana", "Cherry"]);

    assert_eq!(cart.decrement("1"), CartChange::Removed);
    assert_eq!(titles(&cart.cart()), vec!["Banana", "Cherry"]);
    provider.unmount().await.unwrap();
}

#[tokio::test]
async fn unknown_ids_leave_the_cart_unchanged() {
    let provider = CartProvider::mount(Arc::new(MemoryStore::new()), CartConfig::default()).await;
    let cart = provider.handle();

    cart.add_to_cart(item("1", "Apple"));
    let before = cart.cart();

    assert_eq!(cart.increment("nope"), CartChange::Unmatched);
    assert_eq!(cart.decrement("nope"), CartChange::Unmatched);
    assert_eq!(cart.cart(), before);
    provider.unmount().await.unwrap();
}

#[test]
fn cart_outside_a_provider_is_a_configuration_error() {
    let state = AppState::default();
    assert!(matches!(state.use_cart(), Err(CartError::NotProvided)));
}

// =============================================================================
// Persistence
// =============================================================================

#[tokio::test]
async fn storage_matches_memory_after_flush() {
    let storage = Arc::new(MemoryStore::new());
    let provider = CartProvider::mount(storage.clone(), CartConfig::default()).await;
    let cart = provider.handle();

    cart.add_to_cart(item("2", "Banana"));
    cart.add_to_cart(item("1", "Apple"));
    cart.increment("2");
    cart.decrement("1");
    cart.flush().await.unwrap();

    assert_eq!(stored_cart(storage.as_ref()).await, Some(cart.cart()));
    provider.unmount().await.unwrap();
}

#[tokio::test]
async fn slow_writes_never_persist_a_stale_snapshot() {
    let storage = Arc::new(MemoryStore::new());
    storage.set_write_delay(Duration::from_millis(5));
    let provider = CartProvider::mount(storage.clone(), ordered_config()).await;
    let cart = provider.handle();

    // Rapid-fire mutations from several tasks while every write is slow
    let mut tasks = Vec::new();
    for n in 0..8 {
        let cart = cart.clone();
        tasks.push(tokio::spawn(async move {
            let id = (n % 3).to_string();
            cart.add_to_cart(item(&id, &format!("Item {id}")));
            cart.increment(&id);
            if n % 2 == 0 {
                cart.decrement(&id);
            }
        }));
    }
    for task in tasks {
        task.await.unwrap();
    }

    cart.flush().await.unwrap();
    assert_eq!(stored_cart(storage.as_ref()).await, Some(cart.cart()));
    assert_eq!(storage.write_count() as u64, cart.snapshots_queued());
    provider.unmount().await.unwrap();
}

#[tokio::test]
async fn coalesced_writes_still_end_on_the_latest_state() {
    let storage = Arc::new(MemoryStore::new());
    storage.set_write_delay(Duration::from_millis(10));
    let provider = CartProvider::mount(storage.clone(), CartConfig::default()).await;
    let cart = provider.handle();

    for n in 0..20 {
        cart.add_to_cart(item(&n.to_string(), &format!("Item {n:02}")));
    }
    cart.flush().await.unwrap();

    assert_eq!(stored_cart(storage.as_ref()).await, Some(cart.cart()));
    assert!(storage.write_count() <= 20);
    provider.unmount().await.unwrap();
}

#[tokio::test]
async fn unmount_writes_pending_snapshots() {
    let storage = Arc::new(MemoryStore::new());
    storage.set_write_delay(Duration::from_millis(20));
    let provider = CartProvider::mount(storage.clone(), CartConfig::default()).await;

    provider.handle().add_to_cart(item("1", "Apple"));
    provider.unmount().await.unwrap();

    let stored = stored_cart(storage.as_ref()).await.unwrap();
    assert_eq!(stored.item_count(), 1);
}

#[tokio::test]
async fn write_failures_are_not_surfaced() {
    let storage = Arc::new(MemoryStore::new());
    storage.set_fail_writes(true);
    let provider = CartProvider::mount(storage.clone(), CartConfig::default()).await;
    let cart = provider.handle();

    assert_eq!(cart.add_to_cart(item("1", "Apple")), CartChange::Inserted);
    cart.flush().await.unwrap();

    assert_eq!(cart.products().len(), 1);
    assert_eq!(storage.get(CART_STORAGE_KEY).await.unwrap(), None);
    provider.unmount().await.unwrap();
}

#[tokio::test]
async fn unmatched_mutations_skip_writes_when_configured() {
    let storage = Arc::new(MemoryStore::new());
    let mut config = ordered_config();
    config.persistence.persist_unchanged = false;
    let provider = CartProvider::mount(storage.clone(), config).await;
    let cart = provider.handle();

    cart.increment("ghost");
    cart.decrement("ghost");
    cart.flush().await.unwrap();

    assert_eq!(storage.write_count(), 0);
    provider.unmount().await.unwrap();
}

// =============================================================================
// Loading
// =============================================================================

#[tokio::test]
async fn loads_and_resorts_a_stored_snapshot() {
    let snapshot = r#"[
        {"id":"2","title":"Banana","imageUrl":"b","price":2.0,"quantity":1},
        {"id":"1","title":"Apple","image_url":"a","price":1.0,"quantity":4}
    ]"#;
    let storage = Arc::new(MemoryStore::with_entry(CART_STORAGE_KEY, snapshot));
    let provider = CartProvider::mount(storage.clone(), CartConfig::default()).await;
    let cart = provider.handle();

    assert!(cart.is_loaded());
    assert_eq!(titles(&cart.cart()), vec!["Apple", "Banana"]);
    assert_eq!(cart.products()[0].quantity, 4);
    assert_eq!(storage.write_count(), 0);
    provider.unmount().await.unwrap();
}

#[tokio::test]
async fn unreadable_snapshots_start_empty() {
    let bad = [
        "not json",
        r#"{"id":"1"}"#,
        r#"[{"id":"1","title":"A","image_url":"a","price":1.0,"quantity":0}]"#,
        r#"[{"id":"1","title":"A","image_url":"a","price":1.0,"quantity":1},
            {"id":"1","title":"B","image_url":"b","price":1.0,"quantity":1}]"#,
    ];

    for snapshot in bad {
        let storage = Arc::new(MemoryStore::with_entry(CART_STORAGE_KEY, snapshot));
        let provider = CartProvider::mount(storage, CartConfig::default()).await;

        assert!(provider.handle().is_loaded(), "{snapshot}");
        assert!(provider.handle().products().is_empty(), "{snapshot}");
        provider.unmount().await.unwrap();
    }
}

#[tokio::test]
async fn read_failure_starts_empty() {
    let storage = Arc::new(MemoryStore::with_entry(CART_STORAGE_KEY, "[]"));
    storage.set_fail_reads(true);
    let provider = CartProvider::mount(storage, CartConfig::default()).await;

    assert!(provider.handle().is_loaded());
    assert!(provider.handle().products().is_empty());
    provider.unmount().await.unwrap();
}

#[tokio::test]
async fn custom_storage_key_is_used() {
    let storage = Arc::new(MemoryStore::new());
    let mut config = CartConfig::default();
    config.storage.key = "@Test:cart".to_string();
    let provider = CartProvider::mount(storage.clone(), config).await;

    provider.handle().add_to_cart(item("1", "Apple"));
    provider.unmount().await.unwrap();

    assert!(storage.get("@Test:cart").await.unwrap().is_some());
    assert_eq!(storage.get(CART_STORAGE_KEY).await.unwrap(), None);
}

#[tokio::test]
async fn cart_with_empty_id_survives_remount() {
    let storage = Arc::new(MemoryStore::new());

    let provider = CartProvider::mount(storage.clone(), CartConfig::default()).await;
    let cart = provider.handle();
    cart.add_to_cart(NewCartItem::new("", "Apple", "a", 1.0));
    cart.add_to_cart(item("2", "Banana"));
    cart.increment("");
    let before = cart.cart();
    provider.unmount().await.unwrap();

    let provider = CartProvider::mount(storage, CartConfig::default()).await;
    assert_eq!(provider.handle().cart(), before);
    assert_eq!(provider.handle().cart().get("").map(|i| i.quantity), Some(2));
    provider.unmount().await.unwrap();
}

// =============================================================================
// SQLite
// =============================================================================

#[tokio::test]
async fn sqlite_round_trip() {
    let db = Arc::new(Database::in_memory().await.unwrap());
    let provider = CartProvider::mount(db.clone(), CartConfig::default()).await;
    let cart = provider.handle();

    cart.add_to_cart(item("2", "Banana"));
    cart.add_to_cart(item("1", "Apple"));
    cart.increment("1");
    cart.flush().await.unwrap();

    assert_eq!(stored_cart(db.as_ref()).await, Some(cart.cart()));
    provider.unmount().await.unwrap();
}

#[tokio::test]
async fn sqlite_cart_survives_remount() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("gomarketplace.db");

    {
        let db = Arc::new(Database::new(DbConfig::new(&path)).await.unwrap());
        let provider = CartProvider::mount(db.clone(), CartConfig::default()).await;
        provider.handle().add_to_cart(item("1", "Apple"));
        provider.handle().add_to_cart(item("1", "Apple"));
        provider.unmount().await.unwrap();
        db.close().await;
    }

    let db = Arc::new(Database::new(DbConfig::new(&path)).await.unwrap());
    let provider = CartProvider::mount(db.clone(), CartConfig::default()).await;

    let products = provider.handle().products();
    assert_eq!(products.len(), 1);
    assert_eq!(products[0].quantity, 2);

    provider.unmount().await.unwrap();
    db.close().await;
}
