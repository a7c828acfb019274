// ABOUTME: Tests for notification persistence
// ABOUTME: Payload survives the round trip and read state is owner-scoped

use crate::kind::NotificationKind;
use crate::storage::NotificationStorage;
use bountyboard_core::{Cents, Currency};
use pretty_assertions::assert_eq;

async fn setup() -> sqlx::SqlitePool {
    bountyboard_storage::connect_in_memory().await.unwrap()
}

fn payment(amount: i64) -> NotificationKind {
    NotificationKind::PaymentReceived {
        request_id: "req-1".to_string(),
        request_title: "Dark mode".to_string(),
        amount_cents: Cents(amount),
        currency: Currency::Cad,
    }
}

#[tokio::test]
async fn test_notify_and_list() {
    let pool = setup().await;
    // The user row only matters for the foreign key.
    sqlx::query("INSERT INTO users (id, name, email) VALUES ('usr-a', 'Alice', 'a@example.com')")
        .execute(&pool)
        .await
        .unwrap();

    let storage = NotificationStorage::new(pool);
    let created = storage.notify("usr-a", &payment(5000)).await.unwrap();
    assert_eq!(created.message, "You received $50.00 CAD for \"Dark mode\"");
    assert_eq!(created.link, "/requests/req-1");
    assert!(!created.is_read);

    let unread = storage.list_for_user("usr-a", true).await.unwrap();
    assert_eq!(unread.len(), 1);
    assert_eq!(unread[0].kind, payment(5000));
}

#[tokio::test]
async fn test_mark_read_is_owner_scoped() {
    let pool = setup().await;
    sqlx::query("INSERT INTO users (id, name, email) VALUES ('usr-a', 'Alice', 'a@example.com')")
        .execute(&pool)
        .await
        .unwrap();
    sqlx::query("INSERT INTO users (id, name, email) VALUES ('usr-b', 'Bob', 'b@example.com')")
        .execute(&pool)
        .await
        .unwrap();

    let storage = NotificationStorage::new(pool);
    let note = storage.notify("usr-a", &payment(100)).await.unwrap();

    // Another user cannot mark it.
    assert!(!storage.mark_read("usr-b", &note.id).await.unwrap());
    assert!(storage.mark_read("usr-a", &note.id).await.unwrap());

    assert!(storage.list_for_user("usr-a", true).await.unwrap().is_empty());
    assert_eq!(storage.list_for_user("usr-a", false).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_mark_all_read() {
    let pool = setup().await;
    sqlx::query("INSERT INTO users (id, name, email) VALUES ('usr-a', 'Alice', 'a@example.com')")
        .execute(&pool)
        .await
        .unwrap();

    let storage = NotificationStorage::new(pool);
    storage.notify("usr-a", &payment(100)).await.unwrap();
    storage.notify("usr-a", &payment(200)).await.unwrap();

    assert_eq!(storage.mark_all_read("usr-a").await.unwrap(), 2);
    assert!(storage.list_for_user("usr-a", true).await.unwrap().is_empty());
}
