use sea_orm::{ConnectionTrait, Database, Statement};

use engine::{
    ApprovalStatus, CategoryState, Engine, EngineError, Identity, NotificationKind, Role, Sender,
};
use migration::MigratorTrait;

async fn engine_with_db() -> Engine {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let backend = db.get_database_backend();
    for (username, role) in [("alice", "user"), ("bob", "user"), ("root", "admin")] {
        db.execute(Statement::from_sql_and_values(
            backend,
            "INSERT INTO users (username, password, role) VALUES (?, ?, ?)",
            vec![username.into(), "password".into(), role.into()],
        ))
        .await
        .unwrap();
    }
    Engine::builder().database(db).build()
}

fn alice() -> Identity {
    Identity::new("alice", Role::User)
}

fn bob() -> Identity {
    Identity::new("bob", Role::User)
}

fn admin() -> Identity {
    Identity::new("root", Role::Admin)
}

#[tokio::test]
async fn non_admin_category_starts_pending() {
    let engine = engine_with_db().await;

    let category = engine
        .create_category(&alice(), "Food", "#ff8800", None)
        .await
        .unwrap();
    assert_eq!(category.state, CategoryState::Pending);

    // Pending categories are invisible to regular users but admins see them.
    let visible = engine.list_categories(&alice()).await.unwrap();
    assert!(visible.is_empty());
    let all = engine.list_categories(&admin()).await.unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].state, CategoryState::Pending);
}

#[tokio::test]
async fn admin_category_is_immediately_active() {
    let engine = engine_with_db().await;

    let category = engine
        .create_category(&admin(), "Transport", "#00cc88", Some("bus"))
        .await
        .unwrap();
    assert_eq!(category.state, CategoryState::Active);

    let visible = engine.list_categories(&alice()).await.unwrap();
    assert_eq!(visible.len(), 1);
    assert_eq!(visible[0].name, "Transport");
}

#[tokio::test]
async fn duplicate_category_name_conflicts() {
    let engine = engine_with_db().await;

    engine
        .create_category(&admin(), "Food", "#ff8800", None)
        .await
        .unwrap();

    let err = engine
        .create_category(&admin(), "Food", "#112233", None)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::ExistingKey(_)));

    // The uniqueness key ignores case and surrounding whitespace.
    let err = engine
        .create_category(&alice(), "  food ", "#112233", None)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::ExistingKey(_)));
}

#[tokio::test]
async fn soft_delete_frees_the_name_and_keeps_the_row() {
    let engine = engine_with_db().await;

    let category = engine
        .create_category(&admin(), "Food", "#ff8800", None)
        .await
        .unwrap();
    engine.soft_delete_category(category.id).await.unwrap();

    let stored = engine.category(category.id).await.unwrap();
    assert_eq!(stored.state, CategoryState::Inactive);

    // Inactive rows don't block re-creation under the same name.
    engine
        .create_category(&admin(), "Food", "#ff8800", None)
        .await
        .unwrap();
}

#[tokio::test]
async fn rename_rechecks_uniqueness_excluding_self() {
    let engine = engine_with_db().await;

    engine
        .create_category(&admin(), "Food", "#ff8800", None)
        .await
        .unwrap();
    let other = engine
        .create_category(&admin(), "Travel", "#0088ff", None)
        .await
        .unwrap();

    let err = engine
        .update_category(other.id, Some("Food"), None, None)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::ExistingKey(_)));

    // Renaming to its own name is not a collision.
    let renamed = engine
        .update_category(other.id, Some("Travel"), None, None)
        .await
        .unwrap();
    assert_eq!(renamed.name, "Travel");
}

#[tokio::test]
async fn category_icon_can_be_cleared() {
    let engine = engine_with_db().await;

    let category = engine
        .create_category(&admin(), "Transport", "#00cc88", Some("bus"))
        .await
        .unwrap();
    assert_eq!(category.icon.as_deref(), Some("bus"));

    let updated = engine
        .update_category(category.id, None, None, Some(None))
        .await
        .unwrap();
    assert_eq!(updated.icon, None);
}

#[tokio::test]
async fn category_create_rejects_bad_input() {
    let engine = engine_with_db().await;

    let err = engine
        .create_category(&admin(), "   ", "#ff8800", None)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Validation(_)));

    let err = engine
        .create_category(&admin(), "Food", "orange", None)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Validation(_)));
}

#[tokio::test]
async fn only_admins_flip_category_state() {
    let engine = engine_with_db().await;

    let category = engine
        .create_category(&alice(), "Food", "#ff8800", None)
        .await
        .unwrap();

    let err = engine
        .set_category_active(&alice(), category.id, true)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Forbidden(_)));

    let activated = engine
        .set_category_active(&admin(), category.id, true)
        .await
        .unwrap();
    assert_eq!(activated.state, CategoryState::Active);

    let visible = engine.list_categories(&alice()).await.unwrap();
    assert_eq!(visible.len(), 1);
}

#[tokio::test]
async fn thread_opens_requested_with_one_user_message() {
    let engine = engine_with_db().await;

    let notification = engine
        .open_notification(&alice(), NotificationKind::Category, "please approve")
        .await
        .unwrap();

    assert_eq!(notification.status, ApprovalStatus::Requested);
    assert_eq!(notification.messages.len(), 1);
    assert_eq!(notification.messages[0].sender, Sender::User);
    assert_eq!(notification.messages[0].body, "please approve");
    assert_eq!(notification.messages[0].seq, 0);
}

#[tokio::test]
async fn admin_resolution_appends_one_admin_message() {
    let engine = engine_with_db().await;

    let notification = engine
        .open_notification(&alice(), NotificationKind::Category, "please approve")
        .await
        .unwrap();

    let resolved = engine
        .resolve_notification(&admin(), notification.id, ApprovalStatus::Approved, "ok")
        .await
        .unwrap();

    assert_eq!(resolved.status, ApprovalStatus::Approved);
    assert_eq!(resolved.messages.len(), 2);
    assert_eq!(resolved.messages[1].sender, Sender::Admin);
    assert_eq!(resolved.messages[1].body, "ok");
}

#[tokio::test]
async fn users_cannot_resolve_threads() {
    let engine = engine_with_db().await;

    let notification = engine
        .open_notification(&alice(), NotificationKind::Expense, "big purchase")
        .await
        .unwrap();

    let err = engine
        .resolve_notification(&alice(), notification.id, ApprovalStatus::Approved, "ok")
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Forbidden(_)));
}

#[tokio::test]
async fn terminal_threads_reject_further_transitions() {
    let engine = engine_with_db().await;

    let notification = engine
        .open_notification(&alice(), NotificationKind::Category, "please approve")
        .await
        .unwrap();
    engine
        .resolve_notification(&admin(), notification.id, ApprovalStatus::Denied, "no")
        .await
        .unwrap();

    let err = engine
        .resolve_notification(&admin(), notification.id, ApprovalStatus::Approved, "retry")
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidState(_)));
}

#[tokio::test]
async fn resolution_requires_a_terminal_status_and_a_note() {
    let engine = engine_with_db().await;

    let notification = engine
        .open_notification(&alice(), NotificationKind::Category, "please approve")
        .await
        .unwrap();

    let err = engine
        .resolve_notification(&admin(), notification.id, ApprovalStatus::Requested, "hm")
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Validation(_)));

    let err = engine
        .resolve_notification(&admin(), notification.id, ApprovalStatus::Approved, "  ")
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Validation(_)));
}

#[tokio::test]
async fn replies_keep_append_order_even_after_resolution() {
    let engine = engine_with_db().await;

    let notification = engine
        .open_notification(&alice(), NotificationKind::Category, "please approve")
        .await
        .unwrap();
    engine
        .add_reply(&admin(), notification.id, "why this category?")
        .await
        .unwrap();
    engine
        .add_reply(&alice(), notification.id, "for groceries")
        .await
        .unwrap();
    engine
        .resolve_notification(&admin(), notification.id, ApprovalStatus::Approved, "ok")
        .await
        .unwrap();

    // Replying after a terminal status is still allowed.
    let thread = engine
        .add_reply(&alice(), notification.id, "thanks!")
        .await
        .unwrap();

    assert_eq!(thread.messages.len(), 5);
    let seqs: Vec<i32> = thread.messages.iter().map(|m| m.seq).collect();
    assert_eq!(seqs, vec![0, 1, 2, 3, 4]);
    let senders: Vec<Sender> = thread.messages.iter().map(|m| m.sender).collect();
    assert_eq!(
        senders,
        vec![
            Sender::User,
            Sender::Admin,
            Sender::User,
            Sender::Admin,
            Sender::User
        ]
    );
}

#[tokio::test]
async fn strangers_cannot_reply() {
    let engine = engine_with_db().await;

    let notification = engine
        .open_notification(&alice(), NotificationKind::Category, "please approve")
        .await
        .unwrap();

    let err = engine
        .add_reply(&bob(), notification.id, "me too")
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Forbidden(_)));
}

#[tokio::test]
async fn listing_scopes_to_owner_unless_admin() {
    let engine = engine_with_db().await;

    engine
        .open_notification(&alice(), NotificationKind::Category, "first")
        .await
        .unwrap();
    engine
        .open_notification(&bob(), NotificationKind::Expense, "second")
        .await
        .unwrap();

    let mine = engine.list_notifications(&alice()).await.unwrap();
    assert_eq!(mine.len(), 1);
    assert_eq!(mine[0].owner, "alice");

    let err = engine.list_all_notifications(&bob()).await.unwrap_err();
    assert!(matches!(err, EngineError::Forbidden(_)));

    let all = engine.list_all_notifications(&admin()).await.unwrap();
    assert_eq!(all.len(), 2);
}
