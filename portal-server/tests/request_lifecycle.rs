//! Request lifecycle integration tests: creation, staff transitions,
//! claiming and the change notifier side effects.

mod common;

use rust_decimal::Decimal;

use common::{client, staff, test_pool};

use portal_server::db::repository::notification;
use portal_server::notify::ChangeNotifier;
use portal_server::requests;
use portal_server::utils::AppError;
use shared::models::{RequestStatus, ServiceRequest, ServiceRequestCreate, ServiceRequestPatch};

async fn new_request(
    pool: &sqlx::SqlitePool,
    notifier: &ChangeNotifier,
    owner: i64,
) -> ServiceRequest {
    requests::create_request(
        pool,
        notifier,
        &client(owner),
        ServiceRequestCreate { service_id: 1 },
    )
    .await
    .expect("Failed to create request")
}

fn patch(status: RequestStatus) -> ServiceRequestPatch {
    ServiceRequestPatch {
        status: Some(status),
        ..Default::default()
    }
}

#[tokio::test]
async fn new_requests_start_pending_at_zero_progress() {
    let pool = test_pool().await;
    let notifier = ChangeNotifier::new();

    let request = new_request(&pool, &notifier, 42).await;
    assert_eq!(request.status, RequestStatus::Pending);
    assert_eq!(request.progress, 0);
    assert_eq!(request.owner_id, 42);
    assert!(request.amount.is_none());
}

#[tokio::test]
async fn unknown_service_is_rejected() {
    let pool = test_pool().await;
    let notifier = ChangeNotifier::new();

    let err = requests::create_request(
        &pool,
        &notifier,
        &client(42),
        ServiceRequestCreate { service_id: 9999 },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}

#[tokio::test]
async fn staff_walks_a_request_to_completed() {
    let pool = test_pool().await;
    let notifier = ChangeNotifier::new();
    let request = new_request(&pool, &notifier, 42).await;

    let updated = requests::transition(
        &pool,
        &notifier,
        request.id,
        &staff(7),
        patch(RequestStatus::InProgress),
    )
    .await
    .unwrap();
    assert_eq!(updated.status, RequestStatus::InProgress);

    let updated = requests::transition(
        &pool,
        &notifier,
        request.id,
        &staff(7),
        ServiceRequestPatch {
            progress: Some(60),
            notes: Some("Draft filed".to_string()),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(updated.progress, 60);
    assert_eq!(updated.notes.as_deref(), Some("Draft filed"));

    let updated = requests::transition(
        &pool,
        &notifier,
        request.id,
        &staff(7),
        ServiceRequestPatch {
            status: Some(RequestStatus::Completed),
            amount: Some(Decimal::from(5000)),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(updated.status, RequestStatus::Completed);
    assert_eq!(updated.progress, 100);
    assert_eq!(updated.amount, Some(Decimal::from(5000)));
}

#[tokio::test]
async fn completing_without_an_amount_is_rejected() {
    let pool = test_pool().await;
    let notifier = ChangeNotifier::new();
    let request = new_request(&pool, &notifier, 42).await;

    requests::transition(
        &pool,
        &notifier,
        request.id,
        &staff(7),
        patch(RequestStatus::InProgress),
    )
    .await
    .unwrap();

    let err = requests::transition(
        &pool,
        &notifier,
        request.id,
        &staff(7),
        patch(RequestStatus::Completed),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::MissingAmount));
}

#[tokio::test]
async fn clients_cannot_update_requests() {
    let pool = test_pool().await;
    let notifier = ChangeNotifier::new();
    let request = new_request(&pool, &notifier, 42).await;

    let err = requests::transition(
        &pool,
        &notifier,
        request.id,
        &client(42),
        patch(RequestStatus::InProgress),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)));
}

#[tokio::test]
async fn owners_see_only_their_own_requests() {
    let pool = test_pool().await;
    let notifier = ChangeNotifier::new();
    let request = new_request(&pool, &notifier, 42).await;
    new_request(&pool, &notifier, 43).await;

    let err = requests::get_request(&pool, &client(43), request.id)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)));

    let own = requests::list_own(&pool, &client(42)).await.unwrap();
    assert_eq!(own.len(), 1);
    assert_eq!(own[0].id, request.id);

    let all = requests::list_all(&pool).await.unwrap();
    assert_eq!(all.len(), 2);
}

#[tokio::test]
async fn first_claim_wins() {
    let pool = test_pool().await;
    let notifier = ChangeNotifier::new();
    let request = new_request(&pool, &notifier, 42).await;

    let claimed = requests::claim(&pool, request.id, &staff(7)).await.unwrap();
    assert_eq!(claimed.assigned_staff_id, Some(7));

    let err = requests::claim(&pool, request.id, &staff(8))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));

    // Still assigned to the winner
    let current = requests::get_request(&pool, &staff(8), request.id)
        .await
        .unwrap();
    assert_eq!(current.assigned_staff_id, Some(7));
}

#[tokio::test]
async fn cancelled_requests_are_frozen() {
    let pool = test_pool().await;
    let notifier = ChangeNotifier::new();
    let request = new_request(&pool, &notifier, 42).await;

    requests::transition(
        &pool,
        &notifier,
        request.id,
        &staff(7),
        patch(RequestStatus::Cancelled),
    )
    .await
    .unwrap();

    let err = requests::transition(
        &pool,
        &notifier,
        request.id,
        &staff(7),
        patch(RequestStatus::InProgress),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::InvalidTransition { .. }));

    let err = requests::claim(&pool, request.id, &staff(7))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));
}

#[tokio::test]
async fn transitions_notify_the_owner() {
    let pool = test_pool().await;
    let notifier = ChangeNotifier::new();
    let mut rx = notifier.subscribe();

    let request = new_request(&pool, &notifier, 42).await;
    requests::transition(
        &pool,
        &notifier,
        request.id,
        &staff(7),
        patch(RequestStatus::InProgress),
    )
    .await
    .unwrap();

    let created = rx.recv().await.unwrap();
    assert_eq!(created.action, "created");
    let changed = rx.recv().await.unwrap();
    assert_eq!(changed.action, "status_changed");
    assert_eq!(changed.resource, "service_request");

    // Persisted notifications: one for creation, one for the transition
    let rows = notification::find_by_user(&pool, 42).await.unwrap();
    assert_eq!(rows.len(), 2);
    assert!(rows.iter().all(|n| !n.is_read));
}
