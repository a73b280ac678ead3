//! End-to-end tests: store clients against the in-memory record
//! service, plus the concurrent dashboard loader.

use std::sync::Arc;

use serde_json::json;
use tracing_test::traced_test;

use nimbus_crm::error::StoreError;
use nimbus_crm::remote::memory::MemoryRecordService;
use nimbus_crm::remote::FieldError;
use nimbus_crm::services::dashboard::{load_dashboard, RecentItem};
use nimbus_crm::store::activities::ActivityStore;
use nimbus_crm::store::contacts::ContactStore;
use nimbus_crm::store::deals::DealStore;
use nimbus_crm::types::{ActivityInput, ContactInput, DealInput, DealStage, DealStatus};

fn seeded_service() -> Arc<MemoryRecordService> {
    Arc::new(
        MemoryRecordService::new()
            .with_seed(
                "contact",
                vec![
                    json!({"Name": "Ada Lovelace", "email": "ada@analytical.example",
                           "Tags": "vip, enterprise", "CreatedOn": "2024-01-03T00:00:00Z"}),
                    json!({"Name": "Grace Hopper", "email": "grace@navy.example",
                           "CreatedOn": "2024-01-01T00:00:00Z"}),
                ],
            )
            .with_seed(
                "deal",
                vec![json!({"title": "Pilot rollout", "value": 1500, "stage": "Proposal",
                            "status": "Open", "CreatedOn": "2024-01-02T00:00:00Z"})],
            )
            .with_seed(
                "activity",
                vec![json!({"type": "Call", "description": "Intro call",
                            "timestamp": "2024-01-04T10:00:00Z"})],
            ),
    )
}

#[tokio::test]
async fn contact_crud_lifecycle() {
    let service = seeded_service();
    let store = ContactStore::new(service);

    let all = store.get_all().await.unwrap();
    assert_eq!(all.len(), 2);
    assert_eq!(all[0].tags, vec!["vip", "enterprise"]);

    let created = store
        .create(&ContactInput {
            name: "Margaret Hamilton".to_string(),
            email: "margaret@apollo.example".to_string(),
            tags: vec!["mit".to_string()],
            ..ContactInput::default()
        })
        .await
        .unwrap();
    assert!(!created.id.is_empty());
    assert!(created.created_at.is_some());

    let fetched = store.get_by_id(&created.id).await.unwrap().unwrap();
    assert_eq!(fetched.name, "Margaret Hamilton");

    let updated = store
        .update(
            &created.id,
            &ContactInput {
                name: "Margaret Hamilton".to_string(),
                email: "margaret@apollo.example".to_string(),
                company: "NASA".to_string(),
                ..ContactInput::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.company, "NASA");
    // Full overwrite: tags were not resupplied, so they reset.
    assert!(updated.tags.is_empty());

    assert!(store.delete(&created.id).await.unwrap());
    assert!(store.get_by_id(&created.id).await.unwrap().is_none());
}

#[tokio::test]
async fn get_all_is_idempotent_between_writes() {
    let service = seeded_service();
    let store = ContactStore::new(service);
    let first = store.get_all().await.unwrap();
    let second = store.get_all().await.unwrap();
    assert_eq!(first, second);
}

#[tokio::test]
async fn fetch_failure_carries_the_service_message() {
    let service = seeded_service();
    let store = DealStore::new(service.clone());
    service.fail_next_call("quota exceeded");
    match store.get_all().await {
        Err(StoreError::RemoteFetch(msg)) => assert_eq!(msg, "quota exceeded"),
        other => panic!("expected RemoteFetch, got {other:?}"),
    }
}

#[traced_test]
#[tokio::test]
async fn per_record_validation_failure_raises_remote_write() {
    let service = seeded_service();
    let store = ContactStore::new(service.clone());
    service.fail_next_record(vec![FieldError {
        field_label: "email".to_string(),
        message: "invalid".to_string(),
    }]);

    let err = store
        .create(&ContactInput {
            name: "Bad".to_string(),
            email: "not-an-email".to_string(),
            ..ContactInput::default()
        })
        .await
        .unwrap_err();

    match err {
        StoreError::RemoteWrite { messages } => {
            assert_eq!(messages, vec!["email: invalid"]);
        }
        other => panic!("expected RemoteWrite, got {other:?}"),
    }
    // The default alert sink logs each validation message.
    assert!(logs_contain("email: invalid"));
}

#[tokio::test]
async fn delete_reports_false_without_throwing() {
    let service = seeded_service();
    let store = ActivityStore::new(service);
    assert!(!store.delete("999").await.unwrap());
}

#[tokio::test]
async fn deal_stage_moves_round_trip_through_update() {
    let service = seeded_service();
    let store = DealStore::new(service);

    let deal = store.get_all().await.unwrap().remove(0);
    assert_eq!(deal.stage, DealStage::Proposal);

    let advanced = store
        .update(
            &deal.id,
            &DealInput {
                title: deal.title.clone(),
                value: deal.value,
                stage: deal.stage.advanced(),
                probability: deal.probability,
                status: deal.status,
                contact_id: deal.contact_id.clone(),
                expected_close_date: deal.expected_close_date,
            },
        )
        .await
        .unwrap();
    assert_eq!(advanced.stage, DealStage::Negotiation);
    assert_eq!(advanced.status, DealStatus::Open);
}

#[tokio::test]
async fn dashboard_loads_concurrently_and_aggregates() {
    let service = seeded_service();
    let contacts = ContactStore::new(service.clone());
    let deals = DealStore::new(service.clone());
    let activities = ActivityStore::new(service.clone());

    let data = load_dashboard(&contacts, &deals, &activities).await.unwrap();
    assert_eq!(data.stats.contacts, 2);
    assert_eq!(data.stats.deals, 1);
    assert_eq!(data.stats.activities, 1);
    assert_eq!(data.stats.revenue, 0.0);

    // Activity (01-04), Ada (01-03), deal (01-02), Grace (01-01).
    assert_eq!(data.recent.len(), 4);
    assert!(matches!(&data.recent[0], RecentItem::Activity(_)));
    assert!(matches!(&data.recent[1], RecentItem::Contact(c) if c.name.starts_with("Ada")));
    assert!(matches!(&data.recent[2], RecentItem::Deal(_)));
    assert!(matches!(&data.recent[3], RecentItem::Contact(c) if c.name.starts_with("Grace")));
}

#[tokio::test]
async fn activity_create_stamps_a_timestamp_when_missing() {
    let service = seeded_service();
    let store = ActivityStore::new(service);
    let created = store
        .create(&ActivityInput {
            description: "Send proposal".to_string(),
            ..ActivityInput::default()
        })
        .await
        .unwrap();
    // Stamped at the storage boundary, not left to the reader.
    assert!(created.timestamp <= chrono::Utc::now());
}
