//! Behaviour every backend must share.
//!
//! Each backend's tests run these sequences against its own store, so the
//! in-memory backend and the live stores are held to the same contract.

use std::collections::BTreeSet;

use chrono::{Duration, TimeZone, Utc};
use uuid::Uuid;

use inviteazy_core::invitation::{
    EventPatch, InviteePatch, InviteeStatus, NewEvent, NewInvitee, NewUser, User, UserPatch,
    UserRole,
};
use inviteazy_core::storage::{RepositoryError, Repositories};

pub fn new_user(name: &str) -> NewUser {
    NewUser {
        name: name.to_string(),
        email: format!("{}-{}@example.com", name.to_lowercase(), Uuid::new_v4()),
        password: "$2b$10$abcdefghijklmnopqrstuuN3tWpZzVq5n7bY3G0yQ2x8hQ8m0yGm".to_string(),
        role: UserRole::Public,
        phone_number: None,
        profile_picture: None,
        address: None,
    }
}

pub fn new_event(owner: Uuid, name: &str) -> NewEvent {
    NewEvent {
        user_id: owner,
        event_name: name.to_string(),
        event_datetime: Utc.with_ymd_and_hms(2030, 6, 1, 18, 30, 0).unwrap(),
        event_location: "Community Hall".to_string(),
        event_description: "Annual gathering".to_string(),
    }
}

fn keys(value: serde_json::Value) -> BTreeSet<String> {
    value
        .as_object()
        .expect("entity serializes to an object")
        .keys()
        .cloned()
        .collect()
}

fn field_set(fields: &[&str]) -> BTreeSet<String> {
    fields.iter().map(|f| f.to_string()).collect()
}

async fn create_owner(repos: &Repositories) -> User {
    repos.users.create(new_user("Owner")).await.unwrap()
}

pub async fn user_lifecycle(repos: &Repositories) {
    let new = new_user("Ana");
    let email = new.email.clone();

    let created = repos.users.create(new.clone()).await.unwrap();
    assert_eq!(created.email, email);
    assert_eq!(created.role, UserRole::Public);
    assert_eq!(created.password, new.password);
    assert_eq!(
        keys(serde_json::to_value(&created).unwrap()),
        field_set(&[
            "id",
            "name",
            "email",
            "role",
            "phone_number",
            "profile_picture",
            "address",
            "created_at",
        ])
    );

    assert_eq!(
        repos.users.find_by_id(created.id).await.unwrap(),
        Some(created.clone())
    );
    assert_eq!(
        repos.users.find_by_email(&email).await.unwrap(),
        Some(created.clone())
    );
    assert!(repos.users.find_all().await.unwrap().contains(&created));

    let duplicate = repos.users.create(new).await.unwrap_err();
    assert!(matches!(
        duplicate,
        RepositoryError::AlreadyExists {
            entity_type: "User",
            ..
        }
    ));

    let updated = repos
        .users
        .update(
            created.id,
            UserPatch {
                name: Some("Ana Maria".to_string()),
                role: Some(UserRole::Admin),
                address: Some("12 Rue Haute".to_string()),
                ..UserPatch::default()
            },
        )
        .await
        .unwrap()
        .expect("user exists");
    assert_eq!(updated.name, "Ana Maria");
    assert_eq!(updated.role, UserRole::Admin);
    assert_eq!(updated.address.as_deref(), Some("12 Rue Haute"));
    assert_eq!(updated.email, email);
    assert_eq!(updated.created_at, created.created_at);

    let other = repos.users.create(new_user("Ben")).await.unwrap();
    let conflict = repos
        .users
        .update(
            other.id,
            UserPatch {
                email: Some(email.clone()),
                ..UserPatch::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(conflict, RepositoryError::AlreadyExists { .. }));

    repos.users.delete(created.id).await.unwrap();
    repos.users.delete(other.id).await.unwrap();
    assert_eq!(repos.users.find_by_id(created.id).await.unwrap(), None);
    assert_eq!(repos.users.find_by_email(&email).await.unwrap(), None);
}

pub async fn event_lifecycle(repos: &Repositories) {
    let owner = create_owner(repos).await;
    let new = new_event(owner.id, "Launch Party");

    let created = repos.events.create(new.clone()).await.unwrap();
    assert_eq!(created.user_id, owner.id);
    assert_eq!(created.event_name, new.event_name);
    assert_eq!(created.event_datetime, new.event_datetime);
    assert_eq!(created.created_at, created.updated_at);
    assert_eq!(
        keys(serde_json::to_value(&created).unwrap()),
        field_set(&[
            "id",
            "user_id",
            "event_name",
            "event_datetime",
            "event_location",
            "event_description",
            "created_at",
            "updated_at",
        ])
    );

    assert_eq!(
        repos.events.find_by_id(created.id).await.unwrap(),
        Some(created.clone())
    );
    assert!(repos.events.find_all().await.unwrap().contains(&created));
    assert_eq!(
        repos.events.find_by_user_id(owner.id).await.unwrap(),
        vec![created.clone()]
    );

    let moved = new.event_datetime + Duration::days(7);
    let updated = repos
        .events
        .update(
            created.id,
            EventPatch {
                event_name: Some("Launch Party (rescheduled)".to_string()),
                event_datetime: Some(moved),
                ..EventPatch::default()
            },
        )
        .await
        .unwrap()
        .expect("event exists");
    assert_eq!(updated.event_name, "Launch Party (rescheduled)");
    assert_eq!(updated.event_datetime, moved);
    assert_eq!(updated.event_location, created.event_location);
    assert_eq!(updated.created_at, created.created_at);
    assert!(updated.updated_at >= created.updated_at);
    assert_eq!(
        keys(serde_json::to_value(&updated).unwrap()),
        keys(serde_json::to_value(&created).unwrap())
    );

    repos.events.delete(created.id).await.unwrap();
    assert_eq!(repos.events.find_by_id(created.id).await.unwrap(), None);
    repos.users.delete(owner.id).await.unwrap();
}

pub async fn invitee_lifecycle(repos: &Repositories) {
    let owner = create_owner(repos).await;
    let guest = repos.users.create(new_user("Guest")).await.unwrap();
    let event = repos
        .events
        .create(new_event(owner.id, "Dinner"))
        .await
        .unwrap();

    let created = repos
        .invitees
        .create(NewInvitee::new(event.id, guest.id))
        .await
        .unwrap();
    assert_eq!(created.status, InviteeStatus::Pending);
    assert_eq!(
        created.qr_code,
        format!("https://example.com/qr/{}", created.id)
    );
    assert!(!created.is_checked_in);
    assert_eq!(created.checked_in_at, None);

    assert_eq!(
        repos.invitees.find_by_id(created.id).await.unwrap(),
        Some(created.clone())
    );
    assert_eq!(
        repos.invitees.find_by_event_id(event.id).await.unwrap(),
        vec![created.clone()]
    );
    assert_eq!(
        repos.invitees.find_by_user_id(guest.id).await.unwrap(),
        vec![created.clone()]
    );
    assert!(repos.invitees.find_all().await.unwrap().contains(&created));

    let accepted = repos
        .invitees
        .update_status(created.id, InviteeStatus::Accept)
        .await
        .unwrap();
    assert_eq!(accepted.status, InviteeStatus::Accept);
    assert_eq!(accepted.qr_code, created.qr_code);

    let at = inviteazy_core::invitation::timestamp_now();
    let checked_in = repos
        .invitees
        .update(created.id, InviteePatch::check_in(at))
        .await
        .unwrap()
        .expect("invitee exists");
    assert!(checked_in.is_checked_in);
    assert_eq!(checked_in.checked_in_at, Some(at));
    assert_eq!(checked_in.status, InviteeStatus::Accept);

    let unchanged = repos
        .invitees
        .update(created.id, InviteePatch::default())
        .await
        .unwrap();
    assert_eq!(unchanged, Some(checked_in));

    repos.invitees.delete(created.id).await.unwrap();
    assert_eq!(repos.invitees.find_by_id(created.id).await.unwrap(), None);
    assert!(repos
        .invitees
        .find_by_event_id(event.id)
        .await
        .unwrap()
        .is_empty());

    repos.events.delete(event.id).await.unwrap();
    repos.users.delete(guest.id).await.unwrap();
    repos.users.delete(owner.id).await.unwrap();
}

pub async fn missing_ids(repos: &Repositories) {
    let missing = Uuid::new_v4();

    assert_eq!(repos.users.find_by_id(missing).await.unwrap(), None);
    assert_eq!(repos.events.find_by_id(missing).await.unwrap(), None);
    assert_eq!(repos.invitees.find_by_id(missing).await.unwrap(), None);

    assert_eq!(
        repos
            .users
            .update(
                missing,
                UserPatch {
                    name: Some("nobody".to_string()),
                    ..UserPatch::default()
                }
            )
            .await
            .unwrap(),
        None
    );
    assert_eq!(
        repos
            .events
            .update(
                missing,
                EventPatch {
                    event_name: Some("nothing".to_string()),
                    ..EventPatch::default()
                }
            )
            .await
            .unwrap(),
        None
    );
    assert_eq!(
        repos
            .invitees
            .update(missing, InviteePatch::check_in(Utc::now()))
            .await
            .unwrap(),
        None
    );

    let err = repos
        .invitees
        .update_status(missing, InviteeStatus::Accept)
        .await
        .unwrap_err();
    assert_eq!(err, RepositoryError::not_found("Invitee", missing));

    repos.users.delete(missing).await.unwrap();
    repos.events.delete(missing).await.unwrap();
    repos.invitees.delete(missing).await.unwrap();

    assert!(repos
        .invitees
        .find_by_event_id(missing)
        .await
        .unwrap()
        .is_empty());
    assert!(repos
        .events
        .find_by_user_id(missing)
        .await
        .unwrap()
        .is_empty());
}
