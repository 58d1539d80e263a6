//! Authorization Tests
//!
//! Each test describes a way a caller could try to reach data they have no
//! rights to, and verifies the decision engine refuses it.

use axum::http::{HeaderMap, HeaderValue};
use sciobj_bridge::handlers::MockHandler;
use sciobj_bridge::{ACCESS_TOKEN_FIELD, API_TOKEN_FIELD};
use sciobj_core::{
    Dataset, Decision, Identity, ObjectGroup, Project, ProjectId, ResourceKind, Right,
};
use sciobj_server::core::{AuthError, HierarchyConfig, RevisionConfig, TokenConfig};
use sciobj_server::{AppState, MemoryStore, ProjectDeletion, ProjectStore, ResourceStore};
use std::collections::BTreeSet;
use std::sync::Arc;

// =============================================================================
// Test Helpers
// =============================================================================

struct World {
    state: AppState,
    store: Arc<MemoryStore>,
}

/// A project owned by `owner`, holding one dataset with one object group
struct Tenant {
    project: ProjectId,
    dataset: String,
    group: String,
    object: String,
}

fn world_with(tokens: TokenConfig) -> World {
    let store = Arc::new(MemoryStore::new());
    let state = AppState::assemble(
        store.clone(),
        MockHandler::new(),
        tokens,
        HierarchyConfig::default(),
        RevisionConfig::default(),
    );
    World { state, store }
}

fn world() -> World {
    world_with(TokenConfig::default())
}

async fn tenant(world: &World, owner: &str) -> Tenant {
    let project = Project::new(Identity::new(owner), format!("{}'s project", owner), "");
    let project_id = project.id.clone();
    world.store.insert_project(project).await.unwrap();

    let dataset = Dataset::new(project_id.clone(), "measurements", "raw");
    let dataset_id = dataset.id.clone();
    world.store.insert_dataset(dataset).await.unwrap();

    let group = ObjectGroup::new(
        &project_id,
        dataset_id.clone(),
        "run-1",
        Default::default(),
        vec![("run.csv".into(), "csv".into(), 512)],
    );
    let group_id = group.id.clone();
    let object_id = group.objects[0].id.clone();
    world.store.insert_object_group(group).await.unwrap();

    Tenant {
        project: project_id,
        dataset: dataset_id,
        group: group_id,
        object: object_id,
    }
}

fn delegated(user: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(ACCESS_TOKEN_FIELD, HeaderValue::from_str(user).unwrap());
    headers
}

fn api_token(secret: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(API_TOKEN_FIELD, HeaderValue::from_str(secret).unwrap());
    headers
}

async fn decide(world: &World, headers: &HeaderMap, kind: ResourceKind, id: &str, right: Right) -> Decision {
    world
        .state
        .engine
        .authorize(headers, kind, id, right)
        .await
        .expect("request should be evaluable")
}

// =============================================================================
// Cross-tenant access
// =============================================================================

#[tokio::test]
async fn attack_cross_project_read_prevented() {
    let world = world();
    let alice = tenant(&world, "alice").await;
    let _bob = tenant(&world, "bob").await;

    // Bob owns a project, but not Alice's
    let caller = delegated("bob");
    for (kind, id) in [
        (ResourceKind::Project, alice.project.as_str().to_string()),
        (ResourceKind::Dataset, alice.dataset.clone()),
        (ResourceKind::ObjectGroup, alice.group.clone()),
        (ResourceKind::Object, alice.object.clone()),
    ] {
        assert_eq!(
            decide(&world, &caller, kind, &id, Right::Read).await,
            Decision::Denied,
            "bob must not read alice's {}",
            kind
        );
    }
}

#[tokio::test]
async fn owner_reaches_every_level() {
    let world = world();
    let alice = tenant(&world, "alice").await;
    let caller = delegated("alice");

    for (kind, id) in [
        (ResourceKind::Project, alice.project.as_str().to_string()),
        (ResourceKind::Dataset, alice.dataset.clone()),
        (ResourceKind::ObjectGroup, alice.group.clone()),
        (ResourceKind::Object, alice.object.clone()),
    ] {
        assert_eq!(decide(&world, &caller, kind, &id, Right::Write).await, Decision::Allowed);
    }
}

#[tokio::test]
async fn attack_read_member_cannot_write() {
    let world = world();
    let alice = tenant(&world, "alice").await;
    world
        .store
        .add_member(&alice.project, Identity::new("carol"), BTreeSet::from([Right::Read]))
        .await
        .unwrap();

    let caller = delegated("carol");
    assert_eq!(
        decide(&world, &caller, ResourceKind::Dataset, &alice.dataset, Right::Read).await,
        Decision::Allowed
    );
    assert_eq!(
        decide(&world, &caller, ResourceKind::Dataset, &alice.dataset, Right::Write).await,
        Decision::Denied
    );
}

#[tokio::test]
async fn add_member_merges_rights() {
    let world = world();
    let alice = tenant(&world, "alice").await;
    let carol = Identity::new("carol");

    world
        .store
        .add_member(&alice.project, carol.clone(), BTreeSet::from([Right::Read]))
        .await
        .unwrap();
    let project = world
        .store
        .add_member(&alice.project, carol.clone(), BTreeSet::from([Right::Write]))
        .await
        .unwrap();

    let member = project.member(&carol).unwrap();
    assert!(member.has_right(Right::Read));
    assert!(member.has_right(Right::Write));
}

// =============================================================================
// Credentials
// =============================================================================

#[tokio::test]
async fn attack_no_credential_rejected() {
    let world = world();
    let alice = tenant(&world, "alice").await;

    let result = world
        .state
        .engine
        .authorize(&HeaderMap::new(), ResourceKind::Dataset, &alice.dataset, Right::Read)
        .await;
    assert!(matches!(result, Err(AuthError::MissingCredential)));
}

#[tokio::test]
async fn attack_forged_api_token_denied() {
    let world = world();
    let alice = tenant(&world, "alice").await;

    let decision = decide(
        &world,
        &api_token("bm90LWEtcmVhbC10b2tlbg"),
        ResourceKind::Dataset,
        &alice.dataset,
        Right::Read,
    )
    .await;
    assert_eq!(decision, Decision::Denied);
}

#[tokio::test]
async fn attack_unauthenticated_caller_learns_nothing() {
    let world = world();
    let alice = tenant(&world, "alice").await;

    // A failed introspection surfaces before the resource lookup result
    let result = world
        .state
        .engine
        .authorize(&delegated("FAIL:revoked"), ResourceKind::Dataset, "does-not-exist", Right::Read)
        .await;
    assert!(matches!(result, Err(AuthError::IdentityResolutionFailed(_))));

    // A made-up API token gets the same answer for real and missing resources
    let forged = api_token("bm90LWEtcmVhbC10b2tlbg");
    for id in [alice.dataset.as_str(), "does-not-exist"] {
        assert_eq!(
            decide(&world, &forged, ResourceKind::Dataset, id, Right::Read).await,
            Decision::Denied,
            "dataset {}",
            id
        );
    }
}

#[tokio::test]
async fn delegated_token_wins_over_api_token() {
    let world = world();
    let alice = tenant(&world, "alice").await;

    let token = world
        .state
        .tokens
        .issue(Identity::new("alice"), BTreeSet::from([Right::Read, Right::Write]), ResourceKind::Project)
        .await
        .unwrap();

    // Mallory's delegated token is the one evaluated
    let mut headers = delegated("mallory");
    headers.insert(API_TOKEN_FIELD, HeaderValue::from_str(&token.secret).unwrap());

    assert_eq!(
        decide(&world, &headers, ResourceKind::Dataset, &alice.dataset, Right::Read).await,
        Decision::Denied
    );
}

// =============================================================================
// API token grants
// =============================================================================

#[tokio::test]
async fn token_grant_checked_by_rights() {
    let world = world();
    let alice = tenant(&world, "alice").await;

    let token = world
        .state
        .tokens
        .issue(Identity::new("alice"), BTreeSet::from([Right::Read]), ResourceKind::Dataset)
        .await
        .unwrap();
    let caller = api_token(&token.secret);

    assert_eq!(
        decide(&world, &caller, ResourceKind::Object, &alice.object, Right::Read).await,
        Decision::Allowed
    );
    assert_eq!(
        decide(&world, &caller, ResourceKind::Object, &alice.object, Right::Write).await,
        Decision::Denied
    );
}

#[tokio::test]
async fn token_grant_is_not_bound_to_a_project() {
    let world = world();
    let _alice = tenant(&world, "alice").await;
    let bob = tenant(&world, "bob").await;

    // The grant's rights are checked at project scope without binding the
    // project id, so alice's token also reaches bob's data.
    let token = world
        .state
        .tokens
        .issue(Identity::new("alice"), BTreeSet::from([Right::Read]), ResourceKind::Project)
        .await
        .unwrap();

    assert_eq!(
        decide(&world, &api_token(&token.secret), ResourceKind::Dataset, &bob.dataset, Right::Read).await,
        Decision::Allowed
    );
}

#[tokio::test]
async fn fresh_token_allowed_with_expiry_enforced() {
    let world = world_with(TokenConfig {
        enforce_expiry: true,
        ..TokenConfig::default()
    });
    let alice = tenant(&world, "alice").await;

    let token = world
        .state
        .tokens
        .issue(Identity::new("alice"), BTreeSet::from([Right::Read]), ResourceKind::Project)
        .await
        .unwrap();

    assert_eq!(
        decide(&world, &api_token(&token.secret), ResourceKind::Dataset, &alice.dataset, Right::Read).await,
        Decision::Allowed
    );
}

// =============================================================================
// Resource resolution
// =============================================================================

#[tokio::test]
async fn unknown_resource_is_not_found() {
    let world = world();
    let _alice = tenant(&world, "alice").await;

    let result = world
        .state
        .engine
        .authorize(&delegated("alice"), ResourceKind::ObjectGroup, "no-such-group", Right::Read)
        .await;

    match result {
        Err(AuthError::ResourceNotFound { kind, id }) => {
            assert_eq!(kind, ResourceKind::ObjectGroup);
            assert_eq!(id, "no-such-group");
        }
        other => panic!("expected ResourceNotFound, got {:?}", other),
    }
}

#[tokio::test]
async fn unsupported_kind_rejected_before_lookup() {
    let world = world();

    let result = world
        .state
        .engine
        .authorize_named(&delegated("alice"), "bucket", "anything", Right::Read)
        .await;
    assert!(matches!(result, Err(AuthError::UnsupportedResource(k)) if k == "bucket"));
}

#[tokio::test]
async fn named_kinds_accept_common_spellings() {
    let world = world();
    let alice = tenant(&world, "alice").await;
    let caller = delegated("alice");

    for spelling in ["object_group", "objectgroup", "object-group", "ObjectGroup"] {
        let decision = world
            .state
            .engine
            .authorize_named(&caller, spelling, &alice.group, Right::Read)
            .await
            .unwrap();
        assert_eq!(decision, Decision::Allowed, "spelling {}", spelling);
    }
}

#[tokio::test]
async fn deleted_project_revokes_membership() {
    let world = world();
    let caller = delegated("alice");

    let project = Project::new(Identity::new("alice"), "scratch", "");
    let project_id = project.id.clone();
    world.store.insert_project(project).await.unwrap();
    assert_eq!(
        decide(&world, &caller, ResourceKind::Project, project_id.as_str(), Right::Write).await,
        Decision::Allowed
    );

    assert_eq!(
        world.store.delete_project_if_empty(&project_id).await.unwrap(),
        ProjectDeletion::Deleted
    );
    assert_eq!(
        decide(&world, &caller, ResourceKind::Project, project_id.as_str(), Right::Write).await,
        Decision::Denied
    );
}

#[tokio::test]
async fn project_with_datasets_survives_deletion() {
    let world = world();
    let alice = tenant(&world, "alice").await;

    assert_eq!(
        world.store.delete_project_if_empty(&alice.project).await.unwrap(),
        ProjectDeletion::HasDatasets
    );
    assert_eq!(
        decide(&world, &delegated("alice"), ResourceKind::Dataset, &alice.dataset, Right::Read).await,
        Decision::Allowed
    );
}
