use crate::infra::{
    AppState, InMemoryAdRepository, InMemoryInviteRepository, InMemoryMediaStore,
    InMemoryMemberRepository, InMemoryOwnershipRepository, InMemoryParcelDirectory,
    LoggingNotificationSender,
};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Extension, Json, Router};
use serde_json::json;
use std::sync::Arc;
use union_portal::config::BulkConfig;
use union_portal::workflows::ads::{ad_router, AdAdminService};
use union_portal::workflows::invites::{invite_router, InviteService};
use union_portal::workflows::notifications::BulkDispatcher;
use union_portal::workflows::ownership::{ownership_router, OwnershipService};
use union_portal::workflows::parcels::{member_router, MemberMatchingService};

pub(crate) type Ownership = OwnershipService<InMemoryOwnershipRepository>;
pub(crate) type Members = MemberMatchingService<InMemoryParcelDirectory, InMemoryMemberRepository>;
pub(crate) type Invites =
    InviteService<InMemoryInviteRepository, InMemoryMemberRepository, LoggingNotificationSender>;
pub(crate) type Ads = AdAdminService<InMemoryAdRepository, InMemoryMediaStore>;

/// Every workflow service, wired to the in-memory adapters.
#[derive(Clone)]
pub(crate) struct AppServices {
    pub(crate) ownership: Arc<Ownership>,
    pub(crate) members: Arc<Members>,
    pub(crate) invites: Arc<Invites>,
    pub(crate) ads: Arc<Ads>,
}

impl AppServices {
    pub(crate) fn in_memory(bulk: &BulkConfig, parcels: InMemoryParcelDirectory) -> Self {
        let member_repository = Arc::new(InMemoryMemberRepository::default());
        let sender = Arc::new(LoggingNotificationSender::default());

        Self {
            ownership: Arc::new(OwnershipService::new(Arc::new(
                InMemoryOwnershipRepository::default(),
            ))),
            members: Arc::new(MemberMatchingService::new(
                Arc::new(parcels),
                member_repository.clone(),
                bulk.batch_size,
            )),
            invites: Arc::new(InviteService::new(
                Arc::new(InMemoryInviteRepository::default()),
                member_repository,
                BulkDispatcher::new(sender, bulk.batch_size),
            )),
            ads: Arc::new(AdAdminService::new(
                Arc::new(InMemoryAdRepository::default()),
                Arc::new(InMemoryMediaStore::default()),
            )),
        }
    }
}

pub(crate) fn app_router(services: &AppServices) -> Router {
    ownership_router(services.ownership.clone())
        .merge(member_router(services.members.clone()))
        .merge(invite_router(services.invites.clone()))
        .merge(ad_router(services.ads.clone()))
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use metrics_exporter_prometheus::PrometheusBuilder;
    use std::sync::atomic::{AtomicBool, Ordering};
    use tower::ServiceExt;
    use union_portal::workflows::parcels::{ParcelRecord, Pnu};
    use union_portal::workflows::tenancy::UnionId;

    fn test_app() -> (Router, AppState) {
        let parcels = InMemoryParcelDirectory::default();
        parcels.load(
            UnionId::new("mokdong-6"),
            vec![ParcelRecord {
                pnu: Pnu("1147010100101230004".to_string()),
                lot_address: "서울특별시 양천구 목동 123-4".to_string(),
                road_address: None,
            }],
        );
        let state = AppState {
            readiness: Arc::new(AtomicBool::new(false)),
            metrics: Arc::new(PrometheusBuilder::new().build_recorder().handle()),
        };
        let services = AppServices::in_memory(&BulkConfig::default(), parcels);
        let app = app_router(&services).layer(Extension(state.clone()));
        (app, state)
    }

    async fn read_json(response: axum::response::Response) -> serde_json::Value {
        let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
            .await
            .expect("read body");
        serde_json::from_slice(&body).expect("json payload")
    }

    fn post_json(uri: &str, body: serde_json::Value) -> Request<Body> {
        Request::post(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(serde_json::to_vec(&body).expect("serialize")))
            .expect("request builds")
    }

    #[tokio::test]
    async fn readiness_flips_with_the_flag() {
        let (app, state) = test_app();

        let before = app
            .clone()
            .oneshot(Request::get("/ready").body(Body::empty()).expect("request"))
            .await
            .expect("route executes");
        assert_eq!(before.status(), StatusCode::SERVICE_UNAVAILABLE);

        state.readiness.store(true, Ordering::Release);
        let after = app
            .oneshot(Request::get("/ready").body(Body::empty()).expect("request"))
            .await
            .expect("route executes");
        assert_eq!(after.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn health_and_metrics_respond() {
        let (app, _) = test_app();

        let health = app
            .clone()
            .oneshot(Request::get("/health").body(Body::empty()).expect("request"))
            .await
            .expect("route executes");
        assert_eq!(read_json(health).await, json!({ "status": "ok" }));

        let metrics = app
            .oneshot(Request::get("/metrics").body(Body::empty()).expect("request"))
            .await
            .expect("route executes");
        assert_eq!(metrics.status(), StatusCode::OK);
        assert_eq!(
            metrics.headers()[header::CONTENT_TYPE],
            "text/plain; version=0.0.4"
        );
    }

    #[tokio::test]
    async fn workflow_routes_share_one_member_store() {
        let (app, _) = test_app();

        let registered = app
            .clone()
            .oneshot(post_json(
                "/api/v1/unions/mokdong-6/members/register",
                json!({
                    "name": "김철수",
                    "property_address": "목동 123-4",
                    "phone": "010-1111-2222",
                    "dong": "101",
                    "ho": "1203"
                }),
            ))
            .await
            .expect("route executes");
        assert_eq!(registered.status(), StatusCode::CREATED);

        let invited = app
            .clone()
            .oneshot(post_json(
                "/api/v1/unions/mokdong-6/invites",
                json!({ "recipients": [{ "name": "김철수", "phone": "01011112222" }] }),
            ))
            .await
            .expect("route executes");
        assert_eq!(invited.status(), StatusCode::CREATED);

        let synced = app
            .oneshot(post_json("/api/v1/unions/mokdong-6/invites/sync", json!({})))
            .await
            .expect("route executes");
        let payload = read_json(synced).await;
        assert_eq!(payload["data"]["accepted"], json!(1));
    }

    #[tokio::test]
    async fn ownership_preview_is_mounted() {
        let (app, _) = test_app();

        let response = app
            .oneshot(post_json(
                "/api/v1/unions/mokdong-6/ownership/preview",
                json!({
                    "mode": "proportional",
                    "new_owner_ratio": 20.0,
                    "other_co_owners": [{ "owner_id": "A", "original_ratio": 30.0 }]
                }),
            ))
            .await
            .expect("route executes");

        let payload = read_json(response).await;
        assert_eq!(payload["data"]["existing_ratio"], json!(56.0));
        assert_eq!(payload["data"]["co_owners"][0]["ratio"], json!(24.0));
    }
}
