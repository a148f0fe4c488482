//! Axum router assembly.

use axum::Router;
use axum::routing::get;
use tower_http::trace::TraceLayer;

use pothub_app::ports::{CommandPublisher, PotStore, UserDirectory};

use crate::state::AppState;

/// Build the top-level axum [`Router`].
///
/// Mounts the API under `/api` and includes a [`TraceLayer`] that logs
/// each HTTP request/response at the `DEBUG` level using the `tracing`
/// ecosystem.
pub fn build<S, U, P>(state: AppState<S, U, P>) -> Router
where
    S: PotStore + Send + Sync + 'static,
    U: UserDirectory + Send + Sync + 'static,
    P: CommandPublisher + Send + Sync + 'static,
{
    Router::new()
        .route("/health", get(health_check))
        .nest("/api", crate::api::routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health_check() -> &'static str {
    "OK"
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::USER_ID_HEADER;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use http_body_util::BodyExt;
    use pothub_domain::error::PotHubError;
    use pothub_domain::history::HistoryEntry;
    use pothub_domain::id::{PotId, UserId};
    use pothub_domain::pot::Pot;
    use tower::ServiceExt;

    struct StubStore;
    struct StubUsers;
    struct StubPublisher;

    impl PotStore for StubStore {
        async fn find_owned(&self, _owner: UserId) -> Result<Vec<Pot>, PotHubError> {
            Ok(vec![])
        }
        async fn get_owned(
            &self,
            _owner: UserId,
            _pot: PotId,
        ) -> Result<Option<Pot>, PotHubError> {
            Ok(None)
        }
        async fn insert(&self, pot: Pot) -> Result<Pot, PotHubError> {
            Ok(pot)
        }
        async fn update_owned(
            &self,
            _owner: UserId,
            pot: Pot,
        ) -> Result<Option<Pot>, PotHubError> {
            Ok(Some(pot))
        }
        async fn delete_owned(&self, _owner: UserId, _pot: PotId) -> Result<bool, PotHubError> {
            Ok(false)
        }
        async fn append_history(
            &self,
            _owner: UserId,
            _pot: PotId,
            _entry: HistoryEntry,
        ) -> Result<bool, PotHubError> {
            Ok(false)
        }
    }

    impl UserDirectory for StubUsers {
        async fn attach_pot(&self, _owner: UserId, _pot: PotId) -> Result<(), PotHubError> {
            Ok(())
        }
        async fn detach_pot(&self, _owner: UserId, _pot: PotId) -> Result<(), PotHubError> {
            Ok(())
        }
    }

    impl CommandPublisher for StubPublisher {
        async fn publish(
            &self,
            _message: pothub_app::ports::Outbound,
        ) -> Result<(), PotHubError> {
            Ok(())
        }
    }

    fn app() -> Router {
        build(AppState::new(StubStore, StubUsers, StubPublisher))
    }

    #[tokio::test]
    async fn should_return_ok_when_health_check_called() {
        let response = app()
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn should_reject_request_without_owner_header() {
        let response = app()
            .oneshot(
                Request::builder()
                    .uri("/api/pots")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let body: serde_json::Value =
            serde_json::from_slice(&response.into_body().collect().await.unwrap().to_bytes())
                .unwrap();
        assert_eq!(body["success"], false);
    }

    #[tokio::test]
    async fn should_reject_malformed_owner_header() {
        let response = app()
            .oneshot(
                Request::builder()
                    .uri("/api/pots")
                    .header(USER_ID_HEADER, "not-a-uuid")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn should_return_not_found_for_ill_formed_pot_id() {
        let response = app()
            .oneshot(
                Request::builder()
                    .uri("/api/pots/definitely-not-a-uuid")
                    .header(USER_ID_HEADER, UserId::new().to_string())
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn should_return_empty_list_with_envelope() {
        let response = app()
            .oneshot(
                Request::builder()
                    .uri("/api/pots")
                    .header(USER_ID_HEADER, UserId::new().to_string())
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body: serde_json::Value =
            serde_json::from_slice(&response.into_body().collect().await.unwrap().to_bytes())
                .unwrap();
        assert_eq!(body["success"], true);
        assert!(body["data"].as_array().unwrap().is_empty());
    }
}
