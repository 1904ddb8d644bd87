// src/services/user_service.rs

use uuid::Uuid;

use crate::{
    common::error::AppError,
    middleware::auth::Caller,
    models::users::{UpdateUserStatusPayload, User, UserStatus},
    remote::UserRepository,
    services::Outcome,
};

#[derive(Clone)]
pub struct UserService {
    repo: UserRepository,
}

impl UserService {
    pub fn new(repo: UserRepository) -> Self {
        Self { repo }
    }

    pub async fn list(&self, caller: &Caller) -> Result<Vec<User>, AppError> {
        let users = self.repo.list(caller.token()).await?;
        Ok(users.into_iter().map(User::normalized).collect())
    }

    pub async fn set_status(
        &self,
        caller: &Caller,
        id: Uuid,
        status: UserStatus,
    ) -> Result<Outcome<User>, AppError> {
        let payload = UpdateUserStatusPayload { status };
        let user = self.repo.update_status(id, &payload, caller.token()).await?;
        tracing::info!("Usuário {} agora {:?}", id, status);
        Ok(Outcome::new(user.normalized()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::remote::client::tests::client_for;
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn listing_drops_requester_type_of_non_requesters() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/admin/users"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {
                    "id": "6f1c2a9e-4b7d-4f5e-9a1b-2c3d4e5f6a7b",
                    "email": "a@ecole.fr",
                    "role": "GESTIONNAIRE",
                    "status": "ACTIVE",
                    "demandeur": { "type": "ENSEIGNANT" }
                },
                {
                    "id": "7f1c2a9e-4b7d-4f5e-9a1b-2c3d4e5f6a7b",
                    "email": "b@ecole.fr",
                    "role": "DEMANDEUR",
                    "status": "ACTIVE",
                    "demandeur": { "type": "EMPLOYE" }
                }
            ])))
            .mount(&server)
            .await;

        let users = UserService::new(UserRepository::new(client_for(&server)))
            .list(&Caller::default())
            .await
            .unwrap();
        assert!(users[0].requester_kind().is_none());
        assert!(users[1].requester_kind().is_some());
    }

    #[tokio::test]
    async fn deactivation_patches_the_user() {
        let server = MockServer::start().await;
        let id = Uuid::new_v4();
        Mock::given(method("PATCH"))
            .and(path(format!("/api/admin/users/{}", id)))
            .and(body_json(json!({ "status": "DEACTIVATED" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": id,
                "email": "c@ecole.fr",
                "role": "MAGASINNIER",
                "status": "DEACTIVATED"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let outcome = UserService::new(UserRepository::new(client_for(&server)))
            .set_status(&Caller::default(), id, UserStatus::Deactivated)
            .await
            .unwrap();
        assert_eq!(outcome.data.status, UserStatus::Deactivated);
    }
}
