// src/remote/user_repo.rs

use reqwest::Method;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::users::{UpdateUserStatusPayload, User},
    remote::client::UpstreamClient,
};

#[derive(Clone)]
pub struct UserRepository {
    client: UpstreamClient,
}

impl UserRepository {
    pub fn new(client: UpstreamClient) -> Self {
        Self { client }
    }

    pub async fn list(&self, token: Option<&str>) -> Result<Vec<User>, AppError> {
        self.client.get_json("/api/admin/users", &[], token).await
    }

    pub async fn update_status(
        &self,
        id: Uuid,
        payload: &UpdateUserStatusPayload,
        token: Option<&str>,
    ) -> Result<User, AppError> {
        self.client
            .send_json(Method::PATCH, &format!("/api/admin/users/{}", id), &[], Some(payload), token)
            .await
    }
}
