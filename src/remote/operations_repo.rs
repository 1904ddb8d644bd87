// src/remote/operations_repo.rs

use reqwest::Method;
use serde_json::Value;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::operations::{
        ExceptionalRejectBody, ExceptionalRequest, NewExceptionalWrite, NewOrderWrite,
        NewRequestWrite, Order, OrderStatusBody, Request, RequestStatusPatch,
    },
    remote::client::UpstreamClient,
};

// Pedidos, demandas regulares e demandas excepcionais
#[derive(Clone)]
pub struct OperationsRepository {
    client: UpstreamClient,
}

impl OperationsRepository {
    pub fn new(client: UpstreamClient) -> Self {
        Self { client }
    }

    pub async fn pending_requests(&self, token: Option<&str>) -> Result<Vec<Request>, AppError> {
        self.client.get_json("/api/admin/demande/en-attente", &[], token).await
    }

    pub async fn approved_requests(&self, token: Option<&str>) -> Result<Vec<Request>, AppError> {
        self.client.get_json("/api/admin/demande/acceptee", &[], token).await
    }

    pub async fn find_request(&self, id: Uuid, token: Option<&str>) -> Result<Request, AppError> {
        self.client
            .get_json("/api/admin/demande/en-attente", &[("id", id.to_string())], token)
            .await
            .map_err(|e| match e {
                AppError::UpstreamStatus { status: 404, .. } => AppError::RequestNotFound,
                other => other,
            })
    }

    pub async fn patch_request(
        &self,
        id: Uuid,
        patch: &RequestStatusPatch,
        token: Option<&str>,
    ) -> Result<Request, AppError> {
        self.client
            .send_json(
                Method::PATCH,
                "/api/admin/demande/en-attente",
                &[("id", id.to_string())],
                Some(patch),
                token,
            )
            .await
    }

    /// Demanda nova do solicitante; nasce EN_ATTENTE.
    pub async fn create_request(
        &self,
        body: &NewRequestWrite,
        token: Option<&str>,
    ) -> Result<Request, AppError> {
        self.client
            .send_json(Method::POST, "/api/demandeurUser/demandes/enattente", &[], Some(body), token)
            .await
    }

    pub async fn create_exceptional(
        &self,
        body: &NewExceptionalWrite,
        token: Option<&str>,
    ) -> Result<ExceptionalRequest, AppError> {
        self.client
            .send_json(Method::POST, "/api/demandeurUser/demandes/enattente", &[], Some(body), token)
            .await
    }

    // Retiradas e entrega: o backend responde só {success, message}.
    async fn post_action(&self, path: &str, token: Option<&str>) -> Result<(), AppError> {
        let _: Value = self
            .client
            .send_json::<Value, _>(Method::POST, path, &[], None, token)
            .await?;
        Ok(())
    }

    /// Retirada pelo almoxarife; o backend baixa o estoque.
    pub async fn take_request(&self, id: Uuid, token: Option<&str>) -> Result<(), AppError> {
        self.post_action(&format!("/api/magasinier/demandes/{}/prise", id), token).await
    }

    pub async fn exceptional_requests(
        &self,
        token: Option<&str>,
    ) -> Result<Vec<ExceptionalRequest>, AppError> {
        self.client.get_json("/api/admin/demandes/exceptionelle", &[], token).await
    }

    pub async fn find_exceptional(
        &self,
        id: Uuid,
        token: Option<&str>,
    ) -> Result<ExceptionalRequest, AppError> {
        self.client
            .get_json(&format!("/api/admin/demandes/exceptionelle/{}", id), &[], token)
            .await
            .map_err(|e| match e {
                AppError::UpstreamStatus { status: 404, .. } => AppError::RequestNotFound,
                other => other,
            })
    }

    pub async fn accept_exceptional(
        &self,
        id: Uuid,
        token: Option<&str>,
    ) -> Result<ExceptionalRequest, AppError> {
        self.client
            .send_json::<(), _>(
                Method::PATCH,
                &format!("/api/admin/demandes/exceptionelle/{}/accept", id),
                &[],
                None,
                token,
            )
            .await
    }

    pub async fn reject_exceptional(
        &self,
        id: Uuid,
        body: &ExceptionalRejectBody,
        token: Option<&str>,
    ) -> Result<ExceptionalRequest, AppError> {
        self.client
            .send_json(
                Method::PATCH,
                &format!("/api/admin/demandes/exceptionelle/{}/reject", id),
                &[],
                Some(body),
                token,
            )
            .await
    }

    /// ACCEPTEE -> COMMANDEE
    pub async fn order_exceptional(
        &self,
        id: Uuid,
        token: Option<&str>,
    ) -> Result<ExceptionalRequest, AppError> {
        self.client
            .send_json::<(), _>(
                Method::PATCH,
                &format!("/api/gestionnaire/demandes/exceptionnelle/{}", id),
                &[],
                None,
                token,
            )
            .await
    }

    /// COMMANDEE -> LIVREE; o backend cadastra os produtos recebidos.
    pub async fn deliver_exceptional(&self, id: Uuid, token: Option<&str>) -> Result<(), AppError> {
        self.post_action(
            &format!("/api/magasinier/demandes/demandes-exceptionnelles/{}/livree", id),
            token,
        )
        .await
    }

    /// LIVREE -> PRISE
    pub async fn take_exceptional(&self, id: Uuid, token: Option<&str>) -> Result<(), AppError> {
        self.post_action(
            &format!("/api/magasinier/demandes/demandes-exceptionnelles/{}/prise", id),
            token,
        )
        .await
    }

    pub async fn list_orders(&self, token: Option<&str>) -> Result<Vec<Order>, AppError> {
        self.client.get_json("/api/admin/commande", &[], token).await
    }

    /// Pedido validado junto ao fornecedor; nasce EN_COURS.
    pub async fn create_order(&self, body: &NewOrderWrite, token: Option<&str>) -> Result<Order, AppError> {
        self.client
            .send_json(Method::POST, "/api/gestionnaire/commandes/validee/create", &[], Some(body), token)
            .await
    }

    pub async fn update_order_status(
        &self,
        body: &OrderStatusBody,
        token: Option<&str>,
    ) -> Result<Order, AppError> {
        self.client
            .send_json(Method::PATCH, "/api/admin/commande/status", &[], Some(body), token)
            .await
    }
}
