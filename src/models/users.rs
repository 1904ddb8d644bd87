// src/models/users.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserRole {
    Admin,
    Demandeur,
    Gestionnaire,
    Magasinnier,
    Undefined,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserStatus {
    Active,
    Deactivated,
}

// Só faz sentido para usuários com papel DEMANDEUR
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RequesterKind {
    Enseignant,
    Employe,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RequesterProfile {
    #[serde(rename = "type")]
    pub kind: RequesterKind,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub email: String,
    #[serde(default)]
    pub name: Option<String>,
    pub role: UserRole,
    pub status: UserStatus,
    #[serde(rename = "demandeur", default)]
    pub requester: Option<RequesterProfile>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl User {
    /// O subtipo de demandante é descartado para quem não é DEMANDEUR.
    pub fn normalized(mut self) -> Self {
        if self.role != UserRole::Demandeur {
            self.requester = None;
        }
        self
    }

    pub fn requester_kind(&self) -> Option<RequesterKind> {
        self.requester.as_ref().map(|r| r.kind)
    }
}

// Payload recebido em PATCH /api/users/{id}
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UpdateUserStatusPayload {
    pub status: UserStatus,
}
