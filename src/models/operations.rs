// src/models/operations.rs

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::models::inventory::validate_not_blank;

// --- Enums ---
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    #[serde(rename = "EN_ATTENTE")]
    Pending,
    #[serde(rename = "EN_COURS")]
    InProgress,
    #[serde(rename = "LIVREE")]
    Delivered,
    #[serde(rename = "ANNULEE")]
    Cancelled,
    #[serde(rename = "EN_RETOUR")]
    Returned,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum RequestStatus {
    #[serde(rename = "EN_ATTENTE")]
    Pending,
    #[serde(rename = "APPROUVEE")]
    Approved,
    #[serde(rename = "REJETEE")]
    Rejected,
    #[serde(rename = "PRISE")]
    Taken,
}

// Fluxo da demanda regular: EN_ATTENTE -> APPROUVEE -> PRISE (ou REJETEE)
impl RequestStatus {
    pub fn code(&self) -> &'static str {
        match self {
            RequestStatus::Pending => "EN_ATTENTE",
            RequestStatus::Approved => "APPROUVEE",
            RequestStatus::Rejected => "REJETEE",
            RequestStatus::Taken => "PRISE",
        }
    }
}

// Fluxo da demanda excepcional: EN_ATTENTE -> ACCEPTEE -> COMMANDEE -> LIVREE -> PRISE (ou REJETEE)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum ExceptionalStatus {
    #[serde(rename = "EN_ATTENTE")]
    Pending,
    #[serde(rename = "ACCEPTEE")]
    Accepted,
    #[serde(rename = "COMMANDEE")]
    Ordered,
    #[serde(rename = "LIVREE")]
    Delivered,
    #[serde(rename = "PRISE")]
    Taken,
    #[serde(rename = "REJETEE")]
    Rejected,
}

impl ExceptionalStatus {
    pub fn code(&self) -> &'static str {
        match self {
            ExceptionalStatus::Pending => "EN_ATTENTE",
            ExceptionalStatus::Accepted => "ACCEPTEE",
            ExceptionalStatus::Ordered => "COMMANDEE",
            ExceptionalStatus::Delivered => "LIVREE",
            ExceptionalStatus::Taken => "PRISE",
            ExceptionalStatus::Rejected => "REJETEE",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RequestDecision {
    Accept,
    Reject,
}

// --- Resumos embutidos nas respostas ---
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ProductSummary {
    pub id: Uuid,
    pub nom: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SupplierSummary {
    pub id: Uuid,
    pub nom: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RequesterSummary {
    pub id: Uuid,
    #[serde(default)]
    pub nom: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

// --- Pedidos (commandes) ---
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderLine {
    #[serde(rename = "produitId")]
    pub product_id: Uuid,
    #[serde(rename = "produit", default)]
    pub product: Option<ProductSummary>,
    #[serde(rename = "quantite")]
    pub quantity: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: Uuid,
    #[serde(rename = "fournisseurId", default)]
    pub supplier_id: Option<Uuid>,
    #[serde(rename = "fournisseur", default)]
    pub supplier: Option<SupplierSummary>,
    #[serde(rename = "produits", default)]
    pub lines: Vec<OrderLine>,
    #[serde(rename = "statut")]
    pub status: OrderStatus,
    #[serde(rename = "datePrevu", alias = "datePrevue", default)]
    pub expected_at: Option<DateTime<Utc>>,
    #[serde(rename = "dateLivraison", default)]
    pub delivered_at: Option<DateTime<Utc>>,
    #[serde(rename = "raisonRetour", default)]
    pub return_reason: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

// --- Demandas regulares ---
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RequestLine {
    #[serde(rename = "produitId")]
    pub product_id: Uuid,
    #[serde(rename = "produit", default)]
    pub product: Option<ProductSummary>,
    #[serde(rename = "quantite")]
    pub quantity: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Request {
    pub id: Uuid,
    #[serde(rename = "demandeurId", default)]
    pub requester_id: Option<Uuid>,
    #[serde(rename = "demandeur", default)]
    pub requester: Option<RequesterSummary>,
    #[serde(rename = "produits", default)]
    pub lines: Vec<RequestLine>,
    #[serde(rename = "statut")]
    pub status: RequestStatus,
    #[serde(rename = "approbateurId", default)]
    pub approver_id: Option<String>,
    #[serde(rename = "dateApprouvee", default)]
    pub approved_at: Option<DateTime<Utc>>,
    #[serde(rename = "raisonRefus", default)]
    pub rejection_reason: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

// --- Demandas excepcionais (produtos fora do catálogo) ---
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ExceptionalProduct {
    #[serde(default)]
    pub id: Option<Uuid>,
    #[serde(alias = "nom")]
    pub name: String,
    #[serde(rename = "marque", default)]
    pub brand: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ExceptionalLine {
    #[serde(rename = "produitExceptionnel")]
    pub product: ExceptionalProduct,
    #[serde(rename = "quantite")]
    pub quantity: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ExceptionalRequest {
    pub id: Uuid,
    #[serde(rename = "demandeurId", default)]
    pub requester_id: Option<Uuid>,
    #[serde(rename = "produitsExceptionnels", default)]
    pub lines: Vec<ExceptionalLine>,
    #[serde(rename = "statut")]
    pub status: ExceptionalStatus,
    #[serde(rename = "raisonRefus", default)]
    pub rejection_reason: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

// Corpos enviados ao backend
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestStatusPatch {
    pub statut: RequestStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_approuvee: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raison_refus: Option<String>,
}

impl RequestStatusPatch {
    pub fn approve(at: DateTime<Utc>) -> Self {
        Self { statut: RequestStatus::Approved, date_approuvee: Some(at), raison_refus: None }
    }

    pub fn reject(reason: String) -> Self {
        Self { statut: RequestStatus::Rejected, date_approuvee: None, raison_refus: Some(reason) }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExceptionalRejectBody {
    pub raison_refus: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderStatusBody {
    pub id: Uuid,
    pub statut: OrderStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raison_retour: Option<String>,
}

// --- Entradas da API ---

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DecisionPayload {
    pub decision: RequestDecision,
    /// Obrigatório na rejeição
    #[serde(default)]
    pub raison_refus: Option<String>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RejectionPayload {
    #[serde(default)]
    pub raison_refus: String,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderStatusPayload {
    pub statut: OrderStatus,
    /// Obrigatório para EN_RETOUR
    #[serde(default)]
    pub raison_retour: Option<String>,
}

// ---
// Criação de demandas e pedidos
// ---

// Quantidades chegam como i64 para que zero ou negativo vire erro de validação.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LinePayload {
    pub produit_id: Uuid,
    #[schema(example = 3)]
    pub quantite: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ExceptionalLinePayload {
    #[serde(alias = "nom")]
    pub name: String,
    #[serde(default)]
    pub marque: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    pub quantite: i64,
}

fn invalid(code: &'static str, message: &'static str) -> ValidationError {
    let mut err = ValidationError::new(code);
    err.message = Some(message.into());
    err
}

fn positive_quantity(quantite: i64) -> Result<u32, ValidationError> {
    u32::try_from(quantite)
        .ok()
        .filter(|q| *q > 0)
        .ok_or_else(|| invalid("range", "La quantité doit être supérieure à 0."))
}

fn validate_lines(lines: &[LinePayload]) -> Result<(), ValidationError> {
    if lines.is_empty() {
        return Err(invalid("length", "Il faut au moins un produit."));
    }
    for line in lines {
        positive_quantity(line.quantite)?;
    }
    Ok(())
}

fn validate_exceptional_lines(lines: &[ExceptionalLinePayload]) -> Result<(), ValidationError> {
    if lines.is_empty() {
        return Err(invalid("length", "Il faut au moins un produit exceptionnel."));
    }
    for line in lines {
        if validate_not_blank(&line.name).is_err() {
            return Err(invalid("blank", "Le nom du produit exceptionnel est obligatoire."));
        }
        positive_quantity(line.quantite)?;
    }
    Ok(())
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct LineWrite {
    pub produit_id: Uuid,
    pub quantite: u32,
}

fn lines_to_write(lines: &[LinePayload]) -> Vec<LineWrite> {
    lines
        .iter()
        .map(|l| LineWrite {
            produit_id: l.produit_id,
            quantite: u32::try_from(l.quantite).unwrap_or_default(),
        })
        .collect()
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewRequestPayload {
    #[validate(custom(function = "validate_lines"))]
    pub produits: Vec<LinePayload>,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewRequestWrite {
    pub produits: Vec<LineWrite>,
}

impl NewRequestPayload {
    /// Chamar depois de `validate()`.
    pub fn to_write(&self) -> NewRequestWrite {
        NewRequestWrite { produits: lines_to_write(&self.produits) }
    }
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewExceptionalPayload {
    #[validate(custom(function = "validate_exceptional_lines"))]
    pub produits_exceptionnels: Vec<ExceptionalLinePayload>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ExceptionalLineWrite {
    pub name: String,
    pub marque: Option<String>,
    pub description: Option<String>,
    pub quantite: u32,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewExceptionalWrite {
    pub produits_exceptionnels: Vec<ExceptionalLineWrite>,
}

impl NewExceptionalPayload {
    pub fn to_write(&self) -> NewExceptionalWrite {
        let trimmed = |v: &Option<String>| {
            v.as_deref().map(str::trim).filter(|t| !t.is_empty()).map(str::to_string)
        };
        NewExceptionalWrite {
            produits_exceptionnels: self
                .produits_exceptionnels
                .iter()
                .map(|l| ExceptionalLineWrite {
                    name: l.name.trim().to_string(),
                    marque: trimmed(&l.marque),
                    description: trimmed(&l.description),
                    quantite: u32::try_from(l.quantite).unwrap_or_default(),
                })
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewOrderPayload {
    pub fournisseur_id: Uuid,
    #[validate(custom(function = "validate_lines"))]
    pub produits: Vec<LinePayload>,
    #[schema(value_type = String, example = "2025-03-10")]
    pub date_prevu: NaiveDate,
    /// Pedido de origem quando é uma reencomenda
    #[serde(default)]
    pub source_order_id: Option<Uuid>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewOrderWrite {
    pub fournisseur_id: Uuid,
    pub produits: Vec<LineWrite>,
    pub date_prevu: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_order_id: Option<Uuid>,
}

impl NewOrderPayload {
    pub fn to_write(&self) -> NewOrderWrite {
        NewOrderWrite {
            fournisseur_id: self.fournisseur_id,
            produits: lines_to_write(&self.produits),
            date_prevu: self.date_prevu,
            source_order_id: self.source_order_id,
        }
    }
}
