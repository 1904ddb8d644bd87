// src/models/inventory.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError};

// Os nomes de campo seguem o contrato do backend (em francês).

// ---
// Validação customizada: texto só com espaços conta como vazio
// ---
pub(crate) fn validate_not_blank(val: &str) -> Result<(), ValidationError> {
    if val.trim().is_empty() {
        let mut err = ValidationError::new("blank");
        err.message = Some("Ce champ est obligatoire.".into());
        return Err(err);
    }
    Ok(())
}

// --- 1. Status do produto (sempre derivado da quantidade) ---
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum ProductStatus {
    #[serde(rename = "NORMALE")]
    Normal,
    #[serde(rename = "CRITIQUE")]
    Critical,
    #[serde(rename = "RUPTURE")]
    OutOfStock,
}

impl ProductStatus {
    pub fn from_quantities(quantity: u32, minimum_quantity: u32) -> Self {
        if quantity == 0 {
            ProductStatus::OutOfStock
        } else if quantity <= minimum_quantity {
            ProductStatus::Critical
        } else {
            ProductStatus::Normal
        }
    }

    /// CRITIQUE e RUPTURE disparam o alerta de estoque.
    pub fn needs_alert(&self) -> bool {
        !matches!(self, ProductStatus::Normal)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum ProductCriterion {
    #[serde(rename = "DURABLE")]
    Durable,
    #[serde(rename = "CONSOMMABLE")]
    Consumable,
}

// --- 2. Categorias ---
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Category {
    pub id: Uuid,
    #[serde(rename = "nom")]
    #[schema(example = "Papeterie")]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CategoryPayload {
    #[validate(custom(function = "validate_not_blank", message = "Le nom de la catégorie est obligatoire."))]
    #[schema(example = "Papeterie")]
    pub nom: String,
    #[validate(custom(function = "validate_not_blank", message = "La description est obligatoire."))]
    pub description: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct CategoryWrite {
    pub nom: String,
    pub description: String,
}

impl CategoryPayload {
    pub fn to_write(&self) -> CategoryWrite {
        CategoryWrite {
            nom: self.nom.trim().to_string(),
            description: self.description.trim().to_string(),
        }
    }
}

// --- 3. Produtos ---
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: Uuid,
    #[serde(rename = "nom")]
    #[schema(example = "Ramette A4")]
    pub name: String,
    #[serde(rename = "marque", default)]
    pub brand: Option<String>,
    #[serde(rename = "quantite")]
    pub quantity: u32,
    #[serde(rename = "quantiteMinimale", default)]
    pub minimum_quantity: u32,
    #[serde(rename = "categorieId", default)]
    pub category_id: Option<Uuid>,
    #[serde(rename = "categorie", default)]
    pub category: Option<Category>,
    #[serde(rename = "critere", default)]
    pub criterion: Option<ProductCriterion>,
    #[serde(rename = "remarque", default)]
    pub remark: Option<String>,
    #[serde(rename = "statut", default)]
    pub status: Option<ProductStatus>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Product {
    pub fn computed_status(&self) -> ProductStatus {
        ProductStatus::from_quantities(self.quantity, self.minimum_quantity)
    }

    /// Descarta o status guardado no backend e recalcula.
    pub fn with_computed_status(mut self) -> Self {
        self.status = Some(self.computed_status());
        self
    }

    /// Nome + marca, sem diferenciar maiúsculas, identificam um produto.
    pub fn same_identity(&self, name: &str, brand: Option<&str>) -> bool {
        let brand_a = self.brand.as_deref().unwrap_or("").trim().to_lowercase();
        let brand_b = brand.unwrap_or("").trim().to_lowercase();
        self.name.trim().to_lowercase() == name.trim().to_lowercase() && brand_a == brand_b
    }
}

// Corpo enviado ao backend em POST/PUT /api/admin/produit
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductWrite {
    #[serde(rename = "nom")]
    pub name: String,
    #[serde(rename = "marque")]
    pub brand: String,
    #[serde(rename = "quantite")]
    pub quantity: u32,
    #[serde(rename = "quantiteMinimale")]
    pub minimum_quantity: u32,
    #[serde(rename = "categorieId")]
    pub category_id: Uuid,
    #[serde(rename = "fournisseurId", skip_serializing_if = "Option::is_none")]
    pub supplier_id: Option<Uuid>,
    #[serde(rename = "remarque")]
    pub remark: Option<String>,
    #[serde(rename = "critere")]
    pub criterion: ProductCriterion,
    #[serde(rename = "statut")]
    pub status: ProductStatus,
}

// Entrada da API (criação e edição). Quantidades chegam como i64 para que um
// número negativo vire erro de validação, e não erro de JSON.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductPayload {
    #[validate(custom(function = "validate_not_blank", message = "Le nom du produit est obligatoire."))]
    #[schema(example = "Ramette A4")]
    pub nom: String,
    #[serde(default)]
    pub marque: String,
    #[validate(range(min = 0, max = 4294967295_i64, message = "La quantité doit être un entier non négatif."))]
    pub quantite: i64,
    #[validate(range(min = 0, max = 4294967295_i64, message = "La quantité minimale doit être un entier non négatif."))]
    pub quantite_minimale: i64,
    pub categorie_id: Uuid,
    #[serde(default)]
    pub fournisseur_id: Option<Uuid>,
    #[serde(default)]
    pub remarque: Option<String>,
    pub critere: ProductCriterion,
}

impl ProductPayload {
    /// Corpo para o backend, já com o status calculado. Chamar depois de `validate()`.
    pub fn to_write(&self) -> ProductWrite {
        let quantity = u32::try_from(self.quantite).unwrap_or_default();
        let minimum_quantity = u32::try_from(self.quantite_minimale).unwrap_or_default();
        ProductWrite {
            name: self.nom.trim().to_string(),
            brand: self.marque.trim().to_string(),
            quantity,
            minimum_quantity,
            category_id: self.categorie_id,
            supplier_id: self.fournisseur_id,
            remark: self.remarque.clone().filter(|r| !r.trim().is_empty()),
            criterion: self.critere,
            status: ProductStatus::from_quantities(quantity, minimum_quantity),
        }
    }
}

// Produto como aparece no alerta de estoque
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StockAlertProduct {
    pub id: Uuid,
    pub nom: String,
    pub marque: Option<String>,
    pub quantite: u32,
    pub quantite_minimale: u32,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StockAlert {
    pub low_stock_products: Vec<StockAlertProduct>,
    pub rupture_products: Vec<StockAlertProduct>,
}

impl StockAlert {
    pub fn for_product(product: &Product) -> Option<Self> {
        Self::for_products(std::slice::from_ref(product))
    }

    /// Um alerta só, com todos os produtos baixos ou esgotados.
    pub fn for_products(products: &[Product]) -> Option<Self> {
        let mut alert = StockAlert { low_stock_products: vec![], rupture_products: vec![] };
        for product in products {
            let status = product.computed_status();
            if !status.needs_alert() {
                continue;
            }
            let entry = StockAlertProduct {
                id: product.id,
                nom: product.name.clone(),
                marque: product.brand.clone(),
                quantite: product.quantity,
                quantite_minimale: product.minimum_quantity,
            };
            match status {
                ProductStatus::OutOfStock => alert.rupture_products.push(entry),
                _ => alert.low_stock_products.push(entry),
            }
        }
        (!alert.low_stock_products.is_empty() || !alert.rupture_products.is_empty()).then_some(alert)
    }
}

// --- 4. Fornecedores ---
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct SupplierCounts {
    #[serde(rename = "commandes", default)]
    pub orders: u32,
    #[serde(rename = "produits", default)]
    pub products: u32,
    #[serde(rename = "demandesExceptionnelles", default)]
    pub exceptional_requests: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Supplier {
    pub id: Uuid,
    #[serde(rename = "nom")]
    pub name: String,
    #[serde(default)]
    pub contact: String,
    #[serde(rename = "_count", default)]
    pub counts: SupplierCounts,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Supplier {
    pub fn can_be_deleted(&self) -> bool {
        self.counts.orders == 0 && self.counts.exceptional_requests == 0
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SupplierWrite {
    pub nom: String,
    pub contact: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub produit_ids: Vec<Uuid>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SupplierPayload {
    #[validate(custom(function = "validate_not_blank", message = "Le nom du fournisseur est obligatoire."))]
    pub nom: String,
    #[validate(custom(function = "validate_not_blank", message = "Le contact est obligatoire."))]
    pub contact: String,
    #[serde(default)]
    pub produit_ids: Vec<Uuid>,
}

impl SupplierPayload {
    pub fn to_write(&self) -> SupplierWrite {
        SupplierWrite {
            nom: self.nom.trim().to_string(),
            contact: self.contact.trim().to_string(),
            produit_ids: self.produit_ids.clone(),
        }
    }
}
