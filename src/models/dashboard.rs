// src/models/dashboard.rs

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use utoipa::ToSchema;
use uuid::Uuid;

// Registros "abertos": uma chave por demandante / por produto.
pub type RequesterRecord = Map<String, Value>;
pub type StockMovementRow = Map<String, Value>;

// 1. Contadores gerais (os cards do topo)
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct DashboardStats {
    pub orders_count: u64,
    pub users_count: u64,
    pub suppliers_count: u64,
    pub accepted_demands_count: u64,
}

// 2. Estoque por categoria
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CategoryStock {
    pub category: String,
    #[serde(default)]
    pub stock: u64,
}

// 3. Uso por categoria (quatro baldes de status)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CategoryUsage {
    pub category: String,
    #[serde(default)]
    pub en_attente: u64,
    #[serde(default)]
    pub livree: u64,
    #[serde(default)]
    pub en_retour: u64,
    #[serde(default)]
    pub annulee: u64,
}

impl CategoryUsage {
    pub fn new(category: impl Into<String>) -> Self {
        Self { category: category.into(), ..Default::default() }
    }

    pub fn total(&self) -> u64 {
        self.en_attente + self.livree + self.en_retour + self.annulee
    }
}

// 4. Séries mensais
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MonthlyOrders {
    pub month: String,
    #[serde(default)]
    pub commandes: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MonthlyRequests {
    pub month: String,
    #[serde(default)]
    pub demandes: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct MonthlyOrdersAndRequests {
    pub month: String,
    pub commandes: u64,
    pub demandes: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SupplierOrders {
    pub fournisseur: String,
    #[serde(default)]
    pub commandes: u64,
}

// Linha de pedido/demanda por produto; o backend manda formatos variados.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct ProductOrderLine {
    pub product_id: Option<Uuid>,
    pub status: Option<String>,
    pub produit: Option<String>,
    pub demandes_acceptees: Option<u64>,
    pub commandes_livrees: Option<u64>,
}

// Produto como listado pelo dashboard (categoria já resolvida pelo nome)
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DashboardProduct {
    pub id: Uuid,
    pub nom: String,
    #[serde(default)]
    pub category: Option<String>,
}

// 5. Estatística mensal de um produto
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductMonthStats {
    pub month: String,
    #[serde(default)]
    pub approved: u64,
    #[serde(default)]
    pub delivered: u64,
    #[serde(default)]
    pub quantity_sortie: u64,
    #[serde(default)]
    pub quantity_entree: u64,
}

impl ProductMonthStats {
    pub fn zero(month: &str) -> Self {
        Self { month: month.to_string(), ..Default::default() }
    }
}

// --- Visões calculadas pelo serviço ---

#[derive(Debug, Clone, Default, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CategoryUsageSummary {
    pub categories: Vec<CategoryUsage>,
    /// Linhas com status fora dos quatro baldes
    pub unclassified: usize,
    /// Linhas sem produto ou sem categoria
    pub skipped: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct StockShare {
    pub category: String,
    pub stock: u64,
    pub percentage: f64,
}

impl std::fmt::Display for StockShare {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {} ({:.1}%)", self.category, self.stock, self.percentage)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct RequesterTotal {
    pub requester: String,
    pub total: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum RequesterShape {
    MonthIndexed,
    Flat,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RequesterBreakdown {
    pub shape: RequesterShape,
    pub totals: Vec<RequesterTotal>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductMonthlyView {
    pub product_id: Uuid,
    /// Sempre 12 meses, de janeiro a dezembro
    pub months: Vec<ProductMonthStats>,
    pub stock_flow: Vec<ProductMonthStats>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DashboardOverview {
    pub stats: DashboardStats,
    pub stock: Vec<StockShare>,
    pub usage: Vec<CategoryUsage>,
    pub orders_by_month: Vec<MonthlyOrders>,
    pub orders_and_requests: Vec<MonthlyOrdersAndRequests>,
    pub orders_by_supplier: Vec<SupplierOrders>,
    pub product_lines: Vec<ProductOrderLine>,
    pub products: Vec<DashboardProduct>,
    pub usage_by_category: CategoryUsageSummary,
    pub requesters: RequesterBreakdown,
}
