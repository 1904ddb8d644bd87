// src/services/report_builder.rs

use std::collections::HashMap;

use chrono::{Datelike, Duration, NaiveDate};
use uuid::Uuid;

use crate::{
    models::{
        dashboard::{
            CategoryStock, DashboardProduct, DashboardStats, MonthlyOrdersAndRequests,
            ProductMonthStats, RequesterRecord, StockMovementRow, SupplierOrders,
        },
        reporting::ReportType,
    },
    services::aggregation,
};

const FRENCH_MONTHS: [&str; 12] = [
    "janvier", "février", "mars", "avril", "mai", "juin",
    "juillet", "août", "septembre", "octobre", "novembre", "décembre",
];

fn french_month(date: NaiveDate) -> &'static str {
    FRENCH_MONTHS[date.month0() as usize]
}

// "3 mars 2025"
fn french_long_date(date: NaiveDate) -> String {
    format!("{} {} {}", date.day(), french_month(date), date.year())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportWindow {
    /// Ano civil corrente
    Annual,
    /// Últimos 7 dias
    Weekly,
}

impl ReportWindow {
    pub fn time_range(&self) -> Option<&'static str> {
        match self {
            ReportWindow::Annual => None,
            ReportWindow::Weekly => Some("7d"),
        }
    }

    pub fn reporting_type(&self) -> ReportType {
        match self {
            ReportWindow::Annual => ReportType::AnnualReport,
            ReportWindow::Weekly => ReportType::WeeklyReport,
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            ReportWindow::Annual => "Rapport Annuel - Gestion des Stocks et Commandes",
            ReportWindow::Weekly => "Rapport Hebdomadaire - Gestion des Stocks et Commandes",
        }
    }

    fn period_column(&self) -> &'static str {
        match self {
            ReportWindow::Annual => "Mois",
            ReportWindow::Weekly => "Période",
        }
    }

    pub fn period_label(&self, today: NaiveDate) -> String {
        match self {
            ReportWindow::Annual => {
                let year = today.year();
                format!("janvier {} - décembre {}", year, year)
            }
            ReportWindow::Weekly => {
                let start = today - Duration::days(7);
                format!("{} - {}", french_long_date(start), french_long_date(today))
            }
        }
    }

    pub fn filename(&self, today: NaiveDate) -> String {
        match self {
            ReportWindow::Annual => format!("rapport-annuel-{}.pdf", today.year()),
            ReportWindow::Weekly => format!(
                "Rapport_Hebdomadaire_{:02}_{}_{}.pdf",
                today.day(),
                french_month(today),
                today.year()
            ),
        }
    }
}

// --- Documento, independente do formato de saída ---

#[derive(Debug, Clone, PartialEq)]
pub struct ReportTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl ReportTable {
    fn new<H: Into<String>>(headers: impl IntoIterator<Item = H>) -> Self {
        Self {
            headers: headers.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    fn row<C: ToString>(mut self, cells: impl IntoIterator<Item = C>) -> Self {
        self.rows.push(cells.into_iter().map(|c| c.to_string()).collect());
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ReportBlock {
    Subtitle(String),
    Table(ReportTable),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReportSection {
    pub heading: String,
    pub blocks: Vec<ReportBlock>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReportDocument {
    pub title: String,
    pub generated_on: String,
    pub period: String,
    pub sections: Vec<ReportSection>,
}

// Tudo o que o relatório precisa, já buscado (e possivelmente degradado).
#[derive(Debug, Clone, Default)]
pub struct ReportData {
    pub stats: DashboardStats,
    pub stock: Vec<CategoryStock>,
    pub orders_by_supplier: Vec<SupplierOrders>,
    pub products: Vec<DashboardProduct>,
    pub product_stats: HashMap<Uuid, Vec<ProductMonthStats>>,
    pub orders_and_requests: Vec<MonthlyOrdersAndRequests>,
    pub requesters: Vec<RequesterRecord>,
    pub stock_movement: Vec<StockMovementRow>,
}

pub fn build_report(window: ReportWindow, today: NaiveDate, data: &ReportData) -> ReportDocument {
    let period = window.period_label(today);

    let sections = vec![
        summary_section(&data.stats),
        stock_section(&data.stock),
        supplier_section(&data.orders_by_supplier),
        product_section(window, &period, data),
        orders_requests_section(window, &period, &data.orders_and_requests),
        requesters_section(&data.requesters),
        movement_section(window, &period, &data.stock_movement),
    ];

    ReportDocument {
        title: window.title().to_string(),
        generated_on: french_long_date(today),
        period,
        sections,
    }
}

fn section(heading: &str, blocks: Vec<ReportBlock>) -> ReportSection {
    ReportSection { heading: heading.to_string(), blocks }
}

fn summary_section(stats: &DashboardStats) -> ReportSection {
    let table = ReportTable::new(["Description", "Valeur"])
        .row(["Nombre Total de Commandes".to_string(), stats.orders_count.to_string()])
        .row(["Nombre d'Utilisateurs".to_string(), stats.users_count.to_string()])
        .row(["Nombre de Fournisseurs".to_string(), stats.suppliers_count.to_string()])
        .row(["Demandes Acceptées".to_string(), stats.accepted_demands_count.to_string()]);
    section("1. Résumé Général", vec![ReportBlock::Table(table)])
}

fn stock_section(stock: &[CategoryStock]) -> ReportSection {
    let mut table = ReportTable::new(["Catégorie", "Stock", "Pourcentage"]);
    let shares = aggregation::stock_shares(stock);
    if shares.is_empty() {
        table = table.row(["Aucune catégorie", "0", "0%"]);
    }
    for share in shares {
        table = table.row([
            share.category.clone(),
            share.stock.to_string(),
            format!("{:.1}%", share.percentage),
        ]);
    }
    section("2. Analyse des Stocks", vec![ReportBlock::Table(table)])
}

fn supplier_section(suppliers: &[SupplierOrders]) -> ReportSection {
    let mut table = ReportTable::new(["Fournisseur", "Commandes"]);
    if suppliers.is_empty() {
        table = table.row(["Aucun fournisseur", "0"]);
    }
    for supplier in suppliers {
        table = table.row([supplier.fournisseur.clone(), supplier.commandes.to_string()]);
    }
    section("3. Commandes par Fournisseur", vec![ReportBlock::Table(table)])
}

fn product_section(window: ReportWindow, period: &str, data: &ReportData) -> ReportSection {
    let mut blocks = Vec::new();
    let headers = [window.period_column(), "Quantité Sortie", "Quantité Entrée"];

    for product in &data.products {
        blocks.push(ReportBlock::Subtitle(format!("Produit : {}", product.nom)));
        let stats = data.product_stats.get(&product.id).map(Vec::as_slice).unwrap_or(&[]);
        let mut table = ReportTable::new(headers);

        match window {
            ReportWindow::Annual => {
                for month in aggregation::complete_fiscal_months(stats) {
                    table = table.row([
                        month.month,
                        month.quantity_sortie.to_string(),
                        month.quantity_entree.to_string(),
                    ]);
                }
            }
            ReportWindow::Weekly => {
                let (approved, delivered) = aggregation::weekly_product_totals(stats);
                table = table.row([period.to_string(), approved.to_string(), delivered.to_string()]);
            }
        }
        blocks.push(ReportBlock::Table(table));
    }

    if data.products.is_empty() {
        blocks.push(ReportBlock::Table(ReportTable::new(headers).row(["N/A", "0", "0"])));
    }
    section("4. Quantité Entrée et Sortie par Produit", blocks)
}

fn orders_requests_section(
    window: ReportWindow,
    period: &str,
    series: &[MonthlyOrdersAndRequests],
) -> ReportSection {
    let (orders, requests) = aggregation::order_request_totals(series);
    let mut table = ReportTable::new([window.period_column(), "Commandes", "Demandes"]);

    if window == ReportWindow::Annual {
        for month in series {
            table = table.row([month.month.clone(), month.commandes.to_string(), month.demandes.to_string()]);
        }
    } else {
        table = table.row([period.to_string(), orders.to_string(), requests.to_string()]);
    }
    table = table.row(["Total".to_string(), orders.to_string(), requests.to_string()]);

    section("5. Commandes et Demandes", vec![ReportBlock::Table(table)])
}

fn requesters_section(records: &[RequesterRecord]) -> ReportSection {
    let breakdown = aggregation::aggregate_requesters(records);
    let table = if breakdown.totals.is_empty() {
        ReportTable::new(["Demandeur", "Statut"]).row(["N/A", "Aucun demandeur valide trouvé"])
    } else {
        breakdown.totals.iter().fold(
            ReportTable::new(["Demandeur", "Nombre de Demandes"]),
            |table, t| table.row([t.requester.clone(), t.total.to_string()]),
        )
    };
    section("6. Demandes par Demandeur", vec![ReportBlock::Table(table)])
}

fn movement_section(window: ReportWindow, period: &str, rows: &[StockMovementRow]) -> ReportSection {
    let movement = aggregation::stock_movement_table(rows);
    let table = if movement.rows.is_empty() {
        let first_cell = match window {
            ReportWindow::Annual => "N/A",
            ReportWindow::Weekly => period,
        };
        ReportTable::new([window.period_column(), "Statut"]).row([first_cell, "Aucune donnée de stock"])
    } else {
        let headers = std::iter::once(window.period_column().to_string())
            .chain(movement.products.iter().cloned());
        movement.rows.into_iter().fold(ReportTable::new(headers), |table, (month, cells)| {
            table.row(std::iter::once(month).chain(cells.iter().map(u64::to_string)))
        })
    };
    section("7. Mouvement de Stock", vec![ReportBlock::Table(table)])
}
