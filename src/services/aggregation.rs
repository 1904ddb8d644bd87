// src/services/aggregation.rs

use std::collections::{HashMap, HashSet};

use serde_json::Value;

use crate::models::dashboard::{
    CategoryStock, CategoryUsage, CategoryUsageSummary, DashboardProduct, MonthlyOrders,
    MonthlyOrdersAndRequests, MonthlyRequests, ProductMonthStats, ProductOrderLine,
    RequesterBreakdown, RequesterRecord, RequesterShape, RequesterTotal, StockMovementRow,
    StockShare,
};

// Funções puras: nada aqui faz I/O.

pub const FISCAL_MONTHS: [&str; 12] = [
    "January", "February", "March", "April", "May", "June",
    "July", "August", "September", "October", "November", "December",
];

const MONTH_ALIASES: &[(&str, &str)] = &[
    ("january", "January"),
    ("february", "February"),
    ("march", "March"),
    ("april", "April"),
    ("may", "May"),
    ("june", "June"),
    ("july", "July"),
    ("august", "August"),
    ("september", "September"),
    ("october", "October"),
    ("november", "November"),
    ("december", "December"),
    ("jan", "January"),
    ("feb", "February"),
    ("mar", "March"),
    ("apr", "April"),
    ("jun", "June"),
    ("jul", "July"),
    ("aug", "August"),
    ("sep", "September"),
    ("sept", "September"),
    ("oct", "October"),
    ("nov", "November"),
    ("dec", "December"),
];

const REQUESTER_MONTH_KEY: &str = "month";
const FLAT_REQUESTER_KEY: &str = "Demandeur";
const FLAT_COUNT_KEY: &str = "Nombre";
const UNKNOWN_REQUESTER: &str = "Unknown";

// ---
// 1. Meses
// ---

/// "jan", "Jan" e "January" viram "January". Desconhecidos passam sem alteração.
pub fn normalize_month_name(month: &str) -> String {
    let key = month.trim().to_lowercase();
    MONTH_ALIASES
        .iter()
        .find(|(alias, _)| *alias == key)
        .map(|(_, canonical)| canonical.to_string())
        .unwrap_or_else(|| month.to_string())
}

/// União dos meses das duas séries, na ordem em que aparecem (pedidos primeiro).
/// Mês repetido numa mesma série: vale o primeiro registro.
pub fn merge_month_series(
    orders: &[MonthlyOrders],
    requests: &[MonthlyRequests],
) -> Vec<MonthlyOrdersAndRequests> {
    let mut merged: Vec<MonthlyOrdersAndRequests> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut seen_orders: HashSet<String> = HashSet::new();
    let mut seen_requests: HashSet<String> = HashSet::new();

    let mut slot = |month: String, merged: &mut Vec<MonthlyOrdersAndRequests>| -> usize {
        *index.entry(month.clone()).or_insert_with(|| {
            merged.push(MonthlyOrdersAndRequests { month, commandes: 0, demandes: 0 });
            merged.len() - 1
        })
    };

    for entry in orders {
        let month = normalize_month_name(&entry.month);
        if !seen_orders.insert(month.clone()) {
            continue;
        }
        let i = slot(month, &mut merged);
        merged[i].commandes = entry.commandes;
    }

    for entry in requests {
        let month = normalize_month_name(&entry.month);
        if !seen_requests.insert(month.clone()) {
            continue;
        }
        let i = slot(month, &mut merged);
        merged[i].demandes = entry.demandes;
    }

    merged
}

/// Sempre 12 registros, de janeiro a dezembro; mês ausente vira registro zerado.
pub fn complete_fiscal_months(stats: &[ProductMonthStats]) -> Vec<ProductMonthStats> {
    let mut by_month: HashMap<String, &ProductMonthStats> = HashMap::new();
    for entry in stats {
        by_month.entry(normalize_month_name(&entry.month)).or_insert(entry);
    }

    FISCAL_MONTHS
        .iter()
        .map(|month| match by_month.get(*month) {
            Some(existing) => ProductMonthStats { month: month.to_string(), ..(*existing).clone() },
            None => ProductMonthStats::zero(month),
        })
        .collect()
}

// ---
// 2. Uso por categoria
// ---

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UsageBucket {
    Pending,
    Delivered,
    Returned,
    Cancelled,
}

// Ordem importa: o primeiro balde que casar fica com a linha.
const BUCKET_KEYWORDS: &[(UsageBucket, &[&str])] = &[
    (UsageBucket::Pending, &["attente", "pending"]),
    (UsageBucket::Delivered, &["livrée", "livree", "delivered"]),
    (UsageBucket::Returned, &["retour", "returned"]),
    (UsageBucket::Cancelled, &["annulée", "annulee", "cancel"]),
];

pub fn classify_usage_status(status: &str) -> Option<UsageBucket> {
    let status = status.to_lowercase();
    BUCKET_KEYWORDS
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|k| status.contains(k)))
        .map(|(bucket, _)| *bucket)
}

/// Conta uma unidade por linha classificada, no balde do status e na categoria do produto.
pub fn aggregate_category_usage(
    lines: &[ProductOrderLine],
    products: &[DashboardProduct],
    stock: &[CategoryStock],
) -> CategoryUsageSummary {
    let mut usage: Vec<CategoryUsage> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    let seeds: Vec<&str> = if products.iter().all(|p| p.category.is_none()) {
        stock.iter().map(|s| s.category.as_str()).collect()
    } else {
        products.iter().filter_map(|p| p.category.as_deref()).collect()
    };
    for category in seeds {
        if !category.is_empty() && !index.contains_key(category) {
            index.insert(category.to_string(), usage.len());
            usage.push(CategoryUsage::new(category));
        }
    }

    let products_by_id: HashMap<_, _> = products.iter().map(|p| (p.id, p)).collect();
    let mut skipped = 0;
    let mut unclassified = 0;

    for line in lines {
        let Some(product) = line.product_id.and_then(|id| products_by_id.get(&id)) else {
            tracing::warn!("Linha sem produto conhecido (productId: {:?}), ignorada", line.product_id);
            skipped += 1;
            continue;
        };
        let Some(category) = product.category.as_deref() else {
            tracing::warn!("Produto {} ({}) sem categoria, ignorado", product.nom, product.id);
            skipped += 1;
            continue;
        };

        let status = line.status.as_deref().unwrap_or("");
        let Some(bucket) = classify_usage_status(status) else {
            tracing::warn!("Status desconhecido \"{}\" para o produto {}", status, product.id);
            unclassified += 1;
            continue;
        };

        let i = *index.entry(category.to_string()).or_insert_with(|| {
            usage.push(CategoryUsage::new(category));
            usage.len() - 1
        });
        let entry = &mut usage[i];
        match bucket {
            UsageBucket::Pending => entry.en_attente += 1,
            UsageBucket::Delivered => entry.livree += 1,
            UsageBucket::Returned => entry.en_retour += 1,
            UsageBucket::Cancelled => entry.annulee += 1,
        }
    }

    CategoryUsageSummary {
        categories: usage.into_iter().filter(|c| c.total() > 0).collect(),
        unclassified,
        skipped,
    }
}

// ---
// 3. Participação no estoque
// ---

/// Percentual com uma casa decimal. Estoque total zero usa 1 como divisor.
pub fn stock_shares(stock: &[CategoryStock]) -> Vec<StockShare> {
    let total: u64 = stock.iter().map(|s| s.stock).sum();
    let denominator = total.max(1) as f64;

    stock
        .iter()
        .map(|s| StockShare {
            category: s.category.clone(),
            stock: s.stock,
            percentage: round_one_decimal(s.stock as f64 / denominator * 100.0),
        })
        .collect()
}

fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

// ---
// 4. Demandas por demandante (dois formatos de resposta)
// ---

/// Formato mensal só quando TODOS os registros têm `month`.
pub fn detect_requester_shape(records: &[RequesterRecord]) -> RequesterShape {
    if !records.is_empty() && records.iter().all(|r| r.contains_key(REQUESTER_MONTH_KEY)) {
        RequesterShape::MonthIndexed
    } else {
        RequesterShape::Flat
    }
}

/// Verdadeiro se algum registro tem ao menos uma chave além de `month`.
/// Lista vazia ou só com meses vazios pede a busca alternativa.
pub fn requester_data_is_usable(records: &[RequesterRecord]) -> bool {
    records
        .iter()
        .any(|r| r.keys().any(|k| k != REQUESTER_MONTH_KEY))
}

fn as_count(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f.round() as u64)),
        Value::String(s) => s.trim().parse::<u64>().ok(),
        _ => None,
    }
}

pub fn aggregate_requesters(records: &[RequesterRecord]) -> RequesterBreakdown {
    let shape = detect_requester_shape(records);
    let mut totals: Vec<RequesterTotal> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    let mut add = |name: &str, count: u64| {
        let i = *index.entry(name.to_string()).or_insert_with(|| {
            totals.push(RequesterTotal { requester: name.to_string(), total: 0 });
            totals.len() - 1
        });
        totals[i].total += count;
    };

    match shape {
        RequesterShape::MonthIndexed => {
            for record in records {
                for (name, value) in record.iter().filter(|(k, _)| *k != REQUESTER_MONTH_KEY) {
                    add(name, as_count(value).unwrap_or(0));
                }
            }
        }
        RequesterShape::Flat => {
            for record in records {
                let Some(name) = record.get(FLAT_REQUESTER_KEY).and_then(Value::as_str) else {
                    continue;
                };
                if name == UNKNOWN_REQUESTER {
                    continue;
                }
                let count = record.get(FLAT_COUNT_KEY).and_then(as_count).unwrap_or(0);
                add(name, count);
            }
        }
    }

    RequesterBreakdown { shape, totals }
}

// ---
// 5. Totais usados pelos relatórios
// ---

pub fn order_request_totals(series: &[MonthlyOrdersAndRequests]) -> (u64, u64) {
    series
        .iter()
        .fold((0, 0), |(c, d), m| (c + m.commandes, d + m.demandes))
}

/// (aprovadas, entregues) somadas no período.
pub fn weekly_product_totals(stats: &[ProductMonthStats]) -> (u64, u64) {
    stats
        .iter()
        .fold((0, 0), |(a, d), m| (a + m.approved, d + m.delivered))
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct StockMovementTable {
    pub products: Vec<String>,
    /// (mês, uma quantidade por produto, na ordem de `products`)
    pub rows: Vec<(String, Vec<u64>)>,
}

/// Meses nas linhas, produtos nas colunas. Célula ausente vale zero.
pub fn stock_movement_table(rows: &[StockMovementRow]) -> StockMovementTable {
    let mut products: Vec<String> = Vec::new();
    for row in rows {
        for key in row.keys().filter(|k| *k != REQUESTER_MONTH_KEY) {
            if !products.contains(key) {
                products.push(key.clone());
            }
        }
    }

    let rows = rows
        .iter()
        .map(|row| {
            let month = row
                .get(REQUESTER_MONTH_KEY)
                .and_then(Value::as_str)
                .map(normalize_month_name)
                .unwrap_or_default();
            let cells = products
                .iter()
                .map(|p| row.get(p).and_then(as_count).unwrap_or(0))
                .collect();
            (month, cells)
        })
        .collect();

    StockMovementTable { products, rows }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use uuid::Uuid;

    fn orders(items: &[(&str, u64)]) -> Vec<MonthlyOrders> {
        items
            .iter()
            .map(|(m, c)| MonthlyOrders { month: m.to_string(), commandes: *c })
            .collect()
    }

    fn requests(items: &[(&str, u64)]) -> Vec<MonthlyRequests> {
        items
            .iter()
            .map(|(m, d)| MonthlyRequests { month: m.to_string(), demandes: *d })
            .collect()
    }

    fn records(value: Value) -> Vec<RequesterRecord> {
        serde_json::from_value(value).unwrap()
    }

    fn product(nom: &str, category: Option<&str>) -> DashboardProduct {
        DashboardProduct {
            id: Uuid::new_v4(),
            nom: nom.to_string(),
            category: category.map(str::to_string),
        }
    }

    fn line(product: &DashboardProduct, status: &str) -> ProductOrderLine {
        ProductOrderLine {
            product_id: Some(product.id),
            status: Some(status.to_string()),
            ..Default::default()
        }
    }

    // --- Meses ---

    #[test]
    fn normalization_is_idempotent_and_case_insensitive() {
        assert_eq!(normalize_month_name("jan"), "January");
        assert_eq!(normalize_month_name("January"), "January");
        assert_eq!(normalize_month_name("JAN"), "January");
        assert_eq!(normalize_month_name(" sept "), "September");
        for month in FISCAL_MONTHS {
            assert_eq!(normalize_month_name(month), month);
            assert_eq!(normalize_month_name(&normalize_month_name(month)), month);
        }
    }

    #[test]
    fn unknown_month_passes_through() {
        assert_eq!(normalize_month_name("janvier 2025"), "janvier 2025");
        assert_eq!(normalize_month_name(""), "");
    }

    #[test]
    fn merged_series_matches_documented_example() {
        let merged = merge_month_series(&orders(&[("Jan", 5)]), &requests(&[("February", 2)]));
        assert_eq!(
            merged,
            vec![
                MonthlyOrdersAndRequests { month: "January".into(), commandes: 5, demandes: 0 },
                MonthlyOrdersAndRequests { month: "February".into(), commandes: 0, demandes: 2 },
            ]
        );
    }

    #[test]
    fn merged_series_has_each_month_once() {
        let merged = merge_month_series(
            &orders(&[("mar", 1), ("Apr", 2), ("foo", 9)]),
            &requests(&[("march", 3), ("MAY", 4), ("foo", 1)]),
        );
        let months: Vec<&str> = merged.iter().map(|m| m.month.as_str()).collect();
        assert_eq!(months, vec!["March", "April", "foo", "May"]);
        assert_eq!(merged[0], MonthlyOrdersAndRequests { month: "March".into(), commandes: 1, demandes: 3 });
        assert_eq!(merged[3].commandes, 0);
    }

    #[test]
    fn duplicate_month_in_one_series_keeps_first() {
        let merged = merge_month_series(&orders(&[("Jan", 5), ("january", 7)]), &[]);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].commandes, 5);
    }

    #[test]
    fn fiscal_completion_yields_twelve_months_in_order() {
        let sparse = vec![
            ProductMonthStats { month: "dec".into(), approved: 1, ..Default::default() },
            ProductMonthStats { month: "March".into(), delivered: 4, quantity_entree: 40, ..Default::default() },
        ];
        let full = complete_fiscal_months(&sparse);
        assert_eq!(full.len(), 12);
        let months: Vec<&str> = full.iter().map(|m| m.month.as_str()).collect();
        assert_eq!(months, FISCAL_MONTHS.to_vec());
        assert_eq!(full[2].delivered, 4);
        assert_eq!(full[2].quantity_entree, 40);
        assert_eq!(full[11].approved, 1);
        assert_eq!(full[0], ProductMonthStats::zero("January"));
    }

    #[test]
    fn fiscal_completion_of_empty_input_is_all_zero() {
        let full = complete_fiscal_months(&[]);
        assert_eq!(full.len(), 12);
        for (stats, month) in full.iter().zip(FISCAL_MONTHS) {
            assert_eq!(*stats, ProductMonthStats::zero(month));
        }
    }

    // --- Uso por categoria ---

    #[test]
    fn classification_order_and_accents() {
        assert_eq!(classify_usage_status("EN_ATTENTE"), Some(UsageBucket::Pending));
        assert_eq!(classify_usage_status("Livrée"), Some(UsageBucket::Delivered));
        assert_eq!(classify_usage_status("LIVREE"), Some(UsageBucket::Delivered));
        assert_eq!(classify_usage_status("EN_RETOUR"), Some(UsageBucket::Returned));
        assert_eq!(classify_usage_status("ANNULEE"), Some(UsageBucket::Cancelled));
        assert_eq!(classify_usage_status("canceled"), Some(UsageBucket::Cancelled));
        assert_eq!(classify_usage_status("EN_COURS"), None);
        assert_eq!(classify_usage_status(""), None);
    }

    #[test]
    fn aggregation_never_double_counts() {
        let paper = product("Ramette", Some("Papeterie"));
        let toner = product("Toner", Some("Informatique"));
        let lines = vec![
            line(&paper, "EN_ATTENTE"),
            line(&paper, "LIVREE"),
            line(&paper, "livrée"),
            line(&paper, "EN_COURS"),
            line(&toner, "EN_RETOUR"),
        ];

        let summary = aggregate_category_usage(&lines, &[paper.clone(), toner.clone()], &[]);
        assert_eq!(summary.unclassified, 1);
        assert_eq!(summary.skipped, 0);

        let papeterie = &summary.categories[0];
        assert_eq!(papeterie.category, "Papeterie");
        assert_eq!(papeterie.total(), 3);
        assert_eq!(papeterie.livree, 2);
        assert_eq!(summary.categories[1].en_retour, 1);

        let classified: u64 = summary.categories.iter().map(CategoryUsage::total).sum();
        assert_eq!(classified as usize, lines.len() - summary.unclassified - summary.skipped);
    }

    #[test]
    fn unknown_products_and_missing_categories_are_skipped() {
        let known = product("Stylo", Some("Papeterie"));
        let orphan = product("Agrafeuse", None);
        let lines = vec![
            line(&known, "pending"),
            line(&orphan, "pending"),
            ProductOrderLine { product_id: Some(Uuid::new_v4()), status: Some("pending".into()), ..Default::default() },
            ProductOrderLine { product_id: None, status: Some("pending".into()), ..Default::default() },
        ];
        let summary = aggregate_category_usage(&lines, &[known, orphan], &[]);
        assert_eq!(summary.skipped, 3);
        assert_eq!(summary.categories.len(), 1);
        assert_eq!(summary.categories[0].en_attente, 1);
    }

    #[test]
    fn empty_categories_are_dropped_and_seed_falls_back_to_stock() {
        let bare = product("Ramette", None);
        let stock = vec![
            CategoryStock { category: "A".into(), stock: 10 },
            CategoryStock { category: "B".into(), stock: 0 },
        ];
        let summary = aggregate_category_usage(&[line(&bare, "LIVREE")], &[bare.clone()], &stock);
        // Produto sem categoria: a linha é ignorada e as sementes vazias somem
        assert!(summary.categories.is_empty());
        assert_eq!(summary.skipped, 1);
    }

    // --- Estoque ---

    #[test]
    fn stock_section_renders_percentages() {
        let stock = vec![
            CategoryStock { category: "A".into(), stock: 40 },
            CategoryStock { category: "B".into(), stock: 60 },
        ];
        let rendered: Vec<String> = stock_shares(&stock).iter().map(ToString::to_string).collect();
        assert_eq!(rendered, vec!["A: 40 (40.0%)", "B: 60 (60.0%)"]);
    }

    #[test]
    fn zero_total_stock_gives_zero_percent() {
        let stock = vec![
            CategoryStock { category: "A".into(), stock: 0 },
            CategoryStock { category: "B".into(), stock: 0 },
        ];
        for share in stock_shares(&stock) {
            assert!(share.percentage.is_finite());
            assert_eq!(share.percentage, 0.0);
        }
    }

    #[test]
    fn percentages_round_to_one_decimal() {
        let stock = vec![
            CategoryStock { category: "A".into(), stock: 1 },
            CategoryStock { category: "B".into(), stock: 2 },
        ];
        let shares = stock_shares(&stock);
        assert_eq!(shares[0].percentage, 33.3);
        assert_eq!(shares[1].percentage, 66.7);
    }

    // --- Demandantes ---

    #[test]
    fn month_indexed_shape_totals_every_requester_key() {
        let data = records(json!([
            { "month": "January", "Alice": 2, "Bob": 1 },
            { "month": "February", "Alice": 3, "Carla": "4" }
        ]));
        assert_eq!(detect_requester_shape(&data), RequesterShape::MonthIndexed);

        let breakdown = aggregate_requesters(&data);
        assert_eq!(breakdown.shape, RequesterShape::MonthIndexed);
        let totals: Vec<(&str, u64)> =
            breakdown.totals.iter().map(|t| (t.requester.as_str(), t.total)).collect();
        assert_eq!(totals.len(), 3);
        assert!(totals.contains(&("Alice", 5)));
        assert!(totals.contains(&("Bob", 1)));
        assert!(totals.contains(&("Carla", 4)));
    }

    #[test]
    fn flat_shape_sums_per_requester_without_unknown() {
        let data = records(json!([
            { "Demandeur": "Alice", "Nombre": 2 },
            { "Demandeur": "Unknown", "Nombre": 7 },
            { "Demandeur": "Alice", "Nombre": 1 },
            { "Demandeur": "Bob", "Nombre": 4 }
        ]));
        assert_eq!(detect_requester_shape(&data), RequesterShape::Flat);

        let breakdown = aggregate_requesters(&data);
        assert_eq!(
            breakdown.totals,
            vec![
                RequesterTotal { requester: "Alice".into(), total: 3 },
                RequesterTotal { requester: "Bob".into(), total: 4 },
            ]
        );
    }

    #[test]
    fn mixed_records_are_treated_as_flat() {
        let data = records(json!([
            { "month": "January", "Alice": 2 },
            { "Demandeur": "Bob", "Nombre": 1 }
        ]));
        assert_eq!(detect_requester_shape(&data), RequesterShape::Flat);
    }

    #[test]
    fn empty_requester_data_is_not_usable() {
        assert!(!requester_data_is_usable(&[]));
        assert!(!requester_data_is_usable(&records(json!([{}, { "month": "May" }]))));
        assert!(requester_data_is_usable(&records(json!([{ "month": "May", "Alice": 1 }]))));
    }

    // --- Totais e movimento ---

    #[test]
    fn totals_sum_the_series() {
        let merged = merge_month_series(&orders(&[("Jan", 5), ("Feb", 1)]), &requests(&[("Feb", 2)]));
        assert_eq!(order_request_totals(&merged), (6, 2));

        let weekly = vec![
            ProductMonthStats { month: "May".into(), approved: 2, delivered: 1, ..Default::default() },
            ProductMonthStats { month: "June".into(), approved: 1, delivered: 3, ..Default::default() },
        ];
        assert_eq!(weekly_product_totals(&weekly), (3, 4));
    }

    #[test]
    fn movement_table_fills_missing_cells() {
        let rows: Vec<StockMovementRow> = serde_json::from_value(json!([
            { "month": "jan", "Ramette": 3 },
            { "month": "feb", "Toner": 2, "Ramette": 1 }
        ]))
        .unwrap();
        let table = stock_movement_table(&rows);
        assert_eq!(table.products, vec!["Ramette", "Toner"]);
        assert_eq!(table.rows[0], ("January".to_string(), vec![3, 0]));
        assert_eq!(table.rows[1], ("February".to_string(), vec![1, 2]));
    }
}
