// src/common/i18n.rs

use std::collections::HashMap;
use std::sync::LazyLock;

// Idioma usado quando o cliente não manda Accept-Language (ou manda um que não temos)
pub const DEFAULT_LANG: &str = "fr";

// (idioma, chave, mensagem)
const MESSAGES: &[(&str, &str, &str)] = &[
    // --- Validação ---
    ("fr", "validation_failed", "Un ou plusieurs champs sont invalides."),
    ("en", "validation_failed", "One or more fields are invalid."),
    ("fr", "duplicate_product", "Un produit avec ce nom et cette marque existe déjà."),
    ("en", "duplicate_product", "A product with this name and brand already exists."),
    ("fr", "rejection_reason_required", "Le motif de rejet est requis."),
    ("en", "rejection_reason_required", "A rejection reason is required."),
    ("fr", "return_reason_required", "Le motif du retour est requis pour le statut EN_RETOUR."),
    ("en", "return_reason_required", "A return reason is required for the EN_RETOUR status."),
    ("fr", "request_not_pending", "La demande n'est pas en attente."),
    ("en", "request_not_pending", "The request is not pending."),
    ("fr", "request_wrong_status", "La demande n'est pas dans l'état requis pour cette action."),
    ("en", "request_wrong_status", "The request is not in the status required for this action."),
    ("fr", "insufficient_stock", "Produit indisponible ou quantité insuffisante."),
    ("en", "insufficient_stock", "Product unavailable or insufficient quantity."),
    ("fr", "product_in_catalogue", "Ce produit existe déjà dans le catalogue : faites une demande normale."),
    ("en", "product_in_catalogue", "This product is already in the catalogue: make a regular request."),

    // --- Dependências ---
    ("fr", "supplier_has_dependencies", "Impossible de supprimer : le fournisseur a des commandes ou des demandes exceptionnelles."),
    ("en", "supplier_has_dependencies", "Cannot delete: the supplier still has orders or exceptional requests."),
    ("fr", "product_has_dependencies", "Impossible de supprimer : le produit est lié à des commandes ou des demandes."),
    ("en", "product_has_dependencies", "Cannot delete: the product is linked to orders or requests."),

    // --- Não encontrado ---
    ("fr", "product_not_found", "Produit introuvable."),
    ("en", "product_not_found", "Product not found."),
    ("fr", "supplier_not_found", "Fournisseur non trouvé."),
    ("en", "supplier_not_found", "Supplier not found."),
    ("fr", "request_not_found", "Demande non trouvée."),
    ("en", "request_not_found", "Request not found."),

    // --- Backend remoto ---
    ("fr", "upstream_status", "Le serveur de données a renvoyé une erreur."),
    ("en", "upstream_status", "The data server returned an error."),
    ("fr", "upstream_unauthorized", "Session expirée ou non authentifiée."),
    ("en", "upstream_unauthorized", "Session expired or not authenticated."),
    ("fr", "upstream_forbidden", "Vous n'avez pas le droit d'effectuer cette action."),
    ("en", "upstream_forbidden", "You are not allowed to perform this action."),
    ("fr", "upstream_unavailable", "Le serveur de données est injoignable."),
    ("en", "upstream_unavailable", "The data server is unreachable."),
    ("fr", "upstream_payload", "Réponse invalide du serveur de données."),
    ("en", "upstream_payload", "Invalid response from the data server."),

    // --- Relatórios ---
    ("fr", "no_report_data", "Aucune donnée disponible pour l'exportation."),
    ("en", "no_report_data", "No data available for export."),
    ("fr", "report_generation_failed", "Erreur lors de la génération du rapport."),
    ("en", "report_generation_failed", "The report could not be generated."),

    ("fr", "internal_error", "Une erreur inattendue est survenue."),
    ("en", "internal_error", "An unexpected error occurred."),

    // --- Avisos (efeitos secundários que não bloqueiam a ação) ---
    ("fr", "reporting_entry_not_recorded", "Erreur lors de l'enregistrement de l'action. Le traitement a continué."),
    ("en", "reporting_entry_not_recorded", "The action could not be recorded. Processing continued."),
    ("fr", "stock_alert_not_sent", "Stock mis à jour, mais l'alerte de stock n'a pas pu être envoyée."),
    ("en", "stock_alert_not_sent", "Stock updated, but the stock alert could not be sent."),
    ("fr", "requester_data_unavailable", "Impossible de récupérer les données des demandes par demandeur."),
    ("en", "requester_data_unavailable", "Requests-by-requester data could not be retrieved."),
    ("fr", "report_section_degraded", "Certaines sections du rapport sont incomplètes."),
    ("en", "report_section_degraded", "Some report sections are incomplete."),
];

static SHARED: LazyLock<I18nStore> = LazyLock::new(I18nStore::new);

#[derive(Debug, Clone)]
pub struct I18nStore {
    // idioma -> (chave -> mensagem)
    messages: HashMap<&'static str, HashMap<&'static str, &'static str>>,
}

impl I18nStore {
    pub fn new() -> Self {
        let mut messages: HashMap<&'static str, HashMap<&'static str, &'static str>> =
            HashMap::new();
        for (lang, key, msg) in MESSAGES {
            messages.entry(*lang).or_default().insert(*key, *msg);
        }
        Self { messages }
    }

    /// Instância global, usada onde não há AppState à mão (ex: `IntoResponse` de AppError).
    pub fn shared() -> &'static I18nStore {
        &SHARED
    }

    /// Procura a mensagem no idioma pedido, depois no idioma padrão.
    /// Sem tradução nenhuma devolvemos a própria chave.
    pub fn translate(&self, lang: &str, key: &str) -> String {
        let lookup = |lang: &str| self.messages.get(lang).and_then(|table| table.get(key));
        lookup(lang)
            .or_else(|| lookup(DEFAULT_LANG))
            .map(|msg| msg.to_string())
            .unwrap_or_else(|| key.to_string())
    }
}

impl Default for I18nStore {
    fn default() -> Self {
        Self::new()
    }
}
