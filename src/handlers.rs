pub mod dashboard;
pub mod exports;
pub mod inventory;
pub mod operations;
pub mod reports;
pub mod users;

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::{
    common::{error::OperationWarning, i18n::I18nStore},
    middleware::i18n::Locale,
    services::Outcome,
};

// ?timeRange=7d (ausente = ano corrente)
#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct RangeQuery {
    #[param(example = "7d")]
    pub time_range: Option<String>,
}

impl RangeQuery {
    pub fn range(&self) -> Option<&str> {
        self.time_range.as_deref().map(str::trim).filter(|r| !r.is_empty())
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct WarningBody {
    #[schema(example = "STOCK_ALERT_NOT_SENT")]
    pub code: OperationWarning,
    pub message: String,
}

// Toda mutação responde { data, warnings }
#[derive(Debug, Serialize)]
pub struct MutationResponse<T> {
    pub data: T,
    pub warnings: Vec<WarningBody>,
}

impl<T> MutationResponse<T> {
    pub fn from_outcome(outcome: Outcome<T>, locale: &Locale, store: &I18nStore) -> Self {
        let warnings = outcome
            .warnings
            .into_iter()
            .map(|w| WarningBody { code: w, message: w.translate(locale, store) })
            .collect();
        Self { data: outcome.data, warnings }
    }
}
