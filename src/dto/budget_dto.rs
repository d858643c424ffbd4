use serde::Serialize;

use crate::models::budget::Budget;
use crate::models::client::ClientSummary;

// Presupuesto con el resumen de su cliente, si todavía existe
#[derive(Debug, Clone, Serialize)]
pub struct BudgetResponse {
    #[serde(flatten)]
    pub budget: Budget,
    pub client: Option<ClientSummary>,
}
