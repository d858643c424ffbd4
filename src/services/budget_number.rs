//! Numeración de presupuestos: `BUD-<año>-<secuencia>`
//!
//! La secuencia es la cantidad de presupuestos con el prefijo del año más
//! uno, con al menos 3 dígitos. Pasado 999 el número se ensancha
//! (`BUD-2026-1000`) en lugar de truncarse. Los reintentos parten de la
//! mayor secuencia en uso, que tras borrar presupuestos puede superar a
//! la cantidad.

use chrono::{Datelike, Utc};

use crate::repositories::BudgetRepository;
use crate::utils::errors::AppResult;

/// Intentos de inserción ante colisiones de número
pub const MAX_NUMBER_ATTEMPTS: i64 = 5;

pub fn year_prefix(year: i32) -> String {
    format!("BUD-{}-", year)
}

pub fn format_budget_number(year: i32, sequence: i64) -> String {
    format!("{}{:03}", year_prefix(year), sequence)
}

/// Número candidato para el año en curso.
///
/// `attempt` empieza en 0 y usa `cantidad + 1`. Cada reintento tras un
/// `Conflict` usa `máxima secuencia + attempt`.
pub async fn next_budget_number(
    budgets: &dyn BudgetRepository,
    attempt: i64,
) -> AppResult<String> {
    let year = Utc::now().year();
    let prefix = year_prefix(year);
    let count = budgets.count_by_number_prefix(&prefix).await?;

    let sequence = if attempt == 0 {
        count + 1
    } else {
        let max = budgets.max_sequence_by_prefix(&prefix).await?.unwrap_or(0);
        max.max(count) + attempt
    };
    Ok(format_budget_number(year, sequence))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::budget::{Budget, BudgetDetails};
    use crate::repositories::InMemoryStore;
    use uuid::Uuid;

    async fn insert_numbered(store: &InMemoryStore, year: i32, sequence: i64) -> Uuid {
        let mut budget = Budget::draft(Uuid::new_v4(), vec![], BudgetDetails::default());
        budget.budget_number = format_budget_number(year, sequence);
        store.insert(&budget).await.unwrap();
        budget.id
    }

    #[test]
    fn test_format_pads_to_three_digits() {
        assert_eq!(format_budget_number(2026, 1), "BUD-2026-001");
        assert_eq!(format_budget_number(2026, 42), "BUD-2026-042");
        assert_eq!(format_budget_number(2026, 999), "BUD-2026-999");
    }

    #[test]
    fn test_format_widens_past_999() {
        assert_eq!(format_budget_number(2026, 1000), "BUD-2026-1000");
        assert!(format_budget_number(2026, 1000).starts_with(&year_prefix(2026)));
    }

    #[tokio::test]
    async fn test_next_number_on_empty_store() {
        let store = InMemoryStore::default();
        let year = Utc::now().year();
        assert_eq!(
            next_budget_number(&store, 0).await.unwrap(),
            format_budget_number(year, 1)
        );
        assert_eq!(
            next_budget_number(&store, 2).await.unwrap(),
            format_budget_number(year, 2)
        );
    }

    #[tokio::test]
    async fn test_retry_skips_past_highest_sequence_after_deletes() {
        let store = InMemoryStore::default();
        let year = Utc::now().year();
        let mut ids = Vec::new();
        for sequence in 1..=10 {
            ids.push(insert_numbered(&store, year, sequence).await);
        }
        for id in &ids[..5] {
            store.delete(*id).await.unwrap();
        }

        // el primer intento choca con 006, que sigue en uso
        assert_eq!(
            next_budget_number(&store, 0).await.unwrap(),
            format_budget_number(year, 6)
        );
        assert_eq!(
            next_budget_number(&store, 1).await.unwrap(),
            format_budget_number(year, 11)
        );
    }

    #[tokio::test]
    async fn test_max_sequence_ignores_other_years() {
        let store = InMemoryStore::default();
        let year = Utc::now().year();
        insert_numbered(&store, year - 1, 40).await;
        insert_numbered(&store, year, 7).await;

        assert_eq!(
            store.max_sequence_by_prefix(&year_prefix(year)).await.unwrap(),
            Some(7)
        );
        assert_eq!(
            store.max_sequence_by_prefix(&year_prefix(year + 1)).await.unwrap(),
            None
        );
    }
}
