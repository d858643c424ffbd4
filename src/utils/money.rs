//! Aritmética monetaria
//!
//! Todos los importes del sistema son `Decimal`; acá viven las reglas de
//! redondeo y la tasa de IVA.

use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;

/// Tasa de IVA aplicada a todo presupuesto
pub const IVA_RATE: Decimal = dec!(0.10);

/// Redondeo a 2 decimales, empates lejos de cero (62.125 -> 62.13)
pub fn round2(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Aplica un margen porcentual sobre un costo: `cost * (1 + margin / 100)`
pub fn apply_margin(cost: Decimal, margin: Decimal) -> Decimal {
    cost * (Decimal::ONE + margin / Decimal::ONE_HUNDRED)
}

/// IVA exacto sobre un subtotal
pub fn iva_of(subtotal: Decimal) -> Decimal {
    subtotal * IVA_RATE
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round2_ties_away_from_zero() {
        assert_eq!(round2(dec!(62.125)), dec!(62.13));
        assert_eq!(round2(dec!(62.124)), dec!(62.12));
        assert_eq!(round2(dec!(-1.005)), dec!(-1.01));
        assert_eq!(round2(dec!(10)), dec!(10));
    }

    #[test]
    fn test_apply_margin() {
        assert_eq!(apply_margin(dec!(50), dec!(25)), dec!(62.5));
        assert_eq!(apply_margin(dec!(50), dec!(0)), dec!(50));
        assert_eq!(apply_margin(dec!(80), dec!(100)), dec!(160));
    }

    #[test]
    fn test_iva_is_exact() {
        assert_eq!(iva_of(dec!(123.45)), dec!(12.345));
        assert_eq!(iva_of(Decimal::ZERO), Decimal::ZERO);
    }
}
