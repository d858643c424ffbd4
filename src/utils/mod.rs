//! Utilidades del sistema
//!
//! Este módulo contiene utilidades para manejo de errores, validación,
//! aritmética monetaria y JWT.

pub mod errors;
pub mod jwt;
pub mod money;
pub mod validation;
