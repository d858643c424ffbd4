//! Utilidades de validación
//!
//! Este módulo contiene funciones helper para validación de datos
//! y los extractores (`ValidatedJson`, `PathParam`, `QueryParams`) que
//! responden con el sobre de error estándar cuando el request es inválido.

use axum::{
    async_trait,
    extract::{FromRequest, FromRequestParts, Path, Query, Request},
    http::request::Parts,
    Json,
};
use lazy_static::lazy_static;
use regex::Regex;
use rust_decimal::Decimal;
use serde::{de::DeserializeOwned, Serialize};
use validator::{Validate, ValidationError};

use crate::utils::errors::AppError;

lazy_static! {
    /// Colores de UI en formato `#RRGGBB` o `#RGB`
    pub static ref HEX_COLOR_REGEX: Regex =
        Regex::new(r"^#([0-9a-fA-F]{3}|[0-9a-fA-F]{6})$").unwrap();
}

/// Validar que un string no esté vacío
pub fn validate_not_empty(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut error = ValidationError::new("not_empty");
        error.add_param("value".into(), &value.to_string());
        return Err(error);
    }
    Ok(())
}

/// Validar que un valor esté en un rango específico
pub fn validate_range<T: PartialOrd + std::fmt::Display + Serialize>(
    value: T,
    min: T,
    max: T,
) -> Result<(), ValidationError> {
    if value < min || value > max {
        let mut error = ValidationError::new("range");
        error.add_param("min".into(), &min);
        error.add_param("max".into(), &max);
        error.add_param("actual".into(), &value);
        return Err(error);
    }
    Ok(())
}

/// Validar que un valor sea positivo
pub fn validate_positive<T: PartialOrd + std::fmt::Display + num_traits::Zero + Serialize>(
    value: T,
) -> Result<(), ValidationError> {
    if value <= T::zero() {
        let mut error = ValidationError::new("positive");
        error.add_param("value".into(), &value);
        return Err(error);
    }
    Ok(())
}

/// Validar que un valor sea no negativo
pub fn validate_non_negative<T: PartialOrd + std::fmt::Display + num_traits::Zero + Serialize>(
    value: T,
) -> Result<(), ValidationError> {
    if value < T::zero() {
        let mut error = ValidationError::new("non_negative");
        error.add_param("value".into(), &value);
        return Err(error);
    }
    Ok(())
}

/// Margen porcentual en [0, 100]
pub fn validate_margin(value: &Decimal) -> Result<(), ValidationError> {
    validate_range(*value, Decimal::ZERO, Decimal::ONE_HUNDRED).map_err(|mut e| {
        e.message = Some("El margen debe estar entre 0 y 100".into());
        e
    })
}

/// Precio >= 0
pub fn validate_price(value: &Decimal) -> Result<(), ValidationError> {
    validate_non_negative(*value).map_err(|mut e| {
        e.message = Some("El precio no puede ser negativo".into());
        e
    })
}

/// Cantidad > 0
pub fn validate_quantity(value: &Decimal) -> Result<(), ValidationError> {
    validate_positive(*value).map_err(|mut e| {
        e.message = Some("La cantidad debe ser mayor a 0".into());
        e
    })
}

/// Texto requerido (no vacío tras recortar espacios)
pub fn validate_required_text(value: &str) -> Result<(), ValidationError> {
    validate_not_empty(value).map_err(|mut e| {
        e.message = Some("El campo es requerido".into());
        e
    })
}

/// Extractor JSON que deserializa y valida el cuerpo del request.
///
/// Los errores de formato se devuelven como `BadRequest` y los de
/// validación como `Validation`, ambos con el sobre de error estándar.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidatedJson<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| AppError::BadRequest(rejection.body_text()))?;
        value.validate()?;
        Ok(ValidatedJson(value))
    }
}

/// `Path` cuyo rechazo (p. ej. un id que no es UUID) se devuelve como `BadRequest`
#[derive(Debug, Clone, Copy, Default)]
pub struct PathParam<T>(pub T);

#[async_trait]
impl<T, S> FromRequestParts<S> for PathParam<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(value) = Path::<T>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| AppError::BadRequest(rejection.body_text()))?;
        Ok(PathParam(value))
    }
}

/// `Query` con el mismo tratamiento de errores que `PathParam`
#[derive(Debug, Clone, Copy, Default)]
pub struct QueryParams<T>(pub T);

#[async_trait]
impl<T, S> FromRequestParts<S> for QueryParams<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(value) = Query::<T>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| AppError::BadRequest(rejection.body_text()))?;
        Ok(QueryParams(value))
    }
}
