pub mod api_response;
pub mod auth_dto;
pub mod budget_dto;
pub mod pricing_dto;
pub mod resource_dto;

pub use api_response::ApiResponse;
