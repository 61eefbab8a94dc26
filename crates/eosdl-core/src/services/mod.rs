//! Application services composed from ports.

mod catalog_service;

pub use catalog_service::CatalogService;
