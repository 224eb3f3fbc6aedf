//! Business Services
//!
//! This module contains the request-level services:
//!
//! - `ItemService` - Create / Read / Update / Delete / Query per list
//! - `QueryService` - Filter compilation, sorting and pagination
//!
//! Services coordinate between the storage layer and the field-type
//! machinery (access gate, value codec, filter compiler).

pub mod error;
pub mod item_service;
pub mod query_service;

pub use error::{ErrorKind, ItemServiceError};
pub use item_service::ItemService;
pub use query_service::{QueryDefinition, QueryService, SortConfig, SortDirection};
