// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{Contact, Coordinates, DietaryFlag, DietaryOptions, HygieneLevel, Restaurant, UnknownHygieneLevel};
pub use requests::{SearchRequest, DEFAULT_PAGE, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};
pub use responses::{ErrorResponse, HealthResponse, SearchResponse};
