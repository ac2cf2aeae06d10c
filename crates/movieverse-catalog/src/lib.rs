pub mod client;
pub mod discover;
pub mod endpoints;
pub mod error;
pub mod images;
pub mod request;
pub mod traits;
pub mod transport;

pub use client::CatalogClient;
pub use discover::{DiscoverFilters, DiscoverSort};
pub use endpoints::Endpoint;
pub use error::CatalogError;
pub use images::{build_image_url, size_token, ImageKind, ImageSize};
pub use request::CatalogRequest;
pub use traits::Catalog;
pub use transport::{ReqwestTransport, Transport, TransportError};
