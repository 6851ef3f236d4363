pub mod catalog_client;
pub mod shikimori_client;

pub use catalog_client::CatalogClient;
pub use shikimori_client::ShikimoriClient;
