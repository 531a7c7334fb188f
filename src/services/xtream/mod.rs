//! Xtream panel integration.
//!
//! Everything that talks the panel's dialect lives here:
//!
//! - **URL construction** (`urls`): `player_api.php` / `xmltv.php` query
//!   URLs and the `{base}/{kind}/{user}/{pass}/{id}.{ext}` media URLs
//! - **API client** (`client`): one GET per panel action, raw JSON through
//! - **Types** (`types`): per-request credentials, content kind and output
//!   format enums, and accessor helpers over untyped catalog records

pub mod client;
pub mod types;
pub mod urls;

// Re-export commonly used items
pub use client::PanelClient;
pub use types::{CatalogItem, ContentKind, Credentials, OutputFormat};
