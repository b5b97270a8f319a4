pub mod driver;
pub mod error;
pub mod gallery;
pub mod listing;
pub mod pacing;
pub mod resolver;
pub mod selectors;
pub mod session;
pub mod spec_table;
pub mod urls;

pub use driver::{Locator, PageDriver};
pub use error::ScraperError;
pub use listing::collect_product_links;
pub use pacing::Pacing;
pub use resolver::{scrape_product, ResolverOptions, VariantResolver};
pub use session::BrowserSession;
