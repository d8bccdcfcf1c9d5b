pub mod url;
pub mod url_stats;

pub use url::Entity as UrlEntity;
pub use url_stats::Entity as UrlStatsEntity;
