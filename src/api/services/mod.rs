mod analytics;
mod redirect;
mod shorten;

pub use analytics::AnalyticsApi;
pub use redirect::RedirectApi;
pub use shorten::ShortenApi;
