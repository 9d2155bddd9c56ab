pub mod analytics_service;
pub mod geoip;
pub mod link_service;
pub mod redirect_service;
pub mod visit_recorder;

pub use analytics_service::{
    AliasAnalytics, AnalyticsService, CategoryRollup, DateClicks, OverallAnalytics,
    TopicAnalytics, TopicUrlStat,
};
pub use link_service::{CreateLinkRequest, CreateLinkResult, LinkService, OwnerRef, RESERVED_ALIASES};
pub use redirect_service::{RedirectService, ResolvedAlias};
pub use visit_recorder::{VisitContext, VisitRecorder};
