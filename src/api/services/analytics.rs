use std::sync::Arc;

use actix_web::{HttpRequest, HttpResponse, Responder, web};

use crate::api::error_response;
use crate::api::identity::RequestIdentity;
use crate::errors::LinkpulseError;
use crate::services::AnalyticsService;

pub struct AnalyticsApi;

impl AnalyticsApi {
    fn require_user(req: &HttpRequest) -> Result<i64, LinkpulseError> {
        RequestIdentity::from_request(req)
            .user_id
            .ok_or_else(|| LinkpulseError::unauthorized("Unauthorized"))
    }

    /// GET /api/analytics/{alias}
    pub async fn by_alias(
        req: HttpRequest,
        path: web::Path<String>,
        analytics: web::Data<Arc<AnalyticsService>>,
    ) -> impl Responder {
        let owner_id = match Self::require_user(&req) {
            Ok(id) => id,
            Err(e) => return error_response(&e),
        };

        match analytics.get_by_alias(&path.into_inner(), owner_id).await {
            Ok(view) => HttpResponse::Ok().json(view),
            Err(e) => error_response(&e),
        }
    }

    /// GET /api/analytics/topic/{topic}
    pub async fn by_topic(
        req: HttpRequest,
        path: web::Path<String>,
        analytics: web::Data<Arc<AnalyticsService>>,
    ) -> impl Responder {
        let owner_id = match Self::require_user(&req) {
            Ok(id) => id,
            Err(e) => return error_response(&e),
        };

        match analytics.get_by_topic(&path.into_inner(), owner_id).await {
            Ok(view) => HttpResponse::Ok().json(view),
            Err(e) => error_response(&e),
        }
    }

    /// GET /api/analytics/overall
    pub async fn overall(
        req: HttpRequest,
        analytics: web::Data<Arc<AnalyticsService>>,
    ) -> impl Responder {
        let owner_id = match Self::require_user(&req) {
            Ok(id) => id,
            Err(e) => return error_response(&e),
        };

        match analytics.get_overall(owner_id).await {
            Ok(view) => HttpResponse::Ok().json(view),
            Err(e) => error_response(&e),
        }
    }
}
