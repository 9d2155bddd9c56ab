//! HTTP 接口层
//!
//! 薄封装：反序列化请求、解析身份、调用服务层、把错误映射为
//! 稳定的 JSON 响应。业务规则全部在 `services` 中。

pub mod identity;
pub mod services;

use actix_web::{HttpResponse, web};
use serde_json::json;
use tracing::error;

use crate::errors::LinkpulseError;
use services::{AnalyticsApi, RedirectApi, ShortenApi};

/// 错误到 HTTP 响应的唯一映射点
///
/// 客户端错误原样透出消息；依赖类错误只返回通用提示，内部细节进日志。
pub fn error_response(err: &LinkpulseError) -> HttpResponse {
    match err {
        LinkpulseError::Validation(_) => {
            HttpResponse::BadRequest().json(json!({ "message": err.message() }))
        }
        LinkpulseError::Unauthorized(_) => {
            HttpResponse::Unauthorized().json(json!({ "message": err.message() }))
        }
        LinkpulseError::NotFound(_) => {
            HttpResponse::NotFound().json(json!({ "message": err.message() }))
        }
        LinkpulseError::Conflict(_) => {
            HttpResponse::Conflict().json(json!({ "message": err.message() }))
        }
        _ => {
            error!("Request failed: {}", err);
            HttpResponse::InternalServerError().json(json!({ "message": "Server error" }))
        }
    }
}

/// 路由表。`/api/analytics/overall` 和 `/api/analytics/topic/...`
/// 必须注册在 `/api/analytics/{alias}` 之前，这也是这两个词
/// 进保留别名集的原因。
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .route("/shorten", web::post().to(ShortenApi::create))
            .route("/shorten/{alias}", web::get().to(RedirectApi::redirect))
            .route("/analytics/overall", web::get().to(AnalyticsApi::overall))
            .route(
                "/analytics/topic/{topic}",
                web::get().to(AnalyticsApi::by_topic),
            )
            .route("/analytics/{alias}", web::get().to(AnalyticsApi::by_alias)),
    );
}
