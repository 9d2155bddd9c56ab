use std::sync::Arc;

use actix_web::{HttpRequest, HttpResponse, Responder, web};
use serde::{Deserialize, Serialize};

use crate::api::error_response;
use crate::api::identity::RequestIdentity;
use crate::services::{CreateLinkRequest, LinkService, OwnerRef};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShortenRequest {
    #[serde(default)]
    pub long_url: Option<String>,
    pub custom_alias: Option<String>,
    pub topic: Option<String>,
    /// 未认证请求的身份回退
    pub email_id: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ShortenResponse {
    message: &'static str,
    short_url: String,
    created_at: chrono::DateTime<chrono::Utc>,
}

pub struct ShortenApi;

impl ShortenApi {
    /// POST /api/shorten
    pub async fn create(
        req: HttpRequest,
        body: web::Json<ShortenRequest>,
        links: web::Data<Arc<LinkService>>,
    ) -> impl Responder {
        let body = body.into_inner();
        let identity = RequestIdentity::from_request(&req);

        let owner = match (identity.user_id, body.email_id) {
            (Some(id), _) => OwnerRef::UserId(id),
            (None, Some(email)) => OwnerRef::Email(email),
            (None, None) => OwnerRef::Anonymous,
        };

        let request = CreateLinkRequest {
            long_url: body.long_url.unwrap_or_default(),
            custom_alias: body.custom_alias,
            topic: body.topic,
            owner,
        };

        match links.create_short_url(request).await {
            Ok(result) => HttpResponse::Created().json(ShortenResponse {
                message: "Short URL created successfully",
                short_url: result.short_url,
                created_at: result.link.created_at,
            }),
            Err(e) => error_response(&e),
        }
    }
}
