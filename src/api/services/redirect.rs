use std::sync::Arc;

use actix_web::{HttpRequest, HttpResponse, Responder, web};

use crate::api::error_response;
use crate::api::identity::RequestIdentity;
use crate::services::{RedirectService, VisitContext};
use crate::utils::ip::extract_client_ip;

pub struct RedirectApi;

impl RedirectApi {
    /// GET /api/shorten/{alias}
    ///
    /// 解析成功返回 302，访问记录在服务层 best-effort 完成；
    /// 别名不存在返回 404 且没有任何分析副作用。
    pub async fn redirect(
        req: HttpRequest,
        path: web::Path<String>,
        redirects: web::Data<Arc<RedirectService>>,
    ) -> impl Responder {
        let alias = path.into_inner();
        let identity = RequestIdentity::from_request(&req);

        let user_agent = req
            .headers()
            .get("user-agent")
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        let ip = extract_client_ip(&req);
        let visitor_key = identity.visitor_key(&ip, &user_agent);

        let visit = VisitContext {
            visitor_key,
            user_agent,
            ip,
        };

        match redirects.resolve(&alias, visit).await {
            Ok(resolved) => HttpResponse::Found()
                .insert_header(("Location", resolved.long_url))
                .finish(),
            Err(e) => error_response(&e),
        }
    }
}
