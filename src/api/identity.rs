//! 请求身份
//!
//! 认证握手在上游（网关 / OAuth 层）完成，这里只消费结果：
//! `X-User-Id` 头携带已认证用户 id。无认证时访问归因退化为
//! (ip, user-agent) 指纹。

use actix_web::HttpRequest;

use crate::utils::anonymous_visitor_key;

#[derive(Debug, Clone, Default)]
pub struct RequestIdentity {
    pub user_id: Option<i64>,
}

impl RequestIdentity {
    pub fn from_request(req: &HttpRequest) -> Self {
        let user_id = req
            .headers()
            .get("x-user-id")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<i64>().ok());

        Self { user_id }
    }

    /// 访问去重用的归因 key
    pub fn visitor_key(&self, ip: &str, user_agent: &str) -> String {
        match self.user_id {
            Some(id) => format!("user:{}", id),
            None => anonymous_visitor_key(ip, user_agent),
        }
    }
}
