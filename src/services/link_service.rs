//! 短链创建服务
//!
//! 创建路径的全部业务规则：身份解析、目标 URL 校验、按内容去重、
//! 保留别名拦截、随机别名生成（有限重试）与冲突处理。

use std::sync::Arc;

use tracing::{debug, info};
use url::Url;

use crate::errors::{LinkpulseError, Result};
use crate::repository::{AliasStore, NewShortLink, ShortLink, UserStore};
use crate::utils::generate_alias;

/// 与分析路由段冲突的别名，创建时直接拒绝
pub const RESERVED_ALIASES: &[&str] = &["overall", "topic"];

/// 随机别名撞库时的最大重试次数
const MAX_ALIAS_ATTEMPTS: usize = 5;

const DANGEROUS_SCHEMES: &[&str] = &["javascript", "data", "file", "vbscript", "about", "blob"];

/// 创建请求的归属方
#[derive(Debug, Clone)]
pub enum OwnerRef {
    /// 已认证用户（上游认证层解析出的 id）
    UserId(i64),
    /// 未认证请求的邮箱回退
    Email(String),
    /// 无任何身份信息
    Anonymous,
}

#[derive(Debug, Clone)]
pub struct CreateLinkRequest {
    pub long_url: String,
    pub custom_alias: Option<String>,
    pub topic: Option<String>,
    pub owner: OwnerRef,
}

#[derive(Debug, Clone)]
pub struct CreateLinkResult {
    pub link: ShortLink,
    /// 渲染好的完整短链
    pub short_url: String,
    /// 别名是否为自动生成
    pub generated_alias: bool,
    /// 是否命中按内容去重（返回了已存在的短链）
    pub deduplicated: bool,
}

pub struct LinkService {
    store: Arc<dyn AliasStore>,
    users: Arc<dyn UserStore>,
    base_url: String,
}

impl LinkService {
    pub fn new(store: Arc<dyn AliasStore>, users: Arc<dyn UserStore>, base_url: &str) -> Self {
        Self {
            store,
            users,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn render_short_url(&self, alias: &str) -> String {
        format!("{}/api/shorten/{}", self.base_url, alias)
    }

    pub async fn create_short_url(&self, request: CreateLinkRequest) -> Result<CreateLinkResult> {
        let owner_id = self.resolve_owner(&request.owner).await?;

        Self::validate_long_url(&request.long_url)?;

        // 保留别名先于去重拦截：带保留别名的请求无论其他字段如何都拒绝
        if let Some(ref alias) = request.custom_alias {
            if RESERVED_ALIASES.contains(&alias.as_str()) {
                return Err(LinkpulseError::validation(format!(
                    "Alias \"{}\" is reserved and cannot be used.",
                    alias
                )));
            }
        }

        // 按内容去重：同一 long URL 不重复发号
        if let Some(existing) = self.store.find_by_long_url(&request.long_url).await? {
            debug!(
                "Reusing existing alias '{}' for long URL",
                existing.short_alias
            );
            let short_url = self.render_short_url(&existing.short_alias);
            return Ok(CreateLinkResult {
                link: existing,
                short_url,
                generated_alias: false,
                deduplicated: true,
            });
        }

        let result = match request.custom_alias.clone() {
            Some(alias) => self.create_with_custom_alias(&request, alias, owner_id).await?,
            None => self.create_with_generated_alias(&request, owner_id).await?,
        };

        info!(
            "Short URL created: alias='{}', owner={}",
            result.link.short_alias, owner_id
        );
        Ok(result)
    }

    /// 身份解析：认证 id 直接用；邮箱回退必须命中已知用户；否则拒绝
    async fn resolve_owner(&self, owner: &OwnerRef) -> Result<i64> {
        match owner {
            OwnerRef::UserId(id) => Ok(*id),
            OwnerRef::Email(email) => {
                let user = self.users.find_by_email(email).await?.ok_or_else(|| {
                    LinkpulseError::not_found(format!("No user found for email: {}", email))
                })?;
                Ok(user.id)
            }
            OwnerRef::Anonymous => Err(LinkpulseError::unauthorized(
                "Authentication required to create short URLs",
            )),
        }
    }

    fn validate_long_url(long_url: &str) -> Result<()> {
        if long_url.trim().is_empty() {
            return Err(LinkpulseError::validation("Long URL is required"));
        }

        let parsed = Url::parse(long_url)
            .map_err(|e| LinkpulseError::validation(format!("Invalid URL format: {}", e)))?;

        let scheme = parsed.scheme();
        if DANGEROUS_SCHEMES.contains(&scheme) {
            return Err(LinkpulseError::validation(format!(
                "Dangerous protocol blocked: {}:",
                scheme
            )));
        }
        if scheme != "http" && scheme != "https" {
            return Err(LinkpulseError::validation(format!(
                "Invalid protocol: {}. Only http:// and https:// are allowed",
                scheme
            )));
        }

        Ok(())
    }

    async fn create_with_custom_alias(
        &self,
        request: &CreateLinkRequest,
        alias: String,
        owner_id: i64,
    ) -> Result<CreateLinkResult> {
        if self.store.find_by_alias(&alias).await?.is_some() {
            return Err(LinkpulseError::conflict("Custom alias already exists"));
        }

        let link = self
            .store
            .create_link(NewShortLink {
                long_url: request.long_url.clone(),
                short_alias: alias,
                topic: request.topic.clone(),
                owner_id,
            })
            .await?;

        let short_url = self.render_short_url(&link.short_alias);
        Ok(CreateLinkResult {
            link,
            short_url,
            generated_alias: false,
            deduplicated: false,
        })
    }

    /// 随机别名：存在性检查 + 插入，撞上唯一约束时换号重试
    async fn create_with_generated_alias(
        &self,
        request: &CreateLinkRequest,
        owner_id: i64,
    ) -> Result<CreateLinkResult> {
        for attempt in 0..MAX_ALIAS_ATTEMPTS {
            let alias = generate_alias();

            if self.store.find_by_alias(&alias).await?.is_some() {
                debug!("Alias '{}' already taken (attempt {})", alias, attempt + 1);
                continue;
            }

            match self
                .store
                .create_link(NewShortLink {
                    long_url: request.long_url.clone(),
                    short_alias: alias,
                    topic: request.topic.clone(),
                    owner_id,
                })
                .await
            {
                Ok(link) => {
                    let short_url = self.render_short_url(&link.short_alias);
                    return Ok(CreateLinkResult {
                        link,
                        short_url,
                        generated_alias: true,
                        deduplicated: false,
                    });
                }
                // 检查与插入之间被并发请求抢先，换一个别名再试
                Err(LinkpulseError::Conflict(_)) => {
                    debug!("Alias collision on insert (attempt {})", attempt + 1);
                    continue;
                }
                Err(e) => return Err(e),
            }
        }

        Err(LinkpulseError::conflict(
            "Failed to allocate a unique alias, please retry",
        ))
    }
}
