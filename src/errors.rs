use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkpulseError {
    Validation(String),
    Unauthorized(String),
    NotFound(String),
    Conflict(String),
    CacheConnection(String),
    DatabaseConfig(String),
    DatabaseConnection(String),
    DatabaseOperation(String),
    Serialization(String),
    DateParse(String),
}

impl LinkpulseError {
    /// 获取错误代码
    pub fn code(&self) -> &'static str {
        match self {
            LinkpulseError::Validation(_) => "E001",
            LinkpulseError::Unauthorized(_) => "E002",
            LinkpulseError::NotFound(_) => "E003",
            LinkpulseError::Conflict(_) => "E004",
            LinkpulseError::CacheConnection(_) => "E005",
            LinkpulseError::DatabaseConfig(_) => "E006",
            LinkpulseError::DatabaseConnection(_) => "E007",
            LinkpulseError::DatabaseOperation(_) => "E008",
            LinkpulseError::Serialization(_) => "E009",
            LinkpulseError::DateParse(_) => "E010",
        }
    }

    /// 获取错误类型名称
    pub fn error_type(&self) -> &'static str {
        match self {
            LinkpulseError::Validation(_) => "Validation Error",
            LinkpulseError::Unauthorized(_) => "Unauthorized",
            LinkpulseError::NotFound(_) => "Resource Not Found",
            LinkpulseError::Conflict(_) => "Conflict",
            LinkpulseError::CacheConnection(_) => "Cache Connection Error",
            LinkpulseError::DatabaseConfig(_) => "Database Configuration Error",
            LinkpulseError::DatabaseConnection(_) => "Database Connection Error",
            LinkpulseError::DatabaseOperation(_) => "Database Operation Error",
            LinkpulseError::Serialization(_) => "Serialization Error",
            LinkpulseError::DateParse(_) => "Date Parse Error",
        }
    }

    /// 获取错误详情
    pub fn message(&self) -> &str {
        match self {
            LinkpulseError::Validation(msg) => msg,
            LinkpulseError::Unauthorized(msg) => msg,
            LinkpulseError::NotFound(msg) => msg,
            LinkpulseError::Conflict(msg) => msg,
            LinkpulseError::CacheConnection(msg) => msg,
            LinkpulseError::DatabaseConfig(msg) => msg,
            LinkpulseError::DatabaseConnection(msg) => msg,
            LinkpulseError::DatabaseOperation(msg) => msg,
            LinkpulseError::Serialization(msg) => msg,
            LinkpulseError::DateParse(msg) => msg,
        }
    }

    /// 客户端可见的错误（4xx 一类）：消息可以原样返回给调用方。
    /// 依赖类错误只返回通用提示，不泄露内部细节。
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            LinkpulseError::Validation(_)
                | LinkpulseError::Unauthorized(_)
                | LinkpulseError::NotFound(_)
                | LinkpulseError::Conflict(_)
        )
    }
}

impl fmt::Display for LinkpulseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.error_type(), self.message())
    }
}

impl std::error::Error for LinkpulseError {}

// 便捷的构造函数
impl LinkpulseError {
    pub fn validation<T: Into<String>>(msg: T) -> Self {
        LinkpulseError::Validation(msg.into())
    }

    pub fn unauthorized<T: Into<String>>(msg: T) -> Self {
        LinkpulseError::Unauthorized(msg.into())
    }

    pub fn not_found<T: Into<String>>(msg: T) -> Self {
        LinkpulseError::NotFound(msg.into())
    }

    pub fn conflict<T: Into<String>>(msg: T) -> Self {
        LinkpulseError::Conflict(msg.into())
    }

    pub fn cache_connection<T: Into<String>>(msg: T) -> Self {
        LinkpulseError::CacheConnection(msg.into())
    }

    pub fn database_config<T: Into<String>>(msg: T) -> Self {
        LinkpulseError::DatabaseConfig(msg.into())
    }

    pub fn database_connection<T: Into<String>>(msg: T) -> Self {
        LinkpulseError::DatabaseConnection(msg.into())
    }

    pub fn database_operation<T: Into<String>>(msg: T) -> Self {
        LinkpulseError::DatabaseOperation(msg.into())
    }

    pub fn serialization<T: Into<String>>(msg: T) -> Self {
        LinkpulseError::Serialization(msg.into())
    }

    pub fn date_parse<T: Into<String>>(msg: T) -> Self {
        LinkpulseError::DateParse(msg.into())
    }
}

// 为常见的错误类型实现 From trait
impl From<sea_orm::DbErr> for LinkpulseError {
    fn from(err: sea_orm::DbErr) -> Self {
        LinkpulseError::DatabaseOperation(err.to_string())
    }
}

impl From<serde_json::Error> for LinkpulseError {
    fn from(err: serde_json::Error) -> Self {
        LinkpulseError::Serialization(err.to_string())
    }
}

impl From<chrono::ParseError> for LinkpulseError {
    fn from(err: chrono::ParseError) -> Self {
        LinkpulseError::DateParse(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, LinkpulseError>;
