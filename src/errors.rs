use std::fmt;

use actix_web::{HttpResponse, ResponseError, http::StatusCode};

#[derive(Debug, Clone)]
pub enum ShorturlError {
    Config(String),
    DatabaseConnection(String),
    Storage(String),
    Validation(String),
    NotFound(String),
    Serialization(String),
    Parse(String),
    RandomSource(String),
    GeolocationUnavailable(String),
}

impl ShorturlError {
    /// 获取错误代码
    pub fn code(&self) -> &'static str {
        match self {
            ShorturlError::Config(_) => "E001",
            ShorturlError::DatabaseConnection(_) => "E002",
            ShorturlError::Storage(_) => "E003",
            ShorturlError::Validation(_) => "E004",
            ShorturlError::NotFound(_) => "E005",
            ShorturlError::Serialization(_) => "E006",
            ShorturlError::Parse(_) => "E007",
            ShorturlError::RandomSource(_) => "E008",
            ShorturlError::GeolocationUnavailable(_) => "E009",
        }
    }

    /// 获取错误类型名称
    pub fn error_type(&self) -> &'static str {
        match self {
            ShorturlError::Config(_) => "Configuration Error",
            ShorturlError::DatabaseConnection(_) => "Database Connection Error",
            ShorturlError::Storage(_) => "Storage Error",
            ShorturlError::Validation(_) => "Validation Error",
            ShorturlError::NotFound(_) => "Resource Not Found",
            ShorturlError::Serialization(_) => "Serialization Error",
            ShorturlError::Parse(_) => "Parse Error",
            ShorturlError::RandomSource(_) => "Random Source Error",
            ShorturlError::GeolocationUnavailable(_) => "Geolocation Unavailable",
        }
    }

    /// 获取错误详情
    pub fn message(&self) -> &str {
        match self {
            ShorturlError::Config(msg) => msg,
            ShorturlError::DatabaseConnection(msg) => msg,
            ShorturlError::Storage(msg) => msg,
            ShorturlError::Validation(msg) => msg,
            ShorturlError::NotFound(msg) => msg,
            ShorturlError::Serialization(msg) => msg,
            ShorturlError::Parse(msg) => msg,
            ShorturlError::RandomSource(msg) => msg,
            ShorturlError::GeolocationUnavailable(msg) => msg,
        }
    }

    /// 格式化为彩色输出（启动失败时打印到终端）
    pub fn format_colored(&self) -> String {
        use colored::Colorize;
        format!(
            "{} {} {}\n  {}",
            "[ERROR]".red().bold(),
            self.code().yellow(),
            self.error_type().red(),
            self.message().white()
        )
    }

    /// 格式化为简洁输出
    pub fn format_simple(&self) -> String {
        format!("{}: {}", self.error_type(), self.message())
    }

    /// 是否属于服务端内部错误（响应中不暴露细节）
    pub fn is_internal(&self) -> bool {
        self.status_code().is_server_error()
    }
}

impl fmt::Display for ShorturlError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_simple())
    }
}

impl std::error::Error for ShorturlError {}

impl ResponseError for ShorturlError {
    fn status_code(&self) -> StatusCode {
        match self {
            ShorturlError::NotFound(_) => StatusCode::NOT_FOUND,
            ShorturlError::Validation(_) | ShorturlError::Parse(_) => StatusCode::BAD_REQUEST,
            ShorturlError::Config(_)
            | ShorturlError::DatabaseConnection(_)
            | ShorturlError::Storage(_)
            | ShorturlError::Serialization(_)
            | ShorturlError::RandomSource(_)
            | ShorturlError::GeolocationUnavailable(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let body = match self {
            ShorturlError::NotFound(_) => "not found".to_string(),
            ShorturlError::Validation(msg) | ShorturlError::Parse(msg) => msg.clone(),
            _ => "Internal Server Error".to_string(),
        };

        HttpResponse::build(self.status_code())
            .content_type("text/plain; charset=utf-8")
            .body(body)
    }
}

// 便捷的构造函数
impl ShorturlError {
    pub fn config<T: Into<String>>(msg: T) -> Self {
        ShorturlError::Config(msg.into())
    }

    pub fn database_connection<T: Into<String>>(msg: T) -> Self {
        ShorturlError::DatabaseConnection(msg.into())
    }

    pub fn storage<T: Into<String>>(msg: T) -> Self {
        ShorturlError::Storage(msg.into())
    }

    pub fn validation<T: Into<String>>(msg: T) -> Self {
        ShorturlError::Validation(msg.into())
    }

    pub fn not_found<T: Into<String>>(msg: T) -> Self {
        ShorturlError::NotFound(msg.into())
    }

    pub fn serialization<T: Into<String>>(msg: T) -> Self {
        ShorturlError::Serialization(msg.into())
    }

    pub fn parse<T: Into<String>>(msg: T) -> Self {
        ShorturlError::Parse(msg.into())
    }

    pub fn random_source<T: Into<String>>(msg: T) -> Self {
        ShorturlError::RandomSource(msg.into())
    }

    pub fn geolocation_unavailable<T: Into<String>>(msg: T) -> Self {
        ShorturlError::GeolocationUnavailable(msg.into())
    }
}

// 为常见的错误类型实现 From trait
impl From<sea_orm::DbErr> for ShorturlError {
    fn from(err: sea_orm::DbErr) -> Self {
        ShorturlError::Storage(err.to_string())
    }
}

impl From<std::io::Error> for ShorturlError {
    fn from(err: std::io::Error) -> Self {
        ShorturlError::Storage(err.to_string())
    }
}

impl From<serde_json::Error> for ShorturlError {
    fn from(err: serde_json::Error) -> Self {
        ShorturlError::Serialization(err.to_string())
    }
}

impl From<config::ConfigError> for ShorturlError {
    fn from(err: config::ConfigError) -> Self {
        ShorturlError::Config(err.to_string())
    }
}

impl From<getrandom::Error> for ShorturlError {
    fn from(err: getrandom::Error) -> Self {
        ShorturlError::RandomSource(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ShorturlError>;
