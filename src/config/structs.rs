use serde::{Deserialize, Serialize};

/// 应用配置（启动时构建一次，之后只读）
///
/// - server: 监听地址、短链接前缀、访问令牌（环境变量 > 命令行参数）
/// - storage / logging / geoip: SHORTURL__ 环境变量 > config.toml > 默认值
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub logging: LoggingConfig,
    pub geoip: GeoIpConfig,
}

/// 文件 / 环境变量可配置的部分
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct FileConfig {
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub geoip: GeoIpConfig,
}

/// 服务器配置
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub domain: String,
    pub https: bool,
    pub local: bool,
    pub token: String,
    pub workers: usize,
}

impl ServerConfig {
    /// 短链接前缀，不含结尾的 `/`
    pub fn public_base(&self) -> String {
        if self.local {
            format!("http://localhost:{}", self.port)
        } else if self.https {
            format!("https://{}", self.domain)
        } else {
            format!("http://{}", self.domain)
        }
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// 存储后端类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StoreKind {
    #[default]
    Memory,
    Sqlite,
}

impl std::fmt::Display for StoreKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Memory => write!(f, "memory"),
            Self::Sqlite => write!(f, "sqlite"),
        }
    }
}

impl std::str::FromStr for StoreKind {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "memory" => Ok(Self::Memory),
            "sqlite" => Ok(Self::Sqlite),
            _ => Err(format!(
                "Invalid storage backend: '{}'. Valid: memory, sqlite",
                s
            )),
        }
    }
}

/// 存储配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default)]
    pub backend: StoreKind,
    #[serde(default = "default_database_url")]
    pub database_url: String,
    #[serde(default = "default_retry_count")]
    pub retry_count: u32,
    #[serde(default = "default_retry_base_delay_ms")]
    pub retry_base_delay_ms: u64,
    #[serde(default = "default_retry_max_delay_ms")]
    pub retry_max_delay_ms: u64,
}

/// 日志配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
    #[serde(default)]
    pub file: Option<String>,
    #[serde(default = "default_max_backups")]
    pub max_backups: u32,
    #[serde(default = "default_enable_rotation")]
    pub enable_rotation: bool,
}

/// GeoIP 配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeoIpConfig {
    #[serde(default = "default_geoip_enabled")]
    pub enabled: bool,
    /// 外部 API 地址，`{ip}` 会被替换为客户端 IP
    #[serde(default = "default_geoip_api_url")]
    pub api_url: String,
    /// GeoLite2-City 数据库路径，存在时优先使用
    #[serde(default)]
    pub maxminddb_path: Option<String>,
    #[serde(default = "default_geoip_timeout_ms")]
    pub timeout_ms: u64,
}

// ============================================================
// Default value functions
// ============================================================

fn default_database_url() -> String {
    "sqlite://shorturl.db?mode=rwc".to_string()
}

fn default_retry_count() -> u32 {
    3
}

fn default_retry_base_delay_ms() -> u64 {
    100
}

fn default_retry_max_delay_ms() -> u64 {
    2000
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "text".to_string()
}

fn default_max_backups() -> u32 {
    5
}

fn default_enable_rotation() -> bool {
    true
}

fn default_geoip_enabled() -> bool {
    true
}

fn default_geoip_api_url() -> String {
    "http://ip-api.com/json/{ip}".to_string()
}

fn default_geoip_timeout_ms() -> u64 {
    2000
}

// ============================================================
// Default implementations
// ============================================================

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StoreKind::default(),
            database_url: default_database_url(),
            retry_count: default_retry_count(),
            retry_base_delay_ms: default_retry_base_delay_ms(),
            retry_max_delay_ms: default_retry_max_delay_ms(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            file: None,
            max_backups: default_max_backups(),
            enable_rotation: default_enable_rotation(),
        }
    }
}

impl Default for GeoIpConfig {
    fn default() -> Self {
        Self {
            enabled: default_geoip_enabled(),
            api_url: default_geoip_api_url(),
            maxminddb_path: None,
            timeout_ms: default_geoip_timeout_ms(),
        }
    }
}
