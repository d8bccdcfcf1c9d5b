use std::path::Path;

use config::{Config, Environment, File};

use super::{AppConfig, FileConfig, ServerConfig};
use crate::cli::Cli;
use crate::errors::{Result, ShorturlError};

/// 服务器相关的环境变量，空值视为未设置
#[derive(Debug, Clone, Default)]
pub struct ServerEnv {
    pub host: Option<String>,
    pub port: Option<String>,
    pub domain: Option<String>,
    pub https: Option<String>,
    pub local: Option<String>,
    pub token: Option<String>,
}

impl ServerEnv {
    pub fn from_process() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        Self {
            host: var("HOST"),
            port: var("PORT"),
            domain: var("DOMAIN"),
            https: var("HTTPS"),
            local: var("LOCAL"),
            token: var("SUPERSCRT"),
        }
    }
}

impl FileConfig {
    /// 从 TOML 文件和环境变量加载
    ///
    /// 优先级：ENV > config.toml > 默认值
    /// ENV 前缀：SHORTURL，分隔符：__
    /// 示例：SHORTURL__STORAGE__BACKEND=sqlite
    pub fn load(path: &str) -> Result<Self> {
        Self::load_with_env(path, None)
    }

    /// 同 [`FileConfig::load`]，但可以注入环境变量表（测试用）
    pub fn load_with_env(path: &str, env: Option<config::Map<String, String>>) -> Result<Self> {
        let settings = Config::builder()
            .add_source(File::with_name(path).required(false))
            .add_source(
                Environment::with_prefix("SHORTURL")
                    .separator("__")
                    .try_parsing(true)
                    .source(env),
            )
            .build()?;

        let config = settings.try_deserialize::<FileConfig>()?;
        if Path::new(path).exists() {
            eprintln!("[INFO] Configuration loaded from: {}", path);
        }
        Ok(config)
    }
}

impl AppConfig {
    /// 读取进程环境与配置文件，构建最终配置
    pub fn load(cli: &Cli) -> Result<Self> {
        let file = FileConfig::load(&cli.config)?;
        Self::resolve(cli, &ServerEnv::from_process(), file)
    }

    /// 合并环境变量与命令行参数；非空环境变量优先
    pub fn resolve(cli: &Cli, env: &ServerEnv, file: FileConfig) -> Result<Self> {
        let port = match env.port.as_deref() {
            Some(raw) => raw
                .trim()
                .parse::<u16>()
                .map_err(|_| ShorturlError::config(format!("Invalid PORT value: '{}'", raw)))?,
            None => cli.port,
        };

        // 布尔值：环境变量为 true 时生效，否则回退到命令行参数
        let https = env_flag("HTTPS", env.https.as_deref())? || cli.https;
        let local = env_flag("LOCAL", env.local.as_deref())? || cli.local;

        let server = ServerConfig {
            host: env.host.clone().unwrap_or_else(|| cli.host.clone()),
            port,
            domain: env.domain.clone().unwrap_or_else(|| cli.domain.clone()),
            https,
            local,
            token: env.token.clone().unwrap_or_else(|| cli.token.clone()),
            workers: cli.workers.unwrap_or_else(num_cpus::get),
        };

        let config = AppConfig {
            server,
            storage: file.storage,
            logging: file.logging,
            geoip: file.geoip,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.server.port == 0 {
            return Err(ShorturlError::config("port must be between 1 and 65535"));
        }
        if self.server.token.trim().is_empty() {
            return Err(ShorturlError::config("auth token must not be empty"));
        }
        if !self.server.local && self.server.domain.trim().is_empty() {
            return Err(ShorturlError::config(
                "domain must be set when local mode is disabled",
            ));
        }
        if self.server.workers == 0 {
            return Err(ShorturlError::config("workers must be at least 1"));
        }
        if !matches!(self.logging.format.as_str(), "text" | "json") {
            return Err(ShorturlError::config(format!(
                "Invalid log format: '{}'. Valid: text, json",
                self.logging.format
            )));
        }
        if self.geoip.enabled && self.geoip.timeout_ms == 0 {
            return Err(ShorturlError::config("geoip.timeout_ms must be positive"));
        }
        Ok(())
    }
}

fn env_flag(name: &str, value: Option<&str>) -> Result<bool> {
    match value.map(str::trim) {
        None => Ok(false),
        Some("1" | "t" | "T" | "true" | "TRUE" | "True") => Ok(true),
        Some("0" | "f" | "F" | "false" | "FALSE" | "False") => Ok(false),
        Some(other) => Err(ShorturlError::config(format!(
            "Invalid {} value: '{}'",
            name, other
        ))),
    }
}
