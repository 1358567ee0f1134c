use std::path::PathBuf;

use chrono_tz::Tz;

use shared::error::AppError;

use crate::auth::JwtConfig;

/// 默认营业时区 (店铺所在地)
pub const DEFAULT_TIMEZONE: Tz = chrono_tz::Asia::Manila;

/// 服务器配置
///
/// # 环境变量
///
/// 所有配置项都可以通过环境变量覆盖 (启动时先加载 `.env`)：
///
/// | 环境变量 | 默认值 | 说明 |
/// |----------|--------|------|
/// | WORK_DIR | ./data | 工作目录 (数据库、图片、日志) |
/// | HTTP_PORT | 3000 | HTTP 服务端口 |
/// | DATABASE_PATH | {WORK_DIR}/database/atelier.db | SQLite 数据库文件 |
/// | ENVIRONMENT | development | 运行环境 |
/// | REQUEST_TIMEOUT_MS | 30000 | 请求超时(毫秒) |
/// | LOG_LEVEL | info | 日志级别 |
/// | LOG_DIR | {WORK_DIR}/logs | 滚动日志目录 (存在时写文件) |
/// | LOG_JSON | false | JSON 日志输出 |
/// | CORS_ALLOW_ORIGIN | (无) | 允许的前端来源，未设置时放开 |
/// | TRUST_PROXY | false | 位于反向代理之后时按 X-Forwarded-For 识别客户端 |
/// | JWT_SECRET | 非生产环境自动生成 | JWT 密钥 (≥32 字符) |
/// | JWT_EXPIRATION_MINUTES | 720 | 令牌有效期 |
/// | ADMIN_USERNAME | admin | 首次启动创建的管理员 |
/// | ADMIN_PASSWORD | 开发环境 admin12345 | 首次启动管理员密码 |
/// | SWEEP_INTERVAL_SECS | 900 | 过期预约清理间隔 |
/// | BUSINESS_TIMEZONE | Asia/Manila | 营业时区 (IANA 名称) |
#[derive(Debug, Clone)]
pub struct Config {
    /// 工作目录
    pub work_dir: String,
    /// HTTP API 服务端口
    pub http_port: u16,
    /// SQLite 数据库路径
    pub database_path: String,
    /// 运行环境: development | staging | production
    pub environment: String,
    /// 请求超时时间 (毫秒)
    pub request_timeout_ms: u64,
    pub log_level: String,
    pub log_dir: String,
    pub log_json: bool,
    /// 允许跨域的前端来源
    pub cors_allow_origin: Option<String>,
    /// 限流是否信任 `X-Forwarded-For` (仅在反向代理之后开启)
    pub trust_proxy: bool,
    /// JWT 认证配置
    pub jwt: JwtConfig,
    pub admin_username: String,
    pub admin_password: Option<String>,
    /// 过期预约/到店清理间隔 (秒)
    pub sweep_interval_secs: u64,
    /// 营业时区，决定 "今天" 与月度营收边界
    pub timezone: Tz,
}

impl Config {
    /// 从环境变量加载配置
    ///
    /// 未设置或无法解析的项使用默认值；只有 JWT 密钥缺失 (生产环境) 或过短时报错
    pub fn from_env() -> Result<Self, AppError> {
        let work_dir = std::env::var("WORK_DIR").unwrap_or_else(|_| "./data".into());
        let database_path = std::env::var("DATABASE_PATH").unwrap_or_else(|_| {
            PathBuf::from(&work_dir)
                .join("database")
                .join("atelier.db")
                .to_string_lossy()
                .into_owned()
        });
        let log_dir = std::env::var("LOG_DIR").unwrap_or_else(|_| {
            PathBuf::from(&work_dir)
                .join("logs")
                .to_string_lossy()
                .into_owned()
        });

        let environment = std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into());
        let jwt = JwtConfig::from_env(environment == "production")?;

        Ok(Self {
            http_port: std::env::var("HTTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3000),
            database_path,
            environment,
            request_timeout_ms: std::env::var("REQUEST_TIMEOUT_MS")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(30000),
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".into()),
            log_dir,
            log_json: std::env::var("LOG_JSON")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(false),
            trust_proxy: std::env::var("TRUST_PROXY")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(false),
            cors_allow_origin: std::env::var("CORS_ALLOW_ORIGIN")
                .ok()
                .filter(|v| !v.trim().is_empty()),
            jwt,
            admin_username: std::env::var("ADMIN_USERNAME").unwrap_or_else(|_| "admin".into()),
            admin_password: std::env::var("ADMIN_PASSWORD")
                .ok()
                .filter(|v| !v.is_empty()),
            sweep_interval_secs: std::env::var("SWEEP_INTERVAL_SECS")
                .ok()
                .and_then(|p| p.parse().ok())
                .filter(|s| *s > 0)
                .unwrap_or(900),
            timezone: parse_timezone(std::env::var("BUSINESS_TIMEZONE").ok().as_deref()),
            work_dir,
        })
    }

    /// 使用自定义值覆盖部分配置
    ///
    /// 常用于测试场景
    pub fn with_overrides(work_dir: impl Into<String>, http_port: u16) -> Result<Self, AppError> {
        let mut config = Self::from_env()?;
        let work_dir = work_dir.into();
        config.database_path = PathBuf::from(&work_dir)
            .join("database")
            .join("atelier.db")
            .to_string_lossy()
            .into_owned();
        config.log_dir = PathBuf::from(&work_dir)
            .join("logs")
            .to_string_lossy()
            .into_owned();
        config.work_dir = work_dir;
        config.http_port = http_port;
        Ok(config)
    }

    /// 是否生产环境
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// 上传图片目录
    pub fn images_dir(&self) -> PathBuf {
        PathBuf::from(&self.work_dir).join("images")
    }

    /// 确保工作目录结构存在
    pub fn ensure_work_dir_structure(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(&self.work_dir)?;
        std::fs::create_dir_all(self.images_dir())?;
        std::fs::create_dir_all(&self.log_dir)?;
        if let Some(parent) = PathBuf::from(&self.database_path).parent() {
            std::fs::create_dir_all(parent)?;
        }
        Ok(())
    }
}

fn parse_timezone(name: Option<&str>) -> Tz {
    match name.map(str::trim).filter(|n| !n.is_empty()) {
        None => DEFAULT_TIMEZONE,
        Some(n) => n.parse().unwrap_or_else(|_| {
            tracing::warn!(timezone = %n, "Unknown BUSINESS_TIMEZONE, falling back to {}", DEFAULT_TIMEZONE);
            DEFAULT_TIMEZONE
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timezone_parsing() {
        assert_eq!(parse_timezone(None), DEFAULT_TIMEZONE);
        assert_eq!(parse_timezone(Some(" ")), DEFAULT_TIMEZONE);
        assert_eq!(parse_timezone(Some("Europe/Madrid")), chrono_tz::Europe::Madrid);
        assert_eq!(parse_timezone(Some("Mars/Olympus")), DEFAULT_TIMEZONE);
    }

    #[test]
    fn overrides_move_derived_paths() {
        let config = Config::with_overrides("/tmp/atelier-test", 4100).unwrap();
        assert_eq!(config.http_port, 4100);
        assert!(config.database_path.starts_with("/tmp/atelier-test"));
        assert!(config.images_dir().starts_with("/tmp/atelier-test"));
    }
}
