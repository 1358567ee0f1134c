use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use chrono::NaiveDate;
use shared::error::{AppError, ErrorCode};
use shared::models::EmployeeRole;
use sqlx::SqlitePool;

use crate::auth::JwtService;
use crate::auth::password::hash_password;
use crate::core::Config;
use crate::db::DbService;
use crate::db::repository::employee;
use crate::utils::rate_limit::RateLimiter;

/// 开发环境默认管理员密码 (生产环境必须设置 ADMIN_PASSWORD)
const DEV_ADMIN_PASSWORD: &str = "admin12345";

/// 服务器状态 - 持有所有服务的共享引用
///
/// 所有字段都是浅拷贝 (`SqlitePool` 与 `Arc`)，每个请求克隆一次成本极低。
///
/// | 字段 | 类型 | 说明 |
/// |------|------|------|
/// | config | Config | 配置项 (不可变) |
/// | pool | SqlitePool | SQLite 连接池 |
/// | jwt_service | Arc<JwtService> | JWT 认证服务 |
/// | rate_limiter | RateLimiter | 店面接口限流 |
/// | started_at | Instant | 启动时间 (健康检查) |
#[derive(Clone, Debug)]
pub struct ServerState {
    /// 服务器配置
    pub config: Config,
    /// SQLite 连接池
    pub pool: SqlitePool,
    /// JWT 认证服务 (Arc 共享所有权)
    pub jwt_service: Arc<JwtService>,
    /// 店面接口 (登录、提交、查询) 的按 IP 限流
    pub rate_limiter: RateLimiter,
    pub started_at: Instant,
}

impl ServerState {
    /// 创建服务器状态 (手动构造)
    ///
    /// 通常使用 [`initialize()`](Self::initialize)；测试直接传入内存数据库
    pub fn new(config: Config, pool: SqlitePool, jwt_service: Arc<JwtService>) -> Self {
        Self {
            config,
            pool,
            jwt_service,
            rate_limiter: RateLimiter::new(),
            started_at: Instant::now(),
        }
    }

    /// 初始化服务器状态
    ///
    /// 按顺序初始化：
    /// 1. 工作目录结构
    /// 2. 数据库 (WAL + 迁移)
    /// 3. 首个管理员账号
    /// 4. JWT 服务
    pub async fn initialize(config: &Config) -> Result<Self, AppError> {
        config.ensure_work_dir_structure().map_err(|e| {
            AppError::with_message(
                ErrorCode::ConfigError,
                format!("Failed to create work directory {}: {e}", config.work_dir),
            )
        })?;

        let db = DbService::new(&config.database_path).await?;
        seed_admin(&db.pool, config).await?;

        let jwt_service = Arc::new(JwtService::with_config(config.jwt.clone()));
        Ok(Self::new(config.clone(), db.pool, jwt_service))
    }

    /// 业务时区的今天
    pub fn today(&self) -> NaiveDate {
        crate::utils::time::today(self.config.timezone)
    }

    /// 上传图片目录
    pub fn images_dir(&self) -> PathBuf {
        self.config.images_dir()
    }
}

/// Create the first admin when the employee table is empty
pub async fn seed_admin(pool: &SqlitePool, config: &Config) -> Result<(), AppError> {
    if employee::count(pool).await? > 0 {
        return Ok(());
    }

    let password = match &config.admin_password {
        Some(p) => p.clone(),
        None if config.is_production() => {
            return Err(AppError::with_message(
                ErrorCode::ConfigError,
                "ADMIN_PASSWORD must be set before the first production start",
            ));
        }
        None => {
            tracing::warn!(
                username = %config.admin_username,
                "⚠️  ADMIN_PASSWORD not set! Seeding admin with the development default password."
            );
            DEV_ADMIN_PASSWORD.to_string()
        }
    };

    let hash = hash_password(&password)
        .map_err(|e| AppError::internal(format!("Failed to hash admin password: {e}")))?;
    let admin = employee::create(
        pool,
        &config.admin_username,
        "Administrator",
        &hash,
        EmployeeRole::Admin,
    )
    .await?;

    tracing::info!(employee_id = admin.id, username = %admin.username, "Seeded initial admin account");
    Ok(())
}
