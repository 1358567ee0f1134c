//! Atelier Server - 服装租赁门店后台
//!
//! # 架构概述
//!
//! 面向后台管理界面与公开店面的 HTTP/JSON 服务：
//!
//! - **财务** (`finance`): 小计、押金、折扣、余额计算 (Decimal 精度)
//! - **库存** (`inventory`): 租出扣减、归还/取消回补、损坏登记
//! - **租赁** (`rentals`): 状态机 + 事务化库存对账
//! - **预约 / 到店** (`reservations`, `appointments`): 店面提交与后台处理
//! - **认证** (`auth`): JWT + Argon2 认证体系
//! - **HTTP API** (`api`): RESTful API 接口
//!
//! # 模块结构
//!
//! ```text
//! atelier-server/src/
//! ├── core/          # 配置、状态、服务器、后台任务
//! ├── auth/          # JWT 认证、权限
//! ├── api/           # HTTP 路由和处理器
//! ├── db/            # SQLite 仓储层
//! ├── finance/       # 金额计算
//! ├── inventory/     # 库存账本
//! ├── rentals/       # 租赁工作流、损坏处理
//! ├── reservations/  # 预约单
//! ├── appointments/  # 到店预约
//! ├── services/      # 概览、查询、定时清理
//! └── utils/         # 日志、时间、校验、限流
//! ```

pub mod api;
pub mod appointments;
pub mod auth;
pub mod core;
pub mod db;
pub mod finance;
pub mod inventory;
pub mod rentals;
pub mod reservations;
pub mod services;
pub mod utils;

// Re-export 公共类型
pub use auth::{CurrentUser, JwtService};
pub use core::{Config, Server, ServerState, build_app};
pub use utils::{AppError, AppResult, ErrorBody, ErrorCategory, ErrorCode};

// Re-export logger functions
pub use utils::logger::{cleanup_old_logs, init_logger_with_file};

// Security logging macro - 支持 tracing 格式说明符
#[macro_export]
macro_rules! security_log {
    ($level:expr, $event:expr, $($key:ident = $value:expr),*) => {
        tracing::info!(
            target: "security",
            level = $level,
            event = $event,
            $($key = $value),*
        );
    };
}

pub fn print_banner() {
    println!(
        r#"
    ___   __       ___
   /   | / /____  / (_)__  _____
  / /| |/ __/ _ \/ / / _ \/ ___/
 / ___ / /_/  __/ / /  __/ /
/_/  |_\__/\___/_/_/\___/_/
    "#
    );
}

/// 设置运行环境
///
/// 1. 加载 `.env` (不存在时忽略)
/// 2. 按配置初始化日志 (日志目录存在时写入滚动文件)
///
/// 返回加载好的配置，供 `ServerState::initialize` 使用
pub fn setup_environment() -> anyhow::Result<Config> {
    dotenv::dotenv().ok();

    let config = Config::from_env()?;
    config.ensure_work_dir_structure()?;

    init_logger_with_file(
        Some(&config.log_level),
        config.log_json,
        Some(&config.log_dir),
    );
    Ok(config)
}
