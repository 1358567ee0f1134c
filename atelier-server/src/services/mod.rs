//! 服务层 - 跨多个仓储的只读聚合与定时维护
//!
//! - [`dashboard`] - 后台概览计数
//! - [`tracking`] - 店面请求查询 (按参考号 + 联系方式)
//! - [`sweep`] - 过期预约/到店清理

pub mod dashboard;
pub mod sweep;
pub mod tracking;
