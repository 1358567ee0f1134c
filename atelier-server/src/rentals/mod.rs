//! 租赁业务流程
//!
//! - [`status`] - 租赁状态机与库存结算规则
//! - [`workflow`] - 创建、改单、收款、状态流转 (单事务)
//! - [`damage`] - 损坏件登记的处理 (修复回库 / 报废)
//! - [`error`] - 流程错误，统一转换为 `AppError`

pub mod damage;
pub mod error;
pub mod status;
pub mod workflow;

pub use error::WorkflowError;
