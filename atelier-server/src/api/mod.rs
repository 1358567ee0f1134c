//! API 路由模块
//!
//! # 结构
//!
//! - [`health`] - 健康检查
//! - [`auth`] - 登录、当前用户
//! - [`employees`] - 员工管理 (仅管理员)
//! - [`upload`] - 图片上传与读取
//! - [`items`] - 服装与款式库存
//! - [`packages`] - 套餐
//! - [`rentals`] - 租赁单、付款、状态流转
//! - [`damaged_items`] - 损坏登记处理
//! - [`reservations`] - 预约单处理与转租赁
//! - [`appointments`] - 到店预约
//! - [`dashboard`] - 后台概览
//! - [`settings`] - 店铺设置
//! - [`content`] - 店面内容块
//! - [`public`] - 公开店面接口 (无需认证)

pub mod appointments;
pub mod auth;
pub mod content;
pub mod damaged_items;
pub mod dashboard;
pub mod employees;
pub mod health;
pub mod items;
pub mod packages;
pub mod public;
pub mod rentals;
pub mod reservations;
pub mod settings;
pub mod upload;

// Re-export common types for handlers
pub use crate::utils::{AppError, AppResult};
