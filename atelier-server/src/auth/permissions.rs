//! Permission Definitions
//!
//! 按业务模块授权的简化 RBAC。
//!
//! ## 设计原则
//! - 模块化权限：每个后台模块一项 `xxx:manage` / `xxx:view`
//! - 店员 (staff) 拥有除店铺设置外的全部模块权限
//! - 员工管理：仅 admin 角色可用

use shared::models::EmployeeRole;

pub const INVENTORY_MANAGE: &str = "inventory:manage";
pub const RENTALS_MANAGE: &str = "rentals:manage";
pub const RESERVATIONS_MANAGE: &str = "reservations:manage";
pub const APPOINTMENTS_MANAGE: &str = "appointments:manage";
pub const SETTINGS_MANAGE: &str = "settings:manage";
pub const CONTENT_MANAGE: &str = "content:manage";
pub const DASHBOARD_VIEW: &str = "dashboard:view";

/// 可配置权限列表
/// 不包含 "all" 和 "employees:manage"，这些是系统级权限
pub const ALL_PERMISSIONS: &[&str] = &[
    INVENTORY_MANAGE,
    RENTALS_MANAGE,
    RESERVATIONS_MANAGE,
    APPOINTMENTS_MANAGE,
    SETTINGS_MANAGE,
    CONTENT_MANAGE,
    DASHBOARD_VIEW,
];

/// Admin 专属权限（不在可配置列表中）
pub const ADMIN_ONLY_PERMISSIONS: &[&str] = &[
    "employees:manage", // 员工管理
    "all",              // 超级权限
];

/// Default role permissions
pub const DEFAULT_ADMIN_PERMISSIONS: &[&str] = &["all"];

/// 店员默认权限（店铺设置除外）
pub const DEFAULT_STAFF_PERMISSIONS: &[&str] = &[
    INVENTORY_MANAGE,
    RENTALS_MANAGE,
    RESERVATIONS_MANAGE,
    APPOINTMENTS_MANAGE,
    CONTENT_MANAGE,
    DASHBOARD_VIEW,
];

/// Get permissions for a role
pub fn get_default_permissions(role: EmployeeRole) -> Vec<String> {
    let perms = match role {
        EmployeeRole::Admin => DEFAULT_ADMIN_PERMISSIONS,
        EmployeeRole::Staff => DEFAULT_STAFF_PERMISSIONS,
    };
    perms.iter().map(|s| s.to_string()).collect()
}

/// Validate if a permission string is valid
pub fn is_valid_permission(permission: &str) -> bool {
    ALL_PERMISSIONS.contains(&permission)
        || ADMIN_ONLY_PERMISSIONS.contains(&permission)
        || permission.ends_with(":*")
}
