//! JWT 令牌服务
//!
//! 员工登录后签发 HS256 令牌，令牌内携带角色与权限，
//! 中间件验证后解析为 [`CurrentUser`]。

use chrono::{Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use ring::rand::{SecureRandom, SystemRandom};
use serde::{Deserialize, Serialize};
use shared::error::{AppError, ErrorCode};
use shared::models::EmployeeRole;
use thiserror::Error;

use super::permissions::is_valid_permission;

pub const MIN_SECRET_LEN: usize = 32;

/// 一个班次
const DEFAULT_EXPIRATION_MINUTES: i64 = 720;
const DEFAULT_ISSUER: &str = "atelier-server";
const DEFAULT_AUDIENCE: &str = "atelier-back-office";

#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub expiration_minutes: i64,
    pub issuer: String,
    pub audience: String,
}

impl JwtConfig {
    pub fn with_secret(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            expiration_minutes: DEFAULT_EXPIRATION_MINUTES,
            issuer: DEFAULT_ISSUER.to_string(),
            audience: DEFAULT_AUDIENCE.to_string(),
        }
    }

    /// 从环境变量加载
    ///
    /// `JWT_SECRET` 在生产环境必须设置；其他环境缺失时生成临时密钥，
    /// 重启后旧令牌全部失效。
    pub fn from_env(production: bool) -> Result<Self, JwtError> {
        let secret = match std::env::var("JWT_SECRET") {
            Ok(secret) if secret.len() >= MIN_SECRET_LEN => secret,
            Ok(_) => {
                return Err(JwtError::Config(format!(
                    "JWT_SECRET must be at least {MIN_SECRET_LEN} characters long"
                )));
            }
            Err(_) if production => {
                return Err(JwtError::Config(
                    "JWT_SECRET must be set in production".to_string(),
                ));
            }
            Err(_) => {
                tracing::warn!("⚠️  JWT_SECRET not set, using a temporary key; tokens die on restart");
                ephemeral_secret()?
            }
        };

        let mut config = Self::with_secret(secret);
        if let Some(minutes) = std::env::var("JWT_EXPIRATION_MINUTES")
            .ok()
            .and_then(|s| s.parse::<i64>().ok())
            .filter(|m| *m > 0)
        {
            config.expiration_minutes = minutes;
        }
        if let Ok(issuer) = std::env::var("JWT_ISSUER") {
            config.issuer = issuer;
        }
        if let Ok(audience) = std::env::var("JWT_AUDIENCE") {
            config.audience = audience;
        }
        Ok(config)
    }
}

/// 64 printable characters from the OS RNG
fn ephemeral_secret() -> Result<String, JwtError> {
    const ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789-_";
    let mut bytes = [0u8; 64];
    SystemRandom::new()
        .fill(&mut bytes)
        .map_err(|_| JwtError::Config("system RNG unavailable".to_string()))?;
    Ok(bytes
        .iter()
        .map(|b| ALPHABET[*b as usize % ALPHABET.len()] as char)
        .collect())
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// 员工 ID
    pub sub: String,
    pub username: String,
    pub role: EmployeeRole,
    #[serde(default)]
    pub permissions: Vec<String>,
    pub exp: i64,
    pub iat: i64,
    pub iss: String,
    pub aud: String,
}

#[derive(Error, Debug)]
pub enum JwtError {
    #[error("无效令牌: {0}")]
    InvalidToken(String),

    #[error("令牌已过期")]
    ExpiredToken,

    #[error("无效签名")]
    InvalidSignature,

    #[error("令牌生成失败: {0}")]
    GenerationFailed(String),

    #[error("JWT 配置错误: {0}")]
    Config(String),
}

impl From<JwtError> for AppError {
    fn from(err: JwtError) -> Self {
        let message = err.to_string();
        match err {
            JwtError::ExpiredToken => AppError::token_expired(),
            JwtError::InvalidToken(_) | JwtError::InvalidSignature => {
                AppError::invalid_token(message)
            }
            JwtError::GenerationFailed(_) => AppError::internal(message),
            JwtError::Config(_) => AppError::with_message(ErrorCode::ConfigError, message),
        }
    }
}

#[derive(Clone)]
pub struct JwtService {
    pub config: JwtConfig,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl std::fmt::Debug for JwtService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtService")
            .field("issuer", &self.config.issuer)
            .field("audience", &self.config.audience)
            .field("expiration_minutes", &self.config.expiration_minutes)
            .finish_non_exhaustive()
    }
}

impl JwtService {
    pub fn with_config(config: JwtConfig) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.secret.as_bytes()),
            config,
        }
    }

    pub fn generate_token(
        &self,
        user_id: i64,
        username: &str,
        role: EmployeeRole,
        permissions: &[String],
    ) -> Result<String, JwtError> {
        let now = Utc::now();
        let claims = Claims {
            sub: user_id.to_string(),
            username: username.to_string(),
            role,
            permissions: permissions.to_vec(),
            exp: (now + Duration::minutes(self.config.expiration_minutes)).timestamp(),
            iat: now.timestamp(),
            iss: self.config.issuer.clone(),
            aud: self.config.audience.clone(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| JwtError::GenerationFailed(e.to_string()))
    }

    pub fn validate_token(&self, token: &str) -> Result<Claims, JwtError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_audience(&[&self.config.audience]);
        validation.set_issuer(&[&self.config.issuer]);
        validation.set_required_spec_claims(&["sub", "exp", "iat", "iss", "aud"]);

        decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => JwtError::ExpiredToken,
                ErrorKind::InvalidSignature => JwtError::InvalidSignature,
                _ => JwtError::InvalidToken(e.to_string()),
            })
    }

    /// `Bearer <token>` 中的令牌部分
    pub fn extract_from_header(header: &str) -> Option<&str> {
        header
            .strip_prefix("Bearer ")
            .map(str::trim)
            .filter(|t| !t.is_empty())
    }

    pub fn expires_in_seconds(&self) -> i64 {
        self.config.expiration_minutes * 60
    }
}

/// 已认证的员工，由认证中间件注入请求扩展
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub id: i64,
    pub username: String,
    pub role: EmployeeRole,
    pub permissions: Vec<String>,
}

impl TryFrom<Claims> for CurrentUser {
    type Error = JwtError;

    fn try_from(claims: Claims) -> Result<Self, Self::Error> {
        let id = claims
            .sub
            .parse()
            .map_err(|_| JwtError::InvalidToken(format!("Malformed subject: {}", claims.sub)))?;
        // 未知权限名直接丢弃
        let permissions = claims
            .permissions
            .into_iter()
            .filter(|p| is_valid_permission(p))
            .collect();

        Ok(Self {
            id,
            username: claims.username,
            role: claims.role,
            permissions,
        })
    }
}

impl CurrentUser {
    pub fn is_admin(&self) -> bool {
        self.role == EmployeeRole::Admin
    }

    /// 管理员或持有 `all` 拥有全部权限；其余按精确名或 `area:*` 通配匹配
    pub fn has_permission(&self, permission: &str) -> bool {
        if self.is_admin() || self.permissions.iter().any(|p| p == "all") {
            return true;
        }
        self.permissions.iter().any(|p| match p.strip_suffix(":*") {
            Some(area) => permission
                .strip_prefix(area)
                .is_some_and(|rest| rest.starts_with(':')),
            None => p == permission,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret-key-that-is-long-enough-for-hs256";

    fn service() -> JwtService {
        JwtService::with_config(JwtConfig::with_secret(SECRET))
    }

    fn claims(permissions: &[&str]) -> Claims {
        Claims {
            sub: "7".into(),
            username: "clerk".into(),
            role: EmployeeRole::Staff,
            permissions: permissions.iter().map(|p| p.to_string()).collect(),
            exp: 0,
            iat: 0,
            iss: String::new(),
            aud: String::new(),
        }
    }

    fn staff(permissions: &[&str]) -> CurrentUser {
        CurrentUser::try_from(claims(permissions)).unwrap()
    }

    #[test]
    fn staff_token_round_trips_to_current_user() {
        let permissions = vec!["rentals:manage".to_string(), "inventory:manage".to_string()];
        let token = service()
            .generate_token(42, "maria", EmployeeRole::Staff, &permissions)
            .unwrap();

        let user = CurrentUser::try_from(service().validate_token(&token).unwrap()).unwrap();
        assert_eq!(user.id, 42);
        assert_eq!(user.username, "maria");
        assert_eq!(user.role, EmployeeRole::Staff);
        assert_eq!(user.permissions, permissions);
    }

    #[test]
    fn foreign_tokens_are_rejected() {
        let token = service()
            .generate_token(1, "a", EmployeeRole::Staff, &[])
            .unwrap();

        let other = JwtService::with_config(JwtConfig::with_secret(
            "another-secret-key-that-is-long-enough-too",
        ));
        assert!(matches!(
            other.validate_token(&token),
            Err(JwtError::InvalidSignature)
        ));

        let mut config = JwtConfig::with_secret(SECRET);
        config.audience = "storefront".into();
        assert!(JwtService::with_config(config).validate_token(&token).is_err());
    }

    #[test]
    fn expired_token_is_reported() {
        let mut config = JwtConfig::with_secret(SECRET);
        config.expiration_minutes = -10;
        let service = JwtService::with_config(config);
        let token = service
            .generate_token(1, "a", EmployeeRole::Staff, &[])
            .unwrap();
        assert!(matches!(
            service.validate_token(&token),
            Err(JwtError::ExpiredToken)
        ));
    }

    #[test]
    fn wildcard_covers_one_area() {
        let user = staff(&["dashboard:view", "rentals:*"]);
        assert!(user.has_permission("dashboard:view"));
        assert!(user.has_permission("rentals:manage"));
        assert!(!user.has_permission("rentalsx:manage"));
        assert!(!user.has_permission("settings:manage"));
    }

    #[test]
    fn admin_needs_no_permission_list() {
        let admin = CurrentUser {
            role: EmployeeRole::Admin,
            ..staff(&[])
        };
        assert!(admin.has_permission("settings:manage"));
        assert!(admin.has_permission("employees:manage"));
    }

    #[test]
    fn unknown_permissions_are_dropped() {
        let user = staff(&["rentals:manage", "orders:void", "", "inventory:*"]);
        assert_eq!(user.permissions, vec!["rentals:manage", "inventory:*"]);
        assert!(!user.has_permission("orders:void"));
    }

    #[test]
    fn malformed_subject_is_rejected() {
        let mut c = claims(&[]);
        c.sub = "employee:abc".into();
        assert!(CurrentUser::try_from(c).is_err());
    }

    #[test]
    fn bearer_header_parsing() {
        assert_eq!(JwtService::extract_from_header("Bearer abc.def"), Some("abc.def"));
        assert_eq!(JwtService::extract_from_header("Bearer "), None);
        assert_eq!(JwtService::extract_from_header("Basic abc"), None);
    }

    #[test]
    fn ephemeral_secrets_differ() {
        let a = ephemeral_secret().unwrap();
        assert_eq!(a.len(), 64);
        assert_ne!(a, ephemeral_secret().unwrap());
    }
}
