// 账户领域管理器
//
// 负责用户注册、登录、资料修改和删除

use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{AppError, AppResult};
use crate::models::{has_role, Role};
use crate::storage::{is_unique_violation, DatabaseRepository, User};
use crate::utils::{hash_password, require_text, validate_id, verify_password};

/// 注册请求
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RegisterRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub role: Option<String>,
}

/// 登录请求
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

/// 修改资料请求，未提供的字段保持不变
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateUserRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

/// 登录成功后返回的用户信息
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct LoginResponse {
    pub id: i64,
    pub email: String,
    pub name: String,
    pub role: String,
}

/// 账户领域管理器
#[derive(Clone)]
pub struct AccountsDomain {
    repo: Arc<dyn DatabaseRepository>,
}

impl AccountsDomain {
    /// 创建新的账户领域管理器
    pub fn new(repo: Arc<dyn DatabaseRepository>) -> Self {
        Self { repo }
    }

    /// 注册新用户
    pub async fn register(&self, req: RegisterRequest) -> AppResult<User> {
        let name = require_text("name", req.name.as_deref())?;
        let email = require_text("email", req.email.as_deref())?;
        let password = require_text("password", req.password.as_deref())?;
        let role_name = require_text("role", req.role.as_deref())?;
        let role = Role::parse(role_name)
            .ok_or_else(|| AppError::Validation(format!("invalid role: {}", role_name)))?;

        if self.repo.get_user_by_email(email).await?.is_some() {
            warn!("注册失败，邮箱已存在: {}", email);
            return Err(AppError::Conflict("email already registered".to_string()));
        }

        let mut user = User {
            id: None,
            name: name.to_string(),
            email: email.to_string(),
            password_hash: hash_password(password),
            role: role.as_str().to_string(),
            created_at: Utc::now(),
        };
        user.id = Some(self.repo.insert_user(&user).await.map_err(duplicate_email)?);

        info!("用户注册成功: id={:?}, role={}", user.id, user.role);
        Ok(user)
    }

    /// 校验邮箱和密码
    pub async fn login(&self, req: LoginRequest) -> AppResult<LoginResponse> {
        let email = require_text("email", req.email.as_deref())?;
        let password = require_text("password", req.password.as_deref())?;

        let invalid = || AppError::Unauthorized("invalid email or password".to_string());

        let user = self.repo.get_user_by_email(email).await?.ok_or_else(invalid)?;
        if !verify_password(password, &user.password_hash) {
            warn!("登录失败，密码错误: {}", email);
            return Err(invalid());
        }

        let id = user.id.ok_or_else(invalid)?;
        info!("用户登录: id={}", id);
        Ok(LoginResponse {
            id,
            email: user.email,
            name: user.name,
            role: user.role,
        })
    }

    /// 修改用户资料
    pub async fn update_user(&self, user_id: i64, req: UpdateUserRequest) -> AppResult<User> {
        let mut user = self.get_user(user_id).await?;

        if let Some(name) = req.name.as_deref().map(str::trim).filter(|v| !v.is_empty()) {
            user.name = name.to_string();
        }

        if let Some(email) = req.email.as_deref().map(str::trim).filter(|v| !v.is_empty()) {
            if email != user.email {
                if let Some(owner) = self.repo.get_user_by_email(email).await? {
                    if owner.id != user.id {
                        return Err(AppError::Conflict("email already registered".to_string()));
                    }
                }
                user.email = email.to_string();
            }
        }

        if let Some(password) = req.password.as_deref().filter(|v| !v.trim().is_empty()) {
            user.password_hash = hash_password(password);
        }

        self.repo.update_user(&user).await.map_err(duplicate_email)?;
        info!("用户资料已更新: id={}", user_id);
        Ok(user)
    }

    /// 删除用户
    pub async fn delete_user(&self, user_id: i64) -> AppResult<()> {
        validate_id("user_id", user_id)?;
        if self.repo.delete_user(user_id).await? == 0 {
            return Err(AppError::NotFound("user not found".to_string()));
        }
        info!("用户已删除: id={}", user_id);
        Ok(())
    }

    /// 按 ID 获取用户
    pub async fn get_user(&self, user_id: i64) -> AppResult<User> {
        validate_id("user_id", user_id)?;
        self.repo
            .get_user(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("user not found".to_string()))
    }
}

/// 并发注册绕过了预检查时，唯一约束冲突按邮箱重复处理
fn duplicate_email(err: anyhow::Error) -> AppError {
    if is_unique_violation(&err) {
        warn!("邮箱唯一约束冲突");
        AppError::Conflict("email already registered".to_string())
    } else {
        AppError::Persistence(err)
    }
}

/// 获取医生；用户不存在或不是医生时返回 NotFound
pub async fn require_doctor(repo: &dyn DatabaseRepository, doctor_id: i64) -> AppResult<User> {
    validate_id("doctor_id", doctor_id)?;
    match repo.get_user(doctor_id).await? {
        Some(user) if has_role(&user, Role::Doctor) => Ok(user),
        _ => Err(AppError::NotFound("doctor not found".to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::test_support::open_repo;
    use tempfile::tempdir;

    fn register_req(name: &str, email: &str, role: &str) -> RegisterRequest {
        RegisterRequest {
            name: Some(name.to_string()),
            email: Some(email.to_string()),
            password: Some("pa55word".to_string()),
            role: Some(role.to_string()),
        }
    }

    #[tokio::test]
    async fn test_register_and_login() {
        let temp_dir = tempdir().unwrap();
        let accounts = AccountsDomain::new(open_repo(&temp_dir).await);

        let user = accounts
            .register(register_req("Iryna", "iryna@example.com", "patient"))
            .await
            .unwrap();
        assert!(user.id.is_some());
        assert_ne!(user.password_hash, "pa55word");

        let login = accounts
            .login(LoginRequest {
                email: Some("iryna@example.com".to_string()),
                password: Some("pa55word".to_string()),
            })
            .await
            .unwrap();
        assert_eq!(Some(login.id), user.id);
        assert_eq!(login.role, "patient");

        let wrong = accounts
            .login(LoginRequest {
                email: Some("iryna@example.com".to_string()),
                password: Some("nope".to_string()),
            })
            .await;
        assert!(matches!(wrong, Err(AppError::Unauthorized(_))));

        let unknown = accounts
            .login(LoginRequest {
                email: Some("ghost@example.com".to_string()),
                password: Some("pa55word".to_string()),
            })
            .await;
        assert!(matches!(unknown, Err(AppError::Unauthorized(_))));
    }

    #[tokio::test]
    async fn test_register_validation_and_duplicates() {
        let temp_dir = tempdir().unwrap();
        let accounts = AccountsDomain::new(open_repo(&temp_dir).await);

        let missing = accounts
            .register(RegisterRequest {
                name: Some("No Email".to_string()),
                ..Default::default()
            })
            .await;
        assert!(matches!(missing, Err(AppError::Validation(_))));

        let bad_role = accounts
            .register(register_req("Nurse", "nurse@example.com", "nurse"))
            .await;
        assert!(matches!(bad_role, Err(AppError::Validation(_))));

        accounts
            .register(register_req("A", "dup@example.com", "doctor"))
            .await
            .unwrap();
        let dup = accounts
            .register(register_req("B", "dup@example.com", "patient"))
            .await;
        assert!(matches!(dup, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_unique_violation_maps_to_conflict() {
        let temp_dir = tempdir().unwrap();
        let repo = open_repo(&temp_dir).await;

        let user = User {
            id: None,
            name: "Race".to_string(),
            email: "race@example.com".to_string(),
            password_hash: String::new(),
            role: "patient".to_string(),
            created_at: Utc::now(),
        };
        repo.insert_user(&user).await.unwrap();
        let err = repo.insert_user(&user).await.unwrap_err();

        assert!(matches!(duplicate_email(err), AppError::Conflict(_)));
        assert!(matches!(
            duplicate_email(anyhow::anyhow!("connection reset")),
            AppError::Persistence(_)
        ));
    }

    #[tokio::test]
    async fn test_update_and_delete_user() {
        let temp_dir = tempdir().unwrap();
        let accounts = AccountsDomain::new(open_repo(&temp_dir).await);

        let a = accounts
            .register(register_req("A", "a@example.com", "patient"))
            .await
            .unwrap();
        accounts
            .register(register_req("B", "b@example.com", "patient"))
            .await
            .unwrap();
        let a_id = a.id.unwrap();

        let taken = accounts
            .update_user(
                a_id,
                UpdateUserRequest {
                    email: Some("b@example.com".to_string()),
                    ..Default::default()
                },
            )
            .await;
        assert!(matches!(taken, Err(AppError::Conflict(_))));

        let updated = accounts
            .update_user(
                a_id,
                UpdateUserRequest {
                    name: Some("Anna".to_string()),
                    password: Some("new-pass".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.name, "Anna");
        assert!(accounts
            .login(LoginRequest {
                email: Some("a@example.com".to_string()),
                password: Some("new-pass".to_string()),
            })
            .await
            .is_ok());

        accounts.delete_user(a_id).await.unwrap();
        assert!(matches!(
            accounts.delete_user(a_id).await,
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(
            accounts.update_user(a_id, UpdateUserRequest::default()).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_require_doctor_checks_role() {
        let temp_dir = tempdir().unwrap();
        let repo = open_repo(&temp_dir).await;
        let accounts = AccountsDomain::new(repo.clone());

        let doctor = accounts
            .register(register_req("Dr", "dr@example.com", "doctor"))
            .await
            .unwrap();
        let patient = accounts
            .register(register_req("P", "p@example.com", "patient"))
            .await
            .unwrap();

        assert!(require_doctor(repo.as_ref(), doctor.id.unwrap()).await.is_ok());
        assert!(matches!(
            require_doctor(repo.as_ref(), patient.id.unwrap()).await,
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(
            require_doctor(repo.as_ref(), 0).await,
            Err(AppError::Validation(_))
        ));
    }
}
