//! 会话存储服务 - 业务能力层
//!
//! 只负责"读写唯一的用户记录"能力

use tracing::debug;

use crate::error::SessionError;
use crate::infrastructure::KeyValueStore;
use crate::models::UserInfo;

/// 用户记录的固定 key
pub const SESSION_KEY: &str = "quiz_user_info";

/// 会话存储
///
/// 职责：
/// - 启动时读取一次
/// - 登录时写入
/// - 退出时删除
pub struct SessionStore {
    store: Box<dyn KeyValueStore>,
}

impl SessionStore {
    pub fn new(store: Box<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// 读取已保存的用户
    ///
    /// # 返回
    /// - `Ok(None)`：没有保存过会话
    /// - `Err(SessionError::Corrupt)`：存在记录但无法解析
    pub async fn load(&self) -> Result<Option<UserInfo>, SessionError> {
        let raw = self
            .store
            .get(SESSION_KEY)
            .await
            .map_err(|source| SessionError::ReadFailed {
                key: SESSION_KEY.to_string(),
                source,
            })?;

        let Some(raw) = raw else {
            debug!("未找到已保存的会话");
            return Ok(None);
        };

        let user = serde_json::from_str(&raw).map_err(|source| SessionError::Corrupt {
            key: SESSION_KEY.to_string(),
            source,
        })?;

        Ok(Some(user))
    }

    /// 保存用户
    pub async fn save(&self, user: &UserInfo) -> Result<(), SessionError> {
        let raw = serde_json::to_string(user).map_err(SessionError::Serialize)?;
        self.store
            .set(SESSION_KEY, &raw)
            .await
            .map_err(|source| SessionError::WriteFailed {
                key: SESSION_KEY.to_string(),
                source,
            })?;
        debug!("会话已保存: {}", user.name);
        Ok(())
    }

    /// 删除已保存的用户
    pub async fn clear(&self) -> Result<(), SessionError> {
        self.store
            .remove(SESSION_KEY)
            .await
            .map_err(|source| SessionError::RemoveFailed {
                key: SESSION_KEY.to_string(),
                source,
            })?;
        debug!("会话已删除");
        Ok(())
    }
}
