/*
 * Responsibility
 * - Router に紐づける共有コンテキスト (AppState)
 *   - ロールポリシーは起動時に一度だけ読み込み、以後は読み取り専用で共有する
 * - Clone 前提で持つ (内部は Arc/Clone cheap)
 */
use std::sync::Arc;

use crate::services::auth::Policy;

#[derive(Clone, Debug)]
pub struct AppState {
    pub policy: Arc<Policy>,
}

impl AppState {
    pub fn new(policy: Policy) -> Self {
        Self {
            policy: Arc::new(policy),
        }
    }
}
