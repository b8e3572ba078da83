/*
 * Responsibility
 * - Handler から見える「認可済み」情報の型
 * - authorize guard が request extensions に格納し、handler はこの型だけを受け取る
 */
use crate::services::auth::AccessLevel;

/// Level the guard granted for the operation protecting the current route.
///
/// Never `AccessLevel::None`: such requests are rejected before the handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GrantedLevel {
    pub operation: &'static str,
    pub level: AccessLevel,
}
