/*
 * Responsibility
 * - GET /config/roles (読み込まれたロールポリシーの参照)
 * - `config` 操作の authorize guard の内側でのみルーティングされる
 */
use axum::{Json, extract::State};

use crate::{
    api::v1::extractors::{AuthenticatedUser, GrantedLevel},
    services::auth::Policy,
    state::AppState,
};

pub async fn list_roles(
    State(state): State<AppState>,
    AuthenticatedUser(identity): AuthenticatedUser,
    granted: GrantedLevel,
) -> Json<Policy> {
    tracing::debug!(
        dn = identity.primary_dn(),
        level = %granted.level,
        "role policy requested"
    );
    Json(state.policy.as_ref().clone())
}
