/*
 * Responsibility
 * - v1 の URL 構造を定義
 * - 全ルートに credentials middleware を適用し、操作ごとの authorize guard を route_layer で掛ける
 */
use axum::{Router, routing::get};

use crate::middleware::auth::{authorize, credentials};
use crate::services::auth::authz;
use crate::state::AppState;

use crate::api::v1::handlers::{config::list_roles, whoami::whoami};

pub fn routes(state: AppState) -> Router<AppState> {
    let config = authorize::require(
        Router::new().route("/config/roles", get(list_roles)),
        authz::CONFIG,
    );

    let router = Router::new().route("/whoami", get(whoami)).merge(config);

    credentials::apply(router, state)
}
