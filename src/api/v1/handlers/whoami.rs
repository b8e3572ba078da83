/*
 * Responsibility
 * - GET /whoami (資格情報の確認用)
 * - ポリシーで守られていない: 認証さえ通れば誰でも自分の情報を見られる
 */
use axum::Json;

use crate::api::v1::{dto::whoami::WhoAmIResponse, extractors::AuthenticatedUser};

pub async fn whoami(AuthenticatedUser(identity): AuthenticatedUser) -> Json<WhoAmIResponse> {
    Json(WhoAmIResponse::from(&identity))
}
