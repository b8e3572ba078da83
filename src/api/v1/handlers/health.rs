/*
 * Responsibility
 * - GET /health (疎通用)
 * - 資格情報なしで到達できる唯一のエンドポイント
 */
use axum::Json;
use serde_json::{Value, json};

pub async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
