//! クライアント証明書 (X.509 / VOMS proxy) 由来の資格情報 → Identity を extensions に入れる
//!
//! TLS 終端と証明書検証は前段の Web サーバー (reverse proxy) が行い、結果を
//! `GRST_CRED_AURI_<n>` / `SSL_CLIENT_S_DN` 相当のヘッダとして転送してくる前提。
//! 前段はクライアントが送ってきた同名ヘッダを必ず削除すること。

use axum::{
    Router,
    body::Body,
    extract::State,
    http::Request,
    middleware::{self, Next},
    response::Response,
};

use crate::error::AppError;
use crate::services::auth::Identity;
use crate::state::AppState;

/// `/api/v1/*` に認証を掛けるための middleware を適用する。
///
/// 例：
/// ```ignore
/// let v1 = middleware::auth::credentials::apply(v1, state.clone());
/// app = app.nest("/api/v1", v1);
/// ```
pub fn apply(router: Router<AppState>, state: AppState) -> Router<AppState> {
    router.layer(middleware::from_fn_with_state(state, credentials_middleware))
}

async fn credentials_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    // Identity はリクエストごとに一度だけ組み立て、以後は読み取り専用
    let identity = Identity::extract(req.headers(), &state.policy);

    let Some(dn) = identity.primary_dn() else {
        tracing::warn!(uri = %req.uri(), "request without client certificate");
        return Err(AppError::forbidden(
            "A valid X509 certificate or proxy is needed",
        ));
    };

    tracing::debug!(
        dn,
        delegation_id = identity.delegation_id(),
        vos = ?identity.vo_memberships(),
        roles = ?identity.roles(),
        "authenticated"
    );

    // middleware → extractor への受け渡し
    req.extensions_mut().insert(identity);

    Ok(next.run(req).await)
}
