//! Bearer access-token gate → AuthCtx を extensions に入れる
//!
//! - `Authorization: Bearer <jwt>` を取り出し、JWKS の `kid` で鍵を引いて
//!   署名 / iss / aud / exp を検証する（AuthService 側で実施）
//! - route ごとに要求する permission を指定できる（`""` なら permissions claim があれば通す）
//! - 失敗時は handler を呼ばずに JSON error envelope を返す

use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::{self, Next},
    response::Response,
    routing::MethodRouter,
};

use crate::api::v1::extractors::AuthCtx;
use crate::error::AppError;
use crate::services::auth::AuthService;
use crate::state::AppState;

#[derive(Clone)]
struct Gate {
    auth: Arc<AuthService>,
    permission: &'static str,
}

/// route (MethodRouter) に認可を掛ける。
///
/// 例：
/// ```ignore
/// .route("/drinks-detail", require_auth(get(drinks_detail), &state.auth, "get:drinks-detail"))
/// ```
///
/// `route_layer` なので、存在しない method への 405 は認可より先に返る。
pub fn require_auth(
    route: MethodRouter<AppState>,
    auth: &Arc<AuthService>,
    permission: &'static str,
) -> MethodRouter<AppState> {
    let gate = Gate {
        auth: Arc::clone(auth),
        permission,
    };
    route.route_layer(middleware::from_fn_with_state(gate, access_middleware))
}

async fn access_middleware(
    State(gate): State<Gate>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let claims = match gate.auth.authorize(req.headers(), gate.permission).await {
        Ok(claims) => claims,
        Err(err) => {
            tracing::warn!(
                kind = err.kind(),
                code = err.code(),
                status = err.status().as_u16(),
                permission = gate.permission,
                "access token rejected"
            );
            return Err(err.into());
        }
    };

    let auth_ctx = AuthCtx::from_claims(claims);
    tracing::debug!(sub = ?auth_ctx.subject, permission = gate.permission, "access granted");

    // middleware → extractor への受け渡し（リクエスト単位、共有しない）
    req.extensions_mut().insert(auth_ctx);

    Ok(next.run(req).await)
}
