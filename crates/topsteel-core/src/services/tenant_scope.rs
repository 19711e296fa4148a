//! Scoped tenant context over a [`TenantSession`]

use futures::future::BoxFuture;
use tracing::{debug, warn};

use crate::domain::TenantContext;
use crate::error::DomainError;
use crate::repositories::TenantSession;

/// Run `f` with the session scoped to `ctx`.
///
/// The context is set before `f` runs and cleared after it returns, whether
/// `f` succeeded or not. Without a context `f` runs on the session as is.
/// When both `f` and the clear fail, the error of `f` wins.
pub async fn with_tenant_context<S, T, F>(
    session: &mut S,
    ctx: Option<&TenantContext>,
    f: F,
) -> Result<T, DomainError>
where
    S: TenantSession + ?Sized,
    F: for<'a> FnOnce(&'a mut S) -> BoxFuture<'a, Result<T, DomainError>>,
{
    let Some(ctx) = ctx else {
        debug!("No tenant context, running unscoped");
        return f(session).await;
    };

    if let Err(e) = session.set_context(ctx).await {
        if let Err(clear_err) = session.clear_context().await {
            warn!("Failed to clear tenant context after set failure: {}", clear_err);
        }
        return Err(e);
    }

    let result = f(session).await;
    let cleared = session.clear_context().await;

    match (result, cleared) {
        (Ok(value), Ok(())) => Ok(value),
        (Ok(_), Err(clear_err)) => Err(clear_err),
        (Err(e), Ok(())) => Err(e),
        (Err(e), Err(clear_err)) => {
            warn!("Failed to clear tenant context for {}: {}", ctx.societe_id, clear_err);
            Err(e)
        }
    }
}
