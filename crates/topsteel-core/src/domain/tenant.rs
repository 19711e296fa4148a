//! Tenant context and authenticated principal

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Tenant identifiers attached to a request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TenantContext {
    pub societe_id: Uuid,
    pub site_id: Option<Uuid>,
}

impl TenantContext {
    pub fn new(societe_id: Uuid, site_id: Option<Uuid>) -> Self {
        Self { societe_id, site_id }
    }
}

/// Authenticated caller as seen by the services
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Principal {
    pub user_id: Uuid,
    pub roles: Vec<String>,
    pub permissions: Vec<String>,
    /// `None` when no société is selected; callers pass through unchanged
    pub tenant: Option<TenantContext>,
}

impl Principal {
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }

    pub fn has_any_role(&self, roles: &[&str]) -> bool {
        roles.iter().any(|role| self.has_role(role))
    }
}

/// Fill missing `societeId` / `siteId` on an object-shaped body.
///
/// Values already present are kept as is, even when they differ from the
/// context. Returns whether the body was changed.
pub fn inject_tenant_ids(body: &mut Value, ctx: &TenantContext) -> bool {
    let Some(object) = body.as_object_mut() else {
        return false;
    };

    let mut changed = false;

    if !object.contains_key("societeId") {
        object.insert("societeId".to_string(), Value::String(ctx.societe_id.to_string()));
        changed = true;
    }

    if let Some(site_id) = ctx.site_id {
        if !object.contains_key("siteId") {
            object.insert("siteId".to_string(), Value::String(site_id.to_string()));
            changed = true;
        }
    }

    changed
}
