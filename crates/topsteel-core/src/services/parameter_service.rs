//! Parameter lookup and administration with a per-group TTL cache

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::DashMap;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::domain::{Parameter, ParameterScope, ParameterUpdate, ParameterValue, ParameterView};
use crate::error::DomainError;
use crate::repositories::ParameterRepository;

const UNORDERED: i32 = 999;

type GroupKey = (ParameterScope, String, Option<Uuid>);

struct CachedGroup {
    parameters: Vec<Parameter>,
    expires_at: Instant,
}

impl CachedGroup {
    fn is_expired(&self) -> bool {
        self.expires_at <= Instant::now()
    }
}

/// Cache size past which an insert also sweeps expired groups
const SWEEP_THRESHOLD: usize = 256;

/// Client parameters grouped by group, then key
pub type ClientPreferences = BTreeMap<String, BTreeMap<String, ParameterView>>;

pub struct ParameterService<R>
where
    R: ParameterRepository + ?Sized,
{
    repo: Arc<R>,
    ttl: Duration,
    groups: DashMap<GroupKey, CachedGroup>,
}

impl<R> ParameterService<R>
where
    R: ParameterRepository + ?Sized,
{
    pub fn new(repo: Arc<R>, cache_ttl_secs: u64) -> Self {
        Self {
            repo,
            ttl: Duration::from_secs(cache_ttl_secs),
            groups: DashMap::new(),
        }
    }

    fn scoped_tenant(scope: ParameterScope, tenant_id: Option<Uuid>) -> Option<Uuid> {
        match scope {
            ParameterScope::Client => tenant_id,
            _ => None,
        }
    }

    async fn find_active(
        &self,
        scope: ParameterScope,
        group: &str,
        key: &str,
        tenant_id: Option<Uuid>,
    ) -> Result<Parameter, DomainError> {
        self.repo
            .find(scope, group, key, Self::scoped_tenant(scope, tenant_id))
            .await?
            .filter(|p| p.is_active)
            .ok_or_else(|| DomainError::ParameterNotFound {
                scope,
                group: group.to_string(),
                key: key.to_string(),
            })
    }

    /// Localized parameter; inactive parameters are reported as missing
    pub async fn get_parameter(
        &self,
        scope: ParameterScope,
        group: &str,
        key: &str,
        tenant_id: Option<Uuid>,
        lang: &str,
    ) -> Result<ParameterView, DomainError> {
        Ok(self.find_active(scope, group, key, tenant_id).await?.view(lang))
    }

    pub async fn get_typed(
        &self,
        scope: ParameterScope,
        group: &str,
        key: &str,
        tenant_id: Option<Uuid>,
    ) -> Result<ParameterValue, DomainError> {
        let param = self.find_active(scope, group, key, tenant_id).await?;
        param
            .typed_value()
            .map_err(|reason| DomainError::InvalidParameterValue {
                group: param.group.clone(),
                key: param.key.clone(),
                reason,
            })
    }

    /// Active parameters of a group ordered by metadata order, then key
    pub async fn get_group(
        &self,
        scope: ParameterScope,
        group: &str,
        tenant_id: Option<Uuid>,
        lang: &str,
    ) -> Result<Vec<ParameterView>, DomainError> {
        let cache_key = (scope, group.to_string(), Self::scoped_tenant(scope, tenant_id));

        let cached = self.cached_group(&cache_key);

        let parameters = match cached {
            Some(parameters) => {
                debug!("Parameter group cache hit: {}.{}", scope, group);
                parameters
            }
            None => {
                let mut parameters: Vec<Parameter> = self
                    .repo
                    .list_group(scope, group, cache_key.2)
                    .await?
                    .into_iter()
                    .filter(|p| p.is_active)
                    .collect();
                parameters.sort_by(|a, b| {
                    a.metadata
                        .order
                        .unwrap_or(UNORDERED)
                        .cmp(&b.metadata.order.unwrap_or(UNORDERED))
                        .then_with(|| a.key.cmp(&b.key))
                });

                self.cache_group(cache_key, &parameters);
                parameters
            }
        };

        Ok(parameters.iter().map(|p| p.view(lang)).collect())
    }

    /// Client parameters of a tenant grouped by group and key. A user's own
    /// rows override the tenant-wide ones.
    pub async fn client_preferences(
        &self,
        tenant_id: &Uuid,
        user_id: Option<Uuid>,
        lang: &str,
    ) -> Result<ClientPreferences, DomainError> {
        let mut parameters: Vec<Parameter> = self
            .repo
            .list_client(tenant_id, user_id)
            .await?
            .into_iter()
            .filter(|p| p.is_active)
            .collect();
        parameters.sort_by_key(|p| p.user_id.is_some());

        let mut grouped = ClientPreferences::new();
        for param in &parameters {
            grouped
                .entry(param.group.clone())
                .or_default()
                .insert(param.key.clone(), param.view(lang));
        }
        Ok(grouped)
    }

    pub async fn create_parameter(&self, mut parameter: Parameter, created_by: Option<Uuid>) -> Result<Parameter, DomainError> {
        validator::Validate::validate(&parameter)?;

        match parameter.scope {
            ParameterScope::Client if parameter.tenant_id.is_none() => {
                return Err(DomainError::ValidationError(
                    "Client parameters require a tenant".to_string(),
                ));
            }
            ParameterScope::Client => {}
            _ => {
                parameter.tenant_id = None;
                parameter.user_id = None;
            }
        }

        if let Err(reason) = parameter.typed_value() {
            return Err(DomainError::InvalidParameterValue {
                group: parameter.group,
                key: parameter.key,
                reason,
            });
        }

        // Per-user rows may shadow a tenant-wide row; the store enforces their uniqueness
        if parameter.user_id.is_none()
            && self
                .repo
                .find(parameter.scope, &parameter.group, &parameter.key, parameter.tenant_id)
                .await?
                .is_some()
        {
            warn!("Parameter already exists: {}.{}.{}", parameter.scope, parameter.group, parameter.key);
            return Err(DomainError::ParameterAlreadyExists {
                scope: parameter.scope,
                group: parameter.group,
                key: parameter.key,
            });
        }

        parameter.audit.created_by = created_by;
        let created = self.repo.create(&parameter).await?;
        self.invalidate_group(created.scope, &created.group);

        info!("Parameter created: {}.{}.{}", created.scope, created.group, created.key);
        Ok(created)
    }

    /// Update a parameter; translations and metadata are merged
    pub async fn update_parameter(
        &self,
        scope: ParameterScope,
        group: &str,
        key: &str,
        tenant_id: Option<Uuid>,
        update: ParameterUpdate,
        updated_by: Option<Uuid>,
    ) -> Result<Parameter, DomainError> {
        let mut param = self
            .repo
            .find(scope, group, key, Self::scoped_tenant(scope, tenant_id))
            .await?
            .ok_or_else(|| DomainError::ParameterNotFound {
                scope,
                group: group.to_string(),
                key: key.to_string(),
            })?;

        if param.is_readonly && update.changes_value() {
            warn!("Refusing to change read-only parameter {}.{}", group, key);
            return Err(DomainError::ParameterReadonly {
                group: param.group,
                key: param.key,
            });
        }

        if let Some(value) = update.value {
            param.value = value;
            param.typed_value().map_err(|reason| DomainError::InvalidParameterValue {
                group: param.group.clone(),
                key: param.key.clone(),
                reason,
            })?;
        }
        if let Some(array_values) = update.array_values {
            param.array_values = Some(array_values);
        }
        if let Some(object_values) = update.object_values {
            param.object_values = Some(object_values);
        }
        param.custom_translations.extend(update.custom_translations);
        if let Some(metadata) = update.metadata {
            param.metadata.merge(metadata);
        }
        if let Some(is_active) = update.is_active {
            param.is_active = is_active;
        }
        if let Some(description) = update.description {
            param.description = Some(description);
        }
        param.audit.touch(updated_by);

        let updated = self.repo.update(&param).await?;
        self.invalidate_group(updated.scope, &updated.group);

        info!("Parameter updated: {}.{}.{}", updated.scope, updated.group, updated.key);
        Ok(updated)
    }

    fn cached_group(&self, key: &GroupKey) -> Option<Vec<Parameter>> {
        let entry = self.groups.get(key)?;
        if entry.is_expired() {
            drop(entry);
            self.groups.remove(key);
            return None;
        }
        Some(entry.parameters.clone())
    }

    fn cache_group(&self, key: GroupKey, parameters: &[Parameter]) {
        if self.ttl.is_zero() {
            return;
        }
        if self.groups.len() >= SWEEP_THRESHOLD {
            self.cleanup_expired();
        }
        self.groups.insert(
            key,
            CachedGroup {
                parameters: parameters.to_vec(),
                expires_at: Instant::now() + self.ttl,
            },
        );
    }

    /// Drop expired groups, returns how many were removed
    pub fn cleanup_expired(&self) -> usize {
        let before = self.groups.len();
        self.groups.retain(|_, entry| !entry.is_expired());
        let removed = before.saturating_sub(self.groups.len());
        if removed > 0 {
            debug!("Removed {} expired parameter groups from cache", removed);
        }
        removed
    }

    /// Drop cached entries of a group for every tenant
    pub fn invalidate_group(&self, scope: ParameterScope, group: &str) {
        self.groups
            .retain(|(cached_scope, cached_group, _), _| !(*cached_scope == scope && cached_group == group));
        debug!("Parameter group cache invalidated: {}.{}", scope, group);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use crate::domain::{ParameterMetadata, ParameterType};
    use crate::repositories::MockParameterRepository;

    fn param(scope: ParameterScope, group: &str, key: &str, value: &str) -> Parameter {
        Parameter::new(scope, group.to_string(), key.to_string(), value.to_string(), ParameterType::String).unwrap()
    }

    #[tokio::test]
    async fn test_get_parameter_localized() {
        let mut repo = MockParameterRepository::new();
        repo.expect_find().returning(|scope, group, key, _| {
            let mut p = param(scope, group, key, "Administrateur");
            p.custom_translations.insert("en".to_string(), "Administrator".to_string());
            Ok(Some(p))
        });

        let view = ParameterService::new(Arc::new(repo), 300)
            .get_parameter(ParameterScope::System, "user_roles", "ADMIN", None, "en")
            .await
            .unwrap();

        assert_eq!(view.value, "Administrator");
        assert_eq!(view.raw_value, "Administrateur");
    }

    #[tokio::test]
    async fn test_inactive_parameter_is_not_found() {
        let mut repo = MockParameterRepository::new();
        repo.expect_find().returning(|scope, group, key, _| {
            let mut p = param(scope, group, key, "x");
            p.is_active = false;
            Ok(Some(p))
        });

        let result = ParameterService::new(Arc::new(repo), 300)
            .get_parameter(ParameterScope::System, "g", "k", None, "fr")
            .await;

        assert!(matches!(result, Err(DomainError::ParameterNotFound { .. })));
    }

    #[tokio::test]
    async fn test_get_typed_reports_bad_values() {
        let mut repo = MockParameterRepository::new();
        repo.expect_find().returning(|scope, group, key, _| {
            let mut p = param(scope, group, key, "vingt");
            p.value_type = ParameterType::Number;
            Ok(Some(p))
        });

        let result = ParameterService::new(Arc::new(repo), 300)
            .get_typed(ParameterScope::Application, "billing", "vat_rate", None)
            .await;

        assert!(matches!(result, Err(DomainError::InvalidParameterValue { .. })));
    }

    #[tokio::test]
    async fn test_group_sorted_and_cached() {
        let mut repo = MockParameterRepository::new();
        repo.expect_list_group().times(1).returning(|scope, group, _| {
            let mut first = param(scope, group, "b", "B");
            first.metadata = ParameterMetadata { order: Some(1), ..Default::default() };
            let second = param(scope, group, "a", "A");
            let mut inactive = param(scope, group, "c", "C");
            inactive.is_active = false;
            Ok(vec![second, inactive, first])
        });

        let service = ParameterService::new(Arc::new(repo), 300);
        let views = service
            .get_group(ParameterScope::System, "user_roles", None, "fr")
            .await
            .unwrap();
        let again = service
            .get_group(ParameterScope::System, "user_roles", None, "fr")
            .await
            .unwrap();

        let keys: Vec<_> = views.iter().map(|v| v.key.as_str()).collect();
        assert_eq!(keys, vec!["b", "a"]);
        assert_eq!(views, again);
    }

    #[tokio::test]
    async fn test_zero_ttl_caches_nothing() {
        let mut repo = MockParameterRepository::new();
        repo.expect_list_group().times(500).returning(|_, _, _| Ok(vec![]));

        let service = ParameterService::new(Arc::new(repo), 0);
        for n in 0..500 {
            service
                .get_group(ParameterScope::System, &format!("group_{}", n), None, "fr")
                .await
                .unwrap();
        }

        assert!(service.groups.is_empty());
    }

    #[tokio::test]
    async fn test_expired_groups_are_evicted() {
        let mut repo = MockParameterRepository::new();
        repo.expect_list_group().returning(|_, _, _| Ok(vec![]));

        let mut service = ParameterService::new(Arc::new(repo), 300);
        service.ttl = Duration::from_millis(1);
        for n in 0..10 {
            service
                .get_group(ParameterScope::Application, &format!("group_{}", n), None, "fr")
                .await
                .unwrap();
        }
        assert_eq!(service.groups.len(), 10);

        tokio::time::sleep(Duration::from_millis(5)).await;
        service
            .get_group(ParameterScope::Application, "group_0", None, "fr")
            .await
            .unwrap();
        assert_eq!(service.groups.len(), 10, "expired read refetches and re-caches");

        tokio::time::sleep(Duration::from_millis(5)).await;
        assert_eq!(service.cleanup_expired(), 10);
        assert!(service.groups.is_empty());
    }

    #[tokio::test]
    async fn test_update_invalidates_group_cache() {
        let mut repo = MockParameterRepository::new();
        repo.expect_list_group()
            .times(2)
            .returning(|scope, group, _| Ok(vec![param(scope, group, "a", "A")]));
        repo.expect_find()
            .returning(|scope, group, key, _| Ok(Some(param(scope, group, key, "A"))));
        repo.expect_update().times(1).returning(|p| Ok(p.clone()));

        let service = ParameterService::new(Arc::new(repo), 300);
        service.get_group(ParameterScope::System, "g", None, "fr").await.unwrap();

        let update = ParameterUpdate {
            custom_translations: HashMap::from([("en".to_string(), "A-en".to_string())]),
            ..Default::default()
        };
        service
            .update_parameter(ParameterScope::System, "g", "a", None, update, None)
            .await
            .unwrap();

        service.get_group(ParameterScope::System, "g", None, "fr").await.unwrap();
    }

    #[tokio::test]
    async fn test_update_merges_translations_and_metadata() {
        let mut repo = MockParameterRepository::new();
        repo.expect_find().returning(|scope, group, key, _| {
            let mut p = param(scope, group, key, "Utilisateur");
            p.custom_translations.insert("en".to_string(), "User".to_string());
            p.metadata.icon = Some("👤".to_string());
            Ok(Some(p))
        });
        repo.expect_update().returning(|p| Ok(p.clone()));

        let update = ParameterUpdate {
            custom_translations: HashMap::from([("de".to_string(), "Benutzer".to_string())]),
            metadata: Some(ParameterMetadata { color: Some("blue".to_string()), ..Default::default() }),
            ..Default::default()
        };
        let updated = ParameterService::new(Arc::new(repo), 300)
            .update_parameter(ParameterScope::System, "user_roles", "USER", None, update, None)
            .await
            .unwrap();

        assert_eq!(updated.custom_translations.len(), 2);
        assert_eq!(updated.metadata.icon.as_deref(), Some("👤"));
        assert_eq!(updated.metadata.color.as_deref(), Some("blue"));
    }

    #[tokio::test]
    async fn test_readonly_value_cannot_change() {
        let mut repo = MockParameterRepository::new();
        repo.expect_find().returning(|scope, group, key, _| {
            let mut p = param(scope, group, key, "Super Administrateur");
            p.is_readonly = true;
            Ok(Some(p))
        });
        repo.expect_update().never();

        let update = ParameterUpdate {
            value: Some("Root".to_string()),
            ..Default::default()
        };
        let result = ParameterService::new(Arc::new(repo), 300)
            .update_parameter(ParameterScope::System, "user_roles", "SUPER_ADMIN", None, update, None)
            .await;

        assert!(matches!(result, Err(DomainError::ParameterReadonly { .. })));
    }

    #[tokio::test]
    async fn test_create_duplicate_conflicts() {
        let mut repo = MockParameterRepository::new();
        repo.expect_find()
            .returning(|scope, group, key, _| Ok(Some(param(scope, group, key, "x"))));
        repo.expect_create().never();

        let result = ParameterService::new(Arc::new(repo), 300)
            .create_parameter(param(ParameterScope::System, "company", "name", "TopSteel"), None)
            .await;

        assert!(result.unwrap_err().is_conflict());
    }

    #[tokio::test]
    async fn test_client_parameter_requires_tenant() {
        let result = ParameterService::new(Arc::new(MockParameterRepository::new()), 300)
            .create_parameter(param(ParameterScope::Client, "ui", "theme", "dark"), None)
            .await;

        assert!(matches!(result, Err(DomainError::ValidationError(_))));
    }

    #[tokio::test]
    async fn test_client_preferences_user_rows_override() {
        let tenant = Uuid::new_v4();
        let user = Uuid::new_v4();
        let mut repo = MockParameterRepository::new();
        repo.expect_list_client().returning(move |tenant_id, _| {
            let mut own = param(ParameterScope::Client, "ui", "theme", "dark");
            own.tenant_id = Some(*tenant_id);
            own.user_id = Some(user);
            let mut shared = param(ParameterScope::Client, "ui", "theme", "light");
            shared.tenant_id = Some(*tenant_id);
            let mut lang = param(ParameterScope::Client, "ui", "language", "fr");
            lang.tenant_id = Some(*tenant_id);
            Ok(vec![own, shared, lang])
        });

        let prefs = ParameterService::new(Arc::new(repo), 300)
            .client_preferences(&tenant, Some(user), "fr")
            .await
            .unwrap();

        assert_eq!(prefs["ui"]["theme"].value, "dark");
        assert_eq!(prefs["ui"].len(), 2);
    }
}
