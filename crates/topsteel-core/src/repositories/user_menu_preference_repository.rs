//! User menu preference repository trait (port)

use async_trait::async_trait;
use uuid::Uuid;
use crate::domain::{PreferencePatch, UserCustomMenu, UserMenuPreference, UserMenuSettings};
use crate::error::DomainError;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserMenuPreferenceRepository: Send + Sync {
    /// Live rows of a user; empty for a brand-new user
    async fn list_by_user(&self, user_id: &Uuid) -> Result<Vec<UserMenuPreference>, DomainError>;

    /// Insert-or-update on `(user_id, menu_id)`.
    ///
    /// Only the fields set in `patch` change and the version is bumped.
    /// A soft-deleted row is revived with default overrides first. When
    /// `patch.expected_version` is set and does not match the live version
    /// (0 for absent rows), nothing is written and `VersionConflict` is
    /// returned.
    async fn upsert(
        &self,
        user_id: &Uuid,
        menu_id: &str,
        patch: &PreferencePatch,
    ) -> Result<UserMenuPreference, DomainError>;

    /// Soft delete every row of a user, returns how many were marked
    async fn soft_delete_all(&self, user_id: &Uuid) -> Result<u64, DomainError>;

    async fn find_custom_menu(&self, user_id: &Uuid) -> Result<Option<UserCustomMenu>, DomainError>;
    async fn save_custom_menu(&self, menu: &UserCustomMenu) -> Result<UserCustomMenu, DomainError>;

    /// Layout settings; `None` until the user saves any
    async fn find_settings(&self, user_id: &Uuid) -> Result<Option<UserMenuSettings>, DomainError>;
    /// Insert-or-replace the settings row of `settings.user_id`
    async fn save_settings(&self, settings: &UserMenuSettings) -> Result<UserMenuSettings, DomainError>;
}
