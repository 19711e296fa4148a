// ============================================================================
// TopSteel Core - Parameter Entity
// File: crates/topsteel-core/src/domain/parameter.rs
// Description: Scoped, typed key-value configuration with translations
// ============================================================================

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use topsteel_shared::AuditFields;
use uuid::Uuid;
use validator::Validate;

/// Storage scope; each scope maps to its own table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterScope {
    System,
    Application,
    Client,
}

impl ParameterScope {
    pub fn as_str(&self) -> &'static str {
        match self {
            ParameterScope::System => "system",
            ParameterScope::Application => "application",
            ParameterScope::Client => "client",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "system" => Some(ParameterScope::System),
            "application" => Some(ParameterScope::Application),
            "client" => Some(ParameterScope::Client),
            _ => None,
        }
    }
}

impl fmt::Display for ParameterScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Declared type of the raw `value` column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ParameterType {
    String,
    Number,
    Boolean,
    Json,
    Enum,
}

impl ParameterType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ParameterType::String => "STRING",
            ParameterType::Number => "NUMBER",
            ParameterType::Boolean => "BOOLEAN",
            ParameterType::Json => "JSON",
            ParameterType::Enum => "ENUM",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "STRING" => Some(ParameterType::String),
            "NUMBER" => Some(ParameterType::Number),
            "BOOLEAN" => Some(ParameterType::Boolean),
            "JSON" => Some(ParameterType::Json),
            "ENUM" => Some(ParameterType::Enum),
            _ => None,
        }
    }
}

impl Default for ParameterType {
    fn default() -> Self {
        ParameterType::String
    }
}

/// Display metadata attached to a parameter
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParameterMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub permissions: Vec<String>,
}

impl ParameterMetadata {
    /// Overlay the fields set in `other`
    pub fn merge(&mut self, other: ParameterMetadata) {
        if other.icon.is_some() {
            self.icon = other.icon;
        }
        if other.color.is_some() {
            self.color = other.color;
        }
        if other.order.is_some() {
            self.order = other.order;
        }
        if other.category.is_some() {
            self.category = other.category;
        }
        if !other.permissions.is_empty() {
            self.permissions = other.permissions;
        }
    }
}

/// Parameter entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct Parameter {
    pub id: Uuid,
    pub scope: ParameterScope,
    /// Owning tenant, client scope only
    pub tenant_id: Option<Uuid>,
    pub user_id: Option<Uuid>,

    #[validate(length(min = 1, max = 100, message = "Group must be between 1 and 100 characters"))]
    pub group: String,

    #[validate(length(min = 1, max = 100, message = "Key must be between 1 and 100 characters"))]
    pub key: String,

    pub value: String,
    pub value_type: ParameterType,
    pub array_values: Option<Vec<String>>,
    pub object_values: Option<serde_json::Value>,
    pub metadata: ParameterMetadata,
    pub is_active: bool,
    pub is_readonly: bool,
    pub translation_key: Option<String>,
    pub custom_translations: HashMap<String, String>,
    pub description: Option<String>,

    #[serde(flatten)]
    pub audit: AuditFields,
}

impl Parameter {
    pub fn new(
        scope: ParameterScope,
        group: String,
        key: String,
        value: String,
        value_type: ParameterType,
    ) -> Result<Self, validator::ValidationErrors> {
        let param = Self {
            id: Uuid::new_v4(),
            scope,
            tenant_id: None,
            user_id: None,
            group: group.trim().to_string(),
            key: key.trim().to_string(),
            value,
            value_type,
            array_values: None,
            object_values: None,
            metadata: ParameterMetadata::default(),
            is_active: true,
            is_readonly: false,
            translation_key: None,
            custom_translations: HashMap::new(),
            description: None,
            audit: AuditFields::default(),
        };

        param.validate()?;
        Ok(param)
    }

    /// Value shown for a language: its custom translation, else the raw value
    pub fn localized_value(&self, lang: &str) -> &str {
        self.custom_translations
            .get(lang)
            .map(String::as_str)
            .filter(|v| !v.is_empty())
            .unwrap_or(&self.value)
    }

    /// Parse the raw value according to the declared type
    pub fn typed_value(&self) -> Result<ParameterValue, String> {
        let raw = self.value.trim();
        match self.value_type {
            ParameterType::String => Ok(ParameterValue::String(self.value.clone())),
            ParameterType::Enum => Ok(ParameterValue::Enum(raw.to_string())),
            ParameterType::Number => raw
                .parse::<f64>()
                .ok()
                .filter(|n| n.is_finite())
                .map(ParameterValue::Number)
                .ok_or_else(|| format!("'{}' is not a number", raw)),
            ParameterType::Boolean => match raw.to_lowercase().as_str() {
                "true" | "1" | "yes" | "on" => Ok(ParameterValue::Boolean(true)),
                "false" | "0" | "no" | "off" => Ok(ParameterValue::Boolean(false)),
                _ => Err(format!("'{}' is not a boolean", raw)),
            },
            ParameterType::Json => serde_json::from_str(raw)
                .map(ParameterValue::Json)
                .map_err(|e| e.to_string()),
        }
    }

    pub fn view(&self, lang: &str) -> ParameterView {
        ParameterView {
            group: self.group.clone(),
            key: self.key.clone(),
            value: self.localized_value(lang).to_string(),
            raw_value: self.value.clone(),
            value_type: self.value_type,
            array_values: self.array_values.clone(),
            object_values: self.object_values.clone(),
            metadata: self.metadata.clone(),
            translation_key: self.translation_key.clone(),
            description: self.description.clone(),
            is_readonly: self.is_readonly,
        }
    }
}

/// Typed interpretation of a parameter value
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ParameterValue {
    String(String),
    Number(f64),
    Boolean(bool),
    Json(serde_json::Value),
    Enum(String),
}

/// Localized read model returned to callers
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParameterView {
    pub group: String,
    pub key: String,
    pub value: String,
    pub raw_value: String,
    #[serde(rename = "type")]
    pub value_type: ParameterType,
    pub array_values: Option<Vec<String>>,
    pub object_values: Option<serde_json::Value>,
    pub metadata: ParameterMetadata,
    pub translation_key: Option<String>,
    pub description: Option<String>,
    pub is_readonly: bool,
}

/// Partial update; translations and metadata are merged into the stored ones
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParameterUpdate {
    pub value: Option<String>,
    pub array_values: Option<Vec<String>>,
    pub object_values: Option<serde_json::Value>,
    #[serde(default)]
    pub custom_translations: HashMap<String, String>,
    pub metadata: Option<ParameterMetadata>,
    pub is_active: Option<bool>,
    pub description: Option<String>,
}

impl ParameterUpdate {
    pub fn changes_value(&self) -> bool {
        self.value.is_some() || self.array_values.is_some() || self.object_values.is_some()
    }
}
