//! 辦公室、部門與代理三種紀錄，以及它們的建立輸入與修補結構。

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::StoreError;
use crate::agent::model::{Agent, ReturnType, TriggerType};

/// 可存放在 `Collection` 中的紀錄。
pub trait Record: Clone {
    /// 建立紀錄所需的輸入。
    type New;
    /// 部分更新。
    type Patch;

    /// 錯誤訊息中使用的種類名稱。
    const KIND: &'static str;

    fn id(&self) -> &str;
    /// 所屬上層紀錄的 id；辦公室沒有上層。
    fn parent_id(&self) -> Option<&str>;
    fn created_at(&self) -> DateTime<Utc>;
    fn create(id: String, new: Self::New, now: DateTime<Utc>) -> Result<Self, StoreError>;
    fn apply(&mut self, patch: Self::Patch, now: DateTime<Utc>) -> Result<(), StoreError>;
}

fn required(field: &str, value: &str) -> Result<String, StoreError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(StoreError::Invalid(format!("{field} cannot be empty")));
    }
    Ok(trimmed.to_string())
}

fn optional(value: Option<String>) -> Option<String> {
    value
        .map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty())
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Office {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub owner_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewOffice {
    pub name: String,
    pub description: Option<String>,
    pub owner_id: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct OfficePatch {
    pub name: Option<String>,
    pub description: Option<Option<String>>,
}

impl Record for Office {
    type New = NewOffice;
    type Patch = OfficePatch;
    const KIND: &'static str = "office";

    fn id(&self) -> &str {
        &self.id
    }

    fn parent_id(&self) -> Option<&str> {
        None
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn create(id: String, new: NewOffice, now: DateTime<Utc>) -> Result<Self, StoreError> {
        Ok(Self {
            id,
            name: required("Office name", &new.name)?,
            description: optional(new.description),
            owner_id: new.owner_id,
            created_at: now,
            updated_at: now,
        })
    }

    fn apply(&mut self, patch: OfficePatch, now: DateTime<Utc>) -> Result<(), StoreError> {
        if let Some(name) = patch.name {
            self.name = required("Office name", &name)?;
        }
        if let Some(description) = patch.description {
            self.description = optional(description);
        }
        self.updated_at = now;
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Department {
    pub id: String,
    pub name: String,
    pub office_id: String,
    #[serde(default)]
    pub position_x: Option<f64>,
    #[serde(default)]
    pub position_y: Option<f64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewDepartment {
    pub name: String,
    pub office_id: String,
    pub position: Option<(f64, f64)>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DepartmentPatch {
    pub name: Option<String>,
    pub position: Option<(f64, f64)>,
}

impl Record for Department {
    type New = NewDepartment;
    type Patch = DepartmentPatch;
    const KIND: &'static str = "department";

    fn id(&self) -> &str {
        &self.id
    }

    fn parent_id(&self) -> Option<&str> {
        Some(&self.office_id)
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn create(id: String, new: NewDepartment, now: DateTime<Utc>) -> Result<Self, StoreError> {
        Ok(Self {
            id,
            name: required("Department name", &new.name)?,
            office_id: new.office_id,
            position_x: new.position.map(|(x, _)| x),
            position_y: new.position.map(|(_, y)| y),
            created_at: now,
            updated_at: now,
        })
    }

    fn apply(&mut self, patch: DepartmentPatch, now: DateTime<Utc>) -> Result<(), StoreError> {
        if let Some(name) = patch.name {
            self.name = required("Department name", &name)?;
        }
        if let Some((x, y)) = patch.position {
            self.position_x = Some(x);
            self.position_y = Some(y);
        }
        self.updated_at = now;
        Ok(())
    }
}

/// 新代理一律以啟用狀態建立。
#[derive(Debug, Clone, PartialEq)]
pub struct NewAgent {
    pub name: String,
    pub description: Option<String>,
    pub trigger_type: TriggerType,
    pub return_type: ReturnType,
    pub webhook_url: String,
    pub workflow_url: Option<String>,
    pub department_id: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AgentPatch {
    pub name: Option<String>,
    pub description: Option<Option<String>>,
    pub trigger_type: Option<TriggerType>,
    pub return_type: Option<ReturnType>,
    pub webhook_url: Option<String>,
    pub workflow_url: Option<Option<String>>,
    pub is_active: Option<bool>,
}

impl AgentPatch {
    pub fn active(is_active: bool) -> Self {
        Self {
            is_active: Some(is_active),
            ..Self::default()
        }
    }
}

impl Record for Agent {
    type New = NewAgent;
    type Patch = AgentPatch;
    const KIND: &'static str = "agent";

    fn id(&self) -> &str {
        &self.id
    }

    fn parent_id(&self) -> Option<&str> {
        Some(&self.department_id)
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn create(id: String, new: NewAgent, now: DateTime<Utc>) -> Result<Self, StoreError> {
        Ok(Self {
            id,
            name: required("Agent name", &new.name)?,
            description: optional(new.description),
            trigger_type: new.trigger_type,
            return_type: new.return_type,
            webhook_url: required("Webhook URL", &new.webhook_url)?,
            workflow_url: optional(new.workflow_url),
            department_id: new.department_id,
            is_active: true,
            created_at: now,
            updated_at: now,
        })
    }

    fn apply(&mut self, patch: AgentPatch, now: DateTime<Utc>) -> Result<(), StoreError> {
        if let Some(name) = patch.name {
            self.name = required("Agent name", &name)?;
        }
        if let Some(webhook_url) = patch.webhook_url {
            self.webhook_url = required("Webhook URL", &webhook_url)?;
        }
        if let Some(description) = patch.description {
            self.description = optional(description);
        }
        if let Some(workflow_url) = patch.workflow_url {
            self.workflow_url = optional(workflow_url);
        }
        if let Some(trigger_type) = patch.trigger_type {
            self.trigger_type = trigger_type;
        }
        if let Some(return_type) = patch.return_type {
            self.return_type = return_type;
        }
        if let Some(is_active) = patch.is_active {
            self.is_active = is_active;
        }
        self.updated_at = now;
        Ok(())
    }
}
