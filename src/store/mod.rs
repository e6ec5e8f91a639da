//! 以 TOML 檔案保存辦公室、部門與代理的本地資料庫。

pub mod identity;
pub mod records;

use std::fs;
use std::path::{Path, PathBuf};

use chrono::Utc;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::agent::model::Agent;

pub use identity::Identity;
pub use records::{
    AgentPatch, Department, DepartmentPatch, NewAgent, NewDepartment, NewOffice, Office,
    OfficePatch, Record,
};

pub const DEFAULT_OFFICE_NAME: &str = "My Office";
pub const DEFAULT_OFFICE_DESCRIPTION: &str = "Your default office workspace";

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },
    #[error("{0}")]
    Invalid(String),
    #[error("failed to access {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("failed to serialize store: {0}")]
    Serialize(#[from] toml::ser::Error),
}

impl StoreError {
    fn not_found<T: Record>(id: &str) -> Self {
        StoreError::NotFound {
            kind: T::KIND,
            id: id.to_string(),
        }
    }
}

/// CRUD boundary over one kind of record.
pub trait Repository<T: Record> {
    /// Records under `parent_id` (all records when `None`), newest first.
    fn list(&self, parent_id: Option<&str>) -> Vec<&T>;
    fn get(&self, id: &str) -> Result<&T, StoreError>;
    fn create(&mut self, new: T::New) -> Result<T, StoreError>;
    fn update(&mut self, id: &str, patch: T::Patch) -> Result<T, StoreError>;
    fn delete(&mut self, id: &str) -> Result<T, StoreError>;
}

/// In-memory table backing a `Repository`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Collection<T> {
    items: Vec<T>,
}

impl<T> Default for Collection<T> {
    fn default() -> Self {
        Self { items: Vec::new() }
    }
}

impl<T> Collection<T> {
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }
}

impl<T: Record> Collection<T> {
    fn position(&self, id: &str) -> Result<usize, StoreError> {
        self.items
            .iter()
            .position(|item| item.id() == id)
            .ok_or_else(|| StoreError::not_found::<T>(id))
    }

    /// Removes every record whose parent is `parent_id`, returning them.
    fn remove_children(&mut self, parent_id: &str) -> Vec<T> {
        let (removed, kept): (Vec<T>, Vec<T>) = std::mem::take(&mut self.items)
            .into_iter()
            .partition(|item| item.parent_id() == Some(parent_id));
        self.items = kept;
        removed
    }
}

impl<T: Record> Repository<T> for Collection<T> {
    fn list(&self, parent_id: Option<&str>) -> Vec<&T> {
        // 反向走訪後再穩定排序，建立時間相同時較晚加入的排在前面。
        let mut records: Vec<&T> = self
            .items
            .iter()
            .rev()
            .filter(|item| parent_id.is_none() || item.parent_id() == parent_id)
            .collect();
        records.sort_by(|a, b| b.created_at().cmp(&a.created_at()));
        records
    }

    fn get(&self, id: &str) -> Result<&T, StoreError> {
        self.items
            .iter()
            .find(|item| item.id() == id)
            .ok_or_else(|| StoreError::not_found::<T>(id))
    }

    fn create(&mut self, new: T::New) -> Result<T, StoreError> {
        let record = T::create(Uuid::new_v4().to_string(), new, Utc::now())?;
        self.items.push(record.clone());
        Ok(record)
    }

    fn update(&mut self, id: &str, patch: T::Patch) -> Result<T, StoreError> {
        let index = self.position(id)?;
        let record = &mut self.items[index];
        record.apply(patch, Utc::now())?;
        Ok(record.clone())
    }

    fn delete(&mut self, id: &str) -> Result<T, StoreError> {
        let index = self.position(id)?;
        Ok(self.items.remove(index))
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct Document {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    selected_office: Option<String>,
    #[serde(default, skip_serializing_if = "Collection::is_empty")]
    offices: Collection<Office>,
    #[serde(default, skip_serializing_if = "Collection::is_empty")]
    departments: Collection<Department>,
    #[serde(default, skip_serializing_if = "Collection::is_empty")]
    agents: Collection<Agent>,
}

/// Agent counts of one department, as shown in the department list.
#[derive(Debug, Clone, PartialEq)]
pub struct DepartmentSummary {
    pub department: Department,
    pub agent_count: usize,
    pub active_count: usize,
}

/// Offices, departments and agents kept in one TOML document.
///
/// Every successful mutation is written back immediately when the store is
/// file-backed.
#[derive(Debug, Default)]
pub struct OfficeStore {
    path: Option<PathBuf>,
    doc: Document,
}

impl OfficeStore {
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// 讀取資料檔；檔案不存在時以空白資料開始，第一次寫入時才建立。
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let doc = if path.exists() {
            let raw = fs::read_to_string(&path).map_err(|source| StoreError::Io {
                path: path.clone(),
                source,
            })?;
            toml::from_str(&raw).map_err(|source| StoreError::Parse {
                path: path.clone(),
                source,
            })?
        } else {
            Document::default()
        };
        info!(
            "Opened store {} ({} offices, {} departments, {} agents)",
            path.display(),
            doc.offices.len(),
            doc.departments.len(),
            doc.agents.len()
        );
        Ok(Self {
            path: Some(path),
            doc,
        })
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn save(&self) -> Result<(), StoreError> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        if let Some(dir) = path.parent()
            && !dir.as_os_str().is_empty()
            && !dir.exists()
        {
            fs::create_dir_all(dir).map_err(|source| StoreError::Io {
                path: dir.to_path_buf(),
                source,
            })?;
        }
        let serialized = toml::to_string_pretty(&self.doc)?;
        fs::write(path, serialized).map_err(|source| StoreError::Io {
            path: path.clone(),
            source,
        })?;
        debug!("Saved store to {}", path.display());
        Ok(())
    }

    // --- 查詢 ---

    pub fn offices(&self) -> Vec<&Office> {
        self.doc.offices.list(None)
    }

    pub fn office(&self, id: &str) -> Result<&Office, StoreError> {
        self.doc.offices.get(id)
    }

    pub fn departments(&self, office_id: &str) -> Vec<&Department> {
        self.doc.departments.list(Some(office_id))
    }

    pub fn department(&self, id: &str) -> Result<&Department, StoreError> {
        self.doc.departments.get(id)
    }

    pub fn agents(&self, department_id: &str) -> Vec<&Agent> {
        self.doc.agents.list(Some(department_id))
    }

    pub fn agent(&self, id: &str) -> Result<&Agent, StoreError> {
        self.doc.agents.get(id)
    }

    pub fn department_summaries(&self, office_id: &str) -> Vec<DepartmentSummary> {
        self.departments(office_id)
            .into_iter()
            .map(|department| {
                let agents = self.agents(&department.id);
                DepartmentSummary {
                    agent_count: agents.len(),
                    active_count: agents.iter().filter(|agent| agent.is_active).count(),
                    department: department.clone(),
                }
            })
            .collect()
    }

    // --- 辦公室選擇 ---

    pub fn selected_office(&self) -> Option<&str> {
        self.doc.selected_office.as_deref()
    }

    pub fn select_office(&mut self, id: &str) -> Result<(), StoreError> {
        self.commit(|doc| {
            doc.offices.get(id)?;
            doc.selected_office = Some(id.to_string());
            Ok(())
        })
    }

    /// 回傳記住的辦公室，否則最新的一間；沒有任何辦公室時建立預設辦公室。
    pub fn ensure_office(&mut self, identity: &Identity) -> Result<Office, StoreError> {
        self.commit(|doc| {
            let remembered = doc
                .selected_office
                .as_deref()
                .and_then(|id| doc.offices.get(id).ok());
            let office = match remembered.or_else(|| doc.offices.list(None).into_iter().next()) {
                Some(office) => office.clone(),
                None => {
                    info!("No office found, creating the default one");
                    doc.offices.create(NewOffice {
                        name: DEFAULT_OFFICE_NAME.to_string(),
                        description: Some(DEFAULT_OFFICE_DESCRIPTION.to_string()),
                        owner_id: identity.user_id.clone(),
                    })?
                }
            };
            doc.selected_office = Some(office.id.clone());
            Ok(office)
        })
    }

    // --- 變更 ---

    /// 在文件上套用變更並寫回檔案；任一步失敗時還原成變更前的內容。
    fn commit<R>(
        &mut self,
        change: impl FnOnce(&mut Document) -> Result<R, StoreError>,
    ) -> Result<R, StoreError> {
        let snapshot = self.doc.clone();
        let result = change(&mut self.doc).and_then(|value| self.save().map(|()| value));
        if result.is_err() {
            self.doc = snapshot;
        }
        result
    }

    pub fn create_office(&mut self, new: NewOffice) -> Result<Office, StoreError> {
        let office = self.commit(|doc| doc.offices.create(new))?;
        info!("Created office {} ({})", office.name, office.id);
        Ok(office)
    }

    pub fn update_office(&mut self, id: &str, patch: OfficePatch) -> Result<Office, StoreError> {
        self.commit(|doc| doc.offices.update(id, patch))
    }

    /// Also removes the office's departments and their agents.
    pub fn delete_office(&mut self, id: &str) -> Result<Office, StoreError> {
        let (office, departments) = self.commit(|doc| {
            let office = doc.offices.delete(id)?;
            let departments = doc.departments.remove_children(id);
            for department in &departments {
                doc.agents.remove_children(&department.id);
            }
            if doc.selected_office.as_deref() == Some(id) {
                doc.selected_office = None;
            }
            Ok((office, departments.len()))
        })?;
        info!("Deleted office {} with {} departments", office.name, departments);
        Ok(office)
    }

    pub fn create_department(&mut self, new: NewDepartment) -> Result<Department, StoreError> {
        let department = self.commit(|doc| {
            doc.offices.get(&new.office_id)?;
            doc.departments.create(new)
        })?;
        info!("Created department {} ({})", department.name, department.id);
        Ok(department)
    }

    pub fn update_department(
        &mut self,
        id: &str,
        patch: DepartmentPatch,
    ) -> Result<Department, StoreError> {
        self.commit(|doc| doc.departments.update(id, patch))
    }

    /// Also removes the department's agents.
    pub fn delete_department(&mut self, id: &str) -> Result<Department, StoreError> {
        let (department, agents) = self.commit(|doc| {
            let department = doc.departments.delete(id)?;
            let agents = doc.agents.remove_children(id);
            Ok((department, agents.len()))
        })?;
        info!("Deleted department {} with {} agents", department.name, agents);
        Ok(department)
    }

    pub fn create_agent(&mut self, new: NewAgent) -> Result<Agent, StoreError> {
        let agent = self.commit(|doc| {
            doc.departments.get(&new.department_id)?;
            doc.agents.create(new)
        })?;
        info!(
            "Created agent {} ({} -> {})",
            agent.name, agent.trigger_type, agent.return_type
        );
        Ok(agent)
    }

    pub fn update_agent(&mut self, id: &str, patch: AgentPatch) -> Result<Agent, StoreError> {
        let agent = self.commit(|doc| doc.agents.update(id, patch))?;
        debug!("Updated agent {} (active: {})", agent.name, agent.is_active);
        Ok(agent)
    }

    pub fn delete_agent(&mut self, id: &str) -> Result<Agent, StoreError> {
        let agent = self.commit(|doc| doc.agents.delete(id))?;
        info!("Deleted agent {}", agent.name);
        Ok(agent)
    }
}
