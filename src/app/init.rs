use std::collections::HashMap;
use std::path::PathBuf;

use anyhow::{Context, Result};
use log::debug;

use super::App;
use crate::agent::TriggerRunner;
use crate::config::Settings;
use crate::definitions::FocusArea;
use crate::store::{Identity, OfficeStore};

const WELCOME: &str = "Tab to switch panes, F2 for offices, Ctrl+Q to quit";

impl App {
    /// Loads settings and the office store from the workspace and wires up
    /// the HTTP trigger runner.
    pub fn new(workspace_root: PathBuf, settings: Settings) -> Result<Self> {
        // Attempt to resolve the canonical path of the workspace root.
        let canonical_root = workspace_root.canonicalize().unwrap_or(workspace_root);
        debug!("Initializing App with workspace: {}", canonical_root.display());

        let store = OfficeStore::open(&settings.store.path).with_context(|| {
            format!("無法開啟資料檔: {}", settings.store.path.display())
        })?;
        let runner = TriggerRunner::http(settings.metadata());
        Ok(Self::with_parts(
            canonical_root,
            settings,
            Identity::resolve(),
            store,
            runner,
        ))
    }

    /// Assembles an app from ready-made parts and selects the initial office.
    pub fn with_parts(
        workspace_root: PathBuf,
        settings: Settings,
        identity: Identity,
        store: OfficeStore,
        runner: TriggerRunner,
    ) -> Self {
        let tick_rate = settings.tick_rate();
        let mut app = Self {
            should_quit: false,
            focus: FocusArea::Departments,
            status_message: String::from(WELCOME),
            workspace_root,
            settings,
            identity,
            store,
            office: None,
            departments: Vec::new(),
            department_index: 0,
            agents: Vec::new(),
            agent_index: 0,
            cards: HashMap::new(),
            overlay: None,
            runner,
            next_card_id: 0,
            tick_rate,
        };
        app.load_office();
        app
    }
}
