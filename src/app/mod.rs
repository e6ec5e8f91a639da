//! `app` 模組是 Bureau 應用程式的核心。
//!
//! 它負責管理辦公室、部門與代理卡片的整體狀態、處理鍵盤輸入，
//! 並在每個 tick 將背景派送的結果套用到對應的卡片上。

// --- 子模組宣告 ---

/// `cards` 模組：代理卡片窗格的按鍵處理，包含觸發、草稿編輯與附件。
mod cards;
/// `init` 模組：負責 `App` 結構的初始化和設定。
mod init;
/// `keyboard` 模組：專門處理所有的鍵盤輸入事件。
mod keyboard;
/// `navigation` 模組：辦公室、部門與代理的選取，以及卡片的掛載與卸載。
mod navigation;
/// `overlays` 模組：管理彈出式視窗（輸入提示、代理表單、刪除確認、辦公室切換）的狀態和邏輯。
mod overlays;
/// `state` 模組：定義了 `App` 結構以及所有核心的狀態類型。
mod state;
/// `tick` 模組：處理應用程式的定時更新事件（tick）。
mod tick;

// --- 公共 API 重新導出 ---
pub use state::{
    AgentFormState, App, ConfirmDeleteState, DeleteTarget, InputPromptState, OfficeSwitcherState,
    OverlayState, PendingInputAction,
};

use crate::definitions::FocusArea;
