//! 代理派送與回應正規化的核心。
//!
//! 此模組負責描述一張代理卡片從觸發到呈現結果的完整流程：
//! 建構封包、編碼附件、送出 webhook、正規化回應，以及維護每張卡片的互動狀態。

// --- 子模組宣告 ---

/// `attachment` 模組：依大小政策將檔案編碼為 base64 data URI 或附上說明。
pub mod attachment;

/// `dispatch` 模組：定義 `Dispatcher` 介面與基於 `reqwest` 的 HTTP 實作。
pub mod dispatch;

/// `draft` 模組：卡片上尚未送出的文字草稿。
pub mod draft;

/// `error` 模組：派送前的驗證錯誤與派送後的執行錯誤。
pub mod error;

/// `history` 模組：每張卡片最多十筆的回應紀錄環狀緩衝區。
pub mod history;

/// `interaction` 模組：每張卡片的互動狀態機。
pub mod interaction;

/// `model` 模組：代理資料、觸發/回傳方式，以及兩者組合出的卡片版面。
pub mod model;

/// `normalize` 模組：將各式 HTTP 回應正規化為單一可顯示的文字。
pub mod normalize;

/// `payload` 模組：建構送往 webhook 的標準封包。
pub mod payload;

/// `runner` 模組：在背景任務中執行派送，並透過 channel 回傳結果。
pub mod runner;

// --- 公共 API 重新導出 ---

pub use attachment::{FileDescriptor, FilePayload, FileRef, INLINE_LIMIT};
pub use dispatch::{Dispatcher, HttpDispatcher, WebhookResponse};
pub use error::{DispatchError, ValidationError};
pub use history::{HISTORY_CAPACITY, InputEcho, RecordStatus, ResponseHistory, ResponseRecord};
pub use interaction::{Interaction, PendingInput, Phase, TriggerRequest};
pub use model::{Agent, CardLayout, InputSurface, OutputSurface, ReturnType, TriggerType};
pub use normalize::{FieldProbeNormalizer, Outcome, ResponseNormalizer};
pub use payload::{Envelope, Metadata, TriggerInput, build_envelope};
pub use runner::{CardId, Completion, TriggerRunner};
