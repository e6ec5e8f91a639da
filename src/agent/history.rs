//! 回應歷史：每張代理卡片最多保留十筆互動紀錄，最新的在最前面。
//!
//! 以固定容量的環狀緩衝區實作，長度上限由結構本身保證，不需要事後截斷。

use std::fmt;

use chrono::{DateTime, Local};

use super::attachment::FileDescriptor;

/// 每張卡片保留的紀錄數量上限。
pub const HISTORY_CAPACITY: usize = 10;

/// 單次派送的結果狀態。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordStatus {
    Success,
    Error,
}

impl RecordStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordStatus::Success => "success",
            RecordStatus::Error => "error",
        }
    }
}

/// 紀錄中回顯的使用者輸入。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputEcho {
    /// 去除頭尾空白後的聊天訊息。
    Text(String),
    /// 上傳的檔案。
    File(FileDescriptor),
    /// 按鈕觸發，顯示為 `Clicked`。
    Clicked,
}

impl fmt::Display for InputEcho {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InputEcho::Text(text) => f.write_str(text),
            InputEcho::File(file) => f.write_str(&file.name),
            InputEcho::Clicked => f.write_str("Clicked"),
        }
    }
}

/// 一次已完成派送（成功或失敗）的不可變紀錄。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseRecord {
    /// 卡片內單調遞增的請求序號。
    pub id: u64,
    pub timestamp: DateTime<Local>,
    pub input_echo: InputEcho,
    pub output: Option<String>,
    pub status: RecordStatus,
}

/// 固定容量的環狀緩衝區，索引 0 永遠是最新完成的紀錄。
#[derive(Debug, Clone)]
pub struct ResponseHistory {
    slots: [Option<ResponseRecord>; HISTORY_CAPACITY],
    /// 下一筆紀錄要寫入的位置。
    next: usize,
    len: usize,
}

impl Default for ResponseHistory {
    fn default() -> Self {
        Self {
            slots: std::array::from_fn(|_| None),
            next: 0,
            len: 0,
        }
    }
}

impl ResponseHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// 將紀錄放到最前面；已滿時最舊的一筆會被覆寫。
    pub fn push_front(&mut self, record: ResponseRecord) {
        self.slots[self.next] = Some(record);
        self.next = (self.next + 1) % HISTORY_CAPACITY;
        self.len = (self.len + 1).min(HISTORY_CAPACITY);
    }

    /// 依「最新在前」的順序取得第 `index` 筆紀錄。
    pub fn get(&self, index: usize) -> Option<&ResponseRecord> {
        if index >= self.len {
            return None;
        }
        let slot = (self.next + HISTORY_CAPACITY - 1 - index) % HISTORY_CAPACITY;
        self.slots[slot].as_ref()
    }

    pub fn latest(&self) -> Option<&ResponseRecord> {
        self.get(0)
    }

    /// 依儲存順序（最新在前）走訪。
    pub fn iter(&self) -> impl Iterator<Item = &ResponseRecord> + '_ {
        (0..self.len).filter_map(move |index| self.get(index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: u64) -> ResponseRecord {
        ResponseRecord {
            id,
            timestamp: Local::now(),
            input_echo: InputEcho::Clicked,
            output: Some(format!("out-{id}")),
            status: RecordStatus::Success,
        }
    }

    #[test]
    fn newest_first() {
        let mut history = ResponseHistory::new();
        assert!(history.latest().is_none());
        for id in 1..=3 {
            history.push_front(record(id));
        }
        let ids: Vec<u64> = history.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![3, 2, 1]);
    }

    #[test]
    fn never_exceeds_capacity_and_evicts_oldest() {
        let mut history = ResponseHistory::new();
        for id in 1..=25 {
            history.push_front(record(id));
            assert!(history.len() <= HISTORY_CAPACITY);
            assert_eq!(history.latest().map(|r| r.id), Some(id));
        }
        let ids: Vec<u64> = history.iter().map(|r| r.id).collect();
        assert_eq!(ids, (16..=25).rev().collect::<Vec<_>>());
        assert!(history.get(HISTORY_CAPACITY).is_none());
    }

    #[test]
    fn echo_display() {
        let file = FileDescriptor {
            name: String::from("report.pdf"),
            mime: String::from("application/pdf"),
            size: 10,
        };
        assert_eq!(InputEcho::File(file).to_string(), "report.pdf");
        assert_eq!(InputEcho::Clicked.to_string(), "Clicked");
        assert_eq!(InputEcho::Text(String::from("hi")).to_string(), "hi");
    }
}
