use std::env;

const FALLBACK_USER: &str = "local";
const LOOKUP_ORDER: [&str; 3] = ["BUREAU_USER", "USER", "USERNAME"];

/// 目前使用者。只用來標記新辦公室的擁有者，派送時不會參考。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub user_id: String,
}

impl Identity {
    pub fn resolve() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// 依序嘗試 `BUREAU_USER`、`USER`、`USERNAME`，皆無則為 `local`。
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let user_id = LOOKUP_ORDER
            .iter()
            .filter_map(|key| lookup(key))
            .map(|value| value.trim().to_string())
            .find(|value| !value.is_empty())
            .unwrap_or_else(|| FALLBACK_USER.to_string());
        Self { user_id }
    }
}
