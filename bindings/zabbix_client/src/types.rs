use serde::{Deserialize, Serialize};

/// `history` parameter value selecting numeric float history
pub const HISTORY_FLOAT: u8 = 0;

/// `history` parameter value selecting numeric unsigned history
pub const HISTORY_UNSIGNED: u8 = 3;

const HOST_OUTPUT: &[&str] = &["hostid", "name", "host"];
const ITEM_OUTPUT: &[&str] = &["hostid", "itemid", "key_", "name"];

/// Parameters for `host.get`
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct HostGetParams {
    pub hostids: Vec<String>,
    pub output: Vec<String>,
}

impl HostGetParams {
    /// Select the id, visible name and technical name of the given hosts.
    pub fn by_ids(hostids: Vec<String>) -> Self {
        Self {
            hostids,
            output: HOST_OUTPUT.iter().map(|s| s.to_string()).collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ItemKeyFilter {
    pub key_: Vec<String>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ItemKeySearch {
    pub key_: String,
}

/// Parameters for `item.get`
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ItemGetParams {
    pub hostids: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<ItemKeyFilter>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<ItemKeySearch>,
    #[serde(
        rename = "searchWildcardsEnabled",
        skip_serializing_if = "std::ops::Not::not"
    )]
    pub search_wildcards_enabled: bool,
    pub output: Vec<String>,
}

impl ItemGetParams {
    /// Items whose key is exactly one of `keys`.
    pub fn exact_keys(hostids: Vec<String>, keys: Vec<String>) -> Self {
        Self {
            hostids,
            filter: Some(ItemKeyFilter { key_: keys }),
            search: None,
            search_wildcards_enabled: false,
            output: ITEM_OUTPUT.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Items whose key matches `pattern`, where `*` matches any run of characters.
    pub fn key_pattern(hostids: Vec<String>, pattern: String) -> Self {
        Self {
            hostids,
            filter: None,
            search: Some(ItemKeySearch { key_: pattern }),
            search_wildcards_enabled: true,
            output: ITEM_OUTPUT.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// Parameters for `history.get`, always sorted by clock, newest first
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct HistoryGetParams {
    pub itemids: Vec<String>,
    pub history: u8,
    pub sortfield: String,
    pub sortorder: String,
    pub time_from: i64,
    pub time_till: i64,
    pub output: String,
}

impl HistoryGetParams {
    pub fn recent(itemids: Vec<String>, history: u8, time_from: i64, time_till: i64) -> Self {
        Self {
            itemids,
            history,
            sortfield: "clock".to_string(),
            sortorder: "DESC".to_string(),
            time_from,
            time_till,
            output: "extend".to_string(),
        }
    }
}

/// A row of `host.get`.
///
/// Zabbix sends identifiers as strings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HostRecord {
    pub hostid: String,
    /// Visible name
    pub name: String,
    /// Technical name
    pub host: String,
}

/// A row of `item.get`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ItemRecord {
    pub itemid: String,
    pub hostid: String,
    #[serde(rename = "key_")]
    pub key: String,
    pub name: String,
}

/// A row of `history.get`.
///
/// The value is kept as sent, its numeric type depends on the history class queried.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HistoryRecord {
    pub itemid: String,
    pub clock: String,
    pub value: String,
    #[serde(default)]
    pub ns: Option<String>,
}
