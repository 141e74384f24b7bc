mod client;
mod error;
mod types;

pub mod prelude {
    pub use crate::client::{AuthMethod, ZabbixClient};
    pub use crate::error::{ZabbixError, ZabbixResult};
    pub use crate::types::{
        HistoryGetParams, HistoryRecord, HostGetParams, HostRecord, ItemGetParams, ItemRecord,
        HISTORY_FLOAT, HISTORY_UNSIGNED,
    };
}
