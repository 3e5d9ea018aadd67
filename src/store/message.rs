use crate::store::Store;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

fn default_delta() -> i64 {
    1
}

/// A message sent to the store, tagged by its `action` field
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum Request {
    GetIgnoredSubs,
    SetIgnoredSubs {
        #[serde(default)]
        subs: Vec<String>,
    },
    AddIgnoredSub {
        name: String,
    },
    RemoveIgnoredSub {
        name: String,
    },
    ExportIgnoredSubs,
    GetStats,
    IncrementStat {
        name: String,
        #[serde(default = "default_delta")]
        delta: i64,
    },
    IncrementStatsBulk {
        #[serde(default)]
        stats: IndexMap<String, i64>,
    },
    ResetStats,
    ClearStat {
        name: String,
    },
    FlushPendingStats,
    ImportIgnoredSubs {
        #[serde(default)]
        subs: Vec<String>,
    },
}

/// One persisted counter
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StatEntry {
    pub name: String,
    pub count: i64,
}

/// Reply to a [`Request`]
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Response {
    pub success: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub subs: Option<Vec<String>>,

    /// Exported document
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub stats: Option<Vec<StatEntry>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Response {
    pub fn ok() -> Self {
        Self { success: true, ..Default::default() }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self { success: false, error: Some(error.into()), ..Default::default() }
    }
}

impl Store {
    /// Answer one request. Failures are reported in the response, never raised.
    pub fn handle(&mut self, request: Request) -> Response {
        let result = match request {
            Request::GetIgnoredSubs => {
                Ok(Response { subs: Some(self.ignored_names()), ..Response::ok() })
            }
            Request::SetIgnoredSubs { subs } => self.set_ignored_names(subs).map(|_| Response::ok()),
            Request::AddIgnoredSub { name } => self.add_ignored(&name).map(|_| Response::ok()),
            Request::RemoveIgnoredSub { name } => self.remove_ignored(&name).map(|_| Response::ok()),
            Request::ExportIgnoredSubs => self
                .export_ignored()
                .map(|json| Response { data: Some(json), ..Response::ok() }),
            Request::GetStats => {
                let stats = self
                    .counters()
                    .iter()
                    .map(|(name, count)| StatEntry { name: name.clone(), count: *count })
                    .collect();
                Ok(Response { stats: Some(stats), ..Response::ok() })
            }
            Request::IncrementStat { name, delta } => {
                self.increment_counter(&name, delta).map(|_| Response::ok())
            }
            Request::IncrementStatsBulk { stats } => stats
                .iter()
                .try_for_each(|(name, delta)| self.increment_counter(name, *delta))
                .map(|_| Response::ok()),
            Request::ResetStats => self.reset_counters().map(|_| Response::ok()),
            Request::ClearStat { name } => self.clear_counter(&name).map(|_| Response::ok()),
            Request::FlushPendingStats => self.flush_pending().map(|_| Response::ok()),
            Request::ImportIgnoredSubs { subs } => self.set_ignored_names(subs).map(|_| Response::ok()),
        };

        result.unwrap_or_else(|e| {
            log::error!("store request failed: {}", e);
            Response::failure(e.to_string())
        })
    }

    /// Answer a raw JSON message; malformed or unknown actions get a failure response
    pub fn handle_json(&mut self, message: &str) -> Response {
        match serde_json::from_str::<Request>(message) {
            Ok(request) => self.handle(request),
            Err(e) => {
                log::warn!("rejected message: {}", e);
                Response::failure(format!("unknown action: {}", e))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_wire_format() {
        let request: Request = serde_json::from_value(json!({"action": "getIgnoredSubs"})).unwrap();
        assert_eq!(request, Request::GetIgnoredSubs);

        let request: Request =
            serde_json::from_value(json!({"action": "incrementStat", "name": "rust"})).unwrap();
        assert_eq!(request, Request::IncrementStat { name: "rust".to_string(), delta: 1 });

        let request: Request = serde_json::from_value(json!({"action": "setIgnoredSubs"})).unwrap();
        assert_eq!(request, Request::SetIgnoredSubs { subs: vec![] });

        let encoded = serde_json::to_value(Request::ClearStat { name: "pics".to_string() }).unwrap();
        assert_eq!(encoded, json!({"action": "clearStat", "name": "pics"}));
    }

    #[test]
    fn test_response_omits_empty_fields() {
        let encoded = serde_json::to_value(Response::ok()).unwrap();
        assert_eq!(encoded, json!({"success": true}));

        let encoded = serde_json::to_value(Response::failure("boom")).unwrap();
        assert_eq!(encoded, json!({"success": false, "error": "boom"}));
    }

    #[test]
    fn test_handle_ignored_actions() {
        let mut store = Store::in_memory();

        assert!(store.handle(Request::AddIgnoredSub { name: "pics".to_string() }).success);
        assert!(store
            .handle(Request::SetIgnoredSubs { subs: vec!["news".to_string(), "pics".to_string()] })
            .success);
        assert!(store.handle(Request::RemoveIgnoredSub { name: "news".to_string() }).success);

        let response = store.handle(Request::GetIgnoredSubs);
        assert_eq!(response.subs, Some(vec!["pics".to_string()]));

        let response = store.handle(Request::ExportIgnoredSubs);
        assert!(response.data.unwrap().contains("pics"));
    }

    #[test]
    fn test_handle_stat_actions() {
        let mut store = Store::in_memory();

        store.handle(Request::IncrementStat { name: "rust".to_string(), delta: 2 });
        let mut bulk = IndexMap::new();
        bulk.insert("rust".to_string(), 1);
        bulk.insert("pics".to_string(), 4);
        store.handle(Request::IncrementStatsBulk { stats: bulk });

        let response = store.handle(Request::GetStats);
        assert_eq!(response.stats, Some(vec![]));

        assert!(store.handle(Request::FlushPendingStats).success);
        let stats = store.handle(Request::GetStats).stats.unwrap();
        assert_eq!(
            stats,
            vec![
                StatEntry { name: "pics".to_string(), count: 4 },
                StatEntry { name: "rust".to_string(), count: 3 },
            ]
        );

        store.handle(Request::ClearStat { name: "pics".to_string() });
        assert_eq!(store.counters().len(), 1);
        store.handle(Request::ResetStats);
        assert!(store.counters().is_empty());
    }

    #[test]
    fn test_handle_json_unknown_action() {
        let mut store = Store::in_memory();

        let response = store.handle_json(r#"{"action": "dropTables"}"#);
        assert!(!response.success);
        assert!(response.error.unwrap().starts_with("unknown action"));

        let response = store.handle_json(r#"{"action": "importIgnoredSubs", "subs": ["a", "b"]}"#);
        assert!(response.success);
        assert_eq!(store.ignored_names(), vec!["a", "b"]);
    }
}
