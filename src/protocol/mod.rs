//! Line-delimited JSON protocol spoken with the editor shell.
//!
//! Requests look like `{"id": .., "cmd": "..", "payload": {..}}`. Most
//! commands answer at once; network ones answer from a worker thread when
//! they finish, so replies may arrive out of order.

use std::path::PathBuf;

use serde_json::{json, Value};

use crate::services::crowdin::{CrowdinClient, Task};
use crate::sidebar::Sidebar;

mod command;
mod crowdin;
mod sidebar;

pub use command::Command;
use crowdin::CrowdinContext;

fn get_cmd(req: &Value) -> &str {
    req.get("cmd").and_then(|v| v.as_str()).unwrap_or("")
}

fn get_id(req: &Value) -> Value {
    req.get("id").cloned().unwrap_or(Value::Null)
}

fn get_payload(req: &Value) -> &Value {
    static EMPTY: Value = Value::Null;
    req.get("payload").unwrap_or(&EMPTY)
}

fn ok(id: Value, payload: Value) -> String {
    json!({
        "id": id,
        "status": "ok",
        "payload": payload
    })
    .to_string()
}

fn err(id: Value, message: impl Into<String>) -> String {
    json!({
        "id": id,
        "status": "error",
        "message": message.into()
    })
    .to_string()
}

fn event(id: Value, name: &str, payload: Value) -> String {
    json!({
        "id": id,
        "event": name,
        "payload": payload
    })
    .to_string()
}

/// Answer to one request line: something to print now, something to print
/// once background work completes, or both.
pub struct Reply {
    pub immediate: Option<String>,
    pub deferred: Option<Task<String>>,
}

impl Reply {
    pub fn now(line: String) -> Self {
        Self {
            immediate: Some(line),
            deferred: None,
        }
    }

    pub fn later(task: Task<String>) -> Self {
        Self {
            immediate: None,
            deferred: Some(task),
        }
    }

    pub fn then(line: String, task: Task<String>) -> Self {
        Self {
            immediate: Some(line),
            deferred: Some(task),
        }
    }
}

pub struct Session {
    sidebar: Sidebar,
    crowdin: CrowdinContext,
}

impl Session {
    pub fn new(client: CrowdinClient, download_dir: PathBuf) -> Self {
        Self {
            sidebar: Sidebar::default(),
            crowdin: CrowdinContext::new(client, download_dir),
        }
    }

    pub fn handle(&mut self, input: &str) -> Reply {
        let req: Value = match serde_json::from_str(input) {
            Ok(v) => v,
            Err(_) => {
                return Reply::now(
                    json!({
                        "status": "error",
                        "message": "invalid json"
                    })
                    .to_string(),
                );
            }
        };

        let id = get_id(&req);
        let cmd_str = get_cmd(&req);
        let payload = get_payload(&req);
        let cmd = Command::from(cmd_str);

        log::debug!("request {cmd_str} ({id})");

        match cmd {
            Command::Ping => Reply::now(ok(id, json!({ "message": "lingo-core alive" }))),

            c if c.is_sidebar() => match sidebar::handle(&mut self.sidebar, c, payload) {
                Ok(v) => Reply::now(ok(id, v)),
                Err(e) => Reply::now(err(id, e)),
            },

            Command::Unknown => {
                log::warn!("unknown command {cmd_str:?}");
                Reply::now(err(id, "unknown command"))
            }

            c => crowdin::handle(&self.crowdin, id, c, payload),
        }
    }

    /// Background work to begin as soon as the process is up, if any.
    pub fn startup(&self) -> Option<Task<String>> {
        self.crowdin.refresh_on_start()
    }

    /// Abandons work that would otherwise never finish (a sign-in nobody
    /// will complete), so outstanding replies can be flushed on exit.
    pub fn shutdown(&self) {
        self.crowdin.client.cancel_sign_in();
    }
}
