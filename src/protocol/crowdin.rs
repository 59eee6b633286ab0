use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard};

use serde_json::{json, Value};

use super::command::Command;
use super::{err, event, ok, Reply};
use crate::error::{CrowdinError, Result};
use crate::model::crowdin::UserInfo;
use crate::services::crowdin::client::AuthFlow;
use crate::services::crowdin::download;
use crate::services::crowdin::{CrowdinClient, LoginPanel, Task};

pub struct CrowdinContext {
    pub client: CrowdinClient,
    pub login: Arc<Mutex<LoginPanel>>,
    pub download_dir: PathBuf,
}

impl CrowdinContext {
    pub fn new(client: CrowdinClient, download_dir: PathBuf) -> Self {
        let login = LoginPanel::new(client.is_signed_in());
        Self {
            client,
            login: Arc::new(Mutex::new(login)),
            download_dir,
        }
    }

    /// With a token kept from an earlier run, the user details are fetched
    /// right away. The outcome is announced as an event.
    pub fn refresh_on_start(&self) -> Option<Task<String>> {
        if !self.client.is_signed_in() {
            return None;
        }

        let session = lock(&self.login).begin_update();
        let login = Arc::clone(&self.login);
        Some(self.client.spawn(move |c| {
            Ok(match refresh_user(c, &login, session) {
                Ok(user) => event(Value::Null, "crowdin.user_info", json!({ "user": user })),
                Err(e) => event(
                    Value::Null,
                    "crowdin.user_info_failed",
                    json!({ "message": e.to_string() }),
                ),
            })
        }))
    }
}

fn lock(panel: &Mutex<LoginPanel>) -> MutexGuard<'_, LoginPanel> {
    panel.lock().unwrap_or_else(|e| e.into_inner())
}

fn str_arg(payload: &Value, key: &str) -> Option<String> {
    match payload.get(key) {
        Some(Value::String(s)) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    }
}

/// Fetches the user and keeps the login panel in step with the outcome.
/// A user arriving after the panel moved on (sign-out, new sign-in) is
/// reported as cancelled.
fn refresh_user(client: &CrowdinClient, login: &Mutex<LoginPanel>, session: u64) -> Result<UserInfo> {
    let result = client.user_info();
    let mut panel = lock(login);
    match result {
        Ok(user) => {
            if panel.user_info_arrived(session, user.clone()) {
                Ok(user)
            } else {
                Err(CrowdinError::Cancelled)
            }
        }
        Err(e) => {
            panel.update_failed(session, &e);
            Err(e)
        }
    }
}

pub fn handle(ctx: &CrowdinContext, id: Value, cmd: Command, payload: &Value) -> Reply {
    let client = &ctx.client;

    match cmd {
        Command::CrowdinStatus => {
            let login = lock(&ctx.login).clone();
            Reply::now(ok(
                id,
                json!({ "signed_in": client.is_signed_in(), "login": login }),
            ))
        }

        Command::CrowdinSignIn => {
            let AuthFlow {
                authorize_url,
                completion,
                ..
            } = match client.authenticate() {
                Ok(flow) => flow,
                Err(e) => return Reply::now(err(id, e.to_string())),
            };
            let session = lock(&ctx.login).begin_sign_in();

            let client = client.clone();
            let login = Arc::clone(&ctx.login);
            let event_id = id.clone();
            let finished = Task::spawn(move || {
                Ok(match completion.wait() {
                    Ok(()) => {
                        let current = lock(&login).signed_in(session);
                        let user = if current {
                            refresh_user(&client, &login, session).ok()
                        } else {
                            None
                        };
                        event(event_id, "crowdin.signed_in", json!({ "user": user }))
                    }
                    Err(e) => {
                        lock(&login).sign_in_failed(session);
                        event(
                            event_id,
                            "crowdin.sign_in_failed",
                            json!({ "message": e.to_string() }),
                        )
                    }
                })
            });

            Reply::then(
                ok(id, json!({ "authorize_url": authorize_url })),
                finished,
            )
        }

        Command::CrowdinIsCallback => {
            let uri = payload.get("uri").and_then(|v| v.as_str()).unwrap_or("");
            Reply::now(ok(id, json!({ "matches": client.is_oauth_callback(uri) })))
        }

        Command::CrowdinCallback => {
            let uri = payload.get("uri").and_then(|v| v.as_str()).unwrap_or("");
            if uri.is_empty() {
                return Reply::now(err(id, "payload.uri is required"));
            }
            match client.handle_oauth_callback(uri) {
                Ok(()) => Reply::now(ok(id, json!({ "signed_in": true }))),
                Err(e) => Reply::now(err(id, e.to_string())),
            }
        }

        Command::CrowdinSignOut => {
            client.sign_out();
            lock(&ctx.login).signed_out();
            Reply::now(ok(id, json!({ "signed_in": false })))
        }

        Command::CrowdinUserInfo => {
            let session = lock(&ctx.login).begin_update();
            let login = Arc::clone(&ctx.login);
            Reply::later(client.spawn(move |c| {
                Ok(match refresh_user(c, &login, session) {
                    Ok(user) => ok(id, json!({ "user": user })),
                    Err(e) => err(id, e.to_string()),
                })
            }))
        }

        Command::CrowdinProjects => Reply::later(client.spawn(move |c| {
            Ok(match c.user_projects() {
                Ok(projects) => ok(id, json!({ "projects": projects })),
                Err(e) => err(id, e.to_string()),
            })
        })),

        Command::CrowdinProjectInfo => {
            let Some(project_id) = str_arg(payload, "project_id") else {
                return Reply::now(err(id, "payload.project_id is required"));
            };
            Reply::later(client.spawn(move |c| {
                Ok(match c.project_info(&project_id) {
                    Ok(project) => ok(id, json!({ "project": project })),
                    Err(e) => err(id, e.to_string()),
                })
            }))
        }

        Command::CrowdinDownload => {
            let Some(project_id) = str_arg(payload, "project_id") else {
                return Reply::now(err(id, "payload.project_id is required"));
            };
            let Some(file_id) = payload.get("file_id").and_then(|v| v.as_u64()) else {
                return Reply::now(err(id, "payload.file_id must be a number"));
            };
            let Some(language) = str_arg(payload, "language") else {
                return Reply::now(err(id, "payload.language is required"));
            };
            let file_name = str_arg(payload, "file_name").unwrap_or_default();
            let dir = ctx.download_dir.clone();

            Reply::later(client.spawn(move |c| {
                let result =
                    download::download_to_dir(c, &dir, &project_id, file_id, &language, &file_name);
                Ok(match result {
                    Ok(file) => ok(id, json!(file)),
                    Err(e) => err(id, e.to_string()),
                })
            }))
        }

        _ => Reply::now(err(id, "unknown command")),
    }
}
