use std::sync::{Arc, Mutex, RwLock};

use serde_json::{json, Value};

use crate::config::CrowdinConfig;
use crate::error::{CrowdinError, Result};
use crate::model::crowdin::{Language, ProjectFile, ProjectInfo, ProjectListing, UserInfo};
use crate::services::crowdin::credentials::CredentialStore;
use crate::services::crowdin::http::{HttpRequest, ReqwestTransport, RequestBody, Transport};
use crate::services::crowdin::oauth::{self, Grant};
use crate::services::crowdin::task::{Completer, Task};

const PAGE_LIMIT: u32 = 500;

/// A sign-in started with [`CrowdinClient::authenticate`].
pub struct AuthFlow {
    /// Open this in the user's browser.
    pub authorize_url: String,
    pub state: String,
    /// Resolves once the matching callback was handled.
    pub completion: Task<()>,
}

struct PendingAuth {
    state: String,
    completer: Completer<()>,
}

struct Inner {
    config: CrowdinConfig,
    transport: Box<dyn Transport>,
    credentials: Option<CredentialStore>,
    token: RwLock<Option<String>>,
    pending: Mutex<Option<PendingAuth>>,
}

/// Client for the Crowdin platform. Clones share the same session.
#[derive(Clone)]
pub struct CrowdinClient {
    inner: Arc<Inner>,
}

impl CrowdinClient {
    pub fn new(
        config: CrowdinConfig,
        transport: Box<dyn Transport>,
        credentials: Option<CredentialStore>,
    ) -> Self {
        let token = match credentials.as_ref().map(CredentialStore::load) {
            Some(Ok(token)) => token,
            Some(Err(e)) => {
                log::warn!("ignoring stored Crowdin credentials: {e}");
                None
            }
            None => None,
        };

        Self {
            inner: Arc::new(Inner {
                config,
                transport,
                credentials,
                token: RwLock::new(token),
                pending: Mutex::new(None),
            }),
        }
    }

    /// Client backed by a real HTTP connection.
    pub fn connect(config: CrowdinConfig, credentials: Option<CredentialStore>) -> Result<Self> {
        let transport = ReqwestTransport::new(config.timeout_secs)?;
        Ok(Self::new(config, Box::new(transport), credentials))
    }

    pub fn config(&self) -> &CrowdinConfig {
        &self.inner.config
    }

    pub fn is_signed_in(&self) -> bool {
        self.token().is_some()
    }

    /// Starts a browser sign-in. The shell must route the redirect URI back
    /// into [`handle_oauth_callback`](Self::handle_oauth_callback).
    pub fn authenticate(&self) -> Result<AuthFlow> {
        let state = oauth::new_state();
        let authorize_url = oauth::authorize_url(&self.inner.config, &state)?;
        let (completer, completion) = Task::channel();

        let previous = self.pending().replace(PendingAuth {
            state: state.clone(),
            completer,
        });
        if let Some(previous) = previous {
            log::info!("superseding unfinished Crowdin sign-in");
            previous.completer.complete(Err(CrowdinError::Cancelled));
        }

        log::info!("Crowdin sign-in started");
        Ok(AuthFlow {
            authorize_url,
            state,
            completion,
        })
    }

    pub fn is_oauth_callback(&self, uri: &str) -> bool {
        oauth::is_callback(&self.inner.config, uri)
    }

    pub fn handle_oauth_callback(&self, uri: &str) -> Result<()> {
        if !self.is_oauth_callback(uri) {
            return Err(CrowdinError::OAuth("not a Crowdin callback".into()));
        }

        let pending = self.pending().take().ok_or(CrowdinError::NoPendingSignIn)?;

        let callback = match oauth::parse_callback(uri) {
            Ok(cb) => cb,
            Err(e) => return Err(self.fail_sign_in(pending, e)),
        };

        if callback.state.as_deref() != Some(pending.state.as_str()) {
            // stale or forged: keep waiting for the real one
            log::warn!("Crowdin callback with unexpected state ignored");
            *self.pending() = Some(pending);
            return Err(CrowdinError::StateMismatch);
        }

        let token = match callback.grant {
            Grant::AccessToken(token) => Ok(token),
            Grant::Code(code) => self.exchange_code(&code),
        };

        match token {
            Ok(token) => {
                self.store_token(token);
                log::info!("Crowdin sign-in completed");
                pending.completer.complete(Ok(()));
                Ok(())
            }
            Err(e) => Err(self.fail_sign_in(pending, e)),
        }
    }

    /// Forgets the token, also on disk, and abandons any sign-in in progress.
    pub fn sign_out(&self) {
        *self.inner.token.write().unwrap_or_else(|e| e.into_inner()) = None;

        if let Some(store) = &self.inner.credentials {
            if let Err(e) = store.clear() {
                log::warn!("failed to remove stored Crowdin credentials: {e}");
            }
        }
        self.cancel_sign_in();
        log::info!("signed out of Crowdin");
    }

    /// Fails the sign-in in progress, if any, with `Cancelled`.
    pub fn cancel_sign_in(&self) {
        if let Some(pending) = self.pending().take() {
            pending.completer.complete(Err(CrowdinError::Cancelled));
        }
    }

    pub fn user_info(&self) -> Result<UserInfo> {
        let resp = self.api_get("user")?;
        let data = data_of(&resp)?;

        let login = str_field(data, "username");
        let full_name = str_field(data, "fullName");
        let name = if full_name.trim().is_empty() {
            login.clone()
        } else {
            full_name
        };

        Ok(UserInfo { name, login })
    }

    pub fn user_projects(&self) -> Result<Vec<ProjectListing>> {
        let resp = self.api_get(&format!("projects?limit={PAGE_LIMIT}"))?;

        let projects: Vec<ProjectListing> = data_items(&resp)?
            .map(|p| ProjectListing {
                name: str_field(p, "name"),
                identifier: id_field(p),
                downloadable: p
                    .get("publicDownloads")
                    .and_then(|v| v.as_bool())
                    .unwrap_or(false),
            })
            .collect();
        Ok(projects)
    }

    pub fn project_info(&self, project_id: &str) -> Result<ProjectInfo> {
        let project_id = checked_project_id(project_id)?;
        let project = self.api_get(&format!("projects/{project_id}"))?;
        let data = data_of(&project)?;

        let languages: Vec<Language> = data
            .get("targetLanguages")
            .and_then(|v| v.as_array())
            .map(|langs| {
                langs
                    .iter()
                    .map(|l| Language {
                        code: str_field(l, "id"),
                        name: str_field(l, "name"),
                    })
                    .filter(|l| !l.code.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        let files = self.api_get(&format!("projects/{project_id}/files?limit={PAGE_LIMIT}"))?;
        let po_files: Vec<ProjectFile> = data_items(&files)?
            .filter_map(|f| {
                let id = f.get("id").and_then(|v| v.as_u64())?;
                let path = str_field(f, "path");
                is_gettext_file(&path).then_some(ProjectFile { id, path })
            })
            .collect();

        Ok(ProjectInfo {
            name: str_field(data, "name"),
            identifier: project_id.to_string(),
            languages,
            po_files,
        })
    }

    /// Builds the translated file on Crowdin and fetches its bytes.
    pub fn download_file(&self, project_id: &str, file_id: u64, language: &str) -> Result<Vec<u8>> {
        let project_id = checked_project_id(project_id)?;
        let resp = self.api_post(
            &format!("projects/{project_id}/translations/builds/files/{file_id}"),
            json!({ "targetLanguageId": language }),
        )?;

        let url = data_of(&resp)?
            .get("url")
            .and_then(|u| u.as_str())
            .ok_or_else(|| CrowdinError::InvalidResponse("build without download url".into()))?
            .to_string();

        // pre-signed: no bearer
        let file = self
            .inner
            .transport
            .send(&HttpRequest::get(url))?
            .error_for_status()?;
        Ok(file.body)
    }

    /// Runs `f` on a worker thread; the outcome arrives through the task.
    pub fn spawn<T, F>(&self, f: F) -> Task<T>
    where
        T: Send + 'static,
        F: FnOnce(&CrowdinClient) -> Result<T> + Send + 'static,
    {
        let client = self.clone();
        Task::spawn(move || f(&client))
    }

    fn token(&self) -> Option<String> {
        self.inner
            .token
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    fn pending(&self) -> std::sync::MutexGuard<'_, Option<PendingAuth>> {
        self.inner.pending.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn store_token(&self, token: String) {
        if let Some(store) = &self.inner.credentials {
            if let Err(e) = store.save(&token) {
                log::warn!("failed to persist Crowdin credentials: {e}");
            }
        }
        *self.inner.token.write().unwrap_or_else(|e| e.into_inner()) = Some(token);
    }

    fn fail_sign_in(&self, pending: PendingAuth, err: CrowdinError) -> CrowdinError {
        log::warn!("Crowdin sign-in failed: {err}");
        pending
            .completer
            .complete(Err(CrowdinError::OAuth(err.to_string())));
        err
    }

    fn exchange_code(&self, code: &str) -> Result<String> {
        let form = oauth::token_request_form(&self.inner.config, code);
        let resp = self
            .inner
            .transport
            .send(&HttpRequest::post(
                self.inner.config.token_url.clone(),
                RequestBody::Form(form),
            ))?
            .error_for_status()?;
        oauth::access_token_from(&resp.json()?)
    }

    fn api_url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.inner.config.api_base.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    fn api_get(&self, path: &str) -> Result<Value> {
        let token = self.token().ok_or(CrowdinError::NotSignedIn)?;
        let request = HttpRequest::get(self.api_url(path)).bearer(&token);
        self.execute(request)
    }

    fn api_post(&self, path: &str, body: Value) -> Result<Value> {
        let token = self.token().ok_or(CrowdinError::NotSignedIn)?;
        let request = HttpRequest::post(self.api_url(path), RequestBody::Json(body)).bearer(&token);
        self.execute(request)
    }

    fn execute(&self, request: HttpRequest) -> Result<Value> {
        log::debug!("Crowdin {:?} {}", request.method, request.url);
        let resp = self.inner.transport.send(&request).and_then(|r| r.error_for_status());
        match resp {
            Ok(resp) => resp.json(),
            Err(e) => {
                log::warn!("Crowdin request {} failed: {e}", request.url);
                Err(e)
            }
        }
    }
}

fn data_of(resp: &Value) -> Result<&Value> {
    resp.get("data")
        .filter(|d| d.is_object())
        .ok_or_else(|| CrowdinError::InvalidResponse("missing data object".into()))
}

/// Items of a paginated list: `{ "data": [ { "data": {...} }, ... ] }`.
fn data_items(resp: &Value) -> Result<impl Iterator<Item = &Value>> {
    let items = resp
        .get("data")
        .and_then(|d| d.as_array())
        .ok_or_else(|| CrowdinError::InvalidResponse("missing data list".into()))?;
    Ok(items.iter().filter_map(|item| item.get("data")))
}

fn str_field(v: &Value, key: &str) -> String {
    v.get(key)
        .and_then(|s| s.as_str())
        .unwrap_or("")
        .to_string()
}

fn id_field(v: &Value) -> String {
    match v.get("id") {
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::String(s)) => s.clone(),
        _ => String::new(),
    }
}

/// Project ids end up in the request path, so only plain numbers pass.
fn checked_project_id(project_id: &str) -> Result<&str> {
    if !project_id.is_empty() && project_id.bytes().all(|b| b.is_ascii_digit()) {
        Ok(project_id)
    } else {
        Err(CrowdinError::InvalidProjectId(project_id.to_string()))
    }
}

fn is_gettext_file(path: &str) -> bool {
    let lower = path.to_ascii_lowercase();
    lower.ends_with(".po") || lower.ends_with(".pot")
}
