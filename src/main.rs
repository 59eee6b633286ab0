#![windows_subsystem = "windows"]
use std::io::{self, BufRead, Write};
use std::panic::AssertUnwindSafe;
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;

use lingo_core::config::AppConfig;
use lingo_core::logging;
use lingo_core::protocol::{Reply, Session};
use lingo_core::services::crowdin::{CredentialStore, CrowdinClient, Task};

fn write_line(out: &Mutex<io::Stdout>, line: &str) -> io::Result<()> {
    let mut out = out.lock().unwrap_or_else(|e| e.into_inner());
    writeln!(out, "{line}")?;
    out.flush()
}

/// Writes the task's line once it is ready.
fn forward(out: &Arc<Mutex<io::Stdout>>, task: Task<String>) -> JoinHandle<()> {
    let out = Arc::clone(out);
    task.then(move |result| {
        let response = result.unwrap_or_else(|e| {
            serde_json::json!({ "status": "error", "message": e.to_string() }).to_string()
        });
        let _ = write_line(&out, &response);
    })
}

fn main() {
    let config = match AppConfig::load() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("lingo-core: {e}");
            std::process::exit(2);
        }
    };

    if let Err(e) = logging::init_logging(&config.log, &config.log_dir()) {
        eprintln!("lingo-core: {e}");
    }

    let credentials = CredentialStore::new(config.credentials_path());
    let client = match CrowdinClient::connect(config.crowdin.clone(), Some(credentials)) {
        Ok(c) => c,
        Err(e) => {
            log::error!("failed to create Crowdin client: {e}");
            std::process::exit(2);
        }
    };

    let mut session = Session::new(client, config.download_dir());
    let stdout = Arc::new(Mutex::new(io::stdout()));
    let mut outstanding: Vec<JoinHandle<()>> = session
        .startup()
        .map(|task| forward(&stdout, task))
        .into_iter()
        .collect();

    log::info!("lingo-core ready");

    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let line = match line {
            Ok(l) => l,
            Err(_) => continue,
        };

        if line.trim().is_empty() {
            continue;
        }

        let result = std::panic::catch_unwind(AssertUnwindSafe(|| session.handle(&line)));

        let reply = match result {
            Ok(reply) => reply,
            Err(_) => {
                log::error!("handler panicked on request: {line}");
                Reply::now(
                    serde_json::json!({
                        "status": "error",
                        "message": "internal core error"
                    })
                    .to_string(),
                )
            }
        };

        if let Some(response) = reply.immediate {
            if write_line(&stdout, &response).is_err() {
                break;
            }
        }

        if let Some(task) = reply.deferred {
            outstanding.push(forward(&stdout, task));
        }

        outstanding.retain(|handle| !handle.is_finished());
    }

    session.shutdown();
    for handle in outstanding {
        let _ = handle.join();
    }
    log::info!("lingo-core exiting");
}
