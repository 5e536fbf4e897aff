use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::Value;
use std::fs;
use std::panic::Location;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Metadata recorded next to every file the CLI writes.
pub struct Payload {
    pub command: &'static str,
    pub params: Value,
}

impl Payload {
    pub fn new(command: &'static str, params: Value) -> Self {
        Self { command, params }
    }
}

#[derive(Serialize)]
struct Callsite<'a> {
    file: &'a str,
    line: u32,
}

#[derive(Serialize)]
struct Sidecar<'a> {
    code_rev: String,
    version: &'a str,
    callsite: Callsite<'a>,
    command: &'a str,
    params: &'a Value,
    outputs: Vec<String>,
}

/// Write `<artifact stem>.provenance.json` with git commit, callsite, command, params, outputs.
#[track_caller]
pub fn write_sidecar<P: AsRef<Path>>(artifact: P, payload: Payload) -> Result<PathBuf> {
    let artifact = artifact.as_ref();
    let provenance_path = provenance_path(artifact);
    if let Some(parent) = provenance_path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating provenance dir {}", parent.display()))?;
        }
    }

    let callsite = Location::caller();
    let doc = Sidecar {
        code_rev: current_git_rev(),
        version: ait::VERSION,
        callsite: Callsite {
            file: callsite.file(),
            line: callsite.line(),
        },
        command: payload.command,
        params: &payload.params,
        outputs: vec![artifact.to_string_lossy().into_owned()],
    };
    fs::write(&provenance_path, serde_json::to_vec_pretty(&doc)?)
        .with_context(|| format!("writing {}", provenance_path.display()))?;
    tracing::info!(path = %provenance_path.display(), "provenance");
    Ok(provenance_path)
}

const SIDECAR_EXT: &str = "provenance.json";
const UNKNOWN_REV: &str = "unknown";

fn provenance_path(artifact: &Path) -> PathBuf {
    if artifact.file_name().is_some() {
        artifact.with_extension(SIDECAR_EXT)
    } else {
        artifact.join(format!("artifact.{SIDECAR_EXT}"))
    }
}

/// Commit the running binary was built from; first non-empty source wins.
pub fn current_git_rev() -> String {
    let build_time = option_env!("GIT_COMMIT").map(str::to_owned);
    build_time
        .and_then(non_empty)
        .or_else(|| std::env::var("GIT_COMMIT").ok().and_then(non_empty))
        .or_else(repo_head)
        .unwrap_or_else(|| UNKNOWN_REV.to_owned())
}

fn repo_head() -> Option<String> {
    let out = Command::new("git")
        .args(["rev-parse", "--verify", "HEAD"])
        .output()
        .ok()?;
    if !out.status.success() {
        return None;
    }
    String::from_utf8(out.stdout)
        .ok()
        .and_then(|rev| non_empty(rev.trim().to_owned()))
}

fn non_empty(s: String) -> Option<String> {
    (!s.is_empty()).then_some(s)
}
