use std::io::Write as _;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use parking_lot::Mutex;
use rustc_hash::FxHashMap;

use crate::backend::{BackendSession, TypeResolverBackend};
use crate::types::{ResolvedType, ResolverError, TypeQuery};

/// A daemon-speaking Type Resolver backend (`spec.md` §4.3): a one-shot
/// subprocess spawned per query rather than a long-lived protocol
/// connection, matching tools like `mypy`'s `-c` reveal-type mode, whose
/// startup cost is paid per invocation instead of amortized across a
/// session.
pub struct DaemonBackend {
    command: PathBuf,
    extra_args: Vec<String>,
}

impl DaemonBackend {
    pub fn mypy() -> Self {
        Self {
            command: PathBuf::from("mypy"),
            extra_args: Vec::new(),
        }
    }

    pub fn with_command(command: impl Into<PathBuf>, extra_args: Vec<String>) -> Self {
        Self {
            command: command.into(),
            extra_args,
        }
    }
}

impl TypeResolverBackend for DaemonBackend {
    fn open_session(&self, file: &Path, text: &str) -> Result<Box<dyn BackendSession>, ResolverError> {
        Ok(Box::new(DaemonSession {
            command: self.command.clone(),
            extra_args: self.extra_args.clone(),
            file: file.to_path_buf(),
            text: text.to_string(),
            cache: Mutex::new(FxHashMap::default()),
        }))
    }

    fn name(&self) -> &'static str {
        "mypy"
    }
}

struct DaemonSession {
    command: PathBuf,
    extra_args: Vec<String>,
    file: PathBuf,
    text: String,
    cache: Mutex<FxHashMap<(u32, String), ResolvedType>>,
}

impl BackendSession for DaemonSession {
    fn query(&mut self, query: &TypeQuery) -> Result<ResolvedType, ResolverError> {
        let key = (u32::from(query.offset), query.receiver_expression_text.clone());
        if let Some(cached) = self.cache.lock().get(&key) {
            return Ok(cached.clone());
        }

        let line = line_of_offset(&self.text, query.offset);
        let expression = format!("reveal_type({})", query.receiver_expression_text);

        let mut child = Command::new(&self.command)
            .arg("-c")
            .arg(&expression)
            .args(&self.extra_args)
            .env("MYPY_DISSOLVE_FILE", &self.file)
            .env("MYPY_DISSOLVE_LINE", line.to_string())
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|err| ResolverError::Unavailable(format!("spawn {:?}: {err}", self.command)))?;

        if let Some(mut stdin) = child.stdin.take() {
            let _ = stdin.write_all(self.text.as_bytes());
        }

        let output = child
            .wait_with_output()
            .map_err(|err| ResolverError::Unavailable(err.to_string()))?;
        let stdout = String::from_utf8_lossy(&output.stdout);

        let resolved = parse_reveal_type(&stdout).unwrap_or(ResolvedType::Unknown);
        self.cache.lock().insert(key, resolved.clone());
        Ok(resolved)
    }
}

fn line_of_offset(text: &str, offset: ruff_text_size::TextSize) -> u32 {
    let offset = usize::from(offset).min(text.len());
    text.as_bytes()[..offset].iter().filter(|&&b| b == b'\n').count() as u32 + 1
}

/// `mypy`'s `reveal_type` note looks like:
/// `prog.py:1: note: Revealed type is "prog.Foo"`.
fn parse_reveal_type(stdout: &str) -> Option<ResolvedType> {
    let line = stdout.lines().find(|line| line.contains("Revealed type is"))?;
    let quoted = line.split('"').nth(1)?;
    let class_name = quoted.trim_start_matches("builtins.").replace('*', "");
    (!class_name.is_empty()).then(|| ResolvedType::Known(class_name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_mypy_reveal_type_output() {
        let stdout = "prog.py:1: note: Revealed type is \"prog.Widget\"\n";
        assert_eq!(parse_reveal_type(stdout), Some(ResolvedType::Known("prog.Widget".to_string())));
    }

    #[test]
    fn missing_revealed_type_is_unknown() {
        assert_eq!(parse_reveal_type("prog.py:1: error: oops\n"), None);
    }
}
