//! External-tool provider.
//!
//! Command-line archivers are described declaratively: one command per
//! operation with an argument template, plus a regex that parses list
//! output. The provider never goes through a shell; argv arrays are
//! passed to the tool directly with stdin/stdout piped for read/write.

use std::io::{Cursor, Read, Write};
use std::path::Path;
use std::process::{Command, Stdio};

use regex::Regex;

use rom_stash_core::StashError;

use crate::provider::ArchiveProvider;

/// One command invocation: executable plus an argument template.
///
/// Template tokens `$(infile)`, `$(entry)` and `$(new_entry)` are
/// substituted per call; the `:zip` modifier (`$(entry:zip)`) escapes the
/// characters zip-family tools treat as globs.
#[derive(Debug, Clone)]
pub struct CmdSpec {
    pub cmd: String,
    pub args: Vec<String>,
}

impl CmdSpec {
    pub fn new(cmd: &str, args: &[&str]) -> Self {
        Self {
            cmd: cmd.to_string(),
            args: args.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// The list operation: a command plus a row parser.
///
/// The parser regex must bind a named capture `entry`; an optional `type`
/// capture feeds the validator, a map of capture name to required value
/// that rejects non-file rows (directories, volume labels).
#[derive(Debug, Clone)]
pub struct ListSpec {
    pub cmd: CmdSpec,
    pub parser: Regex,
    pub validator: Vec<(String, String)>,
}

/// Declarative description of an external archiver.
#[derive(Debug, Clone, Default)]
pub struct ToolSpec {
    pub name: String,
    pub extensions: Vec<String>,
    pub mimetypes: Vec<String>,
    pub list: Option<ListSpec>,
    pub read: Option<CmdSpec>,
    pub write: Option<CmdSpec>,
    pub delete: Option<CmdSpec>,
    pub rename: Option<CmdSpec>,
}

/// An [`ArchiveProvider`] driving an external command-line tool.
#[derive(Debug)]
pub struct ToolProvider {
    spec: ToolSpec,
    extensions: Vec<&'static str>,
    mimetypes: Vec<&'static str>,
}

impl ToolProvider {
    /// Wrap a spec; `None` when `list` or `read` is unset, which leaves
    /// the tool unusable even for scanning.
    pub fn new(spec: ToolSpec) -> Option<Self> {
        if spec.list.is_none() || spec.read.is_none() {
            log::warn!("tool spec {:?} lacks list/read, skipping", spec.name);
            return None;
        }
        // The provider trait hands out &'static str slices; the spec owns
        // the strings for the provider's lifetime.
        let extensions = spec
            .extensions
            .iter()
            .map(|s| Box::leak(s.clone().into_boxed_str()) as &'static str)
            .collect();
        let mimetypes = spec
            .mimetypes
            .iter()
            .map(|s| Box::leak(s.clone().into_boxed_str()) as &'static str)
            .collect();
        Some(Self {
            spec,
            extensions,
            mimetypes,
        })
    }

    fn run_capture(&self, spec: &CmdSpec, subst: &Substitutions) -> Result<Vec<u8>, StashError> {
        let args = render_args(&spec.args, subst);
        let output = Command::new(&spec.cmd)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()?;
        if !output.status.success() {
            return Err(exec_error(&spec.cmd, &output.status, &output.stderr));
        }
        Ok(output.stdout)
    }

    fn run_feeding(
        &self,
        spec: &CmdSpec,
        subst: &Substitutions,
        data: &mut dyn Read,
    ) -> Result<(), StashError> {
        let args = render_args(&spec.args, subst);
        let mut child = Command::new(&spec.cmd)
            .args(&args)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()?;
        {
            let mut stdin = child.stdin.take().expect("stdin was piped");
            std::io::copy(data, &mut stdin)?;
            stdin.flush()?;
        }
        let output = child.wait_with_output()?;
        if !output.status.success() {
            return Err(exec_error(&spec.cmd, &output.status, &output.stderr));
        }
        Ok(())
    }
}

impl ArchiveProvider for ToolProvider {
    fn name(&self) -> &str {
        &self.spec.name
    }

    fn extensions(&self) -> &[&str] {
        &self.extensions
    }

    fn mimetypes(&self) -> &[&str] {
        &self.mimetypes
    }

    fn write_enabled(&self) -> bool {
        self.spec.write.is_some()
    }

    fn list(&self, file: &Path) -> Result<Vec<String>, StashError> {
        let list = self.spec.list.as_ref().expect("checked at construction");
        let subst = Substitutions::for_file(file);
        let stdout = self.run_capture(&list.cmd, &subst)?;
        let text = String::from_utf8_lossy(&stdout);
        parse_list_output(&text, &list.parser, &list.validator)
    }

    fn read(&self, file: &Path, entry: &str) -> Result<Box<dyn Read>, StashError> {
        let read = self.spec.read.as_ref().expect("checked at construction");
        let subst = Substitutions::for_entry(file, entry);
        let stdout = self.run_capture(read, &subst)?;
        Ok(Box::new(Cursor::new(stdout)))
    }

    fn write(&self, file: &Path, entry: &str, data: &mut dyn Read) -> Result<(), StashError> {
        let Some(write) = self.spec.write.as_ref() else {
            return Err(StashError::not_supported(format!(
                "{} provider is read-only",
                self.name()
            )));
        };
        let subst = Substitutions::for_entry(file, entry);
        self.run_feeding(write, &subst, data)
    }

    fn delete(&self, file: &Path, entry: &str) -> Result<(), StashError> {
        match self.spec.delete.as_ref() {
            Some(delete) => {
                let subst = Substitutions::for_entry(file, entry);
                self.run_capture(delete, &subst).map(|_| ())
            }
            None => crate::provider::emulated_delete(self, file, entry),
        }
    }

    fn rename(&self, file: &Path, from: &str, to: &str) -> Result<(), StashError> {
        match self.spec.rename.as_ref() {
            Some(rename) => {
                let subst = Substitutions::for_rename(file, from, to);
                self.run_capture(rename, &subst).map(|_| ())
            }
            None => crate::provider::emulated_rename(self, file, from, to),
        }
    }
}

/// Values substituted into an argument template.
#[derive(Debug, Default)]
struct Substitutions {
    infile: String,
    entry: Option<String>,
    new_entry: Option<String>,
}

impl Substitutions {
    fn for_file(file: &Path) -> Self {
        Self {
            infile: file.to_string_lossy().into_owned(),
            ..Default::default()
        }
    }

    fn for_entry(file: &Path, entry: &str) -> Self {
        Self {
            entry: Some(entry.to_string()),
            ..Self::for_file(file)
        }
    }

    fn for_rename(file: &Path, from: &str, to: &str) -> Self {
        Self {
            new_entry: Some(to.to_string()),
            ..Self::for_entry(file, from)
        }
    }
}

/// Render an argument template against the substitutions.
fn render_args(template: &[String], subst: &Substitutions) -> Vec<String> {
    template
        .iter()
        .map(|arg| {
            let mut out = arg.replace("$(infile)", &subst.infile);
            if let Some(entry) = subst.entry.as_deref() {
                out = out.replace("$(entry:zip)", &zip_escape(entry));
                out = out.replace("$(entry)", entry);
            }
            if let Some(new_entry) = subst.new_entry.as_deref() {
                out = out.replace("$(new_entry:zip)", &zip_escape(new_entry));
                out = out.replace("$(new_entry)", new_entry);
            }
            out
        })
        .collect()
}

/// Escape the characters zip-family tools treat as glob syntax.
fn zip_escape(entry: &str) -> String {
    let mut out = String::with_capacity(entry.len());
    for c in entry.chars() {
        if matches!(c, '\\' | '[' | ']') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Parse list output line by line through the row regex.
///
/// Rows the regex does not match are skipped; rows it matches but whose
/// named captures fail the validator are skipped as directory/noise rows.
/// A matched row without an `entry` capture value is a structural error.
fn parse_list_output(
    text: &str,
    parser: &Regex,
    validator: &[(String, String)],
) -> Result<Vec<String>, StashError> {
    let mut entries = Vec::new();
    for line in text.lines() {
        let Some(captures) = parser.captures(line) else {
            continue;
        };
        let valid = validator.iter().all(|(name, required)| {
            captures
                .name(name)
                .is_some_and(|m| m.as_str() == required)
        });
        if !valid {
            continue;
        }
        let entry = captures
            .name("entry")
            .map(|m| m.as_str().trim().to_string())
            .filter(|e| !e.is_empty())
            .ok_or_else(|| StashError::processing("list row without entry capture"))?;
        entries.push(entry);
    }
    Ok(entries)
}

fn exec_error(cmd: &str, status: &std::process::ExitStatus, stderr: &[u8]) -> StashError {
    StashError::Exec {
        cmd: cmd.to_string(),
        status: status.code().unwrap_or(-1),
        stderr: String::from_utf8_lossy(stderr).trim().to_string(),
    }
}

/// Descriptor for the `7z` command-line tool.
pub fn sevenzip_spec() -> ToolSpec {
    ToolSpec {
        name: "7z".to_string(),
        extensions: vec!["7z".to_string()],
        mimetypes: vec!["application/x-7z-compressed".to_string()],
        list: Some(ListSpec {
            cmd: CmdSpec::new("7z", &["l", "-ba", "$(infile)"]),
            // date time attrs size [compressed] name
            parser: Regex::new(
                r"^(?P<date>\S+)\s+(?P<time>\S+)\s+(?P<type>\S{5})\s+(?P<size>\d+)\s+(?:(?P<packed>\d+)\s+)?(?P<entry>.+)$",
            )
            .expect("static regex"),
            validator: vec![("type".to_string(), "....A".to_string())],
        }),
        read: Some(CmdSpec::new("7z", &["e", "-so", "-y", "$(infile)", "$(entry)"])),
        write: Some(CmdSpec::new("7z", &["a", "-si$(entry)", "-y", "$(infile)"])),
        delete: Some(CmdSpec::new("7z", &["d", "-y", "$(infile)", "$(entry)"])),
        rename: Some(CmdSpec::new(
            "7z",
            &["rn", "-y", "$(infile)", "$(entry)", "$(new_entry)"],
        )),
    }
}

/// Descriptor for the `zip`/`unzip`/`zipinfo` tool family.
///
/// No write command is configured, so the provider degrades to read-only
/// with delete support; registering it is only useful when the in-process
/// zip provider is unwanted.
pub fn zip_tool_spec() -> ToolSpec {
    ToolSpec {
        name: "zip-tool".to_string(),
        extensions: vec!["zip".to_string()],
        mimetypes: vec!["application/zip".to_string()],
        list: Some(ListSpec {
            cmd: CmdSpec::new("zipinfo", &["-1", "$(infile)"]),
            // Bare entry per row; directory rows end with a slash.
            parser: Regex::new(r"^(?P<entry>.*[^/])$").expect("static regex"),
            validator: Vec::new(),
        }),
        read: Some(CmdSpec::new("unzip", &["-p", "$(infile)", "$(entry:zip)"])),
        write: None,
        delete: Some(CmdSpec::new("zip", &["-q", "-d", "$(infile)", "$(entry:zip)"])),
        rename: None,
    }
}

#[cfg(test)]
#[path = "tests/tool_tests.rs"]
mod tests;
