//! Config file management: `config edit` and `config download`.

use std::env;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process;
use std::time::Duration;

use reqwest::header;

use crate::cli;
use crate::cli::KvCommand;
use crate::config::{expand_home, DEFAULT_CONFIG};
use crate::error::{Error, Result};

pub fn dispatch(c: &KvCommand, cmd: &cli::config::Command) -> Result<()> {
    let config_path = expand_home(&c.config_path)?;
    match &cmd.subcommand {
        cli::config::Subcommands::Edit(e) => {
            edit(&config_path, e.editor.as_deref())
        }
        cli::config::Subcommands::Download(d) => {
            download(&config_path, &d.url, c.timeout)
        }
    }
}

/// Writes the embedded default config if none exists yet, then opens the
/// file in an editor and waits for it to exit.  An existing file is
/// never touched before the editor runs.
pub fn edit(config_path: &Path, editor_flag: Option<&str>) -> Result<()> {
    match fs::metadata(config_path) {
        Ok(_) => {}
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            fs::write(config_path, DEFAULT_CONFIG).map_err(|e| {
                Error::io(
                    format!("can't write default config to {}",
                            config_path.display()),
                    e,
                )
            })?;
            eprintln!("wrote default config to {}", config_path.display());
        }
        Err(e) => {
            return Err(Error::io(
                format!("can't stat config {}", config_path.display()), e));
        }
    }

    let editor = choose_editor(editor_flag);
    let executable = find_in_path(&editor)
        .ok_or_else(|| Error::Editor(format!("can't find editor: {}",
                                             editor)))?;

    eprintln!("opening {} with {}",
              config_path.display(), executable.display());

    let status = process::Command::new(&executable)
        .arg(config_path)
        .status()
        .map_err(|e| Error::Editor(format!("can't launch {}: {}",
                                           executable.display(), e)))?;
    if !status.success() {
        return Err(Error::Editor(format!("editor exited with {}", status)));
    }
    Ok(())
}

/// Fetches a shared config from `url` and writes it to the config path.
/// Refuses to overwrite an existing file.
pub fn download(config_path: &Path, url: &str, timeout: Duration)
                -> Result<()>
{
    let mut file = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(config_path)
        .map_err(|e| {
            if e.kind() == io::ErrorKind::AlreadyExists {
                Error::ConfigExists { path: config_path.to_path_buf() }
            } else {
                Error::io(
                    format!("can't create config {}", config_path.display()),
                    e,
                )
            }
        })?;

    let result = fetch(url, timeout).and_then(|body| {
        file.write_all(body.as_bytes()).map_err(|e| {
            Error::io(
                format!("can't write config {}", config_path.display()), e)
        })
    });

    if result.is_err() {
        // Leave no partial file behind so a retry can create_new again.
        let _ = fs::remove_file(config_path);
        return result;
    }

    eprintln!("wrote config to {}", config_path.display());
    Ok(())
}

fn fetch(url: &str, timeout: Duration) -> Result<String> {
    let operation = "download config";
    let client = reqwest::blocking::Client::new();
    let resp = client.get(url)
        .header(header::ACCEPT, "text/plain")
        .timeout(timeout)
        .send()
        .map_err(|e| Error::remote(operation, e))?;
    let status = resp.status();
    let body = resp.text().map_err(|e| Error::remote(operation, e))?;
    if !status.is_success() {
        return Err(Error::remote(
            operation,
            crate::vault::HttpStatusError { status, body },
        ));
    }
    Ok(body)
}

/// Editor precedence: `--editor` flag, then `$EDITOR`, then a platform
/// default.
fn choose_editor(flag: Option<&str>) -> String {
    if let Some(editor) = flag {
        if !editor.is_empty() {
            return editor.to_string();
        }
    }
    if let Ok(editor) = env::var("EDITOR") {
        if !editor.is_empty() {
            return editor;
        }
    }
    if cfg!(windows) {
        "notepad".to_string()
    } else if cfg!(target_os = "macos") {
        "open".to_string()
    } else if cfg!(target_os = "linux") {
        "xdg-open".to_string()
    } else {
        "vim".to_string()
    }
}

/// Resolves a bare command name on `PATH`.  A name with path separators
/// is used as-is if it exists.
fn find_in_path(editor: &str) -> Option<PathBuf> {
    let candidate = Path::new(editor);
    if candidate.components().count() > 1 {
        return candidate.is_file().then(|| candidate.to_path_buf());
    }
    let paths = env::var_os("PATH")?;
    env::split_paths(&paths)
        .map(|dir| dir.join(editor))
        .find(|p| p.is_file())
}
