//! Render engine backed by the `figlet` binary (made by FontLab https://www.fontlab.com/)

use std::ffi::OsString;
use std::path::PathBuf;
use std::process::Stdio;

use anyhow::{anyhow, Context, Result};
use asciilab_core::engine::{RenderEngine, RenderRequest};
use asciilab_core::params::{Layout, DEFAULT_TYPEFACE};
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

/// Runs `figlet` once per render, feeding the text on stdin.
///
/// The default typeface maps onto figlet's bundled `standard` font; every
/// other typeface is loaded from `font_dir`, where the HTTP probe leaves
/// the definitions it fetched.
#[derive(Debug, Clone)]
pub struct FigletCommand {
    program: PathBuf,
    font_dir: PathBuf,
}

impl FigletCommand {
    pub fn new(program: impl Into<PathBuf>, font_dir: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            font_dir: font_dir.into(),
        }
    }

    pub fn arguments(&self, request: &RenderRequest) -> Vec<OsString> {
        let mut args = vec![
            OsString::from("-w"),
            OsString::from(request.width.columns().to_string()),
        ];

        if let Some(flag) = horizontal_flag(request.horizontal_layout) {
            args.push(OsString::from(flag));
        }
        if request.vertical_layout != Layout::Default {
            tracing::debug!(
                layout = %request.vertical_layout,
                "figlet has no vertical layout switch; ignoring"
            );
        }

        if request.typeface == DEFAULT_TYPEFACE {
            args.push(OsString::from("-f"));
            args.push(OsString::from("standard"));
        } else {
            args.push(OsString::from("-d"));
            args.push(self.font_dir.clone().into_os_string());
            args.push(OsString::from("-f"));
            args.push(OsString::from(&request.typeface));
        }
        args
    }
}

fn horizontal_flag(layout: Layout) -> Option<&'static str> {
    match layout {
        Layout::Default => None,
        Layout::Full => Some("-W"),
        Layout::Fitted => Some("-k"),
        Layout::ControlledSmushing => Some("-s"),
        Layout::UniversalSmushing => Some("-S"),
    }
}

impl RenderEngine for FigletCommand {
    async fn render(&self, request: &RenderRequest) -> Result<String> {
        let mut child = Command::new(&self.program)
            .args(self.arguments(request))
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .with_context(|| format!("starting {}", self.program.display()))?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin
                .write_all(request.text.as_bytes())
                .await
                .context("writing text to figlet")?;
        }

        let output = child
            .wait_with_output()
            .await
            .context("waiting for figlet")?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(anyhow!(
                "figlet exited with {} for {:?}: {}",
                output.status,
                request.typeface,
                stderr.trim()
            ));
        }

        String::from_utf8(output.stdout).context("figlet produced non-UTF-8 output")
    }
}
