//! Line-driven front end for the live preview (made by FontLab https://www.fontlab.com/)

use std::io::Write;

use anyhow::{anyhow, bail, Context, Result};
use asciilab_core::catalog::Step;
use asciilab_core::codec;
use asciilab_core::live::{Command, PreviewHandle};
use asciilab_core::params::Layout;
use asciilab_core::scheduler::RenderPhase;
use asciilab_core::session::{Change, Preview};
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::sync::mpsc::UnboundedSender;

use crate::config::Config;
use crate::{parse_layout, write_share_links};

pub const HELP: &str = "\
Type text to render it. Commands:
  :font NAME     pick a typeface          :next / :prev   step through the listing
  :width N       wrap width (10-200)      :random         random typeface
  :auto on|off   unbounded width          :search [TEXT]  filter the listing
  :hl LAYOUT     horizontal layout        :fav [NAME]     toggle a favorite
  :vl LAYOUT     vertical layout          :restore STATE  load an encoded state
  :size N        preview size (10-20)     :history N      reuse a history entry
  :render        render again             :clear          clear history
  :share         print share links        :quit           leave
Lines starting with '::' render the text after the first colon.";

/// One parsed input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    Send(Command),
    /// Offer the name first so typefaces outside the catalog can be picked.
    Typeface(String),
    FavoriteCurrent,
    Share,
    Help,
    Quit,
}

pub fn parse_line(line: &str) -> Result<Input> {
    let line = line.trim_end_matches(['\r', '\n']);
    if let Some(text) = line.strip_prefix("::") {
        return Ok(text_input(&format!(":{text}")));
    }
    let Some(command) = line.strip_prefix(':') else {
        return Ok(text_input(line));
    };

    let (name, arg) = match command.split_once(char::is_whitespace) {
        Some((name, arg)) => (name, arg.trim()),
        None => (command, ""),
    };

    let change = |c: Change| -> Result<Input> { Ok(Input::Send(Command::Change(c))) };
    match name {
        "font" | "f" => Ok(Input::Typeface(required(name, arg)?.to_string())),
        "width" | "w" => change(Change::Width(number(name, arg)?)),
        "auto" => match arg {
            "" | "on" | "1" => change(Change::AutoWidth(true)),
            "off" | "0" => change(Change::AutoWidth(false)),
            other => bail!(":auto expects on or off, got {other:?}"),
        },
        "hl" => change(Change::HorizontalLayout(layout(name, arg)?)),
        "vl" => change(Change::VerticalLayout(layout(name, arg)?)),
        "size" => change(Change::PreviewSize(number(name, arg)?)),
        "next" | "n" => change(Change::StepTypeface(Step::Next)),
        "prev" | "p" => change(Change::StepTypeface(Step::Prev)),
        "random" => change(Change::RandomTypeface),
        "restore" => change(Change::Restore(required(name, arg)?.to_string())),
        "history" => {
            let index = number(name, arg)?;
            let index = usize::try_from(index).map_err(|_| anyhow!(":history expects an index"))?;
            change(Change::FromHistory(index))
        }
        "search" => Ok(Input::Send(Command::Search(arg.to_string()))),
        "fav" if arg.is_empty() => Ok(Input::FavoriteCurrent),
        "fav" => Ok(Input::Send(Command::ToggleFavorite(arg.to_string()))),
        "clear" => Ok(Input::Send(Command::ClearHistory)),
        "render" => Ok(Input::Send(Command::Rerender)),
        "share" => Ok(Input::Share),
        "help" | "h" | "?" => Ok(Input::Help),
        "quit" | "q" | "exit" => Ok(Input::Quit),
        other => bail!("unknown command :{other} (try :help)"),
    }
}

fn text_input(text: &str) -> Input {
    Input::Send(Command::Change(Change::Text(text.to_string())))
}

fn required<'a>(name: &str, arg: &'a str) -> Result<&'a str> {
    if arg.is_empty() {
        bail!(":{name} needs an argument");
    }
    Ok(arg)
}

fn number(name: &str, arg: &str) -> Result<i64> {
    required(name, arg)?
        .parse()
        .with_context(|| format!(":{name} expects a number, got {arg:?}"))
}

fn layout(name: &str, arg: &str) -> Result<Layout> {
    parse_layout(required(name, arg)?).map_err(|err| anyhow!(":{name}: {err}"))
}

/// Feed `input` lines to the live preview and print every settled preview to `out`.
///
/// Returns once input ends (or `:quit`) and the preview side has shut down.
pub async fn front_end(
    input: impl AsyncBufRead + Unpin,
    commands: UnboundedSender<Command>,
    mut handle: PreviewHandle,
    config: &Config,
    mut out: impl Write,
) -> Result<()> {
    let mut lines = input.lines();
    let mut commands = Some(commands);
    let mut shown: Option<(String, Option<String>)> = None;

    loop {
        tokio::select! {
            line = lines.next_line(), if commands.is_some() => {
                let Some(line) = line.context("reading input")? else {
                    commands = None;
                    continue;
                };
                match parse_line(&line) {
                    Ok(Input::Send(cmd)) => send(&mut commands, cmd),
                    Ok(Input::Typeface(name)) => {
                        send(&mut commands, Command::Offer(name.clone()));
                        send(&mut commands, Command::Change(Change::Typeface(name)));
                    }
                    Ok(Input::FavoriteCurrent) => {
                        let current = codec::decode(&handle.fragment.borrow()).typeface;
                        send(&mut commands, Command::ToggleFavorite(current));
                    }
                    Ok(Input::Share) => {
                        let params = codec::decode(&handle.fragment.borrow());
                        if let Err(err) = write_share_links(config, &params, &mut out) {
                            eprintln!("error: {err:#}");
                        }
                    }
                    Ok(Input::Help) => writeln!(out, "{HELP}")?,
                    Ok(Input::Quit) => commands = None,
                    Err(err) => eprintln!("error: {err:#}"),
                }
            }
            changed = handle.preview.changed() => {
                if changed.is_err() {
                    break;
                }
                let preview = handle.preview.borrow_and_update().clone();
                show(&preview, &mut shown, &mut out)?;
            }
        }
    }

    // The sender is gone by now; show whatever the final flush produced.
    let preview = handle.preview.borrow().clone();
    show(&preview, &mut shown, &mut out)?;
    Ok(())
}

fn send(commands: &mut Option<UnboundedSender<Command>>, cmd: Command) {
    if let Some(tx) = commands {
        if tx.send(cmd).is_err() {
            *commands = None;
        }
    }
}

fn show(
    preview: &Preview,
    shown: &mut Option<(String, Option<String>)>,
    mut out: impl Write,
) -> Result<()> {
    let settled = !preview.busy && matches!(preview.phase, RenderPhase::Done | RenderPhase::Failed);
    let current = (preview.output.clone(), preview.warning.clone());
    if !settled || shown.as_ref() == Some(&current) {
        return Ok(());
    }

    if let Some(warning) = &preview.warning {
        eprintln!("warning: {warning}");
    }
    write!(out, "{}", preview.output)?;
    if !preview.output.ends_with('\n') {
        writeln!(out)?;
    }
    out.flush()?;
    *shown = Some(current);
    Ok(())
}
