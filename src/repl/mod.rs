use anyhow::Result;
use std::borrow::Cow;
use std::io::BufRead;
use std::path::PathBuf;

use crate::render::{self, Frame, PreviewPaths};
use crate::session::{Generator, Session};
use crate::ux;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Submit with the reset checkbox as it stands.
    Submit,
    /// Generate/reset trigger.
    Generate,
    /// Modify trigger.
    Modify,
    Toggle,
    Reset(Option<bool>),
    Status,
    Open,
    Clear,
    Help,
    Quit,
    Unknown(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Line {
    Text(String),
    Command(Command),
}

pub fn parse_line(raw: &str) -> Line {
    let trimmed = raw.trim_end_matches(['\r', '\n']);
    if trimmed.trim() == "." {
        return Line::Command(Command::Submit);
    }
    let Some(rest) = trimmed.trim_start().strip_prefix(':') else {
        return Line::Text(trimmed.to_string());
    };
    let mut words = rest.split_whitespace();
    let cmd = match (words.next().unwrap_or(""), words.next()) {
        ("generate" | "g" | "new", _) => Command::Generate,
        ("modify" | "m", _) => Command::Modify,
        ("toggle" | "t", _) => Command::Toggle,
        ("reset", None) => Command::Reset(None),
        ("reset", Some("on")) => Command::Reset(Some(true)),
        ("reset", Some("off")) => Command::Reset(Some(false)),
        ("status" | "s", _) => Command::Status,
        ("open" | "o", _) => Command::Open,
        ("clear", _) => Command::Clear,
        ("help" | "h" | "?", _) => Command::Help,
        ("quit" | "q" | "exit", _) => Command::Quit,
        _ => Command::Unknown(rest.trim().to_string()),
    };
    Line::Command(cmd)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

pub struct App {
    pub session: Session,
    generator: Generator,
    out_dir: PathBuf,
    frame: Frame,
    open: bool,
    /// Sticky, like a checkbox: stays on until switched off.
    pub reset_checkbox: bool,
    buffer: Vec<String>,
    preview: Option<PreviewPaths>,
}

impl App {
    pub fn new(generator: Generator, out_dir: PathBuf, frame: Frame, open: bool) -> Self {
        Self {
            session: Session::new(),
            generator,
            out_dir,
            frame,
            open,
            reset_checkbox: false,
            buffer: Vec::new(),
            preview: None,
        }
    }

    fn take_input(&mut self) -> String {
        std::mem::take(&mut self.buffer).join("\n")
    }

    pub async fn handle(&mut self, line: Line) -> Flow {
        match line {
            Line::Text(t) => self.buffer.push(t),
            Line::Command(cmd) => match cmd {
                Command::Submit => {
                    let reset = self.reset_checkbox;
                    self.submit(reset).await;
                }
                Command::Generate => self.submit(true).await,
                Command::Modify => self.submit(false).await,
                Command::Toggle => {
                    if self.session.code.is_none() {
                        ux::print_notice("Nothing generated yet.");
                    } else {
                        self.session.toggle_code();
                        if self.session.show_code {
                            if let Some(out) = &self.session.output {
                                ux::print_explanation(out);
                            }
                        }
                    }
                }
                Command::Reset(v) => {
                    self.reset_checkbox = v.unwrap_or(!self.reset_checkbox);
                    let state = if self.reset_checkbox { "on" } else { "off" };
                    ux::print_notice(&format!("Reset {}", state));
                }
                Command::Status => {
                    ux::print_status(&self.session, self.reset_checkbox, self.preview.as_ref())
                }
                Command::Open => match &self.preview {
                    Some(p) => {
                        if let Err(e) = render::open_in_browser(&p.preview) {
                            ux::print_error(&format!("{:#}", e));
                        }
                    }
                    None => ux::print_notice("Nothing generated yet."),
                },
                Command::Clear => self.buffer.clear(),
                Command::Help => ux::print_help(),
                Command::Quit => return Flow::Quit,
                Command::Unknown(c) => {
                    ux::print_error(&format!("unknown command ':{}' (try :help)", c))
                }
            },
        }
        Flow::Continue
    }

    /// Runs one generation cycle. Failures are printed; the session keeps its prior state.
    async fn submit(&mut self, reset_requested: bool) {
        let input = self.take_input();
        let mode = self.session.should_reset(reset_requested);
        let label = ux::submit_label(mode);
        let pb = ux::spinner(&format!("{}: the code is being generated...", label));
        let result = self.generator.generate(&mut self.session, &input, reset_requested).await;
        pb.finish_and_clear();

        let generated = match result {
            Ok(g) => g,
            Err(e) => {
                ux::print_error(&e.user_message());
                return;
            }
        };

        let Some(code) = self.session.code.as_deref() else { return };
        match render::write_preview(&self.out_dir, code, self.frame) {
            Ok(paths) => {
                ux::print_generated(&generated, &paths);
                if self.open {
                    if let Err(e) = render::open_in_browser(&paths.preview) {
                        ux::print_error(&format!("{:#}", e));
                    }
                }
                self.preview = Some(paths);
            }
            Err(e) => ux::print_error(&format!("could not write preview: {:#}", e)),
        }

        if self.session.show_code {
            if let Some(out) = &self.session.output {
                ux::print_explanation(out);
            }
        }
    }
}

/// Read lines until EOF or `:quit`, one cycle at a time.
///
/// Input is free text: bytes that are not UTF-8 are replaced, never rejected.
pub async fn run<R: BufRead>(app: &mut App, mut input: R) -> Result<()> {
    ux::print_prompt(&app.session, app.reset_checkbox);
    let mut raw: Vec<u8> = Vec::new();
    loop {
        raw.clear();
        match input.read_until(b'\n', &mut raw) {
            Ok(0) => break,
            Ok(_) => {}
            Err(e) => {
                ux::print_error(&format!("could not read input: {}", e));
                break;
            }
        }
        let text = String::from_utf8_lossy(&raw);
        if let Cow::Owned(_) = &text {
            log::debug!("input line was not valid UTF-8, invalid bytes replaced");
        }
        let line = parse_line(&text);
        let is_text = matches!(line, Line::Text(_));
        if app.handle(line).await == Flow::Quit {
            break;
        }
        if is_text {
            ux::continuation();
        } else {
            ux::print_prompt(&app.session, app.reset_checkbox);
        }
    }
    log::info!("session ended after {} messages", app.session.messages.len());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::Provider;
    use crate::wire::ChatRequest;
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use std::collections::VecDeque;
    use std::io::Cursor;
    use std::sync::Arc;

    struct Canned(Mutex<VecDeque<anyhow::Result<String>>>);

    #[async_trait]
    impl Provider for Canned {
        async fn complete(&self, _req: &ChatRequest) -> anyhow::Result<String> {
            self.0.lock().pop_front().unwrap_or_else(|| Err(anyhow::anyhow!("exhausted")))
        }
    }

    fn app(replies: Vec<anyhow::Result<String>>, out: PathBuf) -> App {
        let provider = Arc::new(Canned(Mutex::new(replies.into())));
        App::new(Generator::new(provider, "m", 0.1), out, Frame::default(), false)
    }

    #[test]
    fn parses_commands_and_text() {
        assert_eq!(parse_line(".\n"), Line::Command(Command::Submit));
        assert_eq!(parse_line(":generate"), Line::Command(Command::Generate));
        assert_eq!(parse_line(":reset on"), Line::Command(Command::Reset(Some(true))));
        assert_eq!(parse_line(":reset"), Line::Command(Command::Reset(None)));
        assert_eq!(parse_line(":q"), Line::Command(Command::Quit));
        assert_eq!(parse_line(":dance"), Line::Command(Command::Unknown("dance".into())));
        assert_eq!(parse_line("  indented text\r\n"), Line::Text("  indented text".into()));
        assert_eq!(parse_line("..."), Line::Text("...".into()));
    }

    #[tokio::test]
    async fn multi_line_input_is_one_submission() {
        let tmp = tempfile::tempdir().unwrap();
        let mut app = app(vec![Ok("```html\n<p>hi</p>\n```".into())], tmp.path().to_path_buf());

        let script = "a portfolio page\nwith a contact form\n.\n:quit\n";
        run(&mut app, Cursor::new(script)).await.unwrap();

        assert_eq!(app.session.messages.len(), 3);
        let user = &app.session.messages.messages()[1].content;
        assert!(user.contains("a portfolio page\nwith a contact form"));
        let paths = app.preview.as_ref().unwrap();
        assert_eq!(std::fs::read_to_string(&paths.page).unwrap(), "<p>hi</p>");
    }

    #[tokio::test]
    async fn invalid_utf8_line_is_kept_as_text() {
        let tmp = tempfile::tempdir().unwrap();
        let mut app = app(vec![Ok("```html\n<p>café</p>\n```".into())], tmp.path().to_path_buf());

        run(&mut app, Cursor::new(&b"caf\xe9 page\na page\n.\n"[..])).await.unwrap();

        assert_eq!(app.session.messages.len(), 3);
        let user = &app.session.messages.messages()[1].content;
        assert!(user.contains("caf\u{FFFD} page\na page"));
        assert_eq!(app.session.code.as_deref(), Some("<p>café</p>"));
    }

    #[tokio::test]
    async fn failures_keep_going() {
        let tmp = tempfile::tempdir().unwrap();
        let mut app = app(
            vec![
                Err(anyhow::anyhow!("timed out")),
                Ok("no code here".into()),
                Ok("```html\n<p>ok</p>\n```".into()),
            ],
            tmp.path().to_path_buf(),
        );

        run(&mut app, Cursor::new("x\n.\nx\n.\nx\n.\n")).await.unwrap();
        assert_eq!(app.session.messages.len(), 3);
        assert_eq!(app.session.code.as_deref(), Some("<p>ok</p>"));
    }

    #[tokio::test]
    async fn reset_checkbox_is_sticky_and_wins() {
        let tmp = tempfile::tempdir().unwrap();
        let block = || Ok::<_, anyhow::Error>("```html\n<p/>\n```".to_string());
        let mut app = app(vec![block(), block(), block(), block()], tmp.path().to_path_buf());

        app.handle(Line::Text("first".into())).await;
        app.handle(Line::Command(Command::Submit)).await;
        assert_eq!(app.session.messages.len(), 3);

        app.handle(Line::Command(Command::Reset(Some(true)))).await;
        app.handle(Line::Command(Command::Submit)).await;
        assert_eq!(app.session.messages.len(), 3);
        app.handle(Line::Command(Command::Submit)).await;
        assert_eq!(app.session.messages.len(), 3);

        app.handle(Line::Command(Command::Reset(None))).await;
        assert!(!app.reset_checkbox);
        app.handle(Line::Command(Command::Submit)).await;
        assert_eq!(app.session.messages.len(), 5);
    }

    #[tokio::test]
    async fn toggle_needs_code() {
        let tmp = tempfile::tempdir().unwrap();
        let mut app = app(vec![], tmp.path().to_path_buf());
        app.handle(Line::Command(Command::Toggle)).await;
        assert!(!app.session.show_code);
    }
}
