use anyhow::{anyhow, Context, Result};
use fs_err as fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use tempfile::NamedTempFile;

/// How the generated page is embedded in the preview document.
#[derive(Debug, Clone, Copy)]
pub struct Frame {
    pub height: u32,
    pub scrolling: bool,
}

impl Default for Frame {
    fn default() -> Self {
        Self { height: 800, scrolling: true }
    }
}

#[derive(Debug, Clone)]
pub struct PreviewPaths {
    pub page: PathBuf,
    pub preview: PathBuf,
}

/// Escape text for a double-quoted HTML attribute.
fn escape_attr(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + s.len() / 8);
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}

pub fn preview_document(code: &str, frame: Frame) -> String {
    let scrolling = if frame.scrolling { "yes" } else { "no" };
    let overflow = if frame.scrolling { "auto" } else { "hidden" };
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>Generated website</title>
<style>
  body {{ margin: 0; font-family: sans-serif; background: #f4f4f5; }}
  h1 {{ font-size: 1.1rem; margin: 0; padding: .75rem 1rem; }}
  iframe {{ display: block; width: 100%; border: 0; background: #fff; overflow: {overflow}; }}
</style>
</head>
<body>
<h1>Generated website</h1>
<iframe height="{height}" scrolling="{scrolling}" sandbox="allow-scripts allow-forms allow-popups allow-modals" srcdoc="{srcdoc}"></iframe>
</body>
</html>
"#,
        overflow = overflow,
        height = frame.height,
        scrolling = scrolling,
        srcdoc = escape_attr(code),
    )
}

fn write_atomic(path: &Path, data: &str) -> Result<()> {
    let dir = path.parent().ok_or_else(|| anyhow!("no parent for {}", path.display()))?;
    fs::create_dir_all(dir)?;
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(data.as_bytes())?;
    tmp.persist(path)
        .with_context(|| format!("replacing {}", path.display()))?;
    Ok(())
}

/// Write the raw page and its framed preview into `out_dir`.
pub fn write_preview(out_dir: &Path, code: &str, frame: Frame) -> Result<PreviewPaths> {
    let page = out_dir.join("page.html");
    let preview = out_dir.join("preview.html");
    write_atomic(&page, code)?;
    write_atomic(&preview, &preview_document(code, frame))?;
    log::debug!("preview written to {}", preview.display());
    Ok(PreviewPaths { page, preview })
}

fn opener() -> Option<(PathBuf, Vec<&'static str>)> {
    if cfg!(target_os = "windows") {
        which::which("cmd").ok().map(|p| (p, vec!["/C", "start", ""]))
    } else if cfg!(target_os = "macos") {
        which::which("open").ok().map(|p| (p, vec![]))
    } else {
        which::which("xdg-open").ok().map(|p| (p, vec![]))
    }
}

/// Hand the file to the desktop's default browser. Does not wait for it.
pub fn open_in_browser(path: &Path) -> Result<()> {
    let (program, args) = opener().ok_or_else(|| anyhow!("no browser opener found on PATH"))?;
    Command::new(&program)
        .args(args)
        .arg(path)
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .with_context(|| format!("failed to spawn {}", program.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn srcdoc_is_escaped() {
        let code = r#"<p class="x">a & b</p>"#;
        let doc = preview_document(code, Frame::default());
        assert!(doc.contains(r#"srcdoc="&lt;p class=&quot;x&quot;&gt;a &amp; b&lt;/p&gt;""#));
        assert!(doc.contains(r#"height="800""#));
        assert!(doc.contains(r#"scrolling="yes""#));
    }

    #[test]
    fn scrolling_off() {
        let doc = preview_document("<p/>", Frame { height: 300, scrolling: false });
        assert!(doc.contains(r#"height="300""#));
        assert!(doc.contains(r#"scrolling="no""#));
        assert!(doc.contains("overflow: hidden"));
    }

    #[test]
    fn writes_and_replaces_both_files() {
        let tmp = tempfile::tempdir().unwrap();
        let out = tmp.path().join("preview");

        let paths = write_preview(&out, "<html>one</html>", Frame::default()).unwrap();
        assert_eq!(fs::read_to_string(&paths.page).unwrap(), "<html>one</html>");

        let paths = write_preview(&out, "<html>two</html>", Frame::default()).unwrap();
        assert_eq!(fs::read_to_string(&paths.page).unwrap(), "<html>two</html>");
        assert!(fs::read_to_string(&paths.preview).unwrap().contains("&lt;html&gt;two"));
    }
}
