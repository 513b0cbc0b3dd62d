use regex::Regex;
use std::sync::OnceLock;

use crate::errors::GenError;

/// The one code block found in a reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extracted {
    /// Language tag after the opening fence, empty when absent.
    pub language: String,
    pub code: String,
}

fn fence_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    // opening fence + optional tag, newline, lazy body, newline, closing fence
    RE.get_or_init(|| Regex::new(r"```(\w*)\n((?s:.*?))\n```").expect("fence pattern is valid"))
}

/// Return the body of the single fenced block in `text`.
///
/// Zero blocks or several blocks are both a hard failure; nothing is merged
/// and no block is preferred over another.
pub fn extract_single_block(text: &str) -> Result<Extracted, GenError> {
    let mut found = fence_regex().captures_iter(text);
    let first = found.next();
    let rest = found.count();

    match first {
        Some(caps) if rest == 0 => {
            let language = caps.get(1).map(|m| m.as_str()).unwrap_or_default().to_string();
            let code = caps.get(2).map(|m| m.as_str()).unwrap_or_default().to_string();
            let tag = if language.is_empty() { "untagged" } else { language.as_str() };
            log::debug!("extracted one {} block ({} bytes)", tag, code.len());
            Ok(Extracted { language, code })
        }
        Some(_) => Err(GenError::Extraction { found: rest + 1 }),
        None => Err(GenError::Extraction { found: 0 }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_block_body_is_exact() {
        let body = "<!DOCTYPE html>\n<html>\n  <body>\t<p>hi</p>  \n\n  </body>\n</html>";
        let reply = format!("Here is your page:\n\n```html\n{body}\n```\n\nEnjoy!");
        let got = extract_single_block(&reply).unwrap();
        assert_eq!(got.code, body);
        assert_eq!(got.language, "html");
    }

    #[test]
    fn untagged_block_is_accepted() {
        let got = extract_single_block("```\n<p>x</p>\n```").unwrap();
        assert_eq!(got.language, "");
        assert_eq!(got.code, "<p>x</p>");
    }

    #[test]
    fn no_block_fails() {
        let err = extract_single_block("I cannot help with that.").unwrap_err();
        assert!(matches!(err, GenError::Extraction { found: 0 }));
    }

    #[test]
    fn two_blocks_fail() {
        let reply = "```html\n<html></html>\n```\nand a stylesheet\n```css\nbody{}\n```";
        let err = extract_single_block(reply).unwrap_err();
        assert!(matches!(err, GenError::Extraction { found: 2 }));
        assert_eq!(err.to_string(), "ambiguous or missing code block (found 2)");
    }

    #[test]
    fn fence_without_newline_before_close_is_not_a_block() {
        // body must end with a newline before the closing fence
        let err = extract_single_block("```html\n<p>x</p>```").unwrap_err();
        assert!(matches!(err, GenError::Extraction { found: 0 }));
    }

    #[test]
    fn backticks_inside_body_end_the_block_early() {
        // lazy body: the first "\n```" closes it, the trailing fence is left over
        let reply = "```md\nline\n```\ninner\n```";
        assert_eq!(extract_single_block(reply).unwrap().code, "line");
    }
}
