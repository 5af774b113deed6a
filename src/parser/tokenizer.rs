/*!
 * Tokenizer
 * Single pass scanner turning a command line into a pipeline
 */

use super::types::{ParseLimits, Pipeline, Stage};
use std::mem;
use std::path::PathBuf;

const PIPE: char = '|';
const BACKGROUND: char = '&';
const RESPAWN: &str = "+";
const REDIRECT: &str = ">";

pub(crate) fn scan(input: &str, limits: ParseLimits) -> Pipeline {
    let line = truncate(input.trim_end_matches(['\n', '\r']), limits.max_line);
    let mut pipeline = Pipeline::default();
    let mut tokens: Vec<String> = Vec::new();
    let mut chars = line.char_indices().peekable();

    while let Some(&(start, c)) = chars.peek() {
        match c {
            c if c.is_whitespace() => {
                chars.next();
            }
            PIPE => {
                chars.next();
                pipeline.stages.push(Stage::from_tokens(mem::take(&mut tokens)));
            }
            BACKGROUND => {
                pipeline.background = true;
                break;
            }
            '\'' | '"' => {
                chars.next();
                // Quotes stay in the token; an unclosed quote runs to end of line
                let mut end = line.len();
                for (i, q) in chars.by_ref() {
                    if q == c {
                        end = i + q.len_utf8();
                        break;
                    }
                }
                push_token(&mut tokens, &line[start..end], limits.max_args);
            }
            _ => {
                let mut end = line.len();
                while let Some(&(i, ch)) = chars.peek() {
                    if ch.is_whitespace() || ch == PIPE || ch == BACKGROUND {
                        end = i;
                        break;
                    }
                    chars.next();
                }
                let word = &line[start..end];
                if word == RESPAWN {
                    pipeline.background = true;
                    pipeline.respawnable = true;
                    break;
                }
                push_token(&mut tokens, word, limits.max_args);
            }
        }
    }

    pipeline.redirect = take_redirect(&mut tokens);
    pipeline.stages.push(Stage::from_tokens(tokens));
    pipeline
}

fn push_token(tokens: &mut Vec<String>, token: &str, max_args: usize) {
    if tokens.len() < max_args {
        tokens.push(token.to_string());
    }
}

/// Strips a trailing `> file` pair from the final stage
fn take_redirect(tokens: &mut Vec<String>) -> Option<PathBuf> {
    let n = tokens.len();
    if n >= 2 && tokens[n - 2] == REDIRECT {
        let target = tokens.pop().map(PathBuf::from);
        tokens.pop();
        target
    } else {
        None
    }
}

fn truncate(line: &str, max: usize) -> &str {
    if line.len() <= max {
        return line;
    }
    let mut cut = max;
    while !line.is_char_boundary(cut) {
        cut -= 1;
    }
    &line[..cut]
}
