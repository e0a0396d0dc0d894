//! Comments and doc comment groups.

/// A single `//` or `/* */` comment, markers included
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comment {
    pub text: String,
    pub start: usize,
    pub end: usize,
    pub start_line: usize,
    pub end_line: usize,

    /// No token precedes the comment on its first line
    pub own_line: bool,
}

/// Adjacent comments with no blank line and no token between them
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommentGroup {
    pub comments: Vec<Comment>,
}

impl CommentGroup {
    pub fn start(&self) -> usize {
        self.comments.first().map(|c| c.start).unwrap_or_default()
    }

    pub fn end(&self) -> usize {
        self.comments.last().map(|c| c.end).unwrap_or_default()
    }

    pub fn end_line(&self) -> usize {
        self.comments.last().map(|c| c.end_line).unwrap_or_default()
    }

    /// Text of the group with comment markers removed.
    ///
    /// The first space of line comments, directive comments, trailing spaces
    /// and leading blank lines are dropped, runs of blank lines collapse into
    /// one, and a non-empty result ends with a newline.
    pub fn text(&self) -> String {
        let mut lines: Vec<String> = Vec::new();

        for comment in &self.comments {
            let body = if let Some(line) = comment.text.strip_prefix("//") {
                if let Some(rest) = line.strip_prefix(' ') {
                    rest
                } else if is_directive(line) {
                    continue;
                } else {
                    line
                }
            } else {
                comment
                    .text
                    .strip_prefix("/*")
                    .and_then(|c| c.strip_suffix("*/"))
                    .unwrap_or(&comment.text)
            };

            for line in body.split('\n') {
                lines.push(line.trim_end().to_string());
            }
        }

        let mut kept: Vec<String> = Vec::with_capacity(lines.len());
        for line in lines {
            let previous_blank = kept.last().map(|l| l.is_empty()).unwrap_or(true);
            if !line.is_empty() || !previous_blank {
                kept.push(line);
            }
        }

        if kept.last().map(|l| !l.is_empty()).unwrap_or(false) {
            kept.push(String::new());
        }

        kept.join("\n")
    }
}

/// `//go:generate`, `//line`, `//export` and friends
fn is_directive(comment: &str) -> bool {
    if comment.starts_with("line ") || comment.starts_with("extern ") || comment.starts_with("export ") {
        return true;
    }

    let Some(colon) = comment.find(':') else {
        return false;
    };
    if colon == 0 || colon + 1 >= comment.len() {
        return false;
    }

    let prefix_ok = comment[..colon]
        .bytes()
        .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit());
    let next = comment.as_bytes()[colon + 1];
    prefix_ok && (next.is_ascii_lowercase() || next.is_ascii_digit())
}

/// Group comments that touch each other and are not separated by tokens.
///
/// `token_between` reports whether any token lies in the given byte range.
pub fn group_comments(comments: Vec<Comment>, token_between: impl Fn(usize, usize) -> bool) -> Vec<CommentGroup> {
    let mut groups: Vec<CommentGroup> = Vec::new();

    for comment in comments {
        let joins = match groups.last().and_then(|g| g.comments.last()) {
            Some(previous) => {
                comment.own_line
                    && comment.start_line <= previous.end_line + 1
                    && !token_between(previous.end, comment.start)
            }
            None => false,
        };

        if joins {
            if let Some(group) = groups.last_mut() {
                group.comments.push(comment);
            }
        } else {
            groups.push(CommentGroup {
                comments: vec![comment],
            });
        }
    }

    groups
}
