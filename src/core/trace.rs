// logwhence - core/trace.rs
//
// Parse JVM-style textual stack traces into `Throwable` chains.
//
// log4j transports throwables as their string representation (one entry per
// line), so attribution over such events needs the frames back:
//
//   java.lang.IllegalStateException: boom
//   	at app.Worker.run(Worker.java:31)
//   	at java.base/java.lang.Thread.run(Thread.java:833)
//   Caused by: java.io.IOException: disk gone
//   	at app.Store.save(Store.java:10)
//   	... 2 more
//
// Lines that match nothing are ignored. `Suppressed:` blocks are skipped up
// to the next top-level `Caused by:`.

use crate::core::model::{StackFrame, Throwable};
use crate::util::constants::MAX_CAUSE_DEPTH;
use regex::Regex;
use std::sync::OnceLock;

fn frame_regex() -> &'static Regex {
    static FRAME: OnceLock<Regex> = OnceLock::new();
    FRAME.get_or_init(|| {
        Regex::new(
            r"^\s*at\s+(?:[\w.$-]+/(?:[\w.$-]+(?:@[\w.-]+)?)?/|[\w.$-]+(?:@[\w.-]+)?/)?(?P<owner>[\w$.]+)\.(?P<method>[\w$<>-]+)\((?P<loc>[^)]*)\)",
        )
        .expect("frame pattern is valid and should always compile")
    })
}

/// Parse one `at owner.method(File.java:N)` line.
pub fn parse_frame(line: &str) -> Option<StackFrame> {
    let caps = frame_regex().captures(line)?;
    let owner = caps.name("owner")?.as_str();
    let method = caps.name("method")?.as_str();
    let loc = caps.name("loc").map_or("", |m| m.as_str());

    let (file, line_number) = match loc {
        "" | "Native Method" | "Unknown Source" => (None, 0),
        _ => match loc.rsplit_once(':') {
            Some((file, n)) => (Some(file), n.parse().unwrap_or(0)),
            None => (Some(loc), 0),
        },
    };
    Some(StackFrame::new(owner, method, file, line_number))
}

/// Split a `Type: message` header.
fn parse_header(line: &str) -> (String, Option<String>) {
    match line.split_once(": ") {
        Some((type_name, message)) => (type_name.trim().to_string(), Some(message.to_string())),
        None => {
            let trimmed = line.trim().trim_end_matches(':');
            (trimmed.to_string(), None)
        }
    }
}

/// Parse a textual trace given as individual lines.
///
/// Returns `None` when the first meaningful line is not an exception header.
pub fn parse_lines<S: AsRef<str>>(lines: &[S]) -> Option<Throwable> {
    let mut links: Vec<Throwable> = Vec::new();
    let mut in_suppressed = false;

    for raw in lines {
        let line = raw.as_ref();
        if line.trim().is_empty() {
            continue;
        }
        let top_level = !line.starts_with(char::is_whitespace);

        if let Some(rest) = line.strip_prefix("Caused by:") {
            if links.len() >= MAX_CAUSE_DEPTH {
                break;
            }
            in_suppressed = false;
            let (type_name, message) = parse_header(rest.trim_start());
            links.push(Throwable {
                type_name,
                message,
                frames: Vec::new(),
                cause: None,
            });
            continue;
        }
        if in_suppressed {
            continue;
        }
        if line.trim_start().starts_with("Suppressed:") {
            in_suppressed = true;
            continue;
        }
        if let Some(frame) = parse_frame(line) {
            if let Some(current) = links.last_mut() {
                current.frames.push(frame);
            }
            continue;
        }
        if links.is_empty() && top_level {
            let (type_name, message) = parse_header(line);
            links.push(Throwable {
                type_name,
                message,
                frames: Vec::new(),
                cause: None,
            });
        }
        // "... N more" and message continuation lines carry no frames.
    }

    links.into_iter().rev().fold(None, |inner, mut link| {
        link.cause = inner.map(Box::new);
        Some(link)
    })
}

/// Parse a textual trace held in one string.
pub fn parse(text: &str) -> Option<Throwable> {
    let lines: Vec<&str> = text.lines().collect();
    parse_lines(&lines)
}
