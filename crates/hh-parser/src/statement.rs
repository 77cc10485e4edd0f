use std::sync::OnceLock;

use regex::Regex;

use crate::source::is_loop_header;
use crate::split::split_top_level;

/// Module name accepted by `import`.
pub const GAME_MODULE: &str = "hippogame";

pub const COMMAND_KEYWORDS: &[&str] = &[
    "import",
    "print",
    "set_color",
    "draw_circle",
    "draw_rect",
    "draw_text",
    "move",
    "if_key",
    "sleep",
    "update",
    "clear",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    pub name: String,
    pub value: String,
}

/// One classified source line. Numeric arguments stay as expression text and
/// are evaluated at execution time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Statement {
    Empty,
    LoopHeader,
    ImportGame,
    Assign(Vec<Assignment>),
    Print {
        expr: String,
    },
    SetColor {
        name: String,
    },
    DrawCircle {
        id: String,
        x: String,
        y: String,
        radius: String,
    },
    DrawRect {
        id: String,
        x: String,
        y: String,
        width: String,
        height: String,
    },
    DrawText {
        id: String,
        x: String,
        y: String,
        text: String,
    },
    Move {
        id: String,
        dx: String,
        dy: String,
    },
    IfKey {
        key: String,
        body: Box<Statement>,
    },
    Sleep {
        seconds: String,
    },
    Update,
    Clear,
    Malformed {
        keyword: &'static str,
        raw: String,
    },
    Unknown {
        raw: String,
    },
}

impl Statement {
    pub fn is_noop(&self) -> bool {
        matches!(
            self,
            Self::Empty | Self::LoopHeader | Self::Malformed { .. } | Self::Unknown { .. }
        )
    }
}

fn identifier_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| {
        Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("identifier regex must compile")
    })
}

pub fn is_identifier(text: &str) -> bool {
    identifier_regex().is_match(text)
}

/// Splits `a = 1, b = "x, y"` into pairs. Pairs without `=` or with an
/// invalid name are dropped.
pub fn parse_assignments(line: &str) -> Vec<Assignment> {
    split_top_level(line, ',')
        .into_iter()
        .filter_map(|part| {
            let (name, value) = part.split_once('=')?;
            let name = name.trim();
            if !is_identifier(name) {
                return None;
            }
            Some(Assignment {
                name: name.to_string(),
                value: value.trim().to_string(),
            })
        })
        .collect()
}

fn split_keyword(line: &str) -> (&str, &str) {
    match line.find(char::is_whitespace) {
        Some(index) => (&line[..index], line[index..].trim_start()),
        None => (line, ""),
    }
}

/// Takes `count` whitespace-separated words and returns them with the
/// untouched remainder.
fn take_words(text: &str, count: usize) -> Option<(Vec<&str>, &str)> {
    let mut words = Vec::with_capacity(count);
    let mut rest = text.trim_start();
    for _ in 0..count {
        if rest.is_empty() {
            return None;
        }
        let (word, tail) = split_keyword(rest);
        words.push(word);
        rest = tail;
    }
    Some((words, rest))
}

fn malformed(keyword: &'static str, raw: &str) -> Statement {
    Statement::Malformed {
        keyword,
        raw: raw.to_string(),
    }
}

pub fn classify_line(line: &str) -> Statement {
    let line = line.trim();
    if line.is_empty() {
        return Statement::Empty;
    }
    if is_loop_header(line) {
        return Statement::LoopHeader;
    }

    let (keyword, rest) = split_keyword(line);
    if let Some(&keyword) = COMMAND_KEYWORDS.iter().find(|known| **known == keyword) {
        if !rest.starts_with('=') {
            return classify_command(keyword, rest, line);
        }
    }

    if line.contains('=') {
        let assignments = parse_assignments(line);
        if assignments.is_empty() {
            return malformed("assignment", line);
        }
        return Statement::Assign(assignments);
    }

    Statement::Unknown {
        raw: line.to_string(),
    }
}

fn classify_command(keyword: &'static str, rest: &str, line: &str) -> Statement {
    match keyword {
        "import" => match split_keyword(rest).0 {
            GAME_MODULE => Statement::ImportGame,
            _ => Statement::Unknown {
                raw: line.to_string(),
            },
        },
        "print" => Statement::Print {
            expr: rest.to_string(),
        },
        "set_color" => match take_words(rest, 1) {
            Some((words, _)) => Statement::SetColor {
                name: words[0].to_string(),
            },
            None => malformed(keyword, line),
        },
        "draw_circle" => match take_words(rest, 4) {
            Some((words, _)) => Statement::DrawCircle {
                id: words[0].to_string(),
                x: words[1].to_string(),
                y: words[2].to_string(),
                radius: words[3].to_string(),
            },
            None => malformed(keyword, line),
        },
        "draw_rect" => match take_words(rest, 5) {
            Some((words, _)) => Statement::DrawRect {
                id: words[0].to_string(),
                x: words[1].to_string(),
                y: words[2].to_string(),
                width: words[3].to_string(),
                height: words[4].to_string(),
            },
            None => malformed(keyword, line),
        },
        "draw_text" => match take_words(rest, 3) {
            Some((words, text)) => Statement::DrawText {
                id: words[0].to_string(),
                x: words[1].to_string(),
                y: words[2].to_string(),
                text: text.trim().to_string(),
            },
            None => malformed(keyword, line),
        },
        "move" => match take_words(rest, 3) {
            Some((words, _)) => Statement::Move {
                id: words[0].to_string(),
                dx: words[1].to_string(),
                dy: words[2].to_string(),
            },
            None => malformed(keyword, line),
        },
        "if_key" => match take_words(rest, 1) {
            Some((words, body)) => Statement::IfKey {
                key: words[0].to_string(),
                body: Box::new(classify_line(body)),
            },
            None => malformed(keyword, line),
        },
        "sleep" => {
            if rest.is_empty() {
                malformed(keyword, line)
            } else {
                Statement::Sleep {
                    seconds: rest.to_string(),
                }
            }
        }
        "update" => Statement::Update,
        "clear" => Statement::Clear,
        _ => Statement::Unknown {
            raw: line.to_string(),
        },
    }
}
