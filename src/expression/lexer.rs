use crate::core::{MapperError, Result};
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref TOKEN: Regex = Regex::new(concat!(
        r"^(?:(?P<ws>\s+)",
        r"|(?P<ident>[A-Za-z_][A-Za-z0-9_]*)",
        r"|(?P<number>[0-9][0-9_]*(?:\.[0-9][0-9_]*)?)",
        r#"|(?P<string>"(?:[^"\\]|\\.)*")"#,
        r"|(?P<punct>::|=>|->|&&|\|\||==|!=|<=|>=|[|{}()\[\],.:?;=<>!+\-*/&%#@']))",
    ))
    .expect("token pattern is valid");
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Token {
    Ident(String),
    Number(String),
    Str(String),
    Punct(String),
}

impl Token {
    pub(crate) fn is_punct(&self, text: &str) -> bool {
        matches!(self, Token::Punct(p) if p == text)
    }

    pub(crate) fn is_ident(&self, text: &str) -> bool {
        matches!(self, Token::Ident(i) if i == text)
    }

    pub(crate) fn text(&self) -> &str {
        match self {
            Token::Ident(s) | Token::Number(s) | Token::Str(s) | Token::Punct(s) => s,
        }
    }
}

pub(crate) fn tokenize(input: &str) -> Result<Vec<Token>> {
    let mut tokens = Vec::new();
    let mut offset = 0;

    while offset < input.len() {
        let rest = &input[offset..];
        let caps = TOKEN.captures(rest).ok_or_else(|| {
            let found = rest.chars().next().unwrap_or(' ');
            MapperError::unsupported(format!(
                "unexpected character '{}' at offset {}",
                found, offset
            ))
        })?;

        let token = if let Some(m) = caps.name("ident") {
            Some(Token::Ident(m.as_str().to_string()))
        } else if let Some(m) = caps.name("number") {
            Some(Token::Number(m.as_str().to_string()))
        } else if let Some(m) = caps.name("string") {
            Some(Token::Str(m.as_str().to_string()))
        } else {
            caps.name("punct").map(|m| Token::Punct(m.as_str().to_string()))
        };

        if let Some(token) = token {
            tokens.push(token);
        }

        let consumed = caps.get(0).map(|m| m.end()).unwrap_or(0);
        if consumed == 0 {
            return Err(MapperError::unsupported(format!(
                "unreadable input at offset {}",
                offset
            )));
        }
        offset += consumed;
    }

    Ok(tokens)
}
