use super::description::{MappingDescription, SourceExpr};
use super::lexer::{Token, tokenize};
use crate::core::{MapperError, Result};

/// Method names that turn a member read into a collection projection.
const PROJECTIONS: &[&str] = &[
    "iter",
    "iter_mut",
    "into_iter",
    "map",
    "filter",
    "filter_map",
    "flat_map",
    "collect",
    "select",
];

pub(crate) fn parse_description(text: &str) -> Result<MappingDescription> {
    let tokens = tokenize(text)?;
    Parser { tokens, pos: 0 }.description()
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn description(&mut self) -> Result<MappingDescription> {
        self.expect_punct("|")?;
        let param = self.ident("source parameter")?;
        let param_type = if self.eat_punct(":") {
            Some(self.type_path()?)
        } else {
            None
        };
        self.expect_punct("|")?;

        let target = self.type_path()?;
        self.expect_punct("{")?;

        let mut description = MappingDescription::new(&param, &target);
        if let Some(type_name) = param_type {
            description = description.param_type(&type_name);
        }

        loop {
            if self.eat_punct("}") {
                break;
            }
            if self.peek_is_punct(".") {
                return Err(MapperError::unsupported(
                    "struct update syntax `..` is not supported",
                ));
            }

            let member = self.ident("member name")?;
            if !self.eat_punct(":") {
                return Err(MapperError::unsupported(format!(
                    "member '{}' has no assigned expression",
                    member
                )));
            }

            let expr = self.expression(&member)?;
            description = description.assign(&member, expr);

            if self.eat_punct(",") {
                continue;
            }
            self.expect_punct("}")?;
            break;
        }

        if let Some(token) = self.peek() {
            return Err(MapperError::unsupported(format!(
                "unexpected `{}` after the constructed value",
                token.text()
            )));
        }

        Ok(description)
    }

    /// Tokens up to the next top-level `,` or closing `}`.
    fn expression(&mut self, member: &str) -> Result<SourceExpr> {
        let start = self.pos;
        let mut depth = 0usize;

        while let Some(token) = self.peek() {
            if depth == 0 && (token.is_punct(",") || token.is_punct("}")) {
                break;
            }
            if token.is_punct("(") || token.is_punct("[") || token.is_punct("{") {
                depth += 1;
            } else if token.is_punct(")") || token.is_punct("]") || token.is_punct("}") {
                depth = depth.saturating_sub(1);
            }
            self.pos += 1;
        }

        if self.pos >= self.tokens.len() {
            return Err(MapperError::unsupported(format!(
                "unterminated expression for member '{}'",
                member
            )));
        }
        if self.pos == start {
            return Err(MapperError::unsupported(format!(
                "member '{}' has no assigned expression",
                member
            )));
        }

        Ok(classify(&self.tokens[start..self.pos]))
    }

    /// `Ident (:: Ident)*`
    fn type_path(&mut self) -> Result<String> {
        let mut path = self.ident("type name")?;
        while self.eat_punct("::") {
            path.push_str("::");
            path.push_str(&self.ident("type name")?);
        }
        if self.peek_is_punct("<") {
            return Err(MapperError::unsupported(format!(
                "generic type `{}<..>` is not supported",
                path
            )));
        }
        Ok(path)
    }

    fn ident(&mut self, what: &str) -> Result<String> {
        match self.peek() {
            Some(Token::Ident(name)) => {
                let name = name.clone();
                self.pos += 1;
                Ok(name)
            }
            Some(other) => Err(MapperError::unsupported(format!(
                "expected {} but found `{}`",
                what,
                other.text()
            ))),
            None => Err(MapperError::unsupported(format!(
                "expected {} but the description ended",
                what
            ))),
        }
    }

    fn expect_punct(&mut self, punct: &str) -> Result<()> {
        if self.eat_punct(punct) {
            return Ok(());
        }
        let found = self
            .peek()
            .map(|token| format!("`{}`", token.text()))
            .unwrap_or_else(|| "end of input".to_string());
        Err(MapperError::unsupported(format!(
            "expected `{}` but found {}",
            punct, found
        )))
    }

    fn eat_punct(&mut self, punct: &str) -> bool {
        if self.peek_is_punct(punct) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn peek_is_punct(&self, punct: &str) -> bool {
        self.peek().is_some_and(|token| token.is_punct(punct))
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }
}

fn classify(tokens: &[Token]) -> SourceExpr {
    let Some(first) = tokens.first() else {
        return SourceExpr::Operation(String::new());
    };

    if first.is_ident("if") || first.is_ident("match") || tokens.iter().any(|t| t.is_punct("?")) {
        return SourceExpr::Conditional;
    }
    for (index, window) in tokens.windows(2).enumerate() {
        let Token::Ident(name) = &window[0] else {
            continue;
        };

        if window[1].is_punct("!") {
            return SourceExpr::Call(format!("{}!", name));
        }
        if !window[1].is_punct("(") {
            continue;
        }

        let is_method = index > 0 && tokens[index - 1].is_punct(".");
        if !is_method {
            return SourceExpr::Call(name.clone());
        }
        let trailing_clone = name == "clone"
            && index >= 2
            && index + 3 == tokens.len()
            && tokens[index + 2].is_punct(")");
        if trailing_clone {
            return classify(&tokens[..index - 1]);
        }
        if PROJECTIONS.contains(&name.as_str()) {
            return SourceExpr::Projection;
        }
        return SourceExpr::MethodCall(name.clone());
    }

    if tokens.iter().any(|t| t.is_punct("|") || t.is_punct("||")) {
        return SourceExpr::Closure;
    }
    if tokens.iter().any(|t| t.is_punct("[")) {
        return SourceExpr::Projection;
    }
    if tokens.iter().any(|t| t.is_punct("{")) {
        return SourceExpr::Construct(first.text().to_string());
    }

    if let Some(expr) = member_path(tokens) {
        return expr;
    }

    match tokens {
        [Token::Number(text)] | [Token::Str(text)] => SourceExpr::Literal(text.clone()),
        [Token::Ident(word)] if word == "true" || word == "false" => {
            SourceExpr::Literal(word.clone())
        }
        _ => SourceExpr::Operation(
            tokens
                .iter()
                .map(Token::text)
                .collect::<Vec<_>>()
                .join(" "),
        ),
    }
}

/// `root (. member)*`
fn member_path(tokens: &[Token]) -> Option<SourceExpr> {
    let Token::Ident(root) = tokens.first()? else {
        return None;
    };
    if root == "true" || root == "false" || tokens.len() % 2 == 0 {
        return None;
    }

    let mut path = Vec::new();
    for pair in tokens[1..].chunks(2) {
        match pair {
            [dot, Token::Ident(member)] if dot.is_punct(".") => path.push(member.clone()),
            _ => return None,
        }
    }

    Some(SourceExpr::Member {
        root: root.clone(),
        path,
    })
}
