//! String-expression subgrammar used for `Group(...)` and route path arguments.
//!
//! Both extractors lower their argument into an [`Expr`]; [`evaluate`] then
//! folds it to a constant string, or `None` when the value depends on
//! anything other than string literals joined with `+`.

/// Lowered argument expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
    /// Decoded contents of a string literal.
    Str(String),
    /// `left + right`.
    Concat(Box<Expr>, Box<Expr>),
    /// Any other shape; keeps the source text for diagnostics.
    Opaque(String),
}

impl Expr {
    pub fn concat(left: Expr, right: Expr) -> Self {
        Expr::Concat(Box::new(left), Box::new(right))
    }

    /// Lower raw argument text (as cut out by the lexical scanner).
    pub fn parse(text: &str) -> Self {
        let opaque = || Expr::Opaque(text.trim().to_string());
        let Some(tokens) = tokenize(text) else {
            return opaque();
        };
        let mut parser = TokenParser { tokens, pos: 0 };
        match parser.sum() {
            Some(expr) if parser.pos == parser.tokens.len() => expr,
            _ => opaque(),
        }
    }

    /// Lower a single Go string literal token, quotes included.
    pub fn literal(raw: &str) -> Self {
        match unquote_go_string(raw) {
            Some(value) => Expr::Str(value),
            None => Expr::Opaque(raw.to_string()),
        }
    }
}

/// Constant value of `expr`, evaluating concatenations left operand first.
pub fn evaluate(expr: &Expr) -> Option<String> {
    match expr {
        Expr::Str(value) => Some(value.clone()),
        Expr::Concat(left, right) => {
            let mut value = evaluate(left)?;
            value.push_str(&evaluate(right)?);
            Some(value)
        }
        Expr::Opaque(_) => None,
    }
}

/// Decode an interpreted (`"..."`) or raw (`` `...` ``) Go string literal.
pub fn unquote_go_string(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.len() < 2 {
        return None;
    }
    if trimmed.starts_with('`') && trimmed.ends_with('`') {
        // Carriage returns are discarded from raw string values.
        return Some(trimmed[1..trimmed.len() - 1].replace('\r', ""));
    }
    if trimmed.starts_with('"') && trimmed.ends_with('"') {
        return decode_interpreted(&trimmed[1..trimmed.len() - 1]);
    }
    None
}

fn decode_interpreted(body: &str) -> Option<String> {
    let mut bytes = Vec::with_capacity(body.len());
    let mut chars = body.chars();
    while let Some(ch) = chars.next() {
        if ch != '\\' {
            let mut buf = [0u8; 4];
            bytes.extend_from_slice(ch.encode_utf8(&mut buf).as_bytes());
            continue;
        }
        match chars.next()? {
            'a' => bytes.push(0x07),
            'b' => bytes.push(0x08),
            'f' => bytes.push(0x0c),
            'n' => bytes.push(b'\n'),
            'r' => bytes.push(b'\r'),
            't' => bytes.push(b'\t'),
            'v' => bytes.push(0x0b),
            '\\' => bytes.push(b'\\'),
            '"' => bytes.push(b'"'),
            'x' => {
                let value = read_digits(&mut chars, 2, 16)?;
                bytes.push(u8::try_from(value).ok()?);
            }
            'u' => push_char(&mut bytes, read_digits(&mut chars, 4, 16)?)?,
            'U' => push_char(&mut bytes, read_digits(&mut chars, 8, 16)?)?,
            first @ '0'..='7' => {
                let rest = read_digits(&mut chars, 2, 8)?;
                let value = first.to_digit(8)? * 64 + rest;
                bytes.push(u8::try_from(value).ok()?);
            }
            _ => return None,
        }
    }
    String::from_utf8(bytes).ok()
}

fn read_digits(chars: &mut std::str::Chars<'_>, count: usize, radix: u32) -> Option<u32> {
    let mut value = 0u32;
    for _ in 0..count {
        let digit = chars.next()?.to_digit(radix)?;
        value = value * radix + digit;
    }
    Some(value)
}

fn push_char(bytes: &mut Vec<u8>, code: u32) -> Option<()> {
    let ch = char::from_u32(code)?;
    let mut buf = [0u8; 4];
    bytes.extend_from_slice(ch.encode_utf8(&mut buf).as_bytes());
    Some(())
}

#[derive(Debug)]
enum Token {
    Literal(Expr),
    Plus,
    Open,
    Close,
}

fn tokenize(text: &str) -> Option<Vec<Token>> {
    let mut tokens = Vec::new();
    let mut rest = text;
    loop {
        rest = rest.trim_start();
        if let Some(comment) = rest.strip_prefix("//") {
            rest = comment.find('\n').map_or("", |end| &comment[end..]);
            continue;
        }
        if let Some(comment) = rest.strip_prefix("/*") {
            rest = &comment[comment.find("*/")? + 2..];
            continue;
        }
        let Some(ch) = rest.chars().next() else {
            return Some(tokens);
        };
        let len = match ch {
            '"' | '`' => {
                let len = literal_len(rest)?;
                tokens.push(Token::Literal(Expr::literal(&rest[..len])));
                len
            }
            '+' => {
                tokens.push(Token::Plus);
                1
            }
            '(' => {
                tokens.push(Token::Open);
                1
            }
            ')' => {
                tokens.push(Token::Close);
                1
            }
            _ => return None,
        };
        rest = &rest[len..];
    }
}

/// Byte length of the string literal at the start of `text`, quotes included.
pub(crate) fn literal_len(text: &str) -> Option<usize> {
    let mut iter = text.char_indices();
    let (_, quote) = iter.next()?;
    // Interpreted strings and rune literals take escapes and end at the line.
    let interpreted = quote != '`';
    let mut escaped = false;
    for (idx, ch) in iter {
        if interpreted && escaped {
            escaped = false;
            continue;
        }
        if interpreted && ch == '\\' {
            escaped = true;
            continue;
        }
        if interpreted && ch == '\n' {
            return None;
        }
        if ch == quote {
            return Some(idx + ch.len_utf8());
        }
    }
    None
}

struct TokenParser {
    tokens: Vec<Token>,
    pos: usize,
}

impl TokenParser {
    fn sum(&mut self) -> Option<Expr> {
        let mut expr = self.term()?;
        while matches!(self.tokens.get(self.pos), Some(Token::Plus)) {
            self.pos += 1;
            let right = self.term()?;
            expr = Expr::concat(expr, right);
        }
        Some(expr)
    }

    fn term(&mut self) -> Option<Expr> {
        match self.tokens.get_mut(self.pos)? {
            Token::Literal(expr) => {
                let expr = std::mem::replace(expr, Expr::Opaque(String::new()));
                self.pos += 1;
                Some(expr)
            }
            Token::Open => {
                self.pos += 1;
                let inner = self.sum()?;
                match self.tokens.get(self.pos) {
                    Some(Token::Close) => {
                        self.pos += 1;
                        Some(inner)
                    }
                    _ => None,
                }
            }
            Token::Plus | Token::Close => None,
        }
    }
}
