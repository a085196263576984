//! Formula parser
//!
//! Hand-written lexer plus recursive descent. Precedence, loosest first:
//! `+ -`, then `* / %`, then unary sign, then `^` (right associative).
//! A unary minus applies to the whole power, so `-2^2` is `-4`.

use crate::ast::{BinOp, Expr, UnaryOp};
use reckon_core::EvalError;
use std::fmt;

const MAX_DEPTH: usize = 128;

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Number(f64),
    Str(String),
    Ident(String),
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Caret,
    LeftParen,
    RightParen,
    Comma,
    Eof,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Number(n) => write!(f, "{}", n),
            Token::Str(s) => write!(f, "\"{}\"", s),
            Token::Ident(name) => write!(f, "{}", name),
            Token::Plus => write!(f, "+"),
            Token::Minus => write!(f, "-"),
            Token::Star => write!(f, "*"),
            Token::Slash => write!(f, "/"),
            Token::Percent => write!(f, "%"),
            Token::Caret => write!(f, "^"),
            Token::LeftParen => write!(f, "("),
            Token::RightParen => write!(f, ")"),
            Token::Comma => write!(f, ","),
            Token::Eof => write!(f, "end of input"),
        }
    }
}

/// Token with its byte offset in the source
#[derive(Debug, Clone)]
struct Spanned {
    token: Token,
    offset: usize,
}

struct Lexer<'a> {
    src: &'a str,
    chars: std::iter::Peekable<std::str::CharIndices<'a>>,
}

impl<'a> Lexer<'a> {
    fn new(src: &'a str) -> Self {
        Self { src, chars: src.char_indices().peekable() }
    }

    fn tokenize(mut self) -> Result<Vec<Spanned>, EvalError> {
        let mut tokens = Vec::new();
        loop {
            let tok = self.next_token()?;
            let done = tok.token == Token::Eof;
            tokens.push(tok);
            if done {
                return Ok(tokens);
            }
        }
    }

    fn peek_char(&mut self) -> Option<char> {
        self.chars.peek().map(|&(_, c)| c)
    }

    fn next_token(&mut self) -> Result<Spanned, EvalError> {
        while matches!(self.peek_char(), Some(c) if c.is_whitespace()) {
            self.chars.next();
        }
        let Some(&(offset, ch)) = self.chars.peek() else {
            return Ok(Spanned { token: Token::Eof, offset: self.src.len() });
        };

        let token = match ch {
            '0'..='9' | '.' => self.read_number(offset)?,
            '"' | '\'' => self.read_string(offset, ch)?,
            c if c.is_ascii_alphabetic() || c == '_' => self.read_ident(offset),
            _ => {
                self.chars.next();
                match ch {
                    '+' => Token::Plus,
                    '-' => Token::Minus,
                    '*' => Token::Star,
                    '/' => Token::Slash,
                    '%' => Token::Percent,
                    '^' => Token::Caret,
                    '(' => Token::LeftParen,
                    ')' => Token::RightParen,
                    ',' => Token::Comma,
                    other => return Err(EvalError::parse(offset, format!("unexpected character '{}'", other))),
                }
            }
        };
        Ok(Spanned { token, offset })
    }

    fn consume_while(&mut self, pred: impl Fn(char) -> bool) -> usize {
        let mut end = self.src.len();
        while let Some(&(i, c)) = self.chars.peek() {
            if !pred(c) {
                end = i;
                break;
            }
            self.chars.next();
        }
        end
    }

    fn read_number(&mut self, start: usize) -> Result<Token, EvalError> {
        let mut end = self.consume_while(|c| c.is_ascii_digit());
        if self.peek_char() == Some('.') {
            self.chars.next();
            end = self.consume_while(|c| c.is_ascii_digit());
        }
        // Exponent only when digits follow, so `2e` stays a number then an identifier
        if matches!(self.peek_char(), Some('e' | 'E')) {
            let rest = &self.src[end..];
            let mut it = rest.chars().skip(1);
            let sign_len = match it.next() {
                Some('+' | '-') => 1,
                _ => 0,
            };
            if rest[1 + sign_len..].starts_with(|c: char| c.is_ascii_digit()) {
                self.chars.next();
                if sign_len == 1 {
                    self.chars.next();
                }
                end = self.consume_while(|c| c.is_ascii_digit());
            }
        }

        let text = &self.src[start..end];
        if !text.bytes().any(|b| b.is_ascii_digit()) {
            return Err(EvalError::parse(start, "expected digits"));
        }
        match text.parse::<f64>() {
            Ok(n) if n.is_finite() => Ok(Token::Number(n)),
            _ => Err(EvalError::parse(start, format!("invalid number '{}'", text))),
        }
    }

    fn read_string(&mut self, start: usize, quote: char) -> Result<Token, EvalError> {
        self.chars.next();
        let mut s = String::new();
        while let Some((_, c)) = self.chars.next() {
            match c {
                c if c == quote => return Ok(Token::Str(s)),
                '\\' => match self.chars.next() {
                    Some((_, esc)) => s.push(esc),
                    None => break,
                },
                c => s.push(c),
            }
        }
        Err(EvalError::parse(start, "unterminated string literal"))
    }

    fn read_ident(&mut self, start: usize) -> Token {
        let end = self.consume_while(|c| c.is_ascii_alphanumeric() || c == '_');
        Token::Ident(self.src[start..end].to_string())
    }
}

struct Parser {
    tokens: Vec<Spanned>,
    pos: usize,
    depth: usize,
}

impl Parser {
    fn current(&self) -> &Spanned {
        // tokenize always ends with Eof and we never advance past it
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn advance(&mut self) -> Spanned {
        let tok = self.current().clone();
        if tok.token != Token::Eof {
            self.pos += 1;
        }
        tok
    }

    fn expect(&mut self, expected: Token) -> Result<(), EvalError> {
        let tok = self.advance();
        if tok.token == expected {
            Ok(())
        } else {
            Err(EvalError::parse(tok.offset, format!("expected '{}', found '{}'", expected, tok.token)))
        }
    }

    fn enter(&mut self) -> Result<(), EvalError> {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            return Err(EvalError::parse(self.current().offset, "expression nested too deeply"));
        }
        Ok(())
    }

    fn parse_expression(&mut self) -> Result<Expr, EvalError> {
        self.enter()?;
        let mut left = self.parse_term()?;
        loop {
            let op = match self.current().token {
                Token::Plus => BinOp::Add,
                Token::Minus => BinOp::Sub,
                _ => break,
            };
            self.advance();
            let right = self.parse_term()?;
            left = Expr::Binary(Box::new(left), op, Box::new(right));
        }
        self.depth -= 1;
        Ok(left)
    }

    fn parse_term(&mut self) -> Result<Expr, EvalError> {
        let mut left = self.parse_unary()?;
        loop {
            let op = match self.current().token {
                Token::Star => BinOp::Mul,
                Token::Slash => BinOp::Div,
                Token::Percent => BinOp::Mod,
                _ => break,
            };
            self.advance();
            let right = self.parse_unary()?;
            left = Expr::Binary(Box::new(left), op, Box::new(right));
        }
        Ok(left)
    }

    fn parse_unary(&mut self) -> Result<Expr, EvalError> {
        let op = match self.current().token {
            Token::Minus => UnaryOp::Neg,
            Token::Plus => UnaryOp::Plus,
            _ => return self.parse_power(),
        };
        self.advance();
        self.enter()?;
        let operand = self.parse_unary()?;
        self.depth -= 1;
        Ok(Expr::Unary(op, Box::new(operand)))
    }

    fn parse_power(&mut self) -> Result<Expr, EvalError> {
        let base = self.parse_primary()?;
        if self.current().token == Token::Caret {
            self.advance();
            self.enter()?;
            // Right side may carry its own sign: 2^-1
            let exponent = self.parse_unary()?;
            self.depth -= 1;
            return Ok(Expr::Binary(Box::new(base), BinOp::Pow, Box::new(exponent)));
        }
        Ok(base)
    }

    fn parse_primary(&mut self) -> Result<Expr, EvalError> {
        let tok = self.advance();
        match tok.token {
            Token::Number(n) => Ok(Expr::Number(n)),
            Token::Str(s) => Ok(Expr::Text(s)),
            Token::Ident(name) => {
                if self.current().token == Token::LeftParen {
                    self.advance();
                    let args = self.parse_args()?;
                    Ok(Expr::Call(name, args))
                } else {
                    Ok(Expr::Variable(name))
                }
            }
            Token::LeftParen => {
                let inner = self.parse_expression()?;
                self.expect(Token::RightParen)?;
                Ok(inner)
            }
            Token::Eof => Err(EvalError::parse(tok.offset, "unexpected end of input")),
            other => Err(EvalError::parse(tok.offset, format!("unexpected '{}'", other))),
        }
    }

    fn parse_args(&mut self) -> Result<Vec<Expr>, EvalError> {
        let mut args = Vec::new();
        if self.current().token == Token::RightParen {
            self.advance();
            return Ok(args);
        }
        loop {
            args.push(self.parse_expression()?);
            let tok = self.advance();
            match tok.token {
                Token::Comma => continue,
                Token::RightParen => return Ok(args),
                other => {
                    return Err(EvalError::parse(tok.offset, format!("expected ',' or ')', found '{}'", other)))
                }
            }
        }
    }
}

/// Parse a formula expression into an AST
pub fn parse(src: &str) -> Result<Expr, EvalError> {
    let tokens = Lexer::new(src).tokenize()?;
    if tokens.len() == 1 {
        return Err(EvalError::parse(0, "empty expression"));
    }
    let mut parser = Parser { tokens, pos: 0, depth: 0 };
    let expr = parser.parse_expression()?;
    let trailing = parser.current();
    if trailing.token != Token::Eof {
        return Err(EvalError::parse(trailing.offset, format!("unexpected '{}'", trailing.token)));
    }
    Ok(expr)
}
