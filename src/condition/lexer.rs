//! Condition source lexer

use crate::condition::ast::Literal;
use crate::condition::token::{Token, TokenKind};
use crate::condition::value::Number;
use crate::error::LexError;
use std::iter::Peekable;
use std::str::CharIndices;

/// Tokenize a whole condition string; the last token is always `End`
pub fn tokenize(source: &str) -> Result<Vec<Token<'_>>, LexError> {
    Lexer::new(source).collect()
}

/// Lazy token stream over a condition string.
///
/// Yields one `End` token after the last real token. Stops after the first
/// error; start a new lexer to scan the source again.
pub struct Lexer<'a> {
    source: &'a str,
    chars: Peekable<CharIndices<'a>>,
    finished: bool,
}

#[inline]
fn is_operator_char(c: char) -> bool {
    matches!(c, '=' | '!' | '<' | '>')
}

#[inline]
fn is_identifier_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            chars: source.char_indices().peekable(),
            finished: false,
        }
    }

    /// Byte offset of the next unread character
    #[inline]
    fn offset(&mut self) -> usize {
        self.chars.peek().map_or(self.source.len(), |&(i, _)| i)
    }

    fn skip_whitespace(&mut self) {
        while self.chars.next_if(|&(_, c)| c.is_whitespace()).is_some() {}
    }

    fn eat_while(&mut self, pred: impl Fn(char) -> bool) -> usize {
        while self.chars.next_if(|&(_, c)| pred(c)).is_some() {}
        self.offset()
    }

    fn scan_token(&mut self, start: usize, c: char) -> Result<Token<'a>, LexError> {
        match c {
            '(' => Ok(Token::new(TokenKind::OpenParen, &self.source[start..start + 1], start)),
            ')' => Ok(Token::new(TokenKind::CloseParen, &self.source[start..start + 1], start)),
            c if is_operator_char(c) => {
                let end = self.eat_while(is_operator_char);
                Ok(Token::new(TokenKind::Operator, &self.source[start..end], start))
            }
            '"' | '\'' => self.scan_string(start, c),
            c if c.is_ascii_digit() || c == '+' || c == '-' => self.scan_number(start),
            c if c.is_ascii_alphabetic() => Ok(self.scan_word(start)),
            found => Err(LexError::UnexpectedChar {
                position: start,
                found,
            }),
        }
    }

    fn scan_string(&mut self, start: usize, quote: char) -> Result<Token<'a>, LexError> {
        let mut value = String::new();

        loop {
            match self.chars.next() {
                None => return Err(LexError::UnterminatedString { position: start }),
                Some((_, c)) if c == quote => break,
                Some((_, '\\')) => match self.chars.next() {
                    None => return Err(LexError::UnterminatedString { position: start }),
                    Some((_, 'n')) => value.push('\n'),
                    Some((_, 't')) => value.push('\t'),
                    Some((_, c @ ('\\' | '"' | '\''))) => value.push(c),
                    Some((position, found)) => {
                        return Err(LexError::UnexpectedChar { position, found })
                    }
                },
                Some((_, c)) => value.push(c),
            }
        }

        let end = self.offset();
        Ok(Token::new(
            TokenKind::Literal(Literal::String(value)),
            &self.source[start..end],
            start,
        ))
    }

    fn scan_number(&mut self, start: usize) -> Result<Token<'a>, LexError> {
        let end = self.eat_while(|c| c.is_ascii_digit() || c == '.');
        let text = &self.source[start..end];

        match Number::parse(text) {
            Some(n) => Ok(Token::new(
                TokenKind::Literal(Literal::Number(n)),
                text,
                start,
            )),
            None => Err(LexError::MalformedNumber {
                position: start,
                text: text.to_string(),
            }),
        }
    }

    fn scan_word(&mut self, start: usize) -> Token<'a> {
        let end = self.eat_while(is_identifier_char);
        let text = &self.source[start..end];

        let kind = if text.eq_ignore_ascii_case("and") {
            TokenKind::And
        } else if text.eq_ignore_ascii_case("or") {
            TokenKind::Or
        } else {
            match text {
                "true" => TokenKind::Literal(Literal::Boolean(true)),
                "false" => TokenKind::Literal(Literal::Boolean(false)),
                _ => TokenKind::Identifier,
            }
        };

        Token::new(kind, text, start)
    }
}

impl<'a> Iterator for Lexer<'a> {
    type Item = Result<Token<'a>, LexError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        self.skip_whitespace();
        let Some((start, c)) = self.chars.next() else {
            self.finished = true;
            let end = self.source.len();
            return Some(Ok(Token::new(TokenKind::End, &self.source[end..], end)));
        };

        let token = self.scan_token(start, c);
        if token.is_err() {
            self.finished = true;
        }
        Some(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        tokenize(source)
            .unwrap()
            .into_iter()
            .map(|t| t.kind)
            .collect()
    }

    #[test]
    fn test_tokenize_simple_comparison() {
        let tokens = tokenize("q1 == 1").unwrap();
        assert_eq!(tokens.len(), 4);
        assert_eq!(tokens[0].kind, TokenKind::Identifier);
        assert_eq!(tokens[0].text, "q1");
        assert_eq!(tokens[1].kind, TokenKind::Operator);
        assert_eq!(tokens[1].text, "==");
        assert_eq!(tokens[1].position, 3);
        assert_eq!(
            tokens[2].kind,
            TokenKind::Literal(Literal::Number(Number::Integer(1)))
        );
        assert!(tokens[3].is_end());
        assert_eq!(tokens[3].position, 7);
    }

    #[test]
    fn test_tokenize_without_whitespace() {
        assert_eq!(
            kinds("(a<=-2.5)"),
            vec![
                TokenKind::OpenParen,
                TokenKind::Identifier,
                TokenKind::Operator,
                TokenKind::Literal(Literal::Number(Number::Decimal(-2.5))),
                TokenKind::CloseParen,
                TokenKind::End,
            ]
        );
    }

    #[test]
    fn test_connectives_case_insensitive() {
        assert_eq!(
            kinds("and OR And"),
            vec![TokenKind::And, TokenKind::Or, TokenKind::And, TokenKind::End]
        );
    }

    #[test]
    fn test_boolean_keywords() {
        assert_eq!(
            kinds("true false True"),
            vec![
                TokenKind::Literal(Literal::Boolean(true)),
                TokenKind::Literal(Literal::Boolean(false)),
                TokenKind::Identifier,
                TokenKind::End,
            ]
        );
    }

    #[test]
    fn test_string_literals() {
        let tokens = tokenize(r#"'it\'s' "a \"b\" \\ c""#).unwrap();
        assert_eq!(
            tokens[0].kind,
            TokenKind::Literal(Literal::String("it's".to_string()))
        );
        assert_eq!(tokens[0].text, r"'it\'s'");
        assert_eq!(
            tokens[1].kind,
            TokenKind::Literal(Literal::String(r#"a "b" \ c"#.to_string()))
        );
    }

    #[test]
    fn test_operator_run_is_one_token() {
        let tokens = tokenize("a === 1").unwrap();
        assert_eq!(tokens[1].kind, TokenKind::Operator);
        assert_eq!(tokens[1].text, "===");
    }

    #[test]
    fn test_malformed_number() {
        assert_eq!(
            tokenize("a == 1.2.3"),
            Err(LexError::MalformedNumber {
                position: 5,
                text: "1.2.3".to_string()
            })
        );
        assert!(matches!(
            tokenize("a == -"),
            Err(LexError::MalformedNumber { .. })
        ));
        assert!(matches!(
            tokenize("a == 3."),
            Err(LexError::MalformedNumber { .. })
        ));
    }

    #[test]
    fn test_unexpected_character() {
        assert_eq!(
            tokenize("a == 1 & b == 2"),
            Err(LexError::UnexpectedChar {
                position: 7,
                found: '&'
            })
        );
        assert!(matches!(
            tokenize("_a == 1"),
            Err(LexError::UnexpectedChar { found: '_', .. })
        ));
    }

    #[test]
    fn test_unterminated_string() {
        assert_eq!(
            tokenize("a == \"open"),
            Err(LexError::UnterminatedString { position: 5 })
        );
    }

    #[test]
    fn test_lexer_stops_after_error() {
        let mut lexer = Lexer::new("# a");
        assert!(matches!(lexer.next(), Some(Err(_))));
        assert!(lexer.next().is_none());
    }

    #[test]
    fn test_empty_source_yields_end() {
        let tokens = tokenize("   ").unwrap();
        assert_eq!(tokens.len(), 1);
        assert!(tokens[0].is_end());
    }
}
