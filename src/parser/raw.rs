use std::ops::Range;

use super::{
    ast::{Node, Operator},
    error::{to_source_span, QueryParseError},
    lexer::{tokenize, Lexeme, Token},
};

/// Recursive-descent parser over the token stream.
///
/// ```text
/// Expr       := Conj ( '||' Conj )*
/// Conj       := Atom ( '&&' Atom )*
/// Atom       := '(' Expr ')' | Comparison
/// Comparison := Literal CompOp Value
/// Value      := Literal | '[' Literal (',' Literal)* ']'
/// ```
pub struct RawParser<'a> {
    source: &'a str,
    lexemes: Vec<Lexeme<'a>>,
    pos: usize,
    depth: usize,
}

/// Deepest parenthesis nesting `parse_node` accepts
pub const MAX_NESTING: usize = 128;

impl<'a> RawParser<'a> {
    /// Parse query text into an unbound AST
    pub fn parse_node(source: &'a str) -> Result<Node, QueryParseError> {
        let lexemes = tokenize(source)?;
        let mut parser = RawParser {
            source,
            lexemes,
            pos: 0,
            depth: 0,
        };

        let node = parser.parse_expr()?;

        match parser.next() {
            None => Ok(node),
            Some(Lexeme {
                token: Token::RParen,
                span,
            }) => Err(QueryParseError::UnmatchedParen {
                span: to_source_span(&span),
                src: source.to_string(),
            }),
            Some(lexeme) => Err(parser.unexpected(lexeme, "'&&', '||' or end of query")),
        }
    }

    fn parse_expr(&mut self) -> Result<Node, QueryParseError> {
        let mut node = self.parse_conj()?;
        while self.eat(Token::Or) {
            let rhs = self.parse_conj()?;
            node = Node::or(node, rhs);
        }
        Ok(node)
    }

    fn parse_conj(&mut self) -> Result<Node, QueryParseError> {
        let mut node = self.parse_atom()?;
        while self.eat(Token::And) {
            let rhs = self.parse_atom()?;
            node = Node::and(node, rhs);
        }
        Ok(node)
    }

    fn parse_atom(&mut self) -> Result<Node, QueryParseError> {
        const EXPECTED: &str = "a field name or '('";

        match self.next() {
            Some(Lexeme {
                token: Token::LParen,
                span: open,
            }) => {
                if self.depth == MAX_NESTING {
                    return Err(QueryParseError::NestingTooDeep {
                        limit: MAX_NESTING,
                        span: to_source_span(&open),
                        src: self.source.to_string(),
                    });
                }
                self.depth += 1;
                let inner = self.parse_expr()?;
                self.depth -= 1;
                match self.next() {
                    Some(Lexeme {
                        token: Token::RParen,
                        ..
                    }) => Ok(inner),
                    Some(lexeme) => Err(self.unexpected(lexeme, "')'")),
                    None => Err(QueryParseError::UnclosedParen {
                        span: to_source_span(&open),
                        src: self.source.to_string(),
                    }),
                }
            }
            Some(Lexeme {
                token: Token::Literal(field),
                span,
            }) => self.parse_comparison(field, span),
            Some(lexeme) => Err(self.unexpected(lexeme, EXPECTED)),
            None => Err(self.unexpected_end(EXPECTED)),
        }
    }

    fn parse_comparison(
        &mut self,
        field: &'a str,
        field_span: Range<usize>,
    ) -> Result<Node, QueryParseError> {
        let operator = match self.next() {
            Some(Lexeme {
                token: Token::Operator(operator),
                ..
            }) => operator,
            Some(Lexeme { span, .. }) => {
                return Err(QueryParseError::MissingOperator {
                    field: field.to_string(),
                    span: to_source_span(&span),
                    src: self.source.to_string(),
                })
            }
            None => {
                return Err(QueryParseError::MissingOperator {
                    field: field.to_string(),
                    span: to_source_span(&field_span),
                    src: self.source.to_string(),
                })
            }
        };

        if operator == Operator::In {
            Ok(Node::membership(field, self.parse_members()?))
        } else {
            Ok(Node::comparison(operator, field, self.parse_literal(operator)?))
        }
    }

    fn parse_literal(&mut self, operator: Operator) -> Result<String, QueryParseError> {
        match self.next() {
            Some(Lexeme {
                token: Token::Literal(text),
                ..
            }) => Ok(text.to_string()),
            Some(Lexeme {
                token: Token::LBracket,
                span,
            }) => Err(QueryParseError::SetNotAllowed {
                operator,
                span: to_source_span(&span),
                src: self.source.to_string(),
            }),
            Some(lexeme) => Err(self.unexpected(lexeme, "a literal")),
            None => Err(self.unexpected_end("a literal")),
        }
    }

    /// Right side of `∈`: a set, or a bare literal read as a one-element set
    fn parse_members(&mut self) -> Result<Vec<String>, QueryParseError> {
        match self.next() {
            Some(Lexeme {
                token: Token::Literal(text),
                ..
            }) => Ok(vec![text.to_string()]),
            Some(Lexeme {
                token: Token::LBracket,
                span,
            }) => self.parse_set(span),
            Some(lexeme) => Err(self.unexpected(lexeme, "a literal or '['")),
            None => Err(self.unexpected_end("a literal or '['")),
        }
    }

    /// Set elements after the opening bracket, through the closing one
    fn parse_set(&mut self, open: Range<usize>) -> Result<Vec<String>, QueryParseError> {
        let mut items = Vec::new();
        loop {
            match self.next() {
                Some(Lexeme {
                    token: Token::Literal(text),
                    ..
                }) => items.push(text.to_string()),
                Some(Lexeme {
                    token: Token::RBracket,
                    span,
                }) if items.is_empty() => {
                    return Err(QueryParseError::EmptySet {
                        span: to_source_span(&(open.start..span.end)),
                        src: self.source.to_string(),
                    })
                }
                Some(lexeme) => return Err(self.unexpected(lexeme, "a set element")),
                None => return Err(self.unclosed_bracket(&open)),
            }

            match self.next() {
                Some(Lexeme {
                    token: Token::Comma,
                    ..
                }) => continue,
                Some(Lexeme {
                    token: Token::RBracket,
                    ..
                }) => return Ok(items),
                Some(lexeme) => return Err(self.unexpected(lexeme, "',' or ']'")),
                None => return Err(self.unclosed_bracket(&open)),
            }
        }
    }

    fn next(&mut self) -> Option<Lexeme<'a>> {
        let lexeme = self.lexemes.get(self.pos).cloned();
        if lexeme.is_some() {
            self.pos += 1;
        }
        lexeme
    }

    /// Consume the next token if it is `token`
    fn eat(&mut self, token: Token<'_>) -> bool {
        match self.lexemes.get(self.pos) {
            Some(lexeme) if lexeme.token == token => {
                self.pos += 1;
                true
            }
            _ => false,
        }
    }

    fn unexpected(&self, lexeme: Lexeme<'_>, expected: &'static str) -> QueryParseError {
        QueryParseError::UnexpectedToken {
            found: lexeme.token.to_string(),
            expected,
            span: to_source_span(&lexeme.span),
            src: self.source.to_string(),
        }
    }

    fn unexpected_end(&self, expected: &'static str) -> QueryParseError {
        // point at the last character so the label has something to underline
        let span = match self.source.char_indices().last() {
            Some((start, _)) => start..self.source.len(),
            None => 0..0,
        };
        QueryParseError::UnexpectedEnd {
            expected,
            span: to_source_span(&span),
            src: self.source.to_string(),
        }
    }

    fn unclosed_bracket(&self, open: &Range<usize>) -> QueryParseError {
        QueryParseError::UnclosedBracket {
            span: to_source_span(open),
            src: self.source.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eq(field: &str, literal: &str) -> Node {
        Node::comparison(Operator::Equals, field, literal)
    }

    #[test]
    fn test_and_binds_tighter_than_or() {
        let node = RawParser::parse_node("a = 1 || b = 2 && c = 3").unwrap();
        assert_eq!(node, Node::or(eq("a", "1"), Node::and(eq("b", "2"), eq("c", "3"))));

        let node = RawParser::parse_node("a = 1 && b = 2 || c = 3").unwrap();
        assert_eq!(node, Node::or(Node::and(eq("a", "1"), eq("b", "2")), eq("c", "3")));
    }

    #[test]
    fn test_logical_operators_associate_left() {
        let node = RawParser::parse_node("a = 1 || b = 2 || c = 3").unwrap();
        assert_eq!(node, Node::or(Node::or(eq("a", "1"), eq("b", "2")), eq("c", "3")));
    }

    #[test]
    fn test_nesting_limit() {
        let at_limit = format!("{}a = 1{}", "(".repeat(MAX_NESTING), ")".repeat(MAX_NESTING));
        assert_eq!(RawParser::parse_node(&at_limit).unwrap(), eq("a", "1"));

        let too_deep = format!("({at_limit})");
        match RawParser::parse_node(&too_deep) {
            Err(QueryParseError::NestingTooDeep { limit, span, .. }) => {
                assert_eq!(limit, MAX_NESTING);
                assert_eq!(span, miette::SourceSpan::from((MAX_NESTING, 1)));
            }
            other => panic!("expected NestingTooDeep, got {other:?}"),
        }
    }

    #[test]
    fn test_blank_query_reports_end() {
        let err = RawParser::parse_node("   ").unwrap_err();
        assert!(matches!(err, QueryParseError::UnexpectedEnd { .. }));
    }
}
