use std::fmt;
use std::ops::Range;

use pest::{iterators::Pair, Parser};
use pest_derive::Parser;

use super::{ast::Operator, error::QueryParseError};

#[derive(Parser)]
#[grammar = "parser/grammar.pest"]
struct TokenGrammar;

/// A single query token. Literals borrow from the query text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token<'a> {
    /// Field name or literal value; the parser decides which by position
    Literal(&'a str),
    Operator(Operator),
    LParen,
    RParen,
    LBracket,
    RBracket,
    Comma,
    And,
    Or,
}

impl fmt::Display for Token<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Literal(text) => write!(f, "{text}"),
            Token::Operator(op) => write!(f, "{op}"),
            Token::LParen => write!(f, "("),
            Token::RParen => write!(f, ")"),
            Token::LBracket => write!(f, "["),
            Token::RBracket => write!(f, "]"),
            Token::Comma => write!(f, ","),
            Token::And => write!(f, "&&"),
            Token::Or => write!(f, "||"),
        }
    }
}

/// A token together with its byte range in the query text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lexeme<'a> {
    pub token: Token<'a>,
    pub span: Range<usize>,
}

/// Split query text into tokens, skipping whitespace.
///
/// The token grammar accepts every input, so an error here means the grammar
/// and this function disagree about the rule set.
pub fn tokenize(input: &str) -> Result<Vec<Lexeme<'_>>, QueryParseError> {
    let mut pairs = TokenGrammar::parse(Rule::tokens, input)
        .map_err(|e| QueryParseError::internal(format!("tokenizer rejected input: {e}"), input))?;

    let tokens_pair = pairs
        .next()
        .ok_or_else(|| QueryParseError::internal("Grammar guarantees tokens exist", input))?;

    tokens_pair
        .into_inner()
        .filter(|pair| pair.as_rule() != Rule::EOI)
        .map(|pair| lexeme(pair, input))
        .collect()
}

fn lexeme<'a>(pair: Pair<'a, Rule>, input: &str) -> Result<Lexeme<'a>, QueryParseError> {
    let span = pair.as_span();
    let token = match pair.as_rule() {
        Rule::and => Token::And,
        Rule::or => Token::Or,
        Rule::not_equals => Token::Operator(Operator::NotEquals),
        Rule::not_matches => Token::Operator(Operator::NotMatches),
        Rule::greater_equals => Token::Operator(Operator::GreaterThanOrEquals),
        Rule::less_equals => Token::Operator(Operator::LessThanOrEquals),
        Rule::greater => Token::Operator(Operator::GreaterThan),
        Rule::less => Token::Operator(Operator::LessThan),
        Rule::equals => Token::Operator(Operator::Equals),
        Rule::matches => Token::Operator(Operator::Matches),
        Rule::member => Token::Operator(Operator::In),
        Rule::lparen => Token::LParen,
        Rule::rparen => Token::RParen,
        Rule::lbracket => Token::LBracket,
        Rule::rbracket => Token::RBracket,
        Rule::comma => Token::Comma,
        Rule::literal => Token::Literal(span.as_str()),
        rule => {
            return Err(QueryParseError::internal(
                format!("Unexpected token rule: {rule:?}"),
                input,
            ))
        }
    };

    Ok(Lexeme {
        token,
        span: span.start()..span.end(),
    })
}
