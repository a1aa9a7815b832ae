//! Production language for structured-parse grammars
//!
//! Each rule body is one production written in a small Lark-style notation:
//!
//! ```text
//! greeting: saludo nombre
//! saludo:   "hola" | "hi"i
//! nombre:   WORD
//! number:   /[0-9]+/ ("." /[0-9]+/)?
//! items:    item ("," item)* [","]
//! ```
//!
//!     - `a b` is a sequence, `a | b` a choice
//!     - `( ... )` groups, `[ ... ]` is optional
//!     - `?`, `*`, `+` repeat the preceding item
//!     - `"..."` is a literal, with an `i` suffix for case-insensitive matching
//!     - `/.../flags` is a regex terminal (flags: `i`, `m`, `s`, `x`)
//!     - bare names reference other rules or built-in terminals
//!
//! This module only turns text into [`Term`] trees. Name resolution and regex
//! compilation happen in [`parser`](super::parser).

use chumsky::prelude::*;

/// Type alias for parser error
type ParserError = Simple<char>;

/// Unresolved production tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Term {
    /// Reference to a rule or built-in terminal
    Symbol(String),
    Literal {
        text: String,
        insensitive: bool,
    },
    /// Regex terminal, source without delimiters
    Pattern {
        source: String,
        flags: String,
    },
    Sequence(Vec<Term>),
    Choice(Vec<Term>),
    Repeat {
        term: Box<Term>,
        min: usize,
        max: Option<usize>,
    },
}

impl Term {
    fn repeat(term: Term, min: usize, max: Option<usize>) -> Self {
        Term::Repeat {
            term: Box::new(term),
            min,
            max,
        }
    }

    /// Names referenced anywhere in this tree, in order of appearance.
    pub fn symbols(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.collect_symbols(&mut out);
        out
    }

    fn collect_symbols<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            Term::Symbol(name) => out.push(name),
            Term::Literal { .. } | Term::Pattern { .. } => {}
            Term::Sequence(items) | Term::Choice(items) => {
                for item in items {
                    item.collect_symbols(out);
                }
            }
            Term::Repeat { term, .. } => term.collect_symbols(out),
        }
    }
}

/// Parse a quoted literal, e.g. `"hola"` or `"hola"i`
fn literal() -> impl Parser<char, Term, Error = ParserError> + Clone {
    let escape = just('\\').ignore_then(choice((
        just('"'),
        just('\\'),
        just('n').to('\n'),
        just('t').to('\t'),
    )));

    just('"')
        .ignore_then(
            filter(|c: &char| *c != '"' && *c != '\\')
                .or(escape)
                .repeated()
                .at_least(1),
        )
        .then_ignore(just('"'))
        .collect::<String>()
        .then(just('i').or_not())
        .map(|(text, flag)| Term::Literal {
            text,
            insensitive: flag.is_some(),
        })
}

/// Parse a regex terminal, e.g. `/[a-z]+/i`
fn pattern() -> impl Parser<char, Term, Error = ParserError> + Clone {
    let escaped = just('\\').ignore_then(any()).map(|c: char| {
        if c == '/' {
            "/".to_string()
        } else {
            format!("\\{}", c)
        }
    });
    let plain = filter(|c: &char| *c != '/' && *c != '\\' && *c != '\n').map(|c| c.to_string());

    just('/')
        .ignore_then(escaped.or(plain).repeated().at_least(1))
        .then_ignore(just('/'))
        .map(|parts: Vec<String>| parts.concat())
        .then(
            filter(|c: &char| c.is_ascii_alphabetic())
                .repeated()
                .collect::<String>(),
        )
        .map(|(source, flags)| Term::Pattern { source, flags })
}

/// Parser for one complete production body.
pub fn production() -> impl Parser<char, Term, Error = ParserError> {
    recursive(|alternatives| {
        let group = alternatives
            .clone()
            .delimited_by(just('('), just(')'));
        let optional = alternatives
            .delimited_by(just('['), just(']'))
            .map(|term| Term::repeat(term, 0, Some(1)));

        let atom = choice((
            literal(),
            pattern(),
            text::ident().map(Term::Symbol),
            group,
            optional,
        ))
        .padded();

        let item = atom
            .then(one_of("?*+").padded().or_not())
            .map(|(term, op)| match op {
                Some('?') => Term::repeat(term, 0, Some(1)),
                Some('*') => Term::repeat(term, 0, None),
                Some('+') => Term::repeat(term, 1, None),
                _ => term,
            });

        let sequence = item
            .repeated()
            .at_least(1)
            .map(|mut items: Vec<Term>| {
                if items.len() == 1 {
                    items.remove(0)
                } else {
                    Term::Sequence(items)
                }
            });

        sequence
            .separated_by(just('|').padded())
            .at_least(1)
            .map(|mut alternatives: Vec<Term>| {
                if alternatives.len() == 1 {
                    alternatives.remove(0)
                } else {
                    Term::Choice(alternatives)
                }
            })
    })
    .padded()
    .then_ignore(end())
}

/// Parse `body` as the production for `rule`.
///
/// The error string names the rule and the first syntax problem.
pub fn parse_production(rule: &str, body: &str) -> Result<Term, String> {
    production().parse(body).map_err(|errors| {
        let detail = errors
            .first()
            .map(|e| format!("{} at offset {}", e, e.span().start))
            .unwrap_or_else(|| "malformed production".to_string());
        format!("rule '{}': {}", rule, detail)
    })
}
