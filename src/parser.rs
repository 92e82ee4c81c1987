use log::debug;
use peekmore::{PeekMore, PeekMoreIterator};

use super::{Config, Expression, Lexer, LiteralRules, Located, Location, SyntaxError, SyntaxErrorKind, ToLocated, Token};

type Result<T> = std::result::Result<T, SyntaxError>;

/// Parses every top-level form in `text` using the default configuration.
pub fn parse(text: &str) -> Result<Vec<Expression>> {
    parse_with(text, &Config::default())
}

/// Parses with the literal rules and nesting limit taken from `config`.
pub fn parse_with(text: &str, config: &Config) -> Result<Vec<Expression>> {
    let forms = Parser::new(Lexer::new(text.chars()), config).collect::<Result<Vec<_>>>()?;
    debug!("parsed {} top-level form(s)", forms.len());
    Ok(forms)
}

/// Turns a non-paren token into a leaf expression.
///
/// Strings win first, then integers, then floats; whatever is left is a
/// symbol. Under [`LiteralRules::Reference`] a float must not be
/// integer-valued, so `2.0` becomes the symbol `2.0`.
pub fn classify_literal(token: &str, literal_rules: LiteralRules) -> std::result::Result<Expression, SyntaxErrorKind> {
    if token.starts_with('"') {
        if token.len() < 2 || !token.ends_with('"') {
            return Err(SyntaxErrorKind::UnterminatedString(token.to_string()));
        }
        return Ok(Expression::Str(token[1..token.len() - 1].to_string()));
    }

    match token.parse::<i64>() {
        Ok(i) => return Ok(Expression::Int(i)),
        Err(_) if is_integral(token) => return Err(SyntaxErrorKind::IntegerOutOfRange(token.to_string())),
        Err(_) => (),
    }

    match token.parse::<f64>() {
        Ok(f) if f.is_finite() => match literal_rules {
            LiteralRules::Reference if f.fract() == 0.0 => (),
            _ => return Ok(Expression::Float(f)),
        },
        _ => (),
    }

    Ok(Expression::Symbol(token.to_string()))
}

// an optional sign followed by decimal digits only
fn is_integral(token: &str) -> bool {
    let digits = token.strip_prefix(|c: char| c == '+' || c == '-').unwrap_or(token);
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}

/// Builds expressions out of a token stream, one top-level form at a time.
///
/// Every top-level form has to be a parenthesized list.
pub struct Parser<TokenIter: Iterator<Item = Located<Token>>> {
    tokens: PeekMoreIterator<TokenIter>,
    literal_rules: LiteralRules,
    max_depth: usize,
    forms_parsed: usize,
}

impl<TokenIter: Iterator<Item = Located<Token>>> Iterator for Parser<TokenIter> {
    type Item = Result<Expression>;
    fn next(&mut self) -> Option<Self::Item> {
        self.get_next_form().transpose()
    }
}

impl<TokenIter: Iterator<Item = Located<Token>>> Parser<TokenIter> {
    pub fn new(tokens: TokenIter, config: &Config) -> Parser<TokenIter> {
        Self {
            tokens: tokens.peekmore(),
            literal_rules: config.literal_rules,
            max_depth: config.max_parse_depth,
            forms_parsed: 0,
        }
    }

    pub fn get_next_form(&mut self) -> Result<Option<Expression>> {
        let Located { data: token, location } = match self.tokens.peek() {
            None => return Ok(None),
            Some(token) => token.clone(),
        };

        match token {
            Token::LeftParen => {
                self.advance();
                let list = self.get_list(location, 1)?;
                self.forms_parsed += 1;
                Ok(Some(list))
            },
            _ if self.forms_parsed > 0 => {
                let rest = self.tokens.by_ref().map(|t| t.text().to_string()).collect();
                located_error!(SyntaxErrorKind::UnparsedTokens(rest), location)
            },
            _ => {
                self.advance();
                located_error!(SyntaxErrorKind::ExpectedOpenParen(token.text().to_string()), location)
            },
        }
    }

    fn advance(&mut self) -> Option<Located<Token>> {
        self.tokens.next()
    }

    // the opening paren has already been consumed; `depth` counts it
    fn get_list(&mut self, open: Location, depth: usize) -> Result<Expression> {
        if depth > self.max_depth {
            return located_error!(SyntaxErrorKind::TooDeeplyNested(self.max_depth), open);
        }

        let mut items = vec![];
        loop {
            match self.advance() {
                None => return located_error!(SyntaxErrorKind::UnterminatedList, open),
                Some(Located { data: Token::RightParen, .. }) => return Ok(Expression::List(items)),
                Some(Located { data: Token::LeftParen, location }) => items.push(self.get_list(location, depth + 1)?),
                Some(Located { data: Token::Atom(atom), location }) => items.push(
                    classify_literal(&atom, self.literal_rules).map_err(|e| e.with_locate(location))?,
                ),
            }
        }
    }
}

#[cfg(test)]
fn sym(name: &str) -> Expression {
    Expression::Symbol(name.to_string())
}

#[test]
fn nested_lists() -> Result<()> {
    assert_eq!(
        parse("(define (sq x) (* x x))")?,
        vec![Expression::List(vec![
            sym("define"),
            Expression::List(vec![sym("sq"), sym("x")]),
            Expression::List(vec![sym("*"), sym("x"), sym("x")]),
        ])]
    );
    Ok(())
}

#[test]
fn several_top_level_forms() -> Result<()> {
    let forms = parse("(a) (b 1)\n(c \"s\")")?;
    assert_eq!(
        forms,
        vec![
            Expression::List(vec![sym("a")]),
            Expression::List(vec![sym("b"), Expression::Int(1)]),
            Expression::List(vec![sym("c"), Expression::Str("s".to_string())]),
        ]
    );
    assert_eq!(parse("")?, vec![]);
    assert_eq!(parse("()")?, vec![Expression::List(vec![])]);
    Ok(())
}

#[test]
fn literals() {
    let reference = LiteralRules::Reference;
    assert_eq!(classify_literal("2", reference), Ok(Expression::Int(2)));
    assert_eq!(classify_literal("-17", reference), Ok(Expression::Int(-17)));
    assert_eq!(classify_literal("2.5", reference), Ok(Expression::Float(2.5)));
    assert_eq!(classify_literal("-0.25", reference), Ok(Expression::Float(-0.25)));
    assert_eq!(classify_literal("2.0", reference), Ok(sym("2.0")));
    assert_eq!(classify_literal("1e3", reference), Ok(sym("1e3")));
    assert_eq!(classify_literal("inf", reference), Ok(sym("inf")));
    assert_eq!(classify_literal("nan", reference), Ok(sym("nan")));
    assert_eq!(classify_literal("\"hi\"", reference), Ok(Expression::Str("hi".to_string())));
    assert_eq!(classify_literal("\"\"", reference), Ok(Expression::Str(String::new())));
    assert_eq!(classify_literal("set!", reference), Ok(sym("set!")));
}

#[test]
fn numeric_literal_rules() {
    let numeric = LiteralRules::Numeric;
    assert_eq!(classify_literal("2.0", numeric), Ok(Expression::Float(2.0)));
    assert_eq!(classify_literal("1e3", numeric), Ok(Expression::Float(1000.0)));
    assert_eq!(classify_literal("2", numeric), Ok(Expression::Int(2)));
    assert_eq!(classify_literal("inf", numeric), Ok(sym("inf")));
}

#[test]
fn unterminated_string() {
    let err = parse("(display \"oops)").unwrap_err();
    assert_eq!(err.data, SyntaxErrorKind::UnterminatedString("\"oops".to_string()));
    assert_eq!(err.location, Location { row: 0, col: 9 });

    assert_eq!(
        classify_literal("\"", LiteralRules::Reference),
        Err(SyntaxErrorKind::UnterminatedString("\"".to_string()))
    );
}

#[test]
fn unterminated_list() {
    let err = parse("(+ 1\n  (* 2 3)").unwrap_err();
    assert_eq!(err.data, SyntaxErrorKind::UnterminatedList);
    assert_eq!(err.location, Location { row: 0, col: 0 });

    let err = parse("(a) (b (c)").unwrap_err();
    assert_eq!(err.data, SyntaxErrorKind::UnterminatedList);
    assert_eq!(err.location, Location { row: 0, col: 4 });
}

#[test]
fn top_level_atoms() {
    let err = parse("x").unwrap_err();
    assert_eq!(err.data, SyntaxErrorKind::ExpectedOpenParen("x".to_string()));

    let err = parse(")").unwrap_err();
    assert_eq!(err.data, SyntaxErrorKind::ExpectedOpenParen(")".to_string()));

    let err = parse("(+ 1 2) 3 )").unwrap_err();
    assert_eq!(
        err.data,
        SyntaxErrorKind::UnparsedTokens(vec!["3".to_string(), ")".to_string()])
    );
    assert_eq!(err.location, Location { row: 0, col: 8 });
}

#[test]
fn error_messages() {
    use insta::assert_snapshot;

    assert_snapshot!(parse("(+ 1").unwrap_err().to_string(), @"expected ')' before end of input at 1:1");
    assert_snapshot!(parse("(f) g h").unwrap_err().to_string(), @"unparsed tokens: g h at 1:5");
    assert_snapshot!(parse("\n  42").unwrap_err().to_string(), @"expected '(' but found `42` at 2:3");
}

#[test]
fn integers_out_of_range() {
    let reference = LiteralRules::Reference;
    assert_eq!(
        classify_literal("99999999999999999999", reference),
        Err(SyntaxErrorKind::IntegerOutOfRange("99999999999999999999".to_string()))
    );
    assert_eq!(
        classify_literal("-99999999999999999999", LiteralRules::Numeric),
        Err(SyntaxErrorKind::IntegerOutOfRange("-99999999999999999999".to_string()))
    );
    assert_eq!(classify_literal("-", reference), Ok(sym("-")));
    assert_eq!(classify_literal("+", reference), Ok(sym("+")));

    let err = parse("(+ 1 99999999999999999999)").unwrap_err();
    assert_eq!(err.location, Location { row: 0, col: 5 });
}

#[test]
fn nesting_is_bounded() -> Result<()> {
    let deep = format!("{}{}", "(".repeat(100_000), ")".repeat(100_000));
    let err = parse(&deep).unwrap_err();
    assert_eq!(err.data, SyntaxErrorKind::TooDeeplyNested(crate::DEFAULT_MAX_PARSE_DEPTH));

    let config = Config::default().with_max_parse_depth(3);
    assert_eq!(parse_with("(((x)))", &config)?.len(), 1);
    let err = parse_with("(a (b ((c))))", &config).unwrap_err();
    assert_eq!(err.data, SyntaxErrorKind::TooDeeplyNested(3));
    assert_eq!(err.location, Location { row: 0, col: 7 });
    Ok(())
}
