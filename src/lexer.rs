use peekmore::{PeekMore, PeekMoreIterator};

use super::{Token, Located, Location, ToLocated};

/// Splits source text into parens and whitespace-delimited atoms.
///
/// There is no quoting: `"a b"` lexes as the two atoms `"a` and `b"`.
pub struct Lexer<CharIter: Iterator<Item = char>> {
    char_stream: PeekMoreIterator<CharIter>,
    location: Location,
}

impl<CharIter: Iterator<Item = char>> Iterator for Lexer<CharIter> {
    type Item = Located<Token>;
    fn next(&mut self) -> Option<Self::Item> {
        self.get_next_token()
    }
}

impl<CharIter: Iterator<Item = char>> Lexer<CharIter> {
    pub fn new(char_stream: CharIter) -> Self {
        Self {
            char_stream: char_stream.peekmore(),
            location: Location::default(),
        }
    }

    fn get_next_token(&mut self) -> Option<Located<Token>> {
        while let Some(ch) = self.peek() {
            let location = self.location;
            return Some(match ch {
                _ if ch.is_whitespace() => {self.advance(); continue},
                '(' => {self.advance(); Token::LeftParen},
                ')' => {self.advance(); Token::RightParen},
                _ => self.get_atom(),
            }.with_locate(location));
        }

        None
    }

    fn get_atom(&mut self) -> Token {
        let mut atom = String::new();
        while let Some(ch) = self.peek() {
            if is_delimiter(ch) {
                break;
            }
            atom.push(ch);
            self.advance();
        }
        Token::Atom(atom)
    }

    fn peek(&mut self) -> Option<char> {
        self.char_stream.peek().copied()
    }

    fn advance(&mut self) -> Option<char> {
        let ch = self.char_stream.next();
        if let Some(ch) = ch {
            move_location(ch, &mut self.location);
        }
        ch
    }
}

fn is_delimiter(c: char) -> bool {
    c.is_whitespace() || c == '(' || c == ')'
}

fn move_location(ch: char, location: &mut Location) {
    match ch {
        '\n' => {
            location.row += 1;
            location.col = 0;
        },
        _ => location.col += 1,
    }
}

#[cfg(test)]
fn tokenize(text: &str) -> Vec<Token> {
    Lexer::new(text.chars()).map(|l| l.extract()).collect()
}

#[cfg(test)]
fn atom(text: &str) -> Token {
    Token::Atom(text.to_string())
}

#[test]
fn delimiter() {
    assert_eq!(
        tokenize("\t(- \n4\r(+ 1 2)) ...)"),
        vec![
            Token::LeftParen,
            atom("-"),
            atom("4"),
            Token::LeftParen,
            atom("+"),
            atom("1"),
            atom("2"),
            Token::RightParen,
            Token::RightParen,
            atom("..."),
            Token::RightParen,
        ]
    );
}

#[test]
fn parens_split_atoms() {
    assert_eq!(
        tokenize("(f(g)x)y"),
        vec![
            Token::LeftParen,
            atom("f"),
            Token::LeftParen,
            atom("g"),
            Token::RightParen,
            atom("x"),
            Token::RightParen,
            atom("y"),
        ]
    );
}

#[test]
fn strings_are_not_quoted() {
    assert_eq!(
        tokenize("(\"hello world\")"),
        vec![Token::LeftParen, atom("\"hello"), atom("world\""), Token::RightParen]
    );
}

#[test]
fn whitespace() {
    assert_eq!(tokenize(""), vec![]);
    assert_eq!(tokenize(" \t\r\n  "), vec![]);
    assert_eq!(tokenize("  set!  "), vec![atom("set!")]);
}

#[test]
fn locations() {
    let located = Lexer::new("(a\n  bc)".chars()).collect::<Vec<_>>();
    let positions = located
        .iter()
        .map(|l| (l.location.row, l.location.col))
        .collect::<Vec<_>>();
    assert_eq!(positions, vec![(0, 0), (0, 1), (1, 2), (1, 4)]);
}
