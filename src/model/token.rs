use super::ToLocated;

#[derive(PartialEq, Debug, Clone)]
pub enum Token {
    LeftParen,    // (
    RightParen,   // )
    Atom(String), // anything else up to whitespace or a paren
}

impl ToLocated for Token {}

impl Token {
    pub fn text(&self) -> &str {
        match self {
            Token::LeftParen => "(",
            Token::RightParen => ")",
            Token::Atom(atom) => atom,
        }
    }
}
