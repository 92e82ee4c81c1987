use std::fmt;
use std::ops::Deref;

#[derive(Debug, Clone, PartialEq)]
pub struct Located<T> {
    pub data: T,
    pub location: Location,
}

/// Zero-based position of the first character of a token.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub struct Location {
    pub row: u32,
    pub col: u32,
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.row + 1, self.col + 1)
    }
}

pub trait ToLocated {
    fn with_locate(self, location: Location) -> Located<Self>
    where
        Self: Sized,
    {
        Located::<Self> {
            data: self,
            location,
        }
    }
}

impl<T> Located<T> {
    pub fn extract(self) -> T {
        self.data
    }
}

impl<T> Deref for Located<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.data
    }
}

impl<T: fmt::Display> fmt::Display for Located<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at {}", self.data, self.location)
    }
}

impl<T: std::error::Error> std::error::Error for Located<T> {}
