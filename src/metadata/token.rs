use std::fmt;
use std::hash::{Hash, Hasher};

/// A metadata token representing a reference to a metadata table row.
///
/// Tokens in a plugin module image consist of a 32-bit value where:
/// - The high byte (bits 24-31) indicates the table (see [`crate::metadata::tables::TableId`])
/// - The low 24 bits (bits 0-23) indicate the 1-based row index within that table
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Token(pub u32);

impl Token {
    /// Creates a new token from a raw 32-bit value
    #[must_use]
    pub fn new(value: u32) -> Self {
        Token(value)
    }

    /// Creates a token from a table byte and a row index
    #[must_use]
    pub fn from_parts(table: u8, row: u32) -> Self {
        Token((u32::from(table) << 24) | (row & 0x00FF_FFFF))
    }

    /// Returns the raw token value
    #[must_use]
    pub fn value(&self) -> u32 {
        self.0
    }

    /// Extracts the table type from the token (high byte)
    #[must_use]
    pub fn table(&self) -> u8 {
        (self.0 >> 24) as u8
    }

    /// Extracts the row index from the token (low 24 bits)
    #[must_use]
    pub fn row(&self) -> u32 {
        self.0 & 0x00FF_FFFF
    }

    /// Returns true if this is a null token (value 0)
    #[must_use]
    pub fn is_null(&self) -> bool {
        self.0 == 0
    }
}

impl From<u32> for Token {
    fn from(value: u32) -> Self {
        Token(value)
    }
}

impl From<Token> for u32 {
    fn from(token: Token) -> Self {
        token.0
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Token(0x{:08x}, table: 0x{:02x}, row: {})",
            self.0,
            self.table(),
            self.row()
        )
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:08x}", self.0)
    }
}

impl Hash for Token {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.hash(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_token_parts() {
        let token = Token::from_parts(0x03, 7);
        assert_eq!(token.value(), 0x0300_0007);
        assert_eq!(token.table(), 0x03);
        assert_eq!(token.row(), 7);
        assert!(!token.is_null());
    }

    #[test]
    fn test_token_null() {
        let token = Token::new(0);
        assert!(token.is_null());
        assert_eq!(token.table(), 0);
        assert_eq!(token.row(), 0);
    }

    #[test]
    fn test_token_ordering_and_hash() {
        let a = Token::from_parts(0x01, 1);
        let b = Token::from_parts(0x01, 2);
        let c = Token::from_parts(0x02, 1);
        assert!(a < b);
        assert!(b < c);

        let mut map = HashMap::new();
        map.insert(a, "a");
        map.insert(b, "b");
        assert_eq!(map[&Token::new(0x0100_0001)], "a");
    }

    #[test]
    fn test_token_display() {
        let token = Token::from_parts(0x05, 0x10);
        assert_eq!(format!("{token}"), "0x05000010");
    }
}
