//! UCI (Universal Chess Interface) move text and the compact move encoding.
//!
//! Squares are indexed 0..63 from the top-left of the board as White sees it:
//! `file = square % 8`, `row = square / 8`, and row 0 is board rank 8.
//! So `a8` is 0, `h8` is 7 and `h1` is 63.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Promotion tag carried by a [`CompactMove`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Promotion {
    #[default]
    None,
    Queen,
    Rook,
    Bishop,
    Knight,
}

impl Promotion {
    /// Parse the lowercase UCI promotion suffix.
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            'q' => Some(Self::Queen),
            'r' => Some(Self::Rook),
            'b' => Some(Self::Bishop),
            'n' => Some(Self::Knight),
            _ => None,
        }
    }

    /// The UCI suffix, or `None` for a non-promoting move.
    pub fn to_char(self) -> Option<char> {
        match self {
            Self::None => None,
            Self::Queen => Some('q'),
            Self::Rook => Some('r'),
            Self::Bishop => Some('b'),
            Self::Knight => Some('n'),
        }
    }
}

/// Three-byte move: two square indices plus a promotion tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct CompactMove {
    pub from: u8,
    pub to: u8,
    pub promotion: Promotion,
}

impl CompactMove {
    /// The zeroed move (`a8a8`) that malformed input decodes to.
    pub const NULL: CompactMove = CompactMove {
        from: 0,
        to: 0,
        promotion: Promotion::None,
    };

    pub fn new(from: u8, to: u8, promotion: Promotion) -> Self {
        debug_assert!(from < 64 && to < 64);
        Self {
            from,
            to,
            promotion,
        }
    }

    /// Strict parse of `e2e4` / `e7e8q`.
    pub fn from_uci(s: &str) -> Option<Self> {
        let bytes = s.as_bytes();
        if bytes.len() != 4 && bytes.len() != 5 {
            return None;
        }

        let from = parse_square(bytes[0], bytes[1])?;
        let to = parse_square(bytes[2], bytes[3])?;
        let promotion = match bytes.get(4) {
            Some(&c) => Promotion::from_char(c as char)?,
            None => Promotion::None,
        };

        Some(Self {
            from,
            to,
            promotion,
        })
    }

    /// Lenient parse: anything [`CompactMove::from_uci`] rejects becomes
    /// [`CompactMove::NULL`].
    pub fn decode(s: &str) -> Self {
        Self::from_uci(s).unwrap_or(Self::NULL)
    }

    /// Format as UCI text.
    pub fn to_uci(&self) -> String {
        let mut s = String::with_capacity(5);
        push_square(&mut s, self.from);
        push_square(&mut s, self.to);
        if let Some(c) = self.promotion.to_char() {
            s.push(c);
        }
        s
    }

    /// Whether `uci` names this move.
    pub fn matches_uci(&self, uci: &str) -> bool {
        Self::from_uci(uci).is_some_and(|m| m == *self)
    }

    pub fn is_null(&self) -> bool {
        *self == Self::NULL
    }
}

impl fmt::Display for CompactMove {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_uci())
    }
}

fn parse_square(file: u8, rank: u8) -> Option<u8> {
    if !(b'a'..=b'h').contains(&file) || !(b'1'..=b'8').contains(&rank) {
        return None;
    }
    let col = file - b'a';
    let row = b'8' - rank;
    Some(row * 8 + col)
}

fn push_square(s: &mut String, square: u8) {
    let square = square % 64;
    s.push((b'a' + square % 8) as char);
    s.push((b'8' - square / 8) as char);
}
