//! User move input, validated at the boundary.

use std::fmt;
use std::str::FromStr;

use shakmaty::{uci::UciMove, Role, Square};

use crate::error::TrainerError;

/// A move attempt as the board reports it: origin, destination and an
/// optional promotion piece.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Candidate {
    pub from: Square,
    pub to: Square,
    pub promotion: Option<Role>,
}

impl Candidate {
    pub fn new(from: Square, to: Square) -> Self {
        Self {
            from,
            to,
            promotion: None,
        }
    }

    pub fn with_promotion(mut self, role: Role) -> Self {
        self.promotion = Some(role);
        self
    }

    /// Build a candidate from square names like `"e2"` and an optional
    /// promotion letter (`q`, `r`, `b`, `n`).
    pub fn parse(from: &str, to: &str, promotion: Option<&str>) -> Result<Self, TrainerError> {
        let from = parse_square(from)?;
        let to = parse_square(to)?;
        if from == to {
            return Err(TrainerError::InvalidInput(format!("origin equals destination: {from}")));
        }

        let promotion = match promotion.map(str::trim).filter(|p| !p.is_empty()) {
            None => None,
            Some(p) => Some(parse_promotion(p)?),
        };

        Ok(Self { from, to, promotion })
    }

    pub fn to_uci(&self) -> UciMove {
        UciMove::Normal {
            from: self.from,
            to: self.to,
            promotion: self.promotion,
        }
    }
}

impl fmt::Display for Candidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_uci())
    }
}

/// Parses UCI-style text: `e2e4`, `e7e8q`.
impl FromStr for Candidate {
    type Err = TrainerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if !s.is_ascii() || !(4..=5).contains(&s.len()) {
            return Err(TrainerError::InvalidInput(format!("bad move text {s:?}")));
        }
        let promotion = if s.len() == 5 { Some(&s[4..]) } else { None };
        Candidate::parse(&s[0..2], &s[2..4], promotion)
    }
}

fn parse_square(s: &str) -> Result<Square, TrainerError> {
    s.trim()
        .to_ascii_lowercase()
        .parse::<Square>()
        .map_err(|_| TrainerError::InvalidInput(format!("bad square {s:?}")))
}

fn parse_promotion(s: &str) -> Result<Role, TrainerError> {
    let mut chars = s.chars();
    let role = match (chars.next(), chars.next()) {
        (Some(c), None) => Role::from_char(c.to_ascii_lowercase()),
        _ => None,
    };
    match role {
        Some(r @ (Role::Queen | Role::Rook | Role::Bishop | Role::Knight)) => Ok(r),
        _ => Err(TrainerError::InvalidInput(format!("bad promotion piece {s:?}"))),
    }
}
