// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for Stampwerk.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::StampError;

/// An axis-aligned rectangle to black out, in page pixel coordinates.
///
/// Both corners are inclusive, matching how the box is drawn: `0,0,0,0`
/// covers exactly one pixel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RedactionBox {
    pub x1: i32,
    pub y1: i32,
    pub x2: i32,
    pub y2: i32,
}

impl RedactionBox {
    pub fn new(x1: i32, y1: i32, x2: i32, y2: i32) -> Self {
        Self { x1, y1, x2, y2 }
    }

    /// The same box with corners ordered so that `x1 <= x2` and `y1 <= y2`.
    pub fn normalized(&self) -> Self {
        Self {
            x1: self.x1.min(self.x2),
            y1: self.y1.min(self.y2),
            x2: self.x1.max(self.x2),
            y2: self.y1.max(self.y2),
        }
    }

    /// Whether the pixel `(x, y)` lies inside the box (corners inclusive).
    pub fn contains(&self, x: i64, y: i64) -> bool {
        let b = self.normalized();
        x >= b.x1 as i64 && x <= b.x2 as i64 && y >= b.y1 as i64 && y <= b.y2 as i64
    }
}

impl FromStr for RedactionBox {
    type Err = StampError;

    /// Parse `x1,y1,x2,y2`. Whitespace around each number is ignored.
    fn from_str(spec: &str) -> Result<Self, Self::Err> {
        let fields: Vec<&str> = spec.split(',').map(str::trim).collect();
        if fields.len() != 4 {
            return Err(StampError::InvalidMask(spec.to_string()));
        }

        let mut values = [0i32; 4];
        for (slot, field) in values.iter_mut().zip(&fields) {
            *slot = field
                .parse()
                .map_err(|_| StampError::InvalidMask(spec.to_string()))?;
        }

        let [x1, y1, x2, y2] = values;
        Ok(Self::new(x1, y1, x2, y2))
    }
}

impl fmt::Display for RedactionBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{},{},{}", self.x1, self.y1, self.x2, self.y2)
    }
}

/// Who a copy is issued to, for what, about whom, and when.
///
/// These four strings feed the traceability token and the visible watermark
/// and footer texts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StampIdentity {
    /// Recipient of the copy.
    pub who: String,
    /// Usage restriction.
    pub purpose: String,
    /// Document holder.
    pub name: String,
    /// ISO date (YYYY-MM-DD).
    pub date: String,
}

impl StampIdentity {
    pub fn new(
        who: impl Into<String>,
        purpose: impl Into<String>,
        name: impl Into<String>,
        date: impl Into<String>,
    ) -> Self {
        Self {
            who: who.into(),
            purpose: purpose.into(),
            name: name.into(),
            date: date.into(),
        }
    }

    /// Today's local date as `YYYY-MM-DD`.
    pub fn today() -> String {
        chrono::Local::now().date_naive().format("%Y-%m-%d").to_string()
    }

    /// The pipe-joined source string the traceability token is hashed from.
    pub fn token_source(&self) -> String {
        format!("{}|{}|{}|{}", self.who, self.purpose, self.name, self.date)
    }

    /// Text repeated across the page by the watermark compositor.
    pub fn watermark_text(&self, token: &str) -> String {
        format!(
            "{} | For {} only | {} | {} | ID:{}",
            self.purpose, self.who, self.name, self.date, token
        )
    }

    /// Text for the optional footer band.
    pub fn footer_text(&self, token: &str) -> String {
        format!(
            "This copy is purpose-bound and carries trace token {}. Not valid for any use other than \"{}\" by \"{}\".",
            token, self.purpose, self.who
        )
    }
}

/// Optional passwords for the output PDF.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    /// Password required to open the document.
    pub user: Option<String>,
    /// Password granting full access.
    pub owner: Option<String>,
}

impl Credentials {
    pub fn new(user: Option<String>, owner: Option<String>) -> Self {
        Self { user, owner }
    }

    /// True when at least one non-empty password is set.
    pub fn requires_encryption(&self) -> bool {
        let set = |pw: &Option<String>| pw.as_deref().is_some_and(|p| !p.is_empty());
        set(&self.user) || set(&self.owner)
    }

    /// User password, empty when unset.
    pub fn user_password(&self) -> &str {
        self.user.as_deref().unwrap_or("")
    }

    /// Owner password, empty when unset.
    pub fn owner_password(&self) -> &str {
        self.owner.as_deref().unwrap_or("")
    }
}

/// Which font actually rendered the text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FontChoice {
    /// The caller-supplied font file.
    Requested(PathBuf),
    /// The built-in bitmap face.
    Builtin,
}

impl fmt::Display for FontChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Requested(path) => write!(f, "{}", path.display()),
            Self::Builtin => f.write_str("built-in 8x8"),
        }
    }
}
