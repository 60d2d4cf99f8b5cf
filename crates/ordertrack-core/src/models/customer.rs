use std::fmt;

use serde::{Deserialize, Serialize};

/// Discriminant of the customer form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CustomerType {
    Personal,
    Company,
    Government,
    Ngo,
}

impl CustomerType {
    pub const ALL: [CustomerType; 4] = [
        Self::Personal,
        Self::Company,
        Self::Government,
        Self::Ngo,
    ];

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "personal" => Some(Self::Personal),
            "company" => Some(Self::Company),
            "government" => Some(Self::Government),
            "ngo" => Some(Self::Ngo),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Personal => "personal",
            Self::Company => "company",
            Self::Government => "government",
            Self::Ngo => "ngo",
        }
    }

    /// Company, government and NGO customers carry organisation details.
    pub fn is_organization(&self) -> bool {
        !matches!(self, Self::Personal)
    }
}

impl fmt::Display for CustomerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
