use std::{convert::Infallible, fmt, str::FromStr};

use serde::{Deserialize, Serialize};

/// Backend identifiers arrive either as JSON numbers or as strings. The
/// received form is kept so it can be echoed back to the backend unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Identifier {
    Number(u64),
    Text(String),
}

impl Identifier {
    /// The backend spells "no such record" as `0` or `""`.
    pub fn is_unset(&self) -> bool {
        match self {
            Self::Number(n) => *n == 0,
            Self::Text(s) => s.is_empty(),
        }
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl FromStr for Identifier {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // Only canonical decimals become numbers, so "007" stays text.
        match s.parse::<u64>() {
            Ok(n) if n.to_string() == s => Ok(Self::Number(n)),
            _ => Ok(Self::Text(s.to_string())),
        }
    }
}

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub Identifier);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }

        impl From<u64> for $name {
            fn from(value: u64) -> Self {
                Self(Identifier::Number(value))
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(Identifier::Text(value.to_string()))
            }
        }

        impl FromStr for $name {
            type Err = Infallible;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Ok(Self(s.parse()?))
            }
        }
    };
}

id_newtype!(ItemId);
id_newtype!(CartId);
id_newtype!(OrderId);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_canonical_decimals_as_numbers() {
        assert_eq!("42".parse::<ItemId>().expect("item id"), ItemId::from(42));
        assert_eq!("c1".parse::<CartId>().expect("cart id"), CartId::from("c1"));
        assert_eq!("007".parse::<OrderId>().expect("order id"), OrderId::from("007"));
    }

    #[test]
    fn keeps_wire_form_of_identifiers() {
        let numeric: CartId = serde_json::from_str("7").expect("numeric id");
        let text: CartId = serde_json::from_str("\"c1\"").expect("text id");
        assert_eq!(serde_json::to_string(&numeric).expect("json"), "7");
        assert_eq!(serde_json::to_string(&text).expect("json"), "\"c1\"");
        assert_eq!(text.to_string(), "c1");
    }

    #[test]
    fn zero_and_empty_are_unset() {
        assert!(Identifier::Number(0).is_unset());
        assert!(Identifier::Text(String::new()).is_unset());
        assert!(!Identifier::Number(3).is_unset());
    }
}
