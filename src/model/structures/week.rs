use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::{fmt, str::FromStr};

/// A time step within a season. Numeric weeks sort before the postseason.
///
/// The derived ordering relies on variant order: every `Regular` week compares
/// less than `Postseason`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Week {
    Regular(u32),
    Postseason
}

impl fmt::Display for Week {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Week::Regular(n) => write!(f, "{}", n),
            Week::Postseason => write!(f, "postseason")
        }
    }
}

impl FromStr for Week {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let label = s.trim();
        if let Ok(n) = label.parse::<u32>() {
            return Ok(Week::Regular(n));
        }

        match label.to_ascii_lowercase().as_str() {
            "postseason" | "bowl" | "p" => Ok(Week::Postseason),
            _ => Err(format!("unrecognized week label '{}'", s))
        }
    }
}

impl Serialize for Week {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Week::Regular(n) => serializer.serialize_u32(*n),
            Week::Postseason => serializer.serialize_str("postseason")
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum WeekRepr {
    Number(u32),
    Label(String)
}

impl<'de> Deserialize<'de> for Week {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match WeekRepr::deserialize(deserializer)? {
            WeekRepr::Number(n) => Ok(Week::Regular(n)),
            WeekRepr::Label(label) => label.parse().map_err(de::Error::custom)
        }
    }
}
