use std::fmt;
use std::str::FromStr;

use funnel_store::StoreError;
use serde::{Deserialize, Serialize};

use crate::error::ExportError;

/// Output format of an export.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    /// Pretty-printed `{ "project": ..., "entities": [...] }` snapshot.
    Json,
    /// Human-readable structured text.
    Markdown,
}

impl ExportFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Markdown => "markdown",
        }
    }

    /// Conventional file extension for the format.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Markdown => "md",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExportFormat {
    type Err = ExportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "json" => Ok(Self::Json),
            "markdown" => Ok(Self::Markdown),
            other => Err(ExportError::Store(StoreError::InvalidData(format!(
                "unsupported export format {other:?} (expected \"json\" or \"markdown\")"
            )))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_exactly_two_values() {
        assert_eq!("json".parse::<ExportFormat>().unwrap(), ExportFormat::Json);
        assert_eq!(
            "markdown".parse::<ExportFormat>().unwrap(),
            ExportFormat::Markdown
        );
        assert!("md".parse::<ExportFormat>().is_err());
        assert!("JSON".parse::<ExportFormat>().is_err());
    }

    #[test]
    fn unknown_format_is_invalid_data() {
        let err = "pdf".parse::<ExportFormat>().unwrap_err();
        assert!(err.is_invalid_data());
        assert!(matches!(err, ExportError::Store(StoreError::InvalidData(_))));
        assert!(err.to_string().contains("\"pdf\""));
    }

    #[test]
    fn display_matches_parse() {
        for format in [ExportFormat::Json, ExportFormat::Markdown] {
            assert_eq!(format.to_string().parse::<ExportFormat>().unwrap(), format);
        }
    }
}
