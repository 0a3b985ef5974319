//! Variant bodies for the four entity kinds.
//!
//! The store never looks inside these structures; they exist so the export
//! formatter (and any other consumer) can match exhaustively on the kind.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::TypeError;

/// Discriminant of an entity, stored in the `type` field.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EntityKind {
    AidaFunnel,
    ContentFunnel,
    ConversionFunnel,
    CustomerJourney,
}

impl EntityKind {
    /// All kinds, in declaration order.
    pub const ALL: [EntityKind; 4] = [
        Self::AidaFunnel,
        Self::ContentFunnel,
        Self::ConversionFunnel,
        Self::CustomerJourney,
    ];

    /// The wire tag (`aida-funnel`, ...).
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AidaFunnel => "aida-funnel",
            Self::ContentFunnel => "content-funnel",
            Self::ConversionFunnel => "conversion-funnel",
            Self::CustomerJourney => "customer-journey",
        }
    }

    /// Human-readable label used in rendered output.
    pub fn label(&self) -> &'static str {
        match self {
            Self::AidaFunnel => "AIDA Funnel",
            Self::ContentFunnel => "Content Funnel",
            Self::ConversionFunnel => "Conversion Funnel",
            Self::CustomerJourney => "Customer Journey",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntityKind {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| TypeError::UnknownEntityKind(s.to_string()))
    }
}

/// Variant payload of an entity, tagged by `type`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum EntityBody {
    AidaFunnel(AidaFunnel),
    ContentFunnel(ContentFunnel),
    ConversionFunnel(ConversionFunnel),
    CustomerJourney(CustomerJourney),
}

impl EntityBody {
    pub fn kind(&self) -> EntityKind {
        match self {
            Self::AidaFunnel(_) => EntityKind::AidaFunnel,
            Self::ContentFunnel(_) => EntityKind::ContentFunnel,
            Self::ConversionFunnel(_) => EntityKind::ConversionFunnel,
            Self::CustomerJourney(_) => EntityKind::CustomerJourney,
        }
    }

    /// Top-level keys of the payload that no typed field claims.
    pub fn extra(&self) -> &Map<String, Value> {
        match self {
            Self::AidaFunnel(b) => &b.extra,
            Self::ContentFunnel(b) => &b.extra,
            Self::ConversionFunnel(b) => &b.extra,
            Self::CustomerJourney(b) => &b.extra,
        }
    }

    pub fn extra_mut(&mut self) -> &mut Map<String, Value> {
        match self {
            Self::AidaFunnel(b) => &mut b.extra,
            Self::ContentFunnel(b) => &mut b.extra,
            Self::ConversionFunnel(b) => &mut b.extra,
            Self::CustomerJourney(b) => &mut b.extra,
        }
    }
}

// ---------------------------------------------------------------------------
// AIDA
// ---------------------------------------------------------------------------

/// Attention / Interest / Desire / Action funnel.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AidaFunnel {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_audience: Option<String>,
    #[serde(default)]
    pub attention: AidaStage,
    #[serde(default)]
    pub interest: AidaStage,
    #[serde(default)]
    pub desire: AidaStage,
    #[serde(default)]
    pub action: AidaStage,
    /// Keys not modelled above, carried through unchanged.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl AidaFunnel {
    /// Stages in funnel order, paired with their display names.
    pub fn stages(&self) -> [(&'static str, &AidaStage); 4] {
        [
            ("Attention", &self.attention),
            ("Interest", &self.interest),
            ("Desire", &self.desire),
            ("Action", &self.action),
        ]
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AidaStage {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub objective: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tactics: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub channels: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub metrics: Vec<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl AidaStage {
    pub fn is_empty(&self) -> bool {
        self.objective.is_none()
            && self.tactics.is_empty()
            && self.channels.is_empty()
            && self.metrics.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Content funnel
// ---------------------------------------------------------------------------

/// Content mapped to funnel stages (top / middle / bottom of funnel, or any
/// caller-defined sequence).
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentFunnel {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topic: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_audience: Option<String>,
    #[serde(default)]
    pub stages: Vec<ContentStage>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentStage {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub goal: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub content_types: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub channels: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub calls_to_action: Vec<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

// ---------------------------------------------------------------------------
// Conversion funnel
// ---------------------------------------------------------------------------

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversionFunnel {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub goal: Option<String>,
    /// End-to-end conversion rate in percent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overall_conversion_rate: Option<f64>,
    #[serde(default)]
    pub stages: Vec<ConversionStage>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversionStage {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Share of visitors moving on from this stage, in percent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conversion_rate: Option<f64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub drop_off_reasons: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub optimizations: Vec<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ConversionStage {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_rate(mut self, percent: f64) -> Self {
        self.conversion_rate = Some(percent);
        self
    }
}

// ---------------------------------------------------------------------------
// Customer journey
// ---------------------------------------------------------------------------

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerJourney {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub persona: Option<Persona>,
    #[serde(default)]
    pub phases: Vec<JourneyPhase>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Persona {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub goals: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub pain_points: Vec<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JourneyPhase {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub touchpoints: Vec<Touchpoint>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub emotions: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub pain_points: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub opportunities: Vec<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Touchpoint {
    pub channel: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}
