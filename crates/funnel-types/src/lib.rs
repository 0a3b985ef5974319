//! Record types for marketing funnel documents.
//!
//! This crate defines the data model shared by the store, the exporter, and
//! the command-line surface. It performs no I/O.
//!
//! # Key Types
//!
//! - [`Project`]: named container holding an ordered list of [`EntityRef`]s
//! - [`Entity`]: one funnel/journey document: common envelope + [`EntityBody`]
//! - [`EntityKind`]: the `type` discriminant (`aida-funnel`, `content-funnel`,
//!   `conversion-funnel`, `customer-journey`)
//! - [`ResearchMetadata`] / [`Citation`]: provenance for researched content
//! - [`ProjectId`] / [`EntityId`]: UUID v7 string identifiers
//! - [`Timestamp`]: millisecond-resolution UTC instant

pub mod entity;
pub mod error;
pub mod funnel;
pub mod id;
pub mod project;
pub mod research;
pub mod temporal;

pub use entity::{Entity, NewEntity};
pub use error::TypeError;
pub use funnel::{
    AidaFunnel, AidaStage, ContentFunnel, ContentStage, ConversionFunnel, ConversionStage,
    CustomerJourney, EntityBody, EntityKind, JourneyPhase, Persona, Touchpoint,
};
pub use id::{EntityId, ProjectId};
pub use project::{EntityRef, Project};
pub use research::{Citation, ResearchMetadata};
pub use temporal::Timestamp;
