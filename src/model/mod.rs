//! Core data structures of the chemistry model.
//!
//! - [`types`] – Periodic table elements with standard atomic weights.
//! - [`composition`] – Elemental composition parsed from formula descriptors.
//! - [`compound`] – Registered substances.
//! - [`formula`] – Declarative reaction rules over compound keys.
//! - [`container`] – Mode-exclusive container state (mass or percentage).
//! - [`station`] – Reaction stations and their executable recipes.
//!
//! Definitions ([`Compound`], [`Formula`]) are immutable once registered and
//! shared behind `Arc`; stations are derived from them by the
//! [`crate::forge`] compiler.
//!
//! [`Compound`]: compound::Compound
//! [`Formula`]: formula::Formula

pub mod composition;
pub mod compound;
pub mod container;
pub mod formula;
pub mod station;
pub mod types;
