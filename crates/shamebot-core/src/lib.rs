//! Core types and decision logic for the shamebot.
//!
//! This crate holds the only parts of the system that make decisions: who is
//! under-reported ([`evaluate`]), who they are in the chat directory
//! ([`matcher`]), and how the published roster changes when someone retracts
//! their listing ([`retract`]). It performs no I/O; collaborators are reached
//! through the traits in [`source`].

pub mod day;
pub mod document;
pub mod error;
pub mod evaluate;
pub mod matcher;
pub mod model;
pub mod policy;
pub mod render;
pub mod retract;
pub mod source;
pub mod trigger;

pub use error::{Error, Result};
