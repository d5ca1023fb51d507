//! Core domain entities representing the analytics data model.
//!
//! Entities are plain data structures without business logic.
//!
//! # Entity Types
//!
//! - [`Event`] - A recorded interaction (click, view, conversion, signup)
//! - [`OwnedLink`] - A profile link, read from the links service
//!
//! # Design Pattern
//!
//! Entities follow the "New Type" pattern with separate structs for creation:
//! [`NewEvent`] is appended, [`Event`] is what the store hands back.

pub mod event;
pub mod link;

pub use event::{
    DeviceClass, DeviceInfo, Event, EventKind, EventPayload, GeoInfo, NewEvent, VisitorInfo,
};
pub use link::OwnedLink;
