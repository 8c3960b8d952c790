//! Error types shared by the domain, gateway and service layers.

pub mod domain;

pub use domain::{DomainError, InfraErrorKind, NotFoundKind, ValidationKind};
