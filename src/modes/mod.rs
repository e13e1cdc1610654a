//! Enumeration modes

pub mod vhost;
