#![deny(warnings, rust_2018_idioms)]
#![forbid(unsafe_code)]

mod discover;
pub mod gateway;
mod labels;
pub mod report;
mod resource;
pub mod rules;
pub mod selector;
pub mod summary;
mod terminal;

pub use self::{
    discover::DiscoverResources,
    labels::Labels,
    report::{Report, RuleResult},
    resource::{Deployment, Pod, Service, ServicePort},
    terminal::{Glyphs, TerminalEnv},
};

/// The label that names the application a workload belongs to.
pub const APP_LABEL: &str = "app";
