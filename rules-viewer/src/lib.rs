#![deny(warnings, rust_2018_idioms)]
#![forbid(unsafe_code)]

mod args;
mod inspect;

pub use self::args::Args;
pub use k8s_rules_viewer_core as core;
pub use k8s_rules_viewer_k8s as k8s;
