#![deny(warnings, rust_2018_idioms)]
#![forbid(unsafe_code)]

mod cluster;
mod convert;

pub use self::cluster::Cluster;
pub use k8s_openapi::api::{
    self,
    apps::v1::Deployment,
    core::v1::{ConfigMap, Pod, Service},
};
pub use kube::{
    api::{ObjectMeta, ResourceExt},
    Client,
};
