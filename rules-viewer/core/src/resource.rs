use crate::{Labels, APP_LABEL};

/// A point-in-time view of a pod.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Pod {
    pub name: String,
    pub namespace: String,
    pub labels: Labels,
    pub service_account_name: Option<String>,
    pub phase: Option<String>,
    pub node_name: Option<String>,
    pub pod_ip: Option<String>,
}

/// A point-in-time view of a deployment.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Deployment {
    pub name: String,
    pub namespace: String,
    pub labels: Labels,
    pub replicas: i32,
    pub ready_replicas: i32,

    /// The deployment's `matchLabels` pod selector.
    pub selector: Labels,
}

/// A point-in-time view of a service.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Service {
    pub name: String,
    pub namespace: String,
    pub labels: Labels,
    pub ports: Vec<ServicePort>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ServicePort {
    pub name: Option<String>,
    pub port: i32,

    /// The target port, either a number or a container port name.
    pub target_port: Option<String>,
    pub protocol: Option<String>,
}

// === impl Pod ===

impl Pod {
    /// The value of the pod's `app` label, if set.
    pub fn app_label(&self) -> Option<&str> {
        self.labels.get(APP_LABEL)
    }

    /// The pod's service account, if set to a non-empty value.
    pub fn service_account(&self) -> Option<&str> {
        self.service_account_name
            .as_deref()
            .filter(|sa| !sa.is_empty())
    }
}

// === impl ServicePort ===

impl ServicePort {
    /// The port's name, if set to a non-empty value.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref().filter(|n| !n.is_empty())
    }
}

impl std::fmt::Display for ServicePort {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.name().unwrap_or("<unnamed>"), self.port)?;
        if let Some(target) = self.target_port.as_deref() {
            write!(f, "->{target}")?;
        }
        if let Some(protocol) = self.protocol.as_deref() {
            write!(f, "/{protocol}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_service_account_is_unset() {
        let pod = Pod {
            service_account_name: Some(String::new()),
            ..Default::default()
        };
        assert_eq!(pod.service_account(), None);

        let pod = Pod {
            labels: Labels::from_iter(Some(("app", "web"))),
            service_account_name: Some("web".to_string()),
            ..Default::default()
        };
        assert_eq!(pod.service_account(), Some("web"));
        assert_eq!(pod.app_label(), Some("web"));
    }

    #[test]
    fn display_port() {
        let port = ServicePort {
            name: Some("http-api".to_string()),
            port: 80,
            target_port: Some("8080".to_string()),
            protocol: Some("TCP".to_string()),
        };
        assert_eq!(port.to_string(), "http-api:80->8080/TCP");

        let port = ServicePort {
            port: 9090,
            ..Default::default()
        };
        assert_eq!(port.to_string(), "<unnamed>:9090");
    }
}
