use super::*;
use crate::{
    tests::{mk_deployment, mk_pod, mk_service, FakeCluster},
    Labels,
};
use maplit::btreemap;

fn snapshot_with_service(service: Service) -> Snapshot {
    Snapshot {
        selector: "app=web".to_string(),
        service: Some(service),
        ..Default::default()
    }
}

#[test]
fn protocol_port_names() {
    for (name, ok) in [
        ("http", true),
        ("http-api", true),
        ("HTTP-api", true),
        ("http2", true),
        ("https-web", true),
        ("grpc", true),
        ("tcp-db", true),
        ("tls-passthrough", true),
        ("mongo-primary", true),
        ("redis", true),
        ("", false),
        ("-http", false),
        ("web", false),
        ("httpx-api", false),
        ("metrics", false),
        ("udp-dns", false),
    ] {
        assert_eq!(is_protocol_port_name(name), ok, "{name:?}");
    }
}

#[test]
fn service_account_must_match_app_label() {
    let rule = Rule::ServiceAccountMatchesLabel;

    let mut snapshot = Snapshot {
        selector: "app=web".to_string(),
        ..Default::default()
    };
    let result = rule.evaluate(&snapshot);
    assert!(!result.passed, "no pods");
    assert!(result.description.contains("app=web"));

    let mut mismatched = mk_pod("web-0", "web");
    mismatched.service_account_name = Some("default".to_string());
    snapshot.pods = vec![mismatched];
    assert!(!rule.evaluate(&snapshot).passed, "mismatched");

    let mut unlabeled = mk_pod("web-1", "web");
    unlabeled.labels = Labels::default();
    snapshot.pods.push(unlabeled);
    assert!(!rule.evaluate(&snapshot).passed, "unlabeled");

    let mut blank = mk_pod("web-2", "");
    blank.service_account_name = Some(String::new());
    snapshot.pods.push(blank);
    assert!(!rule.evaluate(&snapshot).passed, "blank service account");

    snapshot.pods.push(mk_pod("web-3", "web"));
    let result = rule.evaluate(&snapshot);
    assert!(result.passed, "one matching pod");
    assert!(result.description.contains("web-3"));
}

#[test]
fn deployment_requires_app_and_version() {
    let rule = Rule::DeploymentRequiredLabels;

    let mut snapshot = Snapshot::default();
    assert!(!rule.evaluate(&snapshot).passed, "no deployments");

    snapshot.deployments = vec![mk_deployment("web", btreemap! { "app" => "web" })];
    assert!(!rule.evaluate(&snapshot).passed, "missing version");

    snapshot.deployments.push(mk_deployment(
        "web-canary",
        btreemap! { "app" => "", "version" => "" },
    ));
    assert!(rule.evaluate(&snapshot).passed, "values are unconstrained");
}

#[test]
fn every_port_must_be_named() {
    let rule = Rule::ServicePortNaming;

    let result = rule.evaluate(&Snapshot::default());
    assert!(!result.passed);
    assert_eq!(result.description, "no service found");

    let snapshot = snapshot_with_service(mk_service("web", &[], None));
    assert!(!rule.evaluate(&snapshot).passed, "no ports");

    let snapshot = snapshot_with_service(mk_service("web", &["http-api", "grpc", ""], None));
    let result = rule.evaluate(&snapshot);
    assert!(!result.passed, "one unnamed port");
    assert!(result.description.contains("<unnamed:8082>"));

    let snapshot = snapshot_with_service(mk_service("web", &["http-api", "grpc", "metrics"], None));
    let result = rule.evaluate(&snapshot);
    assert!(!result.passed, "one unknown prefix");
    assert!(result.description.contains("metrics"));

    let snapshot = snapshot_with_service(mk_service("web", &["http-api", "grpc", "tcp-db"], None));
    assert!(rule.evaluate(&snapshot).passed);
}

#[test]
fn scrape_tls_must_be_exactly_true() {
    let rule = Rule::ServiceScrapeTls;

    for (value, ok) in [
        (Some("true"), true),
        (Some("True"), false),
        (Some("1"), false),
        (Some(""), false),
        (None, false),
    ] {
        let snapshot = snapshot_with_service(mk_service("web", &["http"], value));
        assert_eq!(rule.evaluate(&snapshot).passed, ok, "{value:?}");
    }

    assert!(!rule.evaluate(&Snapshot::default()).passed, "no service");
}

#[test]
fn report_has_every_rule_in_order() {
    let report = Evaluator::new().evaluate("ns-0", &Snapshot::default());
    assert_eq!(report.namespace, "ns-0");
    assert_eq!(
        report
            .results
            .iter()
            .map(|r| r.name.as_str())
            .collect::<Vec<_>>(),
        Rule::ALL.iter().map(Rule::name).collect::<Vec<_>>(),
    );
    assert!(report.results.iter().all(|r| !r.passed));
}

#[test]
fn audit_records_each_verdict() {
    let snapshot = snapshot_with_service(mk_service("web", &["http"], Some("true")));
    let mut evaluator = Evaluator::with_audit(Vec::new());
    evaluator.evaluate("ns-0", &snapshot);

    let audit = String::from_utf8(evaluator.into_audit().unwrap()).unwrap();
    let lines = audit.lines().collect::<Vec<_>>();
    assert_eq!(lines.len(), 4);
    assert!(lines[0].starts_with("ns-0\tservice-account-matches-label\tfail\t"));
    assert!(lines[2].starts_with("ns-0\tservice-port-naming\tpass\t"));
    assert!(lines[3].starts_with("ns-0\tservice-scrape-tls-label\tpass\t"));
}

#[test]
fn audit_failures_do_not_change_verdicts() {
    struct Broken;
    impl Write for Broken {
        fn write(&mut self, _: &[u8]) -> std::io::Result<usize> {
            Err(std::io::ErrorKind::BrokenPipe.into())
        }
        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    let snapshot = snapshot_with_service(mk_service("web", &["http"], Some("true")));
    let report = Evaluator::with_audit(Broken).evaluate("ns-0", &snapshot);
    assert_eq!(report.results.len(), 4);
    assert!(report.results[3].passed);
}

#[tokio::test]
async fn gather_degrades_failed_lookups() {
    let cluster = FakeCluster::default()
        .failing("app=web")
        .with_services(
            "argocd.argoproj.io/instance=web",
            vec![mk_service("web", &["http-api"], Some("true"))],
        );
    let resolved = Resolved {
        selector: "app=web".to_string(),
        pods: vec![mk_pod("web-0", "web")],
    };

    let snapshot = Snapshot::gather(&cluster, "ns-0", "app=web", resolved).await;
    assert!(snapshot.deployments.is_empty());
    assert_eq!(snapshot.pods.len(), 1);
    assert_eq!(snapshot.service.as_ref().map(|s| s.name.as_str()), Some("web"));

    let report = Evaluator::new().evaluate("ns-0", &snapshot);
    assert_eq!(
        report.results.iter().map(|r| r.passed).collect::<Vec<_>>(),
        vec![true, false, true, true]
    );
}

#[tokio::test]
async fn gather_everything() {
    let cluster = FakeCluster::default()
        .with_deployments(
            "app=web",
            vec![mk_deployment(
                "web",
                btreemap! { "app" => "web", "version" => "v1" },
            )],
        )
        .with_services("app=web", vec![mk_service("web", &["http"], None)]);
    let resolved = Resolved {
        selector: "app=web".to_string(),
        pods: vec![],
    };

    let snapshot = Snapshot::gather(&cluster, "ns-0", "web", resolved).await;
    assert_eq!(snapshot.deployments.len(), 1);
    assert_eq!(
        cluster.calls(),
        vec!["deployments ns-0 app=web", "services ns-0 app=web"]
    );

    let report = Evaluator::new().evaluate("ns-0", &snapshot);
    assert_eq!(
        report.results.iter().map(|r| r.passed).collect::<Vec<_>>(),
        vec![false, true, true, false]
    );
}
