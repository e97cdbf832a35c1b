use crate::Glyphs;
use serde::Serialize;

/// The verdict of a single rule.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct RuleResult {
    pub name: String,
    pub description: String,
    pub passed: bool,
}

/// The ordered verdicts of one compliance run.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Report {
    pub namespace: String,
    pub results: Vec<RuleResult>,
}

// === impl Report ===

impl Report {
    pub fn passed(&self) -> usize {
        self.results.iter().filter(|r| r.passed).count()
    }

    pub fn is_compliant(&self) -> bool {
        self.results.iter().all(|r| r.passed)
    }
}

/// Formats a report as one line per verdict under a namespace header.
pub fn render(report: &Report, glyphs: &Glyphs) -> String {
    let mut lines = Vec::with_capacity(report.results.len() + 1);
    lines.push(format!("Rules compliance for namespace {}:", report.namespace));
    for RuleResult {
        name,
        description,
        passed,
    } in &report.results
    {
        lines.push(format!("{} {name}: {description}", glyphs.status(*passed)));
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mk_report() -> Report {
        Report {
            namespace: "ns-0".to_string(),
            results: vec![
                RuleResult {
                    name: "a".to_string(),
                    description: "looks good".to_string(),
                    passed: true,
                },
                RuleResult {
                    name: "b".to_string(),
                    description: "looks bad".to_string(),
                    passed: false,
                },
            ],
        }
    }

    #[test]
    fn render_ascii() {
        assert_eq!(
            render(&mk_report(), &Glyphs::ASCII),
            "Rules compliance for namespace ns-0:\n[+] a: looks good\n[!] b: looks bad"
        );
    }

    #[test]
    fn render_unicode() {
        let rendered = render(&mk_report(), &Glyphs::UNICODE);
        let lines = rendered.lines().collect::<Vec<_>>();
        assert_eq!(lines[1], "✅ a: looks good");
        assert_eq!(lines[2], "❌ b: looks bad");
    }

    #[test]
    fn counts() {
        let report = mk_report();
        assert_eq!(report.passed(), 1);
        assert!(!report.is_compliant());
    }

    #[test]
    fn serializes() {
        let json = serde_json::to_value(mk_report()).unwrap();
        assert_eq!(json["namespace"], "ns-0");
        assert_eq!(json["results"][1]["passed"], false);
    }
}
