// src/portfolios/templates.rs
//
// Closed registry of presentation templates. Resolution is total: every
// template value, known or unknown, yields either a key or a recovery
// payload, never a panic or a silent substitution.

use serde::{Deserialize, Serialize};

/// The known presentation templates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TemplateKey {
    Executive,
    Modern,
    Minimal,
    Creative,
    Bold,
    Elegant,
    Corporate,
    Gradient,
    Mono,
    Split,
    Classic,
}

/// Used when a record's template is absent or empty
pub const DEFAULT_TEMPLATE: TemplateKey = TemplateKey::Executive;

impl TemplateKey {
    pub const ALL: [TemplateKey; 11] = [
        TemplateKey::Executive,
        TemplateKey::Modern,
        TemplateKey::Minimal,
        TemplateKey::Creative,
        TemplateKey::Bold,
        TemplateKey::Elegant,
        TemplateKey::Corporate,
        TemplateKey::Gradient,
        TemplateKey::Mono,
        TemplateKey::Split,
        TemplateKey::Classic,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TemplateKey::Executive => "executive",
            TemplateKey::Modern => "modern",
            TemplateKey::Minimal => "minimal",
            TemplateKey::Creative => "creative",
            TemplateKey::Bold => "bold",
            TemplateKey::Elegant => "elegant",
            TemplateKey::Corporate => "corporate",
            TemplateKey::Gradient => "gradient",
            TemplateKey::Mono => "mono",
            TemplateKey::Split => "split",
            TemplateKey::Classic => "classic",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|key| key.as_str() == value)
    }

    /// Whether the rendered view exposes the case-study editor.
    /// Exactly one template variant does.
    pub fn supports_case_study_editing(&self) -> bool {
        matches!(self, TemplateKey::Executive)
    }
}

/// One-click action the client can issue to heal an unknown template
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TemplateRecovery {
    pub action: &'static str,
    pub template: TemplateKey,
}

/// Outcome of template resolution for one record
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TemplateResolution {
    Ok {
        template: TemplateKey,
    },
    TemplateError {
        requested: String,
        recovery: TemplateRecovery,
    },
}

/// Resolve a stored template value. Absent or empty values fall back to the
/// default; unrecognized values produce an explicit error state with a
/// recovery action instead of rendering anything.
pub fn resolve_template(template: Option<&str>) -> TemplateResolution {
    match template {
        None => TemplateResolution::Ok {
            template: DEFAULT_TEMPLATE,
        },
        Some(value) if value.is_empty() => TemplateResolution::Ok {
            template: DEFAULT_TEMPLATE,
        },
        Some(value) => match TemplateKey::parse(value) {
            Some(key) => TemplateResolution::Ok { template: key },
            None => TemplateResolution::TemplateError {
                requested: value.to_string(),
                recovery: TemplateRecovery {
                    action: "reset_template",
                    template: DEFAULT_TEMPLATE,
                },
            },
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_known_key_round_trips() {
        for key in TemplateKey::ALL {
            assert_eq!(TemplateKey::parse(key.as_str()), Some(key));
            assert_eq!(
                resolve_template(Some(key.as_str())),
                TemplateResolution::Ok { template: key }
            );
        }
    }

    #[test]
    fn test_absent_and_empty_default_to_executive() {
        assert_eq!(
            resolve_template(None),
            TemplateResolution::Ok {
                template: TemplateKey::Executive
            }
        );
        assert_eq!(
            resolve_template(Some("")),
            TemplateResolution::Ok {
                template: TemplateKey::Executive
            }
        );
    }

    #[test]
    fn test_unknown_key_yields_recovery_not_panic() {
        match resolve_template(Some("vaporwave")) {
            TemplateResolution::TemplateError { requested, recovery } => {
                assert_eq!(requested, "vaporwave");
                assert_eq!(recovery.action, "reset_template");
                assert_eq!(recovery.template, TemplateKey::Executive);
            }
            other => panic!("expected TemplateError, got {:?}", other),
        }
    }

    #[test]
    fn test_resolution_serialization_shape() {
        let json = serde_json::to_value(resolve_template(Some("nope"))).unwrap();
        assert_eq!(json["status"], "template_error");
        assert_eq!(json["requested"], "nope");
        assert_eq!(json["recovery"]["action"], "reset_template");
        assert_eq!(json["recovery"]["template"], "executive");

        let ok = serde_json::to_value(resolve_template(Some("bold"))).unwrap();
        assert_eq!(ok["status"], "ok");
        assert_eq!(ok["template"], "bold");
    }

    #[test]
    fn test_single_template_supports_case_study_editing() {
        let count = TemplateKey::ALL
            .iter()
            .filter(|key| key.supports_case_study_editing())
            .count();
        assert_eq!(count, 1);
    }
}
