// src/exports/summary.rs
//
// Builds the slide deck shown on the portfolio summary page. The same deck
// backs the print fallback and the section capture export, so slide identity
// doubles as the capture section list.

use serde::Serialize;

use crate::portfolios::models::{CaseStudy, DayPlan, Education, Experience, Portfolio};

/// One slide of the summary deck. Slides with no backing data are omitted
/// entirely rather than rendered empty.
#[derive(Debug, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Slide {
    Cover {
        full_name: Option<String>,
        title: Option<String>,
        photo_url: Option<String>,
    },
    Dashboard {
        summary: Option<String>,
        achievements: Vec<String>,
    },
    Experience {
        experience: Vec<Experience>,
        education: Vec<Education>,
    },
    CaseStudy {
        case_study: CaseStudy,
    },
    Skills {
        skills: Vec<String>,
        hobbies: Vec<String>,
    },
    Plan {
        day_plan: DayPlan,
    },
    Contact {
        full_name: Option<String>,
        email: Option<String>,
        phone: Option<String>,
    },
}

impl Slide {
    /// Stable section name, also used as the DOM anchor on the summary page
    pub fn section_name(&self) -> &'static str {
        match self {
            Slide::Cover { .. } => "cover",
            Slide::Dashboard { .. } => "dashboard",
            Slide::Experience { .. } => "experience",
            Slide::CaseStudy { .. } => "case-study",
            Slide::Skills { .. } => "skills",
            Slide::Plan { .. } => "plan",
            Slide::Contact { .. } => "contact",
        }
    }

    /// CSS selector targeting this slide's section on the summary page
    pub fn selector(&self) -> String {
        format!("#slide-{}", self.section_name())
    }
}

fn day_plan_has_content(plan: &DayPlan) -> bool {
    plan.day_30.is_some() || plan.day_60.is_some() || plan.day_90.is_some()
}

/// Assemble the deck for one portfolio. Cover and contact always appear; the
/// middle slides appear only when the record carries matching data.
pub fn build_summary_slides(portfolio: &Portfolio) -> Vec<Slide> {
    let mut slides = Vec::new();

    slides.push(Slide::Cover {
        full_name: portfolio.full_name.clone(),
        title: portfolio.title.clone(),
        photo_url: portfolio.photo_url.clone(),
    });

    if portfolio.summary.is_some() || !portfolio.achievements.is_empty() {
        slides.push(Slide::Dashboard {
            summary: portfolio.summary.clone(),
            achievements: portfolio.achievements.clone(),
        });
    }

    if !portfolio.experience.is_empty() || !portfolio.education.is_empty() {
        slides.push(Slide::Experience {
            experience: portfolio.experience.clone(),
            education: portfolio.education.clone(),
        });
    }

    if let Some(case_study) = &portfolio.case_study {
        slides.push(Slide::CaseStudy {
            case_study: case_study.clone(),
        });
    }

    if !portfolio.skills.is_empty() || !portfolio.hobbies.is_empty() {
        slides.push(Slide::Skills {
            skills: portfolio.skills.clone(),
            hobbies: portfolio.hobbies.clone(),
        });
    }

    if let Some(day_plan) = &portfolio.day_plan {
        if day_plan_has_content(day_plan) {
            slides.push(Slide::Plan {
                day_plan: day_plan.clone(),
            });
        }
    }

    slides.push(Slide::Contact {
        full_name: portfolio.full_name.clone(),
        email: portfolio.email.clone(),
        phone: portfolio.phone.clone(),
    });

    slides
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::portfolios::models::PlanPhase;

    fn bare_portfolio() -> Portfolio {
        Portfolio {
            id: "P_TEST01".to_string(),
            full_name: Some("Jane Doe".to_string()),
            title: Some("Account Executive".to_string()),
            email: Some("jane@example.com".to_string()),
            phone: None,
            photo_url: None,
            resume_url: None,
            summary: None,
            skills: vec![],
            achievements: vec![],
            hobbies: vec![],
            experience: vec![],
            education: vec![],
            day_plan: None,
            case_study: None,
            template: "executive".to_string(),
            created_by: None,
            created_date: "2026-01-01 00:00:00".to_string(),
            updated_date: "2026-01-01 00:00:00".to_string(),
        }
    }

    #[test]
    fn test_bare_record_gets_cover_and_contact_only() {
        let slides = build_summary_slides(&bare_portfolio());
        let names: Vec<&str> = slides.iter().map(|s| s.section_name()).collect();
        assert_eq!(names, vec!["cover", "contact"]);
    }

    #[test]
    fn test_full_record_gets_all_slides_in_order() {
        let mut portfolio = bare_portfolio();
        portfolio.summary = Some("Quota crusher".to_string());
        portfolio.skills = vec!["SPIN".to_string()];
        portfolio.experience = vec![Experience::default()];
        portfolio.case_study = Some(CaseStudy::default());
        portfolio.day_plan = Some(DayPlan {
            day_30: Some(PlanPhase::default()),
            day_60: None,
            day_90: None,
        });

        let slides = build_summary_slides(&portfolio);
        let names: Vec<&str> = slides.iter().map(|s| s.section_name()).collect();
        assert_eq!(
            names,
            vec!["cover", "dashboard", "experience", "case-study", "skills", "plan", "contact"]
        );
    }

    #[test]
    fn test_empty_day_plan_is_omitted() {
        let mut portfolio = bare_portfolio();
        portfolio.day_plan = Some(DayPlan::default());
        let slides = build_summary_slides(&portfolio);
        assert!(slides.iter().all(|s| s.section_name() != "plan"));
    }

    #[test]
    fn test_slide_serializes_with_kind_tag() {
        let slide = Slide::Cover {
            full_name: Some("Jane Doe".to_string()),
            title: None,
            photo_url: None,
        };
        let value = serde_json::to_value(&slide).unwrap();
        assert_eq!(value["kind"], "cover");
        assert_eq!(value["full_name"], "Jane Doe");
    }

    #[test]
    fn test_selector_matches_section_name() {
        let slide = Slide::Contact {
            full_name: None,
            email: None,
            phone: None,
        };
        assert_eq!(slide.selector(), "#slide-contact");
    }
}
