//! Integration tests for report layout.

use chrono::NaiveDate;

use hirelens::layout::{PageGeometry, Rgb};
use hirelens::{
    overall_score, parse_analysis_response, CalloutColor, Error, Hirelens, LayoutEngine,
    LayoutInstruction, LayoutOptions, OverflowPolicy, RecommendationTier, ReportLayout,
    ReportModel,
};

const ANALYSIS: &str = r#"Here is the analysis you asked for:
```json
{
  "summary": "Backend engineer with eight years of payments experience and a record of leading migrations.",
  "match_score": 80,
  "strengths": ["Deep Rust knowledge", "Mentors junior engineers"],
  "weaknesses": ["Limited frontend exposure"],
  "skills": ["Rust", "Go", "PostgreSQL", "Kafka"],
  "suggestions": ["Pair with the web team for a quarter"],
  "technical_score": 88,
  "communication_score": 74,
  "leadership_score": 81,
  "problem_solving_score": 86,
  "teamwork_score": 79,
  "adaptability_score": 72,
  "experience_years": 8,
  "education_level": "BSc Computer Science",
  "salary_range": "$150k - $170k",
  "interview_readiness": "Ready for system design round",
  "cultural_fit_indicators": ["Prefers written design reviews"],
  "hiring_recommendation": "Hire",
  "red_flags": [],
  "next_steps": ["Schedule the system design interview"]
}
```"#;

fn date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 10, 1).unwrap()
}

fn options() -> LayoutOptions {
    LayoutOptions::new().with_date(date())
}

fn model() -> ReportModel {
    parse_analysis_response(ANALYSIS).unwrap()
}

fn callout_color(layout: &ReportLayout) -> Rgb {
    layout
        .instructions
        .iter()
        .rev()
        .find_map(|p| match p.instruction {
            LayoutInstruction::FilledBox { color, .. } => Some(color),
            _ => None,
        })
        .unwrap()
}

#[test]
fn test_overall_score_from_partial_scores() {
    let model = ReportModel {
        match_score: Some(80.0),
        ..Default::default()
    };
    let overall = overall_score(&model);
    assert_eq!(overall, 76);
    assert_eq!(
        RecommendationTier::from_score(overall),
        RecommendationTier::Recommended
    );

    let layout = LayoutEngine::new(options()).render(&model).unwrap();
    let lines = layout.text_lines();
    assert!(lines.iter().any(|l| l == "Overall Score: 76%"));
    assert!(lines.iter().any(|l| l == "Recommended"));
}

#[test]
fn test_recommendation_colors() {
    let cases = [
        ("Strong No Hire", CalloutColor::Red, Rgb::RED),
        ("Needs More Info (Caution)", CalloutColor::Amber, Rgb::AMBER),
        ("Hire", CalloutColor::Green, Rgb::GREEN),
    ];
    for (recommendation, color, rgb) in cases {
        assert_eq!(CalloutColor::from_recommendation(recommendation), color);

        let model = ReportModel {
            hiring_recommendation: recommendation.to_string(),
            ..Default::default()
        };
        let layout = LayoutEngine::new(options()).render(&model).unwrap();
        assert_eq!(callout_color(&layout), rgb, "{}", recommendation);
    }
}

#[test]
fn test_footers_cover_every_page() {
    let mut model = model();
    model.strengths = (1..=30)
        .map(|i| format!("Accomplishment {} with measurable impact on the platform", i))
        .collect();
    let layout = LayoutEngine::new(options()).render(&model).unwrap();
    let total = layout.total_pages;
    assert!(total >= 2);

    let mut pages: Vec<u32> = layout
        .footers()
        .map(|p| match p.instruction {
            LayoutInstruction::Footer {
                page_number,
                total_pages,
            } => {
                assert_eq!(total_pages, total);
                assert_eq!(p.page, page_number);
                page_number
            }
            _ => unreachable!(),
        })
        .collect();
    pages.sort_unstable();
    assert_eq!(pages, (1..=total).collect::<Vec<_>>());

    let last = layout.text_lines().pop().unwrap();
    assert_eq!(
        last,
        format!("HR Analysis Report | Page {} of {} | Generated 2024-10-01", total, total)
    );
}

#[test]
fn test_layout_is_deterministic() {
    let engine = LayoutEngine::new(options());
    let first = engine.render(&model()).unwrap();
    let second = engine.render(&model()).unwrap();

    assert_eq!(first.total_pages, second.total_pages);
    assert_eq!(first.instructions, second.instructions);
    assert_eq!(
        serde_json::to_string(&first).unwrap(),
        serde_json::to_string(&second).unwrap()
    );
}

#[test]
fn test_minimal_report_fits_tall_page() {
    let geometry = PageGeometry {
        width: 210.0,
        height: 600.0,
        margin: 25.0,
    };
    let layout = LayoutEngine::new(options().with_geometry(geometry))
        .render(&ReportModel::default())
        .unwrap();
    assert_eq!(layout.total_pages, 1);
    assert_eq!(layout.footers().count(), 1);
    assert!(layout.instructions.iter().all(|p| p.page == 1));
}

#[test]
fn test_pages_never_decrease() {
    let mut model = model();
    model.weaknesses = (1..=25)
        .map(|i| format!("Gap {} that should be discussed during the interview loop", i))
        .collect();
    let layout = LayoutEngine::new(options()).render(&model).unwrap();

    let body: Vec<u32> = layout
        .instructions
        .iter()
        .filter(|p| !matches!(p.instruction, LayoutInstruction::Footer { .. }))
        .map(|p| p.page)
        .collect();
    assert!(body.windows(2).all(|w| w[0] <= w[1]));
    assert_eq!(body.last().copied(), Some(layout.total_pages));
}

#[test]
fn test_overflowing_block() {
    let model = ReportModel {
        summary: "overflowing ".repeat(6000),
        ..Default::default()
    };

    let err = Hirelens::new()
        .with_date(date())
        .with_overflow(OverflowPolicy::Fail)
        .layout(&model)
        .err()
        .unwrap();
    assert!(matches!(err, Error::LayoutOverflowImpossible { .. }));

    let report = Hirelens::new().with_date(date()).layout(&model).unwrap();
    let summary = report
        .layout
        .instructions
        .iter()
        .find_map(|p| match &p.instruction {
            LayoutInstruction::Text { content, .. } if content.starts_with("overflowing") => {
                Some(content.clone())
            }
            _ => None,
        })
        .unwrap();
    assert!(summary.ends_with("..."));
}

#[test]
fn test_hirelens_analysis_response() {
    let report = Hirelens::new().with_date(date()).analysis(ANALYSIS).unwrap();
    let lines = report.layout.text_lines();

    assert!(lines.iter().any(|l| l == "Executive Summary"));
    assert!(lines.iter().any(|l| l == "Experience: 8 years"));
    assert!(lines.iter().any(|l| l.contains("Rust, Go, PostgreSQL, Kafka")));
    assert!(lines.iter().any(|l| l == "Cultural Fit"));
    assert!(lines.iter().any(|l| l == "Next Steps"));
    assert!(!lines.iter().any(|l| l == "Red Flags"));
    assert_eq!(report.filename("pdf"), "hr-analysis-report-2024-10-01.pdf");
}

#[test]
fn test_analysis_missing_required_field() {
    let response = ANALYSIS.replace(
        "\"next_steps\": [\"Schedule the system design interview\"]",
        "\"notes\": []",
    );
    assert_ne!(response, ANALYSIS);

    let err = parse_analysis_response(&response).unwrap_err();
    assert!(matches!(&err, Error::InvalidModel(msg) if msg == "Missing field: next_steps"));

    let err = Hirelens::new().analysis(&response).unwrap_err();
    assert!(matches!(err, Error::InvalidModel(_)));
}
