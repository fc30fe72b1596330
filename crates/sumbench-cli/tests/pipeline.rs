//! End-to-end pipeline tests: mock provider → engine → analyzer → reports.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use sumbench_core::analyzer::Analyzer;
use sumbench_core::engine::{ModelSpec, NoopReporter, SummaryEngine, SummaryEngineConfig};
use sumbench_core::model::{PromptConstraints, SummaryTask};
use sumbench_core::report::{check_tables, parse_markdown_tables, ComparisonReport};
use sumbench_core::traits::LlmProvider;
use sumbench_providers::mock::MockProvider;
use sumbench_report::{generate_html, render_markdown};

const ARTICLE: &str = "Residential rents in Berlin rose 6 percent in 2023. \
Vacancy fell to 1.2 percent. Analysts expect rents to keep rising in 2024.";

fn task() -> SummaryTask {
    SummaryTask {
        id: "berlin".into(),
        name: "Berlin rents".into(),
        description: String::new(),
        article: None,
        source_word_count: Some(4200),
        constraints: PromptConstraints {
            min_words: 10,
            max_words: 30,
            structure_markers: vec!["1.".into(), "2.".into(), "3.".into()],
        },
        key_elements: vec!["Berlin".into(), "2023".into(), "vacancy".into()],
        source_facts: vec!["6 percent".into(), "1.2 percent".into()],
        markers: Default::default(),
        weights: None,
        summaries: vec![],
    }
}

fn engine(mock: MockProvider) -> SummaryEngine {
    let mut providers: HashMap<String, Arc<dyn LlmProvider>> = HashMap::new();
    providers.insert("mock".into(), Arc::new(mock));
    SummaryEngine::new(
        providers,
        SummaryEngineConfig {
            retry_delay: Duration::from_millis(1),
            ..Default::default()
        },
    )
}

#[tokio::test]
async fn summaries_flow_into_a_consistent_report() {
    let mut by_model = HashMap::new();
    by_model.insert(
        "good".to_string(),
        "1. Berlin rents rose 6 percent in 2023. 2. Vacancy fell to 1.2 percent. \
         3. Further increases are expected."
            .to_string(),
    );
    by_model.insert("terse".to_string(), "Rents rose.".to_string());
    let engine = engine(MockProvider::with_model_responses(by_model));

    let task = task();
    let models = [
        ModelSpec::parse("mock/good", "mock"),
        ModelSpec::parse("mock/terse", "mock"),
    ];
    let run = engine
        .run(ARTICLE, &task.constraints, &models, &NoopReporter)
        .await
        .unwrap();
    assert!(run.failures.is_empty());
    assert_eq!(run.records.len(), 2);

    let analyses = Analyzer::default().analyze_all(
        run.records
            .iter()
            .map(|r| (r.model.as_str(), r.summary.as_str())),
        &task,
    );
    let report = ComparisonReport::new(&task, analyses);
    assert_eq!(report.analyses[0].model, "good");
    assert!(report.analyses[0].total_score > report.analyses[1].total_score);
    assert_eq!(report.analyses[0].metrics.faithfulness, 100.0);
    assert_eq!(report.analyses[1].metrics.faithfulness, 0.0);

    let markdown = render_markdown(&report);
    let parsed = parse_markdown_tables(&markdown).unwrap();
    assert_eq!(parsed.rows.len(), 2);
    assert!(check_tables(&parsed).is_empty());

    let html = generate_html(&report);
    assert!(html.contains("good") && html.contains("terse"));
}

#[tokio::test]
async fn prompt_carries_constraints() {
    let mock = Arc::new(MockProvider::with_fixed_response("1. A. 2. B. 3. C."));
    let mut providers: HashMap<String, Arc<dyn LlmProvider>> = HashMap::new();
    providers.insert("mock".into(), mock.clone());
    let engine = SummaryEngine::new(providers, SummaryEngineConfig::default());

    let task = task();
    engine
        .run(
            ARTICLE,
            &task.constraints,
            &[ModelSpec::parse("mock/any", "mock")],
            &NoopReporter,
        )
        .await
        .unwrap();

    let request = mock.last_request().unwrap();
    assert!(request.prompt.contains("10 to 30 words"));
    assert!(request.prompt.contains(ARTICLE));
    assert_eq!(mock.call_count(), 1);
}

#[test]
fn report_json_roundtrip_and_regression() {
    let task = task();
    let analyzer = Analyzer::default();
    let strong = "1. Berlin rents rose 6 percent in 2023. 2. Vacancy fell to 1.2 percent. 3. More later.";
    let weak = "Rents rose.";

    let baseline = ComparisonReport::new(&task, analyzer.analyze_all([("m1", strong)], &task));
    let current = ComparisonReport::new(&task, analyzer.analyze_all([("m1", weak)], &task));

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("baseline.json");
    baseline.save_json(&path).unwrap();
    let loaded = ComparisonReport::load_json(&path).unwrap();
    assert_eq!(loaded.id, baseline.id);
    assert_eq!(loaded.analyses, baseline.analyses);

    let diff = current.compare(&loaded, 1.0);
    assert!(diff.has_regressions());
    assert_eq!(diff.regressions[0].model, "m1");
    assert!(diff.regressions[0].delta < -1.0);

    let same = loaded.compare(&baseline, 1.0);
    assert!(!same.has_regressions());
    assert_eq!(same.unchanged, 1);
}
