mod common;

use common::{PLAN_REPLY, StubModel, logistics, planning_registry};
use planwright::planning::{FETCH_MODERATORS, FETCH_PARTICIPANTS, GENERATE_EVENT_THEMES, REFINE_EVENT_PLAN};
use planwright::planning::{ModeratorFilter, ParticipantFilter};
use planwright::prelude::*;
use serde_json::json;
use std::sync::Arc;

#[tokio::test]
async fn test_theme_generation_dedupes_and_caps() {
    let llm = StubModel::replying("1. Smash Bash\n2. Net Gains\n2. Net Gains\n");
    let registry = planning_registry(llm.clone());
    let themes = registry.resolve(GENERATE_EVENT_THEMES, NodeValue::Null).unwrap();

    let out = themes
        .invoke(json!({"event_idea": "pickle ball tournament"}))
        .await
        .unwrap();

    assert_eq!(out, json!({"themes": ["Smash Bash", "Net Gains"]}));
    assert_eq!(llm.calls(), 1);
    assert!(llm.prompts()[0].contains("'pickle ball tournament'"));

    let capped = registry
        .resolve(GENERATE_EVENT_THEMES, json!({"max_themes": 1}))
        .unwrap();
    let out = capped.invoke(json!({"event_idea": "chess"})).await.unwrap();
    assert_eq!(out, json!({"themes": ["Smash Bash"]}));
}

#[tokio::test]
async fn test_invalid_input_never_reaches_the_model() {
    let llm = StubModel::replying("1. Unused");
    let registry = planning_registry(llm.clone());
    let themes = registry.resolve(GENERATE_EVENT_THEMES, NodeValue::Null).unwrap();
    let plan = registry.resolve(REFINE_EVENT_PLAN, NodeValue::Null).unwrap();

    let bad_inputs = [
        (&themes, json!({})),
        (&themes, json!({"event_idea": 42})),
        (&themes, json!({"event_idea": "x", "audience": "kids"})),
        (&themes, json!("just a string")),
        (&plan, json!({"selected_theme": "Smash Bash"})),
    ];
    for (unit, input) in bad_inputs {
        let err = unit.invoke(input).await.unwrap_err();
        assert!(
            matches!(
                err,
                Error::Validation {
                    phase: Phase::Input,
                    ..
                }
            ),
            "{err}"
        );
    }
    assert_eq!(llm.calls(), 0);
}

#[tokio::test]
async fn test_model_failure_is_a_collaborator_error_and_unit_stays_usable() {
    let llm = StubModel::with(|prompt| {
        if prompt.contains("'outage'") {
            Err(LLMError::Provider("HTTP 503: overloaded".into()))
        } else {
            Ok("1. Back Online".into())
        }
    });
    let registry = planning_registry(llm.clone());
    let themes = registry.resolve(GENERATE_EVENT_THEMES, NodeValue::Null).unwrap();

    let err = themes
        .invoke(json!({"event_idea": "outage"}))
        .await
        .unwrap_err();
    match &err {
        Error::Collaborator {
            capability,
            input_summary,
            source,
        } => {
            assert_eq!(capability, GENERATE_EVENT_THEMES);
            assert!(input_summary.contains("outage"));
            assert!(matches!(source, CollaboratorError::Llm(LLMError::Provider(_))));
        }
        other => panic!("expected a collaborator error, got {other:?}"),
    }

    let out = themes.invoke(json!({"event_idea": "recovery"})).await.unwrap();
    assert_eq!(out["themes"], json!(["Back Online"]));
}

#[tokio::test]
async fn test_response_without_themes_is_not_an_empty_success() {
    let llm = StubModel::replying("\n  \n**\n");
    let registry = planning_registry(llm);
    let themes = registry.resolve(GENERATE_EVENT_THEMES, NodeValue::Null).unwrap();

    let err = themes.invoke(json!({"event_idea": "chess"})).await.unwrap_err();
    assert!(err.is_collaborator());
}

#[tokio::test]
async fn test_participants_limit() {
    let registry = planning_registry(StubModel::replying(""));
    let participants = registry.resolve(FETCH_PARTICIPANTS, NodeValue::Null).unwrap();

    let out = participants.invoke(json!({"limit": 2})).await.unwrap();
    assert_eq!(out["count"], 2);
    assert_eq!(out["records"].as_array().unwrap().len(), 2);
    assert_eq!(out["records"][0]["name"], "Alice Smith");

    let unlimited = participants.invoke(json!({"limit": 0})).await.unwrap();
    assert_eq!(unlimited["count"], 10);

    let negative = participants.invoke(json!({"limit": -1})).await.unwrap_err();
    assert!(negative.is_validation());
}

#[tokio::test]
async fn test_moderators_by_name_returns_only_found() {
    let registry = planning_registry(StubModel::replying(""));
    let moderators = registry.resolve(FETCH_MODERATORS, NodeValue::Null).unwrap();

    let out = moderators
        .invoke(json!({"names": ["Jai Kumar", "Nonexistent"]}))
        .await
        .unwrap();
    assert_eq!(out["count"], 1);
    assert_eq!(out["records"][0]["name"], "Jai Kumar");
    assert_eq!(out["records"][0]["city"], "Hyderabad");

    let by_expertise = moderators
        .invoke(json!({"expertise": "Leadership"}))
        .await
        .unwrap();
    assert_eq!(by_expertise["count"], 1);
    assert_eq!(by_expertise["records"][0]["name"], "Priya Sharma");

    // an empty name list is no filter at all
    let all = moderators.invoke(json!({"names": []})).await.unwrap();
    assert_eq!(all["count"], 5);
}

#[tokio::test]
async fn test_count_always_matches_records() {
    let registry = planning_registry(StubModel::replying(""));
    let moderators = registry.resolve(FETCH_MODERATORS, NodeValue::Null).unwrap();
    let participants = registry.resolve(FETCH_PARTICIPANTS, NodeValue::Null).unwrap();

    let filters = [
        (&moderators, json!({})),
        (&moderators, json!({"names": ["Nobody"]})),
        (&moderators, json!({"expertise": "tech"})),
        (&participants, json!({"names": ["Grace Lee", "Jack Anderson"]})),
        (&participants, json!({"limit": 7})),
        (&participants, json!({"limit": 500})),
    ];
    for (unit, filter) in filters {
        let out = unit.invoke(filter).await.unwrap();
        assert_eq!(
            out["count"].as_u64().unwrap() as usize,
            out["records"].as_array().unwrap().len()
        );
    }
}

#[test]
fn test_missing_collaborators_fail_at_resolve() {
    let store_only = Resources::new().with_store(Arc::new(InMemoryStore::with_sample_data()));
    let mut registry = Registry::with_resources(store_only);
    register_event_planning(&mut registry).unwrap();

    assert!(registry.resolve(FETCH_MODERATORS, NodeValue::Null).is_ok());
    for name in [GENERATE_EVENT_THEMES, REFINE_EVENT_PLAN] {
        let err = registry.resolve(name, NodeValue::Null).unwrap_err();
        assert!(err.is_configuration(), "{name}: {err}");
    }
}

#[test]
fn test_bad_configuration_fails_at_resolve() {
    let registry = planning_registry(StubModel::replying(""));
    let cases = [
        (GENERATE_EVENT_THEMES, json!({"max_themes": 0})),
        (GENERATE_EVENT_THEMES, json!({"temperature": 0.3})),
        (REFINE_EVENT_PLAN, json!({"model": 7})),
        (FETCH_MODERATORS, json!({"table": "moderators"})),
        (FETCH_PARTICIPANTS, json!({"default_limit": 0})),
    ];
    for (name, config) in cases {
        let err = registry.resolve(name, config).unwrap_err();
        assert!(err.is_configuration(), "{name}: {err}");
    }
}

#[tokio::test]
async fn test_resolving_twice_gives_equivalent_units() {
    let llm = StubModel::replying("1. Smash Bash\n2. Net Gains");
    let registry = planning_registry(llm.clone());
    let config = json!({"max_themes": 2});
    let first = registry.resolve(GENERATE_EVENT_THEMES, config.clone()).unwrap();
    let second = registry.resolve(GENERATE_EVENT_THEMES, config).unwrap();

    let input = json!({"event_idea": "badminton"});
    let (a, b) = futures::join!(first.invoke(input.clone()), second.invoke(input));
    assert_eq!(a.unwrap(), b.unwrap());
    assert_eq!(first.input_schema(), second.input_schema());
    assert_eq!(llm.calls(), 2);
}

#[tokio::test]
async fn test_shared_registry_resolves_concurrently() {
    let llm = StubModel::replying("1. Smash Bash\n2. Net Gains\n3. Dink Disco");
    let registry = Arc::new(planning_registry(llm.clone()));

    let tasks: Vec<_> = (0..8)
        .map(|i| {
            let registry = Arc::clone(&registry);
            tokio::spawn(async move {
                let (name, input) = if i % 2 == 0 {
                    (GENERATE_EVENT_THEMES, json!({"event_idea": "pickle ball tournament"}))
                } else {
                    (FETCH_MODERATORS, json!({"expertise": "tech"}))
                };
                let unit = registry.resolve(name, json!({}))?;
                unit.invoke(input).await
            })
        })
        .collect();

    let mut results = Vec::new();
    for task in tasks {
        results.push(task.await.unwrap().unwrap());
    }

    let (themes, moderators): (Vec<_>, Vec<_>) = results
        .into_iter()
        .enumerate()
        .partition(|(i, _)| i % 2 == 0);
    assert!(themes.iter().all(|(_, out)| out == &themes[0].1));
    assert!(moderators.iter().all(|(_, out)| out == &moderators[0].1));
    assert_eq!(themes[0].1["themes"].as_array().unwrap().len(), 3);
    assert!(moderators[0].1["count"].as_u64().unwrap() > 0);
    assert_eq!(llm.calls(), 4);
}

#[tokio::test]
async fn test_plan_refinement_single_and_multi_day() {
    let llm = StubModel::replying(PLAN_REPLY);
    let registry = planning_registry(llm.clone());
    let plan = registry.resolve(REFINE_EVENT_PLAN, NodeValue::Null).unwrap();

    let input = json!({
        "selected_theme": "Smash Bash",
        "start_date": "2026-05-01",
        "end_date": "2026-05-01",
        "start_time": "9 AM",
        "end_time": "5 PM",
        "location": "Hyderabad Sports Arena",
        "event_type": "tournament"
    });
    let out = plan.invoke(input.clone()).await.unwrap();
    assert_eq!(out["refined_plan"], PLAN_REPLY);
    assert_eq!(out["event_details"]["selected_theme"], "Smash Bash");
    assert_eq!(out["event_details"]["moderators"], json!([]));

    let mut multi = input;
    multi["end_date"] = json!("2026-05-03");
    plan.invoke(multi).await.unwrap();

    let prompts = llm.prompts();
    assert!(prompts[0].contains("on 2026-05-01"));
    assert!(prompts[0].contains("No specific moderators provided."));
    assert!(prompts[1].contains("from 2026-05-01 to 2026-05-03"));
}

#[tokio::test]
async fn test_full_planning_pipeline() {
    let llm = StubModel::planner();
    let registry = planning_registry(llm.clone());
    let telemetry = Arc::new(MemoryTelemetry::new());
    let workflow = event_planning_pipeline()
        .build(&registry)
        .unwrap()
        .with_telemetry(telemetry.clone());
    let report = workflow.validate();
    report.log_summary();
    assert!(report.is_safe(), "{:?}", report.issues);

    let request = PlanningRequest::new("pickle ball tournament", logistics("2026-05-01", "2026-05-02"))
        .moderators(ModeratorFilter {
            names: Some(vec!["Jai Kumar".into(), "Vikram Singh".into()]),
            expertise: None,
        })
        .participants(ParticipantFilter {
            names: None,
            limit: Some(10),
        });
    let outcome = workflow.run(request.into_input().unwrap()).await.unwrap();

    assert_eq!(
        outcome.context.keys().collect::<Vec<_>>(),
        vec!["themes", "moderators", "participants", "plan"]
    );
    assert_eq!(
        outcome.context.get("themes").unwrap()["themes"][0],
        "Smash Bash - a doubles ladder"
    );
    assert_eq!(outcome.context.get("participants").unwrap()["count"], 10);

    let details = &outcome.output["event_details"];
    assert_eq!(details["selected_theme"], "Smash Bash - a doubles ladder");
    assert_eq!(details["moderators"].as_array().unwrap().len(), 2);
    assert_eq!(outcome.output["refined_plan"], PLAN_REPLY);

    let plan_prompt = llm.prompts().pop().unwrap();
    assert!(plan_prompt.contains("Jai Kumar from Hyderabad"));
    assert!(plan_prompt.contains("Vikram Singh from Chennai"));
    assert!(plan_prompt.contains("split the agenda"));
    assert_eq!(llm.calls(), 2);
    assert_eq!(telemetry.get_traces().len(), 4);
}

#[tokio::test]
async fn test_pipeline_stops_when_theme_generation_fails() {
    let llm = StubModel::failing("connection refused");
    let registry = planning_registry(llm.clone());
    let workflow = event_planning_pipeline().build(&registry).unwrap();

    let request = PlanningRequest::new("chess night", logistics("2026-06-01", "2026-06-01"));
    let err = workflow.run(request.into_input().unwrap()).await.unwrap_err();

    assert_eq!(err.step, 0);
    assert_eq!(err.capability, GENERATE_EVENT_THEMES);
    assert!(err.cause.is_collaborator());
    assert!(err.context.is_empty());
    assert_eq!(llm.calls(), 1);
}
