use infra_stack_core::resources::{Architecture, GrantKind};
use infra_stack_core::{
    evaluate, ConfigError, ProfileCatalog, ResourceGraph, SettingsSource, StackProfile,
};

fn complete_source(profile: &StackProfile) -> SettingsSource {
    profile
        .required_keys
        .iter()
        .map(|key| (key.clone(), format!("value-for-{key}")))
        .collect()
}

fn evaluate_complete(profile: &StackProfile) -> ResourceGraph {
    evaluate(profile, &complete_source(profile)).expect("complete environment should pass")
}

#[test]
fn removing_any_single_key_fails_naming_that_key() {
    for profile in ProfileCatalog::builtin().iter() {
        for key in &profile.required_keys {
            let mut source = complete_source(profile);
            source.remove(key);

            let error = evaluate(profile, &source).expect_err("evaluation should fail");
            assert_eq!(
                error,
                ConfigError::missing(key.as_str()),
                "profile {} should report {key}",
                profile.name
            );
        }
    }
}

#[test]
fn emptying_any_single_key_fails_naming_that_key() {
    for profile in ProfileCatalog::builtin().iter() {
        for key in &profile.required_keys {
            let mut source = complete_source(profile);
            source.insert(key.as_str(), "");

            let error = evaluate(profile, &source).expect_err("evaluation should fail");
            assert_eq!(error.key(), key);
        }
    }
}

#[test]
fn complete_environment_declares_expected_shape() {
    for profile in ProfileCatalog::builtin().iter() {
        let graph = evaluate_complete(profile);

        assert_eq!(graph.profile, profile.name);
        assert_eq!(graph.compute.logical_id, "ApiFunction");
        assert_eq!(graph.outputs.len(), 1);
        assert!(graph.output("FunctionUrl").is_some());
        assert_eq!(
            graph.grants_of(GrantKind::TableReadWrite).count(),
            profile.tables.len()
        );
        assert_eq!(graph.grants_of(GrantKind::TableIndexQuery).count(), 1);
        assert_eq!(graph.grants_of(GrantKind::ExternalModelInvoke).count(), 1);
    }
}

#[test]
fn minimal_scenario_declares_arm_endpoint() {
    let graph = evaluate_complete(&StackProfile::minimal());

    assert_eq!(graph.compute.memory_mb, 512);
    assert_eq!(graph.compute.timeout_seconds, 60);
    assert_eq!(graph.compute.architecture, Architecture::Arm64);
    assert_eq!(graph.tables.len(), 1);
    assert_eq!(graph.tables[0].table_name, "value-for-DYNAMODB_TABLE_NAME");
}

#[test]
fn extended_graph_is_structural_superset_of_minimal() {
    let minimal = evaluate_complete(&StackProfile::minimal());
    let extended = evaluate_complete(&StackProfile::extended());

    assert_eq!(minimal.compute.image, extended.compute.image);
    assert_eq!(minimal.compute.memory_mb, extended.compute.memory_mb);
    assert_eq!(minimal.compute.timeout_seconds, extended.compute.timeout_seconds);
    assert_eq!(minimal.compute.architecture, extended.compute.architecture);
    assert_eq!(minimal.outputs, extended.outputs);
    assert_eq!(minimal.function_url, extended.function_url);

    for key in infra_stack_core::profile::BASE_REQUIRED_KEYS {
        assert!(minimal.compute.environment.contains_key(key));
        assert!(extended.compute.environment.contains_key(key));
    }

    assert!(extended.tables.len() > minimal.tables.len());
    assert!(extended.managed_policies.len() > minimal.managed_policies.len());
    for kind in [
        GrantKind::TableReadWrite,
        GrantKind::TableIndexQuery,
        GrantKind::ExternalModelInvoke,
    ] {
        assert!(extended.grants_of(kind).count() >= minimal.grants_of(kind).count());
    }
}

#[test]
fn extended_environment_forwards_all_twelve_settings() {
    let profile = StackProfile::extended();
    let source = complete_source(&profile).with("SHELL", "/bin/bash");
    let graph = evaluate(&profile, &source).expect("evaluation should pass");

    assert_eq!(graph.compute.environment.len(), 12);
    assert!(!graph.compute.environment.contains_key("SHELL"));
    for key in &profile.required_keys {
        assert_eq!(graph.compute.environment[key], format!("value-for-{key}"));
    }
}

#[test]
fn extended_index_grant_covers_every_table() {
    let graph = evaluate_complete(&StackProfile::extended());
    let index_grant = graph
        .grants_of(GrantKind::TableIndexQuery)
        .next()
        .expect("index grant should exist");

    assert_eq!(index_grant.resources.len(), 3);
    for table in &graph.tables {
        assert!(index_grant
            .resources
            .contains(&format!("{}/index/*", table.arn)));
    }
}

#[test]
fn evaluation_is_idempotent() {
    for profile in ProfileCatalog::builtin().iter() {
        let source = complete_source(profile);
        let first = evaluate(profile, &source).expect("evaluation should pass");
        let second = evaluate(profile, &source).expect("evaluation should pass");

        assert_eq!(first, second);
        assert_eq!(first.fingerprint(), second.fingerprint());
    }
}

#[test]
fn fingerprint_tracks_setting_changes() {
    let profile = StackProfile::minimal();
    let original = evaluate_complete(&profile);
    let changed = evaluate(
        &profile,
        &complete_source(&profile).with("API_KEY", "rotated"),
    )
    .expect("evaluation should pass");

    assert_ne!(original.fingerprint(), changed.fingerprint());
}

#[test]
fn graph_round_trips_through_json() {
    let graph = evaluate_complete(&StackProfile::extended());
    let encoded = serde_json::to_string(&graph).expect("graph should serialize");
    let decoded: ResourceGraph = serde_json::from_str(&encoded).expect("graph should parse");
    assert_eq!(decoded, graph);
}
