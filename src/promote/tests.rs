use std::collections::BTreeSet;

use super::*;
use crate::errors::Error;
use crate::hub::{InMemoryHub, Mutation};
use crate::models::StageTag;

const NVR: &str = "nova-1.0-1";

fn foo() -> Release {
    Release::new(
        "foo",
        ["foo-candidate", "foo-testing", "foo-release"],
        "unified_buildreqs",
    )
}

fn rocky() -> Release {
    Release::new(
        "rocky",
        ["r-el7-build", "r-candidate", "r-testing", "r-release"],
        "separated_buildreqs",
    )
}

fn tags(names: &[&str]) -> BTreeSet<StageTag> {
    names.iter().map(|n| StageTag::from(*n)).collect()
}

fn builds(nvrs: &[&str]) -> Vec<String> {
    nvrs.iter().map(|n| n.to_string()).collect()
}

fn methods(calls: &[Mutation]) -> Vec<String> {
    calls.iter().map(ToString::to_string).collect()
}

#[test]
fn test_candidate_to_testing_issues_single_tag() {
    let hub = InMemoryHub::new().with_build("nova", 5, NVR, &["foo-candidate"]);

    let workflow = Workflow::unified_buildreqs();
    let report = tag_builds(&hub, "testing", &foo(), &builds(&[NVR]), &workflow).unwrap();

    assert!(report.is_success());
    assert_eq!(hub.tags_of(NVR), tags(&["foo-candidate", "foo-testing"]));
    assert_eq!(methods(&hub.calls()), vec!["tagBuild(foo-testing, nova-1.0-1)"]);
}

#[test]
fn test_testing_to_none_untags_held_tags() {
    let hub = InMemoryHub::new().with_build("nova", 5, NVR, &["foo-candidate", "foo-testing"]);
    let workflow = Workflow::unified_buildreqs();

    tag_builds(&hub, "none", &foo(), &builds(&[NVR]), &workflow).unwrap();

    assert!(hub.tags_of(NVR).is_empty());
    assert_eq!(
        methods(&hub.calls()),
        vec![
            "untagBuild(foo-candidate, nova-1.0-1)",
            "untagBuild(foo-testing, nova-1.0-1)",
        ]
    );
}

#[test]
fn test_none_from_any_state_leaves_no_stage_tags() {
    let workflow = Workflow::unified_buildreqs();
    for held in [
        vec![],
        vec!["foo-candidate"],
        vec!["foo-release"],
        vec!["foo-candidate", "foo-testing", "foo-release"],
    ] {
        let hub = InMemoryHub::new().with_build("nova", 5, NVR, &held);
        tag_builds(&hub, "none", &foo(), &builds(&[NVR]), &workflow).unwrap();
        assert!(hub.tags_of(NVR).is_empty(), "still tagged after none from {held:?}");
    }
}

#[test]
fn test_stage_targets_always_leave_a_stage_tag() {
    let cases = [
        (foo(), Workflow::unified_buildreqs()),
        (rocky(), Workflow::separated_buildreqs()),
    ];
    for (release, workflow) in cases {
        let held_states: Vec<Vec<&str>> = std::iter::once(vec![])
            .chain(release.tags.iter().map(|tag| vec![tag.as_str()]))
            .chain(std::iter::once(
                release.tags.iter().map(StageTag::as_str).collect(),
            ))
            .collect();
        for stage in workflow.stage_names() {
            for held in &held_states {
                let hub = InMemoryHub::new().with_build("nova", 5, NVR, held);
                let report = tag_builds(&hub, stage, &release, &builds(&[NVR]), &workflow).unwrap();
                assert!(report.is_success());
                assert!(
                    !hub.tags_of(NVR).is_empty(),
                    "{stage} from {held:?} left {} untagged",
                    release.name
                );
            }
        }
    }
}

#[test]
fn test_promotion_is_idempotent() {
    let hub = InMemoryHub::new().with_build("nova", 5, NVR, &["foo-candidate"]);
    let workflow = Workflow::unified_buildreqs();

    tag_builds(&hub, "release", &foo(), &builds(&[NVR]), &workflow).unwrap();
    let after_first = hub.tags_of(NVR);
    hub.reset_calls();

    let report = tag_builds(&hub, "release", &foo(), &builds(&[NVR]), &workflow).unwrap();

    assert_eq!(hub.tags_of(NVR), after_first);
    assert!(hub.calls().is_empty());
    assert_eq!(hub.submissions(), 0);
    assert_eq!(report.changed(), 0);
}

#[test]
fn test_separated_promotion_tags_before_untagging() {
    let hub = InMemoryHub::new().with_build("nova", 5, NVR, &["r-candidate"]);
    let workflow = Workflow::separated_buildreqs();

    tag_builds(&hub, "testing", &rocky(), &builds(&[NVR]), &workflow).unwrap();

    assert_eq!(hub.tags_of(NVR), tags(&["r-testing"]));
    assert_eq!(
        methods(&hub.calls()),
        vec![
            "tagBuild(r-testing, nova-1.0-1)",
            "untagBuild(r-candidate, nova-1.0-1)",
        ]
    );
    assert_eq!(hub.submissions(), 1);
}

#[test]
fn test_failed_tag_leaves_build_in_previous_stage() {
    let hub = InMemoryHub::new().with_build("nova", 5, NVR, &["r-candidate"]);
    hub.fail_call("tagBuild", "r-testing", NVR);
    let workflow = Workflow::separated_buildreqs();

    let report = tag_builds(&hub, "testing", &rocky(), &builds(&[NVR]), &workflow).unwrap();

    assert!(!report.is_success());
    // untag never sent, the build is still visible in candidate
    assert_eq!(hub.tags_of(NVR), tags(&["r-candidate"]));
    assert_eq!(methods(&hub.calls()), vec!["tagBuild(r-testing, nova-1.0-1)"]);
    let first = report.failures().next();
    match first {
        Some(PromoteError::RemoteMutation { failures, .. }) => assert_eq!(failures.len(), 2),
        other => panic!("unexpected outcome: {other:?}"),
    }
}

#[test]
fn test_failed_untag_keeps_new_stage() {
    let hub = InMemoryHub::new().with_build("nova", 5, NVR, &["r-candidate"]);
    hub.fail_call("untagBuild", "r-candidate", NVR);
    let workflow = Workflow::separated_buildreqs();

    let report = tag_builds(&hub, "testing", &rocky(), &builds(&[NVR]), &workflow).unwrap();

    assert!(!report.is_success());
    assert_eq!(hub.tags_of(NVR), tags(&["r-candidate", "r-testing"]));
}

#[test]
fn test_unknown_target_fails_before_any_call() {
    let hub = InMemoryHub::new().with_build("nova", 5, NVR, &["foo-candidate"]);

    let err = tag_builds(
        &hub,
        "el7-build",
        &foo(),
        &builds(&[NVR, "missing-1-1"]),
        &Workflow::unified_buildreqs(),
    )
    .unwrap_err();

    assert!(matches!(err, Error::InvalidTarget { .. }));
    assert_eq!(hub.lookups(), 0);
    assert!(hub.calls().is_empty());
}

#[test]
fn test_target_beyond_release_tags_fails_before_any_call() {
    let queens = Release::new("queens", ["q-candidate", "q-testing"], "unified_buildreqs");
    let hub = InMemoryHub::new().with_build("nova", 5, NVR, &["q-candidate"]);

    let workflow = Workflow::unified_buildreqs();

    let err = tag_builds(&hub, "release", &queens, &builds(&[NVR]), &workflow).unwrap_err();

    assert!(matches!(err, Error::InvalidWorkflow { index: 2, .. }));
    assert_eq!(hub.lookups(), 0);
}

#[test]
fn test_missing_build_does_not_block_siblings() {
    let hub = InMemoryHub::new()
        .with_build("nova", 5, NVR, &["foo-candidate"])
        .with_build("glance", 8, "glance-2.0-1", &["foo-candidate"]);

    let report = tag_builds(
        &hub,
        "testing",
        &foo(),
        &builds(&[NVR, "missing-1-1", "glance-2.0-1"]),
        &Workflow::unified_buildreqs(),
    )
    .unwrap();

    assert_eq!(report.outcomes.len(), 3);
    assert!(report.outcomes[0].is_success());
    assert!(matches!(
        report.outcomes[1].result,
        Err(PromoteError::BuildNotFound { .. })
    ));
    assert!(report.outcomes[2].is_success());
    assert!(hub.tags_of("glance-2.0-1").contains("foo-testing"));
}

#[test]
fn test_lookup_failure_is_per_build() {
    let hub = InMemoryHub::new()
        .with_build("nova", 5, NVR, &["foo-candidate"])
        .with_build("glance", 8, "glance-2.0-1", &["foo-candidate"]);
    hub.fail_lookup(NVR);

    let report = tag_builds(
        &hub,
        "testing",
        &foo(),
        &builds(&[NVR, "glance-2.0-1"]),
        &Workflow::unified_buildreqs(),
    )
    .unwrap();

    let failed: Vec<&str> = report.failures().map(PromoteError::build).collect();
    assert_eq!(failed, vec![NVR]);
    assert!(matches!(
        report.outcomes[0].result,
        Err(PromoteError::RemoteLookup { .. })
    ));
    assert_eq!(report.promoted().count(), 1);
}

#[test]
fn test_promote_returns_applied_delta() {
    let hub = InMemoryHub::new().with_build("nova", 5, NVR, &["foo-candidate"]);
    let target = Workflow::unified_buildreqs().resolve("release").unwrap();

    let delta = promote(&hub, NVR, &target, &foo()).unwrap();

    assert_eq!(delta.build.id.0, 5);
    let tagged: Vec<&str> = delta.to_tag.iter().map(StageTag::as_str).collect();
    assert_eq!(tagged, vec!["foo-testing", "foo-release"]);
    assert!(delta.to_untag.is_empty());
}
