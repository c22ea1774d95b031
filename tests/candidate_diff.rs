//! Integration tests for candidate listings

use graffiti::diff::{compute_candidates, compute_old_candidates};
use graffiti::errors::Error;
use graffiti::hub::InMemoryHub;
use graffiti::models::{BuildId, StageTag};

fn tags() -> (StageTag, StageTag) {
    (StageTag::from("ocata-candidate"), StageTag::from("ocata-testing"))
}

fn hub() -> InMemoryHub {
    InMemoryHub::new()
        .with_build("openstack-nova", 11, "openstack-nova-15.0.2-1.el7", &["ocata-candidate"])
        .with_build("openstack-nova", 9, "openstack-nova-15.0.1-1.el7", &["ocata-candidate"])
        .with_build(
            "openstack-nova",
            10,
            "openstack-nova-15.0.1-2.el7",
            &["ocata-candidate", "ocata-testing"],
        )
        .with_build(
            "openstack-glance",
            4,
            "openstack-glance-14.0.0-1.el7",
            &["ocata-candidate", "ocata-testing"],
        )
        .with_build("openstack-swift", 6, "openstack-swift-2.13.0-1.el7", &["ocata-candidate"])
}

#[test]
fn test_candidates_are_newer_or_missing_in_testing() {
    let (candidate, testing) = tags();

    let candidates =
        compute_candidates(&hub(), &candidate, &testing).expect("Should compute candidates");

    let nvrs: Vec<&str> = candidates.values().map(|b| b.nvr.as_str()).collect();
    assert_eq!(
        nvrs,
        vec!["openstack-nova-15.0.2-1.el7", "openstack-swift-2.13.0-1.el7"]
    );
}

#[test]
fn test_candidates_against_same_tag_are_empty() {
    let (candidate, _) = tags();
    assert!(compute_candidates(&hub(), &candidate, &candidate).unwrap().is_empty());
}

#[test]
fn test_old_candidates_are_skipped_builds() {
    let (candidate, testing) = tags();

    let old = compute_old_candidates(&hub(), &candidate, &testing)
        .expect("Should compute old candidates");

    // swift has no testing build at all, so it is never an old candidate
    assert_eq!(old.keys().copied().collect::<Vec<_>>(), vec![BuildId(9)]);
}

#[test]
fn test_listing_failure_aborts_the_diff() {
    let (candidate, testing) = tags();
    let hub = hub();
    hub.fail_listing("ocata-testing");

    let err = compute_candidates(&hub, &candidate, &testing).unwrap_err();

    assert!(matches!(err, Error::RemoteList { ref tag, .. } if *tag == testing));
}
