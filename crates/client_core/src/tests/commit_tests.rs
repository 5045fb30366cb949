use super::*;
use crate::{
    candidate::{Candidate, ReviewerDetails},
    test_support::committed,
};

fn staged(entries: &[(&str, &str)]) -> CandidateStagingList {
    let mut staging = CandidateStagingList::new();
    for (name, email) in entries {
        staging
            .add(Candidate::Typed(
                ReviewerDetails::new(*name, *email)
                    .with_affiliation("ETH")
                    .with_country("CH")
                    .with_mobile("+41 00"),
            ))
            .expect("stage");
    }
    staging
}

fn assigned(tracks: &[&str]) -> TrackAssignmentSet {
    let mut set = TrackAssignmentSet::new();
    for t in tracks {
        set.toggle(&TrackId::from(*t));
    }
    set
}

fn view_on(track: &str) -> ExistingReviewersView {
    let mut view = ExistingReviewersView::new();
    let ticket = view.begin_refresh(TrackId::from(track));
    view.apply_refresh(&ticket, Ok(vec![committed("Old", "old@x.com", &[track])]))
        .expect("seed view");
    view
}

#[test]
fn begin_checks_preconditions_in_order() {
    let mut coordinator = CommitCoordinator::new();
    let staging = staged(&[("A", "a@x.com")]);
    let primary = TrackId::from("t1");

    let err = coordinator
        .begin(&staging, &assigned(&["t1"]), None)
        .expect_err("no primary");
    assert_eq!(err, EnrollmentError::NoTrackSelected);

    let err = coordinator
        .begin(&staging, &assigned(&[]), Some(&primary))
        .expect_err("no assignment");
    assert_eq!(err, EnrollmentError::NoTracksAssigned);

    let err = coordinator
        .begin(&CandidateStagingList::new(), &assigned(&["t1"]), Some(&primary))
        .expect_err("empty");
    assert_eq!(err, EnrollmentError::EmptyBatch);
    assert_eq!(coordinator.state(), &CommitState::Idle);
}

#[test]
fn begin_builds_payload_from_staging_and_assignment_snapshot() {
    let mut coordinator = CommitCoordinator::new();
    let staging = staged(&[("A", "a@x.com"), ("B", "b@x.com")]);
    let prepared = coordinator
        .begin(&staging, &assigned(&["t2", "t1"]), Some(&TrackId::from("t1")))
        .expect("begin");

    assert_eq!(coordinator.state(), &CommitState::Submitting);
    assert_eq!(prepared.primary_track, TrackId::from("t1"));
    assert_eq!(prepared.request.reviewers.len(), 2);
    let first = &prepared.request.reviewers[0];
    assert_eq!(first.email, "a@x.com");
    assert_eq!(first.affiliation, "ETH");
    assert_eq!(first.country, "CH");
    assert_eq!(first.mobile.as_deref(), Some("+41 00"));
    assert_eq!(first.tracks, vec![TrackId::from("t1"), TrackId::from("t2")]);

    let err = coordinator
        .begin(&staging, &assigned(&["t1"]), Some(&TrackId::from("t1")))
        .expect_err("in flight");
    assert_eq!(err, EnrollmentError::CommitInFlight);
}

#[tokio::test(start_paused = true)]
async fn success_clears_staging_absorbs_echo_and_expires() {
    let mut coordinator = CommitCoordinator::new();
    let mut staging = staged(&[("A", "a@x.com"), ("B", "b@x.com")]);
    let mut view = view_on("t1");
    let prepared = coordinator
        .begin(&staging, &assigned(&["t1"]), view.track_id())
        .expect("begin");

    let outcome = coordinator
        .complete(
            &prepared,
            Ok(CreateReviewersResponse {
                reviewers: vec![committed("C", "c@x.com", &["t1"])],
            }),
            &mut staging,
            &mut view,
        )
        .expect("complete");

    assert_eq!(outcome.appended, 1);
    assert!(staging.is_empty());
    assert_eq!(view.reviewers().len(), 2);
    assert!(view.find("c@x.com").is_some());
    assert!(view.find("a@x.com").is_none());
    assert_eq!(coordinator.state(), &CommitState::Succeeded { committed: 1 });
    assert!(coordinator.success_visible());

    tokio::time::advance(Duration::from_millis(2_900)).await;
    assert!(!coordinator.expire_success(Instant::now()));
    assert!(coordinator.success_visible());

    tokio::time::advance(Duration::from_millis(200)).await;
    assert!(coordinator.expire_success(Instant::now()));
    assert_eq!(coordinator.state(), &CommitState::Idle);
}

#[test]
fn validation_rejection_keeps_staging() {
    let mut coordinator = CommitCoordinator::new();
    let mut staging = staged(&[("A", "a@x.com")]);
    let mut view = view_on("t1");
    let prepared = coordinator
        .begin(&staging, &assigned(&["t1"]), view.track_id())
        .expect("begin");

    let err = coordinator
        .complete(
            &prepared,
            Err(ApiException::validation("Email already registered")),
            &mut staging,
            &mut view,
        )
        .expect_err("rejected");

    assert_eq!(
        err,
        EnrollmentError::ValidationRejected("Email already registered".into())
    );
    assert_eq!(staging.len(), 1);
    assert_eq!(view.reviewers().len(), 1);
    assert_eq!(coordinator.state(), &CommitState::Failed(err));

    coordinator.acknowledge();
    assert_eq!(coordinator.state(), &CommitState::Idle);
}

#[test]
fn transport_failure_is_reported_and_retry_is_possible() {
    let mut coordinator = CommitCoordinator::new();
    let mut staging = staged(&[("A", "a@x.com")]);
    let mut view = view_on("t1");
    let prepared = coordinator
        .begin(&staging, &assigned(&["t1"]), view.track_id())
        .expect("begin");

    let err = coordinator
        .complete(
            &prepared,
            Err(ApiException::new(ErrorCode::Transport, "502 Bad Gateway")),
            &mut staging,
            &mut view,
        )
        .expect_err("transport");
    assert!(matches!(err, EnrollmentError::TransportFailure(_)));
    assert_eq!(staging.len(), 1);

    coordinator
        .begin(&staging, &assigned(&["t1"]), view.track_id())
        .expect("retry without re-entering data");
    assert!(coordinator.is_submitting());
}

#[tokio::test]
async fn success_after_track_change_leaves_view_alone() {
    let mut coordinator = CommitCoordinator::new();
    let mut staging = staged(&[("A", "a@x.com"), ("B", "b@x.com")]);
    let mut view = view_on("t1");
    let prepared = coordinator
        .begin(&staging, &assigned(&["t1"]), view.track_id())
        .expect("begin");

    let ticket = view.begin_refresh(TrackId::from("t2"));
    view.apply_refresh(&ticket, Ok(vec![committed("Z", "z@x.com", &["t2"])]))
        .expect("t2 rows");

    let outcome = coordinator
        .complete(
            &prepared,
            Ok(CreateReviewersResponse {
                reviewers: vec![
                    committed("A", "a@x.com", &["t1"]),
                    committed("B", "b@x.com", &["t1"]),
                ],
            }),
            &mut staging,
            &mut view,
        )
        .expect("complete");

    assert_eq!(outcome.committed.len(), 2);
    assert_eq!(outcome.appended, 0);
    assert!(staging.is_empty());
    assert_eq!(view.track_id(), Some(&TrackId::from("t2")));
    let emails: Vec<_> = view.reviewers().iter().map(|r| r.email.as_str()).collect();
    assert_eq!(emails, vec!["z@x.com"]);
    assert_eq!(coordinator.state(), &CommitState::Succeeded { committed: 2 });
}

#[tokio::test]
async fn echo_without_reviewers_still_clears_staging() {
    let mut coordinator = CommitCoordinator::new();
    let mut staging = staged(&[("A", "a@x.com")]);
    let mut view = view_on("t1");
    let prepared = coordinator
        .begin(&staging, &assigned(&["t1"]), view.track_id())
        .expect("begin");

    let outcome = coordinator
        .complete(
            &prepared,
            Ok(CreateReviewersResponse::default()),
            &mut staging,
            &mut view,
        )
        .expect("complete");
    assert!(outcome.committed.is_empty());
    assert!(staging.is_empty());
    assert_eq!(view.reviewers().len(), 1);
}
