use super::*;
use crate::test_support::committed;
use shared::error::ApiException;

#[test]
fn refresh_replaces_contents_of_previous_track() {
    let mut view = ExistingReviewersView::new();

    let t1 = view.begin_refresh(TrackId::from("t1"));
    assert!(view
        .apply_refresh(&t1, Ok(vec![committed("A", "a@x.com", &["t1"])]))
        .expect("t1"));
    assert_eq!(view.reviewers().len(), 1);

    let t2 = view.begin_refresh(TrackId::from("t2"));
    assert_eq!(t2.track_id(), &TrackId::from("t2"));
    assert!(view
        .apply_refresh(
            &t2,
            Ok(vec![
                committed("B", "b@x.com", &["t2"]),
                committed("C", "c@x.com", &["t2"]),
            ]),
        )
        .expect("t2"));
    assert_eq!(view.track_id(), Some(&TrackId::from("t2")));
    assert!(view.find("a@x.com").is_none());
    assert_eq!(view.reviewers().len(), 2);
    assert!(!view.is_loading());
}

#[test]
fn begin_refresh_discards_stale_rows_immediately() {
    let mut view = ExistingReviewersView::new();
    let first = view.begin_refresh(TrackId::from("t1"));
    view.apply_refresh(&first, Ok(vec![committed("A", "a@x.com", &["t1"])]))
        .expect("apply");

    view.begin_refresh(TrackId::from("t2"));
    assert!(view.reviewers().is_empty());
    assert!(view.is_loading());
}

#[test]
fn out_of_order_response_is_dropped() {
    let mut view = ExistingReviewersView::new();
    let older = view.begin_refresh(TrackId::from("t1"));
    let newer = view.begin_refresh(TrackId::from("t2"));

    assert!(view
        .apply_refresh(&newer, Ok(vec![committed("B", "b@x.com", &["t2"])]))
        .expect("newer"));
    assert!(!view
        .apply_refresh(&older, Ok(vec![committed("A", "a@x.com", &["t1"])]))
        .expect("older"));

    assert_eq!(view.track_id(), Some(&TrackId::from("t2")));
    assert_eq!(view.reviewers().len(), 1);
    assert_eq!(view.reviewers()[0].email, "b@x.com");
}

#[test]
fn failed_refresh_leaves_view_empty() {
    let mut view = ExistingReviewersView::new();
    let ticket = view.begin_refresh(TrackId::from("t1"));
    let err = view
        .apply_refresh(&ticket, Err(ApiException::transport("connection reset")))
        .expect_err("failure");
    assert!(matches!(err, crate::EnrollmentError::TransportFailure(_)));
    assert!(view.reviewers().is_empty());
    assert!(!view.is_loading());
}

#[test]
fn absorb_unions_by_email() {
    let mut view = ExistingReviewersView::new();
    let ticket = view.begin_refresh(TrackId::from("t1"));
    view.apply_refresh(&ticket, Ok(vec![committed("A", "a@x.com", &["t1"])]))
        .expect("apply");

    let appended = view.absorb(&[
        committed("A", "a@x.com", &["t1", "t2"]),
        committed("C", "c@x.com", &["t1"]),
    ]);

    assert_eq!(appended, 1);
    assert_eq!(view.reviewers().len(), 2);
    assert_eq!(
        view.find("a@x.com").expect("a").tracks,
        vec![TrackId::from("t1"), TrackId::from("t2")]
    );
    assert!(view.find("c@x.com").is_some());
}
