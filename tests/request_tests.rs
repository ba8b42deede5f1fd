mod common;

use pretty_assertions::assert_eq;
use serial_test::serial;

use common::{TestCore, date};
use shiftreq::AppError;
use shiftreq::database::models::{RequestDecision, RequestFilter, RequestStatus};
use shiftreq::services::NotificationEvent;

#[tokio::test]
#[serial]
async fn submit_creates_pending_request_before_the_cutoff() {
    let mut core = TestCore::new().await.unwrap();
    let worker = core.seed_worker("Asha").await;

    // Deadline day is 10; day 9 is the last open day.
    let request = core
        .requests
        .submit(&worker.id, date(2024, 2, 15), date(2024, 1, 9))
        .await
        .unwrap();

    assert_eq!(request.status, RequestStatus::Pending);
    assert_eq!(request.request_date, date(2024, 2, 15));
    assert_eq!(request.worker_id, worker.id);
    assert_eq!(request.decided_at, None);
    assert_eq!(request.decided_by, None);

    let events = core.drain_events();
    assert_eq!(events.len(), 1);
    assert!(matches!(
        &events[0],
        NotificationEvent::RequestConfirmed { request_date, .. }
            if *request_date == date(2024, 2, 15)
    ));
}

#[tokio::test]
#[serial]
async fn submit_on_the_cutoff_day_is_rejected() {
    let core = TestCore::new().await.unwrap();
    let worker = core.seed_worker("Asha").await;

    let result = core
        .requests
        .submit(&worker.id, date(2024, 2, 15), date(2024, 1, 10))
        .await;

    assert!(matches!(
        result,
        Err(AppError::DeadlineExceeded { deadline_day: 10, .. })
    ));
}

#[tokio::test]
#[serial]
async fn submit_rejects_dates_outside_next_month() {
    let core = TestCore::new().await.unwrap();
    let worker = core.seed_worker("Asha").await;
    let today = date(2024, 1, 5);

    for bad_date in [
        date(2024, 1, 20), // same month
        date(2024, 3, 1),  // two months out
        date(2023, 2, 15), // past year
    ] {
        let result = core.requests.submit(&worker.id, bad_date, today).await;
        assert!(
            matches!(result, Err(AppError::InvalidTargetDate { .. })),
            "{} should be out of range",
            bad_date
        );
    }
}

#[tokio::test]
#[serial]
async fn submit_accepts_next_month_across_the_year_boundary() {
    let core = TestCore::new().await.unwrap();
    let worker = core.seed_worker("Asha").await;

    let request = core
        .requests
        .submit(&worker.id, date(2025, 1, 3), date(2024, 12, 5))
        .await
        .unwrap();

    assert_eq!(request.request_date, date(2025, 1, 3));
}

#[tokio::test]
#[serial]
async fn submit_for_unknown_worker_is_not_found() {
    let core = TestCore::new().await.unwrap();

    let result = core
        .requests
        .submit("no-such-id", date(2024, 2, 15), date(2024, 1, 5))
        .await;

    assert!(matches!(result, Err(AppError::NotFound(_))));
}

#[tokio::test]
#[serial]
async fn duplicate_is_blocked_until_the_first_request_is_rejected() {
    let core = TestCore::new().await.unwrap();
    let worker = core.seed_worker("Asha").await;
    let admin = core.seed_admin("Mori").await;
    let today = date(2024, 1, 5);
    let target = date(2024, 2, 15);

    let first = core.requests.submit(&worker.id, target, today).await.unwrap();

    let duplicate = core.requests.submit(&worker.id, target, today).await;
    assert!(matches!(
        duplicate,
        Err(AppError::DuplicateRequest { status: RequestStatus::Pending, .. })
    ));

    // Approval keeps the date blocked.
    core.requests
        .decide(&first.id, RequestDecision::Approve, &admin.id)
        .await
        .unwrap();
    let still_blocked = core.requests.submit(&worker.id, target, today).await;
    assert!(matches!(
        still_blocked,
        Err(AppError::DuplicateRequest { status: RequestStatus::Approved, .. })
    ));

    // A rejected request frees the date for resubmission.
    let second = core
        .requests
        .submit(&worker.id, date(2024, 2, 16), today)
        .await
        .unwrap();
    core.requests
        .decide(&second.id, RequestDecision::Reject, &admin.id)
        .await
        .unwrap();

    let resubmitted = core
        .requests
        .submit(&worker.id, date(2024, 2, 16), today)
        .await
        .unwrap();
    assert_eq!(resubmitted.status, RequestStatus::Pending);
}

#[tokio::test]
#[serial]
async fn storage_constraint_rejects_a_duplicate_that_skips_the_service() {
    let core = TestCore::new().await.unwrap();
    let worker = core.seed_worker("Asha").await;
    let target = date(2024, 2, 15);

    core.request_repo.insert(&worker.id, target).await.unwrap();

    // Straight to the repository: no service-level pre-check to save us.
    let raced = core.request_repo.insert(&worker.id, target).await;
    assert!(raced.is_err());
}

#[tokio::test]
#[serial]
async fn second_decision_fails_and_first_outcome_stands() {
    let mut core = TestCore::new().await.unwrap();
    let worker = core.seed_worker("Asha").await;
    let admin = core.seed_admin("Mori").await;

    let request = core
        .requests
        .submit(&worker.id, date(2024, 2, 15), date(2024, 1, 5))
        .await
        .unwrap();
    core.drain_events();

    let approved = core
        .requests
        .decide(&request.id, RequestDecision::Approve, &admin.id)
        .await
        .unwrap();
    assert_eq!(approved.status, RequestStatus::Approved);
    assert!(approved.decided_at.is_some());
    assert_eq!(approved.decided_by.as_deref(), Some(admin.id.as_str()));

    let second = core
        .requests
        .decide(&request.id, RequestDecision::Reject, &admin.id)
        .await;
    assert!(matches!(
        second,
        Err(AppError::AlreadyDecided { status: RequestStatus::Approved })
    ));

    let stored = core.requests.get(&request.id).await.unwrap();
    assert_eq!(stored.status, RequestStatus::Approved);

    // Exactly one decision notification went out.
    let decision_events: Vec<_> = core
        .drain_events()
        .into_iter()
        .filter(|e| matches!(e, NotificationEvent::RequestDecided { .. }))
        .collect();
    assert_eq!(decision_events.len(), 1);
}

#[tokio::test]
#[serial]
async fn decide_validates_request_and_actor() {
    let core = TestCore::new().await.unwrap();
    let worker = core.seed_worker("Asha").await;
    let admin = core.seed_admin("Mori").await;

    let missing = core
        .requests
        .decide("no-such-request", RequestDecision::Approve, &admin.id)
        .await;
    assert!(matches!(missing, Err(AppError::NotFound(_))));

    let request = core
        .requests
        .submit(&worker.id, date(2024, 2, 15), date(2024, 1, 5))
        .await
        .unwrap();

    // A worker cannot act as the decision maker.
    let not_admin = core
        .requests
        .decide(&request.id, RequestDecision::Approve, &worker.id)
        .await;
    assert!(matches!(not_admin, Err(AppError::NotFound(_))));
}

#[tokio::test]
#[serial]
async fn worker_listing_is_newest_target_date_first() {
    let core = TestCore::new().await.unwrap();
    let worker = core.seed_worker("Asha").await;
    let today = date(2024, 1, 5);

    for day in [3, 20, 11] {
        core.requests
            .submit(&worker.id, date(2024, 2, day), today)
            .await
            .unwrap();
    }

    let listed = core.requests.list_for_worker(&worker.id, None).await.unwrap();
    let dates: Vec<_> = listed.iter().map(|r| r.request_date).collect();
    assert_eq!(
        dates,
        vec![date(2024, 2, 20), date(2024, 2, 11), date(2024, 2, 3)]
    );
}

#[tokio::test]
#[serial]
async fn admin_listing_puts_pending_first_then_dates_ascending() {
    let core = TestCore::new().await.unwrap();
    let asha = core.seed_worker("Asha").await;
    let biko = core.seed_worker("Biko").await;
    let admin = core.seed_admin("Mori").await;
    let today = date(2024, 1, 5);

    let approved = core
        .requests
        .submit(&asha.id, date(2024, 2, 2), today)
        .await
        .unwrap();
    core.requests
        .decide(&approved.id, RequestDecision::Approve, &admin.id)
        .await
        .unwrap();

    let rejected = core
        .requests
        .submit(&biko.id, date(2024, 2, 5), today)
        .await
        .unwrap();
    core.requests
        .decide(&rejected.id, RequestDecision::Reject, &admin.id)
        .await
        .unwrap();

    core.requests
        .submit(&asha.id, date(2024, 2, 28), today)
        .await
        .unwrap();
    core.requests
        .submit(&biko.id, date(2024, 2, 10), today)
        .await
        .unwrap();

    let listed = core
        .requests
        .list_all(&RequestFilter::default())
        .await
        .unwrap();
    assert_eq!(listed.len(), 4);

    // Every pending row precedes every decided row.
    let first_decided = listed
        .iter()
        .position(|r| r.status != RequestStatus::Pending)
        .unwrap();
    assert!(
        listed[first_decided..]
            .iter()
            .all(|r| r.status != RequestStatus::Pending)
    );

    // Pending block is date-ascending.
    let pending_dates: Vec<_> = listed[..first_decided]
        .iter()
        .map(|r| r.request_date)
        .collect();
    assert_eq!(pending_dates, vec![date(2024, 2, 10), date(2024, 2, 28)]);

    // Decider name is joined in for decided rows.
    assert!(
        listed[first_decided..]
            .iter()
            .all(|r| r.decided_by_name.as_deref() == Some("Mori"))
    );
}

#[tokio::test]
#[serial]
async fn admin_listing_filters_compose() {
    let core = TestCore::new().await.unwrap();
    let asha = core.seed_worker("Asha").await;
    let biko = core.seed_worker("Biko").await;
    let admin = core.seed_admin("Mori").await;
    let today = date(2024, 1, 5);

    let to_reject = core
        .requests
        .submit(&asha.id, date(2024, 2, 3), today)
        .await
        .unwrap();
    core.requests
        .decide(&to_reject.id, RequestDecision::Reject, &admin.id)
        .await
        .unwrap();
    core.requests
        .submit(&asha.id, date(2024, 2, 12), today)
        .await
        .unwrap();
    core.requests
        .submit(&biko.id, date(2024, 2, 14), today)
        .await
        .unwrap();

    let by_status = core
        .requests
        .list_all(&RequestFilter {
            status: Some(RequestStatus::Rejected),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(by_status.len(), 1);
    assert_eq!(by_status[0].request_date, date(2024, 2, 3));

    let by_name = core
        .requests
        .list_all(&RequestFilter {
            search: Some("bik".to_string()),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(by_name.len(), 1);
    assert_eq!(by_name[0].worker_name, "Biko");

    let by_month = core
        .requests
        .list_all(&RequestFilter {
            month: Some(2),
            year: Some(2024),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(by_month.len(), 3);

    let empty_month = core
        .requests
        .list_all(&RequestFilter {
            month: Some(3),
            year: Some(2024),
            ..Default::default()
        })
        .await
        .unwrap();
    assert!(empty_month.is_empty());
}

#[tokio::test]
#[serial]
async fn has_submitted_ignores_rejected_requests() {
    let core = TestCore::new().await.unwrap();
    let worker = core.seed_worker("Asha").await;
    let admin = core.seed_admin("Mori").await;
    let today = date(2024, 1, 5);

    assert!(!core.requests.has_submitted(&worker.id, 2024, 2).await.unwrap());

    let request = core
        .requests
        .submit(&worker.id, date(2024, 2, 15), today)
        .await
        .unwrap();
    assert!(core.requests.has_submitted(&worker.id, 2024, 2).await.unwrap());

    core.requests
        .decide(&request.id, RequestDecision::Reject, &admin.id)
        .await
        .unwrap();
    assert!(!core.requests.has_submitted(&worker.id, 2024, 2).await.unwrap());
}

#[tokio::test]
#[serial]
async fn a_dead_dispatcher_does_not_roll_back_a_submission() {
    let mut core = TestCore::new().await.unwrap();
    let worker = core.seed_worker("Asha").await;
    core.close_outbox();

    let request = core
        .requests
        .submit(&worker.id, date(2024, 2, 15), date(2024, 1, 5))
        .await
        .unwrap();

    assert_eq!(request.status, RequestStatus::Pending);
    let stored = core.requests.get(&request.id).await.unwrap();
    assert_eq!(stored.request_date, date(2024, 2, 15));
}
