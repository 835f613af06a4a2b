//! End-to-end sticky-answer scenarios against the session manager

use lwns_server::mac::{
    confirm_class_a_delivery, request_config, review_fopts, AnswerOrigin, ScheduleOutcome,
};
use lwns_server::session::SessionManager;
use lwns_shared::{DevEui, StickyCommand, StickyError};

const RX_PARAM_SETUP_ANS: &[u8] = &[0x05, 0x07];
const RX_TIMING_SETUP_ANS: &[u8] = &[0x08];
const TX_PARAM_SETUP_ANS: &[u8] = &[0x09];
const DL_CHANNEL_ANS: &[u8] = &[0x0A, 0x03];
const NO_MAC_COMMANDS: &[u8] = &[];

#[tokio::test]
async fn test_request_answer_confirm_cycle() {
    // Request out, answer in, class-A confirmation clears the pending flag.
    let manager = SessionManager::new();
    let dev = DevEui::from(0x11u64);
    let handle = manager.get_or_create(dev).await;
    let mut session = handle.lock().await;

    let outcome = request_config(&mut session, StickyCommand::RxParamSetup)
        .expect("request failed");
    assert_eq!(outcome, ScheduleOutcome::Scheduled);

    let review = review_fopts(&mut session, 1, RX_PARAM_SETUP_ANS).expect("review failed");
    assert_eq!(
        review.admitted,
        vec![(StickyCommand::RxParamSetup, AnswerOrigin::PendingRequest)]
    );

    confirm_class_a_delivery(&mut session);
    assert!(session.sticky().pending().is_empty());
}

#[tokio::test]
async fn test_unsolicited_answer_is_rejected() {
    // DlChannel answer with no request sent and a clean prior uplink.
    let manager = SessionManager::new();
    let dev = DevEui::from(0x22u64);
    let handle = manager.get_or_create(dev).await;
    let mut session = handle.lock().await;

    review_fopts(&mut session, 1, NO_MAC_COMMANDS).expect("review failed");
    let review = review_fopts(&mut session, 2, DL_CHANNEL_ANS).expect("review failed");

    assert!(review.admitted.is_empty());
    assert_eq!(
        review.rejected,
        vec![StickyError::UnexpectedAnswer {
            device: dev,
            command: StickyCommand::DlChannel,
        }]
    );
}

#[tokio::test]
async fn test_repeated_answers_stay_admissible_after_delivery() {
    // Three uplinks each repeating the RxTimingSetup answer; the class-A
    // downlink confirmed after the first one.
    let manager = SessionManager::new();
    let dev = DevEui::from(0x33u64);
    let handle = manager.get_or_create(dev).await;
    let mut session = handle.lock().await;

    request_config(&mut session, StickyCommand::RxTimingSetup).expect("request failed");

    let u1 = review_fopts(&mut session, 1, RX_TIMING_SETUP_ANS).expect("review failed");
    assert_eq!(
        u1.admitted,
        vec![(StickyCommand::RxTimingSetup, AnswerOrigin::PendingRequest)]
    );

    confirm_class_a_delivery(&mut session);

    let u2 = review_fopts(&mut session, 2, RX_TIMING_SETUP_ANS).expect("review failed");
    assert_eq!(
        u2.admitted,
        vec![(StickyCommand::RxTimingSetup, AnswerOrigin::StickyContinuation)]
    );

    let u3 = review_fopts(&mut session, 3, RX_TIMING_SETUP_ANS).expect("review failed");
    assert_eq!(
        u3.admitted,
        vec![(StickyCommand::RxTimingSetup, AnswerOrigin::StickyContinuation)]
    );
}

#[tokio::test]
async fn test_lingering_answer_defers_fresh_request() {
    // The last uplink still carries the TxParamSetup answer, so the
    // request is deferred until an uplink without it.
    let manager = SessionManager::new();
    let dev = DevEui::from(0x44u64);
    let handle = manager.get_or_create(dev).await;
    let mut session = handle.lock().await;

    // The device is sticking from an earlier exchange.
    request_config(&mut session, StickyCommand::TxParamSetup).expect("request failed");
    review_fopts(&mut session, 1, TX_PARAM_SETUP_ANS).expect("review failed");
    confirm_class_a_delivery(&mut session);

    let outcome = request_config(&mut session, StickyCommand::TxParamSetup)
        .expect("request failed");
    assert_eq!(outcome, ScheduleOutcome::Deferred);

    // One further uplink without the answer releases it.
    let review = review_fopts(&mut session, 2, NO_MAC_COMMANDS).expect("review failed");
    assert_eq!(review.unblocked, vec![StickyCommand::TxParamSetup]);
    assert!(session.sticky().pending().contains(StickyCommand::TxParamSetup));
}

#[tokio::test]
async fn test_devices_are_independent() {
    // Sticky history of one device never leaks into another's
    // predicate results.
    let manager = SessionManager::new();
    let d1 = DevEui::from(0x51u64);
    let d2 = DevEui::from(0x52u64);

    let h1 = manager.get_or_create(d1).await;
    let h2 = manager.get_or_create(d2).await;

    {
        let mut s1 = h1.lock().await;
        request_config(&mut s1, StickyCommand::DlChannel).expect("request failed");
        review_fopts(&mut s1, 1, DL_CHANNEL_ANS).expect("review failed");
    }

    let mut s2 = h2.lock().await;

    // D2 never asked: the same answer bytes are spurious for it.
    review_fopts(&mut s2, 1, NO_MAC_COMMANDS).expect("review failed");
    let review = review_fopts(&mut s2, 2, DL_CHANNEL_ANS).expect("review failed");
    assert_eq!(review.rejected.len(), 1);

    // Schedulability is judged on D2's own history: its last uplink
    // carried the answer, so the request defers even though the answer
    // was rejected.
    assert_eq!(
        request_config(&mut s2, StickyCommand::DlChannel).expect("request failed"),
        ScheduleOutcome::Deferred
    );

    // One clean uplink from D2 releases its request...
    let review = review_fopts(&mut s2, 3, NO_MAC_COMMANDS).expect("review failed");
    assert_eq!(review.unblocked, vec![StickyCommand::DlChannel]);
    assert!(s2.sticky().pending().contains(StickyCommand::DlChannel));

    // ...while D1, still sticking, stays blocked.
    let s1 = h1.lock().await;
    assert!(s1
        .sticky()
        .may_schedule(d1, StickyCommand::DlChannel)
        .is_err());
}
