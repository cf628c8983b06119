//! Tests for the event system.

use super::*;
use tourforge_test::square;

#[test]
fn test_event_support_new() {
    let support = SolverEventSupport::new();
    assert_eq!(support.listener_count(), 0);
    assert!(!support.has_listeners());
    assert!(!support.is_closed());
}

#[test]
fn test_event_support_fire_events() {
    let mut support = SolverEventSupport::new();
    let listener = Arc::new(CountingEventListener::new());
    support.add_listener(listener.clone());

    support.fire_run_started(4);
    support.fire_status(&StatusUpdate {
        epoch: 1,
        phase: 1,
        solutions_counter: 8,
    });
    support.fire_best_route(&BestRouteUpdate { points: square() });
    support.fire_status(&StatusUpdate {
        epoch: 1,
        phase: 2,
        solutions_counter: 12,
    });
    support.fire_run_ended(4.0);

    assert_eq!(listener.run_started_count(), 1);
    assert_eq!(listener.status_count(), 2);
    assert_eq!(listener.best_route_count(), 1);
    assert_eq!(listener.run_ended_count(), 1);
    assert_eq!(listener.best_distances(), vec![4.0]);
    assert_eq!(
        listener.statuses().iter().map(|s| s.phase).collect::<Vec<_>>(),
        vec![1, 2]
    );
}

#[test]
fn test_closed_support_drops_events() {
    let mut support = SolverEventSupport::new();
    let listener = Arc::new(CountingEventListener::new());
    support.add_listener(listener.clone());

    support.close();
    support.fire_status(&StatusUpdate {
        epoch: 3,
        phase: 2,
        solutions_counter: 1,
    });
    support.fire_best_route(&BestRouteUpdate { points: square() });
    support.fire_run_ended(1.0);

    assert_eq!(listener.event_count(), 0);
    assert_eq!(listener.run_ended_count(), 0);
}

#[test]
fn test_clear_listeners() {
    let mut support = SolverEventSupport::new();
    support.add_listener(Arc::new(LoggingEventListener::with_prefix("[a] ")));
    support.add_listener(Arc::new(CountingEventListener::new()));
    assert_eq!(support.listener_count(), 2);
    support.clear_listeners();
    assert!(!support.has_listeners());
}

#[test]
fn test_channel_listener_forwards_events() {
    let (listener, mut receiver) = ChannelEventListener::channel();
    let status = StatusUpdate {
        epoch: 2,
        phase: 1,
        solutions_counter: 99,
    };
    listener.on_status(&status);
    listener.on_best_route(&BestRouteUpdate { points: square() });
    drop(listener);

    assert_eq!(receiver.try_recv().unwrap(), SolverEvent::Status(status));
    match receiver.try_recv().unwrap() {
        SolverEvent::BestRoute(update) => assert_eq!(update.points, square()),
        other => panic!("unexpected event {other:?}"),
    }
    assert!(receiver.try_recv().is_err());
}

#[test]
fn test_channel_listener_survives_dropped_receiver() {
    let (listener, receiver) = ChannelEventListener::channel();
    drop(receiver);
    listener.on_status(&StatusUpdate {
        epoch: 1,
        phase: 1,
        solutions_counter: 0,
    });
}

#[test]
fn test_status_wire_format() {
    let json = serde_json::to_string(&StatusUpdate {
        epoch: 4,
        phase: 2,
        solutions_counter: 1500,
    })
    .unwrap();
    assert_eq!(json, r#"{"epoch":4,"phase":2,"solutionsCounter":1500}"#);
}

#[test]
fn test_best_route_wire_format() {
    let update: BestRouteUpdate =
        serde_json::from_str(r#"{"points":[{"X":0.0,"Y":0.0},{"x":3.0,"y":4.0}]}"#).unwrap();
    assert_eq!(update.points, vec![Point::new(0.0, 0.0), Point::new(3.0, 4.0)]);
    assert_eq!(update.distance(), 10.0);
}

#[test]
fn test_tagged_event_format() {
    let event = SolverEvent::Status(StatusUpdate {
        epoch: 1,
        phase: 1,
        solutions_counter: 2,
    });
    let json = serde_json::to_value(&event).unwrap();
    assert_eq!(json["type"], "status");
    assert_eq!(json["solutionsCounter"], 2);
}
