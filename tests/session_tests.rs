mod common;

use bustrack::{
    announce::Arrival,
    config::Config,
    dialog::Dialog,
    host::{SHORTCUT_VOCABULARY, TRACKING_EVENT},
    intent::{Intent, Request},
    session::{Pending, Session},
    shortcuts::ShortcutStore,
};
use common::{FakeGateway, RecordingHost, noon, prediction};
use std::time::Duration;

fn session(gateway: FakeGateway) -> Session<FakeGateway> {
    Session::new(gateway, Config::default(), ShortcutStore::in_memory()).with_clock(noon)
}

fn full_request() -> Request {
    Request::new()
        .route("39")
        .direction("inbound")
        .stop("copley square")
}

fn announcement() -> Dialog {
    Dialog::ServiceAnnouncement {
        route: "39".into(),
        dest: "Back Bay Station".into(),
    }
}

fn prefix() -> Dialog {
    Dialog::ArrivalPrefix {
        stop: "Copley Sq".into(),
    }
}

#[test]
fn complete_request_announces_arrivals() {
    let gateway = FakeGateway::new();
    gateway.answer(vec![
        prediction("t1", "12:00:30"),
        prediction("t2", "12:05:00"),
        prediction("t3", "13:10:00"),
    ]);
    let mut session = session(gateway);
    let mut host = RecordingHost::new();

    session.handle(&mut host, Intent::Arrivals(full_request()));

    assert_eq!(
        host.spoken,
        vec![
            announcement(),
            prefix(),
            Dialog::Arrival(Arrival::Now),
            Dialog::Arrival(Arrival::Minutes { minutes: 5 }),
            Dialog::Arrival(Arrival::HoursMinutes {
                hours: 1,
                minutes: 10
            }),
        ]
    );
    assert_eq!(session.pending(), None);
    assert!(host.scheduled.is_empty());
}

#[test]
fn missing_fields_are_asked_for_in_turn() {
    let gateway = FakeGateway::new();
    gateway.answer(vec![prediction("t1", "12:05:00")]);
    let mut session = session(gateway);
    let mut host = RecordingHost::new();

    session.request(&mut host, Request::new(), false);
    assert_eq!(host.take_spoken(), vec![Dialog::WhichRoute]);
    assert_eq!(session.pending(), Some(Pending::Route));

    assert!(session.reply(&mut host, "39"));
    assert_eq!(
        host.take_spoken(),
        vec![Dialog::WhichDirection {
            dir1: "Outbound".into(),
            dest1: "Forest Hills".into(),
            dir2: "Inbound".into(),
            dest2: "Back Bay Station".into(),
        }]
    );
    assert_eq!(session.pending(), Some(Pending::Direction));

    assert!(session.reply(&mut host, "back bay"));
    assert_eq!(host.take_spoken(), vec![Dialog::WhichStop]);
    assert_eq!(session.pending(), Some(Pending::Stop));

    assert!(session.reply(&mut host, "copley"));
    assert_eq!(
        host.take_spoken(),
        vec![
            announcement(),
            prefix(),
            Dialog::Arrival(Arrival::Minutes { minutes: 5 })
        ]
    );
    assert_eq!(session.pending(), None);
    assert!(session.selection().is_complete());
}

#[test]
fn unknown_route_is_asked_again() {
    let mut session = session(FakeGateway::new());
    let mut host = RecordingHost::new();

    session.request(&mut host, Request::new().route("99"), false);
    assert_eq!(host.take_spoken(), vec![Dialog::WhichRoute]);

    session.reply(&mut host, "99");
    assert_eq!(host.take_spoken(), vec![Dialog::WhichRoute]);
    assert_eq!(session.pending(), Some(Pending::Route));
}

#[test]
fn reply_without_question_is_ignored() {
    let mut session = session(FakeGateway::new());
    let mut host = RecordingHost::new();

    assert!(!session.reply(&mut host, "39"));
    assert!(host.spoken.is_empty());
    assert_eq!(session.gateway().route_calls.get(), 0);
}

#[test]
fn unreachable_agency_abandons_request() {
    let mut session = session(FakeGateway::failing());
    let mut host = RecordingHost::new();

    session.handle(&mut host, Intent::Tracking(full_request()));

    assert_eq!(host.spoken, vec![Dialog::ErrorCallingServer]);
    assert_eq!(session.pending(), None);
    assert!(session.selection().route.is_none());
}

#[test]
fn failed_prediction_fetch_is_spoken() {
    let gateway = FakeGateway::new();
    gateway.answer_error();
    let mut session = session(gateway);
    let mut host = RecordingHost::new();

    session.request(&mut host, full_request(), false);
    assert_eq!(host.spoken, vec![announcement(), Dialog::ErrorCallingServer]);
}

#[test]
fn empty_stop_reports_no_buses() {
    let mut session = session(FakeGateway::new());
    let mut host = RecordingHost::new();

    session.request(&mut host, full_request(), false);
    assert_eq!(
        host.spoken,
        vec![
            announcement(),
            Dialog::NoBusesFound {
                stop: "Copley Sq".into()
            }
        ]
    );
}

#[test]
fn route_table_fetched_once_per_session() {
    let mut session = session(FakeGateway::new());
    let mut host = RecordingHost::new();

    session.request(&mut host, full_request(), false);
    session.request(&mut host, full_request(), false);

    assert_eq!(session.gateway().route_calls.get(), 1);
    assert_eq!(session.gateway().stop_calls.get(), 2);
}

#[test]
fn tracking_follows_buses_until_boundary_passes() {
    let gateway = FakeGateway::new();
    gateway.answer(vec![
        prediction("t1", "12:05:00"),
        prediction("t2", "12:10:00"),
        prediction("t3", "12:15:00"),
        prediction("t4", "12:20:00"),
    ]);
    gateway.answer(vec![prediction("t2", "12:10:00"), prediction("t3", "12:15:00")]);
    gateway.answer(vec![prediction("t4", "12:20:00")]);
    let mut session = session(gateway);
    let mut host = RecordingHost::new();

    session.handle(&mut host, Intent::Tracking(full_request()));
    assert_eq!(host.take_spoken().len(), 4);
    assert_eq!(
        host.scheduled.get(TRACKING_EVENT),
        Some(&Duration::from_secs(30))
    );
    assert_eq!(session.tracker().boundary_trip(), Some("t3"));

    session.tracking_tick(&mut host);
    assert_eq!(
        host.take_spoken(),
        vec![
            prefix(),
            Dialog::Arrival(Arrival::Minutes { minutes: 10 }),
            Dialog::Arrival(Arrival::Minutes { minutes: 15 }),
        ]
    );

    session.tracking_tick(&mut host);
    assert!(host.take_spoken().is_empty());
    assert!(host.scheduled.is_empty());
    assert_eq!(host.cancelled, vec![TRACKING_EVENT.to_string()]);
    assert!(!session.tracker().is_tracking());
}

#[test]
fn tracking_without_buses_schedules_nothing() {
    let mut session = session(FakeGateway::new());
    let mut host = RecordingHost::new();

    session.request(&mut host, full_request(), true);
    assert_eq!(
        host.spoken,
        vec![Dialog::NoBusesFound {
            stop: "Copley Sq".into()
        }]
    );
    assert!(host.scheduled.is_empty());
}

#[test]
fn new_request_cancels_tracking() {
    let gateway = FakeGateway::new();
    gateway.answer(vec![prediction("t1", "12:05:00")]);
    let mut session = session(gateway);
    let mut host = RecordingHost::new();

    session.request(&mut host, full_request(), true);
    assert!(session.tracker().is_tracking());

    session.request(&mut host, Request::new(), false);
    assert!(!session.tracker().is_tracking());
    assert!(host.scheduled.is_empty());
    assert_eq!(session.pending(), Some(Pending::Route));
}

#[test]
fn shortcut_round_trip_skips_lookups() {
    let gateway = FakeGateway::new();
    gateway.answer(vec![prediction("t1", "12:05:00")]);
    gateway.answer(vec![prediction("t1", "12:02:00")]);
    let mut session = session(gateway);
    let mut host = RecordingHost::new();

    session.request(&mut host, full_request(), false);
    session.handle(&mut host, Intent::SaveShortcut);
    assert_eq!(session.pending(), Some(Pending::ShortcutName));
    host.take_spoken();

    session.reply(&mut host, " work ");
    assert_eq!(
        host.take_spoken(),
        vec![Dialog::SaveComplete {
            shortcut: "work".into()
        }]
    );
    assert_eq!(
        host.vocabulary,
        vec![("work".to_string(), SHORTCUT_VOCABULARY.to_string())]
    );

    let route_calls = session.gateway().route_calls.get();
    let stop_calls = session.gateway().stop_calls.get();
    session.handle(&mut host, Intent::ShortcutArrivals("work".into()));
    assert_eq!(
        host.take_spoken(),
        vec![
            announcement(),
            prefix(),
            Dialog::Arrival(Arrival::Minutes { minutes: 2 })
        ]
    );
    assert_eq!(session.gateway().route_calls.get(), route_calls);
    assert_eq!(session.gateway().stop_calls.get(), stop_calls);
}

#[test]
fn incomplete_selection_cannot_be_saved() {
    let mut session = session(FakeGateway::new());
    let mut host = RecordingHost::new();

    session.request(&mut host, Request::new().route("39"), false);
    host.take_spoken();
    session.save_shortcut(&mut host);

    assert_eq!(host.spoken, vec![Dialog::NotEnoughInfo]);
    assert!(session.shortcuts().is_empty());
}

#[test]
fn removing_unknown_shortcut_changes_nothing() {
    let mut session = session(FakeGateway::new());
    let mut host = RecordingHost::new();

    session.request(&mut host, full_request(), false);
    session.save_shortcut(&mut host);
    session.reply(&mut host, "home");
    host.take_spoken();

    session.handle(&mut host, Intent::RemoveShortcut("gym".into()));
    assert_eq!(
        host.spoken,
        vec![Dialog::DeleteComplete {
            shortcut: "gym".into()
        }]
    );
    assert_eq!(session.shortcuts().list(), vec!["home"]);
}

#[test]
fn removed_shortcut_is_ignored() {
    let mut session = session(FakeGateway::new());
    let mut host = RecordingHost::new();

    session.request(&mut host, full_request(), false);
    session.save_shortcut(&mut host);
    session.reply(&mut host, "home");
    session.remove_shortcut(&mut host, "home");
    host.take_spoken();

    session.handle(&mut host, Intent::ShortcutTracking("home".into()));
    assert!(host.spoken.is_empty());
    assert!(host.scheduled.is_empty());
}

#[test]
fn shortcuts_are_listed() {
    let mut session = session(FakeGateway::new());
    let mut host = RecordingHost::new();

    session.list_shortcuts(&mut host);
    assert_eq!(host.take_spoken(), vec![Dialog::NoSavedRoutes]);

    session.request(&mut host, full_request(), false);
    for name in ["work", "home"] {
        session.save_shortcut(&mut host);
        session.reply(&mut host, name);
    }
    host.take_spoken();

    session.list_shortcuts(&mut host);
    assert_eq!(
        host.spoken,
        vec![Dialog::ListSaved {
            routes: "home, work".into()
        }]
    );
}

#[test]
fn shutdown_ends_tracking() {
    let gateway = FakeGateway::new();
    gateway.answer(vec![prediction("t1", "12:05:00")]);
    let mut session = session(gateway);
    let mut host = RecordingHost::new();

    session.request(&mut host, full_request(), true);
    host.take_spoken();
    session.handle(&mut host, Intent::Shutdown);

    assert_eq!(host.spoken, vec![Dialog::ShutdownMessage]);
    assert!(host.scheduled.is_empty());
    assert!(!session.tracker().is_tracking());
}

#[test]
fn settings_are_normalized() {
    let mut session = session(FakeGateway::new());

    session.update_settings(Config {
        api_key: Some("secret".into()),
        max_tracked: 0,
        tracking_interval_secs: 5,
        ..Default::default()
    });

    assert_eq!(session.config().max_tracked, 1);
    assert_eq!(session.config().tracking_interval_secs, 30);
    assert_eq!(session.gateway().api_key.as_deref(), Some("secret"));
}

#[test]
fn failed_stop_fetch_abandons_request() {
    let gateway = FakeGateway::new();
    gateway.fail_stops.set(true);
    let mut session = session(gateway);
    let mut host = RecordingHost::new();

    session.handle(&mut host, Intent::Arrivals(full_request()));

    assert_eq!(host.spoken, vec![Dialog::ErrorCallingServer]);
    assert_eq!(session.pending(), None);
    assert_eq!(session.gateway().prediction_calls.get(), 0);
}

#[test]
fn failed_stop_fetch_in_reply_clears_question() {
    let mut session = session(FakeGateway::new());
    let mut host = RecordingHost::new();

    session.request(&mut host, Request::new().route("39").direction("inbound"), false);
    assert_eq!(host.take_spoken(), vec![Dialog::WhichStop]);

    session.gateway().fail_stops.set(true);
    assert!(session.reply(&mut host, "copley"));
    assert_eq!(host.spoken, vec![Dialog::ErrorCallingServer]);
    assert_eq!(session.pending(), None);
}

#[test]
fn failed_route_fetch_in_reply_clears_question() {
    let mut session = session(FakeGateway::failing());
    let mut host = RecordingHost::new();

    session.request(&mut host, Request::new(), false);
    assert_eq!(host.take_spoken(), vec![Dialog::WhichRoute]);

    assert!(session.reply(&mut host, "39"));
    assert_eq!(host.spoken, vec![Dialog::ErrorCallingServer]);
    assert_eq!(session.pending(), None);
}

#[test]
fn one_way_route_offers_its_only_direction() {
    let mut session = session(FakeGateway::new());
    let mut host = RecordingHost::new();

    session.request(&mut host, Request::new().route("70a"), false);

    assert_eq!(
        host.spoken,
        vec![Dialog::ConfirmDirection {
            dir: "Outbound".into(),
            dest: "North Waltham".into(),
        }]
    );
    assert_eq!(session.pending(), Some(Pending::Direction));
}

#[test]
fn new_base_url_reloads_routes() {
    let mut session = session(FakeGateway::new());
    let mut host = RecordingHost::new();

    session.request(&mut host, full_request(), false);
    session.update_settings(Config::default());
    session.request(&mut host, full_request(), false);
    assert_eq!(session.gateway().route_calls.get(), 1);
    assert_eq!(session.gateway().base_url, None);

    session.update_settings(Config {
        base_url: "https://mirror.example.test".into(),
        ..Default::default()
    });
    session.request(&mut host, full_request(), false);
    assert_eq!(session.gateway().route_calls.get(), 2);
    assert_eq!(
        session.gateway().base_url.as_deref(),
        Some("https://mirror.example.test")
    );
}
