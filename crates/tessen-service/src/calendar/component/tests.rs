use std::ops::ControlFlow;

use chrono::{NaiveDate, NaiveDateTime, TimeZone, Utc};
use tessen_core::constants::ALARM_UID_PROPERTY;
use tessen_core::config::Settings;
use tessen_rfc::rfc::ical::core::{
    Component, Duration, Geo, ICalendar, Property, RRule, TriggerRelated, names, param_names,
};

use super::*;
use crate::calendar::types::{AlarmAction, AlarmTrigger, PartStat};
use crate::calendar::uid::HostIdentity;

fn at(y: i32, m: u32, d: u32, h: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(y, m, d)
        .and_then(|date| date.and_hms_opt(h, 0, 0))
        .unwrap()
}

fn frozen_generator() -> UidGenerator {
    let identity = HostIdentity {
        hostname: "cal.example.org".into(),
        pid: 100,
        gid: 20,
        ppid: 1,
    };
    UidGenerator::new(identity)
        .with_clock(|| Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap())
        .with_serial(0)
}

fn component() -> CalComponent {
    CalComponent::new().with_uid_generator(frozen_generator())
}

fn meeting_container() -> Component {
    let mut event = Component::event();
    event.add_property(Property::text(names::UID, "meeting-1@example.org"));
    event.add_property(Property::text(names::DTSTAMP, "20240101T000000Z"));
    event.add_property(
        CalDateTime::zoned(at(2024, 1, 1, 9), "Europe/Berlin").to_property(names::DTSTART),
    );
    event.add_property(
        CalDateTime::zoned(at(2024, 1, 1, 10), "Europe/Berlin").to_property(names::DTEND),
    );
    event.add_property(Property::text(names::SUMMARY, "Standup"));
    event.add_property(Property::text(names::CATEGORIES, "work, daily"));
    event
}

fn meeting() -> CalComponent {
    let mut cal = component();
    cal.adopt(meeting_container()).unwrap();
    cal
}

fn display_alarm(uid: &str) -> CalAlarm {
    let mut alarm = CalAlarm::new();
    alarm.set_action(&AlarmAction::Display);
    alarm.set_uid(uid);
    alarm
}

#[test_log::test]
fn adopt_exposes_typed_properties() {
    let cal = meeting();

    assert_eq!(cal.kind(), CalKind::Event);
    assert_eq!(cal.get_uid(), Some("meeting-1@example.org"));
    assert!(cal.get_dtstamp().unwrap().is_utc());
    assert_eq!(
        cal.get_dtstart(),
        Some(CalDateTime::zoned(at(2024, 1, 1, 9), "Europe/Berlin"))
    );
    assert_eq!(cal.get_dtend().unwrap().value, at(2024, 1, 1, 10));
    assert_eq!(cal.get_summary(), Some(CalText::new("Standup")));
    assert_eq!(cal.get_categories(), vec!["work", "daily"]);
    assert_eq!(cal.get_status(), Status::None);
    assert!(!cal.needs_sequence_increment());
}

#[test_log::test]
fn utc_values_are_canonical() {
    let mut event = Component::event();
    event.add_property(Property::text(names::DTSTART, "20240101T090000Z"));
    let cal = CalComponent::from_container(event).unwrap();

    let start = cal.get_dtstart().unwrap();
    assert!(start.is_utc());
    assert_eq!(start, CalDateTime::utc(at(2024, 1, 1, 9)));
}

#[test_log::test]
fn initialize_synthesizes_uid_and_dtstamp() {
    let mut cal = component();
    cal.initialize(CalKind::Todo);

    assert_eq!(cal.kind(), CalKind::Todo);
    assert!(cal.get_uid().unwrap().ends_with("@cal.example.org"));
    assert_eq!(cal.get_dtstamp(), Some(CalDateTime::utc(at(2024, 5, 1, 12))));
}

#[test_log::test]
fn adopt_fills_missing_mandatory_properties() {
    let mut cal = component();
    cal.adopt(Component::journal()).unwrap();
    assert!(cal.get_uid().is_some());
    assert!(cal.get_dtstamp().is_some());
}

#[test_log::test]
fn initialize_none_stays_empty() {
    let mut cal = component();
    cal.initialize(CalKind::None);

    assert!(!cal.is_initialized());
    assert_eq!(cal.set_uid("x"), Err(ComponentError::NotInitialized));
    assert_eq!(cal.commit_sequence(), Err(ComponentError::NotInitialized));
    assert_eq!(cal.to_container(), Err(ComponentError::NotInitialized));
}

#[test_log::test]
fn unsupported_kinds_are_refused() {
    let mut cal = meeting();
    let err = cal.adopt(Component::alarm()).unwrap_err();
    assert_eq!(err, ComponentError::UnsupportedKind("VALARM".into()));
    assert!(!cal.is_initialized());

    let err = CalComponent::from_container(Component::custom("X-THING")).unwrap_err();
    assert_eq!(err, ComponentError::UnsupportedKind("X-THING".into()));
}

#[test_log::test]
fn rescan_is_idempotent() {
    let mut cal = meeting();
    cal.add_alarm(display_alarm("a1")).unwrap();
    let before = cal.to_container().unwrap();

    cal.rescan();
    cal.rescan();

    assert_eq!(cal.to_container().unwrap(), before);
    assert_eq!(cal.alarm_uids(), vec!["a1"]);
}

#[test_log::test]
fn rescan_picks_up_direct_edits() {
    let mut cal = meeting();
    let container = cal.container_mut().unwrap();
    container.add_property(Property::text(names::LOCATION, "Room 4"));
    container.add_child(display_alarm("late").into_container());

    cal.rescan();

    assert_eq!(cal.get_location(), Some("Room 4"));
    assert!(cal.get_alarm("late").is_some());
    assert!(cal.container().unwrap().children.is_empty());
}

#[test_log::test]
fn try_clone_is_equal_and_independent() {
    let mut cal = meeting();
    cal.add_alarm(display_alarm("a1")).unwrap();

    let mut copy = cal.try_clone().unwrap();
    assert_eq!(copy.to_container(), cal.to_container());

    copy.set_location(Some("elsewhere")).unwrap();
    assert_eq!(cal.get_location(), None);
}

#[test_log::test]
fn significant_change_increments_sequence_once() {
    let mut cal = meeting();
    assert_eq!(cal.get_sequence(), None);

    cal.set_dtstart(Some(&CalDateTime::zoned(at(2024, 1, 2, 9), "Europe/Berlin")))
        .unwrap();
    cal.set_status(Status::Confirmed).unwrap();
    assert!(cal.needs_sequence_increment());
    cal.commit_sequence().unwrap();
    assert_eq!(cal.get_sequence(), Some(1));

    cal.set_rrules(&[RRule::daily()]).unwrap();
    cal.commit_sequence().unwrap();
    assert_eq!(cal.get_sequence(), Some(2));
    assert!(!cal.needs_sequence_increment());
}

#[test_log::test]
fn descriptive_change_keeps_sequence() {
    let mut cal = meeting();
    cal.set_sequence(Some(4)).unwrap();
    cal.set_summary(Some(&CalText::new("Renamed"))).unwrap();
    cal.set_location(Some("Room 1")).unwrap();
    cal.set_priority(Some(3)).unwrap();

    assert!(!cal.needs_sequence_increment());
    cal.commit_sequence().unwrap();
    assert_eq!(cal.get_sequence(), Some(4));
}

#[test_log::test]
fn abort_drops_pending_increment() {
    let mut cal = meeting();
    cal.set_status(Status::Cancelled).unwrap();
    cal.abort_sequence();
    cal.commit_sequence().unwrap();
    assert_eq!(cal.get_sequence(), None);
}

#[test_log::test]
fn pending_sequence_blocks_export() {
    let mut cal = meeting();
    cal.set_dtend(None).unwrap();

    assert_eq!(cal.to_container(), Err(ComponentError::SequencePending));
    assert_eq!(cal.take_container(), Err(ComponentError::SequencePending));
    assert!(matches!(cal.try_clone(), Err(ComponentError::SequencePending)));
    assert!(cal.is_initialized());

    cal.commit_sequence().unwrap();
    assert!(cal.take_container().is_ok());
    assert!(!cal.is_initialized());
}

#[test_log::test]
fn dtend_derives_from_duration() {
    let mut cal = meeting();
    cal.set_duration(Some(Duration::minutes(90))).unwrap();

    assert!(cal.container().unwrap().get_property(names::DTEND).is_none());
    assert_eq!(
        cal.get_dtend().unwrap().value,
        at(2024, 1, 1, 10) + chrono::TimeDelta::minutes(30)
    );

    cal.set_dtend(Some(&CalDateTime::zoned(at(2024, 1, 1, 11), "Europe/Berlin")))
        .unwrap();
    assert_eq!(cal.get_duration(), None);
    assert_eq!(cal.get_dtend().unwrap().value, at(2024, 1, 1, 11));
}

#[test_log::test]
fn due_derives_from_duration_for_todos() {
    let mut cal = component();
    cal.initialize(CalKind::Todo);
    cal.set_dtstart(Some(&CalDateTime::floating(at(2024, 3, 1, 8))))
        .unwrap();
    cal.set_due(Some(&CalDateTime::floating(at(2024, 3, 1, 17))))
        .unwrap();
    cal.set_duration(Some(Duration::hours(2))).unwrap();

    assert!(cal.container().unwrap().get_property(names::DUE).is_none());
    assert_eq!(cal.get_due(), Some(CalDateTime::floating(at(2024, 3, 1, 10))));
    assert_eq!(cal.get_dtend(), None);
}

#[test_log::test]
fn bounded_integers_are_checked() {
    let mut cal = meeting();

    assert_eq!(
        cal.set_priority(Some(10)),
        Err(ComponentError::OutOfRange {
            property: names::PRIORITY,
            value: 10,
            min: 0,
            max: 9,
        })
    );
    assert!(matches!(
        cal.set_percent_complete(Some(101)),
        Err(ComponentError::OutOfRange { max: 100, .. })
    ));

    cal.set_percent_complete(Some(100)).unwrap();
    assert_eq!(cal.get_percent_complete(), Some(100));
    assert_eq!(cal.get_priority(), None);
}

#[test_log::test]
fn categories_string_round_trip() {
    let mut cal = meeting();
    assert_eq!(cal.get_categories_string().as_deref(), Some("work,daily"));

    cal.set_categories_string("a, b,,c").unwrap();
    assert_eq!(cal.get_categories(), vec!["a", "b", "c"]);

    cal.set_categories(&[]).unwrap();
    assert_eq!(cal.get_categories_string(), None);
}

#[test_log::test]
fn multi_valued_text_properties() {
    let mut cal = meeting();
    let comments = vec![
        CalText::new("first"),
        CalText::new("second").with_altrep("https://example.org/c2"),
    ];
    cal.set_comments(&comments).unwrap();
    cal.set_contacts(&[CalText::from("Jane, +1 555 0100")]).unwrap();

    assert_eq!(cal.get_comments(), comments);
    assert_eq!(cal.get_contacts().len(), 1);
    assert!(cal.get_descriptions().is_empty());
}

#[test_log::test]
fn attendees_write_through() {
    let mut cal = meeting();
    let mut attendee = Attendee::new("mailto:jane@example.org");
    attendee.partstat = Some(PartStat::Accepted);
    cal.set_attendees(&[attendee.clone(), Attendee::new("mailto:bob@example.org")])
        .unwrap();

    let attendees = cal.get_attendees();
    assert_eq!(attendees.len(), 2);
    assert_eq!(attendees[0], attendee);
}

#[test_log::test]
fn alarms_move_out_and_back() {
    let mut event = meeting_container();
    event.add_child(display_alarm("a1").into_container());
    event.add_child(display_alarm("a2").into_container());

    let mut cal = component();
    cal.adopt(event).unwrap();
    assert!(cal.container().unwrap().children.is_empty());
    assert_eq!(cal.alarm_uids(), vec!["a1", "a2"]);

    let removed = cal.remove_alarm("a1").unwrap();
    assert_eq!(removed.uid(), Some("a1"));
    assert!(cal.get_alarm("a2").is_some());

    let exported = cal.to_container().unwrap();
    assert_eq!(exported.alarms().len(), 1);
}

#[test_log::test]
fn colliding_alarm_uids_are_regenerated() {
    let mut cal = meeting();
    let first = cal.add_alarm(display_alarm("dup")).unwrap();
    let second = cal.add_alarm(display_alarm("dup")).unwrap();
    let third = cal.add_alarm(CalAlarm::new()).unwrap();

    assert_eq!(first, "dup");
    assert_ne!(second, "dup");
    assert_ne!(third, second);
    assert_eq!(
        cal.alarm_uids(),
        vec![first.as_str(), second.as_str(), third.as_str()]
    );
    assert_eq!(cal.get_alarm(&second).unwrap().uid(), Some(second.as_str()));
    assert_eq!(
        cal.get_alarm("dup")
            .unwrap()
            .container()
            .get_properties(ALARM_UID_PROPERTY)
            .len(),
        1
    );
}

#[test_log::test]
fn commit_fills_alarm_text() {
    let mut cal = meeting();
    let mut email = CalAlarm::new();
    email.set_action(&AlarmAction::Email);
    let display = cal.add_alarm(display_alarm("d")).unwrap();
    let email = cal.add_alarm(email).unwrap();

    cal.commit_sequence().unwrap();

    assert_eq!(cal.get_alarm(&display).unwrap().get_description(), Some("Standup"));
    let email = cal.get_alarm(&email).unwrap();
    assert_eq!(email.get_summary(), Some("Standup"));
    assert_eq!(email.get_description(), Some("Standup"));
}

#[test_log::test]
fn untitled_alarm_text_uses_placeholder() {
    let mut cal = component();
    cal.initialize(CalKind::Event);
    let uid = cal.add_alarm(display_alarm("d")).unwrap();
    cal.commit_sequence().unwrap();
    assert_eq!(
        cal.get_alarm(&uid).unwrap().get_description(),
        Some(DEFAULT_UNTITLED_DESCRIPTION)
    );
}

#[test_log::test]
fn simple_recurrence_detection() {
    let mut cal = meeting();
    assert!(cal.has_simple_recurrence());

    cal.set_rrules(&[RRule::weekly().with_interval(2)]).unwrap();
    assert!(cal.has_simple_recurrence());

    cal.set_exdates(&[CalDateTime::zoned(at(2024, 1, 15, 9), "Europe/Berlin")])
        .unwrap();
    assert!(!cal.has_simple_recurrence());
    assert!(cal.has_exceptions());
    assert!(cal.has_recurrences());
    assert!(!cal.is_instance());
}

#[test_log::test]
fn generates_instances_with_exdate() {
    let mut cal = meeting();
    cal.set_rrules(&[RRule::daily().with_count(4)]).unwrap();
    cal.set_exdates(&[CalDateTime::zoned(at(2024, 1, 2, 9), "Europe/Berlin")])
        .unwrap();
    cal.commit_sequence().unwrap();

    let mut starts = Vec::new();
    let delivered = cal.generate_instances(Window::unbounded(), |occurrence| {
        starts.push(occurrence.start);
        ControlFlow::Continue(())
    });

    assert_eq!(delivered, 3);
    assert_eq!(
        starts,
        vec![at(2024, 1, 1, 9), at(2024, 1, 3, 9), at(2024, 1, 4, 9)]
    );
}

#[test_log::test]
fn end_date_from_first_rule_count() {
    let mut cal = meeting();
    assert_eq!(cal.end_date_from_count(), None);

    cal.set_rrules(&[RRule::daily().with_count(3)]).unwrap();
    assert_eq!(cal.end_date_from_count(), Some(at(2024, 1, 4, 0)));

    cal.set_rrules(&[RRule::daily()]).unwrap();
    assert_eq!(cal.end_date_from_count(), None);
}

#[test_log::test]
fn end_date_from_count_ignores_other_recurrence_data() {
    let mut cal = meeting();
    cal.set_rrules(&[RRule::daily().with_count(5), RRule::weekly().with_count(2)])
        .unwrap();
    cal.set_rdates(&[CalPeriod::instant(CalDateTime::zoned(
        at(2024, 1, 2, 12),
        "Europe/Berlin",
    ))])
    .unwrap();
    cal.set_exdates(&[CalDateTime::zoned(at(2024, 1, 3, 9), "Europe/Berlin")])
        .unwrap();

    assert_eq!(cal.end_date_from_count(), Some(at(2024, 1, 6, 0)));
}

#[test_log::test]
fn default_components_get_distinct_uids() {
    let mut a = CalComponent::new();
    let mut b = CalComponent::new();
    a.initialize(CalKind::Event);
    b.initialize(CalKind::Event);

    assert!(a.get_uid().is_some());
    assert_ne!(a.get_uid(), b.get_uid());
    assert_ne!(a.gen_uid(), b.gen_uid());
}

#[test_log::test]
fn default_uid_grammar() {
    let uid = CalComponent::new().gen_uid();
    let (head, host) = uid.split_once('@').unwrap();
    assert!(!host.is_empty());

    let parts: Vec<&str> = head.split('-').collect();
    assert_eq!(parts.len(), 5, "{uid}");
    assert_eq!(parts[0].len(), 15);
    assert_eq!(parts[0].as_bytes()[8], b'T');
    assert_eq!(parts[1], std::process::id().to_string());
    for part in &parts[2..] {
        assert!(part.parse::<u64>().is_ok(), "{uid}");
    }
}

#[test_log::test]
fn event_dates_match_compares_zone_and_value() {
    let a = meeting();
    let mut b = meeting();
    assert!(a.event_dates_match(&b));

    b.set_dtstart(Some(&CalDateTime::zoned(at(2024, 1, 1, 9), "America/New_York")))
        .unwrap();
    assert!(!a.event_dates_match(&b));

    let empty_a = component();
    let empty_b = component();
    assert!(empty_a.event_dates_match(&empty_b));
}

#[test_log::test]
fn event_dates_match_ignores_utc_spelling() {
    let mut a = meeting();
    let mut b = meeting();
    a.set_dtstart(Some(&CalDateTime::zoned(at(2024, 1, 1, 8), "utc"))).unwrap();
    a.set_dtend(Some(&CalDateTime::utc(at(2024, 1, 1, 9)))).unwrap();
    b.set_dtstart(Some(&CalDateTime::utc(at(2024, 1, 1, 8)))).unwrap();
    b.set_dtend(Some(&CalDateTime::zoned(at(2024, 1, 1, 9), "UTC"))).unwrap();

    assert!(a.event_dates_match(&b));
}

#[test_log::test]
fn calendar_hand_off() {
    let mut calendar = ICalendar::new("-//Example//EN");
    calendar.add_component(meeting_container());

    let mut cal = component();
    assert!(matches!(
        cal.adopt_from(&mut calendar, 5),
        Err(ServiceError::NotFound(_))
    ));

    cal.adopt_from(&mut calendar, 0).unwrap();
    assert!(calendar.root.children.is_empty());
    assert_eq!(cal.get_uid(), Some("meeting-1@example.org"));

    cal.return_to(&mut calendar).unwrap();
    assert!(!cal.is_initialized());
    assert_eq!(calendar.uids(), vec!["meeting-1@example.org"]);
}

#[test_log::test]
fn timestamps_are_utc() {
    let mut cal = meeting();
    let when = Utc.with_ymd_and_hms(2024, 2, 1, 8, 30, 0).unwrap();
    cal.set_last_modified(Some(when)).unwrap();
    cal.set_created(Some(when)).unwrap();

    assert_eq!(cal.get_last_modified(), Some(when));
    assert_eq!(cal.get_created(), Some(when));
    assert_eq!(cal.get_completed(), None);

    let stamp = cal
        .container()
        .unwrap()
        .get_property(names::LAST_MODIFIED)
        .unwrap();
    assert!(stamp.get_param_value(param_names::TZID).is_none());
}

#[test_log::test]
fn remaining_accessors_round_trip_through_clone() {
    let mut cal = CalComponent::with_settings(&Settings::default())
        .with_uid_generator(frozen_generator());
    cal.initialize(CalKind::Event);
    assert!(cal.gen_uid().ends_with("@cal.example.org"));

    let when = Utc.with_ymd_and_hms(2024, 4, 2, 7, 0, 0).unwrap();
    let recurrence_id = CalDateTime::zoned(at(2024, 1, 8, 9), "Europe/Berlin");
    let organizer = Organizer {
        cn: Some("Jane".into()),
        ..Organizer::new("mailto:jane@example.org")
    };
    let exrule = RRule::weekly().with_count(2);
    let rdates = vec![
        CalPeriod::instant(CalDateTime::zoned(at(2024, 2, 1, 9), "Europe/Berlin")),
        CalPeriod::with_end(
            CalDateTime::zoned(at(2024, 2, 3, 9), "Europe/Berlin"),
            at(2024, 2, 3, 12),
        ),
        CalPeriod::with_duration(CalDateTime::utc(at(2024, 2, 5, 8)), Duration::hours(2)),
    ];

    cal.set_dtstamp(when).unwrap();
    cal.set_completed(Some(when)).unwrap();
    cal.set_recurrence_id(Some(&recurrence_id)).unwrap();
    cal.set_classification(&Classification::Confidential).unwrap();
    cal.set_transparency(Transparency::Transparent).unwrap();
    cal.set_url(Some("https://example.org/standup")).unwrap();
    cal.set_geo(Some(Geo::new(52.52, 13.405))).unwrap();
    cal.set_organizer(Some(&organizer)).unwrap();
    cal.set_descriptions(&[CalText::new("Daily sync")]).unwrap();
    cal.set_exrules(std::slice::from_ref(&exrule)).unwrap();
    cal.set_rdates(&rdates).unwrap();
    cal.commit_sequence().unwrap();

    let copy = cal.try_clone().unwrap();
    for c in [&cal, &copy] {
        assert_eq!(c.get_dtstamp(), Some(CalDateTime::utc(when.naive_utc())));
        assert_eq!(c.get_completed(), Some(when));
        assert_eq!(c.get_recurrence_id(), Some(recurrence_id.clone()));
        assert!(c.is_instance());
        assert_eq!(c.get_classification(), Classification::Confidential);
        assert_eq!(c.get_transparency(), Transparency::Transparent);
        assert_eq!(c.get_url(), Some("https://example.org/standup"));
        assert_eq!(c.get_geo(), Some(Geo::new(52.52, 13.405)));
        assert_eq!(c.get_organizer(), Some(organizer.clone()));
        assert_eq!(c.get_descriptions(), vec![CalText::new("Daily sync")]);
        assert_eq!(c.get_exrules(), vec![exrule.clone()]);
        assert_eq!(c.get_rdates(), rdates);
        assert!(c.has_rdates() && c.has_exrules() && !c.has_rrules());
    }

    cal.set_classification(&Classification::None).unwrap();
    cal.set_transparency(Transparency::None).unwrap();
    assert_eq!(cal.get_classification(), Classification::None);
    assert!(cal.container().unwrap().get_property(names::TRANSP).is_none());
    assert_eq!(cal.get_sequence(), copy.get_sequence());
}

#[test_log::test]
fn alarm_handles_and_bulk_removal() {
    let mut cal = meeting();
    assert!(!cal.has_alarms());
    let uid = cal.add_alarm(display_alarm("a")).unwrap();
    cal.add_alarm(display_alarm("b")).unwrap();

    let trigger = AlarmTrigger::Relative {
        related: TriggerRelated::Start,
        duration: Duration::minutes(15).negate(),
    };
    cal.get_alarm_mut(&uid).unwrap().set_trigger(&trigger);
    assert_eq!(cal.get_alarm(&uid).unwrap().get_trigger(), trigger);
    assert!(cal.has_alarms());

    let removed = cal.remove_all_alarms();
    assert_eq!(removed.len(), 2);
    assert!(!cal.has_alarms());
    assert!(cal.get_alarm(&uid).is_none());
    assert!(cal.to_container().unwrap().alarms().is_empty());
}

#[test_log::test]
fn window_starting_at_skips_earlier_instances() {
    let mut cal = meeting();
    cal.set_rrules(&[RRule::daily().with_count(5)]).unwrap();
    cal.commit_sequence().unwrap();

    let mut starts = Vec::new();
    cal.generate_instances(Window::starting_at(at(2024, 1, 4, 0)), |o| {
        starts.push(o.start);
        ControlFlow::Continue(())
    });
    assert_eq!(starts, vec![at(2024, 1, 4, 9), at(2024, 1, 5, 9)]);
}
