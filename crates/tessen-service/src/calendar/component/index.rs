//! Positions of the properties a component reads.

use tessen_rfc::rfc::ical::core::{Component, names};

/// Positions into `Component::properties`.
///
/// Singletons hold the first matching property; lists hold every match in
/// order. Positions shift on removal, so the index is rebuilt after every
/// write.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(super) struct PropertyIndex {
    pub uid: Option<usize>,
    pub dtstamp: Option<usize>,
    pub status: Option<usize>,
    pub classification: Option<usize>,
    pub sequence: Option<usize>,
    pub geo: Option<usize>,
    pub url: Option<usize>,
    pub location: Option<usize>,
    pub percent_complete: Option<usize>,
    pub priority: Option<usize>,
    pub last_modified: Option<usize>,
    pub organizer: Option<usize>,
    pub recurrence_id: Option<usize>,
    pub summary: Option<usize>,
    pub dtstart: Option<usize>,
    pub dtend: Option<usize>,
    pub due: Option<usize>,
    pub duration: Option<usize>,
    pub transparency: Option<usize>,
    pub completed: Option<usize>,
    pub created: Option<usize>,

    pub categories: Vec<usize>,
    pub comments: Vec<usize>,
    pub descriptions: Vec<usize>,
    pub contacts: Vec<usize>,
    pub exdates: Vec<usize>,
    pub exrules: Vec<usize>,
    pub rdates: Vec<usize>,
    pub rrules: Vec<usize>,
    pub attendees: Vec<usize>,
}

impl PropertyIndex {
    pub fn build(container: &Component) -> Self {
        let mut index = Self::default();

        for (i, prop) in container.properties.iter().enumerate() {
            let slot = match prop.name.as_str() {
                names::UID => &mut index.uid,
                names::DTSTAMP => &mut index.dtstamp,
                names::STATUS => &mut index.status,
                names::CLASS => &mut index.classification,
                names::SEQUENCE => &mut index.sequence,
                names::GEO => &mut index.geo,
                names::URL => &mut index.url,
                names::LOCATION => &mut index.location,
                names::PERCENT_COMPLETE => &mut index.percent_complete,
                names::PRIORITY => &mut index.priority,
                names::LAST_MODIFIED => &mut index.last_modified,
                names::ORGANIZER => &mut index.organizer,
                names::RECURRENCE_ID => &mut index.recurrence_id,
                names::SUMMARY => &mut index.summary,
                names::DTSTART => &mut index.dtstart,
                names::DTEND => &mut index.dtend,
                names::DUE => &mut index.due,
                names::DURATION => &mut index.duration,
                names::TRANSP => &mut index.transparency,
                names::COMPLETED => &mut index.completed,
                names::CREATED => &mut index.created,
                other => {
                    let list = match other {
                        names::CATEGORIES => &mut index.categories,
                        names::COMMENT => &mut index.comments,
                        names::DESCRIPTION => &mut index.descriptions,
                        names::CONTACT => &mut index.contacts,
                        names::EXDATE => &mut index.exdates,
                        names::EXRULE => &mut index.exrules,
                        names::RDATE => &mut index.rdates,
                        names::RRULE => &mut index.rrules,
                        names::ATTENDEE => &mut index.attendees,
                        _ => continue,
                    };
                    list.push(i);
                    continue;
                }
            };
            if slot.is_none() {
                *slot = Some(i);
            }
        }

        tracing::trace!(
            properties = container.properties.len(),
            "Property index rebuilt"
        );
        index
    }
}

#[cfg(test)]
mod tests {
    use tessen_rfc::rfc::ical::core::Property;

    use super::*;

    #[test]
    fn first_singleton_wins_and_lists_keep_order() {
        let mut event = Component::event();
        event.add_property(Property::text("SUMMARY", "first"));
        event.add_property(Property::text("COMMENT", "a"));
        event.add_property(Property::text("SUMMARY", "second"));
        event.add_property(Property::text("X-CUSTOM", "ignored"));
        event.add_property(Property::text("COMMENT", "b"));

        let index = PropertyIndex::build(&event);
        assert_eq!(index.summary, Some(0));
        assert_eq!(index.comments, vec![1, 4]);
        assert!(index.uid.is_none());
    }
}
