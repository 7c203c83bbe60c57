//! iCalendar component containers (RFC 5545 §3.4-3.6).

use tessen_core::constants::PRODUCT_ID;

use super::Property;

/// Component kind for iCalendar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComponentKind {
    /// VCALENDAR wrapper component.
    Calendar,
    /// VEVENT component.
    Event,
    /// VTODO component.
    Todo,
    /// VJOURNAL component.
    Journal,
    /// VFREEBUSY component.
    FreeBusy,
    /// VTIMEZONE component.
    Timezone,
    /// VALARM component (nested within VEVENT/VTODO).
    Alarm,
    /// STANDARD sub-component of VTIMEZONE.
    Standard,
    /// DAYLIGHT sub-component of VTIMEZONE.
    Daylight,
    /// Unknown/X-component.
    Unknown,
}

impl ComponentKind {
    /// Returns the string name for this component kind.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Calendar => "VCALENDAR",
            Self::Event => "VEVENT",
            Self::Todo => "VTODO",
            Self::Journal => "VJOURNAL",
            Self::FreeBusy => "VFREEBUSY",
            Self::Timezone => "VTIMEZONE",
            Self::Alarm => "VALARM",
            Self::Standard => "STANDARD",
            Self::Daylight => "DAYLIGHT",
            Self::Unknown => "X-UNKNOWN",
        }
    }

    /// Parses a component kind from a string (case-insensitive).
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s.to_ascii_uppercase().as_str() {
            "VCALENDAR" => Self::Calendar,
            "VEVENT" => Self::Event,
            "VTODO" => Self::Todo,
            "VJOURNAL" => Self::Journal,
            "VFREEBUSY" => Self::FreeBusy,
            "VTIMEZONE" => Self::Timezone,
            "VALARM" => Self::Alarm,
            "STANDARD" => Self::Standard,
            "DAYLIGHT" => Self::Daylight,
            _ => Self::Unknown,
        }
    }
}

impl std::fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A generic iCalendar property container.
///
/// Holds properties in order of appearance plus nested sub-components.
/// A VCALENDAR holds VEVENTs, which may hold VALARMs.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Component {
    /// Component type.
    pub kind: Option<ComponentKind>,
    /// Original component name (preserved for X-components).
    pub name: String,
    /// Properties in order of appearance.
    pub properties: Vec<Property>,
    /// Nested sub-components.
    pub children: Vec<Component>,
}

impl Component {
    /// Creates a new component with the given kind.
    #[must_use]
    pub fn new(kind: ComponentKind) -> Self {
        Self {
            kind: Some(kind),
            name: kind.as_str().to_string(),
            properties: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Creates a new component with a custom name (for X-components).
    #[must_use]
    pub fn custom(name: impl Into<String>) -> Self {
        let name = name.into();
        let kind = ComponentKind::parse(&name);
        Self {
            kind: Some(kind),
            name,
            properties: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Creates a VCALENDAR component.
    #[must_use]
    pub fn calendar() -> Self {
        Self::new(ComponentKind::Calendar)
    }

    /// Creates a VEVENT component.
    #[must_use]
    pub fn event() -> Self {
        Self::new(ComponentKind::Event)
    }

    /// Creates a VJOURNAL component.
    #[must_use]
    pub fn journal() -> Self {
        Self::new(ComponentKind::Journal)
    }

    /// Creates a VALARM component.
    #[must_use]
    pub fn alarm() -> Self {
        Self::new(ComponentKind::Alarm)
    }

    /// Adds a property to the end of the property list.
    pub fn add_property(&mut self, prop: Property) {
        self.properties.push(prop);
    }

    /// Replaces the first property with the same name, or appends it.
    ///
    /// Returns the index the property now occupies.
    pub fn set_property(&mut self, prop: Property) -> usize {
        if let Some(idx) = self.properties.iter().position(|p| p.name == prop.name) {
            self.properties[idx] = prop;
            idx
        } else {
            self.properties.push(prop);
            self.properties.len() - 1
        }
    }

    /// Removes every property with the given name and returns them in order.
    pub fn remove_properties(&mut self, name: &str) -> Vec<Property> {
        let name_upper = name.to_ascii_uppercase();
        let (removed, kept): (Vec<Property>, Vec<Property>) = std::mem::take(&mut self.properties)
            .into_iter()
            .partition(|p| p.name == name_upper);
        self.properties = kept;
        removed
    }

    /// Adds a child component.
    pub fn add_child(&mut self, child: Component) {
        self.children.push(child);
    }

    /// Detaches and returns all children of a specific kind, keeping the rest.
    pub fn take_children_of_kind(&mut self, kind: ComponentKind) -> Vec<Component> {
        let (taken, kept): (Vec<Component>, Vec<Component>) = std::mem::take(&mut self.children)
            .into_iter()
            .partition(|c| c.kind == Some(kind));
        self.children = kept;
        taken
    }

    /// Returns the first property with the given name.
    #[must_use]
    pub fn get_property(&self, name: &str) -> Option<&Property> {
        let name_upper = name.to_ascii_uppercase();
        self.properties.iter().find(|p| p.name == name_upper)
    }

    /// Returns all properties with the given name.
    #[must_use]
    pub fn get_properties(&self, name: &str) -> Vec<&Property> {
        let name_upper = name.to_ascii_uppercase();
        self.properties
            .iter()
            .filter(|p| p.name == name_upper)
            .collect()
    }

    /// Returns the UID property value if present.
    #[must_use]
    pub fn uid(&self) -> Option<&str> {
        self.get_property("UID")?.as_text()
    }

    /// Returns the SUMMARY property value if present.
    #[must_use]
    pub fn summary(&self) -> Option<&str> {
        self.get_property("SUMMARY")?.as_text()
    }

    /// Returns children of a specific kind.
    #[must_use]
    pub fn children_of_kind(&self, kind: ComponentKind) -> Vec<&Component> {
        self.children
            .iter()
            .filter(|c| c.kind == Some(kind))
            .collect()
    }

    /// Returns all VALARM children.
    #[must_use]
    pub fn alarms(&self) -> Vec<&Component> {
        self.children_of_kind(ComponentKind::Alarm)
    }
}

/// Top-level iCalendar envelope.
///
/// Components embedded here are owned by the envelope; a typed component
/// layer borrows one by moving it out and hands it back when done.
#[derive(Debug, Clone, PartialEq)]
pub struct ICalendar {
    /// The root VCALENDAR component.
    pub root: Component,
}

impl ICalendar {
    /// Creates a new empty iCalendar with required properties.
    #[must_use]
    pub fn new(prodid: impl Into<String>) -> Self {
        let mut root = Component::calendar();
        root.add_property(Property::text("VERSION", "2.0"));
        root.add_property(Property::text("PRODID", prodid));
        Self { root }
    }

    /// Returns the PRODID value.
    #[must_use]
    pub fn prodid(&self) -> Option<&str> {
        self.root.get_property("PRODID")?.as_text()
    }

    /// Adds a VEVENT component.
    pub fn add_event(&mut self, event: Component) {
        self.root.add_child(event);
    }

    /// Adds any component as a child of the root.
    pub fn add_component(&mut self, component: Component) {
        self.root.add_child(component);
    }

    /// Removes and returns the child at `index`, if any.
    pub fn take_component(&mut self, index: usize) -> Option<Component> {
        (index < self.root.children.len()).then(|| self.root.children.remove(index))
    }

    /// Returns all VEVENT components.
    #[must_use]
    pub fn events(&self) -> Vec<&Component> {
        self.root.children_of_kind(ComponentKind::Event)
    }

    /// Returns all unique UIDs in this calendar.
    #[must_use]
    pub fn uids(&self) -> Vec<&str> {
        let mut uids: Vec<&str> = self.root.children.iter().filter_map(|c| c.uid()).collect();
        uids.sort_unstable();
        uids.dedup();
        uids
    }
}

impl Default for ICalendar {
    fn default() -> Self {
        Self::new(PRODUCT_ID)
    }
}
