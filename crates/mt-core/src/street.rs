//! Street classification and the classification → priority table.

/// Closed set of drivable street classes understood by the generator.
///
/// Mirrors the drivable OSM `highway=*` values; parsing the raw tag is the
/// job of the record producer, [`StreetType::from_tag`] is provided for it.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum StreetType {
    Motorway,
    Trunk,
    Primary,
    Secondary,
    Tertiary,
    Unclassified,
    Residential,
    LivingStreet,
    Service,
    Road,
}

impl StreetType {
    pub const ALL: [StreetType; 10] = [
        StreetType::Motorway,
        StreetType::Trunk,
        StreetType::Primary,
        StreetType::Secondary,
        StreetType::Tertiary,
        StreetType::Unclassified,
        StreetType::Residential,
        StreetType::LivingStreet,
        StreetType::Service,
        StreetType::Road,
    ];

    /// Parse an OSM `highway` value.  `None` for non-drivable classes.
    ///
    /// `*_link` ramps are folded into their parent class.
    pub fn from_tag(highway: &str) -> Option<StreetType> {
        match highway {
            "motorway" | "motorway_link"   => Some(StreetType::Motorway),
            "trunk" | "trunk_link"         => Some(StreetType::Trunk),
            "primary" | "primary_link"     => Some(StreetType::Primary),
            "secondary" | "secondary_link" => Some(StreetType::Secondary),
            "tertiary" | "tertiary_link"   => Some(StreetType::Tertiary),
            "unclassified"                 => Some(StreetType::Unclassified),
            "residential"                  => Some(StreetType::Residential),
            "living_street"                => Some(StreetType::LivingStreet),
            "service"                      => Some(StreetType::Service),
            "road"                         => Some(StreetType::Road),
            _                              => None,
        }
    }

    /// Assumed speed limit (km/h) when a way carries no explicit `maxspeed`.
    pub fn default_max_speed_kmh(self) -> f32 {
        match self {
            StreetType::Motorway     => 130.0,
            StreetType::Trunk        => 100.0,
            StreetType::Primary      => 70.0,
            StreetType::Secondary    => 60.0,
            StreetType::Tertiary     => 50.0,
            StreetType::Unclassified
            | StreetType::Residential
            | StreetType::Road       => 50.0,
            StreetType::LivingStreet => 10.0,
            StreetType::Service      => 20.0,
        }
    }

    #[inline]
    fn slot(self) -> usize {
        self as usize
    }
}

/// Street class → priority level lookup consulted when the generator builds
/// directed edges.  Higher values win ties at intersections.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StreetPriorities {
    levels: [u8; StreetType::ALL.len()],
}

impl StreetPriorities {
    /// A table where every class has the same priority.
    pub fn uniform(level: u8) -> Self {
        Self { levels: [level; StreetType::ALL.len()] }
    }

    #[inline]
    pub fn get(&self, street: StreetType) -> u8 {
        self.levels[street.slot()]
    }

    /// Override the priority of one class.
    pub fn set(&mut self, street: StreetType, level: u8) -> &mut Self {
        self.levels[street.slot()] = level;
        self
    }
}

impl Default for StreetPriorities {
    fn default() -> Self {
        let mut table = Self::uniform(0);
        table
            .set(StreetType::Motorway, 8)
            .set(StreetType::Trunk, 7)
            .set(StreetType::Primary, 6)
            .set(StreetType::Secondary, 5)
            .set(StreetType::Tertiary, 4)
            .set(StreetType::Unclassified, 3)
            .set(StreetType::Road, 3)
            .set(StreetType::Residential, 2)
            .set(StreetType::LivingStreet, 1)
            .set(StreetType::Service, 1);
        table
    }
}
