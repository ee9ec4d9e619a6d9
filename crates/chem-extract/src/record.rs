//! Element records and the text formatter that builds them.
//!
//! The formatter is a best-effort scrape: four positional header lines from
//! the clicked tile, then keyword-anchored lines from the data panel. A
//! property that is not found is left empty. That is a normal outcome, the
//! panel layout drifts and partial records are still useful.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// A labeled value with its unit. An empty value means "not found".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Property<T = String> {
    pub name: String,
    pub value: T,
    pub unit: String,
}

impl<T> Property<T> {
    pub fn new(name: impl Into<String>, value: T, unit: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value,
            unit: unit.into(),
        }
    }
}

impl Property {
    /// Whether a value was found for this property.
    pub fn is_found(&self) -> bool {
        !self.value.is_empty()
    }
}

/// The scalar property slots of an element record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PropertyKey {
    AtomicNumber,
    Symbol,
    Name,
    Mass,
    EnergyLevels,
    Electronegativity,
    MeltingPoint,
    BoilingPoint,
    ElectronAffinity,
}

impl PropertyKey {
    pub const ALL: [PropertyKey; 9] = [
        Self::AtomicNumber,
        Self::Symbol,
        Self::Name,
        Self::Mass,
        Self::EnergyLevels,
        Self::Electronegativity,
        Self::MeltingPoint,
        Self::BoilingPoint,
        Self::ElectronAffinity,
    ];

    /// Header lines of the clicked tile, in order.
    const HEADER: [PropertyKey; 4] = [Self::AtomicNumber, Self::Symbol, Self::Name, Self::Mass];

    /// Data panel properties, in keyword match priority.
    const KEYWORDED: [PropertyKey; 5] = [
        Self::EnergyLevels,
        Self::Electronegativity,
        Self::MeltingPoint,
        Self::BoilingPoint,
        Self::ElectronAffinity,
    ];

    /// Display label.
    pub fn label(self) -> &'static str {
        match self {
            Self::AtomicNumber => "Atomic Number",
            Self::Symbol => "Symbol",
            Self::Name => "Name",
            Self::Mass => "Mass",
            Self::EnergyLevels => "Energy Levels",
            Self::Electronegativity => "Electronegativity",
            Self::MeltingPoint => "Melting Point",
            Self::BoilingPoint => "Boiling Point",
            Self::ElectronAffinity => "Electron Affinity",
        }
    }

    /// Fixed unit attached to this property's value.
    pub fn unit(self) -> &'static str {
        match self {
            Self::Mass => "u",
            Self::MeltingPoint | Self::BoilingPoint => "Celsius",
            Self::ElectronAffinity => "kJ/mol",
            _ => "",
        }
    }

    /// Phrase that precedes this property's value line in the data panel.
    pub fn keyword(self) -> Option<&'static str> {
        match self {
            Self::EnergyLevels => Some("Energy levels"),
            Self::Electronegativity => Some("Electronegativity"),
            Self::MeltingPoint => Some("Melting point"),
            Self::BoilingPoint => Some("Boiling point"),
            Self::ElectronAffinity => Some("Electron affinity"),
            _ => None,
        }
    }
}

/// Values found for each property. A key that is absent was not found.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedProperties(BTreeMap<PropertyKey, String>);

impl ParsedProperties {
    /// Parse the tile text and the data panel text.
    pub fn parse(click_text: &str, read_text: &str) -> Self {
        let mut found = BTreeMap::new();

        for (key, line) in PropertyKey::HEADER.iter().zip(click_text.trim().lines()) {
            found.insert(*key, line.to_string());
        }

        let lines: Vec<&str> = read_text.trim().lines().collect();
        for (i, line) in lines.iter().enumerate() {
            let matched = PropertyKey::KEYWORDED
                .iter()
                .find(|key| key.keyword().is_some_and(|kw| line.contains(kw)));
            if let (Some(key), Some(value)) = (matched, lines.get(i + 1)) {
                found.insert(*key, value.to_string());
            }
        }

        Self(found)
    }

    pub fn get(&self, key: PropertyKey) -> Option<&str> {
        self.0.get(&key).map(String::as_str)
    }

    /// Keys that were not found.
    pub fn missing(&self) -> Vec<PropertyKey> {
        PropertyKey::ALL
            .iter()
            .copied()
            .filter(|k| !self.0.contains_key(k))
            .collect()
    }

    fn property(&self, key: PropertyKey) -> Property {
        Property::new(key.label(), self.get(key).unwrap_or_default().to_string(), key.unit())
    }
}

/// A normalized element record. Serializes to the cache file shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementRecord {
    pub atomic_number: Property,
    pub symbol: Property,
    pub name: Property,
    pub mass: Property,
    pub energy_levels: Property,
    pub electronegativity: Property,
    pub melting_point: Property,
    pub boiling_point: Property,
    pub electron_affinity: Property,
    pub compounds: Property<Vec<String>>,
}

impl ElementRecord {
    pub fn from_parsed(parsed: &ParsedProperties, compounds: Vec<String>) -> Self {
        Self {
            atomic_number: parsed.property(PropertyKey::AtomicNumber),
            symbol: parsed.property(PropertyKey::Symbol),
            name: parsed.property(PropertyKey::Name),
            mass: parsed.property(PropertyKey::Mass),
            energy_levels: parsed.property(PropertyKey::EnergyLevels),
            electronegativity: parsed.property(PropertyKey::Electronegativity),
            melting_point: parsed.property(PropertyKey::MeltingPoint),
            boiling_point: parsed.property(PropertyKey::BoilingPoint),
            electron_affinity: parsed.property(PropertyKey::ElectronAffinity),
            compounds: Property::new("Common Compounds", compounds, ""),
        }
    }

    pub fn get(&self, key: PropertyKey) -> &Property {
        match key {
            PropertyKey::AtomicNumber => &self.atomic_number,
            PropertyKey::Symbol => &self.symbol,
            PropertyKey::Name => &self.name,
            PropertyKey::Mass => &self.mass,
            PropertyKey::EnergyLevels => &self.energy_levels,
            PropertyKey::Electronegativity => &self.electronegativity,
            PropertyKey::MeltingPoint => &self.melting_point,
            PropertyKey::BoilingPoint => &self.boiling_point,
            PropertyKey::ElectronAffinity => &self.electron_affinity,
        }
    }

    /// The symbol value, used to deduplicate history entries.
    pub fn symbol_value(&self) -> &str {
        &self.symbol.value
    }
}

impl fmt::Display for ElementRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for key in PropertyKey::ALL {
            let p = self.get(key);
            let value = if p.is_found() { p.value.as_str() } else { "-" };
            write!(f, "{:<18} {}", p.name, value)?;
            if p.is_found() && !p.unit.is_empty() {
                write!(f, " {}", p.unit)?;
            }
            writeln!(f)?;
        }
        write!(f, "{:<18}", self.compounds.name)?;
        if self.compounds.value.is_empty() {
            write!(f, " -")?;
        }
        for c in &self.compounds.value {
            write!(f, "\n  {}", c)?;
        }
        Ok(())
    }
}

/// Build a record from the tile text, the data panel text, and the compound list.
pub fn format_element(click_text: &str, read_text: &str, compounds: Vec<String>) -> ElementRecord {
    ElementRecord::from_parsed(&ParsedProperties::parse(click_text, read_text), compounds)
}

#[cfg(test)]
mod tests {
    use super::*;

    const FE_TILE: &str = "26\nFe\nIron\n55.845";
    const FE_PANEL: &str = "\
Iron
Energy levels
2, 8, 14, 2
Electronegativity
1.83
Melting point
1538
Boiling point
2861
Electron affinity
15.7
";

    #[test]
    fn header_lines() {
        let r = format_element(FE_TILE, FE_PANEL, vec![]);
        assert_eq!(r.atomic_number.value, "26");
        assert_eq!(r.symbol.value, "Fe");
        assert_eq!(r.name.value, "Iron");
        assert_eq!(r.mass.value, "55.845");
        assert_eq!(r.mass.unit, "u");
    }

    #[test]
    fn keyword_lines() {
        let r = format_element(FE_TILE, FE_PANEL, vec![]);
        assert_eq!(r.energy_levels.value, "2, 8, 14, 2");
        assert_eq!(r.electronegativity.value, "1.83");
        assert_eq!(r.melting_point.value, "1538");
        assert_eq!(r.melting_point.unit, "Celsius");
        assert_eq!(r.boiling_point.value, "2861");
        assert_eq!(r.boiling_point.unit, "Celsius");
        assert_eq!(r.electron_affinity.value, "15.7");
        assert_eq!(r.electron_affinity.unit, "kJ/mol");
    }

    #[test]
    fn short_header_leaves_slots_empty() {
        let r = format_element("26\nFe", "", vec![]);
        assert_eq!(r.atomic_number.value, "26");
        assert_eq!(r.symbol.value, "Fe");
        assert_eq!(r.name.value, "");
        assert_eq!(r.mass.value, "");
        assert_eq!(r.mass.name, "Mass");
    }

    #[test]
    fn unmatched_properties_stay_empty() {
        let r = format_element(FE_TILE, "Melting point\n1538", vec![]);
        assert_eq!(r.melting_point.value, "1538");
        assert_eq!(r.electron_affinity.value, "");
        assert_eq!(r.electron_affinity.name, "Electron Affinity");
        assert_eq!(r.boiling_point.value, "");
        assert!(!r.energy_levels.is_found());
    }

    #[test]
    fn keyword_on_last_line_has_no_value() {
        let parsed = ParsedProperties::parse(FE_TILE, "Melting point\n1538\nBoiling point");
        assert_eq!(parsed.get(PropertyKey::MeltingPoint), Some("1538"));
        assert_eq!(parsed.get(PropertyKey::BoilingPoint), None);
    }

    #[test]
    fn later_match_overwrites() {
        let parsed = ParsedProperties::parse("", "Melting point\n1\nMelting point (K)\n1811");
        assert_eq!(parsed.get(PropertyKey::MeltingPoint), Some("1811"));
    }

    #[test]
    fn first_keyword_per_line_wins() {
        // "Energy levels" is checked before "Electronegativity".
        let parsed = ParsedProperties::parse("", "Energy levels / Electronegativity\n2, 8");
        assert_eq!(parsed.get(PropertyKey::EnergyLevels), Some("2, 8"));
        assert_eq!(parsed.get(PropertyKey::Electronegativity), None);
    }

    #[test]
    fn missing_keys_reported() {
        let parsed = ParsedProperties::parse("1\nH", "Electronegativity\n2.2");
        assert_eq!(
            parsed.missing(),
            vec![
                PropertyKey::Name,
                PropertyKey::Mass,
                PropertyKey::EnergyLevels,
                PropertyKey::MeltingPoint,
                PropertyKey::BoilingPoint,
                PropertyKey::ElectronAffinity,
            ]
        );
    }

    #[test]
    fn formatting_is_deterministic() {
        let compounds = vec!["FeO: iron(II) oxide".to_string()];
        let a = format_element(FE_TILE, FE_PANEL, compounds.clone());
        let b = format_element(FE_TILE, FE_PANEL, compounds);
        assert_eq!(a, b);
        assert_eq!(
            serde_json::to_string(&a).unwrap(),
            serde_json::to_string(&b).unwrap()
        );
    }

    #[test]
    fn crlf_panel_text() {
        let r = format_element("8\r\nO\r\nOxygen\r\n15.999", "Melting point\r\n-218.79\r\n", vec![]);
        assert_eq!(r.name.value, "Oxygen");
        assert_eq!(r.melting_point.value, "-218.79");
    }

    #[test]
    fn serialized_shape() {
        let r = format_element(FE_TILE, FE_PANEL, vec!["FeO: iron(II) oxide".into()]);
        let v = serde_json::to_value(&r).unwrap();
        assert_eq!(v["symbol"]["name"], "Symbol");
        assert_eq!(v["symbol"]["value"], "Fe");
        assert_eq!(v["symbol"]["unit"], "");
        assert_eq!(v["melting_point"]["unit"], "Celsius");
        assert_eq!(v["compounds"]["name"], "Common Compounds");
        assert_eq!(v["compounds"]["value"][0], "FeO: iron(II) oxide");
    }

    #[test]
    fn display_lists_properties() {
        let r = format_element(FE_TILE, "Melting point\n1538", vec!["FeO: iron(II) oxide".into()]);
        let out = r.to_string();
        assert!(out.contains("Symbol             Fe"), "{}", out);
        assert!(out.contains("Melting Point      1538 Celsius"), "{}", out);
        assert!(out.contains("Electron Affinity  -"), "{}", out);
        assert!(out.contains("\n  FeO: iron(II) oxide"), "{}", out);
    }
}
