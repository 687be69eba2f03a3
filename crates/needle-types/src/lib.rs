//! Shared vocabulary for the needle count system.
//!
//! These types are deliberately small: they carry the identifiers and the fixed body-region
//! set that every other crate agrees on, and nothing about storage or presentation.

use std::fmt;
use std::str::FromStr;

/// Errors that can occur when creating validated domain types.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum TypesError {
    /// The input text was empty or contained only whitespace
    #[error("Text cannot be empty")]
    Empty,
    /// The bed identifier was not a positive integer
    #[error("Invalid bed identifier: '{0}'")]
    InvalidBedId(String),
    /// The body-region tag is not one of the fixed regions
    #[error("Unknown body region: '{0}'")]
    UnknownRegion(String),
}

/// A patient identifier as decoded from the patient's QR code.
///
/// The content is opaque. The only guarantee is that it contains at least one
/// non-whitespace character; surrounding whitespace is trimmed during construction.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PatientId(String);

impl PatientId {
    /// Creates a new `PatientId` from the given input.
    ///
    /// # Errors
    ///
    /// Returns `TypesError::Empty` if the trimmed input is empty.
    pub fn new(input: impl AsRef<str>) -> Result<Self, TypesError> {
        let trimmed = input.as_ref().trim();
        if trimmed.is_empty() {
            return Err(TypesError::Empty);
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the inner string as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PatientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.0)
    }
}

impl AsRef<str> for PatientId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl serde::Serialize for PatientId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> serde::Deserialize<'de> for PatientId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        PatientId::new(&s).map_err(serde::de::Error::custom)
    }
}

/// Identifier of a bed slot.
///
/// Beds are numbered from 1. On the wire a bed identifier is always a string (`"5"`), both as
/// a map key and as a record field, so persisted documents stay readable by hand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BedId(u16);

impl BedId {
    /// Bed number 1, present in every configuration.
    pub const FIRST: BedId = BedId(1);

    /// Creates a bed identifier from its number.
    ///
    /// # Errors
    ///
    /// Returns `TypesError::InvalidBedId` for bed number 0.
    pub fn new(number: u16) -> Result<Self, TypesError> {
        if number == 0 {
            return Err(TypesError::InvalidBedId(number.to_string()));
        }
        Ok(Self(number))
    }

    /// Returns the bed number.
    pub fn number(self) -> u16 {
        self.0
    }
}

impl fmt::Display for BedId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl FromStr for BedId {
    type Err = TypesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let number = s
            .trim()
            .parse::<u16>()
            .map_err(|_| TypesError::InvalidBedId(s.to_owned()))?;
        BedId::new(number).map_err(|_| TypesError::InvalidBedId(s.to_owned()))
    }
}

impl serde::Serialize for BedId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> serde::Deserialize<'de> for BedId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        struct BedIdVisitor;

        impl serde::de::Visitor<'_> for BedIdVisitor {
            type Value = BedId;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a positive bed number or its string form")
            }

            fn visit_str<E>(self, v: &str) -> Result<BedId, E>
            where
                E: serde::de::Error,
            {
                v.parse().map_err(E::custom)
            }

            fn visit_u64<E>(self, v: u64) -> Result<BedId, E>
            where
                E: serde::de::Error,
            {
                let number = u16::try_from(v)
                    .map_err(|_| E::custom(TypesError::InvalidBedId(v.to_string())))?;
                BedId::new(number).map_err(E::custom)
            }
        }

        deserializer.deserialize_any(BedIdVisitor)
    }
}

/// The fixed set of body regions a needle can be counted against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum BodyRegion {
    Head,
    Torso,
    Back,
    LeftUpperLimb,
    LeftLowerLimb,
    RightUpperLimb,
    RightLowerLimb,
}

impl BodyRegion {
    /// Every region, in display order.
    pub const ALL: [BodyRegion; 7] = [
        BodyRegion::Head,
        BodyRegion::Torso,
        BodyRegion::Back,
        BodyRegion::LeftUpperLimb,
        BodyRegion::LeftLowerLimb,
        BodyRegion::RightUpperLimb,
        BodyRegion::RightLowerLimb,
    ];

    /// The tag used in persisted `counts` objects.
    pub fn as_str(self) -> &'static str {
        match self {
            BodyRegion::Head => "head",
            BodyRegion::Torso => "torso",
            BodyRegion::Back => "back",
            BodyRegion::LeftUpperLimb => "leftUpperLimb",
            BodyRegion::LeftLowerLimb => "leftLowerLimb",
            BodyRegion::RightUpperLimb => "rightUpperLimb",
            BodyRegion::RightLowerLimb => "rightLowerLimb",
        }
    }

    /// Human readable label for views.
    pub fn label(self) -> &'static str {
        match self {
            BodyRegion::Head => "Head",
            BodyRegion::Torso => "Torso",
            BodyRegion::Back => "Back",
            BodyRegion::LeftUpperLimb => "Left upper limb",
            BodyRegion::LeftLowerLimb => "Left lower limb",
            BodyRegion::RightUpperLimb => "Right upper limb",
            BodyRegion::RightLowerLimb => "Right lower limb",
        }
    }
}

impl fmt::Display for BodyRegion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BodyRegion {
    type Err = TypesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BodyRegion::ALL
            .into_iter()
            .find(|region| region.as_str() == s)
            .ok_or_else(|| TypesError::UnknownRegion(s.to_owned()))
    }
}

/// Needle count per body region.
///
/// Regions missing from a persisted document read as zero and unknown tags are ignored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NeedleCounts {
    pub head: u32,
    pub torso: u32,
    pub back: u32,
    pub left_upper_limb: u32,
    pub left_lower_limb: u32,
    pub right_upper_limb: u32,
    pub right_lower_limb: u32,
}

impl NeedleCounts {
    /// Returns the count recorded for `region`.
    pub fn get(&self, region: BodyRegion) -> u32 {
        match region {
            BodyRegion::Head => self.head,
            BodyRegion::Torso => self.torso,
            BodyRegion::Back => self.back,
            BodyRegion::LeftUpperLimb => self.left_upper_limb,
            BodyRegion::LeftLowerLimb => self.left_lower_limb,
            BodyRegion::RightUpperLimb => self.right_upper_limb,
            BodyRegion::RightLowerLimb => self.right_lower_limb,
        }
    }

    /// Sets the count recorded for `region`.
    pub fn set(&mut self, region: BodyRegion, count: u32) {
        let slot = match region {
            BodyRegion::Head => &mut self.head,
            BodyRegion::Torso => &mut self.torso,
            BodyRegion::Back => &mut self.back,
            BodyRegion::LeftUpperLimb => &mut self.left_upper_limb,
            BodyRegion::LeftLowerLimb => &mut self.left_lower_limb,
            BodyRegion::RightUpperLimb => &mut self.right_upper_limb,
            BodyRegion::RightLowerLimb => &mut self.right_lower_limb,
        };
        *slot = count;
    }

    /// Iterates `(region, count)` pairs in display order.
    pub fn iter(&self) -> impl Iterator<Item = (BodyRegion, u32)> + '_ {
        BodyRegion::ALL
            .into_iter()
            .map(move |region| (region, self.get(region)))
    }

    /// Sum over all regions.
    pub fn sum(&self) -> u32 {
        self.iter().map(|(_, count)| count).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_patient_id_trims_and_rejects_blank() {
        assert_eq!(PatientId::new("  P001 \n").unwrap().as_str(), "P001");
        assert_eq!(PatientId::new("   "), Err(TypesError::Empty));
    }

    #[test]
    fn test_bed_id_parse() {
        assert_eq!("5".parse::<BedId>().unwrap().number(), 5);
        assert!("0".parse::<BedId>().is_err());
        assert!("".parse::<BedId>().is_err());
        assert!("abc".parse::<BedId>().is_err());
        assert!("-1".parse::<BedId>().is_err());
    }

    #[test]
    fn test_bed_id_serialises_as_string() {
        let bed = BedId::new(12).unwrap();
        assert_eq!(serde_json::to_string(&bed).unwrap(), "\"12\"");

        let from_string: BedId = serde_json::from_str("\"12\"").unwrap();
        let from_number: BedId = serde_json::from_str("12").unwrap();
        assert_eq!(from_string, bed);
        assert_eq!(from_number, bed);
    }

    #[test]
    fn test_bed_id_as_map_key() {
        let mut map = std::collections::BTreeMap::new();
        map.insert(BedId::new(2).unwrap(), true);
        map.insert(BedId::new(10).unwrap(), false);

        let json = serde_json::to_string(&map).unwrap();
        assert_eq!(json, r#"{"2":true,"10":false}"#);

        let back: std::collections::BTreeMap<BedId, bool> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, map);
    }

    #[test]
    fn test_body_region_tags_round_trip_through_from_str() {
        for region in BodyRegion::ALL {
            assert_eq!(region.as_str().parse::<BodyRegion>().unwrap(), region);
        }
        assert_eq!(
            "tail".parse::<BodyRegion>(),
            Err(TypesError::UnknownRegion("tail".into()))
        );
    }

    #[test]
    fn test_counts_get_set_and_sum() {
        let mut counts = NeedleCounts::default();
        counts.set(BodyRegion::Head, 3);
        counts.set(BodyRegion::RightLowerLimb, 30);

        assert_eq!(counts.get(BodyRegion::Head), 3);
        assert_eq!(counts.get(BodyRegion::Torso), 0);
        assert_eq!(counts.sum(), 33);
    }

    #[test]
    fn test_counts_json_shape() {
        let mut counts = NeedleCounts::default();
        counts.set(BodyRegion::LeftUpperLimb, 4);

        let value = serde_json::to_value(counts).unwrap();
        assert_eq!(value["leftUpperLimb"], 4);
        assert_eq!(value.as_object().unwrap().len(), 7);
    }

    #[test]
    fn test_counts_tolerates_missing_and_unknown_keys() {
        let counts: NeedleCounts = serde_json::from_str(r#"{"head":2,"tail":9}"#).unwrap();
        assert_eq!(counts.head, 2);
        assert_eq!(counts.sum(), 2);
    }
}
