//! # Domain Model
//!
//! This module defines the catalog record, [`Sheet`], the attachment reference
//! [`BlobRef`], and the closed classification sets a sheet can be filed under.
//!
//! ## Classification Codes
//!
//! Every classification field (cast, season, liturgical use, genre, difficulty)
//! is a closed enumeration. Each variant has a stable short **code**, which is
//! what gets stored and what query strings and forms carry, and a human
//! **label** for display.
//!
//! Codes are validated at the boundary: [`Classification::from_code`] returns
//! `None` for anything outside the set, and the `FromStr` / `Deserialize`
//! implementations turn that into an error. An unknown code is never stored.
//!
//! | Field | Codes |
//! |-------|-------|
//! | `cast` | `SATB SSA TTB CHI UNI SOL VOR INS` |
//! | `season` | `ADV CHR LEN HWK EAS PEN ORD MAR ANY` |
//! | `liturgical_use` | `ENT KYR GLO PSA ACC OFF SAN AGN COM REC MAS NON` |
//! | `genre` | `REL CHO JAZ POP CLA SEC FOL` |
//! | `difficulty` | `1` … `9` |
//!
//! ## Slugs
//!
//! `Sheet::slug` is `None` only between construction and the first successful
//! save. See [`crate::slug`] for how it is assigned.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// A closed set of classification codes.
pub trait Classification: Copy + Eq + Sized + 'static {
    /// Name of the sheet field (and query parameter) this set classifies.
    const FIELD: &'static str;

    fn all() -> &'static [Self];

    fn code(self) -> &'static str;

    fn label(self) -> &'static str;

    fn from_code(code: &str) -> Option<Self> {
        Self::all().iter().copied().find(|c| c.code() == code)
    }
}

/// Returned when a string is not a code of the expected set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownCode {
    pub field: &'static str,
    pub code: String,
}

impl fmt::Display for UnknownCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "'{}' is not a valid {} code", self.code, self.field)
    }
}

impl std::error::Error for UnknownCode {}

macro_rules! classification {
    (
        $(#[$meta:meta])*
        $name:ident, $field:literal {
            $($variant:ident => ($code:literal, $label:literal)),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $($variant),+
        }

        impl Classification for $name {
            const FIELD: &'static str = $field;

            fn all() -> &'static [Self] {
                &[$(Self::$variant),+]
            }

            fn code(self) -> &'static str {
                match self {
                    $(Self::$variant => $code),+
                }
            }

            fn label(self) -> &'static str {
                match self {
                    $(Self::$variant => $label),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.code())
            }
        }

        impl FromStr for $name {
            type Err = UnknownCode;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::from_code(s).ok_or_else(|| UnknownCode {
                    field: $field,
                    code: s.to_string(),
                })
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(self.code())
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let code = String::deserialize(deserializer)?;
                code.parse().map_err(serde::de::Error::custom)
            }
        }
    };
}

classification! {
    /// Performing forces the piece is written for.
    Cast, "cast" {
        MixedChoir => ("SATB", "Smíšený sbor"),
        FemaleChoir => ("SSA", "Ženský sbor"),
        MaleChoir => ("TTB", "Mužský sbor"),
        ChildrensChoir => ("CHI", "Dětský sbor"),
        Unison => ("UNI", "Jednohlas"),
        SoloVoice => ("SOL", "Sólový zpěv"),
        VoiceAndOrgan => ("VOR", "Zpěv a varhany"),
        Instrumental => ("INS", "Instrumentální"),
    }
}

classification! {
    /// Liturgical season the piece belongs to.
    Season, "season" {
        Advent => ("ADV", "Advent"),
        Christmas => ("CHR", "Vánoce"),
        Lent => ("LEN", "Postní doba"),
        HolyWeek => ("HWK", "Svatý týden"),
        Easter => ("EAS", "Velikonoce"),
        Pentecost => ("PEN", "Letnice"),
        OrdinaryTime => ("ORD", "Liturgické mezidobí"),
        Marian => ("MAR", "Mariánské"),
        AnySeason => ("ANY", "Celoroční"),
    }
}

classification! {
    /// Where in the liturgy the piece is sung.
    LiturgicalUse, "liturgical_use" {
        Entrance => ("ENT", "Vstup"),
        Kyrie => ("KYR", "Kyrie"),
        Gloria => ("GLO", "Gloria"),
        Psalm => ("PSA", "Žalm"),
        Acclamation => ("ACC", "Aklamace"),
        Offertory => ("OFF", "Obětování"),
        Sanctus => ("SAN", "Sanctus"),
        AgnusDei => ("AGN", "Agnus Dei"),
        Communion => ("COM", "Přijímání"),
        Recessional => ("REC", "Závěr"),
        MassOrdinary => ("MAS", "Ordinárium"),
        NonLiturgical => ("NON", "Mimo liturgii"),
    }
}

classification! {
    Genre, "genre" {
        Religious => ("REL", "Duchovní"),
        Choral => ("CHO", "Sborová"),
        Jazz => ("JAZ", "Jazzová"),
        Popular => ("POP", "Populární"),
        Classical => ("CLA", "Klasická"),
        Secular => ("SEC", "Světská"),
        Folklore => ("FOL", "Folklórní"),
    }
}

classification! {
    /// Difficulty level, 1 (easiest) to 9.
    Difficulty, "difficulty" {
        One => ("1", "1"),
        Two => ("2", "2"),
        Three => ("3", "3"),
        Four => ("4", "4"),
        Five => ("5", "5"),
        Six => ("6", "6"),
        Seven => ("7", "7"),
        Eight => ("8", "8"),
        Nine => ("9", "9"),
    }
}

/// Reference to a file held by the blob store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlobRef {
    /// Store-relative location, e.g. `sheets/<uuid>/score.pdf`
    pub key: String,
    /// File name as uploaded
    pub file_name: String,
    pub size: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sheet {
    pub id: Uuid,
    pub title: String,
    pub composer: String,
    #[serde(default)]
    pub arranger: Option<String>,
    #[serde(default)]
    pub cast: Option<Cast>,
    #[serde(default)]
    pub season: Option<Season>,
    #[serde(default)]
    pub liturgical_use: Option<LiturgicalUse>,
    #[serde(default)]
    pub genre: Option<Genre>,
    #[serde(default)]
    pub difficulty: Option<Difficulty>,
    #[serde(default)]
    pub publication_year: Option<i32>,
    #[serde(default)]
    pub publisher: Option<String>,
    #[serde(default)]
    pub isbn: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    pub created_by: String,
    pub modified_by: String,
    pub sheet_file: BlobRef,
    #[serde(default)]
    pub preview_image: Option<BlobRef>,
    #[serde(default)]
    pub public: bool,
    #[serde(default)]
    pub slug: Option<String>,
    /// Ids of the tags attached to this sheet (see [`crate::tags::Tag`])
    #[serde(default)]
    pub tags: Vec<Uuid>,
    pub date_created: DateTime<Utc>,
    pub date_modified: DateTime<Utc>,
}

impl Sheet {
    /// Creates a private, unslugged sheet with only the required fields set.
    pub fn new(
        title: impl Into<String>,
        composer: impl Into<String>,
        created_by: impl Into<String>,
        sheet_file: BlobRef,
    ) -> Self {
        let now = Utc::now();
        let created_by = created_by.into();
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            composer: composer.into(),
            arranger: None,
            cast: None,
            season: None,
            liturgical_use: None,
            genre: None,
            difficulty: None,
            publication_year: None,
            publisher: None,
            isbn: None,
            description: None,
            modified_by: created_by.clone(),
            created_by,
            sheet_file,
            preview_image: None,
            public: false,
            slug: None,
            tags: Vec::new(),
            date_created: now,
            date_modified: now,
        }
    }

    /// Records an edit by `username`.
    pub fn touch(&mut self, username: &str) {
        self.modified_by = username.to_string();
        self.date_modified = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blob() -> BlobRef {
        BlobRef {
            key: "sheets/x/score.pdf".into(),
            file_name: "score.pdf".into(),
            size: 3,
        }
    }

    #[test]
    fn codes_parse_back_to_variants() {
        assert_eq!("SATB".parse::<Cast>().unwrap(), Cast::MixedChoir);
        assert_eq!("ADV".parse::<Season>().unwrap(), Season::Advent);
        assert_eq!("COM".parse::<LiturgicalUse>().unwrap(), LiturgicalUse::Communion);
        assert_eq!("FOL".parse::<Genre>().unwrap(), Genre::Folklore);
        assert_eq!("7".parse::<Difficulty>().unwrap(), Difficulty::Seven);
    }

    #[test]
    fn unknown_code_is_rejected() {
        let err = "XYZ".parse::<Genre>().unwrap_err();
        assert_eq!(err.field, "genre");
        assert_eq!(err.code, "XYZ");
        assert!("satb".parse::<Cast>().is_err()); // Codes are case-sensitive
        assert!("10".parse::<Difficulty>().is_err());
    }

    #[test]
    fn codes_are_unique_within_each_set() {
        fn check<C: Classification>() {
            let codes: Vec<_> = C::all().iter().map(|c| c.code()).collect();
            let mut deduped = codes.clone();
            deduped.sort();
            deduped.dedup();
            assert_eq!(codes.len(), deduped.len(), "duplicate code in {}", C::FIELD);
        }
        check::<Cast>();
        check::<Season>();
        check::<LiturgicalUse>();
        check::<Genre>();
        check::<Difficulty>();
    }

    #[test]
    fn classification_serializes_as_code() {
        let json = serde_json::to_string(&Genre::Religious).unwrap();
        assert_eq!(json, "\"REL\"");
        assert!(serde_json::from_str::<Genre>("\"NOPE\"").is_err());
    }

    #[test]
    fn new_sheet_is_private_and_unslugged() {
        let sheet = Sheet::new("Ave Maria", "Arcadelt", "jana", blob());
        assert!(!sheet.public);
        assert!(sheet.slug.is_none());
        assert_eq!(sheet.created_by, "jana");
        assert_eq!(sheet.modified_by, "jana");
        assert!(sheet.tags.is_empty());
    }

    #[test]
    fn touch_updates_modifier() {
        let mut sheet = Sheet::new("Ave Maria", "Arcadelt", "jana", blob());
        let before = sheet.date_modified;
        sheet.touch("petr");
        assert_eq!(sheet.modified_by, "petr");
        assert_eq!(sheet.created_by, "jana");
        assert!(sheet.date_modified >= before);
    }

    #[test]
    fn legacy_record_without_optional_fields_deserializes() {
        let json = r#"{
            "id": "6f1c2f1e-3b0a-4c55-9a57-0d6c1f0b9a11",
            "title": "Gaudete",
            "composer": "Anon.",
            "created_by": "jana",
            "modified_by": "jana",
            "sheet_file": {"key": "sheets/a/g.pdf", "file_name": "g.pdf", "size": 10},
            "date_created": "2024-01-01T00:00:00Z",
            "date_modified": "2024-01-01T00:00:00Z"
        }"#;
        let sheet: Sheet = serde_json::from_str(json).unwrap();
        assert!(sheet.slug.is_none());
        assert!(!sheet.public);
        assert!(sheet.genre.is_none());
    }
}
