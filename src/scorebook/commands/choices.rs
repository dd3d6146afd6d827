use crate::commands::CmdResult;
use crate::model::{Cast, Classification, Difficulty, Genre, LiturgicalUse, Season};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Choice {
    pub code: &'static str,
    pub label: &'static str,
}

/// Every closed classification set, for building filter bars and forms.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilterChoices {
    pub cast: Vec<Choice>,
    pub season: Vec<Choice>,
    pub liturgical_use: Vec<Choice>,
    pub genre: Vec<Choice>,
    pub difficulty: Vec<Choice>,
}

impl FilterChoices {
    pub fn all() -> Self {
        Self {
            cast: choices_of::<Cast>(),
            season: choices_of::<Season>(),
            liturgical_use: choices_of::<LiturgicalUse>(),
            genre: choices_of::<Genre>(),
            difficulty: choices_of::<Difficulty>(),
        }
    }
}

fn choices_of<C: Classification>() -> Vec<Choice> {
    C::all()
        .iter()
        .map(|c| Choice {
            code: c.code(),
            label: c.label(),
        })
        .collect()
}

pub fn run() -> CmdResult {
    CmdResult::default().with_choices(FilterChoices::all())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_set_is_listed_in_declaration_order() {
        let choices = FilterChoices::all();
        assert_eq!(choices.cast.len(), 8);
        assert_eq!(choices.season.len(), 9);
        assert_eq!(choices.liturgical_use.len(), 12);
        assert_eq!(choices.genre.len(), 7);
        assert_eq!(choices.difficulty.len(), 9);
        assert_eq!(choices.genre[0].code, "REL");
        assert_eq!(choices.difficulty[8].label, "9");
    }

    #[test]
    fn serializes_code_and_label() {
        let json = serde_json::to_value(FilterChoices::all()).unwrap();
        assert_eq!(json["cast"][0]["code"], "SATB");
        assert_eq!(json["genre"][6]["code"], "FOL");
    }
}
