use serde::{Deserialize, Serialize};

// Variant order matters for the attribute enums: `index()` is the row/column
// of the compatibility tables in `core::compatibility`, and `PreferNotToSay`
// stays last so it never indexes a table.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "gender", rename_all = "snake_case")]
pub enum Gender {
    Male,
    Female,
    NonBinary,
    Transgender,
    Other,
    PreferNotToSay,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "sexuality", rename_all = "snake_case")]
pub enum Sexuality {
    Straight,
    Gay,
    Lesbian,
    Bisexual,
    Pansexual,
    Asexual,
    Demisexual,
    Queer,
    Questioning,
    PreferNotToSay,
}

/// Type of relationship a user is looking for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "relationship_type", rename_all = "snake_case")]
pub enum RelationshipType {
    CasualDating,
    SeriousRelationship,
    Marriage,
    Friendship,
    SomethingCasual,
    NotSure,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "drinking_habit", rename_all = "snake_case")]
pub enum DrinkingHabit {
    Never,
    Occasionally,
    SocialDrinker,
    Regularly,
    Heavily,
    PreferNotToSay,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "smoking_habit", rename_all = "snake_case")]
pub enum SmokingHabit {
    Never,
    Occasionally,
    Regularly,
    Quit,
    PreferNotToSay,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "body_type", rename_all = "snake_case")]
pub enum BodyType {
    Slim,
    Athletic,
    Average,
    Curvy,
    Muscular,
    Large,
    PreferNotToSay,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "education_level", rename_all = "snake_case")]
pub enum EducationLevel {
    HighSchool,
    SomeCollege,
    Bachelors,
    Masters,
    Doctorate,
    Professional,
    PreferNotToSay,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "religion", rename_all = "snake_case")]
pub enum Religion {
    Christianity,
    Islam,
    Hinduism,
    Buddhism,
    Judaism,
    Sikhism,
    Atheist,
    Agnostic,
    Spiritual,
    Other,
    PreferNotToSay,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "children_status", rename_all = "snake_case")]
pub enum ChildrenStatus {
    NoChildren,
    HasChildren,
    WantsChildren,
    DoesntWantChildren,
    NotSure,
    PreferNotToSay,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "personality_type", rename_all = "snake_case")]
pub enum PersonalityType {
    Introvert,
    Extrovert,
    Ambivert,
}

impl DrinkingHabit {
    /// Table index, `None` when the user chose not to say
    pub fn index(self) -> Option<usize> {
        (self != Self::PreferNotToSay).then_some(self as usize)
    }
}

impl SmokingHabit {
    pub fn index(self) -> Option<usize> {
        (self != Self::PreferNotToSay).then_some(self as usize)
    }
}

impl ChildrenStatus {
    pub fn index(self) -> Option<usize> {
        (self != Self::PreferNotToSay).then_some(self as usize)
    }
}

impl Religion {
    pub fn index(self) -> Option<usize> {
        (self != Self::PreferNotToSay).then_some(self as usize)
    }
}

impl EducationLevel {
    pub fn index(self) -> Option<usize> {
        (self != Self::PreferNotToSay).then_some(self as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_names_are_snake_case() {
        assert_eq!(
            serde_json::to_string(&DrinkingHabit::SocialDrinker).unwrap(),
            "\"social_drinker\""
        );
        let status: ChildrenStatus = serde_json::from_str("\"doesnt_want_children\"").unwrap();
        assert_eq!(status, ChildrenStatus::DoesntWantChildren);
    }

    #[test]
    fn test_prefer_not_to_say_has_no_index() {
        assert_eq!(Religion::PreferNotToSay.index(), None);
        assert_eq!(Religion::Other.index(), Some(9));
        assert_eq!(SmokingHabit::Quit.index(), Some(3));
    }
}
