use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::convert::Infallible;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// The category of an expense.
///
/// The set of categories that the summary knows about is closed, but text outside of that set is
/// kept as-is in `Unlisted` when it arrives by import. Matching is case-sensitive, so `food` is
/// unlisted.
#[derive(Default, Debug, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum Category {
    #[default]
    Food,
    Transport,
    Shopping,
    Bills,
    Entertainment,
    Other,
    Unlisted(String),
}

impl Category {
    /// The fixed enumeration, in display order.
    pub const ALL: [Category; 6] = [
        Category::Food,
        Category::Transport,
        Category::Shopping,
        Category::Bills,
        Category::Entertainment,
        Category::Other,
    ];

    pub fn as_str(&self) -> &str {
        match self {
            Category::Food => FOOD_STR,
            Category::Transport => TRANSPORT_STR,
            Category::Shopping => SHOPPING_STR,
            Category::Bills => BILLS_STR,
            Category::Entertainment => ENTERTAINMENT_STR,
            Category::Other => OTHER_STR,
            Category::Unlisted(s) => s,
        }
    }

    /// Returns true if this is one of the fixed categories.
    pub fn is_listed(&self) -> bool {
        !matches!(self, Category::Unlisted(_))
    }
}

impl From<&str> for Category {
    fn from(value: &str) -> Self {
        match value {
            FOOD_STR => Category::Food,
            TRANSPORT_STR => Category::Transport,
            SHOPPING_STR => Category::Shopping,
            BILLS_STR => Category::Bills,
            ENTERTAINMENT_STR => Category::Entertainment,
            OTHER_STR => Category::Other,
            unlisted => Category::Unlisted(unlisted.to_string()),
        }
    }
}

impl From<String> for Category {
    fn from(value: String) -> Self {
        match Category::from(value.as_str()) {
            Category::Unlisted(_) => Category::Unlisted(value),
            listed => listed,
        }
    }
}

impl FromStr for Category {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Category::from(s))
    }
}

impl Display for Category {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Category {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Category {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(Category::from(String::deserialize(deserializer)?))
    }
}

const FOOD_STR: &str = "Food";
const TRANSPORT_STR: &str = "Transport";
const SHOPPING_STR: &str = "Shopping";
const BILLS_STR: &str = "Bills";
const ENTERTAINMENT_STR: &str = "Entertainment";
const OTHER_STR: &str = "Other";
