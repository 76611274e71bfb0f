//! City and date extraction from free text.

use regex::Regex;

/// Cities the bot knows about, in match priority order
pub const KNOWN_CITIES: [&str; 3] = ["Paris", "Tunis", "Moscow"];

const DATE_PATTERN: &str = r"(today|tomorrow|\d{4}-\d{2}-\d{2})";

/// Entities found in a query
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Entities {
    /// Canonical city name from [`KNOWN_CITIES`]
    pub city: Option<String>,
    /// Date token exactly as it appeared in the query
    pub date: Option<String>,
}

/// Pulls a city and a date token out of user queries.
///
/// Build once and share; the date regex is compiled in [`EntityExtractor::new`].
#[derive(Debug, Clone)]
pub struct EntityExtractor {
    cities: Vec<(&'static str, String)>,
    date_pattern: Regex,
}

impl EntityExtractor {
    pub fn new() -> Result<Self, regex::Error> {
        Ok(Self {
            cities: KNOWN_CITIES
                .iter()
                .map(|city| (*city, city.to_lowercase()))
                .collect(),
            date_pattern: Regex::new(DATE_PATTERN)?,
        })
    }

    pub fn extract(&self, text: &str) -> Entities {
        Entities {
            city: self.find_city(text).map(str::to_string),
            date: self.find_date(text).map(str::to_string),
        }
    }

    /// First known city contained in the text, ignoring case.
    /// Cities are tried in list order, not by position in the text.
    pub fn find_city(&self, text: &str) -> Option<&'static str> {
        let lowered = text.to_lowercase();
        self.cities
            .iter()
            .find(|(_, needle)| lowered.contains(needle.as_str()))
            .map(|(city, _)| *city)
    }

    /// First `today`, `tomorrow` or `YYYY-MM-DD` token. Case-sensitive, not validated.
    pub fn find_date<'t>(&self, text: &'t str) -> Option<&'t str> {
        self.date_pattern.find(text).map(|m| m.as_str())
    }
}
