//! Location input normalization
//!
//! Turns free-form user input ("Berlin", "10115", "Graz, AT") into the query
//! string sent to the weather service and the key used by the location cache.
//! Postal codes and country aliases are resolved through static tables; no
//! other geocoding takes place.

use thiserror::Error;

/// Country assumed for a bare postal code
const DEFAULT_COUNTRY: &str = "Germany";

/// Accepted postal code lengths for countries missing from the table
const UNKNOWN_POSTAL_CODE_LEN: std::ops::RangeInclusive<usize> = 3..=10;

/// Errors that can occur when normalizing a location
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LocationError {
    /// Nothing but whitespace (or a lone country) was entered
    #[error("Location must not be empty")]
    Empty,

    /// Digits that cannot be a postal code for the given country
    #[error("'{code}' is not a valid postal code for {country}")]
    InvalidPostalCode { code: String, country: String },
}

/// A country the normalizer knows by name and alias
#[derive(Debug)]
struct CountryInfo {
    /// Canonical English name sent to the weather service
    name: &'static str,
    /// Lowercase spellings accepted from the user
    aliases: &'static [&'static str],
    /// Number of digits in a postal code
    postal_code_len: usize,
}

static COUNTRIES: [CountryInfo; 3] = [
    CountryInfo {
        name: "Germany",
        aliases: &["germany", "deutschland", "de", "deu", "ger"],
        postal_code_len: 5,
    },
    CountryInfo {
        name: "Austria",
        aliases: &["austria", "österreich", "oesterreich", "at", "aut"],
        postal_code_len: 4,
    },
    CountryInfo {
        name: "Switzerland",
        aliases: &["switzerland", "schweiz", "suisse", "ch", "che"],
        postal_code_len: 4,
    },
];

/// A postal code with its display city
#[derive(Debug)]
struct PostalCode {
    code: &'static str,
    country: &'static str,
    city: &'static str,
}

static POSTAL_CODES: [PostalCode; 27] = [
    PostalCode { code: "10115", country: "Germany", city: "Berlin" },
    PostalCode { code: "20095", country: "Germany", city: "Hamburg" },
    PostalCode { code: "80331", country: "Germany", city: "München" },
    PostalCode { code: "50667", country: "Germany", city: "Köln" },
    PostalCode { code: "60311", country: "Germany", city: "Frankfurt am Main" },
    PostalCode { code: "70173", country: "Germany", city: "Stuttgart" },
    PostalCode { code: "40213", country: "Germany", city: "Düsseldorf" },
    PostalCode { code: "04109", country: "Germany", city: "Leipzig" },
    PostalCode { code: "01067", country: "Germany", city: "Dresden" },
    PostalCode { code: "30159", country: "Germany", city: "Hannover" },
    PostalCode { code: "90402", country: "Germany", city: "Nürnberg" },
    PostalCode { code: "28195", country: "Germany", city: "Bremen" },
    PostalCode { code: "24103", country: "Germany", city: "Kiel" },
    PostalCode { code: "18055", country: "Germany", city: "Rostock" },
    PostalCode { code: "39104", country: "Germany", city: "Magdeburg" },
    PostalCode { code: "99084", country: "Germany", city: "Erfurt" },
    PostalCode { code: "14467", country: "Germany", city: "Potsdam" },
    PostalCode { code: "19053", country: "Germany", city: "Schwerin" },
    PostalCode { code: "55116", country: "Germany", city: "Mainz" },
    PostalCode { code: "65183", country: "Germany", city: "Wiesbaden" },
    PostalCode { code: "66111", country: "Germany", city: "Saarbrücken" },
    PostalCode { code: "1010", country: "Austria", city: "Wien" },
    PostalCode { code: "8010", country: "Austria", city: "Graz" },
    PostalCode { code: "4020", country: "Austria", city: "Linz" },
    PostalCode { code: "8001", country: "Switzerland", city: "Zürich" },
    PostalCode { code: "3011", country: "Switzerland", city: "Bern" },
    PostalCode { code: "4051", country: "Switzerland", city: "Basel" },
];

/// A normalized location ready to be queried and cached
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    /// The text as entered
    pub input: String,
    /// Query sent to the weather service
    pub query: String,
    /// Cache key; lowercase form of the query
    pub key: String,
    /// Human-readable label for the dashboard header
    pub label: String,
}

/// Looks up a country by any of its aliases (case-insensitive)
fn find_country(s: &str) -> Option<&'static CountryInfo> {
    let needle = s.trim().to_lowercase();
    COUNTRIES
        .iter()
        .find(|country| country.aliases.contains(&needle.as_str()))
}

/// Returns the city registered for a postal code in the given country
pub fn city_for_postal_code(code: &str, country: &str) -> Option<&'static str> {
    POSTAL_CODES
        .iter()
        .find(|entry| entry.code == code && entry.country.eq_ignore_ascii_case(country))
        .map(|entry| entry.city)
}

/// Capitalizes the first letter of every word ("new zealand" -> "New Zealand")
fn title_case(s: &str) -> String {
    s.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Normalizes user input into a [`Location`].
///
/// # Rules
/// - Whitespace is trimmed and collapsed.
/// - Text after the first comma is a country; known aliases ("de",
///   "Österreich", ...) map to a canonical name, unknown ones are title-cased.
/// - An all-digit place is a postal code. Without a country it is German.
///   Its length must match the country's postal code length.
/// - The query is `place` or `place,country`; the key is its lowercase form.
///
/// # Example
///
/// ```
/// use agrardash::data::location::normalize_location;
///
/// let location = normalize_location("10115").unwrap();
/// assert_eq!(location.query, "10115,Germany");
/// assert_eq!(location.label, "Berlin (10115)");
/// ```
pub fn normalize_location(input: &str) -> Result<Location, LocationError> {
    let collapsed = input.split_whitespace().collect::<Vec<_>>().join(" ");

    let (place, country) = match collapsed.split_once(',') {
        Some((place, country)) => {
            let country = country.trim();
            (place.trim(), (!country.is_empty()).then_some(country))
        }
        None => (collapsed.as_str(), None),
    };

    if place.is_empty() {
        return Err(LocationError::Empty);
    }

    let known_country = country.and_then(find_country);
    let country_name = match (known_country, country) {
        (Some(info), _) => Some(info.name.to_string()),
        (None, Some(raw)) => Some(title_case(raw)),
        (None, None) => None,
    };

    let (query, label) = if place.chars().all(|c| c.is_ascii_digit()) {
        let (country_name, expected_len) = match (known_country, country_name) {
            (Some(info), _) => (info.name.to_string(), Some(info.postal_code_len)),
            (None, Some(name)) => (name, None),
            (None, None) => (DEFAULT_COUNTRY.to_string(), find_country(DEFAULT_COUNTRY).map(|c| c.postal_code_len)),
        };

        let valid = match expected_len {
            Some(len) => place.len() == len,
            None => UNKNOWN_POSTAL_CODE_LEN.contains(&place.len()),
        };
        if !valid {
            return Err(LocationError::InvalidPostalCode {
                code: place.to_string(),
                country: country_name,
            });
        }

        let label = match city_for_postal_code(place, &country_name) {
            Some(city) => format!("{} ({})", city, place),
            None => format!("{}, {}", place, country_name),
        };
        (format!("{},{}", place, country_name), label)
    } else {
        match country_name {
            Some(country) => (
                format!("{},{}", place, country),
                format!("{}, {}", place, country),
            ),
            None => (place.to_string(), place.to_string()),
        }
    };

    Ok(Location {
        input: input.to_string(),
        key: query.to_lowercase(),
        query,
        label,
    })
}
