//! Static crop threshold table
//!
//! This module contains the optimal harvest conditions for every crop the
//! dashboard knows about. The table is the contract between agronomy and the
//! harvest evaluator: each profile names the warmest, coldest, most humid and
//! wettest conditions still considered optimal for bringing the crop in.

use std::collections::BTreeSet;

use serde::Serialize;

/// Sentinel accepted by the crop selector meaning "every crop"
pub const ALL_CROPS: &str = "all";

/// Optimal harvest conditions for one crop
///
/// Uses `&'static str` for string fields to allow static initialization of
/// the CROPS array. The struct is only `Serialize` because static string
/// references cannot be deserialized; look profiles up by id with
/// `get_crop_by_id`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CropProfile {
    /// Unique identifier, lowercase
    pub id: &'static str,
    /// Name shown on the dashboard
    pub display_name: &'static str,
    /// Single glyph shown next to the name
    pub icon: &'static str,
    /// Short agronomic note
    pub comment: &'static str,
    /// Highest relative humidity (%) still optimal for harvest
    pub optimal_humidity_max: f64,
    /// Lowest optimal temperature in Celsius
    pub optimal_temp_min: f64,
    /// Highest optimal temperature in Celsius
    pub optimal_temp_max: f64,
    /// Highest recent precipitation (mm) still optimal for harvest
    pub optimal_precip_max: f64,
}

/// Static array of all supported crops
pub static CROPS: [CropProfile; 8] = [
    CropProfile {
        id: "weizen",
        display_name: "Weizen",
        icon: "\u{1F33E}", // 🌾
        comment: "Thresh once grain moisture is below 14%; dry, warm days are ideal.",
        optimal_humidity_max: 60.0,
        optimal_temp_min: 22.0,
        optimal_temp_max: 26.0,
        optimal_precip_max: 5.0,
    },
    CropProfile {
        id: "gerste",
        display_name: "Gerste",
        icon: "\u{1F33E}", // 🌾
        comment: "Ripens before wheat; ears bend over when ready.",
        optimal_humidity_max: 65.0,
        optimal_temp_min: 20.0,
        optimal_temp_max: 26.0,
        optimal_precip_max: 4.0,
    },
    CropProfile {
        id: "roggen",
        display_name: "Roggen",
        icon: "\u{1F33E}", // 🌾
        comment: "Prone to sprouting in the ear after prolonged rain.",
        optimal_humidity_max: 65.0,
        optimal_temp_min: 18.0,
        optimal_temp_max: 25.0,
        optimal_precip_max: 5.0,
    },
    CropProfile {
        id: "hafer",
        display_name: "Hafer",
        icon: "\u{1F33E}", // 🌾
        comment: "Tolerates cooler, damper harvest days than other cereals.",
        optimal_humidity_max: 70.0,
        optimal_temp_min: 18.0,
        optimal_temp_max: 24.0,
        optimal_precip_max: 5.0,
    },
    CropProfile {
        id: "raps",
        display_name: "Raps",
        icon: "\u{1F33C}", // 🌼
        comment: "Pods shatter easily; avoid wet and very windy days.",
        optimal_humidity_max: 60.0,
        optimal_temp_min: 18.0,
        optimal_temp_max: 28.0,
        optimal_precip_max: 3.0,
    },
    CropProfile {
        id: "mais",
        display_name: "Mais",
        icon: "\u{1F33D}", // 🌽
        comment: "Silage maize at 30-35% dry matter, grain maize once kernels are hard.",
        optimal_humidity_max: 75.0,
        optimal_temp_min: 15.0,
        optimal_temp_max: 25.0,
        optimal_precip_max: 8.0,
    },
    CropProfile {
        id: "kartoffel",
        display_name: "Kartoffel",
        icon: "\u{1F954}", // 🥔
        comment: "Lift when skins are set; cold, waterlogged soil bruises tubers.",
        optimal_humidity_max: 80.0,
        optimal_temp_min: 10.0,
        optimal_temp_max: 20.0,
        optimal_precip_max: 10.0,
    },
    CropProfile {
        id: "zuckerruebe",
        display_name: "Zuckerrübe",
        icon: "\u{1F331}", // 🌱
        comment: "Late harvest raises sugar content; lift before hard frost.",
        optimal_humidity_max: 85.0,
        optimal_temp_min: 5.0,
        optimal_temp_max: 18.0,
        optimal_precip_max: 12.0,
    },
];

/// Get a crop profile by its ID
///
/// Matching ignores ASCII case and surrounding whitespace.
///
/// # Example
///
/// ```
/// use agrardash::data::crops::get_crop_by_id;
///
/// if let Some(crop) = get_crop_by_id("weizen") {
///     println!("{}: {}-{} °C", crop.display_name, crop.optimal_temp_min, crop.optimal_temp_max);
/// }
/// ```
pub fn get_crop_by_id(id: &str) -> Option<&'static CropProfile> {
    let id = id.trim();
    CROPS.iter().find(|crop| crop.id.eq_ignore_ascii_case(id))
}

/// Get all crop profiles in display order
pub fn all_crops() -> &'static [CropProfile] {
    &CROPS
}

/// Get the set of all crop identifiers
pub fn all_crop_ids() -> BTreeSet<&'static str> {
    CROPS.iter().map(|crop| crop.id).collect()
}

/// Which crops the dashboard evaluates
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum CropSelection {
    /// Every crop in the table
    #[default]
    All,
    /// A single crop
    Single(&'static CropProfile),
}

impl CropSelection {
    /// Parses a selector argument: a crop id or the `all` sentinel.
    ///
    /// Returns `None` if the input names no known crop.
    pub fn parse(s: &str) -> Option<Self> {
        if s.trim().eq_ignore_ascii_case(ALL_CROPS) {
            return Some(CropSelection::All);
        }
        get_crop_by_id(s).map(CropSelection::Single)
    }

    /// The crops covered by this selection, in table order
    pub fn crops(&self) -> Vec<&'static CropProfile> {
        match self {
            CropSelection::All => all_crops().iter().collect(),
            CropSelection::Single(crop) => vec![*crop],
        }
    }

    /// Short label for headers
    pub fn label(&self) -> &'static str {
        match self {
            CropSelection::All => "All crops",
            CropSelection::Single(crop) => crop.display_name,
        }
    }

    /// Position in the cycle `All, CROPS[0], CROPS[1], ...`
    fn cycle_index(&self) -> usize {
        match self {
            CropSelection::All => 0,
            CropSelection::Single(crop) => CROPS
                .iter()
                .position(|c| c.id == crop.id)
                .map(|i| i + 1)
                .unwrap_or(0),
        }
    }

    fn from_cycle_index(index: usize) -> Self {
        match index {
            0 => CropSelection::All,
            i => CropSelection::Single(&CROPS[i - 1]),
        }
    }

    /// The next selection, wrapping from the last crop back to `All`
    pub fn next(&self) -> Self {
        Self::from_cycle_index((self.cycle_index() + 1) % (CROPS.len() + 1))
    }

    /// The previous selection, wrapping from `All` to the last crop
    pub fn previous(&self) -> Self {
        let len = CROPS.len() + 1;
        Self::from_cycle_index((self.cycle_index() + len - 1) % len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_crops_array_has_8_entries() {
        assert_eq!(CROPS.len(), 8);
        assert_eq!(all_crops().len(), 8);
    }

    #[test]
    fn test_all_crops_have_unique_ids() {
        assert_eq!(all_crop_ids().len(), CROPS.len(), "Crop IDs are not unique");
    }

    #[test]
    fn test_each_crop_has_consistent_thresholds() {
        for crop in all_crops() {
            assert!(
                crop.optimal_temp_min <= crop.optimal_temp_max,
                "Crop {} has temp min above max",
                crop.id
            );
            assert!(
                crop.optimal_humidity_max > 0.0 && crop.optimal_humidity_max <= 100.0,
                "Crop {} has invalid humidity max: {}",
                crop.id,
                crop.optimal_humidity_max
            );
            assert!(
                crop.optimal_precip_max >= 0.0,
                "Crop {} has negative precipitation max",
                crop.id
            );
        }
    }

    #[test]
    fn test_each_crop_has_display_text() {
        for crop in all_crops() {
            assert!(!crop.display_name.is_empty());
            assert!(!crop.icon.is_empty());
            assert!(!crop.comment.is_empty());
            assert_eq!(crop.id, crop.id.to_lowercase(), "ids are lowercase");
        }
    }

    #[test]
    fn test_get_crop_by_id_returns_weizen_thresholds() {
        let crop = get_crop_by_id("weizen").expect("weizen should exist");
        assert_eq!(crop.display_name, "Weizen");
        assert!((crop.optimal_temp_min - 22.0).abs() < f64::EPSILON);
        assert!((crop.optimal_temp_max - 26.0).abs() < f64::EPSILON);
        assert!((crop.optimal_humidity_max - 60.0).abs() < f64::EPSILON);
        assert!((crop.optimal_precip_max - 5.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_get_crop_by_id_ignores_case_and_whitespace() {
        assert_eq!(get_crop_by_id(" Mais ").map(|c| c.id), Some("mais"));
        assert_eq!(get_crop_by_id("KARTOFFEL").map(|c| c.id), Some("kartoffel"));
    }

    #[test]
    fn test_get_crop_by_id_returns_none_for_unknown() {
        assert!(get_crop_by_id("banana").is_none());
        assert!(get_crop_by_id("").is_none());
        assert!(get_crop_by_id(ALL_CROPS).is_none());
    }

    #[test]
    fn test_all_crop_ids_contains_every_crop() {
        let ids = all_crop_ids();
        for crop in all_crops() {
            assert!(ids.contains(crop.id));
        }
    }

    #[test]
    fn test_selection_parse() {
        assert_eq!(CropSelection::parse("all"), Some(CropSelection::All));
        assert_eq!(CropSelection::parse("ALL"), Some(CropSelection::All));
        assert_eq!(
            CropSelection::parse("raps"),
            Some(CropSelection::Single(&CROPS[4]))
        );
        assert!(CropSelection::parse("tulpe").is_none());
    }

    #[test]
    fn test_selection_crops() {
        assert_eq!(CropSelection::All.crops().len(), CROPS.len());
        let single = CropSelection::Single(&CROPS[0]).crops();
        assert_eq!(single.len(), 1);
        assert_eq!(single[0].id, "weizen");
    }

    #[test]
    fn test_selection_cycles_through_every_crop_and_back() {
        let mut selection = CropSelection::All;
        for crop in all_crops() {
            selection = selection.next();
            assert_eq!(selection, CropSelection::Single(crop));
        }
        assert_eq!(selection.next(), CropSelection::All);
    }

    #[test]
    fn test_selection_previous_wraps_to_last_crop() {
        let last = &CROPS[CROPS.len() - 1];
        assert_eq!(CropSelection::All.previous(), CropSelection::Single(last));
        assert_eq!(CropSelection::Single(&CROPS[0]).previous(), CropSelection::All);
    }

    #[test]
    fn test_selection_label() {
        assert_eq!(CropSelection::All.label(), "All crops");
        assert_eq!(CropSelection::Single(&CROPS[1]).label(), "Gerste");
    }
}
