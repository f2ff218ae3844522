//! Country table and national holiday definitions.

use super::rules::{easter, fixed, DateRule, HolidayDef, Observance};
use chrono::Weekday;

/// ISO country codes offered for holiday configuration, with display names.
const COUNTRIES: [(&str, &str); 31] = [
    ("US", "United States"),
    ("GB", "United Kingdom"),
    ("FR", "France"),
    ("DE", "Germany"),
    ("ES", "Spain"),
    ("IT", "Italy"),
    ("MA", "Morocco"),
    ("CA", "Canada"),
    ("AU", "Australia"),
    ("JP", "Japan"),
    ("CN", "China"),
    ("IN", "India"),
    ("BR", "Brazil"),
    ("MX", "Mexico"),
    ("NL", "Netherlands"),
    ("BE", "Belgium"),
    ("CH", "Switzerland"),
    ("AT", "Austria"),
    ("SE", "Sweden"),
    ("NO", "Norway"),
    ("DK", "Denmark"),
    ("FI", "Finland"),
    ("PL", "Poland"),
    ("PT", "Portugal"),
    ("IE", "Ireland"),
    ("NZ", "New Zealand"),
    ("SG", "Singapore"),
    ("AE", "United Arab Emirates"),
    ("SA", "Saudi Arabia"),
    ("ZA", "South Africa"),
    ("EG", "Egypt"),
];

/// `(code, name)` pairs of every country offered to users.
///
/// Only 23 of the 31 entries have holiday rules. JP, CN, IN, SG, AE, SA, EG
/// and MA resolve to `Unsupported` and get the Jan 1 / Dec 25 fallback;
/// check with [`has_holiday_rules`].
pub fn available_countries() -> &'static [(&'static str, &'static str)] {
    &COUNTRIES
}

/// Whether `code` resolves to its own holiday rules rather than the fallback.
pub fn has_holiday_rules(code: &str) -> bool {
    rules_for(code).is_some()
}

const fn nth(month: u32, weekday: Weekday, n: u32) -> DateRule {
    DateRule::NthWeekday { month, weekday, n }
}

const fn last(month: u32, weekday: Weekday) -> DateRule {
    DateRule::LastWeekday { month, weekday }
}

const fn on_or_after(month: u32, day: u32, weekday: Weekday) -> DateRule {
    DateRule::WeekdayOnOrAfter {
        month,
        day,
        weekday,
    }
}

const NEW_YEAR: HolidayDef = HolidayDef::new("New Year's Day", fixed(1, 1));
const EPIPHANY: HolidayDef = HolidayDef::new("Epiphany", fixed(1, 6));
const MAUNDY_THURSDAY: HolidayDef = HolidayDef::new("Maundy Thursday", easter(-3));
const GOOD_FRIDAY: HolidayDef = HolidayDef::new("Good Friday", easter(-2));
const EASTER_SUNDAY: HolidayDef = HolidayDef::new("Easter Sunday", easter(0));
const EASTER_MONDAY: HolidayDef = HolidayDef::new("Easter Monday", easter(1));
const LABOUR_DAY: HolidayDef = HolidayDef::new("Labour Day", fixed(5, 1));
const ASCENSION: HolidayDef = HolidayDef::new("Ascension Day", easter(39));
const WHIT_SUNDAY: HolidayDef = HolidayDef::new("Whit Sunday", easter(49));
const WHIT_MONDAY: HolidayDef = HolidayDef::new("Whit Monday", easter(50));
const CORPUS_CHRISTI: HolidayDef = HolidayDef::new("Corpus Christi", easter(60));
const ASSUMPTION: HolidayDef = HolidayDef::new("Assumption Day", fixed(8, 15));
const ALL_SAINTS: HolidayDef = HolidayDef::new("All Saints' Day", fixed(11, 1));
const IMMACULATE_CONCEPTION: HolidayDef = HolidayDef::new("Immaculate Conception", fixed(12, 8));
const CHRISTMAS: HolidayDef = HolidayDef::new("Christmas Day", fixed(12, 25));
const BOXING_DAY: HolidayDef = HolidayDef::new("Boxing Day", fixed(12, 26));

const US: &[HolidayDef] = &[
    NEW_YEAR.observed(Observance::NearestWeekday),
    HolidayDef::new("Martin Luther King Jr. Day", nth(1, Weekday::Mon, 3)),
    HolidayDef::new("Washington's Birthday", nth(2, Weekday::Mon, 3)),
    HolidayDef::new("Memorial Day", last(5, Weekday::Mon)),
    HolidayDef::new("Juneteenth", fixed(6, 19))
        .observed(Observance::NearestWeekday)
        .since(2021),
    HolidayDef::new("Independence Day", fixed(7, 4)).observed(Observance::NearestWeekday),
    HolidayDef::new("Labor Day", nth(9, Weekday::Mon, 1)),
    HolidayDef::new("Columbus Day", nth(10, Weekday::Mon, 2)),
    HolidayDef::new("Veterans Day", fixed(11, 11)).observed(Observance::NearestWeekday),
    HolidayDef::new("Thanksgiving", nth(11, Weekday::Thu, 4)),
    CHRISTMAS.observed(Observance::NearestWeekday),
];

const GB: &[HolidayDef] = &[
    NEW_YEAR.observed(Observance::NextFreeWeekday),
    GOOD_FRIDAY,
    EASTER_MONDAY,
    HolidayDef::new("May Day", nth(5, Weekday::Mon, 1)),
    HolidayDef::new("Spring Bank Holiday", last(5, Weekday::Mon)),
    HolidayDef::new("Late Summer Bank Holiday", last(8, Weekday::Mon)),
    CHRISTMAS.observed(Observance::NextFreeWeekday),
    BOXING_DAY.observed(Observance::NextFreeWeekday),
];

const FR: &[HolidayDef] = &[
    NEW_YEAR,
    EASTER_MONDAY,
    LABOUR_DAY,
    HolidayDef::new("Victory in Europe Day", fixed(5, 8)),
    ASCENSION,
    WHIT_MONDAY,
    HolidayDef::new("Bastille Day", fixed(7, 14)),
    ASSUMPTION,
    ALL_SAINTS,
    HolidayDef::new("Armistice Day", fixed(11, 11)),
    CHRISTMAS,
];

const DE: &[HolidayDef] = &[
    NEW_YEAR,
    GOOD_FRIDAY,
    EASTER_MONDAY,
    LABOUR_DAY,
    ASCENSION,
    WHIT_MONDAY,
    HolidayDef::new("German Unity Day", fixed(10, 3)),
    CHRISTMAS,
    HolidayDef::new("Second Day of Christmas", fixed(12, 26)),
];

const ES: &[HolidayDef] = &[
    NEW_YEAR,
    EPIPHANY,
    GOOD_FRIDAY,
    LABOUR_DAY,
    ASSUMPTION,
    HolidayDef::new("National Day", fixed(10, 12)),
    ALL_SAINTS,
    HolidayDef::new("Constitution Day", fixed(12, 6)),
    IMMACULATE_CONCEPTION,
    CHRISTMAS,
];

const IT: &[HolidayDef] = &[
    NEW_YEAR,
    EPIPHANY,
    EASTER_SUNDAY,
    EASTER_MONDAY,
    HolidayDef::new("Liberation Day", fixed(4, 25)),
    LABOUR_DAY,
    HolidayDef::new("Republic Day", fixed(6, 2)),
    ASSUMPTION,
    ALL_SAINTS,
    IMMACULATE_CONCEPTION,
    CHRISTMAS,
    HolidayDef::new("St. Stephen's Day", fixed(12, 26)),
];

const CA: &[HolidayDef] = &[
    NEW_YEAR,
    GOOD_FRIDAY,
    HolidayDef::new(
        "Victoria Day",
        DateRule::WeekdayOnOrBefore {
            month: 5,
            day: 24,
            weekday: Weekday::Mon,
        },
    ),
    HolidayDef::new("Canada Day", fixed(7, 1)),
    HolidayDef::new("Labour Day", nth(9, Weekday::Mon, 1)),
    HolidayDef::new("Thanksgiving", nth(10, Weekday::Mon, 2)),
    CHRISTMAS,
];

const AU: &[HolidayDef] = &[
    NEW_YEAR.observed(Observance::NextFreeWeekday),
    HolidayDef::new("Australia Day", fixed(1, 26)).observed(Observance::NextFreeWeekday),
    GOOD_FRIDAY,
    EASTER_MONDAY,
    HolidayDef::new("Anzac Day", fixed(4, 25)),
    CHRISTMAS.observed(Observance::NextFreeWeekday),
    BOXING_DAY.observed(Observance::NextFreeWeekday),
];

const BR: &[HolidayDef] = &[
    NEW_YEAR,
    GOOD_FRIDAY,
    HolidayDef::new("Tiradentes' Day", fixed(4, 21)),
    HolidayDef::new("Worker's Day", fixed(5, 1)),
    HolidayDef::new("Independence Day", fixed(9, 7)),
    HolidayDef::new("Our Lady of Aparecida", fixed(10, 12)),
    HolidayDef::new("All Souls' Day", fixed(11, 2)),
    HolidayDef::new("Republic Proclamation Day", fixed(11, 15)),
    HolidayDef::new("Black Consciousness Day", fixed(11, 20)).since(2024),
    CHRISTMAS,
];

const MX: &[HolidayDef] = &[
    NEW_YEAR,
    HolidayDef::new("Constitution Day", nth(2, Weekday::Mon, 1)),
    HolidayDef::new("Benito Juarez's Birthday", nth(3, Weekday::Mon, 3)),
    LABOUR_DAY,
    HolidayDef::new("Independence Day", fixed(9, 16)),
    HolidayDef::new("Revolution Day", nth(11, Weekday::Mon, 3)),
    CHRISTMAS,
];

const NL: &[HolidayDef] = &[
    NEW_YEAR,
    EASTER_SUNDAY,
    EASTER_MONDAY,
    HolidayDef::new("King's Day", fixed(4, 27)),
    ASCENSION,
    WHIT_SUNDAY,
    WHIT_MONDAY,
    CHRISTMAS,
    HolidayDef::new("Second Day of Christmas", fixed(12, 26)),
];

const BE: &[HolidayDef] = &[
    NEW_YEAR,
    EASTER_SUNDAY,
    EASTER_MONDAY,
    LABOUR_DAY,
    ASCENSION,
    WHIT_SUNDAY,
    WHIT_MONDAY,
    HolidayDef::new("National Day", fixed(7, 21)),
    ASSUMPTION,
    ALL_SAINTS,
    HolidayDef::new("Armistice Day", fixed(11, 11)),
    CHRISTMAS,
];

const CH: &[HolidayDef] = &[
    NEW_YEAR,
    ASCENSION,
    HolidayDef::new("National Day", fixed(8, 1)),
    CHRISTMAS,
];

const AT: &[HolidayDef] = &[
    NEW_YEAR,
    EPIPHANY,
    EASTER_MONDAY,
    LABOUR_DAY,
    ASCENSION,
    WHIT_MONDAY,
    CORPUS_CHRISTI,
    ASSUMPTION,
    HolidayDef::new("National Day", fixed(10, 26)),
    ALL_SAINTS,
    IMMACULATE_CONCEPTION,
    CHRISTMAS,
    HolidayDef::new("St. Stephen's Day", fixed(12, 26)),
];

const SE: &[HolidayDef] = &[
    NEW_YEAR,
    EPIPHANY,
    GOOD_FRIDAY,
    EASTER_SUNDAY,
    EASTER_MONDAY,
    LABOUR_DAY,
    ASCENSION,
    WHIT_SUNDAY,
    HolidayDef::new("National Day", fixed(6, 6)),
    HolidayDef::new("Midsummer Day", on_or_after(6, 20, Weekday::Sat)),
    HolidayDef::new("All Saints' Day", on_or_after(10, 31, Weekday::Sat)),
    CHRISTMAS,
    HolidayDef::new("Second Day of Christmas", fixed(12, 26)),
];

const NO: &[HolidayDef] = &[
    NEW_YEAR,
    MAUNDY_THURSDAY,
    GOOD_FRIDAY,
    EASTER_SUNDAY,
    EASTER_MONDAY,
    LABOUR_DAY,
    HolidayDef::new("Constitution Day", fixed(5, 17)),
    ASCENSION,
    WHIT_SUNDAY,
    WHIT_MONDAY,
    CHRISTMAS,
    HolidayDef::new("Second Day of Christmas", fixed(12, 26)),
];

const DK: &[HolidayDef] = &[
    NEW_YEAR,
    MAUNDY_THURSDAY,
    GOOD_FRIDAY,
    EASTER_SUNDAY,
    EASTER_MONDAY,
    ASCENSION,
    WHIT_SUNDAY,
    WHIT_MONDAY,
    HolidayDef::new("Constitution Day", fixed(6, 5)),
    CHRISTMAS,
    HolidayDef::new("Second Day of Christmas", fixed(12, 26)),
];

const FI: &[HolidayDef] = &[
    NEW_YEAR,
    EPIPHANY,
    GOOD_FRIDAY,
    EASTER_SUNDAY,
    EASTER_MONDAY,
    LABOUR_DAY,
    ASCENSION,
    WHIT_SUNDAY,
    HolidayDef::new("Midsummer Day", on_or_after(6, 20, Weekday::Sat)),
    HolidayDef::new("All Saints' Day", on_or_after(10, 31, Weekday::Sat)),
    HolidayDef::new("Independence Day", fixed(12, 6)),
    CHRISTMAS,
    HolidayDef::new("Second Day of Christmas", fixed(12, 26)),
];

const PL: &[HolidayDef] = &[
    NEW_YEAR,
    EPIPHANY,
    EASTER_SUNDAY,
    EASTER_MONDAY,
    LABOUR_DAY,
    HolidayDef::new("Constitution Day", fixed(5, 3)),
    WHIT_SUNDAY,
    CORPUS_CHRISTI,
    ASSUMPTION,
    ALL_SAINTS,
    HolidayDef::new("Independence Day", fixed(11, 11)),
    HolidayDef::new("Christmas Eve", fixed(12, 24)).since(2025),
    CHRISTMAS,
    HolidayDef::new("Second Day of Christmas", fixed(12, 26)),
];

const PT: &[HolidayDef] = &[
    NEW_YEAR,
    GOOD_FRIDAY,
    EASTER_SUNDAY,
    HolidayDef::new("Freedom Day", fixed(4, 25)),
    LABOUR_DAY,
    CORPUS_CHRISTI,
    HolidayDef::new("Portugal Day", fixed(6, 10)),
    ASSUMPTION,
    HolidayDef::new("Republic Day", fixed(10, 5)),
    ALL_SAINTS,
    HolidayDef::new("Restoration of Independence", fixed(12, 1)),
    IMMACULATE_CONCEPTION,
    CHRISTMAS,
];

const IE: &[HolidayDef] = &[
    NEW_YEAR,
    HolidayDef::new("St. Brigid's Day", nth(2, Weekday::Mon, 1)).since(2023),
    HolidayDef::new("St. Patrick's Day", fixed(3, 17)),
    EASTER_MONDAY,
    HolidayDef::new("May Day", nth(5, Weekday::Mon, 1)),
    HolidayDef::new("June Bank Holiday", nth(6, Weekday::Mon, 1)),
    HolidayDef::new("August Bank Holiday", nth(8, Weekday::Mon, 1)),
    HolidayDef::new("October Bank Holiday", last(10, Weekday::Mon)),
    CHRISTMAS,
    HolidayDef::new("St. Stephen's Day", fixed(12, 26)),
];

const NZ: &[HolidayDef] = &[
    NEW_YEAR.observed(Observance::NextFreeWeekday),
    HolidayDef::new("Day after New Year's Day", fixed(1, 2)).observed(Observance::NextFreeWeekday),
    HolidayDef::new("Waitangi Day", fixed(2, 6)).observed(Observance::NextFreeWeekday),
    GOOD_FRIDAY,
    EASTER_MONDAY,
    HolidayDef::new("Anzac Day", fixed(4, 25)).observed(Observance::NextFreeWeekday),
    HolidayDef::new("Sovereign's Birthday", nth(6, Weekday::Mon, 1)),
    HolidayDef::new("Labour Day", nth(10, Weekday::Mon, 4)),
    CHRISTMAS.observed(Observance::NextFreeWeekday),
    BOXING_DAY.observed(Observance::NextFreeWeekday),
];

const ZA: &[HolidayDef] = &[
    NEW_YEAR.observed(Observance::SundayToMonday),
    HolidayDef::new("Human Rights Day", fixed(3, 21)).observed(Observance::SundayToMonday),
    GOOD_FRIDAY,
    HolidayDef::new("Family Day", easter(1)),
    HolidayDef::new("Freedom Day", fixed(4, 27)).observed(Observance::SundayToMonday),
    HolidayDef::new("Workers' Day", fixed(5, 1)).observed(Observance::SundayToMonday),
    HolidayDef::new("Youth Day", fixed(6, 16)).observed(Observance::SundayToMonday),
    HolidayDef::new("National Women's Day", fixed(8, 9)).observed(Observance::SundayToMonday),
    HolidayDef::new("Heritage Day", fixed(9, 24)).observed(Observance::SundayToMonday),
    HolidayDef::new("Day of Reconciliation", fixed(12, 16)).observed(Observance::SundayToMonday),
    CHRISTMAS.observed(Observance::SundayToMonday),
    HolidayDef::new("Day of Goodwill", fixed(12, 26)).observed(Observance::SundayToMonday),
];

/// Holiday definitions for a country code (upper case), if rules exist.
pub fn rules_for(code: &str) -> Option<&'static [HolidayDef]> {
    let defs = match code {
        "US" => US,
        "GB" | "UK" => GB,
        "FR" => FR,
        "DE" => DE,
        "ES" => ES,
        "IT" => IT,
        "CA" => CA,
        "AU" => AU,
        "BR" => BR,
        "MX" => MX,
        "NL" => NL,
        "BE" => BE,
        "CH" => CH,
        "AT" => AT,
        "SE" => SE,
        "NO" => NO,
        "DK" => DK,
        "FI" => FI,
        "PL" => PL,
        "PT" => PT,
        "IE" => IE,
        "NZ" => NZ,
        "ZA" => ZA,
        _ => return None,
    };
    Some(defs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_lists_all_offered_countries() {
        let countries = available_countries();
        assert_eq!(countries.len(), 31);
        assert!(countries.contains(&("US", "United States")));
        assert!(countries.contains(&("EG", "Egypt")));
    }

    #[test]
    fn rules_exist_for_listed_codes_only() {
        for code in ["US", "GB", "FR", "DE", "ZA", "NZ"] {
            assert!(rules_for(code).is_some(), "{code}");
        }
        for code in ["JP", "CN", "SA", "XX"] {
            assert!(rules_for(code).is_none(), "{code}");
        }
        let listed: Vec<&str> = available_countries().iter().map(|(c, _)| *c).collect();
        for code in ["US", "GB", "FR", "DE", "ES", "IT", "CA", "AU", "BR", "MX", "NL", "BE"] {
            assert!(listed.contains(&code));
        }
    }

    #[test]
    fn listed_countries_without_rules() {
        let without: Vec<&str> = available_countries()
            .iter()
            .map(|(c, _)| *c)
            .filter(|c| !has_holiday_rules(c))
            .collect();
        assert_eq!(without, vec!["MA", "JP", "CN", "IN", "SG", "AE", "SA", "EG"]);
        let with_rules = available_countries().len() - without.len();
        assert_eq!(with_rules, 23);
    }
}
