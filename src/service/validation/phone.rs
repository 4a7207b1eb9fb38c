use std::ops::RangeInclusive;

use serde::Serialize;

use crate::shared::config::FilterConfig;
use crate::shared::utils::strip_separators;

const MIN_E164_DIGITS: usize = 7;
const MAX_E164_DIGITS: usize = 15;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NumberType {
    Mobile,
    FixedLine,
    FixedLineOrMobile,
    Unknown,
}

impl NumberType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Mobile => "MOBILE",
            Self::FixedLine => "FIXED_LINE",
            Self::FixedLineOrMobile => "FIXED_LINE_OR_MOBILE",
            Self::Unknown => "UNKNOWN",
        }
    }
}

/// Structural facts about a phone number. Everything besides `is_valid` is
/// empty when the number was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PhoneValidation {
    pub is_valid: bool,
    pub is_mobile: bool,
    pub country_code: String,
    pub national_number: String,
    pub region: String,
    pub number_type: NumberType,
    pub carrier: Option<String>,
}

impl PhoneValidation {
    fn invalid() -> Self {
        Self {
            is_valid: false,
            is_mobile: false,
            country_code: String::new(),
            national_number: String::new(),
            region: String::new(),
            number_type: NumberType::Unknown,
            carrier: None,
        }
    }

    /// Country code followed by the national number, without '+'.
    pub fn e164_digits(&self) -> String {
        format!("{}{}", self.country_code, self.national_number)
    }

    pub fn e164(&self) -> String {
        format!("+{}", self.e164_digits())
    }

    pub fn format_international(&self) -> String {
        format!(
            "+{} {}",
            self.country_code,
            format_national(&self.country_code, &self.national_number)
        )
    }
}

/// Synchronous, I/O-free gate run before any paid external lookup.
pub trait PhoneFormatValidator: Send + Sync {
    fn validate(&self, number: &str, region: Option<&str>) -> PhoneValidation;

    fn is_valid_mobile(&self, number: &str) -> bool {
        let validation = self.validate(number, None);
        validation.is_valid && validation.is_mobile
    }

    fn format_international(&self, number: &str) -> Option<String> {
        let validation = self.validate(number, None);
        validation
            .is_valid
            .then(|| validation.format_international())
    }

    fn carrier(&self, number: &str) -> Option<String> {
        self.validate(number, None).carrier
    }
}

struct Country {
    code: &'static str,
    region: &'static str,
    national_len: RangeInclusive<usize>,
}

const COUNTRIES: &[Country] = &[
    Country {
        code: "1",
        region: "US",
        national_len: 10..=10,
    },
    Country {
        code: "7",
        region: "RU",
        national_len: 10..=10,
    },
    Country {
        code: "20",
        region: "EG",
        national_len: 9..=10,
    },
    Country {
        code: "27",
        region: "ZA",
        national_len: 9..=9,
    },
    Country {
        code: "33",
        region: "FR",
        national_len: 9..=9,
    },
    Country {
        code: "34",
        region: "ES",
        national_len: 9..=9,
    },
    Country {
        code: "44",
        region: "GB",
        national_len: 9..=10,
    },
    Country {
        code: "49",
        region: "DE",
        national_len: 6..=13,
    },
    Country {
        code: "86",
        region: "CN",
        national_len: 9..=11,
    },
    Country {
        code: "91",
        region: "IN",
        national_len: 10..=10,
    },
    Country {
        code: "212",
        region: "MA",
        national_len: 9..=9,
    },
    Country {
        code: "213",
        region: "DZ",
        national_len: 8..=9,
    },
    Country {
        code: "216",
        region: "TN",
        national_len: 8..=8,
    },
    Country {
        code: "234",
        region: "NG",
        national_len: 8..=10,
    },
    Country {
        code: "254",
        region: "KE",
        national_len: 9..=9,
    },
    Country {
        code: "255",
        region: "TZ",
        national_len: 9..=9,
    },
    Country {
        code: "256",
        region: "UG",
        national_len: 9..=9,
    },
];

const MA_IAM: &[&str] = &[
    "610", "611", "613", "615", "616", "618", "622", "623", "624", "628", "636", "637", "639",
    "641", "642", "643", "648", "650", "651", "652", "653", "654", "655", "658", "659", "661",
    "662", "666", "667", "668", "670", "671", "672", "673", "676", "677", "678", "682", "689",
    "696", "697", "750", "751", "752", "753", "754", "755", "760", "761", "762", "763", "764",
];

const MA_ORANGE: &[&str] = &[
    "612", "614", "617", "619", "620", "621", "625", "631", "632", "644", "645", "649", "656",
    "657", "660", "663", "664", "665", "669", "674", "675", "679", "684", "688", "691", "693",
    "694", "770", "771", "772", "773", "774", "775", "776", "777", "778", "779", "780", "781",
    "782", "783", "784", "785", "786", "787",
];

const MA_INWI: &[&str] = &[
    "626", "627", "629", "630", "633", "634", "635", "638", "640", "646", "647", "680", "681",
    "687", "690", "695", "698", "699", "700", "701", "702", "703", "704", "705", "706", "707",
    "708", "709", "710", "711", "712", "713", "714", "715", "716", "717", "718", "719", "720",
    "721", "722", "723", "724", "725", "726", "727", "728",
];

const NG_CARRIERS: &[(&str, &str)] = &[
    ("803", "MTN"),
    ("806", "MTN"),
    ("813", "MTN"),
    ("814", "MTN"),
    ("816", "MTN"),
    ("903", "MTN"),
    ("906", "MTN"),
    ("802", "Airtel"),
    ("808", "Airtel"),
    ("812", "Airtel"),
    ("701", "Airtel"),
    ("805", "Glo"),
    ("815", "Glo"),
    ("705", "Glo"),
    ("807", "Glo"),
    ("809", "9mobile"),
    ("818", "9mobile"),
    ("817", "9mobile"),
    ("909", "9mobile"),
];

fn country_by_code(digits: &str) -> Option<&'static Country> {
    COUNTRIES
        .iter()
        .filter(|country| digits.starts_with(country.code))
        .max_by_key(|country| country.code.len())
}

fn country_by_region(region: &str) -> Option<&'static Country> {
    COUNTRIES
        .iter()
        .find(|country| country.region.eq_ignore_ascii_case(region.trim()))
}

/// Validator backed by fixed per-region tables. Unknown country codes keep
/// the number valid and attribute it to the fallback region.
#[derive(Debug, Clone)]
pub struct TablePhoneValidator {
    fallback_region: String,
}

impl Default for TablePhoneValidator {
    fn default() -> Self {
        Self::new("UNKNOWN")
    }
}

impl TablePhoneValidator {
    pub fn new(fallback_region: impl Into<String>) -> Self {
        Self {
            fallback_region: fallback_region.into(),
        }
    }

    pub fn from_config(config: &FilterConfig) -> Self {
        Self::new(config.fallback_region.clone())
    }

    fn split_international(&self, digits: &str) -> (String, String, String) {
        if let Some(country) = country_by_code(digits) {
            return (
                country.code.to_string(),
                digits[country.code.len()..].to_string(),
                country.region.to_string(),
            );
        }
        let code_len = match digits.len() {
            len if len >= 10 => 3,
            len if len >= 8 => 2,
            _ => 1,
        };
        (
            digits[..code_len].to_string(),
            digits[code_len..].to_string(),
            self.fallback_region.clone(),
        )
    }
}

impl PhoneFormatValidator for TablePhoneValidator {
    fn validate(&self, number: &str, region: Option<&str>) -> PhoneValidation {
        let cleaned = strip_separators(number);
        let cleaned = match cleaned.strip_prefix("00") {
            Some(rest) => format!("+{}", rest),
            None => cleaned,
        };

        let (country_code, national_number, region) = if let Some(digits) =
            cleaned.strip_prefix('+')
        {
            if !is_digits(digits) || !within_envelope(digits.len()) {
                return PhoneValidation::invalid();
            }
            self.split_international(digits)
        } else {
            if !is_digits(&cleaned) {
                return PhoneValidation::invalid();
            }
            match region.and_then(country_by_region) {
                Some(country) => {
                    let national = cleaned.strip_prefix('0').unwrap_or(&cleaned);
                    if !within_envelope(country.code.len() + national.len()) {
                        return PhoneValidation::invalid();
                    }
                    (
                        country.code.to_string(),
                        national.to_string(),
                        country.region.to_string(),
                    )
                }
                None => {
                    // Bare digits only count as international when they open
                    // with a known country code.
                    let Some(country) = country_by_code(&cleaned) else {
                        return PhoneValidation::invalid();
                    };
                    if !within_envelope(cleaned.len()) {
                        return PhoneValidation::invalid();
                    }
                    (
                        country.code.to_string(),
                        cleaned[country.code.len()..].to_string(),
                        country.region.to_string(),
                    )
                }
            }
        };

        if national_number.is_empty() {
            return PhoneValidation::invalid();
        }

        let number_type = number_type(&country_code, &national_number);
        PhoneValidation {
            is_valid: true,
            is_mobile: matches!(
                number_type,
                NumberType::Mobile | NumberType::FixedLineOrMobile
            ),
            carrier: carrier(&country_code, &national_number).map(str::to_string),
            country_code,
            national_number,
            region,
            number_type,
        }
    }
}

fn is_digits(value: &str) -> bool {
    !value.is_empty() && value.chars().all(|c| c.is_ascii_digit())
}

fn within_envelope(digit_count: usize) -> bool {
    (MIN_E164_DIGITS..=MAX_E164_DIGITS).contains(&digit_count)
}

fn number_type(country_code: &str, national: &str) -> NumberType {
    let Some(country) = COUNTRIES.iter().find(|country| country.code == country_code) else {
        return NumberType::Unknown;
    };
    if !country.national_len.contains(&national.len()) {
        return NumberType::Unknown;
    }
    let lead = national.chars().next().unwrap_or('0');
    match (country.region, lead) {
        ("MA", '6' | '7') => NumberType::Mobile,
        ("MA", '5') => NumberType::FixedLine,
        ("NG", '7' | '8' | '9') if national.len() == 10 => NumberType::Mobile,
        ("NG", _) if national.len() < 10 => NumberType::FixedLine,
        ("US", _) => NumberType::FixedLineOrMobile,
        ("GB", '7') => NumberType::Mobile,
        ("GB", '1' | '2' | '3') => NumberType::FixedLine,
        ("FR", '6' | '7') | ("ES", '6' | '7') => NumberType::Mobile,
        ("FR", '1'..='5') | ("ES", '8' | '9') => NumberType::FixedLine,
        ("IN", '6'..='9') => NumberType::Mobile,
        _ => NumberType::Unknown,
    }
}

fn carrier(country_code: &str, national: &str) -> Option<&'static str> {
    let prefix = national.get(..3)?;
    match country_code {
        "212" if national.len() == 9 => {
            if MA_IAM.contains(&prefix) {
                Some("Maroc Telecom")
            } else if MA_ORANGE.contains(&prefix) {
                Some("Orange Maroc")
            } else if MA_INWI.contains(&prefix) {
                Some("Inwi")
            } else {
                None
            }
        }
        "234" if national.len() == 10 => NG_CARRIERS
            .iter()
            .find(|(code, _)| *code == prefix)
            .map(|(_, name)| *name),
        _ => None,
    }
}

fn format_national(country_code: &str, national: &str) -> String {
    match (country_code, national.len()) {
        ("234", 10) => format!("{} {} {}", &national[..3], &national[3..6], &national[6..]),
        ("1", 10) => format!("({}) {}-{}", &national[..3], &national[3..6], &national[6..]),
        ("44", 10) => format!("{} {} {}", &national[..4], &national[4..7], &national[7..]),
        ("212", 9) => format!("{}-{}", &national[..3], &national[3..]),
        (_, len) if len >= 6 => {
            let mid = len / 2;
            format!("{} {}", &national[..mid], &national[mid..])
        }
        _ => national.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn validator() -> TablePhoneValidator {
        TablePhoneValidator::default()
    }

    #[test]
    fn moroccan_mobile_is_parsed_with_carrier() {
        let v = validator().validate("+212661234567", None);
        assert!(v.is_valid);
        assert!(v.is_mobile);
        assert_eq!(v.country_code, "212");
        assert_eq!(v.national_number, "661234567");
        assert_eq!(v.region, "MA");
        assert_eq!(v.number_type, NumberType::Mobile);
        assert_eq!(v.carrier.as_deref(), Some("Maroc Telecom"));
        assert_eq!(v.format_international(), "+212 661-234567");
    }

    #[test]
    fn bare_digits_need_a_known_country_code() {
        let v = validator().validate("212661234567", None);
        assert!(v.is_valid);
        assert_eq!(v.region, "MA");
        assert_eq!(v.e164(), "+212661234567");

        assert!(!validator().validate("0661234567", None).is_valid);
        assert!(!validator().validate("5551234567", None).is_valid);
    }

    #[test]
    fn region_hint_reads_national_format() {
        let v = validator().validate("0661 23 45 67", Some("ma"));
        assert!(v.is_valid);
        assert_eq!(v.country_code, "212");
        assert_eq!(v.national_number, "661234567");
    }

    #[test]
    fn double_zero_prefix_is_international() {
        let v = validator().validate("00212-661-234-567", None);
        assert!(v.is_valid);
        assert_eq!(v.e164_digits(), "212661234567");
    }

    #[test]
    fn rejects_letters_and_out_of_envelope_lengths() {
        assert!(!validator().validate("+212661abc567", None).is_valid);
        assert!(!validator().validate("+123456", None).is_valid);
        assert!(!validator().validate("+1234567890123456", None).is_valid);
        assert!(!validator().validate("", None).is_valid);
        assert!(!validator().validate("+", None).is_valid);
    }

    #[test]
    fn unknown_country_code_uses_fallback_region() {
        let v = TablePhoneValidator::new("ZZ").validate("+9991234567890", None);
        assert!(v.is_valid);
        assert_eq!(v.country_code, "999");
        assert_eq!(v.region, "ZZ");
        assert_eq!(v.number_type, NumberType::Unknown);
        assert!(!v.is_mobile);
    }

    #[test]
    fn nigerian_and_us_numbers_are_typed() {
        let ng = validator().validate("+2348031234567", None);
        assert_eq!(ng.region, "NG");
        assert_eq!(ng.carrier.as_deref(), Some("MTN"));
        assert_eq!(ng.format_international(), "+234 803 123 4567");
        assert!(validator().is_valid_mobile("+2348031234567"));

        let us = validator().validate("+1 (555) 123-4567", None);
        assert_eq!(us.number_type, NumberType::FixedLineOrMobile);
        assert!(us.is_mobile);
        assert_eq!(
            validator().format_international("+15551234567").as_deref(),
            Some("+1 (555) 123-4567")
        );
    }

    #[test]
    fn wrong_national_length_keeps_number_untyped() {
        let v = validator().validate("+21266123456", None);
        assert!(v.is_valid);
        assert_eq!(v.number_type, NumberType::Unknown);
        assert!(!validator().is_valid_mobile("+21266123456"));
    }
}
