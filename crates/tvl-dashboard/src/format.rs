#![forbid(unsafe_code)]

//! Number formatting for the metric tiles.
//!
//! TVL is shown as a whole number with locale digit grouping, rounded half
//! away from zero. APY is shown with exactly one fractional digit followed by
//! `" %"`; exact ties round away from zero.

/// How integer digits are grouped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Grouping {
    /// Groups of three: `1,234,567`.
    Thousands,
    /// Three, then twos: `12,34,567`.
    Indian,
}

/// Digit grouping rules for a locale.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NumberLocale {
    tag: String,
    separator: char,
    grouping: Grouping,
    /// Integers with fewer than `3 + min_grouping_digits` digits stay
    /// ungrouped (`1234` rather than `1.234` in Spanish).
    min_grouping_digits: u8,
}

impl Default for NumberLocale {
    fn default() -> Self {
        Self::en_us()
    }
}

impl NumberLocale {
    /// The `en-US` rules.
    pub fn en_us() -> Self {
        Self {
            tag: "en-US".to_owned(),
            separator: ',',
            grouping: Grouping::Thousands,
            min_grouping_digits: 1,
        }
    }

    /// Rules for a BCP 47 tag (`de-DE`) or POSIX name (`de_DE.UTF-8`).
    ///
    /// Unknown languages fall back to `en-US` grouping.
    pub fn from_tag(tag: &str) -> Self {
        let tag = normalize_tag(tag);
        let mut parts = tag.split('-');
        let language = parts.next().unwrap_or_default().to_ascii_lowercase();
        let region = parts.next().unwrap_or_default().to_ascii_uppercase();

        let (separator, grouping, min_grouping_digits) = match (language.as_str(), region.as_str())
        {
            ("en", "IN") | ("hi", _) | ("bn", _) => (',', Grouping::Indian, 1),
            ("de", "CH" | "LI") | ("it", "CH") => ('\u{2019}', Grouping::Thousands, 1),
            ("pt", "PT") => ('\u{a0}', Grouping::Thousands, 2),
            ("es", _) => ('.', Grouping::Thousands, 2),
            ("pl", _) => ('\u{a0}', Grouping::Thousands, 2),
            ("de" | "it" | "nl" | "id" | "tr" | "da" | "el" | "pt" | "ro" | "hr" | "sl", _) => {
                ('.', Grouping::Thousands, 1)
            }
            ("fr", _) => ('\u{202f}', Grouping::Thousands, 1),
            ("ru" | "uk" | "cs" | "sk" | "fi" | "sv" | "nb" | "no" | "bg" | "hu", _) => {
                ('\u{a0}', Grouping::Thousands, 1)
            }
            _ => return Self { tag, ..Self::en_us() },
        };

        Self {
            tag,
            separator,
            grouping,
            min_grouping_digits,
        }
    }

    /// Rules from `LC_ALL`, `LC_NUMERIC`, or `LANG`, in that order.
    ///
    /// `C` and `POSIX` (and an unset environment) mean `en-US`.
    pub fn from_env() -> Self {
        Self::from_env_with(|key| std::env::var(key).ok())
    }

    fn from_env_with(lookup: impl Fn(&str) -> Option<String>) -> Self {
        ["LC_ALL", "LC_NUMERIC", "LANG"]
            .into_iter()
            .filter_map(|key| lookup(key))
            .find(|value| !value.is_empty())
            .filter(|value| !matches!(value.as_str(), "C" | "POSIX") && !value.starts_with("C."))
            .map(|value| Self::from_tag(&value))
            .unwrap_or_default()
    }

    /// Normalized tag, e.g. `de-DE`.
    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// Group separator character.
    pub fn separator(&self) -> char {
        self.separator
    }

    /// Format `value` as a grouped integer.
    ///
    /// `NaN` renders as `NaN` and infinities as `∞`/`-∞`. Negative values,
    /// including those that round to zero, keep their sign.
    pub fn format_integer(&self, value: f64) -> String {
        if value.is_nan() {
            return "NaN".to_owned();
        }
        let sign = if value.is_sign_negative() { "-" } else { "" };
        if value.is_infinite() {
            return format!("{sign}\u{221e}");
        }

        // `round` is half away from zero; Display prints the shortest
        // round-trip digits with no exponent.
        let digits = format!("{}", value.abs().round());
        format!("{sign}{}", self.group_digits(&digits))
    }

    fn group_digits(&self, digits: &str) -> String {
        let len = digits.len();
        if len < 3 + usize::from(self.min_grouping_digits) {
            return digits.to_owned();
        }

        // Boundaries counted from the right.
        let mut cuts = Vec::new();
        let mut pos = 3;
        while pos < len {
            cuts.push(len - pos);
            pos += match self.grouping {
                Grouping::Thousands => 3,
                Grouping::Indian => 2,
            };
        }

        let mut out = String::with_capacity(len + cuts.len() * self.separator.len_utf8());
        for (i, ch) in digits.chars().enumerate() {
            if cuts.contains(&i) {
                out.push(self.separator);
            }
            out.push(ch);
        }
        out
    }
}

/// Accept POSIX locale names: strip `.codeset` and `@modifier`, map `_` to `-`.
fn normalize_tag(tag: &str) -> String {
    let base = tag.split(['.', '@']).next().unwrap_or_default().trim();
    if base.is_empty() {
        return "en-US".to_owned();
    }
    base.replace('_', "-")
}

/// Total Value Locked: `$` followed by the grouped whole number.
pub fn format_tvl(value: f64, locale: &NumberLocale) -> String {
    format!("${}", locale.format_integer(value))
}

/// Annual Percentage Yield: one fractional digit and a spaced percent sign.
pub fn format_apy(value: f64) -> String {
    format!("{} %", to_fixed_1(value))
}

/// Fixed-point with one fractional digit.
///
/// Rounds exact ties away from zero (`0.25` → `0.3`). Magnitudes of `1e21`
/// and above switch to exponent notation; non-finite values are spelled out.
pub fn to_fixed_1(value: f64) -> String {
    if value.is_nan() {
        return "NaN".to_owned();
    }
    if value.is_infinite() {
        return if value > 0.0 { "Infinity" } else { "-Infinity" }.to_owned();
    }

    let sign = if value < 0.0 { "-" } else { "" };
    let magnitude = value.abs();

    if magnitude >= 1e21 {
        let exp = format!("{magnitude:e}");
        return format!("{sign}{}", exp.replacen('e', "e+", 1));
    }

    // A tie at one decimal means the value is k + 0.25 or k + 0.75 exactly,
    // i.e. an odd multiple of 1/4.
    let quarters = magnitude * 4.0;
    if quarters.fract() == 0.0 && quarters % 2.0 == 1.0 {
        let tenths = (magnitude * 10.0).round();
        let whole = (tenths / 10.0).trunc();
        let frac = tenths - whole * 10.0;
        return format!("{sign}{whole}.{frac}");
    }

    format!("{sign}{magnitude:.1}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn tvl_en_us() {
        let en = NumberLocale::en_us();
        assert_eq!(format_tvl(1234.0, &en), "$1,234");
        assert_eq!(format_tvl(0.0, &en), "$0");
        assert_eq!(format_tvl(999.0, &en), "$999");
        assert_eq!(format_tvl(1_234_567.4, &en), "$1,234,567");
        assert_eq!(format_tvl(1_000_000_000.0, &en), "$1,000,000,000");
    }

    #[test]
    fn tvl_rounds_half_away_from_zero() {
        let en = NumberLocale::en_us();
        assert_eq!(format_tvl(0.5, &en), "$1");
        assert_eq!(format_tvl(1233.5, &en), "$1,234");
        assert_eq!(format_tvl(-2.5, &en), "$-3");
        assert_eq!(format_tvl(-0.2, &en), "$-0");
    }

    #[test]
    fn tvl_non_finite() {
        let en = NumberLocale::en_us();
        assert_eq!(format_tvl(f64::NAN, &en), "$NaN");
        assert_eq!(format_tvl(f64::INFINITY, &en), "$\u{221e}");
        assert_eq!(format_tvl(f64::NEG_INFINITY, &en), "$-\u{221e}");
    }

    #[test]
    fn large_values_use_shortest_digits() {
        let en = NumberLocale::en_us();
        assert_eq!(en.format_integer(1e21), "1,000,000,000,000,000,000,000");
    }

    #[test]
    fn locale_separators() {
        assert_eq!(
            NumberLocale::from_tag("de-DE").format_integer(1234567.0),
            "1.234.567"
        );
        assert_eq!(
            NumberLocale::from_tag("fr-FR").format_integer(1234567.0),
            "1\u{202f}234\u{202f}567"
        );
        assert_eq!(
            NumberLocale::from_tag("de-CH").format_integer(1234.0),
            "1\u{2019}234"
        );
        assert_eq!(NumberLocale::from_tag("xx-YY").format_integer(1234.0), "1,234");
    }

    #[test]
    fn indian_grouping() {
        let locale = NumberLocale::from_tag("en-IN");
        assert_eq!(locale.format_integer(1234567.0), "12,34,567");
        assert_eq!(locale.format_integer(123.0), "123");
        assert_eq!(locale.format_integer(1234.0), "1,234");
    }

    #[test]
    fn min_grouping_digits() {
        let es = NumberLocale::from_tag("es-ES");
        assert_eq!(es.format_integer(1234.0), "1234");
        assert_eq!(es.format_integer(12345.0), "12.345");
    }

    #[test]
    fn posix_names_are_normalized() {
        assert_eq!(NumberLocale::from_tag("de_DE.UTF-8").tag(), "de-DE");
        assert_eq!(NumberLocale::from_tag("fr_FR@euro").separator(), '\u{202f}');
        assert_eq!(NumberLocale::from_tag("").tag(), "en-US");
    }

    fn env(pairs: &'static [(&'static str, &'static str)]) -> impl Fn(&str) -> Option<String> {
        move |key| {
            pairs
                .iter()
                .find(|(k, _)| *k == key)
                .map(|(_, v)| (*v).to_owned())
        }
    }

    #[test]
    fn env_precedence() {
        let locale =
            NumberLocale::from_env_with(env(&[("LC_NUMERIC", "de_DE.UTF-8"), ("LANG", "fr_FR")]));
        assert_eq!(locale.tag(), "de-DE");
        let locale = NumberLocale::from_env_with(env(&[("LC_ALL", ""), ("LANG", "fr_FR.UTF-8")]));
        assert_eq!(locale.tag(), "fr-FR");
        let locale = NumberLocale::from_env_with(env(&[("LANG", "C.UTF-8")]));
        assert_eq!(locale, NumberLocale::en_us());
        assert_eq!(NumberLocale::from_env_with(env(&[])), NumberLocale::en_us());
    }

    #[test]
    fn apy_one_decimal() {
        assert_eq!(format_apy(5.6), "5.6 %");
        assert_eq!(format_apy(0.0), "0.0 %");
        assert_eq!(format_apy(5.64), "5.6 %");
        assert_eq!(format_apy(5.66), "5.7 %");
        assert_eq!(format_apy(12.0), "12.0 %");
    }

    #[test]
    fn apy_ties_round_away_from_zero() {
        assert_eq!(to_fixed_1(0.25), "0.3");
        assert_eq!(to_fixed_1(0.75), "0.8");
        assert_eq!(to_fixed_1(2.25), "2.3");
        assert_eq!(to_fixed_1(-0.25), "-0.3");
        // Stored slightly above the tie.
        assert_eq!(to_fixed_1(1.05), "1.1");
    }

    #[test]
    fn apy_signs_and_specials() {
        assert_eq!(to_fixed_1(-0.04), "-0.0");
        assert_eq!(to_fixed_1(-0.0), "0.0");
        assert_eq!(format_apy(f64::NAN), "NaN %");
        assert_eq!(to_fixed_1(f64::INFINITY), "Infinity");
        assert_eq!(to_fixed_1(f64::NEG_INFINITY), "-Infinity");
        assert_eq!(to_fixed_1(1e21), "1e+21");
        assert_eq!(to_fixed_1(-2.5e22), "-2.5e+22");
    }

    proptest! {
        #[test]
        fn apy_has_one_fraction_digit(x in -1.0e12_f64..1.0e12) {
            let text = to_fixed_1(x);
            let (_, frac) = text.split_once('.').expect("decimal point");
            prop_assert_eq!(frac.len(), 1);
        }

        #[test]
        fn grouping_strips_back_to_rounded_value(x in 0.0_f64..1.0e15) {
            let text = NumberLocale::en_us().format_integer(x);
            let digits: String = text.chars().filter(char::is_ascii_digit).collect();
            prop_assert_eq!(digits.parse::<f64>().ok(), Some(x.round()));
        }
    }
}
