use std::collections::BTreeMap;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::domain::variables::SellerRegion;
use crate::errors::CalcError;

/// Per-country tax profile.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CountryProfile {
    pub vat_pct: Decimal,
    /// Whether supplier quotes from this country already exclude VAT. When
    /// false, the VAT-removal step strips `vat_pct` from the quoted price.
    pub price_includes_vat: bool,
}

/// Injectable country/region rate tables: VAT by supplier country and the
/// internal markup matrix keyed by (supplier country, seller region).
/// Resolved per product line, so multi-supplier quotes look up per line.
#[derive(Clone, Debug, PartialEq)]
pub struct RateBook {
    countries: BTreeMap<String, CountryProfile>,
    internal_markup: BTreeMap<SellerRegion, RegionMarkup>,
}

#[derive(Clone, Debug, Default, PartialEq)]
struct RegionMarkup {
    by_country: BTreeMap<String, Decimal>,
    default_pct: Option<Decimal>,
}

/// Markup applied when neither a country row nor a region default exists.
const FALLBACK_MARKUP_PCT: Decimal = dec!(5);

impl Default for RateBook {
    fn default() -> Self {
        let mut countries = BTreeMap::new();
        countries.insert(
            "russia".to_string(),
            CountryProfile { vat_pct: dec!(20), price_includes_vat: true },
        );
        countries.insert(
            "turkey".to_string(),
            CountryProfile { vat_pct: dec!(20), price_includes_vat: true },
        );
        countries.insert(
            "lithuania".to_string(),
            CountryProfile { vat_pct: dec!(21), price_includes_vat: true },
        );
        countries.insert(
            "kazakhstan".to_string(),
            CountryProfile { vat_pct: dec!(12), price_includes_vat: true },
        );
        // China quotes are VAT-exclusive; the removal step is a no-op there.
        countries.insert(
            "china".to_string(),
            CountryProfile { vat_pct: dec!(13), price_includes_vat: false },
        );

        let mut internal_markup = BTreeMap::new();
        let mut russia = RegionMarkup { by_country: BTreeMap::new(), default_pct: Some(dec!(5)) };
        russia.by_country.insert("china".to_string(), dec!(7));
        russia.by_country.insert("turkey".to_string(), dec!(5));
        internal_markup.insert(SellerRegion::Russia, russia);

        let mut turkey = RegionMarkup { by_country: BTreeMap::new(), default_pct: Some(dec!(3)) };
        turkey.by_country.insert("china".to_string(), dec!(5));
        internal_markup.insert(SellerRegion::Turkey, turkey);

        Self { countries, internal_markup }
    }
}

impl RateBook {
    /// Looks up a supplier country's tax profile. Unknown countries are a
    /// configuration error, never a silent default.
    pub fn country(&self, name: &str) -> Result<&CountryProfile, CalcError> {
        let key = normalise(name);
        self.countries.get(&key).ok_or_else(|| {
            CalcError::unsupported(format!("supplier country `{name}` has no rate-book entry"))
        })
    }

    pub fn vat_pct(&self, country: &str) -> Result<Decimal, CalcError> {
        self.country(country).map(|profile| profile.vat_pct)
    }

    /// Internal markup for a (supplier country, seller region) pair.
    pub fn internal_markup_pct(&self, country: &str, region: SellerRegion) -> Decimal {
        let key = normalise(country);
        let Some(markup) = self.internal_markup.get(&region) else {
            return FALLBACK_MARKUP_PCT;
        };
        markup
            .by_country
            .get(&key)
            .copied()
            .or(markup.default_pct)
            .unwrap_or(FALLBACK_MARKUP_PCT)
    }

    /// VAT rate of the seller region's own country, used for the DDP
    /// gross-up on the client-facing price.
    pub fn seller_vat_pct(&self, region: SellerRegion) -> Result<Decimal, CalcError> {
        self.vat_pct(region.country_key())
    }

    /// Merges a TOML patch over the current book. Patched countries replace
    /// existing rows wholesale; untouched rows survive.
    pub fn merge_toml_str(&mut self, raw: &str) -> Result<(), CalcError> {
        let patch: RateBookPatch = toml::from_str(raw)
            .map_err(|error| CalcError::invalid_input(None, "rate_book", error.to_string()))?;

        for (country, profile) in patch.countries {
            if profile.vat_pct < Decimal::ZERO {
                return Err(CalcError::invalid_input(
                    None,
                    "rate_book",
                    format!("vat_pct for `{country}` must be non-negative"),
                ));
            }
            self.countries.insert(normalise(&country), profile);
        }

        for (region_name, rows) in patch.internal_markup {
            let region: SellerRegion = region_name.parse()?;
            let markup = self.internal_markup.entry(region).or_default();
            for (country, pct) in rows {
                if pct < Decimal::ZERO {
                    return Err(CalcError::invalid_input(
                        None,
                        "rate_book",
                        format!("internal markup for `{country}` must be non-negative"),
                    ));
                }
                if country == "default" {
                    markup.default_pct = Some(pct);
                } else {
                    markup.by_country.insert(normalise(&country), pct);
                }
            }
        }

        Ok(())
    }

    pub fn from_toml_str(raw: &str) -> Result<Self, CalcError> {
        let mut book = Self::default();
        book.merge_toml_str(raw)?;
        Ok(book)
    }

    /// Effective country rows, for display by the calling layer.
    pub fn countries(&self) -> impl Iterator<Item = (&str, &CountryProfile)> {
        self.countries.iter().map(|(name, profile)| (name.as_str(), profile))
    }

    /// Effective markup rows: `(region, country or None for the region
    /// default, pct)`. Display only; lookups go through
    /// [`Self::internal_markup_pct`].
    pub fn internal_markups(
        &self,
    ) -> impl Iterator<Item = (SellerRegion, Option<&str>, Decimal)> + '_ {
        self.internal_markup.iter().flat_map(|(region, markup)| {
            let region = *region;
            markup.default_pct.map(move |pct| (region, None, pct)).into_iter().chain(
                markup
                    .by_country
                    .iter()
                    .map(move |(country, pct)| (region, Some(country.as_str()), *pct)),
            )
        })
    }
}

fn normalise(name: &str) -> String {
    name.trim().to_lowercase()
}

#[derive(Debug, Default, Deserialize)]
struct RateBookPatch {
    #[serde(default)]
    countries: BTreeMap<String, CountryProfile>,
    /// region -> country (or "default") -> markup pct
    #[serde(default)]
    internal_markup: BTreeMap<String, BTreeMap<String, Decimal>>,
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use crate::domain::variables::SellerRegion;
    use crate::errors::CalcError;

    use super::RateBook;

    #[test]
    fn default_book_strips_vat_everywhere_but_china() {
        let book = RateBook::default();
        assert!(book.country("Turkey").unwrap().price_includes_vat);
        assert!(!book.country("China").unwrap().price_includes_vat);
        assert_eq!(book.vat_pct("turkey").unwrap(), dec!(20));
        assert_eq!(book.vat_pct("china").unwrap(), dec!(13));
        assert_eq!(book.vat_pct("lithuania").unwrap(), dec!(21));
    }

    #[test]
    fn unknown_country_is_unsupported_configuration() {
        let book = RateBook::default();
        let error = book.country("Atlantis").unwrap_err();
        assert!(matches!(error, CalcError::UnsupportedConfiguration { .. }));
    }

    #[test]
    fn markup_resolves_country_then_region_default() {
        let book = RateBook::default();
        assert_eq!(book.internal_markup_pct("China", SellerRegion::Russia), dec!(7));
        assert_eq!(book.internal_markup_pct("Lithuania", SellerRegion::Russia), dec!(5));
    }

    #[test]
    fn toml_patch_overrides_and_extends_defaults() {
        let book = RateBook::from_toml_str(
            r#"
[countries.germany]
vat_pct = 19
price_includes_vat = true

[countries.china]
vat_pct = 13
price_includes_vat = true

[internal_markup.russia]
germany = 4
default = 6
"#,
        )
        .expect("patch applies");

        assert_eq!(book.vat_pct("Germany").unwrap(), dec!(19));
        // Patched row replaces the built-in China profile.
        assert!(book.country("china").unwrap().price_includes_vat);
        assert_eq!(book.internal_markup_pct("germany", SellerRegion::Russia), dec!(4));
        assert_eq!(book.internal_markup_pct("lithuania", SellerRegion::Russia), dec!(6));
        // Untouched region keeps its defaults.
        assert_eq!(book.internal_markup_pct("china", SellerRegion::Turkey), dec!(5));
    }

    #[test]
    fn negative_rates_in_patch_are_rejected() {
        let error = RateBook::from_toml_str(
            "[countries.france]\nvat_pct = -1\nprice_includes_vat = true\n",
        )
        .unwrap_err();
        assert!(matches!(error, CalcError::InvalidInput { field: "rate_book", .. }));
    }
}
