//! Free-text country names to canonical names.
//!
//! The built-in table lists every UN member and observer state (plus a
//! few widely recognised territories) under the name the metadata and
//! boundary services know it by, together with common alternative
//! spellings. Matching is exact after trimming and lower-casing: there
//! is no fuzzy or prefix matching.

use std::collections::HashMap;
use std::sync::{Arc, LazyLock};

/// Canonical name followed by its lowercase aliases.
///
/// The canonical name itself always matches (case-insensitively) and is
/// not repeated in the alias list.
const COUNTRIES: &[(&str, &[&str])] = &[
    ("Afghanistan", &[]),
    ("Albania", &[]),
    ("Algeria", &[]),
    ("Andorra", &[]),
    ("Angola", &[]),
    ("Antigua and Barbuda", &["antigua", "antigua & barbuda"]),
    ("Argentina", &[]),
    ("Armenia", &[]),
    ("Australia", &[]),
    ("Austria", &[]),
    ("Azerbaijan", &[]),
    ("Bahamas", &["the bahamas"]),
    ("Bahrain", &[]),
    ("Bangladesh", &[]),
    ("Barbados", &[]),
    ("Belarus", &[]),
    ("Belgium", &[]),
    ("Belize", &[]),
    ("Benin", &[]),
    ("Bhutan", &[]),
    ("Bolivia", &[]),
    ("Bosnia and Herzegovina", &["bosnia", "bosnia & herzegovina", "bosnia-herzegovina"]),
    ("Botswana", &[]),
    ("Brazil", &["brasil"]),
    ("Brunei", &["brunei darussalam"]),
    ("Bulgaria", &[]),
    ("Burkina Faso", &[]),
    ("Burundi", &[]),
    ("Cambodia", &[]),
    ("Cameroon", &[]),
    ("Canada", &[]),
    ("Cape Verde", &["cabo verde"]),
    ("Central African Republic", &["car"]),
    ("Chad", &[]),
    ("Chile", &[]),
    ("China", &["people's republic of china", "prc"]),
    ("Colombia", &[]),
    ("Comoros", &[]),
    ("Costa Rica", &[]),
    ("Croatia", &["hrvatska"]),
    ("Cuba", &[]),
    ("Cyprus", &[]),
    ("Czechia", &["czech republic"]),
    (
        "DR Congo",
        &[
            "democratic republic of the congo",
            "drc",
            "congo-kinshasa",
            "congo kinshasa",
        ],
    ),
    ("Denmark", &[]),
    ("Djibouti", &[]),
    ("Dominica", &[]),
    ("Dominican Republic", &[]),
    ("Ecuador", &[]),
    ("Egypt", &[]),
    ("El Salvador", &["salvador"]),
    ("Equatorial Guinea", &[]),
    ("Eritrea", &[]),
    ("Estonia", &[]),
    ("Eswatini", &["swaziland"]),
    ("Ethiopia", &[]),
    ("Fiji", &[]),
    ("Finland", &["suomi"]),
    ("France", &[]),
    ("Gabon", &[]),
    ("Gambia", &["the gambia"]),
    ("Georgia", &[]),
    ("Germany", &["deutschland"]),
    ("Ghana", &[]),
    ("Greece", &["hellas"]),
    ("Greenland", &[]),
    ("Grenada", &[]),
    ("Guatemala", &[]),
    ("Guinea", &[]),
    ("Guinea-Bissau", &["guinea bissau"]),
    ("Guyana", &[]),
    ("Haiti", &[]),
    ("Honduras", &[]),
    ("Hungary", &[]),
    ("Iceland", &[]),
    ("India", &[]),
    ("Indonesia", &[]),
    ("Iran", &["persia", "islamic republic of iran"]),
    ("Iraq", &[]),
    ("Ireland", &["republic of ireland", "eire"]),
    ("Israel", &[]),
    ("Italy", &["italia"]),
    ("Ivory Coast", &["côte d'ivoire", "cote d'ivoire", "cote divoire"]),
    ("Jamaica", &[]),
    ("Japan", &["nippon"]),
    ("Jordan", &[]),
    ("Kazakhstan", &[]),
    ("Kenya", &[]),
    ("Kiribati", &[]),
    ("Kosovo", &[]),
    ("Kuwait", &[]),
    ("Kyrgyzstan", &["kyrgyz republic"]),
    ("Laos", &["lao pdr", "lao people's democratic republic"]),
    ("Latvia", &[]),
    ("Lebanon", &[]),
    ("Lesotho", &[]),
    ("Liberia", &[]),
    ("Libya", &[]),
    ("Liechtenstein", &[]),
    ("Lithuania", &[]),
    ("Luxembourg", &[]),
    ("Madagascar", &[]),
    ("Malawi", &[]),
    ("Malaysia", &[]),
    ("Maldives", &[]),
    ("Mali", &[]),
    ("Malta", &[]),
    ("Marshall Islands", &[]),
    ("Mauritania", &[]),
    ("Mauritius", &[]),
    ("Mexico", &["méxico"]),
    ("Micronesia", &["federated states of micronesia"]),
    ("Moldova", &["republic of moldova"]),
    ("Monaco", &[]),
    ("Mongolia", &[]),
    ("Montenegro", &[]),
    ("Morocco", &[]),
    ("Mozambique", &[]),
    ("Myanmar", &["burma"]),
    ("Namibia", &[]),
    ("Nauru", &[]),
    ("Nepal", &[]),
    ("Netherlands", &["the netherlands", "holland"]),
    ("New Zealand", &["aotearoa"]),
    ("Nicaragua", &[]),
    ("Niger", &[]),
    ("Nigeria", &[]),
    ("North Korea", &["dprk", "democratic people's republic of korea"]),
    ("North Macedonia", &["macedonia"]),
    ("Norway", &["norge"]),
    ("Oman", &[]),
    ("Pakistan", &[]),
    ("Palau", &[]),
    ("Palestine", &["state of palestine"]),
    ("Panama", &[]),
    ("Papua New Guinea", &["png"]),
    ("Paraguay", &[]),
    ("Peru", &[]),
    ("Philippines", &["the philippines"]),
    ("Poland", &["polska"]),
    ("Portugal", &[]),
    ("Qatar", &[]),
    (
        "Republic of the Congo",
        &["congo", "congo-brazzaville", "congo brazzaville"],
    ),
    ("Romania", &[]),
    ("Russia", &["russian federation"]),
    ("Rwanda", &[]),
    ("Saint Kitts and Nevis", &["st kitts and nevis", "st. kitts and nevis"]),
    ("Saint Lucia", &["st lucia", "st. lucia"]),
    (
        "Saint Vincent and the Grenadines",
        &["st vincent and the grenadines", "st. vincent and the grenadines"],
    ),
    ("Samoa", &[]),
    ("San Marino", &[]),
    ("São Tomé and Príncipe", &["sao tome and principe"]),
    ("Saudi Arabia", &[]),
    ("Senegal", &[]),
    ("Serbia", &[]),
    ("Seychelles", &[]),
    ("Sierra Leone", &[]),
    ("Singapore", &[]),
    ("Slovakia", &["slovak republic"]),
    ("Slovenia", &[]),
    ("Solomon Islands", &[]),
    ("Somalia", &[]),
    ("South Africa", &["rsa"]),
    ("South Korea", &["korea", "republic of korea"]),
    ("South Sudan", &[]),
    ("Spain", &["españa", "espana"]),
    ("Sri Lanka", &["ceylon"]),
    ("Sudan", &[]),
    ("Suriname", &["surinam"]),
    ("Sweden", &["sverige"]),
    ("Switzerland", &["schweiz", "suisse"]),
    ("Syria", &["syrian arab republic"]),
    ("Taiwan", &[]),
    ("Tajikistan", &[]),
    ("Tanzania", &["united republic of tanzania"]),
    ("Thailand", &["siam"]),
    ("Timor-Leste", &["east timor", "timor leste"]),
    ("Togo", &[]),
    ("Tonga", &[]),
    ("Trinidad and Tobago", &["trinidad", "trinidad & tobago"]),
    ("Tunisia", &[]),
    ("Turkey", &["türkiye", "turkiye"]),
    ("Turkmenistan", &[]),
    ("Tuvalu", &[]),
    ("Uganda", &[]),
    ("Ukraine", &[]),
    ("United Arab Emirates", &["uae", "emirates"]),
    (
        "United Kingdom",
        &["uk", "u.k.", "great britain", "britain"],
    ),
    (
        "United States",
        &["usa", "us", "u.s.", "u.s.a.", "united states of america", "america"],
    ),
    ("Uruguay", &[]),
    ("Uzbekistan", &[]),
    ("Vanuatu", &[]),
    ("Vatican City", &["vatican", "holy see"]),
    ("Venezuela", &[]),
    ("Vietnam", &["viet nam"]),
    ("Western Sahara", &[]),
    ("Yemen", &[]),
    ("Zambia", &[]),
    ("Zimbabwe", &[]),
];

static BUILTIN: LazyLock<Arc<AliasTable>> =
    LazyLock::new(|| Arc::new(AliasTable::from_entries(COUNTRIES.iter().copied())));

/// Lookup table from lowercase alias to canonical country name.
///
/// Immutable once built.
#[derive(Debug, Clone, Default)]
pub struct AliasTable {
    aliases: HashMap<String, String>,
    canonical: Vec<String>,
}

impl AliasTable {
    /// The built-in table, shared across sessions.
    #[must_use]
    pub fn builtin() -> Arc<Self> {
        Arc::clone(&BUILTIN)
    }

    /// Build a table from `(canonical name, aliases)` entries.
    ///
    /// Each canonical name is also registered as its own alias. Aliases
    /// are lower-cased and trimmed on insertion. If two entries claim the
    /// same alias, the later one wins.
    pub fn from_entries<'a, I, A>(entries: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, A)>,
        A: IntoIterator<Item = &'a &'a str>,
    {
        let mut table = Self::default();
        for (name, aliases) in entries {
            table.canonical.push(name.to_owned());
            table.aliases.insert(normalize_key(name), name.to_owned());
            for alias in aliases {
                table.aliases.insert(normalize_key(alias), name.to_owned());
            }
        }
        table.canonical.sort();
        table
    }

    /// Resolve free-text input to a canonical country name.
    ///
    /// Surrounding whitespace and case are ignored. Returns `None` when
    /// the normalized input is not a known alias.
    #[must_use]
    pub fn canonicalize(&self, input: &str) -> Option<&str> {
        self.aliases.get(&normalize_key(input)).map(String::as_str)
    }

    /// Every canonical name, sorted.
    #[must_use]
    pub fn canonical_names(&self) -> &[String] {
        &self.canonical
    }

    /// Iterate over `(alias, canonical name)` pairs in arbitrary order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.aliases.iter().map(|(a, c)| (a.as_str(), c.as_str()))
    }

    /// Number of distinct aliases (canonical names included).
    #[must_use]
    pub fn len(&self) -> usize {
        self.aliases.len()
    }

    /// Returns `true` if the table has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.aliases.is_empty()
    }
}

/// Resolve `input` against the built-in table.
#[must_use]
pub fn canonicalize(input: &str) -> Option<&'static str> {
    BUILTIN.aliases.get(&normalize_key(input)).map(String::as_str)
}

fn normalize_key(input: &str) -> String {
    input.trim().to_lowercase()
}
