//! Transport vocabulary shared by the forms and the site configuration

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown {kind}: '{value}'")]
pub struct ParseEnumError {
    pub kind: &'static str,
    pub value: String,
}

/// Implements `as_str`, `Display` and `FromStr` from a list of wire codes
macro_rules! wire_codes {
    ($ty:ident, $kind:literal, { $($variant:ident => $code:literal),+ $(,)? }) => {
        impl $ty {
            pub const ALL: &'static [$ty] = &[$($ty::$variant),+];

            pub fn as_str(self) -> &'static str {
                match self {
                    $($ty::$variant => $code),+
                }
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $ty {
            type Err = ParseEnumError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($code => Ok($ty::$variant),)+
                    _ => Err(ParseEnumError {
                        kind: $kind,
                        value: s.to_string(),
                    }),
                }
            }
        }
    };
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Locale {
    #[serde(rename = "tc")]
    Tc,
    #[default]
    #[serde(rename = "en")]
    En,
}

wire_codes!(Locale, "locale", { Tc => "tc", En => "en" });

impl Locale {
    pub fn text(self) -> &'static str {
        match self {
            Locale::Tc => "繁體中文",
            Locale::En => "English",
        }
    }

    pub fn iso(self) -> &'static str {
        match self {
            Locale::Tc => "zh_HK",
            Locale::En => "en_US",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Company {
    Kmb,
    MtrBus,
    MtrLrt,
    MtrTrain,
    Ctb,
    Nlb,
}

wire_codes!(Company, "company", {
    Kmb => "kmb",
    MtrBus => "mtr_bus",
    MtrLrt => "mtr_lrt",
    MtrTrain => "mtr_train",
    Ctb => "ctb",
    Nlb => "nlb",
});

impl Company {
    pub fn text(self, locale: Locale) -> &'static str {
        match (locale, self) {
            (Locale::En, Company::Kmb) => "KMB",
            (Locale::En, Company::MtrBus) => "MTR (Bus)",
            (Locale::En, Company::MtrLrt) => "MTR (Light Rail)",
            (Locale::En, Company::MtrTrain) => "MTR",
            (Locale::En, Company::Ctb) => "City Bus",
            (Locale::En, Company::Nlb) => "New Lantao Bus",
            (Locale::Tc, Company::Kmb) => "九巴",
            (Locale::Tc, Company::MtrBus) => "港鐵巴士",
            (Locale::Tc, Company::MtrLrt) => "輕鐵",
            (Locale::Tc, Company::MtrTrain) => "港鐵",
            (Locale::Tc, Company::Ctb) => "城巴",
            (Locale::Tc, Company::Nlb) => "新大嶼山巴士",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Outbound,
    Inbound,
}

wire_codes!(Direction, "direction", { Outbound => "outbound", Inbound => "inbound" });

impl Direction {
    pub fn text(self, locale: Locale) -> &'static str {
        match (locale, self) {
            (Locale::Tc, Direction::Outbound) => "去程",
            (Locale::Tc, Direction::Inbound) => "回程",
            (Locale::En, Direction::Outbound) => "Outbound",
            (Locale::En, Direction::Inbound) => "Inbound",
        }
    }
}

/// How ETAs are printed on the panel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EtaFormat {
    Mixed,
    Absolute,
    Relative,
}

wire_codes!(EtaFormat, "ETA format", {
    Mixed => "mixed",
    Absolute => "absolute",
    Relative => "relative",
});
