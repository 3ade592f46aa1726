//! Request options accepted by the Sheets values endpoints.
//!
//! See <https://developers.google.com/sheets/api/reference/rest/v4/spreadsheets.values/batchGet#query-parameters>.

use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

macro_rules! api_option {
    (
        $(#[$meta:meta])*
        $name:ident, default = $default:ident, { $($variant:ident => $wire:literal),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(
                #[serde(rename = $wire)]
                $variant,
            )+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $wire,)+
                }
            }
        }

        impl Default for $name {
            fn default() -> Self {
                $name::$default
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim() {
                    $($wire => Ok($name::$variant),)+
                    other => Err(format!(
                        "invalid value `{}`, should be one of [{}]",
                        other,
                        $name::ALL
                            .iter()
                            .map(|v| format!("`{}`", v.as_str()))
                            .collect::<Vec<_>>()
                            .join(", ")
                    )),
                }
            }
        }
    };
}

api_option!(
    /// How dates, times and durations are rendered in read responses.
    DateTimeRenderOption, default = FormattedString, {
        SerialNumber => "SERIAL_NUMBER",
        FormattedString => "FORMATTED_STRING",
    }
);

api_option!(
    /// How cell values are rendered in read responses.
    ValueRenderOption, default = FormattedValue, {
        FormattedValue => "FORMATTED_VALUE",
        UnformattedValue => "UNFORMATTED_VALUE",
        Formula => "FORMULA",
    }
);

api_option!(
    /// How written values are interpreted by the sheet.
    ValueInputOption, default = UserEntered, {
        Raw => "RAW",
        UserEntered => "USER_ENTERED",
    }
);

api_option!(
    MajorDimension, default = Rows, {
        Rows => "ROWS",
        Columns => "COLUMNS",
    }
);

api_option!(
    /// How appended data changes the existing sheet layout.
    InsertDataOption, default = InsertRows, {
        Overwrite => "OVERWRITE",
        InsertRows => "INSERT_ROWS",
    }
);
