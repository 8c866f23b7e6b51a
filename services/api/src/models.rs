//! API models for request and response payloads

use serde::{Deserialize, Serialize};

use scheduling::model::Page;

/// Generates `as_str`, `Display` and `FromStr` for a snake_case text enum
macro_rules! text_enum {
    ($ty:ident, $kind:literal, { $($variant:ident => $label:literal),+ $(,)? }) => {
        impl $ty {
            pub const ALL: &'static [$ty] = &[$($ty::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($ty::$variant => $label),+
                }
            }
        }

        impl std::fmt::Display for $ty {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $ty {
            type Err = scheduling::model::ParseEnumError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($label => Ok($ty::$variant),)+
                    other => Err(scheduling::model::ParseEnumError {
                        kind: $kind,
                        value: other.to_string(),
                    }),
                }
            }
        }
    };
}

pub(crate) use text_enum;

pub mod booking;
pub mod class_session;
pub mod course;
pub mod faq;
pub mod notification;
pub mod payment;
pub mod progress_report;
pub mod review;
pub mod user;

/// `skip` / `limit` query parameters
#[derive(Debug, Default, Deserialize)]
pub struct Pagination {
    pub skip: Option<i64>,
    pub limit: Option<i64>,
}

impl Pagination {
    pub fn page(&self) -> Page {
        Page::new(self.skip, self.limit)
    }
}

/// Response for bulk deletes
#[derive(Debug, Serialize)]
pub struct DeletedCount {
    pub deleted: u64,
}
