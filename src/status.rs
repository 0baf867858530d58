//! Canonical status values for each entity.
//!
//! Statuses are stored as text in their canonical spelling. Incoming values are
//! matched case-insensitively and a few historical spellings are accepted as
//! aliases, so `"open"` and `"Active"` both become [`CaseStatus::Active`].

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {entity} status `{value}`")]
pub struct UnknownStatus {
    pub entity: &'static str,
    pub value: String,
}

macro_rules! status_enum {
    (
        $(#[$meta:meta])*
        $name:ident, $entity:literal {
            $($variant:ident => $canonical:literal $(| $alias:literal)*),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(
                #[serde(rename = $canonical)]
                $variant,
            )+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $canonical,)+
                }
            }

            pub fn parse(raw: &str) -> Result<Self, UnknownStatus> {
                let needle = raw.trim();
                $(
                    if needle.eq_ignore_ascii_case($canonical)
                        $(|| needle.eq_ignore_ascii_case($alias))*
                    {
                        return Ok($name::$variant);
                    }
                )+
                Err(UnknownStatus {
                    entity: $entity,
                    value: raw.to_string(),
                })
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

status_enum! {
    CaseStatus, "case" {
        Active => "ACTIVE" | "open",
        Pending => "PENDING",
        Closed => "CLOSED",
        Inactive => "INACTIVE",
    }
}

status_enum! {
    ClientStatus, "client" {
        Active => "ACTIVE",
        PastClient => "PAST CLIENT" | "past_client",
    }
}

status_enum! {
    StaffStatus, "staff" {
        Working => "working",
        NotWorking => "not working" | "not_working",
    }
}

status_enum! {
    AppointmentStatus, "appointment" {
        Scheduled => "scheduled",
        Canceled => "canceled" | "cancelled",
        Completed => "completed",
    }
}

status_enum! {
    BillingStatus, "billing" {
        Paid => "Paid",
        Pending => "Pending",
        Overdue => "Overdue",
    }
}

impl CaseStatus {
    /// Whether a case in this status may be shown through client-facing endpoints.
    pub fn is_visible_to_client(self) -> bool {
        self != CaseStatus::Inactive
    }
}
