//! variables.rs: run parameters with explicit wire tokens and safe defaults.

use core::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::CoreError;
use crate::numeric::DEFAULT_EPSILON;

/// Define a serde'd enum with explicit wire tokens plus `FromStr` / `as_str`.
macro_rules! serde_enum {
    ($name:ident => { $($variant:ident = $token:expr),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
        pub enum $name {
            $(
                #[serde(rename = $token)]
                $variant,
            )+
        }

        impl $name {
            pub fn as_str(self) -> &'static str {
                match self {
                    $( $name::$variant => $token, )+
                }
            }
        }

        impl FromStr for $name {
            type Err = CoreError;
            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $( $token => Ok($name::$variant), )+
                    other => Err(CoreError::UnknownToken {
                        name: stringify!($name),
                        token: other.to_string(),
                    }),
                }
            }
        }
    };
}

serde_enum!(AllocationVariant => {
    Balanced   = "balanced",
    RoundRobin = "round_robin"
});

serde_enum!(CorrectionMode => {
    Iterative  = "iterative",
    SingleUnit = "single_unit"
});

/// Fixed round-up threshold of the balanced variant (moderate remainders round up).
pub const DEFAULT_ROUND_UP_THRESHOLD: f64 = 0.4;

/// Run parameters. Every field has a default, so `{}` is a valid parameter file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Params {
    pub variant: AllocationVariant,
    pub correction: CorrectionMode,
    /// Tolerance for target classification and remainder comparisons.
    pub epsilon: f64,
    pub round_up_threshold: f64,
    /// When true, the balanced MULTI path also serves groups whose weights are all zero.
    pub allocate_unweighted_groups: bool,
}

impl Default for Params {
    fn default() -> Self {
        Self {
            variant: AllocationVariant::Balanced,
            correction: CorrectionMode::Iterative,
            epsilon: DEFAULT_EPSILON,
            round_up_threshold: DEFAULT_ROUND_UP_THRESHOLD,
            allocate_unweighted_groups: false,
        }
    }
}

impl Params {
    /// Domain checks: `0 < epsilon <= 0.01`, `0 < round_up_threshold < 1`.
    pub fn validate(&self) -> Result<(), CoreError> {
        if !(self.epsilon > 0.0 && self.epsilon <= 0.01) {
            return Err(CoreError::DomainOutOfRange { name: "epsilon", value: self.epsilon });
        }
        if !(self.round_up_threshold > 0.0 && self.round_up_threshold < 1.0) {
            return Err(CoreError::DomainOutOfRange {
                name: "round_up_threshold",
                value: self.round_up_threshold,
            });
        }
        Ok(())
    }
}
