// ww3nml/src/enums.rs

//! Closed value sets used by WW3 namelists.
//!
//! Every enum parses case-insensitively from its canonical token (plus a few
//! explicit aliases), never from prefixes or near misses, and always renders
//! and serializes the canonical token.

use crate::error::{Result, Ww3Error};
use crate::value::NmlValue;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt::Display;
use std::str::FromStr;
use strum::IntoEnumIterator;
use strum_macros::{EnumIter, EnumString, FromRepr};

/// Normalization shared by every registry enum.
pub trait Ww3Enum: Sized + Copy + Display + FromStr + IntoEnumIterator + 'static {
    /// Human readable name of the value set, used in error messages.
    const KIND: &'static str;

    /// Map a raw token onto its canonical member.
    fn normalize(raw: &str) -> Result<Self> {
        Self::from_str(raw).map_err(|_| Ww3Error::InvalidEnumValue {
            kind: Self::KIND.to_string(),
            value: raw.to_string(),
            accepted: Self::accepted(),
        })
    }

    /// Canonical tokens of every member, in declaration order.
    fn accepted() -> Vec<String> {
        Self::iter().map(|member| member.to_string()).collect()
    }

    fn token(&self) -> String {
        self.to_string()
    }
}

/// Registry enums whose WW3 representation is an integer.
pub trait IntBackedEnum: Ww3Enum {
    fn as_int(self) -> i64;

    fn from_int(value: i64) -> Result<Self> {
        Self::iter()
            .find(|member| member.as_int() == value)
            .ok_or_else(|| Ww3Error::InvalidEnumValue {
                kind: Self::KIND.to_string(),
                value: value.to_string(),
                accepted: Self::accepted(),
            })
    }
}

macro_rules! token_enum {
    ($ty:ident, $kind:expr) => {
        impl Ww3Enum for $ty {
            const KIND: &'static str = $kind;
        }

        impl Serialize for $ty {
            fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
                serializer.serialize_str(&self.to_string())
            }
        }

        impl<'de> Deserialize<'de> for $ty {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
                use serde::de::Error;
                let raw = String::deserialize(deserializer)?;
                <$ty>::normalize(&raw).map_err(D::Error::custom)
            }
        }

        impl From<$ty> for NmlValue {
            fn from(value: $ty) -> Self {
                NmlValue::Character(value.to_string())
            }
        }
    };
}

macro_rules! int_enum {
    ($ty:ident, $kind:expr) => {
        impl Ww3Enum for $ty {
            const KIND: &'static str = $kind;
        }

        impl IntBackedEnum for $ty {
            fn as_int(self) -> i64 {
                self as u8 as i64
            }
        }

        impl Serialize for $ty {
            fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
                serializer.serialize_u8(*self as u8)
            }
        }

        impl<'de> Deserialize<'de> for $ty {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
                use serde::de::Error;

                #[derive(Deserialize)]
                #[serde(untagged)]
                enum RawValue {
                    Int(i64),
                    Text(String),
                }

                match RawValue::deserialize(deserializer)? {
                    RawValue::Int(value) => <$ty>::from_int(value).map_err(D::Error::custom),
                    RawValue::Text(raw) => <$ty>::normalize(&raw).map_err(D::Error::custom),
                }
            }
        }

        impl From<$ty> for NmlValue {
            fn from(value: $ty) -> Self {
                NmlValue::Integer(value.as_int())
            }
        }

        impl TryFrom<i64> for $ty {
            type Error = Ww3Error;

            fn try_from(value: i64) -> Result<Self> {
                <$ty>::from_int(value)
            }
        }
    };
}

/// Spatial discretization (`GRID%TYPE`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, EnumString, strum_macros::Display, EnumIter)]
#[strum(ascii_case_insensitive)]
pub enum GridType {
    #[strum(serialize = "RECT")]
    Rect,
    #[strum(serialize = "CURV")]
    Curv,
    #[strum(serialize = "UNST")]
    Unst,
    #[strum(serialize = "SMC")]
    Smc,
}
token_enum!(GridType, "grid type");

/// Coordinate system (`GRID%COORD`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, EnumString, strum_macros::Display, EnumIter)]
#[strum(ascii_case_insensitive)]
pub enum CoordSystem {
    #[strum(to_string = "SPHE", serialize = "SPHERICAL", serialize = "SPHERE")]
    Spherical,
    #[strum(to_string = "CART", serialize = "CARTESIAN")]
    Cartesian,
}
token_enum!(CoordSystem, "coordinate system");

/// Grid closure (`GRID%CLOS`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, EnumString, strum_macros::Display, EnumIter)]
#[strum(ascii_case_insensitive)]
pub enum ClosureType {
    #[strum(serialize = "NONE")]
    None,
    #[strum(serialize = "SMPL")]
    Simple,
    #[strum(serialize = "TRPL")]
    Tripole,
}
token_enum!(ClosureType, "closure type");

/// Source of a forcing channel in the shell (`INPUT%FORCING%*`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, EnumString, strum_macros::Display, EnumIter, Default)]
#[strum(ascii_case_insensitive)]
pub enum ForcingFlag {
    /// Disabled
    #[default]
    #[strum(serialize = "F")]
    Disabled,
    /// Read from file
    #[strum(serialize = "T")]
    File,
    /// Homogeneous, values given in `HOMOG_INPUT_NML`
    #[strum(serialize = "H")]
    Homogeneous,
    /// Provided by an external coupler
    #[strum(serialize = "C")]
    Coupled,
}

impl Ww3Enum for ForcingFlag {
    const KIND: &'static str = "forcing flag";
}

impl ForcingFlag {
    pub fn is_enabled(self) -> bool {
        self != ForcingFlag::Disabled
    }
}

impl From<bool> for ForcingFlag {
    fn from(value: bool) -> Self {
        if value {
            ForcingFlag::File
        } else {
            ForcingFlag::Disabled
        }
    }
}

impl From<ForcingFlag> for NmlValue {
    fn from(value: ForcingFlag) -> Self {
        NmlValue::Character(value.to_string())
    }
}

impl Serialize for ForcingFlag {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for ForcingFlag {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        use serde::de::Error;

        // Booleans are accepted for the plain on/off cases
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawFlag {
            Bool(bool),
            Text(String),
        }

        match RawFlag::deserialize(deserializer)? {
            RawFlag::Bool(value) => Ok(ForcingFlag::from(value)),
            RawFlag::Text(raw) => ForcingFlag::normalize(&raw).map_err(D::Error::custom),
        }
    }
}

/// Names of homogeneous input records (`HOMOG_INPUT(n)%NAME`).
///
/// Declaration order matches the `HOMOG_COUNT_NML` variable order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, EnumString, strum_macros::Display, EnumIter)]
#[strum(ascii_case_insensitive)]
pub enum HomogName {
    #[strum(serialize = "IC1")]
    Ic1,
    #[strum(serialize = "IC2")]
    Ic2,
    #[strum(serialize = "IC3")]
    Ic3,
    #[strum(serialize = "IC4")]
    Ic4,
    #[strum(serialize = "IC5")]
    Ic5,
    #[strum(serialize = "MDN")]
    Mdn,
    #[strum(serialize = "MTH")]
    Mth,
    #[strum(serialize = "MVS")]
    Mvs,
    #[strum(serialize = "LEV")]
    Lev,
    #[strum(serialize = "CUR")]
    Cur,
    #[strum(serialize = "WND")]
    Wnd,
    #[strum(serialize = "ICE")]
    Ice,
    #[strum(serialize = "TAU")]
    Tau,
    #[strum(serialize = "RHO")]
    Rho,
    #[strum(serialize = "MOV")]
    Mov,
}
token_enum!(HomogName, "homogeneous input name");

impl HomogName {
    /// Number of `VALUEn` entries a homogeneous record of this kind needs.
    pub fn required_values(self) -> usize {
        match self {
            // speed, direction, air-sea temperature difference
            HomogName::Wnd => 3,
            // speed and direction
            HomogName::Cur | HomogName::Tau | HomogName::Mov => 2,
            _ => 1,
        }
    }

    /// Variable name in `HOMOG_COUNT_NML`, e.g. `N_WND`.
    pub fn count_field(self) -> String {
        format!("N_{}", self)
    }
}

/// Forcing fields known to the shell and to the forcing preprocessor.
///
/// Declaration order is the order fields are rendered in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, EnumString, strum_macros::Display, EnumIter)]
#[strum(ascii_case_insensitive)]
pub enum ForcingChannel {
    #[strum(serialize = "ICE_PARAM1")]
    IceParam1,
    #[strum(serialize = "ICE_PARAM2")]
    IceParam2,
    #[strum(serialize = "ICE_PARAM3")]
    IceParam3,
    #[strum(serialize = "ICE_PARAM4")]
    IceParam4,
    #[strum(serialize = "ICE_PARAM5")]
    IceParam5,
    #[strum(serialize = "MUD_DENSITY")]
    MudDensity,
    #[strum(serialize = "MUD_THICKNESS")]
    MudThickness,
    #[strum(serialize = "MUD_VISCOSITY")]
    MudViscosity,
    #[strum(serialize = "WATER_LEVELS")]
    WaterLevels,
    #[strum(serialize = "CURRENTS")]
    Currents,
    #[strum(serialize = "WINDS")]
    Winds,
    #[strum(serialize = "WINDS_AST")]
    WindsAst,
    #[strum(serialize = "ICE_CONC")]
    IceConc,
    #[strum(serialize = "ICE_BERG")]
    IceBerg,
    #[strum(serialize = "ATM_MOMENTUM")]
    AtmMomentum,
    #[strum(serialize = "AIR_DENSITY")]
    AirDensity,
    #[strum(serialize = "DATA_ASSIM")]
    DataAssim,
}
token_enum!(ForcingChannel, "forcing channel");

impl ForcingChannel {
    /// Homogeneous input record feeding this channel, if the shell supports one.
    pub fn homog_name(self) -> Option<HomogName> {
        match self {
            ForcingChannel::IceParam1 => Some(HomogName::Ic1),
            ForcingChannel::IceParam2 => Some(HomogName::Ic2),
            ForcingChannel::IceParam3 => Some(HomogName::Ic3),
            ForcingChannel::IceParam4 => Some(HomogName::Ic4),
            ForcingChannel::IceParam5 => Some(HomogName::Ic5),
            ForcingChannel::MudDensity => Some(HomogName::Mdn),
            ForcingChannel::MudThickness => Some(HomogName::Mth),
            ForcingChannel::MudViscosity => Some(HomogName::Mvs),
            ForcingChannel::WaterLevels => Some(HomogName::Lev),
            ForcingChannel::Currents => Some(HomogName::Cur),
            ForcingChannel::Winds => Some(HomogName::Wnd),
            ForcingChannel::IceConc => Some(HomogName::Ice),
            ForcingChannel::AtmMomentum => Some(HomogName::Tau),
            ForcingChannel::AirDensity => Some(HomogName::Rho),
            ForcingChannel::WindsAst | ForcingChannel::IceBerg | ForcingChannel::DataAssim => None,
        }
    }

    /// Whether the shell reads this channel through `INPUT%FORCING`.
    pub fn is_shell_input(self) -> bool {
        self.homog_name().is_some()
    }

    /// Vector fields need two variables (`FILE%VAR(1)` and `FILE%VAR(2)`).
    pub fn is_vector(self) -> bool {
        matches!(
            self,
            ForcingChannel::Currents
                | ForcingChannel::Winds
                | ForcingChannel::WindsAst
                | ForcingChannel::AtmMomentum
        )
    }
}

/// Output families with their own output date window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, EnumString, strum_macros::Display, EnumIter)]
#[strum(ascii_case_insensitive)]
pub enum OutputKind {
    #[strum(serialize = "FIELD")]
    Field,
    #[strum(serialize = "POINT")]
    Point,
    #[strum(serialize = "TRACK")]
    Track,
    #[strum(serialize = "RESTART")]
    Restart,
    #[strum(serialize = "RESTART2")]
    Restart2,
    #[strum(serialize = "BOUNDARY")]
    Boundary,
    #[strum(serialize = "PARTITION")]
    Partition,
    #[strum(serialize = "COUPLING")]
    Coupling,
}
token_enum!(OutputKind, "output kind");

/// Restart update method (`UPDATE%UPDPROC`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, EnumString, strum_macros::Display, EnumIter)]
#[strum(ascii_case_insensitive)]
pub enum UpdateMethod {
    #[strum(serialize = "UPD0F")]
    Upd0f,
    #[strum(serialize = "UPD1")]
    Upd1,
    #[strum(serialize = "UPD2")]
    Upd2,
    #[strum(serialize = "UPD3")]
    Upd3,
    #[strum(serialize = "UPD4")]
    Upd4,
    #[strum(serialize = "UPD5")]
    Upd5,
    #[strum(serialize = "UPD6")]
    Upd6,
}
token_enum!(UpdateMethod, "update method");

impl UpdateMethod {
    /// Methods driven by an analysis file.
    pub fn needs_file(self) -> bool {
        !matches!(self, UpdateMethod::Upd0f | UpdateMethod::Upd1)
    }
}

/// Boundary preprocessor direction (`BOUND%MODE`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, EnumString, strum_macros::Display, EnumIter)]
#[strum(ascii_case_insensitive)]
pub enum BoundMode {
    #[strum(serialize = "READ")]
    Read,
    #[strum(serialize = "WRITE")]
    Write,
}
token_enum!(BoundMode, "boundary mode");

/// Output server style (`DOMAIN%IOSTYP`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, EnumString, strum_macros::Display, EnumIter, FromRepr)]
#[repr(u8)]
pub enum OutputServer {
    /// No data server processes, direct access output from each process
    #[strum(serialize = "0")]
    DirectAccess = 0,
    /// No data server processes, all output from one process
    #[strum(serialize = "1")]
    SingleProcess = 1,
    /// Last process is a dedicated output server
    #[strum(serialize = "2")]
    DedicatedLast = 2,
    /// Multiple dedicated output processes
    #[strum(serialize = "3")]
    MultipleDedicated = 3,
}
int_enum!(OutputServer, "output server style");

/// Layout indicator for gridded input files (`IDLA`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, EnumString, strum_macros::Display, EnumIter, FromRepr)]
#[repr(u8)]
pub enum LayoutIndicator {
    /// Read line by line bottom to top
    #[strum(serialize = "1")]
    BottomToTop = 1,
    /// Like 1, single read statement
    #[strum(serialize = "2")]
    BottomToTopSingle = 2,
    /// Read line by line top to bottom
    #[strum(serialize = "3")]
    TopToBottom = 3,
    /// Like 3, single read statement
    #[strum(serialize = "4")]
    TopToBottomSingle = 4,
}
int_enum!(LayoutIndicator, "layout indicator");

/// Format indicator for gridded input files (`IDFM`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, EnumString, strum_macros::Display, EnumIter, FromRepr)]
#[repr(u8)]
pub enum FormatIndicator {
    #[strum(serialize = "1")]
    FreeFormat = 1,
    /// Fixed format given by `FORMAT`
    #[strum(serialize = "2")]
    Formatted = 2,
    #[strum(serialize = "3")]
    Unformatted = 3,
}
int_enum!(FormatIndicator, "format indicator");

/// NetCDF flavour written by the output postprocessors (`FILE%NETCDF`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, EnumString, strum_macros::Display, EnumIter, FromRepr)]
#[repr(u8)]
pub enum NetcdfVersion {
    #[strum(serialize = "3")]
    Netcdf3 = 3,
    #[strum(serialize = "4")]
    Netcdf4 = 4,
}
int_enum!(NetcdfVersion, "netcdf version");
