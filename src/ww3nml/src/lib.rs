// ww3nml/src/lib.rs

//! Validated WAVEWATCH III namelists.
//!
//! Blocks are built from plain Rust values or deserialized from
//! configuration files, validated on the way in, composed per program and
//! rendered to the fixed `&GROUP_NML ... /` text WW3 reads.
//!
//! ```
//! use ww3nml::{Domain, Namelist, OutputServer};
//!
//! let domain = Domain {
//!     start: Some("20230101 000000".parse().unwrap()),
//!     stop: Some("2023-01-02 00:00:00".parse().unwrap()),
//!     iostyp: Some(OutputServer::SingleProcess),
//!     ..Default::default()
//! }
//! .validated()
//! .unwrap();
//!
//! assert!(domain.render().contains("DOMAIN%STOP = '20230102 000000'"));
//! ```

pub mod blocks;
pub mod composition;
pub mod enums;
pub mod error;
pub mod fingerprint;
pub mod group;
pub mod source;
pub mod validators;
pub mod value;

pub use blocks::*;
pub use composition::{Composition, WriteManifest, WrittenFile};
pub use enums::{
    BoundMode, ClosureType, CoordSystem, ForcingChannel, ForcingFlag, FormatIndicator, GridType,
    HomogName, IntBackedEnum, LayoutIndicator, NetcdfVersion, OutputKind, OutputServer,
    UpdateMethod, Ww3Enum,
};
pub use error::{ConsistencyFinding, DateFormatError, Result, Ww3Error};
pub use group::NamelistGroup;
pub use source::SourceRef;
pub use validators::{normalize_datestamp, validate_date_format, validate_stride, Ww3Date};
pub use value::NmlValue;
