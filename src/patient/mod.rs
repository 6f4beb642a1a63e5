//! Patient inputs and scenario loading

mod data;
pub mod loader;

pub use data::{BiomarkerAdjustment, BiomarkerPanel, PatientProfile, Selection};
pub use loader::{
    load_profiles, load_profiles_from_reader, load_records, load_records_from_reader, PatientRecord, RowLabel,
};
