//! Shared configuration and snapshot types for raidlens.
//!
//! Kept free of engine dependencies so delivery layers can depend on the
//! wire shapes without pulling in capture or decoding code.

pub mod config;
pub mod formatting;
pub mod snapshot;

pub use config::{
    AppConfig, CaptureSettings, CatalogSettings, CombatSettings, DeliverySettings,
    ReassemblySettings,
};
pub use snapshot::{
    BuffStats, BuffSummaryInfo, PersonalStats, SkillStats, TargetStats, UserBuffStats,
    UserBuffSummary,
};
