pub mod gear;
pub mod schools;
pub mod source;
pub mod zones;

pub use gear::{ActorGearProfile, GearCatalog, GearItem, ItemRecord, BASE_TALENT_HIT, HIT_CAP};
pub use schools::{DamageModifierSpec, SchoolCatalog, SchoolSpec};
pub use source::{
    ActorRecord, AuraTable, CombatLogSource, CombatantInfo, FightExport, FileLogSource,
    FriendlyActor, ReportExport, ReportSummary,
};
pub use zones::{Encounter, Enemy, ScanTarget, TargetSelection, TargetSelector, Zone, ZoneCatalog};
