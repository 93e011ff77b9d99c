//! Job inference from action names.

/// Keyword → job, checked in order. More specific keywords come before the
/// ones they contain (`expertwarrior` before `novice`).
const JOB_KEYWORDS: &[(&str, &str)] = &[
    ("expertwarrior", "Warrior"),
    ("greatsword", "Greatsword"),
    ("swordmaster", "Swordmaster"),
    ("healer", "Healer"),
    ("monk", "Monk"),
    ("priest", "Priest"),
    ("bard", "Bard"),
    ("battlemusician", "Battle Musician"),
    ("dancer", "Dancer"),
    ("fighter", "Fighter"),
    ("dualblades", "Dual Blades"),
    ("highthief", "Thief"),
    ("highmage", "Mage"),
    ("firemage", "Fire Mage"),
    ("icemage", "Ice Mage"),
    ("lightningmage", "Lightning Mage"),
    ("higharcher", "Archer"),
    ("arbalist", "Arbalist"),
    ("longbowman", "Longbowman"),
    ("novice", "Warrior"),
];

/// Shared starter actions that say nothing about the job.
const IGNORED_ACTIONS: &[&str] = &["novicewarrior_shieldbash", "defaultattack"];

/// Infer a job from an action name, case-insensitively.
pub fn job_from_action(action: &str) -> Option<&'static str> {
    let lower = action.to_lowercase();
    if IGNORED_ACTIONS.iter().any(|ignored| lower.contains(ignored)) {
        return None;
    }
    JOB_KEYWORDS
        .iter()
        .find(|(keyword, _)| lower.contains(keyword))
        .map(|(_, job)| *job)
}
