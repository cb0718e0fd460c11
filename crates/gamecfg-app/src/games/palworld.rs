//! Palworld dedicated server (`PalWorldSettings.ini`)

use std::sync::LazyLock;

use regex::Regex;

use super::{DetectionInput, GameModule};

pub const MODULE: GameModule = GameModule {
    id: "palworld",
    display_name: "Palworld",
    catalog_source: include_str!("palworld.json"),
    detect,
};

/// Content markers that identify a Palworld settings file
static CONTENT_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"/Script/Pal\.PalGameWorldSettings",
        r"OptionSettings=\(",
        r"DayTimeSpeedRate=[0-9.]+",
        r"PalCaptureRate=[0-9.]+",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("Invalid Palworld detection regex"))
    .collect()
});

const SETTINGS_FILE_NAME: &str = "palworldsettings.ini";

/// Settings common enough to confirm a guess made from the directory name
const COMMON_SETTINGS: &[&str] = &["ExpRate", "DeathPenalty", "BaseCampMaxNum"];

fn detect(input: &DetectionInput<'_>) -> bool {
    if CONTENT_PATTERNS
        .iter()
        .any(|re| re.is_match(input.content_sample))
    {
        return true;
    }

    if input.file_name.eq_ignore_ascii_case(SETTINGS_FILE_NAME) {
        return true;
    }

    // "pal" also covers "palworld"
    let dir = input.dir_name.to_lowercase();
    dir.contains("pal")
        && COMMON_SETTINGS
            .iter()
            .any(|s| input.content_sample.contains(s))
}
