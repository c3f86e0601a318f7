/// Season length assumed when the catalog has no usable entry for a season.
pub const DEFAULT_SEASON_LENGTH: u32 = 12;

pub const DEFAULT_QUALITY: &str = "1080p";

/// Format used for `last_checked` in the ledger file.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub mod defaults {
    pub const START_SEASON: u32 = 1;

    pub const START_EPISODE: u32 = 1;

    pub const END_SEASON: u32 = 1;

    pub const END_EPISODE: u32 = 12;
}

pub mod limits {

    pub const LISTED_EPISODES: usize = 10;
}
