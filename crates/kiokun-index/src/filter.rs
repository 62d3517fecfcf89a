use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use kiokun_types::{DictKind, Entry, ShardClass};
use tracing::info;

use crate::shard::shard_of;

/// Which entries a run writes, by shard class of the primary text.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum OutputMode {
    #[default]
    All,
    /// Every Han-only class (1, 2 and 3+ characters).
    HanOnly,
    Shard(ShardClass),
}

impl OutputMode {
    pub fn accepts(self, entry: &Entry) -> bool {
        match self {
            OutputMode::All => true,
            OutputMode::HanOnly => shard_of(entry) != ShardClass::NonHan,
            OutputMode::Shard(class) => shard_of(entry) == class,
        }
    }
}

impl FromStr for OutputMode {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw {
            "all" => Ok(OutputMode::All),
            "han-only" => Ok(OutputMode::HanOnly),
            "han-1char" => Ok(OutputMode::Shard(ShardClass::Han1)),
            "han-2char" => Ok(OutputMode::Shard(ShardClass::Han2)),
            "han-3plus" => Ok(OutputMode::Shard(ShardClass::Han3Plus)),
            "non-han" => Ok(OutputMode::Shard(ShardClass::NonHan)),
            other => Err(format!(
                "invalid mode {other}; expected all, han-only, han-1char, han-2char, han-3plus or non-han"
            )),
        }
    }
}

impl fmt::Display for OutputMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputMode::All => f.write_str("all"),
            OutputMode::HanOnly => f.write_str("han-only"),
            OutputMode::Shard(class) => write!(f, "{class}"),
        }
    }
}

/// Drop entries outside `mode`.
pub fn apply_mode(by_kind: &mut BTreeMap<DictKind, Vec<Entry>>, mode: OutputMode) {
    if mode == OutputMode::All {
        return;
    }
    for (kind, entries) in by_kind.iter_mut() {
        let before = entries.len();
        entries.retain(|e| mode.accepts(e));
        info!("{kind}: kept {} of {before} entries for mode {mode}", entries.len());
    }
}

/// Cut the entry set down to `limit`, keeping each dictionary's share of the
/// total. Rounding leftovers go to Kanjidic when it has entries to spare.
pub fn apply_limit(by_kind: &mut BTreeMap<DictKind, Vec<Entry>>, limit: usize) {
    let total: usize = by_kind.values().map(Vec::len).sum();
    if limit == 0 || limit >= total {
        return;
    }
    info!("limiting to {limit} of {total} entries");

    let mut quotas: BTreeMap<DictKind, usize> = by_kind
        .iter()
        .map(|(kind, entries)| (*kind, entries.len() * limit / total))
        .collect();
    let assigned: usize = quotas.values().sum();
    let remaining = limit - assigned;
    if remaining > 0
        && let Some(quota) = quotas.get_mut(&DictKind::Kanji)
        && by_kind.get(&DictKind::Kanji).map_or(0, Vec::len) > *quota
    {
        *quota += remaining;
    }

    for (kind, entries) in by_kind.iter_mut() {
        entries.truncate(quotas[kind]);
    }
}
