use bon::Builder;
use getset::Getters;
use std::fmt::{Display, Formatter};

const UNKNOWN: &str = "unknown";
const SHORT_COMMIT_LEN: usize = 7;

/// Build identification printed by `backubrr version`.
#[derive(Clone, Debug, PartialEq, Eq, Builder, Getters)]
#[getset(get = "pub")]
pub struct VersionInfo {
    #[builder(into, default = UNKNOWN)]
    version: String,
    #[builder(into, default = UNKNOWN)]
    commit: String,
    #[builder(into, default = UNKNOWN)]
    date: String,
}

impl VersionInfo {
    /// Values baked in at compile time, overridden by `BACKUBRR_VERSION`,
    /// `BACKUBRR_COMMIT` and `BACKUBRR_DATE` when set to something non-empty.
    pub fn from_env() -> Self {
        let pick = |name: &str, baked: Option<&'static str>| {
            std::env::var(name)
                .ok()
                .filter(|v| !v.is_empty())
                .or_else(|| baked.map(str::to_string))
        };
        Self::builder()
            .maybe_version(pick(
                "BACKUBRR_VERSION",
                option_env!("BACKUBRR_VERSION").or(Some(env!("CARGO_PKG_VERSION"))),
            ))
            .maybe_commit(pick("BACKUBRR_COMMIT", option_env!("BACKUBRR_COMMIT")))
            .maybe_date(pick("BACKUBRR_DATE", option_env!("BACKUBRR_DATE")))
            .build()
    }

    pub fn short_commit(&self) -> &str {
        match self.commit.char_indices().nth(SHORT_COMMIT_LEN) {
            Some((idx, _)) => &self.commit[..idx],
            None => &self.commit,
        }
    }
}

impl Display for VersionInfo {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "backubrr v{} {} {}", self.version, self.short_commit(), self.date)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_banner_truncates_commit() {
        let info = VersionInfo::builder()
            .version("1.2.3")
            .commit("0123456789abcdef")
            .date("2024-01-01")
            .build();
        assert_eq!(info.to_string(), "backubrr v1.2.3 0123456 2024-01-01");
    }

    #[test]
    fn test_short_commit_kept_whole() {
        let info = VersionInfo::builder().version("1.0.0").commit("abc").build();
        assert_eq!(info.short_commit(), "abc");
        assert_eq!(info.to_string(), "backubrr v1.0.0 abc unknown");
    }

    #[test]
    fn test_defaults_are_unknown() {
        let info = VersionInfo::builder().build();
        assert_eq!(info.to_string(), "backubrr vunknown unknown unknown");
    }
}
