use crate::cli::GlobalFlags;

/// Row cap for a list command: `--limit` if given, else `fallback`.
#[must_use]
pub const fn row_limit(flags: &GlobalFlags, fallback: u32) -> u32 {
    match flags.limit {
        Some(limit) => limit,
        None => fallback,
    }
}

/// Keep the first `row_limit(flags, fallback)` items.
pub fn apply_limit<T>(items: &mut Vec<T>, flags: &GlobalFlags, fallback: u32) {
    let limit = row_limit(flags, fallback);
    items.truncate(usize::try_from(limit).unwrap_or(usize::MAX));
}

#[cfg(test)]
mod tests {
    use super::{apply_limit, row_limit};
    use crate::cli::{GlobalFlags, OutputFormat};

    fn flags(limit: Option<u32>) -> GlobalFlags {
        GlobalFlags {
            format: OutputFormat::Json,
            limit,
            quiet: false,
            verbose: false,
            church: None,
            user: None,
            db: None,
        }
    }

    #[test]
    fn flag_overrides_fallback() {
        assert_eq!(row_limit(&flags(Some(5)), 20), 5);
        assert_eq!(row_limit(&flags(None), 20), 20);
    }

    #[test]
    fn apply_keeps_prefix() {
        let mut items = vec![1, 2, 3];
        apply_limit(&mut items, &flags(Some(2)), 20);
        assert_eq!(items, vec![1, 2]);
        apply_limit(&mut items, &flags(None), 20);
        assert_eq!(items, vec![1, 2]);
    }
}
