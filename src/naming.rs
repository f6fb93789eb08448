//! Storage naming scheme.
//!
//! Uploaded files are stored as `<base>_<millis><ext>`. The millisecond token
//! keeps uploads that share an original name apart and is stripped again
//! whenever a name is shown to the user.

/// A storage name taken apart into its three pieces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StorageNameParts<'a> {
    pub stem: &'a str,
    pub token: &'a str,
    pub extension: &'a str,
}

/// Result of planning a rename: the new on-disk name and what the user sees.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenameTarget {
    pub storage_name: String,
    pub display_name: String,
}

/// Split a file name into base and extension.
///
/// The extension starts at the last `.`, except when that dot opens the name
/// (`.bashrc` has no extension). A trailing dot counts as an extension of `"."`.
pub fn split_extension(name: &str) -> (&str, &str) {
    if name.bytes().all(|b| b == b'.') {
        return (name, "");
    }
    match name.rfind('.') {
        None | Some(0) => (name, ""),
        Some(i) => name.split_at(i),
    }
}

/// Longest file name, in bytes, that common filesystems accept (NAME_MAX).
pub const MAX_NAME_BYTES: usize = 255;

/// Longest prefix of `s` that is at most `max` bytes and ends on a char
/// boundary.
fn truncate_bytes(s: &str, max: usize) -> &str {
    if s.len() <= max {
        return s;
    }
    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}

/// Build the storage name. The base is shortened as needed so the result
/// stays within [`MAX_NAME_BYTES`]; the extension is only cut when it alone
/// does not fit.
pub fn make_storage_name(original_name: &str, timestamp_millis: i64) -> String {
    let (base, extension) = split_extension(original_name);
    let token = timestamp_millis.to_string();
    let budget = MAX_NAME_BYTES - 1 - token.len();
    let extension = truncate_bytes(extension, budget);
    let base = truncate_bytes(base, budget - extension.len());
    format!("{base}_{token}{extension}")
}

/// Take a storage name apart. Returns `None` when the name carries no numeric
/// token right before its extension, i.e. it was not produced by
/// [`make_storage_name`].
pub fn split_storage_name(storage_name: &str) -> Option<StorageNameParts<'_>> {
    let (base, extension) = split_extension(storage_name);
    let (stem, token) = base.rsplit_once('_')?;
    if token.is_empty() || !token.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    Some(StorageNameParts {
        stem,
        token,
        extension,
    })
}

/// The user-facing name of a stored file. Names without a token are shown
/// unchanged.
pub fn display_name_of(storage_name: &str) -> String {
    match split_storage_name(storage_name) {
        Some(parts) => format!("{}{}", parts.stem, parts.extension),
        None => storage_name.to_string(),
    }
}

/// Replace every character outside `[A-Za-z0-9-_]` with `_`.
pub fn sanitize_display_name(requested: &str) -> String {
    requested
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// Plan the rename of `current` to the user-requested name. The token and
/// extension of `current` carry over; a file without a token gets
/// `fallback_millis` as its token.
pub fn rename_target(current: &str, requested: &str, fallback_millis: i64) -> RenameTarget {
    let sanitized = sanitize_display_name(requested);
    let (token, extension) = match split_storage_name(current) {
        Some(parts) => (parts.token.to_string(), parts.extension),
        None => (fallback_millis.to_string(), split_extension(current).1),
    };
    RenameTarget {
        storage_name: format!("{sanitized}_{token}{extension}"),
        display_name: format!("{sanitized}{extension}"),
    }
}
