//! I/O error hints.
//! Maps the common raw OS codes to a short actionable suffix for logs and
//! per-entry failure reasons.

use std::io;

/// A one-line hint for `e`, or None when there is nothing useful to add.
pub fn io_hint(e: &io::Error) -> Option<&'static str> {
    if let Some(code) = e.raw_os_error() {
        #[cfg(unix)]
        {
            return match code {
                c if c == libc::EACCES || c == libc::EPERM => {
                    Some("permission denied; check ownership and write permissions")
                }
                c if c == libc::EXDEV => Some("cross-filesystem; atomic rename not possible"),
                c if c == libc::ENOENT => Some("path not found; verify it exists"),
                c if c == libc::EEXIST => Some("already exists; remove the target or change the pattern"),
                c if c == libc::ENOSPC => Some("insufficient space on device"),
                c if c == libc::EROFS => Some("read-only filesystem; cannot write here"),
                c if c == libc::ENAMETOOLONG => Some("path too long; shorten pattern segments"),
                _ => None,
            };
        }
        #[cfg(windows)]
        {
            return match code {
                5 => Some("access denied; check permissions"),
                17 => Some("not same device; cross-filesystem move"),
                32 => Some("sharing violation; file is in use"),
                2 | 3 => Some("path not found; verify it exists"),
                80 => Some("already exists; remove the target or change the pattern"),
                112 => Some("insufficient disk space"),
                206 => Some("path too long; shorten pattern segments"),
                _ => None,
            };
        }
        #[cfg(not(any(unix, windows)))]
        {
            let _ = code;
        }
    }

    match e.kind() {
        io::ErrorKind::PermissionDenied => {
            Some("permission denied; check ownership and write permissions")
        }
        io::ErrorKind::NotFound => Some("path not found; verify it exists"),
        io::ErrorKind::AlreadyExists => {
            Some("already exists; remove the target or change the pattern")
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_fallback_covers_not_found() {
        let e = io::Error::new(io::ErrorKind::NotFound, "gone");
        assert_eq!(io_hint(&e), Some("path not found; verify it exists"));
    }

    #[test]
    fn unknown_errors_have_no_hint() {
        let e = io::Error::new(io::ErrorKind::Other, "mystery");
        assert_eq!(io_hint(&e), None);
    }
}
