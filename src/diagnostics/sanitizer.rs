// SPDX-License-Identifier: MPL-2.0
//! Message sanitization.
//!
//! Anything that leaves the privileged process (envelope messages, log lines,
//! diagnostic events) goes through [`sanitize_message`] so the host user's
//! account name never shows up in the presentation layer or in shared logs.

use std::sync::LazyLock;

use regex::Regex;

const REDACTED: &str = "[REDACTED]";

/// Home directory prefixes, capturing the account name that follows.
///
/// Account names may contain spaces (`C:\Users\John Doe`), so the name runs
/// to the next separator and never ends on whitespace.
static HOME_PATTERNS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r#"(?P<prefix>"#,
        r#"/home/"#,                  // Linux
        r#"|/Users/"#,                // macOS
        r#"|[A-Za-z]:\\Users\\"#,     // Windows, backslashes
        r#"|[A-Za-z]:/Users/"#,       // Windows, forward slashes
        r#")"#,
        r#"(?P<user>[^\s/\\"':;|,*?<>()\[\]]"#,
        r#"(?:[^/\\\r\n"':;|,*?<>()\[\]]*[^\s/\\"':;|,*?<>()\[\]])?)"#,
    ))
    .expect("home path regex should compile")
});

/// The superuser's home, which names the account by itself.
static ROOT_HOME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?P<lead>^|[\s"'(=:])/root(?P<tail>[/\s"')]|$)"#)
        .expect("root home regex should compile")
});

/// `~name` shell shorthand for another account's home.
static TILDE_USER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?P<lead>^|[\s"'(=:])~(?P<user>[A-Za-z0-9._-]+)"#)
        .expect("tilde home regex should compile")
});

/// Replaces the account segment of home directory paths with `[REDACTED]`.
///
/// The rest of the path is kept so messages stay useful for debugging.
/// A bare `~/` carries no account name and is left as is.
///
/// # Examples
///
/// ```
/// use zenconvert::diagnostics::sanitize_message;
///
/// assert_eq!(
///     sanitize_message("Failed to open /home/alice/photos/cat.jpg"),
///     "Failed to open /home/[REDACTED]/photos/cat.jpg"
/// );
/// assert_eq!(
///     sanitize_message(r"Cannot read C:\Users\bob\file.txt"),
///     r"Cannot read C:\Users\[REDACTED]\file.txt"
/// );
/// assert_eq!(sanitize_message("Invalid format"), "Invalid format");
/// ```
#[must_use]
pub fn sanitize_message(message: &str) -> String {
    let redacted = HOME_PATTERNS.replace_all(message, |caps: &regex::Captures<'_>| {
        format!("{}{REDACTED}", &caps["prefix"])
    });
    let redacted = ROOT_HOME.replace_all(&redacted, |caps: &regex::Captures<'_>| {
        format!("{}/{REDACTED}{}", &caps["lead"], &caps["tail"])
    });
    TILDE_USER
        .replace_all(&redacted, |caps: &regex::Captures<'_>| {
            format!("{}~{REDACTED}", &caps["lead"])
        })
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn redacts_linux_home() {
        assert_eq!(
            sanitize_message("/home/alice/Videos/clip.mp4 not found"),
            "/home/[REDACTED]/Videos/clip.mp4 not found"
        );
    }

    #[test]
    fn redacts_macos_home() {
        assert_eq!(
            sanitize_message("open /Users/Bob Smith"),
            "open /Users/[REDACTED]"
        );
        assert_eq!(
            sanitize_message("/Users/Bob Smith/Movies/a.mov"),
            "/Users/[REDACTED]/Movies/a.mov"
        );
        assert_eq!(
            sanitize_message("/Users/bob/Desktop/a.png"),
            "/Users/[REDACTED]/Desktop/a.png"
        );
    }

    #[test]
    fn redacts_windows_home_both_separators() {
        assert_eq!(
            sanitize_message(r"D:\Users\carol\AppData\x"),
            r"D:\Users\[REDACTED]\AppData\x"
        );
        assert_eq!(
            sanitize_message("C:/Users/carol/x"),
            "C:/Users/[REDACTED]/x"
        );
    }

    #[test]
    fn redacts_windows_account_with_spaces() {
        assert_eq!(
            sanitize_message(r"C:\Users\John Doe\Pictures\a.png is locked"),
            r"C:\Users\[REDACTED]\Pictures\a.png is locked"
        );
    }

    #[test]
    fn account_name_stops_before_trailing_words() {
        assert_eq!(
            sanitize_message("/home/eve and /tmp/x"),
            "/home/[REDACTED] /tmp/x"
        );
        assert_eq!(
            sanitize_message("cannot read /home/eve, giving up"),
            "cannot read /home/[REDACTED], giving up"
        );
    }

    #[test]
    fn redacts_root_home() {
        assert_eq!(
            sanitize_message("wrote /root/out.mp4"),
            "wrote /[REDACTED]/out.mp4"
        );
        assert_eq!(sanitize_message("cwd=/root"), "cwd=/[REDACTED]");
        let msg = "mounted /rootfs/a and /srv/root/b";
        assert_eq!(sanitize_message(msg), msg);
    }

    #[test]
    fn redacts_tilde_account_but_not_bare_tilde() {
        assert_eq!(
            sanitize_message("open ~alice/clip.mp4"),
            "open ~[REDACTED]/clip.mp4"
        );
        let msg = "open ~/clip.mp4";
        assert_eq!(sanitize_message(msg), msg);
    }

    #[test]
    fn redacts_every_occurrence() {
        let msg = "copy /home/a/x to /home/b/y";
        assert_eq!(
            sanitize_message(msg),
            "copy /home/[REDACTED]/x to /home/[REDACTED]/y"
        );
    }

    #[test]
    fn leaves_non_home_paths_alone() {
        let msg = "wrote /tmp/out.webp and /var/cache/x";
        assert_eq!(sanitize_message(msg), msg);
    }

    #[test]
    fn handles_quoted_paths() {
        assert_eq!(
            sanitize_message("\"/home/dave/a b.png\""),
            "\"/home/[REDACTED]/a b.png\""
        );
    }
}
