//! SPDX-License-Identifier: MIT OR AGPL-3.0-or-later
//! Single-dash long flag compatibility
//!
//! Earlier releases took Go-style flags such as `-start` or
//! `-config=path`. Those are rewritten to their `--` form before clap
//! sees them; single-letter flags pass through as clap shorts.

use std::ffi::OsString;

/// Long flag names accepted with a single dash
const LONG_FLAGS: &[&str] = &[
    "start",
    "st",
    "status",
    "su",
    "update",
    "stop",
    "sp",
    "exit",
    "config",
    "engine",
    "verbose",
    "json",
    "yes",
    "completions",
    "help",
    "version",
];

/// Rewrite argv so single-dash long flags become double-dash ones.
///
/// Everything after a bare `--` is left untouched.
pub fn normalize<I>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = OsString>,
{
    let mut passthrough = false;

    args.into_iter()
        .enumerate()
        .map(|(index, arg)| {
            if index == 0 || passthrough {
                return arg;
            }
            if arg == "--" {
                passthrough = true;
                return arg;
            }
            match arg.to_str().and_then(rewrite) {
                Some(rewritten) => OsString::from(rewritten),
                None => arg,
            }
        })
        .collect()
}

fn rewrite(arg: &str) -> Option<String> {
    let flag = arg.strip_prefix('-')?;
    if flag.starts_with('-') {
        return None;
    }

    let name = flag.split_once('=').map_or(flag, |(name, _)| name);
    LONG_FLAGS.contains(&name).then(|| format!("-{}", arg))
}
