//! Argument pre-filtering so undeclared flags are ignored instead of rejected

use clap::{Arg, Command};
use std::collections::HashSet;
use std::ffi::OsString;

/// Flag names a command (plus its ancestors) understands.
#[derive(Default)]
struct KnownFlags {
    longs: HashSet<String>,
    shorts: HashSet<char>,
    // Names that take a value as the next token.
    long_values: HashSet<String>,
    short_values: HashSet<char>,
}

impl KnownFlags {
    fn extend_from(&mut self, cmd: &Command) {
        for arg in cmd.get_arguments().filter(|a| !a.is_positional()) {
            let takes_value = takes_value(arg);
            let longs = arg.get_long().into_iter().chain(arg.get_all_aliases().into_iter().flatten());
            for long in longs {
                self.longs.insert(long.to_string());
                if takes_value {
                    self.long_values.insert(long.to_string());
                }
            }
            let shorts =
                arg.get_short().into_iter().chain(arg.get_all_short_aliases().into_iter().flatten());
            for short in shorts {
                self.shorts.insert(short);
                if takes_value {
                    self.short_values.insert(short);
                }
            }
        }
    }
}

fn takes_value(arg: &Arg) -> bool {
    arg.get_action().takes_values() && arg.get_num_args().map_or(true, |n| n.min_values() > 0)
}

/// Drop flags `cmd` does not declare from `args` (binary name first).
///
/// Non-flag tokens naming a sub-command switch to that sub-command's flags;
/// values of known flags and everything after `--` pass through untouched.
/// When `cmd` has no `--config` of its own, `--config <path>` is removed too,
/// since it was already consumed by the file locator.
///
/// Only the unknown flag token itself is dropped. Its value is never consumed,
/// so `--unknown value` leaves `value` behind as a positional argument (use
/// `--unknown=value` to drop both).
pub fn filter_args(cmd: &Command, args: Vec<OsString>) -> Vec<OsString> {
    let mut cmd = cmd.clone();
    cmd.build();
    let strip_config = !declares_long(&cmd, "config");

    let mut current = &cmd;
    let mut known = KnownFlags::default();
    known.extend_from(current);

    let mut out = Vec::with_capacity(args.len());
    let mut iter = args.into_iter();
    if let Some(bin) = iter.next() {
        out.push(bin);
    }

    while let Some(arg) = iter.next() {
        let Some(text) = arg.to_str().map(str::to_owned) else {
            out.push(arg);
            continue;
        };

        if text == "--" {
            out.push(arg);
            out.extend(iter);
            break;
        }

        if let Some(long) = text.strip_prefix("--") {
            let (name, inline_value) = match long.split_once('=') {
                Some((name, _)) => (name, true),
                None => (long, false),
            };
            if strip_config && name == "config" {
                if !inline_value {
                    iter.next();
                }
                continue;
            }
            if !known.longs.contains(name) {
                tracing::trace!("Ignoring unknown flag {}", text);
                continue;
            }
            let needs_value = !inline_value && known.long_values.contains(name);
            out.push(arg);
            if needs_value {
                if let Some(value) = iter.next() {
                    out.push(value);
                }
            }
            continue;
        }

        if text.len() > 1 && text.starts_with('-') && !is_number(&text) {
            let mut chars = text[1..].chars();
            let Some(first) = chars.next() else {
                continue;
            };
            if !known.shorts.contains(&first) {
                tracing::trace!("Ignoring unknown flag {}", text);
                continue;
            }
            let needs_value = chars.next().is_none() && known.short_values.contains(&first);
            out.push(arg);
            if needs_value {
                if let Some(value) = iter.next() {
                    out.push(value);
                }
            }
            continue;
        }

        if let Some(sub) = current.find_subcommand(&text) {
            current = sub;
            known.extend_from(current);
        }
        out.push(arg);
    }

    out
}

fn declares_long(cmd: &Command, name: &str) -> bool {
    cmd.get_arguments().any(|a| a.get_long() == Some(name))
}

fn is_number(text: &str) -> bool {
    text.parse::<f64>().is_ok()
}
