/*!
# `HTMin`

In-place minification of HTML file(s).

For basic use, just toss one or more file or directory paths after the command,
like:
```bash
# Crunch one file.
htmin /path/to/one.html

# Recursively crunch every .htm(l) file in a directory.
htmin /path/to

# Do the same thing but with a progress bar.
htmin -p /path/to

# For a full list of options, run help:
htmin -h
```

Files are only rewritten if minification actually made them smaller.
*/

#![deny(unsafe_code)]

#![warn(clippy::filetype_is_file)]
#![warn(clippy::integer_division)]
#![warn(clippy::needless_borrow)]
#![warn(clippy::nursery)]
#![warn(clippy::pedantic)]
#![warn(clippy::perf)]
#![warn(clippy::suboptimal_flops)]
#![warn(clippy::unneeded_field_pattern)]
#![warn(macro_use_extern_crate)]
#![warn(missing_copy_implementations)]
#![warn(missing_debug_implementations)]
#![warn(missing_docs)]
#![warn(non_ascii_idents)]
#![warn(trivial_casts)]
#![warn(trivial_numeric_casts)]
#![warn(unreachable_pub)]
#![warn(unused_extern_crates)]
#![warn(unused_import_braces)]

#![allow(clippy::module_name_repetitions)]



mod cli;

use argyle::Argument;
use cli::CliError;
use dactyl::NiceU64;
use dowser::{
	Dowser,
	Extension,
};
use fyi_msg::{
	Msg,
	MsgKind,
	Progless,
};
use htmin::{
	Minifier,
	MinifyOptions,
};
use rayon::iter::{
	IntoParallelRefIterator,
	ParallelIterator,
};
use std::{
	path::Path,
	sync::atomic::{
		AtomicU64,
		Ordering::{
			Acquire,
			Relaxed,
		},
	},
};



// The E_HTM and E_HTML extension constants.
include!(concat!(env!("OUT_DIR"), "/htmin-extensions.rs"));



/// # Main.
fn main() {
	match main__() {
		Ok(()) => {},
		Err(e @ (CliError::PrintHelp | CliError::PrintVersion)) => {
			println!("{e}");
		},
		Err(e) => {
			Msg::error(e.as_str()).die(1);
		},
	}
}

#[inline]
/// # Actual Main.
fn main__() -> Result<(), CliError> {
	// Parse CLI arguments.
	let args = argyle::args()
		.with_keywords(include!(concat!(env!("OUT_DIR"), "/argyle.rs")));

	let mut progress = false;
	let mut opts = MinifyOptions::default();
	let mut paths = Dowser::default();
	for arg in args {
		match arg {
			Argument::Key("-h" | "--help") => return Err(CliError::PrintHelp),
			Argument::Key("-p" | "--progress") => { progress = true; },
			Argument::Key("-V" | "--version") => return Err(CliError::PrintVersion),

			Argument::Key("--keep-comments") => { opts = opts.with_remove_comments(false); },
			Argument::Key("--keep-end-tags") => { opts = opts.with_omit_end_tags(false); },
			Argument::Key("--keep-quotes") => { opts = opts.with_omit_quotes(false); },
			Argument::Key("--remove-defaults") => {
				opts = opts.with_remove_default_attributes(true);
			},
			Argument::Key("--strip-http") => { opts = opts.with_strip_http_prefix(true); },
			Argument::Key("--tight") => {
				opts = opts
					.with_remove_whitespace_around_tags(true)
					.with_remove_spaces_between_tags(true);
			},

			Argument::KeyWithValue("-l" | "--list", s) =>
				if s == "-" { paths = read_paths_from_stdin(paths)?; }
				else {
					paths.read_paths_from_file(&s).map_err(|_| CliError::ListFile)?;
				},

			// Assume paths.
			Argument::Path(s) => { paths = paths.with_path(s); },

			// Nothing else is expected.
			_ => {},
		}
	}

	// Put it all together!
	let paths = paths.into_vec_filtered(is_html);
	if paths.is_empty() { return Err(CliError::NoDocuments); }

	let minifier = Minifier::new(opts);
	let before = AtomicU64::new(0);
	let after = AtomicU64::new(0);

	// Sexy run-through.
	if progress {
		// Boot up a progress bar.
		let progress = Progless::try_from(paths.len())?
			.with_reticulating_splines("HTMin");
		let killed = progress.sigint_two_strike();

		// Process!
		paths.par_iter().for_each(|x|
			if ! killed.load(Acquire) {
				let tmp = x.to_string_lossy();
				progress.add(&tmp);
				if let Some((b, a)) = minify_file(x, &minifier) {
					before.fetch_add(b, Relaxed);
					after.fetch_add(a, Relaxed);
				}
				progress.remove(&tmp);
			}
		);

		// Finish up.
		progress.finish();
		progress.summary(MsgKind::Crunched, "document", "documents").print();

		let (before, after) = (before.into_inner(), after.into_inner());
		if after < before {
			Msg::new(MsgKind::Crunched, format!(
				"Saved {} of {} bytes.",
				NiceU64::from(before - after).as_str(),
				NiceU64::from(before).as_str(),
			))
				.with_newline(true)
				.print();
		}
	}
	else {
		paths.par_iter().for_each(|x| { let _res = minify_file(x, &minifier); });
	}

	Ok(())
}

/// # Read Paths From STDIN.
///
/// Add each (non-empty) line from STDIN to the search.
fn read_paths_from_stdin(mut paths: Dowser) -> Result<Dowser, CliError> {
	for line in std::io::stdin().lines() {
		let line = line.map_err(|_| CliError::ListFile)?;
		let line = line.trim();
		if ! line.is_empty() { paths = paths.with_path(line); }
	}
	Ok(paths)
}

#[must_use]
/// # Is HTML?
fn is_html(path: &Path) -> bool {
	Extension::try_from4(path).is_some_and(|e| e == E_HTML) ||
	Extension::try_from3(path).is_some_and(|e| e == E_HTM)
}

#[must_use]
/// # Minify File.
///
/// Minify the file in-place, returning the before and after sizes, or `None`
/// if the file could not be read or written.
fn minify_file(src: &Path, minifier: &Minifier) -> Option<(u64, u64)> {
	let raw = htmin::load_path(src).ok()?;
	let before = raw.len() as u64;

	let out = minifier.minify(&raw);
	if out.is_empty() || out == raw { return Some((before, before)); }

	write_atomic::write_file(src, out.as_bytes()).ok()?;
	Some((before, out.len() as u64))
}
