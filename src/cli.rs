/*!
# HTMin: CLI Errors
*/

use fyi_msg::ProglessError;
use std::{
	error::Error,
	fmt,
};



/// # Help Text.
const HELP: &str = concat!(r"
     __,---.__
  ,-'         `-.__
&/           `._\ _\
/               ''._    ", "\x1b[38;5;199mHTMin\x1b[0;38;5;69m v", env!("CARGO_PKG_VERSION"), "\x1b[0m", r#"
|   ,             (∞)   Safe, DOM-based
|__,'`-..--|__|--''     HTML minification.

USAGE:
    htmin [FLAGS] [OPTIONS] <PATH(S)>...

FLAGS:
    -h, --help          Print help information and exit.
        --keep-comments Leave regular HTML comments in place.
        --keep-end-tags Do not omit optional closing tags like </li> or </p>.
        --keep-quotes   Always quote attribute values.
    -p, --progress      Show progress bar while minifying.
        --remove-defaults
                        Drop attributes set to their default values, like
                        <form method="get">.
        --strip-http    Rewrite http(s):// links in href/src/action attributes
                        as protocol-relative //links.
        --tight         Remove whitespace around block tags and between tags.
                        This can affect rendering in some layouts.
    -V, --version       Print program version and exit.

OPTIONS:
    -l, --list <FILE>   Read (absolute) file and/or directory paths from this
                        text file, or STDIN if "-", one entry per line, instead
                        of or in addition to the trailing <PATH(S)>.

ARGS:
    <PATH(S)>...        One or more files or directories to compress.
"#);



#[expect(clippy::missing_docs_in_private_items, reason = "Self-explanatory.")]
#[derive(Debug, Copy, Clone)]
/// # CLI Error.
pub(super) enum CliError {
	ListFile,
	NoDocuments,
	Progress(ProglessError),
	PrintHelp,    // Not an error.
	PrintVersion, // Not an error.
}

impl AsRef<str> for CliError {
	#[inline]
	fn as_ref(&self) -> &str { self.as_str() }
}

impl fmt::Display for CliError {
	#[inline]
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl Error for CliError {}

impl From<ProglessError> for CliError {
	#[inline]
	fn from(src: ProglessError) -> Self { Self::Progress(src) }
}

impl CliError {
	/// # As Str.
	pub(super) const fn as_str(self) -> &'static str {
		match self {
			Self::ListFile => "The path list could not be read.",
			Self::NoDocuments => "No documents were found.",
			Self::Progress(e) => e.as_str(),
			Self::PrintHelp => HELP,
			Self::PrintVersion => concat!("HTMin v", env!("CARGO_PKG_VERSION")),
		}
	}
}
