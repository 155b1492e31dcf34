/*!
# HTMin: Options.
*/



#[derive(Debug, Clone, Eq, PartialEq)]
/// # Minification Options.
///
/// Every optimization can be toggled independently. The defaults lean toward
/// safety; the handful of disabled-by-default switches can change rendering
/// in edge cases, or (in the case of scheme stripping) behavior on mixed
/// http/https sites.
///
/// Options are built up fluently:
///
/// ```
/// use htmin::MinifyOptions;
///
/// let opts = MinifyOptions::default()
///     .with_remove_comments(false)
///     .with_remove_default_attributes(true);
///
/// assert!(! opts.remove_comments());
/// assert!(opts.remove_default_attributes());
/// ```
pub struct MinifyOptions {
	/// # Flags.
	flags: u32,

	/// # Domains Eligible for Scheme Stripping.
	///
	/// When empty, every domain is eligible.
	http_domains: Vec<String>,
}

macro_rules! options {
	( $( $get:ident $set:ident $k:ident $v:literal $on:literal, )+ ) => (
		impl MinifyOptions {
			$(
				/// # Flag.
				const $k: u32 = $v;
			)+

			/// # Default Flags.
			const DEFAULT: u32 = 0 $( | if $on { Self::$k } else { 0 } )+;

			$(
				#[must_use]
				#[inline]
				/// # Getter.
				pub const fn $get(&self) -> bool { Self::$k == self.flags & Self::$k }

				#[must_use]
				/// # Setter.
				pub fn $set(mut self, on: bool) -> Self {
					if on { self.flags |= Self::$k; }
					else { self.flags &= ! Self::$k; }
					self
				}
			)+
		}
	);
}

options! {
	optimize_dom                  with_optimize_dom                  OPTIMIZE_DOM           0b0000_0000_0000_0000_0001 true,
	optimize_attributes           with_optimize_attributes           OPTIMIZE_ATTRIBUTES    0b0000_0000_0000_0000_0010 true,
	remove_comments               with_remove_comments               REMOVE_COMMENTS        0b0000_0000_0000_0000_0100 true,
	remove_whitespace_around_tags with_remove_whitespace_around_tags TRIM_AROUND_TAGS       0b0000_0000_0000_0000_1000 false,
	omit_quotes                   with_omit_quotes                   OMIT_QUOTES            0b0000_0000_0000_0001_0000 true,
	omit_end_tags                 with_omit_end_tags                 OMIT_END_TAGS          0b0000_0000_0000_0010_0000 true,
	strip_http_prefix             with_strip_http_prefix             STRIP_HTTP             0b0000_0000_0000_0100_0000 false,
	sort_class_names              with_sort_class_names              SORT_CLASSES           0b0000_0000_0000_1000_0000 true,
	sort_attributes               with_sort_attributes               SORT_ATTRIBUTES        0b0000_0000_0001_0000_0000 true,
	remove_script_charset         with_remove_script_charset         SCRIPT_CHARSET         0b0000_0000_0010_0000_0000 true,
	remove_default_attributes     with_remove_default_attributes     DEFAULT_ATTRIBUTES     0b0000_0000_0100_0000_0000 false,
	remove_anchor_name            with_remove_anchor_name            ANCHOR_NAME            0b0000_0000_1000_0000_0000 true,
	remove_stylesheet_type        with_remove_stylesheet_type        STYLESHEET_TYPE        0b0000_0001_0000_0000_0000 true,
	remove_script_type            with_remove_script_type            SCRIPT_TYPE            0b0000_0010_0000_0000_0000 true,
	remove_empty_input_value      with_remove_empty_input_value      EMPTY_INPUT_VALUE      0b0000_0100_0000_0000_0000 true,
	remove_empty_attributes       with_remove_empty_attributes       EMPTY_ATTRIBUTES       0b0000_1000_0000_0000_0000 true,
	sum_up_whitespace             with_sum_up_whitespace             SUM_UP_WHITESPACE      0b0001_0000_0000_0000_0000 true,
	remove_spaces_between_tags    with_remove_spaces_between_tags    SPACES_BETWEEN_TAGS    0b0010_0000_0000_0000_0000 false,
}

impl Default for MinifyOptions {
	#[inline]
	fn default() -> Self {
		Self {
			flags: Self::DEFAULT,
			http_domains: Vec::new(),
		}
	}
}

impl MinifyOptions {
	#[must_use]
	/// # With Scheme-Stripping Domains.
	///
	/// Limit `http:`/`https:` prefix stripping to links pointing at these
	/// domains (or their subdomains). An empty list, the default, permits
	/// stripping for any domain.
	///
	/// Note this has no effect unless `strip_http_prefix` is also enabled.
	pub fn with_http_domains<I, S>(mut self, domains: I) -> Self
	where I: IntoIterator<Item=S>, S: AsRef<str> {
		self.http_domains = domains.into_iter()
			.filter_map(|d| {
				let d = d.as_ref().trim().trim_matches('.').to_ascii_lowercase();
				if d.is_empty() { None }
				else { Some(d) }
			})
			.collect();
		self.http_domains.sort_unstable();
		self.http_domains.dedup();
		self
	}

	#[must_use]
	/// # Scheme-Stripping Domains.
	pub fn http_domains(&self) -> &[String] { &self.http_domains }

	#[must_use]
	/// # Strip Scheme for Host?
	///
	/// Returns `true` if links to `host` are eligible for scheme stripping.
	pub(crate) fn strip_http_for(&self, host: &str) -> bool {
		let host = host.as_bytes();
		self.http_domains.is_empty() ||
		self.http_domains.iter().any(|d| {
			let d = d.as_bytes();
			host.eq_ignore_ascii_case(d) ||
			(
				host.len() > d.len() &&
				host[host.len() - d.len() - 1] == b'.' &&
				host[host.len() - d.len()..].eq_ignore_ascii_case(d)
			)
		})
	}
}



#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn t_defaults() {
		let opts = MinifyOptions::default();
		assert!(opts.optimize_dom());
		assert!(opts.optimize_attributes());
		assert!(opts.remove_comments());
		assert!(! opts.remove_whitespace_around_tags());
		assert!(opts.omit_quotes());
		assert!(opts.omit_end_tags());
		assert!(! opts.strip_http_prefix());
		assert!(opts.sort_class_names());
		assert!(opts.sort_attributes());
		assert!(opts.remove_script_charset());
		assert!(! opts.remove_default_attributes());
		assert!(opts.remove_anchor_name());
		assert!(opts.remove_stylesheet_type());
		assert!(opts.remove_script_type());
		assert!(opts.remove_empty_input_value());
		assert!(opts.remove_empty_attributes());
		assert!(opts.sum_up_whitespace());
		assert!(! opts.remove_spaces_between_tags());
		assert!(opts.http_domains().is_empty());
	}

	#[test]
	fn t_toggle() {
		let opts = MinifyOptions::default()
			.with_remove_comments(false)
			.with_strip_http_prefix(true);
		assert!(! opts.remove_comments());
		assert!(opts.strip_http_prefix());

		// The rest should be untouched.
		assert!(opts.optimize_dom());
		assert!(opts.omit_end_tags());

		// And back again.
		let opts = opts.with_remove_comments(true);
		assert!(opts.remove_comments());
	}

	#[test]
	fn t_strip_http_for() {
		let opts = MinifyOptions::default();
		assert!(opts.strip_http_for("anything.org"));

		let opts = opts.with_http_domains([" Google.com ", "google.de", "", "google.com"]);
		assert_eq!(opts.http_domains(), &["google.com".to_owned(), "google.de".to_owned()]);

		assert!(opts.strip_http_for("google.com"));
		assert!(opts.strip_http_for("WWW.google.com"));
		assert!(opts.strip_http_for("maps.google.de"));
		assert!(! opts.strip_http_for("notgoogle.com"));
		assert!(! opts.strip_http_for("google.co.uk"));
		assert!(! opts.strip_http_for("example.com"));
	}
}
