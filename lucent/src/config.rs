//! Context construction knobs.
//!
//! Three knobs exist: a list of driver workarounds to opt out of, a list of
//! extensions to forcibly disable and a log verbosity selector. Each can be
//! set through a command-line-style flag or an environment variable; when
//! both are present the explicit flag wins.

use std::env;

/// How chatty context construction is.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum LogVerbosity {
  /// Print the construction banner (renderer, version, disabled extensions,
  /// active workarounds).
  Default,
  /// Suppress the banner; errors still go through the log facade.
  Quiet,
}

/// Configuration consumed by [`Context::try_new`].
///
/// [`Context::try_new`]: crate::context::Context::try_new
#[derive(Clone, Debug)]
pub struct ContextConfig {
  /// Names of driver workarounds that must not be applied even when the
  /// fingerprint matches.
  pub disabled_workarounds: Vec<String>,
  /// Canonical names of extensions to treat as unsupported.
  pub disabled_extensions: Vec<String>,
  /// Verbosity of the construction banner.
  pub verbosity: LogVerbosity,
}

impl Default for ContextConfig {
  fn default() -> Self {
    ContextConfig {
      disabled_workarounds: Vec::new(),
      disabled_extensions: Vec::new(),
      verbosity: LogVerbosity::Default,
    }
  }
}

impl ContextConfig {
  /// An empty configuration: no disables, default verbosity.
  pub fn new() -> Self {
    Self::default()
  }

  /// Read the configuration from the environment only.
  ///
  /// Recognized variables: `LUCENT_DISABLE_WORKAROUNDS`,
  /// `LUCENT_DISABLE_EXTENSIONS` (space-separated lists) and `LUCENT_LOG`
  /// (`default` or `quiet`).
  pub fn from_env() -> Self {
    let mut config = Self::default();

    if let Ok(value) = env::var("LUCENT_DISABLE_WORKAROUNDS") {
      config.disabled_workarounds = split_list(&value);
    }

    if let Ok(value) = env::var("LUCENT_DISABLE_EXTENSIONS") {
      config.disabled_extensions = split_list(&value);
    }

    if let Ok(value) = env::var("LUCENT_LOG") {
      if let Some(verbosity) = parse_verbosity(&value) {
        config.verbosity = verbosity;
      }
    }

    config
  }

  /// Read the configuration from the environment, then let explicit
  /// command-line flags override it.
  ///
  /// Recognized flags: `--lucent-disable-workarounds <list>`,
  /// `--lucent-disable-extensions <list>` and `--lucent-log <selector>`.
  /// Unrelated arguments are ignored so the application's own flags can share
  /// the argument vector.
  pub fn from_args<I, S>(args: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
  {
    let mut config = Self::from_env();
    let mut args = args.into_iter();

    while let Some(arg) = args.next() {
      match arg.as_ref() {
        "--lucent-disable-workarounds" => {
          if let Some(value) = args.next() {
            config.disabled_workarounds = split_list(value.as_ref());
          }
        }

        "--lucent-disable-extensions" => {
          if let Some(value) = args.next() {
            config.disabled_extensions = split_list(value.as_ref());
          }
        }

        "--lucent-log" => {
          if let Some(value) = args.next() {
            if let Some(verbosity) = parse_verbosity(value.as_ref()) {
              config.verbosity = verbosity;
            }
          }
        }

        _ => (),
      }
    }

    config
  }
}

fn split_list(s: &str) -> Vec<String> {
  s.split_whitespace().map(str::to_owned).collect()
}

fn parse_verbosity(s: &str) -> Option<LogVerbosity> {
  match s {
    "default" => Some(LogVerbosity::Default),
    "quiet" => Some(LogVerbosity::Quiet),
    _ => None,
  }
}
