//! Configuration profiles and their command-line overrides.
//!
//! A profile bundles the three things that vary between setups: how the
//! editor is invoked, whether the temp file extension is picked from the
//! window, and which keys are sent after switching back.

use std::time::Duration;

use crate::classify::{self, ExtensionRule};
use crate::cli::EditArgs;
use crate::edit::ExternalEditor;
use crate::pipeline::PipelineConfig;

const DEFAULT_EDITOR: &str = "gvim";

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Profile {
    /// Distraction-free prose editing, syntax mode from the window, no paste
    Prose,
    /// Bare editor, always .txt, pastes the result back with ctrl+v
    Plain,
}

impl Profile {
    pub fn editor_args(self) -> &'static [&'static str] {
        match self {
            Profile::Prose => &["-f", "-c", ":Goyo", "-c", ":PencilSoft"],
            Profile::Plain => &["-f"],
        }
    }

    pub fn extension_hint(self) -> bool {
        matches!(self, Profile::Prose)
    }

    pub fn trailing_keys(self) -> &'static [&'static str] {
        match self {
            Profile::Prose => &[],
            Profile::Plain => &["ctrl+v"],
        }
    }
}

/// Everything an `edit` run needs, resolved from profile + flags.
#[derive(Debug, Clone)]
pub struct Settings {
    pub pipeline: PipelineConfig,
    pub editor: ExternalEditor,
}

impl Settings {
    pub fn resolve(args: EditArgs) -> Self {
        let profile = args.profile;

        let editor_args = if args.editor_args.is_empty() {
            to_owned(profile.editor_args())
        } else {
            args.editor_args
        };
        let editor = ExternalEditor::new(
            args.editor.unwrap_or_else(|| DEFAULT_EDITOR.to_string()),
            editor_args,
        )
        .with_timeout(args.editor_timeout.map(Duration::from_secs));

        let extension_hint = if args.extension_hint {
            true
        } else if args.no_extension_hint {
            false
        } else {
            profile.extension_hint()
        };

        let trailing_keys = if args.no_paste {
            Vec::new()
        } else if !args.paste_keys.is_empty() {
            args.paste_keys
        } else {
            to_owned(profile.trailing_keys())
        };

        Self {
            pipeline: PipelineConfig {
                rules: rule_table(args.rules),
                extension_hint,
                trailing_keys,
                key_delay: Duration::from_millis(args.key_delay_ms),
            },
            editor,
        }
    }
}

/// User rules first, then the built-in table.
pub fn rule_table(mut extra: Vec<ExtensionRule>) -> Vec<ExtensionRule> {
    extra.extend(classify::builtin_rules());
    extra
}

fn to_owned(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{Cli, Command};
    use clap::Parser;

    fn resolve(args: &[&str]) -> Settings {
        let cli = Cli::try_parse_from(
            ["diva", "edit"].into_iter().chain(args.iter().copied()),
        )
        .unwrap();
        match cli.command {
            Command::Edit(args) => Settings::resolve(args),
            _ => unreachable!(),
        }
    }

    #[test]
    fn prose_profile_defaults() {
        let s = resolve(&[]);
        assert_eq!(s.editor.program, "gvim");
        assert_eq!(s.editor.args, ["-f", "-c", ":Goyo", "-c", ":PencilSoft"]);
        assert!(s.editor.timeout.is_none());
        assert!(s.pipeline.extension_hint);
        assert!(s.pipeline.trailing_keys.is_empty());
        assert_eq!(s.pipeline.rules, classify::builtin_rules());
    }

    #[test]
    fn plain_profile_defaults() {
        let s = resolve(&["--profile", "plain"]);
        assert_eq!(s.editor.args, ["-f"]);
        assert!(!s.pipeline.extension_hint);
        assert_eq!(s.pipeline.trailing_keys, ["ctrl+v"]);
    }

    #[test]
    fn flags_override_profile() {
        let s = resolve(&[
            "--profile",
            "plain",
            "--editor",
            "kate",
            "--editor-arg",
            "--block",
            "--extension-hint",
            "--paste-key",
            "shift+Insert",
            "--key-delay-ms",
            "25",
            "--editor-timeout",
            "600",
        ]);
        assert_eq!(s.editor.program, "kate");
        assert_eq!(s.editor.args, ["--block"]);
        assert_eq!(s.editor.timeout, Some(Duration::from_secs(600)));
        assert!(s.pipeline.extension_hint);
        assert_eq!(s.pipeline.trailing_keys, ["shift+Insert"]);
        assert_eq!(s.pipeline.key_delay, Duration::from_millis(25));
    }

    #[test]
    fn no_paste_clears_profile_keys() {
        let s = resolve(&["--profile", "plain", "--no-paste"]);
        assert!(s.pipeline.trailing_keys.is_empty());
    }

    #[test]
    fn no_extension_hint_overrides_prose() {
        let s = resolve(&["--no-extension-hint"]);
        assert!(!s.pipeline.extension_hint);
    }

    #[test]
    fn user_rules_checked_first() {
        let s = resolve(&["--rule", "firefox:GitHub:.diff"]);
        assert_eq!(s.pipeline.rules.len(), 3);
        assert_eq!(
            classify::classify("firefox", "GitHub PR", &s.pipeline.rules),
            ".diff"
        );
        assert_eq!(classify::classify("firefox", "Mail", &s.pipeline.rules), ".md");
    }
}
