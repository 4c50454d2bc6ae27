use clap::{Args, Parser, Subcommand};

use crate::classify::ExtensionRule;
use crate::profile::Profile;

#[derive(Parser)]
#[command(name = "diva", about = "Edit the focused text field in an external editor")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Copy the focused window's text, edit it, and hand it back
    Edit(EditArgs),

    /// Print the extension picked for an executable and window title
    Classify {
        /// Executable name of the owning process
        #[arg(long)]
        executable: String,

        /// Window title
        #[arg(long, default_value = "")]
        title: String,

        /// Extra matching rule, checked before the built-in table
        #[arg(long = "rule", value_name = "EXE:TITLE:EXT")]
        rules: Vec<ExtensionRule>,
    },

    /// Show the focused window's identity and extension hint
    Inspect {
        /// Extra matching rule, checked before the built-in table
        #[arg(long = "rule", value_name = "EXE:TITLE:EXT")]
        rules: Vec<ExtensionRule>,
    },
}

#[derive(Args, Debug, Clone)]
pub struct EditArgs {
    /// Editor invocation, extension hinting, and trailing keys preset
    #[arg(long, value_enum, default_value_t = Profile::Prose)]
    pub profile: Profile,

    /// Editor program (must stay in the foreground until closed)
    #[arg(long)]
    pub editor: Option<String>,

    /// Editor argument placed before the file path; replaces the profile's
    #[arg(long = "editor-arg", value_name = "ARG", allow_hyphen_values = true)]
    pub editor_args: Vec<String>,

    /// Pick the temp file extension from the window
    #[arg(long, conflicts_with = "no_extension_hint")]
    pub extension_hint: bool,

    /// Always use .txt
    #[arg(long)]
    pub no_extension_hint: bool,

    /// Key sent after switching back (xdotool syntax); replaces the profile's
    #[arg(long = "paste-key", value_name = "KEY")]
    pub paste_keys: Vec<String>,

    /// Do not send any keys after switching back
    #[arg(long, conflicts_with = "paste_keys")]
    pub no_paste: bool,

    /// Delay between trailing keys, in milliseconds
    #[arg(long, default_value_t = 0)]
    pub key_delay_ms: u64,

    /// Kill the editor after this many seconds
    #[arg(long, value_name = "SECS")]
    pub editor_timeout: Option<u64>,

    /// Extra matching rule, checked before the built-in table
    #[arg(long = "rule", value_name = "EXE:TITLE:EXT")]
    pub rules: Vec<ExtensionRule>,
}
