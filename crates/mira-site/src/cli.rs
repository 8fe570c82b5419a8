use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use mira_core::{HostOs, ParsedVersion};

#[derive(Debug, Parser)]
#[command(name = "mira-site", version, about = "Mira downloads and roadmap from GitHub")]
pub struct Cli {
    /// Log debug output to stderr and the log file.
    #[arg(long, global = true)]
    pub debug: bool,

    /// Ignore fresh cache entries and fetch from GitHub.
    #[arg(long, global = true, conflicts_with = "offline")]
    pub refresh: bool,

    /// Use cached data only, however old.
    #[arg(long, global = true)]
    pub offline: bool,

    /// Keep settings, cache and logs under this directory.
    #[arg(long, global = true, value_name = "DIR")]
    pub data_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Show the download slots of the current release.
    Downloads {
        /// Consider pre-releases when choosing the release.
        #[arg(long)]
        include_prereleases: bool,

        /// Put downloads for this platform first. Defaults to this machine.
        #[arg(long, value_enum)]
        host: Option<HostArg>,

        #[arg(long)]
        json: bool,
    },
    /// Show what the roadmap lists for the next release.
    Roadmap {
        /// Treat this as the latest stable version instead of asking GitHub.
        #[arg(long, value_name = "VERSION")]
        current: Option<ParsedVersion>,

        /// List every milestone.
        #[arg(long)]
        all: bool,

        #[arg(long)]
        json: bool,
    },
    /// Print the tags assigned to release asset filenames.
    Classify {
        #[arg(required = true, value_name = "NAME")]
        names: Vec<String>,

        #[arg(long)]
        json: bool,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum HostArg {
    Windows,
    Mac,
    Linux,
    Other,
}

impl From<HostArg> for HostOs {
    fn from(host: HostArg) -> Self {
        match host {
            HostArg::Windows => HostOs::Windows,
            HostArg::Mac => HostOs::Mac,
            HostArg::Linux => HostOs::Linux,
            HostArg::Other => HostOs::Other,
        }
    }
}

#[cfg(test)]
mod tests {
    use clap::{CommandFactory, Parser};
    use mira_core::ParsedVersion;

    use super::{Cli, Command, HostArg};

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_downloads_flags() {
        let cli = Cli::try_parse_from([
            "mira-site",
            "downloads",
            "--include-prereleases",
            "--host",
            "mac",
            "--refresh",
        ])
        .expect("arguments should parse");

        assert!(cli.refresh);
        assert!(matches!(
            cli.command,
            Command::Downloads {
                include_prereleases: true,
                host: Some(HostArg::Mac),
                json: false,
            }
        ));
    }

    #[test]
    fn roadmap_current_accepts_prefixed_versions() {
        let cli = Cli::try_parse_from(["mira-site", "roadmap", "--current", "v1.2.3"])
            .expect("arguments should parse");

        let Command::Roadmap { current, .. } = cli.command else {
            panic!("expected roadmap command");
        };
        assert_eq!(current, Some(ParsedVersion::new(1, 2, 3)));
    }

    #[test]
    fn roadmap_current_rejects_partial_versions() {
        assert!(Cli::try_parse_from(["mira-site", "roadmap", "--current", "1.2"]).is_err());
    }

    #[test]
    fn refresh_and_offline_conflict() {
        assert!(Cli::try_parse_from(["mira-site", "--offline", "--refresh", "downloads"]).is_err());
    }

    #[test]
    fn classify_requires_a_name() {
        assert!(Cli::try_parse_from(["mira-site", "classify"]).is_err());
    }
}
