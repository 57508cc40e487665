use clap::{Parser, Subcommand};

/// `cvrchat` - command-line client for the CVRGPT company-research API.
#[derive(Parser, Debug)]
#[command(name = "cvrchat")]
#[command(version = "0.1.0")]
#[command(about = "Search Danish companies and chat about them.", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Chat about Danish companies (interactive unless --message is given)
    Chat {
        /// Single message mode (don't enter the interactive loop)
        #[arg(short, long)]
        message: Option<String>,

        /// CVR hint forwarded with every turn
        #[arg(long)]
        cvr: Option<String>,

        /// Year hint forwarded with every turn (repeatable)
        #[arg(long = "year")]
        years: Vec<u16>,
    },

    /// Search companies by name or CVR
    Search {
        /// Name fragment or CVR (at least 2 characters)
        query: String,

        #[arg(short, long, default_value_t = 10)]
        limit: u32,
    },

    /// Show a company profile
    Company {
        cvr: String,

        /// Previously seen ETag; prints "not modified" when still current
        #[arg(long)]
        etag: Option<String>,
    },

    /// Year-over-year comparison of key financial metrics
    Compare {
        cvr: String,

        /// Also save the server's comparison CSV to the current directory
        #[arg(long)]
        export: bool,
    },

    /// List recent filings
    Filings {
        cvr: String,

        #[arg(short, long, default_value_t = 10)]
        limit: u32,
    },

    /// Latest accounts snapshot
    Accounts { cvr: String },

    /// Download a chat thread as CSV
    Export { thread_id: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_chat_with_hints() {
        let cli = Cli::try_parse_from([
            "cvrchat", "chat", "--cvr", "12345678", "--year", "2022", "--year", "2023",
        ])
        .unwrap();
        let Commands::Chat { message, cvr, years } = cli.command else {
            panic!("expected chat command");
        };
        assert!(message.is_none());
        assert_eq!(cvr.as_deref(), Some("12345678"));
        assert_eq!(years, vec![2022, 2023]);
    }

    #[test]
    fn parses_search_with_default_limit() {
        let cli = Cli::try_parse_from(["cvrchat", "search", "maersk"]).unwrap();
        let Commands::Search { query, limit } = cli.command else {
            panic!("expected search command");
        };
        assert_eq!(query, "maersk");
        assert_eq!(limit, 10);
    }

    #[test]
    fn parses_compare_export_flag() {
        let cli = Cli::try_parse_from(["cvrchat", "compare", "12345678", "--export"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Compare { export: true, .. }
        ));
    }

    #[test]
    fn rejects_missing_subcommand() {
        assert!(Cli::try_parse_from(["cvrchat"]).is_err());
    }
}
