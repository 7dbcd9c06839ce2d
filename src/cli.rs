use crate::config::{Config, DatasetPolicy, NameMatching, Substrate};
use crate::error::Result;
use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "exam-search")]
#[command(about = "Search ranked examination results by name or seating number", long_about = None)]
pub struct Cli {
    /// JSON array of examination records
    pub dataset: PathBuf,

    /// Name fragment, or digits of a seating number
    pub query: String,

    /// Configuration file (defaults to the platform config directory)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    #[arg(short, long, default_value = "1")]
    pub page: usize,

    #[arg(short = 'n', long)]
    pub page_size: Option<usize>,

    /// Matching mode for name queries
    #[arg(short, long, value_enum)]
    pub matching: Option<NameMatching>,

    #[arg(long, value_enum)]
    pub substrate: Option<Substrate>,

    /// Reject the dataset if any record is malformed
    #[arg(long)]
    pub strict: bool,

    /// Print results as JSON
    #[arg(long)]
    pub json: bool,
}

impl Cli {
    /// Load the configuration file and apply command-line overrides.
    pub fn load_config(&self) -> Result<Config> {
        let mut config = match &self.config {
            Some(path) => Config::load(path)?,
            None => Config::load_default()?,
        };
        self.apply_overrides(&mut config);
        Ok(config)
    }

    pub fn apply_overrides(&self, config: &mut Config) {
        if let Some(page_size) = self.page_size {
            config.display.page_size = page_size;
        }
        if let Some(matching) = self.matching {
            config.search.name_matching = matching;
        }
        if let Some(substrate) = self.substrate {
            config.engine.substrate = substrate;
        }
        if self.strict {
            config.dataset.policy = DatasetPolicy::Strict;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert2::{check, let_assert};
    use std::io::Write;

    #[test]
    fn test_minimal_arguments() {
        let cli = Cli::try_parse_from(["exam-search", "results.json", "Ahmed"]).unwrap();
        check!(cli.dataset == PathBuf::from("results.json"));
        check!(cli.query == "Ahmed");
        check!(cli.page == 1);
        check!(!cli.json);

        let mut config = Config::default();
        cli.apply_overrides(&mut config);
        check!(config == Config::default());
    }

    #[test]
    fn test_overrides() {
        let cli = Cli::try_parse_from([
            "exam-search",
            "results.json",
            "Ahmed",
            "--page-size",
            "5",
            "--matching",
            "fuzzy",
            "--substrate",
            "isolated",
            "--strict",
        ])
        .unwrap();

        let mut config = Config::default();
        cli.apply_overrides(&mut config);
        check!(config.display.page_size == 5);
        check!(config.search.name_matching == NameMatching::Fuzzy);
        check!(config.engine.substrate == Substrate::Isolated);
        check!(config.dataset.policy == DatasetPolicy::Strict);
    }

    #[test]
    fn test_unknown_matching_mode_rejected() {
        let result = Cli::try_parse_from(["exam-search", "a.json", "Ahmed", "-m", "phonetic"]);
        check!(result.is_err());
    }

    #[test]
    fn test_flags_override_config_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[display]\npage-size = 50\n\n[search]\nname-matching = \"substring\"").unwrap();
        let path = file.path().to_str().unwrap().to_owned();

        let cli =
            Cli::try_parse_from(["exam-search", "a.json", "Ahmed", "-c", &path, "-n", "7"]).unwrap();
        let_assert!(Ok(config) = cli.load_config());
        check!(config.display.page_size == 7);
        check!(config.search.name_matching == NameMatching::Substring);
    }
}
