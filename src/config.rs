// Runner configuration, loaded from environment variables and CLI flags.

use std::path::PathBuf;

/// Runner configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Terrain file to load.
    pub field: PathBuf,
    /// Colony program files, at most four are used.
    pub programs: Vec<PathBuf>,
    /// Seed for the run's random number generator.
    pub seed: u64,
}

impl Config {
    /// Load configuration from environment variables and CLI arguments.
    ///
    /// Environment variables:
    /// - `FORMICARY_FIELD` - Path to the terrain file (default: `data/fields/meadow.txt`)
    /// - `FORMICARY_PROGRAMS` - Comma-separated colony program paths
    /// - `FORMICARY_SEED` - RNG seed (default: 0)
    ///
    /// CLI flags:
    /// - `--field <PATH>` - Override the terrain file
    /// - `--programs <A,B,..>` - Override the program list
    /// - `--seed <N>` - Override the seed
    pub fn load() -> Self {
        let args: Vec<String> = std::env::args().collect();

        let field = Self::parse_cli_value(&args, "--field")
            .or_else(|| std::env::var("FORMICARY_FIELD").ok())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("data/fields/meadow.txt"));

        let programs = Self::parse_cli_value(&args, "--programs")
            .or_else(|| std::env::var("FORMICARY_PROGRAMS").ok())
            .map(|list| Self::split_paths(&list))
            .unwrap_or_else(|| vec![PathBuf::from("data/programs/forager.ant")]);

        // Seed: CLI flag --seed takes precedence, then env var, then default
        let seed = Self::parse_cli_value(&args, "--seed")
            .and_then(|v| v.parse().ok())
            .or_else(|| {
                std::env::var("FORMICARY_SEED")
                    .ok()
                    .and_then(|v| v.parse().ok())
            })
            .unwrap_or(0);

        Config { field, programs, seed }
    }

    /// Parse a CLI flag value like `--seed 42`.
    fn parse_cli_value(args: &[String], flag: &str) -> Option<String> {
        args.windows(2).find_map(|pair| {
            if pair[0] == flag {
                Some(pair[1].clone())
            } else {
                None
            }
        })
    }

    fn split_paths(list: &str) -> Vec<PathBuf> {
        list.split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(PathBuf::from)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_paths() {
        let paths = Config::split_paths("a.ant, b.ant ,,c.ant");
        assert_eq!(
            paths,
            vec![
                PathBuf::from("a.ant"),
                PathBuf::from("b.ant"),
                PathBuf::from("c.ant")
            ]
        );
    }

    #[test]
    fn test_parse_cli_value() {
        let args: Vec<String> = ["formicary", "--seed", "42", "--field", "x.txt"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(Config::parse_cli_value(&args, "--seed").as_deref(), Some("42"));
        assert_eq!(
            Config::parse_cli_value(&args, "--field").as_deref(),
            Some("x.txt")
        );
        assert_eq!(Config::parse_cli_value(&args, "--programs"), None);
    }
}
