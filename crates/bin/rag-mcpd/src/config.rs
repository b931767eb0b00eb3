use clap::Parser;
use rag_core::search::{DEFAULT_COMMUNITY_LEVEL, DEFAULT_RESPONSE_TYPE, GlobalSearchOptions};
use std::error::Error;
use std::fmt;
use std::path::PathBuf;

const DEFAULT_PROJECT_DIR: &str = "/root/autodl-tmp/MCP/mcp-graphrag/graphrag";

#[derive(Parser, Debug)]
#[command(name = "rag-mcpd", version, about = "GraphRAG MCP daemon.")]
struct CliArgs {
    #[arg(long, env = "RAG_PROJECT_DIR", default_value = DEFAULT_PROJECT_DIR)]
    project_dir: PathBuf,

    #[arg(
        long,
        env = "RAG_COMMUNITY_LEVEL",
        default_value_t = DEFAULT_COMMUNITY_LEVEL,
        allow_negative_numbers = true
    )]
    community_level: i64,

    #[arg(long, env = "RAG_RESPONSE_TYPE", default_value = DEFAULT_RESPONSE_TYPE)]
    response_type: String,
}

/// Runtime configuration loaded from CLI arguments and environment variables.
#[derive(Debug, Clone)]
pub struct RagConfig {
    pub project_dir: PathBuf,
    pub search: GlobalSearchOptions,
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidSetting { name: &'static str, value: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidSetting { name, value } => {
                write!(f, "invalid {name} value: {value}")
            }
        }
    }
}

impl Error for ConfigError {}

impl RagConfig {
    pub fn from_args() -> Result<Self, ConfigError> {
        let args = CliArgs::parse();
        Self::try_from(args)
    }
}

impl TryFrom<CliArgs> for RagConfig {
    type Error = ConfigError;

    fn try_from(args: CliArgs) -> Result<Self, Self::Error> {
        if args.project_dir.as_os_str().is_empty() {
            return Err(ConfigError::InvalidSetting {
                name: "RAG_PROJECT_DIR",
                value: String::new(),
            });
        }
        if args.community_level < 0 {
            return Err(ConfigError::InvalidSetting {
                name: "RAG_COMMUNITY_LEVEL",
                value: args.community_level.to_string(),
            });
        }
        if args.response_type.trim().is_empty() {
            return Err(ConfigError::InvalidSetting {
                name: "RAG_RESPONSE_TYPE",
                value: args.response_type,
            });
        }

        Ok(Self {
            project_dir: args.project_dir,
            search: GlobalSearchOptions::default()
                .with_community_level(args.community_level)
                .with_response_type(args.response_type),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_args() -> CliArgs {
        CliArgs {
            project_dir: PathBuf::from(DEFAULT_PROJECT_DIR),
            community_level: DEFAULT_COMMUNITY_LEVEL,
            response_type: DEFAULT_RESPONSE_TYPE.to_string(),
        }
    }

    #[test]
    fn defaults_match_fixed_query_parameters() {
        let config = RagConfig::try_from(base_args()).expect("config should parse");

        assert_eq!(config.project_dir, PathBuf::from(DEFAULT_PROJECT_DIR));
        assert_eq!(config.search, GlobalSearchOptions::default());
    }

    #[test]
    fn parses_flags() {
        let args = CliArgs::try_parse_from([
            "rag-mcpd",
            "--project-dir",
            "/data/graphrag",
            "--community-level",
            "1",
            "--response-type",
            "Single Paragraph",
        ])
        .expect("flags parse");

        let config = RagConfig::try_from(args).expect("config should parse");

        assert_eq!(config.project_dir, PathBuf::from("/data/graphrag"));
        assert_eq!(config.search.community_level, 1);
        assert_eq!(config.search.response_type, "Single Paragraph");
    }

    #[test]
    fn rejects_negative_level() {
        let mut args = base_args();
        args.community_level = -1;

        let err = RagConfig::try_from(args).expect_err("negative level");

        assert!(matches!(
            err,
            ConfigError::InvalidSetting {
                name: "RAG_COMMUNITY_LEVEL",
                ..
            }
        ));
    }

    #[test]
    fn rejects_blank_response_type() {
        let mut args = base_args();
        args.response_type = "  ".to_string();

        assert!(RagConfig::try_from(args).is_err());
    }
}
