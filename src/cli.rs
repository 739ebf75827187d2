use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "pdf-chapters")]
#[command(about = "Split a PDF into chapters, or bookmark them, using its bookmarks or printed table of contents")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write one PDF per chapter
    Split {
        #[command(flatten)]
        resolve: ResolveArgs,

        /// Output directory (default: next to the input PDF). A folder named
        /// after the PDF is created inside it.
        #[arg(short, long)]
        output_dir: Option<PathBuf>,
    },

    /// Write a copy of the PDF with one bookmark per chapter
    Bookmark {
        #[command(flatten)]
        resolve: ResolveArgs,

        /// Output directory (default: next to the input PDF)
        #[arg(short, long)]
        output_dir: Option<PathBuf>,
    },

    /// Print the bookmark structure, or the detected table of contents if there are no bookmarks
    List {
        /// PDF file to inspect
        path: PathBuf,

        /// Heuristics configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

/// Everything needed to resolve chapter ranges for one PDF.
#[derive(Args)]
pub struct ResolveArgs {
    /// PDF file to process
    pub path: PathBuf,

    /// API key for the chat completions endpoint
    #[arg(short = 'k', long, env = "OPENAI_API_KEY", hide_env_values = true)]
    pub api_key: String,

    /// Base URL of an OpenAI-compatible API
    #[arg(
        short = 'u',
        long,
        env = "OPENAI_URL",
        default_value = "https://api.z.ai/api/paas/v4"
    )]
    pub api_url: String,

    /// Model used to classify bookmarks and read the table of contents
    #[arg(short, long, env = "OPENAI_MODEL", default_value = "glm-4.7")]
    pub model: String,

    /// Heuristics configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Pin each TOC chapter to the page where its heading is found,
    /// falling back to the global offset
    #[arg(long)]
    pub locate_chapters: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_split_arguments() {
        let cli = Cli::try_parse_from([
            "pdf-chapters",
            "split",
            "book.pdf",
            "-k",
            "secret",
            "-o",
            "out",
            "--locate-chapters",
        ])
        .unwrap();

        match cli.command {
            Commands::Split {
                resolve,
                output_dir,
            } => {
                assert_eq!(resolve.path, PathBuf::from("book.pdf"));
                assert_eq!(resolve.api_key, "secret");
                assert!(resolve.locate_chapters);
                assert_eq!(output_dir, Some(PathBuf::from("out")));
            }
            _ => panic!("expected split"),
        }
    }

    #[test]
    fn test_list_needs_no_api_key() {
        assert!(Cli::try_parse_from(["pdf-chapters", "list", "book.pdf"]).is_ok());
    }
}
