use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Returns the version string, including git hash and commit date for non-release builds.
/// Format: "0.3.2" for releases, "0.3.2@abc1234 2024-01-15 14:30" for dev builds
fn get_version() -> &'static str {
    const VERSION: &str = env!("CARGO_PKG_VERSION");
    const GIT_HASH: &str = env!("GIT_HASH");
    const GIT_COMMIT_DATE: &str = env!("GIT_COMMIT_DATE");
    const IS_RELEASE: &str = env!("IS_RELEASE");

    use std::sync::OnceLock;
    static VERSION_STRING: OnceLock<String> = OnceLock::new();

    VERSION_STRING.get_or_init(|| {
        if IS_RELEASE == "true" || GIT_HASH.is_empty() {
            VERSION.to_string()
        } else {
            format!("{}@{} {}", VERSION, GIT_HASH, GIT_COMMIT_DATE)
        }
    })
}

#[derive(Parser, Debug)]
#[command(name = "scorebook", bin_name = "scorebook", version = get_version())]
#[command(about = "A catalog of sheet music for choirs and parishes", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Verbose output (debug logging)
    #[arg(short, long, global = true, help_heading = "Options")]
    pub verbose: bool,

    /// Act as this user instead of the local operator
    #[arg(long, global = true, value_name = "USERNAME", help_heading = "Options")]
    pub as_user: Option<String>,

    /// Groups of the --as-user caller (comma-separated)
    #[arg(
        long,
        global = true,
        value_delimiter = ',',
        requires = "as_user",
        help_heading = "Options"
    )]
    pub groups: Vec<String>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the HTTP service
    Serve {
        /// Listen address, overriding the configured one
        #[arg(long)]
        bind: Option<String>,
    },

    /// List and filter sheets
    #[command(alias = "ls")]
    List(ListArgs),

    /// Show one sheet by slug or id
    Show {
        /// Slug (e.g. ave-maria) or id
        target: String,
    },

    /// Add a sheet
    Add {
        #[command(flatten)]
        fields: SheetArgs,
    },

    /// Edit a sheet, changing only the given fields
    Edit {
        id: String,

        #[command(flatten)]
        fields: SheetArgs,
    },

    /// Delete a sheet and its files
    #[command(alias = "rm")]
    Delete { id: String },

    /// List tags with usage counts
    Tags,

    /// Show the classification codes
    Codes,
}

#[derive(Args, Debug, Default, Clone)]
pub struct ListArgs {
    #[arg(long)]
    pub cast: Option<String>,

    #[arg(long)]
    pub season: Option<String>,

    #[arg(long)]
    pub liturgical_use: Option<String>,

    #[arg(long)]
    pub genre: Option<String>,

    #[arg(long)]
    pub difficulty: Option<String>,

    #[arg(long)]
    pub year: Option<String>,

    /// Search title, composer, arranger, publisher, ISBN, description and tags
    #[arg(short, long)]
    pub query: Option<String>,

    #[arg(short, long)]
    pub page: Option<String>,
}

impl ListArgs {
    /// The arguments as listing query parameters.
    pub fn params(&self) -> Vec<(&'static str, &str)> {
        [
            ("cast", &self.cast),
            ("season", &self.season),
            ("liturgical_use", &self.liturgical_use),
            ("genre", &self.genre),
            ("difficulty", &self.difficulty),
            ("year", &self.year),
            ("q", &self.query),
            ("page", &self.page),
        ]
        .into_iter()
        .filter_map(|(key, value)| value.as_deref().map(|v| (key, v)))
        .collect()
    }
}

#[derive(Args, Debug, Default, Clone)]
pub struct SheetArgs {
    #[arg(long)]
    pub title: Option<String>,

    #[arg(long)]
    pub composer: Option<String>,

    #[arg(long)]
    pub arranger: Option<String>,

    /// Cast code, e.g. SATB
    #[arg(long)]
    pub cast: Option<String>,

    /// Season code, e.g. ADV
    #[arg(long)]
    pub season: Option<String>,

    /// Liturgical use code, e.g. COM
    #[arg(long)]
    pub liturgical_use: Option<String>,

    /// Genre code, e.g. REL
    #[arg(long)]
    pub genre: Option<String>,

    /// Difficulty, 1 to 9
    #[arg(long)]
    pub difficulty: Option<String>,

    #[arg(long)]
    pub year: Option<String>,

    #[arg(long)]
    pub publisher: Option<String>,

    #[arg(long)]
    pub isbn: Option<String>,

    #[arg(long)]
    pub description: Option<String>,

    /// Comma-separated tags; an empty value clears them
    #[arg(long)]
    pub tags: Option<String>,

    /// Make the sheet visible to every member
    #[arg(long, conflicts_with = "private")]
    pub public: bool,

    /// Restrict the sheet to editors
    #[arg(long)]
    pub private: bool,

    /// The score itself (PDF or image)
    #[arg(long, value_name = "PATH")]
    pub file: Option<PathBuf>,

    /// A preview image
    #[arg(long, value_name = "PATH")]
    pub preview: Option<PathBuf>,
}
