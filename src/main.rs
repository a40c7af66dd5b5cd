use anyhow::Result;
use clap::Parser;
use restbind::commands::{self, Target, config::api_config};
use restbind::http::Method;
use std::path::PathBuf;

/// restbind - call a REST API resource from the command line
///
/// Responses are printed as JSON. Failures print the HTTP status and the
/// server's error message.
///
/// Examples:
///   restbind --host example.com get users /1
///   restbind --base-url http://localhost:8080/api post users / -d '{"name":"A"}'
#[derive(Parser, Debug)]
#[command(author, version = env!("RESTBIND_VERSION"), about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// API host; requests go to https://api.<HOST>/api (also via RESTBIND_HOST)
    #[arg(long, env = "RESTBIND_HOST", value_name = "HOST", global = true)]
    pub host: Option<String>,

    /// Full API base URL, overrides --host (also via RESTBIND_BASE_URL)
    #[arg(long = "base-url", env = "RESTBIND_BASE_URL", value_name = "URL", global = true)]
    pub base_url: Option<String>,

    /// Request timeout in seconds
    #[arg(long, value_name = "SECS", global = true)]
    pub timeout: Option<u64>,

    /// Extra header sent with the request (repeatable)
    #[arg(short = 'H', long = "header", value_name = "NAME: VALUE", global = true)]
    pub headers: Vec<String>,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// GET a resource
    Get(TargetArgs),

    /// DELETE a resource
    Delete(TargetArgs),

    /// POST a JSON body
    Post(BodyArgs),

    /// PUT a JSON body
    Put(BodyArgs),

    /// PATCH a JSON body
    Patch(BodyArgs),

    /// Upload files as a multipart form
    Upload(UploadArgs),
}

#[derive(clap::Args, Debug)]
pub struct TargetArgs {
    /// Resource path the client is bound to, e.g. "users"
    #[arg(value_name = "RESOURCE")]
    pub resource: String,

    /// Endpoint path relative to the resource, e.g. "/1"
    #[arg(value_name = "URI")]
    pub uri: String,

    /// Query parameter (repeatable; a repeated key becomes a list)
    #[arg(short = 'q', long = "query", value_name = "KEY=VALUE")]
    pub query: Vec<String>,
}

#[derive(clap::Args, Debug)]
pub struct BodyArgs {
    #[command(flatten)]
    pub target: TargetArgs,

    /// JSON request body (defaults to null)
    #[arg(short = 'd', long = "data", value_name = "JSON")]
    pub data: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct UploadArgs {
    #[command(flatten)]
    pub target: TargetArgs,

    /// Form field every file is appended under
    #[arg(long, default_value = "files")]
    pub field: String,

    /// Files to upload, in order
    #[arg(value_name = "FILE", required = true)]
    pub files: Vec<PathBuf>,
}

impl From<TargetArgs> for Target {
    fn from(args: TargetArgs) -> Self {
        Target {
            resource: args.resource,
            uri: args.uri,
            query: args.query,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();
    let config = api_config(
        cli.host.as_deref(),
        cli.base_url.as_deref(),
        cli.timeout,
        &cli.headers,
    )?;

    let response = match cli.command {
        Commands::Get(args) => commands::call(config, Method::Get, &args.into(), None).await?,
        Commands::Delete(args) => {
            commands::call(config, Method::Delete, &args.into(), None).await?
        }
        Commands::Post(args) => {
            commands::call(config, Method::Post, &args.target.into(), args.data.as_deref()).await?
        }
        Commands::Put(args) => {
            commands::call(config, Method::Put, &args.target.into(), args.data.as_deref()).await?
        }
        Commands::Patch(args) => {
            commands::call(config, Method::Patch, &args.target.into(), args.data.as_deref())
                .await?
        }
        Commands::Upload(args) => {
            commands::upload(config, &args.target.into(), &args.field, &args.files).await?
        }
    };

    commands::print_response(response.as_ref())
}
