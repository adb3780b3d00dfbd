//! Phage Clouds CLI: build a cloud and write it as an HTML page
//!
//! Connects to a running Neo4j server, or loads a JSON snapshot of the
//! graph with `--graph-file`.

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, Subcommand};
use comfy_table::{ContentArrangement, Table};
use phageclouds::{
    AccessionTaxids, CloudPipeline, CloudRequest, CloudRun, EntryPredicate, PhageCloudsConfig,
    SqliteTaxonomy, TaxonomyContext, TaxonomyResolver, DEFAULT_FAMILY_THRESHOLD, DEFAULT_THRESHOLD,
};
use phageclouds_gateway::{EmbeddedClient, FailurePolicy, Gateway, GraphClient, RemoteClient};
use std::path::PathBuf;
use tracing::{info, Level};

#[derive(Parser)]
#[command(name = "phageclouds", version, about = "Phage genome clouds from a sharesDNA graph")]
struct Cli {
    /// YAML configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Neo4j HTTP URL
    #[arg(long, global = true, env = "PHAGECLOUDS_URL")]
    url: Option<String>,

    #[arg(long, global = true, env = "PHAGECLOUDS_USER")]
    user: Option<String>,

    #[arg(long, global = true, env = "PHAGECLOUDS_PASSWORD", hide_env_values = true)]
    password: Option<String>,

    /// Read the graph from a JSON snapshot instead of a server
    #[arg(long, global = true)]
    graph_file: Option<PathBuf>,

    /// Directory the page is written to
    #[arg(long, global = true)]
    output_dir: Option<PathBuf>,

    /// Abort on connection or query failures
    #[arg(long, global = true)]
    strict: bool,

    /// -v for debug output, -vv for trace
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Cloud around NCBI genomes whose lineage contains a taxon
    Taxon {
        /// Taxon name, matched as a substring of the lineage
        #[arg(short, long = "tax")]
        tax: String,

        /// Distance threshold
        #[arg(short, long = "dist", default_value_t = DEFAULT_THRESHOLD)]
        dist: f64,
    },
    /// Cloud around a phage family, coloured by a rank below it
    Family {
        /// Family name
        #[arg(short, long = "fam")]
        fam: String,

        /// Rank used for colouring (e.g. genus, subfamily)
        #[arg(short, long = "tax")]
        tax: String,

        /// Distance threshold
        #[arg(short, long = "dist", default_value_t = DEFAULT_FAMILY_THRESHOLD)]
        dist: f64,
    },
    /// Cloud around phages infecting a host genus
    Host {
        /// Bacterial host genus
        #[arg(short, long)]
        genus: String,

        /// Distance threshold
        #[arg(short, long = "dist", default_value_t = DEFAULT_THRESHOLD)]
        dist: f64,

        /// Leave predicted prophages out of the seeds
        #[arg(long)]
        harsh: bool,
    },
}

impl Commands {
    fn request(self) -> Result<CloudRequest> {
        let (predicate, dist) = match self {
            Commands::Taxon { tax, dist } => (EntryPredicate::TaxonSubstring { taxon: tax }, dist),
            Commands::Family { fam, tax, dist } => (EntryPredicate::Family { family: fam, rank: tax }, dist),
            Commands::Host { genus, dist, harsh } => (EntryPredicate::HostGenus { genus, harsh }, dist),
        };
        Ok(CloudRequest::new(predicate, Some(dist))?)
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let Some(command) = cli.command else {
        if let Err(e) = Cli::command().print_help() {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
        println!();
        return;
    };

    let level = match cli.verbose {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    let options = Options {
        config: cli.config,
        url: cli.url,
        user: cli.user,
        password: cli.password,
        graph_file: cli.graph_file,
        output_dir: cli.output_dir,
        strict: cli.strict,
    };

    if let Err(e) = run(options, command).await {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

/// Global flags, detached from the parsed subcommand
struct Options {
    config: Option<PathBuf>,
    url: Option<String>,
    user: Option<String>,
    password: Option<String>,
    graph_file: Option<PathBuf>,
    output_dir: Option<PathBuf>,
    strict: bool,
}

impl Options {
    /// File values, then environment or flags (clap resolves those two)
    fn load_config(&self) -> Result<PhageCloudsConfig> {
        let mut config = match &self.config {
            Some(path) => PhageCloudsConfig::from_yaml_file(path)?,
            None => PhageCloudsConfig::default(),
        };
        if let Some(url) = &self.url {
            config.database.uri = url.clone();
        }
        if let Some(user) = &self.user {
            config.database.user = user.clone();
        }
        if let Some(password) = &self.password {
            config.database.password = password.clone();
        }
        if let Some(dir) = &self.output_dir {
            config.output_dir = dir.clone();
        }
        if self.strict {
            config.failure_policy = FailurePolicy::Strict;
        }
        Ok(config)
    }
}

async fn run(options: Options, command: Commands) -> Result<()> {
    let config = options.load_config()?;
    let request = command.request()?;

    let client: Box<dyn GraphClient> = match &options.graph_file {
        Some(path) => Box::new(
            EmbeddedClient::from_json_file(path)
                .with_context(|| format!("loading graph snapshot {:?}", path))?,
        ),
        None => Box::new(RemoteClient::new(config.database.to_remote())),
    };
    let gateway = Gateway::connect(client, config.failure_policy).await?;

    let taxonomy = match request.predicate {
        EntryPredicate::Family { .. } => Some(load_taxonomy(&config)?),
        _ => None,
    };

    let mut pipeline = CloudPipeline::new(&gateway).with_canvas(config.render.clone());
    if let Some(taxonomy) = &taxonomy {
        pipeline = pipeline.with_taxonomy(taxonomy);
    }
    let run = pipeline.run(&request).await?;

    let path = run
        .write_to(&config.output_dir)
        .with_context(|| format!("writing {}", run.file_name))?;
    info!("Wrote {:?}", path);

    print_summary(&run);
    println!("Saved to {}", path.display());
    Ok(())
}

fn load_taxonomy(config: &PhageCloudsConfig) -> Result<TaxonomyContext> {
    let lookup = SqliteTaxonomy::open(&config.taxonomy.db_path)
        .with_context(|| format!("opening taxonomy database {:?}", config.taxonomy.db_path))?;
    let taxids = AccessionTaxids::load(&config.taxonomy.accession_taxids)?;
    Ok(TaxonomyContext::new(
        TaxonomyResolver::new(Box::new(lookup), config.taxonomy.tie_break),
        taxids,
    ))
}

fn print_summary(run: &CloudRun) {
    let summary = &run.summary;
    if summary.node_count() == 0 {
        println!("(empty cloud)");
        return;
    }

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Source", "Genomes"]);
    for (source, count) in &summary.nodes_by_source {
        table.add_row(vec![source.clone(), count.to_string()]);
    }
    table.add_row(vec!["Total".to_string(), summary.node_count().to_string()]);

    println!("{}", table);
    println!("{} seed(s), {} edge(s)", summary.seeds, summary.edges);
}
