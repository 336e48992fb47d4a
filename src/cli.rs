use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use log::warn;

use resistome_viz::Session;
use resistome_viz::export::{GraphSummary, most_connected, to_dot, write_json};
use resistome_viz::filter::{Choice, SearchScope};

#[derive(Debug, Parser)]
#[command(author, version, about, args_conflicts_with_subcommands = true)]
pub struct Cli {
    /// Log at debug level (RUST_LOG still wins)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Dataset configuration file
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,

    /// Dataset keys or files to open in the viewer
    #[arg(value_name = "DATASET")]
    pub datasets: Vec<String>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Open the interactive viewer (default)
    View {
        #[arg(value_name = "DATASET")]
        datasets: Vec<String>,
    },
    /// Print the filtered graph
    Filter(FilterArgs),
    /// List the diseases, groups and timepoint buckets of a dataset
    Options {
        #[arg(value_name = "DATASET")]
        dataset: String,
    },
    /// Print summary counts and the most connected nodes
    Stats(StatsArgs),
}

#[derive(Debug, Args)]
pub struct SelectionArgs {
    /// Dataset key or file
    #[arg(value_name = "DATASET")]
    pub dataset: String,

    #[arg(long, value_name = "DISEASE")]
    pub disease: Option<String>,

    #[arg(long, value_name = "GROUP")]
    pub group: Option<String>,

    /// Accepted timepoint bucket; repeat for several (default: all)
    #[arg(long = "timepoint", value_name = "KEY", conflicts_with = "no_timepoints")]
    pub timepoints: Vec<String>,

    /// Accept no timepoint bucket at all
    #[arg(long)]
    pub no_timepoints: bool,

    /// Search any node
    #[arg(long, value_name = "QUERY")]
    pub search: Option<String>,

    /// Search resistance-gene nodes only
    #[arg(long, value_name = "QUERY")]
    pub search_gene: Option<String>,

    /// Search mobile-element nodes only
    #[arg(long, value_name = "QUERY")]
    pub search_element: Option<String>,

    #[arg(long)]
    pub hide_colo: bool,

    #[arg(long)]
    pub hide_temporal: bool,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Json,
    Dot,
    Summary,
}

#[derive(Debug, Args)]
pub struct FilterArgs {
    #[command(flatten)]
    pub selection: SelectionArgs,

    #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
    pub format: OutputFormat,

    /// Write to FILE instead of stdout
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Single-line JSON
    #[arg(long)]
    pub compact: bool,
}

#[derive(Debug, Args)]
pub struct StatsArgs {
    #[command(flatten)]
    pub selection: SelectionArgs,

    /// Number of most connected nodes to list
    #[arg(long, default_value_t = 10)]
    pub top: usize,
}

impl SelectionArgs {
    /// Opens the dataset and turns the flags into the session's filter state.
    fn apply(&self, session: &mut Session) -> Result<()> {
        session.open(&self.dataset)?;
        let options = session.options().cloned().unwrap_or_default();
        let state = session.state_mut();

        if let Some(disease) = &self.disease {
            state.disease = Choice::parse(disease);
            if let Some(disease) = state.disease.selected()
                && !options.has_disease(disease)
            {
                warn!("disease {disease} does not occur in {}", self.dataset);
            }
        }
        if let Some(group) = &self.group {
            state.group = Choice::parse(group);
            if let Some(group) = state.group.selected()
                && !options.has_group(group)
            {
                warn!("group {group} does not occur in {}", self.dataset);
            }
        }

        if self.no_timepoints {
            state.timepoints.clear();
        } else if !self.timepoints.is_empty() {
            state.timepoints.clear();
            for key in &self.timepoints {
                if !options.timepoints.iter().any(|bucket| &bucket.key == key) {
                    warn!("timepoint bucket {key} is not defined for {}", self.dataset);
                }
                state.toggle_timepoint(key, true);
            }
        }

        for (scope, query) in [
            (SearchScope::Any, &self.search),
            (SearchScope::Genes, &self.search_gene),
            (SearchScope::Elements, &self.search_element),
        ] {
            if let Some(query) = query {
                state.set_search(scope, query);
            }
        }

        state.links.colocalization = !self.hide_colo;
        state.links.temporal = !self.hide_temporal;
        Ok(())
    }
}

fn output_writer(path: Option<&PathBuf>) -> Result<Box<dyn Write>> {
    Ok(match path {
        Some(path) => Box::new(BufWriter::new(
            File::create(path)
                .with_context(|| format!("failed to create output {}", path.display()))?,
        )),
        None => Box::new(io::stdout().lock()),
    })
}

pub fn run_filter(session: &mut Session, args: &FilterArgs) -> Result<()> {
    args.selection.apply(session)?;
    let graph = session.recompute();

    let mut out = output_writer(args.output.as_ref())?;
    match args.format {
        OutputFormat::Json => {
            write_json(&graph, &mut out, args.compact)?;
            writeln!(out)?;
        }
        OutputFormat::Dot => out.write_all(to_dot(&graph).as_bytes())?,
        OutputFormat::Summary => {
            writeln!(out, "{}", GraphSummary::CSV_HEADER)?;
            writeln!(out, "{}", GraphSummary::of(&graph).csv_row())?;
        }
    }
    out.flush().context("failed to flush output")
}

pub fn run_options(session: &mut Session, dataset: &str) -> Result<()> {
    session.open(dataset)?;
    let Some(active) = session.active() else {
        return Ok(());
    };

    let mut out = io::stdout().lock();
    writeln!(out, "dataset: {}", active.key)?;
    writeln!(
        out,
        "profile: diseases on {:?}, groups from {:?}{}, search on {:?}",
        active.profile.disease_scope,
        active.profile.group_field,
        if active.profile.group_elements_only {
            " (elements only)"
        } else {
            ""
        },
        active.profile.search_field
    )?;
    writeln!(out, "diseases: {}", active.options.diseases.join(", "))?;
    writeln!(out, "groups: {}", active.options.groups.join(", "))?;
    writeln!(out, "timepoints:")?;
    for bucket in &active.options.timepoints {
        let range = match (bucket.min, bucket.max) {
            _ if bucket.remainder => " [other days]".to_owned(),
            (None, None) => String::new(),
            (Some(min), None) => format!(" [{min}+ d]"),
            (None, Some(max)) => format!(" [..{max} d]"),
            (Some(min), Some(max)) => format!(" [{min}-{max} d]"),
        };
        writeln!(
            out,
            "  {}  {} ({}){range}",
            bucket.key,
            bucket.display_label(),
            bucket.category.as_deref().unwrap_or("untagged")
        )?;
    }
    Ok(())
}

pub fn run_stats(session: &mut Session, args: &StatsArgs) -> Result<()> {
    args.selection.apply(session)?;
    let graph = session.recompute();

    let mut out = io::stdout().lock();
    writeln!(out, "{}", GraphSummary::CSV_HEADER)?;
    writeln!(out, "{}", GraphSummary::of(&graph).csv_row())?;
    writeln!(out)?;
    writeln!(out, "Most connected nodes:")?;
    for (node, links) in most_connected(&graph, args.top) {
        writeln!(out, "  {:<32} {links:>5}  ({})", node.display_name(), node.id)?;
    }
    Ok(())
}
