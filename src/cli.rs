//! Command-line surface over the store and the lineage engine.
//!
//! Every command returns a `serde_json::Value`; `main` prints it.

use std::collections::HashMap;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use serde_json::{json, Value};
use tracing::debug;

use crate::config::loader;
use crate::config::schema::DeletePolicy;
use crate::config::FamGraphConfig;
use crate::error::{FamGraphError, Result};
use crate::graph::age::today;
use crate::graph::assembler::{annotate_ages, generation_layout, LineageReport};
use crate::graph::stats::FamilyStatistics;
use crate::graph::store::FamilyStore;
use crate::graph::traversal::{find_cycles, Direction, LineageTraversal, TraversalOptions};
use crate::types::{
    Gender, NewEvent, NewPerson, NewRelationship, NewUnion, Paged, PersonQuery, PersonUpdate,
    RelationshipType, UnionStatus, UnionType, UnionUpdate,
};

// ---------------------------------------------------------------------------
// Argument definitions
// ---------------------------------------------------------------------------

#[derive(Debug, Parser)]
#[command(name = "famgraph", version)]
#[command(about = "Genealogy records with ancestor and descendant queries")]
#[command(
    after_help = "Environment:\n  FAMGRAPH_DB                Database path override\n  FAMGRAPH_MAX_GENERATIONS   Default generation limit\n  FAMGRAPH_LOG               Log filter (RUST_LOG wins)"
)]
pub struct Cli {
    /// SQLite database file (overrides config and FAMGRAPH_DB).
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    /// YAML configuration file.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// What deleting a person does to its links: cascade or reject.
    #[arg(long, global = true)]
    pub delete_policy: Option<DeletePolicy>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Create the database and print its counts.
    Init,
    /// Manage persons.
    Person {
        #[command(subcommand)]
        command: PersonCommand,
    },
    /// Record PARENT as a parent of CHILD.
    Link {
        parent: String,
        child: String,
        #[arg(long, default_value = "biological")]
        kind: RelationshipType,
    },
    /// Deactivate a relationship by id.
    Unlink { relationship_id: String },
    /// Manage unions.
    Union {
        #[command(subcommand)]
        command: UnionCommand,
    },
    /// Manage life events.
    Event {
        #[command(subcommand)]
        command: EventCommand,
    },
    /// List ancestors, oldest generation first.
    Ancestors(LineageArgs),
    /// List descendants, nearest generation first.
    Descendants(LineageArgs),
    /// Generation depth of a person (0 = no known parents).
    Depth { id: String },
    /// Whole family grouped by generation depth.
    Layout,
    /// Family statistics.
    Stats {
        /// Reference date for ages and birthdays (default: today).
        #[arg(long)]
        on: Option<NaiveDate>,
    },
    /// Report parent/child cycles in the stored data.
    Cycles,
}

#[derive(Debug, Args)]
pub struct LineageArgs {
    pub id: String,

    /// Generations to walk (default from config, clamped to the cap).
    #[arg(long, short = 'g', allow_negative_numbers = true)]
    pub generations: Option<i64>,

    /// Reference date for ages (default: today).
    #[arg(long)]
    pub on: Option<NaiveDate>,

    /// Abort the walk after this many milliseconds.
    #[arg(long)]
    pub timeout_ms: Option<u64>,

    /// Include traversal counters in the output.
    #[arg(long)]
    pub metrics: bool,
}

#[derive(Debug, Args, Default)]
pub struct PersonFields {
    #[arg(long)]
    pub maiden_name: Option<String>,
    #[arg(long)]
    pub born: Option<NaiveDate>,
    #[arg(long)]
    pub birth_place: Option<String>,
    #[arg(long)]
    pub died: Option<NaiveDate>,
    #[arg(long)]
    pub death_place: Option<String>,
    #[arg(long)]
    pub profession: Option<String>,
    #[arg(long)]
    pub email: Option<String>,
    #[arg(long)]
    pub phone: Option<String>,
    #[arg(long)]
    pub photo: Option<String>,
    #[arg(long)]
    pub bio: Option<String>,
}

#[derive(Debug, Subcommand)]
pub enum PersonCommand {
    Add {
        #[arg(long)]
        given: String,
        #[arg(long)]
        family: String,
        #[arg(long)]
        gender: Gender,
        /// Explicit id (generated when omitted).
        #[arg(long)]
        id: Option<String>,
        #[command(flatten)]
        fields: PersonFields,
    },
    Show {
        id: String,
        #[arg(long)]
        on: Option<NaiveDate>,
    },
    List {
        #[arg(long)]
        search: Option<String>,
        #[arg(long)]
        page: Option<u32>,
        #[arg(long)]
        limit: Option<u32>,
    },
    Update {
        id: String,
        #[arg(long)]
        given: Option<String>,
        #[arg(long)]
        family: Option<String>,
        #[arg(long)]
        gender: Option<Gender>,
        #[arg(long)]
        alive: Option<bool>,
        #[command(flatten)]
        fields: PersonFields,
    },
    Delete { id: String },
}

#[derive(Debug, Subcommand)]
pub enum UnionCommand {
    Add {
        person1: String,
        person2: String,
        #[arg(long)]
        kind: Option<UnionType>,
        #[arg(long)]
        status: Option<UnionStatus>,
        #[arg(long)]
        start: Option<NaiveDate>,
        #[arg(long)]
        end: Option<NaiveDate>,
        #[arg(long)]
        location: Option<String>,
    },
    Update {
        id: String,
        #[arg(long)]
        kind: Option<UnionType>,
        #[arg(long)]
        status: Option<UnionStatus>,
        #[arg(long)]
        start: Option<NaiveDate>,
        #[arg(long)]
        end: Option<NaiveDate>,
        #[arg(long)]
        location: Option<String>,
    },
    /// All unions, or the partners of one person.
    List {
        #[arg(long)]
        person: Option<String>,
    },
    Delete { id: String },
}

#[derive(Debug, Subcommand)]
pub enum EventCommand {
    Add {
        person: String,
        #[arg(long)]
        title: String,
        #[arg(long, default_value = "other")]
        kind: String,
        #[arg(long)]
        date: NaiveDate,
        #[arg(long)]
        description: Option<String>,
    },
    /// One person's events (oldest first), or the whole timeline (newest first).
    List {
        #[arg(long)]
        person: Option<String>,
    },
    Delete { id: String },
}

// ---------------------------------------------------------------------------
// Execution
// ---------------------------------------------------------------------------

impl Cli {
    /// Resolve configuration, then apply `--db` and `--delete-policy`.
    pub fn load_config(&self) -> Result<FamGraphConfig> {
        let config = loader::load(self.config.as_deref())?;
        Ok(self.apply_overrides(config))
    }

    fn apply_overrides(&self, mut config: FamGraphConfig) -> FamGraphConfig {
        if let Some(db) = &self.db {
            config.database.path = db.to_string_lossy().into_owned();
        }
        if let Some(policy) = self.delete_policy {
            config.integrity.delete_policy = policy;
        }
        config
    }
}

/// Open the configured store and run `cli.command` against it.
pub fn run(cli: Cli, config: &FamGraphConfig) -> Result<Value> {
    let store = FamilyStore::new(&config.database.path)?.with_policy(config.integrity);
    debug!(db = %config.database.path, "store opened");
    dispatch(&store, config, cli.command)
}

pub fn dispatch(store: &FamilyStore, config: &FamGraphConfig, command: Command) -> Result<Value> {
    match command {
        Command::Init => Ok(json!({
            "database": config.database.path,
            "stats": store.get_stats()?,
        })),
        Command::Person { command } => person(store, command),
        Command::Link {
            parent,
            child,
            kind,
        } => {
            let rel = store.create_relationship(NewRelationship::new(&parent, &child).of_type(kind))?;
            to_value(&rel)
        }
        Command::Unlink { relationship_id } => {
            store.deactivate_relationship(&relationship_id)?;
            Ok(json!({ "deactivated": relationship_id }))
        }
        Command::Union { command } => union(store, command),
        Command::Event { command } => event(store, command),
        Command::Ancestors(args) => lineage(store, config, Direction::Ancestors, args),
        Command::Descendants(args) => lineage(store, config, Direction::Descendants, args),
        Command::Depth { id } => {
            let depth = LineageTraversal::new(store)
                .generation_depth(&id)?
                .ok_or_else(|| FamGraphError::not_found("person", id.as_str()))?;
            Ok(json!({ "id": id, "depth": depth }))
        }
        Command::Layout => {
            let snapshot = store.snapshot()?;
            let persons: Vec<_> = snapshot.persons().cloned().collect();
            let depths: HashMap<String, u32> = LineageTraversal::new(&snapshot)
                .generation_depths(persons.iter().map(|p| p.id.as_str()))?;
            to_value(&generation_layout(&depths, persons))
        }
        Command::Stats { on } => {
            let snapshot = store.snapshot()?;
            let stats = FamilyStatistics::compute(&snapshot, on.unwrap_or_else(today))?;
            Ok(json!({ "family": stats, "store": store.get_stats()? }))
        }
        Command::Cycles => {
            let cycles = find_cycles(&store.snapshot()?);
            Ok(json!({ "count": cycles.len(), "cycles": cycles }))
        }
    }
}

fn to_value<T: serde::Serialize>(value: &T) -> Result<Value> {
    serde_json::to_value(value).map_err(Into::into)
}

fn lineage(
    store: &FamilyStore,
    config: &FamGraphConfig,
    direction: Direction,
    args: LineageArgs,
) -> Result<Value> {
    let max = config.traversal.generation_limit().resolve(args.generations)?;
    let mut opts = TraversalOptions::new(max);
    if let Some(ms) = args.timeout_ms {
        opts = opts.with_deadline(Instant::now() + Duration::from_millis(ms));
    }

    let (entries, metrics) = LineageTraversal::new(store).walk(&args.id, direction, &opts)?;
    let report = LineageReport::new(
        &args.id,
        direction,
        max,
        entries,
        args.on.unwrap_or_else(today),
    );
    let mut value = to_value(&report)?;
    if args.metrics {
        value["metrics"] = metrics.to_json();
    }
    Ok(value)
}

fn person(store: &FamilyStore, command: PersonCommand) -> Result<Value> {
    match command {
        PersonCommand::Add {
            given,
            family,
            gender,
            id,
            fields,
        } => {
            let new = NewPerson {
                id,
                given_name: given,
                family_name: family,
                maiden_name: fields.maiden_name,
                gender: Some(gender),
                birth_date: fields.born,
                birth_place: fields.birth_place,
                death_date: fields.died,
                death_place: fields.death_place,
                is_alive: None,
                profile_photo: fields.photo,
                biography: fields.bio,
                profession: fields.profession,
                email: fields.email,
                phone: fields.phone,
            };
            to_value(&store.create_person(new)?)
        }
        PersonCommand::Show { id, on } => {
            let detail = store.person_detail(&id, on.unwrap_or_else(today))?;
            let events = store.events_for(&id)?;
            let mut value = to_value(&detail)?;
            value["events"] = to_value(&events)?;
            Ok(value)
        }
        PersonCommand::List {
            search,
            page,
            limit,
        } => {
            let listed = store.list_persons(&PersonQuery {
                page,
                limit,
                search,
            })?;
            let aged = Paged {
                page: listed.page,
                limit: listed.limit,
                total: listed.total,
                total_pages: listed.total_pages,
                items: annotate_ages(listed.items, today()),
            };
            to_value(&aged)
        }
        PersonCommand::Update {
            id,
            given,
            family,
            gender,
            alive,
            fields,
        } => {
            let update = PersonUpdate {
                given_name: given,
                family_name: family,
                maiden_name: fields.maiden_name,
                gender,
                birth_date: fields.born,
                birth_place: fields.birth_place,
                death_date: fields.died,
                death_place: fields.death_place,
                is_alive: alive,
                profile_photo: fields.photo,
                biography: fields.bio,
                profession: fields.profession,
                email: fields.email,
                phone: fields.phone,
            };
            to_value(&store.update_person(&id, update)?)
        }
        PersonCommand::Delete { id } => {
            store.delete_person(&id)?;
            Ok(json!({ "deleted": id }))
        }
    }
}

fn union(store: &FamilyStore, command: UnionCommand) -> Result<Value> {
    match command {
        UnionCommand::Add {
            person1,
            person2,
            kind,
            status,
            start,
            end,
            location,
        } => {
            let new = NewUnion {
                union_type: kind,
                status,
                start_date: start,
                end_date: end,
                location,
                ..NewUnion::between(&person1, &person2)
            };
            to_value(&store.create_union(new)?)
        }
        UnionCommand::Update {
            id,
            kind,
            status,
            start,
            end,
            location,
        } => {
            let update = UnionUpdate {
                union_type: kind,
                start_date: start,
                end_date: end,
                location,
                status,
            };
            to_value(&store.update_union(&id, update)?)
        }
        UnionCommand::List { person: Some(id) } => {
            store.require_person(&id)?;
            to_value(&store.partners_of(&id)?)
        }
        UnionCommand::List { person: None } => to_value(&store.list_unions()?),
        UnionCommand::Delete { id } => {
            store.delete_union(&id)?;
            Ok(json!({ "deleted": id }))
        }
    }
}

fn event(store: &FamilyStore, command: EventCommand) -> Result<Value> {
    match command {
        EventCommand::Add {
            person,
            title,
            kind,
            date,
            description,
        } => {
            let new = NewEvent {
                person_id: person,
                title,
                event_type: kind,
                event_date: date,
                description,
            };
            to_value(&store.create_event(new)?)
        }
        EventCommand::List { person: Some(id) } => to_value(&store.events_for(&id)?),
        EventCommand::List { person: None } => to_value(&store.timeline()?),
        EventCommand::Delete { id } => {
            store.delete_event(&id)?;
            Ok(json!({ "deleted": id }))
        }
    }
}
