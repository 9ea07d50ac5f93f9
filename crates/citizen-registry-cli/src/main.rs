//! Citizen registry CLI — `creg` command.
//!
//! Provides a command-line interface for registering citizens and agencies,
//! submitting and staging profile data, rolling back versions, and managing
//! per-agency read grants. State is kept in a JSON snapshot that every
//! mutating command loads, changes and saves atomically.
//!
//! `--as` names the caller and `--auth` proves it against the stored
//! citizen, agency or administrator secret.

use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};

use citizen_registry::storage::{export_history, load_registry, save_registry};
use citizen_registry::{
    AdminCredentials, AgencyId, BulkRow, Caller, CitizenId, Profile, ProfileSection,
    Registry, RegistryConfig, Submission,
};

// ── Directory helpers ─────────────────────────────────────────────────────────

fn data_dir() -> Result<PathBuf> {
    if let Ok(home) = std::env::var("CREG_HOME") {
        return Ok(PathBuf::from(home));
    }
    let home = std::env::var("HOME").context("neither CREG_HOME nor HOME is set")?;
    Ok(PathBuf::from(home).join(".citizen-registry"))
}

fn config_path() -> Result<PathBuf> {
    Ok(data_dir()?.join("config.json"))
}

fn registry_path() -> Result<PathBuf> {
    Ok(data_dir()?.join("registry.json"))
}

fn open_registry() -> Result<Registry> {
    let config = RegistryConfig::load(&config_path()?).context("failed to load config")?;
    load_registry(&registry_path()?, config).context("failed to load registry")
}

fn commit(registry: &Registry) -> Result<()> {
    save_registry(registry, &registry_path()?).context("failed to save registry")
}

// ── Input helpers ─────────────────────────────────────────────────────────────

fn read_secret(prompt: &str) -> Result<String> {
    eprint!("{prompt}");
    let mut secret = String::new();
    std::io::stdin()
        .read_line(&mut secret)
        .context("failed to read secret")?;
    Ok(secret.trim().to_string())
}

fn secret_or_prompt(secret: Option<String>, prompt: &str) -> Result<String> {
    let secret = match secret {
        Some(s) => s,
        None => read_secret(prompt)?,
    };
    if secret.is_empty() {
        return Err(anyhow!("secret cannot be empty"));
    }
    Ok(secret)
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let text = if path == Path::new("-") {
        std::io::read_to_string(std::io::stdin()).context("failed to read stdin")?
    } else {
        std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?
    };
    serde_json::from_str(&text).with_context(|| format!("invalid JSON in {}", path.display()))
}

// ── Session ───────────────────────────────────────────────────────────────────

/// The caller named by `--as` and the secret given with `--auth`.
struct Session {
    caller: Option<Caller>,
    auth: Option<String>,
}

impl Session {
    fn secret(&self) -> Result<String> {
        secret_or_prompt(self.auth.clone(), "Secret for --as: ")
    }

    /// Check `--as` against the credentials stored in `registry`.
    ///
    /// Until administrator credentials are configured, `--as admin` is
    /// accepted without a secret so a new registry can be set up.
    fn sign_in(&self, registry: &Registry) -> Result<Caller> {
        let caller = self
            .caller
            .as_ref()
            .ok_or_else(|| anyhow!("this command needs --as <citizen:ID|agency:N|admin>"))?;
        let verified = match caller {
            Caller::Citizen(id) => registry.login_citizen(id, &self.secret()?),
            Caller::Organization(id) => registry.login_agency(*id, &self.secret()?),
            Caller::Administrator => {
                let admin = &registry.config().admin;
                if !admin.is_enabled() {
                    log::warn!("administrator credentials are not set; see `creg config set-admin`");
                    return Ok(Caller::Administrator);
                }
                registry.login_admin(&admin.username, &self.secret()?)
            }
        };
        verified.with_context(|| format!("could not authenticate as {caller}"))
    }

    /// Configuration changes need the administrator once one is configured.
    fn require_config_admin(&self, config: &RegistryConfig) -> Result<()> {
        if !config.admin.is_enabled() {
            return Ok(());
        }
        if !matches!(self.caller, Some(Caller::Administrator)) {
            return Err(anyhow!("changing the configuration needs --as admin"));
        }
        if config.admin.verify(&config.admin.username, &self.secret()?) {
            Ok(())
        } else {
            Err(anyhow!("could not authenticate as admin"))
        }
    }
}

// ── Formatting helpers ────────────────────────────────────────────────────────

fn micros_to_datetime(micros: u64) -> String {
    let secs = (micros / 1_000_000) as i64;
    chrono::DateTime::from_timestamp(secs, 0)
        .unwrap_or(chrono::DateTime::UNIX_EPOCH)
        .format("%Y-%m-%d %H:%M:%S UTC")
        .to_string()
}

fn submitter_label(submitted_by: &str) -> &str {
    if submitted_by.is_empty() {
        "(self)"
    } else {
        submitted_by
    }
}

fn print_submission(citizen: &CitizenId, submission: Submission) {
    match submission {
        Submission::Appended(v) => println!("Stored version {v} for {citizen}"),
        Submission::Staged(d) => println!("Staged draft {d} for unregistered {citizen}"),
    }
}

// ── CLI structure ─────────────────────────────────────────────────────────────

/// Citizen registry CLI: versioned citizen profiles with per-agency access
/// grants.
#[derive(Parser, Debug)]
#[command(
    name = "creg",
    about = "Citizen registry CLI",
    version,
    long_about = "creg — citizen registry CLI\n\nRegister citizens and agencies, submit and stage profile data,\nroll back versions, and control which agencies may read a record."
)]
struct Cli {
    /// Act as this caller: citizen:<ID>, agency:<N> or admin
    #[arg(long = "as", global = true, value_name = "CALLER")]
    caller: Option<Caller>,

    /// Secret for the --as caller (prompted if omitted)
    #[arg(long, global = true, value_name = "SECRET")]
    auth: Option<String>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Manage agencies (administrator)
    Agency {
        #[command(subcommand)]
        subcommand: AgencyCommands,
    },

    /// Register and inspect citizens
    Citizen {
        #[command(subcommand)]
        subcommand: CitizenCommands,
    },

    /// Submit a full profile (JSON file, or - for stdin)
    Submit {
        #[arg(long)]
        citizen: CitizenId,
        #[arg(long)]
        file: PathBuf,
    },

    /// Submit many profiles from a JSON array of {"citizen": ID, ...fields}
    Bulk {
        #[arg(long)]
        file: PathBuf,
    },

    /// Replace one profile section ({"section": ..., "fields": {...}})
    UpdateSection {
        #[arg(long)]
        citizen: CitizenId,
        #[arg(long)]
        file: PathBuf,
    },

    /// Grant or revoke an agency's read access (citizen only)
    Grant {
        #[arg(long)]
        citizen: CitizenId,
        #[arg(long)]
        agency: AgencyId,
        /// Revoke instead of grant
        #[arg(long)]
        revoke: bool,
    },

    /// Show every agency's grant state for a citizen
    Grants {
        #[arg(long)]
        citizen: CitizenId,
    },

    /// List drafts staged for a citizen
    Staged {
        #[arg(long)]
        citizen: CitizenId,
    },

    /// Show registry totals
    Stats,

    /// Export a citizen's full version history as JSON
    Export {
        #[arg(long)]
        citizen: CitizenId,
        /// Output path
        #[arg(long)]
        out: PathBuf,
    },

    /// Check credentials and print the caller to pass to --as
    Login {
        #[command(subcommand)]
        subcommand: LoginCommands,
    },

    /// Edit registry configuration
    Config {
        #[command(subcommand)]
        subcommand: ConfigCommands,
    },
}

#[derive(Subcommand, Debug)]
enum AgencyCommands {
    /// Register a new agency
    Register {
        #[arg(long)]
        name: String,
        #[arg(long, default_value = "")]
        contact: String,
        /// Login secret (prompted if omitted)
        #[arg(long)]
        secret: Option<String>,
    },
    /// Replace an agency's name, contact and secret
    Update {
        #[arg(long)]
        id: AgencyId,
        #[arg(long)]
        name: String,
        #[arg(long, default_value = "")]
        contact: String,
        #[arg(long)]
        secret: Option<String>,
    },
    /// List all agencies
    List,
    /// Show one agency
    Show {
        #[arg(long)]
        id: AgencyId,
    },
}

#[derive(Subcommand, Debug)]
enum CitizenCommands {
    /// Register a citizen and migrate any staged drafts
    Register {
        #[arg(long)]
        id: CitizenId,
        #[arg(long)]
        name: String,
        #[arg(long, default_value = "")]
        gender: String,
        /// Date of birth (YYYY-MM-DD)
        #[arg(long)]
        dob: Option<String>,
        /// Account secret (prompted if omitted)
        #[arg(long)]
        secret: Option<String>,
    },
    /// Print the current profile, or a specific version
    Show {
        #[arg(long)]
        id: CitizenId,
        #[arg(long)]
        version: Option<u64>,
    },
    /// List version numbers
    Versions {
        #[arg(long)]
        id: CitizenId,
    },
    /// Show version history with submitters
    History {
        #[arg(long)]
        id: CitizenId,
    },
    /// Make an earlier version current again
    Apply {
        #[arg(long)]
        id: CitizenId,
        #[arg(long)]
        version: u64,
    },
    /// Registration status and version numbers (no permission needed)
    Details {
        #[arg(long)]
        id: CitizenId,
    },
    /// Retry migrating drafts left by a partial migration
    Migrate {
        #[arg(long)]
        id: CitizenId,
    },
}

#[derive(Subcommand, Debug)]
enum LoginCommands {
    Citizen {
        #[arg(long)]
        id: CitizenId,
        #[arg(long)]
        secret: Option<String>,
    },
    Agency {
        #[arg(long)]
        id: AgencyId,
        #[arg(long)]
        secret: Option<String>,
    },
    Admin {
        #[arg(long, default_value = "admin")]
        username: String,
        #[arg(long)]
        secret: Option<String>,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigCommands {
    /// Set the administrator credentials
    SetAdmin {
        #[arg(long, default_value = "admin")]
        username: String,
        #[arg(long)]
        secret: Option<String>,
    },
    /// Cap the number of versions per citizen (0 removes the cap)
    SetLimit {
        #[arg(long)]
        max_versions: u64,
    },
    /// Print the configuration (secret hashes redacted)
    Show,
}

// ── Main ──────────────────────────────────────────────────────────────────────

fn main() {
    let cli = Cli::parse();
    let default_filter = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    let session = Session {
        caller: cli.caller,
        auth: cli.auth,
    };

    let result = match cli.command {
        Commands::Agency { subcommand } => match subcommand {
            AgencyCommands::Register {
                name,
                contact,
                secret,
            } => cmd_agency_register(&session, &name, &contact, secret),
            AgencyCommands::Update {
                id,
                name,
                contact,
                secret,
            } => cmd_agency_update(&session, id, &name, &contact, secret),
            AgencyCommands::List => cmd_agency_list(),
            AgencyCommands::Show { id } => cmd_agency_show(id),
        },
        Commands::Citizen { subcommand } => match subcommand {
            CitizenCommands::Register {
                id,
                name,
                gender,
                dob,
                secret,
            } => cmd_citizen_register(&session, &id, &name, &gender, dob.as_deref(), secret),
            CitizenCommands::Show { id, version } => cmd_citizen_show(&session, &id, version),
            CitizenCommands::Versions { id } => cmd_citizen_versions(&session, &id),
            CitizenCommands::History { id } => cmd_citizen_history(&session, &id),
            CitizenCommands::Apply { id, version } => cmd_citizen_apply(&session, &id, version),
            CitizenCommands::Details { id } => cmd_citizen_details(&id),
            CitizenCommands::Migrate { id } => cmd_citizen_migrate(&session, &id),
        },
        Commands::Submit { citizen, file } => cmd_submit(&session, &citizen, &file),
        Commands::Bulk { file } => cmd_bulk(&session, &file),
        Commands::UpdateSection { citizen, file } => cmd_update_section(&session, &citizen, &file),
        Commands::Grant {
            citizen,
            agency,
            revoke,
        } => cmd_grant(&session, &citizen, agency, !revoke),
        Commands::Grants { citizen } => cmd_grants(&citizen),
        Commands::Staged { citizen } => cmd_staged(&session, &citizen),
        Commands::Stats => cmd_stats(),
        Commands::Export { citizen, out } => cmd_export(&session, &citizen, &out),
        Commands::Login { subcommand } => match subcommand {
            LoginCommands::Citizen { id, secret } => cmd_login_citizen(&id, secret),
            LoginCommands::Agency { id, secret } => cmd_login_agency(id, secret),
            LoginCommands::Admin { username, secret } => cmd_login_admin(&username, secret),
        },
        Commands::Config { subcommand } => match subcommand {
            ConfigCommands::SetAdmin { username, secret } => {
                cmd_config_set_admin(&session, &username, secret)
            }
            ConfigCommands::SetLimit { max_versions } => cmd_config_set_limit(&session, max_versions),
            ConfigCommands::Show => cmd_config_show(),
        },
    };

    if let Err(e) = result {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}

// ── Agency commands ───────────────────────────────────────────────────────────

/// `creg --as admin agency register --name NAME [--contact C] [--secret S]`
fn cmd_agency_register(
    session: &Session,
    name: &str,
    contact: &str,
    secret: Option<String>,
) -> Result<()> {
    let secret = secret_or_prompt(secret, "Enter agency secret: ")?;
    let registry = open_registry()?;
    let caller = &session.sign_in(&registry)?;
    let id = registry.register_agency(caller, name, contact, &secret)?;
    commit(&registry)?;
    println!("Registered agency {id} ({name})");
    Ok(())
}

/// `creg --as admin agency update --id N --name NAME [--contact C] [--secret S]`
fn cmd_agency_update(
    session: &Session,
    id: AgencyId,
    name: &str,
    contact: &str,
    secret: Option<String>,
) -> Result<()> {
    let secret = secret_or_prompt(secret, "Enter new agency secret: ")?;
    let registry = open_registry()?;
    let caller = &session.sign_in(&registry)?;
    registry.update_agency(caller, id, name, contact, &secret)?;
    commit(&registry)?;
    println!("Updated agency {id}");
    Ok(())
}

/// `creg agency list`
fn cmd_agency_list() -> Result<()> {
    let registry = open_registry()?;
    let agencies = registry.agencies()?;
    if agencies.is_empty() {
        println!("No agencies registered.");
        return Ok(());
    }
    for agency in agencies {
        println!("{:>4}  {}  {}", agency.id, agency.name, agency.contact);
    }
    Ok(())
}

/// `creg agency show --id N`
fn cmd_agency_show(id: AgencyId) -> Result<()> {
    let registry = open_registry()?;
    let agency = registry.agency(id)?;
    println!("Agency {}", agency.id);
    println!("  Name:       {}", agency.name);
    println!("  Contact:    {}", agency.contact);
    println!("  Registered: {}", micros_to_datetime(agency.registered_at));
    Ok(())
}

// ── Citizen commands ──────────────────────────────────────────────────────────

/// `creg citizen register --id ID --name NAME [--gender G] [--dob YYYY-MM-DD]`
///
/// Without `--as`, or as themself, the citizen registers and sets their
/// secret; nothing needs verifying yet. The administrator must sign in.
fn cmd_citizen_register(
    session: &Session,
    id: &CitizenId,
    name: &str,
    gender: &str,
    dob: Option<&str>,
    secret: Option<String>,
) -> Result<()> {
    let dob = match dob {
        Some(d) => citizen_registry::time::parse_dob(d)?,
        None => 0,
    };
    let secret = secret_or_prompt(secret, "Enter account secret: ")?;
    let password_hash = citizen_registry::secret::hash_secret(&secret)?;

    let registry = open_registry()?;
    let caller = match &session.caller {
        None => Caller::Citizen(id.clone()),
        Some(c) if c.is_citizen(id) => c.clone(),
        Some(_) => session.sign_in(&registry)?,
    };
    let report = registry.register_citizen(&caller, id, Profile::seed(name, gender, dob, password_hash))?;
    commit(&registry)?;

    println!("Registered {id} at version {}", report.version);
    for m in &report.migration.migrated {
        println!("  draft {} -> version {}", m.draft, m.version);
    }
    if let Some(partial) = &report.migration.partial {
        println!(
            "  migration stopped at draft {}: {} (pending: {:?})",
            partial.failed_draft, partial.reason, partial.pending
        );
    }
    Ok(())
}

/// `creg --as CALLER citizen show --id ID [--version N]`
fn cmd_citizen_show(session: &Session, id: &CitizenId, version: Option<u64>) -> Result<()> {
    let registry = open_registry()?;
    let caller = &session.sign_in(&registry)?;
    let profile = match version {
        Some(n) => registry.read_version(caller, id, n)?,
        None => registry.read_current(caller, id)?,
    };
    println!("{}", profile.to_json_pretty()?);
    Ok(())
}

/// `creg --as CALLER citizen versions --id ID`
fn cmd_citizen_versions(session: &Session, id: &CitizenId) -> Result<()> {
    let registry = open_registry()?;
    let caller = &session.sign_in(&registry)?;
    let versions = registry.list_versions(caller, id)?;
    let rendered: Vec<String> = versions.iter().map(u64::to_string).collect();
    println!("{}", rendered.join(" "));
    Ok(())
}

/// `creg --as CALLER citizen history --id ID`
fn cmd_citizen_history(session: &Session, id: &CitizenId) -> Result<()> {
    let registry = open_registry()?;
    let caller = &session.sign_in(&registry)?;
    let history = registry.history(caller, id)?;
    if history.is_empty() {
        println!("No versions stored for {id}.");
        return Ok(());
    }
    for v in history {
        println!(
            "{} v{:<4} {}  {}",
            if v.is_current { "*" } else { " " },
            v.number,
            micros_to_datetime(v.created_at),
            submitter_label(&v.submitted_by)
        );
    }
    Ok(())
}

/// `creg --as citizen:ID citizen apply --id ID --version N`
fn cmd_citizen_apply(session: &Session, id: &CitizenId, version: u64) -> Result<()> {
    let registry = open_registry()?;
    let caller = &session.sign_in(&registry)?;
    let new_version = registry.apply_version(caller, id, version)?;
    commit(&registry)?;
    println!("Applied version {version} as version {new_version}");
    Ok(())
}

/// `creg citizen details --id ID`
fn cmd_citizen_details(id: &CitizenId) -> Result<()> {
    let registry = open_registry()?;
    let details = registry.citizen_details(id)?;
    println!("{}", serde_json::to_string_pretty(&details)?);
    Ok(())
}

/// `creg --as CALLER citizen migrate --id ID`
fn cmd_citizen_migrate(session: &Session, id: &CitizenId) -> Result<()> {
    let registry = open_registry()?;
    let caller = &session.sign_in(&registry)?;
    let report = registry.resume_migration(caller, id)?;
    commit(&registry)?;
    println!("Migrated {} draft(s) for {id}", report.migrated.len());
    if let Some(partial) = &report.partial {
        println!(
            "  stopped at draft {}: {}",
            partial.failed_draft, partial.reason
        );
    }
    Ok(())
}

// ── Write commands ────────────────────────────────────────────────────────────

/// `creg --as CALLER submit --citizen ID --file PROFILE.json`
fn cmd_submit(session: &Session, citizen: &CitizenId, file: &Path) -> Result<()> {
    let profile: Profile = read_json(file)?;
    let registry = open_registry()?;
    let caller = &session.sign_in(&registry)?;
    let submission = registry.submit(caller, citizen, profile)?;
    commit(&registry)?;
    print_submission(citizen, submission);
    Ok(())
}

/// `creg --as agency:N bulk --file ROWS.json`
fn cmd_bulk(session: &Session, file: &Path) -> Result<()> {
    let rows: Vec<BulkRow> = read_json(file)?;
    let citizens: Vec<CitizenId> = rows.iter().map(|r| r.citizen.clone()).collect();
    let registry = open_registry()?;
    let caller = &session.sign_in(&registry)?;
    let results = registry.submit_bulk(caller, rows);
    commit(&registry)?;

    let mut failed = 0;
    for (citizen, result) in citizens.iter().zip(results) {
        match result {
            Ok(submission) => print_submission(citizen, submission),
            Err(e) => {
                failed += 1;
                println!("Failed {citizen}: {e}");
            }
        }
    }
    if failed > 0 {
        return Err(anyhow!("{failed} of {} rows failed", citizens.len()));
    }
    Ok(())
}

/// `creg --as CALLER update-section --citizen ID --file SECTION.json`
fn cmd_update_section(session: &Session, citizen: &CitizenId, file: &Path) -> Result<()> {
    let section: ProfileSection = read_json(file)?;
    let registry = open_registry()?;
    let caller = &session.sign_in(&registry)?;
    let submission = registry.update_section(caller, citizen, section)?;
    commit(&registry)?;
    print_submission(citizen, submission);
    Ok(())
}

// ── Grant commands ────────────────────────────────────────────────────────────

/// `creg --as citizen:ID grant --citizen ID --agency N [--revoke]`
fn cmd_grant(session: &Session, citizen: &CitizenId, agency: AgencyId, granted: bool) -> Result<()> {
    let registry = open_registry()?;
    let caller = &session.sign_in(&registry)?;
    registry.set_grant(caller, citizen, agency, granted)?;
    commit(&registry)?;
    println!(
        "{} agency {agency} read access to {citizen}",
        if granted { "Granted" } else { "Revoked" }
    );
    Ok(())
}

/// `creg grants --citizen ID`
fn cmd_grants(citizen: &CitizenId) -> Result<()> {
    let registry = open_registry()?;
    let agencies = registry.agencies()?;
    for (grant, agency) in registry.grants(citizen)?.iter().zip(agencies) {
        println!(
            "{:>4}  {:<7}  {}",
            grant.agency,
            if grant.granted { "granted" } else { "denied" },
            agency.name
        );
    }
    Ok(())
}

/// `creg --as CALLER staged --citizen ID`
fn cmd_staged(session: &Session, citizen: &CitizenId) -> Result<()> {
    let registry = open_registry()?;
    let caller = &session.sign_in(&registry)?;
    let drafts = registry.pending_drafts(caller, citizen)?;
    if drafts.is_empty() {
        println!("No drafts staged for {citizen}.");
        return Ok(());
    }
    for d in drafts {
        println!(
            "draft {:<4} {}  {}",
            d.number,
            micros_to_datetime(d.staged_at),
            d.organization
        );
    }
    Ok(())
}

// ── Registry-wide commands ────────────────────────────────────────────────────

/// `creg stats`
fn cmd_stats() -> Result<()> {
    let registry = open_registry()?;
    let stats = registry.stats()?;
    println!("Citizens:       {}", stats.total_citizens);
    println!("Agencies:       {}", stats.total_agencies);
    println!("Updates:        {}", stats.total_updates);
    println!("Pending drafts: {}", stats.pending_drafts);
    Ok(())
}

/// `creg --as CALLER export --citizen ID --out PATH`
fn cmd_export(session: &Session, citizen: &CitizenId, out: &Path) -> Result<()> {
    let registry = open_registry()?;
    let caller = &session.sign_in(&registry)?;
    let history = registry.export_history(caller, citizen)?;
    let count = history.versions.len();
    export_history(history, out)?;
    println!("Exported {count} version(s) of {citizen} to {}", out.display());
    Ok(())
}

// ── Login commands ────────────────────────────────────────────────────────────

fn cmd_login_citizen(id: &CitizenId, secret: Option<String>) -> Result<()> {
    let secret = secret_or_prompt(secret, "Secret: ")?;
    let caller = open_registry()?.login_citizen(id, &secret)?;
    println!("{caller}");
    Ok(())
}

fn cmd_login_agency(id: AgencyId, secret: Option<String>) -> Result<()> {
    let secret = secret_or_prompt(secret, "Secret: ")?;
    let caller = open_registry()?.login_agency(id, &secret)?;
    println!("{caller}");
    Ok(())
}

fn cmd_login_admin(username: &str, secret: Option<String>) -> Result<()> {
    let secret = secret_or_prompt(secret, "Secret: ")?;
    let caller = open_registry()?.login_admin(username, &secret)?;
    println!("{caller}");
    Ok(())
}

// ── Config commands ───────────────────────────────────────────────────────────

fn cmd_config_set_admin(session: &Session, username: &str, secret: Option<String>) -> Result<()> {
    let path = config_path()?;
    let mut config = RegistryConfig::load(&path)?;
    session.require_config_admin(&config)?;
    let secret = secret_or_prompt(secret, "New administrator secret: ")?;
    config.admin = AdminCredentials::new(username, &secret)?;
    config.save(&path).context("failed to save config")?;
    println!("Administrator credentials updated for '{username}'");
    Ok(())
}

fn cmd_config_set_limit(session: &Session, max_versions: u64) -> Result<()> {
    let path = config_path()?;
    let mut config = RegistryConfig::load(&path)?;
    session.require_config_admin(&config)?;
    config.max_versions_per_citizen = (max_versions > 0).then_some(max_versions);
    config.save(&path).context("failed to save config")?;
    match config.max_versions_per_citizen {
        Some(n) => println!("Version cap set to {n}"),
        None => println!("Version cap removed"),
    }
    Ok(())
}

fn cmd_config_show() -> Result<()> {
    let config = RegistryConfig::load(&config_path()?)?;
    println!(
        "max_versions_per_citizen: {}",
        config
            .max_versions_per_citizen
            .map_or_else(|| "none".to_string(), |n| n.to_string())
    );
    println!("admin.username:           {}", config.admin.username);
    println!(
        "admin login:              {}",
        if config.admin.is_enabled() { "enabled" } else { "disabled" }
    );
    Ok(())
}
