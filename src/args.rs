//! These structs provide the CLI interface for the chargebook CLI.

use crate::filter::{ExemptFilter, RecordFilter};
use crate::model::{Quantity, RecordId};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::convert::Infallible;
use std::fmt::{Display, Formatter};
use std::ops::Deref;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::error;
use tracing_subscriber::filter::LevelFilter;

/// chargebook: keep a log of your electric vehicle charging sessions and see what they cost you.
///
/// Charges are imported from CSV files exported by a spreadsheet, or entered one at a time. The
/// report command summarizes spending, consumption and distance per month, and, once a gasoline
/// baseline is set, how much you saved compared to a gasoline car.
#[derive(Debug, Parser, Clone)]
pub struct Args {
    #[clap(flatten)]
    common: Common,

    #[command(subcommand)]
    command: Command,
}

impl Args {
    pub fn new(common: Common, command: Command) -> Self {
        Self { common, command }
    }

    pub fn common(&self) -> &Common {
        &self.common
    }

    pub fn command(&self) -> &Command {
        &self.command
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Create the data directory, the configuration file and the database.
    ///
    /// This is the first command you should run. By default the data directory is
    /// $HOME/chargebook, pass --home to put it somewhere else.
    Init,
    /// Import charges from a CSV file.
    ///
    /// The file needs the columns date, energy, cost, exempt, odometer, location and notes in any
    /// order. The delimiter (comma, semicolon, tab or pipe) is detected automatically. If any row is
    /// invalid, every problem is reported and nothing is imported.
    Import(ImportArgs),
    /// Add a single charge.
    Insert(ChargeArgs),
    /// Replace every field of an existing charge.
    Update(UpdateArgs),
    /// Delete a charge.
    Delete(DeleteArgs),
    /// List charges, optionally filtered.
    List(FilterArgs),
    /// Write charges to a CSV file that can be imported again.
    Export(ExportArgs),
    /// Show or set the gasoline car that savings are computed against.
    Baseline(BaselineArgs),
    /// Show totals, a monthly breakdown and how the latest month compares to the one before.
    Report,
}

/// Arguments common to all subcommands.
#[derive(Debug, Parser, Clone)]
pub struct Common {
    /// The logging verbosity. One of, from least to most verbose:
    /// off, error, warn, info, debug, trace
    ///
    /// This can be overridden by RUST_LOG.
    #[arg(long, default_value_t = LevelFilter::INFO)]
    log_level: LevelFilter,

    /// The directory where chargebook data and configuration is held. Defaults to ~/chargebook
    #[arg(long, env = "CHARGEBOOK_HOME", default_value_t = default_chargebook_home())]
    home: DisplayPath,

    /// Act on behalf of this user instead of the one in config.json.
    #[arg(long, env = "CHARGEBOOK_USER")]
    user: Option<String>,
}

impl Common {
    pub fn new(log_level: LevelFilter, home: PathBuf, user: Option<String>) -> Self {
        Self {
            log_level,
            home: home.into(),
            user,
        }
    }

    pub fn log_level(&self) -> LevelFilter {
        self.log_level
    }

    pub fn home(&self) -> &DisplayPath {
        &self.home
    }

    pub fn user(&self) -> Option<&str> {
        self.user.as_deref()
    }
}

/// Args for the `chargebook import` command.
#[derive(Debug, Parser, Clone)]
pub struct ImportArgs {
    /// The CSV file to import.
    file: PathBuf,
}

impl ImportArgs {
    pub fn new(file: impl Into<PathBuf>) -> Self {
        Self { file: file.into() }
    }

    pub fn file(&self) -> &Path {
        &self.file
    }
}

/// The fields of one charge, as given on the command line. Numbers may use `.` or `,` as the
/// decimal separator.
#[derive(Debug, Default, Parser, Clone)]
pub struct ChargeArgs {
    /// The date of the charge, e.g. 2024-03-15 or 15/03/2024.
    #[arg(long)]
    date: String,

    /// Energy delivered in kWh. Must be greater than zero.
    #[arg(long)]
    energy: String,

    /// What the charge cost. Must not be negative.
    #[arg(long)]
    cost: String,

    /// The charge was free for you, e.g. paid by an employer.
    #[arg(long)]
    exempt: bool,

    /// The odometer reading when charging. Must not be negative.
    #[arg(long)]
    odometer: String,

    /// Where you charged.
    #[arg(long, default_value = "")]
    location: String,

    /// Anything else worth remembering.
    #[arg(long, default_value = "")]
    notes: String,
}

impl ChargeArgs {
    pub fn new(
        date: impl Into<String>,
        energy: impl Into<String>,
        cost: impl Into<String>,
        exempt: bool,
        odometer: impl Into<String>,
    ) -> Self {
        Self {
            date: date.into(),
            energy: energy.into(),
            cost: cost.into(),
            exempt,
            odometer: odometer.into(),
            location: String::new(),
            notes: String::new(),
        }
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = location.into();
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = notes.into();
        self
    }

    pub fn date(&self) -> &str {
        &self.date
    }

    pub fn energy(&self) -> &str {
        &self.energy
    }

    pub fn cost(&self) -> &str {
        &self.cost
    }

    pub fn exempt(&self) -> bool {
        self.exempt
    }

    pub fn odometer(&self) -> &str {
        &self.odometer
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    pub fn notes(&self) -> &str {
        &self.notes
    }
}

/// Args for the `chargebook update` command.
#[derive(Debug, Parser, Clone)]
pub struct UpdateArgs {
    /// The id of the charge to replace, as shown by `chargebook list`.
    id: RecordId,

    #[clap(flatten)]
    charge: ChargeArgs,
}

impl UpdateArgs {
    pub fn new(id: RecordId, charge: ChargeArgs) -> Self {
        Self { id, charge }
    }

    pub fn id(&self) -> RecordId {
        self.id
    }

    pub fn charge(&self) -> &ChargeArgs {
        &self.charge
    }
}

/// Args for the `chargebook delete` command.
#[derive(Debug, Parser, Clone)]
pub struct DeleteArgs {
    /// The id of the charge to delete, as shown by `chargebook list`.
    id: RecordId,
}

impl DeleteArgs {
    pub fn new(id: RecordId) -> Self {
        Self { id }
    }

    pub fn id(&self) -> RecordId {
        self.id
    }
}

/// Criteria for the `list` and `export` commands. With no flags, every charge matches.
#[derive(Debug, Default, Parser, Clone)]
pub struct FilterArgs {
    /// Only charges whose location contains this text, ignoring case.
    #[arg(long)]
    location: Option<String>,

    /// Only charges whose notes contain this text, ignoring case.
    #[arg(long)]
    notes: Option<String>,

    /// Filter on the exempt flag.
    #[arg(long, value_enum, default_value_t = ExemptFilter::All)]
    exempt: ExemptFilter,

    /// Only charges on or after this date, YYYY-MM-DD.
    #[arg(long)]
    from: Option<NaiveDate>,

    /// Only charges on or before this date, YYYY-MM-DD.
    #[arg(long)]
    to: Option<NaiveDate>,
}

impl FilterArgs {
    pub fn new(filter: RecordFilter) -> Self {
        Self {
            location: filter.location,
            notes: filter.notes,
            exempt: filter.exempt,
            from: filter.date_from,
            to: filter.date_to,
        }
    }

    pub fn filter(&self) -> RecordFilter {
        RecordFilter {
            location: self.location.clone(),
            notes: self.notes.clone(),
            exempt: self.exempt,
            date_from: self.from,
            date_to: self.to,
        }
    }
}

/// Args for the `chargebook export` command.
#[derive(Debug, Parser, Clone)]
pub struct ExportArgs {
    /// Where to write the CSV file. An existing file is overwritten.
    #[arg(long)]
    out: PathBuf,

    #[clap(flatten)]
    filter: FilterArgs,
}

impl ExportArgs {
    pub fn new(out: impl Into<PathBuf>, filter: FilterArgs) -> Self {
        Self {
            out: out.into(),
            filter,
        }
    }

    pub fn out(&self) -> &Path {
        &self.out
    }

    pub fn filter(&self) -> RecordFilter {
        self.filter.filter()
    }
}

/// Args for the `chargebook baseline` command. Without flags, the current baseline is shown.
#[derive(Debug, Default, Parser, Clone)]
pub struct BaselineArgs {
    /// Price of one unit of gasoline, e.g. per liter.
    #[arg(long, requires = "efficiency")]
    fuel_price: Option<Quantity>,

    /// Distance the gasoline car drives on one unit of gasoline, e.g. km per liter.
    #[arg(long, requires = "fuel_price")]
    efficiency: Option<Quantity>,
}

impl BaselineArgs {
    pub fn new(fuel_price: Option<Quantity>, efficiency: Option<Quantity>) -> Self {
        Self {
            fuel_price,
            efficiency,
        }
    }

    pub fn fuel_price(&self) -> Option<Quantity> {
        self.fuel_price
    }

    pub fn efficiency(&self) -> Option<Quantity> {
        self.efficiency
    }
}

fn default_chargebook_home() -> DisplayPath {
    DisplayPath(match dirs::home_dir() {
        Some(home) => home.join("chargebook"),
        None => {
            error!(
                "There was an error when trying to get your home directory. You can get around \
                this by providing --home or CHARGEBOOK_HOME instead of relying on the default \
                chargebook home directory. If you continue using the program right now, you may \
                have problems!",
            );
            PathBuf::from("chargebook")
        }
    })
}

#[derive(Debug, Default, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct DisplayPath(PathBuf);

impl From<PathBuf> for DisplayPath {
    fn from(value: PathBuf) -> Self {
        DisplayPath(value)
    }
}

impl Deref for DisplayPath {
    type Target = Path;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl AsRef<Path> for DisplayPath {
    fn as_ref(&self) -> &Path {
        &self.0
    }
}

impl Display for DisplayPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.to_string_lossy())
    }
}

impl FromStr for DisplayPath {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(PathBuf::from(s)))
    }
}

impl DisplayPath {
    pub fn path(&self) -> &Path {
        &self.0
    }
}
