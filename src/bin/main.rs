use std::io::{BufRead, Write};

use clap::Parser;
use log::debug;

use savings_dashboard::{
    compute_aggregates, lookup_user, Format, Ledger, Page, PageWriter, Session,
};

/// A terminal dashboard for the group savings ledger
///
/// Without `--user-id`, one user id is read per line from stdin.
#[derive(Debug, Parser)]
#[clap(version)]
struct Args {
    /// The path to the ledger CSV file
    #[clap(env = "SAVINGS_LEDGER", default_value = "jollyboys.csv")]
    filename: std::path::PathBuf,
    /// Shows the dashboard of this user and exits
    #[clap(long)]
    user_id: Option<String>,
    /// Either `cards` or `csv`
    #[clap(long, default_value = "cards")]
    format: Format,
    /// Starts the session as administrator
    #[clap(long)]
    admin: bool,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();
    let session = Session {
        is_admin: args.admin,
        show_login: false,
    };

    let stdout = std::io::stdout();
    let mut pages = PageWriter::new(stdout.lock(), args.format, session);

    match &args.user_id {
        Some(id) => pages.write(&lookup(&args, id)?)?,
        None => {
            let stdin = std::io::stdin();
            for line in stdin.lock().lines() {
                pages.write(&lookup(&args, &line?)?)?;
            }
        }
    }

    pages.into_inner()?.flush()?;

    Ok(())
}

fn lookup(args: &Args, id: &str) -> anyhow::Result<Page> {
    if id.trim().is_empty() {
        return Ok(Page::Blank);
    }

    // every lookup starts from a freshly read ledger
    let ledger = Ledger::load(&args.filename)?;
    debug!("looking up `{}` in {} rows", id.trim(), ledger.len());

    Ok(Page::from_lookup(lookup_user(&ledger, id), compute_aggregates(&ledger)))
}
